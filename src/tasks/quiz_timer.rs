//! Quiz countdown background task

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::{
    dom::Page,
    state::{CountdownSession, TickOutcome, TimerSnapshot, TimerStatus},
};

/// Control requests sent to a running countdown task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerCommand {
    Run,
    Stop,
    Cancel,
}

/// Handle owning a countdown task and its control channel
#[derive(Debug)]
pub struct QuizTimerHandle {
    commands: watch::Sender<TimerCommand>,
    snapshots: watch::Receiver<TimerSnapshot>,
    task: JoinHandle<TimerSnapshot>,
}

impl QuizTimerHandle {
    /// Pause the countdown, keeping the remaining time
    pub fn stop(&self) {
        self.send(TimerCommand::Stop);
    }

    /// Resume a stopped countdown; the next tick lands one period later
    pub fn resume(&self) {
        self.send(TimerCommand::Run);
    }

    /// End the countdown without submitting the quiz
    pub fn cancel(&self) {
        self.send(TimerCommand::Cancel);
    }

    /// Latest published state
    pub fn snapshot(&self) -> TimerSnapshot {
        *self.snapshots.borrow()
    }

    /// Receiver of state updates, one per tick or command
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.clone()
    }

    /// Wait for the task to end and return its final state
    pub async fn finished(self) -> TimerSnapshot {
        let last_seen = *self.snapshots.borrow();
        match self.task.await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Quiz timer task failed: {}", e);
                last_seen
            }
        }
    }

    fn send(&self, command: TimerCommand) {
        if self.commands.send(command).is_err() {
            debug!("Quiz timer already finished, ignoring {:?}", command);
        }
    }
}

/// Start `session` ticking every `period` against `page`.
///
/// The first tick fires one period after the call, like `setInterval`.
/// Dropping the handle leaves the countdown running until it expires.
pub fn spawn_quiz_timer<P>(
    page: Arc<Mutex<P>>,
    mut session: CountdownSession,
    period: Duration,
) -> QuizTimerHandle
where
    P: Page + Send + 'static,
{
    session.start();
    let (commands, mut command_rx) = watch::channel(TimerCommand::Run);
    let (snapshot_tx, snapshots) = watch::channel(session.snapshot());

    let task = tokio::spawn(async move {
        info!(
            "Starting quiz timer: {} ({}s)",
            session.duration(),
            session.remaining_seconds()
        );

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commands_open = true;

        loop {
            tokio::select! {
                _ = ticker.tick(), if session.status() == TimerStatus::Running => {
                    let outcome = {
                        let mut page = match page.lock() {
                            Ok(page) => page,
                            Err(e) => {
                                error!("Failed to lock page for timer tick: {}", e);
                                session.cancel();
                                break;
                            }
                        };
                        session.tick(&mut *page)
                    };

                    match outcome {
                        Ok(TickOutcome::Displayed(text)) => debug!("Quiz timer shows {}", text),
                        Ok(TickOutcome::Expired { submitted }) => {
                            info!("Quiz timer expired (quiz submitted: {})", submitted);
                        }
                        Ok(TickOutcome::Inactive) => {}
                        Err(e) => {
                            error!("Quiz timer tick failed: {}", e);
                            session.cancel();
                        }
                    }
                    snapshot_tx.send_replace(session.snapshot());
                }

                changed = command_rx.changed(), if commands_open => {
                    if changed.is_err() {
                        // Handle dropped: keep counting down on our own
                        commands_open = false;
                        continue;
                    }
                    let command = *command_rx.borrow_and_update();
                    match command {
                        TimerCommand::Run => {
                            if session.start() {
                                ticker.reset();
                                info!("Quiz timer resumed with {}s left", session.remaining_seconds());
                            }
                        }
                        TimerCommand::Stop => {
                            session.stop();
                            info!("Quiz timer stopped with {}s left", session.remaining_seconds());
                        }
                        TimerCommand::Cancel => session.cancel(),
                    }
                    snapshot_tx.send_replace(session.snapshot());
                }

                else => break,
            }

            if session.status().is_finished() {
                break;
            }
        }

        session.snapshot()
    });

    QuizTimerHandle {
        commands,
        snapshots,
        task,
    }
}
