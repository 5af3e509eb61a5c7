//! Page simulator
//!
//! Loads a rendered page into a [`MemoryPage`], attaches the behaviors,
//! runs the quiz timer on tokio and replays scripted user steps.

pub mod script;
pub mod transcript;

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use anyhow::{anyhow, Context};
use tracing::{debug, info};

use crate::{
    dom::{memory::MemoryPage, Document, ElementId},
    error::BehaviorError,
    markup::Markup,
    state::{attach, TimerSnapshot, TimerStatus},
    tasks::{spawn_quiz_timer, QuizTimerHandle},
};
pub use script::{parse_script, Step};
pub use transcript::{Transcript, TranscriptEntry};

/// A page with behaviors attached, plus its running timer
#[derive(Debug)]
pub struct Simulation {
    page: Arc<Mutex<MemoryPage>>,
    timer: Option<QuizTimerHandle>,
    transcript: Transcript,
}

impl Simulation {
    /// Attach behaviors to `page` and start the quiz timer if there is one.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(
        mut page: MemoryPage,
        markup: &Markup,
        tick: Duration,
    ) -> Result<Self, BehaviorError> {
        let attachment = attach(&mut page, markup)?;
        let mut transcript = Transcript::new();
        transcript.record(None, page.take_effects());

        let page = Arc::new(Mutex::new(page));
        let timer = attachment
            .timer
            .map(|session| spawn_quiz_timer(Arc::clone(&page), session, tick));

        Ok(Self {
            page,
            timer,
            transcript,
        })
    }

    pub fn page(&self) -> Arc<Mutex<MemoryPage>> {
        Arc::clone(&self.page)
    }

    pub fn timer(&self) -> Option<TimerSnapshot> {
        self.timer.as_ref().map(QuizTimerHandle::snapshot)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Replay every step in order
    pub async fn run_script(&mut self, steps: &[Step]) -> anyhow::Result<()> {
        for (index, step) in steps.iter().enumerate() {
            self.apply(index, step)
                .await
                .with_context(|| format!("step {} ({}) failed", index, step.name()))?;
        }
        Ok(())
    }

    pub async fn apply(&mut self, index: usize, step: &Step) -> anyhow::Result<()> {
        debug!("Applying step {}: {:?}", index, step);
        match step {
            Step::Fill { id, value } => {
                let mut page = self.lock()?;
                let element = resolve(&page, id)?;
                page.set_value(element, value)?;
            }
            Step::Click { id } => {
                let mut page = self.lock()?;
                let element = resolve(&page, id)?;
                page.click(element)?;
            }
            Step::Submit { id } => {
                let mut page = self.lock()?;
                let form = resolve(&page, id)?;
                page.request_submit(form)?;
            }
            Step::Wait { ms } => {
                self.collect(Some(index))?;
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            Step::Confirm { accept } => self.lock()?.enqueue_confirm_response(*accept),
            Step::StopTimer => self.timer_handle()?.stop(),
            Step::ResumeTimer => self.timer_handle()?.resume(),
            Step::CancelTimer => self.timer_handle()?.cancel(),
        }
        self.collect(Some(index))
    }

    /// Wait until the quiz timer is no longer running.
    ///
    /// A stopped timer returns at once, since nothing would resume it.
    pub async fn wait_for_timer(&mut self) -> anyhow::Result<Option<TimerSnapshot>> {
        let Some(handle) = self.timer.as_ref() else {
            return Ok(None);
        };
        let mut updates = handle.subscribe();
        let last = *updates
            .wait_for(|snapshot| !snapshot.is_active())
            .await
            .map_err(|_| anyhow!("quiz timer stopped publishing updates"))?;
        if last.status == TimerStatus::Stopped {
            info!(
                "Quiz timer is stopped with {}s left, not waiting for expiry",
                last.remaining_seconds
            );
        }
        self.collect(None)?;
        Ok(Some(last))
    }

    /// Cancel the timer and hand back the transcript
    pub async fn finish(mut self) -> anyhow::Result<Transcript> {
        self.collect(None)?;
        if let Some(handle) = self.timer.take() {
            handle.cancel();
            self.transcript.timer = Some(handle.finished().await);
        }
        self.collect(None)?;
        self.transcript.finished_at = Some(chrono::Utc::now());
        info!(
            "Simulation finished with {} recorded effect(s)",
            self.transcript.entries.len()
        );
        Ok(self.transcript)
    }

    fn collect(&mut self, step: Option<usize>) -> anyhow::Result<()> {
        let effects = self.lock()?.take_effects();
        self.transcript.record(step, effects);
        Ok(())
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, MemoryPage>> {
        self.page
            .lock()
            .map_err(|e| anyhow!("Failed to lock page: {}", e))
    }

    fn timer_handle(&self) -> anyhow::Result<&QuizTimerHandle> {
        self.timer
            .as_ref()
            .ok_or_else(|| anyhow!("this page has no quiz timer"))
    }
}

fn resolve(page: &MemoryPage, id: &str) -> anyhow::Result<ElementId> {
    page.element_by_id(id)
        .ok_or_else(|| anyhow!("no element with id {:?}", id))
}
