//! Quiz countdown state

use std::{fmt, str::FromStr};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    dom::{Document, ElementId, Page, Selector},
    error::BehaviorError,
    markup::Markup,
};

/// Quiz length as written in the timer's duration attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizDuration {
    pub minutes: u32,
    pub seconds: u32,
}

impl QuizDuration {
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }
}

impl FromStr for QuizDuration {
    type Err = BehaviorError;

    /// Parse `"<minutes>:<seconds>"`, e.g. `"05:30"`
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| BehaviorError::MalformedDuration {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = value.trim().split(':');
        let (Some(minutes), Some(seconds), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed("expected exactly one ':' separator"));
        };

        let minutes = minutes
            .trim()
            .parse::<u32>()
            .map_err(|_| malformed("minutes are not a whole number"))?;
        let seconds = seconds
            .trim()
            .parse::<u32>()
            .map_err(|_| malformed("seconds are not a whole number"))?;

        Ok(Self { minutes, seconds })
    }
}

impl fmt::Display for QuizDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Render seconds as two-digit padded `MM:SS`
pub fn format_clock(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Stopped,
    Expired,
    Cancelled,
}

impl TimerStatus {
    /// Expired and cancelled sessions never tick again
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled)
    }
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session was not running
    Inactive,
    /// The display now shows this text
    Displayed(String),
    /// Time ran out; `submitted` tells whether a form was found and submitted
    Expired { submitted: bool },
}

/// Point-in-time view of a session, published to watchers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub remaining_seconds: u64,
}

impl TimerSnapshot {
    /// Only a running session will change on its own
    pub fn is_active(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

/// Countdown for one quiz page.
///
/// The counter is checked before it is decremented: each tick either
/// expires a counter that has already gone negative, or renders it and
/// counts down by one. A 3 second quiz shows 00:03, 00:02, 00:01, 00:00
/// and expires on the fifth tick, one tick after 00:00 is rendered rather
/// than on the same callback.
#[derive(Debug, Clone)]
pub struct CountdownSession {
    display: ElementId,
    duration: QuizDuration,
    remaining: i64,
    status: TimerStatus,
    time_up_message: String,
}

impl CountdownSession {
    pub fn new(display: ElementId, duration: QuizDuration, time_up_message: &str) -> Self {
        Self {
            display,
            duration,
            remaining: duration.total_seconds() as i64,
            status: TimerStatus::Idle,
            time_up_message: time_up_message.to_string(),
        }
    }

    /// Find the timer display on the page and read its duration.
    ///
    /// Returns `Ok(None)` when the page has no timer.
    pub fn discover<D: Document + ?Sized>(
        page: &D,
        markup: &Markup,
    ) -> Result<Option<Self>, BehaviorError> {
        let Some(display) = page.element_by_id(&markup.timer_id) else {
            debug!("No #{} element, quiz timer stays inert", markup.timer_id);
            return Ok(None);
        };

        let raw = page
            .attribute(display, &markup.duration_attribute)
            .ok_or_else(|| BehaviorError::MissingAttribute {
                element: display,
                attribute: markup.duration_attribute.clone(),
            })?;
        let duration = raw.parse::<QuizDuration>()?;

        info!(
            "Quiz timer found: {} ({} seconds)",
            duration,
            duration.total_seconds()
        );
        Ok(Some(Self::new(display, duration, &markup.time_up_message)))
    }

    pub fn display(&self) -> ElementId {
        self.display
    }

    pub fn duration(&self) -> QuizDuration {
        self.duration
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining.max(0) as u64
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            remaining_seconds: self.remaining_seconds(),
        }
    }

    /// Begin or resume ticking. Returns false for a finished session.
    pub fn start(&mut self) -> bool {
        match self.status {
            TimerStatus::Idle | TimerStatus::Stopped => {
                self.status = TimerStatus::Running;
                true
            }
            TimerStatus::Running => true,
            TimerStatus::Expired | TimerStatus::Cancelled => false,
        }
    }

    /// Pause ticking, keeping the remaining time
    pub fn stop(&mut self) {
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Stopped;
        }
    }

    /// End the session for good without submitting anything
    pub fn cancel(&mut self) {
        if !self.status.is_finished() {
            info!("Quiz timer cancelled with {}s left", self.remaining_seconds());
            self.status = TimerStatus::Cancelled;
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self, page: &mut dyn Page) -> Result<TickOutcome, BehaviorError> {
        if self.status != TimerStatus::Running {
            return Ok(TickOutcome::Inactive);
        }

        if self.remaining < 0 {
            return Ok(TickOutcome::Expired {
                submitted: self.expire(page)?,
            });
        }

        let text = format_clock(self.remaining as u64);
        page.set_text_content(self.display, &text)?;
        self.remaining -= 1;
        Ok(TickOutcome::Displayed(text))
    }

    fn expire(&mut self, page: &mut dyn Page) -> Result<bool, BehaviorError> {
        self.status = TimerStatus::Expired;
        info!("Quiz time is up, submitting the quiz");
        page.alert(&self.time_up_message);

        match page.query_all(&Selector::tag("form")).first() {
            Some(form) => {
                page.submit_form(*form)?;
                Ok(true)
            }
            None => {
                warn!("Quiz timer expired but the page has no form to submit");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryPage;
    use pretty_assertions::assert_eq;

    fn timer_page(duration: &str) -> (MemoryPage, ElementId, ElementId) {
        let mut page = MemoryPage::new();
        let form = page.append("form", &[("id", "quiz")]);
        let display = page.append("span", &[("id", "quiz-timer"), ("data-duration", duration)]);
        (page, form, display)
    }

    #[test]
    fn parses_minutes_and_seconds() {
        let duration: QuizDuration = "02:05".parse().unwrap();
        assert_eq!(duration, QuizDuration { minutes: 2, seconds: 5 });
        assert_eq!(duration.total_seconds(), 125);
        assert_eq!(duration.to_string(), "02:05");
    }

    #[test]
    fn rejects_malformed_durations() {
        for raw in ["", "5", "ab:10", "05:xx", "1:2:3", "-1:30", "05:"] {
            let err = raw.parse::<QuizDuration>().unwrap_err();
            assert!(
                matches!(err, BehaviorError::MalformedDuration { .. }),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9), "00:09");
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn discover_without_timer_is_inert() {
        let page = MemoryPage::new();
        assert!(CountdownSession::discover(&page, &Markup::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn discover_fails_fast_on_missing_attribute() {
        let mut page = MemoryPage::new();
        let display = page.append("span", &[("id", "quiz-timer")]);
        let err = CountdownSession::discover(&page, &Markup::default()).unwrap_err();
        assert_eq!(
            err,
            BehaviorError::MissingAttribute {
                element: display,
                attribute: "data-duration".to_string(),
            }
        );
    }

    #[test]
    fn three_second_quiz_counts_down_then_submits_once() {
        let (mut page, form, display) = timer_page("00:03");
        let mut session = CountdownSession::discover(&page, &Markup::default())
            .unwrap()
            .unwrap();
        assert!(session.start());

        let mut shown = Vec::new();
        for _ in 0..4 {
            match session.tick(&mut page).unwrap() {
                TickOutcome::Displayed(text) => shown.push(text),
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(page.text_content(display), *shown.last().unwrap());
        }
        assert_eq!(shown, vec!["00:03", "00:02", "00:01", "00:00"]);
        assert!(page.alerts().is_empty());

        assert_eq!(
            session.tick(&mut page).unwrap(),
            TickOutcome::Expired { submitted: true }
        );
        assert_eq!(session.status(), TimerStatus::Expired);
        assert_eq!(
            page.alerts(),
            vec!["Time is up! Your quiz will be submitted automatically.".to_string()]
        );
        assert_eq!(page.submitted_forms(), vec![(form, true)]);

        assert_eq!(session.tick(&mut page).unwrap(), TickOutcome::Inactive);
        assert_eq!(page.submitted_forms().len(), 1);
    }

    #[test]
    fn stopped_session_keeps_remaining_time() {
        let (mut page, _, _) = timer_page("00:10");
        let mut session = CountdownSession::discover(&page, &Markup::default())
            .unwrap()
            .unwrap();
        session.start();
        session.tick(&mut page).unwrap();
        session.stop();

        assert_eq!(session.tick(&mut page).unwrap(), TickOutcome::Inactive);
        assert_eq!(session.remaining_seconds(), 9);

        assert!(session.start());
        assert_eq!(
            session.tick(&mut page).unwrap(),
            TickOutcome::Displayed("00:09".to_string())
        );
    }

    #[test]
    fn cancelled_session_cannot_restart() {
        let (mut page, _, _) = timer_page("00:01");
        let mut session = CountdownSession::discover(&page, &Markup::default())
            .unwrap()
            .unwrap();
        session.start();
        session.cancel();

        assert!(!session.start());
        assert_eq!(session.tick(&mut page).unwrap(), TickOutcome::Inactive);
        assert!(page.submitted_forms().is_empty());
    }

    #[test]
    fn expiry_without_form_still_alerts() {
        let mut page = MemoryPage::new();
        page.append("span", &[("id", "quiz-timer"), ("data-duration", "00:00")]);
        let mut session = CountdownSession::discover(&page, &Markup::default())
            .unwrap()
            .unwrap();
        session.start();

        session.tick(&mut page).unwrap();
        assert_eq!(
            session.tick(&mut page).unwrap(),
            TickOutcome::Expired { submitted: false }
        );
        assert_eq!(page.alerts().len(), 1);
    }
}
