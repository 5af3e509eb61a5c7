//! Transcript of a simulated page session

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{dom::memory::PageEffect, state::TimerSnapshot};

/// A page effect with the time it was collected
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub at: DateTime<Utc>,
    /// Index of the script step that was running, `None` for effects
    /// produced while attaching
    pub step: Option<usize>,
    #[serde(flatten)]
    pub effect: PageEffect,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub entries: Vec<TranscriptEntry>,
    pub timer: Option<TimerSnapshot>,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            entries: Vec::new(),
            timer: None,
        }
    }

    /// Stamp and append effects collected from the page
    pub fn record(&mut self, step: Option<usize>, effects: Vec<PageEffect>) {
        let at = Utc::now();
        self.entries.extend(
            effects
                .into_iter()
                .map(|effect| TranscriptEntry { at, step, effect }),
        );
    }

    pub fn effects(&self) -> impl Iterator<Item = &PageEffect> {
        self.entries.iter().map(|entry| &entry.effect)
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementId;

    #[test]
    fn entries_serialize_flat() {
        let mut transcript = Transcript::new();
        transcript.record(
            Some(2),
            vec![PageEffect::FormSubmitted {
                form: ElementId(1),
                programmatic: true,
            }],
        );

        let json = serde_json::to_value(&transcript).unwrap();
        let entry = &json["entries"][0];
        assert_eq!(entry["effect"], "form_submitted");
        assert_eq!(entry["form"], 1);
        assert_eq!(entry["programmatic"], true);
        assert_eq!(entry["step"], 2);
    }
}
