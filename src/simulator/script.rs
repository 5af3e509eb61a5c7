//! Scripted user interactions

use serde::Deserialize;

/// One user action replayed against a page. Elements are named by their
/// `id` attribute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Type a value into a control
    Fill { id: String, value: String },
    Click { id: String },
    /// User-initiated submission, running the form guard
    Submit { id: String },
    /// Let time pass so the quiz timer can tick
    Wait { ms: u64 },
    /// Answer for the next confirmation dialog
    Confirm { accept: bool },
    StopTimer,
    ResumeTimer,
    CancelTimer,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fill { .. } => "fill",
            Self::Click { .. } => "click",
            Self::Submit { .. } => "submit",
            Self::Wait { .. } => "wait",
            Self::Confirm { .. } => "confirm",
            Self::StopTimer => "stop_timer",
            Self::ResumeTimer => "resume_timer",
            Self::CancelTimer => "cancel_timer",
        }
    }
}

/// Parse a JSON array of steps
pub fn parse_script(json: &str) -> Result<Vec<Step>, serde_json::Error> {
    serde_json::from_str(json)
}
