//! Names and texts of the server-rendered markup contract

use serde::{Deserialize, Serialize};

/// Hooks and dialog texts shared with the templates that render quiz pages.
///
/// Every field has a default, so a JSON override only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markup {
    /// `id` of the countdown display
    pub timer_id: String,
    /// Attribute on the display holding `"<minutes>:<seconds>"`
    pub duration_attribute: String,
    pub toggle_class: String,
    pub delete_class: String,
    pub required_attribute: String,
    pub invalid_class: String,
    pub missing_fields_message: String,
    pub time_up_message: String,
    pub delete_confirmation: String,
}

impl Default for Markup {
    fn default() -> Self {
        Self {
            timer_id: "quiz-timer".to_string(),
            duration_attribute: "data-duration".to_string(),
            toggle_class: "toggle-options".to_string(),
            delete_class: "delete-btn".to_string(),
            required_attribute: "required".to_string(),
            invalid_class: "is-invalid".to_string(),
            missing_fields_message: "Please fill out all required fields.".to_string(),
            time_up_message: "Time is up! Your quiz will be submitted automatically."
                .to_string(),
            delete_confirmation: "Are you sure you want to delete this item?".to_string(),
        }
    }
}

impl Markup {
    /// Parse a possibly partial JSON override
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_other_defaults() {
        let markup = Markup::from_json(r#"{"timer_id": "exam-clock"}"#).unwrap();
        assert_eq!(markup.timer_id, "exam-clock");
        assert_eq!(markup.delete_class, "delete-btn");
        assert_eq!(markup.invalid_class, "is-invalid");
    }
}
