//! Error types for page behaviors

use thiserror::Error;

use crate::dom::ElementId;

/// Errors raised while attaching or running page behaviors.
///
/// Configuration problems in the rendered markup are reported when the
/// behaviors are attached, never at click time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BehaviorError {
    #[error("{element} is missing the `{attribute}` attribute")]
    MissingAttribute {
        element: ElementId,
        attribute: String,
    },
    #[error("malformed quiz duration {value:?}: {reason}")]
    MalformedDuration { value: String, reason: String },
    #[error("options toggle {button} has no following sibling to act as its panel")]
    MissingOptionsPanel { button: ElementId },
    #[error("{0} does not exist on this page")]
    UnknownElement(ElementId),
    #[error("host call failed: {0}")]
    Host(String),
}
