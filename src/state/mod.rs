//! Behavior state module
//!
//! Each quiz page behavior owns its state here; `page_state::attach` wires
//! them to a page.

pub mod countdown;
pub mod delete_guard;
pub mod form_guard;
pub mod option_toggle;
pub mod page_state;

// Re-export main types
pub use countdown::{
    format_clock, CountdownSession, QuizDuration, TickOutcome, TimerSnapshot, TimerStatus,
};
pub use delete_guard::DeleteGuard;
pub use form_guard::{validate_form, FormGuard, ValidationReport};
pub use option_toggle::{OptionToggle, Visibility};
pub use page_state::{attach, Attachment};
