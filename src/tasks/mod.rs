//! Background tasks module
//!
//! This module drives time-based behaviors on a tokio runtime.

pub mod quiz_timer;

// Re-export main functions
pub use quiz_timer::{spawn_quiz_timer, QuizTimerHandle};
