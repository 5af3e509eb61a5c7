//! Quizmaster page behaviors
//!
//! Client-side behaviors for server-rendered quiz pages: required-field
//! validation on submit, a countdown that auto-submits the quiz, option
//! panel toggles and delete confirmation. The behaviors run against the
//! [`dom`] capability traits, so the same code drives a browser page on
//! `wasm32` and an in-memory page in tests and the simulator.

pub mod dom;
pub mod error;
pub mod markup;
pub mod state;

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod simulator;
#[cfg(not(target_arch = "wasm32"))]
pub mod tasks;
#[cfg(not(target_arch = "wasm32"))]
pub mod utils;

// Re-export commonly used types
pub use dom::{memory::MemoryPage, Dialogs, Document, ElementId, Page};
pub use error::BehaviorError;
pub use markup::Markup;
pub use state::{attach, Attachment};
#[cfg(not(target_arch = "wasm32"))]
pub use config::Config;
#[cfg(not(target_arch = "wasm32"))]
pub use utils::signals::shutdown_signal;
