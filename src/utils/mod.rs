//! Utility functions module
//!
//! This module contains utility functions used by the simulator binary.

pub mod signals;

// Re-export main functions
pub use signals::shutdown_signal;
