//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "quizmaster-page")]
#[command(about = "Replay user interactions against a quiz page with its behaviors attached")]
#[command(version = "0.1.0")]
pub struct Config {
    /// JSON fixture describing the rendered page body
    #[arg(short, long)]
    pub page: PathBuf,

    /// JSON array of steps to replay
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// JSON overrides for the markup hooks and dialog texts
    #[arg(short, long)]
    pub markup: Option<PathBuf>,

    /// Quiz timer tick period in milliseconds
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,

    /// Decline confirmation dialogs that the script did not answer
    #[arg(long)]
    pub decline: bool,

    /// Keep running after the script until the quiz timer finishes
    #[arg(short, long)]
    pub wait_for_timer: bool,

    /// Pretty-print the transcript
    #[arg(long)]
    pub pretty: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
