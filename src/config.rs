//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

/// Control call to make before the view opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneShot {
    Start,
    Stop,
}

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomodoro-tui")]
#[command(about = "Mirror and control the desktop pomodoro timer from the terminal")]
#[command(version)]
pub struct Config {
    /// Start (or resume) a pomodoro before anything else
    #[arg(short = 's', long)]
    pub start: bool,

    /// Stop the running pomodoro before anything else; ignored with `--start`
    #[arg(short = 'S', long)]
    pub stop: bool,

    /// Silent mode: run the one-shot command and exit without the interactive view
    #[arg(short = 'm', long)]
    pub silent: bool,

    /// In silent mode, print the current timer snapshot as JSON
    #[arg(long, requires = "silent")]
    pub json: bool,

    /// Subscribe to live updates as soon as the view opens
    #[arg(long)]
    pub monitor: bool,

    /// Give up on a bus call after this many seconds (waits forever when unset)
    #[arg(long, value_name = "SECS")]
    pub call_timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// `--start` takes precedence when both flags are given
    pub fn one_shot(&self) -> Option<OneShot> {
        if self.start {
            Some(OneShot::Start)
        } else if self.stop {
            Some(OneShot::Stop)
        } else {
            None
        }
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout.map(Duration::from_secs)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
