//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::state::LAST_SEEN_THRESHOLD_SECONDS;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "valve-timer")]
#[command(about = "Remote control client for a network-attached irrigation valve")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Port for the local control API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address for the local control API
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Base URL of the timer collection on the REST backend
    #[arg(long, env = "RESTDB_URL")]
    pub restdb_url: String,

    /// Static API key sent with every backend request
    #[arg(long, env = "RESTDB_KEY", hide_env_values = true)]
    pub restdb_key: String,

    /// Path of the JSON settings file
    #[arg(long, default_value = "valve-timer.json")]
    pub settings: PathBuf,

    /// Seconds between backend fetches
    #[arg(long, default_value = "10")]
    pub poll_interval: u64,

    /// Seconds without a device check-in before it counts as disconnected
    #[arg(long, default_value = "10")]
    pub last_seen_threshold: u64,

    /// Milliseconds between scheduler ticks
    #[arg(long, default_value = "1000")]
    pub tick_millis: u64,

    /// Backend request timeout in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout: u64,

    /// Valve name used when none has been saved yet
    #[arg(long, default_value = "valve")]
    pub default_valve_name: String,

    /// Run length in minutes used when none has been saved yet
    #[arg(long, default_value = "10")]
    pub default_length: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the control API address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn polling(&self) -> PollingConfig {
        PollingConfig {
            poll_interval_seconds: self.poll_interval as i64,
            last_seen_threshold_seconds: self.last_seen_threshold as i64,
            tick_period: Duration::from_millis(self.tick_millis),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Scheduler knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    pub poll_interval_seconds: i64,
    pub last_seen_threshold_seconds: i64,
    pub tick_period: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 10,
            last_seen_threshold_seconds: LAST_SEEN_THRESHOLD_SECONDS,
            tick_period: Duration::from_secs(1),
        }
    }
}
