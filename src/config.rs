//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "standup-timer")]
#[command(about = "A standup meeting timer that rotates speakers over a fixed meeting length")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Meeting length in minutes
    #[arg(short, long, default_value = "15")]
    pub length: u32,

    /// Attendee names in speaking order (repeat or separate with commas)
    #[arg(short, long = "speaker", value_delimiter = ',')]
    pub speakers: Vec<String>,

    /// Milliseconds between timer ticks
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Start the meeting as soon as the server is up
    #[arg(long)]
    pub autostart: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
