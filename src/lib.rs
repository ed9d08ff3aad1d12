//! Standup Timer - Divides a meeting evenly among its speakers
//! 
//! This library provides the meeting timer state machine, the serialized
//! driver that feeds it ticks and control requests, and an HTTP API to
//! control a meeting.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, MeetingTimer, TimerState};
pub use tasks::{MeetingEvent, MeetingHandle};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
