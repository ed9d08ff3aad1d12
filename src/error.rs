//! Errors surfaced by the meeting driver front end

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimerError {
    /// The driver task has exited and no longer accepts commands
    #[error("meeting driver is not running")]
    DriverClosed,

    /// The driver dropped the reply channel before answering
    #[error("meeting driver did not answer the {command} request")]
    NoReply { command: &'static str },
}

pub type Result<T> = std::result::Result<T, TimerError>;
