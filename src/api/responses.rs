//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{HistoryEntry, TimerState};

/// Body of POST /meeting/reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequest {
    pub length_in_minutes: u32,
    /// Attendee names in speaking order
    #[serde(default)]
    pub speakers: Vec<String>,
}

/// Timer state plus the derived values a display needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    #[serde(flatten)]
    pub state: TimerState,
    pub active_speaker_label: Option<String>,
    pub progress: f64,
    pub minutes_remaining: u64,
}

impl From<TimerState> for TimerView {
    fn from(state: TimerState) -> Self {
        Self {
            active_speaker_label: state.active_speaker_label(),
            progress: state.progress(),
            minutes_remaining: state.minutes_remaining(),
            state,
        }
    }
}

/// API response structure for meeting control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl ApiResponse {
    /// Create a response whose status reflects the timer
    pub fn new(message: String, timer: TimerState) -> Self {
        let status = if timer.running {
            "running"
        } else if timer.is_finished() {
            "finished"
        } else {
            "stopped"
        };

        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer: timer.into(),
        }
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerView,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub meetings: Vec<HistoryEntry>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
