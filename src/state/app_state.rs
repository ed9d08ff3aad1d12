//! Main application state management

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::HistoryEntry;
use crate::tasks::MeetingHandle;

/// Oldest meetings are dropped beyond this many entries
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// State shared between the HTTP handlers and the background tasks
#[derive(Debug)]
pub struct AppState {
    /// Front end to the meeting driver task
    pub meeting: MeetingHandle,
    /// Finished meetings, newest first, capped at [`MAX_HISTORY_ENTRIES`]
    pub history: Arc<Mutex<VecDeque<HistoryEntry>>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(port: u16, host: String, meeting: MeetingHandle) -> Self {
        Self {
            meeting,
            history: Arc::new(Mutex::new(VecDeque::new())),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Remember the most recent control action for the status endpoint
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Add a finished meeting to the front of the history
    pub fn record_history(&self, entry: HistoryEntry) -> Result<(), String> {
        let mut history = self.history.lock()
            .map_err(|e| format!("Failed to lock history: {}", e))?;

        history.push_front(entry);
        history.truncate(MAX_HISTORY_ENTRIES);
        debug!("History now holds {} meetings", history.len());
        Ok(())
    }

    pub fn get_history(&self) -> Result<Vec<HistoryEntry>, String> {
        self.history.lock()
            .map(|history| history.iter().cloned().collect())
            .map_err(|e| format!("Failed to lock history: {}", e))
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
