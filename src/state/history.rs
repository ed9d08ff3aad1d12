//! Record of finished meetings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TimerState;

/// One past meeting, captured from the timer's final state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub attendees: Vec<String>,
    pub length_in_minutes: u32,
    pub seconds_elapsed: u64,
    pub completed_speakers: usize,
    /// False when the meeting was stopped before its time ran out
    pub finished: bool,
}

impl HistoryEntry {
    pub fn from_final_state(state: &TimerState, finished: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now(),
            attendees: state.speakers.iter().map(|s| s.name().to_string()).collect(),
            length_in_minutes: state.length_in_minutes,
            seconds_elapsed: state.seconds_elapsed,
            completed_speakers: state.completed_speakers(),
            finished,
        }
    }
}
