//! Readable view of the meeting timer

use serde::{Deserialize, Serialize};

use super::Speaker;

/// Point-in-time copy of everything collaborators may read from the timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub running: bool,
    pub length_in_minutes: u32,
    pub seconds_per_speaker: u64,
    pub seconds_elapsed: u64,
    pub seconds_remaining: u64,
    /// `None` once every speaker has had their turn
    pub active_index: Option<usize>,
    pub active_speaker: Option<String>,
    pub speakers: Vec<Speaker>,
}

impl TimerState {
    /// Display label for the active speaker, e.g. "Speaker 2: Bo"
    pub fn active_speaker_label(&self) -> Option<String> {
        let index = self.active_index?;
        let name = self.active_speaker.as_deref()?;
        Some(format!("Speaker {}: {}", index + 1, name))
    }

    /// Fraction of the meeting that has elapsed, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        let total = self.seconds_elapsed + self.seconds_remaining;
        if total == 0 {
            return 1.0;
        }
        self.seconds_elapsed as f64 / total as f64
    }

    pub fn minutes_remaining(&self) -> u64 {
        self.seconds_remaining / 60
    }

    /// True once the rotation has moved past the last speaker
    pub fn is_finished(&self) -> bool {
        self.active_index.is_none()
    }

    pub fn completed_speakers(&self) -> usize {
        self.speakers.iter().filter(|s| s.is_completed()).count()
    }
}
