//! Meeting attendee taking a turn to speak

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name given to the single speaker of a meeting configured without attendees
pub const DEFAULT_SPEAKER_NAME: &str = "Speaker 1";

/// One attendee in the speaking rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    id: Uuid,
    name: String,
    completed: bool,
}

impl Speaker {
    /// Create a speaker who has not spoken yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            completed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the timer has moved past this speaker
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
    }

    pub(crate) fn clear_completed(&mut self) {
        self.completed = false;
    }
}

/// Build the speaking order from attendee names.
///
/// An empty list yields a single [`DEFAULT_SPEAKER_NAME`] entry so the
/// rotation always has somebody to time.
pub fn speakers_from_names<I, S>(names: I) -> Vec<Speaker>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let speakers: Vec<Speaker> = names.into_iter().map(Speaker::new).collect();
    if speakers.is_empty() {
        vec![Speaker::new(DEFAULT_SPEAKER_NAME)]
    } else {
        speakers
    }
}
