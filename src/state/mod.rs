//! State management module
//! 
//! This module contains the meeting timer state machine and the state shared
//! with the HTTP layer.

pub mod speaker;
pub mod meeting_timer;
pub mod timer_state;
pub mod history;
pub mod app_state;

// Re-export main types
pub use speaker::{speakers_from_names, Speaker, DEFAULT_SPEAKER_NAME};
pub use meeting_timer::{MeetingTimer, SpeakerChangeListener, TickOutcome};
pub use timer_state::TimerState;
pub use history::HistoryEntry;
pub use app_state::AppState;
