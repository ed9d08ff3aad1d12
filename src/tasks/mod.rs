//! Background tasks module
//! 
//! This module contains the meeting driver, its tick source, and the tasks
//! that react to meeting events.

pub mod meeting_driver;
pub mod tick_source;
pub mod speaker_cue;
pub mod history_recorder;

// Re-export main types and functions
pub use meeting_driver::{MeetingEvent, MeetingHandle, TimerCommand};
pub use tick_source::{spawn_tick_source, TickSubscription};
pub use speaker_cue::speaker_cue_task;
pub use history_recorder::history_recorder_task;
