//! History recording background task

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, HistoryEntry, TimerState};
use super::meeting_driver::MeetingEvent;

/// Background task that records a history entry whenever a meeting ends
pub async fn history_recorder_task(state: Arc<AppState>, mut events: broadcast::Receiver<MeetingEvent>) {
    info!("Starting history recorder task");

    loop {
        match events.recv().await {
            Ok(MeetingEvent::Finished(timer)) => record(&state, &timer, true),
            Ok(MeetingEvent::Stopped(timer)) => record(&state, &timer, false),
            Ok(MeetingEvent::SpeakerChanged(_)) => {}
            Err(RecvError::Lagged(missed)) => {
                warn!("History recorder fell behind, {} events missed", missed);
            }
            Err(RecvError::Closed) => {
                debug!("Meeting events closed, history recorder exiting");
                break;
            }
        }
    }
}

fn record(state: &AppState, timer: &TimerState, finished: bool) {
    let entry = HistoryEntry::from_final_state(timer, finished);
    info!(
        "Recording meeting history: {} attendees, {}s elapsed, finished={}",
        entry.attendees.len(),
        entry.seconds_elapsed,
        finished
    );

    if let Err(e) = state.record_history(entry) {
        error!("Failed to record meeting history: {}", e);
    }
}
