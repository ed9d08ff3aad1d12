//! Speaker cue background task

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use super::meeting_driver::MeetingEvent;

/// Background task that announces each change of speaker.
///
/// Stands in for an audio cue: whatever plays the sound hangs off this task.
pub async fn speaker_cue_task(mut events: broadcast::Receiver<MeetingEvent>) {
    info!("Starting speaker cue task");

    loop {
        match events.recv().await {
            Ok(MeetingEvent::SpeakerChanged(state)) => match state.active_speaker_label() {
                Some(label) => info!(
                    "Cue: {} ({}s left in meeting)",
                    label, state.seconds_remaining
                ),
                None => info!("Cue: last speaker done"),
            },
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => {
                warn!("Speaker cue task fell behind, {} events missed", missed);
            }
            Err(RecvError::Closed) => {
                debug!("Meeting events closed, speaker cue task exiting");
                break;
            }
        }
    }
}
