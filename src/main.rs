//! Standup Timer - HTTP-controlled meeting timer
//! 
//! This is the main entry point for the standup-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use standup_timer::{
    api::create_router,
    config::Config,
    state::{AppState, MeetingTimer},
    tasks::{history_recorder_task, speaker_cue_task, MeetingHandle},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("standup_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting standup-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, length={}min, speakers={:?}, tick={}ms",
          config.host, config.port, config.length, config.speakers, config.tick_ms);

    // The driver task owns the timer from here on
    let timer = MeetingTimer::new(config.length, config.speakers.clone());
    let meeting = MeetingHandle::spawn(timer, config.tick_period());
    let state = Arc::new(AppState::new(config.port, config.host.clone(), meeting));

    // Subscribe before anything can start the meeting
    tokio::spawn(speaker_cue_task(state.meeting.subscribe()));
    tokio::spawn(history_recorder_task(Arc::clone(&state), state.meeting.subscribe()));

    if config.autostart {
        state.meeting.start().await?;
        state.record_action("start");
    }

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /meeting/reset - Configure length and speakers");
    info!("  POST /meeting/start - Start the meeting");
    info!("  POST /meeting/skip  - Skip to the next speaker");
    info!("  POST /meeting/stop  - Stop the meeting");
    info!("  GET  /status        - Current timer state");
    info!("  GET  /history       - Recorded meetings");
    info!("  GET  /health        - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Leave the counters where the meeting got to
    if let Err(e) = state.meeting.stop().await {
        warn!("Failed to stop meeting on shutdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
