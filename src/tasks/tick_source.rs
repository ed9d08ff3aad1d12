//! Periodic tick delivery into the meeting driver

use std::time::Duration;
use tokio::{
    sync::mpsc::WeakSender,
    task::JoinHandle,
    time::{interval, Instant, MissedTickBehavior},
};
use tracing::debug;

use super::meeting_driver::TimerCommand;

/// Cancellation handle for a running tick source.
///
/// Dropping the subscription aborts the task; ticks it already queued carry
/// its generation so the driver can discard them.
#[derive(Debug)]
pub struct TickSubscription {
    generation: u64,
    handle: JoinHandle<()>,
}

impl TickSubscription {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TickSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn a task that sends a timestamped tick every `period`.
///
/// Only a weak sender is held, so the source never keeps the driver alive.
pub fn spawn_tick_source(
    period: Duration,
    generation: u64,
    commands: WeakSender<TimerCommand>,
) -> TickSubscription {
    let period = period.max(Duration::from_millis(1));

    let handle = tokio::spawn(async move {
        debug!("Tick source {} started ({:?} period)", generation, period);

        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticks.tick().await;

            let Some(commands) = commands.upgrade() else {
                break;
            };
            let tick = TimerCommand::Tick {
                generation,
                at: Instant::now().into_std(),
            };
            if commands.send(tick).await.is_err() {
                break;
            }
        }

        debug!("Tick source {} exited", generation);
    });

    TickSubscription { generation, handle }
}
