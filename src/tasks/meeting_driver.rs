//! Serialized owner of the meeting timer
//!
//! Every input to the timer (ticks, start, skip, stop and reset) arrives as a
//! [`TimerCommand`] on one channel and is applied by a single task, so no two
//! transitions are ever computed from the same stale state.

use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, trace};

use crate::{
    error::{Result, TimerError},
    state::{MeetingTimer, TickOutcome, TimerState},
};
use super::tick_source::{spawn_tick_source, TickSubscription};

const COMMAND_CHANNEL_CAPACITY: usize = 64;
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Input to the meeting driver
pub enum TimerCommand {
    Reset {
        length_in_minutes: u32,
        speakers: Vec<String>,
        reply: oneshot::Sender<TimerState>,
    },
    Start {
        reply: oneshot::Sender<TimerState>,
    },
    Skip {
        reply: oneshot::Sender<TimerState>,
    },
    Stop {
        reply: oneshot::Sender<TimerState>,
    },
    /// Time has passed; `generation` identifies the tick source that sent it
    Tick { generation: u64, at: Instant },
}

/// Notifications broadcast to collaborators
#[derive(Debug, Clone)]
pub enum MeetingEvent {
    /// A new speaker took over, or the last turn ended
    SpeakerChanged(TimerState),
    /// Every turn is over and the timer stopped on its own
    Finished(TimerState),
    /// The meeting was stopped before it finished
    Stopped(TimerState),
}

/// Cloneable front end to a running meeting driver
#[derive(Debug, Clone)]
pub struct MeetingHandle {
    commands: mpsc::Sender<TimerCommand>,
    state_rx: watch::Receiver<TimerState>,
    events_tx: broadcast::Sender<MeetingEvent>,
}

impl MeetingHandle {
    /// Move the timer into its own driver task and return a handle to it
    pub fn spawn(timer: MeetingTimer, tick_period: Duration) -> Self {
        let (commands, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(timer.state());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let driver = MeetingDriver::new(
            timer,
            commands.downgrade(),
            state_tx,
            events_tx.clone(),
            tick_period,
        );
        tokio::spawn(driver.run(commands_rx));

        Self {
            commands,
            state_rx,
            events_tx,
        }
    }

    pub async fn reset(&self, length_in_minutes: u32, speakers: Vec<String>) -> Result<TimerState> {
        self.request("reset", |reply| TimerCommand::Reset {
            length_in_minutes,
            speakers,
            reply,
        })
        .await
    }

    pub async fn start(&self) -> Result<TimerState> {
        self.request("start", |reply| TimerCommand::Start { reply }).await
    }

    pub async fn skip(&self) -> Result<TimerState> {
        self.request("skip", |reply| TimerCommand::Skip { reply }).await
    }

    pub async fn stop(&self) -> Result<TimerState> {
        self.request("stop", |reply| TimerCommand::Stop { reply }).await
    }

    /// Latest state published by the driver
    pub fn state(&self) -> TimerState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that is notified whenever the published state changes
    pub fn watch(&self) -> watch::Receiver<TimerState> {
        self.state_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MeetingEvent> {
        self.events_tx.subscribe()
    }

    async fn request<F>(&self, command: &'static str, build: F) -> Result<TimerState>
    where
        F: FnOnce(oneshot::Sender<TimerState>) -> TimerCommand,
    {
        let (reply, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| TimerError::DriverClosed)?;
        reply_rx.await.map_err(|_| TimerError::NoReply { command })
    }
}

struct MeetingDriver {
    timer: MeetingTimer,
    commands: mpsc::WeakSender<TimerCommand>,
    state_tx: watch::Sender<TimerState>,
    events_tx: broadcast::Sender<MeetingEvent>,
    tick_period: Duration,
    ticks: Option<TickSubscription>,
    next_generation: u64,
}

impl MeetingDriver {
    fn new(
        mut timer: MeetingTimer,
        commands: mpsc::WeakSender<TimerCommand>,
        state_tx: watch::Sender<TimerState>,
        events_tx: broadcast::Sender<MeetingEvent>,
        tick_period: Duration,
    ) -> Self {
        let speaker_events = events_tx.clone();
        timer.subscribe(move |state: &TimerState| {
            // Having no receivers is fine
            let _ = speaker_events.send(MeetingEvent::SpeakerChanged(state.clone()));
        });

        Self {
            timer,
            commands,
            state_tx,
            events_tx,
            tick_period,
            ticks: None,
            next_generation: 0,
        }
    }

    async fn run(mut self, mut commands_rx: mpsc::Receiver<TimerCommand>) {
        info!("Starting meeting driver");

        while let Some(command) = commands_rx.recv().await {
            self.handle(command);
        }

        info!("Meeting driver stopped: all handles dropped");
    }

    fn handle(&mut self, command: TimerCommand) {
        match command {
            TimerCommand::Tick { generation, at } => self.on_tick(generation, at),
            TimerCommand::Reset {
                length_in_minutes,
                speakers,
                reply,
            } => {
                // A meeting in progress ends here, not silently
                self.stop();
                self.timer.reset(length_in_minutes, speakers);
                self.reply(reply);
            }
            TimerCommand::Start { reply } => {
                self.stop();
                self.start();
                self.reply(reply);
            }
            TimerCommand::Skip { reply } => {
                self.skip();
                self.reply(reply);
            }
            TimerCommand::Stop { reply } => {
                self.stop();
                self.reply(reply);
            }
        }
    }

    fn start(&mut self) {
        // Replacing the subscription cancels the previous tick source
        self.next_generation += 1;
        self.timer.start(now());
        self.ticks = Some(spawn_tick_source(
            self.tick_period,
            self.next_generation,
            self.commands.clone(),
        ));
    }

    fn skip(&mut self) {
        if !self.timer.skip_speaker(now()) {
            debug!("Skip ignored, meeting is not running");
            return;
        }
        if !self.timer.is_running() {
            self.emit(MeetingEvent::Finished(self.timer.state()));
        }
    }

    fn stop(&mut self) {
        if !self.timer.is_running() {
            return;
        }
        self.timer.stop();
        self.emit(MeetingEvent::Stopped(self.timer.state()));
    }

    fn on_tick(&mut self, generation: u64, at: Instant) {
        let current = self.ticks.as_ref().map(TickSubscription::generation);
        if current != Some(generation) {
            trace!("Dropping tick from cancelled source {}", generation);
            return;
        }

        let outcome = self.timer.on_tick(at);
        let state = self.publish();
        if outcome == TickOutcome::Finished {
            self.emit(MeetingEvent::Finished(state));
        }
    }

    fn reply(&mut self, reply: oneshot::Sender<TimerState>) {
        let state = self.publish();
        if reply.send(state).is_err() {
            debug!("Requester went away before the reply was sent");
        }
    }

    /// Publish the current state, detaching from the tick source once stopped
    fn publish(&mut self) -> TimerState {
        if !self.timer.is_running() {
            if let Some(ticks) = self.ticks.take() {
                debug!("Detached tick source {}", ticks.generation());
            }
        }

        let state = self.timer.state();
        self.state_tx.send_replace(state.clone());
        state
    }

    fn emit(&self, event: MeetingEvent) {
        if self.events_tx.send(event).is_err() {
            debug!("No listeners for meeting event");
        }
    }
}

/// Current time on the tokio clock
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(250);

    fn spawn(length_in_minutes: u32, names: &[&str]) -> MeetingHandle {
        MeetingHandle::spawn(MeetingTimer::new(length_in_minutes, names.iter().copied()), TICK)
    }

    async fn next_speaker_change(events: &mut broadcast::Receiver<MeetingEvent>) -> TimerState {
        loop {
            if let MeetingEvent::SpeakerChanged(state) = events.recv().await.unwrap() {
                return state;
            }
        }
    }

    async fn next_finished(events: &mut broadcast::Receiver<MeetingEvent>) -> TimerState {
        loop {
            if let MeetingEvent::Finished(state) = events.recv().await.unwrap() {
                return state;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_rotate_to_the_next_speaker() {
        let handle = spawn(6, &["A", "B", "C"]);
        let mut events = handle.subscribe();

        let started = handle.start().await.unwrap();
        assert!(started.running);
        assert_eq!(started.active_speaker.as_deref(), Some("A"));
        assert_eq!(started.seconds_remaining, 360);
        assert_eq!(
            next_speaker_change(&mut events).await.active_speaker.as_deref(),
            Some("A")
        );

        let changed = next_speaker_change(&mut events).await;
        assert_eq!(changed.active_speaker.as_deref(), Some("B"));
        assert_eq!(changed.seconds_elapsed, 120);
        assert_eq!(changed.seconds_remaining, 240);
        assert!(changed.speakers[0].is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn skipping_everyone_finishes_the_meeting() {
        let handle = spawn(6, &["A", "B", "C"]);
        let mut events = handle.subscribe();

        handle.start().await.unwrap();
        handle.skip().await.unwrap();
        handle.skip().await.unwrap();
        let last = handle.skip().await.unwrap();

        assert!(!last.running);
        assert_eq!(last.active_index, None);
        assert_eq!(last.completed_speakers(), 3);

        let finished = next_finished(&mut events).await;
        assert_eq!(finished.seconds_remaining, 0);

        // Terminal skip is a no-op
        assert_eq!(handle.skip().await.unwrap(), last);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_detaches_the_tick_source() {
        let handle = spawn(6, &["A", "B", "C"]);
        let mut events = handle.subscribe();

        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        let stopped = handle.stop().await.unwrap();
        assert!(!stopped.running);
        assert!(stopped.seconds_elapsed >= 29);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(handle.state(), stopped);
        assert_eq!(handle.stop().await.unwrap(), stopped);

        next_speaker_change(&mut events).await;
        assert!(matches!(
            events.recv().await.unwrap(),
            MeetingEvent::Stopped(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_length_meeting_finishes_on_the_first_tick() {
        let handle = spawn(0, &["A", "B"]);
        let mut events = handle.subscribe();

        handle.start().await.unwrap();
        let finished = next_finished(&mut events).await;

        assert!(!finished.running);
        assert_eq!(finished.seconds_remaining, 0);
        assert_eq!(finished.completed_speakers(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_or_restart_ends_the_running_meeting() {
        let handle = spawn(6, &["A", "B", "C"]);
        let mut events = handle.subscribe();

        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        handle.reset(6, vec!["X".to_string()]).await.unwrap();

        let stopped = loop {
            if let MeetingEvent::Stopped(state) = events.recv().await.unwrap() {
                break state;
            }
        };
        assert_eq!(stopped.speakers.len(), 3);
        assert_eq!(stopped.active_speaker.as_deref(), Some("A"));
        assert!(stopped.seconds_elapsed >= 29);

        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.start().await.unwrap();

        let restarted = loop {
            if let MeetingEvent::Stopped(state) = events.recv().await.unwrap() {
                break state;
            }
        };
        assert_eq!(restarted.speakers.len(), 1);
        assert_eq!(restarted.active_speaker.as_deref(), Some("X"));
        assert!(restarted.seconds_elapsed >= 4);
        assert!(handle.state().running);

        // Reset of a stopped meeting has nothing to end
        handle.stop().await.unwrap();
        while !matches!(events.recv().await.unwrap(), MeetingEvent::Stopped(_)) {}
        handle.reset(6, Vec::new()).await.unwrap();
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_replaces_the_roster() {
        let handle = spawn(6, &["A", "B", "C"]);
        handle.start().await.unwrap();

        let state = handle.reset(10, Vec::new()).await.unwrap();
        assert!(!state.running);
        assert_eq!(state.speakers.len(), 1);
        assert_eq!(state.seconds_per_speaker, 600);
        assert_eq!(handle.state(), state);
        assert_eq!(*handle.watch().borrow(), state);

        // Ticks from the old meeting no longer move the counters
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(handle.state().seconds_elapsed, 0);
    }
}
