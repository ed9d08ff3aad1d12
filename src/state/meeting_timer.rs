//! Meeting timer state machine
//!
//! The meeting length is split evenly across the speaker rotation. A turn
//! ends when its share of time runs out or when a skip is requested. Elapsed
//! time is never accumulated tick by tick: every tick recomputes it from the
//! active speaker's position and the instant the current turn began.

use std::{fmt, time::Instant};
use tracing::{debug, info};

use super::{speakers_from_names, Speaker, TimerState};

/// Receives the "speaker changed" signal.
///
/// Listeners run synchronously inside the transition that fired them, so the
/// state they observe always matches the new active speaker.
pub trait SpeakerChangeListener: Send {
    fn speaker_changed(&mut self, state: &TimerState);
}

impl<F> SpeakerChangeListener for F
where
    F: FnMut(&TimerState) + Send,
{
    fn speaker_changed(&mut self, state: &TimerState) {
        self(state)
    }
}

/// What a single tick did to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is not running
    Ignored,
    /// Counters refreshed, same speaker
    Updated,
    /// The active speaker's share ran out and the next one took over
    SpeakerChanged,
    /// The meeting is over and the timer has stopped
    Finished,
}

/// Owns the speaker rotation and all time accounting for one meeting
pub struct MeetingTimer {
    speakers: Vec<Speaker>,
    length_in_minutes: u32,
    seconds_per_speaker: u64,
    active_index: usize,
    seconds_elapsed: u64,
    seconds_remaining: u64,
    turn_started_at: Option<Instant>,
    running: bool,
    listeners: Vec<Box<dyn SpeakerChangeListener>>,
}

impl MeetingTimer {
    /// Create a stopped timer for the given length and speaking order
    pub fn new<I, S>(length_in_minutes: u32, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut timer = Self {
            speakers: Vec::new(),
            length_in_minutes: 0,
            seconds_per_speaker: 0,
            active_index: 0,
            seconds_elapsed: 0,
            seconds_remaining: 0,
            turn_started_at: None,
            running: false,
            listeners: Vec::new(),
        };
        timer.reset(length_in_minutes, names);
        timer
    }

    /// Reinitialize for a new meeting. Listeners stay subscribed.
    pub fn reset<I, S>(&mut self, length_in_minutes: u32, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.speakers = speakers_from_names(names);
        self.length_in_minutes = length_in_minutes;
        self.seconds_per_speaker = self.length_in_seconds() / self.speakers.len() as u64;
        self.active_index = 0;
        self.seconds_elapsed = 0;
        self.seconds_remaining = self.length_in_seconds();
        self.turn_started_at = None;
        self.running = false;

        debug!(
            "Timer reset: {} speakers, {}min, {}s per speaker",
            self.speakers.len(),
            self.length_in_minutes,
            self.seconds_per_speaker
        );
    }

    /// Start the meeting with the first speaker and fire the speaker-change signal
    pub fn start(&mut self, now: Instant) {
        for speaker in &mut self.speakers {
            speaker.clear_completed();
        }
        self.running = true;
        self.begin_turn(0, now);

        info!(
            "Meeting started: {}min across {} speakers",
            self.length_in_minutes,
            self.speakers.len()
        );
        self.notify_speaker_changed();
    }

    /// Stop the meeting, keeping the counters where they are
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            info!(
                "Meeting stopped: {}s elapsed, {}s remaining",
                self.seconds_elapsed, self.seconds_remaining
            );
        }
    }

    /// Recompute the counters for `now` and rotate speakers when a turn runs out.
    ///
    /// At most one speaker transition happens per tick.
    pub fn on_tick(&mut self, now: Instant) -> TickOutcome {
        if !self.running {
            return TickOutcome::Ignored;
        }
        let Some(turn_started_at) = self.turn_started_at else {
            return TickOutcome::Ignored;
        };
        if self.active_index >= self.speakers.len() {
            self.finish();
            return TickOutcome::Finished;
        }

        let elapsed_for_speaker = now.saturating_duration_since(turn_started_at).as_secs();
        let length = self.length_in_seconds();
        let baseline = self.turn_baseline(self.active_index);
        self.seconds_elapsed = (baseline + elapsed_for_speaker).min(length);
        self.seconds_remaining = length - self.seconds_elapsed;

        if self.seconds_remaining == 0 {
            self.finish();
            return TickOutcome::Finished;
        }

        if elapsed_for_speaker >= self.seconds_per_speaker {
            self.advance(now);
            self.notify_speaker_changed();
            return if self.running {
                TickOutcome::SpeakerChanged
            } else {
                TickOutcome::Finished
            };
        }

        TickOutcome::Updated
    }

    /// End the active speaker's turn early.
    ///
    /// Returns false, changing nothing, when the timer is not running.
    pub fn skip_speaker(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        debug!("Skipping speaker {}", self.active_index + 1);
        self.advance(now);
        self.notify_speaker_changed();
        true
    }

    /// Register a listener for the speaker-change signal
    pub fn subscribe(&mut self, listener: impl SpeakerChangeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    pub fn length_in_minutes(&self) -> u32 {
        self.length_in_minutes
    }

    pub fn seconds_per_speaker(&self) -> u64 {
        self.seconds_per_speaker
    }

    pub fn seconds_elapsed(&self) -> u64 {
        self.seconds_elapsed
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Index of the active speaker, `None` after the last turn
    pub fn active_index(&self) -> Option<usize> {
        (self.active_index < self.speakers.len()).then_some(self.active_index)
    }

    pub fn active_speaker(&self) -> Option<&Speaker> {
        self.speakers.get(self.active_index)
    }

    /// Copy of the readable state
    pub fn state(&self) -> TimerState {
        TimerState {
            running: self.running,
            length_in_minutes: self.length_in_minutes,
            seconds_per_speaker: self.seconds_per_speaker,
            seconds_elapsed: self.seconds_elapsed,
            seconds_remaining: self.seconds_remaining,
            active_index: self.active_index(),
            active_speaker: self.active_speaker().map(|s| s.name().to_string()),
            speakers: self.speakers.clone(),
        }
    }

    fn length_in_seconds(&self) -> u64 {
        u64::from(self.length_in_minutes) * 60
    }

    fn turn_baseline(&self, index: usize) -> u64 {
        self.seconds_per_speaker * index as u64
    }

    fn begin_turn(&mut self, index: usize, now: Instant) {
        let length = self.length_in_seconds();
        self.active_index = index;
        self.turn_started_at = Some(now);
        self.seconds_elapsed = self.turn_baseline(index).min(length);
        self.seconds_remaining = length - self.seconds_elapsed;
    }

    /// Shared by budget exhaustion and skip
    fn advance(&mut self, now: Instant) {
        if let Some(speaker) = self.speakers.get_mut(self.active_index) {
            speaker.mark_completed();
        }

        let next = self.active_index + 1;
        if next >= self.speakers.len() {
            self.finish();
        } else {
            self.begin_turn(next, now);
            debug!(
                "Speaker {} of {} now speaking",
                next + 1,
                self.speakers.len()
            );
        }
    }

    /// Terminal state: every turn is over and the remainder is absorbed
    fn finish(&mut self) {
        for speaker in &mut self.speakers {
            speaker.mark_completed();
        }
        self.active_index = self.speakers.len();
        self.seconds_elapsed = self.length_in_seconds();
        self.seconds_remaining = 0;
        self.turn_started_at = None;
        self.running = false;
        info!("Meeting finished after {} speakers", self.speakers.len());
    }

    fn notify_speaker_changed(&mut self) {
        let state = self.state();
        for listener in self.listeners.iter_mut() {
            listener.speaker_changed(&state);
        }
    }
}

impl fmt::Debug for MeetingTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeetingTimer")
            .field("speakers", &self.speakers)
            .field("length_in_minutes", &self.length_in_minutes)
            .field("seconds_per_speaker", &self.seconds_per_speaker)
            .field("active_index", &self.active_index)
            .field("seconds_elapsed", &self.seconds_elapsed)
            .field("seconds_remaining", &self.seconds_remaining)
            .field("running", &self.running)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
