//! Playback state machine over the event list.
//!
//! The sequencer owns the cursor into the track and every state
//! transition. Timing comes from the shared [`PlayerContext`]: the tick
//! interrupt counts the current event's delay down, and [`Sequencer::step`]
//! fires the next event once it reaches zero.

use mbox_ir::{TrackData, CHANNELS};

use crate::context::{PlaybackState, PlayerContext};
use crate::debounce::Button;
use crate::tone::ToneOutput;

/// A transport command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Restart the track from the beginning
    Start,
    /// Stop and rewind
    Stop,
    /// Hold the current position
    Pause,
    /// Continue from the held position
    Resume,
}

impl Command {
    /// Map a button press to a command for the current state.
    ///
    /// Button 1 toggles start/stop; button 2 toggles pause/resume and does
    /// nothing while stopped.
    pub fn for_press(button: Button, state: PlaybackState) -> Option<Self> {
        match (button, state) {
            (Button::StartStop, PlaybackState::Stopped) => Some(Command::Start),
            (Button::StartStop, _) => Some(Command::Stop),
            (Button::PauseResume, PlaybackState::Playing) => Some(Command::Pause),
            (Button::PauseResume, PlaybackState::Paused) => Some(Command::Resume),
            (Button::PauseResume, PlaybackState::Stopped) => None,
        }
    }
}

/// What one call to [`Sequencer::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not playing; channels re-silenced
    Idle,
    /// Current event still holding
    Waiting,
    /// Event at this index was programmed
    Fired(usize),
    /// Ran off the end of the track and stopped
    Finished,
}

/// Cursor-based sequencer over a read-only track.
pub struct Sequencer<T> {
    track: T,
    cursor: usize,
}

impl<T: TrackData> Sequencer<T> {
    pub fn new(track: T) -> Self {
        Self { track, cursor: 0 }
    }

    pub fn track(&self) -> &T {
        &self.track
    }

    /// Index of the next event to fire.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply a transport command. Returns `false` if it did not apply to the
    /// current state.
    pub fn apply(&mut self, cmd: Command, ctx: &PlayerContext, out: &mut impl ToneOutput) -> bool {
        let state = ctx.state();
        match cmd {
            Command::Start if state != PlaybackState::Playing => {
                self.rewind(ctx);
                // load the first event on the very next step
                ctx.reload_delay(1);
                ctx.set_state(PlaybackState::Playing);
                log::info!("playback started ({} events)", self.track.event_count());
            }
            Command::Stop if state != PlaybackState::Stopped => {
                self.stop(ctx, out);
                log::info!("playback stopped");
            }
            Command::Pause if state == PlaybackState::Playing => {
                // the next step's idle guard silences the channels
                ctx.set_state(PlaybackState::Paused);
                log::debug!("paused at event {} ({} ms)", self.cursor, ctx.playback_ms());
            }
            Command::Resume if state == PlaybackState::Paused => {
                ctx.set_state(PlaybackState::Playing);
                log::debug!("resumed at event {} ({} ms)", self.cursor, ctx.playback_ms());
            }
            _ => return false,
        }
        true
    }

    /// Advance playback by one main-loop pass.
    pub fn step(&mut self, ctx: &PlayerContext, out: &mut impl ToneOutput) -> StepOutcome {
        if ctx.state() != PlaybackState::Playing {
            out.all_off();
            return StepOutcome::Idle;
        }

        if ctx.delay_remaining() != 0 {
            return StepOutcome::Waiting;
        }

        let event = if self.cursor < self.track.event_count() {
            self.track.event_at(self.cursor)
        } else {
            None
        };
        let Some(event) = event else {
            log::info!("end of track after {} events", self.cursor);
            self.stop(ctx, out);
            ctx.request_redraw();
            return StepOutcome::Finished;
        };

        for channel in 0..CHANNELS {
            out.set_frequency(channel, event.freq[channel]);
        }
        ctx.reload_delay(event.hold_ms());

        let fired = self.cursor;
        self.cursor += 1;
        StepOutcome::Fired(fired)
    }

    fn stop(&mut self, ctx: &PlayerContext, out: &mut impl ToneOutput) {
        ctx.set_state(PlaybackState::Stopped);
        out.all_off();
        self.rewind(ctx);
    }

    fn rewind(&mut self, ctx: &PlayerContext) {
        self.cursor = 0;
        ctx.reset_playback_clock();
    }
}
