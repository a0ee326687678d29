//! Playback core for the musicbox firmware.
//!
//! A single 1 ms tick drives a cooperative scheduler: the tick interrupt
//! counts time in a shared [`PlayerContext`], and the main loop
//! ([`Player::poll_once`]) debounces the buttons, steps the sequencer that
//! programs the four tone channels, and throttles redraws of the status
//! screen so they never hold up playback.
//!
//! Peripherals are reached only through [`ToneOutput`] / [`TimerChannel`],
//! [`ButtonInput`] and [`TextDisplay`], so the same core runs on the board
//! and in the host simulator.

#![cfg_attr(not(feature = "std"), no_std)]

mod config;
mod context;
mod debounce;
mod display;
mod player;
mod sequencer;
mod tone;

#[cfg(test)]
mod test_support;

pub use config::PlayerConfig;
pub use context::{PlaybackState, PlayerContext};
pub use debounce::{Button, ButtonInput, Debouncer, PressEvent, DEBOUNCE_MS};
pub use display::{
    centered_col, fit, render_status, DisplayThrottle, Line, RefreshDecision, StatusSnapshot,
    TextDisplay, BAR_CELLS, IDLE_REFRESH_MS, PLAYING_REFRESH_MS, ROWS,
};
pub use player::{halt, Board, Iteration, Player, TickSourceError};
pub use sequencer::{Command, Sequencer, StepOutcome};
pub use tone::{
    ChannelBank, TimerChannel, TimerSettings, ToneOutput, PERIOD_MAX, PERIOD_MIN, TIMER_CLOCK_HZ,
};

pub use mbox_ir::{StaticTrack, ToneEvent, TrackData, CHANNELS};
