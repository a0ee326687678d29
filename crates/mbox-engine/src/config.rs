//! Player timing configuration.

use mbox_ir::Millis;

use crate::debounce::DEBOUNCE_MS;
use crate::display::{IDLE_REFRESH_MS, PLAYING_REFRESH_MS};

/// Timing knobs for the main loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Minimum spacing between accepted presses of one button
    pub debounce_ms: Millis,
    /// Screen refresh interval while playing
    pub playing_refresh_ms: Millis,
    /// Screen refresh interval while paused or stopped
    pub idle_refresh_ms: Millis,
}

impl PlayerConfig {
    pub const DEFAULT: Self = Self {
        debounce_ms: DEBOUNCE_MS,
        playing_refresh_ms: PLAYING_REFRESH_MS,
        idle_refresh_ms: IDLE_REFRESH_MS,
    };

    pub const fn with_debounce_ms(mut self, ms: Millis) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub const fn with_playing_refresh_ms(mut self, ms: Millis) -> Self {
        self.playing_refresh_ms = ms;
        self
    }

    pub const fn with_idle_refresh_ms(mut self, ms: Millis) -> Self {
        self.idle_refresh_ms = ms;
        self
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
