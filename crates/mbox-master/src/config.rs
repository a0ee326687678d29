//! Host-side simulation settings.

use mbox_engine::PlayerConfig;
use mbox_ir::Millis;

/// Settings for the simulated board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Output sample rate for offline rendering
    pub sample_rate: u32,
    /// How long a simulated button press is held down
    pub press_ms: Millis,
    /// Upper bound on offline renders
    pub max_render_ms: Millis,
    /// Timing knobs of the core loop
    pub player: PlayerConfig,
}

impl SimConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_press_ms(mut self, ms: Millis) -> Self {
        self.press_ms = ms;
        self
    }

    pub fn with_max_render_ms(mut self, ms: Millis) -> Self {
        self.max_render_ms = ms;
        self
    }

    pub fn with_player(mut self, player: PlayerConfig) -> Self {
        self.player = player;
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            press_ms: 30,
            max_render_ms: 15 * 60 * 1000,
            player: PlayerConfig::DEFAULT,
        }
    }
}
