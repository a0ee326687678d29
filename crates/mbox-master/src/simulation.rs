//! Deterministic virtual-time driver for the playback core.
//!
//! Each simulated millisecond does what the board does: the tick interrupt
//! fires once, then the main loop runs one iteration. Nothing here reads the
//! wall clock, so a run is exactly reproducible.

use std::sync::Arc;

use mbox_audio::{Buzzer, SamplePacer};
use mbox_engine::{
    Board, Button, Iteration, PlaybackState, Player, PlayerContext, StatusSnapshot, StepOutcome,
    TimerSettings, TrackData, CHANNELS,
};
use mbox_ir::Millis;

use crate::buttons::{SharedButtons, SimButtons};
use crate::config::SimConfig;
use crate::screen::Screen;

type SimPlayer<'c, T> = Player<'c, T, Buzzer, SharedButtons, Screen>;

/// Counters gathered over a simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    pub iterations: u64,
    pub presses: u64,
    pub events_fired: u64,
    pub redraws: u64,
}

pub struct Simulation<'c, T> {
    player: SimPlayer<'c, T>,
    buttons: Arc<SimButtons>,
    config: SimConfig,
    pacer: SamplePacer,
    audio: Option<Vec<i16>>,
    stats: SimStats,
}

impl<'c, T: TrackData> Simulation<'c, T> {
    pub fn new(ctx: &'c PlayerContext, track: T, config: SimConfig) -> Self {
        let buttons = Arc::new(SimButtons::new());
        let board = Board {
            tones: Buzzer::new(config.sample_rate),
            buttons: SharedButtons(buttons.clone()),
            display: Screen::new(),
        };
        Self {
            player: Player::new(ctx, track, board, config.player),
            buttons,
            config,
            pacer: SamplePacer::new(config.sample_rate),
            audio: None,
            stats: SimStats::default(),
        }
    }

    /// Start collecting buzzer output, discarding anything collected so far.
    pub fn start_recording(&mut self) {
        self.audio = Some(Vec::new());
    }

    /// Stop collecting and return the samples.
    pub fn take_audio(&mut self) -> Vec<i16> {
        self.audio.take().unwrap_or_default()
    }

    /// One tick followed by one loop iteration.
    pub fn step(&mut self) -> Iteration {
        self.player.context().on_tick();
        let it = self.player.poll_once();
        self.buttons.tick();

        if let Some(audio) = self.audio.as_mut() {
            let n = self.pacer.next_tick();
            let start = audio.len();
            audio.resize(start + n, 0);
            self.player.board_mut().tones.render(&mut audio[start..]);
        }

        self.stats.iterations += 1;
        self.stats.presses += it.presses as u64;
        if matches!(it.step, StepOutcome::Fired(_)) {
            self.stats.events_fired += 1;
        }
        if it.redrawn {
            self.stats.redraws += 1;
        }
        it
    }

    pub fn advance(&mut self, ms: Millis) {
        for _ in 0..ms {
            self.step();
        }
    }

    /// Begin holding `button` for the configured press time.
    pub fn press(&mut self, button: Button) {
        self.buttons.hold(button, self.config.press_ms);
    }

    /// Hold `button` for `ms`, advancing time while it is down.
    pub fn hold(&mut self, button: Button, ms: Millis) {
        self.buttons.hold(button, ms);
        self.advance(ms);
    }

    /// Press and release `button`, then wait out the debounce window so the
    /// next click registers too.
    pub fn click(&mut self, button: Button) {
        self.hold(button, self.config.press_ms);
        self.advance(self.config.player.debounce_ms + 1);
    }

    /// Advance until playback stops or `limit_ms` pass. Returns whether it
    /// stopped.
    pub fn run_until_stopped(&mut self, limit_ms: Millis) -> bool {
        for _ in 0..limit_ms {
            self.step();
            if self.state() == PlaybackState::Stopped {
                return true;
            }
        }
        false
    }

    pub fn now(&self) -> Millis {
        self.player.context().now()
    }

    pub fn state(&self) -> PlaybackState {
        self.player.state()
    }

    pub fn status(&self) -> StatusSnapshot {
        self.player.status()
    }

    pub fn cursor(&self) -> usize {
        self.player.sequencer().cursor()
    }

    pub fn screen(&self) -> &Screen {
        &self.player.board().display
    }

    /// Timer settings currently loaded on each buzzer channel.
    pub fn channel_settings(&self) -> [Option<TimerSettings>; CHANNELS] {
        let voices = *self.player.board().tones.voices();
        voices.map(|v| v.settings())
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
