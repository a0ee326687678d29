//! Main dispatch loop.
//!
//! One iteration polls both buttons, turns accepted presses into sequencer
//! commands, runs one sequencer step and then lets the display throttle
//! decide on a redraw. Nothing in here waits; every delay is a counter that
//! a later iteration checks again.

use core::fmt;

use mbox_ir::TrackData;

use crate::config::PlayerConfig;
use crate::context::{PlaybackState, PlayerContext};
use crate::debounce::{Button, ButtonInput, Debouncer, PressEvent};
use crate::display::{render_status, DisplayThrottle, StatusSnapshot, TextDisplay};
use crate::sequencer::{Command, Sequencer, StepOutcome};
use crate::tone::ToneOutput;

/// The peripherals the loop drives.
#[derive(Debug, Default)]
pub struct Board<O, B, D> {
    pub tones: O,
    pub buttons: B,
    pub display: D,
}

/// Report of one loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iteration {
    /// Presses accepted by the debouncer
    pub presses: u8,
    /// What the sequencer did
    pub step: StepOutcome,
    /// Whether the screen was redrawn
    pub redrawn: bool,
}

/// The time base could not be started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickSourceError;

impl fmt::Display for TickSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick source configuration failed")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TickSourceError {}

/// Park the CPU forever. Used when there is no usable time base.
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

/// Cooperative scheduler tying input, sequencer and display together.
pub struct Player<'c, T, O, B, D> {
    ctx: &'c PlayerContext,
    sequencer: Sequencer<T>,
    debouncer: Debouncer,
    throttle: DisplayThrottle,
    board: Board<O, B, D>,
}

impl<'c, T, O, B, D> Player<'c, T, O, B, D>
where
    T: TrackData,
    O: ToneOutput,
    B: ButtonInput,
    D: TextDisplay,
{
    pub fn new(ctx: &'c PlayerContext, track: T, board: Board<O, B, D>, config: PlayerConfig) -> Self {
        Self {
            ctx,
            sequencer: Sequencer::new(track),
            debouncer: Debouncer::new(config.debounce_ms),
            throttle: DisplayThrottle::new(config.playing_refresh_ms, config.idle_refresh_ms),
            board,
        }
    }

    /// Start the time base and run forever; halts if the time base fails.
    pub fn boot<F>(mut self, start_tick_source: F) -> !
    where
        F: FnOnce() -> Result<(), TickSourceError>,
    {
        if let Err(e) = start_tick_source() {
            log::error!("{}, halting", e);
            halt();
        }
        self.ctx.request_redraw();
        self.run()
    }

    /// Run the dispatch loop forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.poll_once();
        }
    }

    /// Run exactly one dispatch iteration.
    pub fn poll_once(&mut self) -> Iteration {
        let now = self.ctx.now();
        let mut presses = 0;
        for button in Button::ALL {
            let level = self.board.buttons.is_pressed(button);
            if let Some(press) = self.debouncer.poll(button, level, now) {
                presses += 1;
                self.handle_press(press);
            }
        }

        let step = self.sequencer.step(self.ctx, &mut self.board.tones);
        let redrawn = self.refresh_display();

        Iteration { presses, step, redrawn }
    }

    fn handle_press(&mut self, press: PressEvent) {
        log::debug!("button {} pressed at {} ms", press.button.id(), press.at);
        if let Some(cmd) = Command::for_press(press.button, self.ctx.state()) {
            self.sequencer.apply(cmd, self.ctx, &mut self.board.tones);
        }
        self.ctx.request_redraw();
    }

    fn refresh_display(&mut self) -> bool {
        let state = self.ctx.state();
        let decision = self
            .throttle
            .decide(self.ctx.now(), state, self.ctx.is_dirty());
        if !decision.should_redraw() {
            return false;
        }

        let status = self.status();
        let track = self.sequencer.track();
        render_status(&mut self.board.display, track.title(), track.author(), &status);

        self.ctx.clear_dirty();
        // the redraw itself takes time on real hardware
        self.throttle.mark_refreshed(self.ctx.now());
        true
    }

    /// Snapshot of what the status screen shows.
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.ctx.state(),
            current_ms: self.ctx.playback_ms(),
            total_ms: self.sequencer.track().total_duration_ms(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.ctx.state()
    }

    pub fn context(&self) -> &'c PlayerContext {
        self.ctx
    }

    pub fn sequencer(&self) -> &Sequencer<T> {
        &self.sequencer
    }

    pub fn board(&self) -> &Board<O, B, D> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<O, B, D> {
        &mut self.board
    }
}
