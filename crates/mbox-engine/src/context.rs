//! State shared between the tick interrupt and the main loop.
//!
//! Every field is an atomic cell so the compiler can never cache a stale
//! copy across the interrupt boundary. The tick handler only counts and
//! reads the playback state; state transitions are written by the main
//! loop alone.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, Ordering};

use mbox_ir::Millis;

/// Transport state of the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PlaybackState {
    #[default]
    Stopped = 0,
    Playing = 1,
    Paused = 2,
}

impl PlaybackState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => PlaybackState::Playing,
            2 => PlaybackState::Paused,
            _ => PlaybackState::Stopped,
        }
    }

    /// Two-character status glyph for the display.
    pub const fn glyph(self) -> &'static str {
        match self {
            PlaybackState::Playing => "||",
            PlaybackState::Paused => "> ",
            PlaybackState::Stopped => "[]",
        }
    }

    pub const fn is_playing(self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

/// Process-wide player state crossing the interrupt boundary.
///
/// `const`-constructible so firmware can keep it in a `static`:
///
/// ```
/// use mbox_engine::PlayerContext;
///
/// static CONTEXT: PlayerContext = PlayerContext::new();
///
/// // in the SysTick handler
/// CONTEXT.on_tick();
/// assert_eq!(CONTEXT.now(), 1);
/// ```
#[derive(Debug)]
pub struct PlayerContext {
    /// Free-running system tick (ms), wraps
    system_millis: AtomicU32,
    /// Elapsed time within the current track (ms)
    current_time_ms: AtomicU32,
    /// Remaining hold time of the current event (ms)
    delay_counter: AtomicU16,
    /// `PlaybackState` discriminant
    state: AtomicU8,
    /// Redraw requested regardless of the refresh interval
    display_dirty: AtomicBool,
}

impl PlayerContext {
    /// Startup state: stopped, clocks at zero, first redraw pending.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Same as [`new`](Self::new) with the system tick preset, e.g. close to
    /// the wrap point.
    pub const fn starting_at(now: Millis) -> Self {
        Self {
            system_millis: AtomicU32::new(now),
            current_time_ms: AtomicU32::new(0),
            delay_counter: AtomicU16::new(0),
            state: AtomicU8::new(PlaybackState::Stopped as u8),
            display_dirty: AtomicBool::new(true),
        }
    }

    // --- Tick source (interrupt context) ---

    /// Advance the time base by one 1 ms tick.
    ///
    /// While playing this also counts down the event delay and advances the
    /// playback clock.
    pub fn on_tick(&self) {
        self.system_millis.fetch_add(1, Ordering::Relaxed);

        if self.state().is_playing() {
            let _ = self
                .delay_counter
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |d| d.checked_sub(1));
            self.current_time_ms.fetch_add(1, Ordering::Relaxed);
        }
    }

    // --- Readers ---

    /// Current system tick in milliseconds.
    pub fn now(&self) -> Millis {
        self.system_millis.load(Ordering::Relaxed)
    }

    /// Elapsed playback time within the current track.
    pub fn playback_ms(&self) -> Millis {
        self.current_time_ms.load(Ordering::Relaxed)
    }

    /// Milliseconds until the next event fires.
    pub fn delay_remaining(&self) -> u16 {
        self.delay_counter.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_dirty(&self) -> bool {
        self.display_dirty.load(Ordering::Relaxed)
    }

    /// Ask for a redraw on the next display decision.
    pub fn request_redraw(&self) {
        self.display_dirty.store(true, Ordering::Relaxed);
    }

    // --- Main-loop writers ---

    pub(crate) fn set_state(&self, state: PlaybackState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub(crate) fn reload_delay(&self, ms: u16) {
        self.delay_counter.store(ms, Ordering::Relaxed);
    }

    pub(crate) fn reset_playback_clock(&self) {
        self.current_time_ms.store(0, Ordering::Relaxed);
    }

    pub(crate) fn clear_dirty(&self) {
        self.display_dirty.store(false, Ordering::Relaxed);
    }
}

impl Default for PlayerContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_stopped_and_dirty() {
        let ctx = PlayerContext::new();
        assert_eq!(ctx.state(), PlaybackState::Stopped);
        assert_eq!(ctx.now(), 0);
        assert_eq!(ctx.playback_ms(), 0);
        assert_eq!(ctx.delay_remaining(), 0);
        assert!(ctx.is_dirty());
    }

    #[test]
    fn tick_only_counts_system_time_when_not_playing() {
        let ctx = PlayerContext::new();
        ctx.reload_delay(5);
        for _ in 0..3 {
            ctx.on_tick();
        }
        assert_eq!(ctx.now(), 3);
        assert_eq!(ctx.playback_ms(), 0);
        assert_eq!(ctx.delay_remaining(), 5);

        ctx.set_state(PlaybackState::Paused);
        ctx.on_tick();
        assert_eq!(ctx.playback_ms(), 0);
        assert_eq!(ctx.delay_remaining(), 5);
    }

    #[test]
    fn tick_counts_down_delay_while_playing() {
        let ctx = PlayerContext::new();
        ctx.set_state(PlaybackState::Playing);
        ctx.reload_delay(2);
        for _ in 0..4 {
            ctx.on_tick();
        }
        assert_eq!(ctx.delay_remaining(), 0);
        assert_eq!(ctx.playback_ms(), 4);
        assert_eq!(ctx.now(), 4);
    }

    #[test]
    fn system_tick_wraps() {
        let ctx = PlayerContext::starting_at(u32::MAX);
        ctx.on_tick();
        assert_eq!(ctx.now(), 0);
    }

    #[test]
    fn glyphs() {
        assert_eq!(PlaybackState::Playing.glyph(), "||");
        assert_eq!(PlaybackState::Paused.glyph(), "> ");
        assert_eq!(PlaybackState::Stopped.glyph(), "[]");
    }
}
