//! Tone events: one step of the precompiled playback sequence.

/// Number of independent tone channels on the board.
pub const CHANNELS: usize = 4;

/// Shortest hold a fired event may have. A zero delay would stall the
/// sequencer on the same tick, so it is forced up to this value.
pub const MIN_HOLD_MS: u16 = 1;

/// One entry in the playback sequence.
///
/// All four channels are programmed at once when the event fires, then held
/// for `delay_ms` before the next event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ToneEvent {
    /// Per-channel frequency in Hz; 0 silences that channel
    pub freq: [u16; CHANNELS],
    /// How long this state is held, in milliseconds
    pub delay_ms: u16,
}

impl ToneEvent {
    /// Create an event from per-channel frequencies and a hold time.
    pub const fn new(freq: [u16; CHANNELS], delay_ms: u16) -> Self {
        Self { freq, delay_ms }
    }

    /// All channels silent for `delay_ms`.
    pub const fn silence(delay_ms: u16) -> Self {
        Self {
            freq: [0; CHANNELS],
            delay_ms,
        }
    }

    /// Hold time actually applied by the sequencer (never zero).
    pub const fn hold_ms(&self) -> u16 {
        if self.delay_ms < MIN_HOLD_MS {
            MIN_HOLD_MS
        } else {
            self.delay_ms
        }
    }

    /// True if every channel is silent.
    pub fn is_silent(&self) -> bool {
        self.freq.iter().all(|&f| f == 0)
    }

    /// Number of channels producing a tone.
    pub fn voice_count(&self) -> usize {
        self.freq.iter().filter(|&&f| f != 0).count()
    }
}
