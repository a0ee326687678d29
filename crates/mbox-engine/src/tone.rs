//! Tone channel driver contract and frequency-to-timer mapping.
//!
//! Each buzzer is driven by a PWM timer channel clocked at 1 MHz. A tone of
//! `f` Hz is a square wave whose period is `1_000_000 / f` timer ticks with
//! the compare value at half the period (50% duty).

use mbox_ir::CHANNELS;

/// Timer input clock after prescaling, in Hz.
pub const TIMER_CLOCK_HZ: u32 = 1_000_000;

/// Shortest period the timer can produce, in ticks.
pub const PERIOD_MIN: u32 = 2;

/// Longest period a 16-bit auto-reload register can hold, in ticks.
pub const PERIOD_MAX: u32 = 65_536;

/// Anything that can play (or silence) a tone on one of the four channels.
pub trait ToneOutput {
    /// Program `channel` to `hz`; `hz == 0` disables the channel output.
    /// Out-of-range channels are ignored.
    fn set_frequency(&mut self, channel: usize, hz: u16);

    /// Silence every channel.
    fn all_off(&mut self) {
        for channel in 0..CHANNELS {
            self.set_frequency(channel, 0);
        }
    }
}

/// Register values for one tone on a timer channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerSettings {
    /// Full period in timer ticks, within `[PERIOD_MIN, PERIOD_MAX]`
    pub period: u32,
    /// Compare value for the output edge (half the period, at least 1)
    pub compare: u16,
}

impl TimerSettings {
    /// Compute the period and compare value for `hz`.
    ///
    /// Returns `None` for 0 Hz, the "disable output" sentinel.
    pub const fn for_frequency(hz: u16) -> Option<Self> {
        if hz == 0 {
            return None;
        }
        let hz = hz as u32;
        let mut period = (TIMER_CLOCK_HZ + hz / 2) / hz;
        if period < PERIOD_MIN {
            period = PERIOD_MIN;
        }
        if period > PERIOD_MAX {
            period = PERIOD_MAX;
        }
        let mut compare = period / 2;
        if compare == 0 {
            compare = 1;
        }
        Some(Self {
            period,
            compare: compare as u16,
        })
    }

    /// Value for the 16-bit auto-reload register (period - 1).
    pub const fn auto_reload(&self) -> u16 {
        (self.period - 1) as u16
    }

    /// Frequency actually produced after rounding and clamping.
    pub const fn actual_hz(&self) -> u32 {
        TIMER_CLOCK_HZ / self.period
    }
}

/// One hardware timer channel behind a buzzer.
pub trait TimerChannel {
    /// Load new period/compare values and enable the output.
    fn apply(&mut self, settings: TimerSettings);

    /// Disable the output compare (buzzer silent).
    fn disable(&mut self);
}

/// Fixed table of timer channels indexed by channel id.
#[derive(Clone, Debug, Default)]
pub struct ChannelBank<T> {
    channels: [T; CHANNELS],
}

impl<T: TimerChannel> ChannelBank<T> {
    pub fn new(channels: [T; CHANNELS]) -> Self {
        Self { channels }
    }

    pub fn channel(&self, index: usize) -> Option<&T> {
        self.channels.get(index)
    }

    pub fn channels(&self) -> &[T; CHANNELS] {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut [T; CHANNELS] {
        &mut self.channels
    }
}

impl<T: TimerChannel> ToneOutput for ChannelBank<T> {
    fn set_frequency(&mut self, channel: usize, hz: u16) {
        let Some(timer) = self.channels.get_mut(channel) else {
            return;
        };
        match TimerSettings::for_frequency(hz) {
            Some(settings) => timer.apply(settings),
            None => timer.disable(),
        }
    }
}
