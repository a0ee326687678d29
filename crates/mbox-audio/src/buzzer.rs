//! Square-wave emulation of the buzzer channels.

use mbox_engine::{ChannelBank, TimerChannel, TimerSettings, ToneOutput, CHANNELS, TIMER_CLOCK_HZ};

/// Per-voice amplitude; four voices at full swing stay inside `i16`.
pub const DEFAULT_AMPLITUDE: i16 = 6_000;

/// One emulated PWM channel.
///
/// The output is high while the timer counter is below the compare value
/// and low for the rest of the period, like the board's PWM mode 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SquareVoice {
    settings: Option<TimerSettings>,
    /// Counter position in timer ticks, scaled by the sample rate
    phase: u64,
}

impl SquareVoice {
    pub fn settings(&self) -> Option<TimerSettings> {
        self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.is_some()
    }

    /// Output level for the next sample, `None` while disabled.
    pub fn next_level(&mut self, sample_rate: u32) -> Option<bool> {
        let settings = self.settings?;
        let rate = sample_rate as u64;
        let span = settings.period as u64 * rate;
        // a shorter period may have been loaded mid-cycle
        self.phase %= span;
        let high = self.phase < settings.compare as u64 * rate;
        self.phase = (self.phase + TIMER_CLOCK_HZ as u64) % span;
        Some(high)
    }
}

impl TimerChannel for SquareVoice {
    fn apply(&mut self, settings: TimerSettings) {
        self.settings = Some(settings);
    }

    fn disable(&mut self) {
        self.settings = None;
        self.phase = 0;
    }
}

/// Four emulated buzzers mixed into one mono signal.
#[derive(Clone, Debug)]
pub struct Buzzer {
    bank: ChannelBank<SquareVoice>,
    sample_rate: u32,
    amplitude: i16,
}

impl Buzzer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            bank: ChannelBank::default(),
            sample_rate: sample_rate.max(1),
            amplitude: DEFAULT_AMPLITUDE,
        }
    }

    pub fn with_amplitude(mut self, amplitude: i16) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn voices(&self) -> &[SquareVoice; CHANNELS] {
        self.bank.channels()
    }

    /// Frequencies the channels are currently producing (0 = off).
    pub fn active_hz(&self) -> [u32; CHANNELS] {
        let voices = *self.voices();
        voices.map(|v| v.settings().map_or(0, |s| s.actual_hz()))
    }

    pub fn next_sample(&mut self) -> i16 {
        let rate = self.sample_rate;
        let amp = self.amplitude as i32;
        let mut acc = 0i32;
        for voice in self.bank.channels_mut() {
            match voice.next_level(rate) {
                Some(true) => acc += amp,
                Some(false) => acc -= amp,
                None => {}
            }
        }
        acc.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    pub fn render(&mut self, out: &mut [i16]) {
        for sample in out {
            *sample = self.next_sample();
        }
    }
}

impl ToneOutput for Buzzer {
    fn set_frequency(&mut self, channel: usize, hz: u16) {
        self.bank.set_frequency(channel, hz);
    }
}

/// Splits a sample rate into whole samples per 1 ms tick, carrying the
/// remainder so rates like 44.1 kHz stay exact over time.
#[derive(Clone, Copy, Debug)]
pub struct SamplePacer {
    sample_rate: u32,
    carry: u32,
}

impl SamplePacer {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate, carry: 0 }
    }

    /// Samples to generate for the next millisecond.
    pub fn next_tick(&mut self) -> usize {
        self.carry += self.sample_rate;
        let n = self.carry / 1000;
        self.carry %= 1000;
        n as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_wave_has_half_duty() {
        // 500 Hz at 8 kHz: 16 samples per period
        let mut voice = SquareVoice::default();
        voice.apply(TimerSettings::for_frequency(500).unwrap());
        let levels: Vec<bool> = (0..32).map(|_| voice.next_level(8_000).unwrap()).collect();
        assert!(levels[0..8].iter().all(|&l| l));
        assert!(levels[8..16].iter().all(|&l| !l));
        assert_eq!(&levels[0..16], &levels[16..32]);
    }

    #[test]
    fn disabled_voice_is_silent() {
        let mut voice = SquareVoice::default();
        assert_eq!(voice.next_level(8_000), None);
        voice.apply(TimerSettings::for_frequency(440).unwrap());
        voice.next_level(8_000);
        voice.disable();
        assert!(!voice.is_enabled());
        assert_eq!(voice.next_level(8_000), None);
    }

    #[test]
    fn buzzer_mixes_channels() {
        let mut buzzer = Buzzer::new(8_000);
        let mut out = [0i16; 16];
        buzzer.render(&mut out);
        assert!(out.iter().all(|&s| s == 0));

        buzzer.set_frequency(0, 500);
        buzzer.set_frequency(1, 500);
        buzzer.render(&mut out);
        assert_eq!(out[0], 2 * DEFAULT_AMPLITUDE);
        assert_eq!(out[15], -2 * DEFAULT_AMPLITUDE);
        assert_eq!(buzzer.active_hz(), [500, 500, 0, 0]);

        buzzer.all_off();
        buzzer.render(&mut out);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn out_of_range_channel_is_ignored() {
        let mut buzzer = Buzzer::new(8_000);
        buzzer.set_frequency(CHANNELS, 440);
        assert_eq!(buzzer.active_hz(), [0; CHANNELS]);
    }

    #[test]
    fn pacer_carries_fractional_samples() {
        let mut pacer = SamplePacer::new(44_100);
        let total: usize = (0..1000).map(|_| pacer.next_tick()).sum();
        assert_eq!(total, 44_100);

        let mut pacer = SamplePacer::new(48_000);
        assert_eq!(pacer.next_tick(), 48);
    }
}
