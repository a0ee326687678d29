//! Audio output trait and error types.

use std::fmt;

/// Error type for audio operations.
#[derive(Debug)]
pub enum AudioError {
    /// No output device on the default host
    NoDevice,
    /// The device rejected its own default configuration
    DeviceInit(String),
    /// Building the output stream failed
    StreamCreate(String),
    /// Starting, pausing or feeding the stream failed
    Playback(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoDevice => write!(f, "no audio output device"),
            AudioError::DeviceInit(msg) => write!(f, "audio device init failed: {}", msg),
            AudioError::StreamCreate(msg) => write!(f, "could not open audio stream: {}", msg),
            AudioError::Playback(msg) => write!(f, "audio playback failed: {}", msg),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(e: cpal::DefaultStreamConfigError) -> Self {
        AudioError::DeviceInit(e.to_string())
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(e: cpal::BuildStreamError) -> Self {
        AudioError::StreamCreate(e.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(e: cpal::PlayStreamError) -> Self {
        AudioError::Playback(e.to_string())
    }
}

impl From<cpal::PauseStreamError> for AudioError {
    fn from(e: cpal::PauseStreamError) -> Self {
        AudioError::Playback(e.to_string())
    }
}

/// Sink for mono 16-bit samples.
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;

    /// Queue `samples`, blocking until there is room for all of them. The
    /// blocking is what paces a producer that runs faster than real time.
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError>;

    fn start(&mut self) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError>;
}
