//! File formats for musicbox.
//!
//! Parses Standard MIDI Files, compiles them into four-channel tone tracks,
//! emits those tracks as Rust source for a firmware image, and writes
//! rendered buzzer audio as WAV.

mod compile;
mod emit;
mod midi;
mod wav_format;

use std::fmt;

pub use compile::{compile_track, CompileOptions, Compiled, TAIL_MS};
pub use emit::{track_source, write_track_source};
pub use midi::{parse_midi, MidiFile, MidiMessage, MidiTrack, TimedMessage, DEFAULT_TEMPO_US};
pub use wav_format::{samples_to_wav, write_wav};

/// Error type for format parsing.
#[derive(Debug)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    InvalidHeader,
    /// Unexpected end of file
    UnexpectedEof,
    /// Unsupported SMF format (only 0, 1 and 2 exist)
    UnsupportedVersion,
    /// SMPTE time division; only ticks-per-beat files are handled
    UnsupportedTiming,
    /// Event data that cannot be decoded
    Malformed(String),
    /// I/O error
    Io(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidHeader => write!(f, "not a Standard MIDI File"),
            FormatError::UnexpectedEof => write!(f, "unexpected end of file"),
            FormatError::UnsupportedVersion => write!(f, "unsupported MIDI file format"),
            FormatError::UnsupportedTiming => write!(f, "SMPTE time division is not supported"),
            FormatError::Malformed(msg) => write!(f, "malformed MIDI data: {}", msg),
            FormatError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            FormatError::UnexpectedEof
        } else {
            FormatError::Io(e.to_string())
        }
    }
}

impl From<binrw::Error> for FormatError {
    fn from(e: binrw::Error) -> Self {
        if e.is_eof() {
            FormatError::UnexpectedEof
        } else {
            FormatError::Malformed(e.to_string())
        }
    }
}
