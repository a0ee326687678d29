//! Core data types for the musicbox sequencer.
//!
//! Tone events, read-only track data and millisecond tick arithmetic shared
//! by the firmware core and the host-side tools. The track compiler emits
//! these types and the playback engine consumes them.
//!
//! `no_std` compatible; the owned [`Track`] needs the `alloc` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod event;
pub mod millis;
mod pitch;
mod track;

pub use event::{ToneEvent, CHANNELS, MIN_HOLD_MS};
pub use millis::{elapsed, has_elapsed, minutes_seconds, Millis};
pub use pitch::{note_to_freq, note_to_hz};
#[cfg(feature = "alloc")]
pub use track::Track;
pub use track::{StaticTrack, TrackData, LINE_WIDTH};
