//! Headless controller for musicbox.
//!
//! Runs the playback core off the board: [`Simulation`] on a virtual clock
//! for tests and offline rendering, [`Controller`] in real time with the
//! buzzers played through the sound card. Both the interactive player and
//! the CLI are built on this crate.

mod buttons;
mod config;
mod controller;
mod screen;
mod simulation;

pub use buttons::{SharedButtons, SimButtons};
pub use config::SimConfig;
pub use controller::Controller;
pub use screen::{Screen, SharedScreen};
pub use simulation::{SimStats, Simulation};

// Re-export common types so callers don't need the lower crates directly.
pub use mbox_audio::AudioError;
pub use mbox_engine::{Button, PlaybackState, PlayerConfig, StatusSnapshot};
pub use mbox_formats::{CompileOptions, FormatError};
pub use mbox_ir::Track;
