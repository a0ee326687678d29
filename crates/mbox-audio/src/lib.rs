//! Audio for the musicbox host tools.
//!
//! [`Buzzer`] emulates the four piezo buzzers: each channel is a
//! [`SquareVoice`] that takes the same timer settings the board's PWM
//! channels get and produces the square wave those registers would. The
//! cpal backend plays the resulting samples on the default output device.

mod buzzer;
mod cpal_backend;
mod traits;

pub use buzzer::{Buzzer, SamplePacer, SquareVoice, DEFAULT_AMPLITUDE};
pub use cpal_backend::CpalOutput;
pub use traits::{AudioError, AudioOutput};
