//! Buttons pressed by timed holds instead of physical contacts.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use mbox_engine::{Button, ButtonInput};
use mbox_ir::Millis;

/// Hold timers for both buttons, shared between the thread that presses
/// them and the loop that samples them.
#[derive(Debug, Default)]
pub struct SimButtons {
    remaining: [AtomicU32; 2],
}

impl SimButtons {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, button: Button) -> &AtomicU32 {
        &self.remaining[button.id() as usize - 1]
    }

    /// Hold `button` down for the next `ms` samples.
    pub fn hold(&self, button: Button, ms: Millis) {
        self.slot(button).store(ms, Ordering::Release);
    }

    pub fn release(&self, button: Button) {
        self.slot(button).store(0, Ordering::Release);
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.slot(button).load(Ordering::Acquire) > 0
    }

    /// One millisecond passed: count every running hold down.
    pub fn tick(&self) {
        for remaining in &self.remaining {
            let _ = remaining.fetch_update(Ordering::AcqRel, Ordering::Acquire, |ms| ms.checked_sub(1));
        }
    }
}

/// Handle the core loop samples.
#[derive(Clone, Debug, Default)]
pub struct SharedButtons(pub Arc<SimButtons>);

impl ButtonInput for SharedButtons {
    fn is_pressed(&mut self, button: Button) -> bool {
        self.0.is_held(button)
    }
}
