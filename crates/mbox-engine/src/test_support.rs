//! Recording fakes for the peripheral traits.

use mbox_ir::{CHANNELS, LINE_WIDTH};

use crate::debounce::{Button, ButtonInput};
use crate::display::{TextDisplay, ROWS};
use crate::tone::ToneOutput;

/// Remembers the last frequency written to each channel.
#[derive(Debug, Default)]
pub struct RecordingTones {
    pub freq: [u16; CHANNELS],
    pub calls: usize,
}

impl ToneOutput for RecordingTones {
    fn set_frequency(&mut self, channel: usize, hz: u16) {
        self.calls += 1;
        if let Some(slot) = self.freq.get_mut(channel) {
            *slot = hz;
        }
    }
}

/// Button levels set directly by the test.
#[derive(Debug, Default)]
pub struct ScriptedButtons {
    levels: [bool; 2],
}

impl ScriptedButtons {
    pub fn set(&mut self, button: Button, pressed: bool) {
        self.levels[button.id() as usize - 1] = pressed;
    }
}

impl ButtonInput for ScriptedButtons {
    fn is_pressed(&mut self, button: Button) -> bool {
        self.levels[button.id() as usize - 1]
    }
}

/// In-memory character grid.
#[derive(Debug)]
pub struct RecordingDisplay {
    grid: [[char; LINE_WIDTH]; ROWS as usize],
    pub clears: usize,
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self {
            grid: [[' '; LINE_WIDTH]; ROWS as usize],
            clears: 0,
        }
    }
}

impl RecordingDisplay {
    pub fn row(&self, row: u8) -> std::string::String {
        self.grid[row as usize - 1].iter().collect()
    }
}

impl TextDisplay for RecordingDisplay {
    fn clear(&mut self) {
        self.clears += 1;
        self.grid = [[' '; LINE_WIDTH]; ROWS as usize];
    }

    fn draw_line(&mut self, row: u8, col: u8, text: &str) {
        let Some(line) = self.grid.get_mut((row as usize).wrapping_sub(1)) else {
            return;
        };
        let start = (col as usize).saturating_sub(1);
        for (cell, c) in line.iter_mut().skip(start).zip(text.chars()) {
            *cell = c;
        }
    }
}
