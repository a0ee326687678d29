//! In-memory stand-in for the 4×16 character display.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use mbox_engine::{TextDisplay, ROWS};
use mbox_ir::LINE_WIDTH;

const BLANK: [[char; LINE_WIDTH]; ROWS as usize] = [[' '; LINE_WIDTH]; ROWS as usize];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    grid: [[char; LINE_WIDTH]; ROWS as usize],
    clears: usize,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            grid: BLANK,
            clears: 0,
        }
    }

    /// Contents of the 1-based `row`; empty for rows off the display.
    pub fn row(&self, row: u8) -> String {
        match self.grid.get((row as usize).wrapping_sub(1)) {
            Some(line) => line.iter().collect(),
            None => String::new(),
        }
    }

    pub fn rows(&self) -> Vec<String> {
        (1..=ROWS).map(|r| self.row(r)).collect()
    }

    /// Number of full redraws so far.
    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDisplay for Screen {
    fn clear(&mut self) {
        self.grid = BLANK;
        self.clears += 1;
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

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = "-".repeat(LINE_WIDTH);
        writeln!(f, "+{}+", border)?;
        for row in 1..=ROWS {
            writeln!(f, "|{}|", self.row(row))?;
        }
        write!(f, "+{}+", border)
    }
}

/// A [`Screen`] the session thread draws on while another thread reads it.
#[derive(Clone, Debug, Default)]
pub struct SharedScreen(Arc<Mutex<Screen>>);

impl SharedScreen {
    fn lock(&self) -> MutexGuard<'_, Screen> {
        // a panic mid-draw leaves at worst a half-drawn screen
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> Screen {
        self.lock().clone()
    }
}

impl TextDisplay for SharedScreen {
    fn clear(&mut self) {
        self.lock().clear();
    }

    fn draw_line(&mut self, row: u8, col: u8, text: &str) {
        self.lock().draw_line(row, col, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_at_one_based_positions() {
        let mut s = Screen::new();
        s.draw_line(2, 3, "somesterdude");
        assert_eq!(s.row(2), "  somesterdude  ");
        assert_eq!(s.row(1), " ".repeat(16));
    }

    #[test]
    fn clips_text_and_ignores_bad_rows() {
        let mut s = Screen::new();
        s.draw_line(1, 10, "0123456789");
        assert_eq!(s.row(1), "         0123456");
        s.draw_line(0, 1, "x");
        s.draw_line(5, 1, "x");
        assert_eq!(s.row(5), "");
        assert!(s.rows().iter().all(|r| !r.contains('x')));
    }

    #[test]
    fn display_draws_a_frame() {
        let mut s = Screen::new();
        s.draw_line(1, 1, "hello");
        let text = s.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "+----------------+");
        assert_eq!(lines[1], "|hello           |");
    }

    #[test]
    fn shared_screen_snapshots() {
        let mut shared = SharedScreen::default();
        let reader = shared.clone();
        shared.clear();
        shared.draw_line(4, 1, "[]");
        let snap = reader.snapshot();
        assert_eq!(snap.clears(), 1);
        assert!(snap.row(4).starts_with("[]"));
    }
}
