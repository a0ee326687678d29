//! Status screen rendering and the refresh throttle.
//!
//! The screen is a 4×16 character display. Redrawing it is slow compared to
//! the 1 ms tick, so the throttle only lets a redraw through every 250 ms
//! while playing (1000 ms otherwise) unless a state change marked it dirty.

use core::fmt::Write;

use heapless::String;
use mbox_ir::{elapsed, minutes_seconds, Millis, LINE_WIDTH};

use crate::context::PlaybackState;

/// Number of text rows on the display.
pub const ROWS: u8 = 4;

/// Cells in the progress bar.
pub const BAR_CELLS: u32 = 10;

/// Refresh interval while playing.
pub const PLAYING_REFRESH_MS: Millis = 250;

/// Refresh interval while paused or stopped.
pub const IDLE_REFRESH_MS: Millis = 1000;

/// One display line.
pub type Line = String<LINE_WIDTH>;

/// Character display primitives.
pub trait TextDisplay {
    fn clear(&mut self);

    /// Draw `text` at 1-based `row` (1..=4) and `col` (1..=16).
    fn draw_line(&mut self, row: u8, col: u8, text: &str);
}

/// What the status screen shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub state: PlaybackState,
    pub current_ms: Millis,
    pub total_ms: Millis,
}

impl StatusSnapshot {
    /// Percentage played, capped at 100. Zero for an empty track.
    pub fn progress_percent(&self) -> u32 {
        if self.total_ms == 0 {
            return 0;
        }
        let pct = self.current_ms as u64 * 100 / self.total_ms as u64;
        pct.min(100) as u32
    }

    /// Filled cells of the progress bar.
    pub fn filled_cells(&self) -> u32 {
        self.progress_percent() * BAR_CELLS / 100
    }

    /// Row 3: ` MM:SS / MM:SS `.
    pub fn time_line(&self) -> Line {
        let (cm, cs) = minutes_seconds(self.current_ms);
        let (tm, ts) = minutes_seconds(self.total_ms);
        let mut buf: String<32> = String::new();
        let _ = write!(buf, " {:02}:{:02} / {:02}:{:02} ", cm, cs, tm, ts);
        fit(&buf)
    }

    /// Row 4: state glyph and progress bar, padded to the full width.
    pub fn progress_line(&self) -> Line {
        let filled = self.filled_cells();
        let mut line = Line::new();
        let _ = line.push_str(self.state.glyph());
        let _ = line.push_str(" [");
        for cell in 0..BAR_CELLS {
            let _ = line.push(if cell < filled { '=' } else { '.' });
        }
        let _ = line.push(']');
        pad(&mut line);
        line
    }
}

/// Copy as many characters of `text` as fit on one line.
pub fn fit(text: &str) -> Line {
    let mut line = Line::new();
    for c in text.chars() {
        if line.push(c).is_err() {
            break;
        }
    }
    line
}

fn pad(line: &mut Line) {
    while line.push(' ').is_ok() {}
}

/// Column that centers `text` on a line (1-based).
pub fn centered_col(text: &str) -> u8 {
    let len = text.chars().count().min(LINE_WIDTH);
    ((LINE_WIDTH - len) / 2 + 1) as u8
}

/// Draw the full status screen.
pub fn render_status(display: &mut impl TextDisplay, title: &str, author: &str, status: &StatusSnapshot) {
    display.clear();

    let title = fit(title);
    display.draw_line(1, centered_col(&title), &title);

    let author = fit(author);
    display.draw_line(2, centered_col(&author), &author);

    display.draw_line(3, 1, &status.time_line());
    display.draw_line(4, 1, &status.progress_line());
}

/// Outcome of one throttle check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Nothing to do this iteration
    Skip,
    /// Redraw because a state change marked the screen dirty
    Forced,
    /// Redraw because the interval ran out
    Scheduled,
}

impl RefreshDecision {
    pub fn should_redraw(self) -> bool {
        !matches!(self, RefreshDecision::Skip)
    }
}

/// Decides when the status screen may be redrawn.
#[derive(Clone, Debug)]
pub struct DisplayThrottle {
    playing_interval: Millis,
    idle_interval: Millis,
    last_refresh: Millis,
}

impl DisplayThrottle {
    pub const fn new(playing_interval: Millis, idle_interval: Millis) -> Self {
        Self {
            playing_interval,
            idle_interval,
            last_refresh: 0,
        }
    }

    /// Refresh interval for `state`.
    pub fn interval(&self, state: PlaybackState) -> Millis {
        if state.is_playing() {
            self.playing_interval
        } else {
            self.idle_interval
        }
    }

    pub fn decide(&self, now: Millis, state: PlaybackState, dirty: bool) -> RefreshDecision {
        if dirty {
            RefreshDecision::Forced
        } else if elapsed(now, self.last_refresh) > self.interval(state) {
            RefreshDecision::Scheduled
        } else {
            RefreshDecision::Skip
        }
    }

    /// Record a completed redraw at `now`.
    pub fn mark_refreshed(&mut self, now: Millis) {
        self.last_refresh = now;
    }

    pub fn last_refresh(&self) -> Millis {
        self.last_refresh
    }
}

impl Default for DisplayThrottle {
    fn default() -> Self {
        Self::new(PLAYING_REFRESH_MS, IDLE_REFRESH_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingDisplay;

    fn status(state: PlaybackState, current_ms: Millis, total_ms: Millis) -> StatusSnapshot {
        StatusSnapshot { state, current_ms, total_ms }
    }

    #[test]
    fn progress_cells() {
        assert_eq!(status(PlaybackState::Playing, 0, 10_000).filled_cells(), 0);
        assert_eq!(status(PlaybackState::Playing, 5_000, 10_000).filled_cells(), 5);
        assert_eq!(status(PlaybackState::Playing, 9_999, 10_000).filled_cells(), 9);
        assert_eq!(status(PlaybackState::Playing, 10_000, 10_000).filled_cells(), 10);
        assert_eq!(status(PlaybackState::Playing, 12_000, 10_000).filled_cells(), 10);
    }

    #[test]
    fn progress_with_zero_total_is_empty() {
        let s = status(PlaybackState::Playing, 1234, 0);
        assert_eq!(s.progress_percent(), 0);
        assert_eq!(s.filled_cells(), 0);
    }

    #[test]
    fn progress_does_not_overflow_on_long_tracks() {
        // current * 100 overflows u32 past ~71 minutes
        let s = status(PlaybackState::Playing, 50_000_000, 100_000_000);
        assert_eq!(s.progress_percent(), 50);
    }

    #[test]
    fn progress_line_layout() {
        let line = status(PlaybackState::Playing, 5_000, 10_000).progress_line();
        assert_eq!(line.as_str(), "|| [=====.....] ");
        assert_eq!(line.len(), LINE_WIDTH);

        let full = status(PlaybackState::Paused, 10_000, 10_000).progress_line();
        assert_eq!(full.as_str(), ">  [==========] ");

        let stopped = status(PlaybackState::Stopped, 0, 10_000).progress_line();
        assert_eq!(stopped.as_str(), "[] [..........] ");
    }

    #[test]
    fn time_line_layout() {
        let line = status(PlaybackState::Playing, 65_500, 185_000).time_line();
        assert_eq!(line.as_str(), " 01:05 / 03:05 ");
    }

    #[test]
    fn time_line_truncates_very_long_times() {
        let line = status(PlaybackState::Playing, 0, 6_000_000 * 10).time_line();
        assert_eq!(line.as_str(), " 00:00 / 1000:00");
        assert!(line.len() <= LINE_WIDTH);
    }

    #[test]
    fn centering() {
        assert_eq!(centered_col("somesterdude"), 3);
        assert_eq!(centered_col("Hero-mili 8bit "), 1);
        assert_eq!(centered_col(""), 9);
        assert_eq!(centered_col("a string longer than sixteen"), 1);
    }

    #[test]
    fn render_draws_four_rows() {
        let mut display = RecordingDisplay::default();
        render_status(
            &mut display,
            "Hero-mili 8bit ",
            "somesterdude",
            &status(PlaybackState::Stopped, 0, 61_000),
        );

        assert_eq!(display.clears, 1);
        assert_eq!(display.row(1), "Hero-mili 8bit  ");
        assert_eq!(display.row(2), "  somesterdude  ");
        assert_eq!(display.row(3), " 00:00 / 01:01  ");
        assert_eq!(display.row(4), "[] [..........] ");
    }

    #[test]
    fn throttle_interval_depends_on_state() {
        let t = DisplayThrottle::default();
        assert_eq!(t.interval(PlaybackState::Playing), 250);
        assert_eq!(t.interval(PlaybackState::Paused), 1000);
        assert_eq!(t.interval(PlaybackState::Stopped), 1000);
    }

    #[test]
    fn throttle_waits_for_interval() {
        let mut t = DisplayThrottle::default();
        t.mark_refreshed(1000);
        assert_eq!(t.decide(1250, PlaybackState::Playing, false), RefreshDecision::Skip);
        assert_eq!(t.decide(1251, PlaybackState::Playing, false), RefreshDecision::Scheduled);
        assert_eq!(t.decide(1251, PlaybackState::Stopped, false), RefreshDecision::Skip);
        assert_eq!(t.decide(2001, PlaybackState::Stopped, false), RefreshDecision::Scheduled);
    }

    #[test]
    fn dirty_flag_bypasses_interval() {
        let mut t = DisplayThrottle::default();
        t.mark_refreshed(1000);
        let d = t.decide(1001, PlaybackState::Playing, true);
        assert_eq!(d, RefreshDecision::Forced);
        assert!(d.should_redraw());
    }

    #[test]
    fn throttle_survives_wraparound() {
        let mut t = DisplayThrottle::default();
        t.mark_refreshed(u32::MAX - 100);
        assert_eq!(t.decide(100, PlaybackState::Playing, false), RefreshDecision::Skip);
        assert_eq!(t.decide(150, PlaybackState::Playing, false), RefreshDecision::Scheduled);
    }
}
