//! Read-only track data: the event sequence plus its metadata.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;
#[cfg(feature = "alloc")]
use arrayvec::ArrayString;

use crate::event::ToneEvent;
use crate::millis::Millis;

/// Widest text line the display can show, in characters.
pub const LINE_WIDTH: usize = 16;

/// Source of the precompiled event list.
///
/// The sequencer only ever holds a cursor into this; the list itself is never
/// copied or mutated.
pub trait TrackData {
    /// Number of events in the sequence.
    fn event_count(&self) -> usize;

    /// Event at `index`, or `None` past the end.
    fn event_at(&self, index: usize) -> Option<ToneEvent>;

    /// Precomputed playing time in milliseconds.
    fn total_duration_ms(&self) -> Millis;

    /// Title line shown on the display.
    fn title(&self) -> &str {
        ""
    }

    /// Author line shown on the display.
    fn author(&self) -> &str {
        ""
    }
}

impl<T: TrackData + ?Sized> TrackData for &T {
    fn event_count(&self) -> usize {
        (**self).event_count()
    }

    fn event_at(&self, index: usize) -> Option<ToneEvent> {
        (**self).event_at(index)
    }

    fn total_duration_ms(&self) -> Millis {
        (**self).total_duration_ms()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn author(&self) -> &str {
        (**self).author()
    }
}

/// A track baked into the firmware image.
///
/// Everything is `'static` so a whole track can live in a `static` item:
///
/// ```
/// use mbox_ir::{StaticTrack, ToneEvent};
///
/// static EVENTS: [ToneEvent; 2] = [
///     ToneEvent::new([440, 0, 0, 0], 500),
///     ToneEvent::silence(1),
/// ];
/// static TRACK: StaticTrack = StaticTrack::new("A440", "tuning fork", &EVENTS, 500);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct StaticTrack {
    title: &'static str,
    author: &'static str,
    events: &'static [ToneEvent],
    total_duration_ms: Millis,
}

impl StaticTrack {
    pub const fn new(
        title: &'static str,
        author: &'static str,
        events: &'static [ToneEvent],
        total_duration_ms: Millis,
    ) -> Self {
        Self {
            title,
            author,
            events,
            total_duration_ms,
        }
    }

    pub const fn events(&self) -> &'static [ToneEvent] {
        self.events
    }
}

impl TrackData for StaticTrack {
    fn event_count(&self) -> usize {
        self.events.len()
    }

    fn event_at(&self, index: usize) -> Option<ToneEvent> {
        self.events.get(index).copied()
    }

    fn total_duration_ms(&self) -> Millis {
        self.total_duration_ms
    }

    fn title(&self) -> &str {
        self.title
    }

    fn author(&self) -> &str {
        self.author
    }
}

/// Owned track, produced by the MIDI compiler on the host.
#[cfg(feature = "alloc")]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Track {
    /// Title line (truncated to the display width)
    pub title: ArrayString<LINE_WIDTH>,
    /// Author line (truncated to the display width)
    pub author: ArrayString<LINE_WIDTH>,
    /// Event sequence in playback order
    pub events: Vec<ToneEvent>,
    /// Precomputed playing time in milliseconds
    pub total_duration_ms: Millis,
}

#[cfg(feature = "alloc")]
impl Track {
    /// Create a track with an explicit total duration.
    pub fn new(title: &str, author: &str, events: Vec<ToneEvent>, total_duration_ms: Millis) -> Self {
        Self {
            title: truncated(title),
            author: truncated(author),
            events,
            total_duration_ms,
        }
    }

    /// Create a track whose duration is the sum of every event's hold time.
    pub fn from_events(title: &str, author: &str, events: Vec<ToneEvent>) -> Self {
        let total = events
            .iter()
            .fold(0u32, |acc, ev| acc.saturating_add(ev.hold_ms() as u32));
        Self::new(title, author, events, total)
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = truncated(title);
    }

    pub fn set_author(&mut self, author: &str) {
        self.author = truncated(author);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(feature = "alloc")]
impl TrackData for Track {
    fn event_count(&self) -> usize {
        self.events.len()
    }

    fn event_at(&self, index: usize) -> Option<ToneEvent> {
        self.events.get(index).copied()
    }

    fn total_duration_ms(&self) -> Millis {
        self.total_duration_ms
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn author(&self) -> &str {
        &self.author
    }
}

/// Copy as many whole characters of `text` as fit on one display line.
#[cfg(feature = "alloc")]
fn truncated(text: &str) -> ArrayString<LINE_WIDTH> {
    let mut out = ArrayString::new();
    for c in text.chars() {
        if out.try_push(c).is_err() {
            break;
        }
    }
    out
}
