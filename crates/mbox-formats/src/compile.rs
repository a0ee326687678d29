//! MIDI → tone track compiler.
//!
//! All tracks are merged on one timeline and played through four voice
//! slots, one per buzzer channel. Every time the set of sounding notes
//! changes after a pause in ticks, the previous slot state is written out as
//! a [`ToneEvent`] held for the length of that pause.

use mbox_ir::{note_to_freq, Millis, ToneEvent, Track, CHANNELS, MIN_HOLD_MS};

use crate::midi::{MidiFile, MidiMessage, TimedMessage};

/// Hold time of the event that lets the final chord ring out.
pub const TAIL_MS: u16 = 100;

/// Title used when neither the options nor the file name the track.
const UNTITLED: &str = "Untitled";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Display title; defaults to the first track name in the file
    pub title: Option<String>,
    /// Display author line
    pub author: String,
    /// How long the last chord rings before the closing silence
    pub tail_ms: u16,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            title: None,
            author: String::new(),
            tail_ms: TAIL_MS,
        }
    }
}

/// A compiled track plus what had to be left out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compiled {
    pub track: Track,
    /// Note-ons that arrived while all voice slots were busy
    pub dropped_notes: usize,
    /// Tempo events that changed the running tempo
    pub tempo_changes: usize,
}

/// Voice slot allocation: a note takes the first free slot and releases the
/// first slot holding it.
#[derive(Clone, Copy, Debug, Default)]
struct Slots([Option<u8>; CHANNELS]);

impl Slots {
    fn note_on(&mut self, note: u8) -> bool {
        match self.0.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(note);
                true
            }
            None => false,
        }
    }

    fn note_off(&mut self, note: u8) {
        if let Some(slot) = self.0.iter_mut().find(|s| **s == Some(note)) {
            *slot = None;
        }
    }

    fn frequencies(&self) -> [u16; CHANNELS] {
        self.0.map(|slot| slot.map_or(0, note_to_freq))
    }
}

/// Appends events, splitting holds that do not fit a `u16`.
#[derive(Default)]
struct EventWriter {
    events: Vec<ToneEvent>,
}

impl EventWriter {
    fn hold(&mut self, freq: [u16; CHANNELS], ms: f64) {
        // ties round to even
        let mut remaining = (ms.round_ties_even() as u64).max(MIN_HOLD_MS as u64);
        while remaining > u16::MAX as u64 {
            self.events.push(ToneEvent::new(freq, u16::MAX));
            remaining -= u16::MAX as u64;
        }
        self.events.push(ToneEvent::new(freq, remaining as u16));
    }
}

/// Compile a parsed MIDI file into a playable track.
pub fn compile_track(midi: &MidiFile, options: &CompileOptions) -> Compiled {
    let ticks_per_beat = midi.ticks_per_beat.max(1) as f64;
    let ms_per_tick = |tempo_us: u32| tempo_us as f64 / ticks_per_beat / 1000.0;

    let mut timeline: Vec<&TimedMessage> = midi.tracks.iter().flat_map(|t| &t.messages).collect();
    // stable: simultaneous messages keep their track order
    timeline.sort_by_key(|m| m.tick);

    let mut tempo = midi.initial_tempo();
    let mut tick_ms = ms_per_tick(tempo);
    let mut tempo_changes = 0;
    let mut dropped_notes = 0;
    let mut slots = Slots::default();
    let mut out = EventWriter::default();
    let mut last_tick = 0u64;

    for msg in timeline {
        let (note, on) = match msg.message {
            MidiMessage::Tempo(us) => {
                if us != tempo {
                    log::debug!("tick {}: tempo {} -> {} us/beat", msg.tick, tempo, us);
                    tempo = us;
                    tick_ms = ms_per_tick(us);
                    tempo_changes += 1;
                }
                continue;
            }
            MidiMessage::NoteOn { note, velocity, .. } => (note, velocity > 0),
            MidiMessage::NoteOff { note, .. } => (note, false),
        };

        let gap = msg.tick - last_tick;
        if gap > 0 {
            out.hold(slots.frequencies(), gap as f64 * tick_ms);
        }

        if on {
            if !slots.note_on(note) {
                dropped_notes += 1;
                log::warn!(
                    "tick {}: all {} voices busy, dropping note {}",
                    msg.tick,
                    CHANNELS,
                    note
                );
            }
        } else {
            slots.note_off(note);
        }
        last_tick = msg.tick;
    }

    out.hold(slots.frequencies(), options.tail_ms as f64);
    out.events.push(ToneEvent::silence(MIN_HOLD_MS));

    let events = out.events;
    let total_duration_ms = events[..events.len() - 1]
        .iter()
        .fold(0 as Millis, |acc, ev| acc.saturating_add(ev.hold_ms() as Millis));

    let title = options
        .title
        .as_deref()
        .or_else(|| midi.name().filter(|n| !n.is_empty()))
        .unwrap_or(UNTITLED);

    log::info!(
        "compiled {} events, {} ms, {} dropped notes",
        events.len(),
        total_duration_ms,
        dropped_notes
    );

    Compiled {
        track: Track::new(title, &options.author, events, total_duration_ms),
        dropped_notes,
        tempo_changes,
    }
}
