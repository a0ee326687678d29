//! Standard MIDI File reader.
//!
//! Reads SMF format 0, 1 and 2 files with ticks-per-beat timing. Only the
//! messages the track compiler cares about are kept: note on/off, tempo and
//! the track name. Everything else (controllers, sysex, other meta events)
//! is decoded far enough to be skipped.

use binrw::io::Cursor;
use binrw::{BinRead, BinReaderExt};

use crate::FormatError;

/// Tempo assumed until the first tempo meta event (120 BPM).
pub const DEFAULT_TEMPO_US: u32 = 500_000;

/// Ticks per beat used when the header says 0.
const FALLBACK_TICKS_PER_BEAT: u16 = 480;

/// `MThd` + length + format + track count + division.
const HEADER_LEN: usize = 14;
/// Chunk id + length.
const CHUNK_HEADER_LEN: usize = 8;

const META: u8 = 0xFF;
const SYSEX: u8 = 0xF0;
const SYSEX_ESCAPE: u8 = 0xF7;

const META_TRACK_NAME: u8 = 0x03;
const META_END_OF_TRACK: u8 = 0x2F;
const META_TEMPO: u8 = 0x51;

#[derive(BinRead, Debug)]
#[br(big, magic = b"MThd")]
struct HeaderChunk {
    length: u32,
    format: u16,
    track_count: u16,
    division: u16,
}

#[derive(BinRead, Debug)]
#[br(big)]
struct ChunkHeader {
    id: [u8; 4],
    length: u32,
}

/// A decoded MIDI file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MidiFile {
    pub format: u16,
    pub ticks_per_beat: u16,
    pub tracks: Vec<MidiTrack>,
}

impl MidiFile {
    /// Name of the first track that has one.
    pub fn name(&self) -> Option<&str> {
        self.tracks.iter().find_map(|t| t.name.as_deref())
    }

    /// First tempo of the first track, which sets the initial tempo.
    pub fn initial_tempo(&self) -> u32 {
        self.tracks
            .first()
            .and_then(|t| {
                t.messages.iter().find_map(|m| match m.message {
                    MidiMessage::Tempo(us) => Some(us),
                    _ => None,
                })
            })
            .unwrap_or(DEFAULT_TEMPO_US)
    }

    pub fn note_count(&self) -> usize {
        self.tracks
            .iter()
            .flat_map(|t| &t.messages)
            .filter(|m| matches!(m.message, MidiMessage::NoteOn { velocity, .. } if velocity > 0))
            .count()
    }
}

/// One `MTrk` chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MidiTrack {
    pub name: Option<String>,
    pub messages: Vec<TimedMessage>,
}

/// A message at an absolute tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedMessage {
    pub tick: u64,
    pub message: MidiMessage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on; velocity 0 counts as a note off
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    /// Microseconds per beat
    Tempo(u32),
}

/// Parse a Standard MIDI File.
pub fn parse_midi(data: &[u8]) -> Result<MidiFile, FormatError> {
    if !data.starts_with(b"MThd") {
        return Err(FormatError::InvalidHeader);
    }
    if data.len() < HEADER_LEN {
        return Err(FormatError::UnexpectedEof);
    }

    let mut cursor = Cursor::new(data);
    let header: HeaderChunk = cursor.read_be()?;
    if header.length < 6 {
        return Err(FormatError::InvalidHeader);
    }
    if header.format > 2 {
        return Err(FormatError::UnsupportedVersion);
    }
    if header.division & 0x8000 != 0 {
        return Err(FormatError::UnsupportedTiming);
    }
    let ticks_per_beat = match header.division {
        0 => FALLBACK_TICKS_PER_BEAT,
        d => d,
    };
    cursor.set_position(8 + header.length as u64);

    let mut tracks = Vec::with_capacity(header.track_count as usize);
    while (cursor.position() as usize) < data.len() && tracks.len() < header.track_count as usize {
        if data.len() - (cursor.position() as usize) < CHUNK_HEADER_LEN {
            return Err(FormatError::UnexpectedEof);
        }
        let chunk: ChunkHeader = cursor.read_be()?;
        let start = cursor.position() as usize;
        let end = start
            .checked_add(chunk.length as usize)
            .filter(|&end| end <= data.len())
            .ok_or(FormatError::UnexpectedEof)?;

        if &chunk.id == b"MTrk" {
            tracks.push(parse_track(&data[start..end])?);
        } else {
            log::debug!("skipping unknown chunk {:?}", String::from_utf8_lossy(&chunk.id));
        }
        cursor.set_position(end as u64);
    }

    if tracks.len() < header.track_count as usize {
        log::warn!(
            "header announces {} tracks, found {}",
            header.track_count,
            tracks.len()
        );
    }

    Ok(MidiFile {
        format: header.format,
        ticks_per_beat,
        tracks,
    })
}

// ---------------------------------------------------------------------------
// TrackReader: cursor over one MTrk body
// ---------------------------------------------------------------------------

struct TrackReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> TrackReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn peek_u8(&self) -> Result<u8, FormatError> {
        self.data.get(self.pos).copied().ok_or(FormatError::UnexpectedEof)
    }

    fn read_u8(&mut self) -> Result<u8, FormatError> {
        let v = self.peek_u8()?;
        self.pos += 1;
        Ok(v)
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if self.pos + n > self.data.len() {
            return Err(FormatError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Variable-length quantity: 7 bits per byte, high bit continues, at
    /// most four bytes.
    fn read_var_len(&mut self) -> Result<u32, FormatError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let byte = self.read_u8()?;
            value = (value << 7) | (byte & 0x7F) as u32;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(FormatError::Malformed(format!(
            "variable-length value longer than 4 bytes at offset {}",
            self.pos
        )))
    }

    fn read_data_byte(&mut self) -> Result<u8, FormatError> {
        let byte = self.read_u8()?;
        if byte & 0x80 != 0 {
            return Err(FormatError::Malformed(format!(
                "status byte {:#04x} where data was expected at offset {}",
                byte,
                self.pos - 1
            )));
        }
        Ok(byte)
    }
}

fn parse_track(data: &[u8]) -> Result<MidiTrack, FormatError> {
    let mut r = TrackReader::new(data);
    let mut track = MidiTrack::default();
    let mut tick = 0u64;
    let mut running_status: Option<u8> = None;

    while !r.at_end() {
        tick += r.read_var_len()? as u64;

        let status = if r.peek_u8()? & 0x80 != 0 {
            r.read_u8()?
        } else {
            running_status.ok_or_else(|| {
                FormatError::Malformed(format!("data byte without running status at offset {}", r.pos))
            })?
        };

        match status {
            META => {
                let kind = r.read_u8()?;
                let len = r.read_var_len()? as usize;
                let body = r.read_bytes(len)?;
                match kind {
                    META_END_OF_TRACK => break,
                    META_TEMPO if len == 3 => {
                        let us = u32::from_be_bytes([0, body[0], body[1], body[2]]);
                        track.messages.push(TimedMessage {
                            tick,
                            message: MidiMessage::Tempo(us),
                        });
                    }
                    META_TRACK_NAME if track.name.is_none() => {
                        track.name = Some(String::from_utf8_lossy(body).trim().to_string());
                    }
                    _ => {}
                }
            }
            SYSEX | SYSEX_ESCAPE => {
                let len = r.read_var_len()? as usize;
                r.read_bytes(len)?;
            }
            0x80..=0xEF => {
                running_status = Some(status);
                let channel = status & 0x0F;
                match status & 0xF0 {
                    0x80 => {
                        let note = r.read_data_byte()?;
                        r.read_data_byte()?;
                        track.messages.push(TimedMessage {
                            tick,
                            message: MidiMessage::NoteOff { channel, note },
                        });
                    }
                    0x90 => {
                        let note = r.read_data_byte()?;
                        let velocity = r.read_data_byte()?;
                        track.messages.push(TimedMessage {
                            tick,
                            message: MidiMessage::NoteOn { channel, note, velocity },
                        });
                    }
                    // program change, channel pressure
                    0xC0 | 0xD0 => {
                        r.read_data_byte()?;
                    }
                    // key pressure, controller, pitch bend
                    _ => {
                        r.read_data_byte()?;
                        r.read_data_byte()?;
                    }
                }
            }
            other => {
                return Err(FormatError::Malformed(format!(
                    "unexpected status byte {:#04x} at offset {}",
                    other,
                    r.pos - 1
                )));
            }
        }
    }

    Ok(track)
}
