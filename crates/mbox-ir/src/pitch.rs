//! MIDI note to frequency conversion (12-TET, A4 = 440 Hz).

/// MIDI note number of A4.
const A4_NOTE: i16 = 69;

/// Frequency of A4 in Hz.
const A4_HZ: f32 = 440.0;

/// Frequency of a MIDI note in Hz. Note 0 is treated as "no note".
pub fn note_to_hz(note: u8) -> f32 {
    if note == 0 {
        return 0.0;
    }
    let semitones = (note as i16 - A4_NOTE) as f32;
    A4_HZ * libm::powf(2.0, semitones / 12.0)
}

/// Frequency of a MIDI note rounded to whole Hz, as stored in tone events.
pub fn note_to_freq(note: u8) -> u16 {
    let hz = libm::roundf(note_to_hz(note));
    if hz >= u16::MAX as f32 {
        u16::MAX
    } else {
        hz as u16
    }
}
