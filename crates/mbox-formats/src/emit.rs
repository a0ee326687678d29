//! Rust source emitter for compiled tracks.
//!
//! The firmware has no file system, so a compiled track is baked into the
//! image as a `static` event table plus a [`StaticTrack`] describing it.
//!
//! [`StaticTrack`]: mbox_ir::StaticTrack

use std::io::{self, Write};

use mbox_ir::Track;

/// Write `track` as a Rust module defining `EVENTS` and `TRACK`.
pub fn write_track_source(w: &mut impl Write, track: &Track) -> io::Result<()> {
    writeln!(w, "// Generated by mbox-cli. Do not edit.")?;
    writeln!(w)?;
    writeln!(w, "use mbox_ir::{{StaticTrack, ToneEvent}};")?;
    writeln!(w)?;
    writeln!(w, "pub static EVENTS: [ToneEvent; {}] = [", track.events.len())?;
    for ev in &track.events {
        let [a, b, c, d] = ev.freq;
        writeln!(w, "    ToneEvent::new([{}, {}, {}, {}], {}),", a, b, c, d, ev.delay_ms)?;
    }
    writeln!(w, "];")?;
    writeln!(w)?;
    writeln!(
        w,
        "pub static TRACK: StaticTrack = StaticTrack::new({:?}, {:?}, &EVENTS, {});",
        track.title.as_str(),
        track.author.as_str(),
        track.total_duration_ms
    )
}

pub fn track_source(track: &Track) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_track_source(&mut buf, track);
    String::from_utf8_lossy(&buf).into_owned()
}
