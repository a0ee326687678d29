//! musicbox CLI: compile a MIDI file, then play, render or emit it.
//!
//! Usage:
//!   mbox-cli path/to/song.mid
//!   mbox-cli path/to/song.mid --wav output.wav
//!   mbox-cli --emit track.rs --title "My Song" --author me path/to/song.mid

use mbox_formats::{compile_track, parse_midi, write_track_source, CompileOptions};
use mbox_ir::minutes_seconds;
use mbox_master::{Button, Controller, PlaybackState, SimConfig};
use std::io::Write;
use std::time::Duration;
use std::{env, fs};

const USAGE: &str =
    "Usage: mbox-cli <file.mid> [--wav out.wav] [--emit out.rs] [--title T] [--author A]";

/// Flags that take the next argument as their value.
const VALUE_FLAGS: [&str; 4] = ["--wav", "--emit", "--title", "--author"];

/// First argument that is neither a flag nor a flag's value.
fn midi_path(args: &[String]) -> Option<&String> {
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            rest.next();
        } else if !arg.starts_with("--") {
            return Some(arg);
        }
    }
    None
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let path = midi_path(&args).unwrap_or_else(|| {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    });

    let wav_path = flag_value(&args, "--wav");
    let emit_path = flag_value(&args, "--emit");
    let options = CompileOptions {
        title: flag_value(&args, "--title"),
        author: flag_value(&args, "--author").unwrap_or_default(),
        ..CompileOptions::default()
    };

    let data = fs::read(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path, e);
        std::process::exit(1);
    });

    let midi = parse_midi(&data).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", path, e);
        std::process::exit(1);
    });
    let compiled = compile_track(&midi, &options);
    let track = &compiled.track;

    let (min, sec) = minutes_seconds(track.total_duration_ms);
    println!("Title:    {}", track.title);
    println!("Author:   {}", track.author);
    println!("Tracks:   {} (format {})", midi.tracks.len(), midi.format);
    println!("Notes:    {} ({} dropped)", midi.note_count(), compiled.dropped_notes);
    println!("Tempo:    {} us/beat, {} changes", midi.initial_tempo(), compiled.tempo_changes);
    println!("Events:   {}", track.events.len());
    println!("Duration: {:02}:{:02}", min, sec);
    println!();

    if let Some(out) = &emit_path {
        emit_source(track, out);
    }

    let mut ctrl = Controller::new(SimConfig::default());
    ctrl.set_track(compiled.track);

    match wav_path {
        Some(wav) => render_to_wav(&ctrl, &wav),
        None if emit_path.is_none() => play_audio(&mut ctrl),
        None => {}
    }
}

fn emit_source(track: &mbox_ir::Track, path: &str) {
    let written = fs::File::create(path).and_then(|mut f| write_track_source(&mut f, track));
    if let Err(e) = written {
        eprintln!("Failed to write {}: {}", path, e);
        std::process::exit(1);
    }
    println!("Wrote {} events to {}", track.events.len(), path);
}

fn play_audio(ctrl: &mut Controller) {
    if let Err(e) = ctrl.power_on() {
        eprintln!("Failed to open audio output: {}", e);
        std::process::exit(1);
    }
    // let the first debounce window pass before pressing start
    std::thread::sleep(Duration::from_millis(100));
    ctrl.press(Button::StartStop);
    println!("Playing...");
    println!();

    let started = std::time::Instant::now();
    while ctrl.is_powered()
        && (ctrl.state() != PlaybackState::Stopped || started.elapsed() < Duration::from_millis(500))
    {
        if let Some(status) = ctrl.status() {
            print!("\r{}{}", status.time_line(), status.progress_line());
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    ctrl.power_off();
    println!("\rDone.{:30}", "");
}

fn render_to_wav(ctrl: &Controller, path: &str) {
    let sample_rate = ctrl.config().sample_rate;
    println!("Rendering to {} at {} Hz...", path, sample_rate);

    let wav = ctrl.render_to_wav();
    println!("Rendered {} bytes", wav.len());

    fs::write(path, &wav).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {}", path, e);
        std::process::exit(1);
    });

    println!("Done.");
}
