//! musicbox: the four-buzzer music box, played from a terminal.
//!
//! Loads a MIDI file, powers the simulated board on and forwards key
//! presses to its two buttons: `1` + Enter is start/stop, `2` + Enter is
//! pause/resume, a bare Enter redraws the screen and `q` quits.

use mbox_master::{Button, CompileOptions, Controller, SimConfig};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use std::{env, fs};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: musicbox <file.mid>");
        std::process::exit(1);
    };

    let data = fs::read(&path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path, e);
        std::process::exit(1);
    });

    let mut ctrl = Controller::new(SimConfig::default());
    match ctrl.load_midi(&data, &CompileOptions::default()) {
        Ok(0) => {}
        Ok(dropped) => log::warn!("{} notes dropped, more than 4 voices at once", dropped),
        Err(e) => {
            eprintln!("Failed to load {}: {}", path, e);
            std::process::exit(1);
        }
    }

    if let Err(e) = ctrl.power_on() {
        eprintln!("Failed to open audio output: {}", e);
        std::process::exit(1);
    }

    println!("1 = start/stop, 2 = pause/resume, Enter = refresh, q = quit");
    show(&ctrl);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match line.trim() {
            "q" | "quit" => break,
            "1" => ctrl.press(Button::StartStop),
            "2" => ctrl.press(Button::PauseResume),
            "" => {}
            other => {
                println!("unknown command {:?}", other);
                continue;
            }
        }
        // give the loop time to see the press and redraw
        std::thread::sleep(Duration::from_millis(80));
        show(&ctrl);
    }

    ctrl.power_off();
}

fn show(ctrl: &Controller) {
    if let Some(screen) = ctrl.screen() {
        println!("{}", screen);
    }
    let _ = io::stdout().flush();
}
