//! End-to-end playback scenarios on the simulated board.

use mbox_engine::{PlayerContext, StaticTrack, TimerSettings, ToneEvent, TrackData, CHANNELS};
use mbox_master::{Button, PlaybackState, SimConfig, Simulation};

static EVENTS: [ToneEvent; 5] = [
    ToneEvent::new([440, 0, 0, 0], 250),
    ToneEvent::new([523, 659, 0, 0], 250),
    ToneEvent::new([262, 0, 0, 0], 0),
    ToneEvent::new([330, 392, 494, 587], 300),
    ToneEvent::silence(1),
];
static TRACK: StaticTrack = StaticTrack::new("Hero-mili 8bit ", "somesterdude", &EVENTS, 801);

type Sim<'c> = Simulation<'c, &'static StaticTrack>;

fn settings(freq: [u16; CHANNELS]) -> [Option<TimerSettings>; CHANNELS] {
    freq.map(TimerSettings::for_frequency)
}

/// A booted board with the first debounce window behind it.
fn booted(ctx: &PlayerContext) -> Sim<'_> {
    let mut sim = Simulation::new(ctx, &TRACK, SimConfig::default().with_sample_rate(8_000));
    sim.advance(100);
    sim
}

/// Press start/stop and run the iteration that accepts it.
fn start(sim: &mut Sim<'_>) {
    sim.press(Button::StartStop);
    let it = sim.step();
    assert_eq!(it.presses, 1);
}

#[test]
fn boot_screen() {
    let ctx = PlayerContext::new();
    let mut sim = Simulation::new(&ctx, &TRACK, SimConfig::default());
    sim.step();
    assert_eq!(sim.screen().row(1), "Hero-mili 8bit  ");
    assert_eq!(sim.screen().row(2), "  somesterdude  ");
    assert_eq!(sim.screen().row(3), " 00:00 / 00:00  ");
    assert_eq!(sim.screen().row(4), "[] [..........] ");
    assert_eq!(sim.state(), PlaybackState::Stopped);
}

#[test]
fn presses_during_boot_window_are_ignored() {
    let ctx = PlayerContext::new();
    let mut sim = Simulation::new(&ctx, &TRACK, SimConfig::default());
    sim.press(Button::StartStop);
    sim.advance(40);
    assert_eq!(sim.state(), PlaybackState::Stopped);
    assert_eq!(sim.stats().presses, 0);
}

#[test]
fn events_switch_after_their_delay() {
    let ctx = PlayerContext::new();
    let mut sim = booted(&ctx);
    start(&mut sim);
    assert_eq!(sim.state(), PlaybackState::Playing);
    assert_eq!(sim.status().current_ms, 0);

    sim.step();
    assert_eq!(sim.channel_settings(), settings(EVENTS[0].freq));

    sim.advance(249);
    assert_eq!(sim.channel_settings(), settings(EVENTS[0].freq));
    sim.step();
    assert_eq!(sim.channel_settings(), settings(EVENTS[1].freq));

    // a zero delay still holds for one millisecond
    sim.advance(250);
    assert_eq!(sim.channel_settings(), settings(EVENTS[2].freq));
    sim.step();
    assert_eq!(sim.channel_settings(), settings(EVENTS[3].freq));
    assert_eq!(sim.cursor(), 4);
}

#[test]
fn plays_to_the_end_then_restarts_clean() {
    let ctx = PlayerContext::new();
    let mut sim = booted(&ctx);
    start(&mut sim);

    sim.advance(802);
    assert_eq!(sim.state(), PlaybackState::Playing);
    sim.step();
    assert_eq!(sim.state(), PlaybackState::Stopped);
    assert_eq!(sim.status().current_ms, 0);
    assert_eq!(sim.cursor(), 0);
    assert_eq!(sim.channel_settings(), [None; CHANNELS]);
    assert_eq!(sim.screen().row(4), "[] [..........] ");
    assert_eq!(sim.stats().events_fired, EVENTS.len() as u64);

    // further iterations stay stopped
    sim.advance(500);
    assert_eq!(sim.state(), PlaybackState::Stopped);

    start(&mut sim);
    assert_eq!(sim.state(), PlaybackState::Playing);
    assert_eq!(sim.screen().row(4), "|| [..........] ");
}

#[test]
fn progress_follows_the_playback_clock() {
    let ctx = PlayerContext::new();
    let mut sim = booted(&ctx);
    start(&mut sim);
    sim.advance(401);
    let status = sim.status();
    assert_eq!(status.current_ms, 401);
    assert_eq!(status.total_ms, TRACK.total_duration_ms());
    assert_eq!(status.progress_percent(), 50);
    assert_eq!(status.filled_cells(), 5);
}

#[test]
fn pause_holds_position_and_silences() {
    let ctx = PlayerContext::new();
    let mut sim = booted(&ctx);
    start(&mut sim);
    sim.advance(300);

    sim.click(Button::PauseResume);
    assert_eq!(sim.state(), PlaybackState::Paused);
    assert_eq!(sim.channel_settings(), [None; CHANNELS]);
    assert!(sim.screen().row(4).starts_with(">  ["));
    let cursor = sim.cursor();
    let clock = sim.status().current_ms;

    sim.advance(3_000);
    assert_eq!(sim.cursor(), cursor);
    assert_eq!(sim.status().current_ms, clock);

    sim.click(Button::PauseResume);
    assert_eq!(sim.state(), PlaybackState::Playing);
    assert!(sim.status().current_ms > clock);
    assert!(sim.run_until_stopped(1_000));
}

#[test]
fn stop_mid_track_rewinds() {
    let ctx = PlayerContext::new();
    let mut sim = booted(&ctx);
    start(&mut sim);
    sim.advance(300);

    sim.press(Button::StartStop);
    sim.step();
    assert_eq!(sim.state(), PlaybackState::Stopped);
    assert_eq!(sim.channel_settings(), [None; CHANNELS]);
    assert_eq!(sim.cursor(), 0);
    assert_eq!(sim.status().current_ms, 0);
}

#[test]
fn bouncing_contact_counts_once() {
    let ctx = PlayerContext::new();
    let mut sim = booted(&ctx);
    // chatter: pressed, released, pressed again within the window
    sim.hold(Button::StartStop, 5);
    sim.advance(3);
    sim.hold(Button::StartStop, 5);
    sim.advance(20);
    assert_eq!(sim.stats().presses, 1);
    assert_eq!(sim.state(), PlaybackState::Playing);
}

#[test]
fn pause_is_ignored_while_stopped() {
    let ctx = PlayerContext::new();
    let mut sim = booted(&ctx);
    sim.click(Button::PauseResume);
    assert_eq!(sim.state(), PlaybackState::Stopped);
    assert_eq!(sim.stats().presses, 1);
}
