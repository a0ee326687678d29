//! Live session: the playback core running in real time on a host.
//!
//! The session thread plays the board. It fires the tick, runs one loop
//! iteration and renders one millisecond of buzzer audio into the output,
//! whose ring buffer blocks when full and so paces the whole loop at real
//! time. Other threads press buttons and read the screen.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use mbox_audio::{AudioError, AudioOutput, Buzzer, CpalOutput, SamplePacer};
use mbox_engine::{Board, Button, PlaybackState, Player, PlayerContext, StatusSnapshot};
use mbox_formats::{CompileOptions, FormatError};
use mbox_ir::Track;

use crate::buttons::{SharedButtons, SimButtons};
use crate::config::SimConfig;
use crate::screen::{Screen, SharedScreen};
use crate::simulation::Simulation;

/// Headless music box: owns a track and manages a live session.
pub struct Controller {
    track: Track,
    config: SimConfig,
    session: Option<SessionHandle>,
}

struct SessionHandle {
    ctx: Arc<PlayerContext>,
    buttons: Arc<SimButtons>,
    screen: SharedScreen,
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Controller {
    pub fn new(config: SimConfig) -> Self {
        Self {
            track: Track::new("Untitled", "", Vec::new(), 0),
            config,
            session: None,
        }
    }

    // --- Track management ---

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Replace the track; ends any running session.
    pub fn set_track(&mut self, track: Track) {
        self.power_off();
        self.track = track;
    }

    /// Compile a MIDI file and load it. Returns the number of notes that
    /// had to be dropped for lack of voices.
    pub fn load_midi(&mut self, data: &[u8], options: &CompileOptions) -> Result<usize, FormatError> {
        let midi = mbox_formats::parse_midi(data)?;
        let compiled = mbox_formats::compile_track(&midi, options);
        self.set_track(compiled.track);
        Ok(compiled.dropped_notes)
    }

    // --- Live session ---

    /// Power the box on with the default audio device.
    pub fn power_on(&mut self) -> Result<(), AudioError> {
        self.power_on_with(CpalOutput::open)
    }

    /// Power the box on, playing into the output `open` creates. The output
    /// is created on the session thread.
    pub fn power_on_with<O, F>(&mut self, open: F) -> Result<(), AudioError>
    where
        O: AudioOutput,
        F: FnOnce() -> Result<O, AudioError> + Send + 'static,
    {
        self.power_off();

        let ctx = Arc::new(PlayerContext::new());
        let buttons = Arc::new(SimButtons::new());
        let screen = SharedScreen::default();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));

        let session = Session {
            track: self.track.clone(),
            config: self.config,
            ctx: ctx.clone(),
            buttons: buttons.clone(),
            screen: screen.clone(),
            stop_signal: stop_signal.clone(),
            finished: finished.clone(),
        };
        let (ready_tx, ready_rx) = mpsc::channel();
        let thread = std::thread::spawn(move || session.run(open, ready_tx));

        let handle = SessionHandle {
            ctx,
            buttons,
            screen,
            stop_signal,
            finished,
            thread: Some(thread),
        };

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.session = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                handle.join();
                Err(e)
            }
            Err(_) => {
                handle.join();
                Err(AudioError::Playback("session thread exited during start-up".into()))
            }
        }
    }

    pub fn power_off(&mut self) {
        if let Some(session) = self.session.take() {
            session.stop_signal.store(true, Ordering::Relaxed);
            session.join();
        }
    }

    pub fn is_powered(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.finished.load(Ordering::Relaxed))
    }

    /// Press `button` on the running box.
    pub fn press(&self, button: Button) {
        if let Some(session) = &self.session {
            session.buttons.hold(button, self.config.press_ms);
        }
    }

    /// Playback state of the running box. A session that has ended, for
    /// instance because its audio output failed, reports `Stopped`.
    pub fn state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .filter(|s| !s.finished.load(Ordering::Relaxed))
            .map_or(PlaybackState::Stopped, |s| s.ctx.state())
    }

    pub fn status(&self) -> Option<StatusSnapshot> {
        let session = self.session.as_ref()?;
        Some(StatusSnapshot {
            state: self.state(),
            current_ms: session.ctx.playback_ms(),
            total_ms: self.track.total_duration_ms,
        })
    }

    pub fn screen(&self) -> Option<Screen> {
        self.session.as_ref().map(|s| s.screen.snapshot())
    }

    // --- Offline rendering ---

    /// Play the whole track on a virtual clock and return the buzzer output.
    pub fn render_samples(&self) -> Vec<i16> {
        let ctx = PlayerContext::new();
        let mut sim = Simulation::new(&ctx, &self.track, self.config);
        // presses are ignored until the first debounce window has passed
        sim.advance(self.config.player.debounce_ms + 1);
        sim.press(Button::StartStop);
        sim.start_recording();
        if !sim.run_until_stopped(self.config.max_render_ms) {
            log::warn!("render cut off after {} ms", self.config.max_render_ms);
        }
        sim.take_audio()
    }

    pub fn render_to_wav(&self) -> Vec<u8> {
        mbox_formats::samples_to_wav(&self.render_samples(), self.config.sample_rate)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.power_off();
    }
}

impl SessionHandle {
    fn join(mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("session thread panicked");
            }
        }
    }
}

/// Everything the session thread owns or shares.
struct Session {
    track: Track,
    config: SimConfig,
    ctx: Arc<PlayerContext>,
    buttons: Arc<SimButtons>,
    screen: SharedScreen,
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl Session {
    fn run<O, F>(self, open: F, ready: mpsc::Sender<Result<(), AudioError>>)
    where
        O: AudioOutput,
        F: FnOnce() -> Result<O, AudioError>,
    {
        let mut output = match open() {
            Ok(output) => output,
            Err(e) => {
                self.finished.store(true, Ordering::Relaxed);
                let _ = ready.send(Err(e));
                return;
            }
        };
        let sample_rate = output.sample_rate();
        log::info!("session started at {} Hz: {:?}", sample_rate, self.track.title.as_str());
        let _ = ready.send(Ok(()));

        let board = Board {
            tones: Buzzer::new(sample_rate),
            buttons: SharedButtons(self.buttons.clone()),
            display: self.screen.clone(),
        };
        let mut player = Player::new(&self.ctx, &self.track, board, self.config.player);
        let mut pacer = SamplePacer::new(sample_rate);
        let mut buf = Vec::with_capacity(sample_rate as usize / 1000 + 1);

        while !self.stop_signal.load(Ordering::Relaxed) {
            self.ctx.on_tick();
            player.poll_once();
            self.buttons.tick();

            buf.resize(pacer.next_tick(), 0);
            player.board_mut().tones.render(&mut buf);
            if let Err(e) = output.write(&buf) {
                log::error!("audio output failed: {}", e);
                break;
            }
        }

        // let the ring buffer drain to silence
        buf.clear();
        buf.resize(sample_rate as usize / 10, 0);
        let _ = output.write(&buf);
        let _ = output.stop();
        self.finished.store(true, Ordering::Relaxed);
        log::info!("session ended");
    }
}
