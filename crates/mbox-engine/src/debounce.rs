//! Button debouncing: raw level samples in, one-shot press events out.

use mbox_ir::{has_elapsed, Millis};

/// Default minimum spacing between two accepted presses of one button.
pub const DEBOUNCE_MS: Millis = 50;

/// The two front-panel buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    /// Button 1: start / stop
    StartStop,
    /// Button 2: pause / resume
    PauseResume,
}

impl Button {
    pub const ALL: [Button; 2] = [Button::StartStop, Button::PauseResume];

    /// Panel number printed next to the button (1 or 2).
    pub const fn id(self) -> u8 {
        match self {
            Button::StartStop => 1,
            Button::PauseResume => 2,
        }
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Button::StartStop),
            2 => Some(Button::PauseResume),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self.id() as usize - 1
    }
}

/// Raw digital input sampling.
pub trait ButtonInput {
    /// Current level of `button`; `true` while held down. Must not block.
    fn is_pressed(&mut self, button: Button) -> bool;
}

/// A press accepted by the debouncer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PressEvent {
    pub button: Button,
    /// System tick at which the press was accepted
    pub at: Millis,
}

/// Per-button debounce record.
#[derive(Clone, Copy, Debug)]
struct ButtonState {
    last_trigger: Millis,
    released: bool,
}

impl ButtonState {
    const fn new() -> Self {
        Self {
            last_trigger: 0,
            released: true,
        }
    }
}

/// Debounce filter for both buttons.
///
/// A press fires when the button reads pressed, was last seen released, and
/// more than `window_ms` have passed since its previous accepted press. Any
/// released sample re-arms the button immediately; the window only gates
/// consecutive presses.
#[derive(Clone, Debug)]
pub struct Debouncer {
    window_ms: Millis,
    buttons: [ButtonState; 2],
}

impl Debouncer {
    pub const fn new(window_ms: Millis) -> Self {
        Self {
            window_ms,
            buttons: [ButtonState::new(); 2],
        }
    }

    /// Feed one raw sample for `button` taken at `now`.
    pub fn poll(&mut self, button: Button, pressed: bool, now: Millis) -> Option<PressEvent> {
        let state = &mut self.buttons[button.index()];

        if !pressed {
            state.released = true;
            return None;
        }

        if state.released && has_elapsed(now, state.last_trigger, self.window_ms) {
            state.last_trigger = now;
            state.released = false;
            return Some(PressEvent { button, at: now });
        }

        None
    }

    pub fn window_ms(&self) -> Millis {
        self.window_ms
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const B1: Button = Button::StartStop;
    const B2: Button = Button::PauseResume;

    /// Hold `button` down over `[from, to)`, returning the accepted presses.
    fn hold(d: &mut Debouncer, button: Button, from: Millis, to: Millis) -> usize {
        (from..to).filter(|&t| d.poll(button, true, t).is_some()).count()
    }

    #[test]
    fn single_press_fires_once() {
        let mut d = Debouncer::default();
        assert_eq!(hold(&mut d, B1, 100, 400), 1);
    }

    #[test]
    fn press_reports_button_and_time() {
        let mut d = Debouncer::default();
        assert_eq!(d.poll(B2, true, 123), Some(PressEvent { button: B2, at: 123 }));
    }

    #[test]
    fn presses_closer_than_window_fire_once() {
        let mut d = Debouncer::default();
        assert!(d.poll(B1, true, 100).is_some());
        assert!(d.poll(B1, false, 110).is_none());
        // 40 ms after the first trigger
        assert!(d.poll(B1, true, 140).is_none());
        assert!(d.poll(B1, true, 150).is_none());
    }

    #[test]
    fn presses_further_than_window_fire_twice() {
        let mut d = Debouncer::default();
        assert!(d.poll(B1, true, 100).is_some());
        assert!(d.poll(B1, false, 120).is_none());
        assert!(d.poll(B1, true, 151).is_some());
    }

    #[test]
    fn exactly_window_apart_is_rejected() {
        let mut d = Debouncer::default();
        assert!(d.poll(B1, true, 100).is_some());
        d.poll(B1, false, 101);
        assert!(d.poll(B1, true, 150).is_none());
        assert!(d.poll(B1, true, 151).is_some());
    }

    #[test]
    fn bounce_inside_window_rearms_but_does_not_fire() {
        let mut d = Debouncer::default();
        assert!(d.poll(B1, true, 100).is_some());
        // contact chatter
        for t in 101..130 {
            assert!(d.poll(B1, t % 2 == 0, t).is_none());
        }
        // the button is still held after the window: the chatter re-armed
        // it, so this counts as a fresh press
        assert!(d.poll(B1, true, 160).is_some());
    }

    #[test]
    fn buttons_are_independent() {
        let mut d = Debouncer::default();
        assert!(d.poll(B1, true, 100).is_some());
        assert!(d.poll(B2, true, 101).is_some());
    }

    #[test]
    fn presses_in_first_window_after_boot_are_ignored() {
        let mut d = Debouncer::default();
        assert!(d.poll(B1, true, 30).is_none());
        d.poll(B1, false, 31);
        assert!(d.poll(B1, true, 51).is_some());
    }

    #[test]
    fn window_survives_tick_wraparound() {
        let mut d = Debouncer::default();
        assert!(d.poll(B1, true, u32::MAX - 10).is_some());
        d.poll(B1, false, u32::MAX - 5);
        // 30 ms later, across the wrap
        assert!(d.poll(B1, true, 19).is_none());
        d.poll(B1, false, 20);
        // 61 ms later
        assert!(d.poll(B1, true, 50).is_some());
    }

    #[test]
    fn button_ids_round_trip() {
        for b in Button::ALL {
            assert_eq!(Button::from_id(b.id()), Some(b));
        }
        assert_eq!(Button::from_id(0), None);
        assert_eq!(Button::from_id(3), None);
    }
}
