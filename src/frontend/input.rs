//! Keyboard to controller mapping.

use minifb::{Key, Window};

use crate::controller::{
    BUTTON_A, BUTTON_B, BUTTON_DOWN, BUTTON_LEFT, BUTTON_RIGHT, BUTTON_SELECT, BUTTON_START,
    BUTTON_UP,
};

pub const KEY_MAP: [(Key, u8); 8] = [
    (Key::J, BUTTON_A),
    (Key::K, BUTTON_B),
    (Key::RightShift, BUTTON_SELECT),
    (Key::Enter, BUTTON_START),
    (Key::Up, BUTTON_UP),
    (Key::Down, BUTTON_DOWN),
    (Key::Left, BUTTON_LEFT),
    (Key::Right, BUTTON_RIGHT),
];

/// Button byte for the keys currently held in `window`.
pub fn buttons(window: &Window) -> u8 {
    buttons_from_keys(&window.get_keys())
}

pub fn buttons_from_keys(keys: &[Key]) -> u8 {
    KEY_MAP
        .iter()
        .filter(|(key, _)| keys.contains(key))
        .fold(0, |buttons, (_, button)| buttons | button)
}

/// Toggles emulation on and off; Escape still quits.
pub const PAUSE_KEY: Key = Key::P;

#[derive(Debug, Default)]
pub struct Pause {
    paused: bool,
}

impl Pause {
    /// Flip the state when `pressed` (keys newly pressed this frame) holds the pause key.
    pub fn update(&mut self, pressed: &[Key]) -> bool {
        if pressed.contains(&PAUSE_KEY) {
            self.paused = !self.paused;
        }
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
