//! NES controller input handling.
//!
//! Implements the standard NES controller shift register protocol:
//! write $01 to $4016 to latch current state; then write $00 and read $4016 repeatedly
//! to get one bit per read (A, B, Select, Start, Up, Down, Left, Right).

pub const BUTTON_A: u8 = 1 << 0;
pub const BUTTON_B: u8 = 1 << 1;
pub const BUTTON_SELECT: u8 = 1 << 2;
pub const BUTTON_START: u8 = 1 << 3;
pub const BUTTON_UP: u8 = 1 << 4;
pub const BUTTON_DOWN: u8 = 1 << 5;
pub const BUTTON_LEFT: u8 = 1 << 6;
pub const BUTTON_RIGHT: u8 = 1 << 7;

/// Standard controller on port 1 ($4016).
#[derive(Debug, Default, Clone)]
pub struct Controller {
    /// Live button states, bit 0 = A ... bit 7 = Right.
    buttons: u8,
    /// Snapshot taken by the last strobe.
    latched: u8,
    strobe: bool,
    /// Next bit to shift out (0–7).
    index: u8,
}

impl Controller {
    /// Create a new controller with no buttons pressed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_buttons(&mut self, buttons: u8) {
        self.buttons = buttons;
        if self.strobe {
            self.latched = buttons;
        }
    }

    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    /// Write to $4016. Bit 0 is the strobe; while it is high the shift register keeps
    /// reloading and rewinding to A.
    pub fn write(&mut self, data: u8) {
        self.strobe = data & 1 != 0;
        if self.strobe {
            self.latched = self.buttons;
            self.index = 0;
        }
    }

    /// Read one button bit from $4016. While strobing this is always A; otherwise each read
    /// advances, wrapping after Right.
    pub fn read(&mut self) -> u8 {
        let bit = (self.latched >> self.index) & 1;
        if !self.strobe {
            self.index = (self.index + 1) % 8;
        }
        bit
    }
}
