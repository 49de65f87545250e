//! Desktop host: minifb window, rodio audio, keyboard input.

pub mod audio;
pub mod input;
pub mod video;
