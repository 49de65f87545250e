//! Cartridge images and the fixed-bank board they run on.
//!
//! - **cartridge**: parses iNES (.nes) images into PRG ROM, CHR data and mirroring.
//! - **nrom**: mapper 0 PRG decoding ($8000–$FFFF, 16 KiB images mirrored).

pub mod cartridge;
pub mod nrom;

pub use cartridge::{Cartridge, CartridgeError};
pub use nrom::Nrom;

/// Nametable mirroring wired on the cartridge board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000 = $2400, $2800 = $2C00.
    Horizontal,
    /// $2000 = $2800, $2400 = $2C00.
    Vertical,
}
