//! Mapper 0 (NROM): no bank switching, 16/32KB PRG.

use log::trace;

/// NROM PRG ROM as seen by the CPU at $8000–$FFFF. A 16 KiB image appears twice.
pub struct Nrom {
    prg_rom: Vec<u8>,
}

impl Nrom {
    pub fn new(prg_rom: Vec<u8>) -> Self {
        Self { prg_rom }
    }

    pub fn read(&self, addr: u16) -> u8 {
        if self.prg_rom.is_empty() {
            return 0;
        }
        let offset = addr.wrapping_sub(0x8000) as usize % self.prg_rom.len();
        self.prg_rom[offset]
    }

    /// PRG is read-only on NROM boards.
    pub fn write(&mut self, addr: u16, data: u8) {
        trace!("write ${data:02X} to PRG ROM ${addr:04X} ignored");
    }
}
