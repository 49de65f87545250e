//! Famicore: an NES-style console emulator core.
//!
//! Implements the parts of the chipset documented on the
//! [NESdev Wiki](https://www.nesdev.org/wiki/NES_reference_guide) that mapper-0 games need:
//! Ricoh 2A03 CPU, a tone-level view of its APU, the 2C02 PPU rendered into two layers, and
//! the standard controller.
//!
//! ## Modules (NESdev references)
//!
//! - **apu** – [APU](https://www.nesdev.org/wiki/APU): pulse×2, triangle, noise stub; length
//!   counters and sweep; exposed as [`apu::apu::Voice`]s
//! - **bus** – [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map): RAM, PPU, APU,
//!   controller, PRG ROM; OAM DMA
//! - **cartridge** – [iNES](https://www.nesdev.org/wiki/INES) loading; [NROM](https://www.nesdev.org/wiki/NROM)
//! - **controller** – [Controller reading](https://www.nesdev.org/wiki/Controller_reading): $4016 strobe, shift-out
//! - **cpu** – [6502](https://www.nesdev.org/wiki/CPU): documented opcodes, undocumented as NOP, [NMI](https://www.nesdev.org/wiki/NMI)
//! - **ppu** – [PPU](https://www.nesdev.org/wiki/PPU), [PPU registers](https://www.nesdev.org/wiki/PPU_registers), OAM, nametables, 256×240 layers
//! - **nes** – CPU/PPU/APU synchronisation, one instruction at a time
//! - **config**, **frontend** – command line, window, audio and keyboard host

pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod frontend;
pub mod nes;
pub mod ppu;

pub use cartridge::{Cartridge, CartridgeError};
pub use nes::Nes;
