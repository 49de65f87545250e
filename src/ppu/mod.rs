//! Picture processing unit.
//!
//! See [PPU](https://www.nesdev.org/wiki/PPU), [PPU registers](https://www.nesdev.org/wiki/PPU_registers),
//! [PPU memory map](https://www.nesdev.org/wiki/PPU_memory_map). Timing runs at 341 dots per
//! line and 262 lines per frame; output is split into a background layer and a sprite layer.

pub mod layer;
pub mod ppu;
pub mod tiles;
