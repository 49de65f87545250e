//! 6502 CPU emulation for the console.
//!
//! Table-driven decode (opcode to operation, addressing mode and base cycles), documented
//! instruction set, NMI/IRQ/BRK entry. Memory and I/O go through the [`Bus`](crate::bus::Bus)
//! trait.

pub mod cpu;
pub mod flags;
pub mod opcodes;

#[cfg(test)]
mod tests;
