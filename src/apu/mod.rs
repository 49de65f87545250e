//! Simplified APU: channel register state exposed as playable voices.
//!
//! - **Pulse** (×2): duty, constant volume, sweep, length counter.
//! - **Triangle**: length counter and 11-bit period.
//! - **Noise**: counters only; the waveform is silent.
//!
//! Sample generation is left to the host (see `frontend::audio`).

pub mod apu;
