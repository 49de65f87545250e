//! Console: CPU on the NES bus, advanced in instruction-sized steps.
//!
//! Each [`Nes::step`] executes one CPU instruction (or interrupt entry) and then lets the PPU
//! run three dots and the APU one cycle for every CPU cycle it cost.

use log::info;

use crate::{
    apu::apu::Voice,
    bus::NesBus,
    cartridge::Cartridge,
    cpu::cpu::CPU,
    ppu::layer::Layer,
};

pub struct Nes {
    cpu: CPU<NesBus>,
    frames: u64,
}

impl Nes {
    /// Build the bus around `cart` and reset the CPU from the reset vector.
    pub fn new(cart: Cartridge) -> Self {
        let mut cpu = CPU::new(NesBus::new(cart));
        cpu.reset();
        info!("reset: PC=${:04X}", cpu.pc);
        Self { cpu, frames: 0 }
    }

    /// Run one CPU step, then the PPU and APU for the same cycles. Returns true when the PPU
    /// finished a frame during this step.
    pub fn step(&mut self) -> bool {
        let cycles = self.cpu.step();
        let frame_ready = self.cpu.bus.tick(cycles);
        if frame_ready {
            self.frames += 1;
        }
        frame_ready
    }

    /// Step until the next frame is ready.
    pub fn run_frame(&mut self) {
        while !self.step() {}
    }

    pub fn set_buttons(&mut self, buttons: u8) {
        self.cpu.bus.controller.set_buttons(buttons);
    }

    /// Background and sprite layers of the last rendered lines.
    pub fn layers(&mut self) -> (&Layer, &Layer) {
        self.cpu.bus.ppu.layers()
    }

    pub fn voices(&self) -> [Voice; 4] {
        self.cpu.bus.apu.voices()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn cpu(&self) -> &CPU<NesBus> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU<NesBus> {
        &mut self.cpu
    }

    pub fn bus(&self) -> &NesBus {
        &self.cpu.bus
    }

    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.cpu.bus
    }
}
