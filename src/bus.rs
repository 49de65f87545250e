//! Memory bus and address decoding for the NES.
//!
//! Maps CPU addresses to RAM, PPU registers, APU registers, the controller, and cartridge PRG.
//! See [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map).

use log::{debug, trace};

use crate::{
    apu::apu::APU,
    cartridge::{Cartridge, Nrom},
    controller::Controller,
    ppu::ppu::{OAM_LEN, PPU},
};

pub const RAM_SIZE: usize = 0x0800;

/// CPU cycles lost to a $4014 OAM DMA transfer.
pub const OAM_DMA_CYCLES: usize = 514;

/// Trait for memory-mapped I/O and bus access used by the CPU.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Extra cycles the last instruction spent stalled (OAM DMA); clears the count.
    fn take_stall_cycles(&mut self) -> usize {
        0
    }

    /// True while an NMI request is waiting to be serviced.
    fn poll_nmi(&self) -> bool {
        false
    }

    fn acknowledge_nmi(&mut self) {}
}

/// Main NES bus: RAM, PPU, APU, cartridge PRG, and controller.
pub struct NesBus {
    pub ram: [u8; RAM_SIZE],
    pub rom: Nrom,
    pub ppu: PPU,
    pub apu: APU,
    pub controller: Controller,
    stall: usize,
}

impl NesBus {
    /// Create a new bus with the given cartridge.
    pub fn new(cart: Cartridge) -> Self {
        Self {
            ram: [0; RAM_SIZE],
            rom: Nrom::new(cart.prg_rom),
            ppu: PPU::new(cart.chr, cart.chr_is_ram, cart.mirroring),
            apu: APU::new(),
            controller: Controller::new(),
            stall: 0,
        }
    }

    /// Run the PPU and APU for `cycles` CPU cycles. Returns true when a frame became ready.
    pub fn tick(&mut self, cycles: usize) -> bool {
        let frame_ready = self.ppu.run(cycles);
        self.apu.run(cycles);
        frame_ready
    }

    /// $4014: copy CPU page `page` into OAM and stall the CPU.
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        let mut data = [0u8; OAM_LEN];
        for (offset, byte) in data.iter_mut().enumerate() {
            *byte = self.read(base | offset as u16);
        }
        self.ppu.oam_dma(&data);
        self.stall += OAM_DMA_CYCLES;
        debug!("OAM DMA from ${base:04X}");
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            // Internal RAM (mirrored 4x in 0x0000-0x1FFF)
            0x0000..=0x1FFF => self.ram[addr as usize & (RAM_SIZE - 1)],
            // PPU registers $2000-$3FFF (mirrored every 8 bytes)
            0x2000..=0x3FFF => self.ppu.read_register(addr),
            0x4016 => self.controller.read(),
            // Second controller is not connected.
            0x4017 => 0,
            0x4000..=0x4015 => self.apu.read(addr),
            0x4018..=0x7FFF => {
                trace!("read from unmapped ${addr:04X}");
                0
            }
            // Cartridge PRG ROM
            0x8000..=0xFFFF => self.rom.read(addr),
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[addr as usize & (RAM_SIZE - 1)] = data,
            0x2000..=0x3FFF => self.ppu.write_register(addr, data),
            0x4014 => self.oam_dma(data),
            0x4016 => self.controller.write(data),
            0x4000..=0x4015 | 0x4017 => self.apu.write(addr, data),
            0x4018..=0x7FFF => trace!("write ${data:02X} to unmapped ${addr:04X}"),
            0x8000..=0xFFFF => self.rom.write(addr, data),
        }
    }

    fn take_stall_cycles(&mut self) -> usize {
        std::mem::take(&mut self.stall)
    }

    fn poll_nmi(&self) -> bool {
        self.ppu.nmi.is_pending()
    }

    fn acknowledge_nmi(&mut self) {
        self.ppu.nmi.acknowledge();
    }
}
