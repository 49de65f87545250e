//! PPU state machine: registers, VRAM, timing, and layer rendering.
//!
//! Registers: $2000–$2007 (mirrored by the bus). The PPU is advanced in CPU cycles and
//! converts them to dots at 3:1. Each 341-dot crossing moves to the next line; visible lines
//! render into the background and sprite [`Layer`]s, line 241 enters vblank and reports the
//! frame as ready.

use log::{debug, trace};

use crate::{
    cartridge::Mirroring,
    ppu::{
        layer::{Layer, opaque},
        tiles::{SetBits, TILE_BYTES, Tile, decode_all},
    },
};

/// NES 2C02-style 64-color palette (0xRRGGBB). Index 0 = backdrop.
pub const NES_PALETTE_RGB: [u32; 64] = [
    0x545454, 0x001E74, 0x081090, 0x300088, 0x440064, 0x5C0030, 0x540400, 0x3C1800, 0x202A00,
    0x083A00, 0x004000, 0x003C00, 0x00302C, 0x000000, 0x000000, 0x000000, 0x989698, 0x084CC4,
    0x3032EC, 0x5C1EE4, 0x8814B0, 0xA01464, 0x982220, 0x783C00, 0x545A00, 0x287200, 0x087C00,
    0x007628, 0x006678, 0x000000, 0x000000, 0x000000, 0xECEEEC, 0x3C7EEC, 0x5C5CEC, 0x8844EC,
    0xB02CEC, 0xE028B0, 0xD83C50, 0xC45400, 0xAC7000, 0x808800, 0x409C30, 0x20A458, 0x209A88,
    0x404040, 0x000000, 0x000000, 0xECEEEC, 0xA8BCEC, 0xBCACEC, 0xD4A0EC, 0xEC94EC, 0xEC90D4,
    0xEC9CB4, 0xE4B090, 0xDCC878, 0xD4DC78, 0xB8EC98, 0xA8ECBC, 0xA0E4E4, 0xA0A0A0, 0x000000,
    0x000000,
];

/// OAM (Object Attribute Memory): 64 sprites × 4 bytes. Each entry: Y, tile, attr, X.
pub const OAM_LEN: usize = 256;

pub const DOTS_PER_LINE: usize = 341;
pub const LINES_PER_FRAME: u16 = 262;
pub const VISIBLE_LINES: u16 = 240;
pub const POST_RENDER_LINE: u16 = 240;
pub const VBLANK_LINE: u16 = 241;
pub const DOTS_PER_CPU_CYCLE: usize = 3;

/// Hardware limit on sprites drawn per line; the next match sets overflow.
pub const MAX_SPRITES_PER_LINE: usize = 8;

pub const VRAM_SIZE: usize = 0x4000;

pub const CTRL_NAMETABLE: u8 = 0x03;
pub const CTRL_INCREMENT_32: u8 = 0x04;
pub const CTRL_SPRITE_TABLE: u8 = 0x08;
pub const CTRL_BACKGROUND_TABLE: u8 = 0x10;
pub const CTRL_NMI_ENABLE: u8 = 0x80;

pub const MASK_SHOW_BACKGROUND: u8 = 0x08;
pub const MASK_SHOW_SPRITES: u8 = 0x10;

pub const STATUS_SPRITE_OVERFLOW: u8 = 0x20;
pub const STATUS_SPRITE_0_HIT: u8 = 0x40;
pub const STATUS_VBLANK: u8 = 0x80;

const NAMETABLE_BASE: u16 = 0x2000;
const NAMETABLE_SIZE: u16 = 0x400;
const ATTRIBUTE_OFFSET: usize = 0x3C0;
const PALETTE_BASE: u16 = 0x3F00;
const SPRITE_PALETTE_BASE: u16 = 0x3F10;
const PALETTE_STRIDE: usize = 0x20;
/// Tiles per pattern table; the second table starts at this tile index.
const PATTERN_TABLE_TILES: usize = 0x100;

/// Single-slot NMI request raised by the PPU and acknowledged by the CPU.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NmiLine {
    pending: bool,
}

impl NmiLine {
    pub fn raise(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn acknowledge(&mut self) {
        self.pending = false;
    }
}

pub struct PPU {
    /// PPUCTRL ($2000).
    pub ctrl: u8,
    /// PPUMASK ($2001).
    pub mask: u8,
    /// PPUSTATUS bits 5–7.
    pub status: u8,
    pub oam: [u8; OAM_LEN],
    pub oam_addr: u8,
    pub nmi: NmiLine,
    addr: u16,
    /// Shared first/second-write latch of $2005 and $2006.
    write_latch: bool,
    read_buffer: u8,
    scroll_x: u8,
    scroll_y: u8,
    dot: usize,
    line: u16,
    vram: Vec<u8>,
    chr: Vec<u8>,
    chr_writable: bool,
    tiles: Vec<Tile>,
    mirroring: Mirroring,
    /// Attribute-derived palette block per nametable cell, indexed like the nametables.
    palette_blocks: Vec<u8>,
    background: Layer,
    sprites: Layer,
}

impl PPU {
    /// Create a PPU over the cartridge's CHR data. The first dot crossing starts frame line 0.
    pub fn new(chr: Vec<u8>, chr_writable: bool, mirroring: Mirroring) -> Self {
        let tiles = decode_all(&chr);
        debug!(
            "PPU: {} pattern tiles, CHR {}, {:?} mirroring",
            tiles.len(),
            if chr_writable { "RAM" } else { "ROM" },
            mirroring
        );
        Self {
            ctrl: 0,
            mask: 0,
            status: 0,
            oam: [0; OAM_LEN],
            oam_addr: 0,
            nmi: NmiLine::default(),
            addr: 0,
            write_latch: false,
            read_buffer: 0,
            scroll_x: 0,
            scroll_y: 0,
            dot: 0,
            line: LINES_PER_FRAME - 1,
            vram: vec![0; VRAM_SIZE],
            chr,
            chr_writable,
            tiles,
            mirroring,
            palette_blocks: vec![0; 4 * NAMETABLE_SIZE as usize],
            background: Layer::new(),
            sprites: Layer::new(),
        }
    }

    pub fn line(&self) -> u16 {
        self.line
    }

    pub fn dot(&self) -> usize {
        self.dot
    }

    pub fn tile(&self, index: usize) -> Tile {
        self.tiles.get(index).copied().unwrap_or_default()
    }

    /// Advance by `cpu_cycles` CPU cycles (3 dots each). Returns true when this call crossed
    /// into vblank, which happens exactly once per 341×262-dot frame.
    pub fn run(&mut self, cpu_cycles: usize) -> bool {
        self.dot += cpu_cycles * DOTS_PER_CPU_CYCLE;
        let mut frame_ready = false;
        while self.dot >= DOTS_PER_LINE {
            self.dot -= DOTS_PER_LINE;
            frame_ready |= self.next_line();
        }
        frame_ready
    }

    fn next_line(&mut self) -> bool {
        self.line += 1;
        if self.line == LINES_PER_FRAME {
            self.line = 0;
            self.start_frame();
        }

        match self.line {
            0..VISIBLE_LINES => {
                if self.line == 0 {
                    self.refresh_palette_blocks();
                }
                if self.line % 8 == 0 {
                    self.render_background_band(self.line);
                }
                self.render_sprites(self.line);
                false
            }
            POST_RENDER_LINE => false,
            VBLANK_LINE => {
                self.status |= STATUS_VBLANK;
                if self.ctrl & CTRL_NMI_ENABLE != 0 {
                    self.nmi.raise();
                }
                true
            }
            _ => false,
        }
    }

    /// Pre-render wrap: clear vblank and the sprite flags, clear the sprite layer.
    fn start_frame(&mut self) {
        self.status &= !(STATUS_VBLANK | STATUS_SPRITE_0_HIT | STATUS_SPRITE_OVERFLOW);
        self.sprites.clear();
        self.reset_background();
    }

    /// Current background and sprite layers. Disabled layers are cleared first.
    pub fn layers(&mut self) -> (&Layer, &Layer) {
        if self.mask & MASK_SHOW_SPRITES == 0 {
            self.sprites.clear();
        }
        if self.mask & MASK_SHOW_BACKGROUND == 0 {
            self.reset_background();
        }
        (&self.background, &self.sprites)
    }

    /// Fill the background layer with the universal backdrop colour.
    pub fn reset_background(&mut self) {
        let backdrop = self.colour(PALETTE_BASE);
        self.background.fill(backdrop);
    }

    fn colour(&self, palette_addr: u16) -> u32 {
        let index = self.vram[palette_addr as usize] & 0x3F;
        opaque(NES_PALETTE_RGB[index as usize])
    }

    fn refresh_palette_blocks(&mut self) {
        for table in 0..4 {
            let base = (NAMETABLE_BASE + table as u16 * NAMETABLE_SIZE) as usize;
            for row in 0..30 {
                for col in 0..32 {
                    let attr = self.vram[base + ATTRIBUTE_OFFSET + (row / 4) * 8 + col / 4];
                    let shift = ((row % 4) / 2) * 4 + ((col % 4) / 2) * 2;
                    self.palette_blocks[table * NAMETABLE_SIZE as usize + row * 32 + col] =
                        (attr >> shift) & 0x03;
                }
            }
        }
    }

    /// Draw the 8-line band of tiles that starts at `line`.
    fn render_background_band(&mut self, line: u16) {
        let fine_x = (self.scroll_x & 7) as i32;
        let fine_y = (self.scroll_y & 7) as i32;
        let coarse_x = (self.scroll_x >> 3) as usize;
        let coarse_y = (self.scroll_y >> 3) as usize;
        let base_table = (self.ctrl & CTRL_NAMETABLE) as usize;
        let pattern_offset = if self.ctrl & CTRL_BACKGROUND_TABLE != 0 {
            PATTERN_TABLE_TILES
        } else {
            0
        };

        let band = line as usize / 8;
        // Fine Y leaves a gap under the last band; fill it with the next tile row.
        let rows = if fine_y != 0 && band == 29 { 2 } else { 1 };
        let columns = if fine_x != 0 { 33 } else { 32 };

        for screen_row in band..band + rows {
            let (mut table, mut row) = (base_table, screen_row + coarse_y);
            if row >= 30 {
                row -= 30;
                table ^= 2;
            }
            for column in 0..columns {
                let (mut table, mut col) = (table, coarse_x + column);
                if col >= 32 {
                    col -= 32;
                    table ^= 1;
                }
                let cell = table * NAMETABLE_SIZE as usize + row * 32 + col;
                let index = self.vram[NAMETABLE_BASE as usize + cell] as usize;
                let tile = self.tile(index + pattern_offset);
                let block = self.palette_blocks[cell] as u16;
                let x0 = (column * 8) as i32 - fine_x;
                let y0 = (screen_row * 8) as i32 - fine_y;

                for (colour, mask) in tile.masks.into_iter().enumerate() {
                    let palette_addr = if colour == 0 {
                        PALETTE_BASE
                    } else {
                        PALETTE_BASE + block * 4 + colour as u16
                    };
                    let pixel = self.colour(palette_addr);
                    for (x, y) in SetBits(mask) {
                        self.background.put(x0 + x, y0 + y, pixel);
                    }
                }
            }
        }
    }

    /// Evaluate OAM for sprites whose Y equals `line` and draw them one line lower.
    fn render_sprites(&mut self, line: u16) {
        let pattern_offset = if self.ctrl & CTRL_SPRITE_TABLE != 0 {
            PATTERN_TABLE_TILES
        } else {
            0
        };

        let mut matched = [0usize; MAX_SPRITES_PER_LINE];
        let mut count = 0;
        for (index, sprite) in self.oam.chunks_exact(4).enumerate() {
            if sprite[0] as u16 != line {
                continue;
            }
            if count == MAX_SPRITES_PER_LINE {
                self.status |= STATUS_SPRITE_OVERFLOW;
                break;
            }
            if index == 0 {
                self.status |= STATUS_SPRITE_0_HIT;
            }
            matched[count] = index;
            count += 1;
        }

        // Highest OAM index first so sprite 0 ends on top.
        for &index in matched[..count].iter().rev() {
            let [y, tile, attr, x] = [0, 1, 2, 3].map(|i| self.oam[index * 4 + i]);
            let tile = self
                .tile(tile as usize + pattern_offset)
                .flipped(attr & 0x40 != 0, attr & 0x80 != 0);
            let palette = SPRITE_PALETTE_BASE + (attr & 0x03) as u16 * 4;
            for colour in 1..4 {
                let pixel = self.colour(palette + colour as u16);
                for (px, py) in SetBits(tile.masks[colour]) {
                    self.sprites.put(x as i32 + px, y as i32 + 1 + py, pixel);
                }
            }
        }
    }

    /// Register read; `addr` is any mirror of $2000–$2007.
    pub fn read_register(&mut self, addr: u16) -> u8 {
        match addr & 7 {
            2 => self.read_status(),
            4 => self.read_oam_data(),
            7 => self.read_data(),
            reg => {
                trace!("read of write-only PPU register ${:04X}", 0x2000 + reg);
                0
            }
        }
    }

    /// Register write; `addr` is any mirror of $2000–$2007.
    pub fn write_register(&mut self, addr: u16, data: u8) {
        match addr & 7 {
            0 => self.ctrl = data,
            1 => self.mask = data,
            3 => self.oam_addr = data,
            4 => self.write_oam_data(data),
            5 => self.write_scroll(data),
            6 => self.write_addr(data),
            7 => self.write_data(data),
            _ => trace!("write ${data:02X} to read-only PPUSTATUS ignored"),
        }
    }

    /// PPUSTATUS ($2002): returns the flags, then clears vblank and the write latch.
    pub fn read_status(&mut self) -> u8 {
        let status = self.status;
        self.status &= !STATUS_VBLANK;
        self.write_latch = false;
        status
    }

    pub fn read_oam_data(&self) -> u8 {
        self.oam[self.oam_addr as usize]
    }

    pub fn write_oam_data(&mut self, data: u8) {
        self.oam[self.oam_addr as usize] = data;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// Copy a 256-byte page into OAM ($4014 DMA).
    pub fn oam_dma(&mut self, page: &[u8; OAM_LEN]) {
        self.oam.copy_from_slice(page);
    }

    /// PPUSCROLL ($2005): X on the first write, Y on the second. Y values past the visible
    /// height are ignored.
    pub fn write_scroll(&mut self, data: u8) {
        if !self.write_latch {
            self.scroll_x = data;
        } else if (data as u16) < VISIBLE_LINES {
            self.scroll_y = data;
        }
        self.write_latch = !self.write_latch;
    }

    /// PPUADDR ($2006): high byte then low byte.
    pub fn write_addr(&mut self, data: u8) {
        if !self.write_latch {
            self.addr = (self.addr & 0x00FF) | ((data as u16) << 8);
        } else {
            self.addr = (self.addr & 0xFF00) | data as u16;
        }
        self.write_latch = !self.write_latch;
    }

    /// PPUDATA ($2007) read. Below the palette the value comes from the read buffer, which is
    /// then refilled from the addressed byte.
    pub fn read_data(&mut self) -> u8 {
        let addr = self.addr & 0x3FFF;
        let data = if addr < PALETTE_BASE {
            let fresh = self.peek(addr);
            std::mem::replace(&mut self.read_buffer, fresh)
        } else {
            self.vram[addr as usize]
        };
        self.increment_addr();
        data
    }

    pub fn write_data(&mut self, data: u8) {
        self.write_vram(self.addr & 0x3FFF, data);
        self.increment_addr();
    }

    fn increment_addr(&mut self) {
        let step = if self.ctrl & CTRL_INCREMENT_32 != 0 { 32 } else { 1 };
        self.addr = self.addr.wrapping_add(step);
    }

    /// Byte at a PPU address without side effects.
    pub fn peek(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if addr < NAMETABLE_BASE {
            self.chr.get(addr as usize).copied().unwrap_or(0)
        } else {
            self.vram[addr as usize]
        }
    }

    /// Store into PPU address space, replicating nametable and palette mirrors so reads can
    /// index VRAM directly.
    pub fn write_vram(&mut self, addr: u16, data: u8) {
        match addr & 0x3FFF {
            addr @ 0x0000..=0x1FFF => self.write_pattern(addr as usize, data),
            addr @ 0x2000..=0x2FFF => {
                let table = (addr - NAMETABLE_BASE) / NAMETABLE_SIZE;
                let offset = addr % NAMETABLE_SIZE;
                let partner = match self.mirroring {
                    Mirroring::Horizontal => table ^ 1,
                    Mirroring::Vertical => table ^ 2,
                };
                for table in [table, partner] {
                    let target = NAMETABLE_BASE + table * NAMETABLE_SIZE + offset;
                    self.vram[target as usize] = data;
                    let mirror = target + 0x1000;
                    if mirror < PALETTE_BASE {
                        self.vram[mirror as usize] = data;
                    }
                }
            }
            addr @ 0x3000..=0x3EFF => self.write_vram(addr - 0x1000, data),
            addr => {
                // Entry 0 of each sprite palette is shared with the background palette.
                let index = (addr & 0x1F) as usize;
                let aliases = if index & 0x03 == 0 {
                    [index & 0x0F, index | 0x10]
                } else {
                    [index, index]
                };
                for base in (PALETTE_BASE as usize..VRAM_SIZE).step_by(PALETTE_STRIDE) {
                    for index in aliases {
                        self.vram[base + index] = data;
                    }
                }
            }
        }
    }

    fn write_pattern(&mut self, addr: usize, data: u8) {
        if !self.chr_writable {
            trace!("write ${data:02X} to CHR ROM ${addr:04X} ignored");
            return;
        }
        let Some(byte) = self.chr.get_mut(addr) else {
            return;
        };
        *byte = data;
        let index = addr / TILE_BYTES;
        let start = index * TILE_BYTES;
        if let Some(tile) = self.tiles.get_mut(index) {
            *tile = Tile::decode(&self.chr[start..start + TILE_BYTES]);
        }
    }
}
