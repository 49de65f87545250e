//! Pattern tiles pre-split into per-colour bit masks.
//!
//! A tile is 16 bytes of CHR data: 8 rows of bit-plane 0 followed by 8 rows of bit-plane 1.
//! [`Tile`] stores one `u64` per 2-bit colour index with bit `y * 8 + x` set where the pixel
//! has that colour, so compositing a tile is four walks over set bits.

/// Bytes of CHR data per tile.
pub const TILE_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tile {
    pub masks: [u64; 4],
}

impl Tile {
    /// Decode one tile from its 16 CHR bytes. Short slices decode as zero rows.
    pub fn decode(bytes: &[u8]) -> Self {
        let mut masks = [0u64; 4];
        for y in 0..8 {
            let plane0 = bytes.get(y).copied().unwrap_or(0);
            let plane1 = bytes.get(y + 8).copied().unwrap_or(0);
            for x in 0..8 {
                let bit = 7 - x;
                let colour = ((plane0 >> bit) & 1) | (((plane1 >> bit) & 1) << 1);
                masks[colour as usize] |= 1u64 << (y * 8 + x);
            }
        }
        Self { masks }
    }

    /// Mirror the tile. Vertical flip reverses the row bytes; horizontal flip reverses the
    /// bits inside each row byte.
    pub fn flipped(self, horizontal: bool, vertical: bool) -> Self {
        let masks = self.masks.map(|mut mask| {
            if horizontal {
                mask = mask.reverse_bits().swap_bytes();
            }
            if vertical {
                mask = mask.swap_bytes();
            }
            mask
        });
        Self { masks }
    }
}

/// Decode every complete tile in a CHR image.
pub fn decode_all(chr: &[u8]) -> Vec<Tile> {
    chr.chunks_exact(TILE_BYTES).map(Tile::decode).collect()
}

/// Iterator over the `(x, y)` pixels set in a tile mask.
pub struct SetBits(pub u64);

impl Iterator for SetBits {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros() as i32;
        self.0 &= self.0 - 1;
        Some((bit % 8, bit / 8))
    }
}
