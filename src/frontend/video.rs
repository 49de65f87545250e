//! Layer compositing into the window buffer.

use crate::ppu::layer::{Layer, is_opaque};

/// Write `0x00RRGGBB` pixels into `out`: an opaque sprite pixel covers the background.
pub fn compose(background: &Layer, sprites: &Layer, out: &mut [u32]) {
    let layers = background.pixels().iter().zip(sprites.pixels());
    for (dst, (bg, sprite)) in out.iter_mut().zip(layers) {
        let pixel = if is_opaque(*sprite) { *sprite } else { *bg };
        *dst = pixel & 0x00FF_FFFF;
    }
}
