//! 256×240 raster layers handed to the video sink.

pub const WIDTH: usize = 256;
pub const HEIGHT: usize = 240;

/// Pixel value of an untouched sprite-layer pixel (alpha 0).
pub const TRANSPARENT: u32 = 0;

/// Tag an `0xRRGGBB` colour as an opaque layer pixel.
pub const fn opaque(rgb: u32) -> u32 {
    0xFF00_0000 | (rgb & 0x00FF_FFFF)
}

pub fn is_opaque(pixel: u32) -> bool {
    pixel & 0xFF00_0000 != 0
}

/// Row-major `0xAARRGGBB` pixels.
#[derive(Clone)]
pub struct Layer {
    pixels: Vec<u32>,
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer {
    pub fn new() -> Self {
        Self {
            pixels: vec![TRANSPARENT; WIDTH * HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.fill(TRANSPARENT);
    }

    pub fn fill(&mut self, pixel: u32) {
        self.pixels.fill(pixel);
    }

    /// Set one pixel; coordinates outside the screen are clipped.
    pub fn put(&mut self, x: i32, y: i32, pixel: u32) {
        if (0..WIDTH as i32).contains(&x) && (0..HEIGHT as i32).contains(&y) {
            self.pixels[y as usize * WIDTH + x as usize] = pixel;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * WIDTH + x]
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}
