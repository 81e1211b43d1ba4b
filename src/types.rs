// Core pixel types shared by the camera, the compositor and the window.

use image::{RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Pack an RGBA image into 0x00RRGGBB, dropping alpha.
    pub fn from_rgba(img: &RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let pixels = img.pixels().map(|p| pack_rgb(p[0], p[1], p[2])).collect();
        Self { width: w as usize, height: h as usize, pixels }
    }

    /// Unpack into an `image` RGB buffer (what the PNG encoder wants).
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut raw = Vec::with_capacity(self.pixels.len() * 3);
        for &px in &self.pixels {
            let (r, g, b) = unpack_rgb(px);
            raw.extend_from_slice(&[r, g, b]);
        }
        // Length always matches width*height*3, so the constructor cannot fail.
        RgbImage::from_raw(self.width as u32, self.height as u32, raw)
            .unwrap_or_else(|| RgbImage::new(self.width as u32, self.height as u32))
    }

    /// Copy `src` into this buffer with its top-left at (x, y), clipping at the edges.
    pub fn blit(&mut self, src: &FrameBuffer, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let cols = src.width.min(self.width - x);
        let rows = src.height.min(self.height - y);
        for row in 0..rows {
            let s = row * src.width;
            let d = (y + row) * self.width + x;
            self.pixels[d..d + cols].copy_from_slice(&src.pixels[s..s + cols]);
        }
    }
}

/// Pixel size of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_rgb(px: u32) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}
