// Gamma-correct alpha blending via table lookups instead of powf.
// Tattoo edges and half-transparent ink mix with skin in linear light,
// which avoids the dark fringes a plain sRGB lerp leaves around the art.

use crate::types::{pack_rgb, unpack_rgb};

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1) as f32
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255) via 4096-step quantization
    // (index = (linear * 4095).round())
    linear_to_srgb: [u8; 4096],
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaLut {
    /// Build both tables once at startup.
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = (i as f32) / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Source-over of an sRGB colour onto a packed 0x00RRGGBB pixel.
    /// `alpha` is coverage*opacity in [0,1].
    #[inline]
    pub fn blend_over(&self, dst: u32, src: (u8, u8, u8), alpha: f32) -> u32 {
        if alpha <= 0.0 {
            return dst;
        }
        if alpha >= 1.0 {
            return pack_rgb(src.0, src.1, src.2);
        }
        let (dr, dg, db) = unpack_rgb(dst);
        let inv = 1.0 - alpha;
        let mix = |d: u8, s: u8| {
            self.linear_to_srgb_u8(alpha * self.srgb_u8_to_linear(s) + inv * self.srgb_u8_to_linear(d))
        };
        pack_rgb(mix(dr, src.0), mix(dg, src.1), mix(db, src.2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_round_trip_endpoints() {
        let lut = GammaLut::new();
        assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(0)), 0);
        assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(255)), 255);
    }

    #[test]
    fn test_blend_over_extremes() {
        let lut = GammaLut::new();
        let dst = pack_rgb(10, 20, 30);
        assert_eq!(lut.blend_over(dst, (200, 0, 0), 0.0), dst);
        assert_eq!(lut.blend_over(dst, (200, 0, 0), 1.0), pack_rgb(200, 0, 0));
    }

    #[test]
    fn test_half_blend_is_brighter_than_srgb_average() {
        let lut = GammaLut::new();
        let out = lut.blend_over(pack_rgb(0, 0, 0), (255, 255, 255), 0.5);
        let (r, _, _) = unpack_rgb(out);
        // linear-light midpoint of black and white is ~188 in sRGB
        assert!(r > 180 && r < 195, "got {r}");
    }
}
