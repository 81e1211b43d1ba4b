// The tattoo artwork (built in or from a directory) and the thumbnail strip
// under the surface.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::draw::{draw_rect, fill_rect};
use crate::error::Error;
use crate::gamma::GammaLut;
use crate::types::FrameBuffer;

/// Number keys 1-9 pick tattoos, so the strip holds at most nine.
pub const MAX_TATTOOS: usize = 9;

/// Artwork compiled into the binary, used unless a tattoo directory is configured.
const BUNDLED: [(&str, &[u8]); 4] = [
    ("tattoo1", include_bytes!("../assets/tattoos/tattoo1.png")),
    ("tattoo2", include_bytes!("../assets/tattoos/tattoo2.png")),
    ("tattoo3", include_bytes!("../assets/tattoos/tattoo3.png")),
    ("tattoo4", include_bytes!("../assets/tattoos/tattoo4.png")),
];

pub const THUMB_SIZE: usize = 80;
const THUMB_GAP: usize = 8;
const THUMB_PAD: u32 = 4;
/// Height of the strip drawn below the surface.
pub const STRIP_HEIGHT: usize = THUMB_SIZE + 2 * THUMB_GAP;

const TILE_BG: u32 = 0x00_3A_3A_3A;
const STRIP_BG: u32 = 0x00_22_22_22;
const BORDER_IDLE: u32 = 0x00_80_80_80;
const BORDER_ACTIVE: u32 = 0x00_FF_30_30;

pub struct Tattoo {
    pub name: String,
    pub image: RgbaImage,
    thumbnail: FrameBuffer,
}

impl Tattoo {
    pub fn new(name: impl Into<String>, image: RgbaImage, lut: &GammaLut) -> Self {
        let thumbnail = make_thumbnail(&image, lut);
        Self { name: name.into(), image, thumbnail }
    }
}

#[derive(Default)]
pub struct Catalog {
    tattoos: Vec<Tattoo>,
}

impl Catalog {
    pub fn from_tattoos(mut tattoos: Vec<Tattoo>) -> Self {
        tattoos.truncate(MAX_TATTOOS);
        Self { tattoos }
    }

    /// The built-in artwork set. Works from any working directory.
    pub fn bundled(lut: &GammaLut) -> Result<Self, Error> {
        let mut tattoos = Vec::with_capacity(BUNDLED.len());
        for (name, bytes) in BUNDLED {
            let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
                .map_err(|e| Error::Assets(format!("built-in {name}: {e}")))?;
            tattoos.push(Tattoo::new(name, img.to_rgba8(), lut));
        }
        Ok(Self { tattoos })
    }

    /// Load every PNG in `dir`, sorted by file name. Files that fail to
    /// decode are skipped with a warning.
    pub fn load_dir(dir: &Path, lut: &GammaLut) -> Result<Self, Error> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| Error::Assets(format!("read {}: {e}", dir.display())))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        paths.sort();

        let mut tattoos = Vec::new();
        for path in paths {
            if tattoos.len() == MAX_TATTOOS {
                log::warn!("more than {MAX_TATTOOS} tattoos in {}, ignoring the rest", dir.display());
                break;
            }
            match image::open(&path) {
                Ok(img) => {
                    let name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    tattoos.push(Tattoo::new(name, img.to_rgba8(), lut));
                }
                Err(e) => log::warn!("skipping tattoo {}: {e}", path.display()),
            }
        }

        log::info!("loaded {} tattoo(s) from {}", tattoos.len(), dir.display());
        Ok(Self { tattoos })
    }

    pub fn len(&self) -> usize {
        self.tattoos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tattoos.is_empty()
    }

    /// How many thumbnails fit side by side in a strip `width` pixels wide.
    pub fn slots_for_width(width: usize) -> usize {
        (width.saturating_sub(THUMB_GAP) / (THUMB_SIZE + THUMB_GAP)).min(MAX_TATTOOS)
    }

    /// Drop tattoos whose thumbnails would fall off the right edge of the
    /// strip, so every loaded tattoo stays clickable.
    pub fn fit_to_width(&mut self, width: usize) {
        let slots = Self::slots_for_width(width);
        if self.tattoos.len() > slots {
            log::warn!(
                "strip {width}px wide fits {slots} thumbnails, dropping {} tattoo(s)",
                self.tattoos.len() - slots
            );
            self.tattoos.truncate(slots);
        }
    }

    pub fn get(&self, index: usize) -> Option<&Tattoo> {
        self.tattoos.get(index)
    }

    /// Window x of thumbnail `index`'s left edge.
    fn thumb_x(index: usize) -> usize {
        THUMB_GAP + index * (THUMB_SIZE + THUMB_GAP)
    }

    /// Which thumbnail sits under window point (x, y), given the strip
    /// starts at `strip_top`.
    pub fn thumbnail_at(&self, x: f32, y: f32, strip_top: usize) -> Option<usize> {
        let top = (strip_top + THUMB_GAP) as f32;
        if y < top || y >= top + THUMB_SIZE as f32 || x < 0.0 {
            return None;
        }
        (0..self.len()).find(|&i| {
            let left = Self::thumb_x(i) as f32;
            x >= left && x < left + THUMB_SIZE as f32
        })
    }

    /// Draw the strip into `fb` starting at row `strip_top`; thumbnails of
    /// tattoos in `active` get a red border.
    pub fn draw_strip(&self, fb: &mut FrameBuffer, strip_top: usize, active: &[usize]) {
        fill_rect(fb, 0, strip_top as i32, fb.width as i32, STRIP_HEIGHT as i32, STRIP_BG);
        let y = strip_top + THUMB_GAP;
        for (i, t) in self.tattoos.iter().enumerate() {
            let x = Self::thumb_x(i);
            fb.blit(&t.thumbnail, x, y);
            let color = if active.contains(&i) { BORDER_ACTIVE } else { BORDER_IDLE };
            draw_rect(fb, x as i32, y as i32, THUMB_SIZE as i32, THUMB_SIZE as i32, color);
            if active.contains(&i) {
                draw_rect(fb, x as i32 + 1, y as i32 + 1, THUMB_SIZE as i32 - 2, THUMB_SIZE as i32 - 2, color);
            }
        }
    }
}

/// Fit the artwork into a square tile, alpha-blended over a dark background.
fn make_thumbnail(img: &RgbaImage, lut: &GammaLut) -> FrameBuffer {
    let mut tile = FrameBuffer::new(THUMB_SIZE, THUMB_SIZE);
    tile.fill(TILE_BG);

    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return tile;
    }
    let inner = THUMB_SIZE as u32 - 2 * THUMB_PAD;
    let fit = (inner as f32 / w as f32).min(inner as f32 / h as f32);
    let tw = ((w as f32 * fit).round() as u32).max(1);
    let th = ((h as f32 * fit).round() as u32).max(1);
    let small = image::imageops::thumbnail(img, tw, th);

    let ox = ((THUMB_SIZE as u32 - tw) / 2) as usize;
    let oy = ((THUMB_SIZE as u32 - th) / 2) as usize;
    for (x, y, p) in small.enumerate_pixels() {
        let idx = (oy + y as usize) * THUMB_SIZE + ox + x as usize;
        let a = p[3] as f32 / 255.0;
        tile.pixels[idx] = lut.blend_over(tile.pixels[idx], (p[0], p[1], p[2]), a);
    }
    tile
}
