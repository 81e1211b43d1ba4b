// Software compositor: background stretched to the surface, tattoos on top.
// Redraws only when something changed (scene edit, new camera frame, new
// photo); the app marks it dirty and calls `redraw_if_dirty` once per loop.

use image::RgbaImage;

use crate::catalog::Catalog;
use crate::draw::{draw_handle, draw_line};
use crate::gamma::GammaLut;
use crate::overlay::{HANDLE_SIZE_PX, Overlay};
use crate::scene::{Scene, Variant};
use crate::transform::Point;
use crate::types::{FrameBuffer, Size};

const BLANK: u32 = 0x00_00_00_00;
const AFFORDANCE: u32 = 0x00_00_A2_FF;

pub struct Compositor {
    lut: GammaLut,
    surface: FrameBuffer,
    dirty: bool,
}

impl Compositor {
    pub fn new(size: Size) -> Self {
        Self {
            lut: GammaLut::new(),
            surface: FrameBuffer::new(size.width as usize, size.height as usize),
            dirty: true,
        }
    }

    pub fn lut(&self) -> &GammaLut {
        &self.lut
    }

    pub fn surface(&self) -> &FrameBuffer {
        &self.surface
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Re-composite the on-screen surface (with handles) if anything changed.
    /// Returns whether a redraw happened.
    pub fn redraw_if_dirty(&mut self, scene: &Scene, background: Option<&FrameBuffer>, catalog: &Catalog) -> bool {
        if !self.dirty {
            return false;
        }
        render(scene, background, catalog, &self.lut, &mut self.surface, true);
        self.dirty = false;
        true
    }

    /// A fresh surface for export: same pixels as the screen, handles hidden.
    pub fn render_for_export(&self, scene: &Scene, background: Option<&FrameBuffer>, catalog: &Catalog) -> FrameBuffer {
        let mut out = FrameBuffer::new(self.surface.width, self.surface.height);
        render(scene, background, catalog, &self.lut, &mut out, false);
        out
    }
}

/// Composite `scene` into `out`. Pure apart from writing `out`.
pub fn render(
    scene: &Scene,
    background: Option<&FrameBuffer>,
    catalog: &Catalog,
    lut: &GammaLut,
    out: &mut FrameBuffer,
    show_handles: bool,
) {
    match background {
        Some(bg) => blit_stretched(bg, out),
        None => out.fill(BLANK),
    }

    for o in &scene.overlays {
        match catalog.get(o.tattoo) {
            Some(t) => draw_overlay(out, o, &t.image, lut),
            None => log::debug!("overlay refers to missing tattoo {}", o.tattoo),
        }
    }

    if show_handles && scene.variant == Variant::Studio {
        if let Some(o) = scene.selected_overlay() {
            draw_affordance(out, o);
        }
    }
}

/// Nearest-neighbour stretch of `src` over the whole of `dst`.
fn blit_stretched(src: &FrameBuffer, dst: &mut FrameBuffer) {
    if src.width == 0 || src.height == 0 {
        dst.fill(BLANK);
        return;
    }
    if src.width == dst.width && src.height == dst.height {
        dst.pixels.copy_from_slice(&src.pixels);
        return;
    }
    for y in 0..dst.height {
        let sy = y * src.height / dst.height;
        let src_row = &src.pixels[sy * src.width..(sy + 1) * src.width];
        let dst_row = &mut dst.pixels[y * dst.width..(y + 1) * dst.width];
        for (x, px) in dst_row.iter_mut().enumerate() {
            *px = src_row[x * src.width / dst.width];
        }
    }
}

/// Inverse-map every surface pixel inside the overlay's bounds back into the
/// tattoo image and blend what lands inside.
fn draw_overlay(out: &mut FrameBuffer, o: &Overlay, img: &RgbaImage, lut: &GammaLut) {
    let m = o.transform();
    let Some(inv) = m.inverse() else {
        return;
    };
    let (iw, ih) = img.dimensions();
    let (wf, hf) = (iw as f32, ih as f32);

    let (bx0, by0, bx1, by1) = m.bounds_of_rect(wf, hf);
    let x0 = bx0.floor().max(0.0) as usize;
    let y0 = by0.floor().max(0.0) as usize;
    let x1 = (bx1.ceil().max(0.0) as usize).min(out.width);
    let y1 = (by1.ceil().max(0.0) as usize).min(out.height);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for y in y0..y1 {
        // Sample at pixel centres; step through image space incrementally.
        let mut local = inv.apply(Point::new(x0 as f32 + 0.5, y as f32 + 0.5));
        let row = y * out.width;
        for x in x0..x1 {
            if local.x >= 0.0 && local.y >= 0.0 && local.x < wf && local.y < hf {
                let p = img.get_pixel(local.x as u32, local.y as u32);
                let a = (p[3] as f32 / 255.0) * o.opacity;
                let idx = row + x;
                out.pixels[idx] = lut.blend_over(out.pixels[idx], (p[0], p[1], p[2]), a);
            }
            local.x += inv.a;
            local.y += inv.b;
        }
    }
}

/// Outline, 8 resize anchors and the rotate handle.
fn draw_affordance(out: &mut FrameBuffer, o: &Overlay) {
    let anchors = o.anchor_points();
    // TL, TR, BR, BL in ALL order
    let corners = [anchors[0].1, anchors[2].1, anchors[4].1, anchors[6].1];
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        draw_line(out, a.x.round() as i32, a.y.round() as i32, b.x.round() as i32, b.y.round() as i32, AFFORDANCE);
    }

    let top = anchors[1].1;
    let rot = o.rotate_handle_point();
    draw_line(out, top.x.round() as i32, top.y.round() as i32, rot.x.round() as i32, rot.y.round() as i32, AFFORDANCE);

    for (_, p) in anchors {
        draw_handle(out, p.x, p.y, HANDLE_SIZE_PX, AFFORDANCE);
    }
    draw_handle(out, rot.x, rot.y, HANDLE_SIZE_PX, AFFORDANCE);
}
