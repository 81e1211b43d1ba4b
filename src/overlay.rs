// A tattoo placed on the surface, plus the geometry of its handles.
//
// The overlay maps image pixels to surface pixels through
// `scale -> skew -> rotate -> translate(origin)`, so `(x, y)` is where the
// image's top-left corner lands and rotation pivots around it. Gestures that
// should feel centred (rotation) compensate the origin afterwards.

use serde::{Deserialize, Serialize};

use crate::transform::{Affine, Point};

pub const SCALE_MIN: f32 = 0.2;
pub const SCALE_MAX: f32 = 2.0;
/// Per wheel notch / key press.
pub const SCALE_STEP: f32 = 0.05;

pub const OPACITY_MIN: f32 = 0.2;
pub const OPACITY_MAX: f32 = 1.0;

pub const SKEW_LIMIT: f32 = 1.0;

/// Resizes that would shrink either displayed side below this are rejected.
pub const MIN_SIDE_PX: f32 = 20.0;

/// Handle squares are drawn this big and grabbed within this radius.
pub const HANDLE_SIZE_PX: f32 = 8.0;
pub const HANDLE_HIT_PX: f32 = 8.0;
/// Distance of the rotate handle above the top edge.
pub const ROTATE_HANDLE_OFFSET_PX: f32 = 24.0;

pub fn clamp_scale(v: f32) -> f32 {
    v.clamp(SCALE_MIN, SCALE_MAX)
}

pub fn clamp_opacity(v: f32) -> f32 {
    v.clamp(OPACITY_MIN, OPACITY_MAX)
}

pub fn normalize_degrees(deg: f32) -> f32 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negatives
    if r >= 360.0 { 0.0 } else { r }
}

/// The 8 resize anchors, named like the box positions they sit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleRight,
    BottomRight,
    BottomCenter,
    BottomLeft,
    MiddleLeft,
}

impl Anchor {
    pub const ALL: [Anchor; 8] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleRight,
        Anchor::BottomRight,
        Anchor::BottomCenter,
        Anchor::BottomLeft,
        Anchor::MiddleLeft,
    ];

    /// Position on the unit box; 0.5 on an axis means the anchor leaves that axis alone.
    pub fn unit(self) -> (f32, f32) {
        match self {
            Anchor::TopLeft => (0.0, 0.0),
            Anchor::TopCenter => (0.5, 0.0),
            Anchor::TopRight => (1.0, 0.0),
            Anchor::MiddleRight => (1.0, 0.5),
            Anchor::BottomRight => (1.0, 1.0),
            Anchor::BottomCenter => (0.5, 1.0),
            Anchor::BottomLeft => (0.0, 1.0),
            Anchor::MiddleLeft => (0.0, 0.5),
        }
    }
}

/// What part of the transform affordance sits under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handle {
    Resize(Anchor),
    Rotate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Index into the tattoo catalog.
    pub tattoo: usize,
    /// Natural size of the tattoo image.
    pub width: u32,
    pub height: u32,
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Degrees, clockwise, in [0, 360).
    pub rotation: f32,
    pub skew_x: f32,
    pub opacity: f32,
}

impl Overlay {
    pub fn new(tattoo: usize, width: u32, height: u32, x: f32, y: f32) -> Self {
        Self {
            tattoo,
            width,
            height,
            x,
            y,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            skew_x: 0.0,
            opacity: OPACITY_MAX,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale_x = clamp_scale(scale);
        self.scale_y = clamp_scale(scale);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = clamp_opacity(opacity);
        self
    }

    fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    /// Skew, rotate and translate, without scale. Scaled image space -> surface.
    fn frame(&self) -> Affine {
        Affine::skew_x(self.skew_x)
            .then(&Affine::rotate(self.rotation))
            .then(&Affine::translate(self.x, self.y))
    }

    /// Image pixel space -> surface space.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale_x, self.scale_y).then(&self.frame())
    }

    /// Displayed (scaled) width and height, ignoring rotation.
    pub fn scaled_size(&self) -> (f32, f32) {
        let (w, h) = self.size();
        (w * self.scale_x, h * self.scale_y)
    }

    pub fn center(&self) -> Point {
        let (w, h) = self.size();
        self.transform().apply(Point::new(w / 2.0, h / 2.0))
    }

    /// Hit test against the overlay's unrotated scaled box.
    pub fn contains_axis_aligned(&self, p: Point) -> bool {
        let (w, h) = self.scaled_size();
        p.x >= self.x && p.x <= self.x + w && p.y >= self.y && p.y <= self.y + h
    }

    /// Rotation- and skew-aware hit test through the inverse transform.
    pub fn contains(&self, p: Point) -> bool {
        let Some(inv) = self.transform().inverse() else {
            return false;
        };
        let local = inv.apply(p);
        let (w, h) = self.size();
        local.x >= 0.0 && local.x <= w && local.y >= 0.0 && local.y <= h
    }

    /// Surface positions of the 8 resize anchors.
    pub fn anchor_points(&self) -> [(Anchor, Point); 8] {
        let m = self.transform();
        let (w, h) = self.size();
        Anchor::ALL.map(|a| {
            let (u, v) = a.unit();
            (a, m.apply(Point::new(u * w, v * h)))
        })
    }

    /// Surface position of the rotate handle, above the top edge.
    pub fn rotate_handle_point(&self) -> Point {
        let (w, _) = self.size();
        let top = self.transform().apply(Point::new(w / 2.0, 0.0));
        let up = Affine::rotate(self.rotation).apply_vector(Point::new(0.0, -ROTATE_HANDLE_OFFSET_PX));
        Point::new(top.x + up.x, top.y + up.y)
    }

    pub fn hit_handle(&self, p: Point) -> Option<Handle> {
        if p.distance(self.rotate_handle_point()) <= HANDLE_HIT_PX {
            return Some(Handle::Rotate);
        }
        self.anchor_points()
            .iter()
            .find(|(_, pos)| p.distance(*pos) <= HANDLE_HIT_PX)
            .map(|(a, _)| Handle::Resize(*a))
    }

    /// Result of dragging `anchor` to `cursor`, keeping the opposite anchor
    /// fixed on the surface. `None` means the resize is rejected and the
    /// current box should stay.
    pub fn resized(&self, anchor: Anchor, cursor: Point) -> Option<Overlay> {
        let frame = self.frame();
        let q = frame.inverse()?.apply(cursor);
        let (w, h) = self.size();
        let (u, v) = anchor.unit();
        let (fu, fv) = (1.0 - u, 1.0 - v);

        let fixed_old = Point::new(fu * w * self.scale_x, fv * h * self.scale_y);

        let mut sx = self.scale_x;
        let mut sy = self.scale_y;
        if u != 0.5 {
            sx = (q.x - fixed_old.x) / ((u - fu) * w);
        }
        if v != 0.5 {
            sy = (q.y - fixed_old.y) / ((v - fv) * h);
        }

        if !(sx > 0.0 && sy > 0.0) {
            return None; // would flip
        }
        if w * sx < MIN_SIDE_PX || h * sy < MIN_SIDE_PX {
            return None;
        }
        if !(SCALE_MIN..=SCALE_MAX).contains(&sx) || !(SCALE_MIN..=SCALE_MAX).contains(&sy) {
            return None;
        }

        let fixed_new = Point::new(fu * w * sx, fv * h * sy);
        let shift = frame.apply_vector(Point::new(fixed_old.x - fixed_new.x, fixed_old.y - fixed_new.y));

        Some(Overlay {
            x: self.x + shift.x,
            y: self.y + shift.y,
            scale_x: sx,
            scale_y: sy,
            ..self.clone()
        })
    }

    /// Rotate so the rotate handle points at `cursor`, pivoting on the centre.
    pub fn rotated_towards(&self, cursor: Point) -> Overlay {
        let center = self.center();
        let angle = (cursor.y - center.y).atan2(cursor.x - center.x).to_degrees() + 90.0;
        self.with_rotation_about_center(angle)
    }

    /// Set rotation while keeping the centre where it is on the surface.
    pub fn with_rotation_about_center(&self, degrees: f32) -> Overlay {
        let center = self.center();
        let mut next = Overlay { rotation: normalize_degrees(degrees), ..self.clone() };
        let moved = next.center();
        next.x += center.x - moved.x;
        next.y += center.y - moved.y;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_axis_aligned_hit_uses_scaled_size() {
        let o = Overlay::new(0, 100, 50, 10.0, 10.0).with_scale(0.5);
        assert!(o.contains_axis_aligned(Point::new(60.0, 35.0)));
        assert!(!o.contains_axis_aligned(Point::new(61.0, 20.0)));
    }

    #[test]
    fn test_rotated_hit_rejects_corner_of_bounding_box() {
        let o = Overlay::new(0, 100, 100, 200.0, 200.0).with_rotation_about_center(45.0);
        let c = o.center();
        assert!(o.contains(c));
        // The rotated square's AABB includes this point, the square itself does not.
        let corner_of_aabb = Point::new(c.x - 65.0, c.y - 65.0);
        assert!(!o.contains(corner_of_aabb));
    }

    #[test]
    fn test_resize_bottom_right_keeps_top_left() {
        let o = Overlay::new(0, 100, 100, 50.0, 50.0);
        let r = o.resized(Anchor::BottomRight, Point::new(200.0, 130.0)).unwrap();
        assert!(approx(r.x, 50.0) && approx(r.y, 50.0));
        assert!(approx(r.scale_x, 1.5));
        assert!(approx(r.scale_y, 0.8));
    }

    #[test]
    fn test_resize_top_left_keeps_bottom_right_fixed() {
        let o = Overlay::new(0, 100, 100, 50.0, 50.0);
        let r = o.resized(Anchor::TopLeft, Point::new(100.0, 80.0)).unwrap();
        let br = r.transform().apply(Point::new(100.0, 100.0));
        assert!(approx(br.x, 150.0) && approx(br.y, 150.0));
        assert!(approx(r.scale_x, 0.5));
        assert!(approx(r.scale_y, 0.7));
    }

    #[test]
    fn test_edge_anchor_changes_one_axis() {
        let o = Overlay::new(0, 100, 100, 0.0, 0.0);
        let r = o.resized(Anchor::MiddleRight, Point::new(150.0, 999.0)).unwrap();
        assert!(approx(r.scale_x, 1.5));
        assert!(approx(r.scale_y, 1.0));
    }

    #[test]
    fn test_resize_below_min_side_is_rejected() {
        let o = Overlay::new(0, 100, 100, 0.0, 0.0).with_scale(0.5);
        // 15px wide box
        assert!(o.resized(Anchor::BottomRight, Point::new(15.0, 40.0)).is_none());
        // flip past the fixed corner
        assert!(o.resized(Anchor::BottomRight, Point::new(-10.0, 40.0)).is_none());
    }

    #[test]
    fn test_resize_on_rotated_overlay_keeps_fixed_corner() {
        let o = Overlay::new(0, 80, 40, 100.0, 100.0).with_rotation_about_center(30.0);
        let tl_before = o.transform().apply(Point::new(0.0, 0.0));
        let br = o.anchor_points()[4].1;
        let r = o.resized(Anchor::BottomRight, Point::new(br.x + 10.0, br.y + 5.0)).unwrap();
        let tl_after = r.transform().apply(Point::new(0.0, 0.0));
        assert!(approx(tl_before.x, tl_after.x) && approx(tl_before.y, tl_after.y));
    }

    #[test]
    fn test_rotate_towards_keeps_center() {
        let o = Overlay::new(0, 60, 60, 100.0, 100.0);
        let c = o.center();
        // Pointer straight right of the centre -> quarter turn.
        let r = o.rotated_towards(Point::new(c.x + 50.0, c.y));
        assert!(approx(r.rotation, 90.0));
        let c2 = r.center();
        assert!(approx(c.x, c2.x) && approx(c.y, c2.y));
    }

    #[test]
    fn test_hit_handle_finds_rotate_then_anchor() {
        let o = Overlay::new(0, 100, 100, 100.0, 100.0);
        assert_eq!(o.hit_handle(Point::new(150.0, 76.0)), Some(Handle::Rotate));
        assert_eq!(o.hit_handle(Point::new(201.0, 199.0)), Some(Handle::Resize(Anchor::BottomRight)));
        assert_eq!(o.hit_handle(Point::new(150.0, 150.0)), None);
    }

    #[test]
    fn test_normalize_degrees_wraps_negative() {
        assert!(approx(normalize_degrees(-5.0), 355.0));
        assert!(approx(normalize_degrees(725.0), 5.0));
    }
}
