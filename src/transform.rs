// 2D affine transforms for placing overlays on the surface.
//
// Column-vector convention: a point maps as
// `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
// `A.then(B)` means "apply A, then B".

/// Location in surface (or image-local) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    pub fn translate(tx: f32, ty: f32) -> Self {
        Self { tx, ty, ..Self::IDENTITY }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// Clockwise on screen (y points down), angle in degrees.
    pub fn rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, tx: 0.0, ty: 0.0 }
    }

    /// Horizontal shear: x' = x + k*y.
    pub fn skew_x(k: f32) -> Self {
        Self { c: k, ..Self::IDENTITY }
    }

    /// Compose: apply `self` first, then `next`.
    pub fn then(&self, next: &Affine) -> Affine {
        Affine {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            tx: next.a * self.tx + next.c * self.ty + next.tx,
            ty: next.b * self.tx + next.d * self.ty + next.ty,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Apply only the linear part (for direction vectors).
    pub fn apply_vector(&self, v: Point) -> Point {
        Point::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// None when the transform collapses the plane (zero scale).
    pub fn inverse(&self) -> Option<Affine> {
        let det = self.determinant();
        if det.abs() < 1e-8 {
            return None;
        }
        let inv = 1.0 / det;
        let a = self.d * inv;
        let b = -self.b * inv;
        let c = -self.c * inv;
        let d = self.a * inv;
        Some(Affine {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + c * self.ty),
            ty: -(b * self.tx + d * self.ty),
        })
    }

    /// Axis-aligned bounds of the transformed rectangle `[0,w] x [0,h]`,
    /// as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds_of_rect(&self, w: f32, h: f32) -> (f32, f32, f32, f32) {
        let corners = [
            self.apply(Point::new(0.0, 0.0)),
            self.apply(Point::new(w, 0.0)),
            self.apply(Point::new(w, h)),
            self.apply(Point::new(0.0, h)),
        ];
        corners.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(p: Point, x: f32, y: f32) -> bool {
        (p.x - x).abs() < 1e-3 && (p.y - y).abs() < 1e-3
    }

    #[test]
    fn test_then_applies_left_to_right() {
        // scale first, then translate
        let m = Affine::scale(2.0, 3.0).then(&Affine::translate(10.0, 20.0));
        assert!(close(m.apply(Point::new(1.0, 1.0)), 12.0, 23.0));
    }

    #[test]
    fn test_rotate_quarter_turn_is_clockwise_on_screen() {
        let m = Affine::rotate(90.0);
        assert!(close(m.apply(Point::new(1.0, 0.0)), 0.0, 1.0));
    }

    #[test]
    fn test_inverse_undoes_full_overlay_chain() {
        let m = Affine::scale(0.5, 1.5)
            .then(&Affine::skew_x(0.3))
            .then(&Affine::rotate(33.0))
            .then(&Affine::translate(120.0, -40.0));
        let inv = m.inverse().unwrap();
        let p = Point::new(17.0, 42.0);
        let back = inv.apply(m.apply(p));
        assert!(close(back, p.x, p.y));
    }

    #[test]
    fn test_zero_scale_has_no_inverse() {
        assert!(Affine::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_bounds_of_rotated_square_grow() {
        let m = Affine::rotate(45.0);
        let (x0, y0, x1, y1) = m.bounds_of_rect(10.0, 10.0);
        let diag = 10.0 * std::f32::consts::SQRT_2;
        assert!((x1 - x0 - diag).abs() < 1e-3);
        assert!((y1 - y0 - diag).abs() < 1e-3);
    }
}
