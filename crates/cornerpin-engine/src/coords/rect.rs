use super::Vec2;

/// Axis-aligned box in logical px.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { origin: Vec2::new(x, y), size: Vec2::new(w, h) }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Corners clockwise from the top-left: TL, TR, BR, BL.
    pub fn quad(self) -> [Vec2; 4] {
        let (min, max) = (self.min(), self.max());
        [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)]
    }

    /// Letterboxes `content` into `self`: the largest box with the same aspect
    /// ratio, centered on both axes. Empty content collapses to the center.
    pub fn fit_centered(self, content: Vec2) -> Rect {
        if content.x <= 0.0 || content.y <= 0.0 {
            return Rect::from_origin_size(self.center(), Vec2::zero());
        }
        let scale = (self.size.x / content.x).min(self.size.y / content.y);
        let size = content * scale;
        Rect::from_origin_size(self.center() - size * 0.5, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_runs_clockwise_from_top_left() {
        let q = Rect::new(10.0, 20.0, 30.0, 40.0).quad();
        assert_eq!(q, [
            Vec2::new(10.0, 20.0),
            Vec2::new(40.0, 20.0),
            Vec2::new(40.0, 60.0),
            Vec2::new(10.0, 60.0),
        ]);
    }

    // ── fit_centered ──────────────────────────────────────────────────────

    #[test]
    fn wide_image_gets_bars_above_and_below() {
        let fitted = Rect::new(0.0, 0.0, 100.0, 100.0).fit_centered(Vec2::new(200.0, 100.0));
        assert_eq!(fitted, Rect::new(0.0, 25.0, 100.0, 50.0));
    }

    #[test]
    fn tall_image_gets_bars_left_and_right() {
        let fitted = Rect::new(0.0, 0.0, 100.0, 100.0).fit_centered(Vec2::new(50.0, 100.0));
        assert_eq!(fitted, Rect::new(25.0, 0.0, 50.0, 100.0));
    }

    #[test]
    fn empty_image_collapses_to_center() {
        let fitted = Rect::new(0.0, 0.0, 10.0, 20.0).fit_centered(Vec2::zero());
        assert_eq!(fitted, Rect::new(5.0, 10.0, 0.0, 0.0));
    }
}
