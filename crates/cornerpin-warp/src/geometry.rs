//! Corner model: the four destination corners and their derived envelope.
//!
//! Corners are held either in editor units (as handed in by the host) or in
//! device units (editor units multiplied by the pixel density). The space is
//! tracked on the set itself so scaling is never applied twice.

use cornerpin_engine::coords::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::WarpError;

/// Index of each corner in winding order.
pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_RIGHT: usize = 2;
pub const BOTTOM_LEFT: usize = 3;

/// Unit space of a corner set.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoordSpace {
    /// Logical units.
    Editor,
    /// Logical units multiplied by the pixel density.
    Device,
}

/// Exactly four corners in TL, TR, BR, BL order.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerSet {
    points: [Vec2; 4],
    space: CoordSpace,
    /// Points are relative to an outer frame and must be shifted to the local
    /// origin before rendering.
    pub has_relative_coordinates: bool,
}

impl CornerSet {
    pub fn new(points: [Vec2; 4], space: CoordSpace) -> Self {
        Self { points, space, has_relative_coordinates: false }
    }

    /// Builds a set from an arbitrary slice; anything but 4 points is rejected.
    pub fn from_slice(points: &[[f32; 2]], space: CoordSpace) -> Result<Self, WarpError> {
        let points: [[f32; 2]; 4] = points
            .try_into()
            .map_err(|_| WarpError::CornerCount(points.len()))?;
        Ok(Self::new(points.map(Vec2::from), space))
    }

    /// Axis-aligned `[0,0],[w,0],[w,h],[0,h]`.
    pub fn rectangle(width: f32, height: f32, space: CoordSpace) -> Self {
        Self::new(
            [
                Vec2::new(0.0, 0.0),
                Vec2::new(width, 0.0),
                Vec2::new(width, height),
                Vec2::new(0.0, height),
            ],
            space,
        )
    }

    #[inline]
    pub fn points(&self) -> &[Vec2; 4] {
        &self.points
    }

    #[inline]
    pub fn points_mut(&mut self) -> &mut [Vec2; 4] {
        &mut self.points
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }

    /// Overwrites one corner. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, point: Vec2) {
        if let Some(p) = self.points.get_mut(index) {
            *p = point;
        }
    }

    #[inline]
    pub fn space(&self) -> CoordSpace {
        self.space
    }

    pub fn to_arrays(&self) -> Vec<[f32; 2]> {
        self.points.iter().map(|p| p.to_array()).collect()
    }

    /// Moves an editor-space set into device space.
    ///
    /// A set already in device space is left untouched.
    pub fn apply_density(&mut self, density: f32) {
        if self.space == CoordSpace::Device {
            log::debug!("corner set already in device space; density not reapplied");
            return;
        }
        scale_by_density(&mut self.points, density);
        self.space = CoordSpace::Device;
    }

    /// Envelope of the current points, in the set's own space.
    #[inline]
    pub fn bounds(&self) -> BoundsRect {
        compute_bounds(&self.points)
    }

    /// Shifts the points so the envelope minimum sits at the origin; returns the
    /// envelope measured before the shift.
    pub fn normalize(&mut self) -> BoundsRect {
        let bounds = self.bounds();
        normalize_to_local_origin(&mut self.points, &bounds);
        bounds
    }
}

/// Axis-aligned envelope of a point set.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BoundsRect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundsRect {
    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.min_x, self.min_y)
    }

    /// True when no pixels can be covered.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Multiplies every point by `factor` in place.
pub fn scale_by_density(coords: &mut [Vec2], factor: f32) {
    for p in coords.iter_mut() {
        *p = *p * factor;
    }
}

/// Min/max reduction over `coords`.
///
/// Empty input and non-finite reductions collapse to zero.
pub fn compute_bounds(coords: &[Vec2]) -> BoundsRect {
    let Some((&first, rest)) = coords.split_first() else {
        return BoundsRect::default();
    };

    let (lo, hi) = rest
        .iter()
        .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));

    let finite_or_zero = |v: f32| if v.is_finite() { v } else { 0.0 };
    let min_x = finite_or_zero(lo.x);
    let min_y = finite_or_zero(lo.y);
    let max_x = finite_or_zero(hi.x);
    let max_y = finite_or_zero(hi.y);

    BoundsRect {
        min_x,
        max_x,
        min_y,
        max_y,
        width: (max_x - min_x).abs(),
        height: (max_y - min_y).abs(),
    }
}

/// Subtracts the envelope minimum from every point.
pub fn normalize_to_local_origin(coords: &mut [Vec2], bounds: &BoundsRect) {
    let min = bounds.min();
    for p in coords.iter_mut() {
        *p = *p - min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad(pts: [[f32; 2]; 4]) -> CornerSet {
        CornerSet::new(pts.map(Vec2::from), CoordSpace::Editor)
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn from_slice_requires_four_points() {
        let three = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        assert!(matches!(
            CornerSet::from_slice(&three, CoordSpace::Editor),
            Err(WarpError::CornerCount(3))
        ));

        let five = [[0.0, 0.0]; 5];
        assert!(matches!(
            CornerSet::from_slice(&five, CoordSpace::Device),
            Err(WarpError::CornerCount(5))
        ));

        let four = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let set = CornerSet::from_slice(&four, CoordSpace::Device).unwrap();
        assert_eq!(set.space(), CoordSpace::Device);
        assert_eq!(set.to_arrays(), four.to_vec());
    }

    #[test]
    fn set_ignores_out_of_range_index() {
        let mut set = CornerSet::rectangle(10.0, 10.0, CoordSpace::Editor);
        set.set(7, Vec2::new(99.0, 99.0));
        assert_eq!(set, CornerSet::rectangle(10.0, 10.0, CoordSpace::Editor));
    }

    // ── density ───────────────────────────────────────────────────────────

    #[test]
    fn density_is_applied_once() {
        let mut set = CornerSet::rectangle(100.0, 80.0, CoordSpace::Editor);
        set.apply_density(2.0);
        set.apply_density(2.0);
        assert_eq!(set.space(), CoordSpace::Device);
        assert_eq!(set.get(BOTTOM_RIGHT), Some(Vec2::new(200.0, 160.0)));
    }

    #[test]
    fn scale_empty_is_noop() {
        let mut empty: [Vec2; 0] = [];
        scale_by_density(&mut empty, 3.0);
    }

    // ── bounds ────────────────────────────────────────────────────────────

    #[test]
    fn bounds_of_rectangle() {
        let b = quad([[0.0, 0.0], [100.0, 0.0], [100.0, 80.0], [0.0, 80.0]]).bounds();
        assert_eq!(
            b,
            BoundsRect { min_x: 0.0, max_x: 100.0, min_y: 0.0, max_y: 80.0, width: 100.0, height: 80.0 }
        );
    }

    #[test]
    fn bounds_envelope_of_crossed_quad() {
        let b = quad([[50.0, -10.0], [-20.0, 30.0], [5.0, 5.0], [70.0, 90.0]]).bounds();
        assert_relative_eq!(b.min_x, -20.0);
        assert_relative_eq!(b.max_x, 70.0);
        assert_relative_eq!(b.min_y, -10.0);
        assert_relative_eq!(b.max_y, 90.0);
        assert_relative_eq!(b.width, 90.0);
        assert_relative_eq!(b.height, 100.0);
    }

    #[test]
    fn bounds_of_empty_and_non_finite_are_zero() {
        assert_eq!(compute_bounds(&[]), BoundsRect::default());

        let b = compute_bounds(&[Vec2::new(f32::NAN, 1.0), Vec2::new(f32::INFINITY, 3.0)]);
        assert_eq!(b.min_x, 0.0);
        assert_eq!(b.max_x, 0.0);
        assert_eq!(b.width, 0.0);
        assert_eq!(b.height, 2.0);
    }

    #[test]
    fn zero_quad_is_degenerate() {
        let b = quad([[0.0, 0.0]; 4]).bounds();
        assert_eq!(b, BoundsRect::default());
        assert!(b.is_degenerate());
    }

    // ── normalize ─────────────────────────────────────────────────────────

    #[test]
    fn normalize_moves_min_to_origin() {
        let mut set = quad([[10.0, 20.0], [110.0, 25.0], [105.0, 90.0], [12.0, 85.0]]);
        let before = set.normalize();
        assert_eq!(before.min(), Vec2::new(10.0, 20.0));

        let after = set.bounds();
        assert_eq!(after.min(), Vec2::zero());
        assert_relative_eq!(after.width, before.width);
        assert_relative_eq!(after.height, before.height);
        assert_eq!(set.get(TOP_RIGHT), Some(Vec2::new(100.0, 5.0)));
    }
}
