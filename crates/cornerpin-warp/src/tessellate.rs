//! Bilinear patch tessellation of a corner set.
//!
//! The four corners are the control points of a degree-1 surface in both
//! parametric directions:
//!
//! ```text
//! S(u, v) = lerp(lerp(TL, TR, u), lerp(BL, BR, u), v)
//! ```
//!
//! The patch is sampled on a regular grid. UVs depend only on the grid, so a
//! drag changes positions and never texture coordinates.

use cornerpin_engine::coords::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{BOTTOM_LEFT, BOTTOM_RIGHT, TOP_LEFT, TOP_RIGHT};

/// Upper bound on segments per axis; a 1024 x 1024 grid is already far finer
/// than any on-screen quad needs. Counts from records are clamped to it.
pub const MAX_SEGMENTS: u32 = 1024;

/// Segment counts used to sample the patch.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Resolution {
    /// Fixed segment counts along u and v.
    Fixed { u: u32, v: u32 },
    /// Segment counts derived from the longest opposing edges, one segment per
    /// `cell` units, clamped to `1..=max` (and never past [`MAX_SEGMENTS`]).
    Adaptive { cell: f32, max: u32 },
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Fixed { u: 16, v: 16 }
    }
}

impl Resolution {
    /// Resolves to concrete `(u_segments, v_segments)`, each in
    /// `1..=MAX_SEGMENTS`.
    pub fn segments(&self, corners: &[Vec2; 4]) -> (u32, u32) {
        match *self {
            Resolution::Fixed { u, v } => (u.clamp(1, MAX_SEGMENTS), v.clamp(1, MAX_SEGMENTS)),
            Resolution::Adaptive { cell, max } => {
                let max = max.clamp(1, MAX_SEGMENTS);
                let per_cell = |len: f32| -> u32 {
                    if cell > 0.0 && cell.is_finite() {
                        // NaN and negative casts saturate to 0; clamped below.
                        ((len / cell).ceil() as u32).clamp(1, max)
                    } else {
                        1
                    }
                };

                let top = corners[TOP_LEFT].distance(corners[TOP_RIGHT]);
                let bottom = corners[BOTTOM_LEFT].distance(corners[BOTTOM_RIGHT]);
                let left = corners[TOP_LEFT].distance(corners[BOTTOM_LEFT]);
                let right = corners[TOP_RIGHT].distance(corners[BOTTOM_RIGHT]);

                (per_cell(top.max(bottom)), per_cell(left.max(right)))
            }
        }
    }
}

/// Triangle mesh sampled from the patch.
///
/// `points` and `uvs` are parallel arrays; `faces` index into both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TessellatedMesh {
    pub points: Vec<[f32; 2]>,
    pub uvs: Vec<[f32; 2]>,
    pub faces: Vec<[u32; 3]>,
    pub u_segments: u32,
    pub v_segments: u32,
}

/// Flattened index data in the narrowest format that fits.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(v) => v.len(),
            IndexData::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(v) => bytemuck::cast_slice(v),
            IndexData::U32(v) => bytemuck::cast_slice(v),
        }
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            IndexData::U16(_) => wgpu::IndexFormat::Uint16,
            IndexData::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }
}

impl TessellatedMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.faces.len() * 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.faces.is_empty()
    }

    /// 16-bit indices while every vertex is addressable by `u16`, else 32-bit.
    pub fn index_data(&self) -> IndexData {
        let flat = self.faces.iter().flatten().copied();
        if self.points.len() <= u16::MAX as usize + 1 {
            IndexData::U16(flat.map(|i| i as u16).collect())
        } else {
            IndexData::U32(flat.collect())
        }
    }
}

/// Samples the bilinear patch over `corners` (TL, TR, BR, BL).
///
/// Never fails: coincident or crossed corners give zero-area triangles.
pub fn tessellate(corners: &[Vec2; 4], resolution: Resolution) -> TessellatedMesh {
    let (nu, nv) = resolution.segments(corners);
    let (tl, tr, br, bl) = (
        corners[TOP_LEFT],
        corners[TOP_RIGHT],
        corners[BOTTOM_RIGHT],
        corners[BOTTOM_LEFT],
    );

    // Bounded by MAX_SEGMENTS, so every vertex index fits in u32.
    let cols = nu + 1;
    let rows = nv + 1;
    let vertex_count = cols as usize * rows as usize;

    let mut points = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    for j in 0..rows {
        let v = j as f32 / nv as f32;
        for i in 0..cols {
            let u = i as f32 / nu as f32;
            let top = tl.lerp(tr, u);
            let bottom = bl.lerp(br, u);
            points.push(top.lerp(bottom, v).to_array());
            uvs.push([u, v]);
        }
    }

    let mut faces = Vec::with_capacity(nu as usize * nv as usize * 2);
    for j in 0..nv {
        for i in 0..nu {
            let a = j * cols + i;
            let b = a + 1;
            let c = b + cols;
            let d = a + cols;
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }

    TessellatedMesh { points, uvs, faces, u_segments: nu, v_segments: nv }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(w: f32, h: f32) -> [Vec2; 4] {
        [Vec2::new(0.0, 0.0), Vec2::new(w, 0.0), Vec2::new(w, h), Vec2::new(0.0, h)]
    }

    fn corner_indices(mesh: &TessellatedMesh) -> [usize; 4] {
        let cols = (mesh.u_segments + 1) as usize;
        let last = mesh.points.len() - 1;
        [0, cols - 1, last, last + 1 - cols]
    }

    // ── structure ─────────────────────────────────────────────────────────

    #[test]
    fn grid_sizes_and_index_range() {
        let mesh = tessellate(&rect(100.0, 80.0), Resolution::Fixed { u: 4, v: 3 });
        assert_eq!(mesh.points.len(), 5 * 4);
        assert_eq!(mesh.uvs.len(), mesh.points.len());
        assert_eq!(mesh.faces.len(), 4 * 3 * 2);
        assert!(mesh.faces.iter().flatten().all(|&i| (i as usize) < mesh.points.len()));
    }

    #[test]
    fn zero_segments_clamp_to_one() {
        let mesh = tessellate(&rect(10.0, 10.0), Resolution::Fixed { u: 0, v: 0 });
        assert_eq!(mesh.points.len(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 3], [0, 3, 2]]);
    }

    #[test]
    fn cell_faces_share_diagonal() {
        let mesh = tessellate(&rect(10.0, 10.0), Resolution::Fixed { u: 1, v: 1 });
        // a=(0,0) b=(1,0) c=(1,1) d=(0,1) on a 2x2 grid.
        assert_eq!(mesh.faces[0], [0, 1, 3]);
        assert_eq!(mesh.faces[1], [0, 3, 2]);
    }

    // ── sampling ──────────────────────────────────────────────────────────

    #[test]
    fn corners_carry_unit_square_uvs() {
        let corners = rect(100.0, 80.0);
        let mesh = tessellate(&corners, Resolution::default());
        let idx = corner_indices(&mesh);

        let expected_uv = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        for (k, &i) in idx.iter().enumerate() {
            assert_eq!(mesh.uvs[i], expected_uv[k]);
            assert_eq!(mesh.points[i], corners[k].to_array());
        }
    }

    #[test]
    fn interior_sample_is_bilinear() {
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(120.0, 10.0),
            Vec2::new(100.0, 80.0),
            Vec2::new(0.0, 80.0),
        ];
        let mesh = tessellate(&corners, Resolution::Fixed { u: 2, v: 2 });
        // Center sample (i=1, j=1) is the average of the four corners.
        let center = mesh.points[4];
        assert_relative_eq!(center[0], 55.0);
        assert_relative_eq!(center[1], 42.5);
        assert_eq!(mesh.uvs[4], [0.5, 0.5]);
    }

    #[test]
    fn deterministic_and_uv_stable_under_drag() {
        let a = tessellate(&rect(100.0, 80.0), Resolution::default());
        let b = tessellate(&rect(100.0, 80.0), Resolution::default());
        assert_eq!(a, b);

        let mut dragged = rect(100.0, 80.0);
        dragged[TOP_RIGHT] = Vec2::new(120.0, 10.0);
        let c = tessellate(&dragged, Resolution::default());
        assert_eq!(a.uvs, c.uvs);
        assert_eq!(a.faces, c.faces);
        assert_ne!(a.points, c.points);
    }

    #[test]
    fn all_zero_corners_give_nonempty_mesh() {
        let mesh = tessellate(&[Vec2::zero(); 4], Resolution::default());
        assert!(!mesh.is_empty());
        assert!(mesh.points.iter().all(|p| *p == [0.0, 0.0]));
    }

    // ── resolution ────────────────────────────────────────────────────────

    #[test]
    fn adaptive_uses_longest_opposing_edges() {
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 30.0),
            Vec2::new(0.0, 50.0),
        ];
        let r = Resolution::Adaptive { cell: 10.0, max: 64 };
        assert_eq!(r.segments(&corners), (10, 5));

        let capped = Resolution::Adaptive { cell: 1.0, max: 8 };
        assert_eq!(capped.segments(&corners), (8, 8));

        let bad_cell = Resolution::Adaptive { cell: 0.0, max: 8 };
        assert_eq!(bad_cell.segments(&corners), (1, 1));

        assert_eq!(r.segments(&[Vec2::zero(); 4]), (1, 1));
    }

    #[test]
    fn oversized_counts_clamp_to_ceiling() {
        let huge = Resolution::Fixed { u: u32::MAX, v: 70_000 };
        assert_eq!(huge.segments(&rect(1.0, 1.0)), (MAX_SEGMENTS, MAX_SEGMENTS));

        let unbounded = Resolution::Adaptive { cell: 1e-6, max: u32::MAX };
        assert_eq!(unbounded.segments(&rect(100.0, 100.0)), (MAX_SEGMENTS, MAX_SEGMENTS));

        let mesh = tessellate(&rect(10.0, 10.0), Resolution::Fixed { u: u32::MAX, v: 1 });
        assert_eq!(mesh.u_segments, MAX_SEGMENTS);
        assert_eq!(mesh.points.len(), (MAX_SEGMENTS as usize + 1) * 2);
        assert!(mesh.faces.iter().flatten().all(|&i| (i as usize) < mesh.points.len()));
    }

    // ── index format ──────────────────────────────────────────────────────

    #[test]
    fn index_format_widens_past_u16() {
        let small = tessellate(&rect(1.0, 1.0), Resolution::Fixed { u: 16, v: 16 });
        assert_eq!(small.index_data().format(), wgpu::IndexFormat::Uint16);
        assert_eq!(small.index_data().len(), small.index_count());

        // 300 x 300 grid = 90_601 vertices.
        let large = tessellate(&rect(1.0, 1.0), Resolution::Fixed { u: 300, v: 300 });
        let data = large.index_data();
        assert_eq!(data.format(), wgpu::IndexFormat::Uint32);
        assert_eq!(data.as_bytes().len(), large.index_count() * 4);
    }
}
