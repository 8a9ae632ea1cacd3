//! The warp object: an image drawable plus the corner set that pins it.

use cornerpin_engine::coords::{Affine2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::control::{HandleDescriptor, corner_handles};
use crate::error::WarpError;
use crate::geometry::{BoundsRect, CoordSpace, CornerSet};
use crate::persist::Passthrough;
use crate::source::SourceImage;
use crate::tessellate::{Resolution, TessellatedMesh, tessellate};

pub const DEFAULT_CROSS_ORIGIN: &str = "anonymous";

/// How the unwarped image fills the object box.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Preserve aspect, contain and center.
    #[default]
    Fit,
    /// Fill the whole box.
    Stretch,
}

/// Base image drawable: the decoded source and its layout.
#[derive(Debug, Clone)]
pub struct ImageDrawable {
    image: SourceImage,
    pub layout: LayoutMode,
}

impl ImageDrawable {
    pub fn new(image: SourceImage, layout: LayoutMode) -> Self {
        Self { image, layout }
    }

    #[inline]
    pub fn image(&self) -> &SourceImage {
        &self.image
    }

    /// Where the image lands inside a box of `size` local units.
    pub fn content_rect(&self, size: Vec2) -> Rect {
        let frame = Rect::from_origin_size(Vec2::zero(), size);
        match self.layout {
            LayoutMode::Fit => frame.fit_centered(self.image.natural_size()),
            LayoutMode::Stretch => frame,
        }
    }
}

/// Object box in world space.
///
/// Local space has its origin at the box top-left; the box is scaled, then
/// rotated about that origin, then translated to `(left, top)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Degrees, clockwise on screen.
    pub angle: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, width: 0.0, height: 0.0, scale_x: 1.0, scale_y: 1.0, angle: 0.0 }
    }
}

impl Placement {
    /// Local -> world.
    pub fn transform(&self) -> Affine2 {
        Affine2::scale(self.scale_x, self.scale_y)
            .then(Affine2::rotate_degrees(self.angle))
            .then(Affine2::translate(Vec2::new(self.left, self.top)))
    }

    #[inline]
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.transform().transform_point(local)
    }

    /// World -> local; `None` when a scale is zero.
    #[inline]
    pub fn to_local(&self, world: Vec2) -> Option<Vec2> {
        self.transform().inverse().map(|inv| inv.transform_point(world))
    }

    #[inline]
    pub fn scaled_size(&self) -> Vec2 {
        Vec2::new(self.width * self.scale_x, self.height * self.scale_y)
    }

    /// Moves the box so `local` maps onto `world`, keeping scale and rotation.
    pub fn pinned(mut self, local: Vec2, world: Vec2) -> Placement {
        let offset = self.transform().transform_vector(local);
        self.left = world.x - offset.x;
        self.top = world.y - offset.y;
        self
    }
}

/// Construction options.
#[derive(Debug, Clone)]
pub struct WarpOptions {
    /// Initial corners. Editor-space sets are scaled by the density once;
    /// device-space sets are taken as is.
    pub perspective_coords: Option<CornerSet>,
    pub pixel_density: f32,
    pub layout_mode: LayoutMode,
    pub cross_origin: String,
    pub resolution: Resolution,
    /// Position, scale and angle; width and height come from the image.
    pub placement: Placement,
    pub perspective_mode: bool,
}

impl Default for WarpOptions {
    fn default() -> Self {
        Self {
            perspective_coords: None,
            pixel_density: 1.0,
            layout_mode: LayoutMode::Fit,
            cross_origin: DEFAULT_CROSS_ORIGIN.to_string(),
            resolution: Resolution::default(),
            placement: Placement::default(),
            perspective_mode: true,
        }
    }
}

/// Capability set the control system drives.
pub trait Warpable {
    fn corners(&self) -> &CornerSet;
    fn corners_mut(&mut self) -> &mut CornerSet;
    fn pixel_density(&self) -> f32;
    fn placement(&self) -> &Placement;
    fn set_placement(&mut self, placement: Placement);
    fn set_path_offset(&mut self, offset: Vec2);
    /// Installed handles; empty when corner editing is off.
    fn handles(&self) -> &[HandleDescriptor];
    /// Rebuilds derived state (bounds, mesh) from the corners and requests a redraw.
    fn regenerate(&mut self);
}

/// Image pinned to four movable corners.
#[derive(Debug, Clone)]
pub struct WarpObject {
    drawable: ImageDrawable,
    corners: CornerSet,
    mesh: TessellatedMesh,
    bounds: BoundsRect,
    pixel_density: f32,
    placement: Placement,
    path_offset: Vec2,
    resolution: Resolution,
    cross_origin: String,
    perspective_mode: bool,
    handles: Vec<HandleDescriptor>,
    passthrough: Passthrough,
    redraw: bool,
    revision: u64,
}

impl WarpObject {
    /// Builds an object around a loaded image.
    ///
    /// The box takes the image's natural size divided by the density. Without
    /// corners the object starts from the axis-aligned quad over its scaled size.
    pub fn new(image: SourceImage, options: WarpOptions) -> Result<Self, WarpError> {
        let WarpOptions {
            perspective_coords,
            pixel_density,
            layout_mode,
            cross_origin,
            resolution,
            placement,
            perspective_mode,
        } = options;

        if !(pixel_density.is_finite() && pixel_density > 0.0) {
            return Err(WarpError::InvalidDensity(pixel_density));
        }

        let natural = image.natural_size() / pixel_density;
        let placement = Placement { width: natural.x, height: natural.y, ..placement };

        let mut corners = perspective_coords.unwrap_or_else(|| initial_corners(&placement));
        corners.apply_density(pixel_density);

        let mut object = Self {
            drawable: ImageDrawable::new(image, layout_mode),
            corners,
            mesh: TessellatedMesh::default(),
            bounds: BoundsRect::default(),
            pixel_density,
            placement,
            path_offset: Vec2::zero(),
            resolution,
            cross_origin,
            perspective_mode: false,
            handles: Vec::new(),
            passthrough: Passthrough::default(),
            redraw: true,
            revision: 0,
        };

        object.regenerate();
        object.set_perspective_mode(perspective_mode);

        log::debug!(
            "warp object ready: src={} box={}x{} corners={:?}",
            object.drawable.image().src(),
            object.placement.width,
            object.placement.height,
            object.corners.to_arrays(),
        );

        Ok(object)
    }

    #[inline]
    pub fn drawable(&self) -> &ImageDrawable {
        &self.drawable
    }

    #[inline]
    pub fn image(&self) -> &SourceImage {
        self.drawable.image()
    }

    #[inline]
    pub fn layout_mode(&self) -> LayoutMode {
        self.drawable.layout
    }

    pub fn set_layout_mode(&mut self, layout: LayoutMode) {
        if self.drawable.layout != layout {
            self.drawable.layout = layout;
            self.redraw = true;
        }
    }

    #[inline]
    pub fn mesh(&self) -> &TessellatedMesh {
        &self.mesh
    }

    /// Envelope of the corners in device units.
    #[inline]
    pub fn bounds(&self) -> BoundsRect {
        self.bounds
    }

    #[inline]
    pub fn path_offset(&self) -> Vec2 {
        self.path_offset
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
        self.regenerate();
    }

    #[inline]
    pub fn cross_origin(&self) -> &str {
        &self.cross_origin
    }

    #[inline]
    pub fn perspective_mode(&self) -> bool {
        self.perspective_mode
    }

    /// Turns corner editing on or off.
    ///
    /// On: layout becomes `Fit`, the four corner handles are installed and the
    /// box tracks the corner envelope. Off: no handles; the image draws unwarped.
    pub fn set_perspective_mode(&mut self, on: bool) {
        self.perspective_mode = on;
        if on {
            self.drawable.layout = LayoutMode::Fit;
            self.handles = corner_handles().to_vec();
            self.sync_box_to_bounds();
        } else {
            self.handles.clear();
        }
        self.revision += 1;
        self.redraw = true;
    }

    /// Restores the axis-aligned quad over the image's natural size, keeping
    /// position, scale and angle.
    pub fn reset_to_initial(&mut self) {
        let natural = self.image().natural_size() / self.pixel_density;
        self.placement.width = natural.x;
        self.placement.height = natural.y;

        let mut corners = initial_corners(&self.placement);
        corners.has_relative_coordinates = self.corners.has_relative_coordinates;
        corners.apply_density(self.pixel_density);
        self.corners = corners;
        self.path_offset = Vec2::zero();
        self.regenerate();
    }

    /// Size of the offscreen warp target in device pixels (at least 1x1).
    pub fn output_size(&self) -> (u32, u32) {
        let w = self.bounds.width.ceil().max(1.0) as u32;
        let h = self.bounds.height.ceil().max(1.0) as u32;
        (w, h)
    }

    /// Local-space quad (TL, TR, BR, BL) covered by the warp target.
    pub fn warped_quad_local(&self) -> [Vec2; 4] {
        let d = self.pixel_density;
        let min = Vec2::new(self.bounds.min_x, self.bounds.min_y) / d;
        let max = Vec2::new(self.bounds.max_x, self.bounds.max_y) / d;
        rect_quad(min, max)
    }

    /// Local-space quad the unwarped image occupies under the layout mode.
    pub fn content_quad_local(&self) -> [Vec2; 4] {
        self.drawable.content_rect(Vec2::new(self.placement.width, self.placement.height)).quad()
    }

    /// Record data carried through untouched (other filters, clip path).
    #[inline]
    pub fn passthrough(&self) -> &Passthrough {
        &self.passthrough
    }

    pub fn set_passthrough(&mut self, passthrough: Passthrough) {
        self.passthrough = passthrough;
    }

    /// Clears and returns the pending redraw request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    #[inline]
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Bumped whenever the warped output would change (corners, mesh, mode).
    /// Unlike the redraw flag it is never cleared, so a renderer can compare
    /// it against the revision it last warped.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Box size follows the corner envelope unless it has no area.
    fn sync_box_to_bounds(&mut self) {
        if self.bounds.is_degenerate() {
            return;
        }
        self.placement.width = self.bounds.width / self.pixel_density;
        self.placement.height = self.bounds.height / self.pixel_density;
    }
}

impl Warpable for WarpObject {
    #[inline]
    fn corners(&self) -> &CornerSet {
        &self.corners
    }

    #[inline]
    fn corners_mut(&mut self) -> &mut CornerSet {
        &mut self.corners
    }

    #[inline]
    fn pixel_density(&self) -> f32 {
        self.pixel_density
    }

    #[inline]
    fn placement(&self) -> &Placement {
        &self.placement
    }

    fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
        self.redraw = true;
    }

    fn set_path_offset(&mut self, offset: Vec2) {
        self.path_offset = offset;
    }

    #[inline]
    fn handles(&self) -> &[HandleDescriptor] {
        &self.handles
    }

    fn regenerate(&mut self) {
        if self.corners.has_relative_coordinates {
            // Corners already at the origin (e.g. right after a drag) keep the
            // offset recorded when they were moved there.
            let removed = self.corners.normalize().min();
            if removed != Vec2::zero() {
                self.path_offset = removed;
            }
        }
        self.bounds = self.corners.bounds();
        self.mesh = tessellate(self.corners.points(), self.resolution);
        self.revision += 1;
        self.redraw = true;
    }
}

/// `[0,0],[w,0],[w,h],[0,h]` over the scaled box, in editor units.
fn initial_corners(placement: &Placement) -> CornerSet {
    let size = placement.scaled_size();
    CornerSet::rectangle(size.x, size.y, CoordSpace::Editor)
}

fn rect_quad(min: Vec2, max: Vec2) -> [Vec2; 4] {
    [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn image(w: u32, h: u32) -> SourceImage {
        SourceImage::checkerboard(w, h, 8)
    }

    fn object(w: u32, h: u32, options: WarpOptions) -> WarpObject {
        WarpObject::new(image(w, h), options).unwrap()
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn initial_quad_from_image_size() {
        let obj = object(100, 80, WarpOptions::default());
        assert_eq!(obj.corners().to_arrays(), vec![[0.0, 0.0], [100.0, 0.0], [100.0, 80.0], [0.0, 80.0]]);
        assert_eq!(obj.corners().space(), CoordSpace::Device);
        assert_eq!(obj.placement().width, 100.0);
        assert_eq!(obj.placement().height, 80.0);
        assert_eq!(obj.mesh().uvs.len(), obj.mesh().points.len());
        assert_eq!(obj.handles().len(), 4);
        assert_eq!(obj.output_size(), (100, 80));
    }

    #[test]
    fn density_divides_box_and_scales_corners() {
        let obj = object(200, 160, WarpOptions { pixel_density: 2.0, ..Default::default() });
        assert_eq!(obj.placement().width, 100.0);
        assert_eq!(obj.placement().height, 80.0);
        // Initial quad is built in editor units, then moved to device units once.
        assert_eq!(obj.corners().get(2), Some(Vec2::new(200.0, 160.0)));
        assert_eq!(obj.output_size(), (200, 160));
    }

    #[test]
    fn invalid_density_is_rejected() {
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = WarpObject::new(image(4, 4), WarpOptions { pixel_density: bad, ..Default::default() });
            assert!(matches!(err, Err(WarpError::InvalidDensity(_))));
        }
    }

    #[test]
    fn device_corners_are_not_rescaled() {
        let corners =
            CornerSet::from_slice(&[[0.0, 0.0], [50.0, 0.0], [50.0, 40.0], [0.0, 40.0]], CoordSpace::Device)
                .unwrap();
        let obj = object(
            100,
            80,
            WarpOptions { perspective_coords: Some(corners.clone()), pixel_density: 2.0, ..Default::default() },
        );
        assert_eq!(obj.corners(), &corners);
        assert_eq!(obj.placement().width, 25.0);
    }

    #[test]
    fn relative_corners_are_normalized() {
        let mut corners =
            CornerSet::from_slice(&[[10.0, 20.0], [60.0, 20.0], [60.0, 70.0], [10.0, 70.0]], CoordSpace::Device)
                .unwrap();
        corners.has_relative_coordinates = true;
        let obj = object(50, 50, WarpOptions { perspective_coords: Some(corners), ..Default::default() });
        assert_eq!(obj.corners().get(0), Some(Vec2::zero()));
        assert_eq!(obj.path_offset(), Vec2::new(10.0, 20.0));
        assert_eq!(obj.bounds().min(), Vec2::zero());
    }

    // ── modes ─────────────────────────────────────────────────────────────

    #[test]
    fn perspective_toggle_installs_handles_and_fit() {
        let mut obj = object(
            100,
            50,
            WarpOptions { layout_mode: LayoutMode::Stretch, perspective_mode: false, ..Default::default() },
        );
        assert!(obj.handles().is_empty());
        assert_eq!(obj.layout_mode(), LayoutMode::Stretch);

        obj.take_redraw();
        obj.set_perspective_mode(true);
        assert_eq!(obj.layout_mode(), LayoutMode::Fit);
        let names: Vec<&str> = obj.handles().iter().map(|h| h.name).collect();
        assert_eq!(names, ["prs1", "prs2", "prs3", "prs4"]);
        assert!(obj.take_redraw());
        assert!(!obj.needs_redraw());

        obj.set_perspective_mode(false);
        assert!(obj.handles().is_empty());
    }

    #[test]
    fn content_quad_follows_layout() {
        let mut obj = object(100, 50, WarpOptions { perspective_mode: false, ..Default::default() });
        let mut p = *obj.placement();
        p.height = 100.0;
        obj.set_placement(p);

        let fit = obj.content_quad_local();
        assert_relative_eq!(fit[0].y, 25.0);
        assert_relative_eq!(fit[2].y, 75.0);

        obj.set_layout_mode(LayoutMode::Stretch);
        let stretch = obj.content_quad_local();
        assert_eq!(stretch[0], Vec2::zero());
        assert_eq!(stretch[2], Vec2::new(100.0, 100.0));
    }

    #[test]
    fn reset_restores_axis_aligned_quad() {
        let mut obj = object(100, 80, WarpOptions::default());
        obj.corners_mut().set(1, Vec2::new(130.0, -20.0));
        obj.regenerate();
        obj.reset_to_initial();
        assert_eq!(obj.corners().to_arrays(), vec![[0.0, 0.0], [100.0, 0.0], [100.0, 80.0], [0.0, 80.0]]);
        assert_eq!(obj.path_offset(), Vec2::zero());
    }

    // ── placement ─────────────────────────────────────────────────────────

    #[test]
    fn placement_round_trips_through_local() {
        let p = Placement { left: 40.0, top: -10.0, width: 100.0, height: 80.0, scale_x: 2.0, scale_y: 0.5, angle: 30.0 };
        let local = Vec2::new(12.0, 7.0);
        let back = p.to_local(p.to_world(local)).unwrap();
        assert_relative_eq!(back.x, local.x, epsilon = 1e-4);
        assert_relative_eq!(back.y, local.y, epsilon = 1e-4);

        let zero = Placement { scale_x: 0.0, ..p };
        assert!(zero.to_local(Vec2::zero()).is_none());
    }

    #[test]
    fn pinned_keeps_local_point_in_place() {
        let p = Placement { left: 5.0, top: 5.0, width: 10.0, height: 10.0, scale_x: 1.5, scale_y: 1.5, angle: 90.0 };
        let pinned = p.pinned(Vec2::new(4.0, 2.0), Vec2::new(100.0, 50.0));
        let w = pinned.to_world(Vec2::new(4.0, 2.0));
        assert_relative_eq!(w.x, 100.0, epsilon = 1e-4);
        assert_relative_eq!(w.y, 50.0, epsilon = 1e-4);
    }
}
