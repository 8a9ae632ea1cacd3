use cornerpin_engine::coords::{Affine2, Vec2};
use cornerpin_engine::render::{RenderCtx, RenderTarget};

use crate::control::View;
use crate::object::{WarpObject, Warpable};
use crate::source::SourceImage;

use super::buffers::MeshBuffers;
use super::cache::ProgramCache;
use super::filter::{FilterPass, PerspectiveFilter, composite};
use super::texture::{RenderTexture, SourceTexture};

/// GPU state owned by one warp object: its uploaded source, the offscreen
/// warp target and the mesh buffers of both draws.
///
/// The warp pass re-runs when the object's revision differs from the one last
/// warped (or the surface was just created); otherwise the last output is
/// composited again.
pub struct WarpSurface {
    generation: Option<u64>,
    source: Option<SourceTexture>,
    /// Last image refused by the texture limit, so it is not retried per frame.
    rejected: Option<SourceImage>,
    output: Option<RenderTexture>,
    warp_buffers: MeshBuffers,
    composite_buffers: MeshBuffers,
    warped: Option<u64>,
}

impl Default for WarpSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl WarpSurface {
    pub fn new() -> Self {
        Self {
            generation: None,
            source: None,
            rejected: None,
            output: None,
            warp_buffers: MeshBuffers::new("cornerpin warp mesh"),
            composite_buffers: MeshBuffers::new("cornerpin composite quad"),
            warped: None,
        }
    }

    /// Forces the warp pass on the next draw.
    #[inline]
    pub fn mark_stale(&mut self) {
        self.warped = None;
    }

    /// True when the next draw of `object` has to re-run the warp pass.
    #[inline]
    pub fn needs_warp(&self, object: &WarpObject) -> bool {
        self.warped != Some(object.revision())
    }

    /// Size of the last warp output, if one exists.
    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.output.as_ref().map(RenderTexture::size)
    }

    /// Draws `object` into the frame: warp pass when stale, then composite.
    ///
    /// With perspective mode off the source is composited straight into the
    /// layout rect. A source larger than the device's texture limit is skipped.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        programs: &mut ProgramCache,
        object: &WarpObject,
        view: &View,
    ) {
        if self.generation != Some(ctx.generation) {
            if self.generation.is_some() {
                log::debug!("warp surface rebuilt for a new gpu context");
            }
            *self = Self { generation: Some(ctx.generation), ..Self::new() };
        }

        let image = object.image();
        if !self.source.as_ref().is_some_and(|s| s.holds(image)) {
            if self.rejected.as_ref().is_some_and(|r| r.same_pixels(image)) {
                return;
            }
            self.warped = None;
            self.source = SourceTexture::upload(ctx.device, ctx.queue, image, ctx.max_texture_side());
            if self.source.is_none() {
                self.rejected = Some(image.clone());
                self.output = None;
                return;
            }
            self.rejected = None;
        }
        let Some(source) = self.source.as_ref() else { return };

        let to_screen = local_to_screen(object, view);
        let on_screen = |quad: [Vec2; 4]| quad.map(|p| to_screen.transform_point(p));

        if !object.perspective_mode() {
            let quad = on_screen(object.content_quad_local());
            composite(ctx, target, programs, &mut self.composite_buffers, source.view(), quad);
            return;
        }

        if self.needs_warp(object) {
            let mut pass = FilterPass {
                ctx,
                encoder: &mut *target.encoder,
                original: Some(source.view()),
                source: source.view(),
                target: &mut self.output,
                programs: &mut *programs,
                buffers: &mut self.warp_buffers,
                pass: 0,
                destination_width: 0,
                destination_height: 0,
            };
            if PerspectiveFilter::from_object(object).apply_to(&mut pass) {
                log::trace!("warped to {}x{}", pass.destination_width, pass.destination_height);
            }
            self.warped = Some(object.revision());
        }

        let Some(output) = self.output.as_ref() else { return };
        let quad = on_screen(object.warped_quad_local());
        composite(ctx, target, programs, &mut self.composite_buffers, output.view(), quad);
    }
}

/// Object local -> logical screen px.
pub fn local_to_screen(object: &WarpObject, view: &View) -> Affine2 {
    object.placement().transform().then(view.transform())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::WarpOptions;

    fn object() -> WarpObject {
        WarpObject::new(SourceImage::checkerboard(64, 48, 8), WarpOptions::default()).unwrap()
    }

    #[test]
    fn fresh_surface_warps_first_draw() {
        assert!(WarpSurface::new().needs_warp(&object()));
    }

    #[test]
    fn shape_change_survives_consumed_redraw_flag() {
        let mut obj = object();
        let mut surface = WarpSurface::new();
        surface.warped = Some(obj.revision());
        assert!(!surface.needs_warp(&obj));

        // A drag regenerates; the frame that should warp is skipped but the
        // flag is consumed anyway.
        obj.corners_mut().set(2, Vec2::new(80.0, 60.0));
        obj.regenerate();
        assert!(obj.take_redraw());
        assert!(surface.needs_warp(&obj));

        surface.warped = Some(obj.revision());
        assert!(!surface.needs_warp(&obj));
    }

    #[test]
    fn placement_change_reuses_warp_output() {
        let mut obj = object();
        let mut surface = WarpSurface::new();
        surface.warped = Some(obj.revision());
        let moved = obj.placement().pinned(Vec2::zero(), Vec2::new(30.0, 40.0));
        obj.set_placement(moved);
        assert!(obj.needs_redraw());
        assert!(!surface.needs_warp(&obj));

        surface.mark_stale();
        assert!(surface.needs_warp(&obj));
    }
}
