//! Overlay shape renderers.

pub(crate) mod common;
mod instanced;

pub mod disc;
pub mod segment;

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::DrawList;

use self::disc::DiscRenderer;
use self::segment::SegmentRenderer;

/// Draws a whole overlay `DrawList` on top of the current target.
///
/// Segments are drawn before discs so handles sit above the edges joining them.
#[derive(Default)]
pub struct OverlayRenderer {
    segments: SegmentRenderer,
    discs: DiscRenderer,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
    ) {
        if draw_list.is_empty() {
            return;
        }
        self.segments.render(ctx, target, draw_list);
        self.discs.render(ctx, target, draw_list);
    }
}
