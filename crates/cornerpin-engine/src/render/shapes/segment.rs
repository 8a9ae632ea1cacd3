use bytemuck::{Pod, Zeroable};

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};

use super::instanced::{InstancedRenderer, OverlayInstance};

/// Draws `DrawCmd::Segment` as quads stretched along the segment, one pixel
/// wider on each side for the anti-aliased edge.
#[derive(Default)]
pub struct SegmentRenderer {
    inner: InstancedRenderer<SegmentInstance>,
}

impl SegmentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, draw_list: &mut DrawList) {
        let instances: Vec<SegmentInstance> = draw_list
            .iter_in_paint_order()
            .filter_map(|item| match &item.cmd {
                DrawCmd::Segment(cmd) if cmd.is_visible() => Some(SegmentInstance {
                    p0: cmd.from.to_array(),
                    p1: cmd.to.to_array(),
                    color: cmd.color.to_array(),
                    width: [cmd.width, 0.0],
                    _pad: [0.0; 2],
                }),
                _ => None,
            })
            .collect();

        self.inner.draw(ctx, target, &instances);
    }
}

/// 48 bytes: endpoints, color, (stroke width, unused) and padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SegmentInstance {
    p0: [f32; 2],
    p1: [f32; 2],
    color: [f32; 4],
    width: [f32; 2],
    _pad: [f32; 2],
}

impl OverlayInstance for SegmentInstance {
    const NAME: &'static str = "segment";
    const SHADER: &'static str = include_str!("shaders/segment.wgsl");

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            1 => Float32x2,
            2 => Float32x2,
            3 => Float32x4,
            4 => Float32x2
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SegmentInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_stride_matches_layout() {
        assert_eq!(std::mem::size_of::<SegmentInstance>(), 48);
        assert_eq!(SegmentInstance::layout().array_stride, 48);
    }
}
