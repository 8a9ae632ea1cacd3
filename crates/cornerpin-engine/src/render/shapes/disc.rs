use bytemuck::{Pod, Zeroable};

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};

use super::instanced::{InstancedRenderer, OverlayInstance};

/// Draws `DrawCmd::Disc` as anti-aliased circles with an optional outer ring.
#[derive(Default)]
pub struct DiscRenderer {
    inner: InstancedRenderer<DiscInstance>,
}

impl DiscRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, draw_list: &mut DrawList) {
        let instances: Vec<DiscInstance> = draw_list
            .iter_in_paint_order()
            .filter_map(|item| match &item.cmd {
                DrawCmd::Disc(cmd) if cmd.radius > 0.0 => Some(cmd),
                _ => None,
            })
            .map(|cmd| {
                let (ring, ring_color) = cmd.border.map_or((0.0, [0.0; 4]), |b| (b.width.max(0.0), b.color.to_array()));
                DiscInstance {
                    center: cmd.center.to_array(),
                    radius_ring: [cmd.radius, ring],
                    fill: cmd.fill.to_array(),
                    ring_color,
                }
            })
            .collect();

        self.inner.draw(ctx, target, &instances);
    }
}

/// 48 bytes: center, (radius, ring width), fill, ring color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DiscInstance {
    center: [f32; 2],
    radius_ring: [f32; 2],
    fill: [f32; 4],
    ring_color: [f32; 4],
}

impl OverlayInstance for DiscInstance {
    const NAME: &'static str = "disc";
    const SHADER: &'static str = include_str!("shaders/disc.wgsl");

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            1 => Float32x2,
            2 => Float32x2,
            3 => Float32x4,
            4 => Float32x4
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DiscInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<DiscInstance>(), 48);
    }
}
