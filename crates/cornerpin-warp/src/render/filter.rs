use cornerpin_engine::coords::Vec2;
use cornerpin_engine::render::{RenderCtx, RenderTarget};

use crate::geometry::BoundsRect;
use crate::object::WarpObject;
use crate::tessellate::{IndexData, TessellatedMesh};

use super::buffers::MeshBuffers;
use super::cache::{Program, ProgramCache};
use super::texture::{RenderTexture, WARP_TEXTURE_FORMAT};
use super::{FilterKind, WarpUniform};

/// State threaded through one filter application.
///
/// The filter resizes `target` and reports the size it rendered at through
/// `destination_width` / `destination_height`.
pub struct FilterPass<'a, 'c> {
    pub ctx: &'a RenderCtx<'c>,
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// Unfiltered image; sampled on pass 0.
    pub original: Option<&'a wgpu::TextureView>,
    /// Output of the previous pass.
    pub source: &'a wgpu::TextureView,
    pub target: &'a mut Option<RenderTexture>,
    pub programs: &'a mut ProgramCache,
    pub buffers: &'a mut MeshBuffers,
    pub pass: u32,
    pub destination_width: u32,
    pub destination_height: u32,
}

impl<'a> FilterPass<'a, '_> {
    /// Texture the current pass samples.
    pub fn input(&self) -> &'a wgpu::TextureView {
        match self.original {
            Some(original) if self.pass == 0 => original,
            _ => self.source,
        }
    }
}

/// Corner-pin filter: redraws the source across the tessellated mesh.
#[derive(Debug, Copy, Clone)]
pub struct PerspectiveFilter<'m> {
    pub mesh: &'m TessellatedMesh,
    pub bounds: BoundsRect,
}

impl<'m> PerspectiveFilter<'m> {
    pub fn from_object(object: &'m WarpObject) -> Self {
        Self { mesh: object.mesh(), bounds: object.bounds() }
    }

    /// True when the filter would change the input; a degenerate envelope or
    /// an empty mesh leaves the previous output in place.
    pub fn is_drawable(&self) -> bool {
        !self.bounds.is_degenerate() && !self.mesh.is_empty()
    }

    /// Renders into `pass.target`; returns false when the draw was skipped.
    pub fn apply_to(&self, pass: &mut FilterPass<'_, '_>) -> bool {
        if !self.is_drawable() {
            log::trace!("perspective filter skipped: degenerate bounds or empty mesh");
            return false;
        }

        let width = self.bounds.width.ceil().max(1.0) as u32;
        let height = self.bounds.height.ceil().max(1.0) as u32;
        let max_dim = pass.ctx.max_texture_side();
        if width > max_dim || height > max_dim {
            log::warn!("warp target {width}x{height} exceeds device limit {max_dim}; keeping last frame");
            return false;
        }

        // Mesh positions are drawn relative to the envelope minimum.
        let min = self.bounds.min();
        let positions: Vec<[f32; 2]> = self
            .mesh
            .points
            .iter()
            .map(|p| [p[0] - min.x, p[1] - min.y])
            .collect();
        let indices = self.mesh.index_data();
        let uniform = WarpUniform::for_size(width as f32, height as f32);

        RenderTexture::ensure(pass.target, pass.ctx.device, width, height);
        pass.destination_width = width;
        pass.destination_height = height;

        let ctx = pass.ctx;
        let input = pass.input();
        let Some(target) = pass.target.as_ref() else { return false };
        let program = pass.programs.program(ctx, FilterKind::Perspective, WARP_TEXTURE_FORMAT);
        let Some(mesh) = pass.buffers.upload(
            ctx.device,
            ctx.queue,
            ctx.generation,
            &positions,
            &self.mesh.uvs,
            &indices,
            &uniform,
        ) else {
            return false;
        };

        let bind_group = bind(ctx.device, &program, mesh.uniform, input, "cornerpin perspective bind group");

        let mut rpass = pass.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cornerpin perspective pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view(),
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(program.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.positions);
        rpass.set_vertex_buffer(1, mesh.uvs);
        rpass.set_index_buffer(mesh.indices, mesh.index_format);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        true
    }
}

const UNIT_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Draws `texture` onto the frame surface across `quad` (TL, TR, BR, BL, in
/// logical screen px) with premultiplied blending.
pub fn composite(
    ctx: &RenderCtx<'_>,
    target: &mut RenderTarget<'_>,
    programs: &mut ProgramCache,
    buffers: &mut MeshBuffers,
    texture: &wgpu::TextureView,
    quad: [Vec2; 4],
) {
    if quad.iter().any(|p| !p.is_finite()) {
        return;
    }

    let positions = quad.map(|p| p.to_array());
    let indices = IndexData::U16(vec![0, 1, 2, 0, 2, 3]);
    let uniform = WarpUniform::for_size(ctx.viewport.width, ctx.viewport.height);

    let program = programs.program(ctx, FilterKind::Composite, ctx.surface_format);
    let Some(mesh) = buffers.upload(
        ctx.device,
        ctx.queue,
        ctx.generation,
        &positions,
        &UNIT_UVS,
        &indices,
        &uniform,
    ) else {
        return;
    };

    let bind_group = bind(ctx.device, &program, mesh.uniform, texture, "cornerpin composite bind group");

    let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("cornerpin composite pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
    rpass.set_pipeline(program.pipeline);
    rpass.set_bind_group(0, &bind_group, &[]);
    rpass.set_vertex_buffer(0, mesh.positions);
    rpass.set_vertex_buffer(1, mesh.uvs);
    rpass.set_index_buffer(mesh.indices, mesh.index_format);
    rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
}

fn bind(
    device: &wgpu::Device,
    program: &Program<'_>,
    uniform: &wgpu::Buffer,
    texture: &wgpu::TextureView,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: program.bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: uniform.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(texture) },
            wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(program.sampler) },
        ],
    })
}
