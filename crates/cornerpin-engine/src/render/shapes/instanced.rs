//! Shared machinery for overlay shapes drawn as instanced unit quads.

use std::marker::PhantomData;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};

use super::common::{
    QUAD_INDICES, QUAD_VERTICES, QuadVertex, ViewportUniform, begin_load_pass, grown_capacity,
    premul_alpha_blend, viewport_bind_group_layout, viewport_binding,
};

/// Per-instance vertex data of one overlay shape.
///
/// Location 0 is the unit quad corner; instance attributes start at 1.
pub(crate) trait OverlayInstance: Pod {
    /// Short name used in GPU labels.
    const NAME: &'static str;
    const SHADER: &'static str;

    fn layout() -> wgpu::VertexBufferLayout<'static>;
}

/// Pipeline, bindings and buffers for one instance type.
///
/// Everything is created on first draw and dropped when the device generation
/// or the surface format changes.
pub(crate) struct InstancedRenderer<I> {
    generation: u64,
    format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: Option<wgpu::Buffer>,
    quad: Option<(wgpu::Buffer, wgpu::Buffer)>,
    instances: Option<wgpu::Buffer>,
    capacity: usize,
    _instance: PhantomData<I>,
}

impl<I> Default for InstancedRenderer<I> {
    fn default() -> Self {
        Self {
            generation: 0,
            format: None,
            pipeline: None,
            bind_group: None,
            viewport_ubo: None,
            quad: None,
            instances: None,
            capacity: 0,
            _instance: PhantomData,
        }
    }
}

impl<I: OverlayInstance> InstancedRenderer<I> {
    pub(crate) fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, instances: &[I]) {
        if instances.is_empty() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_quad(ctx);
        self.ensure_capacity(ctx, instances.len());

        let (Some(pipeline), Some(bind_group), Some(ubo), Some((quad_vbo, quad_ibo)), Some(instance_vbo)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.viewport_ubo.as_ref(),
            self.quad.as_ref(),
            self.instances.as_ref(),
        ) else {
            return;
        };

        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&ViewportUniform::from_viewport(ctx.viewport)));
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(instances));

        let label = format!("cornerpin {} pass", I::NAME);
        let mut rpass = begin_load_pass(target.encoder, target.color_view, &label);
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..instances.len() as u32);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.generation != ctx.generation {
            // Handles from another device are unusable.
            *self = Self { generation: ctx.generation, ..Self::default() };
        }
        if self.format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let name = I::NAME;
        let device = ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("cornerpin {name} shader")),
            source: wgpu::ShaderSource::Wgsl(I::SHADER.into()),
        });

        let bgl = viewport_bind_group_layout(device, &format!("cornerpin {name} bgl"));
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("cornerpin {name} pipeline layout")),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("cornerpin {name} pipeline")),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), I::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let (ubo, bind_group) = viewport_binding(device, &bgl, &format!("cornerpin {name} viewport"));

        self.format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.viewport_ubo = Some(ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_quad(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad.is_some() {
            return;
        }
        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("cornerpin {} quad vbo", I::NAME)),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("cornerpin {} quad ibo", I::NAME)),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.quad = Some((vbo, ibo));
    }

    fn ensure_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.capacity && self.instances.is_some() {
            return;
        }
        let capacity = grown_capacity(required);
        self.instances = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("cornerpin {} instance vbo", I::NAME)),
            size: (capacity * std::mem::size_of::<I>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.capacity = capacity;
    }
}
