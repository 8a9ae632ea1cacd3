use std::collections::HashMap;

use cornerpin_engine::render::{RenderCtx, premul_alpha_blend};

use super::{FilterKind, WarpUniform};

/// Cache key: one pipeline per filter kind and target format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramKey {
    pub kind: FilterKind,
    pub format: wgpu::TextureFormat,
}

/// Borrowed view of a compiled program.
pub struct Program<'a> {
    pub pipeline: &'a wgpu::RenderPipeline,
    pub bind_group_layout: &'a wgpu::BindGroupLayout,
    pub sampler: &'a wgpu::Sampler,
}

/// Compiled warp programs shared by every warp object drawn on one device.
///
/// Built lazily and remembered against the device generation; a draw on a
/// newer device, or [`ProgramCache::invalidate`], drops every handle.
#[derive(Default)]
pub struct ProgramCache {
    generation: Option<u64>,
    shared: Option<Shared>,
    pipelines: HashMap<ProgramKey, wgpu::RenderPipeline>,
    compiled: usize,
}

struct Shared {
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every cached GPU handle; the next draw rebuilds lazily.
    pub fn invalidate(&mut self) {
        if self.shared.is_some() || !self.pipelines.is_empty() {
            log::debug!("dropping {} cached warp program(s)", self.pipelines.len());
        }
        self.generation = None;
        self.shared = None;
        self.pipelines.clear();
    }

    /// Device generation the cache was built against.
    #[inline]
    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    /// Number of live pipelines.
    #[inline]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Total compilations since creation, across invalidations.
    #[inline]
    pub fn compiled_count(&self) -> usize {
        self.compiled
    }

    /// Adopts `generation`; returns true when cached handles were dropped.
    pub fn sync_generation(&mut self, generation: u64) -> bool {
        match self.generation {
            Some(g) if g == generation => false,
            Some(g) => {
                log::info!("gpu context changed ({g} -> {generation}); rebuilding warp programs");
                self.invalidate();
                self.generation = Some(generation);
                true
            }
            None => {
                self.generation = Some(generation);
                false
            }
        }
    }

    /// Returns the program for `(kind, format)`, compiling it on first use.
    pub fn program(&mut self, ctx: &RenderCtx<'_>, kind: FilterKind, format: wgpu::TextureFormat) -> Program<'_> {
        self.sync_generation(ctx.generation);

        let shared = self.shared.get_or_insert_with(|| Shared::new(ctx.device));
        let compiled = &mut self.compiled;

        let key = ProgramKey { kind, format };
        let pipeline = self.pipelines.entry(key).or_insert_with(|| {
            *compiled += 1;
            log::debug!("compiling warp program {kind:?} for {format:?}");
            compile(ctx.device, shared, key)
        });

        Program {
            pipeline,
            bind_group_layout: &shared.bind_group_layout,
            sampler: &shared.sampler,
        }
    }
}

impl Shared {
    fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cornerpin warp shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/warp.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cornerpin warp bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<WarpUniform>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cornerpin warp pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("cornerpin warp sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self { shader, bind_group_layout, pipeline_layout, sampler }
    }
}

fn compile(device: &wgpu::Device, shared: &Shared, key: ProgramKey) -> wgpu::RenderPipeline {
    let (label, entry_point, blend) = match key.kind {
        // The target is cleared first; the mesh replaces it.
        FilterKind::Perspective => ("cornerpin perspective pipeline", "fs_warp", None),
        FilterKind::Composite => ("cornerpin composite pipeline", "fs_composite", Some(premul_alpha_blend())),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&shared.pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shared.shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[point_layout(0), point_layout(1)],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shared.shader,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Crossed corners flip triangles; both faces must draw.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Tightly packed `[f32; 2]` stream at `location`, one buffer per attribute.
fn point_layout(location: u32) -> wgpu::VertexBufferLayout<'static> {
    const POSITION: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
    const UV: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: if location == 0 { &POSITION } else { &UV },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── generation bookkeeping ────────────────────────────────────────────

    #[test]
    fn first_generation_is_adopted() {
        let mut cache = ProgramCache::new();
        assert_eq!(cache.generation(), None);
        assert!(!cache.sync_generation(7));
        assert_eq!(cache.generation(), Some(7));
        assert!(!cache.sync_generation(7));
    }

    #[test]
    fn newer_generation_invalidates() {
        let mut cache = ProgramCache::new();
        cache.sync_generation(1);
        assert!(cache.sync_generation(2));
        assert_eq!(cache.generation(), Some(2));
        assert!(cache.is_empty());
    }

    #[test]
    fn explicit_invalidate_forgets_generation() {
        let mut cache = ProgramCache::new();
        cache.sync_generation(3);
        cache.invalidate();
        assert_eq!(cache.generation(), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.compiled_count(), 0);
    }

    #[test]
    fn program_keys_distinguish_kind_and_format() {
        let a = ProgramKey { kind: FilterKind::Perspective, format: wgpu::TextureFormat::Rgba8UnormSrgb };
        let b = ProgramKey { kind: FilterKind::Composite, format: wgpu::TextureFormat::Rgba8UnormSrgb };
        let c = ProgramKey { kind: FilterKind::Composite, format: wgpu::TextureFormat::Bgra8UnormSrgb };
        let set: std::collections::HashSet<_> = [a, b, c, a].into_iter().collect();
        assert_eq!(set.len(), 3);
    }
}
