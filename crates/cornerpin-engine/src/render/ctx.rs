use crate::coords::Viewport;
use crate::paint::Color;

/// Device handles and surface facts for one frame.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Logical px.
    pub viewport: Viewport,
    pub scale_factor: f32,
    /// Bumped whenever the device is recreated; cached GPU objects keyed on an
    /// older value must be dropped.
    pub generation: u64,
}

impl RenderCtx<'_> {
    /// Largest texture side the device accepts.
    #[inline]
    pub fn max_texture_side(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

/// The surface texture of the current frame and the encoder recording into it.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }

    /// Records a pass that only clears the target.
    pub fn clear(&mut self, color: Color) {
        let _clear = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cornerpin clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }
}
