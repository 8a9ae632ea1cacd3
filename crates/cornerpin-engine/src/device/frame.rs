/// One acquired surface texture plus the encoder recording into it.
///
/// Hand it back through `Gpu::submit` before acquiring the next one.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// Outcome of a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again; try on the next frame.
    Reconfigured,
    /// Drop this frame only.
    SkipFrame,
    /// Out of memory; stop rendering.
    Fatal,
}
