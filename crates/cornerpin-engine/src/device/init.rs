/// How [`Gpu`](super::Gpu) picks its adapter, device and surface.
///
/// Textured meshes with 32-bit indices and filtered RGBA8 sampling are core
/// wgpu, so the defaults ask for no optional features.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub power_preference: wgpu::PowerPreference,
    pub features: wgpu::Features,
    pub limits: wgpu::Limits,

    /// Pick an sRGB surface format when one is offered. Warp textures are
    /// sRGB, so blending then happens in linear space.
    pub prefer_srgb: bool,
    pub present_mode: wgpu::PresentMode,
    /// Ignored when the surface does not support it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    /// Frames the presentation engine may queue (hint).
    pub frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            features: wgpu::Features::empty(),
            limits: wgpu::Limits::default(),
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Low-power adapter and vsync off; handy on laptops while iterating.
    pub fn low_power() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::LowPower,
            present_mode: wgpu::PresentMode::AutoNoVsync,
            ..Self::default()
        }
    }
}
