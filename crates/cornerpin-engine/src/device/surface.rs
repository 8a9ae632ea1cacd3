use winit::dpi::PhysicalSize;

use super::{GpuInit, SurfaceErrorAction};

/// Surface configuration and the window size it tracks.
///
/// wgpu rejects 0x0 surfaces, so while the window is minimized the size is
/// recorded and configuring waits until it grows again.
pub(crate) struct SurfaceSetup {
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
}

impl SurfaceSetup {
    /// `None` when the adapter offers no format for this surface.
    pub fn new(caps: &wgpu::SurfaceCapabilities, init: &GpuInit, size: PhysicalSize<u32>) -> Option<Self> {
        let format = pick_format(caps, init.prefer_srgb)?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode: pick_alpha_mode(caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.frame_latency,
        };
        Some(Self { config, size })
    }

    #[inline]
    fn is_visible(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    pub fn apply(&self, surface: &wgpu::Surface<'_>, device: &wgpu::Device) {
        if self.is_visible() {
            surface.configure(device, &self.config);
        }
    }

    pub fn resize(&mut self, surface: &wgpu::Surface<'_>, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.size = size;
        if self.is_visible() {
            self.config.width = size.width;
            self.config.height = size.height;
            self.apply(surface, device);
        }
    }

    pub fn recover(
        &self,
        surface: &wgpu::Surface<'_>,
        device: &wgpu::Device,
        err: wgpu::SurfaceError,
    ) -> SurfaceErrorAction {
        let action = error_action(&err);
        if action == SurfaceErrorAction::Reconfigured {
            self.apply(surface, device);
        }
        log::debug!("surface error {err:?}: {action:?}");
        action
    }
}

fn error_action(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

/// First sRGB 8-bit format when asked for one, else whatever the surface lists first.
fn pick_format(caps: &wgpu::SurfaceCapabilities, prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let srgb = [wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Rgba8UnormSrgb];
    let found = prefer_srgb.then(|| srgb.into_iter().find(|f| caps.formats.contains(f))).flatten();
    if prefer_srgb && found.is_none() {
        log::debug!("surface has no 8-bit sRGB format");
    }
    found.or_else(|| caps.formats.first().copied())
}

fn pick_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}
