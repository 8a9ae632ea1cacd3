use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface::SurfaceSetup;
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// Every opened device takes the next value; caches keyed on an older one are stale.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Window surface plus the device and queue drawing into it.
///
/// A lost device is replaced in place by [`Gpu::recover_lost_device`]; the
/// surface, adapter and window stay, the generation moves on.
pub struct Gpu<'w> {
    _instance: wgpu::Instance,
    /// Must not outlive the window it was created from.
    surface: wgpu::Surface<'w>,
    adapter: wgpu::Adapter,

    device: wgpu::Device,
    queue: wgpu::Queue,
    lost: Arc<AtomicBool>,
    generation: u64,

    features: wgpu::Features,
    limits: wgpu::Limits,

    setup: SurfaceSetup,
}

struct OpenedDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    lost: Arc<AtomicBool>,
    generation: u64,
}

async fn open_device(
    adapter: &wgpu::Adapter,
    features: wgpu::Features,
    limits: wgpu::Limits,
) -> Result<OpenedDevice> {
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("cornerpin device"),
            required_features: features,
            required_limits: limits,
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to open a device on the adapter")?;

    let lost = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&lost);
    device.set_device_lost_callback(move |reason, message| {
        // Dropping the device reports `Destroyed`; only real losses count.
        if !matches!(reason, wgpu::DeviceLostReason::Destroyed) {
            log::warn!("gpu device lost ({reason:?}): {message}");
            flag.store(true, Ordering::Release);
        }
    });

    let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
    Ok(OpenedDevice { device, queue, lost, generation })
}

impl<'w> Gpu<'w> {
    /// Creates the surface for `window` and opens a device that can present to it.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;

        let opened = open_device(&adapter, init.features, init.limits.clone()).await?;

        let caps = surface.get_capabilities(&adapter);
        let setup = SurfaceSetup::new(&caps, &init, size).context("surface offers no formats")?;
        setup.apply(&surface, &opened.device);

        let info = adapter.get_info();
        log::info!(
            "gpu ready: {} ({:?}), surface {:?}, generation {}",
            info.name,
            info.backend,
            setup.config.format,
            opened.generation
        );

        Ok(Self {
            _instance: instance,
            surface,
            adapter,
            device: opened.device,
            queue: opened.queue,
            lost: opened.lost,
            generation: opened.generation,
            features: init.features,
            limits: init.limits,
            setup,
        })
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.setup.config.format
    }

    /// Drawable size in physical pixels.
    #[inline]
    pub fn size(&self) -> PhysicalSize<u32> {
        self.setup.size
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Identity of the current device.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn is_device_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }

    /// Opens a replacement device when the current one was lost.
    ///
    /// Returns whether a new device (and generation) is now in place.
    pub fn recover_lost_device(&mut self) -> Result<bool> {
        if !self.is_device_lost() {
            return Ok(false);
        }

        let opened = pollster::block_on(open_device(&self.adapter, self.features, self.limits.clone()))
            .context("device lost and could not be reopened")?;
        self.device = opened.device;
        self.queue = opened.queue;
        self.lost = opened.lost;
        self.generation = opened.generation;

        self.setup.apply(&self.surface, &self.device);
        log::warn!("gpu device reopened, generation {}", self.generation);
        Ok(true)
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.setup.resize(&self.surface, &self.device, new_size);
    }

    /// Acquires the next surface texture and opens an encoder for it.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("cornerpin frame encoder"),
        });
        Ok(GpuFrame { surface_texture, view, encoder })
    }

    /// Submits the frame's commands and presents it.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame { surface_texture, view, encoder } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    pub fn handle_surface_error(&self, err: SurfaceError) -> SurfaceErrorAction {
        self.setup.recover(&self.surface, &self.device, err)
    }
}
