use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::{InputFrame, InputState};

/// Parameters of the single editor window.
#[derive(Debug, Clone)]
pub struct WindowSpec {
    pub title: String,
    pub size: LogicalSize<f64>,
    pub min_size: LogicalSize<f64>,
}

impl WindowSpec {
    pub fn titled(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            title: "cornerpin".to_string(),
            size: LogicalSize::new(1280.0, 800.0),
            min_size: LogicalSize::new(320.0, 240.0),
        }
    }
}

/// Requests an app makes while drawing; applied once the frame is submitted.
#[derive(Debug, Default)]
pub struct FrameRequests {
    redraw: bool,
    exit: bool,
}

impl FrameRequests {
    /// Asks for another frame without waiting for input, e.g. while an image
    /// is still decoding.
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn exit(&mut self) {
        self.exit = true;
    }

    #[inline]
    pub fn redraw_requested(&self) -> bool {
        self.redraw
    }

    fn follow(&self) -> Follow {
        if self.exit {
            Follow::Exit
        } else if self.redraw {
            Follow::Redraw
        } else {
            Follow::Idle
        }
    }
}

/// Drives one window with on-demand redraws until the app exits or the
/// window closes.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(spec: WindowSpec, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("creating event loop")?;
        let mut host = Host { spec, gpu_init, app, slot: None, closing: false };
        event_loop.run_app(&mut host).context("event loop failed")?;
        Ok(())
    }
}

/// What the loop does after handling one event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Follow {
    Idle,
    Redraw,
    Exit,
}

/// The window, its GPU context and the input accumulated between frames.
#[self_referencing]
struct WindowSlot {
    input: InputState,
    pending_input: InputFrame,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct Host<A> {
    spec: WindowSpec,
    gpu_init: GpuInit,
    app: A,
    slot: Option<WindowSlot>,
    closing: bool,
}

impl<A: App> Host<A> {
    fn open_window(&self, event_loop: &ActiveEventLoop) -> Result<WindowSlot> {
        let attrs = Window::default_attributes()
            .with_title(self.spec.title.clone())
            .with_inner_size(self.spec.size)
            .with_min_inner_size(self.spec.min_size);
        let window = event_loop.create_window(attrs).context("creating window")?;
        let gpu_init = self.gpu_init.clone();

        WindowSlotTryBuilder {
            input: InputState::default(),
            pending_input: InputFrame::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
    }

    /// Feeds a raw event into the input state; `true` when it produced input.
    fn record_input(&mut self, event: &WindowEvent) -> bool {
        let Some(slot) = self.slot.as_mut() else { return false };
        slot.with_mut(|f| match translate_window_event(f.window, f.input, event) {
            Some(ev) => {
                f.input.apply_event(f.pending_input, ev);
                true
            }
            None => false,
        })
    }

    /// Reconfigures the surface; `None` re-reads the window size.
    fn resize(&mut self, size: Option<PhysicalSize<u32>>) {
        let Some(slot) = self.slot.as_mut() else { return };
        let size = size.unwrap_or_else(|| slot.with_window(|w| w.inner_size()));
        slot.with_gpu_mut(|gpu| gpu.resize(size));
    }

    fn draw_frame(&mut self, id: WindowId) -> Follow {
        let Some(slot) = self.slot.as_mut() else { return Follow::Idle };
        let app = &mut self.app;
        let mut requests = FrameRequests::default();

        slot.with_mut(|f| {
            let mut ctx = FrameCtx {
                window: WindowCtx { id, window: f.window },
                gpu: f.gpu,
                input: f.input,
                input_frame: f.pending_input,
                runtime: &mut requests,
            };
            if app.on_frame(&mut ctx).is_exit() {
                requests.exit();
            }
            // Input deltas belong to exactly one frame.
            f.pending_input.clear();
        });

        requests.follow()
    }

    fn follow(&mut self, event_loop: &ActiveEventLoop, follow: Follow) {
        match follow {
            Follow::Idle => {}
            Follow::Redraw => {
                if let Some(slot) = self.slot.as_ref() {
                    slot.with_window(|w| w.request_redraw());
                }
            }
            Follow::Exit => {
                self.closing = true;
                event_loop.exit();
            }
        }
    }
}

impl<A: App> ApplicationHandler for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.slot.is_some() {
            return;
        }
        match self.open_window(event_loop) {
            Ok(slot) => {
                log::info!("window opened: {}", self.spec.title);
                self.slot = Some(slot);
                self.follow(event_loop, Follow::Redraw);
            }
            Err(e) => {
                log::error!("cannot open window: {e:#}");
                self.follow(event_loop, Follow::Exit);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.closing {
            event_loop.exit();
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.closing {
            return;
        }

        let follow = match &event {
            WindowEvent::CloseRequested => {
                self.slot = None;
                Follow::Exit
            }
            WindowEvent::Resized(size) => {
                self.resize(Some(*size));
                Follow::Redraw
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                self.resize(None);
                Follow::Redraw
            }
            WindowEvent::RedrawRequested => self.draw_frame(id),
            other if self.record_input(other) => Follow::Redraw,
            _ => Follow::Idle,
        };

        self.follow(event_loop, follow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_wins_over_redraw() {
        let mut requests = FrameRequests::default();
        assert_eq!(requests.follow(), Follow::Idle);
        requests.request_redraw();
        assert_eq!(requests.follow(), Follow::Redraw);
        requests.exit();
        assert_eq!(requests.follow(), Follow::Exit);
    }

    #[test]
    fn titled_keeps_default_geometry() {
        let spec = WindowSpec::titled("studio");
        assert_eq!(spec.title, "studio");
        assert_eq!(spec.size, WindowSpec::default().size);
    }
}
