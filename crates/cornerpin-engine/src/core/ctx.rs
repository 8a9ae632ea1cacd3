use winit::window::{CursorIcon, Window, WindowId};

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::window::FrameRequests;

use super::app::AppControl;

/// The window being drawn.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Inner size in logical px.
    pub fn viewport(&self) -> Viewport {
        let size = self.window.inner_size().to_logical::<f64>(self.window.scale_factor());
        Viewport::new(size.width as f32, size.height as f32)
    }

    pub fn logical_size(&self) -> (f32, f32) {
        let v = self.viewport();
        (v.width, v.height)
    }

    pub fn scale_factor(&self) -> f32 {
        self.window.scale_factor() as f32
    }

    pub fn set_cursor(&self, cursor: CursorIcon) {
        self.window.set_cursor(cursor);
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Everything an app sees during [`super::App::on_frame`].
///
/// `'a` is the callback borrow, `'w` the window borrow held by [`Gpu`].
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub runtime: &'a mut FrameRequests,
}

impl FrameCtx<'_, '_> {
    /// Acquires the surface, clears it to `clear`, lets `draw` record passes
    /// and presents.
    ///
    /// A lost device is reopened first. Surface errors that only cost this
    /// frame return [`AppControl::Continue`] without calling `draw` and queue
    /// another frame, so whatever this one would have shown is not lost.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        if let Err(err) = self.gpu.recover_lost_device() {
            log::error!("{err:#}");
            return AppControl::Exit;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                return dropped_frame(action, self.runtime);
            }
        };

        let rctx = RenderCtx {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
            surface_format: self.gpu.surface_format(),
            viewport: self.window.viewport(),
            scale_factor: self.window.scale_factor(),
            generation: self.gpu.generation(),
        };

        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
        target.clear(clear);
        draw(&rctx, &mut target);

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);
        AppControl::Continue
    }
}

/// Control after a frame that could not be acquired.
fn dropped_frame(action: SurfaceErrorAction, runtime: &mut FrameRequests) -> AppControl {
    match action {
        SurfaceErrorAction::Fatal => AppControl::Exit,
        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
            runtime.request_redraw();
            AppControl::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_frame_is_retried() {
        for action in [SurfaceErrorAction::Reconfigured, SurfaceErrorAction::SkipFrame] {
            let mut requests = FrameRequests::default();
            assert_eq!(dropped_frame(action, &mut requests), AppControl::Continue);
            assert!(requests.redraw_requested());
        }
    }

    #[test]
    fn fatal_surface_error_exits_without_retry() {
        let mut requests = FrameRequests::default();
        assert_eq!(dropped_frame(SurfaceErrorAction::Fatal, &mut requests), AppControl::Exit);
        assert!(!requests.redraw_requested());
    }
}
