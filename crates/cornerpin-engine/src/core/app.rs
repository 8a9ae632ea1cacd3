use super::ctx::FrameCtx;

/// What the runtime should do after an app callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

impl AppControl {
    #[inline]
    pub fn is_exit(self) -> bool {
        self == AppControl::Exit
    }
}

/// An application hosted by [`crate::window::Runtime`].
pub trait App {
    /// Draws one frame. Input gathered since the previous frame is in
    /// `ctx.input_frame`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
