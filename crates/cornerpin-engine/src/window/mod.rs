//! Window host.
//!
//! Owns the winit event loop and the one editor window; frames are drawn on
//! demand and handed to a [`crate::core::App`].

mod runtime;

pub use runtime::{FrameRequests, Runtime, WindowSpec};
pub use winit::window::CursorIcon;
