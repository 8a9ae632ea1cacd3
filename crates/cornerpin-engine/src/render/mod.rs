//! Frame-level GPU plumbing and the overlay renderers.
//!
//! Positions handed to renderers are logical px with a top-left origin and +Y
//! down; shaders map them to clip space from a viewport uniform.

mod ctx;
pub mod shapes;

pub use ctx::{RenderCtx, RenderTarget};
pub use shapes::common::premul_alpha_blend;
