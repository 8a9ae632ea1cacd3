//! Plain 2D math shared by the engine, the warp layer and the studio.
//!
//! Screen space is logical px with the origin at the window's top-left and
//! +Y pointing down. Object-local and world spaces use the same handedness.

mod affine;
mod rect;
mod vec2;
mod viewport;

pub use affine::Affine2;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
