//! Shape payloads and `DrawList` push helpers.

pub mod disc;
pub mod segment;

use crate::paint::Color;

/// Outline drawn on the outer edge of a shape.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

impl Border {
    #[inline]
    pub const fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}
