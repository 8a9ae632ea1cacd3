use crate::coords::Vec2;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};

/// Straight line payload with square caps.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentCmd {
    pub from: Vec2,
    pub to: Vec2,
    pub width: f32,
    pub color: Color,
}

impl SegmentCmd {
    /// Zero-length or zero-width segments produce no pixels.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.from.distance(self.to) > f32::EPSILON
    }
}

impl DrawList {
    #[inline]
    pub fn push_segment(&mut self, z: ZIndex, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.push(z, DrawCmd::Segment(SegmentCmd { from, to, width, color }));
    }
}
