use crate::coords::Vec2;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};

use super::Border;

/// Filled circle payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscCmd {
    pub center: Vec2,
    pub radius: f32,
    pub fill: Color,
    pub border: Option<Border>,
}

impl DrawList {
    /// Records a disc with an optional outline.
    #[inline]
    pub fn push_disc(
        &mut self,
        z: ZIndex,
        center: Vec2,
        radius: f32,
        fill: Color,
        border: Option<Border>,
    ) {
        self.push(z, DrawCmd::Disc(DiscCmd { center, radius, fill, border }));
    }

    #[inline]
    pub fn push_solid_disc(&mut self, z: ZIndex, center: Vec2, radius: f32, fill: Color) {
        self.push_disc(z, center, radius, fill, None);
    }
}
