use crate::scene::shapes::disc::DiscCmd;
use crate::scene::shapes::segment::SegmentCmd;

/// Renderer-agnostic overlay command stream.
///
/// Each variant has a push helper under `scene::shapes::*` and a matching
/// renderer under `render::shapes::*`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Disc(DiscCmd),
    Segment(SegmentCmd),
}
