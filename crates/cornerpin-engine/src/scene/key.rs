/// Overlay layer. Higher values paint on top.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct ZIndex(pub i32);

impl ZIndex {
    /// Outline edges joining the corner handles.
    pub const EDGES: ZIndex = ZIndex(10);
    /// Corner handle discs.
    pub const HANDLES: ZIndex = ZIndex(20);
    /// The handle currently under the pointer or being dragged.
    pub const ACTIVE_HANDLE: ZIndex = ZIndex(30);
}

/// Paint-order key: z first, then insertion order within a layer.
///
/// Field order matters; the derived `Ord` is lexicographic.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SortKey {
    pub z: ZIndex,
    pub order: u32,
}

impl SortKey {
    #[inline]
    pub const fn new(z: ZIndex, order: u32) -> Self {
        Self { z, order }
    }
}
