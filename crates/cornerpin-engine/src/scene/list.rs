use super::{DrawCmd, SortKey, ZIndex};

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: DrawCmd,
}

/// Overlay commands recorded for one frame.
///
/// Items are sorted in place the first time they are read after a push, so a
/// list reused across frames keeps its allocation.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,
    sorted: bool,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.sorted = true;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, z: ZIndex, cmd: DrawCmd) {
        let key = SortKey::new(z, self.next_order);
        self.next_order = self.next_order.wrapping_add(1);
        self.sorted = self.sorted && self.items.last().is_none_or(|last| last.key <= key);
        self.items.push(DrawItem { key, cmd });
    }

    /// Back-to-front.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if !self.sorted {
            // Keys are unique, so an unstable sort keeps insertion order per layer.
            self.items.sort_unstable_by_key(|item| item.key);
            self.sorted = true;
        }
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::paint::Color;

    fn radius(item: &DrawItem) -> f32 {
        match &item.cmd {
            DrawCmd::Disc(d) => d.radius,
            DrawCmd::Segment(_) => -1.0,
        }
    }

    #[test]
    fn handles_paint_over_edges_in_push_order() {
        let mut list = DrawList::new();
        list.push_solid_disc(ZIndex::HANDLES, Vec2::zero(), 1.0, Color::WHITE);
        list.push_solid_disc(ZIndex::EDGES, Vec2::zero(), 2.0, Color::WHITE);
        list.push_solid_disc(ZIndex::HANDLES, Vec2::zero(), 3.0, Color::WHITE);
        list.push_segment(ZIndex(15), Vec2::zero(), Vec2::new(1.0, 0.0), 1.0, Color::BLACK);

        let radii: Vec<f32> = list.iter_in_paint_order().map(radius).collect();
        assert_eq!(radii, vec![2.0, -1.0, 1.0, 3.0]);
    }

    #[test]
    fn cleared_list_restarts_insertion_order() {
        let mut list = DrawList::new();
        list.push_solid_disc(ZIndex(0), Vec2::zero(), 1.0, Color::WHITE);
        list.clear();
        assert!(list.is_empty());

        list.push_solid_disc(ZIndex(0), Vec2::zero(), 4.0, Color::WHITE);
        let first = list.iter_in_paint_order().next().map(|item| item.key.order);
        assert_eq!(first, Some(0));
        assert_eq!(list.len(), 1);
    }
}
