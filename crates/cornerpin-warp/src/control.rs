//! Corner handles and the drag protocol.
//!
//! Handles are plain descriptors indexed into the corner set. A single routine
//! serves all four; each handle only differs by its index and its anchor (the
//! previous corner in winding order), which keeps its world position while the
//! handle moves.

use cornerpin_engine::coords::{Affine2, Vec2};
use cornerpin_engine::scene::shapes::Border;
use cornerpin_engine::scene::{DrawList, ZIndex};

use crate::config::WarpConfig;
use crate::object::{Placement, Warpable};

/// Pointer shape a handle asks for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    /// Crosshair-like "cell" cursor over corner handles.
    Cell,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HandleDescriptor {
    /// Corner index in TL, TR, BR, BL order.
    pub index: usize,
    pub name: &'static str,
    /// Corner held fixed in world space while this handle drags.
    pub anchor: usize,
    pub cursor: CursorHint,
}

const HANDLE_NAMES: [&str; 4] = ["prs1", "prs2", "prs3", "prs4"];

/// The four corner handles, `prs1..prs4`.
pub fn corner_handles() -> [HandleDescriptor; 4] {
    std::array::from_fn(|index| HandleDescriptor {
        index,
        name: HANDLE_NAMES[index],
        anchor: (index + 3) % 4,
        cursor: CursorHint::Cell,
    })
}

/// Canvas view: `screen = world * zoom + pan`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct View {
    pub zoom: f32,
    pub pan: Vec2,
}

impl Default for View {
    fn default() -> Self {
        Self { zoom: 1.0, pan: Vec2::zero() }
    }
}

impl View {
    #[inline]
    pub fn transform(&self) -> Affine2 {
        Affine2::scale(self.zoom, self.zoom).then(Affine2::translate(self.pan))
    }

    #[inline]
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world * self.zoom + self.pan
    }

    /// Screen -> world; `None` at zero zoom.
    pub fn to_world(&self, screen: Vec2) -> Option<Vec2> {
        if self.zoom.abs() <= f32::EPSILON || !self.zoom.is_finite() {
            return None;
        }
        Some((screen - self.pan) / self.zoom)
    }

    /// Zooms by `factor` keeping the world point under `screen` fixed.
    pub fn zoom_about(&mut self, screen: Vec2, factor: f32) {
        let Some(world) = self.to_world(screen) else { return };
        self.zoom = (self.zoom * factor).clamp(0.05, 32.0);
        self.pan = screen - world * self.zoom;
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { handle: usize },
}

/// Per-object drag controller.
#[derive(Debug, Clone, Default)]
pub struct CornerControls {
    drag: DragState,
    hover: Option<usize>,
    /// Pick radius in screen px.
    pub hit_radius: f32,
}

impl CornerControls {
    pub fn new(hit_radius: f32) -> Self {
        Self { hit_radius, ..Self::default() }
    }

    #[inline]
    pub fn state(&self) -> DragState {
        self.drag
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Screen position of one handle, derived from the corner, the placement
    /// and the view.
    pub fn handle_screen_position<W: Warpable>(object: &W, view: &View, handle: usize) -> Option<Vec2> {
        let corner = object.corners().get(handle)?;
        let local = corner / object.pixel_density();
        Some(view.to_screen(object.placement().to_world(local)))
    }

    /// Screen positions of all installed handles, `(corner index, position)`.
    pub fn handle_positions<W: Warpable>(object: &W, view: &View) -> Vec<(usize, Vec2)> {
        object
            .handles()
            .iter()
            .filter_map(|h| Some((h.index, Self::handle_screen_position(object, view, h.index)?)))
            .collect()
    }

    /// Nearest installed handle within `hit_radius` of `screen`.
    pub fn hit_test<W: Warpable>(&self, object: &W, view: &View, screen: Vec2) -> Option<usize> {
        Self::handle_positions(object, view)
            .into_iter()
            .map(|(i, p)| (i, p.distance(screen)))
            .filter(|&(_, d)| d <= self.hit_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Starts a drag when `screen` hits a handle. Ignored while dragging.
    pub fn pointer_down<W: Warpable>(&mut self, object: &W, view: &View, screen: Vec2) -> bool {
        if self.is_dragging() {
            log::debug!("pointer down ignored: drag already in progress");
            return false;
        }
        let Some(handle) = self.hit_test(object, view, screen) else { return false };
        self.drag = DragState::Dragging { handle };
        self.hover = Some(handle);
        true
    }

    /// Moves the dragged corner to `screen`; returns whether anything changed.
    ///
    /// When idle this only refreshes the hover state.
    pub fn pointer_move<W: Warpable>(&mut self, object: &mut W, view: &View, screen: Vec2) -> bool {
        let DragState::Dragging { handle } = self.drag else {
            self.hover = self.hit_test(object, view, screen);
            return false;
        };
        drag_corner(object, view, handle, screen)
    }

    /// Ends the drag. Never mutates the object.
    pub fn pointer_up(&mut self) -> bool {
        let was = self.is_dragging();
        self.drag = DragState::Idle;
        was
    }

    /// Drops drag and hover state, e.g. when handles are removed.
    pub fn reset(&mut self) {
        self.drag = DragState::Idle;
        self.hover = None;
    }

    /// Cursor for the current hover or drag target.
    pub fn cursor<W: Warpable>(&self, object: &W) -> CursorHint {
        let active = match self.drag {
            DragState::Dragging { handle } => Some(handle),
            DragState::Idle => self.hover,
        };
        active
            .and_then(|i| object.handles().iter().find(|h| h.index == i))
            .map_or(CursorHint::Default, |h| h.cursor)
    }

    /// Records a disc per handle and an edge from each handle to the next corner.
    pub fn push_overlay<W: Warpable>(&self, object: &W, view: &View, config: &WarpConfig, list: &mut DrawList) {
        let positions = Self::handle_positions(object, view);
        if positions.is_empty() {
            return;
        }

        let active = match self.drag {
            DragState::Dragging { handle } => Some(handle),
            DragState::Idle => self.hover,
        };

        for &(index, at) in &positions {
            let next = (index + 1) % 4;
            if let Some(to) = Self::handle_screen_position(object, view, next) {
                list.push_segment(ZIndex::EDGES, at, to, config.edge_width, config.edge_color());
            }

            if active == Some(index) {
                let ring = Border::new(1.5, config.handle_color());
                list.push_disc(
                    ZIndex::ACTIVE_HANDLE,
                    at,
                    config.handle_radius * 1.5,
                    config.clear_color(),
                    Some(ring),
                );
            } else {
                list.push_solid_disc(ZIndex::HANDLES, at, config.handle_radius, config.handle_color());
            }
        }
    }
}

/// Moves `handle` to the screen point and re-derives the box.
///
/// The anchor corner keeps its world position; afterwards the corner envelope
/// starts at the local origin and `path_offset` holds the removed minimum.
fn drag_corner<W: Warpable>(object: &mut W, view: &View, handle: usize, screen: Vec2) -> bool {
    let Some(anchor) = object.handles().iter().find(|h| h.index == handle).map(|h| h.anchor) else {
        return false;
    };

    let density = object.pixel_density();
    let placement = *object.placement();

    let Some(world) = view.to_world(screen) else { return false };
    let Some(local) = placement.to_local(world) else { return false };
    if !local.is_finite() {
        return false;
    }

    let Some(anchor_corner) = object.corners().get(anchor) else { return false };
    let anchor_world = placement.to_world(anchor_corner / density);

    object.corners_mut().set(handle, local * density);

    let bounds = object.corners_mut().normalize();
    object.set_path_offset(bounds.min());

    let Some(anchor_corner) = object.corners().get(anchor) else { return false };
    let next = Placement { width: bounds.width / density, height: bounds.height / density, ..placement }
        .pinned(anchor_corner / density, anchor_world);
    object.set_placement(next);

    object.regenerate();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cornerpin_engine::scene::DrawCmd;

    use crate::object::{WarpObject, WarpOptions};
    use crate::source::SourceImage;

    fn rect_object(options: WarpOptions) -> WarpObject {
        WarpObject::new(SourceImage::checkerboard(100, 80, 10), options).unwrap()
    }

    fn world_of<W: Warpable>(obj: &W, i: usize) -> Vec2 {
        let c = obj.corners().get(i).unwrap() / obj.pixel_density();
        obj.placement().to_world(c)
    }

    // ── descriptors ───────────────────────────────────────────────────────

    #[test]
    fn anchors_are_previous_corner() {
        let handles = corner_handles();
        let anchors: Vec<usize> = handles.iter().map(|h| h.anchor).collect();
        assert_eq!(anchors, [3, 0, 1, 2]);
        assert!(handles.iter().all(|h| h.cursor == CursorHint::Cell));
    }

    // ── view ──────────────────────────────────────────────────────────────

    #[test]
    fn view_zoom_about_keeps_point_fixed() {
        let mut view = View { zoom: 1.0, pan: Vec2::new(10.0, 20.0) };
        let screen = Vec2::new(200.0, 100.0);
        let before = view.to_world(screen).unwrap();
        view.zoom_about(screen, 2.0);
        let after = view.to_world(screen).unwrap();
        assert_relative_eq!(before.x, after.x, epsilon = 1e-4);
        assert_relative_eq!(before.y, after.y, epsilon = 1e-4);
        assert_eq!(view.transform().transform_point(after), view.to_screen(after));
    }

    // ── state machine ─────────────────────────────────────────────────────

    #[test]
    fn pointer_down_hits_nearest_handle() {
        let obj = rect_object(WarpOptions::default());
        let view = View::default();
        let mut controls = CornerControls::new(10.0);

        assert!(!controls.pointer_down(&obj, &view, Vec2::new(50.0, 40.0)));
        assert_eq!(controls.state(), DragState::Idle);

        assert!(controls.pointer_down(&obj, &view, Vec2::new(97.0, 3.0)));
        assert_eq!(controls.state(), DragState::Dragging { handle: 1 });

        // Re-entrant presses are ignored.
        assert!(!controls.pointer_down(&obj, &view, Vec2::new(0.0, 0.0)));
        assert_eq!(controls.state(), DragState::Dragging { handle: 1 });
        assert_eq!(controls.cursor(&obj), CursorHint::Cell);
    }

    #[test]
    fn no_handles_without_perspective_mode() {
        let obj = rect_object(WarpOptions { perspective_mode: false, ..Default::default() });
        let mut controls = CornerControls::new(10.0);
        assert!(!controls.pointer_down(&obj, &View::default(), Vec2::zero()));
        assert!(CornerControls::handle_positions(&obj, &View::default()).is_empty());
    }

    #[test]
    fn drag_right_handle_extends_box() {
        let mut obj = rect_object(WarpOptions::default());
        let view = View::default();
        let mut controls = CornerControls::new(10.0);
        let uvs_before = obj.mesh().uvs.clone();

        assert!(controls.pointer_down(&obj, &view, Vec2::new(100.0, 0.0)));
        assert!(controls.pointer_move(&mut obj, &view, Vec2::new(120.0, 10.0)));

        assert_eq!(obj.corners().to_arrays(), vec![[0.0, 0.0], [120.0, 10.0], [100.0, 80.0], [0.0, 80.0]]);
        assert_eq!(obj.bounds().max_x, 120.0);
        assert_eq!(obj.bounds().min(), Vec2::zero());
        assert_eq!(obj.placement().width, 120.0);
        assert_eq!(obj.placement().height, 80.0);
        assert_eq!(obj.mesh().uvs, uvs_before);
        assert!(obj.needs_redraw());

        let snapshot = obj.corners().clone();
        assert!(controls.pointer_up());
        assert_eq!(obj.corners(), &snapshot);
        assert_eq!(controls.state(), DragState::Idle);
    }

    #[test]
    fn drag_past_origin_renormalizes_and_keeps_anchor() {
        let mut obj = rect_object(WarpOptions::default());
        let view = View::default();
        let mut controls = CornerControls::new(10.0);
        let anchor_before = world_of(&obj, 3);

        assert!(controls.pointer_down(&obj, &view, Vec2::new(1.0, 1.0)));
        assert!(controls.pointer_move(&mut obj, &view, Vec2::new(-10.0, -5.0)));

        assert_eq!(obj.corners().to_arrays(), vec![[0.0, 0.0], [110.0, 5.0], [110.0, 85.0], [10.0, 85.0]]);
        assert_eq!(obj.path_offset(), Vec2::new(-10.0, -5.0));
        assert_eq!(obj.placement().left, -10.0);
        assert_eq!(obj.placement().top, -5.0);

        let anchor_after = world_of(&obj, 3);
        assert_relative_eq!(anchor_after.x, anchor_before.x, epsilon = 1e-4);
        assert_relative_eq!(anchor_after.y, anchor_before.y, epsilon = 1e-4);

        // The dragged corner sits under the pointer.
        let moved = world_of(&obj, 0);
        assert_relative_eq!(moved.x, -10.0, epsilon = 1e-4);
        assert_relative_eq!(moved.y, -5.0, epsilon = 1e-4);
    }

    #[test]
    fn drag_under_zoom_rotation_and_density() {
        let mut opts = WarpOptions { pixel_density: 2.0, ..Default::default() };
        opts.placement.left = 30.0;
        opts.placement.top = 40.0;
        opts.placement.angle = 30.0;
        opts.placement.scale_x = 1.5;
        let mut obj = rect_object(opts);
        let view = View { zoom: 2.0, pan: Vec2::new(15.0, -5.0) };
        let mut controls = CornerControls::new(10.0);

        let anchor_before = world_of(&obj, 1);
        let grab = CornerControls::handle_screen_position(&obj, &view, 2).unwrap();
        let target = grab + Vec2::new(25.0, 40.0);

        assert!(controls.pointer_down(&obj, &view, grab));
        assert!(controls.pointer_move(&mut obj, &view, target));

        let landed = CornerControls::handle_screen_position(&obj, &view, 2).unwrap();
        assert_relative_eq!(landed.x, target.x, epsilon = 1e-2);
        assert_relative_eq!(landed.y, target.y, epsilon = 1e-2);

        let anchor_after = world_of(&obj, 1);
        assert_relative_eq!(anchor_after.x, anchor_before.x, epsilon = 1e-3);
        assert_relative_eq!(anchor_after.y, anchor_before.y, epsilon = 1e-3);
        assert_eq!(obj.bounds().min(), Vec2::zero());
    }

    #[test]
    fn move_while_idle_only_hovers() {
        let mut obj = rect_object(WarpOptions::default());
        let view = View::default();
        let mut controls = CornerControls::new(10.0);
        let before = obj.corners().clone();

        assert!(!controls.pointer_move(&mut obj, &view, Vec2::new(99.0, 79.0)));
        assert_eq!(obj.corners(), &before);
        assert_eq!(controls.cursor(&obj), CursorHint::Cell);

        controls.pointer_move(&mut obj, &view, Vec2::new(50.0, 40.0));
        assert_eq!(controls.cursor(&obj), CursorHint::Default);
    }

    // ── overlay ───────────────────────────────────────────────────────────

    #[test]
    fn overlay_has_disc_and_edge_per_handle() {
        let obj = rect_object(WarpOptions::default());
        let controls = CornerControls::new(10.0);
        let mut list = DrawList::new();
        controls.push_overlay(&obj, &View::default(), &WarpConfig::default(), &mut list);

        let discs = list.iter_in_paint_order().filter(|i| matches!(i.cmd, DrawCmd::Disc(_))).count();
        let edges: Vec<_> = list
            .iter_in_paint_order()
            .filter_map(|i| match &i.cmd {
                DrawCmd::Segment(s) => Some((s.from, s.to)),
                _ => None,
            })
            .collect();
        assert_eq!(discs, 4);
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], (Vec2::new(0.0, 80.0), Vec2::new(0.0, 0.0)));
    }
}
