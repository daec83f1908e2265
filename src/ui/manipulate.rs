use super::events::Dragged;
use super::widget::Widget;
use super::{NodeId, Ui};
use crate::geometry::{Point, Rect, Size};

/// Drag manipulator state. The target may be any node, including the
/// handle itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub(crate) target: NodeId,
    /// Allowed area for the target, in the target's parent coordinates.
    /// Zero-sized bounds disable clamping.
    pub(crate) bounds: Rect,
    /// Pointer and target position when the press started.
    pub(crate) start: Option<(Point, Point)>,
}

/// Resize manipulator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeState {
    pub(crate) target: NodeId,
    pub(crate) min: Size,
    /// Zero on an axis means unbounded.
    pub(crate) max: Size,
    /// Pointer and target size when the press started.
    pub(crate) start: Option<(Point, Size)>,
}

/// Invisible node that moves `target` while dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragHandle(pub NodeId);

impl DragHandle {
    pub fn new(ui: &mut Ui, parent: NodeId, rect: Rect, target: NodeId) -> Self {
        let id = ui.create(parent, rect);
        ui.set_widget(
            id,
            Widget::DragHandle(DragState {
                target,
                bounds: Rect::ZERO,
                start: None,
            }),
        );
        Self(id)
    }

    /// A handle that drags itself around its parent.
    pub fn moving_self(ui: &mut Ui, parent: NodeId, rect: Rect) -> Self {
        let handle = Self::new(ui, parent, rect, parent);
        handle.set_target(ui, handle.0);
        handle
    }

    pub fn id(self) -> NodeId {
        self.0
    }

    fn state(self, ui: &Ui) -> Option<&DragState> {
        match ui.node(self.0)?.widget() {
            Widget::DragHandle(state) => Some(state),
            _ => None,
        }
    }

    fn state_mut(self, ui: &mut Ui) -> Option<&mut DragState> {
        match ui.widget_mut(self.0)? {
            Widget::DragHandle(state) => Some(state),
            _ => None,
        }
    }

    pub fn target(self, ui: &Ui) -> Option<NodeId> {
        self.state(ui).map(|s| s.target)
    }

    pub fn set_target(self, ui: &mut Ui, target: NodeId) {
        if let Some(state) = self.state_mut(ui) {
            state.target = target;
            state.start = None;
        }
    }

    pub fn bounds(self, ui: &Ui) -> Option<Rect> {
        self.state(ui).map(|s| s.bounds)
    }

    pub fn set_bounds(self, ui: &mut Ui, bounds: Rect) {
        if let Some(state) = self.state_mut(ui) {
            state.bounds = bounds;
        }
    }
}

/// Invisible node that resizes `target` while dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeHandle(pub NodeId);

impl ResizeHandle {
    pub fn new(ui: &mut Ui, parent: NodeId, rect: Rect, target: NodeId, min: Size, max: Size) -> Self {
        let id = ui.create(parent, rect);
        ui.set_widget(
            id,
            Widget::ResizeHandle(ResizeState {
                target,
                min,
                max,
                start: None,
            }),
        );
        Self(id)
    }

    pub fn id(self) -> NodeId {
        self.0
    }

    pub fn set_limits(self, ui: &mut Ui, min: Size, max: Size) {
        if let Some(Widget::ResizeHandle(state)) = ui.widget_mut(self.0) {
            state.min = min;
            state.max = max;
        }
    }
}

/// Record the press origin and the target's current geometry.
pub(crate) fn begin(ui: &mut Ui, id: NodeId, pointer: Point) {
    let target = match ui.node(id).map(|n| n.widget()) {
        Some(Widget::DragHandle(s)) => s.target,
        Some(Widget::ResizeHandle(s)) => s.target,
        _ => return,
    };
    let Some(rect) = ui.node(target).map(|n| n.rect()) else {
        log::debug!("manipulator {:?} has a stale target", id);
        return;
    };
    match ui.widget_mut(id) {
        Some(Widget::DragHandle(s)) => s.start = Some((pointer, rect.position())),
        Some(Widget::ResizeHandle(s)) => s.start = Some((pointer, rect.size())),
        _ => {}
    }
}

pub(crate) fn end(ui: &mut Ui, id: NodeId) {
    match ui.widget_mut(id) {
        Some(Widget::DragHandle(s)) => s.start = None,
        Some(Widget::ResizeHandle(s)) => s.start = None,
        _ => {}
    }
}

/// Move the drag target by the pointer offset since the press.
///
/// Tries the full move, then x only, then y only, and applies the first
/// whose rectangle stays inside the bounds.
pub(crate) fn drag(ui: &mut Ui, id: NodeId, pointer: Point) {
    let Some(Widget::DragHandle(state)) = ui.node(id).map(|n| n.widget()) else {
        return;
    };
    let Some((start_pointer, start_pos)) = state.start else {
        return;
    };
    let (target, bounds) = (state.target, state.bounds);
    let Some(current) = ui.node(target).map(|n| n.rect()) else {
        return;
    };

    let delta = pointer - start_pointer;
    let candidates = [
        start_pos + delta,
        Point::new(start_pos.x + delta.x, current.y),
        Point::new(current.x, start_pos.y + delta.y),
    ];
    let unbounded = bounds.width == 0 && bounds.height == 0;
    let Some(next) = candidates
        .into_iter()
        .find(|p| unbounded || bounds.contains_rect(&Rect::from_parts(*p, current.size())))
    else {
        return;
    };
    if next == current.position() {
        return;
    }
    ui.set_position(target, next);
    ui.emit::<Dragged>(id, &next);
}

/// Resize the target by the pointer offset since the press, clamping
/// each axis into the configured limits.
pub(crate) fn resize(ui: &mut Ui, id: NodeId, pointer: Point) {
    let Some(Widget::ResizeHandle(state)) = ui.node(id).map(|n| n.widget()) else {
        return;
    };
    let Some((start_pointer, start_size)) = state.start else {
        return;
    };
    let (target, min, max) = (state.target, state.min, state.max);
    let Some(current) = ui.size(target) else {
        return;
    };

    let delta = pointer - start_pointer;
    let next = Size::new(
        clamp_axis(start_size.width + delta.x, min.width, max.width),
        clamp_axis(start_size.height + delta.y, min.height, max.height),
    );
    if next != current {
        ui.set_size(target, next);
    }
}

fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    let value = value.max(min).max(0);
    if max > 0 { value.min(max.max(min)) } else { value }
}
