use serde::Deserialize;

use super::draw::Surface;
use super::events::ValueChanged;
use super::manipulate::DragHandle;
use super::theme::{BorderKind, Style, Theme};
use super::widget::Widget;
use super::{NodeId, Ui};
use crate::geometry::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderState {
    pub(crate) min: i32,
    pub(crate) max: i32,
    pub(crate) value: i32,
    pub(crate) orientation: Orientation,
    /// Drag handle child; its position along the track is the value.
    pub(crate) handle: NodeId,
}

/// Integer value picker: a track with a draggable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slider(pub NodeId);

impl Slider {
    pub fn new(
        ui: &mut Ui,
        parent: NodeId,
        rect: Rect,
        range: (i32, i32),
        value: i32,
        orientation: Orientation,
    ) -> Self {
        let (min, max) = (range.0.min(range.1), range.0.max(range.1));
        let track = Theme::new(
            Style::new(ui.backgrounds().blank()).with_foreground(ui.config().palette.border_dark),
        );
        let knob = Theme::new(Style::new(ui.backgrounds().panel()).with_border(BorderKind::Raised));

        let id = ui.create_with(Some(parent), rect, Some(track));
        let handle = DragHandle::moving_self(ui, id, Rect::ZERO);
        ui.set_theme(handle.id(), &knob);
        ui.set_widget(
            id,
            Widget::Slider(SliderState {
                min,
                max,
                value: value.clamp(min, max),
                orientation,
                handle: handle.id(),
            }),
        );
        layout(ui, id);
        Self(id)
    }

    pub fn id(self) -> NodeId {
        self.0
    }

    fn state(self, ui: &Ui) -> Option<&SliderState> {
        match ui.node(self.0)?.widget() {
            Widget::Slider(state) => Some(state),
            _ => None,
        }
    }

    fn state_mut(self, ui: &mut Ui) -> Option<&mut SliderState> {
        match ui.widget_mut(self.0)? {
            Widget::Slider(state) => Some(state),
            _ => None,
        }
    }

    pub fn value(self, ui: &Ui) -> i32 {
        self.state(ui).map_or(0, |s| s.value)
    }

    /// Move the handle to `value` (clamped). Does not fire `ValueChanged`.
    pub fn set_value(self, ui: &mut Ui, value: i32) {
        let Some(state) = self.state_mut(ui) else {
            return;
        };
        state.value = value.clamp(state.min, state.max);
        layout(ui, self.0);
    }

    pub fn range(self, ui: &Ui) -> Option<(i32, i32)> {
        self.state(ui).map(|s| (s.min, s.max))
    }

    pub fn set_range(self, ui: &mut Ui, min: i32, max: i32) {
        let Some(state) = self.state_mut(ui) else {
            return;
        };
        state.min = min.min(max);
        state.max = min.max(max);
        state.value = state.value.clamp(state.min, state.max);
        layout(ui, self.0);
    }

    pub fn orientation(self, ui: &Ui) -> Option<Orientation> {
        self.state(ui).map(|s| s.orientation)
    }

    /// Switch orientation. The slider's width and height swap and the
    /// handle is re-placed from the current value.
    pub fn set_orientation(self, ui: &mut Ui, orientation: Orientation) {
        let Some(state) = self.state_mut(ui) else {
            return;
        };
        if state.orientation == orientation {
            return;
        }
        state.orientation = orientation;
        let Some(size) = ui.size(self.0) else {
            return;
        };
        // Resized re-runs the layout.
        ui.set_size(self.0, Size::new(size.height, size.width));
    }

    pub fn handle(self, ui: &Ui) -> Option<NodeId> {
        self.state(ui).map(|s| s.handle)
    }
}

/// Track geometry along the slider's main axis.
#[derive(Debug, Clone, Copy)]
struct Track {
    min: i32,
    max: i32,
    value: i32,
    orientation: Orientation,
    handle: NodeId,
    size: Size,
    handle_len: i32,
}

impl Track {
    fn of(ui: &Ui, id: NodeId) -> Option<Self> {
        let node = ui.node(id)?;
        let Widget::Slider(state) = node.widget() else {
            return None;
        };
        let size = node.size();
        let mut track = Self {
            min: state.min,
            max: state.max,
            value: state.value,
            orientation: state.orientation,
            handle: state.handle,
            size,
            handle_len: 0,
        };
        track.handle_len = ui.config().slider_handle_length.clamp(0, track.length());
        Some(track)
    }

    fn length(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.size.width.max(0),
            Orientation::Vertical => self.size.height.max(0),
        }
    }

    /// Travel available to the handle's leading edge.
    fn usable(&self) -> i32 {
        (self.length() - self.handle_len).max(0)
    }

    fn offset_for(&self, value: i32) -> i32 {
        let span = self.max - self.min;
        let usable = self.usable();
        if span <= 0 || usable == 0 {
            return 0;
        }
        (f64::from(value - self.min) * f64::from(usable) / f64::from(span)).round() as i32
    }

    fn value_for(&self, offset: i32) -> i32 {
        let span = self.max - self.min;
        let usable = self.usable();
        if span <= 0 || usable == 0 {
            return self.min;
        }
        let offset = offset.clamp(0, usable);
        let value = self.min + (f64::from(offset) * f64::from(span) / f64::from(usable)).round() as i32;
        value.clamp(self.min, self.max)
    }

    fn handle_rect(&self, offset: i32) -> Rect {
        match self.orientation {
            Orientation::Horizontal => Rect::new(offset, 0, self.handle_len, self.size.height),
            Orientation::Vertical => Rect::new(0, offset, self.size.width, self.handle_len),
        }
    }

    fn offset_of(&self, pos: Point) -> i32 {
        match self.orientation {
            Orientation::Horizontal => pos.x,
            Orientation::Vertical => pos.y,
        }
    }
}

/// Size and place the handle from the current value.
pub(crate) fn layout(ui: &mut Ui, id: NodeId) {
    let Some(track) = Track::of(ui, id) else {
        return;
    };
    let rect = track.handle_rect(track.offset_for(track.value));
    if ui.size(track.handle) != Some(rect.size()) {
        ui.set_size(track.handle, rect.size());
    }
    if ui.position(track.handle) != Some(rect.position()) {
        ui.set_position(track.handle, rect.position());
    }
    ui.invalidate(id);
}

/// The handle was dragged: derive the value from its position, then
/// snap the handle back onto the track.
///
/// The handle itself moves unbounded, so a drag past either end still
/// lands on `min` or `max`.
pub(crate) fn sync_from_handle(ui: &mut Ui, id: NodeId, handle: NodeId) {
    let Some(track) = Track::of(ui, id) else {
        return;
    };
    if track.handle != handle {
        return;
    }
    let Some(pos) = ui.position(handle) else {
        return;
    };
    let value = track.value_for(track.offset_of(pos));
    let changed = value != track.value;
    if changed && let Some(Widget::Slider(state)) = ui.widget_mut(id) {
        state.value = value;
    }
    layout(ui, id);
    if changed {
        ui.emit::<ValueChanged>(id, &value);
    }
}

/// Thin line along the middle of the track.
pub(crate) fn draw(state: &SliderState, surface: &mut dyn Surface, client: Rect, style: &Style) {
    let line = match state.orientation {
        Orientation::Horizontal => Rect::new(client.x, client.y + client.height / 2 - 1, client.width, 2),
        Orientation::Vertical => Rect::new(client.x + client.width / 2 - 1, client.y, 2, client.height),
    };
    surface.fill_rect(line, style.foreground);
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::ui::events::{MouseDown, MouseMove, PointerArgs};
    use crate::ui::input::MouseButton;

    /// 110px track with the default 10px handle: 100px of travel.
    fn slider(ui: &mut Ui, range: (i32, i32), value: i32) -> Slider {
        let root = ui.root();
        Slider::new(ui, root, Rect::new(0, 0, 110, 10), range, value, Orientation::Horizontal)
    }

    fn drag_handle(ui: &mut Ui, s: Slider, from: Point, to: Point) {
        let handle = s.handle(ui).expect("slider has a handle");
        ui.emit::<MouseDown>(
            handle,
            &PointerArgs {
                button: MouseButton::Left,
                pos: from,
            },
        );
        ui.emit::<MouseMove>(handle, &to);
    }

    #[test]
    fn handle_placed_from_value() {
        let mut ui = Ui::new(Size::new(200, 200));
        let s = slider(&mut ui, (0, 100), 50);
        let handle = s.handle(&ui).expect("handle");
        assert_eq!(ui.position(handle), Some(Point::new(50, 0)));
        assert_eq!(ui.size(handle), Some(Size::new(10, 10)));
    }

    #[test]
    fn drag_to_ends_hits_exact_limits() {
        let mut ui = Ui::new(Size::new(200, 200));
        let s = slider(&mut ui, (0, 100), 50);

        drag_handle(&mut ui, s, Point::new(55, 5), Point::new(5, 5));
        assert_eq!(s.value(&ui), 0);

        drag_handle(&mut ui, s, Point::new(5, 5), Point::new(105, 5));
        assert_eq!(s.value(&ui), 100);
    }

    #[test]
    fn drag_past_either_end_clamps_and_snaps_handle() {
        let mut ui = Ui::new(Size::new(400, 200));
        let s = slider(&mut ui, (0, 100), 50);
        let handle = s.handle(&ui).expect("handle");

        drag_handle(&mut ui, s, Point::new(55, 5), Point::new(250, 5));
        assert_eq!(s.value(&ui), 100);
        assert_eq!(ui.position(handle), Some(Point::new(100, 0)));

        drag_handle(&mut ui, s, Point::new(105, 5), Point::new(-300, 40));
        assert_eq!(s.value(&ui), 0);
        assert_eq!(ui.position(handle), Some(Point::new(0, 0)));
    }

    #[test]
    fn drag_to_midpoint_reads_half() {
        let mut ui = Ui::new(Size::new(200, 200));
        let s = slider(&mut ui, (0, 100), 0);
        drag_handle(&mut ui, s, Point::new(5, 5), Point::new(55, 5));
        assert!((s.value(&ui) - 50).abs() <= 1);
    }

    #[test]
    fn value_changed_only_on_change() {
        let mut ui = Ui::new(Size::new(200, 200));
        let s = slider(&mut ui, (0, 10), 0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        ui.on::<ValueChanged, _>(s.id(), move |_, _, v| {
            log.borrow_mut().push(*v);
            Ok(())
        });

        // 1px of 100px travel rounds back to 0.
        drag_handle(&mut ui, s, Point::new(5, 5), Point::new(6, 5));
        assert!(seen.borrow().is_empty());

        drag_handle(&mut ui, s, Point::new(6, 5), Point::new(56, 5));
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn set_value_is_silent_and_moves_handle() {
        let mut ui = Ui::new(Size::new(200, 200));
        let s = slider(&mut ui, (0, 100), 0);
        let fired = Rc::new(RefCell::new(0));
        let f = Rc::clone(&fired);
        ui.on::<ValueChanged, _>(s.id(), move |_, _, _| {
            *f.borrow_mut() += 1;
            Ok(())
        });

        s.set_value(&mut ui, 250);
        assert_eq!(s.value(&ui), 100);
        let handle = s.handle(&ui).expect("handle");
        assert_eq!(ui.position(handle), Some(Point::new(100, 0)));
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn orientation_swap_keeps_value() {
        let mut ui = Ui::new(Size::new(200, 200));
        let s = slider(&mut ui, (0, 100), 25);

        s.set_orientation(&mut ui, Orientation::Vertical);

        assert_eq!(ui.size(s.id()), Some(Size::new(10, 110)));
        let handle = s.handle(&ui).expect("handle");
        assert_eq!(ui.position(handle), Some(Point::new(0, 25)));
        assert_eq!(ui.size(handle), Some(Size::new(10, 10)));
        assert_eq!(s.value(&ui), 25);
        assert_eq!(s.orientation(&ui), Some(Orientation::Vertical));
    }

    #[test]
    fn set_range_clamps_value() {
        let mut ui = Ui::new(Size::new(200, 200));
        let s = slider(&mut ui, (0, 100), 80);
        s.set_range(&mut ui, 50, 10);
        assert_eq!(s.range(&ui), Some((10, 50)));
        assert_eq!(s.value(&ui), 50);
    }

    #[test]
    fn degenerate_range_pins_handle() {
        let mut ui = Ui::new(Size::new(200, 200));
        let s = slider(&mut ui, (7, 7), 3);
        assert_eq!(s.value(&ui), 7);
        let handle = s.handle(&ui).expect("handle");
        assert_eq!(ui.position(handle), Some(Point::new(0, 0)));
    }
}
