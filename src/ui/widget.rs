use super::animation::Pulse;
use super::draw::{Color, Surface};
use super::events::PointerArgs;
use super::input::{KeyEdge, MouseButton};
use super::list::{self, ListState};
use super::manipulate::{self, DragState, ResizeState};
use super::slider::{self, SliderState};
use super::text_edit::{self, TextEditState};
use super::theme::Style;
use super::{NodeId, Ui};
use crate::config::UiConfig;
use crate::geometry::{Point, Rect, Size};

/// Built-in behavior attached to a node.
///
/// Most nodes are `Plain` and get all their behavior from subscribers and
/// strategies. The variants here need state and update/draw logic of
/// their own.
#[derive(Debug, Default)]
pub enum Widget {
    #[default]
    Plain,
    List(ListState),
    /// One visible row of a list (child of a `List` node).
    ListItem,
    TextEdit(TextEditState),
    Slider(SliderState),
    DragHandle(DragState),
    ResizeHandle(ResizeState),
    /// Fills its client area with `color` at a pulsing alpha.
    Flasher { pulse: Pulse, color: Color },
}

impl Widget {
    pub fn name(&self) -> &'static str {
        match self {
            Widget::Plain => "plain",
            Widget::List(_) => "list",
            Widget::ListItem => "list_item",
            Widget::TextEdit(_) => "text_edit",
            Widget::Slider(_) => "slider",
            Widget::DragHandle(_) => "drag_handle",
            Widget::ResizeHandle(_) => "resize_handle",
            Widget::Flasher { .. } => "flasher",
        }
    }

    /// Widget-specific drawing, between the border and the custom hook.
    pub(crate) fn draw(&self, surface: &mut dyn Surface, client: Rect, style: &Style, config: &UiConfig) {
        match self {
            Widget::TextEdit(state) => text_edit::draw(state, surface, client, style, config),
            Widget::Slider(state) => slider::draw(state, surface, client, style),
            Widget::Flasher { pulse, color } => {
                surface.fill_rect(client, color.with_alpha(pulse.alpha()));
            }
            _ => {}
        }
    }

    /// Advance time-driven state. Returns true when the node needs a redraw.
    pub(crate) fn animate(&mut self, dt: f32) -> bool {
        match self {
            Widget::Flasher { pulse, .. } => {
                pulse.advance(dt);
                true
            }
            Widget::TextEdit(state) if state.focused => {
                state.caret.advance(dt);
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in event behavior (runs before user subscribers)
// ---------------------------------------------------------------------------

fn widget_of(ui: &Ui, id: NodeId) -> Option<&Widget> {
    ui.node(id).map(|n| &n.widget)
}

pub(crate) fn on_click(ui: &mut Ui, id: NodeId, _button: &MouseButton) {
    if matches!(widget_of(ui, id), Some(Widget::ListItem)) {
        list::on_item_click(ui, id);
    }
}

pub(crate) fn on_mouse_down(ui: &mut Ui, id: NodeId, args: &PointerArgs) {
    match widget_of(ui, id) {
        Some(Widget::DragHandle(_) | Widget::ResizeHandle(_)) => {
            manipulate::begin(ui, id, args.pos);
        }
        _ => {}
    }
}

pub(crate) fn on_mouse_up(ui: &mut Ui, id: NodeId, _args: &PointerArgs) {
    match widget_of(ui, id) {
        Some(Widget::DragHandle(_) | Widget::ResizeHandle(_)) => manipulate::end(ui, id),
        _ => {}
    }
}

pub(crate) fn on_mouse_move(ui: &mut Ui, id: NodeId, pos: &Point) {
    match widget_of(ui, id) {
        Some(Widget::DragHandle(_)) => manipulate::drag(ui, id, *pos),
        Some(Widget::ResizeHandle(_)) => manipulate::resize(ui, id, *pos),
        _ => {}
    }
}

pub(crate) fn on_focus(ui: &mut Ui, id: NodeId, _: &()) {
    if matches!(widget_of(ui, id), Some(Widget::TextEdit(_))) {
        text_edit::set_focused(ui, id, true);
    }
}

pub(crate) fn on_blur(ui: &mut Ui, id: NodeId, _: &()) {
    if matches!(widget_of(ui, id), Some(Widget::TextEdit(_))) {
        text_edit::set_focused(ui, id, false);
    }
}

pub(crate) fn on_resized(ui: &mut Ui, id: NodeId, _size: &Size) {
    match widget_of(ui, id) {
        Some(Widget::List(_)) => list::rebuild(ui, id),
        Some(Widget::Slider(_)) => slider::layout(ui, id),
        _ => {}
    }
}

pub(crate) fn on_keys(ui: &mut Ui, id: NodeId, keys: &[KeyEdge]) {
    if matches!(widget_of(ui, id), Some(Widget::TextEdit(_))) {
        text_edit::apply_keys(ui, id, keys);
    }
}

/// A drag manipulator moved its target. Slider handles report back to
/// their slider.
pub(crate) fn on_dragged(ui: &mut Ui, id: NodeId, _pos: &Point) {
    if let Some(parent) = ui.parent(id)
        && matches!(widget_of(ui, parent), Some(Widget::Slider(_)))
    {
        slider::sync_from_handle(ui, parent, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flasher_animates_and_requests_redraw() {
        let mut w = Widget::Flasher {
            pulse: Pulse::new(300.0),
            color: Color::RED,
        };
        assert!(w.animate(0.5));
        let Widget::Flasher { pulse, .. } = &w else {
            panic!("variant changed");
        };
        assert_eq!(pulse.alpha(), 150);
    }

    #[test]
    fn plain_widgets_are_static() {
        let mut w = Widget::Plain;
        assert!(!w.animate(1.0));
        assert_eq!(w.name(), "plain");
    }
}
