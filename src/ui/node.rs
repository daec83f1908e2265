use std::fmt;
use std::rc::Rc;

use super::NodeId;
use super::draw::{ImageHandle, Surface};
use super::events::NodeEvents;
use super::theme::{InteractionState, Style, Theme};
use super::widget::Widget;
use crate::geometry::{Point, Rect, Size};

/// Custom drawing stage run between the background and the text.
/// Receives the node-local rectangle and the resolved style.
pub type DrawHook = Rc<dyn Fn(&mut dyn Surface, Rect, &Style)>;

/// Arena entry: one control in the tree.
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Position relative to the parent, plus size.
    pub(crate) rect: Rect,
    pub(crate) theme: Theme,
    pub(crate) text: String,
    pub(crate) enabled: bool,
    pub(crate) visible: bool,
    pub(crate) active: bool,
    pub(crate) hovering: bool,
    pub(crate) can_focus: bool,
    /// Offscreen copy of the last drawn pixels.
    pub(crate) cache: Option<ImageHandle>,
    pub(crate) cache_valid: bool,
    /// Interaction state the cache was drawn with.
    pub(crate) drawn_state: Option<InteractionState>,
    pub(crate) hook: Option<DrawHook>,
    pub(crate) widget: Widget,
    pub(crate) events: NodeEvents,
}

impl Node {
    pub(crate) fn new(parent: Option<NodeId>, rect: Rect, theme: Theme) -> Self {
        Self {
            parent,
            children: Vec::new(),
            rect,
            theme,
            text: String::new(),
            enabled: true,
            visible: true,
            active: false,
            hovering: false,
            can_focus: false,
            cache: None,
            cache_valid: false,
            drawn_state: None,
            hook: None,
            widget: Widget::Plain,
            events: NodeEvents::default(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Relative position and size.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn position(&self) -> Point {
        self.rect.position()
    }

    pub fn size(&self) -> Size {
        self.rect.size()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn can_focus(&self) -> bool {
        self.can_focus
    }

    pub fn is_cache_valid(&self) -> bool {
        self.cache_valid
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    pub fn interaction_state(&self) -> InteractionState {
        InteractionState {
            enabled: self.enabled,
            hovering: self.hovering,
            active: self.active,
        }
    }

    /// Style for the current interaction state.
    pub fn style(&self) -> &Style {
        self.theme.resolve(self.interaction_state())
    }

    pub(crate) fn invalidate(&mut self) {
        self.cache_valid = false;
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("rect", &self.rect)
            .field("text", &self.text)
            .field("enabled", &self.enabled)
            .field("visible", &self.visible)
            .field("hovering", &self.hovering)
            .field("widget", &self.widget)
            .finish_non_exhaustive()
    }
}
