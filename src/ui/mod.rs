pub mod animation;
pub mod background;
pub mod draw;
pub mod events;
pub mod input;
pub mod list;
mod manager;
pub mod manipulate;
pub mod node;
pub mod raster;
mod render;
pub mod slider;
pub mod text_edit;
pub mod theme;
pub mod widget;

pub use animation::{Flasher, Pulse};
pub use background::{
    Background, Backgrounds, BlankBackground, ImageBackground, SolidBackground, TiledBackground,
};
pub use draw::{Color, ImageHandle, Surface};
pub use events::{
    Blur, Channel, Click, Dragged, EventKind, FailureLog, Focus, HandlerFailure, KeyInput,
    MouseDown, MouseEnter, MouseLeave, MouseMove, MouseUp, Moved, PointerArgs, Resized,
    Selection, SelectionChanged, TextChanged, ValueChanged,
};
pub use input::{ButtonState, FrameInput, InputSource, Key, KeyEdge, MouseButton};
pub use list::ListBox;
pub use manipulate::{DragHandle, ResizeHandle};
pub use node::{DrawHook, Node};
pub use raster::RasterSurface;
pub use slider::{Orientation, Slider};
pub use text_edit::TextEdit;
pub use theme::{Alignment, BorderKind, InteractionState, Style, TextAlign, Theme};
pub use widget::Widget;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::config::UiConfig;
use crate::geometry::{Point, Rect, Size};

new_key_type! {
    /// Handle into the node arena. Stable across insertions/removals;
    /// a destroyed node's id simply stops resolving.
    pub struct NodeId;
}

/// Snapshot of a child list taken before a traversal.
pub(crate) type ChildSnapshot = SmallVec<[NodeId; 8]>;

/// The manager: owns the node arena, the root, and the per-surface
/// interaction state (hover, focus, pointer capture).
pub struct Ui {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    pub(crate) hovered: Option<NodeId>,
    pub(crate) focused: Option<NodeId>,
    pub(crate) captured: Option<NodeId>,
    pub(crate) last_pointer: Option<Point>,
    /// Shift level reported by the host at the end of the last tick.
    pub(crate) shift_held: bool,
    /// Node flagged hovering by the latest hit test.
    last_hit: Option<NodeId>,
    backgrounds: Backgrounds,
    pub(crate) config: UiConfig,
    pub(crate) failures: FailureLog,
    pub(crate) diagnostic_sink: Option<Box<dyn FnMut(&HandlerFailure)>>,
    /// Cache images of destroyed nodes, released on the next render.
    pub(crate) released: Vec<ImageHandle>,
}

impl Ui {
    pub fn new(size: Size) -> Self {
        Self::with_config(size, UiConfig::default())
    }

    pub fn with_config(size: Size, config: UiConfig) -> Self {
        let backgrounds = Backgrounds::new();
        let root_theme = Theme::new(
            Style::new(backgrounds.blank()).with_foreground(config.palette.foreground),
        );
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(
            None,
            Rect::new(0, 0, size.width, size.height),
            root_theme,
        ));
        Self {
            nodes,
            root,
            hovered: None,
            focused: None,
            captured: None,
            last_pointer: None,
            shift_held: false,
            last_hit: None,
            backgrounds,
            failures: FailureLog::new(config.failure_log_capacity),
            config,
            diagnostic_sink: None,
            released: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Shared default backgrounds.
    pub fn backgrounds(&self) -> &Backgrounds {
        &self.backgrounds
    }

    /// Theme given to nodes created without one.
    pub fn plain_theme(&self) -> Theme {
        Theme::new(
            Style::new(self.backgrounds.blank()).with_foreground(self.config.palette.foreground),
        )
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Create a node as the frontmost child of `parent`, with the plain theme.
    pub fn create(&mut self, parent: NodeId, rect: Rect) -> NodeId {
        self.create_with(Some(parent), rect, None)
    }

    /// Create a node with no parent. It is not drawn or hit until attached.
    pub fn create_detached(&mut self, rect: Rect) -> NodeId {
        self.create_with(None, rect, None)
    }

    pub fn create_with(&mut self, parent: Option<NodeId>, rect: Rect, theme: Option<Theme>) -> NodeId {
        let theme = theme.unwrap_or_else(|| self.plain_theme());
        let parent = parent.filter(|p| {
            let live = self.nodes.contains_key(*p);
            if !live {
                log::warn!("create: parent {:?} is gone, node left detached", p);
            }
            live
        });
        let id = self.nodes.insert(Node::new(parent, rect, theme));
        if let Some(p) = parent
            && let Some(parent_node) = self.nodes.get_mut(p)
        {
            parent_node.children.push(id);
        }
        id
    }

    /// Move a node (and its subtree) to the tail of `parent`'s child list.
    /// Refuses the root and moves that would create a cycle.
    pub fn attach(&mut self, id: NodeId, parent: NodeId) -> bool {
        if id == self.root || !self.nodes.contains_key(id) || !self.nodes.contains_key(parent) {
            return false;
        }
        if self.is_ancestor_or_self(id, parent) {
            log::warn!("attach: {:?} is an ancestor of {:?}", id, parent);
            return false;
        }
        self.unlink(id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = Some(parent);
        }
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        true
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(id).and_then(|n| n.parent) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent_id) = self.nodes.get(id).and_then(|n| n.parent)
            && let Some(parent) = self.nodes.get_mut(parent_id)
        {
            parent.children.retain(|c| *c != id);
        }
    }

    /// Destroy a node and its whole subtree, children first.
    /// The root cannot be destroyed.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        if id == self.root {
            log::warn!("destroy: refusing to destroy the root");
            return false;
        }
        if !self.nodes.contains_key(id) {
            return false;
        }
        self.unlink(id);
        let removed = self.destroy_subtree(id);
        log::debug!("destroyed {:?} ({} nodes)", id, removed);
        true
    }

    fn destroy_subtree(&mut self, id: NodeId) -> usize {
        let children: ChildSnapshot = match self.nodes.get(id) {
            Some(node) => node.children.iter().copied().collect(),
            None => return 0,
        };
        let mut removed = 0;
        for child in children {
            removed += self.destroy_subtree(child);
        }
        if let Some(node) = self.nodes.remove(id) {
            if let Some(image) = node.cache {
                self.released.push(image);
            }
            removed += 1;
        }
        removed
    }

    /// Bring the subtree containing `id` to the front: its top-level
    /// ancestor (a direct child of the root) moves to the end of the
    /// root's child list.
    pub fn pop_to_top(&mut self, id: NodeId) {
        let mut current = id;
        loop {
            let Some(parent) = self.nodes.get(current).and_then(|n| n.parent) else {
                return;
            };
            if parent == self.root {
                break;
            }
            current = parent;
        }
        if let Some(root) = self.nodes.get_mut(self.root)
            && root.children.last() != Some(&current)
        {
            root.children.retain(|c| *c != current);
            root.children.push(current);
            log::debug!("pop_to_top: {:?} now frontmost", current);
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Move a node relative to its parent. Fires `Moved`.
    pub fn set_position(&mut self, id: NodeId, pos: Point) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.rect.x = pos.x;
        node.rect.y = pos.y;
        node.invalidate();
        self.emit::<Moved>(id, &pos);
    }

    /// Resize a node. Negative dimensions clamp to zero. Fires `Resized`.
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let size = Size::new(size.width.max(0), size.height.max(0));
        node.rect.width = size.width;
        node.rect.height = size.height;
        node.invalidate();
        self.emit::<Resized>(id, &size);
    }

    pub fn position(&self, id: NodeId) -> Option<Point> {
        Some(self.nodes.get(id)?.rect.position())
    }

    pub fn size(&self, id: NodeId) -> Option<Size> {
        Some(self.nodes.get(id)?.rect.size())
    }

    /// Sum of the node's and all ancestors' relative positions.
    pub fn screen_position(&self, id: NodeId) -> Option<Point> {
        let mut node = self.nodes.get(id)?;
        let mut pos = node.rect.position();
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(p)) {
            pos = pos + parent.rect.position();
            node = parent;
        }
        Some(pos)
    }

    pub fn screen_rect(&self, id: NodeId) -> Option<Rect> {
        let pos = self.screen_position(id)?;
        Some(Rect::from_parts(pos, self.nodes.get(id)?.rect.size()))
    }

    /// Screen rectangle minus the padding of the current style.
    pub fn client_rect(&self, id: NodeId) -> Option<Rect> {
        let rect = self.screen_rect(id)?;
        Some(rect.inset(self.nodes.get(id)?.style().padding))
    }

    // ------------------------------------------------------------------
    // Appearance and flags
    // ------------------------------------------------------------------

    pub fn text(&self, id: NodeId) -> &str {
        self.nodes.get(id).map_or("", |n| n.text.as_str())
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.text = text.into();
            node.invalidate();
        }
    }

    /// Apply a theme by value. Background strategies stay shared.
    pub fn set_theme(&mut self, id: NodeId, theme: &Theme) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.theme = theme.clone();
            node.invalidate();
        }
    }

    /// Edit a node's theme in place.
    pub fn update_theme(&mut self, id: NodeId, edit: impl FnOnce(&mut Theme)) {
        if let Some(node) = self.nodes.get_mut(id) {
            edit(&mut node.theme);
            node.invalidate();
        }
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.enabled = enabled;
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.visible = visible;
        }
    }

    pub fn set_can_focus(&mut self, id: NodeId, can_focus: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.can_focus = can_focus;
        }
    }

    pub fn set_draw_hook(&mut self, id: NodeId, hook: Option<DrawHook>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.hook = hook;
            node.invalidate();
        }
    }

    /// Mark a node's cached pixels stale; it is redrawn on the next render.
    pub fn invalidate(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.invalidate();
        }
    }

    pub(crate) fn widget_mut(&mut self, id: NodeId) -> Option<&mut Widget> {
        self.nodes.get_mut(id).map(|n| &mut n.widget)
    }

    pub(crate) fn set_widget(&mut self, id: NodeId, widget: Widget) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = widget;
            node.invalidate();
        }
    }

    // ------------------------------------------------------------------
    // Interaction targets
    // ------------------------------------------------------------------

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered.filter(|id| self.nodes.contains_key(*id))
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|id| self.nodes.contains_key(*id))
    }

    pub fn captured(&self) -> Option<NodeId> {
        self.captured.filter(|id| self.nodes.contains_key(*id))
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    /// Find the most specific visible, enabled node containing `p`.
    ///
    /// Children are tested frontmost first (last child wins). Afterwards
    /// exactly the returned node has `hovering` set, or none if nothing
    /// was hit.
    pub fn hit_test(&mut self, p: Point) -> Option<NodeId> {
        if let Some(prev) = self.last_hit.take()
            && let Some(node) = self.nodes.get_mut(prev)
        {
            node.hovering = false;
        }
        let hit = self.hit_test_node(self.root, p, Point::ZERO);
        if let Some(id) = hit
            && let Some(node) = self.nodes.get_mut(id)
        {
            node.hovering = true;
        }
        self.last_hit = hit;
        hit
    }

    fn hit_test_node(&self, id: NodeId, p: Point, origin: Point) -> Option<NodeId> {
        let node = self.nodes.get(id)?;
        if !node.visible || !node.enabled {
            return None;
        }
        let screen = node.rect.translate(origin);
        if !screen.contains(p) {
            return None;
        }
        // Children drawn on top; check the last child first.
        let children: ChildSnapshot = node.children.iter().copied().collect();
        for &child in children.iter().rev() {
            if let Some(hit) = self.hit_test_node(child, p, screen.position()) {
                return Some(hit);
            }
        }
        Some(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
