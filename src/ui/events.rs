use std::collections::VecDeque;
use std::fmt;

use super::input::{KeyEdge, MouseButton};
use super::{NodeId, Ui, widget};
use crate::error::{HandlerError, HandlerResult};
use crate::geometry::{Point, Size};

/// Callback attached to one event channel of one node.
///
/// Receives the manager so it can mutate the tree (including destroying
/// its own node); tree effects are visible to the rest of the tick.
pub type Subscriber<T> = Box<dyn FnMut(&mut Ui, NodeId, &T) -> HandlerResult>;

/// Ordered subscriber list for one event kind.
pub struct Channel<T> {
    subscribers: Vec<Subscriber<T>>,
}

impl<T> Channel<T> {
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    fn push(&mut self, subscriber: Subscriber<T>) {
        self.subscribers.push(subscriber);
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Pointer payload for button events (screen coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerArgs {
    pub button: MouseButton,
    pub pos: Point,
}

/// Payload of a list selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: Option<usize>,
    pub text: String,
}

/// Every channel a node exposes.
#[derive(Debug, Default)]
pub struct NodeEvents {
    pub(crate) click: Channel<MouseButton>,
    pub(crate) mouse_down: Channel<PointerArgs>,
    pub(crate) mouse_up: Channel<PointerArgs>,
    pub(crate) mouse_enter: Channel<()>,
    pub(crate) mouse_leave: Channel<()>,
    pub(crate) mouse_move: Channel<Point>,
    pub(crate) focus: Channel<()>,
    pub(crate) blur: Channel<()>,
    pub(crate) moved: Channel<Point>,
    pub(crate) resized: Channel<Size>,
    pub(crate) keys: Channel<Vec<KeyEdge>>,
    pub(crate) selection_changed: Channel<Selection>,
    pub(crate) text_changed: Channel<String>,
    pub(crate) value_changed: Channel<i32>,
    pub(crate) dragged: Channel<Point>,
}

/// A typed event kind: names its payload and the channel carrying it.
pub trait EventKind {
    type Payload;
    const NAME: &'static str;

    fn channel(events: &mut NodeEvents) -> &mut Channel<Self::Payload>;

    /// Widget behavior run before user subscribers.
    fn behave(_ui: &mut Ui, _id: NodeId, _payload: &Self::Payload) {}
}

macro_rules! event_kind {
    ($(#[$doc:meta])* $name:ident, $payload:ty, $field:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub enum $name {}

        impl EventKind for $name {
            type Payload = $payload;
            const NAME: &'static str = $label;

            fn channel(events: &mut NodeEvents) -> &mut Channel<$payload> {
                &mut events.$field
            }
        }
    };
    ($(#[$doc:meta])* $name:ident, $payload:ty, $field:ident, $label:literal, $behave:path) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub enum $name {}

        impl EventKind for $name {
            type Payload = $payload;
            const NAME: &'static str = $label;

            fn channel(events: &mut NodeEvents) -> &mut Channel<$payload> {
                &mut events.$field
            }

            fn behave(ui: &mut Ui, id: NodeId, payload: &$payload) {
                $behave(ui, id, payload);
            }
        }
    };
}

event_kind!(
    /// Button pressed on the hovered node (fires after `MouseDown`).
    Click, MouseButton, click, "click", widget::on_click
);
event_kind!(MouseDown, PointerArgs, mouse_down, "mouse_down", widget::on_mouse_down);
event_kind!(MouseUp, PointerArgs, mouse_up, "mouse_up", widget::on_mouse_up);
event_kind!(MouseEnter, (), mouse_enter, "mouse_enter");
event_kind!(MouseLeave, (), mouse_leave, "mouse_leave");
event_kind!(
    /// Pointer moved while this node holds pointer capture.
    MouseMove, Point, mouse_move, "mouse_move", widget::on_mouse_move
);
event_kind!(Focus, (), focus, "focus", widget::on_focus);
event_kind!(Blur, (), blur, "blur", widget::on_blur);
event_kind!(
    /// Relative position changed.
    Moved, Point, moved, "move"
);
event_kind!(
    /// Size changed.
    Resized, Size, resized, "resize", widget::on_resized
);
event_kind!(
    /// Key edges of the frame, delivered to the focus target.
    KeyInput, Vec<KeyEdge>, keys, "keys", widget::on_keys
);
event_kind!(SelectionChanged, Selection, selection_changed, "selection_changed");
event_kind!(TextChanged, String, text_changed, "text_changed");
event_kind!(ValueChanged, i32, value_changed, "value_changed");
event_kind!(
    /// A drag manipulator applied a new position to its target.
    Dragged, Point, dragged, "dragged", widget::on_dragged
);

// ---------------------------------------------------------------------------
// Failure capture
// ---------------------------------------------------------------------------

/// A subscriber that returned an error during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub node: NodeId,
    pub event: &'static str,
    /// Position of the subscriber in its channel.
    pub subscriber: usize,
    pub error: HandlerError,
}

/// The most recent subscriber failures. Once `capacity` entries are
/// held, each new failure evicts the oldest one.
#[derive(Debug)]
pub struct FailureLog {
    entries: VecDeque<HandlerFailure>,
    capacity: usize,
}

impl FailureLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, failure: HandlerFailure) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(failure);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HandlerFailure> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Publish / subscribe
// ---------------------------------------------------------------------------

impl Ui {
    /// Subscribe to an event kind on a node. Returns false for a stale id.
    pub fn on<E, F>(&mut self, id: NodeId, subscriber: F) -> bool
    where
        E: EventKind,
        F: FnMut(&mut Ui, NodeId, &E::Payload) -> HandlerResult + 'static,
    {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        E::channel(&mut node.events).push(Box::new(subscriber));
        true
    }

    /// Number of subscribers on one channel of a node.
    pub fn subscriber_count<E: EventKind>(&mut self, id: NodeId) -> usize {
        self.nodes
            .get_mut(id)
            .map_or(0, |node| E::channel(&mut node.events).len())
    }

    /// Deliver an event: widget behavior first, then every subscriber in
    /// subscription order.
    ///
    /// The channel is detached while it runs, so a subscriber re-emitting
    /// the same kind on the same node reaches no subscribers. Subscribers
    /// added during dispatch are kept and run from the next emission.
    pub fn emit<E: EventKind>(&mut self, id: NodeId, payload: &E::Payload) {
        E::behave(self, id, payload);

        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let mut running = std::mem::take(E::channel(&mut node.events));
        if running.is_empty() {
            return;
        }
        log::trace!("emit {} to {:?} ({} subscribers)", E::NAME, id, running.len());

        for (index, subscriber) in running.subscribers.iter_mut().enumerate() {
            if let Err(error) = subscriber(self, id, payload) {
                self.record_failure(HandlerFailure {
                    node: id,
                    event: E::NAME,
                    subscriber: index,
                    error,
                });
            }
        }

        // Node may have been destroyed by a subscriber.
        if let Some(node) = self.nodes.get_mut(id) {
            let channel = E::channel(&mut node.events);
            let added = std::mem::replace(channel, running);
            channel.subscribers.extend(added.subscribers);
        }
    }

    fn record_failure(&mut self, failure: HandlerFailure) {
        log::warn!(
            "{} subscriber #{} on {:?} failed: {}",
            failure.event,
            failure.subscriber,
            failure.node,
            failure.error
        );
        if let Some(sink) = self.diagnostic_sink.as_mut() {
            sink(&failure);
        }
        self.failures.push(failure);
    }

    /// Subscriber failures captured so far (bounded, oldest dropped first).
    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    /// Forward every captured failure to `sink` as it happens.
    pub fn set_diagnostic_sink(&mut self, sink: impl FnMut(&HandlerFailure) + 'static) {
        self.diagnostic_sink = Some(Box::new(sink));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::geometry::Rect;

    fn failure(n: usize) -> HandlerFailure {
        HandlerFailure {
            node: NodeId::default(),
            event: "click",
            subscriber: n,
            error: HandlerError::from("boom"),
        }
    }

    #[test]
    fn failure_log_wraps() {
        let mut log = FailureLog::new(3);
        for i in 0..5 {
            log.push(failure(i));
        }
        assert_eq!(log.len(), 3);
        let order: Vec<usize> = log.iter().map(|f| f.subscriber).collect();
        assert_eq!(order, vec![2, 3, 4]);

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.iter().count(), 0);
    }

    #[test]
    fn failing_subscriber_does_not_stop_the_rest() {
        let mut ui = Ui::new(crate::geometry::Size::new(100, 100));
        let node = ui.create(ui.root(), Rect::new(0, 0, 10, 10));
        let calls = Rc::new(RefCell::new(Vec::new()));

        let c = Rc::clone(&calls);
        ui.on::<Click, _>(node, move |_, _, _| {
            c.borrow_mut().push("first");
            Err(HandlerError::from("first failed"))
        });
        let c = Rc::clone(&calls);
        ui.on::<Click, _>(node, move |_, _, _| {
            c.borrow_mut().push("second");
            Ok(())
        });

        let sunk = Rc::new(RefCell::new(0));
        let s = Rc::clone(&sunk);
        ui.set_diagnostic_sink(move |_| *s.borrow_mut() += 1);

        ui.emit::<Click>(node, &MouseButton::Left);

        assert_eq!(*calls.borrow(), vec!["first", "second"]);
        assert_eq!(ui.failures().len(), 1);
        let f = ui.failures().iter().next().expect("one failure");
        assert_eq!(f.event, "click");
        assert_eq!(f.subscriber, 0);
        assert_eq!(f.error, HandlerError::from("first failed"));
        assert_eq!(*sunk.borrow(), 1);
    }

    #[test]
    fn subscriber_may_destroy_its_node() {
        let mut ui = Ui::new(crate::geometry::Size::new(100, 100));
        let node = ui.create(ui.root(), Rect::new(0, 0, 10, 10));
        ui.on::<Click, _>(node, |ui, id, _| {
            ui.destroy(id);
            Ok(())
        });
        ui.emit::<Click>(node, &MouseButton::Left);
        assert!(ui.node(node).is_none());
        assert!(ui.children(ui.root()).is_empty());
    }

    #[test]
    fn subscriptions_added_during_dispatch_survive() {
        let mut ui = Ui::new(crate::geometry::Size::new(100, 100));
        let node = ui.create(ui.root(), Rect::new(0, 0, 10, 10));
        ui.on::<Click, _>(node, |ui, id, _| {
            ui.on::<Click, _>(id, |_, _, _| Ok(()));
            Ok(())
        });
        ui.emit::<Click>(node, &MouseButton::Left);
        assert_eq!(ui.subscriber_count::<Click>(node), 2);
    }

    #[test]
    fn subscribe_to_stale_node_is_rejected() {
        let mut ui = Ui::new(crate::geometry::Size::new(100, 100));
        let node = ui.create(ui.root(), Rect::new(0, 0, 10, 10));
        ui.destroy(node);
        assert!(!ui.on::<Focus, _>(node, |_, _, _| Ok(())));
    }
}
