use super::draw::Surface;
use super::events::{
    Blur, Click, Focus, KeyInput, MouseDown, MouseEnter, MouseLeave, MouseMove, MouseUp,
    PointerArgs,
};
use super::input::{InputSource, Key, MouseButton};
use super::{NodeId, Ui};
use crate::geometry::Point;

impl Ui {
    /// Run one host frame.
    ///
    /// Order: hit test, leave/enter, capture move, keys to the focus
    /// target, animation, render, then button edges (down, pop-to-top,
    /// capture, blur, focus, click; up releases capture).
    pub fn tick(&mut self, dt: f32, input: &dyn InputSource, surface: &mut dyn Surface) {
        let pointer = input.pointer();

        let hover = self.hit_test(pointer);
        if hover != self.hovered {
            if let Some(old) = self.hovered.take() {
                self.emit::<MouseLeave>(old, &());
            }
            self.hovered = hover;
            if let Some(new) = hover {
                self.emit::<MouseEnter>(new, &());
            }
        }

        if let Some(target) = self.captured()
            && self.last_pointer != Some(pointer)
        {
            self.emit::<MouseMove>(target, &pointer);
        }
        self.last_pointer = Some(pointer);

        let keys = input.key_edges();
        if let Some(target) = self.focused()
            && !keys.is_empty()
        {
            self.emit::<KeyInput>(target, &keys);
        }
        self.shift_held = input.key(Key::Shift).held;

        self.animate(dt);
        self.render(surface, dt);

        for button in MouseButton::ALL {
            let state = input.button(button);
            if state.pressed {
                self.press(button, pointer, hover);
            }
            if state.released {
                self.release(button, pointer);
            }
        }
    }

    fn animate(&mut self, dt: f32) {
        for node in self.nodes.values_mut() {
            if node.widget.animate(dt) {
                node.invalidate();
            }
        }
    }

    fn press(&mut self, button: MouseButton, pos: Point, hover: Option<NodeId>) {
        // An earlier handler this tick may have destroyed the hover target.
        let hover = hover.filter(|id| self.contains(*id));
        log::trace!("{:?} down at {:?} on {:?}", button, pos, hover);

        if let Some(target) = hover {
            if let Some(node) = self.nodes.get_mut(target) {
                node.active = true;
            }
            self.emit::<MouseDown>(target, &PointerArgs { button, pos });
            self.pop_to_top(target);
            self.captured = Some(target);
        }

        if let Some(old) = self.focused.take() {
            self.emit::<Blur>(old, &());
        }

        let Some(target) = hover.filter(|id| self.contains(*id)) else {
            return;
        };
        if self.nodes.get(target).is_some_and(|n| n.can_focus) {
            self.focused = Some(target);
            self.emit::<Focus>(target, &());
        }
        self.emit::<Click>(target, &button);
    }

    fn release(&mut self, button: MouseButton, pos: Point) {
        let Some(target) = self.captured() else {
            self.captured = None;
            return;
        };
        if let Some(node) = self.nodes.get_mut(target) {
            node.active = false;
        }
        self.emit::<MouseUp>(target, &PointerArgs { button, pos });
        self.captured = None;
    }

    /// Move keyboard focus. Blurs the old target; `None` or a node that
    /// cannot take focus leaves nothing focused.
    pub fn set_focus(&mut self, id: Option<NodeId>) {
        if let Some(old) = self.focused.take() {
            self.emit::<Blur>(old, &());
        }
        if let Some(id) = id
            && self.nodes.get(id).is_some_and(|n| n.can_focus)
        {
            self.focused = Some(id);
            self.emit::<Focus>(id, &());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::geometry::{Rect, Size};
    use crate::ui::events::EventKind;
    use crate::ui::input::{ButtonState, FrameInput, KeyEdge};
    use crate::ui::raster::RasterSurface;
    use crate::ui::text_edit::TextEdit;

    type Log = Rc<RefCell<Vec<String>>>;

    fn watch<E: EventKind + 'static>(ui: &mut Ui, id: NodeId, log: &Log, label: &'static str) {
        let l = Rc::clone(log);
        ui.on::<E, _>(id, move |_, _, _| {
            l.borrow_mut().push(format!("{label}:{}", E::NAME));
            Ok(())
        });
    }

    fn setup() -> (Ui, RasterSurface) {
        (Ui::new(Size::new(200, 200)), RasterSurface::new(200, 200))
    }

    fn click_at(pos: Point) -> FrameInput {
        FrameInput::at(pos).with_button(MouseButton::Left, ButtonState::PRESSED)
    }

    #[test]
    fn enter_then_down_then_click() {
        let (mut ui, mut surface) = setup();
        let button = ui.create(ui.root(), Rect::new(10, 10, 50, 20));
        let log: Log = Rc::default();
        watch::<MouseEnter>(&mut ui, button, &log, "b");
        watch::<MouseDown>(&mut ui, button, &log, "b");
        watch::<Click>(&mut ui, button, &log, "b");

        ui.tick(0.016, &click_at(Point::new(20, 20)), &mut surface);

        assert_eq!(
            *log.borrow(),
            vec!["b:mouse_enter", "b:mouse_down", "b:click"]
        );
        assert_eq!(ui.hovered(), Some(button));
        assert_eq!(ui.captured(), Some(button));
    }

    #[test]
    fn leave_precedes_enter() {
        let (mut ui, mut surface) = setup();
        let a = ui.create(ui.root(), Rect::new(0, 0, 50, 50));
        let b = ui.create(ui.root(), Rect::new(100, 100, 50, 50));
        let log: Log = Rc::default();
        watch::<MouseLeave>(&mut ui, a, &log, "a");
        watch::<MouseEnter>(&mut ui, b, &log, "b");

        ui.tick(0.016, &FrameInput::at(Point::new(10, 10)), &mut surface);
        ui.tick(0.016, &FrameInput::at(Point::new(110, 110)), &mut surface);

        assert_eq!(*log.borrow(), vec!["a:mouse_leave", "b:mouse_enter"]);
    }

    #[test]
    fn blur_precedes_focus() {
        let (mut ui, mut surface) = setup();
        let root = ui.root();
        let first = TextEdit::new(&mut ui, root, Rect::new(0, 0, 80, 12));
        let second = TextEdit::new(&mut ui, root, Rect::new(0, 50, 80, 12));
        let log: Log = Rc::default();
        watch::<Blur>(&mut ui, first.id(), &log, "first");
        watch::<Focus>(&mut ui, second.id(), &log, "second");

        ui.tick(0.016, &click_at(Point::new(5, 5)), &mut surface);
        assert_eq!(ui.focused(), Some(first.id()));
        ui.tick(0.016, &click_at(Point::new(5, 55)), &mut surface);

        assert_eq!(*log.borrow(), vec!["first:blur", "second:focus"]);
        assert_eq!(ui.focused(), Some(second.id()));
    }

    #[test]
    fn click_fires_without_focusability() {
        let (mut ui, mut surface) = setup();
        let plain = ui.create(ui.root(), Rect::new(0, 0, 50, 50));
        let log: Log = Rc::default();
        watch::<Focus>(&mut ui, plain, &log, "p");
        watch::<Click>(&mut ui, plain, &log, "p");

        ui.tick(0.016, &click_at(Point::new(5, 5)), &mut surface);

        assert_eq!(*log.borrow(), vec!["p:click"]);
        assert_eq!(ui.focused(), None);
    }

    #[test]
    fn pressing_elsewhere_blurs_focus() {
        let (mut ui, mut surface) = setup();
        let root = ui.root();
        let field = TextEdit::new(&mut ui, root, Rect::new(0, 0, 80, 12));
        ui.tick(0.016, &click_at(Point::new(5, 5)), &mut surface);
        assert!(field.is_focused(&ui));

        ui.tick(0.016, &click_at(Point::new(150, 150)), &mut surface);
        assert!(!field.is_focused(&ui));
        assert_eq!(ui.focused(), None);
    }

    #[test]
    fn capture_follows_pointer_outside_bounds() {
        let (mut ui, mut surface) = setup();
        let knob = ui.create(ui.root(), Rect::new(0, 0, 10, 10));
        let moves = Rc::new(RefCell::new(Vec::new()));
        let m = Rc::clone(&moves);
        ui.on::<MouseMove, _>(knob, move |_, _, p| {
            m.borrow_mut().push(*p);
            Ok(())
        });

        ui.tick(0.016, &click_at(Point::new(5, 5)), &mut surface);
        let held = |p: Point| FrameInput::at(p).with_button(MouseButton::Left, ButtonState::HELD);
        ui.tick(0.016, &held(Point::new(150, 150)), &mut surface);
        ui.tick(0.016, &held(Point::new(150, 150)), &mut surface);
        let up = FrameInput::at(Point::new(160, 160))
            .with_button(MouseButton::Left, ButtonState::RELEASED);
        ui.tick(0.016, &up, &mut surface);
        ui.tick(0.016, &FrameInput::at(Point::new(170, 170)), &mut surface);

        // Unchanged pointer fires nothing; after release capture is gone.
        assert_eq!(
            *moves.borrow(),
            vec![Point::new(150, 150), Point::new(160, 160)]
        );
        assert_eq!(ui.captured(), None);
    }

    #[test]
    fn active_lasts_from_down_to_up() {
        let (mut ui, mut surface) = setup();
        let button = ui.create(ui.root(), Rect::new(0, 0, 10, 10));
        let log: Log = Rc::default();
        watch::<MouseUp>(&mut ui, button, &log, "b");

        ui.tick(0.016, &click_at(Point::new(5, 5)), &mut surface);
        assert!(ui.node(button).expect("live").is_active());

        let up = FrameInput::at(Point::new(5, 5)).with_button(MouseButton::Left, ButtonState::RELEASED);
        ui.tick(0.016, &up, &mut surface);
        assert!(!ui.node(button).expect("live").is_active());
        assert_eq!(*log.borrow(), vec!["b:mouse_up"]);
    }

    #[test]
    fn press_pops_window_to_front() {
        let (mut ui, mut surface) = setup();
        let root = ui.root();
        let back = ui.create(root, Rect::new(0, 0, 100, 100));
        let inner = ui.create(back, Rect::new(0, 0, 20, 20));
        let front = ui.create(root, Rect::new(50, 50, 100, 100));

        ui.tick(0.016, &click_at(Point::new(5, 5)), &mut surface);

        assert_eq!(ui.captured(), Some(inner));
        assert_eq!(ui.children(root), &[front, back]);
    }

    #[test]
    fn keys_go_to_focus_target() {
        let (mut ui, mut surface) = setup();
        let root = ui.root();
        let field = TextEdit::new(&mut ui, root, Rect::new(0, 0, 80, 12));
        ui.tick(0.016, &click_at(Point::new(5, 5)), &mut surface);

        let typing = FrameInput::at(Point::new(5, 5))
            .with_keys([KeyEdge::press(Key::O), KeyEdge::press(Key::K)]);
        ui.tick(0.016, &typing, &mut surface);

        assert_eq!(field.text(&ui), "ok");
    }

    #[test]
    fn handler_destroying_hover_target_mid_tick() {
        let (mut ui, mut surface) = setup();
        let doomed = ui.create(ui.root(), Rect::new(0, 0, 50, 50));
        ui.on::<MouseEnter, _>(doomed, |ui, id, _| {
            ui.destroy(id);
            Ok(())
        });

        ui.tick(0.016, &click_at(Point::new(5, 5)), &mut surface);

        assert!(!ui.contains(doomed));
        assert_eq!(ui.captured(), None);
        assert_eq!(ui.hovered(), None);
    }

    #[test]
    fn shift_released_elsewhere_does_not_stick() {
        let (mut ui, mut surface) = setup();
        let root = ui.root();
        let first = TextEdit::new(&mut ui, root, Rect::new(0, 0, 80, 12));
        let second = TextEdit::new(&mut ui, root, Rect::new(0, 50, 80, 12));

        ui.tick(0.016, &click_at(Point::new(5, 5)), &mut surface);
        let shift_down = FrameInput::at(Point::new(5, 5)).with_keys([KeyEdge::press(Key::Shift)]);
        ui.tick(0.016, &shift_down, &mut surface);

        let to_second = click_at(Point::new(5, 55)).with_held([Key::Shift]);
        ui.tick(0.016, &to_second, &mut surface);
        let shift_up = FrameInput::at(Point::new(5, 55)).with_keys([KeyEdge::release(Key::Shift)]);
        ui.tick(0.016, &shift_up, &mut surface);

        ui.tick(0.016, &click_at(Point::new(5, 5)), &mut surface);
        let typing = FrameInput::at(Point::new(5, 5)).with_keys([KeyEdge::press(Key::A)]);
        ui.tick(0.016, &typing, &mut surface);

        assert_eq!(first.text(&ui), "a");
        assert_eq!(second.text(&ui), "");
    }

    #[test]
    fn focus_picks_up_held_shift() {
        let (mut ui, mut surface) = setup();
        let root = ui.root();
        let field = TextEdit::new(&mut ui, root, Rect::new(0, 0, 80, 12));

        let shift_down = FrameInput::at(Point::new(150, 150)).with_keys([KeyEdge::press(Key::Shift)]);
        ui.tick(0.016, &shift_down, &mut surface);
        ui.tick(0.016, &click_at(Point::new(5, 5)).with_held([Key::Shift]), &mut surface);
        let typing = FrameInput::at(Point::new(5, 5))
            .with_held([Key::Shift])
            .with_keys([KeyEdge::press(Key::A)]);
        ui.tick(0.016, &typing, &mut surface);

        assert_eq!(field.text(&ui), "A");
    }

    #[test]
    fn set_focus_requires_focusable() {
        let (mut ui, _) = setup();
        let plain = ui.create(ui.root(), Rect::new(0, 0, 10, 10));
        ui.set_focus(Some(plain));
        assert_eq!(ui.focused(), None);

        let root = ui.root();
        let field = TextEdit::new(&mut ui, root, Rect::new(0, 20, 10, 10));
        ui.set_focus(Some(field.id()));
        assert!(field.is_focused(&ui));
        ui.set_focus(None);
        assert!(!field.is_focused(&ui));
    }
}
