use super::animation::Pulse;
use super::draw::Surface;
use super::events::TextChanged;
use super::input::{Key, KeyEdge};
use super::theme::{Alignment, BorderKind, Style, TextAlign, Theme};
use super::widget::Widget;
use super::{NodeId, Ui};
use crate::config::UiConfig;
use crate::geometry::{Edges, Point, Rect};

/// Glyph used to size the caret headroom.
const MARGIN_GLYPH: char = 'W';

#[derive(Debug, Clone, PartialEq)]
pub struct TextEditState {
    pub(crate) text: String,
    pub(crate) focused: bool,
    /// Shift level from the last Shift edge seen.
    pub(crate) shift: bool,
    pub(crate) caret: Pulse,
}

/// Single-line text field over the fixed key alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit(pub NodeId);

impl TextEdit {
    pub fn new(ui: &mut Ui, parent: NodeId, rect: Rect) -> Self {
        let palette = ui.config().palette;
        let theme = Theme::new(
            Style::new(ui.backgrounds().field())
                .with_foreground(palette.text_dark)
                .with_border(BorderKind::Sunken)
                .with_padding(Edges::all(2))
                .with_align(TextAlign::new(Alignment::Near, Alignment::Center)),
        );
        let state = TextEditState {
            text: String::new(),
            focused: false,
            shift: false,
            caret: Pulse::new(ui.config().caret_pace),
        };
        let id = ui.create_with(Some(parent), rect, Some(theme));
        ui.set_widget(id, Widget::TextEdit(state));
        ui.set_can_focus(id, true);
        Self(id)
    }

    pub fn id(self) -> NodeId {
        self.0
    }

    fn state(self, ui: &Ui) -> Option<&TextEditState> {
        match ui.node(self.0)?.widget() {
            Widget::TextEdit(state) => Some(state),
            _ => None,
        }
    }

    pub fn text(self, ui: &Ui) -> &str {
        self.state(ui).map_or("", |s| s.text.as_str())
    }

    /// Replace the contents without notifying subscribers.
    pub fn set_text(self, ui: &mut Ui, text: impl Into<String>) {
        if let Some(Widget::TextEdit(state)) = ui.widget_mut(self.0) {
            state.text = text.into();
            ui.invalidate(self.0);
        }
    }

    pub fn is_focused(self, ui: &Ui) -> bool {
        self.state(ui).is_some_and(|s| s.focused)
    }

    /// Current caret alpha (0..=255).
    pub fn caret_alpha(self, ui: &Ui) -> u8 {
        self.state(ui).map_or(0, |s| s.caret.alpha())
    }
}

/// Gaining focus takes the host's current Shift level, since Shift
/// edges seen while another node had focus never reached this field.
pub(crate) fn set_focused(ui: &mut Ui, id: NodeId, focused: bool) {
    let shift = focused && ui.shift_held;
    if let Some(Widget::TextEdit(state)) = ui.widget_mut(id) {
        state.focused = focused;
        state.shift = shift;
        state.caret.reset();
        ui.invalidate(id);
    }
}

/// Apply the frame's key edges in order. Fires one `TextChanged` if the
/// text ended up different.
pub(crate) fn apply_keys(ui: &mut Ui, id: NodeId, keys: &[KeyEdge]) {
    let Some(Widget::TextEdit(state)) = ui.widget_mut(id) else {
        return;
    };
    if !state.focused {
        return;
    }
    let mut changed = false;
    for edge in keys {
        match edge.key {
            Key::Shift => {
                if edge.state.pressed {
                    state.shift = true;
                } else if edge.state.released {
                    state.shift = false;
                }
            }
            _ if !edge.state.pressed => {}
            Key::Backspace => changed |= state.text.pop().is_some(),
            key => {
                if let Some(ch) = key.to_char(state.shift) {
                    state.text.push(ch);
                    changed = true;
                }
            }
        }
    }
    if !changed {
        return;
    }
    let text = state.text.clone();
    ui.invalidate(id);
    ui.emit::<TextChanged>(id, &text);
}

/// Portion of `text` drawn in a field `width` pixels wide.
///
/// Unfocused fields keep the head and drop what does not fit. Focused
/// fields keep the tail plus room for `margin` glyphs so the caret
/// stays visible after the last character.
pub(crate) fn visible_text<'a>(
    surface: &dyn Surface,
    text: &'a str,
    focused: bool,
    width: i32,
    scale: u32,
    margin: usize,
) -> &'a str {
    let fits = |s: &str, extra: usize| {
        let mut probe = String::with_capacity(s.len() + extra);
        probe.push_str(s);
        probe.extend(std::iter::repeat_n(MARGIN_GLYPH, extra));
        surface.measure_text(&probe, scale).width <= width
    };

    if focused {
        let mut view = text;
        while !view.is_empty() && !fits(view, margin) {
            let mut chars = view.chars();
            chars.next();
            view = chars.as_str();
        }
        view
    } else {
        let mut end = text.len();
        while end > 0 && !fits(&text[..end], 0) {
            end = text[..end]
                .char_indices()
                .next_back()
                .map_or(0, |(i, _)| i);
        }
        &text[..end]
    }
}

pub(crate) fn draw(
    state: &TextEditState,
    surface: &mut dyn Surface,
    client: Rect,
    style: &Style,
    config: &UiConfig,
) {
    let view = visible_text(
        surface,
        &state.text,
        state.focused,
        client.width,
        style.text_scale,
        config.caret_margin_chars,
    );
    let extent = surface.measure_text(view, style.text_scale);
    let x = client.x + style.align.horizontal.offset(client.width, extent.width);
    if !view.is_empty() {
        let y = client.y + style.align.vertical.offset(client.height, extent.height);
        surface.draw_text(Point::new(x, y), view, style.foreground, style.text_scale);
    }

    if state.focused {
        let line = surface.measure_text("W", style.text_scale).height;
        let y = client.y + style.align.vertical.offset(client.height, line);
        surface.fill_rect(
            Rect::new(x + extent.width, y, config.caret_width, line),
            style.foreground.with_alpha(state.caret.alpha()),
        );
    }
}
