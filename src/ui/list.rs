use super::events::{Selection, SelectionChanged};
use super::theme::{Alignment, BorderKind, Style, TextAlign, Theme};
use super::widget::Widget;
use super::{NodeId, Ui};
use crate::geometry::{Edges, Point, Rect};

/// Backing data and visible-row pool of a list box.
#[derive(Debug)]
pub struct ListState {
    pub(crate) items: Vec<String>,
    /// Index of the item shown in the first row.
    pub(crate) top: usize,
    pub(crate) selected: Option<usize>,
    pub(crate) item_height: i32,
    /// One child node per row that fits the client height.
    pub(crate) rows: Vec<NodeId>,
    pub(crate) item_theme: Theme,
    pub(crate) selected_theme: Theme,
    /// Rows past the end of the items.
    pub(crate) empty_theme: Theme,
}

/// Scrollable single-selection list of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListBox(pub NodeId);

impl ListBox {
    pub fn new(ui: &mut Ui, parent: NodeId, rect: Rect) -> Self {
        let palette = ui.config().palette;
        let item_height = ui.config().list_item_height;
        let backgrounds = ui.backgrounds();
        let row_align = TextAlign::new(Alignment::Near, Alignment::Center);
        let row_padding = Edges::new(0, 2, 0, 2);

        let frame = Theme::new(
            Style::new(backgrounds.field())
                .with_foreground(palette.text_dark)
                .with_border(BorderKind::Sunken)
                .with_padding(Edges::all(2)),
        );
        let state = ListState {
            items: Vec::new(),
            top: 0,
            selected: None,
            item_height,
            rows: Vec::new(),
            item_theme: Theme::new(
                Style::new(backgrounds.blank())
                    .with_foreground(palette.text_dark)
                    .with_align(row_align)
                    .with_padding(row_padding),
            ),
            selected_theme: Theme::new(
                Style::new(backgrounds.highlight())
                    .with_foreground(palette.foreground)
                    .with_align(row_align)
                    .with_padding(row_padding),
            ),
            empty_theme: Theme::new(Style::new(backgrounds.blank())),
        };

        let id = ui.create_with(Some(parent), rect, Some(frame));
        ui.set_widget(id, Widget::List(state));
        rebuild(ui, id);
        Self(id)
    }

    pub fn id(self) -> NodeId {
        self.0
    }

    fn state(self, ui: &Ui) -> Option<&ListState> {
        match ui.node(self.0)?.widget() {
            Widget::List(state) => Some(state),
            _ => None,
        }
    }

    fn state_mut(self, ui: &mut Ui) -> Option<&mut ListState> {
        match ui.widget_mut(self.0)? {
            Widget::List(state) => Some(state),
            _ => None,
        }
    }

    /// Replace the items. Scroll and selection reset; `SelectionChanged`
    /// fires with no selection.
    pub fn set_items<I, S>(self, ui: &mut Ui, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        destroy_rows(ui, self.0);
        let Some(state) = self.state_mut(ui) else {
            return;
        };
        state.items = items.into_iter().map(Into::into).collect();
        state.top = 0;
        state.selected = None;
        ui.emit::<SelectionChanged>(
            self.0,
            &Selection {
                index: None,
                text: String::new(),
            },
        );
        rebuild(ui, self.0);
    }

    pub fn items(self, ui: &Ui) -> &[String] {
        self.state(ui).map(|s| s.items.as_slice()).unwrap_or_default()
    }

    /// Select the first item equal to `text`, or nothing if none match.
    /// `SelectionChanged` fires even when the selection did not change.
    pub fn set_selection(self, ui: &mut Ui, text: &str) {
        let Some(state) = self.state_mut(ui) else {
            return;
        };
        state.selected = state.items.iter().position(|item| item == text);
        let selection = Selection {
            index: state.selected,
            text: if state.selected.is_some() {
                text.to_string()
            } else {
                String::new()
            },
        };
        log::trace!("list {:?} selection -> {:?}", self.0, selection.index);
        refresh(ui, self.0);
        ui.emit::<SelectionChanged>(self.0, &selection);
    }

    /// Text of the selected item, empty when nothing is selected.
    pub fn selection(self, ui: &Ui) -> &str {
        self.state(ui)
            .and_then(|s| s.items.get(s.selected?))
            .map_or("", String::as_str)
    }

    pub fn selected_index(self, ui: &Ui) -> Option<usize> {
        self.state(ui)?.selected
    }

    /// Move the first visible row by `delta` items, clamped to the items.
    pub fn scroll(self, ui: &mut Ui, delta: i32) {
        let Some(state) = self.state_mut(ui) else {
            return;
        };
        let last = state.items.len().saturating_sub(1) as i64;
        state.top = (state.top as i64 + i64::from(delta)).clamp(0, last) as usize;
        refresh(ui, self.0);
    }

    pub fn top_index(self, ui: &Ui) -> usize {
        self.state(ui).map_or(0, |s| s.top)
    }

    /// True for any live list. The top index is unsigned, so there is no
    /// state in which this reports false.
    pub fn can_scroll_up(self, ui: &Ui) -> bool {
        self.state(ui).is_some()
    }

    pub fn can_scroll_down(self, ui: &Ui) -> bool {
        self.state(ui)
            .is_some_and(|s| s.top + s.rows.len() < s.items.len())
    }

    /// Row nodes currently laid out, top to bottom.
    pub fn visible_rows(self, ui: &Ui) -> &[NodeId] {
        self.state(ui).map(|s| s.rows.as_slice()).unwrap_or_default()
    }

    pub fn set_item_height(self, ui: &mut Ui, height: i32) {
        if let Some(state) = self.state_mut(ui) {
            state.item_height = height.max(1);
        }
        rebuild(ui, self.0);
    }

    pub fn set_row_themes(self, ui: &mut Ui, item: &Theme, selected: &Theme, empty: &Theme) {
        if let Some(state) = self.state_mut(ui) {
            state.item_theme = item.clone();
            state.selected_theme = selected.clone();
            state.empty_theme = empty.clone();
        }
        refresh(ui, self.0);
    }
}

fn destroy_rows(ui: &mut Ui, id: NodeId) {
    let rows = match ui.widget_mut(id) {
        Some(Widget::List(state)) => std::mem::take(&mut state.rows),
        _ => return,
    };
    for row in rows {
        ui.destroy(row);
    }
}

/// Recreate the row pool for the current client height.
pub(crate) fn rebuild(ui: &mut Ui, id: NodeId) {
    destroy_rows(ui, id);
    let Some(node) = ui.node(id) else {
        return;
    };
    let Widget::List(state) = node.widget() else {
        return;
    };
    let item_height = state.item_height.max(1);
    let client = Rect::from_parts(Point::ZERO, node.size()).inset(node.style().padding);
    let count = (client.height / item_height).max(0);

    let rows: Vec<NodeId> = (0..count)
        .map(|slot| {
            let row = ui.create(
                id,
                Rect::new(client.x, client.y + slot * item_height, client.width, item_height),
            );
            ui.set_widget(row, Widget::ListItem);
            row
        })
        .collect();
    log::trace!("list {:?} rebuilt with {} rows", id, rows.len());

    if let Some(Widget::List(state)) = ui.widget_mut(id) {
        state.rows = rows;
    }
    refresh(ui, id);
}

/// Re-text and re-theme every row from the scroll offset and selection.
pub(crate) fn refresh(ui: &mut Ui, id: NodeId) {
    let Some(Widget::List(state)) = ui.node(id).map(|n| n.widget()) else {
        return;
    };
    let updates: Vec<(NodeId, String, Theme)> = state
        .rows
        .iter()
        .enumerate()
        .map(|(slot, &row)| {
            let index = state.top + slot;
            match state.items.get(index) {
                Some(text) if state.selected == Some(index) => {
                    (row, text.clone(), state.selected_theme.clone())
                }
                Some(text) => (row, text.clone(), state.item_theme.clone()),
                None => (row, String::new(), state.empty_theme.clone()),
            }
        })
        .collect();

    for (row, text, theme) in updates {
        ui.set_text(row, text);
        ui.update_theme(row, |t| *t = theme);
    }
}

/// A row was clicked: select by the row's displayed text.
pub(crate) fn on_item_click(ui: &mut Ui, item: NodeId) {
    let Some(list) = ui.parent(item) else {
        return;
    };
    let text = ui.text(item).to_string();
    ListBox(list).set_selection(ui, &text);
}
