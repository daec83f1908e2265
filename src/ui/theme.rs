use std::rc::Rc;

use serde::Deserialize;

use super::background::Background;
use super::draw::Color;
use crate::geometry::Edges;

/// Text placement along one axis of the client rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Alignment {
    Near,
    #[default]
    Center,
    Far,
}

impl Alignment {
    /// Offset of an item of length `content` inside a span of length `space`.
    pub fn offset(self, space: i32, content: i32) -> i32 {
        match self {
            Alignment::Near => 0,
            Alignment::Center => (space - content) / 2,
            Alignment::Far => space - content,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TextAlign {
    pub horizontal: Alignment,
    pub vertical: Alignment,
}

impl TextAlign {
    pub const fn new(horizontal: Alignment, vertical: Alignment) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Edge treatment drawn around a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum BorderKind {
    #[default]
    None,
    Raised,
    Sunken,
    Solid,
}

/// Interaction flags that select a style variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionState {
    pub enabled: bool,
    pub hovering: bool,
    pub active: bool,
}

impl InteractionState {
    pub const IDLE: Self = Self {
        enabled: true,
        hovering: false,
        active: false,
    };
}

/// Visual attributes of one interaction state.
///
/// Cloning copies every field by value except `background`, which stays
/// shared with the source style.
#[derive(Debug, Clone)]
pub struct Style {
    /// Not defined: resolution falls through to the next variant.
    pub empty: bool,
    pub foreground: Color,
    pub align: TextAlign,
    pub text_scale: u32,
    pub padding: Edges,
    pub background: Rc<dyn Background>,
    pub border: BorderKind,
}

impl Style {
    /// Concrete style with neutral defaults.
    pub fn new(background: Rc<dyn Background>) -> Self {
        Self {
            empty: false,
            foreground: Color::WHITE,
            align: TextAlign::default(),
            text_scale: 1,
            padding: Edges::ZERO,
            background,
            border: BorderKind::None,
        }
    }

    /// Copy of `self` flagged as undefined.
    pub fn to_empty(&self) -> Self {
        Self {
            empty: true,
            ..self.clone()
        }
    }

    pub fn with_background(mut self, background: Rc<dyn Background>) -> Self {
        self.background = background;
        self
    }

    pub fn with_foreground(mut self, color: Color) -> Self {
        self.foreground = color;
        self
    }

    pub fn with_border(mut self, border: BorderKind) -> Self {
        self.border = border;
        self
    }

    pub fn with_padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.text_scale = scale;
        self
    }
}

/// The four style variants of a node.
#[derive(Debug, Clone)]
pub struct Theme {
    pub disabled: Style,
    pub default: Style,
    pub hover: Style,
    pub active: Style,
}

impl Theme {
    /// Theme whose only concrete variant is `default`.
    pub fn new(default: Style) -> Self {
        let undefined = default.to_empty();
        Self {
            disabled: undefined.clone(),
            hover: undefined.clone(),
            active: undefined,
            default: Style {
                empty: false,
                ..default
            },
        }
    }

    pub fn with_hover(mut self, hover: Style) -> Self {
        self.hover = hover;
        self
    }

    pub fn with_active(mut self, active: Style) -> Self {
        self.active = active;
        self
    }

    pub fn with_disabled(mut self, disabled: Style) -> Self {
        self.disabled = disabled;
        self
    }

    /// Pick the style for an interaction state. Pure: never mutates.
    ///
    /// Disabled beats Active beats Hover; an empty variant falls through
    /// and Default always answers.
    pub fn resolve(&self, state: InteractionState) -> &Style {
        if !state.enabled && !self.disabled.empty {
            &self.disabled
        } else if state.active && !self.active.empty {
            &self.active
        } else if state.hovering && !self.hover.empty {
            &self.hover
        } else {
            &self.default
        }
    }
}
