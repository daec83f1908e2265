use std::rc::Rc;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::UiError;
use crate::geometry::Edges;
use crate::ui::animation::DEFAULT_PACE;
use crate::ui::background::{
    Background, Backgrounds, ImageBackground, SolidBackground, TiledBackground,
};
use crate::ui::draw::{Color, Surface, hex};
use crate::ui::theme::{BorderKind, Style, TextAlign, Theme};

/// Colors the toolkit uses when no theme says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Default text color on dark backgrounds.
    pub foreground: Color,
    /// Text color on light field/list backgrounds.
    pub text_dark: Color,
    /// Upper-left edge of a raised border.
    pub border_light: Color,
    /// Lower-right edge of a raised border.
    pub border_dark: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: Color::WHITE,
            text_dark: Color::BLACK,
            border_light: hex(0xF0, 0xF0, 0xF0),
            border_dark: Color::VERY_DARK_GREY,
        }
    }
}

/// Tunables for the widget set. Loaded once at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Caret blink speed in alpha units per second.
    pub caret_pace: f32,
    /// Caret bar width in pixels.
    pub caret_width: i32,
    /// Characters of headroom kept right of the caret while editing.
    pub caret_margin_chars: usize,
    /// Height of one list row in pixels.
    pub list_item_height: i32,
    /// Slider handle extent along the track in pixels.
    pub slider_handle_length: i32,
    /// Subscriber failures kept for inspection.
    pub failure_log_capacity: usize,
    pub palette: Palette,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            caret_pace: DEFAULT_PACE,
            caret_width: 2,
            caret_margin_chars: 2,
            list_item_height: 12,
            slider_handle_length: 10,
            failure_log_capacity: 256,
            palette: Palette::default(),
        }
    }
}

fn read_ron<T: DeserializeOwned>(path: &str) -> Result<T, UiError> {
    let content = std::fs::read_to_string(path).map_err(|source| UiError::Io {
        path: path.to_string(),
        source,
    })?;
    ron::from_str::<T>(&content).map_err(|source| UiError::Config {
        path: path.to_string(),
        source,
    })
}

/// Load the UI config from a RON file, reporting failures.
pub fn try_load_ui_config(path: &str) -> Result<UiConfig, UiError> {
    read_ron(path)
}

/// Load the UI config from a RON file. Logs a warning and returns the
/// defaults on failure.
pub fn load_ui_config(path: &str) -> UiConfig {
    match try_load_ui_config(path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}, using default config", e);
            UiConfig::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Theme files
// ---------------------------------------------------------------------------

/// Serialized form of a background strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub enum BackgroundSpec {
    #[default]
    Blank,
    Solid(Color),
    /// Image file blitted at the node origin.
    Image(String),
    /// Image file repeated across the node.
    Tiled(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    pub foreground: Color,
    pub align: TextAlign,
    pub text_scale: u32,
    pub padding: Edges,
    pub background: BackgroundSpec,
    pub border: BorderKind,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            foreground: Color::WHITE,
            align: TextAlign::default(),
            text_scale: 1,
            padding: Edges::ZERO,
            background: BackgroundSpec::Blank,
            border: BorderKind::None,
        }
    }
}

/// Serialized theme. Variants left out stay undefined.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThemeSpec {
    pub default: StyleSpec,
    #[serde(default)]
    pub hover: Option<StyleSpec>,
    #[serde(default)]
    pub active: Option<StyleSpec>,
    #[serde(default)]
    pub disabled: Option<StyleSpec>,
}

impl ThemeSpec {
    pub fn from_ron(source: &str) -> Result<Self, UiError> {
        ron::from_str(source).map_err(|source| UiError::Config {
            path: "<inline>".to_string(),
            source,
        })
    }

    /// Resolve backgrounds (uploading image files to the host) and
    /// assemble the theme.
    pub fn build(
        &self,
        surface: &mut dyn Surface,
        backgrounds: &Backgrounds,
    ) -> Result<Theme, UiError> {
        let default = self.default.build(surface, backgrounds)?;
        let mut theme = Theme::new(default);
        if let Some(spec) = &self.hover {
            theme.hover = spec.build(surface, backgrounds)?;
        }
        if let Some(spec) = &self.active {
            theme.active = spec.build(surface, backgrounds)?;
        }
        if let Some(spec) = &self.disabled {
            theme.disabled = spec.build(surface, backgrounds)?;
        }
        Ok(theme)
    }
}

impl StyleSpec {
    fn build(&self, surface: &mut dyn Surface, backgrounds: &Backgrounds) -> Result<Style, UiError> {
        let background: Rc<dyn Background> = match &self.background {
            BackgroundSpec::Blank => backgrounds.blank(),
            BackgroundSpec::Solid(color) => Rc::new(SolidBackground::new(*color)),
            BackgroundSpec::Image(path) => Rc::new(ImageBackground::load(surface, path)?),
            BackgroundSpec::Tiled(path) => Rc::new(TiledBackground::load(surface, path)?),
        };
        Ok(Style::new(background)
            .with_foreground(self.foreground)
            .with_align(self.align)
            .with_scale(self.text_scale)
            .with_padding(self.padding)
            .with_border(self.border))
    }
}

/// Load and build a theme from a RON file.
pub fn load_theme(
    path: &str,
    surface: &mut dyn Surface,
    backgrounds: &Backgrounds,
) -> Result<Theme, UiError> {
    let spec: ThemeSpec = read_ron(path)?;
    spec.build(surface, backgrounds)
}
