use std::fmt;
use std::rc::Rc;

use super::draw::{Color, ImageHandle, Surface};
use crate::error::UiError;
use crate::geometry::{Point, Rect, Size};

/// Fill behavior invoked with the area a node's background covers.
///
/// Strategies are immutable once built and shared between styles by
/// reference counting.
pub trait Background: fmt::Debug {
    fn render(&self, surface: &mut dyn Surface, area: Rect, dt: f32);
}

/// Draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankBackground;

impl Background for BlankBackground {
    fn render(&self, _surface: &mut dyn Surface, _area: Rect, _dt: f32) {}
}

/// Fills the whole area with one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidBackground {
    pub color: Color,
}

impl SolidBackground {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Background for SolidBackground {
    fn render(&self, surface: &mut dyn Surface, area: Rect, _dt: f32) {
        surface.fill_rect(area, self.color);
    }
}

/// Blits one image at the area origin, cropped to the area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBackground {
    pub image: ImageHandle,
}

impl ImageBackground {
    pub fn new(image: ImageHandle) -> Self {
        Self { image }
    }

    /// Decode an image file and upload it to the host.
    pub fn load(surface: &mut dyn Surface, path: &str) -> Result<Self, UiError> {
        let pixels = decode(path)?;
        Ok(Self::new(surface.upload_image(&pixels)))
    }
}

impl Background for ImageBackground {
    fn render(&self, surface: &mut dyn Surface, area: Rect, _dt: f32) {
        surface.draw_image(self.image, area.position(), Some(area));
    }
}

/// Repeats an image across the area, starting at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiledBackground {
    pub image: ImageHandle,
    pub tile: Size,
}

impl TiledBackground {
    pub fn new(image: ImageHandle, tile: Size) -> Self {
        Self { image, tile }
    }

    pub fn load(surface: &mut dyn Surface, path: &str) -> Result<Self, UiError> {
        let pixels = decode(path)?;
        let tile = Size::new(pixels.width() as i32, pixels.height() as i32);
        Ok(Self::new(surface.upload_image(&pixels), tile))
    }
}

impl Background for TiledBackground {
    fn render(&self, surface: &mut dyn Surface, area: Rect, _dt: f32) {
        if self.tile.is_empty() {
            return;
        }
        let mut y = area.y;
        while y < area.bottom() {
            let mut x = area.x;
            while x < area.right() {
                surface.draw_image(self.image, Point::new(x, y), Some(area));
                x += self.tile.width;
            }
            y += self.tile.height;
        }
    }
}

fn decode(path: &str) -> Result<image::RgbaImage, UiError> {
    match image::open(path) {
        Ok(img) => Ok(img.to_rgba8()),
        Err(source) => {
            log::warn!("failed to decode background image {}: {}", path, source);
            Err(UiError::Image {
                path: path.to_string(),
                source,
            })
        }
    }
}

/// Shared default background instances.
///
/// Built once when the owning [`Ui`](super::Ui) is created and never
/// mutated afterwards; styles hold clones of these references.
#[derive(Debug, Clone)]
pub struct Backgrounds {
    blank: Rc<dyn Background>,
    panel: Rc<dyn Background>,
    field: Rc<dyn Background>,
    highlight: Rc<dyn Background>,
}

impl Backgrounds {
    pub fn new() -> Self {
        Self {
            blank: Rc::new(BlankBackground),
            panel: Rc::new(SolidBackground::new(Color::GREY)),
            field: Rc::new(SolidBackground::new(Color::WHITE)),
            highlight: Rc::new(SolidBackground::new(Color::DARK_BLUE)),
        }
    }

    /// Draws nothing. The default for plain nodes.
    pub fn blank(&self) -> Rc<dyn Background> {
        Rc::clone(&self.blank)
    }

    /// Neutral grey used by buttons, tracks and handles.
    pub fn panel(&self) -> Rc<dyn Background> {
        Rc::clone(&self.panel)
    }

    /// White input-field fill.
    pub fn field(&self) -> Rc<dyn Background> {
        Rc::clone(&self.field)
    }

    /// Selection highlight.
    pub fn highlight(&self) -> Rc<dyn Background> {
        Rc::clone(&self.highlight)
    }
}

impl Default for Backgrounds {
    fn default() -> Self {
        Self::new()
    }
}
