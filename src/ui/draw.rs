use serde::Deserialize;

use crate::geometry::{Point, Rect, Size};

/// 8-bit RGBA color. Alpha 0 is fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

/// Convert a hex color (#RRGGBB) to an opaque color.
pub const fn hex(r: u8, g: u8, b: u8) -> Color {
    Color { r, g, b, a: 255 }
}

/// Convert a hex color with custom alpha.
pub const fn hex_a(r: u8, g: u8, b: u8, a: u8) -> Color {
    Color { r, g, b, a }
}

impl Color {
    pub const BLANK: Self = hex_a(0, 0, 0, 0);
    pub const BLACK: Self = hex(0x00, 0x00, 0x00);
    pub const WHITE: Self = hex(0xFF, 0xFF, 0xFF);
    pub const GREY: Self = hex(0xC0, 0xC0, 0xC0);
    pub const DARK_GREY: Self = hex(0x80, 0x80, 0x80);
    pub const VERY_DARK_GREY: Self = hex(0x40, 0x40, 0x40);
    pub const RED: Self = hex(0xFF, 0x00, 0x00);
    pub const DARK_BLUE: Self = hex(0x00, 0x00, 0x80);

    /// Same color with a replaced alpha channel.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Opaque handle to an image owned by the host (an offscreen render
/// target or an uploaded bitmap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

/// Drawing capability provided by the host.
///
/// All coordinates are in pixels of the *current render target*: the
/// screen when no target is set, otherwise the image passed to
/// [`Surface::set_target`]. Decouples widget logic from any concrete
/// renderer.
pub trait Surface {
    /// Size of the screen (the destination of the root render pass).
    fn screen_size(&self) -> Size;

    /// Allocate a transparent image usable as a render target.
    fn create_image(&mut self, size: Size) -> ImageHandle;

    /// Upload decoded pixels as a new image.
    fn upload_image(&mut self, pixels: &image::RgbaImage) -> ImageHandle;

    /// Free an image. Unknown handles are ignored.
    fn release_image(&mut self, image: ImageHandle);

    /// Pixel size of an image, if the handle is live.
    fn image_size(&self, image: ImageHandle) -> Option<Size>;

    /// Currently active render target (`None` = screen).
    fn target(&self) -> Option<ImageHandle>;

    /// Redirect subsequent drawing.
    fn set_target(&mut self, target: Option<ImageHandle>);

    /// Replace every pixel of the current target with `color`.
    fn clear(&mut self, color: Color);

    /// Alpha-blend a filled rectangle onto the current target.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Blit an image with its top-left at `pos`, optionally restricted to `clip`.
    fn draw_image(&mut self, image: ImageHandle, pos: Point, clip: Option<Rect>);

    /// Pixel extent of `text` rendered at `scale`.
    fn measure_text(&self, text: &str, scale: u32) -> Size;

    /// Draw `text` with its top-left at `pos`.
    fn draw_text(&mut self, pos: Point, text: &str, color: Color, scale: u32);
}
