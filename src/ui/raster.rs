use std::collections::HashMap;

use image::{Rgba, RgbaImage};

use super::draw::{Color, ImageHandle, Surface};
use crate::geometry::{Point, Rect, Size};

/// Width and height of one glyph cell at scale 1.
pub const GLYPH_SIZE: i32 = 8;

/// Per-surface draw counters, used to verify cache discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub fills: usize,
    pub blits: usize,
    pub texts: usize,
    pub images_created: usize,
    pub images_released: usize,
}

/// Software host surface backed by `image::RgbaImage` buffers.
///
/// Text is rendered as solid glyph boxes on a fixed 8px grid so output
/// is deterministic without a font rasterizer.
pub struct RasterSurface {
    screen: RgbaImage,
    images: HashMap<u32, RgbaImage>,
    next_id: u32,
    target: Option<ImageHandle>,
    pub stats: SurfaceStats,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            screen: RgbaImage::new(width, height),
            images: HashMap::new(),
            next_id: 1,
            target: None,
            stats: SurfaceStats::default(),
        }
    }

    /// Read back a screen pixel.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        read_pixel(&self.screen, x, y)
    }

    /// Read back a pixel of an offscreen image.
    pub fn image_pixel(&self, image: ImageHandle, x: i32, y: i32) -> Option<Color> {
        read_pixel(self.images.get(&image.0)?, x, y)
    }

    /// Number of live offscreen images.
    pub fn live_images(&self) -> usize {
        self.images.len()
    }

    pub fn screen(&self) -> &RgbaImage {
        &self.screen
    }

    fn current(&mut self) -> Option<&mut RgbaImage> {
        match self.target {
            None => Some(&mut self.screen),
            Some(h) => self.images.get_mut(&h.0),
        }
    }

    fn alloc(&mut self, img: RgbaImage) -> ImageHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.images.insert(id, img);
        self.stats.images_created += 1;
        ImageHandle(id)
    }
}

fn read_pixel(img: &RgbaImage, x: i32, y: i32) -> Option<Color> {
    if x < 0 || y < 0 || x as u32 >= img.width() || y as u32 >= img.height() {
        return None;
    }
    let Rgba([r, g, b, a]) = *img.get_pixel(x as u32, y as u32);
    Some(Color { r, g, b, a })
}

fn bounds_of(img: &RgbaImage) -> Rect {
    Rect::new(0, 0, img.width() as i32, img.height() as i32)
}

/// Source-over blend of `src` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: Color) {
    let sa = src.a as u32;
    if sa == 0 {
        return;
    }
    if sa == 255 {
        *dst = Rgba([src.r, src.g, src.b, 255]);
        return;
    }
    let inv = 255 - sa;
    let Rgba([dr, dg, db, da]) = *dst;
    let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * inv) / 255) as u8;
    let out_a = (sa + da as u32 * inv / 255).min(255) as u8;
    *dst = Rgba([mix(src.r, dr), mix(src.g, dg), mix(src.b, db), out_a]);
}

impl Surface for RasterSurface {
    fn screen_size(&self) -> Size {
        Size::new(self.screen.width() as i32, self.screen.height() as i32)
    }

    fn create_image(&mut self, size: Size) -> ImageHandle {
        let w = size.width.max(0) as u32;
        let h = size.height.max(0) as u32;
        self.alloc(RgbaImage::new(w, h))
    }

    fn upload_image(&mut self, pixels: &RgbaImage) -> ImageHandle {
        self.alloc(pixels.clone())
    }

    fn release_image(&mut self, image: ImageHandle) {
        if self.images.remove(&image.0).is_some() {
            self.stats.images_released += 1;
        }
        if self.target == Some(image) {
            self.target = None;
        }
    }

    fn image_size(&self, image: ImageHandle) -> Option<Size> {
        self.images
            .get(&image.0)
            .map(|img| Size::new(img.width() as i32, img.height() as i32))
    }

    fn target(&self) -> Option<ImageHandle> {
        self.target
    }

    fn set_target(&mut self, target: Option<ImageHandle>) {
        self.target = target;
    }

    fn clear(&mut self, color: Color) {
        if let Some(img) = self.current() {
            for px in img.pixels_mut() {
                *px = Rgba([color.r, color.g, color.b, color.a]);
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.stats.fills += 1;
        let Some(img) = self.current() else {
            return;
        };
        let area = rect.intersect(&bounds_of(img));
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                blend(img.get_pixel_mut(x as u32, y as u32), color);
            }
        }
    }

    fn draw_image(&mut self, image: ImageHandle, pos: Point, clip: Option<Rect>) {
        self.stats.blits += 1;
        // Detach the source so the destination can be borrowed mutably.
        let Some(src) = self.images.remove(&image.0) else {
            return;
        };
        if let Some(dst) = self.current() {
            let mut area = Rect::from_parts(pos, Size::new(src.width() as i32, src.height() as i32))
                .intersect(&bounds_of(dst));
            if let Some(clip) = clip {
                area = area.intersect(&clip);
            }
            for y in area.y..area.bottom() {
                for x in area.x..area.right() {
                    let Rgba([r, g, b, a]) = *src.get_pixel((x - pos.x) as u32, (y - pos.y) as u32);
                    blend(dst.get_pixel_mut(x as u32, y as u32), Color { r, g, b, a });
                }
            }
        }
        self.images.insert(image.0, src);
    }

    fn measure_text(&self, text: &str, scale: u32) -> Size {
        let s = scale.max(1) as i32;
        let chars = text.chars().count() as i32;
        let height = if chars == 0 { 0 } else { GLYPH_SIZE * s };
        Size::new(chars * GLYPH_SIZE * s, height)
    }

    fn draw_text(&mut self, pos: Point, text: &str, color: Color, scale: u32) {
        self.stats.texts += 1;
        let s = scale.max(1) as i32;
        let cell = GLYPH_SIZE * s;
        for (i, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let glyph = Rect::new(pos.x + i as i32 * cell + s, pos.y + s, cell - 2 * s, cell - 2 * s);
            if let Some(img) = self.current() {
                let area = glyph.intersect(&bounds_of(img));
                for y in area.y..area.bottom() {
                    for x in area.x..area.right() {
                        blend(img.get_pixel_mut(x as u32, y as u32), color);
                    }
                }
            }
        }
    }
}
