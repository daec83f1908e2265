use super::draw::{Color, Surface};
use super::node::Node;
use super::theme::{BorderKind, Style};
use super::{ChildSnapshot, NodeId, Ui};
use crate::config::{Palette, UiConfig};
use crate::geometry::{Point, Rect};

impl Ui {
    /// Draw the whole tree onto the host's screen.
    ///
    /// Each visible node is drawn from its offscreen cache, rebuilt only
    /// when invalidated or when its interaction state changed since the
    /// last build. Nodes outside the inherited clip are skipped without
    /// touching their cache. The screen is cleared first so nothing from
    /// the previous frame survives.
    pub fn render(&mut self, surface: &mut dyn Surface, dt: f32) {
        for image in self.released.drain(..) {
            surface.release_image(image);
        }
        surface.set_target(None);
        surface.clear(Color::BLANK);
        let size = surface.screen_size();
        let clip = Rect::new(0, 0, size.width, size.height);
        self.render_node(self.root(), surface, Point::ZERO, clip, dt);
    }

    fn render_node(
        &mut self,
        id: NodeId,
        surface: &mut dyn Surface,
        origin: Point,
        clip: Rect,
        dt: f32,
    ) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let screen = node.rect.translate(origin);
        let visible = screen.intersect(&clip);
        if screen.is_empty() || visible.is_empty() {
            return;
        }

        self.refresh_cache(id, surface, dt);

        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if let Some(image) = node.cache {
            surface.draw_image(image, screen.position(), Some(visible));
        }

        let child_clip = screen.inset(node.style().padding).intersect(&clip);
        let children: ChildSnapshot = node.children.iter().copied().collect();
        for child in children {
            self.render_node(child, surface, screen.position(), child_clip, dt);
        }
    }

    fn refresh_cache(&mut self, id: NodeId, surface: &mut dyn Surface, dt: f32) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let state = node.interaction_state();
        if node.cache_valid && node.cache.is_some() && node.drawn_state == Some(state) {
            return;
        }

        let size = node.rect.size();
        let image = match node.cache {
            Some(image) if surface.image_size(image) == Some(size) => image,
            Some(stale) => {
                surface.release_image(stale);
                surface.create_image(size)
            }
            None => surface.create_image(size),
        };
        node.cache = Some(image);

        let previous = surface.target();
        surface.set_target(Some(image));
        surface.clear(Color::BLANK);
        paint(node, surface, &self.config, dt);
        surface.set_target(previous);

        node.cache_valid = true;
        node.drawn_state = Some(state);
    }
}

/// Draw one node into its cache image in local coordinates:
/// background, border, widget content, custom hook, then text.
fn paint(node: &Node, surface: &mut dyn Surface, config: &UiConfig, dt: f32) {
    let local = Rect::from_parts(Point::ZERO, node.rect.size());
    let style = node.style();

    style.background.render(surface, local, dt);
    draw_border(surface, local, style, &config.palette);

    let client = local.inset(style.padding);
    node.widget.draw(surface, client, style, config);

    if let Some(hook) = &node.hook {
        hook(surface, local, style);
    }

    if !node.text.is_empty() {
        draw_text_aligned(surface, client, &node.text, style);
    }
}

/// 1px edge treatment around `area`.
pub(crate) fn draw_border(surface: &mut dyn Surface, area: Rect, style: &Style, palette: &Palette) {
    let (upper, lower) = match style.border {
        BorderKind::None => return,
        BorderKind::Raised => (palette.border_light, palette.border_dark),
        BorderKind::Sunken => (palette.border_dark, palette.border_light),
        BorderKind::Solid => (style.foreground, style.foreground),
    };
    if area.is_empty() {
        return;
    }
    surface.fill_rect(Rect::new(area.x, area.y, area.width, 1), upper);
    surface.fill_rect(Rect::new(area.x, area.y, 1, area.height), upper);
    surface.fill_rect(Rect::new(area.x, area.bottom() - 1, area.width, 1), lower);
    surface.fill_rect(Rect::new(area.right() - 1, area.y, 1, area.height), lower);
}

/// Draw `text` inside `area` using the style's alignment, color and scale.
pub(crate) fn draw_text_aligned(surface: &mut dyn Surface, area: Rect, text: &str, style: &Style) {
    let extent = surface.measure_text(text, style.text_scale);
    let pos = Point::new(
        area.x + style.align.horizontal.offset(area.width, extent.width),
        area.y + style.align.vertical.offset(area.height, extent.height),
    );
    surface.draw_text(pos, text, style.foreground, style.text_scale);
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::geometry::{Edges, Size};
    use crate::ui::background::SolidBackground;
    use crate::ui::raster::RasterSurface;
    use crate::ui::theme::Theme;

    fn solid(color: Color) -> Theme {
        Theme::new(Style::new(Rc::new(SolidBackground::new(color))))
    }

    #[test]
    fn draws_background_at_screen_position() {
        let mut surface = RasterSurface::new(100, 100);
        let mut ui = Ui::new(Size::new(100, 100));
        let panel = ui.create(ui.root(), Rect::new(10, 10, 30, 30));
        ui.set_theme(panel, &solid(Color::RED));

        ui.render(&mut surface, 0.0);

        assert_eq!(surface.pixel(15, 15), Some(Color::RED));
        assert_eq!(surface.pixel(5, 5), Some(Color::BLANK));
        assert_eq!(surface.pixel(40, 40), Some(Color::BLANK));
    }

    #[test]
    fn moved_and_hidden_nodes_leave_no_trail() {
        let mut surface = RasterSurface::new(100, 100);
        let mut ui = Ui::new(Size::new(100, 100));
        let panel = ui.create(ui.root(), Rect::new(0, 0, 20, 20));
        ui.set_theme(panel, &solid(Color::RED));
        ui.render(&mut surface, 0.0);
        assert_eq!(surface.pixel(5, 5), Some(Color::RED));

        ui.set_position(panel, Point::new(50, 50));
        ui.render(&mut surface, 0.0);
        assert_eq!(surface.pixel(5, 5), Some(Color::BLANK));
        assert_eq!(surface.pixel(55, 55), Some(Color::RED));

        ui.set_visible(panel, false);
        ui.render(&mut surface, 0.0);
        assert_eq!(surface.pixel(55, 55), Some(Color::BLANK));
    }

    #[test]
    fn valid_cache_is_reused() {
        let mut surface = RasterSurface::new(100, 100);
        let mut ui = Ui::new(Size::new(100, 100));
        let panel = ui.create(ui.root(), Rect::new(0, 0, 30, 30));
        ui.set_theme(panel, &solid(Color::RED));

        ui.render(&mut surface, 0.0);
        let fills = surface.stats.fills;
        let created = surface.stats.images_created;

        ui.render(&mut surface, 0.0);
        assert_eq!(surface.stats.fills, fills);
        assert_eq!(surface.stats.images_created, created);

        ui.set_text(panel, "x");
        ui.render(&mut surface, 0.0);
        assert!(surface.stats.fills > fills);
        assert_eq!(surface.stats.images_created, created);
    }

    #[test]
    fn interaction_change_rebuilds_cache() {
        let mut surface = RasterSurface::new(100, 100);
        let mut ui = Ui::new(Size::new(100, 100));
        let button = ui.create(ui.root(), Rect::new(0, 0, 30, 30));
        let theme = solid(Color::RED)
            .with_hover(Style::new(Rc::new(SolidBackground::new(Color::WHITE))));
        ui.set_theme(button, &theme);

        ui.render(&mut surface, 0.0);
        assert_eq!(surface.pixel(5, 5), Some(Color::RED));

        ui.hit_test(Point::new(5, 5));
        ui.render(&mut surface, 0.0);
        assert_eq!(surface.pixel(5, 5), Some(Color::WHITE));
    }

    #[test]
    fn resize_recreates_cache_image() {
        let mut surface = RasterSurface::new(100, 100);
        let mut ui = Ui::new(Size::new(100, 100));
        let panel = ui.create(ui.root(), Rect::new(0, 0, 30, 30));
        ui.render(&mut surface, 0.0);
        let live = surface.live_images();

        ui.set_size(panel, Size::new(40, 40));
        ui.render(&mut surface, 0.0);

        assert_eq!(surface.live_images(), live);
        assert_eq!(surface.stats.images_released, 1);
        let cache = ui.node(panel).and_then(|n| n.cache).expect("cached");
        assert_eq!(surface.image_size(cache), Some(Size::new(40, 40)));
    }

    #[test]
    fn culled_nodes_keep_invalid_cache() {
        let mut surface = RasterSurface::new(100, 100);
        let mut ui = Ui::new(Size::new(100, 100));
        let offscreen = ui.create(ui.root(), Rect::new(200, 200, 10, 10));
        let hidden = ui.create(ui.root(), Rect::new(0, 0, 10, 10));
        ui.set_visible(hidden, false);

        ui.render(&mut surface, 0.0);

        assert!(!ui.node(offscreen).expect("live").is_cache_valid());
        assert!(!ui.node(hidden).expect("live").is_cache_valid());
        // Only the root got an image.
        assert_eq!(surface.live_images(), 1);
    }

    #[test]
    fn children_are_clipped_to_parent_client_rect() {
        let mut surface = RasterSurface::new(100, 100);
        let mut ui = Ui::new(Size::new(100, 100));
        let panel = ui.create(ui.root(), Rect::new(10, 10, 40, 40));
        ui.set_theme(
            panel,
            &Theme::new(Style::new(ui.backgrounds().blank()).with_padding(Edges::all(5))),
        );
        let child = ui.create(panel, Rect::new(0, 0, 100, 100));
        ui.set_theme(child, &solid(Color::RED));

        ui.render(&mut surface, 0.0);

        // Panel padding area stays empty; client area gets the child.
        assert_eq!(surface.pixel(12, 12), Some(Color::BLANK));
        assert_eq!(surface.pixel(20, 20), Some(Color::RED));
        assert_eq!(surface.pixel(46, 46), Some(Color::BLANK));
        assert_eq!(surface.pixel(60, 60), Some(Color::BLANK));
    }

    #[test]
    fn frontmost_child_draws_last() {
        let mut surface = RasterSurface::new(100, 100);
        let mut ui = Ui::new(Size::new(100, 100));
        let back = ui.create(ui.root(), Rect::new(0, 0, 50, 50));
        let front = ui.create(ui.root(), Rect::new(25, 25, 50, 50));
        ui.set_theme(back, &solid(Color::RED));
        ui.set_theme(front, &solid(Color::WHITE));

        ui.render(&mut surface, 0.0);
        assert_eq!(surface.pixel(30, 30), Some(Color::WHITE));

        ui.pop_to_top(back);
        ui.render(&mut surface, 0.0);
        assert_eq!(surface.pixel(30, 30), Some(Color::RED));
    }

    #[test]
    fn draw_hook_runs_between_background_and_text() {
        let mut surface = RasterSurface::new(100, 100);
        let mut ui = Ui::new(Size::new(100, 100));
        let node = ui.create(ui.root(), Rect::new(0, 0, 20, 20));
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        ui.set_draw_hook(
            node,
            Some(Rc::new(move |surface: &mut dyn Surface, area: Rect, _: &Style| {
                c.set(c.get() + 1);
                surface.fill_rect(Rect::new(0, 0, area.width, 2), Color::RED);
            })),
        );

        ui.render(&mut surface, 0.0);
        ui.render(&mut surface, 0.0);

        assert_eq!(calls.get(), 1);
        assert_eq!(surface.pixel(10, 1), Some(Color::RED));
    }

    #[test]
    fn destroyed_cache_is_released_next_frame() {
        let mut surface = RasterSurface::new(100, 100);
        let mut ui = Ui::new(Size::new(100, 100));
        let panel = ui.create(ui.root(), Rect::new(0, 0, 20, 20));
        ui.create(panel, Rect::new(0, 0, 5, 5));
        ui.render(&mut surface, 0.0);
        assert_eq!(surface.live_images(), 3);

        ui.destroy(panel);
        ui.render(&mut surface, 0.0);
        assert_eq!(surface.live_images(), 1);
    }

    #[test]
    fn raised_border_uses_palette() {
        let mut surface = RasterSurface::new(50, 50);
        let mut ui = Ui::new(Size::new(50, 50));
        let node = ui.create(ui.root(), Rect::new(0, 0, 10, 10));
        ui.update_theme(node, |t| t.default.border = BorderKind::Raised);

        ui.render(&mut surface, 0.0);

        let palette = Palette::default();
        assert_eq!(surface.pixel(0, 5), Some(palette.border_light));
        assert_eq!(surface.pixel(9, 5), Some(palette.border_dark));
        assert_eq!(surface.pixel(5, 9), Some(palette.border_dark));
    }

    #[test]
    fn centered_text_lands_mid_client() {
        let mut surface = RasterSurface::new(64, 64);
        let mut ui = Ui::new(Size::new(64, 64));
        let label = ui.create(ui.root(), Rect::new(0, 0, 64, 16));
        ui.set_text(label, "ab");
        ui.render(&mut surface, 0.0);
        // 16px of glyphs centered in 64px: x 24..40, y 4..12, glyph inset 1px.
        assert_eq!(surface.pixel(26, 8), Some(Color::WHITE));
        assert_eq!(surface.pixel(10, 8), Some(Color::BLANK));
    }
}
