use super::draw::Color;
use super::widget::Widget;
use super::{NodeId, Ui};
use crate::geometry::Rect;

/// Default pulse speed, in alpha units per second.
pub const DEFAULT_PACE: f32 = 300.0;

/// Alpha oscillator: moves linearly between 0 and 255 at `pace` units
/// per second and reverses direction at each bound.
///
/// Drives the text caret and the `Flasher` widget. Advanced by frame
/// delta time, not wall clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    alpha: f32,
    rising: bool,
    pace: f32,
}

impl Pulse {
    pub fn new(pace: f32) -> Self {
        Self {
            alpha: 0.0,
            rising: true,
            pace: pace.max(0.0),
        }
    }

    pub fn pace(&self) -> f32 {
        self.pace
    }

    /// Current alpha, 0..=255.
    pub fn alpha(&self) -> u8 {
        self.alpha.round().clamp(0.0, 255.0) as u8
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }

    /// Restart from transparent, rising.
    pub fn reset(&mut self) {
        self.alpha = 0.0;
        self.rising = true;
    }

    pub fn advance(&mut self, dt: f32) {
        let step = self.pace * dt.max(0.0);
        if self.rising {
            self.alpha += step;
            if self.alpha > 255.0 {
                self.alpha = 255.0;
                self.rising = false;
            }
        } else {
            self.alpha -= step;
            if self.alpha < 0.0 {
                self.alpha = 0.0;
                self.rising = true;
            }
        }
    }
}

impl Default for Pulse {
    fn default() -> Self {
        Self::new(DEFAULT_PACE)
    }
}

/// A node whose color fades in and out continuously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flasher(pub NodeId);

impl Flasher {
    pub fn new(ui: &mut Ui, parent: NodeId, rect: Rect, color: Color, pace: f32) -> Self {
        let id = ui.create(parent, rect);
        ui.set_widget(
            id,
            Widget::Flasher {
                pulse: Pulse::new(pace),
                color,
            },
        );
        Self(id)
    }

    pub fn id(self) -> NodeId {
        self.0
    }

    pub fn alpha(self, ui: &Ui) -> Option<u8> {
        match ui.node(self.0)?.widget() {
            Widget::Flasher { pulse, .. } => Some(pulse.alpha()),
            _ => None,
        }
    }

    pub fn set_color(self, ui: &mut Ui, new_color: Color) {
        if let Some(Widget::Flasher { color, .. }) = ui.widget_mut(self.0) {
            *color = new_color;
            ui.invalidate(self.0);
        }
    }
}
