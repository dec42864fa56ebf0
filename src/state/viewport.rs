// Map viewport: zoom factor plus raw pixel pan over the normalized surface.
use crate::model::{NormPoint, ScreenPoint, ScreenRect};

pub const ZOOM_MIN: f64 = 0.5;
pub const ZOOM_MAX: f64 = 5.0;
pub const WHEEL_ZOOM_STEP: f64 = 0.1;
pub const BUTTON_ZOOM_STEP: f64 = 0.3;
pub const PAN_STEP_PX: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Forward transform: `screen = rect.origin + pan + normalized / 100 * rect.size * zoom`.
/// The surface scales around its top-left corner, so the same formula serves
/// the canvas, the marker layer and pointer hit-testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn to_normalized(&self, screen: ScreenPoint, rect: ScreenRect) -> NormPoint {
        NormPoint {
            x: (screen.x - rect.left - self.pan_x) / (rect.width * self.zoom) * 100.0,
            y: (screen.y - rect.top - self.pan_y) / (rect.height * self.zoom) * 100.0,
        }
    }

    pub fn to_screen(&self, p: NormPoint, rect: ScreenRect) -> ScreenPoint {
        let (lx, ly) = self.to_local(p, rect.width, rect.height);
        ScreenPoint::new(rect.left + lx, rect.top + ly)
    }

    fn to_local(&self, p: NormPoint, width: f64, height: f64) -> (f64, f64) {
        (
            p.x / 100.0 * width * self.zoom + self.pan_x,
            p.y / 100.0 * height * self.zoom + self.pan_y,
        )
    }

    fn set_zoom(&mut self, zoom: f64) -> bool {
        let z = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        if (z - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = z;
        true
    }

    /// One wheel notch. Negative delta (scroll up) zooms in; a zero delta is ignored.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if delta_y > 0.0 {
            self.set_zoom(self.zoom - WHEEL_ZOOM_STEP)
        } else if delta_y < 0.0 {
            self.set_zoom(self.zoom + WHEEL_ZOOM_STEP)
        } else {
            false
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom + BUTTON_ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom - BUTTON_ZOOM_STEP)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Buttons move the view, so content shifts the opposite way.
    pub fn pan_step(&mut self, dir: PanDirection) {
        match dir {
            PanDirection::Left => self.pan_x += PAN_STEP_PX,
            PanDirection::Right => self.pan_x -= PAN_STEP_PX,
            PanDirection::Up => self.pan_y += PAN_STEP_PX,
            PanDirection::Down => self.pan_y -= PAN_STEP_PX,
        }
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan_x = x;
        self.pan_y = y;
    }

    pub fn zoom_percent(&self) -> i64 {
        (self.zoom * 100.0).round() as i64
    }

    /// Ruler label: meters covered by the fixed-width scale bar.
    pub fn scale_meters(&self) -> i64 {
        (100.0 / self.zoom).round() as i64
    }
}
