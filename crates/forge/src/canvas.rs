//! Screen <-> canvas coordinate transform.
//!
//! `screen = origin + viewport.pan + canvas * viewport.zoom`, where `origin` is
//! the screen position of the canvas element's top-left corner and the pan is
//! measured in screen pixels.

use crate::models::{Position, Viewport};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasTransform {
    pub origin: Position,
    pub viewport: Viewport,
}

impl CanvasTransform {
    pub fn new(origin: Position, viewport: Viewport) -> Self {
        Self { origin, viewport }
    }

    pub fn is_valid(&self) -> bool {
        self.origin.is_finite() && self.viewport.is_valid()
    }

    /// Map a screen point into canvas space. `None` if the transform is invalid.
    pub fn screen_to_canvas(&self, screen: Position) -> Option<Position> {
        if !self.is_valid() || !screen.is_finite() {
            return None;
        }
        let Viewport { x, y, zoom } = self.viewport;
        Some(Position::new(
            (screen.x - self.origin.x - x) / zoom,
            (screen.y - self.origin.y - y) / zoom,
        ))
    }

    /// Map a canvas point onto the screen. `None` if the transform is invalid.
    pub fn canvas_to_screen(&self, canvas: Position) -> Option<Position> {
        if !self.is_valid() || !canvas.is_finite() {
            return None;
        }
        let Viewport { x, y, zoom } = self.viewport;
        Some(Position::new(
            self.origin.x + x + canvas.x * zoom,
            self.origin.y + y + canvas.y * zoom,
        ))
    }

    /// Scale a canvas-space length to screen pixels.
    pub fn scale(&self, length: f64) -> f64 {
        length * self.viewport.zoom
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.viewport.x += dx;
            self.viewport.y += dy;
        }
    }

    /// Multiply the zoom by `factor`, keeping the canvas point under `anchor`
    /// (a screen point) where it is. The result is clamped to
    /// [`MIN_ZOOM`]..=[`MAX_ZOOM`].
    pub fn zoom_at(&mut self, anchor: Position, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let Some(fixed) = self.screen_to_canvas(anchor) else {
            return;
        };
        let zoom = (self.viewport.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.viewport = Viewport {
            x: anchor.x - self.origin.x - fixed.x * zoom,
            y: anchor.y - self.origin.y - fixed.y * zoom,
            zoom,
        };
    }
}
