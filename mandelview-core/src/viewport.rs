use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complex::Complex;
use crate::error::CoreError;
use crate::selection::SelectionRect;

/// Imaginary coordinate of the top pixel row in the start-up view.
pub const INITIAL_TOP: f64 = -1.13;

/// Real coordinate of the left pixel column in the start-up view.
pub const INITIAL_LEFT: f64 = -2.0;

/// Pixels per complex-plane unit in the start-up view.
pub const INITIAL_ZOOM_SCALE: f64 = 375.0;

/// The placement of pixel `(0, 0)` on the complex plane plus the pixel pitch.
///
/// This is everything a render pass needs besides the canvas size, and it is
/// what [`Viewport::reset`] restores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Imaginary coordinate of the top row.
    pub top: f64,
    /// Real coordinate of the left column.
    pub left: f64,
    /// Complex-plane units per pixel.
    pub zoom: f64,
}

impl Anchor {
    /// Anchor with the zoom given as pixels per unit, the way it is configured.
    pub fn from_scale(top: f64, left: f64, zoom_scale: f64) -> Self {
        Self {
            top,
            left,
            zoom: 1.0 / zoom_scale,
        }
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::from_scale(INITIAL_TOP, INITIAL_LEFT, INITIAL_ZOOM_SCALE)
    }
}

/// The affine map between the pixel grid and the complex plane.
///
/// Pixel `(px, py)` maps to `left + px·zoom` on the real axis and
/// `top + py·zoom` on the imaginary axis, so pixel y grows with the imaginary
/// part. Recentring operations treat `width × height` as the visible extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top: f64,
    pub left: f64,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
    home: Anchor,
}

impl Viewport {
    /// Create a viewport whose home (the target of [`reset`](Self::reset)) is
    /// `anchor`.
    pub fn new(anchor: Anchor, width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidCanvas { width, height });
        }
        if anchor.zoom <= 0.0 || !anchor.zoom.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("zoom must be positive and finite, got {}", anchor.zoom),
            });
        }
        if !anchor.top.is_finite() || !anchor.left.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!(
                    "origin must be finite, got left={} top={}",
                    anchor.left, anchor.top
                ),
            });
        }
        Ok(Self {
            top: anchor.top,
            left: anchor.left,
            zoom: anchor.zoom,
            width,
            height,
            home: anchor,
        })
    }

    /// The start-up view: `top = -1.13`, `left = -2.0`, `zoom = 1/375`.
    pub fn initial(width: u32, height: u32) -> crate::Result<Self> {
        Self::new(Anchor::default(), width, height)
    }

    /// Current origin and zoom.
    pub fn anchor(&self) -> Anchor {
        Anchor {
            top: self.top,
            left: self.left,
            zoom: self.zoom,
        }
    }

    /// Map a pixel coordinate to a point on the complex plane.
    #[inline]
    pub fn pixel_to_complex(&self, px: u32, py: u32) -> Complex {
        Complex::new(
            px as f64 * self.zoom + self.left,
            py as f64 * self.zoom + self.top,
        )
    }

    /// Same map for fractional (and possibly off-canvas) screen positions.
    #[inline]
    pub fn screen_to_complex(&self, x: f64, y: f64) -> Complex {
        Complex::new(x * self.zoom + self.left, y * self.zoom + self.top)
    }

    /// Inverse map: the screen position that shows `c`.
    pub fn complex_to_pixel(&self, c: Complex) -> (f64, f64) {
        ((c.re - self.left) / self.zoom, (c.im - self.top) / self.zoom)
    }

    /// Complex coordinate at the middle of the canvas.
    pub fn center(&self) -> Complex {
        self.screen_to_complex(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Screen position of the middle of the canvas, as used by keyboard zoom.
    pub fn center_pixel(&self) -> (i32, i32) {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Return to the home anchor.
    pub fn reset(&mut self) {
        self.top = self.home.top;
        self.left = self.home.left;
        self.zoom = self.home.zoom;
    }

    /// Move `(px, py)` to the middle of the canvas and magnify by `factor`.
    ///
    /// The new view spans `width / factor` by `height / factor` of the old
    /// pixels, centred on `(px, py)`. `factor > 1` zooms in, `factor < 1`
    /// zooms out, `factor == 1` pans.
    pub fn recenter_at(&mut self, px: i32, py: i32, factor: f64) {
        let half_w = self.width as f64 / (2.0 * factor);
        let half_h = self.height as f64 / (2.0 * factor);
        self.left = self.screen_to_complex(px as f64 - half_w, 0.0).re;
        self.top = self.screen_to_complex(0.0, py as f64 - half_h).im;
        self.zoom /= factor;
    }

    /// Centre on `(px, py)` at half the current extent.
    pub fn zoom_in(&mut self, px: i32, py: i32) {
        self.recenter_at(px, py, 2.0);
    }

    /// Centre on `(px, py)` at double the current extent.
    pub fn zoom_out(&mut self, px: i32, py: i32) {
        self.recenter_at(px, py, 0.5);
    }

    /// Centre on `(px, py)` keeping the zoom.
    pub fn pan_to(&mut self, px: i32, py: i32) {
        self.recenter_at(px, py, 1.0);
    }

    /// Map a dragged rectangle onto the whole canvas.
    ///
    /// The rectangle's top-left corner becomes the new origin and its longer
    /// side is stretched over the matching canvas side, so the plane keeps
    /// square pixels. A zero-area click zooms in at that point instead.
    pub fn apply_selection(&mut self, rect: &SelectionRect) {
        if rect.is_degenerate() {
            debug!(x = rect.left(), y = rect.top(), "Degenerate selection, zooming in");
            self.zoom_in(rect.left(), rect.top());
            return;
        }

        let (w, h) = (rect.width(), rect.height());
        let span = if w > h { self.width } else { self.height };
        let corner = self.screen_to_complex(rect.left() as f64, rect.top() as f64);

        self.left = corner.re;
        self.top = corner.im;
        self.zoom *= w.max(h) as f64 / span as f64;
    }

    /// The visible extent in complex-plane units.
    pub fn complex_width(&self) -> f64 {
        self.width as f64 * self.zoom
    }

    /// The visible extent in complex-plane units.
    pub fn complex_height(&self) -> f64 {
        self.height as f64 * self.zoom
    }
}
