//! Canvas-pixel and page-point rectangles
//!
//! A selection is drawn on the rendered raster (canvas-pixel space) and
//! exported in the page's own coordinate system (page-point space). The two
//! spaces get separate types so a rectangle can only cross between them
//! through [`to_page_space`].

use std::fmt;

/// A pointer position on the rendered raster, in canvas pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangle in canvas-pixel space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-sized rectangle sitting on `point`
    #[must_use]
    pub const fn at(point: CanvasPoint) -> Self {
        Self::new(point.x, point.y, 0.0, 0.0)
    }

    /// Axis-aligned bounding box of two points. Width and height are never
    /// negative, whichever corner the drag started from.
    #[must_use]
    pub fn spanning(a: CanvasPoint, b: CanvasPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// True when both dimensions are strictly larger than `min`
    #[must_use]
    pub fn exceeds(&self, min: f64) -> bool {
        self.width > min && self.height > min
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the pixel whose top-left corner is (`px`, `py`) overlaps the
    /// rectangle
    #[must_use]
    pub fn covers_pixel(&self, px: f64, py: f64) -> bool {
        px + 1.0 > self.x && px < self.right() && py + 1.0 > self.y && py < self.bottom()
    }
}

/// Rectangle in page-point space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PointRect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The four numbers of an SVG `viewBox` attribute
    #[must_use]
    pub fn view_box(&self) -> String {
        format!("{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

/// Ratio of rendered canvas pixels to page points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderScale(f64);

impl RenderScale {
    /// The renderer's native reference frame: one pixel per point
    pub const NATIVE: RenderScale = RenderScale(1.0);

    /// Returns `None` unless `value` is finite and strictly positive
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl fmt::Display for RenderScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map a canvas-pixel rectangle into page-point space.
///
/// `scale` must be the scale the raster was rendered at when the rectangle
/// was drawn. No rounding is applied.
#[must_use]
pub fn to_page_space(rect: PixelRect, scale: RenderScale) -> PointRect {
    let s = scale.get();
    PointRect {
        x: rect.x / s,
        y: rect.y / s,
        width: rect.width / s,
        height: rect.height / s,
    }
}
