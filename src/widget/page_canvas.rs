//! Half-block page canvas
//!
//! Each terminal cell shows two vertically stacked canvas pixels: the upper
//! one as the foreground of `▀`, the lower one as its background. One column
//! is one canvas pixel wide, one row is two canvas pixels tall.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::geometry::{CanvasPoint, PixelRect};
use crate::pdf::PageRaster;

const UPPER_HALF_BLOCK: &str = "▀";

/// Selection overlay colour (RGB) with its fill and border opacity
const SELECTION_RGB: (u8, u8, u8) = (0, 120, 215);
const SELECTION_FILL_ALPHA: u16 = 50;
const SELECTION_BORDER_ALPHA: u16 = 200;

/// Canvas pixels per terminal cell, horizontally and vertically
pub const PIXELS_PER_CELL: (u32, u32) = (1, 2);

/// Canvas size in pixels for a cell area
#[must_use]
pub fn viewport_px(area: Rect) -> (u32, u32) {
    (
        u32::from(area.width) * PIXELS_PER_CELL.0,
        u32::from(area.height) * PIXELS_PER_CELL.1,
    )
}

/// Map a terminal cell to the canvas pixel under its top-left corner,
/// clamped to the raster
#[must_use]
pub fn cell_to_canvas(
    area: Rect,
    pan: (u32, u32),
    raster_px: (u32, u32),
    column: u16,
    row: u16,
) -> CanvasPoint {
    let x = u32::from(column.saturating_sub(area.x)) * PIXELS_PER_CELL.0 + pan.0;
    let y = u32::from(row.saturating_sub(area.y)) * PIXELS_PER_CELL.1 + pan.1;
    CanvasPoint::new(
        f64::from(x.min(raster_px.0)),
        f64::from(y.min(raster_px.1)),
    )
}

/// Whether a terminal cell shows part of the raster, as opposed to the
/// empty canvas around a page smaller than the view
#[must_use]
pub fn cell_on_raster(
    area: Rect,
    pan: (u32, u32),
    raster_px: (u32, u32),
    column: u16,
    row: u16,
) -> bool {
    if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
        return false;
    }
    let x = u32::from(column - area.x) * PIXELS_PER_CELL.0 + pan.0;
    let y = u32::from(row - area.y) * PIXELS_PER_CELL.1 + pan.1;
    x < raster_px.0 && y < raster_px.1
}

/// Draws a window of a page raster, panned by `pan`, with an optional
/// selection rectangle on top
pub struct PageCanvas<'a> {
    raster: &'a PageRaster,
    pan: (u32, u32),
    selection: Option<PixelRect>,
    background: Color,
}

impl<'a> PageCanvas<'a> {
    pub fn new(raster: &'a PageRaster) -> Self {
        Self {
            raster,
            pan: (0, 0),
            selection: None,
            background: Color::Reset,
        }
    }

    #[must_use]
    pub fn pan(mut self, pan_x: u32, pan_y: u32) -> Self {
        self.pan = (pan_x, pan_y);
        self
    }

    #[must_use]
    pub fn selection(mut self, selection: Option<PixelRect>) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    fn color_at(&self, x: u32, y: u32) -> Option<Color> {
        let rgb = self.raster.pixel(x, y)?;
        let rgb = match self.selection {
            Some(rect) => overlay(rgb, &rect, x, y),
            None => rgb,
        };
        Some(Color::Rgb(rgb.0, rgb.1, rgb.2))
    }
}

impl Widget for PageCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);

        for row in 0..area.height {
            let y = u32::from(row) * PIXELS_PER_CELL.1 + self.pan.1;
            for col in 0..area.width {
                let x = u32::from(col) * PIXELS_PER_CELL.0 + self.pan.0;
                let Some(upper) = self.color_at(x, y) else {
                    continue;
                };
                let lower = self.color_at(x, y + 1).unwrap_or(self.background);
                buf[(area.x + col, area.y + row)]
                    .set_symbol(UPPER_HALF_BLOCK)
                    .set_style(Style::default().fg(upper).bg(lower));
            }
        }
    }
}

fn overlay(rgb: (u8, u8, u8), rect: &PixelRect, x: u32, y: u32) -> (u8, u8, u8) {
    let (px, py) = (f64::from(x), f64::from(y));
    if !rect.covers_pixel(px, py) {
        return rgb;
    }
    let on_border = px < rect.x + 1.0
        || px + 1.0 > rect.right() - 1.0
        || py < rect.y + 1.0
        || py + 1.0 > rect.bottom() - 1.0;
    let alpha = if on_border {
        SELECTION_BORDER_ALPHA
    } else {
        SELECTION_FILL_ALPHA
    };
    (
        blend(rgb.0, SELECTION_RGB.0, alpha),
        blend(rgb.1, SELECTION_RGB.1, alpha),
        blend(rgb.2, SELECTION_RGB.2, alpha),
    )
}

fn blend(base: u8, over: u8, alpha: u16) -> u8 {
    let mixed = (u16::from(base) * (255 - alpha) + u16::from(over) * alpha) / 255;
    mixed as u8
}
