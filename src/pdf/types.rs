//! Core types for PDF rendering

use crate::geometry::RenderScale;

/// Document metadata reported once the worker has opened the file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub title: Option<String>,
}

/// The page and scale a raster on screen was produced with.
///
/// Selections drawn on the raster are only meaningful together with this:
/// exporting against any other scale or page would crop the wrong region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderContext {
    /// Page number (0-indexed)
    pub page: usize,
    /// Canvas pixels per page point
    pub scale: RenderScale,
    pub width_px: u32,
    pub height_px: u32,
}

/// Rendered page raster.
///
/// Packed RGB, 3 bytes per pixel, rows top to bottom with no padding.
#[derive(Clone)]
pub struct PageRaster {
    /// Page number (0-indexed)
    pub page: usize,
    /// Scale factor used for rendering
    pub scale: RenderScale,
    pub width_px: u32,
    pub height_px: u32,
    pub pixels: Vec<u8>,
}

impl PageRaster {
    #[must_use]
    pub fn context(&self) -> RenderContext {
        RenderContext {
            page: self.page,
            scale: self.scale,
            width_px: self.width_px,
            height_px: self.height_px,
        }
    }

    /// RGB at (`x`, `y`), or `None` outside the raster
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width_px || y >= self.height_px {
            return None;
        }
        let offset = (y as usize * self.width_px as usize + x as usize) * 3;
        let px = self.pixels.get(offset..offset + 3)?;
        Some((px[0], px[1], px[2]))
    }
}

impl std::fmt::Debug for PageRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRaster")
            .field("page", &self.page)
            .field("scale", &self.scale)
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("pixels_len", &self.pixels.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster() -> PageRaster {
        PageRaster {
            page: 0,
            scale: RenderScale::NATIVE,
            width_px: 2,
            height_px: 2,
            pixels: vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
        }
    }

    #[test]
    fn pixel_reads_row_major_rgb() {
        let raster = raster();
        assert_eq!(raster.pixel(0, 0), Some((1, 2, 3)));
        assert_eq!(raster.pixel(1, 0), Some((4, 5, 6)));
        assert_eq!(raster.pixel(0, 1), Some((7, 8, 9)));
        assert_eq!(raster.pixel(1, 1), Some((10, 11, 12)));
    }

    #[test]
    fn pixel_outside_raster_is_none() {
        let raster = raster();
        assert_eq!(raster.pixel(2, 0), None);
        assert_eq!(raster.pixel(0, 2), None);
    }
}
