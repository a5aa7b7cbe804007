//! Zoom and pan state for the page canvas
//!
//! Zoom multiplies the fit-to-viewport render scale, so changing it means a
//! new raster. Panning only moves the visible window over the current raster
//! and never changes the scale.

/// Pan direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Zoom and pan state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom {
    /// Current zoom factor (1.0 = page fits the viewport)
    pub factor: f32,

    /// Horizontal pan offset in canvas pixels
    pub pan_x: u32,

    /// Vertical pan offset in canvas pixels
    pub pan_y: u32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::with_factor(1.0)
    }
}

impl Zoom {
    /// Multiplier applied per zoom step
    pub const ZOOM_STEP: f32 = 1.25;
    /// Minimum allowed zoom factor
    pub const MIN_SCALE: f32 = 0.25;
    /// Maximum allowed zoom factor
    pub const MAX_SCALE: f32 = 8.0;

    /// Pan step in canvas pixels for horizontal movement
    pub const PAN_STEP_X: u32 = 8;
    /// Pan step in canvas pixels for vertical movement (two terminal rows)
    pub const PAN_STEP_Y: u32 = 4;

    #[must_use]
    pub fn with_factor(factor: f32) -> Self {
        Self {
            factor: Self::clamp_factor(factor),
            pan_x: 0,
            pan_y: 0,
        }
    }

    /// Returns the current zoom factor
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Zoom in by one step. Returns true if the factor changed.
    pub fn step_in(&mut self) -> bool {
        self.set_factor(self.factor * Self::ZOOM_STEP)
    }

    /// Zoom out by one step. Returns true if the factor changed.
    pub fn step_out(&mut self) -> bool {
        self.set_factor(self.factor / Self::ZOOM_STEP)
    }

    /// Back to fit-to-viewport. Returns true if the factor changed.
    pub fn reset(&mut self) -> bool {
        self.set_factor(1.0)
    }

    fn set_factor(&mut self, factor: f32) -> bool {
        let clamped = Self::clamp_factor(factor);
        if (clamped - self.factor).abs() <= f32::EPSILON {
            return false;
        }
        self.factor = clamped;
        self.pan_x = 0;
        self.pan_y = 0;
        true
    }

    /// Pan in the given direction, keeping the view inside the raster
    pub fn pan(&mut self, direction: ScrollDirection, raster_px: (u32, u32), view_px: (u32, u32)) {
        match direction {
            ScrollDirection::Up => self.pan_y = self.pan_y.saturating_sub(Self::PAN_STEP_Y),
            ScrollDirection::Down => self.pan_y = self.pan_y.saturating_add(Self::PAN_STEP_Y),
            ScrollDirection::Left => self.pan_x = self.pan_x.saturating_sub(Self::PAN_STEP_X),
            ScrollDirection::Right => self.pan_x = self.pan_x.saturating_add(Self::PAN_STEP_X),
        }
        self.clamp_pan(raster_px, view_px);
    }

    /// Keep the pan offset within what the raster can show
    pub fn clamp_pan(&mut self, raster_px: (u32, u32), view_px: (u32, u32)) {
        self.pan_x = self.pan_x.min(raster_px.0.saturating_sub(view_px.0));
        self.pan_y = self.pan_y.min(raster_px.1.saturating_sub(view_px.1));
    }

    /// Clamp factor to valid range, handling NaN/Inf
    pub fn clamp_factor(factor: f32) -> f32 {
        if !factor.is_finite() {
            1.0
        } else {
            factor.clamp(Self::MIN_SCALE, Self::MAX_SCALE)
        }
    }
}
