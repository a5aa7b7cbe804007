//! Rubber-band region selection on a rendered page

use crate::geometry::{CanvasPoint, PixelRect};

/// Releases with either side at or below this many canvas pixels are
/// treated as clicks and discarded
pub const MIN_SELECTION_PX: f64 = 5.0;

/// Pointer input in canvas-pixel space
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(CanvasPoint),
    Move(CanvasPoint),
    Up(CanvasPoint),
}

/// Selection gesture state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SelectionState {
    #[default]
    Idle,
    Dragging {
        anchor: CanvasPoint,
        live: PixelRect,
    },
    Finalized {
        rect: PixelRect,
    },
}

impl SelectionState {
    /// Advance the gesture by one pointer event
    #[must_use]
    pub fn on_pointer(self, event: PointerEvent) -> Self {
        match (self, event) {
            (_, PointerEvent::Down(at)) => Self::Dragging {
                anchor: at,
                live: PixelRect::at(at),
            },
            (Self::Dragging { anchor, .. }, PointerEvent::Move(at)) => Self::Dragging {
                anchor,
                live: PixelRect::spanning(anchor, at),
            },
            (Self::Dragging { anchor, .. }, PointerEvent::Up(at)) => {
                let rect = PixelRect::spanning(anchor, at);
                if rect.exceeds(MIN_SELECTION_PX) {
                    Self::Finalized { rect }
                } else {
                    Self::Idle
                }
            }
            (state, PointerEvent::Move(_) | PointerEvent::Up(_)) => state,
        }
    }

    /// Rectangle to draw: the live one while dragging, the committed one after
    #[must_use]
    pub fn visible_rect(&self) -> Option<PixelRect> {
        match self {
            Self::Idle => None,
            Self::Dragging { live, .. } => Some(*live),
            Self::Finalized { rect } => Some(*rect),
        }
    }

    #[must_use]
    pub fn finalized(&self) -> Option<PixelRect> {
        match self {
            Self::Finalized { rect } => Some(*rect),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Whether a committed rectangle exists to export
    #[must_use]
    pub fn can_export(&self) -> bool {
        self.finalized().is_some()
    }
}
