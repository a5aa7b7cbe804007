//! PDF rendering infrastructure

mod request;
mod selection;
mod service;
mod state;
mod types;
pub mod worker;
mod zoom;

pub use request::{RenderParams, RenderRequest, RenderResponse, RequestId, WorkerFault};
pub use selection::{MIN_SELECTION_PX, PointerEvent, SelectionState};
pub use service::RenderService;
pub use state::{Command, Effect, RenderGuard, ViewerState};
pub use types::*;
pub use zoom::*;

/// Largest raster edge the worker will produce, in pixels
pub const MAX_RASTER_DIMENSION: f32 = 8192.0;
