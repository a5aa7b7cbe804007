//! Worker request and response types

use std::path::PathBuf;
use std::sync::Arc;

use super::types::{DocumentInfo, PageRaster};
use crate::export::{ExportError, ExportJob};

/// Unique identifier for worker requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Parameters for rendering a page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    /// Canvas size available for the page, in pixels
    pub viewport_px: (u32, u32),
    /// User zoom on top of fit-to-viewport
    pub zoom: f32,
}

/// Request sent to the worker
#[derive(Debug)]
pub enum RenderRequest {
    /// Rasterize a page for display
    Render {
        id: RequestId,
        page: usize,
        params: RenderParams,
    },

    /// Export a selection and deliver the file
    Export { id: RequestId, job: ExportJob },

    /// Shutdown the worker
    Shutdown,
}

/// Errors from the worker
#[derive(Debug, thiserror::Error)]
pub enum WorkerFault {
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[error("{detail}")]
    Generic { detail: String },
}

impl WorkerFault {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

/// Response from the worker
#[derive(Debug)]
pub enum RenderResponse {
    /// Document opened (sent once, first)
    DocumentInfo(DocumentInfo),

    /// Document could not be opened; the worker has exited
    LoadFailed { error: WorkerFault },

    /// Rendered page
    Page {
        id: RequestId,
        raster: Arc<PageRaster>,
    },

    /// Error during rendering
    RenderError {
        id: RequestId,
        page: usize,
        error: WorkerFault,
    },

    /// Export written to `path`
    Exported { id: RequestId, path: PathBuf },

    /// Export aborted; nothing was written
    ExportError { id: RequestId, error: ExportError },
}
