use std::io;
use std::path::PathBuf;

use log::{debug, info};
use mupdf::{Document, Matrix};

use crate::export::filename::artifact_name;
use crate::geometry::{PixelRect, RenderScale, to_page_space};
use crate::optimizer::{OptimizeError, OptimizeOptions, Optimizer};
use crate::pdf::MIN_SELECTION_PX;
use crate::svg::{MarkupError, SVG_MIME, VectorDocument, pretty};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PDF engine: {0}")]
    Source(#[from] mupdf::error::Error),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    #[error("could not write {}: {source}", path.display())]
    Delivery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("selection {width}x{height} px is too small, both sides must exceed {min} px")]
    Rejected { width: f64, height: f64, min: f64 },
}

/// Produces the full-page vector markup of a page in its native frame
/// (one unit per point), independent of any on-screen scale
pub trait VectorSource {
    fn page_markup(&self, page: usize) -> Result<String, ExportError>;
}

/// Vector source backed by an open MuPDF document
pub struct MupdfSource<'a> {
    doc: &'a Document,
}

impl<'a> MupdfSource<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }
}

impl VectorSource for MupdfSource<'_> {
    fn page_markup(&self, page: usize) -> Result<String, ExportError> {
        let page = self.doc.load_page(page as i32)?;
        let native = RenderScale::NATIVE.get() as f32;
        Ok(page.to_svg(&Matrix::new_scale(native, native))?)
    }
}

/// Everything needed to export one selection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportJob {
    /// 0-based page index
    pub page: usize,
    /// Committed selection in canvas pixels
    pub selection: PixelRect,
    /// Scale of the raster the selection was drawn on
    pub scale: RenderScale,
    pub optimize: bool,
}

/// A named, typed export result ready for delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub mime: &'static str,
    pub contents: String,
}

/// Export the selected region of a page as SVG.
///
/// The document still carries the whole page; only its `viewBox` and size
/// are narrowed to the selection. Dropping geometry outside the frame is
/// left to the optimizer, when enabled.
pub fn export_region(
    source: &dyn VectorSource,
    job: &ExportJob,
    optimizer: &dyn Optimizer,
) -> Result<Artifact, ExportError> {
    if !job.selection.exceeds(MIN_SELECTION_PX) {
        return Err(ExportError::Rejected {
            width: job.selection.width,
            height: job.selection.height,
            min: MIN_SELECTION_PX,
        });
    }

    let markup = source.page_markup(job.page)?;
    debug!(
        "Page {} vector markup: {} bytes",
        job.page + 1,
        markup.len()
    );

    let mut doc = VectorDocument::parse(&markup)?;
    let frame = to_page_space(job.selection, job.scale);
    doc.set_frame(frame);
    let serialized = doc.to_markup();

    let contents = if job.optimize {
        let optimized = optimizer.optimize(&serialized, &OptimizeOptions::region_export())?;
        pretty::format(&optimized)?
    } else {
        serialized
    };

    info!(
        "Exported page {} region {:?} at scale {} as viewBox \"{}\"",
        job.page + 1,
        job.selection,
        job.scale,
        frame.view_box()
    );

    Ok(Artifact {
        name: artifact_name(job.page + 1),
        mime: SVG_MIME,
        contents,
    })
}
