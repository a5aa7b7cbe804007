//! PDF render worker - runs in a dedicated thread

use std::path::Path;
use std::sync::Arc;

use flume::{Receiver, Sender};
use log::{debug, info, warn};
use mupdf::{Colorspace, Document, Matrix, Pixmap};

use super::MAX_RASTER_DIMENSION;
use super::request::{RenderParams, RenderRequest, RenderResponse, RequestId, WorkerFault};
use super::types::{DocumentInfo, PageRaster};
use crate::export::{ExportConfig, ExportError, ExportJob, MupdfSource};
use crate::geometry::RenderScale;

/// Pre-computed rasterization parameters for a page
#[derive(Clone, Copy, Debug, PartialEq)]
struct RasterSpec {
    output_width: f32,
    output_height: f32,
    mag: f32,
}

impl RasterSpec {
    /// Fit the page into the viewport, then apply the user zoom. Rasters
    /// larger than [`MAX_RASTER_DIMENSION`] on either side are scaled down.
    fn compute(page_bounds: (f32, f32), viewport_px: (f32, f32), user_scale: f32) -> Self {
        let (page_width, page_height) = page_bounds;
        let (view_width, view_height) = viewport_px;

        let base_mag = (view_width / page_width).min(view_height / page_height);

        let mut mag = base_mag * user_scale;
        let mut out_width = page_width * mag;
        let mut out_height = page_height * mag;

        let max_dim = out_width.max(out_height);
        if max_dim > MAX_RASTER_DIMENSION {
            let reduction = MAX_RASTER_DIMENSION / max_dim;
            mag *= reduction;
            out_width *= reduction;
            out_height *= reduction;
        }

        Self {
            output_width: out_width,
            output_height: out_height,
            mag,
        }
    }

    fn transform(&self) -> Matrix {
        Matrix::new_scale(self.mag, self.mag)
    }
}

/// Main worker function - runs in a dedicated thread.
///
/// Owns the document for its whole life; the first response is either
/// `DocumentInfo` or `LoadFailed`.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Values moved into thread, need ownership"
)]
pub fn render_worker(
    doc_path: &Path,
    export: ExportConfig,
    requests: Receiver<RenderRequest>,
    responses: Sender<RenderResponse>,
) {
    let doc = match open_document(doc_path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Could not open {}: {e}", doc_path.display());
            let _ = responses.send(RenderResponse::LoadFailed { error: e });
            return;
        }
    };

    match document_info(&doc) {
        Ok(doc_info) => {
            info!(
                "Opened {} ({} pages)",
                doc_path.display(),
                doc_info.page_count
            );
            let _ = responses.send(RenderResponse::DocumentInfo(doc_info));
        }
        Err(e) => {
            let _ = responses.send(RenderResponse::LoadFailed { error: e });
            return;
        }
    }

    for request in requests {
        match request {
            RenderRequest::Render { id, page, params } => {
                handle_render_request(&doc, id, page, &params, &responses);
            }

            RenderRequest::Export { id, job } => {
                let response = match run_export(&doc, &export, &job) {
                    Ok(path) => RenderResponse::Exported { id, path },
                    Err(error) => {
                        warn!("Export of page {} failed: {error}", job.page + 1);
                        RenderResponse::ExportError { id, error }
                    }
                };
                let _ = responses.send(response);
            }

            RenderRequest::Shutdown => break,
        }
    }
    debug!("Render worker stopped");
}

pub fn open_document(doc_path: &Path) -> Result<Document, WorkerFault> {
    Ok(Document::open(doc_path.to_string_lossy().as_ref())?)
}

pub fn document_info(doc: &Document) -> Result<DocumentInfo, WorkerFault> {
    let page_count = doc.page_count()?;
    if page_count <= 0 {
        return Err(WorkerFault::generic("Document has no pages"));
    }

    let title = doc
        .metadata(mupdf::MetadataName::Title)
        .ok()
        .filter(|t| !t.is_empty());

    Ok(DocumentInfo {
        page_count: page_count as usize,
        title,
    })
}

fn handle_render_request(
    doc: &Document,
    id: RequestId,
    page_num: usize,
    params: &RenderParams,
    responses: &Sender<RenderResponse>,
) {
    match render_page(doc, page_num, params) {
        Ok(raster) => {
            let _ = responses.send(RenderResponse::Page {
                id,
                raster: Arc::new(raster),
            });
        }
        Err(error) => {
            let _ = responses.send(RenderResponse::RenderError {
                id,
                page: page_num,
                error,
            });
        }
    }
}

/// Render a single page
pub fn render_page(
    doc: &Document,
    page_num: usize,
    params: &RenderParams,
) -> Result<PageRaster, WorkerFault> {
    let (view_width, view_height) = params.viewport_px;
    if view_width == 0 || view_height == 0 {
        return Err(WorkerFault::generic("Viewport has no area"));
    }

    let page = doc.load_page(page_num as i32)?;
    let bounds = page.bounds()?;
    let page_bounds = (bounds.x1 - bounds.x0, bounds.y1 - bounds.y0);
    if page_bounds.0 <= 0.0 || page_bounds.1 <= 0.0 {
        return Err(WorkerFault::generic(format!(
            "Page {} has an empty media box",
            page_num + 1
        )));
    }

    let spec = RasterSpec::compute(
        page_bounds,
        (view_width as f32, view_height as f32),
        params.zoom,
    );
    let scale = RenderScale::new(f64::from(spec.mag))
        .ok_or_else(|| WorkerFault::generic(format!("Invalid render scale {}", spec.mag)))?;

    let rgb = Colorspace::device_rgb();
    let pixmap = page.to_pixmap(&spec.transform(), &rgb, false, false)?;
    let pixels = pixmap_to_rgb(&pixmap)?;

    debug!(
        "Rendered page {} at {:.3} ({}x{} px, requested {:.0}x{:.0})",
        page_num + 1,
        spec.mag,
        pixmap.width(),
        pixmap.height(),
        spec.output_width,
        spec.output_height
    );

    Ok(PageRaster {
        page: page_num,
        scale,
        width_px: pixmap.width(),
        height_px: pixmap.height(),
        pixels,
    })
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, WorkerFault> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(WorkerFault::generic(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    let expected_min = stride.saturating_mul(height);
    if samples.len() < expected_min || row_bytes > stride {
        return Err(WorkerFault::generic("Pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for row in samples.chunks(stride).take(height) {
        let row = &row[..row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(out)
}

/// Export a selection from an open document and deliver it
pub fn run_export(
    doc: &Document,
    config: &ExportConfig,
    job: &ExportJob,
) -> Result<std::path::PathBuf, ExportError> {
    config.run(&MupdfSource::new(doc), job)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_uses_the_tighter_axis() {
        // Letter page into a wide viewport: height limits
        let spec = RasterSpec::compute((612.0, 792.0), (800.0, 396.0), 1.0);
        assert!((spec.mag - 0.5).abs() < 1e-6);
        assert!((spec.output_width - 306.0).abs() < 1e-3);
        assert!((spec.output_height - 396.0).abs() < 1e-3);

        // Tall viewport: width limits
        let spec = RasterSpec::compute((612.0, 792.0), (306.0, 2000.0), 1.0);
        assert!((spec.mag - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zoom_multiplies_the_fit_scale() {
        let spec = RasterSpec::compute((100.0, 100.0), (200.0, 200.0), 1.5);
        assert!((spec.mag - 3.0).abs() < 1e-6);
        assert!((spec.output_width - 300.0).abs() < 1e-3);
    }

    #[test]
    fn oversized_rasters_are_capped() {
        let spec = RasterSpec::compute((100.0, 50.0), (2000.0, 2000.0), 8.0);
        assert!((spec.output_width - MAX_RASTER_DIMENSION).abs() < 1e-2);
        assert!((spec.output_height - MAX_RASTER_DIMENSION / 2.0).abs() < 1e-2);
    }
}
