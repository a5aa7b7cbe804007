//! Viewer state management

use std::path::PathBuf;

use log::{debug, warn};

use super::request::RenderParams;
use super::selection::{PointerEvent, SelectionState};
use super::types::{DocumentInfo, RenderContext};
use super::zoom::{ScrollDirection, Zoom};
use crate::export::ExportJob;

/// Keeps at most one render in flight.
///
/// A request made while busy is parked as pending; a later one replaces it,
/// so rapid navigation renders the page the user ended on and skips the
/// ones in between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderGuard {
    in_flight: Option<usize>,
    pending: Option<usize>,
}

impl RenderGuard {
    /// Ask to render `page`. Returns the page to start now, or `None` if it
    /// has to wait for the current render.
    pub fn request(&mut self, page: usize) -> Option<usize> {
        if self.in_flight.is_some() {
            self.pending = Some(page);
            None
        } else {
            self.in_flight = Some(page);
            Some(page)
        }
    }

    /// The in-flight render ended (either way). Returns the pending page,
    /// which is now in flight.
    pub fn complete(&mut self) -> Option<usize> {
        self.in_flight = self.pending.take();
        self.in_flight
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything the viewer knows, changed only through [`ViewerState::apply`]
#[derive(Clone, Debug)]
pub struct ViewerState {
    document: Option<DocumentInfo>,

    /// Current page (0-indexed)
    current_page: usize,

    /// Canvas size in pixels
    viewport: (u32, u32),

    zoom: Zoom,
    guard: RenderGuard,

    /// The raster currently on screen
    context: Option<RenderContext>,

    selection: SelectionState,
    exporting: bool,
    optimize: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(1.0, false)
    }
}

impl ViewerState {
    #[must_use]
    pub fn new(zoom: f32, optimize: bool) -> Self {
        Self {
            document: None,
            current_page: 0,
            viewport: (0, 0),
            zoom: Zoom::with_factor(zoom),
            guard: RenderGuard::default(),
            context: None,
            selection: SelectionState::Idle,
            exporting: false,
            optimize,
        }
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::DocumentOpening => {
                self.discard_document();
                vec![]
            }

            Command::DocumentLoaded(info) => {
                debug!(
                    "Document loaded: {} pages, title {:?}",
                    info.page_count, info.title
                );
                self.discard_document();
                self.document = Some(info);
                self.request_render()
            }

            Command::LoadFailed(detail) => {
                self.discard_document();
                vec![Effect::Alert(format!("Could not open document: {detail}"))]
            }

            Command::SetViewport(width, height) => {
                if self.viewport == (width, height) {
                    return vec![];
                }
                self.viewport = (width, height);
                self.selection = SelectionState::Idle;
                self.request_render()
            }

            Command::NextPage => self.go_to(self.current_page.saturating_add(1)),
            Command::PrevPage => self.go_to(self.current_page.saturating_sub(1)),
            Command::GoToPage(page) => self.go_to(page),

            Command::ZoomIn => {
                let changed = self.zoom.step_in();
                self.rezoom(changed)
            }
            Command::ZoomOut => {
                let changed = self.zoom.step_out();
                self.rezoom(changed)
            }
            Command::ResetZoom => {
                let changed = self.zoom.reset();
                self.rezoom(changed)
            }

            Command::Pan(direction) => {
                if let Some(context) = self.context {
                    self.zoom
                        .pan(direction, (context.width_px, context.height_px), self.viewport);
                }
                vec![]
            }

            Command::RenderFinished(context) => {
                if self.context != Some(context) {
                    self.selection = SelectionState::Idle;
                }
                self.context = Some(context);
                self.zoom
                    .clamp_pan((context.width_px, context.height_px), self.viewport);
                self.start_pending()
            }

            Command::RenderFailed { page, detail } => {
                warn!("Failed to render page {}: {detail}", page + 1);
                let mut effects = vec![Effect::Warn(format!(
                    "Failed to render page {}",
                    page + 1
                ))];
                effects.extend(self.start_pending());
                effects
            }

            Command::Pointer(event) => {
                if matches!(event, PointerEvent::Down(_)) && !self.can_select() {
                    return vec![];
                }
                self.selection = self.selection.on_pointer(event);
                vec![]
            }

            Command::ClearSelection => {
                self.selection = SelectionState::Idle;
                vec![]
            }

            Command::RequestExport => {
                if self.exporting {
                    debug!("Export already in progress, ignoring request");
                    return vec![];
                }
                match (self.selection.finalized(), self.context) {
                    (Some(selection), Some(context)) if self.document.is_some() => {
                        self.exporting = true;
                        vec![Effect::Export(ExportJob {
                            page: context.page,
                            selection,
                            scale: context.scale,
                            optimize: self.optimize,
                        })]
                    }
                    _ => vec![Effect::Notify("Select a region first".to_string())],
                }
            }

            Command::ExportFinished(path) => {
                self.exporting = false;
                vec![Effect::Notify(format!("Saved {}", path.display()))]
            }

            Command::ExportFailed(detail) => {
                self.exporting = false;
                vec![Effect::Alert(format!("Export failed: {detail}"))]
            }

            Command::ToggleOptimize => {
                self.optimize = !self.optimize;
                let label = if self.optimize { "on" } else { "off" };
                vec![Effect::Notify(format!("SVG optimization {label}"))]
            }
        }
    }

    /// Forget everything tied to the previous document. Viewport, zoom
    /// factor and the optimize flag carry over.
    fn discard_document(&mut self) {
        self.document = None;
        self.current_page = 0;
        self.context = None;
        self.guard.reset();
        self.selection = SelectionState::Idle;
        self.exporting = false;
        self.zoom.pan_x = 0;
        self.zoom.pan_y = 0;
    }

    fn go_to(&mut self, page: usize) -> Vec<Effect> {
        let Some(info) = &self.document else {
            return vec![];
        };
        let clamped = page.min(info.page_count.saturating_sub(1));
        if clamped == self.current_page {
            return vec![];
        }
        self.current_page = clamped;
        self.selection = SelectionState::Idle;
        self.request_render()
    }

    fn rezoom(&mut self, changed: bool) -> Vec<Effect> {
        if !changed {
            return vec![];
        }
        self.selection = SelectionState::Idle;
        self.request_render()
    }

    fn request_render(&mut self) -> Vec<Effect> {
        let has_pages = self.document.as_ref().is_some_and(|d| d.page_count > 0);
        if !has_pages || self.viewport.0 == 0 || self.viewport.1 == 0 {
            return vec![];
        }
        match self.guard.request(self.current_page) {
            Some(page) => vec![self.render_effect(page)],
            None => vec![],
        }
    }

    fn start_pending(&mut self) -> Vec<Effect> {
        match self.guard.complete() {
            Some(page) => vec![self.render_effect(page)],
            None => vec![],
        }
    }

    fn render_effect(&self, page: usize) -> Effect {
        Effect::Render {
            page,
            params: self.render_params(),
        }
    }

    /// Get render parameters from current state
    #[must_use]
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            viewport_px: self.viewport,
            zoom: self.zoom.factor(),
        }
    }

    /// A selection can only be started on the raster of the current page
    #[must_use]
    pub fn can_select(&self) -> bool {
        self.document.is_some()
            && self
                .context
                .is_some_and(|context| context.page == self.current_page)
    }

    #[must_use]
    pub fn export_enabled(&self) -> bool {
        self.document.is_some() && self.selection.can_export() && !self.exporting
    }

    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    #[must_use]
    pub fn page_label(&self) -> String {
        match &self.document {
            Some(info) => format!("Page: {} / {}", self.current_page + 1, info.page_count),
            None => "Page: - / -".to_string(),
        }
    }

    #[must_use]
    pub fn document(&self) -> Option<&DocumentInfo> {
        self.document.as_ref()
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.document
            .as_ref()
            .is_some_and(|info| self.current_page + 1 < info.page_count)
    }

    #[must_use]
    pub fn has_prev_page(&self) -> bool {
        self.document.is_some() && self.current_page > 0
    }

    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    #[must_use]
    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    #[must_use]
    pub fn context(&self) -> Option<RenderContext> {
        self.context
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    #[must_use]
    pub fn optimize(&self) -> bool {
        self.optimize
    }

    #[must_use]
    pub fn guard(&self) -> &RenderGuard {
        &self.guard
    }
}

/// Commands that modify viewer state
#[derive(Clone, Debug)]
pub enum Command {
    /// A new document is being opened; the old one is gone
    DocumentOpening,
    /// The worker opened the document
    DocumentLoaded(DocumentInfo),
    /// The worker could not open the document
    LoadFailed(String),
    /// Canvas size in pixels
    SetViewport(u32, u32),
    NextPage,
    PrevPage,
    /// Go to a specific page (0-indexed, clamped)
    GoToPage(usize),
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Pan(ScrollDirection),
    /// A raster arrived and is now on screen
    RenderFinished(RenderContext),
    RenderFailed { page: usize, detail: String },
    Pointer(PointerEvent),
    ClearSelection,
    RequestExport,
    ExportFinished(PathBuf),
    ExportFailed(String),
    ToggleOptimize,
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Ask the worker to rasterize a page
    Render { page: usize, params: RenderParams },
    /// Ask the worker to export a selection
    Export(ExportJob),
    /// Transient status line message
    Notify(String),
    /// Transient status line message shown as an error
    Warn(String),
    /// Blocking message the user has to dismiss
    Alert(String),
}
