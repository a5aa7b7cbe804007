use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyEventKind, MouseButton};
use log::{debug, info};
use ratatui::{
    Frame, Terminal,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::event_source::{Event, EventSource, KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use crate::export::ExportConfig;
use crate::geometry::{CanvasPoint, to_page_space};
use crate::pdf::{
    Command, Effect, PageRaster, PointerEvent, RenderResponse, RenderService, ScrollDirection,
    ViewerState,
};
use crate::settings;
use crate::theme::OCEANIC_NEXT;
use crate::widget::page_canvas::{cell_on_raster, cell_to_canvas, viewport_px};
use crate::widget::{AlertPopup, HUD_DURATION, HudMessage, HudMode, PageCanvas};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

/// Terminal viewer for one document at a time
pub struct App {
    state: ViewerState,
    service: Option<RenderService>,
    export: ExportConfig,
    doc_name: Option<String>,
    /// Raster currently on screen
    raster: Option<Arc<PageRaster>>,
    /// Where the page canvas was last laid out
    canvas_area: Rect,
    alert: Option<AlertPopup>,
    hud: Option<HudMessage>,
    /// Write setting changes (optimize toggle) back to the config file
    persist_settings: bool,
}

impl App {
    pub fn new(state: ViewerState, export: ExportConfig) -> Self {
        Self {
            state,
            service: None,
            export,
            doc_name: None,
            raster: None,
            canvas_area: Rect::default(),
            alert: None,
            hud: None,
            persist_settings: true,
        }
    }

    /// Keep setting changes to this session
    #[must_use]
    pub fn without_persistence(mut self) -> Self {
        self.persist_settings = false;
        self
    }

    /// Start loading a document. Any previous document and its worker are
    /// dropped; the new one shows up once the worker reports back.
    pub fn open_document(&mut self, path: &Path) {
        info!("Opening {}", path.display());
        self.dispatch(Command::DocumentOpening);
        self.alert = None;
        self.service = Some(RenderService::open(
            PathBuf::from(path),
            self.export.clone(),
        ));
        self.doc_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        self.raster = None;
    }

    #[must_use]
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_ref().map(AlertPopup::message)
    }

    #[must_use]
    pub fn hud_message(&self) -> Option<&str> {
        self.hud.as_ref().map(|hud| hud.message.as_str())
    }

    #[must_use]
    pub fn raster(&self) -> Option<&PageRaster> {
        self.raster.as_deref()
    }

    #[must_use]
    pub fn canvas_area(&self) -> Rect {
        self.canvas_area
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<AppAction> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Mouse(mouse) => {
                self.handle_mouse(*mouse);
                None
            }
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        if self.alert.is_some() {
            if matches!(
                key.code,
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')
            ) {
                self.alert = None;
            }
            return None;
        }

        let command = match key.code {
            KeyCode::Char('q') => return Some(AppAction::Quit),
            KeyCode::Char('n') | KeyCode::PageDown => Command::NextPage,
            KeyCode::Char('p') | KeyCode::PageUp => Command::PrevPage,
            KeyCode::Char('g') => Command::GoToPage(0),
            KeyCode::Char('G') => Command::GoToPage(usize::MAX),
            KeyCode::Char('+' | '=') => Command::ZoomIn,
            KeyCode::Char('-') => Command::ZoomOut,
            KeyCode::Char('0') => Command::ResetZoom,
            KeyCode::Char('h') | KeyCode::Left => Command::Pan(ScrollDirection::Left),
            KeyCode::Char('l') | KeyCode::Right => Command::Pan(ScrollDirection::Right),
            KeyCode::Char('k') | KeyCode::Up => Command::Pan(ScrollDirection::Up),
            KeyCode::Char('j') | KeyCode::Down => Command::Pan(ScrollDirection::Down),
            KeyCode::Char('s' | 'e') => Command::RequestExport,
            KeyCode::Char('o') => Command::ToggleOptimize,
            KeyCode::Esc => Command::ClearSelection,
            _ => return None,
        };

        let toggles_optimize = matches!(command, Command::ToggleOptimize);
        self.dispatch(command);
        if toggles_optimize && self.persist_settings {
            settings::set_optimize(self.state.optimize());
        }
        None
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.alert.is_some() {
            return;
        }
        let event: fn(CanvasPoint) -> PointerEvent = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.on_raster(mouse.column, mouse.row) {
                    return;
                }
                PointerEvent::Down
            }
            MouseEventKind::Drag(MouseButton::Left) => PointerEvent::Move,
            MouseEventKind::Up(MouseButton::Left) => PointerEvent::Up,
            _ => return,
        };
        let Some(point) = self.canvas_point(mouse.column, mouse.row) else {
            return;
        };
        self.dispatch(Command::Pointer(event(point)));
    }

    fn on_raster(&self, column: u16, row: u16) -> bool {
        let Some(context) = self.state.context() else {
            return false;
        };
        let zoom = self.state.zoom();
        cell_on_raster(
            self.canvas_area,
            (zoom.pan_x, zoom.pan_y),
            (context.width_px, context.height_px),
            column,
            row,
        )
    }

    fn canvas_point(&self, column: u16, row: u16) -> Option<CanvasPoint> {
        let context = self.state.context()?;
        let zoom = self.state.zoom();
        Some(cell_to_canvas(
            self.canvas_area,
            (zoom.pan_x, zoom.pan_y),
            (context.width_px, context.height_px),
            column,
            row,
        ))
    }

    fn dispatch(&mut self, command: Command) {
        let effects = self.state.apply(command);
        self.execute_effects(effects);
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Render { page, params } => {
                    if let Some(service) = self.service.as_mut() {
                        service.request_render(page, params);
                    }
                }
                Effect::Export(job) => match self.service.as_mut() {
                    Some(service) => {
                        service.request_export(job);
                    }
                    None => self.dispatch(Command::ExportFailed("No document open".to_string())),
                },
                Effect::Notify(message) => {
                    self.hud = Some(HudMessage::new(message, HUD_DURATION, HudMode::Normal));
                }
                Effect::Warn(message) => {
                    self.hud = Some(HudMessage::new(message, HUD_DURATION, HudMode::Error));
                }
                Effect::Alert(message) => {
                    self.alert = Some(AlertPopup::new(message));
                }
            }
        }
    }

    /// Apply everything the worker has finished so far. Returns true if
    /// anything arrived.
    pub fn poll_worker(&mut self) -> bool {
        let responses = match self.service.as_mut() {
            Some(service) => service.poll_responses(),
            None => return false,
        };
        let any = !responses.is_empty();
        for response in responses {
            self.handle_response(response);
        }
        any
    }

    /// Block on worker responses until `done` holds or `timeout` passes.
    /// Returns whether `done` held.
    pub fn pump_until(&mut self, timeout: Duration, done: impl Fn(&App) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while !done(self) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let Some(service) = self.service.as_mut() else {
                return false;
            };
            if let Some(response) = service.wait_response(remaining) {
                self.handle_response(response);
            }
        }
        true
    }

    fn handle_response(&mut self, response: RenderResponse) {
        match response {
            RenderResponse::DocumentInfo(info) => {
                self.raster = None;
                self.dispatch(Command::DocumentLoaded(info));
            }
            RenderResponse::LoadFailed { error } => {
                self.service = None;
                self.raster = None;
                self.dispatch(Command::LoadFailed(error.to_string()));
            }
            RenderResponse::Page { raster, .. } => {
                let context = raster.context();
                self.raster = Some(raster);
                self.dispatch(Command::RenderFinished(context));
            }
            RenderResponse::RenderError { page, error, .. } => {
                self.dispatch(Command::RenderFailed {
                    page,
                    detail: error.to_string(),
                });
            }
            RenderResponse::Exported { path, .. } => {
                self.dispatch(Command::ExportFinished(path));
            }
            RenderResponse::ExportError { error, .. } => {
                self.dispatch(Command::ExportFailed(error.to_string()));
            }
        }
    }

    /// Lay out the screen for `area` and tell the viewer how large the
    /// canvas is
    pub fn sync_layout(&mut self, area: Rect) {
        let [_, canvas, _, _] = screen_layout(area);
        if canvas != self.canvas_area {
            debug!("Canvas area {canvas:?}");
            self.canvas_area = canvas;
        }
        let (width, height) = viewport_px(canvas);
        self.dispatch(Command::SetViewport(width, height));
    }

    /// Drop the status message once it has been up long enough. Returns
    /// true if it was removed.
    pub fn expire_hud(&mut self) -> bool {
        if self.hud.as_ref().is_some_and(HudMessage::is_expired) {
            self.hud = None;
            return true;
        }
        false
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let [title, canvas, hud, hints] = screen_layout(f.area());

        f.render_widget(Paragraph::new(self.title_line()), title);

        if let Some(raster) = self.raster.as_deref() {
            let zoom = self.state.zoom();
            let selection = self.state.selection().visible_rect();
            f.render_widget(
                PageCanvas::new(raster)
                    .pan(zoom.pan_x, zoom.pan_y)
                    .selection(selection)
                    .background(OCEANIC_NEXT.base_00),
                canvas,
            );
        } else {
            let waiting = if self.service.is_some() {
                "Loading…"
            } else {
                "No document"
            };
            f.render_widget(
                Paragraph::new(waiting)
                    .style(Style::default().fg(OCEANIC_NEXT.base_03))
                    .alignment(Alignment::Center),
                canvas,
            );
        }

        if let Some(message) = &self.hud {
            f.render_widget(Paragraph::new(message.styled_line(&OCEANIC_NEXT)), hud);
        }

        f.render_widget(Paragraph::new(self.hint_line()), hints);

        if let Some(alert) = &self.alert {
            alert.render(f, f.area());
        }
    }

    fn title_line(&self) -> Line<'static> {
        let accent = Style::default()
            .fg(OCEANIC_NEXT.base_0d)
            .add_modifier(Modifier::BOLD);
        let normal = Style::default().fg(OCEANIC_NEXT.base_05);
        let separator = Span::styled(" │ ", Style::default().fg(OCEANIC_NEXT.base_03));

        let name = self
            .state
            .document()
            .and_then(|info| info.title.clone())
            .or_else(|| self.doc_name.clone())
            .unwrap_or_else(|| "pdfsnip".to_string());

        let mut spans = vec![
            Span::styled(format!(" {name}"), accent),
            separator.clone(),
            Span::styled(self.state.page_label(), normal),
            separator.clone(),
            Span::styled(
                format!("Zoom {:.0}%", self.state.zoom().factor() * 100.0),
                normal,
            ),
            separator.clone(),
            Span::styled(
                format!(
                    "svgopt {}",
                    if self.state.optimize() { "on" } else { "off" }
                ),
                normal,
            ),
        ];

        if let (Some(rect), Some(context)) = (
            self.state.selection().visible_rect(),
            self.state.context(),
        ) {
            let points = to_page_space(rect, context.scale);
            spans.push(separator);
            spans.push(Span::styled(
                format!(
                    "Selection {:.0}×{:.0} px ({:.1}×{:.1} pt)",
                    rect.width, rect.height, points.width, points.height
                ),
                Style::default().fg(OCEANIC_NEXT.base_0c),
            ));
        }

        Line::from(spans)
    }

    fn hint_line(&self) -> Line<'static> {
        let enabled = Style::default().fg(OCEANIC_NEXT.base_05);
        let disabled = Style::default().fg(OCEANIC_NEXT.base_02);
        let pick = |on: bool| if on { enabled } else { disabled };

        let export = if self.state.is_exporting() {
            Span::styled(
                "exporting…",
                Style::default()
                    .fg(OCEANIC_NEXT.base_0a)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::styled("[s] export", pick(self.state.export_enabled()))
        };

        Line::from(vec![
            Span::styled(" [p] prev", pick(self.state.has_prev_page())),
            Span::raw("  "),
            Span::styled("[n] next", pick(self.state.has_next_page())),
            Span::raw("  "),
            Span::styled("[+/-/0] zoom  [hjkl] pan  ", enabled),
            export,
            Span::raw("  "),
            Span::styled("[o] svgopt  [Esc] clear  [q] quit", enabled),
        ])
    }
}

fn screen_layout(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    let mut first_render = true;
    loop {
        let mut events_processed = 0;
        let mut should_quit = false;

        let size = terminal.size()?;
        app.sync_layout(Rect::new(0, 0, size.width, size.height));

        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;
            if app.handle_event(&event) == Some(AppAction::Quit) {
                should_quit = true;
                break;
            }
        }

        let worker_updates = app.poll_worker();
        let hud_expired = app.expire_hud();

        if first_render || events_processed > 0 || worker_updates || hud_expired {
            first_render = false;
            terminal.draw(|f| app.draw(f))?;
        }

        if should_quit {
            return Ok(());
        }

        // If no events were processed, wait a bit to avoid busy-waiting
        if events_processed == 0 {
            let _ = event_source.poll(tick_rate)?;
        }
    }
}
