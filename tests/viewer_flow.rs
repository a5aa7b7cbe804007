use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pdfsnip::event_source::{EventSource, SimulatedEventSource};
use pdfsnip::export::ExportConfig;
use pdfsnip::pdf::{SelectionState, ViewerState};
use pdfsnip::svg::VectorDocument;
use pdfsnip::test_utils::test_helpers::{
    FIXTURE_TITLE, TestScenarioBuilder, capture_terminal_state, create_test_terminal,
    minimal_pdf,
};
use pdfsnip::{App, run_app_with_event_source};
use ratatui::layout::Rect;

const TIMEOUT: Duration = Duration::from_secs(10);
const WIDTH: u16 = 80;
const HEIGHT: u16 = 30;

fn write_fixture(dir: &Path, pages: usize) -> PathBuf {
    let path = dir.join("fixture.pdf");
    fs::write(&path, minimal_pdf(pages)).unwrap();
    path
}

/// App with the fixture open and its first page on screen
fn loaded_app(dir: &Path, pages: usize) -> App {
    loaded_app_in(dir, pages, Rect::new(0, 0, WIDTH, HEIGHT))
}

fn loaded_app_in(dir: &Path, pages: usize, screen: Rect) -> App {
    let pdf = write_fixture(dir, pages);
    let export = ExportConfig::new(dir.join("out"), "pdfsnip-test-no-optimizer");
    let mut app = App::new(ViewerState::default(), export).without_persistence();
    app.sync_layout(screen);
    app.open_document(&pdf);

    assert!(
        app.pump_until(TIMEOUT, |app| app.raster().is_some()),
        "first page never rendered"
    );
    app
}

fn feed(app: &mut App, mut source: SimulatedEventSource) {
    while source.poll(Duration::ZERO).unwrap() {
        let event = source.read().unwrap();
        let _ = app.handle_event(&event);
    }
}

#[test]
fn first_page_renders_to_fit_the_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let app = loaded_app(dir.path(), 2);

    let raster = app.raster().unwrap();
    let canvas = app.canvas_area();
    assert_eq!(raster.page, 0);
    assert!(raster.width_px <= u32::from(canvas.width));
    assert!(raster.height_px <= u32::from(canvas.height) * 2 + 1);
    assert_eq!(app.state().page_label(), "Page: 1 / 2");
    assert_eq!(
        app.state().document().and_then(|info| info.title.clone()),
        Some(FIXTURE_TITLE.to_string())
    );
}

#[test]
fn title_bar_and_hints_are_drawn() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 2);
    let mut terminal = create_test_terminal(WIDTH, HEIGHT);

    terminal.draw(|f| app.draw(f)).unwrap();
    let screen = capture_terminal_state(&terminal);

    assert!(screen.contains(FIXTURE_TITLE));
    assert!(screen.contains("Page: 1 / 2"));
    assert!(screen.contains("svgopt off"));
    assert!(screen.contains("[s] export"));
    assert!(screen.contains('▀'));
}

#[test]
fn next_page_renders_second_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 2);

    feed(&mut app, TestScenarioBuilder::new().next_page().build());
    assert!(app.pump_until(TIMEOUT, |app| app.raster().is_some_and(|r| r.page == 1)));
    assert_eq!(app.state().page_label(), "Page: 2 / 2");

    // Clamped at the last page
    feed(&mut app, TestScenarioBuilder::new().next_page().build());
    assert_eq!(app.state().current_page(), 1);
}

#[test]
fn drag_selects_region_in_canvas_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 1);
    let canvas = app.canvas_area();

    feed(
        &mut app,
        TestScenarioBuilder::new()
            .drag((canvas.x + 10, canvas.y + 4), (canvas.x + 50, canvas.y + 19))
            .build(),
    );

    let rect = app.state().selection().finalized().unwrap();
    assert_eq!((rect.x, rect.y, rect.width, rect.height), (10.0, 8.0, 40.0, 30.0));
    assert!(app.state().export_enabled());
}

#[test]
fn drag_cannot_start_beside_the_page() {
    let dir = tempfile::tempdir().unwrap();
    // Wide screen: the page is height-bound and leaves empty columns
    let mut app = loaded_app_in(dir.path(), 1, Rect::new(0, 0, 120, HEIGHT));
    let canvas = app.canvas_area();
    let raster_width = app.raster().unwrap().width_px as u16;
    assert!(raster_width < canvas.width);

    feed(
        &mut app,
        TestScenarioBuilder::new()
            .drag(
                (canvas.x + raster_width + 5, canvas.y + 4),
                (canvas.x + 20, canvas.y + 19),
            )
            .build(),
    );
    assert_eq!(*app.state().selection(), SelectionState::Idle);

    feed(
        &mut app,
        TestScenarioBuilder::new()
            .drag(
                (canvas.x + raster_width - 1, canvas.y + 4),
                (canvas.x + 20, canvas.y + 19),
            )
            .build(),
    );
    assert!(app.state().selection().finalized().is_some());
}

#[test]
fn escape_clears_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 1);
    let canvas = app.canvas_area();

    feed(
        &mut app,
        TestScenarioBuilder::new()
            .drag((canvas.x + 10, canvas.y + 4), (canvas.x + 50, canvas.y + 19))
            .press_esc()
            .build(),
    );

    assert_eq!(*app.state().selection(), SelectionState::Idle);
    assert!(!app.state().export_enabled());
}

#[test]
fn previous_page_drops_selection_and_renders() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 2);
    let canvas = app.canvas_area();

    feed(&mut app, TestScenarioBuilder::new().next_page().build());
    assert!(app.pump_until(TIMEOUT, |app| app.raster().is_some_and(|r| r.page == 1)));
    feed(
        &mut app,
        TestScenarioBuilder::new()
            .drag((canvas.x + 10, canvas.y + 4), (canvas.x + 50, canvas.y + 19))
            .prev_page()
            .build(),
    );

    assert_eq!(*app.state().selection(), SelectionState::Idle);
    assert!(app.pump_until(TIMEOUT, |app| app.raster().is_some_and(|r| r.page == 0)));
    assert_eq!(app.state().page_label(), "Page: 1 / 2");
}

#[test]
fn opening_another_document_forgets_the_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 1);
    let canvas = app.canvas_area();
    feed(
        &mut app,
        TestScenarioBuilder::new()
            .drag((canvas.x + 10, canvas.y + 4), (canvas.x + 50, canvas.y + 19))
            .build(),
    );
    assert!(app.state().export_enabled());

    let other = dir.path().join("other.pdf");
    fs::write(&other, minimal_pdf(3)).unwrap();
    app.open_document(&other);

    assert_eq!(*app.state().selection(), SelectionState::Idle);
    assert_eq!(app.state().context(), None);
    assert!(app.raster().is_none());
    assert!(!app.state().export_enabled());

    assert!(app.pump_until(TIMEOUT, |app| app.raster().is_some()));
    assert_eq!(app.state().page_label(), "Page: 1 / 3");
}

#[test]
fn click_without_drag_selects_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 1);
    let canvas = app.canvas_area();

    feed(
        &mut app,
        TestScenarioBuilder::new()
            .drag((canvas.x + 10, canvas.y + 4), (canvas.x + 12, canvas.y + 5))
            .build(),
    );

    assert_eq!(*app.state().selection(), SelectionState::Idle);
    assert!(!app.state().export_enabled());
}

#[test]
fn export_without_selection_shows_hint() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 1);

    feed(&mut app, TestScenarioBuilder::new().export().build());

    assert_eq!(app.hud_message(), Some("Select a region first"));
    assert!(!app.state().is_exporting());
}

#[test]
fn export_writes_svg_framed_on_the_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 1);
    let canvas = app.canvas_area();
    let scale = app.state().context().unwrap().scale.get();

    feed(
        &mut app,
        TestScenarioBuilder::new()
            .drag((canvas.x + 10, canvas.y + 4), (canvas.x + 50, canvas.y + 19))
            .export()
            .build(),
    );
    assert!(app.state().is_exporting());

    assert!(app.pump_until(TIMEOUT, |app| !app.state().is_exporting()));
    assert_eq!(app.alert(), None);

    let path = dir.path().join("out").join("page-1-selection.svg");
    assert_eq!(
        app.hud_message().map(str::to_string),
        Some(format!("Saved {}", path.display()))
    );

    let svg = fs::read_to_string(&path).unwrap();
    let doc = VectorDocument::parse(&svg).unwrap();
    let view_box: Vec<f64> = doc
        .frame()
        .unwrap()
        .split(' ')
        .map(|n| n.parse().unwrap())
        .collect();
    let expected = [10.0 / scale, 8.0 / scale, 40.0 / scale, 30.0 / scale];
    for (actual, expected) in view_box.iter().zip(expected) {
        assert!((actual - expected).abs() < 1e-9, "{view_box:?}");
    }
    assert_eq!(
        doc.root().attribute("width"),
        Some(format!("{}pt", 40.0 / scale).as_str())
    );
}

#[test]
fn failed_export_raises_alert_until_dismissed() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 1);
    let canvas = app.canvas_area();

    // Optimizer program does not exist
    feed(
        &mut app,
        TestScenarioBuilder::new()
            .press_char('o')
            .drag((canvas.x + 10, canvas.y + 4), (canvas.x + 50, canvas.y + 19))
            .export()
            .build(),
    );
    assert!(app.pump_until(TIMEOUT, |app| app.alert().is_some()));
    assert!(app.alert().unwrap().starts_with("Export failed"));
    assert!(!dir.path().join("out").join("page-1-selection.svg").exists());

    // Keys other than dismiss are swallowed
    feed(&mut app, TestScenarioBuilder::new().press_char('n').build());
    assert!(app.alert().is_some());

    feed(&mut app, TestScenarioBuilder::new().press_enter().build());
    assert_eq!(app.alert(), None);
    assert!(app.state().export_enabled());
}

#[test]
fn missing_file_raises_alert() {
    let dir = tempfile::tempdir().unwrap();
    let export = ExportConfig::new(dir.path(), "svgo");
    let mut app = App::new(ViewerState::default(), export).without_persistence();
    app.sync_layout(Rect::new(0, 0, WIDTH, HEIGHT));
    app.open_document(&dir.path().join("missing.pdf"));

    assert!(app.pump_until(TIMEOUT, |app| app.alert().is_some()));
    assert!(app.alert().unwrap().starts_with("Could not open document"));
    assert_eq!(app.state().page_label(), "Page: - / -");
}

#[test]
fn run_loop_draws_selection_size() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = loaded_app(dir.path(), 1);
    let canvas = app.canvas_area();
    let mut terminal = create_test_terminal(WIDTH, HEIGHT);

    let mut events = TestScenarioBuilder::new()
        .drag((canvas.x + 10, canvas.y + 4), (canvas.x + 50, canvas.y + 19))
        .quit()
        .build();
    run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();

    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains("Selection 40×30 px"), "{screen}");
}
