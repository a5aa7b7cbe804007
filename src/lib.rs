// Export modules for use in tests
pub mod app;
pub mod cli;
pub mod event_source;
pub mod export;
pub mod flags;
pub mod geometry;
pub mod headless;
pub mod optimizer;
pub mod panic_handler;
pub mod pdf;
pub mod settings;
pub mod svg;
pub mod theme;
pub mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main app components
pub use app::{App, AppAction, run_app_with_event_source};
