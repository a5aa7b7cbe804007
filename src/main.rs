use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use crossterm::{
    event::EnableMouseCapture,
    execute,
    terminal::{EnterAlternateScreen, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use pdfsnip::cli::{Cli, CommonArgs, Commands};
use pdfsnip::event_source::KeyboardEventSource;
use pdfsnip::export::ExportConfig;
use pdfsnip::pdf::ViewerState;
use pdfsnip::settings::{self, APP_NAME, Settings};
use pdfsnip::{App, headless, panic_handler, run_app_with_event_source};

fn log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(APP_NAME))
        .filter(|dir| fs::create_dir_all(dir).is_ok())
        .map(|dir| dir.join(format!("{APP_NAME}.log")))
        .unwrap_or_else(|| PathBuf::from(format!("{APP_NAME}.log")))
}

fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let file =
        File::create(path).with_context(|| format!("Could not create log file {path:?}"))?;
    WriteLogger::init(level, Config::default(), file)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Some(Commands::Export { args }) => args.common.verbose,
        None => cli.common.verbose,
    };
    let log_file = log_path();
    init_logging(&log_file, verbose)?;
    info!("Starting {APP_NAME} {}", env!("CARGO_PKG_VERSION"));

    settings::load_settings();
    let settings = settings::get_settings();

    match cli.command {
        Some(Commands::Export { args }) => {
            let stdout = io::stdout();
            headless::run_export(&args, &settings, &mut stdout.lock())
        }
        None => match cli.file {
            Some(file) => run_viewer(&file, &cli.common, &settings, log_file),
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        },
    }
}

fn run_viewer(
    file: &Path,
    common: &CommonArgs,
    settings: &Settings,
    log_file: PathBuf,
) -> Result<()> {
    let optimize = common.svgopt.unwrap_or(settings.optimize);
    let output_dir = common
        .output_dir
        .clone()
        .or_else(|| settings.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let export = ExportConfig::new(output_dir, settings.optimizer.as_str());

    let mut app = App::new(ViewerState::new(settings.zoom, optimize), export);
    if common.svgopt.is_some() {
        // Command-line override is for this session only
        app = app.without_persistence();
    }
    app.open_document(file);

    panic_handler::initialize_panic_handler(log_file);

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app_with_event_source(&mut terminal, &mut app, &mut KeyboardEventSource);

    panic_handler::restore_terminal();

    if let Err(err) = &res {
        error!("Application error: {err:?}");
    }

    info!("Shutting down {APP_NAME}");
    res
}
