use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, PanicHookInfo};
use std::path::PathBuf;

use crossterm::{
    cursor::Show,
    event::DisableMouseCapture,
    execute,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};
use log::error;

/// Install better-panic behind a hook that first hands the terminal back and
/// records the panic in the log file at `log_path`.
pub fn initialize_panic_handler(log_path: PathBuf) {
    better_panic::Settings::auto()
        .most_recent_first(false)
        .lineno_suffix(true)
        .install();

    let report = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        error!("{}", describe_panic(info));

        report(info);
        eprintln!("Log: {}", log_path.display());

        std::process::exit(1);
    }));
}

/// Undo everything the viewer did to the terminal: raw mode, the alternate
/// screen, mouse capture for drag selection, the hidden cursor.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture, Show);
    let _ = writeln!(stdout);
}

fn describe_panic(info: &PanicHookInfo<'_>) -> String {
    let place = info
        .location()
        .map(|loc| format!(" at {}:{}", loc.file(), loc.line()))
        .unwrap_or_default();
    format!("Panic{place}: {}", payload_text(info.payload()))
}

fn payload_text(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_text_reads_both_string_kinds() {
        let literal: Box<dyn Any + Send> = Box::new("raster too large");
        let formatted: Box<dyn Any + Send> = Box::new(format!("page {}", 3));
        let other: Box<dyn Any + Send> = Box::new(42_u32);

        assert_eq!(payload_text(literal.as_ref()), "raster too large");
        assert_eq!(payload_text(formatted.as_ref()), "page 3");
        assert_eq!(payload_text(other.as_ref()), "non-string panic payload");
    }
}
