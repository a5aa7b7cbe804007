//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::flags::parse_bool_flag;
use crate::geometry::{PixelRect, RenderScale};

/// Select a region of a PDF page and export it as SVG
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// PDF to open in the viewer
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by the viewer and the headless export
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Run exports through the optimizer (1, true or yes to enable)
    #[arg(long, value_name = "VALUE", value_parser = parse_svgopt)]
    pub svgopt: Option<bool>,

    /// Directory exports are written to
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Export a region of a page without the viewer
    #[command(visible_alias = "x")]
    Export {
        #[command(flatten)]
        args: ExportArgs,
    },
}

/// Headless export arguments
#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// PDF to export from
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Selection in canvas pixels as X,Y,W,H
    #[arg(short, long, value_parser = parse_rect)]
    pub rect: PixelRect,

    /// Canvas pixels per page point the rectangle was measured at
    #[arg(short, long, default_value = "1", value_parser = parse_scale)]
    pub scale: RenderScale,

    /// Print the SVG instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

fn parse_svgopt(value: &str) -> Result<bool, String> {
    Ok(parse_bool_flag(value))
}

/// Parse `X,Y,W,H`
pub fn parse_rect(value: &str) -> Result<PixelRect, String> {
    let numbers = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid number {part:?}: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match numbers[..] {
        [x, y, width, height] if numbers.iter().all(|n| n.is_finite()) => {
            if width < 0.0 || height < 0.0 {
                return Err("width and height must not be negative".to_string());
            }
            Ok(PixelRect::new(x, y, width, height))
        }
        [_, _, _, _] => Err("coordinates must be finite".to_string()),
        _ => Err(format!(
            "expected X,Y,W,H but got {} value(s)",
            numbers.len()
        )),
    }
}

fn parse_scale(value: &str) -> Result<RenderScale, String> {
    let scale: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid scale {value:?}: {e}"))?;
    RenderScale::new(scale).ok_or_else(|| format!("scale must be positive, got {scale}"))
}
