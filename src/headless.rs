//! Export without the viewer, on the calling thread

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use log::info;

use crate::cli::ExportArgs;
use crate::export::{ExportConfig, ExportJob, MupdfSource, export_region};
use crate::optimizer::SvgoOptimizer;
use crate::pdf::worker::{document_info, open_document};
use crate::settings::Settings;

/// Export the region described by `args`. Writes either the SVG itself
/// (`--stdout`) or the path of the written file to `out`.
pub fn run_export(args: &ExportArgs, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let doc = open_document(&args.file)
        .with_context(|| format!("Could not open {}", args.file.display()))?;
    let info = document_info(&doc)
        .with_context(|| format!("Could not read {}", args.file.display()))?;

    let page = args.page as usize;
    if page == 0 || page > info.page_count {
        bail!(
            "Page {page} is out of range, {} has {} page(s)",
            args.file.display(),
            info.page_count
        );
    }

    let job = ExportJob {
        page: page - 1,
        selection: args.rect,
        scale: args.scale,
        optimize: args.common.svgopt.unwrap_or(settings.optimize),
    };
    info!("Headless export: {job:?}");

    if args.stdout {
        let optimizer = SvgoOptimizer::new(settings.optimizer.as_str());
        let artifact = export_region(&MupdfSource::new(&doc), &job, &optimizer)?;
        out.write_all(artifact.contents.as_bytes())?;
    } else {
        let output_dir = args
            .common
            .output_dir
            .clone()
            .or_else(|| settings.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        let config = ExportConfig::new(output_dir, settings.optimizer.as_str());
        let path = config.run(&MupdfSource::new(&doc), &job)?;
        writeln!(out, "{}", path.display())?;
    }

    Ok(())
}
