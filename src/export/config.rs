use std::path::PathBuf;

use super::exporter::{ExportError, ExportJob, VectorSource, export_region};
use super::sink::{DeliverySink, DirectorySink};
use crate::optimizer::SvgoOptimizer;

/// Where exports go and which optimizer runs on them.
///
/// Shared by the interactive worker and the headless command so both take
/// the same path from selection to file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    /// Optimizer program, looked up on `PATH` unless absolute
    pub optimizer: String,
}

impl ExportConfig {
    pub fn new(output_dir: impl Into<PathBuf>, optimizer: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            optimizer: optimizer.into(),
        }
    }

    /// Export and deliver one selection, returning the written path
    pub fn run(&self, source: &dyn VectorSource, job: &ExportJob) -> Result<PathBuf, ExportError> {
        let optimizer = SvgoOptimizer::new(self.optimizer.as_str());
        let artifact = export_region(source, job, &optimizer)?;
        DirectorySink::new(&self.output_dir).deliver(&artifact)
    }
}
