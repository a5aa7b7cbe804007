use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

use super::exporter::{Artifact, ExportError};

/// Final destination of an exported artifact
pub trait DeliverySink {
    /// Store the artifact, returning where it ended up
    fn deliver(&self, artifact: &Artifact) -> Result<PathBuf, ExportError>;
}

/// Saves artifacts into a directory under their own name, replacing any
/// previous file of that name. The contents are written to a temporary file
/// first, so an interrupted write never leaves a truncated artifact.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn delivery_error(path: &Path) -> impl Fn(io::Error) -> ExportError + '_ {
    move |source| ExportError::Delivery {
        path: path.to_path_buf(),
        source,
    }
}

impl DeliverySink for DirectorySink {
    fn deliver(&self, artifact: &Artifact) -> Result<PathBuf, ExportError> {
        let target = self.dir.join(&artifact.name);

        fs::create_dir_all(&self.dir).map_err(delivery_error(&self.dir))?;
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(delivery_error(&target))?;
        staged
            .write_all(artifact.contents.as_bytes())
            .and_then(|()| staged.flush())
            .map_err(delivery_error(&target))?;
        staged
            .persist(&target)
            .map_err(|err| delivery_error(&target)(err.error))?;

        info!(
            "Saved {} ({}, {} bytes) to {}",
            artifact.name,
            artifact.mime,
            artifact.contents.len(),
            target.display()
        );
        Ok(target)
    }
}
