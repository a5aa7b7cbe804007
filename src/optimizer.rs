//! Optional post-processing of exported markup by an external SVG optimizer
//!
//! Off-frame path removal is best effort: the optimizer decides what it
//! considers off canvas, and nothing here checks that every shape outside
//! the selection is gone. Do not rely on it to keep content confidential.

use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::string::FromUtf8Error;

use log::{debug, info};

/// Optimizer passes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plugin {
    /// The optimizer's default rule set
    PresetDefault,
    /// Drop paths lying entirely outside the `viewBox`
    RemoveOffCanvasPaths,
}

impl Plugin {
    #[must_use]
    pub fn svgo_name(self) -> &'static str {
        match self {
            Plugin::PresetDefault => "preset-default",
            Plugin::RemoveOffCanvasPaths => "removeOffCanvasPaths",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptimizeOptions {
    pub plugins: Vec<Plugin>,
}

impl OptimizeOptions {
    /// Default rules plus off-frame path removal
    #[must_use]
    pub fn region_export() -> Self {
        Self {
            plugins: vec![Plugin::PresetDefault, Plugin::RemoveOffCanvasPaths],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("could not start optimizer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("optimizer I/O: {0}")]
    Io(#[from] io::Error),

    #[error("optimizer exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("optimizer produced invalid UTF-8: {0}")]
    NotUtf8(#[from] FromUtf8Error),
}

pub trait Optimizer {
    fn optimize(&self, markup: &str, options: &OptimizeOptions) -> Result<String, OptimizeError>;
}

/// Runs the `svgo` command line tool, markup in on stdin and out on stdout
#[derive(Clone, Debug)]
pub struct SvgoOptimizer {
    program: String,
}

impl SvgoOptimizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// ES module config understood by `svgo --config`
    #[must_use]
    pub fn config_source(options: &OptimizeOptions) -> String {
        let plugins: Vec<String> = options
            .plugins
            .iter()
            .map(|plugin| format!("'{}'", plugin.svgo_name()))
            .collect();
        format!("export default {{\n  plugins: [{}],\n}};\n", plugins.join(", "))
    }
}

impl Optimizer for SvgoOptimizer {
    fn optimize(&self, markup: &str, options: &OptimizeOptions) -> Result<String, OptimizeError> {
        let mut config = tempfile::Builder::new()
            .prefix("pdfsnip-svgo-")
            .suffix(".mjs")
            .tempfile()?;
        config.write_all(Self::config_source(options).as_bytes())?;
        config.flush()?;

        debug!(
            "Running {} with config {}",
            self.program,
            config.path().display()
        );

        let mut child = Command::new(&self.program)
            .arg("--config")
            .arg(config.path())
            .args(["-i", "-", "-o", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| OptimizeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from another thread so a large result cannot fill the
        // stdout pipe while we are still writing
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("optimizer stdin unavailable"))?;
        let input = markup.to_owned();
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;
        let write_result = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("optimizer stdin writer panicked")));

        if !output.status.success() {
            return Err(OptimizeError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        write_result?;

        let optimized = String::from_utf8(output.stdout)?;
        info!(
            "Optimizer reduced markup from {} to {} bytes",
            markup.len(),
            optimized.len()
        );
        Ok(optimized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_export_config_lists_both_plugins_in_order() {
        let source = SvgoOptimizer::config_source(&OptimizeOptions::region_export());
        assert_eq!(
            source,
            "export default {\n  plugins: ['preset-default', 'removeOffCanvasPaths'],\n};\n"
        );
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let optimizer = SvgoOptimizer::new("/nonexistent/pdfsnip-svgo");
        let err = optimizer
            .optimize("<svg/>", &OptimizeOptions::region_export())
            .unwrap_err();
        assert!(matches!(err, OptimizeError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/pdfsnip-svgo"));
    }

    #[cfg(unix)]
    fn script(dir: &tempfile::TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-svgo");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[test]
    fn output_is_read_from_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let optimizer = SvgoOptimizer::new(script(&dir, "tr -d '\\n'"));

        let out = optimizer
            .optimize("<svg>\n<g/>\n</svg>\n", &OptimizeOptions::region_export())
            .unwrap();

        assert_eq!(out, "<svg><g/></svg>");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let optimizer = SvgoOptimizer::new(script(&dir, "cat >/dev/null\necho 'bad plugin' >&2\nexit 3"));

        let err = optimizer
            .optimize("<svg/>", &OptimizeOptions::region_export())
            .unwrap_err();

        match err {
            OptimizeError::Failed { status, stderr } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "bad plugin");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
