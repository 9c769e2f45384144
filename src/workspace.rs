//! Per-invocation scratch directory

use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;

use crate::error::{Error, Result};

const PREFIX: &str = "pdf-fill-";

/// Uniquely named directory owned by a single fill
///
/// Holds the FDF document and the engine's raw output. The directory is
/// removed on [`close`](Self::close) or drop; removal failures are logged
/// and otherwise ignored.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchWorkspace {
    /// Create a workspace under `base`, or the OS temp directory if `None`
    pub fn create(base: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX);
        let dir = match base {
            Some(base) => builder.tempdir_in(base),
            None => builder.tempdir(),
        }
        .map_err(|e| Error::io("failed to create temporary directory", e))?;

        let path = dir.path().to_path_buf();
        debug!("Created scratch workspace {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the FDF document
    pub fn data_path(&self) -> PathBuf {
        self.path.join("data.fdf")
    }

    /// Location the engine writes the filled PDF to
    pub fn output_path(&self) -> PathBuf {
        self.path.join("output.pdf")
    }

    /// Remove the workspace now
    pub fn close(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!("Removed scratch workspace {}", self.path.display()),
                Err(e) => warn!(
                    "failed to remove temporary directory '{}': {}",
                    self.path.display(),
                    e
                ),
            }
        }
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        self.remove();
    }
}
