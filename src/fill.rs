//! Fill a PDF form through an external engine
//!
//! A fill runs linearly: encode the form as FDF inside a scratch workspace,
//! let the engine produce the filled PDF there, then move the result to the
//! destination. The workspace is removed on every exit path.

use std::path::{Path, PathBuf};

use log::info;

use crate::engine::{CommandEngine, EngineJob, FillEngine};
use crate::error::{Error, Result};
use crate::fdf::write_fdf;
use crate::finalize::finalize;
use crate::form::Form;
use crate::workspace::ScratchWorkspace;

/// Options for a fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Replace an existing destination file
    pub overwrite: bool,
    /// Turn fields into static, non-editable page content
    pub flatten: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            overwrite: true,
            flatten: true,
        }
    }
}

/// Fills forms with a configured engine
///
/// # Example
///
/// ```no_run
/// use pdf_fill::{CommandEngine, Form, FormFiller, Options};
///
/// let filler = FormFiller::new(CommandEngine::pdftk()).with_scratch_dir("/var/tmp");
///
/// let mut form = Form::new();
/// form.insert("name", "Alice");
///
/// filler
///     .fill(&form, "w9.pdf", "w9-filled.pdf", &Options::default())
///     .expect("Failed to fill form");
/// ```
#[derive(Debug, Clone)]
pub struct FormFiller<E> {
    engine: E,
    scratch_dir: Option<PathBuf>,
}

impl<E: FillEngine> FormFiller<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            scratch_dir: None,
        }
    }

    /// Create scratch workspaces under `dir` instead of the OS temp directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Fill `source` with `form` and write the result to `dest`
    pub fn fill(
        &self,
        form: &Form,
        source: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        options: &Options,
    ) -> Result<()> {
        let source = absolute(source.as_ref())?;
        let dest = absolute(dest.as_ref())?;

        let exists = source
            .try_exists()
            .map_err(|e| Error::io("failed to check if form PDF file exists", e))?;
        if !exists {
            return Err(Error::SourceNotFound(source));
        }

        let workspace = ScratchWorkspace::create(self.scratch_dir.as_deref())?;
        let data = workspace.data_path();
        let output = workspace.output_path();

        write_fdf(form, &data)?;

        let job = EngineJob {
            source: &source,
            data: &data,
            output: &output,
            flatten: options.flatten,
            workdir: workspace.path(),
        };
        let status = self.engine.fill(&job).map_err(|e| Error::EngineLaunch {
            program: self.engine.name(),
            source: e,
        })?;
        if !status.is_success() {
            return Err(Error::EngineFailed {
                code: status.code,
                stderr: status.stderr,
            });
        }

        finalize(&output, &dest, options.overwrite)?;
        workspace.close();

        info!(
            "Filled {} field(s) from {} into {}",
            form.len(),
            source.display(),
            dest.display()
        );
        Ok(())
    }
}

impl Default for FormFiller<CommandEngine> {
    fn default() -> Self {
        Self::new(CommandEngine::default())
    }
}

/// Fill a form with the default engine (`java -jar mcpdf.jar`)
///
/// `options` defaults to overwriting the destination and flattening.
///
/// # Example
///
/// ```no_run
/// use pdf_fill::{fill, Form};
///
/// let form: Form = [("name", "Alice"), ("city", "Springfield")].into_iter().collect();
/// fill(&form, "application.pdf", "application-filled.pdf", None).expect("Failed to fill");
/// ```
pub fn fill(
    form: &Form,
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: Option<Options>,
) -> Result<()> {
    FormFiller::<CommandEngine>::default().fill(form, source, dest, &options.unwrap_or_default())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| Error::AbsolutePath {
        path: path.to_path_buf(),
        source: e,
    })
}
