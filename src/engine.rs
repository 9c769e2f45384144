//! External form filling engines
//!
//! The actual PDF work (field filling and flattening) is done by an external
//! tool. [`FillEngine`] is the seam: [`CommandEngine`] drives a real tool as a
//! subprocess, tests substitute their own implementation.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

/// One engine invocation
#[derive(Debug, Clone, Copy)]
pub struct EngineJob<'a> {
    /// Absolute path of the fillable source PDF
    pub source: &'a Path,
    /// FDF document with the field values
    pub data: &'a Path,
    /// Where the engine must write the filled PDF
    pub output: &'a Path,
    /// Whether fields should be flattened into page content
    pub flatten: bool,
    /// Working directory for the engine (the scratch workspace)
    pub workdir: &'a Path,
}

/// Outcome of an engine run that managed to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStatus {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    /// Diagnostic output captured from the engine
    pub stderr: String,
}

impl EngineStatus {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn failure(code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Something that can fill a PDF form from an FDF document
pub trait FillEngine {
    /// Run the engine for `job`
    ///
    /// An `Err` means the engine could not be started at all.
    fn fill(&self, job: &EngineJob<'_>) -> io::Result<EngineStatus>;

    /// Name used in error messages
    fn name(&self) -> String;
}

impl<E: FillEngine + ?Sized> FillEngine for &E {
    fn fill(&self, job: &EngineJob<'_>) -> io::Result<EngineStatus> {
        (**self).fill(job)
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

impl<E: FillEngine + ?Sized> FillEngine for Box<E> {
    fn fill(&self, job: &EngineJob<'_>) -> io::Result<EngineStatus> {
        (**self).fill(job)
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// Command line conventions of the supported engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineDialect {
    /// `fill_form <src> data <fdf> output <out> [flatten]`
    Mcpdf,
    /// `<src> fill_form <fdf> output <out> [flatten]`
    Pdftk,
}

/// Engine that runs an external program as a subprocess
///
/// The subprocess runs inside the scratch workspace, so a relative program
/// path (one with a directory part) and the mcpdf jar are made absolute
/// against the current directory when the engine is built. Bare program
/// names are left for the search path. Leading arguments are passed as given.
///
/// # Example
///
/// ```no_run
/// use pdf_fill::engine::CommandEngine;
///
/// // java -jar /opt/mcpdf/mcpdf.jar fill_form ...
/// let engine = CommandEngine::mcpdf("/opt/mcpdf/mcpdf.jar");
///
/// // pdftk <src> fill_form ...
/// let engine = CommandEngine::pdftk();
/// ```
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: OsString,
    leading_args: Vec<OsString>,
    dialect: EngineDialect,
}

impl CommandEngine {
    /// Run `program` directly, passing arguments in `dialect` form
    pub fn new(program: impl Into<OsString>, dialect: EngineDialect) -> Self {
        Self {
            program: resolve_program(program.into()),
            leading_args: Vec::new(),
            dialect,
        }
    }

    /// mcpdf through `java -jar <jar>`
    pub fn mcpdf(jar: impl Into<PathBuf>) -> Self {
        let jar = absolute_or_unchanged(jar.into());
        Self::new("java", EngineDialect::Mcpdf)
            .with_leading_args([OsString::from("-jar"), jar.into_os_string()])
    }

    /// pdftk from the search path
    pub fn pdftk() -> Self {
        Self::new("pdftk", EngineDialect::Pdftk)
    }

    /// Replace the executable, keeping dialect and leading arguments
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = resolve_program(program.into());
        self
    }

    /// Arguments placed before the operation arguments
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn dialect(&self) -> EngineDialect {
        self.dialect
    }

    /// Full argument vector (without the program) for `job`
    pub fn arguments(&self, job: &EngineJob<'_>) -> Vec<OsString> {
        let mut args = self.leading_args.clone();
        match self.dialect {
            EngineDialect::Mcpdf => {
                args.push("fill_form".into());
                args.push(job.source.into());
                args.push("data".into());
                args.push(job.data.into());
            }
            EngineDialect::Pdftk => {
                args.push(job.source.into());
                args.push("fill_form".into());
                args.push(job.data.into());
            }
        }
        args.push("output".into());
        args.push(job.output.into());
        if job.flatten {
            args.push("flatten".into());
        }
        args
    }
}

/// Make a program path with a directory part absolute
fn resolve_program(program: OsString) -> OsString {
    let path = PathBuf::from(program);
    if path.is_relative() && path.components().count() > 1 {
        absolute_or_unchanged(path).into_os_string()
    } else {
        path.into_os_string()
    }
}

/// Resolve against the current directory, keeping `path` if that fails
fn absolute_or_unchanged(path: PathBuf) -> PathBuf {
    match std::path::absolute(&path) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!("cannot resolve '{}': {}", path.display(), e);
            path
        }
    }
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::mcpdf("mcpdf.jar")
    }
}

impl FillEngine for CommandEngine {
    fn fill(&self, job: &EngineJob<'_>) -> io::Result<EngineStatus> {
        let args = self.arguments(job);
        debug!(
            "Running {} {:?} in {}",
            self.program.to_string_lossy(),
            args,
            job.workdir.display()
        );

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(job.workdir)
            .output()?;

        if output.status.success() {
            return Ok(EngineStatus::success());
        }

        let mut diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        if diagnostics.trim().is_empty() {
            diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        }
        Ok(EngineStatus::failure(output.status.code(), diagnostics))
    }

    fn name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}
