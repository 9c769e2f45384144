//! Error types for the PDF form filling library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF form filling library
#[derive(Error, Debug)]
pub enum Error {
    /// A source or destination path could not be made absolute
    #[error("failed to create the absolute path for '{}': {source}", .path.display())]
    AbsolutePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fillable source PDF is missing
    #[error("form PDF file does not exist: '{}'", .0.display())]
    SourceNotFound(PathBuf),

    /// Destination exists and overwriting is disabled
    #[error("destination PDF file already exists: '{}'", .0.display())]
    DestinationExists(PathBuf),

    /// IO error, annotated with the stage that failed
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The external engine could not be started
    #[error("failed to launch form filling engine '{program}': {source}")]
    EngineLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external engine ran but reported failure
    #[error("form filling engine failed ({}){}", exit_code_label(.code), stderr_suffix(.stderr))]
    EngineFailed { code: Option<i32>, stderr: String },

    /// Form data could not be interpreted
    #[error("invalid form data: {0}")]
    InvalidFormData(String),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an IO error with a description of the failing stage
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}
