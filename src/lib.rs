//! PDF Form Filling Library
//!
//! Fills the interactive fields of a PDF form with key/value data and writes
//! a new, optionally flattened PDF. The PDF work itself is delegated to an
//! external engine such as mcpdf or pdftk. This library provides:
//! - Form data with scalar field values, loadable from JSON
//! - FDF encoding of the form data
//! - Engine invocation inside a throwaway scratch workspace
//! - Atomic replacement of the destination file
//!
//! # Example
//!
//! ```no_run
//! use pdf_fill::{fill, Form, Options};
//!
//! let mut form = Form::new();
//! form.insert("name", "Alice");
//! form.insert("age", 30);
//!
//! let options = Options { overwrite: false, flatten: true };
//! fill(&form, "application.pdf", "filled.pdf", Some(options)).expect("Failed to fill form");
//! ```

pub mod engine;
pub mod error;
pub mod fdf;
pub mod fill;
pub mod finalize;
pub mod form;
pub mod workspace;

// Re-export commonly used items
pub use engine::{CommandEngine, EngineDialect, EngineJob, EngineStatus, FillEngine};
pub use error::{Error, Result};
pub use fill::{fill, FormFiller, Options};
pub use form::{FieldValue, Form};
