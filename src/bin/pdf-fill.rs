//! PDF Fill CLI tool
//!
//! A command-line tool for filling PDF form fields through an external engine.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use pdf_fill::fdf::write_fdf;
use pdf_fill::{CommandEngine, EngineDialect, Form, FormFiller, Options};

/// PDF Fill - Fill PDF form fields from key/value data
#[derive(Parser)]
#[command(name = "pdf-fill")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Fill a form from JSON and flatten it (relative --jar paths, like the
    # default mcpdf.jar, are looked up in the current directory)
    pdf-fill fill application.pdf -o filled.pdf --data values.json

    # Keep fields editable, use pdftk, set single values on the command line
    pdf-fill fill application.pdf -o filled.pdf --engine pdftk --no-flatten --set name=Alice --set age=30

    # Only write the FDF data document
    pdf-fill fdf -o data.fdf --data values.json")]
struct Cli {
    /// Increase log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a PDF form and write the result
    Fill {
        /// Fillable source PDF
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        values: FormArgs,

        /// Keep form fields editable in the output
        #[arg(long)]
        no_flatten: bool,

        /// Fail instead of replacing an existing output file
        #[arg(long)]
        no_overwrite: bool,

        /// Form filling engine
        #[arg(long, value_enum, env = "PDF_FILL_ENGINE", default_value = "mcpdf")]
        engine: EngineKind,

        /// Engine executable (default: java for mcpdf, pdftk for pdftk);
        /// relative paths resolve against the current directory
        #[arg(long, env = "PDF_FILL_PROGRAM")]
        program: Option<PathBuf>,

        /// Path to mcpdf.jar, relative to the current directory unless absolute
        #[arg(long, env = "PDF_FILL_JAR", default_value = "mcpdf.jar")]
        jar: PathBuf,

        /// Directory for scratch workspaces (default: system temp directory)
        #[arg(long, env = "PDF_FILL_SCRATCH_DIR")]
        scratch_dir: Option<PathBuf>,
    },

    /// Write the FDF data document for the given values
    Fdf {
        /// Output FDF file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        values: FormArgs,
    },
}

#[derive(clap::Args)]
struct FormArgs {
    /// JSON file with an object of field values
    #[arg(long)]
    data: Option<PathBuf>,

    /// Field assignment NAME=VALUE (repeatable, overrides --data)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    assignments: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum EngineKind {
    Mcpdf,
    Pdftk,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Fill {
            input, output, values, no_flatten, no_overwrite,
            engine, program, jar, scratch_dir,
        } => {
            cmd_fill(
                input, output, values, no_flatten, no_overwrite,
                engine, program, jar, scratch_dir,
            )
        }
        Commands::Fdf { output, values } => cmd_fdf(output, values),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Collect form values from --data and --set
fn load_form(args: FormArgs) -> Result<Form> {
    let mut form = match &args.data {
        Some(path) => Form::from_json_file(path)
            .with_context(|| format!("Failed to load form data from {}", path.display()))?,
        None => Form::new(),
    };
    for assignment in &args.assignments {
        let (name, value) = Form::parse_assignment(assignment)?;
        form.insert(name, value);
    }
    Ok(form)
}

fn build_engine(kind: EngineKind, program: Option<PathBuf>, jar: PathBuf) -> CommandEngine {
    match (kind, program) {
        (EngineKind::Mcpdf, None) => CommandEngine::mcpdf(jar),
        (EngineKind::Mcpdf, Some(program)) => CommandEngine::mcpdf(jar).with_program(program),
        (EngineKind::Pdftk, None) => CommandEngine::pdftk(),
        (EngineKind::Pdftk, Some(program)) => CommandEngine::new(program, EngineDialect::Pdftk),
    }
}

/// Fill a form
#[allow(clippy::too_many_arguments)]
fn cmd_fill(
    input: PathBuf,
    output: PathBuf,
    values: FormArgs,
    no_flatten: bool,
    no_overwrite: bool,
    engine: EngineKind,
    program: Option<PathBuf>,
    jar: PathBuf,
    scratch_dir: Option<PathBuf>,
) -> Result<()> {
    let form = load_form(values)?;
    if form.is_empty() {
        log::warn!("No field values given; the form is filled with nothing");
    }

    let mut filler = FormFiller::new(build_engine(engine, program, jar));
    if let Some(dir) = scratch_dir {
        filler = filler.with_scratch_dir(dir);
    }

    let options = Options {
        overwrite: !no_overwrite,
        flatten: !no_flatten,
    };

    eprintln!("Filling {} field(s)...", form.len());
    filler.fill(&form, &input, &output, &options)?;
    eprintln!("Output: {}", output.display());

    Ok(())
}

/// Write only the FDF document
fn cmd_fdf(output: PathBuf, values: FormArgs) -> Result<()> {
    let form = load_form(values)?;
    write_fdf(&form, &output)?;
    eprintln!("Wrote {} field(s) to {}", form.len(), output.display());
    Ok(())
}
