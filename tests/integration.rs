//! Integration tests for the PDF form filling library

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Document, Object, Stream};
use pdf_fill::{fill, EngineJob, EngineStatus, Error, FillEngine, Form, FormFiller, Options};
use tempfile::TempDir;

/// Write a one-page PDF with a single AcroForm text field named `name`
fn write_form_pdf(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let field_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal("name"),
        "Rect" => vec![100.into(), 700.into(), 300.into(), 720.into()],
    });

    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Annots" => vec![field_id.into()],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => dictionary! {
            "Fields" => vec![field_id.into()],
        },
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).expect("Failed to write fixture PDF");
}

/// Engine double: records every job and copies the source PDF to the output
#[derive(Default)]
struct RecordingEngine {
    jobs: RefCell<Vec<RecordedJob>>,
}

struct RecordedJob {
    flatten: bool,
    workdir: PathBuf,
    fdf: String,
}

impl FillEngine for RecordingEngine {
    fn fill(&self, job: &EngineJob<'_>) -> io::Result<EngineStatus> {
        self.jobs.borrow_mut().push(RecordedJob {
            flatten: job.flatten,
            workdir: job.workdir.to_path_buf(),
            fdf: std::fs::read_to_string(job.data)?,
        });
        std::fs::copy(job.source, job.output)?;
        Ok(EngineStatus::success())
    }

    fn name(&self) -> String {
        "recording".to_string()
    }
}

struct Setup {
    dir: TempDir,
    scratch: PathBuf,
    source: PathBuf,
}

impl Setup {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let scratch = dir.path().join("scratch");
        std::fs::create_dir(&scratch).unwrap();
        let source = dir.path().join("application.pdf");
        write_form_pdf(&source);
        Self { dir, scratch, source }
    }

    fn dest(&self) -> PathBuf {
        self.dir.path().join("filled.pdf")
    }

    fn scratch_entries(&self) -> usize {
        std::fs::read_dir(&self.scratch).unwrap().count()
    }
}

#[test]
fn test_fill_produces_engine_output() {
    let setup = Setup::new();
    let engine = RecordingEngine::default();
    let filler = FormFiller::new(&engine).with_scratch_dir(&setup.scratch);

    let mut form = Form::new();
    form.insert("name", "Alice");
    form.insert("age", 30);

    filler
        .fill(&form, &setup.source, setup.dest(), &Options::default())
        .expect("Failed to fill form");

    assert_eq!(
        std::fs::read(setup.dest()).unwrap(),
        std::fs::read(&setup.source).unwrap()
    );
    let filled = Document::load(setup.dest()).expect("Output is not a PDF");
    assert_eq!(filled.get_pages().len(), 1);

    let jobs = engine.jobs.borrow();
    assert_eq!(jobs.len(), 1);
    let entries: Vec<&str> = jobs[0].fdf.lines().filter(|l| l.starts_with("<< /T")).collect();
    assert_eq!(entries, vec!["<< /T (age) /V (30)>>", "<< /T (name) /V (Alice)>>"]);

    assert!(!jobs[0].workdir.exists());
    assert_eq!(setup.scratch_entries(), 0);
}

#[test]
fn test_flatten_option_reaches_engine() {
    let setup = Setup::new();
    let engine = RecordingEngine::default();
    let filler = FormFiller::new(&engine).with_scratch_dir(&setup.scratch);
    let form = Form::new();

    filler
        .fill(&form, &setup.source, setup.dest(), &Options { overwrite: true, flatten: true })
        .unwrap();
    filler
        .fill(&form, &setup.source, setup.dest(), &Options { overwrite: true, flatten: false })
        .unwrap();

    let flags: Vec<bool> = engine.jobs.borrow().iter().map(|j| j.flatten).collect();
    assert_eq!(flags, vec![true, false]);
}

#[test]
fn test_overwrite_replaces_previous_result() {
    let setup = Setup::new();
    std::fs::write(setup.dest(), b"stale output from an earlier run").unwrap();

    let engine = RecordingEngine::default();
    FormFiller::new(&engine)
        .with_scratch_dir(&setup.scratch)
        .fill(&Form::new(), &setup.source, setup.dest(), &Options::default())
        .unwrap();

    assert_eq!(
        std::fs::read(setup.dest()).unwrap(),
        std::fs::read(&setup.source).unwrap()
    );
    assert_eq!(setup.scratch_entries(), 0);
}

#[test]
fn test_no_overwrite_leaves_destination_untouched() {
    let setup = Setup::new();
    std::fs::write(setup.dest(), b"keep").unwrap();
    let modified = std::fs::metadata(setup.dest()).unwrap().modified().unwrap();

    let engine = RecordingEngine::default();
    let err = FormFiller::new(&engine)
        .with_scratch_dir(&setup.scratch)
        .fill(
            &Form::new(),
            &setup.source,
            setup.dest(),
            &Options { overwrite: false, flatten: true },
        )
        .unwrap_err();

    assert!(matches!(err, Error::DestinationExists(_)));
    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read(setup.dest()).unwrap(), b"keep");
    assert_eq!(std::fs::metadata(setup.dest()).unwrap().modified().unwrap(), modified);
    assert_eq!(setup.scratch_entries(), 0);
}

#[test]
fn test_missing_source_with_default_engine() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("out.pdf");

    let err = fill(&Form::new(), "/no/such.pdf", &dest, None).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
    assert!(!dest.exists());
}

#[cfg(unix)]
#[test]
fn test_fill_keeps_destination_mode() {
    use std::os::unix::fs::PermissionsExt;

    let setup = Setup::new();
    std::fs::write(setup.dest(), b"previous").unwrap();
    std::fs::set_permissions(setup.dest(), std::fs::Permissions::from_mode(0o644)).unwrap();

    let engine = RecordingEngine::default();
    FormFiller::new(&engine)
        .with_scratch_dir(&setup.scratch)
        .fill(&Form::new(), &setup.source, setup.dest(), &Options::default())
        .unwrap();

    let mode = std::fs::metadata(setup.dest()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

#[cfg(unix)]
mod command_engine {
    use super::*;
    use pdf_fill::{CommandEngine, EngineDialect};

    /// Write a shell script standing in for pdftk
    ///
    /// It logs its arguments, checks that the FDF document is reachable from
    /// its working directory, then copies the source (`$1`) to the output
    /// (`$5`). A non-zero `exit_code` makes it fail instead.
    fn fake_pdftk(dir: &Path, exit_code: i32) -> (CommandEngine, PathBuf) {
        let log = dir.join("engine.log");
        let script = dir.join("fake-pdftk.sh");
        let body = format!(
            "#!/bin/sh\n\
             echo \"$@\" > '{log}'\n\
             test -f data.fdf || exit 9\n\
             if [ {code} -ne 0 ]; then echo 'field not found' >&2; exit {code}; fi\n\
             cp \"$1\" \"$5\"\n",
            log = log.display(),
            code = exit_code,
        );
        std::fs::write(&script, body).unwrap();
        let engine = CommandEngine::new("sh", EngineDialect::Pdftk).with_leading_args([script]);
        (engine, log)
    }

    #[test]
    fn test_subprocess_engine_success() {
        let setup = Setup::new();
        let (engine, log) = fake_pdftk(setup.dir.path(), 0);
        let filler = FormFiller::new(engine).with_scratch_dir(&setup.scratch);

        let mut form = Form::new();
        form.insert("name", "Alice");
        filler
            .fill(&form, &setup.source, setup.dest(), &Options::default())
            .expect("Failed to fill with subprocess engine");

        assert_eq!(
            std::fs::read(setup.dest()).unwrap(),
            std::fs::read(&setup.source).unwrap()
        );

        let logged = std::fs::read_to_string(&log).unwrap();
        let args: Vec<&str> = logged.trim_end().split(' ').collect();
        assert_eq!(args[0], setup.source.to_str().unwrap());
        assert_eq!(args[1], "fill_form");
        assert!(args[2].ends_with("data.fdf"));
        assert_eq!(args[3], "output");
        assert!(args[4].ends_with("output.pdf"));
        assert_eq!(args.last(), Some(&"flatten"));
        assert!(Path::new(args[2]).starts_with(&setup.scratch));
        assert_eq!(setup.scratch_entries(), 0);
    }

    #[test]
    fn test_subprocess_engine_failure() {
        let setup = Setup::new();
        let (engine, _) = fake_pdftk(setup.dir.path(), 3);
        let filler = FormFiller::new(engine).with_scratch_dir(&setup.scratch);

        let err = filler
            .fill(&Form::new(), &setup.source, setup.dest(), &Options::default())
            .unwrap_err();
        assert!(matches!(err, Error::EngineFailed { code: Some(3), .. }));
        assert!(err.to_string().contains("field not found"));
        assert!(!setup.dest().exists());
        assert_eq!(setup.scratch_entries(), 0);
    }

    #[test]
    fn test_unlaunchable_engine() {
        let setup = Setup::new();
        let missing = setup.dir.path().join("not-installed");
        let filler = FormFiller::new(CommandEngine::new(&missing, EngineDialect::Pdftk))
            .with_scratch_dir(&setup.scratch);

        let err = filler
            .fill(&Form::new(), &setup.source, setup.dest(), &Options::default())
            .unwrap_err();
        assert!(matches!(err, Error::EngineLaunch { .. }));
        assert_eq!(setup.scratch_entries(), 0);
    }
}
