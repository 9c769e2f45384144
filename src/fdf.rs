//! FDF form data document encoding
//!
//! The external engines consume field values as an FDF 1.2 document: a
//! fixed header, one `<< /T (name) /V (value)>>` entry per line and a fixed
//! trailer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::form::Form;

const FDF_HEADER: &str = "%FDF-1.2
%,,oe\"
1 0 obj
<<
/FDF << /Fields [";

const FDF_FOOTER: &str = "]
>>
>>
endobj
trailer
<<
/Root 1 0 R
>>
%%EOF";

/// Write the FDF document for `form` to `writer`
pub fn encode_fdf<W: Write>(form: &Form, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "{}", FDF_HEADER)?;
    for (name, value) in form.iter() {
        writeln!(
            writer,
            "<< /T ({}) /V ({})>>",
            escape_literal(name),
            escape_literal(&value.to_string())
        )?;
    }
    writeln!(writer, "{}", FDF_FOOTER)?;
    writer.flush()
}

/// Create an FDF file at `path` holding the values of `form`
pub fn write_fdf(form: &Form, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::io("failed to create fdf form data file", e))?;
    encode_fdf(form, BufWriter::new(file))
        .map_err(|e| Error::io("failed to write fdf form data file", e))?;
    debug!("Wrote {} field(s) to {}", form.len(), path.display());
    Ok(())
}

/// Escape text for use inside a PDF literal string
///
/// Parentheses and backslashes are escaped so they cannot terminate the
/// string early; line breaks become escapes so each entry stays on one line.
fn escape_literal(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\\' => escaped.push_str("\\\\"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{c}' => escaped.push_str("\\f"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(form: &Form) -> String {
        let mut buf = Vec::new();
        encode_fdf(form, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("plain text"), "plain text");
        assert_eq!(escape_literal("a (b) c"), "a \\(b\\) c");
        assert_eq!(escape_literal("C:\\temp"), "C:\\\\temp");
        assert_eq!(escape_literal("one\ntwo\r\n"), "one\\ntwo\\r\\n");
        assert_eq!(escape_literal("tab\there"), "tab\\there");
    }

    #[test]
    fn test_empty_form_document() {
        let expected = "%FDF-1.2\n%,,oe\"\n1 0 obj\n<<\n/FDF << /Fields [\n]\n>>\n>>\nendobj\ntrailer\n<<\n/Root 1 0 R\n>>\n%%EOF\n";
        assert_eq!(encode(&Form::new()), expected);
    }

    #[test]
    fn test_name_and_age_entries() {
        let mut form = Form::new();
        form.insert("name", "Alice");
        form.insert("age", 30);

        let doc = encode(&form);
        let entries: Vec<&str> = doc.lines().filter(|l| l.starts_with("<< /T")).collect();
        assert_eq!(
            entries,
            vec!["<< /T (age) /V (30)>>", "<< /T (name) /V (Alice)>>"]
        );
        assert!(doc.starts_with("%FDF-1.2\n"));
        assert!(doc.ends_with("%%EOF\n"));
    }

    #[test]
    fn test_one_line_per_field() {
        let form: Form = (0..25).map(|i| (format!("field{}", i), i)).collect();
        let doc = encode(&form);
        let entries = doc.lines().filter(|l| l.starts_with("<< /T (")).count();
        assert_eq!(entries, 25);
        for i in 0..25 {
            let line = format!("<< /T (field{}) /V ({})>>", i, i);
            assert!(doc.lines().any(|l| l == line), "missing {}", line);
        }
    }

    #[test]
    fn test_multiline_value_stays_on_one_line() {
        let mut form = Form::new();
        form.insert("address", "1 Main St\nSpringfield (West)");
        let doc = encode(&form);
        assert!(doc
            .lines()
            .any(|l| l == "<< /T (address) /V (1 Main St\\nSpringfield \\(West\\))>>"));
    }

    #[test]
    fn test_booleans_render_as_words() {
        let mut form = Form::new();
        form.insert("subscribe", true);
        assert!(encode(&form).contains("<< /T (subscribe) /V (true)>>"));
    }

    #[test]
    fn test_write_fdf_missing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("data.fdf");
        let err = write_fdf(&Form::new(), &path).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().starts_with("failed to create fdf form data file"));
    }
}
