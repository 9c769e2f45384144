//! Form data: field names mapped to scalar values

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// A scalar value for a single form field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean, rendered as `true` / `false`
    Bool(bool),
    /// Integer, rendered as decimal digits
    Integer(i64),
    /// Floating point number, rendered in plain decimal notation
    /// (`1e21` becomes `1000000000000000000000`, never `1e+21`)
    Float(f64),
    /// Text, rendered verbatim
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(n.into())
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Integer(n.into())
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

/// Field values keyed by PDF field name
///
/// Keys are kept sorted so encoding the same form always yields the same
/// document.
///
/// # Example
///
/// ```
/// use pdf_fill::Form;
///
/// let mut form = Form::new();
/// form.insert("name", "Alice");
/// form.insert("age", 30);
/// assert_eq!(form.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Form {
    fields: BTreeMap<String, FieldValue>,
}

impl Form {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Look up a field value by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in encoding order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a form from a JSON object of scalar values
    ///
    /// `null`, arrays and nested objects are rejected.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(Error::InvalidFormData(format!(
                    "expected a JSON object of field values, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut form = Form::new();
        for (name, value) in object {
            let field = match value {
                serde_json::Value::Bool(b) => FieldValue::Bool(b),
                serde_json::Value::String(s) => FieldValue::Text(s),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => FieldValue::Integer(i),
                    // u64 beyond i64 range or a float
                    None => match n.as_f64() {
                        Some(x) if n.is_f64() => FieldValue::Float(x),
                        _ => FieldValue::Text(n.to_string()),
                    },
                },
                other => {
                    return Err(Error::InvalidFormData(format!(
                        "field '{}' must be a string, number or boolean, found {}",
                        name,
                        json_kind(&other)
                    )))
                }
            };
            form.fields.insert(name, field);
        }
        Ok(form)
    }

    /// Read a JSON form data file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read form data '{}'", path.display()), e))?;
        Self::from_json_str(&json)
    }

    /// Parse a `name=value` assignment
    ///
    /// The value is always taken as text. Only the first `=` separates name
    /// from value.
    pub fn parse_assignment(assignment: &str) -> Result<(String, FieldValue)> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            Error::InvalidFormData(format!("expected name=value, got '{}'", assignment))
        })?;
        if name.is_empty() {
            return Err(Error::InvalidFormData(format!(
                "empty field name in '{}'",
                assignment
            )));
        }
        Ok((name.to_string(), FieldValue::Text(value.to_string())))
    }
}

impl<K, V> FromIterator<(K, V)> for Form
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Form::new();
        form.extend(iter);
        form
    }
}

impl<K, V> Extend<(K, V)> for Form
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
