use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// A non-empty chain of field names, e.g. `line_item.quantity`.
///
/// Field paths appear as values of reference-typed options and are resolved
/// against the declaring message by the type system.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct FieldPath {
    segments: Vec<SmolStr>,
}

impl FieldPath {
    pub fn new(root: impl Into<SmolStr>) -> Self {
        Self {
            segments: vec![root.into()],
        }
    }

    /// Parses a dot-separated path. Returns `None` for an empty string.
    pub fn parse(path: &str) -> Option<Self> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return None;
        }
        Some(Self {
            segments: path.split('.').map(SmolStr::new).collect(),
        })
    }

    pub fn push(&mut self, segment: impl Into<SmolStr>) {
        self.segments.push(segment.into());
    }

    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// The path without its root segment.
    ///
    /// Returns `None` when the path has a single segment left.
    pub fn step_into(&self) -> Option<Self> {
        if !self.is_nested() {
            return None;
        }
        Some(Self {
            segments: self.segments[1..].to_vec(),
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Value attached to a declared option.
///
/// `Opaque` carries the raw text of a value the producer could not resolve;
/// traversal completeness wins over option resolution completeness.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Reference(FieldPath),
    Opaque(String),
}

impl OptionValue {
    /// Interprets raw option text: a boolean or numeric literal, a quoted
    /// string, a field-path reference, or opaque text as the fallback.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => return OptionValue::Bool(true),
            "false" => return OptionValue::Bool(false),
            _ => {}
        }
        if let Ok(n) = raw.parse::<i64>() {
            return OptionValue::Int(n);
        }
        if let Ok(x) = raw.parse::<f64>() {
            return OptionValue::Float(x);
        }
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            return OptionValue::Str(raw[1..raw.len() - 1].to_owned());
        }
        let is_path = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if is_path {
            if let Some(path) = FieldPath::parse(raw) {
                return OptionValue::Reference(path);
            }
        }
        OptionValue::Opaque(raw.to_owned())
    }
}

/// An option declared on a file, type, field, constant, or service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: SmolStr,
    pub value: OptionValue,
}

impl OptionSpec {
    pub fn new(name: impl Into<SmolStr>, value: OptionValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
