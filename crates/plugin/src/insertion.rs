//! Named, locatable markers in generated code.
//!
//! An insertion point is rendered into a file as a comment in the target
//! language and later located by its label. Coordinates are computed after
//! uniform line splitting, so `\n`, `\r\n` and `\r` content produce the same
//! line/column results.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use stencil_api::Language;

/// A named anchor for later code edits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct InsertionPoint {
    label: SmolStr,
    repeating: bool,
}

impl InsertionPoint {
    /// A point that admits at most one inserted construct.
    pub fn new(label: impl Into<SmolStr>) -> Self {
        Self {
            label: label.into(),
            repeating: false,
        }
    }

    /// A point that may be inserted at any number of times.
    pub fn repeating(label: impl Into<SmolStr>) -> Self {
        Self {
            label: label.into(),
            repeating: true,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    /// The marker text as it appears in a file of the given language.
    pub fn marker(&self, language: &Language) -> String {
        language.comment(&format!("@insertion-point({})", self.label))
    }
}

/// Where a marker was found in a file's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinates {
    /// The marker is absent from the file.
    Nowhere,
    /// The marker occupies the whole line (zero-based).
    Line(usize),
    /// The marker sits inside a line; `column` is the char offset right
    /// after the marker text.
    Inline { line: usize, column: usize },
}

impl Coordinates {
    pub fn is_nowhere(&self) -> bool {
        matches!(self, Coordinates::Nowhere)
    }
}

/// Splits text into lines, treating `\n`, `\r\n` and `\r` uniformly.
///
/// Returns the lines and whether the text ended with a line terminator.
pub(crate) fn split_lines(text: &str) -> (Vec<String>, bool) {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut terminated = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                lines.push(std::mem::take(&mut current));
                terminated = true;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
                terminated = true;
            }
            _ => {
                current.push(c);
                terminated = false;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
        terminated = false;
    }
    (lines, terminated || text.is_empty())
}

/// Locates the first occurrence of the point's marker in the given text.
///
/// A marker alone on its line (modulo surrounding whitespace) is a whole-line
/// point; a marker embedded in other content is an inline point.
pub fn locate(point: &InsertionPoint, text: &str, language: &Language) -> Coordinates {
    let marker = point.marker(language);
    let (lines, _) = split_lines(text);
    locate_in_lines(&marker, &lines)
}

pub(crate) fn locate_in_lines(marker: &str, lines: &[String]) -> Coordinates {
    for (index, line) in lines.iter().enumerate() {
        if let Some(at) = line.find(marker) {
            if line.trim() == marker {
                return Coordinates::Line(index);
            }
            let column = line[..at + marker.len()].chars().count();
            return Coordinates::Inline {
                line: index,
                column,
            };
        }
    }
    Coordinates::Nowhere
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_marker_is_nowhere() {
        let point = InsertionPoint::new("class_scope");
        let found = locate(&point, "public class A {}\n", &Language::java());
        assert!(found.is_nowhere());
    }

    #[test]
    fn whole_line_marker() {
        let point = InsertionPoint::new("class_scope");
        let text = format!(
            "public class A {{\n    {}\n}}\n",
            point.marker(&Language::java())
        );
        assert_eq!(locate(&point, &text, &Language::java()), Coordinates::Line(1));
    }

    #[test]
    fn inline_marker_reports_column_after_marker() {
        let point = InsertionPoint::new("imports");
        let marker = point.marker(&Language::java());
        let text = format!("import a; {marker} import b;\n");
        let expected_column = format!("import a; {marker}").chars().count();
        assert_eq!(
            locate(&point, &text, &Language::java()),
            Coordinates::Inline {
                line: 0,
                column: expected_column
            }
        );
    }

    #[test]
    fn coordinates_stable_across_line_endings() {
        let point = InsertionPoint::new("class_scope");
        let marker = point.marker(&Language::java());
        let unix = format!("class A {{\n{marker}\n}}\n");
        let windows = unix.replace('\n', "\r\n");
        let classic_mac = unix.replace('\n', "\r");
        let expected = locate(&point, &unix, &Language::java());
        assert_eq!(locate(&point, &windows, &Language::java()), expected);
        assert_eq!(locate(&point, &classic_mac, &Language::java()), expected);
    }

    #[test]
    fn split_lines_uniform() {
        let (a, _) = split_lines("one\ntwo\nthree");
        let (b, _) = split_lines("one\r\ntwo\r\nthree");
        let (c, _) = split_lines("one\rtwo\rthree");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn split_lines_trailing_terminator() {
        let (lines, terminated) = split_lines("one\ntwo\n");
        assert_eq!(lines.len(), 2);
        assert!(terminated);
        let (lines, terminated) = split_lines("one\ntwo");
        assert_eq!(lines.len(), 2);
        assert!(!terminated);
    }
}
