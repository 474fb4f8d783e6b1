//! Diagnostics collected while parsing
//!
//! Parsers never abort on a bad token. They record a mark (line, column,
//! kind, message) and move on; the engine flattens the marks into the
//! warning strings of a conversion result.

use serde::{Deserialize, Serialize};

/// A warning mark at a source location
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMark {
    /// 1-based source line
    pub line: usize,
    /// Character column within the line
    pub col: usize,
    /// Kind identifier (e.g., "invalid_chord", "unknown_suffix")
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

impl DiagnosticMark {
    pub fn warning(line: usize, col: usize, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line,
            col,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// "Line 3: Skipping invalid chord: \"X\""
    pub fn to_warning(&self) -> String {
        if self.line == 0 {
            self.message.clone()
        } else {
            format!("Line {}: {}", self.line, self.message)
        }
    }
}

/// Collection of diagnostic marks for one parse
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Diagnostics {
    pub marks: Vec<DiagnosticMark>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { marks: Vec::new() }
    }

    pub fn add(&mut self, mark: DiagnosticMark) {
        log::warn!("{}", mark.to_warning());
        self.marks.push(mark);
    }

    /// Record a document-level warning with no location
    pub fn note(&mut self, kind: impl Into<String>, message: impl Into<String>) {
        self.add(DiagnosticMark::warning(0, 0, kind, message));
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.marks.iter().filter(|m| m.kind == kind).count()
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.marks.iter().map(DiagnosticMark::to_warning).collect()
    }
}
