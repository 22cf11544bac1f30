//! Result compilation: mismatch list → one report string
//!
//! Callers assert equality against [`NO_MISMATCH`]; the sentinel text is
//! part of the public contract.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::mismatch::Mismatch;

/// Report text when every check passed.
pub const NO_MISMATCH: &str = "No mismatch values";

/// Compile mismatch descriptions into a single report.
///
/// Empty input yields exactly [`NO_MISMATCH`]. Otherwise every entry is
/// emitted in order, each followed by a blank line, then the count.
#[must_use]
pub fn compile_results<T: fmt::Display>(results: &[T]) -> String {
    if results.is_empty() {
        return NO_MISMATCH.to_string();
    }
    let mut out = String::from("Mismatches found:\n\n");
    for entry in results {
        out.push_str(&entry.to_string());
        out.push_str("\n\n");
    }
    out.push_str(&format!("Total mismatches: {}", results.len()));
    out
}

/// Outcome of one verification call: the ordered mismatch list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    pub mismatches: Vec<Mismatch>,
}

impl Report {
    #[must_use]
    pub fn new(mismatches: Vec<Mismatch>) -> Self {
        Self { mismatches }
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.mismatches.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Append another report's mismatches after this one's.
    #[must_use]
    pub fn merge(mut self, other: Report) -> Self {
        self.mismatches.extend(other.mismatches);
        self
    }

    #[must_use]
    pub fn compile(&self) -> String {
        compile_results(&self.mismatches)
    }
}

impl From<Vec<Mismatch>> for Report {
    fn from(mismatches: Vec<Mismatch>) -> Self {
        Self::new(mismatches)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compile())
    }
}
