//! A single accumulated assembler diagnostic.
//!
//! The assembler never aborts on the first problem: it keeps scanning so a
//! run can report every mistake at once, then fails as a whole if the
//! accumulated list is non-empty.

use std::fmt;

/// One lexical or semantic failure, tied to the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleError {
    /// 1-indexed source line.
    pub line: u32,
    /// Human-readable description.
    pub message: String,
}

impl AssembleError {
    pub(crate) fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for AssembleError {}
