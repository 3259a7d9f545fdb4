//! Source positions.
//!
//! A position names a line/column in a (possibly anonymous) source file.
//! Errors collect positions as they unwind so the final message can show the
//! whole chain from the failing node out to the document root.

use std::fmt;
use std::sync::Arc;

/// Source location of a node.
///
/// Lines and columns are 1-based; `0` means "unknown" and is used for
/// synthesized nodes.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct Position {
    pub file: Option<Arc<str>>,
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Position for synthesized nodes.
    pub const DUMMY: Position = Position {
        file: None,
        line: 0,
        column: 0,
    };

    /// Create a position without a file name.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Position {
            file: None,
            line,
            column,
        }
    }

    /// Create a position inside a named file.
    pub fn in_file(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Position {
            file: Some(file.into()),
            line,
            column,
        }
    }

    /// Check if this position was synthesized.
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.file.is_none() && self.line == 0 && self.column == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{file}:{}:{}", self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_file() {
        assert_eq!(Position::new(3, 7).to_string(), "3:7");
        assert_eq!(Position::in_file("main.acl", 1, 2).to_string(), "main.acl:1:2");
    }

    #[test]
    fn dummy_detection() {
        assert!(Position::DUMMY.is_dummy());
        assert!(!Position::new(1, 1).is_dummy());
    }
}
