//! Position tracking for compiled records.
//!
//! Every position that crosses the editor boundary is 1-indexed and every file
//! path is relative to the workspace root.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use smol_str::SmolStr;

/// A position in source text (1-indexed line and column, columns counted in chars)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Position reached by moving `line_offset` lines down and `char_offset` chars right.
    ///
    /// On the first line the offset is relative to `self.column`; on any later line
    /// it is relative to column 1.
    pub fn advance(self, line_offset: u32, char_offset: u32) -> Self {
        let base_column = if line_offset == 0 { self.column } else { 1 };
        Self {
            line: self.line + line_offset,
            column: base_column + char_offset,
        }
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A file plus a 1-indexed position inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub file: SmolStr,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<SmolStr>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn line_col(&self) -> LineCol {
        LineCol::new(self.line, self.column)
    }

    /// Same file, different position.
    pub fn with_line_col(&self, pos: LineCol) -> Self {
        Self {
            file: self.file.clone(),
            line: pos.line,
            column: pos.column,
        }
    }

    /// Rewrite the file path relative to `root`, using `/` separators.
    ///
    /// Paths outside `root` keep their (normalized) absolute form.
    pub fn relative_to(&self, root: &Path) -> Self {
        let path = Path::new(self.file.as_str());
        let relative = path.strip_prefix(root).unwrap_or(path);
        let file = relative.to_string_lossy().replace('\\', "/");
        let file = file.trim_start_matches("./");
        Self {
            file: SmolStr::new(file),
            line: self.line,
            column: self.column,
        }
    }

    /// Compare file paths ignoring separator style.
    pub fn is_in_file(&self, file: &str) -> bool {
        let normalized = file.replace('\\', "/");
        self.file.as_str() == normalized.trim_start_matches("./")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
