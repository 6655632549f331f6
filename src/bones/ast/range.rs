//! Positions in the source text
//!
//! The engine walks the input as a sequence of `char`s, so every offset in this crate is a
//! char offset, not a byte offset. [`SourceLocation`] converts those offsets into
//! line/column pairs with a binary search over the recorded line starts.

use serde::Serialize;
use std::fmt;

/// A line and column in the source, both 0-based
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Maps a position inside an embedded source onto the source that embeds it at `origin`
    pub fn relative_to(self, origin: Position) -> Position {
        if self.line == 0 {
            Position::new(origin.line, origin.column + self.column)
        } else {
            Position::new(origin.line + self.line, self.column)
        }
    }
}

/// Rendered 1-based, the way editors count
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Converts char offsets to positions
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Char offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    pub fn new(chars: &[char]) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in chars.iter().enumerate() {
            if *ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    pub fn position(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);
        Position::new(line, offset - self.line_starts[line])
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(source: &str) -> SourceLocation {
        SourceLocation::new(&source.chars().collect::<Vec<_>>())
    }

    #[test]
    fn test_offsets_map_to_lines() {
        let loc = location("ab\ncd\n\nx");
        assert_eq!(loc.position(0), Position::new(0, 0));
        assert_eq!(loc.position(2), Position::new(0, 2));
        assert_eq!(loc.position(3), Position::new(1, 0));
        assert_eq!(loc.position(6), Position::new(2, 0));
        assert_eq!(loc.position(7), Position::new(3, 0));
        assert_eq!(loc.line_count(), 4);
    }

    #[test]
    fn test_offsets_count_chars_not_bytes() {
        let loc = location("é\nü");
        assert_eq!(loc.position(2), Position::new(1, 0));
    }

    #[test]
    fn test_relative_positions() {
        let origin = Position::new(4, 6);
        assert_eq!(Position::new(0, 3).relative_to(origin), Position::new(4, 9));
        assert_eq!(Position::new(2, 3).relative_to(origin), Position::new(6, 3));
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(Position::new(0, 4).to_string(), "1:5");
    }
}
