//! Source ranges and line mapping for diagnostics.
//!
//! Offsets throughout the toolchain count Unicode scalar values, not bytes,
//! because the lexer works over a decoded character buffer.

use serde::{Deserialize, Serialize};

use crate::JsError;

/// Half-open range `[start, end)` of character offsets into the source.
///
/// # Examples
///
/// ```
/// use core_types::SourceRange;
///
/// let a = SourceRange::new(2, 5);
/// let b = SourceRange::new(7, 9);
/// assert_eq!(a.to(b), SourceRange::new(2, 9));
/// assert_eq!(a.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceRange {
    /// Offset of the first character
    pub start: usize,
    /// Offset one past the last character
    pub end: usize,
}

impl SourceRange {
    /// Create a range from two offsets
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty range at an offset
    pub fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Range spanning from the start of `self` to the end of `other`
    pub fn to(self, other: SourceRange) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the range covers no characters
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Represents a position in source code.
///
/// Lines and columns are 1-indexed, the offset is 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
    /// Character offset from the start of the source
    pub offset: usize,
}

/// Maps character offsets back to lines and columns.
///
/// Only used to render human-readable diagnostics; parsing and optimization
/// never depend on it.
///
/// # Examples
///
/// ```
/// use core_types::LineMap;
///
/// let map = LineMap::new("a\nbc\n");
/// let pos = map.position(3);
/// assert_eq!((pos.line, pos.column), (2, 2));
/// assert_eq!(map.line_text(2), "bc");
/// ```
#[derive(Debug, Clone)]
pub struct LineMap {
    chars: Vec<char>,
    line_starts: Vec<usize>,
}

impl LineMap {
    /// Index the line starts of a source text
    pub fn new(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '\r' => {
                    if chars.get(i + 1) == Some(&'\n') {
                        i += 1;
                    }
                    line_starts.push(i + 1);
                }
                '\n' | '\u{2028}' | '\u{2029}' => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self { chars, line_starts }
    }

    /// Number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of a character offset
    pub fn position(&self, offset: usize) -> SourcePosition {
        let offset = offset.min(self.chars.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        SourcePosition {
            line: line as u32 + 1,
            column: (offset - self.line_starts[line]) as u32 + 1,
            offset,
        }
    }

    /// Text of a 1-indexed line without its terminator
    pub fn line_text(&self, line: u32) -> String {
        let index = (line as usize).saturating_sub(1);
        let Some(&start) = self.line_starts.get(index) else {
            return String::new();
        };
        self.chars[start..]
            .iter()
            .take_while(|c| !matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'))
            .collect()
    }

    /// Render an error with the offending line and an underline
    pub fn render(&self, error: &JsError) -> String {
        let Some(range) = error.range else {
            return error.to_string();
        };
        let start = self.position(range.start);
        let end = self.position(range.end.max(range.start));
        let text = self.line_text(start.line);
        if start.line == end.line {
            let width = (end.column.saturating_sub(start.column)).max(1) as usize;
            format!(
                "Line {}:{}-{}: {}\n{}\n{}{}^",
                start.line,
                start.column,
                end.column,
                error,
                text,
                " ".repeat(start.column as usize - 1),
                "~".repeat(width - 1)
            )
        } else {
            let tail = (text.chars().count() + 1).saturating_sub(start.column as usize - 1);
            format!(
                "Line {}:{}-{}:{}: {}\n{}\n{}{}",
                start.line,
                start.column,
                end.line,
                end.column,
                error,
                text,
                " ".repeat(start.column as usize - 1),
                "~".repeat(tail)
            )
        }
    }
}
