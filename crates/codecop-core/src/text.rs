//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values, not bytes
//!
//! Diagnostics are computed once per file but may be projected many times,
//! so [`LineIndex`] precomputes line starts for repeated lookups.

use crate::patch::Span;

/// Convert a byte offset to 1-indexed line and column (Unicode-aware).
///
/// If `offset` exceeds content length, returns the position at end of content.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Convert 1-indexed line and column to a byte offset (Unicode-aware).
///
/// Line/column values of 0 are treated as 1. Positions past the end of a line
/// clamp to the line end; lines past the end of content return content length.
pub fn position_to_byte_offset(content: &str, line: u32, col: u32) -> usize {
    let line = line.max(1);
    let col = col.max(1);

    let Some(line_start) = line_starts(content).nth((line - 1) as usize) else {
        return content.len();
    };

    let rest = &content[line_start..];
    let line_len = rest.find('\n').unwrap_or(rest.len());
    rest[..line_len]
        .char_indices()
        .nth((col - 1) as usize)
        .map(|(i, _)| line_start + i)
        .unwrap_or(line_start + line_len)
}

fn line_starts(content: &str) -> impl Iterator<Item = usize> + '_ {
    std::iter::once(0).chain(
        content
            .char_indices()
            .filter(|&(_, ch)| ch == '\n')
            .map(|(i, _)| i + 1),
    )
}

/// Extract the text covered by `span`, or `None` when the span is out of
/// bounds or splits a UTF-8 character.
pub fn extract_span(content: &str, span: Span) -> Option<&str> {
    content.get(span.start..span.end)
}

// ============================================================================
// LineIndex
// ============================================================================

/// Precomputed line start offsets for a single file.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// Build the index for `content`.
    pub fn new(content: &str) -> Self {
        LineIndex {
            starts: line_starts(content).collect(),
        }
    }

    /// Number of lines (a trailing newline starts an empty final line).
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Convert a byte offset to 1-indexed (line, col), counting chars.
    pub fn position(&self, content: &str, offset: usize) -> (u32, u32) {
        let offset = offset.min(content.len());
        let line_idx = match self.starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.starts[line_idx];
        let col = content
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - line_start);
        (line_idx as u32 + 1, col as u32 + 1)
    }

    /// Project a span to `(line, col, end_line, end_col)`.
    pub fn span_position(&self, content: &str, span: Span) -> (u32, u32, u32, u32) {
        let (line, col) = self.position(content, span.start);
        let (end_line, end_col) = self.position(content, span.end);
        (line, col, end_line, end_col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod position_tests {
        use super::*;

        #[test]
        fn offset_to_position_basic() {
            let content = "class A\n{\n  int x;\n}";
            assert_eq!(byte_offset_to_position(content, 0), (1, 1));
            assert_eq!(byte_offset_to_position(content, 6), (1, 7));
            assert_eq!(byte_offset_to_position(content, 8), (2, 1));
            assert_eq!(byte_offset_to_position(content, 12), (3, 3));
        }

        #[test]
        fn offset_past_end_clamps() {
            let content = "ab\ncd";
            assert_eq!(byte_offset_to_position(content, 100), (2, 3));
        }

        #[test]
        fn columns_count_chars_not_bytes() {
            let content = "é x";
            assert_eq!(byte_offset_to_position(content, 3), (1, 3));
            assert_eq!(position_to_byte_offset(content, 1, 3), 3);
        }

        #[test]
        fn position_to_offset_roundtrip_and_clamping() {
            let content = "class A\n{\n  int x;\n}";
            assert_eq!(position_to_byte_offset(content, 3, 3), 12);
            assert_eq!(position_to_byte_offset(content, 0, 0), 0);
            assert_eq!(position_to_byte_offset(content, 1, 99), 7);
            assert_eq!(position_to_byte_offset(content, 99, 1), content.len());
        }
    }

    mod line_index_tests {
        use super::*;

        #[test]
        fn line_index_matches_linear_scan() {
            let content = "class A\n{\n  int é;\n}\n";
            let index = LineIndex::new(content);
            assert_eq!(index.line_count(), 5);
            for offset in [0, 5, 8, 10, 14, 18, content.len()] {
                assert_eq!(
                    index.position(content, offset),
                    byte_offset_to_position(content, offset),
                    "offset {}",
                    offset
                );
            }
        }

        #[test]
        fn span_position_projects_both_ends() {
            let content = "int a;\nint bb;";
            let index = LineIndex::new(content);
            assert_eq!(index.span_position(content, Span::new(11, 13)), (2, 5, 2, 7));
        }

        #[test]
        fn extract_span_rejects_bad_ranges() {
            assert_eq!(extract_span("hello", Span::new(1, 3)), Some("el"));
            assert_eq!(extract_span("hello", Span::new(3, 9)), None);
        }
    }
}
