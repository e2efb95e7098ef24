//! Line and column lookup for spans.
//!
//! A [`LineOffsetTable`] pre-computes line start offsets so repeated
//! lookups (one per traceback frame, plus the excerpt) are O(log L)
//! binary searches instead of O(n) scans.

use flex_ir::Span;

/// Pre-computed line offset table for a single source text.
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start; `offsets[0]` is always 0.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    /// Scan the source once, recording where each line begins.
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line number containing a byte offset.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// 1-based (line, column) for a byte offset. Columns count
    /// characters from the line start, not bytes.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self
            .offsets
            .get((line - 1) as usize)
            .copied()
            .unwrap_or(0) as usize;
        let offset = (offset as usize).min(source.len());
        let col_chars = source[line_start..offset].chars().count();
        let col = u32::try_from(col_chars).unwrap_or(u32::MAX - 1) + 1;
        (line, col)
    }

    /// Byte offset where a 1-based line starts, `None` past the end.
    pub fn line_start_offset(&self, line: u32) -> Option<u32> {
        if line == 0 {
            return None;
        }
        self.offsets.get((line - 1) as usize).copied()
    }

    /// The text of a 1-based line, without its trailing newline.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let start = self.line_start_offset(line)? as usize;
        let end = self
            .line_start_offset(line + 1)
            .map_or(source.len(), |o| o as usize);
        let slice = source.get(start..end)?;
        Some(slice.strip_suffix('\n').unwrap_or(slice))
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }

    /// Convenience: 1-based line number where a span starts.
    #[inline]
    pub fn span_line(&self, span: Span) -> u32 {
        self.line_from_offset(span.start)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_single_line() {
        let source = "hello world";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_count(), 1);
        assert_eq!(table.line_from_offset(0), 1);
        assert_eq!(table.line_from_offset(10), 1);
        assert_eq!(table.line_text(source, 1), Some("hello world"));
        assert_eq!(table.line_text(source, 2), None);
    }

    #[test]
    fn test_multiple_lines() {
        let source = "line1\nline2\nline3";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_count(), 3);
        assert_eq!(table.line_from_offset(5), 1);
        assert_eq!(table.line_from_offset(6), 2);
        assert_eq!(table.line_from_offset(12), 3);
        assert_eq!(table.line_text(source, 2), Some("line2"));
        assert_eq!(table.line_start_offset(4), None);
    }

    #[test]
    fn test_offset_to_line_col() {
        let source = "abc\ndefgh\nij";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
        assert_eq!(table.offset_to_line_col(source, 2), (1, 3));
        assert_eq!(table.offset_to_line_col(source, 4), (2, 1));
        assert_eq!(table.offset_to_line_col(source, 7), (2, 4));
        assert_eq!(table.offset_to_line_col(source, 10), (3, 1));
    }

    #[test]
    fn test_unicode_columns() {
        let source = "αβγ\nδε";
        let table = LineOffsetTable::build(source);
        // Greek letters are 2 bytes each; columns still advance by 1.
        assert_eq!(table.offset_to_line_col(source, 2), (1, 2));
        assert_eq!(table.offset_to_line_col(source, 7), (2, 1));
    }

    #[test]
    fn test_empty_source() {
        let table = LineOffsetTable::build("");
        assert_eq!(table.line_count(), 1);
        assert_eq!(table.offset_to_line_col("", 0), (1, 1));
    }

    #[test]
    fn test_span_line() {
        let source = "a\nbb\nccc";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.span_line(Span::new(5, 8)), 3);
    }
}
