//! Diagnostic values and their rendered form.

use std::fmt;
use std::fmt::Write as _;
use std::rc::Rc;

use flex_ir::{Source, Span};

use crate::span_utils::LineOffsetTable;

/// Error category, printed as the diagnostic header tag.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Category {
    IllegalCharacter,
    InvalidSyntax,
    RuntimeError,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::IllegalCharacter => "Illegal Character",
            Category::InvalidSyntax => "Invalid Syntax",
            Category::RuntimeError => "Runtime Error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One traceback entry: where in which source a frame was entered,
/// and the frame's display name.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceFrame {
    pub source: Rc<Source>,
    pub span: Span,
    pub name: String,
}

/// An immutable error report. Built once by the failing stage, never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub category: Category,
    pub detail: String,
    pub source: Rc<Source>,
    pub span: Span,
    /// Oldest frame first. Only runtime errors carry frames.
    pub traceback: Vec<TraceFrame>,
}

impl Diagnostic {
    pub fn new(
        category: Category,
        detail: impl Into<String>,
        source: Rc<Source>,
        span: Span,
    ) -> Self {
        Diagnostic {
            category,
            detail: detail.into(),
            source,
            span,
            traceback: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_traceback(mut self, frames: Vec<TraceFrame>) -> Self {
        self.traceback = frames;
        self
    }

    /// Render the full report.
    ///
    /// Lexical and syntax errors print a header and the offending
    /// location; runtime errors print the traceback first:
    ///
    /// ```text
    /// Traceback (most recent call last):
    /// File <stdin>, line 1, in <program>
    /// File <stdin>, line 1, in add
    /// Runtime Error: Division by zero
    ///
    /// task add(a, b)
    /// ^^^^^^^^^^^^^^
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.category == Category::RuntimeError && !self.traceback.is_empty() {
            out.push_str("Traceback (most recent call last):\n");
            for frame in &self.traceback {
                let table = LineOffsetTable::build(&frame.source.text);
                let line = table.span_line(frame.span);
                let _ = writeln!(
                    out,
                    "File {}, line {}, in {}",
                    frame.source.name, line, frame.name
                );
            }
            let _ = write!(out, "{}: {}", self.category, self.detail);
        } else {
            let table = LineOffsetTable::build(&self.source.text);
            let line = table.span_line(self.span);
            let _ = writeln!(out, "{}: {}", self.category, self.detail);
            let _ = write!(out, "File {}, line {}", self.source.name, line);
        }
        out.push_str("\n\n");
        out.push_str(&excerpt_with_carets(&self.source.text, self.span));
        out
    }
}

/// Reproduce the spanned source line(s) with a caret underline.
///
/// The first line is underlined from the span's start column, middle
/// lines fully, the last line up to the span's end column. At least
/// one caret is always printed so zero-width spans stay visible.
pub fn excerpt_with_carets(text: &str, span: Span) -> String {
    let table = LineOffsetTable::build(text);
    let (start_line, start_col) = table.offset_to_line_col(text, span.start);
    let (end_line, end_col) = table.offset_to_line_col(text, span.end);

    let mut out = String::new();
    for line_no in start_line..=end_line {
        let line = table.line_text(text, line_no).unwrap_or("");
        let line_len = line.chars().count();
        let col_start = if line_no == start_line {
            (start_col - 1) as usize
        } else {
            0
        };
        let col_end = if line_no == end_line {
            (end_col - 1) as usize
        } else {
            line_len
        };
        let carets = col_end.saturating_sub(col_start).max(1);

        out.push_str(line);
        out.push('\n');
        out.push_str(&" ".repeat(col_start));
        out.push_str(&"^".repeat(carets));
        if line_no != end_line {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn source(text: &str) -> Rc<Source> {
        Source::new("<stdin>", text)
    }

    #[test]
    fn test_excerpt_single_line() {
        let text = "this x is y + 1";
        // span covers `y`
        let excerpt = excerpt_with_carets(text, Span::new(10, 11));
        assert_eq!(excerpt, "this x is y + 1\n          ^");
    }

    #[test]
    fn test_excerpt_full_token_range() {
        let excerpt = excerpt_with_carets("5 / 0", Span::new(4, 5));
        assert_eq!(excerpt, "5 / 0\n    ^");
    }

    #[test]
    fn test_excerpt_multi_line() {
        let text = "abc\ndefgh\nij";
        // from `b` on line 1 through `d` on line 2
        let excerpt = excerpt_with_carets(text, Span::new(1, 5));
        assert_eq!(excerpt, "abc\n ^^\ndefgh\n^");
    }

    #[test]
    fn test_excerpt_empty_span_keeps_one_caret() {
        let excerpt = excerpt_with_carets("x", Span::point(1));
        assert_eq!(excerpt, "x\n ^");
    }

    #[test]
    fn test_render_syntax_error() {
        let src = source("1 +");
        let diag = Diagnostic::new(
            Category::InvalidSyntax,
            "Expected int, float, identifier, '+', '-', '(' or '['",
            Rc::clone(&src),
            Span::new(3, 3),
        );
        let rendered = diag.render();
        assert!(rendered.starts_with(
            "Invalid Syntax: Expected int, float, identifier, '+', '-', '(' or '['\nFile <stdin>, line 1\n\n"
        ));
        assert!(rendered.contains("1 +"));
    }

    #[test]
    fn test_render_runtime_error_with_traceback() {
        let src = source("boom()");
        let diag = Diagnostic::new(
            Category::RuntimeError,
            "Division by zero",
            Rc::clone(&src),
            Span::new(0, 6),
        )
        .with_traceback(vec![
            TraceFrame {
                source: Rc::clone(&src),
                span: Span::new(0, 6),
                name: "<program>".to_string(),
            },
            TraceFrame {
                source: Rc::clone(&src),
                span: Span::new(0, 6),
                name: "boom".to_string(),
            },
        ]);
        let rendered = diag.render();
        let expected_head = "Traceback (most recent call last):\n\
                             File <stdin>, line 1, in <program>\n\
                             File <stdin>, line 1, in boom\n\
                             Runtime Error: Division by zero\n\n";
        assert!(rendered.starts_with(expected_head), "got: {rendered}");
    }

    #[test]
    fn test_render_runtime_error_without_frames() {
        let src = source("x");
        let diag = Diagnostic::new(
            Category::RuntimeError,
            "'x' is not defined",
            Rc::clone(&src),
            Span::new(0, 1),
        );
        let rendered = diag.render();
        assert!(rendered.starts_with("Runtime Error: 'x' is not defined\nFile <stdin>, line 1\n\n"));
    }
}
