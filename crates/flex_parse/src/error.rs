//! Parse error type.

use std::rc::Rc;

use thiserror::Error;

use flex_diagnostic::{Category, Diagnostic};
use flex_ir::{Source, Span};

/// A syntax failure at a token position.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct ParseError {
    pub detail: String,
    pub span: Span,
    /// Tokens consumed before the failure. Used to pick the deepest
    /// error when speculative parses are discarded.
    pub consumed: usize,
}

impl ParseError {
    pub fn to_diagnostic(&self, source: &Rc<Source>) -> Diagnostic {
        Diagnostic::new(
            Category::InvalidSyntax,
            self.detail.clone(),
            Rc::clone(source),
            self.span,
        )
    }
}
