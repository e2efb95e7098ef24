//! Runtime error values.

use std::rc::Rc;

use thiserror::Error;

use flex_diagnostic::{Category, Diagnostic, TraceFrame};
use flex_ir::{Source, Span};

/// What went wrong. The display form is the user-visible detail line.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeErrorKind {
    #[error("Illegal operation")]
    IllegalOperation,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("'{0}' is not defined")]
    UndefinedVariable(String),
    #[error("Element at this index could not be retrieved from list because index is out of bounds")]
    IndexOutOfBounds,
    #[error("Element at this index could not be removed from list because index is out of bounds")]
    RemoveIndexOutOfBounds,
    #[error("{missing} too few args passed into {callee}")]
    TooFewArgs { missing: usize, callee: String },
    #[error("{extra} too many args passed into {callee}")]
    TooManyArgs { extra: usize, callee: String },
    #[error("'proceed' used outside of a loop")]
    ProceedOutsideLoop,
    #[error("'stop' used outside of a loop")]
    StopOutsideLoop,
    #[error("'step' expression must not be zero")]
    ZeroStep,
    #[error("maximum recursion depth exceeded")]
    RecursionLimit,
}

/// A runtime failure with the frames that were live when it was
/// raised. Immutable once constructed.
// Not derived via `thiserror`: the `source` field holds the program
// source text, which the derive would otherwise treat as an error cause.
#[derive(Clone, Debug)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
    pub source: Rc<Source>,
    /// Traceback entries, oldest frame first.
    pub frames: Vec<TraceFrame>,
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for RuntimeError {}

impl RuntimeError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(
            Category::RuntimeError,
            self.kind.to_string(),
            Rc::clone(&self.source),
            self.span,
        )
        .with_traceback(self.frames.clone())
    }
}
