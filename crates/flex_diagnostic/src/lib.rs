//! Diagnostic construction and rendering.
//!
//! Every reported failure carries a category, a detail message, and a
//! span into its source. Rendering reproduces the offending line(s)
//! with a caret underline; runtime errors additionally print a
//! traceback of the frames that were live when the error occurred.

mod diagnostic;
pub mod span_utils;

pub use diagnostic::{excerpt_with_carets, Category, Diagnostic, TraceFrame};
