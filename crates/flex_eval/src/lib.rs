//! Tree-walking evaluator for Flex.
//!
//! Evaluation is an ordinary recursive walk over the node arena.
//! Every non-value outcome (runtime error, `give`, `proceed`, `stop`)
//! travels as an [`Unwind`] through `Result`, so `?` after each child
//! realizes the unwind-immediately rule.

mod environment;
mod error;
mod frame;
mod interp;
mod ops;
mod value;

pub use environment::ScopeRef;
pub use error::{RuntimeError, RuntimeErrorKind};
pub use frame::Frame;
pub use interp::{Interpreter, Unwind};
pub use value::{TaskFn, Value};
