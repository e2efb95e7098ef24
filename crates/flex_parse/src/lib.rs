//! Recursive-descent parser for Flex.
//!
//! Consumes a `TokenList` and produces a `Program` (node arena plus
//! root statement sequence). Statement continuations and optional
//! `give` payloads are parsed speculatively with exact rollback;
//! among failed speculations, the error that consumed the most
//! tokens wins.

mod cursor;
mod error;
mod parser;
mod snapshot;

pub use cursor::Cursor;
pub use error::ParseError;
pub use parser::parse;
pub use snapshot::ParserSnapshot;
