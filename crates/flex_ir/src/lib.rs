//! Core data types shared across the Flex interpreter pipeline.
//!
//! Spans, source handles, tokens, and the AST node arena. Pure data,
//! no behavior beyond construction and rendering.

mod ast;
mod source;
mod span;
mod token;

pub use ast::{BinaryOp, IfCase, Node, NodeArena, NodeId, NodeKind, Program, UnaryOp};
pub use source::Source;
pub use span::Span;
pub use token::{Keyword, Token, TokenKind, TokenList};
