//! Parser state snapshots for speculative parsing.
//!
//! A snapshot records the cursor position before a speculative parse.
//! Restoring rolls back exactly the tokens the failed attempt
//! consumed; nodes it allocated stay in the arena unreferenced, which
//! is cheaper than rewinding the arena and harmless to evaluation.

/// Saved parser position.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ParserSnapshot {
    pub(crate) cursor_pos: usize,
}

impl ParserSnapshot {
    pub(crate) fn new(cursor_pos: usize) -> Self {
        ParserSnapshot { cursor_pos }
    }
}
