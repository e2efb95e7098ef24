//! Token cursor.
//!
//! Thin position tracker over a `TokenList`. All lookahead and
//! consumption goes through here so snapshot/restore can roll the
//! parser back exactly.

use flex_ir::{Keyword, Span, Token, TokenKind, TokenList};

static EOF_TOKEN: Token = Token {
    kind: TokenKind::Eof,
    span: Span::DUMMY,
};

pub struct Cursor<'t> {
    tokens: &'t TokenList,
    pos: usize,
}

impl<'t> Cursor<'t> {
    pub fn new(tokens: &'t TokenList) -> Self {
        Cursor { tokens, pos: 0 }
    }

    /// The token under the cursor. Reads past the end return `Eof`.
    #[inline]
    pub fn current(&self) -> &'t Token {
        self.tokens.get(self.pos).unwrap_or(&EOF_TOKEN)
    }

    #[inline]
    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Span of the most recently consumed token.
    pub fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => self.current().span,
        }
    }

    #[inline]
    pub fn at(&self, kind: &TokenKind) -> bool {
        self.current().kind == *kind
    }

    #[inline]
    pub fn at_keyword(&self, kw: Keyword) -> bool {
        self.current().kind.is_keyword(kw)
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    /// Consume the token if it matches.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.at_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a run of separators, returning how many were eaten.
    pub fn skip_newlines(&mut self) -> usize {
        let mut count = 0;
        while self.at(&TokenKind::Newline) {
            self.advance();
            count += 1;
        }
        count
    }
}
