//! Token types for the Flex lexer.

use std::fmt;

use crate::Span;

/// Reserved words of the language.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Keyword {
    This,
    Is,
    And,
    Or,
    Not,
    If,
    Elif,
    Else,
    For,
    To,
    Step,
    Do,
    Until,
    Enclose,
    Task,
    Give,
    Proceed,
    Stop,
}

impl Keyword {
    /// Classify an identifier, returning `None` for ordinary names.
    pub fn from_ident(ident: &str) -> Option<Keyword> {
        Some(match ident {
            "this" => Keyword::This,
            "is" => Keyword::Is,
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "not" => Keyword::Not,
            "if" => Keyword::If,
            "elif" => Keyword::Elif,
            "else" => Keyword::Else,
            "for" => Keyword::For,
            "to" => Keyword::To,
            "step" => Keyword::Step,
            "do" => Keyword::Do,
            "until" => Keyword::Until,
            "enclose" => Keyword::Enclose,
            "task" => Keyword::Task,
            "give" => Keyword::Give,
            "proceed" => Keyword::Proceed,
            "stop" => Keyword::Stop,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::This => "this",
            Keyword::Is => "is",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::If => "if",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::For => "for",
            Keyword::To => "to",
            Keyword::Step => "step",
            Keyword::Do => "do",
            Keyword::Until => "until",
            Keyword::Enclose => "enclose",
            Keyword::Task => "task",
            Keyword::Give => "give",
            Keyword::Proceed => "proceed",
            Keyword::Stop => "stop",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token kind, carrying the literal payload where one exists.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Keyword(Keyword),

    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Eq,
    Ne,
    Lt,
    Gt,
    LtEq,
    GtEq,

    /// Statement separator, from `\n` or `;`.
    Newline,
    Eof,
}

impl TokenKind {
    /// Render as `KIND` or `KIND:value`, the format the `lex` command
    /// and lexer tests print.
    pub fn render(&self) -> String {
        match self {
            TokenKind::Int(v) => format!("INT:{v}"),
            TokenKind::Float(v) => format!("FLOAT:{v}"),
            TokenKind::Str(s) => format!("STRING:{s}"),
            TokenKind::Ident(name) => format!("IDENT:{name}"),
            TokenKind::Keyword(kw) => format!("KEYWORD:{kw}"),
            TokenKind::Plus => "PLUS".to_string(),
            TokenKind::Minus => "MINUS".to_string(),
            TokenKind::Star => "MUL".to_string(),
            TokenKind::Slash => "DIV".to_string(),
            TokenKind::Caret => "POW".to_string(),
            TokenKind::LParen => "LPAREN".to_string(),
            TokenKind::RParen => "RPAREN".to_string(),
            TokenKind::LBracket => "LSQUARE".to_string(),
            TokenKind::RBracket => "RSQUARE".to_string(),
            TokenKind::Comma => "COMMA".to_string(),
            TokenKind::Eq => "EE".to_string(),
            TokenKind::Ne => "NE".to_string(),
            TokenKind::Lt => "LT".to_string(),
            TokenKind::Gt => "GT".to_string(),
            TokenKind::LtEq => "LTE".to_string(),
            TokenKind::GtEq => "GTE".to_string(),
            TokenKind::Newline => "NEWLINE".to_string(),
            TokenKind::Eof => "EOF".to_string(),
        }
    }

    /// Check for a specific keyword without destructuring at call sites.
    #[inline]
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == kw)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A token with its span in the source.
#[derive(Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

/// Sequence of tokens for a source, always terminated by `Eof`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenList { tokens }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
