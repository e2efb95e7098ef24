//! Lexer for Flex using logos.
//!
//! A single forward pass over the source: logos produces raw tokens,
//! the conversion loop classifies identifiers against the keyword set,
//! unescapes string literals, and aborts on the first error with no
//! resynchronization.

use std::rc::Rc;

use logos::Logos;
use thiserror::Error;

use flex_diagnostic::{Category, Diagnostic};
use flex_ir::{Keyword, Source, Span, Token, TokenKind, TokenList};

/// Lexical failure. Tokenization stops at the first one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("illegal character '{ch}'")]
    IllegalChar { ch: char, span: Span },
    #[error("unterminated string literal")]
    UnterminatedString { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::IllegalChar { span, .. } | LexError::UnterminatedString { span } => *span,
        }
    }

    pub fn to_diagnostic(&self, source: &Rc<Source>) -> Diagnostic {
        match self {
            LexError::IllegalChar { ch, span } => Diagnostic::new(
                Category::IllegalCharacter,
                format!("'{ch}'"),
                Rc::clone(source),
                *span,
            ),
            LexError::UnterminatedString { span } => Diagnostic::new(
                Category::InvalidSyntax,
                "Expected '\"'",
                Rc::clone(source),
                *span,
            ),
        }
    }
}

/// Raw token from logos, before keyword classification and unescaping.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip horizontal whitespace
enum RawToken {
    /// A `#` comment swallows its trailing newline, so a commented
    /// line emits no separator token.
    #[regex(r"#[^\n]*\n?")]
    Comment,

    #[token("\n")]
    #[token(";")]
    Newline,

    #[regex(r"[0-9]+")]
    Int,
    /// At most one dot; a second dot ends the literal where it stands.
    #[regex(r"[0-9]+\.[0-9]*")]
    Float,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,
    /// A quote that never closes. Kept as its own variant so the
    /// error names the real problem instead of an illegal character.
    #[regex(r#""([^"\\]|\\.)*"#)]
    UnterminatedStr,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("!")]
    Ne,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
}

/// Tokenize a source, producing an `Eof`-terminated list or the first
/// lexical error.
pub fn tokenize(source: &Source) -> Result<TokenList, LexError> {
    let mut lexer = RawToken::lexer(&source.text);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let raw = match result {
            Ok(raw) => raw,
            Err(()) => {
                let ch = lexer
                    .slice()
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(LexError::IllegalChar { ch, span });
            }
        };

        let kind = match raw {
            RawToken::Comment => continue,
            RawToken::Newline => TokenKind::Newline,
            RawToken::Int => TokenKind::Int(lexer.slice().parse().unwrap_or(i64::MAX)),
            RawToken::Float => TokenKind::Float(lexer.slice().parse().unwrap_or(f64::MAX)),
            RawToken::Str => {
                let slice = lexer.slice();
                TokenKind::Str(unescape(&slice[1..slice.len() - 1]))
            }
            RawToken::UnterminatedStr => return Err(LexError::UnterminatedString { span }),
            RawToken::Ident => match Keyword::from_ident(lexer.slice()) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Ident(lexer.slice().to_string()),
            },
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Caret => TokenKind::Caret,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Ne => TokenKind::Ne,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
        };
        tokens.push(Token::new(kind, span));
    }

    let end = u32::try_from(source.text.len()).unwrap_or(u32::MAX);
    tokens.push(Token::new(TokenKind::Eof, Span::point(end)));
    Ok(TokenList::new(tokens))
}

/// Process string escapes. `\n` and `\t` substitute; any other escaped
/// character is kept literally.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lex(text: &str) -> Result<Vec<TokenKind>, LexError> {
        let source = Source::new("<test>", text);
        Ok(tokenize(&source)?.iter().map(|t| t.kind.clone()).collect())
    }

    fn render(text: &str) -> Vec<String> {
        let source = Source::new("<test>", text);
        match tokenize(&source) {
            Ok(tokens) => tokens.iter().map(|t| t.kind.render()).collect(),
            Err(err) => panic!("lex failed: {err}"),
        }
    }

    #[test]
    fn test_arithmetic_expression() {
        assert_eq!(
            render("2 + 3 * 4"),
            vec!["INT:2", "PLUS", "INT:3", "MUL", "INT:4", "EOF"]
        );
    }

    #[test]
    fn test_keywords_vs_identifiers() {
        assert_eq!(
            render("this count is 1"),
            vec!["KEYWORD:this", "IDENT:count", "KEYWORD:is", "INT:1", "EOF"]
        );
    }

    #[test]
    fn test_float_and_second_dot() {
        // The second dot ends the literal; the stray dot is illegal.
        let err = lex("1.2.3");
        assert_eq!(
            err,
            Err(LexError::IllegalChar {
                ch: '.',
                span: Span::new(3, 4)
            })
        );
        assert_eq!(render("1.2"), vec!["FLOAT:1.2", "EOF"]);
        assert_eq!(render("5."), vec!["FLOAT:5", "EOF"]);
    }

    #[test]
    fn test_comment_swallows_newline() {
        // The commented line contributes no NEWLINE token.
        assert_eq!(
            render("1 # note\n2"),
            vec!["INT:1", "INT:2", "EOF"]
        );
    }

    #[test]
    fn test_semicolon_is_separator() {
        assert_eq!(render("1;2"), vec!["INT:1", "NEWLINE", "INT:2", "EOF"]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            lex(r#""a\nb\tc\qd""#),
            Ok(vec![
                TokenKind::Str("a\nb\tcqd".to_string()),
                TokenKind::Eof
            ])
        );
    }

    #[test]
    fn test_escaped_quote_stays_inside() {
        assert_eq!(
            lex(r#""say \"hi\"""#),
            Ok(vec![
                TokenKind::Str("say \"hi\"".to_string()),
                TokenKind::Eof
            ])
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            lex("\"abc"),
            Err(LexError::UnterminatedString {
                span: Span::new(0, 4)
            })
        );
    }

    #[test]
    fn test_two_char_comparisons() {
        assert_eq!(
            render("a <= b >= c < d > e = f ! g"),
            vec![
                "IDENT:a", "LTE", "IDENT:b", "GTE", "IDENT:c", "LT", "IDENT:d", "GT", "IDENT:e",
                "EE", "IDENT:f", "NE", "IDENT:g", "EOF"
            ]
        );
    }

    #[test]
    fn test_illegal_character_aborts() {
        assert_eq!(
            lex("1 @ 2"),
            Err(LexError::IllegalChar {
                ch: '@',
                span: Span::new(2, 3)
            })
        );
    }

    #[test]
    fn test_eof_span_at_end() {
        let source = Source::new("<test>", "ab");
        let tokens = match tokenize(&source) {
            Ok(tokens) => tokens,
            Err(err) => panic!("lex failed: {err}"),
        };
        let last = tokens.get(tokens.len() - 1).cloned();
        assert_eq!(
            last,
            Some(Token::new(TokenKind::Eof, Span::point(2)))
        );
    }
}
