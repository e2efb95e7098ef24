//! The recursive-descent grammar.
//!
//! Precedence, loosest to tightest: assignment (`this … is …`) →
//! `and`/`or` → comparisons and unary `not` → `+`/`-` → `*`/`/` →
//! unary prefix `+`/`-` → `^` (right-recursive through the unary
//! level) → postfix call → atom.

use tracing::trace;

use flex_ir::{
    BinaryOp, IfCase, Keyword, NodeArena, NodeId, NodeKind, Program, Source, Span, TokenKind,
    TokenList, UnaryOp,
};

use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::snapshot::ParserSnapshot;

const ATOM_EXPECTED: &str =
    "Expected int, float, identifier, '+', '-', '(', '[', 'if', 'for', 'until' or 'task'";

/// Maximum expression nesting before the parser gives up. Keeps
/// pathological inputs (thousands of nested parentheses or unary
/// prefixes) from exhausting the native stack.
const MAX_EXPR_DEPTH: usize = 256;

/// Parse a token list into a program.
///
/// A successful parse that leaves tokens before the end marker is an
/// error at the first leftover token.
pub fn parse(source: &Source, tokens: &TokenList) -> Result<Program, ParseError> {
    trace!(source = %source.name, tokens = tokens.len(), "parse");
    let mut parser = Parser::new(tokens);

    let root = match parser.statements() {
        Ok(root) => root,
        Err(err) => return Err(parser.select_error(err)),
    };

    if !parser.cursor.at_eof() {
        let err = parser.error_here("Token cannot appear after previous tokens");
        return Err(parser.select_error(err));
    }

    Ok(Program {
        arena: parser.arena,
        root,
    })
}

struct Parser<'t> {
    cursor: Cursor<'t>,
    arena: NodeArena,
    /// Deepest error discarded by a speculative parse.
    best_discarded: Option<ParseError>,
    /// Current expression nesting depth, bounded by [`MAX_EXPR_DEPTH`].
    depth: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t TokenList) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            arena: NodeArena::new(),
            best_discarded: None,
            depth: 0,
        }
    }

    /// Enter one level of expression nesting, erroring past the cap.
    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err(self.error_here("Expression nesting is too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    #[cold]
    fn error_here(&self, detail: impl Into<String>) -> ParseError {
        ParseError {
            detail: detail.into(),
            span: self.cursor.current().span,
            consumed: self.cursor.position(),
        }
    }

    fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot::new(self.cursor.position())
    }

    fn restore(&mut self, snapshot: ParserSnapshot) {
        self.cursor.set_position(snapshot.cursor_pos);
    }

    /// Keep the deeper of the recorded and the newly discarded error.
    fn record_discarded(&mut self, err: ParseError) {
        match &self.best_discarded {
            Some(best) if best.consumed >= err.consumed => {}
            _ => self.best_discarded = Some(err),
        }
    }

    /// Furthest-progress selection between the propagated error and
    /// anything discarded during speculation.
    fn select_error(&mut self, err: ParseError) -> ParseError {
        match self.best_discarded.take() {
            Some(best) if best.consumed > err.consumed => best,
            _ => err,
        }
    }

    fn expect_keyword(&mut self, kw: Keyword, detail: &str) -> Result<Span, ParseError> {
        if self.cursor.at_keyword(kw) {
            let span = self.cursor.current().span;
            self.cursor.advance();
            Ok(span)
        } else {
            Err(self.error_here(detail))
        }
    }

    fn expect(&mut self, kind: &TokenKind, detail: &str) -> Result<Span, ParseError> {
        if self.cursor.at(kind) {
            let span = self.cursor.current().span;
            self.cursor.advance();
            Ok(span)
        } else {
            Err(self.error_here(detail))
        }
    }

    fn expect_ident(&mut self, detail: &str) -> Result<(String, Span), ParseError> {
        let token = self.cursor.current();
        if let TokenKind::Ident(name) = &token.kind {
            let name = name.clone();
            let span = token.span;
            self.cursor.advance();
            Ok((name, span))
        } else {
            Err(self.error_here(detail))
        }
    }

    // statements: NEWLINE* statement (NEWLINE+ statement)* NEWLINE*
    fn statements(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.current().span;
        let mut stmts = Vec::new();

        self.cursor.skip_newlines();
        stmts.push(self.statement()?);

        loop {
            if self.cursor.skip_newlines() == 0 {
                break;
            }
            // Speculative continuation: a failed statement rolls the
            // cursor back and ends the sequence without failing it.
            let snapshot = self.snapshot();
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.record_discarded(err);
                    self.restore(snapshot);
                    break;
                }
            }
        }

        let span = start.merge(self.cursor.prev_span());
        Ok(self.arena.alloc(NodeKind::List(stmts), span))
    }

    // statement: 'give' expr? | 'proceed' | 'stop' | expr
    fn statement(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.current().span;

        if self.cursor.eat_keyword(Keyword::Give) {
            // The payload is optional; a failed parse is rolled back.
            let snapshot = self.snapshot();
            let value = match self.expr() {
                Ok(value) => Some(value),
                Err(err) => {
                    self.record_discarded(err);
                    self.restore(snapshot);
                    None
                }
            };
            let span = start.merge(self.cursor.prev_span());
            return Ok(self.arena.alloc(NodeKind::Return { value }, span));
        }

        if self.cursor.eat_keyword(Keyword::Proceed) {
            return Ok(self.arena.alloc(NodeKind::Continue, start));
        }

        if self.cursor.eat_keyword(Keyword::Stop) {
            return Ok(self.arena.alloc(NodeKind::Break, start));
        }

        self.expr()
    }

    // expr: 'this' IDENT 'is' expr | comp (('and'|'or') comp)*
    //
    // Expression recursion cycles re-enter the grammar through here
    // (`this … is` values), `comp_expr` (`not` chains), or `factor`
    // (unary signs, `^` right operands); all three count depth.
    fn expr(&mut self) -> Result<NodeId, ParseError> {
        self.descend()?;
        let result = self.expr_inner();
        self.depth -= 1;
        result
    }

    fn expr_inner(&mut self) -> Result<NodeId, ParseError> {
        if self.cursor.at_keyword(Keyword::This) {
            let start = self.cursor.current().span;
            self.cursor.advance();
            let (name, _) = self.expect_ident("Expected identifier")?;
            self.expect_keyword(Keyword::Is, "Expected 'is'")?;
            let value = self.expr()?;
            let span = start.merge(self.arena.span(value));
            return Ok(self.arena.alloc(NodeKind::Assign { name, value }, span));
        }

        let mut lhs = self.comp_expr()?;
        loop {
            let op = if self.cursor.at_keyword(Keyword::And) {
                BinaryOp::And
            } else if self.cursor.at_keyword(Keyword::Or) {
                BinaryOp::Or
            } else {
                break;
            };
            self.cursor.advance();
            let rhs = self.comp_expr()?;
            lhs = self.alloc_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    // comp: 'not' comp | arith (('='|'!'|'<'|'>'|'<='|'>=') arith)*
    fn comp_expr(&mut self) -> Result<NodeId, ParseError> {
        self.descend()?;
        let result = self.comp_expr_inner();
        self.depth -= 1;
        result
    }

    fn comp_expr_inner(&mut self) -> Result<NodeId, ParseError> {
        if self.cursor.at_keyword(Keyword::Not) {
            let start = self.cursor.current().span;
            self.cursor.advance();
            let operand = self.comp_expr()?;
            let span = start.merge(self.arena.span(operand));
            return Ok(self.arena.alloc(
                NodeKind::Unary {
                    op: UnaryOp::Not,
                    operand,
                },
                span,
            ));
        }

        let mut lhs = self.arith_expr()?;
        loop {
            let op = match self.cursor.current().kind {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.cursor.advance();
            let rhs = self.arith_expr()?;
            lhs = self.alloc_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn arith_expr(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.cursor.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.cursor.advance();
            let rhs = self.term()?;
            lhs = self.alloc_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.cursor.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.cursor.advance();
            let rhs = self.factor()?;
            lhs = self.alloc_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    // factor: ('+'|'-') factor | power
    fn factor(&mut self) -> Result<NodeId, ParseError> {
        self.descend()?;
        let result = self.factor_inner();
        self.depth -= 1;
        result
    }

    fn factor_inner(&mut self) -> Result<NodeId, ParseError> {
        let op = match self.cursor.current().kind {
            TokenKind::Plus => UnaryOp::Pos,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.power(),
        };
        let start = self.cursor.current().span;
        self.cursor.advance();
        let operand = self.factor()?;
        let span = start.merge(self.arena.span(operand));
        Ok(self.arena.alloc(NodeKind::Unary { op, operand }, span))
    }

    // power: call ('^' factor)*
    fn power(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.call()?;
        while self.cursor.at(&TokenKind::Caret) {
            self.cursor.advance();
            let rhs = self.factor()?;
            lhs = self.alloc_binary(BinaryOp::Pow, lhs, rhs);
        }
        Ok(lhs)
    }

    // call: atom ('(' (expr (',' expr)*)? ')')?
    fn call(&mut self) -> Result<NodeId, ParseError> {
        let callee = self.atom()?;
        if !self.cursor.eat(&TokenKind::LParen) {
            return Ok(callee);
        }

        let mut args = Vec::new();
        if !self.cursor.eat(&TokenKind::RParen) {
            args.push(self.expr()?);
            while self.cursor.eat(&TokenKind::Comma) {
                args.push(self.expr()?);
            }
            self.expect(&TokenKind::RParen, "Expected ',' or ')'")?;
        }

        let span = self.arena.span(callee).merge(self.cursor.prev_span());
        Ok(self.arena.alloc(NodeKind::Call { callee, args }, span))
    }

    fn atom(&mut self) -> Result<NodeId, ParseError> {
        let token = self.cursor.current();
        let span = token.span;
        match &token.kind {
            TokenKind::Int(value) => {
                #[allow(clippy::cast_precision_loss)]
                let value = *value as f64;
                self.cursor.advance();
                Ok(self.arena.alloc(NodeKind::Number(value), span))
            }
            TokenKind::Float(value) => {
                let value = *value;
                self.cursor.advance();
                Ok(self.arena.alloc(NodeKind::Number(value), span))
            }
            TokenKind::Str(text) => {
                let text = text.clone();
                self.cursor.advance();
                Ok(self.arena.alloc(NodeKind::Str(text), span))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.cursor.advance();
                Ok(self.arena.alloc(NodeKind::Access { name }, span))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.expr()?;
                self.expect(&TokenKind::RParen, "Expected ')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => self.list_expr(),
            TokenKind::Keyword(Keyword::If) => self.if_expr(),
            TokenKind::Keyword(Keyword::For) => self.for_expr(),
            TokenKind::Keyword(Keyword::Until) => self.while_expr(),
            TokenKind::Keyword(Keyword::Task) => self.func_expr(),
            _ => Err(self.error_here(ATOM_EXPECTED)),
        }
    }

    // list: '[' (expr (',' expr)*)? ']'
    fn list_expr(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect(&TokenKind::LBracket, "Expected '['")?;

        let mut elements = Vec::new();
        if !self.cursor.eat(&TokenKind::RBracket) {
            elements.push(self.expr()?);
            while self.cursor.eat(&TokenKind::Comma) {
                elements.push(self.expr()?);
            }
            self.expect(&TokenKind::RBracket, "Expected ',' or ']'")?;
        }

        let span = start.merge(self.cursor.prev_span());
        Ok(self.arena.alloc(NodeKind::List(elements), span))
    }

    // if: 'if' expr 'do' body ('elif' expr 'do' body)* ('else' body)?
    // Block bodies run NEWLINE statements and end at 'enclose' (or
    // hand off to a following elif/else, whose arm then terminates
    // the whole construct).
    fn if_expr(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::If, "Expected 'if'")?;
        let mut cases = Vec::new();
        let mut else_body = None;
        let mut else_block = false;

        loop {
            let cond = self.expr()?;
            self.expect_keyword(Keyword::Do, "Expected 'do'")?;

            if self.cursor.eat(&TokenKind::Newline) {
                let body = self.statements()?;
                cases.push(IfCase {
                    cond,
                    body,
                    block: true,
                });
                if self.cursor.eat_keyword(Keyword::Enclose) {
                    break;
                }
                if self.cursor.eat_keyword(Keyword::Elif) {
                    continue;
                }
                if self.cursor.at_keyword(Keyword::Else) {
                    (else_body, else_block) = self.else_arm()?;
                    break;
                }
                return Err(self.error_here("Expected 'enclose', 'elif' or 'else'"));
            }

            let body = self.statement()?;
            cases.push(IfCase {
                cond,
                body,
                block: false,
            });
            if self.cursor.eat_keyword(Keyword::Elif) {
                continue;
            }
            if self.cursor.at_keyword(Keyword::Else) {
                (else_body, else_block) = self.else_arm()?;
            }
            break;
        }

        let span = start.merge(self.cursor.prev_span());
        Ok(self.arena.alloc(
            NodeKind::If {
                cases,
                else_body,
                else_block,
            },
            span,
        ))
    }

    fn else_arm(&mut self) -> Result<(Option<NodeId>, bool), ParseError> {
        self.expect_keyword(Keyword::Else, "Expected 'else'")?;
        if self.cursor.eat(&TokenKind::Newline) {
            let body = self.statements()?;
            self.expect_keyword(Keyword::Enclose, "Expected 'enclose'")?;
            Ok((Some(body), true))
        } else {
            let body = self.statement()?;
            Ok((Some(body), false))
        }
    }

    // for: 'for' IDENT 'is' expr 'to' expr ('step' expr)? 'do' body
    fn for_expr(&mut self) -> Result<NodeId, ParseError> {
        let start_span = self.expect_keyword(Keyword::For, "Expected 'for'")?;
        let (var, _) = self.expect_ident("Expected identifier")?;
        self.expect_keyword(Keyword::Is, "Expected 'is'")?;
        let start = self.expr()?;
        self.expect_keyword(Keyword::To, "Expected 'to'")?;
        let end = self.expr()?;

        let step = if self.cursor.eat_keyword(Keyword::Step) {
            Some(self.expr()?)
        } else {
            None
        };

        self.expect_keyword(Keyword::Do, "Expected 'do'")?;
        let (body, block) = self.loop_body()?;

        let span = start_span.merge(self.cursor.prev_span());
        Ok(self.arena.alloc(
            NodeKind::For {
                var,
                start,
                end,
                step,
                body,
                block,
            },
            span,
        ))
    }

    // until: 'until' expr 'do' body (a while loop; no negation)
    fn while_expr(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Until, "Expected 'until'")?;
        let cond = self.expr()?;
        self.expect_keyword(Keyword::Do, "Expected 'do'")?;
        let (body, block) = self.loop_body()?;

        let span = start.merge(self.cursor.prev_span());
        Ok(self
            .arena
            .alloc(NodeKind::While { cond, body, block }, span))
    }

    fn loop_body(&mut self) -> Result<(NodeId, bool), ParseError> {
        if self.cursor.eat(&TokenKind::Newline) {
            let body = self.statements()?;
            self.expect_keyword(Keyword::Enclose, "Expected 'enclose'")?;
            Ok((body, true))
        } else {
            Ok((self.statement()?, false))
        }
    }

    // task: 'task' IDENT? '(' (IDENT (',' IDENT)*)? ')' NEWLINE
    //       statements 'enclose'
    fn func_expr(&mut self) -> Result<NodeId, ParseError> {
        let start = self.expect_keyword(Keyword::Task, "Expected 'task'")?;

        let name = if let TokenKind::Ident(name) = &self.cursor.current().kind {
            let name = name.clone();
            self.cursor.advance();
            Some(name)
        } else {
            None
        };

        self.expect(&TokenKind::LParen, "Expected '('")?;
        let mut params = Vec::new();
        if !self.cursor.at(&TokenKind::RParen) {
            params.push(self.expect_ident("Expected identifier or ')'")?.0);
            while self.cursor.eat(&TokenKind::Comma) {
                params.push(self.expect_ident("Expected identifier")?.0);
            }
        }
        self.expect(&TokenKind::RParen, "Expected ',' or ')'")?;

        self.expect(&TokenKind::Newline, "Expected NEWLINE")?;
        let body = self.statements()?;
        self.expect_keyword(Keyword::Enclose, "Expected 'enclose'")?;

        let span = start.merge(self.cursor.prev_span());
        Ok(self.arena.alloc(
            NodeKind::TaskDef {
                name,
                params,
                body,
                auto_return: false,
            },
            span,
        ))
    }

    fn alloc_binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        let span = self.arena.span(lhs).merge(self.arena.span(rhs));
        self.arena.alloc(NodeKind::Binary { op, lhs, rhs }, span)
    }
}
