//! Recursive-descent parser turning a token stream into an AST.
//!
//! Mirrors the grammar's precedence chain directly: `statements` ->
//! `statement` -> `expr` -> `comp_expr` -> `arith_expr` -> `term` -> `factor`
//! -> `power` -> `call` -> `atom`. Each level calls the next, so precedence
//! falls out of the call structure rather than from a table.

use std::rc::Rc;

use crate::ast::{BinOpKind, Expr, IfCase, NumberLit, Stmt, Stmts, UnaryOpKind};
use crate::error::SpylangError;
use crate::lexer::{Keyword, Token, TokenKind};
use crate::position::Span;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Rewind the token cursor, used when a tentatively-parsed optional
    /// clause (e.g. a bare `extract` with no trailing expression) fails.
    fn reverse(&mut self, amount: usize) {
        self.pos = self.pos.saturating_sub(amount);
    }

    fn is_kind(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn is_keyword(&self, kw: Keyword) -> bool {
        self.current().is_keyword(kw)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SpylangError> {
        if self.current().kind == kind {
            Ok(self.advance())
        } else {
            Err(SpylangError::invalid_syntax(
                self.current().span.clone(),
                format!("expected {kind}, found {}", self.current().kind),
            ))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<Token, SpylangError> {
        if self.is_keyword(kw) {
            Ok(self.advance())
        } else {
            Err(SpylangError::invalid_syntax(
                self.current().span.clone(),
                format!("expected keyword '{kw}', found {}", self.current().kind),
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, Span), SpylangError> {
        if let TokenKind::Identifier(name) = &self.current().kind {
            let name = name.clone();
            let span = self.current().span.clone();
            self.advance();
            Ok((name, span))
        } else {
            Err(SpylangError::invalid_syntax(
                self.current().span.clone(),
                format!("expected identifier, found {}", self.current().kind),
            ))
        }
    }

    fn skip_newlines(&mut self) {
        while self.is_kind(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Parse the whole program: a `Stmts` block followed by EOF.
    pub fn parse_program(mut self) -> Result<Stmts, SpylangError> {
        let stmts = self.statements()?;
        if !self.is_kind(&TokenKind::Eof) {
            return Err(SpylangError::invalid_syntax(
                self.current().span.clone(),
                format!("unexpected token: {}", self.current().kind),
            ));
        }
        Ok(stmts)
    }

    fn statements(&mut self) -> Result<Stmts, SpylangError> {
        let mut statements = Vec::new();
        self.skip_newlines();
        statements.push(self.statement()?);

        while self.is_kind(&TokenKind::Newline) {
            self.skip_newlines();
            let checkpoint = self.pos;
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(_) => {
                    self.pos = checkpoint;
                    break;
                }
            }
        }

        Ok(Stmts::new(statements))
    }

    fn statement(&mut self) -> Result<Stmt, SpylangError> {
        let start = self.current().span.clone();

        if self.is_keyword(Keyword::Extract) {
            self.advance();
            let checkpoint = self.pos;
            let value = match self.expr() {
                Ok(expr) => Some(expr),
                Err(_) => {
                    self.pos = checkpoint;
                    None
                }
            };
            let span = start.merge(&self.current().span);
            return Ok(Stmt::Return { value, span });
        }

        if self.is_keyword(Keyword::Proceed) {
            self.advance();
            return Ok(Stmt::Continue {
                span: start.merge(&self.current().span),
            });
        }

        if self.is_keyword(Keyword::Abort) {
            self.advance();
            return Ok(Stmt::Break {
                span: start.merge(&self.current().span),
            });
        }

        self.expr().map(Stmt::Expr)
    }

    fn expr(&mut self) -> Result<Expr, SpylangError> {
        if self.is_keyword(Keyword::Assign) {
            let start = self.current().span.clone();
            self.advance();
            let (name, _) = self.expect_identifier()?;
            self.expect(TokenKind::Eq)?;
            let value = self.expr()?;
            let span = start.merge(value.span());
            return Ok(Expr::VarAssign {
                name,
                value: Box::new(value),
                span,
            });
        }

        if let TokenKind::Identifier(name) = &self.current().kind {
            let name = name.clone();
            let start = self.current().span.clone();
            let checkpoint = self.pos;
            self.advance();

            if self.is_kind(&TokenKind::Eq) {
                self.advance();
                let value = self.expr()?;
                let span = start.merge(value.span());
                return Ok(Expr::VarAssign {
                    name,
                    value: Box::new(value),
                    span,
                });
            }

            self.pos = checkpoint;
        }

        self.bin_op_kw(Self::comp_expr, &[Keyword::And, Keyword::Or])
    }

    fn comp_expr(&mut self) -> Result<Expr, SpylangError> {
        if self.is_keyword(Keyword::Not) {
            let start = self.current().span.clone();
            self.advance();
            let operand = self.comp_expr()?;
            let span = start.merge(operand.span());
            return Ok(Expr::UnaryOp {
                op: UnaryOpKind::Not,
                operand: Box::new(operand),
                span,
            });
        }

        self.bin_op(
            Self::range_expr,
            &[
                TokenKind::Ee,
                TokenKind::Ne,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Lte,
                TokenKind::Gte,
            ],
        )
    }

    /// `arith_expr ('..' arith_expr)?` - sits between comparisons and
    /// arithmetic so `1..3` is an ordinary expression (usable bare in
    /// `each i in 1..3 { .. }` as well as wrapped in parens).
    fn range_expr(&mut self) -> Result<Expr, SpylangError> {
        let start_value = self.arith_expr()?;

        if self.is_kind(&TokenKind::Range) {
            self.advance();
            let end_value = self.arith_expr()?;
            let span = start_value.span().merge(end_value.span());
            return Ok(Expr::Range {
                start: Box::new(start_value),
                end: Box::new(end_value),
                span,
            });
        }

        Ok(start_value)
    }

    fn arith_expr(&mut self) -> Result<Expr, SpylangError> {
        self.bin_op(Self::term, &[TokenKind::Plus, TokenKind::Minus])
    }

    fn term(&mut self) -> Result<Expr, SpylangError> {
        self.bin_op(Self::factor, &[TokenKind::Mul, TokenKind::Div, TokenKind::Mod])
    }

    fn factor(&mut self) -> Result<Expr, SpylangError> {
        let start = self.current().span.clone();
        match self.current().kind {
            TokenKind::Plus | TokenKind::Minus => {
                let neg = self.is_kind(&TokenKind::Minus);
                self.advance();
                let operand = self.factor()?;
                let span = start.merge(operand.span());
                Ok(if neg {
                    Expr::UnaryOp {
                        op: UnaryOpKind::Neg,
                        operand: Box::new(operand),
                        span,
                    }
                } else {
                    operand
                })
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, SpylangError> {
        let left = self.call()?;
        if self.is_kind(&TokenKind::Pow) {
            self.advance();
            let right = self.factor()?;
            let span = left.span().merge(right.span());
            return Ok(Expr::BinOp {
                left: Box::new(left),
                op: BinOpKind::Pow,
                right: Box::new(right),
                span,
            });
        }
        Ok(left)
    }

    fn call(&mut self) -> Result<Expr, SpylangError> {
        let callee = self.atom()?;

        if self.is_kind(&TokenKind::LParen) {
            let start = callee.span().clone();
            self.advance();
            let mut args = Vec::new();

            if !self.is_kind(&TokenKind::RParen) {
                args.push(self.expr()?);
                while self.is_kind(&TokenKind::Comma) {
                    self.advance();
                    args.push(self.expr()?);
                }
            }

            let end = self.expect(TokenKind::RParen)?;
            let span = start.merge(&end.span);
            return Ok(Expr::Call {
                callee: Box::new(callee),
                args,
                span,
            });
        }

        Ok(callee)
    }

    fn atom(&mut self) -> Result<Expr, SpylangError> {
        let tok = self.current().clone();

        match &tok.kind {
            TokenKind::Int(v) => {
                self.advance();
                Ok(Expr::Number {
                    value: NumberLit::Int(*v),
                    span: tok.span,
                })
            }
            TokenKind::Float(v) => {
                self.advance();
                Ok(Expr::Number {
                    value: NumberLit::Float(*v),
                    span: tok.span,
                })
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str {
                    value: s.clone(),
                    span: tok.span,
                })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::VarAccess {
                    name: name.clone(),
                    span: tok.span,
                })
            }
            TokenKind::LParen => {
                self.advance();
                // `range_expr` is reachable through `expr`, so `(a..b)` is
                // just an ordinary parenthesized expression.
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LSquare => self.list_expr(),
            TokenKind::Keyword(Keyword::Check) => self.if_expr(),
            TokenKind::Keyword(Keyword::Each) => self.for_expr(),
            TokenKind::Keyword(Keyword::Chase) => self.while_expr(),
            TokenKind::Keyword(Keyword::Mission) => self.func_def(),
            _ => Err(SpylangError::invalid_syntax(
                tok.span,
                format!(
                    "expected int, float, identifier, '+', '-', '(', '[', 'check', 'each', 'chase' or 'mission', found {}",
                    tok.kind
                ),
            )),
        }
    }

    fn list_expr(&mut self) -> Result<Expr, SpylangError> {
        let start = self.expect(TokenKind::LSquare)?.span;
        let mut elements = Vec::new();

        if !self.is_kind(&TokenKind::RSquare) {
            elements.push(self.expr()?);
            while self.is_kind(&TokenKind::Comma) {
                self.advance();
                elements.push(self.expr()?);
            }
        }

        let end = self.expect(TokenKind::RSquare)?;
        Ok(Expr::List {
            elements,
            span: start.merge(&end.span),
        })
    }

    fn block(&mut self) -> Result<Stmts, SpylangError> {
        self.expect(TokenKind::LCurly)?;
        self.skip_newlines();
        let body = self.statements()?;
        self.skip_newlines();
        self.expect(TokenKind::RCurly)?;
        Ok(body)
    }

    fn if_expr(&mut self) -> Result<Expr, SpylangError> {
        let start = self.expect_keyword(Keyword::Check)?.span;
        let condition = self.expr()?;
        let body = self.block()?;

        let mut cases = vec![IfCase { condition, body }];
        let mut span = start.clone();

        while self.is_keyword(Keyword::Followup) {
            self.advance();
            let condition = self.expr()?;
            let body = self.block()?;
            cases.push(IfCase { condition, body });
        }

        let mut else_body = None;
        if self.is_keyword(Keyword::Otherwise) {
            self.advance();
            else_body = Some(self.block()?);
        }

        span = span.merge(&self.current().span);
        Ok(Expr::If {
            cases,
            else_body,
            span,
        })
    }

    fn for_expr(&mut self) -> Result<Expr, SpylangError> {
        let start = self.expect_keyword(Keyword::Each)?.span;
        let (var_name, _) = self.expect_identifier()?;
        self.expect_keyword(Keyword::In)?;
        let iterable = self.expr()?;
        let body = self.block()?;
        let span = start.merge(&self.current().span);

        Ok(Expr::For {
            var_name,
            iterable: Box::new(iterable),
            body,
            span,
        })
    }

    fn while_expr(&mut self) -> Result<Expr, SpylangError> {
        let start = self.expect_keyword(Keyword::Chase)?.span;
        let condition = self.expr()?;
        let body = self.block()?;
        let span = start.merge(&self.current().span);

        Ok(Expr::While {
            condition: Box::new(condition),
            body,
            span,
        })
    }

    fn func_def(&mut self) -> Result<Expr, SpylangError> {
        let start = self.expect_keyword(Keyword::Mission)?.span;

        let name = if let TokenKind::Identifier(name) = &self.current().kind {
            let name = name.clone();
            self.advance();
            Some(name)
        } else {
            None
        };

        self.expect(TokenKind::LParen)?;
        let mut arg_names = Vec::new();

        if let TokenKind::Identifier(name) = &self.current().kind {
            arg_names.push(name.clone());
            self.advance();

            while self.is_kind(&TokenKind::Comma) {
                self.advance();
                let (name, _) = self.expect_identifier()?;
                arg_names.push(name);
            }
        }

        self.expect(TokenKind::RParen)?;
        let body = self.block()?;
        let span = start.merge(&self.current().span);

        Ok(Expr::FuncDef {
            name,
            arg_names,
            body: Rc::new(body),
            auto_return: false,
            span,
        })
    }

    /// Left-associative binary-operator chain over punctuation tokens
    /// (arithmetic, comparison).
    fn bin_op(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, SpylangError>,
        ops: &[TokenKind],
    ) -> Result<Expr, SpylangError> {
        let mut left = operand(self)?;

        while ops.contains(&self.current().kind) {
            let op_kind = BinOpKind::from_token(&self.current().kind)
                .expect("token was matched from `ops`, so it must map to a BinOpKind");
            self.advance();
            let right = operand(self)?;
            let span = left.span().merge(right.span());
            left = Expr::BinOp {
                left: Box::new(left),
                op: op_kind,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    /// Left-associative binary-operator chain over `and`/`or` keywords.
    fn bin_op_kw(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, SpylangError>,
        kws: &[Keyword],
    ) -> Result<Expr, SpylangError> {
        let mut left = operand(self)?;

        loop {
            let matched = kws.iter().find(|kw| self.is_keyword(**kw));
            let Some(kw) = matched else { break };
            let op_kind =
                BinOpKind::from_token(&TokenKind::Keyword(*kw)).expect("kw is and/or");
            self.advance();
            let right = operand(self)?;
            let span = left.span().merge(right.span());
            left = Expr::BinOp {
                left: Box::new(left),
                op: op_kind,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }
}

/// Lex and parse a complete source string into a `Stmts` program.
pub fn parse(tokens: Vec<Token>) -> Result<Stmts, SpylangError> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use std::rc::Rc;

    fn parse_src(src: &str) -> Stmts {
        let file: Rc<str> = Rc::from("<test>");
        let source: Rc<str> = Rc::from(src);
        let tokens = Lexer::new(file, &source).lex().expect("lex ok");
        parse(tokens).expect("parse ok")
    }

    #[test]
    fn parses_assign_statement() {
        let stmts = parse_src("assign x = 1 + 2");
        assert_eq!(stmts.statements.len(), 1);
        match &stmts.statements[0] {
            Stmt::Expr(Expr::VarAssign { name, .. }) => assert_eq!(name, "x"),
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn parses_identifier_reassignment_without_keyword() {
        let stmts = parse_src("x = 5");
        match &stmts.statements[0] {
            Stmt::Expr(Expr::VarAssign { name, .. }) => assert_eq!(name, "x"),
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn parses_if_followup_otherwise() {
        let stmts = parse_src("check 1 { extract 1 } followup 2 { extract 2 } otherwise { extract 3 }");
        match &stmts.statements[0] {
            Stmt::Expr(Expr::If { cases, else_body, .. }) => {
                assert_eq!(cases.len(), 2);
                assert!(else_body.is_some());
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn parses_each_over_range() {
        let stmts = parse_src("each i in (1..3) { extract i }");
        match &stmts.statements[0] {
            Stmt::Expr(Expr::For { var_name, iterable, .. }) => {
                assert_eq!(var_name, "i");
                assert!(matches!(**iterable, Expr::Range { .. }));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn parses_each_over_bare_range() {
        let stmts = parse_src("each i in 1..3 { extract i }");
        match &stmts.statements[0] {
            Stmt::Expr(Expr::For { var_name, iterable, .. }) => {
                assert_eq!(var_name, "i");
                assert!(matches!(**iterable, Expr::Range { .. }));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn parses_mission_with_args_and_call() {
        let stmts = parse_src("mission add(a, b) { extract a + b }\nadd(1, 2)");
        assert_eq!(stmts.statements.len(), 2);
        match &stmts.statements[1] {
            Stmt::Expr(Expr::Call { args, .. }) => assert_eq!(args.len(), 2),
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn parses_list_literal_and_not_operator() {
        let stmts = parse_src("not [1, 2, 3]");
        match &stmts.statements[0] {
            Stmt::Expr(Expr::UnaryOp { op: UnaryOpKind::Not, operand, .. }) => {
                assert!(matches!(**operand, Expr::List { .. }));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn rejects_trailing_garbage() {
        let file: Rc<str> = Rc::from("<test>");
        let source: Rc<str> = Rc::from("1 2");
        let tokens = Lexer::new(file, &source).lex().expect("lex ok");
        assert!(parse(tokens).is_err());
    }
}
