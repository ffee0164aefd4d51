pub mod ast;

use crate::diagnostics::CheckError;
use crate::lexer::token::Token;
use crate::span::{Span, Spanned};
use ast::*;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], source: &'a str) -> Self {
        Self { tokens, source, pos: 0 }
    }

    fn peek(&self) -> Option<&Spanned<Token>> {
        let mut i = self.pos;
        // Skip newlines when peeking
        while i < self.tokens.len() {
            if matches!(self.tokens[i].node, Token::Newline) {
                i += 1;
            } else {
                return Some(&self.tokens[i]);
            }
        }
        None
    }

    fn peek_raw(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Spanned<Token>> {
        if self.pos < self.tokens.len() {
            let tok = &self.tokens[self.pos];
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    fn skip_newlines(&mut self) {
        while self.pos < self.tokens.len()
            && matches!(self.tokens[self.pos].node, Token::Newline | Token::Semi)
        {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<Span, CheckError> {
        self.skip_newlines();
        match self.tokens.get(self.pos) {
            Some(tok) if std::mem::discriminant(&tok.node) == std::mem::discriminant(expected) => {
                self.pos += 1;
                Ok(self.tokens[self.pos - 1].span)
            }
            Some(tok) => Err(CheckError::syntax(
                format!("expected {expected}, found {}", tok.node),
                tok.span,
            )),
            None => Err(CheckError::syntax(
                format!("expected {expected}, found end of file"),
                self.eof_span(),
            )),
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, CheckError> {
        self.skip_newlines();
        match self.tokens.get(self.pos) {
            Some(tok) if matches!(tok.node, Token::Ident) => {
                let name = self.source[tok.span.start..tok.span.end].to_string();
                self.pos += 1;
                Ok(Spanned::new(name, tok.span))
            }
            Some(tok) => Err(CheckError::syntax(
                format!("expected identifier, found {}", tok.node),
                tok.span,
            )),
            None => Err(CheckError::syntax(
                "expected identifier, found end of file",
                self.eof_span(),
            )),
        }
    }

    fn eof_span(&self) -> Span {
        if let Some(last) = self.tokens.last() {
            Span::new(last.span.end, last.span.end)
        } else {
            Span::dummy()
        }
    }

    fn prev_end(&self) -> usize {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span.end
        } else {
            0
        }
    }

    fn consume_statement_end(&mut self) {
        if let Some(tok) = self.peek_raw() {
            if matches!(tok.node, Token::Newline | Token::Semi) {
                self.pos += 1;
            }
        }
    }

    /// True if the *raw* next token can begin a type expression. Used where a
    /// return type is optional and a newline must terminate the signature.
    fn at_type_start_raw(&self) -> bool {
        matches!(
            self.peek_raw().map(|t| &t.node),
            Some(Token::Ident | Token::Star | Token::Func | Token::Struct | Token::Interface)
        )
    }

    pub fn parse_file(&mut self) -> Result<File, CheckError> {
        let mut decls = Vec::new();
        self.skip_newlines();

        while let Some(tok) = self.peek() {
            let decl = match &tok.node {
                Token::Type => self.parse_type_decl()?,
                Token::Func => self.parse_func_decl()?,
                Token::Extern => self.parse_extern_fn()?,
                Token::Var => self.parse_var_decl()?,
                other => {
                    return Err(CheckError::syntax(
                        format!("expected declaration, found {other}"),
                        tok.span,
                    ));
                }
            };
            decls.push(decl);
            self.skip_newlines();
        }

        Ok(File { decls, span: Span::new(0, self.source.len()) })
    }

    fn parse_type_decl(&mut self) -> Result<Spanned<Decl>, CheckError> {
        let start = self.expect(&Token::Type)?.start;
        let name = self.expect_ident()?;
        let ty = self.parse_type_expr()?;
        let span = Span::new(start, ty.span.end);
        Ok(Spanned::new(Decl::Type(TypeDecl { name, ty }), span))
    }

    fn parse_func_decl(&mut self) -> Result<Spanned<Decl>, CheckError> {
        let start = self.expect(&Token::Func)?.start;

        let receiver = if matches!(self.peek().map(|t| &t.node), Some(Token::LParen)) {
            self.expect(&Token::LParen)?;
            let name = self.expect_ident()?;
            let ty = self.parse_type_expr()?;
            self.expect(&Token::RParen)?;
            Some(Param { name, ty })
        } else {
            None
        };

        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        let return_type = if self.at_type_start_raw() {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        let span = Span::new(start, body.span.end);
        Ok(Spanned::new(
            Decl::Func(FuncDecl { receiver, name, params, return_type, body }),
            span,
        ))
    }

    fn parse_extern_fn(&mut self) -> Result<Spanned<Decl>, CheckError> {
        let start = self.expect(&Token::Extern)?.start;
        self.expect(&Token::Func)?;
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        let return_type = if self.at_type_start_raw() {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        let span = Span::new(start, self.prev_end());
        Ok(Spanned::new(Decl::ExternFunc(ExternFnDecl { name, params, return_type }), span))
    }

    fn parse_var_decl(&mut self) -> Result<Spanned<Decl>, CheckError> {
        let (vd, span) = self.parse_var()?;
        Ok(Spanned::new(Decl::Var(vd), span))
    }

    fn parse_var(&mut self) -> Result<(VarDecl, Span), CheckError> {
        let start = self.expect(&Token::Var)?.start;
        let name = self.expect_ident()?;
        let ty = self.parse_type_expr()?;
        let span = Span::new(start, ty.span.end);
        Ok((VarDecl { name, ty }, span))
    }

    /// Parameter list with mandatory `name type` pairs, e.g. `(x int, r Router)`.
    fn parse_params(&mut self) -> Result<Vec<Param>, CheckError> {
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        loop {
            if matches!(self.peek().map(|t| &t.node), Some(Token::RParen)) {
                break;
            }
            let name = self.expect_ident()?;
            let ty = self.parse_type_expr()?;
            params.push(Param { name, ty });
            if matches!(self.peek().map(|t| &t.node), Some(Token::Comma)) {
                self.expect(&Token::Comma)?;
            } else {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        Ok(params)
    }

    pub fn parse_type_expr(&mut self) -> Result<Spanned<TypeExpr>, CheckError> {
        self.skip_newlines();
        let tok = self.peek().ok_or_else(|| {
            CheckError::syntax("expected type, found end of file", self.eof_span())
        })?;
        match &tok.node {
            Token::Star => {
                let start = self.expect(&Token::Star)?.start;
                let inner = self.parse_type_expr()?;
                let span = Span::new(start, inner.span.end);
                Ok(Spanned::new(TypeExpr::Pointer(Box::new(inner)), span))
            }
            Token::Func => {
                let start = self.expect(&Token::Func)?.start;
                self.expect(&Token::LParen)?;
                let mut params = Vec::new();
                loop {
                    if matches!(self.peek().map(|t| &t.node), Some(Token::RParen)) {
                        break;
                    }
                    params.push(self.parse_type_expr()?);
                    if matches!(self.peek().map(|t| &t.node), Some(Token::Comma)) {
                        self.expect(&Token::Comma)?;
                    } else {
                        break;
                    }
                }
                self.expect(&Token::RParen)?;
                let return_type = if self.at_type_start_raw() {
                    Some(Box::new(self.parse_type_expr()?))
                } else {
                    None
                };
                let span = Span::new(start, self.prev_end());
                Ok(Spanned::new(TypeExpr::Func { params, return_type }, span))
            }
            Token::Struct => {
                let start = self.expect(&Token::Struct)?.start;
                self.expect(&Token::LBrace)?;
                let mut fields = Vec::new();
                loop {
                    self.skip_newlines();
                    if matches!(self.peek_raw().map(|t| &t.node), Some(Token::RBrace)) {
                        break;
                    }
                    let name = self.expect_ident()?;
                    let ty = self.parse_type_expr()?;
                    fields.push(FieldDef { name, ty });
                    self.consume_statement_end();
                }
                let end = self.expect(&Token::RBrace)?.end;
                Ok(Spanned::new(TypeExpr::Struct(fields), Span::new(start, end)))
            }
            Token::Interface => {
                let start = self.expect(&Token::Interface)?.start;
                self.expect(&Token::LBrace)?;
                let mut methods = Vec::new();
                let mut embeds = Vec::new();
                loop {
                    self.skip_newlines();
                    if matches!(self.peek_raw().map(|t| &t.node), Some(Token::RBrace)) {
                        break;
                    }
                    let name = self.expect_ident()?;
                    if matches!(self.peek_raw().map(|t| &t.node), Some(Token::LParen)) {
                        let params = self.parse_params()?;
                        let return_type = if self.at_type_start_raw() {
                            Some(self.parse_type_expr()?)
                        } else {
                            None
                        };
                        methods.push(MethodSig { name, params, return_type });
                    } else {
                        let span = name.span;
                        embeds.push(Spanned::new(TypeExpr::Named(name.node), span));
                    }
                    self.consume_statement_end();
                }
                let end = self.expect(&Token::RBrace)?.end;
                Ok(Spanned::new(
                    TypeExpr::Interface { methods, embeds },
                    Span::new(start, end),
                ))
            }
            Token::Ident => {
                let name = self.expect_ident()?;
                let span = name.span;
                Ok(Spanned::new(TypeExpr::Named(name.node), span))
            }
            other => Err(CheckError::syntax(format!("expected type, found {other}"), tok.span)),
        }
    }

    fn parse_block(&mut self) -> Result<Spanned<Block>, CheckError> {
        let start = self.expect(&Token::LBrace)?.start;
        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            if matches!(self.peek_raw().map(|t| &t.node), Some(Token::RBrace)) {
                break;
            }
            if self.peek_raw().is_none() {
                return Err(CheckError::syntax(
                    "expected '}', found end of file",
                    self.eof_span(),
                ));
            }
            let stmt = self.parse_stmt()?;
            stmts.push(stmt);
            self.consume_statement_end();
        }
        let end = self.expect(&Token::RBrace)?.end;
        Ok(Spanned::new(Block { stmts }, Span::new(start, end)))
    }

    fn parse_stmt(&mut self) -> Result<Spanned<Stmt>, CheckError> {
        self.skip_newlines();
        let tok = self.peek_raw().ok_or_else(|| {
            CheckError::syntax("expected statement, found end of file", self.eof_span())
        })?;
        match &tok.node {
            Token::Var => {
                let (vd, span) = self.parse_var()?;
                Ok(Spanned::new(Stmt::Var(vd), span))
            }
            Token::Return => {
                let start = self.expect(&Token::Return)?.start;
                let value = if matches!(
                    self.peek_raw().map(|t| &t.node),
                    None | Some(Token::Newline | Token::Semi | Token::RBrace)
                ) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let span = Span::new(start, self.prev_end());
                Ok(Spanned::new(Stmt::Return(value), span))
            }
            Token::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Ok(Spanned::new(Stmt::Block(block), span))
            }
            Token::Ident
                if matches!(self.tokens.get(self.pos + 1).map(|t| &t.node), Some(Token::ColonEq)) =>
            {
                let name = self.expect_ident()?;
                self.expect(&Token::ColonEq)?;
                let value = self.parse_expr()?;
                let span = Span::new(name.span.start, value.span.end);
                Ok(Spanned::new(Stmt::Short { name, value }, span))
            }
            _ => {
                let expr = self.parse_expr()?;
                if matches!(self.peek_raw().map(|t| &t.node), Some(Token::Eq)) {
                    self.expect(&Token::Eq)?;
                    if !matches!(expr.node, Expr::Ident(_) | Expr::Field { .. }) {
                        return Err(CheckError::syntax(
                            "cannot assign to this expression",
                            expr.span,
                        ));
                    }
                    let value = self.parse_expr()?;
                    let span = Span::new(expr.span.start, value.span.end);
                    Ok(Spanned::new(Stmt::Assign { target: expr, value }, span))
                } else {
                    let span = expr.span;
                    Ok(Spanned::new(Stmt::Expr(expr), span))
                }
            }
        }
    }

    pub fn parse_expr(&mut self) -> Result<Spanned<Expr>, CheckError> {
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Result<Spanned<Expr>, CheckError> {
        let mut lhs = self.parse_additive()?;
        while let Some(op) = match self.peek_raw().map(|t| &t.node) {
            Some(Token::EqEq) => Some(BinOp::Eq),
            Some(Token::BangEq) => Some(BinOp::Ne),
            _ => None,
        } {
            self.advance();
            let rhs = self.parse_additive()?;
            let span = lhs.span.to(rhs.span);
            lhs = Spanned::new(
                Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Spanned<Expr>, CheckError> {
        let mut lhs = self.parse_multiplicative()?;
        while let Some(op) = match self.peek_raw().map(|t| &t.node) {
            Some(Token::Plus) => Some(BinOp::Add),
            Some(Token::Minus) => Some(BinOp::Sub),
            _ => None,
        } {
            self.advance();
            let rhs = self.parse_multiplicative()?;
            let span = lhs.span.to(rhs.span);
            lhs = Spanned::new(
                Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Spanned<Expr>, CheckError> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = match self.peek_raw().map(|t| &t.node) {
            Some(Token::Star) => Some(BinOp::Mul),
            Some(Token::Slash) => Some(BinOp::Div),
            _ => None,
        } {
            self.advance();
            let rhs = self.parse_unary()?;
            let span = lhs.span.to(rhs.span);
            lhs = Spanned::new(
                Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Spanned<Expr>, CheckError> {
        match self.peek().map(|t| &t.node) {
            Some(Token::Amp) => {
                let start = self.expect(&Token::Amp)?.start;
                let inner = self.parse_unary()?;
                let span = Span::new(start, inner.span.end);
                Ok(Spanned::new(Expr::AddrOf(Box::new(inner)), span))
            }
            Some(Token::Minus) => {
                let start = self.expect(&Token::Minus)?.start;
                let inner = self.parse_unary()?;
                let span = Span::new(start, inner.span.end);
                Ok(Spanned::new(Expr::Neg(Box::new(inner)), span))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Spanned<Expr>, CheckError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_raw().map(|t| &t.node) {
                Some(Token::Dot) => {
                    self.expect(&Token::Dot)?;
                    let name = self.expect_ident()?;
                    let span = Span::new(expr.span.start, name.span.end);
                    expr = Spanned::new(Expr::Field { object: Box::new(expr), name }, span);
                }
                Some(Token::LParen) => {
                    self.expect(&Token::LParen)?;
                    let mut args = Vec::new();
                    loop {
                        if matches!(self.peek().map(|t| &t.node), Some(Token::RParen)) {
                            break;
                        }
                        args.push(self.parse_expr()?);
                        if matches!(self.peek().map(|t| &t.node), Some(Token::Comma)) {
                            self.expect(&Token::Comma)?;
                        } else {
                            break;
                        }
                    }
                    let end = self.expect(&Token::RParen)?.end;
                    let span = Span::new(expr.span.start, end);
                    expr = Spanned::new(Expr::Call { callee: Box::new(expr), args }, span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Spanned<Expr>, CheckError> {
        self.skip_newlines();
        let tok = self.peek_raw().ok_or_else(|| {
            CheckError::syntax("expected expression, found end of file", self.eof_span())
        })?;
        let span = tok.span;
        match tok.node.clone() {
            Token::IntLit(v) => {
                self.advance();
                Ok(Spanned::new(Expr::IntLit(v), span))
            }
            Token::FloatLit(v) => {
                self.advance();
                Ok(Spanned::new(Expr::FloatLit(v), span))
            }
            Token::StringLit(v) => {
                self.advance();
                Ok(Spanned::new(Expr::StringLit(v), span))
            }
            Token::True => {
                self.advance();
                Ok(Spanned::new(Expr::BoolLit(true), span))
            }
            Token::False => {
                self.advance();
                Ok(Spanned::new(Expr::BoolLit(false), span))
            }
            Token::Nil => {
                self.advance();
                Ok(Spanned::new(Expr::NilLit, span))
            }
            Token::Ident => {
                let name = self.expect_ident()?;
                Ok(Spanned::new(Expr::Ident(name.node), name.span))
            }
            Token::LParen => {
                self.expect(&Token::LParen)?;
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                // The parens contribute nothing; keep the inner node and span so
                // diagnostics point at the identifier itself.
                Ok(inner)
            }
            Token::Func => {
                let start = self.expect(&Token::Func)?.start;
                let params = self.parse_params()?;
                let return_type = if self.at_type_start_raw() {
                    Some(self.parse_type_expr()?)
                } else {
                    None
                };
                let body = self.parse_block()?;
                let span = Span::new(start, body.span.end);
                Ok(Spanned::new(Expr::Closure { params, return_type, body }, span))
            }
            other => Err(CheckError::syntax(
                format!("expected expression, found {other}"),
                span,
            )),
        }
    }
}
