//! Operator-precedence (Pratt) parser.
//!
//! Each token kind has a left binding power. [`Parser::expression`] parses a
//! prefix form for the current token, then keeps folding infix/postfix forms
//! while the upcoming token binds tighter than the caller's bound.

use crate::ast::{Ast, Comparator, KeyValuePair};
use crate::error::JmesError;
use crate::lexer::{Lexer, Token, TokenKind};
use std::sync::Arc;

/// Tokens binding below this end a projection's right-hand side.
const PROJECTION_STOP: u8 = 10;

/// Deepest nesting of sub-expressions the parser descends into.
pub const MAX_NESTING: usize = 256;

const BP_PIPE: u8 = 1;
const BP_OR: u8 = 2;
const BP_AND: u8 = 3;
const BP_COMPARATOR: u8 = 5;
const BP_FLATTEN: u8 = 9;
const BP_STAR: u8 = 20;
const BP_FILTER: u8 = 21;
const BP_DOT: u8 = 40;
const BP_NOT: u8 = 45;
const BP_EXPREF: u8 = 0;

fn binding_power(kind: &TokenKind) -> u8 {
    match kind {
        TokenKind::Pipe => BP_PIPE,
        TokenKind::Or => BP_OR,
        TokenKind::And => BP_AND,
        TokenKind::Eq
        | TokenKind::Ne
        | TokenKind::Lt
        | TokenKind::Lte
        | TokenKind::Gt
        | TokenKind::Gte => BP_COMPARATOR,
        TokenKind::Flatten => BP_FLATTEN,
        TokenKind::Star => BP_STAR,
        TokenKind::Filter => BP_FILTER,
        TokenKind::Dot => BP_DOT,
        TokenKind::Not => BP_NOT,
        TokenKind::Lbrace => 50,
        TokenKind::Lbracket => 55,
        TokenKind::Lparen => 60,
        _ => 0,
    }
}

fn comparator(kind: &TokenKind) -> Option<Comparator> {
    match kind {
        TokenKind::Eq => Some(Comparator::Equal),
        TokenKind::Ne => Some(Comparator::NotEqual),
        TokenKind::Lt => Some(Comparator::Less),
        TokenKind::Lte => Some(Comparator::LessEqual),
        TokenKind::Gt => Some(Comparator::Greater),
        TokenKind::Gte => Some(Comparator::GreaterEqual),
        _ => None,
    }
}

/// Expression parser.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
}

impl Parser {
    /// Lex and parse an expression.
    pub fn parse(input: &str) -> Result<Ast, JmesError> {
        let tokens = Lexer::tokenize(input)?;
        Self::parse_tokens(tokens, input.chars().count())
    }

    /// Parse an already lexed token stream. `source_len` is the offset
    /// reported for errors at end of input.
    pub fn parse_tokens(mut tokens: Vec<Token>, source_len: usize) -> Result<Ast, JmesError> {
        tokens.push(Token::new(TokenKind::Eof, source_len));
        let mut parser = Self { tokens, index: 0, depth: 0 };
        let ast = parser.expression(0)?;
        if parser.peek() != &TokenKind::Eof {
            let token = parser.tokens[parser.index].clone();
            return Err(Self::error(&token, "Unexpected token"));
        }
        Ok(ast)
    }

    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + offset).min(last)].kind
    }

    /// Returns the current token and moves past it. Never moves past EOF.
    fn next_token(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn advance(&mut self) {
        self.next_token();
    }

    fn expect(&mut self, expected: TokenKind) -> Result<(), JmesError> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            let token = self.tokens[self.index].clone();
            Err(Self::error(&token, format!("Expected {}", expected.name())))
        }
    }

    fn error(token: &Token, message: impl Into<String>) -> JmesError {
        JmesError::Parser {
            message: message.into(),
            token: token.kind.name(),
            value: token.kind.to_string(),
            offset: token.start,
        }
    }

    fn current_error(&self, message: impl Into<String>) -> JmesError {
        Self::error(&self.tokens[self.index], message)
    }

    fn expression(&mut self, rbp: u8) -> Result<Ast, JmesError> {
        if self.depth >= MAX_NESTING {
            return Err(self.current_error(format!("Expression nested deeper than {MAX_NESTING}")));
        }
        self.depth += 1;
        let result = self.expression_inner(rbp);
        self.depth -= 1;
        result
    }

    fn expression_inner(&mut self, rbp: u8) -> Result<Ast, JmesError> {
        let token = self.next_token();
        tracing::trace!(token = token.kind.name(), offset = token.start, rbp, "nud");
        let mut left = self.nud(token)?;
        while rbp < binding_power(self.peek()) {
            let token = self.next_token();
            left = self.led(token, left)?;
        }
        Ok(left)
    }

    fn nud(&mut self, token: Token) -> Result<Ast, JmesError> {
        match token.kind {
            TokenKind::Literal(value) => Ok(Ast::Literal { value }),
            TokenKind::UnquotedIdentifier(name) => Ok(Ast::Field { name }),
            TokenKind::QuotedIdentifier(name) => {
                if *self.peek() == TokenKind::Lparen {
                    return Err(self.current_error("Quoted identifier not allowed for function names"));
                }
                Ok(Ast::Field { name })
            }
            TokenKind::Not => {
                let node = self.expression(BP_NOT)?;
                Ok(Ast::Not { node: node.boxed() })
            }
            TokenKind::Star => {
                let rhs = if *self.peek() == TokenKind::Rbracket {
                    Ast::Identity
                } else {
                    self.projection_rhs(BP_STAR)?
                };
                Ok(Ast::ValueProjection { lhs: Ast::Identity.boxed(), rhs: rhs.boxed() })
            }
            TokenKind::Filter => self.led(token, Ast::Identity),
            TokenKind::Lbrace => self.multiselect_hash(),
            TokenKind::Flatten => {
                let lhs = Ast::Flatten { node: Ast::Identity.boxed() };
                let rhs = self.projection_rhs(BP_FLATTEN)?;
                Ok(Ast::Projection { lhs: lhs.boxed(), rhs: rhs.boxed() })
            }
            TokenKind::Lbracket => match (self.peek().clone(), self.peek_at(1).clone()) {
                (TokenKind::Number(_) | TokenKind::Colon, _) => {
                    let rhs = self.index_expression()?;
                    self.project_if_slice(Ast::Identity, rhs)
                }
                (TokenKind::Star, TokenKind::Rbracket) => {
                    self.advance();
                    self.advance();
                    let rhs = self.projection_rhs(BP_STAR)?;
                    Ok(Ast::Projection { lhs: Ast::Identity.boxed(), rhs: rhs.boxed() })
                }
                _ => self.multiselect_list(),
            },
            TokenKind::Current => Ok(Ast::Current),
            TokenKind::Expref => {
                let node = self.expression(BP_EXPREF)?;
                Ok(Ast::ExpressionReference { node: Arc::new(node) })
            }
            TokenKind::Lparen => {
                let inner = self.expression(0)?;
                self.expect(TokenKind::Rparen)?;
                Ok(inner)
            }
            _ => Err(Self::error(&token, "Invalid token")),
        }
    }

    fn led(&mut self, token: Token, left: Ast) -> Result<Ast, JmesError> {
        if let Some(op) = comparator(&token.kind) {
            let rhs = self.expression(BP_COMPARATOR)?;
            return Ok(Ast::Comparator { op, lhs: left.boxed(), rhs: rhs.boxed() });
        }
        match token.kind {
            TokenKind::Dot => {
                if *self.peek() == TokenKind::Star {
                    self.advance();
                    let rhs = self.projection_rhs(BP_DOT)?;
                    Ok(Ast::ValueProjection { lhs: left.boxed(), rhs: rhs.boxed() })
                } else {
                    let rhs = self.dot_rhs(BP_DOT)?;
                    Ok(Ast::Subexpression { lhs: left.boxed(), rhs: rhs.boxed() })
                }
            }
            TokenKind::Pipe => {
                let rhs = self.expression(BP_PIPE)?;
                Ok(Ast::Pipe { lhs: left.boxed(), rhs: rhs.boxed() })
            }
            TokenKind::Or => {
                let rhs = self.expression(BP_OR)?;
                Ok(Ast::Or { lhs: left.boxed(), rhs: rhs.boxed() })
            }
            TokenKind::And => {
                let rhs = self.expression(BP_AND)?;
                Ok(Ast::And { lhs: left.boxed(), rhs: rhs.boxed() })
            }
            TokenKind::Lparen => {
                let name = match left {
                    Ast::Field { name } => name,
                    _ => return Err(Self::error(&token, "Function name must be an identifier")),
                };
                let args = self.function_args()?;
                Ok(Ast::Function { name, args })
            }
            TokenKind::Filter => {
                let condition = self.expression(0)?;
                self.expect(TokenKind::Rbracket)?;
                let rhs = if *self.peek() == TokenKind::Flatten {
                    Ast::Identity
                } else {
                    self.projection_rhs(BP_FILTER)?
                };
                Ok(Ast::FilterProjection {
                    lhs: left.boxed(),
                    rhs: rhs.boxed(),
                    condition: condition.boxed(),
                })
            }
            TokenKind::Flatten => {
                let lhs = Ast::Flatten { node: left.boxed() };
                let rhs = self.projection_rhs(BP_FLATTEN)?;
                Ok(Ast::Projection { lhs: lhs.boxed(), rhs: rhs.boxed() })
            }
            TokenKind::Lbracket => {
                if matches!(self.peek(), TokenKind::Number(_) | TokenKind::Colon) {
                    let rhs = self.index_expression()?;
                    self.project_if_slice(left, rhs)
                } else {
                    self.expect(TokenKind::Star)?;
                    self.expect(TokenKind::Rbracket)?;
                    let rhs = self.projection_rhs(BP_STAR)?;
                    Ok(Ast::Projection { lhs: left.boxed(), rhs: rhs.boxed() })
                }
            }
            _ => Err(Self::error(&token, "Invalid token")),
        }
    }

    fn function_args(&mut self) -> Result<Vec<Ast>, JmesError> {
        let mut args = Vec::new();
        if *self.peek() != TokenKind::Rparen {
            loop {
                args.push(self.expression(0)?);
                match self.peek() {
                    TokenKind::Comma => self.advance(),
                    TokenKind::Rparen => break,
                    _ => return Err(self.current_error("Expected Comma or Rparen")),
                }
            }
        }
        self.expect(TokenKind::Rparen)?;
        Ok(args)
    }

    /// Right-hand side of a projection. Anything binding below
    /// [`PROJECTION_STOP`] ends the projection.
    fn projection_rhs(&mut self, rbp: u8) -> Result<Ast, JmesError> {
        if binding_power(self.peek()) < PROJECTION_STOP {
            return Ok(Ast::Identity);
        }
        match self.peek() {
            TokenKind::Lbracket | TokenKind::Filter => self.expression(rbp),
            TokenKind::Dot => {
                self.advance();
                self.dot_rhs(rbp)
            }
            _ => Err(self.current_error("Syntax error, unexpected token")),
        }
    }

    fn dot_rhs(&mut self, rbp: u8) -> Result<Ast, JmesError> {
        match self.peek() {
            TokenKind::UnquotedIdentifier(_) | TokenKind::QuotedIdentifier(_) | TokenKind::Star => {
                self.expression(rbp)
            }
            TokenKind::Lbracket => {
                self.advance();
                self.multiselect_list()
            }
            TokenKind::Lbrace => {
                self.advance();
                self.multiselect_hash()
            }
            _ => Err(self.current_error("Expected identifier, '[' or '{' after '.'")),
        }
    }

    /// Parses `N]` or a slice body; the opening bracket is already consumed.
    fn index_expression(&mut self) -> Result<Ast, JmesError> {
        if *self.peek() == TokenKind::Colon || *self.peek_at(1) == TokenKind::Colon {
            return self.slice_expression();
        }
        let token = self.next_token();
        match token.kind {
            TokenKind::Number(index) => {
                self.expect(TokenKind::Rbracket)?;
                Ok(Ast::Index { index })
            }
            _ => Err(Self::error(&token, "Expected Number")),
        }
    }

    fn slice_expression(&mut self) -> Result<Ast, JmesError> {
        let mut parts: [Option<i64>; 3] = [None, None, None];
        let mut part = 0;
        loop {
            match self.peek().clone() {
                TokenKind::Rbracket => break,
                TokenKind::Colon if part < 2 => {
                    part += 1;
                    self.advance();
                }
                TokenKind::Number(n) if parts[part].is_none() => {
                    parts[part] = Some(n);
                    self.advance();
                }
                _ => return Err(self.current_error("Syntax error, unexpected token in slice")),
            }
        }
        self.expect(TokenKind::Rbracket)?;
        let [start, stop, step] = parts;
        Ok(Ast::Slice { start, stop, step })
    }

    fn project_if_slice(&mut self, left: Ast, right: Ast) -> Result<Ast, JmesError> {
        let is_slice = matches!(right, Ast::Slice { .. });
        let index_expr = Ast::IndexExpression { lhs: left.boxed(), rhs: right.boxed() };
        if is_slice {
            let rhs = self.projection_rhs(BP_STAR)?;
            Ok(Ast::Projection { lhs: index_expr.boxed(), rhs: rhs.boxed() })
        } else {
            Ok(index_expr)
        }
    }

    /// `a, b, c]`; the opening bracket is already consumed.
    fn multiselect_list(&mut self) -> Result<Ast, JmesError> {
        let mut elements = Vec::new();
        while *self.peek() != TokenKind::Rbracket {
            elements.push(self.expression(0)?);
            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                    if *self.peek() == TokenKind::Rbracket {
                        return Err(self.current_error("Unexpected token Rbracket after Comma"));
                    }
                }
                TokenKind::Rbracket => {}
                _ => return Err(self.current_error("Expected Comma or Rbracket")),
            }
        }
        self.expect(TokenKind::Rbracket)?;
        Ok(Ast::MultiSelectList { elements })
    }

    /// `k: v, ...}`; the opening brace is already consumed.
    fn multiselect_hash(&mut self) -> Result<Ast, JmesError> {
        let mut pairs = Vec::new();
        loop {
            let token = self.next_token();
            let key = match token.kind {
                TokenKind::UnquotedIdentifier(name) | TokenKind::QuotedIdentifier(name) => name,
                _ => return Err(Self::error(&token, "Expecting an identifier token")),
            };
            self.expect(TokenKind::Colon)?;
            let value = self.expression(0)?;
            pairs.push(KeyValuePair { key, value });
            match self.peek() {
                TokenKind::Comma => self.advance(),
                TokenKind::Rbrace => {
                    self.advance();
                    break;
                }
                _ => return Err(self.current_error("Expected Comma or Rbrace")),
            }
        }
        Ok(Ast::MultiSelectHash { pairs })
    }
}
