//! Expression lexer: text to a flat token stream.

use crate::error::JmesError;
use crate::value::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    UnquotedIdentifier(String),
    QuotedIdentifier(String),
    Number(i64),
    /// Backtick JSON literal or raw `'string'`.
    Literal(Value),
    Dot,
    Star,
    Comma,
    Colon,
    Lbrace,
    Rbrace,
    Lbracket,
    Rbracket,
    Lparen,
    Rparen,
    Current,
    /// `[?`
    Filter,
    /// `[]`
    Flatten,
    And,
    Or,
    Pipe,
    /// `&`
    Expref,
    Not,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Eof,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::UnquotedIdentifier(_) => "UnquotedIdentifier",
            TokenKind::QuotedIdentifier(_) => "QuotedIdentifier",
            TokenKind::Number(_) => "Number",
            TokenKind::Literal(_) => "Literal",
            TokenKind::Dot => "Dot",
            TokenKind::Star => "Star",
            TokenKind::Comma => "Comma",
            TokenKind::Colon => "Colon",
            TokenKind::Lbrace => "Lbrace",
            TokenKind::Rbrace => "Rbrace",
            TokenKind::Lbracket => "Lbracket",
            TokenKind::Rbracket => "Rbracket",
            TokenKind::Lparen => "Lparen",
            TokenKind::Rparen => "Rparen",
            TokenKind::Current => "Current",
            TokenKind::Filter => "Filter",
            TokenKind::Flatten => "Flatten",
            TokenKind::And => "And",
            TokenKind::Or => "Or",
            TokenKind::Pipe => "Pipe",
            TokenKind::Expref => "Expref",
            TokenKind::Not => "Not",
            TokenKind::Eq => "EQ",
            TokenKind::Ne => "NE",
            TokenKind::Lt => "LT",
            TokenKind::Lte => "LTE",
            TokenKind::Gt => "GT",
            TokenKind::Gte => "GTE",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::UnquotedIdentifier(s) | TokenKind::QuotedIdentifier(s) => f.write_str(s),
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Literal(v) => write!(f, "{v}"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Lbrace => f.write_str("{"),
            TokenKind::Rbrace => f.write_str("}"),
            TokenKind::Lbracket => f.write_str("["),
            TokenKind::Rbracket => f.write_str("]"),
            TokenKind::Lparen => f.write_str("("),
            TokenKind::Rparen => f.write_str(")"),
            TokenKind::Current => f.write_str("@"),
            TokenKind::Filter => f.write_str("[?"),
            TokenKind::Flatten => f.write_str("[]"),
            TokenKind::And => f.write_str("&&"),
            TokenKind::Or => f.write_str("||"),
            TokenKind::Pipe => f.write_str("|"),
            TokenKind::Expref => f.write_str("&"),
            TokenKind::Not => f.write_str("!"),
            TokenKind::Eq => f.write_str("=="),
            TokenKind::Ne => f.write_str("!="),
            TokenKind::Lt => f.write_str("<"),
            TokenKind::Lte => f.write_str("<="),
            TokenKind::Gt => f.write_str(">"),
            TokenKind::Gte => f.write_str(">="),
            TokenKind::Eof => Ok(()),
        }
    }
}

/// A lexed token and the character offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize) -> Self {
        Token { kind, start }
    }
}

/// Single-pass lexer over the characters of an expression.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    /// Tokenize an expression. The returned stream has no trailing EOF token.
    pub fn tokenize(input: &str) -> Result<Vec<Token>, JmesError> {
        let mut lexer = Self { chars: input.chars().collect(), pos: 0 };
        lexer.run()
    }

    fn run(&mut self) -> Result<Vec<Token>, JmesError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            let start = self.pos;
            let kind = match c {
                'a'..='z' | 'A'..='Z' | '_' => self.consume_unquoted_identifier(),
                '.' => self.single(TokenKind::Dot),
                '*' => self.single(TokenKind::Star),
                ',' => self.single(TokenKind::Comma),
                ':' => self.single(TokenKind::Colon),
                '{' => self.single(TokenKind::Lbrace),
                '}' => self.single(TokenKind::Rbrace),
                ']' => self.single(TokenKind::Rbracket),
                '(' => self.single(TokenKind::Lparen),
                ')' => self.single(TokenKind::Rparen),
                '@' => self.single(TokenKind::Current),
                '0'..='9' | '-' => self.consume_number()?,
                '[' => self.consume_lbracket(),
                '"' => self.consume_quoted_identifier()?,
                '\'' => self.consume_raw_string()?,
                '`' => self.consume_literal()?,
                '<' => self.either('=', TokenKind::Lte, TokenKind::Lt),
                '>' => self.either('=', TokenKind::Gte, TokenKind::Gt),
                '!' => self.either('=', TokenKind::Ne, TokenKind::Not),
                '&' => self.either('&', TokenKind::And, TokenKind::Expref),
                '|' => self.either('|', TokenKind::Or, TokenKind::Pipe),
                '=' => {
                    if self.peek_at(1) == Some('=') {
                        self.pos += 2;
                        TokenKind::Eq
                    } else {
                        return Err(self.error("Unknown character: '='", start));
                    }
                }
                ' ' | '\t' | '\n' | '\r' => {
                    self.advance();
                    continue;
                }
                '#' => {
                    self.skip_comment();
                    continue;
                }
                other => {
                    return Err(self.error(format!("Unknown character: '{other}'"), start));
                }
            };
            tokens.push(Token::new(kind, start));
        }
        tracing::trace!(count = tokens.len(), "tokenized expression");
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> JmesError {
        JmesError::Lexer { message: message.into(), offset }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Two-character token if the next char is `second`, else the one-char token.
    fn either(&mut self, second: char, double: TokenKind, single: TokenKind) -> TokenKind {
        self.advance();
        if self.peek() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn consume_unquoted_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        self.advance();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        TokenKind::UnquotedIdentifier(self.slice(start, self.pos))
    }

    fn consume_number(&mut self) -> Result<TokenKind, JmesError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        let digits_start = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        if self.pos == digits_start {
            return Err(self.error("Unknown character: '-'", start));
        }
        let text = self.slice(start, self.pos);
        text.parse::<i64>()
            .map(TokenKind::Number)
            .map_err(|_| self.error(format!("Invalid number: {text}"), start))
    }

    fn consume_lbracket(&mut self) -> TokenKind {
        self.advance();
        match self.peek() {
            Some('?') => {
                self.advance();
                TokenKind::Filter
            }
            Some(']') => {
                self.advance();
                TokenKind::Flatten
            }
            _ => TokenKind::Lbracket,
        }
    }

    /// Advances past a `delim`-terminated body, honouring `\delim` and `\\`.
    /// Returns the offset of the closing delimiter and moves past it.
    fn scan_delimited(&mut self, delim: char, what: &str) -> Result<usize, JmesError> {
        let start = self.pos;
        self.advance();
        loop {
            match self.peek() {
                None => return Err(self.error(format!("Unterminated {what}"), start)),
                Some(c) if c == delim => break,
                Some('\\') if matches!(self.peek_at(1), Some(n) if n == delim || n == '\\') => {
                    self.pos += 2;
                }
                Some(_) => self.advance(),
            }
        }
        let end = self.pos;
        self.advance();
        Ok(end)
    }

    fn consume_quoted_identifier(&mut self) -> Result<TokenKind, JmesError> {
        let start = self.pos;
        let end = self.scan_delimited('"', "quoted identifier")?;
        let raw = self.slice(start, end + 1);
        serde_json::from_str::<String>(&raw)
            .map(TokenKind::QuotedIdentifier)
            .map_err(|e| self.error(format!("Invalid quoted identifier {raw}: {e}"), start))
    }

    fn consume_raw_string(&mut self) -> Result<TokenKind, JmesError> {
        let start = self.pos;
        let end = self.scan_delimited('\'', "raw string literal")?;
        let body = self.slice(start + 1, end).replace("\\'", "'");
        Ok(TokenKind::Literal(Value::String(body)))
    }

    fn consume_literal(&mut self) -> Result<TokenKind, JmesError> {
        let start = self.pos;
        let end = self.scan_delimited('`', "literal")?;
        let body = self.slice(start + 1, end);
        let body = body.trim_start().replace("\\`", "`");
        let parsed = if looks_like_json(&body) {
            serde_json::from_str::<serde_json::Value>(&body)
        } else {
            serde_json::from_str::<serde_json::Value>(&format!("\"{body}\""))
        };
        parsed
            .map(|v| TokenKind::Literal(Value::from(v)))
            .map_err(|e| self.error(format!("Invalid literal `{body}`: {e}"), start))
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }
}

fn looks_like_json(text: &str) -> bool {
    match text.chars().next() {
        None => false,
        Some('[' | '{' | '"') => true,
        Some('-' | '0'..='9') => serde_json::from_str::<serde_json::Value>(text).is_ok(),
        Some(_) => matches!(text, "true" | "false" | "null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::tokenize(input)
            .unwrap_or_else(|e| panic!("tokenize failed for '{input}': {e}"))
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::UnquotedIdentifier(s.to_string())
    }

    #[test]
    fn identifiers_and_dots() {
        assert_eq!(kinds("foo.bar_1"), vec![ident("foo"), TokenKind::Dot, ident("bar_1")]);
    }

    #[test]
    fn offsets_are_character_positions() {
        let tokens = Lexer::tokenize("a  || b").unwrap();
        let starts: Vec<usize> = tokens.iter().map(|t| t.start).collect();
        assert_eq!(starts, vec![0, 3, 6]);
    }

    #[test]
    fn quoted_identifier_uses_json_escapes() {
        assert_eq!(
            kinds(r#""foo\"bar" "é""#),
            vec![
                TokenKind::QuotedIdentifier("foo\"bar".into()),
                TokenKind::QuotedIdentifier("é".into()),
            ]
        );
    }

    #[test]
    fn numbers_are_integers() {
        assert_eq!(kinds("[-1]"), vec![TokenKind::Lbracket, TokenKind::Number(-1), TokenKind::Rbracket]);
        assert_eq!(kinds("10"), vec![TokenKind::Number(10)]);
        assert!(Lexer::tokenize("-").is_err());
        assert!(Lexer::tokenize("1.5").is_ok_and(|t| t.len() == 3));
    }

    #[test]
    fn bracket_variants() {
        assert_eq!(
            kinds("[? [] ["),
            vec![TokenKind::Filter, TokenKind::Flatten, TokenKind::Lbracket]
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("< <= > >= == != ! && & || |"),
            vec![
                TokenKind::Lt,
                TokenKind::Lte,
                TokenKind::Gt,
                TokenKind::Gte,
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Not,
                TokenKind::And,
                TokenKind::Expref,
                TokenKind::Or,
                TokenKind::Pipe,
            ]
        );
    }

    #[test]
    fn raw_string_literal() {
        assert_eq!(kinds(r"'it\'s'"), vec![TokenKind::Literal(Value::from("it's"))]);
        assert_eq!(kinds(r"'a\\b'"), vec![TokenKind::Literal(Value::from(r"a\\b"))]);
    }

    #[test]
    fn backtick_literals() {
        assert_eq!(kinds("`[1, 2]`"), vec![TokenKind::Literal(Value::from(json!([1, 2])))]);
        assert_eq!(kinds("`  {\"a\": true}`"), vec![TokenKind::Literal(Value::from(json!({"a": true})))]);
        assert_eq!(kinds("`null`"), vec![TokenKind::Literal(Value::Null)]);
        assert_eq!(kinds("`-12`"), vec![TokenKind::Literal(Value::from(json!(-12)))]);
        assert_eq!(kinds("`foo`"), vec![TokenKind::Literal(Value::from("foo"))]);
        assert_eq!(kinds(r"`a\`b`"), vec![TokenKind::Literal(Value::from("a`b"))]);
        assert_eq!(kinds("`1a`"), vec![TokenKind::Literal(Value::from("1a"))]);
    }

    #[test]
    fn invalid_literal_is_error() {
        let err = Lexer::tokenize("`[1, 2`").unwrap_err();
        assert_eq!(err.offset(), Some(0));
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(kinds("foo # trailing\n\t.bar"), vec![ident("foo"), TokenKind::Dot, ident("bar")]);
    }

    #[test]
    fn unknown_character_reports_offset() {
        match Lexer::tokenize("foo ~") {
            Err(JmesError::Lexer { message, offset }) => {
                assert!(message.contains('~'));
                assert_eq!(offset, 4);
            }
            other => panic!("expected lexer error, got {other:?}"),
        }
        assert!(Lexer::tokenize("a = b").is_err());
        assert!(Lexer::tokenize("\"open").is_err());
    }
}
