// ----------------------------
// File: src/front/parser/stream.rs
// ----------------------------
//! Token cursor with single-token lookahead over the lexed buffer.

use std::mem::discriminant;

use crate::front::token::{Location, SyntaxError, Token, TokenKind};

pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    /// Location just past the last token, for end-of-file diagnostics.
    end: Location,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, end: Location) -> Self {
        Self { tokens, pos: 0, end }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Location of the current token, or of the end of input.
    pub fn location(&self) -> Location {
        self.peek().map(|t| t.location).unwrap_or(self.end)
    }

    pub fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Whether the current token has the same kind, ignoring payloads.
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|t| discriminant(&t.kind) == discriminant(kind))
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: &TokenKind) -> Result<Token, SyntaxError> {
        match self.peek() {
            Some(t) if discriminant(&t.kind) == discriminant(kind) => {
                Ok(self.bump().expect("peeked token"))
            }
            Some(t) => Err(SyntaxError::new(
                t.location,
                format!("expected {} but found {}", kind.describe(), t.kind.describe()),
            )),
            None => Err(SyntaxError::new(
                self.end,
                format!("expected {} but found end of input", kind.describe()),
            )),
        }
    }

    pub fn expect_identifier(&mut self) -> Result<(String, Location), SyntaxError> {
        match self.peek() {
            Some(Token { kind: TokenKind::Identifier(_), .. }) => {
                let token = self.bump().expect("peeked token");
                match token.kind {
                    TokenKind::Identifier(name) => Ok((name, token.location)),
                    _ => unreachable!(),
                }
            }
            Some(t) => Err(SyntaxError::new(
                t.location,
                format!("expected identifier but found {}", t.kind.describe()),
            )),
            None => Err(SyntaxError::new(self.end, "expected identifier but found end of input")),
        }
    }
}
