// ----------------------------
// File: src/front/lexer.rs
// ----------------------------
//! Thin wrapper around the generated `logos` lexer that attaches
//! line/column locations to every token.

use logos::Logos;
use tracing::trace;

use super::token::{Location, SyntaxError, Token, TokenKind};

/// Maps byte offsets to 1-based line/column pairs.
struct LineMap {
    // byte offset of the start of each line
    starts: Vec<usize>,
}

impl LineMap {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    fn position(&self, offset: usize) -> (u32, u32) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line as u32 + 1, (offset - self.starts[line]) as u32 + 1)
    }

    fn location(&self, span: std::ops::Range<usize>) -> Location {
        let (line, column) = self.position(span.start);
        let (end_line, end_column) = self.position(span.end);
        Location::new(line, column, end_line, end_column)
    }
}

/// Tokenize a whole source file. Stops at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let map = LineMap::new(source);
    let mut tokens = Vec::new();

    for (result, span) in TokenKind::lexer(source).spanned() {
        let location = map.location(span.clone());
        match result {
            Ok(kind) => {
                trace!(target: "mcc::scan", "{} {:?}", location, kind);
                tokens.push(Token { kind, location });
            }
            Err(()) => {
                return Err(SyntaxError::new(
                    location,
                    format!("unrecognized token \"{}\"", &source[span]),
                ));
            }
        }
    }

    Ok(tokens)
}

/// The location just past the last token, used for end-of-file diagnostics.
pub fn end_location(source: &str) -> Location {
    let map = LineMap::new(source);
    let (line, column) = map.position(source.len());
    Location::point(line, column)
}
