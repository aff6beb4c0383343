// ----------------------------
// File: src/front/token.rs
// ----------------------------
//! Tokens, source locations and the syntax error type shared by the lexer,
//! the parser and AST construction.

use logos::Logos;
use std::fmt;
use thiserror::Error;

/// A source range. Lines and columns are 1-based; `end_column` is one past
/// the last column of the range. Line 0 marks predeclared builtin symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        Self { line, column, end_line, end_column }
    }

    pub fn point(line: u32, column: u32) -> Self {
        Self { line, column, end_line: line, end_column: column + 1 }
    }

    pub fn builtin() -> Self {
        Self { line: 0, column: 0, end_line: 0, end_column: 0 }
    }

    pub fn is_builtin(&self) -> bool {
        self.line == 0
    }

    /// The range covering `self` through `other`.
    pub fn to(self, other: Location) -> Location {
        Self {
            line: self.line,
            column: self.column,
            end_line: other.end_line,
            end_column: other.end_column,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::point(1, 1)
    }
}

impl fmt::Display for Location {
    // bison-style: "2.5", "2.5-9", "2.5-3.1"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line, self.column)?;
        let last_column = self.end_column.saturating_sub(1).max(1);
        if self.end_line != self.line {
            write!(f, "-{}.{}", self.end_line, last_column)?;
        } else if last_column != self.column {
            write!(f, "-{}", last_column)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct SyntaxError {
    pub location: Location,
    pub message: String,
}

impl SyntaxError {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self { location, message: message.into() }
    }
}

fn parse_int(digits: &str, radix: u32) -> Option<i32> {
    // 32-bit two's-complement wrap, like the target machine
    u64::from_str_radix(digits, radix).ok().map(|v| v as u32 as i32)
}

fn char_value(slice: &str) -> i32 {
    // slice includes the surrounding quotes
    let inner = &slice[1..slice.len() - 1];
    let mut chars = inner.chars();
    match chars.next() {
        Some('\\') => escape_value(chars.next().unwrap_or('\\')) as i32,
        Some(c) => c as i32,
        None => 0,
    }
}

fn string_value(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(escape_value(chars.next().unwrap_or('\\')));
        } else {
            out.push(c);
        }
    }
    out
}

fn escape_value(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        // an unknown escape denotes the character itself
        other => other,
    }
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum TokenKind {
    // keywords
    #[token("int")]
    Int,
    #[token("char")]
    Char,
    #[token("void")]
    Void,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,

    // operators
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("=")]
    Assign,
    #[token("!")]
    Not,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,

    // delimiters
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // literals
    #[regex(r"[0-9]+", |lex| parse_int(lex.slice(), 10))]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| parse_int(&lex.slice()[2..], 16))]
    Number(i32),
    #[regex(r"'([^'\\\n]|\\[^\n])'", |lex| char_value(lex.slice()))]
    CharLiteral(i32),
    #[regex(r#""([^"\\\n]|\\[^\n])*""#, |lex| string_value(lex.slice()))]
    StringLiteral(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Identifier(String),
}

impl TokenKind {
    /// Short description used in parser diagnostics.
    pub fn describe(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Int => "\"int\"",
            Char => "\"char\"",
            Void => "\"void\"",
            If => "\"if\"",
            Else => "\"else\"",
            While => "\"while\"",
            For => "\"for\"",
            Switch => "\"switch\"",
            Case => "\"case\"",
            Default => "\"default\"",
            Break => "\"break\"",
            Continue => "\"continue\"",
            Return => "\"return\"",
            AndAnd => "\"&&\"",
            OrOr => "\"||\"",
            EqualEqual => "\"==\"",
            NotEqual => "\"!=\"",
            LessEqual => "\"<=\"",
            GreaterEqual => "\">=\"",
            Less => "\"<\"",
            Greater => "\">\"",
            Assign => "\"=\"",
            Not => "\"!\"",
            Plus => "\"+\"",
            Minus => "\"-\"",
            Star => "\"*\"",
            Slash => "\"/\"",
            Ampersand => "\"&\"",
            Pipe => "\"|\"",
            Caret => "\"^\"",
            Tilde => "\"~\"",
            LeftParen => "\"(\"",
            RightParen => "\")\"",
            LeftBrace => "\"{\"",
            RightBrace => "\"}\"",
            LeftBracket => "\"[\"",
            RightBracket => "\"]\"",
            Semicolon => "\";\"",
            Comma => "\",\"",
            Colon => "\":\"",
            Number(_) => "number",
            CharLiteral(_) => "character literal",
            StringLiteral(_) => "string literal",
            Identifier(_) => "identifier",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}
