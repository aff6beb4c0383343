// ----------------------------
// File: src/lib.rs
// ----------------------------
//! A whole-program compiler for a small C-like language targeting a
//! SPIM-style MIPS runtime: one source file in, one assembly file out.

pub mod back;
pub mod driver;
pub mod front;

use thiserror::Error;

pub use back::DiagnosticSink;
pub use front::semantics::CompileError;
pub use front::token::{Location, SyntaxError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
    #[error("{0}")]
    Compile(#[from] CompileError),
}

impl Error {
    pub fn location(&self) -> Location {
        match self {
            Error::Syntax(e) => e.location,
            Error::Compile(e) => e.location,
        }
    }
}

/// Compile a source text to assembly (without the runtime stub). Warnings
/// are routed through `sink` as `(location, message, kind)`.
pub fn compile(source: &str, sink: DiagnosticSink) -> Result<String, Error> {
    let tokens = front::lexer::tokenize(source)?;
    let program = front::parser::parse_program(tokens, front::lexer::end_location(source))?;
    Ok(back::compile_program(&program, sink)?)
}
