// ----------------------------
// File: src/driver.rs
// ----------------------------
//! File handling and diagnostics around the compilation pipeline.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::back;
use crate::front::lexer;
use crate::front::parser;
use crate::front::token::Location;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("unable to open file \"{path}\": {source}")]
    Io { path: String, source: io::Error },
    /// Diagnostics were already printed.
    #[error("compilation failed")]
    Rejected,
}

pub struct Driver {
    /// Source file; `None` reads standard input.
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub ast_output: Option<PathBuf>,
    pub tokens_output: Option<PathBuf>,
    /// Runtime stub appended verbatim to the generated assembly.
    pub builtins: PathBuf,
}

impl Driver {
    pub fn run(&self) -> Result<(), DriverError> {
        let source = self.read_source()?;
        let file = self.friendly_filename();
        // source lines are re-emitted under diagnostics for real files only
        let shown_source = self.input.as_ref().map(|_| source.as_str());

        let tokens = match lexer::tokenize(&source) {
            Ok(tokens) => tokens,
            Err(error) => {
                print_diagnostic(&file, shown_source, error.location, "error", &error.message);
                return Err(DriverError::Rejected);
            }
        };

        if let Some(path) = &self.tokens_output {
            let mut dump = String::new();
            for token in &tokens {
                let _ = writeln!(dump, "{} {:?}", token.location, token.kind);
            }
            write_file(path, &dump)?;
        }

        let program = match parser::parse_program(tokens, lexer::end_location(&source)) {
            Ok(program) => program,
            Err(error) => {
                print_diagnostic(&file, shown_source, error.location, "error", &error.message);
                return Err(DriverError::Rejected);
            }
        };

        if let Some(path) = &self.ast_output {
            write_file(path, &program.tree())?;
        }

        let sink = |location: Location, message: &str, kind: &str| {
            print_diagnostic(&file, shown_source, location, kind, message);
        };
        let assembly = match back::compile_program(&program, &sink) {
            Ok(assembly) => assembly,
            Err(error) => {
                print_diagnostic(&file, shown_source, error.location, "error", &error.message);
                return Err(DriverError::Rejected);
            }
        };

        let builtins = read_file(&self.builtins)?;
        debug!(target: "mcc::driver", "writing {}", self.output.display());
        write_file(&self.output, &(assembly + &builtins))?;
        Ok(())
    }

    fn friendly_filename(&self) -> String {
        match &self.input {
            Some(path) => path.display().to_string(),
            None => "stdin".to_string(),
        }
    }

    fn read_source(&self) -> Result<String, DriverError> {
        match &self.input {
            Some(path) => read_file(path),
            None => {
                let mut source = String::new();
                io::stdin()
                    .read_to_string(&mut source)
                    .map_err(|source| DriverError::Io { path: "stdin".to_string(), source })?;
                Ok(source)
            }
        }
    }
}

fn read_file(path: &PathBuf) -> Result<String, DriverError> {
    fs::read_to_string(path)
        .map_err(|source| DriverError::Io { path: path.display().to_string(), source })
}

fn write_file(path: &PathBuf, contents: &str) -> Result<(), DriverError> {
    fs::write(path, contents)
        .map_err(|source| DriverError::Io { path: path.display().to_string(), source })
}

/// Print one diagnostic line, and for real files re-emit the offending line
/// (plus the one before it) with a `^~~~` marker under the range.
pub fn print_diagnostic(
    file: &str,
    source: Option<&str>,
    location: Location,
    kind: &str,
    message: &str,
) {
    if location.is_builtin() {
        eprintln!("builtin: {}: {}", kind, message);
        return;
    }
    eprintln!("{}:{}: {}: {}", file, location, kind, message);

    let Some(source) = source else { return };
    let end_line = location.end_line as usize;
    let mut lines = source.lines().skip(end_line.saturating_sub(2));
    let (previous, line) = if end_line > 1 {
        (lines.next(), lines.next())
    } else {
        (None, lines.next())
    };
    let Some(line) = line else { return };

    // a multi-line range is marked from the start of its last line
    let begin_column = if location.line != location.end_line { 1 } else { location.column } as usize;

    if let Some(previous) = previous {
        eprintln!("{:5} | {}", end_line - 1, previous);
    }
    eprintln!("{:5} | {}", end_line, line);
    let tildes = (location.end_column as usize).saturating_sub(begin_column + 1);
    eprintln!("{:5} | {}^{}", "", " ".repeat(begin_column - 1), "~".repeat(tildes));
}
