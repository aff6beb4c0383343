// ----------------------------
// File: src/main.rs
// ----------------------------

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mcc::driver::{Driver, DriverError};

#[derive(Parser)]
#[command(name = "mcc", version, about = "Compile a source file to SPIM MIPS assembly")]
struct Args {
    /// Source file; pass "-" to read from standard input
    input: String,

    /// Output assembly file
    #[arg(short, long, default_value = "program.asm")]
    output: PathBuf,

    /// Write the parsed AST to this file
    #[arg(short = 'a', long = "ast")]
    ast: Option<PathBuf>,

    /// Write the token stream to this file
    #[arg(short = 't', long = "tokens")]
    tokens: Option<PathBuf>,

    /// Runtime stub appended to the generated assembly
    #[arg(long, default_value = "builtins.asm")]
    builtins: PathBuf,

    /// Trace the scanner
    #[arg(short = 's', long)]
    trace_scan: bool,

    /// Trace the parser
    #[arg(short = 'p', long)]
    trace_parse: bool,
}

fn init_tracing(args: &Args) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if args.trace_scan {
        if let Ok(directive) = "mcc::scan=trace".parse() {
            filter = filter.add_directive(directive);
        }
    }
    if args.trace_parse {
        if let Ok(directive) = "mcc::parse=trace".parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    let driver = Driver {
        input: (args.input != "-").then(|| PathBuf::from(&args.input)),
        output: args.output,
        ast_output: args.ast,
        tokens_output: args.tokens,
        builtins: args.builtins,
    };

    match driver.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(DriverError::Rejected) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}
