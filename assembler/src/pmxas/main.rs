use std::error::Error;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::ArgAction::{Set, SetTrue};
use clap::Parser;
use tracing::{Level, event, span};
use tracing_subscriber::prelude::*;

use assembler::{AssemblerFailure, OutputOptions, assemble_file};

/// Assembler for the PMX stack machine.  The output is a single line
/// of comma-separated cells.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Main assembly source file.  IMPORT directives are resolved
    /// relative to the directory of the file containing them.
    #[clap(action = Set)]
    input: OsString,

    /// File to which the assembled program is written.
    #[clap(action = Set, short = 'o', long)]
    output: OsString,

    /// Print the symbol table and the address of every cell on
    /// standard output.
    #[clap(action = SetTrue, long)]
    list: bool,
}

#[derive(Debug)]
enum Fail {
    /// Assembly itself failed.
    AsmFail(AssemblerFailure),
    /// We could not get as far as starting the assembler.
    InitialisationFailure(String),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::AsmFail(assembler_failure) => assembler_failure.fmt(f),
            Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
        }
    }
}

impl Error for Fail {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Fail::AsmFail(e) => Some(e),
            Fail::InitialisationFailure(_) => None,
        }
    }
}

fn init_logging() -> Result<(), Fail> {
    // RUST_LOG selects which events are printed, for example
    // RUST_LOG=assembler=debug.
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
        .map_err(|e| {
            Fail::InitialisationFailure(format!(
                "failed to initialise tracing filter (check the RUST_LOG environment variable): {e}"
            ))
        })?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn run_assembler() -> Result<(), Fail> {
    let cli = Cli::parse();
    init_logging()?;

    let span = span!(Level::ERROR, "pmxas", input = ?cli.input, output = ?cli.output);
    let _enter = span.enter();
    let output_path = PathBuf::from(cli.output);
    let options = OutputOptions { list: cli.list };
    let result = assemble_file(&cli.input, &output_path, options).map_err(Fail::AsmFail);
    match &result {
        Err(e) => event!(Level::ERROR, "assembly failed: {e:?}"),
        Ok(()) => event!(Level::INFO, "assembly succeeded"),
    }
    result
}

fn main() {
    // Deeply nested imports recurse; report an overflow legibly.
    unsafe { backtrace_on_stack_overflow::enable() };

    if let Err(e) = run_assembler() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
