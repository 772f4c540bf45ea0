#![warn(unreachable_pub)]
#![deny(unsafe_code)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::manual_string_new)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::wildcard_imports)]
#![warn(clippy::bool_to_int_with_if)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::items_after_statements)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)] // fix soon

mod ast;
mod display;
mod driver;
mod encoder;
mod eval;
mod lexer;
mod listing;
mod parser;
mod source;
mod state;
mod symbol;
mod symtab;
mod types;

pub use driver::{
    AssembledProgram, OutputOptions, PROGRAM_BASE, assemble_file, assemble_source,
    write_listing, write_program,
};
pub use encoder::{Cell, Program};
pub use source::{FileSource, Location, SourceLoader};
pub use symbol::SymbolName;
pub use symtab::SymbolTable;
pub use types::{AssemblerFailure, IoAction, IoFailed, IoTarget, Warning};
