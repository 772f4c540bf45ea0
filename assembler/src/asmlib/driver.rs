//! Assembling a program from its main source file and the files it
//! imports.
//!
//! Each file is parsed once into statements, which are then divided
//! into two regions: the preamble (everything outside `#START` ...
//! `#END`) and the entry block (everything inside).  The preamble is
//! encoded first, at the file's base address, and the entry block is
//! encoded afterwards, immediately following it.  So the entry block
//! always comes last in the file's code, and it can refer to any
//! label of the preamble wherever the markers appear in the source.
//!
//! An `IMPORT` assembles the named file at the address which the next
//! cell would have, and splices its code in at that point.  The
//! imported file shares the symbol table of the importing file.
//!
//! Display memory is handed out in source order, not code order.
//! Before a file is encoded, each of its `WCHR` statements and each
//! of its imports (which take one record per `WCHR` they contain,
//! however deeply nested) is given its records.  So a `WCHR` in an
//! entry block at the top of a file gets the first record even though
//! its code is placed last.
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{Level, event, span};

use super::ast::{Statement, StatementKind};
use super::display::RECORD_LEN;
use super::encoder::{Cell, Program, encode_statement, next_address};
use super::eval::substitute_symbols;
use super::listing::Listing;
use super::parser::parse_source;
use super::source::{FileSource, Location, SourceLoader, normalise, resolve_import};
use super::state::AssemblyContext;
use super::symtab::SymbolTable;
use super::types::{AssemblerFailure, IoAction, IoFailed, IoTarget, LineNumber, Warning};

mod output;
#[cfg(test)]
mod tests;

pub use output::{write_listing, write_program};

/// The address at which the main source file is loaded.
pub const PROGRAM_BASE: i64 = 0;

/// The result of assembling a program.  Every cell has been given
/// its final value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledProgram {
    program: Program,
    symbols: SymbolTable,
    warnings: Vec<Warning>,
}

impl AssembledProgram {
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        self.program.cells()
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Problems found during assembly which did not stop it.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// A listing of the symbol table and of each cell with its
    /// address.
    #[must_use]
    pub fn listing(&self) -> String {
        Listing {
            symbols: &self.symbols,
            program: &self.program,
            base: PROGRAM_BASE,
        }
        .to_string()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Regions {
    preamble: Vec<Statement>,
    entry: Vec<Statement>,
}

fn split_regions(file: &Path, statements: Vec<Statement>, ctx: &mut AssemblyContext) -> Regions {
    let mut regions = Regions::default();
    let mut in_entry_block = false;
    for statement in statements {
        let marker = match statement.kind {
            StatementKind::EntryStart if in_entry_block => "#START",
            StatementKind::EntryEnd if !in_entry_block => "#END",
            StatementKind::EntryStart | StatementKind::EntryEnd => {
                in_entry_block = !in_entry_block;
                continue;
            }
            _ => {
                if in_entry_block {
                    regions.entry.push(statement);
                } else {
                    regions.preamble.push(statement);
                }
                continue;
            }
        };
        ctx.warn(Warning::UnmatchedEntryMarker {
            marker: marker.to_string(),
            location: Location::new(file, statement.line),
        });
    }
    if in_entry_block {
        event!(
            Level::DEBUG,
            "{}: entry block has no #END, so it extends to the end of the file",
            file.display()
        );
    }
    regions
}

/// The first display memory address of each `WCHR` and `IMPORT`
/// statement of a file, keyed by line.
#[derive(Debug, Default, PartialEq, Eq)]
struct DisplaySlots {
    starts: BTreeMap<LineNumber, i64>,
    /// The address after the last record used by the file.
    end: i64,
}

struct Assembler<'a, L: SourceLoader> {
    loader: &'a L,
}

impl<L: SourceLoader> Assembler<'_, L> {
    fn imported_file(
        file: &Path,
        statement: &Statement,
        target: &str,
        ctx: &AssemblyContext,
    ) -> Result<PathBuf, AssemblerFailure> {
        let imported_file: PathBuf = resolve_import(file, target);
        if ctx.is_being_assembled(&imported_file) {
            Err(AssemblerFailure::ImportCycle {
                file: imported_file,
                location: Location::new(file, statement.line),
            })
        } else {
            Ok(imported_file)
        }
    }

    /// The number of display records written by `file` and the files
    /// it imports.
    fn count_records(
        &self,
        file: &Path,
        ctx: &mut AssemblyContext,
    ) -> Result<i64, AssemblerFailure> {
        let lines = self.loader.load(file)?;
        let statements = parse_source(file, &lines)?;
        ctx.enter_file(file);
        let result: Result<i64, AssemblerFailure> =
            statements.iter().try_fold(0, |total, statement| match &statement.kind {
                StatementKind::WriteChar { .. } => Ok(total + 1),
                StatementKind::Import(target) => {
                    let imported_file = Self::imported_file(file, statement, target, ctx)?;
                    Ok(total + self.count_records(&imported_file, ctx)?)
                }
                _ => Ok(total),
            });
        ctx.leave_file();
        result
    }

    /// Give display memory to the statements of `file` in the order
    /// they appear, starting at the context's display cursor.
    fn allocate_display_slots(
        &self,
        file: &Path,
        statements: &[Statement],
        ctx: &mut AssemblyContext,
    ) -> Result<DisplaySlots, AssemblerFailure> {
        let mut slots = DisplaySlots {
            starts: BTreeMap::new(),
            end: ctx.display_cursor,
        };
        for statement in statements {
            let records = match &statement.kind {
                StatementKind::WriteChar { .. } => 1,
                StatementKind::Import(target) => {
                    let imported_file = Self::imported_file(file, statement, target, ctx)?;
                    self.count_records(&imported_file, ctx)?
                }
                _ => continue,
            };
            slots.starts.insert(statement.line, slots.end);
            slots.end += records * RECORD_LEN;
        }
        event!(
            Level::TRACE,
            "{} uses display memory {}..{}",
            file.display(),
            ctx.display_cursor,
            slots.end
        );
        Ok(slots)
    }

    fn import(
        &self,
        file: &Path,
        statement: &Statement,
        target: &str,
        base: i64,
        program: &mut Program,
        ctx: &mut AssemblyContext,
    ) -> Result<(), AssemblerFailure> {
        let imported_file = Self::imported_file(file, statement, target, ctx)?;
        let import_base = next_address(base, program)?;
        event!(
            Level::DEBUG,
            "importing {} at address {import_base}",
            imported_file.display()
        );
        let mut imported_ctx = ctx.for_import();
        let imported = self.assemble_unit(&imported_file, import_base, &mut imported_ctx)?;
        ctx.absorb(imported_ctx);
        program.append(imported);
        Ok(())
    }

    /// Encode `statements` onto the end of `program`, which is
    /// loaded at `base`.
    fn encode_region(
        &self,
        file: &Path,
        statements: &[Statement],
        slots: &DisplaySlots,
        base: i64,
        program: &mut Program,
        ctx: &mut AssemblyContext,
    ) -> Result<(), AssemblerFailure> {
        for statement in statements {
            if let Some(start) = slots.starts.get(&statement.line) {
                ctx.display_cursor = *start;
            }
            match &statement.kind {
                StatementKind::Import(target) => {
                    self.import(file, statement, target, base, program, ctx)?;
                }
                _ => {
                    encode_statement(file, statement, base, program, ctx)?;
                }
            }
        }
        Ok(())
    }

    fn encode_regions(
        &self,
        file: &Path,
        regions: &Regions,
        slots: &DisplaySlots,
        base: i64,
        ctx: &mut AssemblyContext,
    ) -> Result<Program, AssemblerFailure> {
        let mut program = Program::new();
        self.encode_region(file, &regions.preamble, slots, base, &mut program, ctx)?;
        if regions.entry.is_empty() {
            return Ok(program);
        }

        let entry_base = next_address(base, &program)?;
        let span = span!(Level::ERROR, "entry block", base = entry_base);
        let _enter = span.enter();
        event!(
            Level::DEBUG,
            "placing entry block of {} at address {entry_base}",
            file.display()
        );
        let mut entry = Program::new();
        self.encode_region(file, &regions.entry, slots, entry_base, &mut entry, ctx)?;
        program.append(entry);
        Ok(program)
    }

    /// Assemble `file` for loading at `base`.  The returned program
    /// may still contain symbol references.
    fn assemble_unit(
        &self,
        file: &Path,
        base: i64,
        ctx: &mut AssemblyContext,
    ) -> Result<Program, AssemblerFailure> {
        let span = span!(Level::ERROR, "assemble", file = %file.display(), base);
        let _enter = span.enter();

        let lines = self.loader.load(file)?;
        let statements = parse_source(file, &lines)?;

        ctx.enter_file(file);
        let result = self
            .allocate_display_slots(file, &statements, ctx)
            .and_then(|slots| {
                let regions = split_regions(file, statements, ctx);
                let program = self.encode_regions(file, &regions, &slots, base, ctx)?;
                ctx.display_cursor = slots.end;
                Ok(program)
            });
        ctx.leave_file();
        result
    }
}

/// Assemble the program whose main source file is `path`, reading
/// it and the files it imports with `loader`.
///
/// # Errors
///
/// Any failure to read or assemble the main file or an imported
/// file, or a reference to a symbol which is never defined.
pub fn assemble_source<L: SourceLoader>(
    loader: &L,
    path: &Path,
) -> Result<AssembledProgram, AssemblerFailure> {
    // Imported file names are normalised, so the main file name must
    // be too or an import of it would not be seen as a cycle.
    let path = normalise(path);
    let mut ctx = AssemblyContext::default();
    let mut program = Assembler { loader }.assemble_unit(&path, PROGRAM_BASE, &mut ctx)?;
    substitute_symbols(&mut program, PROGRAM_BASE, &ctx.symtab)?;
    event!(
        Level::INFO,
        "assembled {} cells, {} symbols, {} warnings",
        program.len(),
        ctx.symtab.len(),
        ctx.warnings.len()
    );
    Ok(AssembledProgram {
        program,
        symbols: ctx.symtab,
        warnings: ctx.warnings,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// When set, print a listing to stdout after assembly.
    pub list: bool,
}

/// Assemble `input_file_name` and write the result to
/// `output_file_name`.
///
/// # Errors
///
/// Any failure of [`assemble_source`], or of writing the output.
pub fn assemble_file(
    input_file_name: &OsStr,
    output_file_name: &Path,
    options: OutputOptions,
) -> Result<(), AssemblerFailure> {
    let assembled = assemble_source(&FileSource, Path::new(input_file_name))?;

    if options.list {
        let stdout = std::io::stdout();
        write_listing(&assembled, &mut stdout.lock())?;
    }

    let output_file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(output_file_name)
        .map_err(|error| {
            AssemblerFailure::Io(IoFailed {
                action: IoAction::Write,
                target: IoTarget::File(output_file_name.to_owned()),
                error,
            })
        })?;
    let mut writer = std::io::BufWriter::new(output_file);
    write_program(assembled.program(), &mut writer, output_file_name)
}
