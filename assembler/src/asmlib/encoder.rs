//! Encoding statements as cells.
//!
//! Every instruction becomes one opcode cell followed by its operand
//! cells.  An operand which cannot be given a value yet is left as a
//! [`Cell::Symbol`] or [`Cell::Indirect`] for the final substitution
//! pass (see `eval.rs`) to fill in.
use std::fmt::{self, Display, Formatter, Write};
use std::path::Path;

use tracing::{Level, event};

use base::prelude::{Glyph, Opcode};

use super::ast::{Operand, Statement, StatementKind, ValueOperand};
use super::display::write_char;
use super::source::Location;
use super::state::AssemblyContext;
use super::symbol::SymbolName;
use super::symtab::SymbolTable;
use super::types::{AssemblerFailure, LineNumber, Warning};


/// One element of the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Opcode(Opcode),
    Glyph(Glyph),
    Value(i64),
    /// A hexadecimal literal, copied from the source unchanged.
    Hex(String),
    /// Replaced by the value of the symbol in the final pass.
    Symbol(SymbolName),
    /// Replaced by the value of the symbol in the final pass.  The
    /// name starts with `@`.
    Indirect(SymbolName),
}

impl Cell {
    /// Returns true when the cell no longer refers to a symbol.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Cell::Symbol(_) | Cell::Indirect(_))
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Opcode(opcode) => write!(f, "{opcode}"),
            Cell::Glyph(glyph) => write!(f, "{glyph}"),
            Cell::Value(n) => write!(f, "{n}"),
            Cell::Hex(digits) => f.write_str(digits),
            Cell::Symbol(name) | Cell::Indirect(name) => write!(f, "{name}"),
        }
    }
}

/// A sequence of cells.  Addresses count cells, starting from the
/// address at which the program is loaded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Program {
    cells: Vec<Cell>,
}

impl Program {
    #[must_use]
    pub fn new() -> Program {
        Program::default()
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub(crate) fn append(&mut self, mut other: Program) {
        self.cells.append(&mut other.cells);
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}

/// This is the on-disk format: cells separated by commas, with no
/// trailing newline.
impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_char(',')?;
            }
            write!(f, "{cell}")?;
        }
        Ok(())
    }
}

/// The address of the next cell to be appended to `program`, which
/// is loaded at `base`.
pub(crate) fn next_address(base: i64, program: &Program) -> Result<i64, AssemblerFailure> {
    i64::try_from(program.len())
        .ok()
        .and_then(|len| base.checked_add(len))
        .ok_or(AssemblerFailure::ProgramTooBig(program.len()))
}

/// Operands whose symbols are replaced as soon as they are known,
/// such as the fields of a WCHR record.  Registers become their
/// number.  Symbols which
/// are already defined are replaced by their value now; others wait
/// for the final pass.
pub(crate) fn unary_operand(operand: &Operand, symtab: &SymbolTable) -> Cell {
    match operand {
        Operand::Literal(n) => Cell::Value(*n),
        Operand::Register(n) => Cell::Value(i64::from(*n)),
        Operand::Hex(digits) => Cell::Hex(digits.clone()),
        Operand::Indirect(name) => Cell::Indirect(name.clone()),
        Operand::Symbol(name) => match symtab.get(name) {
            Some(value) => Cell::Value(value),
            None => Cell::Symbol(name.clone()),
        },
    }
}

/// Operands of PUSH, POP, POT, DVO, DVW and CALL.  A word spelled
/// like a register or a number is still taken as a symbol if a
/// symbol of that name is defined.
fn value_operand(value: &ValueOperand, symtab: &SymbolTable) -> Cell {
    match (&value.operand, symtab.get(&value.word)) {
        (Operand::Register(_) | Operand::Literal(_), Some(n)) => Cell::Value(n),
        (operand, _) => unary_operand(operand, symtab),
    }
}

/// Operands of SWAP and MOV.  Registers become their number and
/// everything else is left for the final pass.
fn register_operand(operand: &Operand) -> Cell {
    match operand {
        Operand::Literal(n) => Cell::Value(*n),
        Operand::Register(n) => Cell::Value(i64::from(*n)),
        Operand::Hex(digits) => Cell::Hex(digits.clone()),
        Operand::Symbol(name) => Cell::Symbol(name.clone()),
        Operand::Indirect(name) => Cell::Indirect(name.clone()),
    }
}

/// MOV tells the machine which of its operands are hexadecimal
/// (immediate) values with a flag cell per operand.
fn hex_flag(operand: &Operand) -> Cell {
    Cell::Value(i64::from(matches!(operand, Operand::Hex(_))))
}

struct StatementEncoder<'a> {
    file: &'a Path,
    line: LineNumber,
    base: i64,
    program: &'a mut Program,
    ctx: &'a mut AssemblyContext,
}

impl StatementEncoder<'_> {
    fn location(&self) -> Location {
        Location::new(self.file, self.line)
    }

    fn malformed(&self, mnemonic: &str, msg: String) -> AssemblerFailure {
        AssemblerFailure::MalformedOperand {
            mnemonic: mnemonic.to_string(),
            location: self.location(),
            msg,
        }
    }

    fn emit<I: IntoIterator<Item = Cell>>(&mut self, cells: I) {
        for cell in cells {
            self.program.push(cell);
        }
    }

    fn bind(&mut self, name: &SymbolName, value: i64) {
        event!(Level::DEBUG, "defining {name} = {value}");
        if let Some(previous) = self.ctx.symtab.bind(name.clone(), value) {
            if previous != value {
                let location = self.location();
                self.ctx.warn(Warning::Redefinition {
                    name: name.clone(),
                    previous,
                    value,
                    location,
                });
            }
        }
    }

    fn load_value(&self, operand: &Operand) -> Result<Cell, AssemblerFailure> {
        match operand {
            Operand::Literal(n) => Ok(Cell::Value(*n)),
            Operand::Hex(digits) => Ok(Cell::Hex(digits.clone())),
            Operand::Indirect(name) => Ok(Cell::Indirect(name.clone())),
            Operand::Symbol(name) => match self.ctx.symtab.resolve(name) {
                Ok(value) => Ok(Cell::Value(value)),
                Err(e) => Err(AssemblerFailure::UnboundSymbol {
                    name: e.0,
                    location: Some(self.location()),
                }),
            },
            Operand::Register(_) => Err(self.malformed(
                "LOAD",
                format!("cannot load register {operand}; use SWAP or PUSH and POP"),
            )),
        }
    }

    fn jump_target(&self, operand: &Operand) -> Result<Cell, AssemblerFailure> {
        match operand {
            Operand::Register(_) => Err(self.malformed(
                "GOTO",
                format!("jump target {operand} is a register; use CALL to jump through a register"),
            )),
            other => Ok(register_operand(other)),
        }
    }

    fn encode(&mut self, kind: &StatementKind) -> Result<(), AssemblerFailure> {
        match kind {
            // The driver deals with these.
            StatementKind::EntryStart | StatementKind::EntryEnd | StatementKind::Import(_) => {}
            StatementKind::Var { name, value } => {
                self.bind(name, *value);
            }
            StatementKind::Label(name) => {
                let here = next_address(self.base, self.program)?;
                self.bind(name, here);
            }
            StatementKind::Load { register, value } => {
                let value = self.load_value(value)?;
                self.emit([Cell::Opcode(Opcode::Load(*register)), value]);
            }
            StatementKind::Unary { opcode, operand } => {
                let operand = value_operand(operand, &self.ctx.symtab);
                self.emit([Cell::Opcode(*opcode), operand]);
            }
            StatementKind::Swap(first, second) => {
                self.emit([
                    Cell::Opcode(Opcode::Swap),
                    register_operand(first),
                    register_operand(second),
                ]);
            }
            StatementKind::Mov(source, destination) => {
                self.emit([
                    Cell::Opcode(Opcode::Mov),
                    hex_flag(source),
                    hex_flag(destination),
                    register_operand(source),
                    register_operand(destination),
                ]);
            }
            StatementKind::Call(target) => {
                // POT leaves the target on top of the stack, which is
                // where GOTO takes its destination from.
                let target = value_operand(target, &self.ctx.symtab);
                self.emit([
                    Cell::Opcode(Opcode::Pot),
                    target,
                    Cell::Opcode(Opcode::Goto),
                ]);
            }
            StatementKind::Goto(target) => {
                let target = self.jump_target(target)?;
                self.emit([Cell::Opcode(Opcode::Goto), target]);
            }
            StatementKind::WriteChar { glyph, fields } => {
                write_char(glyph, fields, self.program, self.ctx)
                    .map_err(|glyph| AssemblerFailure::UnknownGlyph {
                        glyph,
                        location: self.location(),
                    })?;
            }
            StatementKind::Plain(opcode) => {
                self.emit([Cell::Opcode(*opcode)]);
            }
            StatementKind::Unknown(mnemonic) => {
                let location = self.location();
                self.ctx.warn(Warning::UnknownMnemonic {
                    mnemonic: mnemonic.clone(),
                    location,
                });
            }
        }
        Ok(())
    }
}

/// Append the encoding of `statement` to `program`, which will be
/// loaded at address `base`.  VAR and LABEL update the symbol table
/// in `ctx` instead of generating cells.
///
/// # Errors
///
/// - LOAD refers to a symbol which has not been defined yet.
/// - An operand cannot be encoded by its instruction.
/// - WCHR names a character which has no glyph.
pub(crate) fn encode_statement(
    file: &Path,
    statement: &Statement,
    base: i64,
    program: &mut Program,
    ctx: &mut AssemblyContext,
) -> Result<(), AssemblerFailure> {
    StatementEncoder {
        file,
        line: statement.line,
        base,
        program,
        ctx,
    }
    .encode(&statement.kind)
}
