//! Abstract syntax of PMX assembly source.
use std::fmt::{self, Display, Formatter};

use base::prelude::{Opcode, Register};

use super::symbol::SymbolName;
use super::types::LineNumber;

/// An operand, classified according to how it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operand {
    /// `#10` or `10`.
    Literal(i64),
    /// `0x1F`, kept as written.
    Hex(String),
    /// `R3`.
    Register(u32),
    Symbol(SymbolName),
    /// `@NAME`, resolved only by the final substitution pass.  The
    /// name includes the `@`.
    Indirect(SymbolName),
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(n) => write!(f, "#{n}"),
            Operand::Hex(digits) => f.write_str(digits),
            Operand::Register(n) => write!(f, "R{n}"),
            Operand::Symbol(name) | Operand::Indirect(name) => write!(f, "{name}"),
        }
    }
}

/// The fields of a display record written by `WCHR`, after the
/// glyph itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DisplayFields {
    pub(crate) x: Operand,
    pub(crate) y: Operand,
    pub(crate) scale: Operand,
    pub(crate) colour: Operand,
}

impl DisplayFields {
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Operand> {
        [&self.x, &self.y, &self.scale, &self.colour].into_iter()
    }
}

/// An operand which may name a symbol even though it is spelled like
/// a register or a number (after `VAR R1 #5`, `PUSH R1` pushes 5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValueOperand {
    /// The operand exactly as written.
    pub(crate) word: SymbolName,
    pub(crate) operand: Operand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StatementKind {
    /// `#START`: the following statements form the entry block.
    EntryStart,
    /// `#END`: closes the entry block.
    EntryEnd,
    Var {
        name: SymbolName,
        value: i64,
    },
    Label(SymbolName),
    Import(String),
    Load {
        register: Register,
        value: Operand,
    },
    /// PUSH, POP, POT, DVO and DVW.
    Unary {
        opcode: Opcode,
        operand: ValueOperand,
    },
    Swap(Operand, Operand),
    Mov(Operand, Operand),
    Call(ValueOperand),
    Goto(Operand),
    WriteChar {
        glyph: String,
        fields: DisplayFields,
    },
    /// An instruction with no operands.
    Plain(Opcode),
    /// The mnemonic was not recognised.
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Statement {
    pub(crate) line: LineNumber,
    pub(crate) kind: StatementKind,
}
