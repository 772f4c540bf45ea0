//! Turning source lines into [`Statement`]s.
//!
//! The parser only checks what it must in order to know which
//! encoding rule applies: that the operands an instruction needs are
//! present and have a usable shape.  Surplus operands are ignored.
//! Whether symbols are defined is decided later, by the encoder and
//! the final substitution pass.
use std::path::Path;

use base::prelude::{Opcode, Register};

use super::ast::{DisplayFields, Operand, Statement, StatementKind, ValueOperand};
use super::lexer::{Words, classify_operand, split_line};
use super::source::Location;
use super::symbol::SymbolName;
use super::types::{AssemblerFailure, LineNumber};


/// The recognised mnemonics and directives.  There is one variant
/// for each encoding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mnemonic {
    EntryStart,
    EntryEnd,
    Var,
    Label,
    Import,
    Load,
    Unary(Opcode),
    Swap,
    Mov,
    Call,
    Goto,
    WriteChar,
    Plain(Opcode),
}

impl Mnemonic {
    pub(crate) fn from_word(word: &str) -> Option<Mnemonic> {
        match word {
            "#START" => Some(Mnemonic::EntryStart),
            "#END" => Some(Mnemonic::EntryEnd),
            "VAR" => Some(Mnemonic::Var),
            "LABEL" => Some(Mnemonic::Label),
            "IMPORT" => Some(Mnemonic::Import),
            "LOAD" => Some(Mnemonic::Load),
            "SWAP" => Some(Mnemonic::Swap),
            "MOV" => Some(Mnemonic::Mov),
            "CALL" => Some(Mnemonic::Call),
            "GOTO" => Some(Mnemonic::Goto),
            "WCHR" => Some(Mnemonic::WriteChar),
            other => Opcode::from_mnemonic(other).map(|opcode| match opcode {
                Opcode::Push | Opcode::Pop | Opcode::Pot | Opcode::Dvo | Opcode::Dvw => {
                    Mnemonic::Unary(opcode)
                }
                _ => Mnemonic::Plain(opcode),
            }),
        }
    }
}

struct LineParser<'a> {
    file: &'a Path,
    line: LineNumber,
    words: Words<'a>,
}

impl<'a> LineParser<'a> {
    fn malformed(&self, msg: String) -> AssemblerFailure {
        AssemblerFailure::MalformedOperand {
            mnemonic: self.words.mnemonic.to_string(),
            location: Location::new(self.file, self.line),
            msg,
        }
    }

    /// The text of operand `n`, counting from zero.
    fn word(&self, n: usize) -> Result<&'a str, AssemblerFailure> {
        match self.words.operands.get(n) {
            Some(w) => Ok(*w),
            None => Err(self.malformed(format!(
                "expected at least {} operand(s) but there are only {}",
                n + 1,
                self.words.operands.len()
            ))),
        }
    }

    fn operand(&self, n: usize) -> Result<Operand, AssemblerFailure> {
        self.word(n).map(classify_operand)
    }

    fn value_operand(&self, n: usize) -> Result<ValueOperand, AssemblerFailure> {
        let word = self.word(n)?;
        Ok(ValueOperand {
            word: SymbolName::from(word),
            operand: classify_operand(word),
        })
    }

    fn name(&self, n: usize) -> Result<SymbolName, AssemblerFailure> {
        self.word(n).map(SymbolName::from)
    }

    fn literal(&self, n: usize) -> Result<i64, AssemblerFailure> {
        match self.operand(n)? {
            Operand::Literal(value) => Ok(value),
            other => Err(self.malformed(format!(
                "expected a decimal value such as #10, got {other}"
            ))),
        }
    }

    fn register(&self, n: usize) -> Result<Register, AssemblerFailure> {
        match self.operand(n)? {
            Operand::Register(number) => {
                Register::try_from(number).map_err(|e| self.malformed(e.to_string()))
            }
            other => Err(self.malformed(format!("expected a register, got {other}"))),
        }
    }

    fn statement(&self, mnemonic: Mnemonic) -> Result<StatementKind, AssemblerFailure> {
        Ok(match mnemonic {
            Mnemonic::EntryStart => StatementKind::EntryStart,
            Mnemonic::EntryEnd => StatementKind::EntryEnd,
            Mnemonic::Var => StatementKind::Var {
                name: self.name(0)?,
                value: self.literal(1)?,
            },
            Mnemonic::Label => StatementKind::Label(self.name(0)?),
            Mnemonic::Import => StatementKind::Import(self.word(0)?.trim_matches('"').to_string()),
            Mnemonic::Load => StatementKind::Load {
                register: self.register(0)?,
                value: self.operand(1)?,
            },
            Mnemonic::Unary(opcode) => StatementKind::Unary {
                opcode,
                operand: self.value_operand(0)?,
            },
            Mnemonic::Swap => StatementKind::Swap(self.operand(0)?, self.operand(1)?),
            Mnemonic::Mov => StatementKind::Mov(self.operand(0)?, self.operand(1)?),
            Mnemonic::Call => StatementKind::Call(self.value_operand(0)?),
            Mnemonic::Goto => StatementKind::Goto(self.operand(0)?),
            Mnemonic::WriteChar => StatementKind::WriteChar {
                glyph: self.word(0)?.to_string(),
                fields: DisplayFields {
                    x: self.operand(1)?,
                    y: self.operand(2)?,
                    scale: self.operand(3)?,
                    colour: self.operand(4)?,
                },
            },
            Mnemonic::Plain(opcode) => StatementKind::Plain(opcode),
        })
    }
}

/// Parse one line of source.  Blank lines and comments produce no
/// statement.
///
/// # Errors
///
/// A recognised instruction lacks operands it needs, or one of them
/// has the wrong form.
pub(crate) fn parse_line(
    file: &Path,
    line: LineNumber,
    text: &str,
) -> Result<Option<Statement>, AssemblerFailure> {
    let Some(words) = split_line(text) else {
        return Ok(None);
    };
    let kind = match Mnemonic::from_word(words.mnemonic) {
        None => StatementKind::Unknown(words.mnemonic.to_string()),
        Some(mnemonic) => LineParser { file, line, words }.statement(mnemonic)?,
    };
    Ok(Some(Statement { line, kind }))
}

/// Parse a whole source file, in line order.
pub(crate) fn parse_source(
    file: &Path,
    lines: &[String],
) -> Result<Vec<Statement>, AssemblerFailure> {
    let mut statements = Vec::with_capacity(lines.len());
    for (line, text) in (1..).zip(lines) {
        if let Some(statement) = parse_line(file, line, text)? {
            statements.push(statement);
        }
    }
    Ok(statements)
}
