//! Opcodes and registers of the PMX virtual machine.
//!
//! A PMX program is a flat sequence of cells.  Each instruction
//! occupies one cell for its opcode, followed by however many operand
//! cells that particular instruction consumes.  For example `LOAD R2
//! 7` occupies two cells and `SWAP R1 R2` occupies three.
//!
//! The machine has eight general-purpose registers, `R1` to `R8`.
//! Register 0 does not exist; the machine silently ignores PUSH or
//! POP of a register outside that range.
//!
//! In the loadable program format each opcode is written as `0x`
//! followed by two upper-case hexadecimal digits, which is what the
//! [`Display`] implementation of [`Opcode`] produces.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

#[cfg(test)]
use test_strategy::proptest;

/// The number of general-purpose registers.
pub const REGISTER_COUNT: u8 = 8;

/// One of the general-purpose registers `R1` to `R8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register(u8);

impl Register {
    pub const R1: Register = Register(1);
    pub const R2: Register = Register(2);

    #[must_use]
    pub fn number(&self) -> u8 {
        self.0
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Signals that a register number is outside the range `1..=8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoSuchRegister(pub u32);

impl Display for NoSuchRegister {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R{} is not a register (registers are R1 to R{REGISTER_COUNT})",
            self.0
        )
    }
}

impl Error for NoSuchRegister {}

impl TryFrom<u32> for Register {
    type Error = NoSuchRegister;

    fn try_from(n: u32) -> Result<Register, NoSuchRegister> {
        match u8::try_from(n) {
            Ok(r) if (1..=REGISTER_COUNT).contains(&r) => Ok(Register(r)),
            _ => Err(NoSuchRegister(n)),
        }
    }
}

/// A PMX opcode.
///
/// `LOAD` is the only register-parameterised opcode: `LOAD R1` is
/// 0x01, `LOAD R2` is 0x02 and so on up to `LOAD R8` at 0x08.  The
/// other instructions which name registers (PUSH, POP, SWAP, ...)
/// take the register number as an operand cell instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Halt,
    Load(Register),
    Add,
    Sub,
    Push,
    Pop,
    Equal,
    Gth,
    Lth,
    Dup,
    /// Put the operand on top of the stack.
    Pot,
    Ovr,
    Inc,
    Dcr,
    Mov,
    /// Store the value below the top of stack at the address on top
    /// of the stack.
    Str,
    Dvo,
    Dvw,
    Swap,
    Goto,
    Jmp,
    Jnz,
    Rmv,
    Rpc,
    Ret,
}

impl Opcode {
    /// Every opcode other than the `LOAD` family, in opcode order.
    pub const FIXED: [Opcode; 24] = [
        Opcode::Halt,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Equal,
        Opcode::Gth,
        Opcode::Lth,
        Opcode::Dup,
        Opcode::Pot,
        Opcode::Ovr,
        Opcode::Inc,
        Opcode::Dcr,
        Opcode::Mov,
        Opcode::Str,
        Opcode::Dvo,
        Opcode::Dvw,
        Opcode::Swap,
        Opcode::Goto,
        Opcode::Jmp,
        Opcode::Rmv,
        Opcode::Jnz,
        Opcode::Rpc,
        Opcode::Ret,
    ];

    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Opcode::Halt => 0x00,
            Opcode::Load(reg) => reg.number(),
            Opcode::Add => 0x09,
            Opcode::Sub => 0x0A,
            Opcode::Push => 0x0B,
            Opcode::Pop => 0x0C,
            Opcode::Equal => 0x0D,
            Opcode::Gth => 0x0E,
            Opcode::Lth => 0x0F,
            Opcode::Dup => 0x10,
            Opcode::Pot => 0x11,
            Opcode::Ovr => 0x12,
            Opcode::Inc => 0x13,
            Opcode::Dcr => 0x14,
            Opcode::Mov => 0x20,
            Opcode::Str => 0xAA,
            Opcode::Dvo => 0xAF,
            Opcode::Dvw => 0xBF,
            Opcode::Swap => 0xCF,
            Opcode::Goto => 0xDE,
            Opcode::Jmp => 0xDF,
            Opcode::Rmv => 0xEE,
            Opcode::Jnz => 0xEF,
            Opcode::Rpc => 0xFE,
            Opcode::Ret => 0xFF,
        }
    }

    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Halt => "HALT",
            Opcode::Load(_) => "LOAD",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Equal => "EQUAL",
            Opcode::Gth => "GTH",
            Opcode::Lth => "LTH",
            Opcode::Dup => "DUP",
            Opcode::Pot => "POT",
            Opcode::Ovr => "OVR",
            Opcode::Inc => "INC",
            Opcode::Dcr => "DCR",
            Opcode::Mov => "MOV",
            Opcode::Str => "STR",
            Opcode::Dvo => "DVO",
            Opcode::Dvw => "DVW",
            Opcode::Swap => "SWAP",
            Opcode::Goto => "GOTO",
            Opcode::Jmp => "JMP",
            Opcode::Jnz => "JNZ",
            Opcode::Rmv => "RMV",
            Opcode::Rpc => "RPC",
            Opcode::Ret => "RET",
        }
    }

    /// Look up an opcode by its mnemonic.  `LOAD` is not found here,
    /// since its opcode depends on the register it loads.
    #[must_use]
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        Opcode::FIXED.into_iter().find(|op| op.mnemonic() == name)
    }

    /// Decode an opcode cell.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Opcode> {
        match Register::try_from(u32::from(code)) {
            Ok(reg) => Some(Opcode::Load(reg)),
            Err(_) => Opcode::FIXED.into_iter().find(|op| op.code() == code),
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.code())
    }
}

#[test]
fn test_load_opcode_depends_on_register() {
    for n in 1..=8_u32 {
        let reg = Register::try_from(n).expect("R1..R8 are registers");
        assert_eq!(u32::from(Opcode::Load(reg).code()), n);
    }
    assert_eq!(Register::try_from(0), Err(NoSuchRegister(0)));
    assert_eq!(Register::try_from(9), Err(NoSuchRegister(9)));
}

#[test]
fn test_opcode_display() {
    assert_eq!(Opcode::Halt.to_string(), "0x00");
    assert_eq!(Opcode::Load(Register::R2).to_string(), "0x02");
    assert_eq!(Opcode::Sub.to_string(), "0x0A");
    assert_eq!(Opcode::Str.to_string(), "0xAA");
    assert_eq!(Opcode::Goto.to_string(), "0xDE");
}

#[test]
fn test_from_mnemonic() {
    assert_eq!(Opcode::from_mnemonic("HALT"), Some(Opcode::Halt));
    assert_eq!(Opcode::from_mnemonic("MOV"), Some(Opcode::Mov));
    assert_eq!(Opcode::from_mnemonic("LOAD"), None);
    // Mnemonics are case-sensitive.
    assert_eq!(Opcode::from_mnemonic("halt"), None);
    assert_eq!(Opcode::from_mnemonic("WSTR"), None);
}

#[test]
fn test_opcode_codes_are_distinct() {
    let mut codes: Vec<u8> = Opcode::FIXED.iter().map(Opcode::code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), Opcode::FIXED.len());
    assert!(codes.iter().all(|&c| !(1..=REGISTER_COUNT).contains(&c)));
}

#[cfg(test)]
#[proptest]
fn opcode_cells_decode_to_the_same_opcode(code: u8) {
    if let Some(op) = Opcode::from_code(code) {
        assert_eq!(op.code(), code);
        let text = op.to_string();
        let digits = text.strip_prefix("0x").expect("opcode cells start with 0x");
        assert_eq!(u8::from_str_radix(digits, 16), Ok(code));
    }
}
