use std::fmt::{self, Display, Formatter};

use base::prelude::Opcode;

use super::encoder::{Cell, Program};
use super::symtab::SymbolTable;

/// A human-readable account of an assembled program: the symbol
/// table, then one line per cell giving its address.
pub(crate) struct Listing<'a> {
    pub(crate) symbols: &'a SymbolTable,
    pub(crate) program: &'a Program,
    pub(crate) base: i64,
}

struct ListingLine<'a> {
    address: i64,
    cell: &'a Cell,
}

impl Display for ListingLine<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let address = self.address;
        let cell = self.cell.to_string();
        match self.cell {
            Cell::Opcode(Opcode::Load(register)) => {
                write!(f, "{address:>8}  {cell:<8}  LOAD {register}")
            }
            Cell::Opcode(opcode) => write!(f, "{address:>8}  {cell:<8}  {}", opcode.mnemonic()),
            _ => write!(f, "{address:>8}  {cell}"),
        }
    }
}

impl Display for Listing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Symbol Table:")?;
        write!(f, "{}", self.symbols)?;
        writeln!(f)?;

        writeln!(f, "Program:")?;
        for (address, cell) in (self.base..).zip(self.program.cells()) {
            writeln!(f, "{}", ListingLine { address, cell })?;
        }
        Ok(())
    }
}

#[test]
fn test_listing_format() {
    use super::symbol::SymbolName;
    use base::prelude::Register;

    let mut symbols = SymbolTable::new();
    symbols.bind(SymbolName::from("START"), 0);
    let mut program = Program::new();
    program.push(Cell::Opcode(Opcode::Load(Register::R1)));
    program.push(Cell::Value(10));
    program.push(Cell::Opcode(Opcode::Halt));
    let listing = Listing {
        symbols: &symbols,
        program: &program,
        base: 0,
    };
    let text = listing.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "Symbol Table:",
            "START                = 0",
            "",
            "Program:",
            "       0  0x01      LOAD R1",
            "       1  10",
            "       2  0x00      HALT",
        ]
    );
}
