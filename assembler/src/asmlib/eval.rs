//! The final pass, which replaces the remaining symbol references
//! with their values.
//!
//! By the time this runs every file has been assembled, so the symbol
//! table holds every label and variable in the program, including
//! those defined after they were used.
use tracing::{Level, event, span};

use super::encoder::{Cell, Program};
use super::symtab::SymbolTable;
use super::types::AssemblerFailure;

/// Replace each [`Cell::Symbol`] and [`Cell::Indirect`] in `program`
/// with the value bound to its name.
///
/// # Errors
///
/// [`AssemblerFailure::UnboundSymbol`] if a referenced name was never
/// defined.
pub(crate) fn substitute_symbols(
    program: &mut Program,
    base: i64,
    symtab: &SymbolTable,
) -> Result<(), AssemblerFailure> {
    let span = span!(Level::ERROR, "substitute symbols");
    let _enter = span.enter();

    for (address, cell) in (base..).zip(program.cells_mut().iter_mut()) {
        let name = match cell {
            Cell::Symbol(name) | Cell::Indirect(name) => name,
            _ => continue,
        };
        match symtab.resolve(name) {
            Ok(value) => {
                event!(Level::TRACE, "cell {address}: {name} = {value}");
                *cell = Cell::Value(value);
            }
            Err(e) => {
                event!(
                    Level::ERROR,
                    "cell {address} refers to {name}, which is not defined"
                );
                return Err(AssemblerFailure::UnboundSymbol {
                    name: e.0,
                    location: None,
                });
            }
        }
    }
    Ok(())
}
