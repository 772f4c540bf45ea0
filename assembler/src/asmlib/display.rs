//! The `WCHR` macro, which writes one character record into display
//! memory.
//!
//! A record is five consecutive cells of display memory: the glyph,
//! then the x and y position, the scale and the colour.  Each cell is
//! written by its own `POT item, POT address, STR` sequence.  The
//! address of the next free cell is kept in the assembly context, so
//! successive records (even from different files) do not overlap.
use tracing::{Level, event};

use base::prelude::{Opcode, glyph_code};

use super::ast::DisplayFields;
use super::encoder::{Cell, Program, unary_operand};
use super::state::AssemblyContext;


/// The number of display memory cells in one character record.
pub(crate) const RECORD_LEN: i64 = 5;

fn store_in_display_memory(item: Cell, program: &mut Program, cursor: &mut i64) {
    for cell in [
        Cell::Opcode(Opcode::Pot),
        item,
        Cell::Opcode(Opcode::Pot),
        Cell::Value(*cursor),
        Cell::Opcode(Opcode::Str),
    ] {
        program.push(cell);
    }
    *cursor += 1;
}

/// Append the code to write a record for `glyph` to the end of
/// `program`.
///
/// # Errors
///
/// When `glyph` is not a single character from the display's
/// character set, the text of the glyph operand is returned.
pub(crate) fn write_char(
    glyph: &str,
    fields: &DisplayFields,
    program: &mut Program,
    ctx: &mut AssemblyContext,
) -> Result<(), String> {
    let mut chars = glyph.chars();
    let code = match (chars.next(), chars.next()) {
        (Some(ch), None) => glyph_code(ch).ok(),
        _ => None,
    };
    let Some(code) = code else {
        return Err(glyph.to_string());
    };
    event!(
        Level::TRACE,
        "writing glyph {glyph} ({code}) at display address {}",
        ctx.display_cursor
    );
    let mut items = vec![Cell::Glyph(code)];
    items.extend(fields.iter().map(|field| unary_operand(field, &ctx.symtab)));
    for item in items {
        store_in_display_memory(item, program, &mut ctx.display_cursor);
    }
    Ok(())
}
