//! The prelude exports the items which are useful in representing
//! PMX instructions.  Providing this prelude is the main purpose of
//! the base crate.
pub use super::charset::{DISPLAY_MEMORY_BASE, Glyph, UnknownGlyph, glyph_code};
pub use super::instruction::*;
