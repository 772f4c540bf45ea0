//! Display glyph codes.
//!
//! The PMX display device draws characters described by records in a
//! memory-mapped region starting at [`DISPLAY_MEMORY_BASE`].  Each
//! record holds five cells: glyph code, x, y, scale and colour.
//!
//! Only upper-case letters and space have glyphs.  Code 0x16 is not
//! assigned; `V` is 0x17.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Address of the first cell of the display memory region.
pub const DISPLAY_MEMORY_BASE: i64 = 0x2AD00;

/// The code of a drawable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Glyph(u8);

impl Glyph {
    #[must_use]
    pub fn code(&self) -> u8 {
        self.0
    }
}

impl Display for Glyph {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct UnknownGlyph(pub char);

impl Display for UnknownGlyph {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "the display has no glyph for '{}'", self.0)
    }
}

impl Error for UnknownGlyph {}

/// Find the display glyph for `ch`.
///
/// # Errors
///
/// [`UnknownGlyph`] when `ch` is neither an upper-case ASCII letter
/// nor a space.
pub fn glyph_code(ch: char) -> Result<Glyph, UnknownGlyph> {
    match ch {
        ' ' => Ok(Glyph(0x00)),
        'A'..='U' => Ok(Glyph(ch as u8 - b'A' + 1)),
        // 0x16 is skipped.
        'V'..='Z' => Ok(Glyph(ch as u8 - b'A' + 2)),
        _ => Err(UnknownGlyph(ch)),
    }
}

#[test]
fn test_glyph_codes() {
    fn code(ch: char) -> u8 {
        glyph_code(ch).expect("test glyph should exist").code()
    }
    assert_eq!(code(' '), 0x00);
    assert_eq!(code('A'), 0x01);
    assert_eq!(code('J'), 0x0A);
    assert_eq!(code('U'), 0x15);
    assert_eq!(code('V'), 0x17);
    assert_eq!(code('Z'), 0x1B);
}

#[test]
fn test_unknown_glyphs() {
    for ch in ['a', '0', '!', 'É'] {
        assert_eq!(glyph_code(ch), Err(UnknownGlyph(ch)));
    }
}

#[test]
fn test_glyph_display() {
    assert_eq!(glyph_code('K').map(|g| g.to_string()), Ok("0x0B".to_string()));
}
