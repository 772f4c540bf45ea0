use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io::Error as IoError;
use std::path::PathBuf;

use super::source::Location;
use super::symbol::SymbolName;

/// Line numbers count from 1.
pub(crate) type LineNumber = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    Read,
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoTarget {
    File(PathBuf),
    Stdout,
}

#[derive(Debug)]
pub struct IoFailed {
    pub action: IoAction,
    pub target: IoTarget,
    pub error: IoError,
}

impl Display for IoFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let IoFailed {
            action,
            target,
            error,
        } = self;
        let action_name: &str = match action {
            IoAction::Read => "read",
            IoAction::Write => "write",
        };
        match target {
            IoTarget::Stdout => write!(f, "failed to {action_name} on stdout: {error}"),
            IoTarget::File(file_name) => {
                write!(
                    f,
                    "failed to {action_name} file {}: {error}",
                    file_name.display()
                )
            }
        }
    }
}

#[derive(Debug)]
pub enum AssemblerFailure {
    Io(IoFailed),
    /// A symbol was used but never defined.  The location is not
    /// known for symbols which are only found to be missing in the
    /// final substitution pass.
    UnboundSymbol {
        name: SymbolName,
        location: Option<Location>,
    },
    UnknownGlyph {
        glyph: String,
        location: Location,
    },
    MalformedOperand {
        mnemonic: String,
        location: Location,
        msg: String,
    },
    /// The file is already being assembled further up the chain of
    /// IMPORT directives.
    ImportCycle {
        file: PathBuf,
        location: Location,
    },
    ProgramTooBig(usize),
}

impl Display for AssemblerFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            AssemblerFailure::Io(e) => e.fmt(f),
            AssemblerFailure::UnboundSymbol { name, location } => match location {
                Some(loc) => write!(f, "{loc}: symbol {name} is not defined"),
                None => write!(f, "symbol {name} is not defined"),
            },
            AssemblerFailure::UnknownGlyph { glyph, location } => {
                write!(f, "{location}: the display has no glyph for '{glyph}'")
            }
            AssemblerFailure::MalformedOperand {
                mnemonic,
                location,
                msg,
            } => {
                write!(f, "{location}: bad operand for {mnemonic}: {msg}")
            }
            AssemblerFailure::ImportCycle { file, location } => {
                write!(
                    f,
                    "{location}: {} imports itself (directly or indirectly)",
                    file.display()
                )
            }
            AssemblerFailure::ProgramTooBig(len) => {
                write!(
                    f,
                    "program is too big: {len} cells cannot be addressed by the machine"
                )
            }
        }
    }
}

impl Error for AssemblerFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AssemblerFailure::Io(IoFailed { error, .. }) => Some(error),
            _ => None,
        }
    }
}

/// Problems which do not stop assembly.  Each of these is also logged
/// when it is detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The first word of a line is not a known mnemonic or directive,
    /// so the line was skipped.
    UnknownMnemonic { mnemonic: String, location: Location },
    /// A symbol was given a new value, replacing an earlier one.
    Redefinition {
        name: SymbolName,
        previous: i64,
        value: i64,
        location: Location,
    },
    /// An `#END` with no open entry block, or a `#START` inside one.
    UnmatchedEntryMarker { marker: String, location: Location },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Warning::UnknownMnemonic { mnemonic, location } => {
                write!(f, "{location}: ignoring unknown instruction {mnemonic}")
            }
            Warning::Redefinition {
                name,
                previous,
                value,
                location,
            } => {
                write!(
                    f,
                    "{location}: symbol {name} redefined as {value} (it was {previous})"
                )
            }
            Warning::UnmatchedEntryMarker { marker, location } => {
                write!(f, "{location}: ignoring unmatched {marker}")
            }
        }
    }
}
