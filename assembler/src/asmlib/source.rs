//! Reading the assembler's input.
use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

use super::types::{AssemblerFailure, IoAction, IoFailed, IoTarget, LineNumber};

/// A line within a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub(crate) file: PathBuf,
    pub(crate) line: LineNumber,
}

impl Location {
    pub(crate) fn new(file: &Path, line: LineNumber) -> Location {
        Location {
            file: file.to_path_buf(),
            line,
        }
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Supplies the lines of source files to the assembler.
pub trait SourceLoader {
    /// Fetch all the lines of `path`.
    ///
    /// # Errors
    ///
    /// The file cannot be read.
    fn load(&self, path: &Path) -> Result<Vec<String>, AssemblerFailure>;
}

/// Reads source files from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

impl SourceLoader for FileSource {
    fn load(&self, path: &Path) -> Result<Vec<String>, AssemblerFailure> {
        let fail = |error| {
            AssemblerFailure::Io(IoFailed {
                action: IoAction::Read,
                target: IoTarget::File(path.to_path_buf()),
                error,
            })
        };
        let input = File::open(path).map_err(fail)?;
        BufReader::new(input)
            .lines()
            .collect::<Result<Vec<String>, _>>()
            .map_err(fail)
    }
}

/// Remove `.` components and fold `..` components into their parent
/// without consulting the filesystem, so that two spellings of the
/// same import compare equal.
pub(crate) fn normalise(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => (),
            Component::ParentDir => {
                let can_pop = matches!(
                    result.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    result.pop();
                } else {
                    result.push(component);
                }
            }
            other => result.push(other),
        }
    }
    result
}

/// Work out which file an `IMPORT` directive in `importing_file`
/// refers to.  Relative names are relative to the directory
/// containing the importing file.
pub(crate) fn resolve_import(importing_file: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    let joined = match importing_file.parent() {
        Some(dir) if target.is_relative() => dir.join(target),
        _ => target.to_path_buf(),
    };
    normalise(&joined)
}

#[test]
fn test_resolve_import_is_relative_to_importer() {
    assert_eq!(
        resolve_import(Path::new("progs/main.asm"), "lib/font.asm"),
        PathBuf::from("progs/lib/font.asm")
    );
    assert_eq!(
        resolve_import(Path::new("main.asm"), "font.asm"),
        PathBuf::from("font.asm")
    );
    assert_eq!(
        resolve_import(Path::new("progs/main.asm"), "/usr/share/pmx/font.asm"),
        PathBuf::from("/usr/share/pmx/font.asm")
    );
}

#[test]
fn test_resolve_import_normalises() {
    assert_eq!(
        resolve_import(Path::new("progs/lib/a.asm"), "../lib/./b.asm"),
        PathBuf::from("progs/lib/b.asm")
    );
    assert_eq!(
        resolve_import(Path::new("a.asm"), "../b.asm"),
        PathBuf::from("../b.asm")
    );
}

#[test]
fn test_location_display() {
    let loc = Location::new(Path::new("main.asm"), 12);
    assert_eq!(loc.to_string(), "main.asm:12");
}
