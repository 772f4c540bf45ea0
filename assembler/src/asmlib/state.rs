use std::path::{Path, PathBuf};

use tracing::{Level, event};

use base::prelude::DISPLAY_MEMORY_BASE;

use super::symtab::SymbolTable;
use super::types::Warning;

/// The state which is carried from one statement to the next, and
/// into (and back out of) imported files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AssemblyContext {
    pub(crate) symtab: SymbolTable,
    /// Address of the next free cell of display memory.
    pub(crate) display_cursor: i64,
    pub(crate) warnings: Vec<Warning>,
    /// The files currently being assembled, outermost first.
    import_chain: Vec<PathBuf>,
}

impl Default for AssemblyContext {
    fn default() -> Self {
        AssemblyContext {
            symtab: SymbolTable::new(),
            display_cursor: DISPLAY_MEMORY_BASE,
            warnings: Vec::new(),
            import_chain: Vec::new(),
        }
    }
}

impl AssemblyContext {
    pub(crate) fn warn(&mut self, warning: Warning) {
        event!(Level::WARN, "{warning}");
        self.warnings.push(warning);
    }

    pub(crate) fn is_being_assembled(&self, file: &Path) -> bool {
        self.import_chain.iter().any(|f| f == file)
    }

    pub(crate) fn enter_file(&mut self, file: &Path) {
        self.import_chain.push(file.to_path_buf());
    }

    pub(crate) fn leave_file(&mut self) {
        self.import_chain.pop();
    }

    /// The context in which an imported file is assembled.  It can see
    /// (and redefine) every symbol bound so far.
    pub(crate) fn for_import(&self) -> AssemblyContext {
        AssemblyContext {
            symtab: self.symtab.clone(),
            display_cursor: self.display_cursor,
            warnings: Vec::new(),
            import_chain: self.import_chain.clone(),
        }
    }

    /// Take back the state of an imported file once it has been
    /// assembled.
    pub(crate) fn absorb(&mut self, imported: AssemblyContext) {
        self.symtab.merge(imported.symtab);
        self.display_cursor = imported.display_cursor;
        self.warnings.extend(imported.warnings);
    }
}

#[test]
fn test_import_context_round_trip() {
    use super::symbol::SymbolName;

    let mut parent = AssemblyContext::default();
    parent.symtab.bind(SymbolName::from("A"), 1);
    let mut child = parent.for_import();
    assert_eq!(child.symtab.get(&SymbolName::from("A")), Some(1));
    child.symtab.bind(SymbolName::from("B"), 2);
    child.display_cursor += 5;
    parent.absorb(child);
    assert_eq!(parent.symtab.get(&SymbolName::from("B")), Some(2));
    assert_eq!(parent.display_cursor, DISPLAY_MEMORY_BASE + 5);
}
