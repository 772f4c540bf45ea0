use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use super::symbol::SymbolName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnboundSymbol(pub(crate) SymbolName);

impl Display for UnboundSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "symbol {} is not defined", self.0)
    }
}

impl Error for UnboundSymbol {}

/// Values of variables (`VAR X #10`) and labels (`LABEL L`).
///
/// Both kinds of symbol are stored the same way.  Binding a name
/// which is already bound replaces the old value.  Since the table
/// is ordered by name, iteration (and hence the listing) does not
/// depend on the order in which symbols were defined.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    definitions: BTreeMap<SymbolName, i64>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Bind `name` to `value`, returning the previous value if there
    /// was one.
    pub(crate) fn bind(&mut self, name: SymbolName, value: i64) -> Option<i64> {
        self.definitions.insert(name, value)
    }

    #[must_use]
    pub fn get(&self, name: &SymbolName) -> Option<i64> {
        self.definitions.get(name).copied()
    }

    pub(crate) fn resolve(&self, name: &SymbolName) -> Result<i64, UnboundSymbol> {
        self.get(name).ok_or_else(|| UnboundSymbol(name.clone()))
    }

    /// Add all the bindings of `other` to this table.  Where both
    /// tables bind the same name, the value from `other` wins.
    pub(crate) fn merge(&mut self, other: SymbolTable) {
        self.definitions.extend(other.definitions);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SymbolName, i64)> {
        self.definitions.iter().map(|(name, value)| (name, *value))
    }
}

impl Display for SymbolTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name:<20} = {value}")?;
        }
        Ok(())
    }
}
