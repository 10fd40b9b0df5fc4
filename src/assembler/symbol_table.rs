//! Symbol table management for labels

use std::collections::BTreeMap;

use crate::assembler::Symbol;

/// Symbol table for managing label definitions
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    /// Create a new empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol to the table
    ///
    /// Returns Ok(()) on success, Err with the existing symbol if the name is
    /// already defined
    pub fn add_symbol(&mut self, name: String, address: u16, defined_at: usize) -> Result<(), Symbol> {
        if let Some(existing) = self.lookup_symbol(&name) {
            return Err(existing.clone());
        }

        self.symbols.insert(
            name.clone(),
            Symbol {
                name,
                address,
                defined_at,
            },
        );

        Ok(())
    }

    /// Look up a symbol by name
    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// All symbols, sorted by name
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// The address table of an object file
    pub fn to_address_table(&self) -> BTreeMap<String, u16> {
        self.symbols
            .values()
            .map(|symbol| (symbol.name.clone(), symbol.address))
            .collect()
    }
}
