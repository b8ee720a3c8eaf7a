//! Import collection and `use` rendering.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use wrapgen_ir::Import;

/// Tracks imports and deduplicates them.
///
/// Maintains insertion order of modules for deterministic output; symbols
/// within a module are sorted.
///
/// # Example
///
/// ```
/// use wrapgen_codegen::ImportCollector;
///
/// let mut imports = ImportCollector::new();
/// imports.add("std::sync", "Mutex");
/// imports.add("std::sync", "Arc");
/// imports.add("std::fmt", "Display");
///
/// assert_eq!(
///     imports.render(),
///     vec!["use std::sync::{Arc, Mutex};", "use std::fmt::Display;"]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImportCollector {
    /// Module path -> set of symbols
    imports: IndexMap<String, BTreeSet<String>>,
}

impl ImportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol import from a module.
    pub fn add(&mut self, module: &str, symbol: &str) {
        self.imports
            .entry(module.to_string())
            .or_default()
            .insert(symbol.to_string());
    }

    /// Add a module import without specific symbols (`use serde;`).
    pub fn add_module(&mut self, module: &str) {
        self.imports.entry(module.to_string()).or_default();
    }

    /// Add a model import, honouring its local name.
    pub fn add_import(&mut self, import: &Import) {
        if import.is_glob() {
            self.add(&import.path, "*");
            return;
        }

        let leaf = import.leaf();
        let symbol = if import.name == leaf {
            leaf.to_string()
        } else {
            format!("{leaf} as {}", import.name)
        };
        match import.parent() {
            Some(parent) => self.add(parent, &symbol),
            None => self.add_module(&symbol),
        }
    }

    /// Check if a module is already imported.
    pub fn has_module(&self, module: &str) -> bool {
        self.imports.contains_key(module)
    }

    /// Check if a specific symbol is imported from a module.
    pub fn has_symbol(&self, module: &str, symbol: &str) -> bool {
        self.imports
            .get(module)
            .is_some_and(|symbols| symbols.contains(symbol))
    }

    /// Iterate over all imports in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.imports.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Get the number of modules.
    pub fn len(&self) -> usize {
        self.imports.len()
    }

    /// One `use` declaration per module.
    pub fn render(&self) -> Vec<String> {
        self.iter()
            .map(|(module, symbols)| {
                let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
                match symbols.as_slice() {
                    [] => format!("use {module};"),
                    [symbol] => format!("use {module}::{symbol};"),
                    many => format!("use {module}::{{{}}};", many.join(", ")),
                }
            })
            .collect()
    }
}

impl<'a> FromIterator<&'a Import> for ImportCollector {
    fn from_iter<I: IntoIterator<Item = &'a Import>>(iter: I) -> Self {
        let mut collector = ImportCollector::new();
        for import in iter {
            collector.add_import(import);
        }
        collector
    }
}
