//! Parsed source files.

use indexmap::IndexMap;
use serde_json::Value;
use smol_str::SmolStr;

use super::ast::Definition;

/// One parsed Dyad source file: definitions keyed by name.
///
/// Produced by the parser collaborator; the semantic core never sees
/// concrete source text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFile {
    pub definitions: IndexMap<SmolStr, Definition>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
}

impl SourceFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition under its own name, replacing any previous
    /// definition of that name.
    pub fn insert(&mut self, definition: Definition) {
        self.definitions
            .insert(definition.name().clone(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }
}
