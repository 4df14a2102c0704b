//! # Attribute Index
//!
//! A derived, recomputable mapping from every node in the workspace
//! forest to its [`Entity`] and its structural relations (owning
//! library/module/file, child definitions). Built by one depth-first
//! walk and rebuilt wholesale whenever the tree changes; the workspace
//! triggers the rebuild lazily, on next access.
//!
//! Looking up an entity that is not indexed is a fatal assertion, not a
//! recoverable problem: it means a consumer is holding entities across a
//! mutation without re-reading through the workspace.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::Entity;
use crate::semantic::types::CompilerAssertion;
use crate::semantic::workspace::{Forest, Module};

/// Structural relations of one indexed node.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedEntities {
    pub entity: Entity,
    /// The owning library (the entity itself for library nodes).
    pub library: Entity,
    /// The owning module; `None` for library nodes.
    pub module: Option<Entity>,
    /// The owning file; only definitions have one.
    pub file: Option<Entity>,
    /// Child definition entities, for file and module nodes.
    pub definitions: Vec<Entity>,
}

/// The index over the whole forest.
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    entries: FxHashMap<Entity, RelatedEntities>,
}

impl AttributeIndex {
    /// Build the index with one depth-first walk:
    /// libraries → modules (recursively) → files → definitions.
    pub fn build(forest: &Forest) -> Self {
        let mut index = AttributeIndex::default();
        for (library_name, library) in &forest.libraries {
            let library_entity = Entity::library(library_name.clone());
            index.entries.insert(
                library_entity.clone(),
                RelatedEntities {
                    entity: library_entity.clone(),
                    library: library_entity.clone(),
                    module: None,
                    file: None,
                    definitions: Vec::new(),
                },
            );
            index.walk_module(&library.root, library_name, &mut Vec::new(), &library_entity);
        }
        tracing::debug!(entries = index.entries.len(), "attribute index rebuilt");
        index
    }

    fn walk_module(
        &mut self,
        module: &Module,
        library_name: &SmolStr,
        path: &mut Vec<SmolStr>,
        library_entity: &Entity,
    ) {
        let module_entity = Entity::module(library_name.clone(), path.iter().cloned());
        let mut module_definitions = Vec::new();

        for (file_name, file) in &module.files {
            let file_entity =
                Entity::file(library_name.clone(), path.iter().cloned(), file_name.clone());
            let mut file_definitions = Vec::new();
            for def_name in file.definitions.keys() {
                let def_entity = Entity::definition(
                    library_name.clone(),
                    path.iter().cloned(),
                    def_name.clone(),
                );
                self.entries.insert(
                    def_entity.clone(),
                    RelatedEntities {
                        entity: def_entity.clone(),
                        library: library_entity.clone(),
                        module: Some(module_entity.clone()),
                        file: Some(file_entity.clone()),
                        definitions: Vec::new(),
                    },
                );
                file_definitions.push(def_entity.clone());
                module_definitions.push(def_entity);
            }
            self.entries.insert(
                file_entity.clone(),
                RelatedEntities {
                    entity: file_entity.clone(),
                    library: library_entity.clone(),
                    module: Some(module_entity.clone()),
                    file: None,
                    definitions: file_definitions,
                },
            );
        }

        for (submodule_name, submodule) in &module.submodules {
            path.push(submodule_name.clone());
            self.walk_module(submodule, library_name, path, library_entity);
            path.pop();
        }

        self.entries.insert(
            module_entity.clone(),
            RelatedEntities {
                entity: module_entity.clone(),
                library: library_entity.clone(),
                module: module_entity.parent().filter(Entity::is_module),
                file: None,
                definitions: module_definitions,
            },
        );
    }

    /// Relations of an indexed node. Fatal on an unindexed entity.
    pub fn related(&self, entity: &Entity) -> &RelatedEntities {
        match self.entries.get(entity) {
            Some(related) => related,
            None => CompilerAssertion::UnindexedEntity(entity.clone()).raise(),
        }
    }

    /// Non-asserting lookup, for probing.
    pub fn get(&self, entity: &Entity) -> Option<&RelatedEntities> {
        self.entries.get(entity)
    }

    pub fn contains(&self, entity: &Entity) -> bool {
        self.entries.contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The definitions declared directly in a module.
    pub fn module_definitions(&self, module: &Entity) -> &[Entity] {
        &self.related(module).definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Span;
    use crate::project::ProjectManifest;
    use crate::semantic::workspace::Library;
    use crate::syntax::ast::ComponentDef;
    use crate::syntax::{Definition, SourceFile};

    fn forest() -> Forest {
        let mut forest = Forest::new();
        forest.add_library(Library::new("RLC", ProjectManifest::new("RLC", "0.1.0")));
        let mut file = SourceFile::new();
        file.insert(Definition::Component(ComponentDef::new(
            "Resistor",
            Span::from_coords(0, 0, 2, 0),
        )));
        file.insert(Definition::Component(ComponentDef::new(
            "Capacitor",
            Span::from_coords(3, 0, 5, 0),
        )));
        forest.insert_file("RLC", &[], "basic.dyad", file);
        forest.insert_file(
            "RLC",
            &[SmolStr::new("Sub")],
            "extra.dyad",
            SourceFile::new(),
        );
        forest
    }

    #[test]
    fn test_every_node_indexed() {
        let index = AttributeIndex::build(&forest());
        // 1 library + 2 modules + 2 files + 2 definitions
        assert_eq!(index.len(), 7);
        assert!(index.contains(&Entity::library("RLC")));
        assert!(index.contains(&Entity::module("RLC", Vec::new())));
        assert!(index.contains(&Entity::module("RLC", vec![SmolStr::new("Sub")])));
        assert!(index.contains(&Entity::file("RLC", Vec::new(), "basic.dyad")));
        assert!(index.contains(&Entity::definition("RLC", Vec::new(), "Resistor")));
    }

    #[test]
    fn test_related_entities() {
        let index = AttributeIndex::build(&forest());
        let def = Entity::definition("RLC", Vec::new(), "Capacitor");
        let related = index.related(&def);
        assert_eq!(related.library, Entity::library("RLC"));
        assert_eq!(related.module, Some(Entity::module("RLC", Vec::new())));
        assert_eq!(related.file, Some(Entity::file("RLC", Vec::new(), "basic.dyad")));

        let module = Entity::module("RLC", Vec::new());
        let defs = index.module_definitions(&module);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name(), Some("Resistor"));

        let nested = index.related(&Entity::module("RLC", vec![SmolStr::new("Sub")]));
        assert_eq!(nested.module, Some(Entity::module("RLC", Vec::new())));
    }

    #[test]
    #[should_panic(expected = "compiler assertion")]
    fn test_unindexed_lookup_is_fatal() {
        let index = AttributeIndex::build(&forest());
        index.related(&Entity::definition("RLC", Vec::new(), "Missing"));
    }
}
