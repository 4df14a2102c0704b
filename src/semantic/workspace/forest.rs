//! The workspace forest: libraries, modules, and their source files.
//!
//! Nodes are addressed by entity rather than by graph pointers: a library
//! by name, a module by library + path, a file or definition by its
//! owning module. Edits replace whole files; finer-grained addressing is
//! the attribute index's job.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::Entity;
use crate::project::ProjectManifest;
use crate::syntax::{Definition, SourceFile};

/// One library: a manifest plus a module tree.
#[derive(Debug, Clone)]
pub struct Library {
    pub name: SmolStr,
    pub manifest: ProjectManifest,
    pub root: Module,
}

impl Library {
    pub fn new(name: impl Into<SmolStr>, manifest: ProjectManifest) -> Self {
        Self {
            name: name.into(),
            manifest,
            root: Module::new(),
        }
    }
}

/// A module: nested submodules and source files, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub submodules: IndexMap<SmolStr, Module>,
    pub files: IndexMap<SmolStr, SourceFile>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the definition of the given name across this module's files.
    pub fn find_definition(&self, name: &str) -> Option<(&SmolStr, &Definition)> {
        for (file_name, file) in &self.files {
            if let Some(def) = file.get(name) {
                return Some((file_name, def));
            }
        }
        None
    }
}

/// All libraries currently loaded into the workspace.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    pub libraries: IndexMap<SmolStr, Library>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn library(&self, name: &str) -> Option<&Library> {
        self.libraries.get(name)
    }

    pub fn add_library(&mut self, library: Library) {
        self.libraries.insert(library.name.clone(), library);
    }

    /// Walk to the module at `path` inside `library`.
    pub fn module_at(&self, library: &str, path: &[SmolStr]) -> Option<&Module> {
        let mut module = &self.library(library)?.root;
        for segment in path {
            module = module.submodules.get(segment)?;
        }
        Some(module)
    }

    fn module_at_mut(&mut self, library: &str, path: &[SmolStr]) -> Option<&mut Module> {
        let mut module = &mut self.libraries.get_mut(library)?.root;
        for segment in path {
            module = module.submodules.get_mut(segment)?;
        }
        Some(module)
    }

    /// The source file addressed by a `File` entity.
    pub fn file(&self, entity: &Entity) -> Option<&SourceFile> {
        match entity {
            Entity::File {
                library,
                path,
                file,
            } => self.module_at(library, path)?.files.get(file),
            _ => None,
        }
    }

    pub fn file_mut(&mut self, entity: &Entity) -> Option<&mut SourceFile> {
        match entity {
            Entity::File {
                library,
                path,
                file,
            } => self.module_at_mut(library, path)?.files.get_mut(file),
            _ => None,
        }
    }

    /// The definition addressed by a `Definition` entity, searching the
    /// owning module's files.
    pub fn definition(&self, entity: &Entity) -> Option<&Definition> {
        match entity {
            Entity::Definition {
                library,
                path,
                name,
            } => self
                .module_at(library, path)?
                .find_definition(name)
                .map(|(_, def)| def),
            _ => None,
        }
    }

    /// Insert (or replace) a file, creating intermediate modules.
    pub fn insert_file(
        &mut self,
        library: &str,
        path: &[SmolStr],
        file_name: impl Into<SmolStr>,
        file: SourceFile,
    ) -> bool {
        let Some(lib) = self.libraries.get_mut(library) else {
            return false;
        };
        let mut module = &mut lib.root;
        for segment in path {
            module = module
                .submodules
                .entry(segment.clone())
                .or_insert_with(Module::new);
        }
        module.files.insert(file_name.into(), file);
        true
    }

    /// Remove a file; returns whether it existed. Empty intermediate
    /// modules are kept (their entities stay addressable).
    pub fn remove_file(&mut self, entity: &Entity) -> bool {
        match entity {
            Entity::File {
                library,
                path,
                file,
            } => self
                .module_at_mut(library, path)
                .map(|m| m.files.shift_remove(file).is_some())
                .unwrap_or(false),
            _ => false,
        }
    }
}
