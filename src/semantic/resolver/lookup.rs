//! Qualified-type lookup.
//!
//! Maps a dotted or simple type reference, in the context of a
//! definition, to the entity it names. Builtins resolve via a fixed
//! table, never through the attribute index. Everything else walks the
//! scope chain: the defining module, then its ancestors up to the
//! library root, then a leading segment naming another library.

use smol_str::SmolStr;

use crate::base::Entity;
use crate::semantic::types::{Outcome, Problem, kinds};
use crate::syntax::ast::QualifiedName;

use super::Resolver;
use super::types::{ResolvedType, ScalarKind, ScalarType};

/// The fixed builtin scalar table.
pub fn builtin_type(name: &str) -> Option<ResolvedType> {
    let kind = match name {
        "Real" => ScalarKind::Real,
        "Integer" => ScalarKind::Integer,
        "Boolean" => ScalarKind::Boolean,
        "String" => ScalarKind::String,
        "Native" => ScalarKind::Native,
        _ => return None,
    };
    Some(ResolvedType::Scalar(ScalarType::builtin(kind)))
}

pub fn is_builtin_name(name: &str) -> bool {
    builtin_type(name).is_some()
}

pub fn builtin_entity(name: &str) -> Option<Entity> {
    is_builtin_name(name).then(|| Entity::builtin(name))
}

impl<'a> Resolver<'a> {
    /// Resolve a type reference to the entity it names.
    ///
    /// `context` is the definition the reference appears in; its owning
    /// module anchors the scope chain.
    pub fn lookup_type(&self, name: &QualifiedName, context: &Entity) -> Outcome<Entity> {
        if name.is_simple() {
            if let Some(entity) = builtin_entity(&name.parts[0]) {
                return Outcome::Success(entity);
            }
        }

        let module = match context.owning_module() {
            Some(module) => module,
            None => {
                return Outcome::failure(
                    Problem::error(kinds::INVALID_ENTITY, "Invalid lookup context").with_details(
                        format!("`{context}` does not belong to a module"),
                    ),
                );
            }
        };

        // Walk the module chain outward, trying the reference at each level.
        let mut scope = Some(module);
        while let Some(current) = scope {
            if let Some(entity) = self.lookup_in_module(&current, &name.parts) {
                tracing::trace!(name = %name, found = %entity, "type lookup");
                return Outcome::Success(entity);
            }
            scope = current.parent().filter(Entity::is_module);
        }

        // A dotted reference may start with a library name (the current
        // library included, for fully-qualified references).
        if name.parts.len() > 1 {
            if let Some(entity) = self.lookup_in_library(&name.parts) {
                return Outcome::Success(entity);
            }
        }

        Outcome::failure(
            Problem::error(kinds::MISSING_DEFINITION, "Unknown type")
                .with_details(format!("no definition named `{name}` is in scope"))
                .with_instance(context.clone()),
        )
    }

    /// Try `parts` as submodule navigation from `module`, ending in a
    /// definition name.
    fn lookup_in_module(&self, module: &Entity, parts: &[SmolStr]) -> Option<Entity> {
        let (library, base_path) = match module {
            Entity::Module { library, path } => (library, path),
            _ => return None,
        };
        let mut path = base_path.clone();
        let (def_name, submodules) = parts.split_last()?;
        path.extend(submodules.iter().cloned());
        let target = self.forest.module_at(library, &path)?;
        target.find_definition(def_name)?;
        Some(Entity::definition(library.clone(), path, def_name.clone()))
    }

    /// Try the first segment as a library name, the middle segments as a
    /// module path, and the last segment as a definition name.
    fn lookup_in_library(&self, parts: &[SmolStr]) -> Option<Entity> {
        let (library_name, rest) = parts.split_first()?;
        self.forest.library(library_name)?;
        let (def_name, path) = rest.split_last()?;
        let module = self.forest.module_at(library_name, path)?;
        module.find_definition(def_name)?;
        Some(Entity::definition(
            library_name.clone(),
            path.to_vec(),
            def_name.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_fixed() {
        for name in ["Real", "Integer", "Boolean", "String", "Native"] {
            let ty = builtin_type(name).unwrap();
            assert_eq!(ty.kind_name(), name);
            assert_eq!(ty.origin(), &Entity::builtin(name));
        }
        assert!(builtin_type("Complex").is_none());
        assert!(builtin_entity("real").is_none());
    }
}
