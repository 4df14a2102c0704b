//! The resolution engine.

use std::cell::RefCell;

use smol_str::SmolStr;

use crate::base::{Entity, SourceLocation, Span};
use crate::semantic::index::AttributeIndex;
use crate::semantic::modification::apply_modifications;
use crate::semantic::types::{CompilerAssertion, Outcome, Problem, kinds};
use crate::semantic::workspace::{Forest, MemoCache, RevisionLog};
use crate::syntax::Definition;
use crate::syntax::ast::{
    AnalysisDef, ComponentDef, EnumTypeDef, Expression, FieldDeclaration, FunctionTypeDef,
    QualifiedName, ScalarConnectorDef, ScalarTypeDef, StructConnectorDef, StructTypeDef,
};

use super::lookup::builtin_type;
use super::types::{
    AnalysisType, ComponentType, ConnectorFieldType, ConnectorType, EnumType, FunctionType,
    ResolvedType, ScalarType, StructType,
};

/// Shared read context for resolution, instantiation, and symbol lookup.
///
/// A resolver borrows one forest snapshot; everything it computes is a
/// pure function of that snapshot. When built through the workspace it
/// also carries the memoization cache and revision log.
pub struct Resolver<'a> {
    pub(crate) forest: &'a Forest,
    pub(crate) index: &'a AttributeIndex,
    cache: Option<(&'a MemoCache<Outcome<ResolvedType>>, &'a RevisionLog)>,
    visiting: RefCell<Vec<Entity>>,
}

impl<'a> Resolver<'a> {
    /// A memo-free resolver over a forest snapshot.
    pub fn new(forest: &'a Forest, index: &'a AttributeIndex) -> Self {
        Self {
            forest,
            index,
            cache: None,
            visiting: RefCell::new(Vec::new()),
        }
    }

    /// A resolver whose per-entity results are memoized in `cache`.
    pub fn with_cache(
        forest: &'a Forest,
        index: &'a AttributeIndex,
        cache: &'a MemoCache<Outcome<ResolvedType>>,
        revisions: &'a RevisionLog,
    ) -> Self {
        Self {
            forest,
            index,
            cache: Some((cache, revisions)),
            visiting: RefCell::new(Vec::new()),
        }
    }

    /// The declaration node addressed by a definition entity.
    pub fn definition(&self, entity: &Entity) -> Option<&'a Definition> {
        self.forest.definition(entity)
    }

    /// Resolve an entity to its canonical type.
    pub fn resolve_entity(&self, entity: &Entity) -> Outcome<ResolvedType> {
        if let Entity::Builtin { name } = entity {
            return match builtin_type(name) {
                Some(ty) => Outcome::Success(ty),
                None => Outcome::failure(
                    Problem::error(kinds::INVALID_ENTITY, "Unknown builtin")
                        .with_details(format!("`{name}` is not a builtin type"))
                        .with_instance(entity.clone()),
                ),
            };
        }

        if !entity.is_definition() {
            return Outcome::failure(
                Problem::error(kinds::INVALID_ENTITY, "Not a type")
                    .with_details(format!("`{entity}` does not name a definition"))
                    .with_instance(entity.clone()),
            );
        }

        if self.visiting.borrow().contains(entity) {
            return Outcome::failure(
                Problem::error(kinds::INVALID_ENTITY, "Cyclic type reference")
                    .with_details(format!("`{entity}` refers to itself through its base"))
                    .with_instance(entity.clone()),
            );
        }

        match self.cache {
            Some((cache, revisions)) => cache.get_or_compute(revisions, entity, || {
                self.resolve_entity_uncached(entity)
            }),
            None => self.resolve_entity_uncached(entity),
        }
    }

    fn resolve_entity_uncached(&self, entity: &Entity) -> Outcome<ResolvedType> {
        if self.index.get(entity).is_none() {
            return Outcome::failure(
                Problem::error(kinds::MISSING_DEFINITION, "Unknown definition")
                    .with_details(format!("`{entity}` does not exist in the workspace"))
                    .with_instance(entity.clone()),
            );
        }
        // An indexed entity must have an AST node; anything else is a
        // stale index.
        let Some(def) = self.forest.definition(entity) else {
            CompilerAssertion::UnindexedEntity(entity.clone()).raise()
        };

        self.visiting.borrow_mut().push(entity.clone());
        let outcome = self.resolve_definition(def, entity);
        self.visiting.borrow_mut().pop();
        outcome
    }

    /// Resolve a declaration node in the context of its own entity.
    pub fn resolve_definition(&self, def: &Definition, entity: &Entity) -> Outcome<ResolvedType> {
        tracing::trace!(entity = %entity, kind = def.kind_name(), "resolving definition");
        match def {
            Definition::ScalarType(d) => self.resolve_scalar_type(d, entity),
            Definition::StructType(d) => self.resolve_struct_type(d, entity),
            Definition::EnumType(d) => self.resolve_enum_type(d, entity),
            Definition::FunctionType(d) => self.resolve_function_type(d, entity),
            Definition::ScalarConnector(d) => self.resolve_scalar_connector(d, entity),
            Definition::StructConnector(d) => self.resolve_struct_connector(d, entity),
            Definition::Component(d) => Outcome::Success(self.resolve_component(d, entity)),
            Definition::Analysis(d) => Outcome::Success(self.resolve_analysis(d, entity)),
        }
    }

    /// Look up a type reference and resolve what it names.
    pub fn resolve_reference(
        &self,
        name: &QualifiedName,
        context: &Entity,
    ) -> Outcome<ResolvedType> {
        self.lookup_type(name, context)
            .chain(|entity| self.resolve_entity(&entity))
    }

    // ------------------------------------------------------------------
    // Per-kind resolution
    // ------------------------------------------------------------------

    fn resolve_scalar_type(&self, def: &ScalarTypeDef, entity: &Entity) -> Outcome<ResolvedType> {
        self.resolve_reference(&def.base, entity)
            .chain(|base| self.expect_scalar(base, &def.base, entity))
            .chain(|base| {
                apply_modifications(ResolvedType::Scalar(base), &def.modifications, entity)
            })
            .map(|ty| match ty {
                ResolvedType::Scalar(mut scalar) => {
                    scalar.origin = entity.clone();
                    ResolvedType::Scalar(scalar)
                }
                other => other,
            })
    }

    fn resolve_struct_type(&self, def: &StructTypeDef, entity: &Entity) -> Outcome<ResolvedType> {
        let fields = Outcome::combine(def.fields.values().map(|field| {
            self.resolve_field(field, entity)
                .map(|ty| (field.name.clone(), ty))
        }));
        fields.map(|fields| {
            ResolvedType::Struct(StructType {
                origin: entity.clone(),
                fields: fields.into_iter().collect(),
            })
        })
    }

    fn resolve_enum_type(&self, def: &EnumTypeDef, entity: &Entity) -> Outcome<ResolvedType> {
        let cases = Outcome::combine(def.cases.values().map(|case| {
            let fields = Outcome::combine(case.fields.values().map(|field| {
                self.resolve_field(field, entity)
                    .map(|ty| (field.name.clone(), ty))
            }));
            fields.map(|fields| {
                (
                    case.name.clone(),
                    StructType {
                        origin: entity.clone(),
                        fields: fields.into_iter().collect(),
                    },
                )
            })
        }));
        cases.map(|cases| {
            ResolvedType::Enum(EnumType {
                origin: entity.clone(),
                cases: cases.into_iter().collect(),
            })
        })
    }

    fn resolve_function_type(
        &self,
        def: &FunctionTypeDef,
        entity: &Entity,
    ) -> Outcome<ResolvedType> {
        let positional = Outcome::combine(
            def.positional
                .iter()
                .map(|p| self.resolve_reference(&p.ty, entity)),
        );
        let keyword = Outcome::combine(def.keyword.values().map(|p| {
            self.resolve_reference(&p.ty, entity)
                .map(|ty| (p.name.clone(), ty))
        }));
        let returns = Outcome::combine(
            def.returns
                .iter()
                .map(|p| self.resolve_reference(&p.ty, entity)),
        );

        positional.chain(|positional| {
            keyword.chain(|keyword| {
                returns.map(|returns| {
                    ResolvedType::Function(FunctionType {
                        origin: entity.clone(),
                        positional,
                        keyword: keyword.into_iter().collect(),
                        returns,
                    })
                })
            })
        })
    }

    fn resolve_scalar_connector(
        &self,
        def: &ScalarConnectorDef,
        entity: &Entity,
    ) -> Outcome<ResolvedType> {
        self.resolve_reference(&def.ty, entity)
            .chain(|ty| self.expect_scalar(ty, &def.ty, entity))
            .chain(|inner| {
                apply_modifications(ResolvedType::Scalar(inner), &def.modifications, entity)
            })
            .map(|ty| match ty {
                ResolvedType::Scalar(inner) => ResolvedType::Connector(ConnectorType::Scalar {
                    origin: entity.clone(),
                    direction: def.direction,
                    inner,
                }),
                other => other,
            })
    }

    fn resolve_struct_connector(
        &self,
        def: &StructConnectorDef,
        entity: &Entity,
    ) -> Outcome<ResolvedType> {
        let fields = Outcome::combine(def.fields.values().map(|field| {
            self.resolve_reference(&field.ty, entity).map(|ty| {
                let ty = wrap_dims(ty, &field.dims);
                (
                    field.name.clone(),
                    ConnectorFieldType {
                        qualifier: field.qualifier,
                        ty: Box::new(ty),
                    },
                )
            })
        }));
        fields.map(|fields| {
            ResolvedType::Connector(ConnectorType::Compound {
                origin: entity.clone(),
                fields: fields.into_iter().collect(),
            })
        })
    }

    fn resolve_component(&self, def: &ComponentDef, entity: &Entity) -> ResolvedType {
        // Members merge from the extends chain during instantiation; the
        // resolved type stays a reference until then.
        ResolvedType::Component(ComponentType {
            origin: entity.clone(),
            partial: def.partial,
        })
    }

    fn resolve_analysis(&self, def: &AnalysisDef, entity: &Entity) -> ResolvedType {
        ResolvedType::Analysis(AnalysisType {
            origin: entity.clone(),
            partial: def.partial,
        })
    }

    fn resolve_field(&self, field: &FieldDeclaration, entity: &Entity) -> Outcome<ResolvedType> {
        let resolved = self.resolve_reference(&field.ty, entity);
        let resolved = if field.modifications.is_empty() {
            resolved
        } else {
            resolved.chain(|ty| apply_modifications(ty, &field.modifications, entity))
        };
        resolved.map(|ty| {
            let ty = wrap_dims(ty, &field.dims);
            match &field.condition {
                Some(condition) => ResolvedType::Conditional {
                    inner: Box::new(ty),
                    condition: condition.clone(),
                },
                None => ty,
            }
        })
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn expect_scalar(
        &self,
        ty: ResolvedType,
        name: &QualifiedName,
        context: &Entity,
    ) -> Outcome<ScalarType> {
        match ty {
            ResolvedType::Scalar(scalar) => Outcome::Success(scalar),
            other => {
                let mut problem = Problem::error(kinds::INVALID_ENTITY, "Invalid base type")
                    .with_details(format!(
                        "`{name}` must resolve to a scalar type, found {}",
                        other.kind_name()
                    ))
                    .with_instance(context.clone());
                if let Some(location) = self.locate(context, name.span) {
                    problem.location = Some(location);
                }
                Outcome::failure(problem)
            }
        }
    }

    /// A `{file, span}` location inside the file owning `context`.
    pub(crate) fn locate(&self, context: &Entity, span: Span) -> Option<SourceLocation> {
        let related = self.index.get(context)?;
        let file = related.file.as_ref()?;
        Some(SourceLocation::new(display_path(file), span))
    }
}

/// Library-relative display path of a file entity.
pub(crate) fn display_path(file: &Entity) -> String {
    match file {
        Entity::File {
            path,
            file,
            ..
        } => {
            let mut segments: Vec<&str> = path.iter().map(SmolStr::as_str).collect();
            segments.push(file);
            segments.join("/")
        }
        other => other.to_string(),
    }
}

fn wrap_dims(ty: ResolvedType, dims: &[Expression]) -> ResolvedType {
    if dims.is_empty() {
        ty
    } else {
        ResolvedType::Array {
            elem: Box::new(ty),
            dims: dims.to_vec(),
        }
    }
}
