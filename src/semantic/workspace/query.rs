//! The query surface.
//!
//! A single `query(selector)` entry point is the only way external
//! callers (code generators, editors, the CLI) read semantic state.
//! Selectors are pure functions over a [`QueryContext`]; they compose by
//! calling other selectors. Uncaught panics inside a selector are
//! converted into a bundled problem at this boundary, so the external
//! contract stays Result-shaped even for fatal assertions.

use std::panic::AssertUnwindSafe;

use serde_json::Value;

use crate::base::Entity;
use crate::semantic::index::{AttributeIndex, RelatedEntities};
use crate::semantic::instantiate::{ModelInstance, instantiate_model};
use crate::semantic::resolver::{ResolvedType, Resolver};
use crate::semantic::symbols::{SymbolTarget, resolve_symbol};
use crate::semantic::types::{Outcome, Problem, kinds};
use crate::syntax::Definition;
use crate::syntax::ast::Modifications;

use super::core::Workspace;
use super::forest::Forest;

/// What a selector closes over: the forest root, the attribute index,
/// and fetch/resolve entry points.
pub struct QueryContext<'a> {
    root: &'a Forest,
    attrs: &'a AttributeIndex,
    resolver: Resolver<'a>,
}

impl<'a> QueryContext<'a> {
    /// The workspace forest.
    pub fn root(&self) -> &'a Forest {
        self.root
    }

    /// Structural relations of an indexed entity. Fatal on an unindexed
    /// one (converted to a problem at the query boundary).
    pub fn attrs(&self, entity: &Entity) -> &RelatedEntities {
        self.attrs.related(entity)
    }

    /// The declaration node addressed by a definition entity.
    pub fn fetch(&self, entity: &Entity) -> Option<&'a Definition> {
        self.resolver.definition(entity)
    }

    pub fn resolve(&self, entity: &Entity) -> Outcome<ResolvedType> {
        self.resolver.resolve_entity(entity)
    }

    pub fn instantiate(
        &self,
        entity: &Entity,
        mods: &Modifications,
        metadata_override: Option<Value>,
    ) -> Outcome<ModelInstance> {
        instantiate_model(&self.resolver, entity, mods, metadata_override)
    }

    pub fn symbol(&self, name: &str, context: &Entity) -> Outcome<SymbolTarget> {
        resolve_symbol(&self.resolver, name, context)
    }
}

impl Workspace {
    /// Run a selector against a consistent snapshot.
    pub fn query<R>(&self, selector: impl FnOnce(&QueryContext) -> R) -> Outcome<R> {
        self.with_index(|forest, index| {
            let context = QueryContext {
                root: forest,
                attrs: index,
                resolver: Resolver::with_cache(
                    forest,
                    index,
                    &self.resolution_cache,
                    &self.revisions,
                ),
            };
            match std::panic::catch_unwind(AssertUnwindSafe(|| selector(&context))) {
                Ok(value) => Outcome::Success(value),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::warn!(message, "selector panicked");
                    let problem = Problem::error(kinds::INTERNAL_ERROR, "Internal error")
                        .with_details(message.to_string());
                    self.record_problems(std::slice::from_ref(&problem));
                    Outcome::failure(problem)
                }
            }
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
