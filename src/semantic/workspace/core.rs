//! The workspace itself.

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::base::Entity;
use crate::core::events::EventEmitter;
use crate::project::{Provider, SourceParser, SourceRenderer, TransactionId};
use crate::semantic::index::AttributeIndex;
use crate::semantic::instantiate::{ModelInstance, instantiate_model};
use crate::semantic::resolver::{ResolvedType, Resolver};
use crate::semantic::symbols::{SymbolTarget, resolve_symbol};
use crate::semantic::types::{Outcome, Problem, WorkspaceEvent, kinds, unique_problems};
use crate::syntax::ast::Modifications;

use super::cache::{MemoCache, RevisionLog};
use super::forest::{Forest, Library};
use super::transaction::Transaction;

pub(super) struct IndexSlot {
    pub(super) index: AttributeIndex,
    pub(super) revision: u64,
}

/// Owns the forest, the attribute index, all memoization caches, and the
/// registered collaborators. All external reads go through its query
/// API; all mutation goes through transactions or provider events.
pub struct Workspace {
    pub(super) forest: Forest,
    pub(super) index: RwLock<IndexSlot>,
    pub(super) resolution_cache: MemoCache<Outcome<ResolvedType>>,
    pub(super) instance_cache: MemoCache<Outcome<ModelInstance>>,
    pub(super) revisions: RevisionLog,
    pub(super) providers: Vec<Box<dyn Provider>>,
    pub(super) parser: Option<Box<dyn SourceParser>>,
    pub(super) renderer: Option<Box<dyn SourceRenderer>>,
    pub(super) seen_transactions: FxHashSet<TransactionId>,
    pub(super) next_transaction: TransactionId,
    pub(super) exclusive_in_flight: bool,
    pub(super) problem_sink: Mutex<Vec<Problem>>,
    pub events: EventEmitter<WorkspaceEvent, Workspace>,
}

impl Workspace {
    /// Creates a new empty workspace.
    pub fn new() -> Self {
        Self {
            forest: Forest::new(),
            index: RwLock::new(IndexSlot {
                index: AttributeIndex::build(&Forest::new()),
                revision: 0,
            }),
            resolution_cache: MemoCache::new(),
            instance_cache: MemoCache::new(),
            revisions: RevisionLog::new(),
            providers: Vec::new(),
            parser: None,
            renderer: None,
            seen_transactions: FxHashSet::default(),
            next_transaction: 0,
            exclusive_in_flight: false,
            problem_sink: Mutex::new(Vec::new()),
            events: EventEmitter::new(),
        }
    }

    /// Register the parser collaborator used to reconstruct ASTs from
    /// provider text.
    pub fn set_parser(&mut self, parser: Box<dyn SourceParser>) {
        self.parser = Some(parser);
    }

    /// Register the pretty-printer collaborator used when transactions
    /// commit edited files back to their provider.
    pub fn set_renderer(&mut self, renderer: Box<dyn SourceRenderer>) {
        self.renderer = Some(renderer);
    }

    /// Register a provider and ingest the library it serves: manifest
    /// first, then whatever file events the provider has queued.
    pub fn register_provider(
        &mut self,
        mut provider: Box<dyn Provider>,
    ) -> Outcome<Entity> {
        let mut problems = Vec::new();
        if let Err(error) = provider.init().and_then(|()| provider.connect()) {
            return Outcome::failure(
                Problem::error(kinds::PROVIDER_FAILURE, "Provider failed")
                    .with_details(format!(
                        "provider for `{}` failed to start: {error}",
                        provider.library_name()
                    )),
            );
        }

        let manifest_text =
            match provider.read_file(&crate::project::ProviderKey::ProjectManifest) {
                Ok(text) => text,
                Err(error) => {
                    return Outcome::failure(
                        Problem::error(kinds::PROVIDER_FAILURE, "Provider failed")
                            .with_details(format!(
                                "cannot read manifest for `{}`: {error}",
                                provider.library_name()
                            )),
                    );
                }
            };
        let manifest = match crate::project::ProjectManifest::parse(&manifest_text) {
            Ok(manifest) => manifest,
            Err(error) => {
                return Outcome::failure(
                    Problem::error(kinds::INVALID_MANIFEST, "Invalid manifest")
                        .with_details(error.to_string()),
                );
            }
        };
        problems.extend(manifest.validate());

        let library_name = provider.library_name().to_string();
        let library_entity = Entity::library(library_name.as_str());
        self.forest
            .add_library(Library::new(library_name.as_str(), manifest));
        self.providers.push(provider);
        self.revisions.record_global();
        self.publish_event(WorkspaceEvent::LibraryAdded {
            library: library_entity.clone(),
        });

        tracing::info!(library = %library_name, "library registered");
        self.process_events();

        Outcome::from_parts(Some(library_entity), problems)
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn library_count(&self) -> usize {
        self.forest.libraries.len()
    }

    /// Run `f` against a consistent (forest, index) pair, rebuilding the
    /// index first if the forest changed since it was last built.
    pub(super) fn with_index<R>(&self, f: impl FnOnce(&Forest, &AttributeIndex) -> R) -> R {
        let current = self.revisions.current();
        {
            let slot = self.index.read();
            if slot.revision == current {
                return f(&self.forest, &slot.index);
            }
        }
        let mut slot = self.index.write();
        if slot.revision != current {
            slot.index = AttributeIndex::build(&self.forest);
            slot.revision = current;
        }
        let slot = parking_lot::RwLockWriteGuard::downgrade(slot);
        f(&self.forest, &slot.index)
    }

    /// Resolve an entity's canonical type, memoized against the current
    /// snapshot.
    pub fn resolve(&self, entity: &Entity) -> Outcome<ResolvedType> {
        let outcome = self.with_index(|forest, index| {
            Resolver::with_cache(forest, index, &self.resolution_cache, &self.revisions)
                .resolve_entity(entity)
        });
        self.record_problems(outcome.problems());
        outcome
    }

    /// Instantiate a component or analysis definition. Instances are
    /// built fresh on every call.
    pub fn instantiate(
        &self,
        entity: &Entity,
        mods: &Modifications,
        metadata_override: Option<Value>,
    ) -> Outcome<ModelInstance> {
        let outcome = self.with_index(|forest, index| {
            let resolver =
                Resolver::with_cache(forest, index, &self.resolution_cache, &self.revisions);
            instantiate_model(&resolver, entity, mods, metadata_override)
        });
        self.record_problems(outcome.problems());
        outcome
    }

    /// Opt-in cached instantiation for unmodified definitions; entries
    /// are invalidated wholesale by any committed mutation.
    pub fn instantiate_cached(&self, entity: &Entity) -> Outcome<ModelInstance> {
        let outcome = self
            .instance_cache
            .get_or_compute_coarse(&self.revisions, entity, || {
                self.instantiate(entity, &Modifications::new(), None)
            });
        self.record_problems(outcome.problems());
        outcome
    }

    /// Resolve a bare identifier against a definition's members or the
    /// global constant table.
    pub fn resolve_symbol(&self, name: &str, context: &Entity) -> Outcome<SymbolTarget> {
        let outcome = self.with_index(|forest, index| {
            let resolver =
                Resolver::with_cache(forest, index, &self.resolution_cache, &self.revisions);
            resolve_symbol(&resolver, name, context)
        });
        self.record_problems(outcome.problems());
        outcome
    }

    /// Open a transaction for serialized in-place edits.
    pub fn transaction(&mut self) -> Transaction<'_> {
        self.next_transaction += 1;
        let id = self.next_transaction;
        Transaction::new(self, id)
    }

    /// Deduplicated problems accumulated by queries since the last
    /// [`Workspace::clear_diagnostics`].
    pub fn diagnostics(&self) -> Vec<Problem> {
        unique_problems(self.problem_sink.lock().clone())
    }

    pub fn clear_diagnostics(&self) {
        self.problem_sink.lock().clear();
    }

    pub(super) fn record_problems(&self, problems: &[Problem]) {
        if !problems.is_empty() {
            self.problem_sink.lock().extend(problems.iter().cloned());
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
