//! Serialized in-place AST edits.
//!
//! All mutation of the forest goes through a [`Transaction`]: any number
//! of `modify` calls, then one `commit`, which renders the dirty files
//! through the pretty-printer collaborator, writes them back to their
//! owning provider, and waits for the provider to echo the change as a
//! file event. When `commit` returns, downstream recomputation has
//! observed the edit.

use crate::base::Entity;
use crate::project::{ProviderKey, TransactionId};
use crate::semantic::resolver::display_path;
use crate::semantic::types::{CompilerAssertion, Outcome, Problem, WorkspaceEvent, kinds};
use crate::syntax::SourceFile;

use super::core::Workspace;

pub struct Transaction<'w> {
    workspace: &'w mut Workspace,
    transaction_id: TransactionId,
    dirty: Vec<Entity>,
    committed: bool,
}

impl<'w> Transaction<'w> {
    pub(super) fn new(workspace: &'w mut Workspace, transaction_id: TransactionId) -> Self {
        Self {
            workspace,
            transaction_id,
            dirty: Vec::new(),
            committed: false,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.transaction_id
    }

    /// Apply an in-place edit to the file addressed by `file`.
    ///
    /// Edits are visible to queries immediately; `commit` propagates
    /// them to the provider. Calling this after `commit` is fatal.
    pub fn modify(&mut self, file: &Entity, mutator: impl FnOnce(&mut SourceFile)) {
        if self.committed {
            CompilerAssertion::ClosedTransaction.raise()
        }
        let Some(source) = self.workspace.forest.file_mut(file) else {
            CompilerAssertion::UnindexedEntity(file.clone()).raise()
        };
        mutator(source);
        // Edits can reshape a file arbitrarily; let dependents recompute.
        self.workspace.revisions.record_global();
        if !self.dirty.contains(file) {
            self.dirty.push(file.clone());
        }
    }

    /// Render and write every dirty file back to its provider, then wait
    /// for the provider to echo the change.
    ///
    /// The commit path is exclusive: a second in-flight exclusive
    /// operation is refused.
    pub fn commit(&mut self) -> Outcome<TransactionId> {
        if self.committed {
            CompilerAssertion::ClosedTransaction.raise()
        }
        if self.workspace.exclusive_in_flight {
            CompilerAssertion::ExclusiveInFlight.raise()
        }
        self.workspace.exclusive_in_flight = true;
        self.committed = true;

        let mut problems = Vec::new();
        let mut wrote_any = false;
        let dirty = std::mem::take(&mut self.dirty);
        for file_entity in &dirty {
            match self.write_back(file_entity) {
                Ok(()) => wrote_any = true,
                Err(problem) => problems.push(problem),
            }
        }

        if wrote_any {
            self.workspace.wait_for_id(self.transaction_id);
        }
        self.workspace.exclusive_in_flight = false;
        self.workspace.publish_event(WorkspaceEvent::TransactionCommitted {
            transaction_id: self.transaction_id,
        });

        self.workspace.record_problems(&problems);
        Outcome::from_parts(Some(self.transaction_id), problems)
    }

    fn write_back(&mut self, file_entity: &Entity) -> Result<(), Problem> {
        let Some(library) = file_entity.library_name().map(str::to_string) else {
            return Err(Problem::error(kinds::INVALID_ENTITY, "Invalid file entity")
                .with_details(format!("`{file_entity}` does not address a file")));
        };
        let Some(source) = self.workspace.forest.file(file_entity) else {
            return Err(Problem::error(kinds::MISSING_DEFINITION, "Missing file")
                .with_details(format!("`{file_entity}` vanished before commit")));
        };
        let Some(renderer) = &self.workspace.renderer else {
            return Err(
                Problem::error(kinds::PROVIDER_FAILURE, "No renderer registered").with_details(
                    format!("cannot write `{file_entity}` back without a pretty-printer"),
                ),
            );
        };
        let text = renderer.render(source);

        let key = ProviderKey::source(display_path(file_entity));
        let provider = self
            .workspace
            .providers
            .iter_mut()
            .find(|provider| provider.library_name() == library)
            .ok_or_else(|| {
                Problem::error(kinds::PROVIDER_FAILURE, "Provider missing").with_details(format!(
                    "no provider is registered for library `{library}`"
                ))
            })?;
        provider
            .write_file(&key, &text, self.transaction_id)
            .map_err(|error| {
                Problem::error(kinds::PROVIDER_FAILURE, "Provider write failed")
                    .with_details(format!("{key:?} in `{library}`: {error}"))
            })
    }
}
