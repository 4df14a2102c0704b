//! Provider event processing.
//!
//! External events arrive batched per provider and are processed one at
//! a time: each reconstructs the AST for the affected files only (through
//! the parser collaborator) and records what changed in the revision
//! log; re-indexing and re-resolution happen lazily on next access.

use smol_str::SmolStr;

use crate::base::Entity;
use crate::core::events::EventBus;
use crate::project::{FileEvent, ProviderKey, TransactionId};
use crate::semantic::types::{Problem, WorkspaceEvent, kinds};

use super::core::Workspace;

impl EventBus<WorkspaceEvent> for Workspace {
    fn publish(&mut self, event: &WorkspaceEvent) {
        let emitter = std::mem::take(&mut self.events);
        self.events = emitter.emit(event.clone(), self);
    }
}

impl Workspace {
    pub(super) fn publish_event(&mut self, event: WorkspaceEvent) {
        self.publish(&event);
    }

    /// Drain and apply every pending provider event, oldest first.
    pub fn process_events(&mut self) {
        loop {
            let mut batch = Vec::new();
            for provider in &mut self.providers {
                batch.extend(provider.take_events());
            }
            if batch.is_empty() {
                return;
            }
            for event in batch {
                self.apply_file_event(event);
            }
        }
    }

    /// Block until the effects of the given transaction have fully
    /// propagated. A stuck provider stalls the wait; there is no
    /// timeout and no cancellation.
    pub fn wait_for_id(&mut self, transaction_id: TransactionId) {
        while !self.seen_transactions.contains(&transaction_id) {
            self.process_events();
        }
    }

    fn apply_file_event(&mut self, event: FileEvent) {
        tracing::debug!(
            transaction = event.transaction_id,
            library = %event.library.uuid,
            "applying file event"
        );

        let Some(library_name) = self
            .forest
            .libraries
            .values()
            .find(|library| library.manifest.uuid == event.library.uuid)
            .map(|library| library.name.clone())
        else {
            self.record_problems(&[Problem::warning(
                kinds::PROVIDER_FAILURE,
                "Event for unknown library",
            )
            .with_details(format!(
                "no registered library has uuid `{}`",
                event.library.uuid
            ))]);
            self.seen_transactions.insert(event.transaction_id);
            return;
        };

        for key in event.added.iter().chain(event.changed.iter()) {
            self.apply_upsert(&library_name, key);
        }
        for key in &event.deleted {
            self.apply_delete(&library_name, key);
        }

        self.seen_transactions.insert(event.transaction_id);
    }

    fn apply_upsert(&mut self, library: &SmolStr, key: &ProviderKey) {
        match key {
            ProviderKey::Source(path) => self.reload_source(library, path),
            ProviderKey::ProjectManifest => self.reload_manifest(library),
            // Assets and lock manifests carry no semantic content.
            ProviderKey::Asset(_) | ProviderKey::LockManifest => {}
        }
    }

    fn apply_delete(&mut self, library: &SmolStr, key: &ProviderKey) {
        if let ProviderKey::Source(path) = key {
            let (module_path, file_name) = split_source_path(path);
            let entity = Entity::file(library.clone(), module_path, file_name);
            if self.forest.remove_file(&entity) {
                // Removal shifts name visibility for every scope.
                self.revisions.record_global();
                self.publish_event(WorkspaceEvent::FileRemoved { file: entity });
            }
        }
    }

    fn reload_source(&mut self, library: &SmolStr, path: &str) {
        let text = match self.read_from_provider(library, &ProviderKey::source(path)) {
            Ok(text) => text,
            Err(problem) => {
                self.record_problems(&[problem]);
                return;
            }
        };

        let Some(parser) = &self.parser else {
            self.record_problems(&[Problem::error(
                kinds::PROVIDER_FAILURE,
                "No parser registered",
            )
            .with_details(format!("cannot reconstruct `{path}` without a parser"))]);
            return;
        };

        let (module_path, file_name) = split_source_path(path);
        let parsed = parser.parse(&file_name, &text);
        self.record_problems(parsed.problems());
        let Some(file) = parsed.into_value() else {
            return;
        };

        let entity = Entity::file(library.clone(), module_path.clone(), file_name.clone());
        let existed = self.forest.file(&entity).is_some();
        let old_names: Vec<SmolStr> = self
            .forest
            .file(&entity)
            .map(|old| old.definitions.keys().cloned().collect())
            .unwrap_or_default();
        let new_names: Vec<SmolStr> = file.definitions.keys().cloned().collect();

        self.forest
            .insert_file(library, &module_path, file_name.clone(), file);

        if old_names == new_names {
            // Same definition set: only the touched definitions (and the
            // file node) become stale.
            for name in &new_names {
                self.revisions.record(Entity::definition(
                    library.clone(),
                    module_path.iter().cloned(),
                    name.clone(),
                ));
            }
            self.revisions.record(entity.clone());
        } else {
            // Definitions appeared or vanished: name visibility may have
            // shifted anywhere.
            self.revisions.record_global();
        }

        let event = if existed {
            WorkspaceEvent::FileChanged { file: entity }
        } else {
            WorkspaceEvent::FileAdded { file: entity }
        };
        self.publish_event(event);
    }

    fn reload_manifest(&mut self, library: &SmolStr) {
        let text = match self.read_from_provider(library, &ProviderKey::ProjectManifest) {
            Ok(text) => text,
            Err(problem) => {
                self.record_problems(&[problem]);
                return;
            }
        };
        match crate::project::ProjectManifest::parse(&text) {
            Ok(manifest) => {
                let problems = manifest.validate();
                self.record_problems(&problems);
                if let Some(lib) = self.forest.libraries.get_mut(library) {
                    lib.manifest = manifest;
                }
                self.revisions.record_global();
            }
            Err(error) => {
                self.record_problems(&[Problem::error(
                    kinds::INVALID_MANIFEST,
                    "Invalid manifest",
                )
                .with_details(error.to_string())]);
            }
        }
    }

    fn read_from_provider(
        &mut self,
        library: &SmolStr,
        key: &ProviderKey,
    ) -> Result<String, Problem> {
        let provider = self
            .providers
            .iter()
            .find(|provider| provider.library_name() == library.as_str())
            .ok_or_else(|| {
                Problem::error(kinds::PROVIDER_FAILURE, "Provider missing").with_details(format!(
                    "no provider is registered for library `{library}`"
                ))
            })?;
        provider.read_file(key).map_err(|error| {
            Problem::error(kinds::PROVIDER_FAILURE, "Provider read failed")
                .with_details(format!("{key:?} in `{library}`: {error}"))
        })
    }
}

/// Split a library-relative source path into module path segments and a
/// file name.
pub(super) fn split_source_path(path: &str) -> (Vec<SmolStr>, SmolStr) {
    let mut segments: Vec<SmolStr> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(SmolStr::new)
        .collect();
    let file_name = segments.pop().unwrap_or_else(|| SmolStr::new(path));
    (segments, file_name)
}
