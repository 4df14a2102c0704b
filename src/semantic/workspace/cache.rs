//! Dependency-tracked memoization.
//!
//! Each cached computation records the entity keys it read; a revision
//! log records which entities changed at which revision. A stale entry
//! whose dependency set does not intersect the changes since it was last
//! verified is re-stamped without recomputation; otherwise it is
//! recomputed lazily on next read. Nothing is recomputed eagerly on
//! mutation.

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::Entity;

/// A monotonically increasing revision counter plus a log of which
/// entities changed at which revision.
#[derive(Debug, Default)]
pub struct RevisionLog {
    current: u64,
    /// `None` is a wildcard: a structural change (file added/removed)
    /// that may shift name visibility anywhere.
    changes: Vec<(u64, Option<Entity>)>,
}

impl RevisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    /// Record that one entity's content changed.
    pub fn record(&mut self, entity: Entity) {
        self.current += 1;
        self.changes.push((self.current, Some(entity)));
    }

    /// Record a structural change that invalidates everything.
    pub fn record_global(&mut self) {
        self.current += 1;
        self.changes.push((self.current, None));
    }

    /// Whether a computation verified at `revision`, depending on
    /// `deps` and on `key` itself, needs recomputation.
    pub fn is_dirty(&self, revision: u64, key: &Entity, deps: &FxHashSet<Entity>) -> bool {
        self.changes
            .iter()
            .rev()
            .take_while(|(change_revision, _)| *change_revision > revision)
            .any(|(_, changed)| match changed {
                None => true,
                Some(entity) => entity == key || deps.contains(entity),
            })
    }
}

struct MemoEntry<V> {
    value: V,
    deps: FxHashSet<Entity>,
    verified_at: u64,
}

/// A per-entity memoization cache with dependency recording.
///
/// Reads performed while a computation is active register as that
/// computation's dependencies through a frame stack, nested computations
/// propagating their dependencies outward.
pub struct MemoCache<V> {
    entries: Mutex<FxHashMap<Entity, MemoEntry<V>>>,
    frames: Mutex<Vec<FxHashSet<Entity>>>,
}

impl<V> Default for MemoCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemoCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            frames: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Register `key` as a dependency of the active computation, if any.
    pub fn record_dependency(&self, key: &Entity) {
        if let Some(frame) = self.frames.lock().last_mut() {
            frame.insert(key.clone());
        }
    }
}

impl<V: Clone> MemoCache<V> {
    /// Coarse variant: the entry is valid only while no mutation at all
    /// has been committed since it was computed. Used for opt-in caches
    /// whose computations do not record dependencies.
    pub fn get_or_compute_coarse(
        &self,
        revisions: &RevisionLog,
        key: &Entity,
        compute: impl FnOnce() -> V,
    ) -> V {
        let current = revisions.current();
        {
            let entries = self.entries.lock();
            if let Some(entry) = entries.get(key) {
                if entry.verified_at == current {
                    return entry.value.clone();
                }
            }
        }
        let value = compute();
        self.entries.lock().insert(
            key.clone(),
            MemoEntry {
                value: value.clone(),
                deps: FxHashSet::default(),
                verified_at: current,
            },
        );
        value
    }

    /// Return the cached value for `key`, revalidating or recomputing
    /// as the revision log dictates.
    pub fn get_or_compute(
        &self,
        revisions: &RevisionLog,
        key: &Entity,
        compute: impl FnOnce() -> V,
    ) -> V {
        self.record_dependency(key);
        let current = revisions.current();

        {
            let mut entries = self.entries.lock();
            if let Some(entry) = entries.get_mut(key) {
                if entry.verified_at == current {
                    return entry.value.clone();
                }
                if !revisions.is_dirty(entry.verified_at, key, &entry.deps) {
                    entry.verified_at = current;
                    return entry.value.clone();
                }
                tracing::trace!(key = %key, "memo entry invalidated");
                entries.remove(key);
            }
        }

        // Compute under a fresh dependency frame; locks are released so
        // the computation can recurse into this cache.
        self.frames.lock().push(FxHashSet::default());
        let value = compute();
        let deps = self.frames.lock().pop().unwrap_or_default();

        // Nested dependencies belong to the enclosing computation too.
        if let Some(outer) = self.frames.lock().last_mut() {
            outer.extend(deps.iter().cloned());
        }

        self.entries.lock().insert(
            key.clone(),
            MemoEntry {
                value: value.clone(),
                deps,
                verified_at: current,
            },
        );
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn entity(name: &str) -> Entity {
        Entity::definition("Lib", Vec::new(), name)
    }

    #[test]
    fn test_memoizes_within_revision() {
        let cache: MemoCache<u32> = MemoCache::new();
        let revisions = RevisionLog::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            7
        };
        assert_eq!(cache.get_or_compute(&revisions, &entity("A"), compute), 7);
        assert_eq!(cache.get_or_compute(&revisions, &entity("A"), compute), 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_unrelated_change_revalidates_without_recompute() {
        let cache: MemoCache<u32> = MemoCache::new();
        let mut revisions = RevisionLog::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            7
        };
        let _ = cache.get_or_compute(&revisions, &entity("A"), compute);
        revisions.record(entity("Unrelated"));
        let _ = cache.get_or_compute(&revisions, &entity("A"), compute);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_own_change_recomputes() {
        let cache: MemoCache<u32> = MemoCache::new();
        let mut revisions = RevisionLog::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            7
        };
        let _ = cache.get_or_compute(&revisions, &entity("A"), compute);
        revisions.record(entity("A"));
        let _ = cache.get_or_compute(&revisions, &entity("A"), compute);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_dependency_change_invalidates_dependent() {
        let cache: MemoCache<u32> = MemoCache::new();
        let mut revisions = RevisionLog::new();
        let outer_calls = Cell::new(0);

        // `Outer` reads `Inner` through the cache, establishing a
        // dependency edge.
        let run = |revisions: &RevisionLog| {
            cache.get_or_compute(revisions, &entity("Outer"), || {
                outer_calls.set(outer_calls.get() + 1);
                cache.get_or_compute(revisions, &entity("Inner"), || 1)
            })
        };
        assert_eq!(run(&revisions), 1);
        assert_eq!(run(&revisions), 1);
        assert_eq!(outer_calls.get(), 1);

        revisions.record(entity("Inner"));
        let _ = run(&revisions);
        assert_eq!(outer_calls.get(), 2);
    }

    #[test]
    fn test_global_change_invalidates_everything() {
        let cache: MemoCache<u32> = MemoCache::new();
        let mut revisions = RevisionLog::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            7
        };
        let _ = cache.get_or_compute(&revisions, &entity("A"), compute);
        revisions.record_global();
        let _ = cache.get_or_compute(&revisions, &entity("A"), compute);
        assert_eq!(calls.get(), 2);
    }
}
