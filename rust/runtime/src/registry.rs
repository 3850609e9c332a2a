// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of loaded models.
//!
//! Tracks loaded-model records in insertion order together with an
//! active selection. Mutators are suppressed while the coordinator's
//! reset guard is raised so event handlers firing mid-reset can never
//! observe or produce partially-cleared state; `reset` itself is the
//! privileged exception invoked by the reset sequence.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::guard::ResetGuard;
use crate::resource::ModelTree;

/// Outcome of a registry mutation.
///
/// Distinguishes "dropped because a reset is in flight" from "the id is
/// unknown" so callers that care can tell them apart; neither is an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryOutcome {
    /// The mutation was applied.
    Applied,
    /// Dropped: the reset guard is raised.
    SuppressedByReset,
    /// Dropped: no record with the given id.
    UnknownModel,
    /// Dropped: a record with the given id already exists.
    DuplicateModel,
}

struct ModelRecord {
    id: String,
    name: String,
    tree: Option<Arc<dyn ModelTree>>,
}

/// Serializable view of one tracked model, for UI consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub has_tree: bool,
    pub active: bool,
}

#[derive(Default)]
struct Inner {
    records: Vec<ModelRecord>,
    active: Option<String>,
}

/// Ordered collection of loaded-model records with an active selection.
///
/// Cheap to clone; clones share state, so the coordinator can hand a
/// handle to model-event subscribers while retaining its own.
#[derive(Clone)]
pub struct ModelRegistry {
    inner: Arc<Mutex<Inner>>,
    guard: ResetGuard,
    diagnostics: Diagnostics,
}

impl ModelRegistry {
    pub(crate) fn new(guard: ResetGuard, diagnostics: Diagnostics) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            guard,
            diagnostics,
        }
    }

    /// Track a newly loaded model. The first tracked model becomes the
    /// active one. Duplicate ids are dropped.
    pub fn add(&self, id: impl Into<String>, name: impl Into<String>) -> RegistryOutcome {
        let id = id.into();
        if self.guard.is_raised() {
            tracing::debug!(model_id = %id, "skipping model addition during reset");
            return RegistryOutcome::SuppressedByReset;
        }

        let mut inner = self.inner.lock().expect("model registry lock poisoned");
        if inner.records.iter().any(|record| record.id == id) {
            tracing::warn!(model_id = %id, "model already tracked");
            return RegistryOutcome::DuplicateModel;
        }

        let name = name.into();
        tracing::debug!(model_id = %id, model_name = %name, "model added");
        inner.records.push(ModelRecord {
            id: id.clone(),
            name,
            tree: None,
        });
        if inner.active.is_none() {
            inner.active = Some(id);
        }
        RegistryOutcome::Applied
    }

    /// Attach a derived UI tree to a tracked model. If no record is
    /// active yet, the model becomes active.
    pub fn attach_tree(&self, id: &str, tree: Arc<dyn ModelTree>) -> RegistryOutcome {
        if self.guard.is_raised() {
            tracing::debug!(model_id = %id, "skipping tree attachment during reset");
            return RegistryOutcome::SuppressedByReset;
        }

        let mut inner = self.inner.lock().expect("model registry lock poisoned");
        let Some(record) = inner.records.iter_mut().find(|record| record.id == id) else {
            drop(inner);
            self.diagnostics
                .emit(Diagnostic::RecordNotFound { id: id.to_string() });
            return RegistryOutcome::UnknownModel;
        };
        record.tree = Some(tree);
        if inner.active.is_none() {
            inner.active = Some(id.to_string());
        }
        RegistryOutcome::Applied
    }

    /// Stop tracking a model, detaching its tree best-effort first.
    /// Removing the active model promotes the first survivor.
    pub fn remove(&self, id: &str) -> RegistryOutcome {
        if self.guard.is_raised() {
            tracing::debug!(model_id = %id, "skipping model removal during reset");
            return RegistryOutcome::SuppressedByReset;
        }

        let mut inner = self.inner.lock().expect("model registry lock poisoned");
        let Some(index) = inner.records.iter().position(|record| record.id == id) else {
            drop(inner);
            self.diagnostics
                .emit(Diagnostic::RecordNotFound { id: id.to_string() });
            return RegistryOutcome::UnknownModel;
        };

        let record = inner.records.remove(index);
        if inner.active.as_deref() == Some(id) {
            inner.active = inner.records.first().map(|record| record.id.clone());
        }
        // Detach outside the lock: the tree is external code and may
        // call back into the registry.
        drop(inner);
        if let Some(tree) = record.tree {
            // Tree cleanup is advisory, never critical-path.
            if let Err(err) = tree.detach() {
                tracing::debug!(model_id = %id, error = %err, "tree detach failed, ignoring");
            }
        }
        RegistryOutcome::Applied
    }

    /// Change the active selection to a tracked model.
    pub fn set_active(&self, id: &str) -> RegistryOutcome {
        if self.guard.is_raised() {
            tracing::debug!(model_id = %id, "skipping active change during reset");
            return RegistryOutcome::SuppressedByReset;
        }

        let mut inner = self.inner.lock().expect("model registry lock poisoned");
        if !inner.records.iter().any(|record| record.id == id) {
            drop(inner);
            self.diagnostics
                .emit(Diagnostic::RecordNotFound { id: id.to_string() });
            return RegistryOutcome::UnknownModel;
        }
        inner.active = Some(id.to_string());
        RegistryOutcome::Applied
    }

    /// Clear all records and the active selection.
    ///
    /// Privileged: called by the reset sequence itself, so it applies
    /// even while the guard is raised.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("model registry lock poisoned");
        inner.records.clear();
        inner.active = None;
    }

    /// Tree handle of a tracked model, `None` while a reset is in
    /// flight or when the record/tree is absent.
    pub fn tree(&self, id: &str) -> Option<Arc<dyn ModelTree>> {
        if self.guard.is_raised() {
            return None;
        }
        let inner = self.inner.lock().expect("model registry lock poisoned");
        inner
            .records
            .iter()
            .find(|record| record.id == id)
            .and_then(|record| record.tree.clone())
    }

    /// Id of the active model, if any.
    pub fn active_id(&self) -> Option<String> {
        self.inner
            .lock()
            .expect("model registry lock poisoned")
            .active
            .clone()
    }

    /// Tracked model ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("model registry lock poisoned")
            .records
            .iter()
            .map(|record| record.id.clone())
            .collect()
    }

    /// Serializable snapshot of all tracked models in insertion order.
    pub fn snapshot(&self) -> Vec<ModelInfo> {
        let inner = self.inner.lock().expect("model registry lock poisoned");
        inner
            .records
            .iter()
            .map(|record| ModelInfo {
                id: record.id.clone(),
                name: record.name.clone(),
                has_tree: record.tree.is_some(),
                active: inner.active.as_deref() == Some(record.id.as_str()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("model registry lock poisoned")
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn registry() -> ModelRegistry {
        ModelRegistry::new(ResetGuard::new(), Diagnostics::new())
    }

    struct NoopTree;
    impl ModelTree for NoopTree {
        fn detach(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Ok(())
        }
    }

    struct FailingTree {
        detached: AtomicBool,
    }
    impl ModelTree for FailingTree {
        fn detach(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.detached.store(true, Ordering::SeqCst);
            Err("no parent node".into())
        }
    }

    #[test]
    fn survivors_keep_insertion_order() {
        let registry = registry();
        for id in ["m1", "m2", "m3", "m4"] {
            assert_eq!(registry.add(id, id), RegistryOutcome::Applied);
        }
        registry.remove("m2");
        registry.remove("m4");
        assert_eq!(registry.ids(), vec!["m1", "m3"]);
    }

    #[test]
    fn first_model_becomes_active() {
        let registry = registry();
        registry.add("m1", "Wall");
        registry.add("m2", "Door");
        assert_eq!(registry.active_id().as_deref(), Some("m1"));
    }

    #[test]
    fn removing_active_promotes_first_survivor() {
        let registry = registry();
        registry.add("m1", "Wall");
        registry.add("m2", "Door");
        registry.add("m3", "Slab");
        assert_eq!(registry.remove("m1"), RegistryOutcome::Applied);
        assert_eq!(registry.active_id().as_deref(), Some("m2"));

        registry.remove("m2");
        registry.remove("m3");
        assert_eq!(registry.active_id(), None);
    }

    #[test]
    fn removing_inactive_keeps_selection() {
        let registry = registry();
        registry.add("m1", "Wall");
        registry.add("m2", "Door");
        registry.set_active("m2");
        registry.remove("m1");
        assert_eq!(registry.active_id().as_deref(), Some("m2"));
    }

    #[test]
    fn duplicate_add_is_dropped() {
        let registry = registry();
        registry.add("m1", "Wall");
        assert_eq!(registry.add("m1", "Wall again"), RegistryOutcome::DuplicateModel);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot()[0].name, "Wall");
    }

    #[test]
    fn guard_suppresses_all_mutators() {
        let guard = ResetGuard::new();
        let registry = ModelRegistry::new(guard.clone(), Diagnostics::new());
        registry.add("m1", "Wall");

        let token = guard.raise().unwrap();
        assert_eq!(registry.add("m2", "Door"), RegistryOutcome::SuppressedByReset);
        assert_eq!(registry.remove("m1"), RegistryOutcome::SuppressedByReset);
        assert_eq!(
            registry.attach_tree("m1", Arc::new(NoopTree)),
            RegistryOutcome::SuppressedByReset
        );
        assert_eq!(registry.set_active("m1"), RegistryOutcome::SuppressedByReset);
        assert!(registry.tree("m1").is_none());

        assert_eq!(registry.ids(), vec!["m1"]);
        assert_eq!(registry.active_id().as_deref(), Some("m1"));
        drop(token);
    }

    #[test]
    fn reset_applies_even_while_guarded() {
        let guard = ResetGuard::new();
        let registry = ModelRegistry::new(guard.clone(), Diagnostics::new());
        registry.add("m1", "Wall");

        let _token = guard.raise().unwrap();
        registry.reset();
        assert!(registry.is_empty());
        assert_eq!(registry.active_id(), None);
    }

    #[test]
    fn attach_tree_to_unknown_model_reports_not_found() {
        let diagnostics = Diagnostics::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let seen = Arc::clone(&seen);
            diagnostics.subscribe(move |event| seen.lock().unwrap().push(event.clone()))
        };
        let registry = ModelRegistry::new(ResetGuard::new(), diagnostics);
        registry.add("m1", "Wall");

        assert_eq!(
            registry.attach_tree("missing-id", Arc::new(NoopTree)),
            RegistryOutcome::UnknownModel
        );
        assert_eq!(registry.ids(), vec!["m1"]);
        assert!(registry.tree("m1").is_none());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Diagnostic::RecordNotFound {
                id: "missing-id".into()
            }]
        );
    }

    #[test]
    fn attach_tree_keeps_current_selection() {
        let registry = registry();
        registry.add("m1", "Wall");
        registry.add("m2", "Door");
        registry.attach_tree("m2", Arc::new(NoopTree));
        assert_eq!(registry.active_id().as_deref(), Some("m1"));
    }

    #[test]
    fn failing_tree_detach_does_not_abort_removal() {
        let registry = registry();
        registry.add("m1", "Wall");
        let tree = Arc::new(FailingTree {
            detached: AtomicBool::new(false),
        });
        registry.attach_tree("m1", tree.clone());

        assert_eq!(registry.remove("m1"), RegistryOutcome::Applied);
        assert!(registry.is_empty());
        assert!(tree.detached.load(Ordering::SeqCst));
    }

    struct RegistryReadingTree {
        registry: ModelRegistry,
        survivors_seen: Mutex<Option<usize>>,
    }
    impl ModelTree for RegistryReadingTree {
        fn detach(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            *self.survivors_seen.lock().unwrap() = Some(self.registry.len());
            Ok(())
        }
    }

    #[test]
    fn detach_may_reenter_the_registry() {
        let registry = registry();
        registry.add("m1", "Wall");
        registry.add("m2", "Door");
        let tree = Arc::new(RegistryReadingTree {
            registry: registry.clone(),
            survivors_seen: Mutex::new(None),
        });
        registry.attach_tree("m1", tree.clone());

        // Detach runs after the mutation is committed and the lock is
        // released, so it observes the post-removal state.
        assert_eq!(registry.remove("m1"), RegistryOutcome::Applied);
        assert_eq!(*tree.survivors_seen.lock().unwrap(), Some(1));
        assert_eq!(registry.active_id().as_deref(), Some("m2"));
    }

    #[test]
    fn tree_roundtrip() {
        let registry = registry();
        registry.add("m1", "Wall");
        assert!(registry.tree("m1").is_none());
        registry.attach_tree("m1", Arc::new(NoopTree));
        assert!(registry.tree("m1").is_some());
        assert!(registry.tree("m2").is_none());
    }
}
