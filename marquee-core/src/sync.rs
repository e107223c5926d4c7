//! Binds a [`KeyedStateStore`] to durable storage through a [`PersistenceGate`]
//!
//! - Gate opens: the persisted snapshot is loaded once and merged into the
//!   store, skipping slices that already moved away from their initial value.
//! - Store updates while the gate is open: the full state is written back.
//! - Gate closed: updates stay in memory only.
//!
//! Storage failures never reach the caller. A missing, unreadable or
//! malformed snapshot counts as "nothing persisted"; failed writes are logged
//! and dropped.

use std::cell::Cell;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::gate::PersistenceGate;
use crate::storage::{Storage, StorageError};
use crate::store::{KeyedStateStore, SliceState};
use crate::subscription::Subscription;

struct SyncShared<S: SliceState> {
    store: KeyedStateStore<S>,
    gate: PersistenceGate,
    storage: Box<dyn Storage>,
    key: String,
    baseline: S,
    loads: Cell<usize>,
    writes: Cell<usize>,
}

/// Keeps a store and its persisted snapshot in step.
///
/// Dropping the synchronizer detaches it from both the store and the gate.
///
/// # Example
/// ```ignore
/// let store = KeyedStateStore::new(AppState::default());
/// let gate = PersistenceGate::new();
/// let _sync = StateSynchronizer::attach(store.clone(), gate.clone(), storage, "app");
///
/// let _unlocked = gate.acquire(); // loads the snapshot
/// dispatcher.dispatch(Action::SetFilter(Filter::Popular)); // persisted
/// ```
pub struct StateSynchronizer<S: SliceState> {
    shared: Rc<SyncShared<S>>,
    _gate_sub: Subscription,
    _store_sub: Subscription,
}

impl<S> StateSynchronizer<S>
where
    S: SliceState + Serialize,
    S::Patch: DeserializeOwned,
{
    /// Attach to `store` and `gate`, persisting under `key`.
    ///
    /// The store's value at attach time is the baseline used to decide which
    /// slices a loaded snapshot may overwrite. If the gate is already open the
    /// snapshot is loaded immediately.
    pub fn attach(
        store: KeyedStateStore<S>,
        gate: PersistenceGate,
        storage: impl Storage + 'static,
        key: impl Into<String>,
    ) -> Self {
        let shared = Rc::new(SyncShared {
            baseline: store.read(),
            store: store.clone(),
            gate: gate.clone(),
            storage: Box::new(storage),
            key: key.into(),
            loads: Cell::new(0),
            writes: Cell::new(0),
        });

        let on_gate = Rc::clone(&shared);
        let gate_sub = gate.on_transition(move |open| {
            if *open {
                on_gate.load();
            }
        });

        let on_update = Rc::clone(&shared);
        let store_sub = store.subscribe(move |state: &S| on_update.persist(state));

        if gate.is_open() {
            shared.load();
        }

        Self {
            shared,
            _gate_sub: gate_sub,
            _store_sub: store_sub,
        }
    }

    /// Number of snapshots read from storage
    pub fn loads(&self) -> usize {
        self.shared.loads.get()
    }

    /// Number of snapshots written to storage
    pub fn writes(&self) -> usize {
        self.shared.writes.get()
    }

    /// Storage key used for the snapshot
    pub fn key(&self) -> &str {
        &self.shared.key
    }
}

impl<S> SyncShared<S>
where
    S: SliceState + Serialize,
    S::Patch: DeserializeOwned,
{
    fn load(&self) {
        self.loads.set(self.loads.get() + 1);

        let patch = match self.read_snapshot() {
            Ok(Some(patch)) => patch,
            Ok(None) => {
                tracing::debug!(key = %self.key, "No persisted snapshot");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring persisted snapshot");
                return;
            }
        };

        let patch = self
            .store
            .with_state(|current| current.retain_pristine(&self.baseline, patch));
        let touched = S::touched(&patch);
        if touched.is_empty() {
            tracing::debug!(key = %self.key, "Persisted snapshot superseded by live state");
            return;
        }

        tracing::debug!(key = %self.key, ?touched, "Restoring persisted snapshot");
        self.store.update(patch);
    }

    fn read_snapshot(&self) -> Result<Option<S::Patch>, StorageError> {
        let Some(raw) = self.storage.load(&self.key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Serialize {
                key: self.key.clone(),
                source,
            })
    }

    fn persist(&self, state: &S) {
        if !self.gate.is_open() {
            tracing::trace!(key = %self.key, "Gate closed, skipping persist");
            return;
        }

        let result = serde_json::to_string(state)
            .map_err(|source| StorageError::Serialize {
                key: self.key.clone(),
                source,
            })
            .and_then(|snapshot| self.storage.save(&self.key, &snapshot));

        match result {
            Ok(()) => {
                self.writes.set(self.writes.get() + 1);
                tracing::debug!(key = %self.key, "Persisted snapshot");
            }
            Err(e) => tracing::warn!(error = %e, "Failed to persist snapshot"),
        }
    }
}
