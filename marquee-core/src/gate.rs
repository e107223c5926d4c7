//! Persistence gate
//!
//! A single process-wide "storage unlocked" flag. Screens open it while they
//! are active; the [`StateSynchronizer`](crate::StateSynchronizer) only reads
//! from or writes to durable storage while it is open.
//!
//! The gate is not reference counted: with two screens active at once the
//! first `close()` locks out both.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::subscription::{Listeners, Subscription};

struct GateInner {
    unlocked: Cell<bool>,
    listeners: RefCell<Listeners<bool>>,
}

/// Shared handle to the storage-unlocked flag.
///
/// Clones share the same flag. A fresh gate starts closed.
#[derive(Clone)]
pub struct PersistenceGate {
    inner: Rc<GateInner>,
}

impl Default for PersistenceGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PersistenceGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceGate")
            .field("unlocked", &self.inner.unlocked.get())
            .finish()
    }
}

impl PersistenceGate {
    /// Create a closed gate
    pub fn new() -> Self {
        Self {
            inner: Rc::new(GateInner {
                unlocked: Cell::new(false),
                listeners: RefCell::new(Listeners::new()),
            }),
        }
    }

    /// Whether storage access is currently allowed
    pub fn is_open(&self) -> bool {
        self.inner.unlocked.get()
    }

    /// Unlock storage. No-op if already open.
    pub fn open(&self) {
        self.set(true);
    }

    /// Lock storage. No-op if already closed.
    pub fn close(&self) {
        self.set(false);
    }

    /// Open the gate for the lifetime of the returned guard.
    ///
    /// The guard closes the gate when dropped, including during unwinding.
    pub fn acquire(&self) -> GateGuard {
        self.open();
        GateGuard {
            gate: Rc::downgrade(&self.inner),
        }
    }

    /// Register a callback invoked with the new value on every transition.
    pub fn on_transition(&self, callback: impl FnMut(&bool) + 'static) -> Subscription {
        let id = self.inner.listeners.borrow_mut().insert(Box::new(callback));
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().remove(id);
            }
        })
    }

    fn set(&self, unlocked: bool) {
        set_inner(&self.inner, unlocked);
    }
}

fn set_inner(inner: &GateInner, unlocked: bool) {
    if inner.unlocked.replace(unlocked) == unlocked {
        return;
    }
    tracing::debug!(unlocked, "Persistence gate transition");

    let listeners = inner.listeners.borrow().snapshot();
    for (id, listener) in listeners {
        if !inner.listeners.borrow().contains(id) {
            continue;
        }
        let mut callback = listener.borrow_mut();
        (*callback)(&unlocked);
    }
}

/// Keeps the gate open until dropped.
#[must_use = "dropping a GateGuard immediately closes the gate"]
pub struct GateGuard {
    gate: Weak<GateInner>,
}

impl fmt::Debug for GateGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateGuard").finish_non_exhaustive()
    }
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.gate.upgrade() {
            set_inner(&inner, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        let gate = PersistenceGate::new();
        assert!(!gate.is_open());
    }

    #[test]
    fn test_open_close() {
        let gate = PersistenceGate::new();
        gate.open();
        assert!(gate.is_open());
        gate.close();
        assert!(!gate.is_open());
    }

    #[test]
    fn test_clones_share_flag() {
        let gate = PersistenceGate::new();
        let other = gate.clone();
        gate.open();
        assert!(other.is_open());
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let gate = PersistenceGate::new();
        {
            let _guard = gate.acquire();
            assert!(gate.is_open());
        }
        assert!(!gate.is_open());
    }

    #[test]
    fn test_guard_closes_on_unwind() {
        let gate = PersistenceGate::new();
        let handle = gate.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = handle.acquire();
            panic!("screen failed");
        }));
        assert!(result.is_err());
        assert!(!gate.is_open());
    }

    #[test]
    fn test_listeners_fire_on_transitions_only() {
        let gate = PersistenceGate::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = gate.on_transition(move |open| sink.borrow_mut().push(*open));

        gate.open();
        gate.open();
        gate.close();
        gate.close();
        gate.open();

        assert_eq!(*seen.borrow(), vec![true, false, true]);
    }

    #[test]
    fn test_second_close_locks_out_other_screen() {
        let gate = PersistenceGate::new();
        let first = gate.acquire();
        let second = gate.acquire();
        drop(first);
        assert!(!gate.is_open());
        drop(second);
        assert!(!gate.is_open());
    }
}
