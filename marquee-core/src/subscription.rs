//! Scoped subscription guards

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Guard returned by [`KeyedStateStore::subscribe`](crate::KeyedStateStore::subscribe)
/// and [`PersistenceGate::on_transition`](crate::PersistenceGate::on_transition).
///
/// Dropping the guard removes the callback, so a screen that goes away cannot
/// leave a dangling listener behind. Call [`detach`](Self::detach) to keep the
/// callback registered for the lifetime of its source instead.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Remove the callback now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the callback registered until its source is dropped.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

pub(crate) type Listener<T> = Rc<RefCell<Box<dyn FnMut(&T)>>>;

/// Ordered list of callbacks keyed by a registration id.
///
/// Shared by the store and the gate. Callbacks are `Rc`-wrapped so a
/// notification round can run over a snapshot of the list while callbacks
/// subscribe or unsubscribe.
pub(crate) struct Listeners<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

impl<T: ?Sized> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, callback: Box<dyn FnMut(&T)>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Rc::new(RefCell::new(callback))));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    pub(crate) fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    pub(crate) fn snapshot(&self) -> Vec<(u64, Listener<T>)> {
        self.entries.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
