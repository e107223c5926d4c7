//! Test utilities for marquee applications
//!
//! - [`StateRecorder`]: subscribes to a store and keeps every state it sees
//! - [`MemoryStorage`](crate::MemoryStorage) (in `storage`): counts writes and
//!   injects failures
//!
//! # Example
//!
//! ```ignore
//! use marquee::testing::StateRecorder;
//!
//! let store = KeyedStateStore::new(AppState::default());
//! let recorder = StateRecorder::attach(&store);
//!
//! dispatcher.dispatch(Action::SetFilter(Filter::Popular));
//!
//! assert_eq!(recorder.len(), 1);
//! assert_eq!(recorder.last().unwrap().browse.filter(), Some(Filter::Popular));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::store::{KeyedStateStore, SliceState};
use crate::subscription::Subscription;

/// Records every state a store notifies its subscribers with.
pub struct StateRecorder<S: SliceState> {
    seen: Rc<RefCell<Vec<S>>>,
    _sub: Subscription,
}

impl<S: SliceState> StateRecorder<S> {
    /// Subscribe to `store`
    pub fn attach(store: &KeyedStateStore<S>) -> Self {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |state: &S| sink.borrow_mut().push(state.clone()));
        Self { seen, _sub: sub }
    }

    /// All recorded states, oldest first
    pub fn snapshots(&self) -> Vec<S> {
        self.seen.borrow().clone()
    }

    /// Most recent recorded state
    pub fn last(&self) -> Option<S> {
        self.seen.borrow().last().cloned()
    }

    /// Number of notifications received
    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    /// Whether no notification was received
    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.seen.borrow_mut().clear();
    }
}

/// Two-slice state with hand-written trait impls, used by this crate's tests.
#[cfg(test)]
pub(crate) use fixture::{CounterPatch, CounterState, LabelPatch};
