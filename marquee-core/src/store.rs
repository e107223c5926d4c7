//! Keyed shared-state container with partial-merge updates

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt::{self, Debug};
use std::rc::{Rc, Weak};

use crate::subscription::{Listeners, Subscription};
use crate::Action;

/// A named slice of shared state that accepts shallow partial updates.
///
/// `Patch` carries one `Option` per field; `None` leaves the field alone.
/// Use `#[derive(Slice)]` to generate the patch type and merge code.
pub trait Slice {
    /// Partial update for this slice
    type Patch: Clone + Debug + Default;

    /// Apply every field present in `patch`.
    ///
    /// Returns `true` if the patch carried at least one field.
    fn merge(&mut self, patch: Self::Patch) -> bool;
}

/// Root state made of named slices.
///
/// Use `#[derive(SliceState)]` on a struct whose fields all implement
/// [`Slice`]. The generated patch holds an `Option<FieldPatch>` per slice.
pub trait SliceState: Clone + 'static {
    /// Partial update touching any subset of slices
    type Patch: Clone + Debug + Default;

    /// Names of all slices, in declaration order
    fn slice_names() -> &'static [&'static str];

    /// Names of the slices `patch` would touch
    fn touched(patch: &Self::Patch) -> Vec<&'static str>;

    /// Merge `patch` slice by slice, leaving untouched slices as they were.
    ///
    /// Returns the names of the slices that were touched.
    fn merge(&mut self, patch: Self::Patch) -> Vec<&'static str>;

    /// Drop every slice from `patch` whose current value already differs
    /// from `baseline`.
    fn retain_pristine(&self, baseline: &Self, patch: Self::Patch) -> Self::Patch;
}

struct StoreInner<S: SliceState> {
    state: RefCell<S>,
    revision: Cell<u64>,
    subscribers: RefCell<Listeners<S>>,
    pending: RefCell<VecDeque<S::Patch>>,
    notifying: Cell<bool>,
}

/// Shared, observable state container.
///
/// Cloning the store clones the handle, not the state: every clone reads and
/// updates the same value. The store is single-threaded; updates are applied
/// in the order [`update`](Self::update) is called.
///
/// # Example
/// ```ignore
/// let store = KeyedStateStore::new(AppState::default());
/// let _sub = store.subscribe(|state: &AppState| println!("{:?}", state.browse));
/// store.update(AppStatePatch {
///     browse: Some(BrowsePatch { home_filter: Some("POPULAR".into()) }),
///     ..Default::default()
/// });
/// ```
pub struct KeyedStateStore<S: SliceState> {
    inner: Rc<StoreInner<S>>,
}

impl<S: SliceState> Clone for KeyedStateStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: SliceState + Debug> Debug for KeyedStateStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedStateStore")
            .field("state", &*self.inner.state.borrow())
            .field("revision", &self.inner.revision.get())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

/// Resets the notification flag even if a subscriber panics.
struct NotifyingGuard<'a>(&'a Cell<bool>);

impl Drop for NotifyingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<S: SliceState> KeyedStateStore<S> {
    /// Create a store holding `initial`
    pub fn new(initial: S) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(initial),
                revision: Cell::new(0),
                subscribers: RefCell::new(Listeners::new()),
                pending: RefCell::new(VecDeque::new()),
                notifying: Cell::new(false),
            }),
        }
    }

    /// Get a copy of the full current state
    pub fn read(&self) -> S {
        self.inner.state.borrow().clone()
    }

    /// Run `f` against the current state without cloning it
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Number of updates applied so far
    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Merge `patch` into the state and notify every subscriber.
    ///
    /// Subscribers are called synchronously, in subscription order, with the
    /// full new state. An update issued from inside a subscriber is queued and
    /// applied once the current notification round has finished, so every
    /// subscriber observes the same ordered sequence of states.
    pub fn update(&self, patch: S::Patch) {
        self.inner.pending.borrow_mut().push_back(patch);
        if self.inner.notifying.get() {
            return;
        }

        self.inner.notifying.set(true);
        let _guard = NotifyingGuard(&self.inner.notifying);

        loop {
            let Some(patch) = self.inner.pending.borrow_mut().pop_front() else {
                break;
            };

            let touched = self.inner.state.borrow_mut().merge(patch);
            let revision = self.inner.revision.get() + 1;
            self.inner.revision.set(revision);
            tracing::debug!(?touched, revision, "State updated");

            let listeners = self.inner.subscribers.borrow().snapshot();
            let state = self.inner.state.borrow();
            for (id, listener) in listeners {
                // Skip callbacks removed earlier in this round
                if !self.inner.subscribers.borrow().contains(id) {
                    continue;
                }
                let mut callback = listener.borrow_mut();
                (*callback)(&*state);
            }
        }
    }

    /// Register a callback invoked after every update.
    ///
    /// The callback stays registered until the returned [`Subscription`]
    /// is dropped.
    pub fn subscribe(&self, callback: impl FnMut(&S) + 'static) -> Subscription {
        let id = self.inner.subscribers.borrow_mut().insert(Box::new(callback));
        let weak: Weak<StoreInner<S>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.subscribers.borrow_mut().remove(id);
            }
        })
    }
}

/// A reducer maps the current state and an action to a partial update.
///
/// Returns `None` when the action leaves the state untouched.
pub type Reducer<S, A> = fn(&S, A) -> Option<<S as SliceState>::Patch>;

/// Routes actions through a reducer into a [`KeyedStateStore`].
///
/// The reducer stays pure; the dispatcher is the only place that turns its
/// result into a store update. Middleware sees every action before and after.
///
/// # Example
/// ```ignore
/// let dispatcher = Dispatcher::new(store.clone(), reducer);
/// dispatcher.dispatch(Action::SetFilter(Filter::Popular));
/// ```
pub struct Dispatcher<S: SliceState, A: Action, M: Middleware<A> = NoopMiddleware> {
    store: KeyedStateStore<S>,
    reducer: Reducer<S, A>,
    middleware: RefCell<M>,
}

impl<S: SliceState, A: Action> Dispatcher<S, A, NoopMiddleware> {
    /// Create a dispatcher without middleware
    pub fn new(store: KeyedStateStore<S>, reducer: Reducer<S, A>) -> Self {
        Self::with_middleware(store, reducer, NoopMiddleware)
    }
}

impl<S: SliceState, A: Action, M: Middleware<A>> Dispatcher<S, A, M> {
    /// Create a dispatcher with middleware
    pub fn with_middleware(
        store: KeyedStateStore<S>,
        reducer: Reducer<S, A>,
        middleware: M,
    ) -> Self {
        Self {
            store,
            reducer,
            middleware: RefCell::new(middleware),
        }
    }

    /// Dispatch an action.
    ///
    /// Returns `true` if the reducer produced an update. When called from
    /// inside a store subscriber the update is queued, so the state reflects
    /// it only after the current notification round.
    pub fn dispatch(&self, action: A) -> bool {
        self.middleware.borrow_mut().before(&action);
        let patch = self
            .store
            .with_state(|state| (self.reducer)(state, action.clone()));
        let changed = match patch {
            Some(patch) => {
                self.store.update(patch);
                true
            }
            None => false,
        };
        self.middleware.borrow_mut().after(&action, changed);
        changed
    }

    /// Get the store this dispatcher writes to
    pub fn store(&self) -> &KeyedStateStore<S> {
        &self.store
    }

    /// Run `f` with the middleware
    pub fn with_middleware_ref<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.middleware.borrow())
    }
}

/// Middleware trait for intercepting actions
///
/// Implement this trait to add logging, auditing, or other
/// cross-cutting concerns to a dispatcher.
pub trait Middleware<A: Action> {
    /// Called before the action reaches the reducer
    fn before(&mut self, action: &A);

    /// Called after the reducer ran and any update was applied
    fn after(&mut self, action: &A, state_changed: bool);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Logs every dispatched action through `tracing`, numbered in dispatch order.
///
/// Actions the reducer ignored are logged at `trace`, applied ones at `debug`.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    dispatched: u64,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actions seen so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

impl<A: Action> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, _action: &A) {
        self.dispatched += 1;
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        let seq = self.dispatched;
        if state_changed {
            tracing::debug!(seq, action = action.name(), "Action applied");
        } else {
            tracing::trace!(seq, action = action.name(), "Action ignored by reducer");
        }
    }
}
