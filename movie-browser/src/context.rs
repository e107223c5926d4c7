//! Shared application context handed to every screen
//!
//! Holds the store, the persistence gate, the dispatcher and the cross-screen
//! UI flags in one place, so tests can build independent instances instead
//! of relying on globals.

use std::cell::Cell;
use std::fmt;

use marquee::{
    Dispatcher, KeyedStateStore, LoggingMiddleware, PersistenceGate, StateSynchronizer, Storage,
};

use crate::action::Action;
use crate::reducer::reducer;
use crate::state::AppState;

/// Dispatcher type used by the application
pub type AppDispatcher = Dispatcher<AppState, Action, LoggingMiddleware>;

/// Storage key for the persisted snapshot
pub const DEFAULT_STORAGE_KEY: &str = "movie-browser";

/// Shared state plus the flags screens use to talk to each other
pub struct AppContext {
    store: KeyedStateStore<AppState>,
    gate: PersistenceGate,
    dispatcher: AppDispatcher,
    sync: StateSynchronizer<AppState>,
    home_btn_enabled: Cell<bool>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("store", &self.store)
            .field("gate", &self.gate)
            .field("home_btn_enabled", &self.home_btn_enabled.get())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build a context around `initial`, persisting to `storage` under `key`.
    ///
    /// The gate starts closed; nothing is read from storage until a screen
    /// activates.
    pub fn new(initial: AppState, storage: impl Storage + 'static, key: &str) -> Self {
        let store = KeyedStateStore::new(initial);
        let gate = PersistenceGate::new();
        let sync = StateSynchronizer::attach(store.clone(), gate.clone(), storage, key);
        let dispatcher =
            Dispatcher::with_middleware(store.clone(), reducer, LoggingMiddleware::new());

        Self {
            store,
            gate,
            dispatcher,
            sync,
            home_btn_enabled: Cell::new(false),
        }
    }

    /// Dispatch an action; returns `true` if the state was updated
    pub fn dispatch(&self, action: Action) -> bool {
        self.dispatcher.dispatch(action)
    }

    /// Copy of the current shared state
    pub fn read(&self) -> AppState {
        self.store.read()
    }

    /// The shared store, for subscribing to state changes
    pub fn store(&self) -> &KeyedStateStore<AppState> {
        &self.store
    }

    /// The "storage unlocked" gate held open by the active screen
    pub fn gate(&self) -> &PersistenceGate {
        &self.gate
    }

    /// Number of snapshots written since startup
    pub fn persisted_writes(&self) -> usize {
        self.sync.writes()
    }

    /// Whether the shared navigation may offer the "home" button
    pub fn is_home_btn_enabled(&self) -> bool {
        self.home_btn_enabled.get()
    }

    /// Set by whichever screen last activated; never reset on deactivation
    pub fn set_home_btn_enabled(&self, enabled: bool) {
        self.home_btn_enabled.set(enabled);
    }
}
