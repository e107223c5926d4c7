//! Core traits and types for marquee
//!
//! This crate provides the building blocks for sharing one piece of
//! application state between independently activated screens, with
//! persistence that only runs while a screen holds the storage gate.
//!
//! # Core Concepts
//!
//! - **Slice**: A named part of the state that accepts shallow partial updates
//! - **KeyedStateStore**: Observable container; `update` merges a patch and notifies subscribers
//! - **Dispatcher**: Runs a pure reducer and applies its patch to the store
//! - **PersistenceGate**: The "storage unlocked" flag, held open by the active screen
//! - **StateSynchronizer**: Loads the snapshot when the gate opens, saves each update while open
//!
//! # Basic Example
//!
//! ```ignore
//! use marquee::prelude::*;
//!
//! #[derive(Slice, Clone, Debug, Default, PartialEq, Serialize)]
//! struct Auth {
//!     username: String,
//! }
//!
//! #[derive(SliceState, Clone, Debug, Default, Serialize)]
//! struct AppState {
//!     auth: Auth,
//! }
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     LogIn { username: String },
//! }
//!
//! fn reducer(_state: &AppState, action: AppAction) -> Option<AppStatePatch> {
//!     match action {
//!         AppAction::LogIn { username } => Some(AppStatePatch {
//!             auth: Some(AuthPatch { username: Some(username) }),
//!         }),
//!     }
//! }
//!
//! let store = KeyedStateStore::new(AppState::default());
//! let gate = PersistenceGate::new();
//! let _sync = StateSynchronizer::attach(store.clone(), gate.clone(), MemoryStorage::new(), "app");
//! let dispatcher = Dispatcher::new(store.clone(), reducer);
//!
//! let _unlocked = gate.acquire();
//! dispatcher.dispatch(AppAction::LogIn { username: "alice".into() });
//! ```
//!
//! # Concurrency
//!
//! Everything here is single-threaded (`Rc`/`RefCell`). Updates issued while
//! subscribers are being notified are queued and applied in order, so every
//! subscriber sees the same monotonic sequence of states.

pub mod action;
pub mod gate;
pub mod storage;
pub mod store;
pub mod subscription;
pub mod sync;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionCategory};
pub use store::{Slice, SliceState};

// Store exports
pub use store::{
    Dispatcher, KeyedStateStore, LoggingMiddleware, Middleware, NoopMiddleware, Reducer,
};
pub use subscription::Subscription;

// Persistence exports
pub use gate::{GateGuard, PersistenceGate};
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
pub use sync::StateSynchronizer;

// Testing exports
pub use testing::StateRecorder;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionCategory};
    pub use crate::gate::{GateGuard, PersistenceGate};
    pub use crate::storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
    pub use crate::store::{
        Dispatcher, KeyedStateStore, LoggingMiddleware, Middleware, NoopMiddleware, Reducer, Slice,
        SliceState,
    };
    pub use crate::subscription::Subscription;
    pub use crate::sync::StateSynchronizer;
}
