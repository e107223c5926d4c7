//! marquee: keyed shared state with gated persistence
//!
//! One state value, split into named slices, shared by every screen of an
//! application. Screens change it by dispatching actions through a pure
//! reducer; a synchronizer mirrors it to durable storage only while the
//! active screen holds the persistence gate open.
//!
//! # Example
//! ```ignore
//! use marquee::prelude::*;
//!
//! #[derive(Slice, Clone, Debug, Default, PartialEq, Serialize)]
//! struct Auth {
//!     username: String,
//! }
//!
//! #[derive(SliceState, Clone, Debug, Default, PartialEq, Serialize)]
//! struct AppState {
//!     auth: Auth,
//! }
//!
//! let store = KeyedStateStore::new(AppState::default());
//! store.update(AppStatePatch {
//!     auth: Some(AuthPatch { username: Some("alice".into()) }),
//! });
//! ```

// Re-export everything from core
pub use marquee_core::*;

// Re-export derive macros
pub use marquee_macros::{Action, Slice, SliceState};

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use marquee_core::{Action, ActionCategory, Middleware, Slice, SliceState, Storage};

    // Store
    pub use marquee_core::{
        Dispatcher, KeyedStateStore, LoggingMiddleware, NoopMiddleware, Reducer, Subscription,
    };

    // Persistence
    pub use marquee_core::{
        GateGuard, JsonFileStorage, MemoryStorage, PersistenceGate, StateSynchronizer,
        StorageError,
    };

    // Derive macros
    pub use marquee_macros::{Action, Slice, SliceState};
}
