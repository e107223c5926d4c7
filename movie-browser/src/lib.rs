//! Movie catalog browser built on marquee shared state
//!
//! Three screens (login, home, support) share one [`AppState`] through an
//! [`AppContext`]. The state is persisted only while a screen is active,
//! and the home screen reads its catalog filter back from the snapshot the
//! next time it activates.
//!
//! ```ignore
//! let ctx = Rc::new(AppContext::new(AppState::default(), MemoryStorage::new(), "app"));
//! let mut nav = Navigator::new(ctx, CatalogFetcher::http(CatalogConfig::default()), "Movie Browser");
//!
//! nav.navigate(Route::Login);
//! let next = nav.login().unwrap().submit("alice", "password1")?;
//! nav.navigate(next);
//! nav.home().unwrap().refresh().await;
//! ```

pub mod action;
pub mod catalog;
pub mod config;
pub mod context;
pub mod filter;
pub mod login;
pub mod reducer;
pub mod screen;
pub mod state;

pub use action::Action;
pub use catalog::{
    CatalogConfig, CatalogFetcher, CatalogTransport, FetchError, HttpTransport, Movie,
};
pub use config::{Config, StorageLocation};
pub use context::{AppContext, DEFAULT_STORAGE_KEY};
pub use filter::FilterController;
pub use login::{validate_login, ValidationError};
pub use reducer::reducer;
pub use screen::{ActiveScreen, HomeScreen, LoginScreen, Navigator, Route, Screen, SupportScreen};
pub use state::{AppState, AppStatePatch, Filter};
