//! Actions - the closed set of shared-state transitions
//!
//! Anything a screen wants to change in [`AppState`](crate::state::AppState)
//! goes through one of these. Input validation happens before dispatch
//! (see [`login`](crate::login) and [`filter`](crate::filter)).

use crate::state::Filter;

/// Application actions
#[derive(marquee::Action, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// A validated login; sets `auth.username`
    #[action(category = "auth")]
    LogIn { username: String },

    /// Select the home screen filter; sets `browse.home_filter`
    #[action(category = "browse")]
    SetFilter(Filter),
}
