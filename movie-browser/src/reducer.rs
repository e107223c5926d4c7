//! Reducer - pure function: (state, action) -> patch
//!
//! Each action produces a patch for exactly one slice; the dispatcher hands
//! it to the store, which merges it and notifies subscribers (including the
//! synchronizer that persists it).

use crate::action::Action;
use crate::state::{AppState, AppStatePatch};

/// Map an action to the partial update it causes.
///
/// Re-selecting the current value still produces a patch, so the store
/// notifies and the snapshot is rewritten.
pub fn reducer(_state: &AppState, action: Action) -> Option<AppStatePatch> {
    match action {
        Action::LogIn { username } => Some(AppStatePatch::username(username)),
        Action::SetFilter(filter) => Some(AppStatePatch::home_filter(filter)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Filter;
    use marquee::SliceState;

    #[test]
    fn test_login_touches_only_auth() {
        let mut state = AppState::default();
        state.browse.home_filter = Filter::TopRated.as_str().into();
        let before = state.clone();

        let patch = reducer(
            &state,
            Action::LogIn {
                username: "alice".into(),
            },
        )
        .unwrap();
        let touched = state.merge(patch);

        assert_eq!(touched, vec!["auth"]);
        assert_eq!(state.auth.username, "alice");
        assert_eq!(state.browse, before.browse);
    }

    #[test]
    fn test_set_filter_touches_only_browse() {
        let mut state = AppState::default();
        state.auth.username = "bob".into();

        let patch = reducer(&state, Action::SetFilter(Filter::Popular)).unwrap();
        let touched = state.merge(patch);

        assert_eq!(touched, vec!["browse"]);
        assert_eq!(state.browse.filter(), Some(Filter::Popular));
        assert_eq!(state.auth.username, "bob");
    }

    #[test]
    fn test_same_filter_still_patches() {
        let mut state = AppState::default();
        state.browse.home_filter = Filter::Upcoming.as_str().into();

        assert!(reducer(&state, Action::SetFilter(Filter::Upcoming)).is_some());
    }
}
