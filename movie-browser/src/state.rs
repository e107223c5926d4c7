//! Application state - single source of truth shared by every screen
//!
//! Two slices:
//! - `auth`: who is logged in (set only by `LogIn`)
//! - `browse`: the home screen's catalog filter (set only by `SetFilter`)
//!
//! Screens never mutate these directly; they dispatch actions and the
//! reducer produces a patch for exactly one slice.

use std::fmt;
use std::str::FromStr;

use marquee::{Slice, SliceState};
use serde::{Deserialize, Deserializer, Serialize};

/// Catalog category shown on the home screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Filter {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
}

impl Filter {
    /// Every filter, in tab order
    pub const ALL: [Filter; 4] = [
        Filter::NowPlaying,
        Filter::Popular,
        Filter::TopRated,
        Filter::Upcoming,
    ];

    /// Applied when no valid filter was persisted
    pub const DEFAULT: Filter = Filter::NowPlaying;

    /// Canonical name, as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::NowPlaying => "NOW_PLAYING",
            Filter::Popular => "POPULAR",
            Filter::TopRated => "TOP_RATED",
            Filter::Upcoming => "UPCOMING",
        }
    }

    /// Path segment appended to the catalog endpoint
    pub fn path_segment(&self) -> &'static str {
        match self {
            Filter::NowPlaying => "/now_playing",
            Filter::Popular => "/popular",
            Filter::TopRated => "/top_rated",
            Filter::Upcoming => "/upcoming",
        }
    }

    /// Tab caption
    pub fn label(&self) -> &'static str {
        match self {
            Filter::NowPlaying => "Now Playing",
            Filter::Popular => "Popular",
            Filter::TopRated => "Top Rated",
            Filter::Upcoming => "Upcoming",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names none of the four filters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter {0:?} (expected one of NOW_PLAYING, POPULAR, TOP_RATED, UPCOMING)")]
pub struct FilterError(pub String);

impl FromStr for Filter {
    type Err = FilterError;

    /// Exact match on the canonical name only
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| FilterError(s.to_string()))
    }
}

/// Login identity
#[derive(Slice, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Auth {
    /// Empty until someone logs in
    pub username: String,
}

/// Home screen browsing preferences
#[derive(Slice, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Browse {
    /// Filter name as stored. Empty until resolved; a snapshot may carry a
    /// stale or unknown name until the home screen validates it.
    #[serde(deserialize_with = "lenient_filter_name")]
    pub home_filter: String,
}

impl Browse {
    /// The selected filter, if the stored name is one of the four
    pub fn filter(&self) -> Option<Filter> {
        self.home_filter.parse().ok()
    }
}

/// Non-string values in a snapshot count as "not persisted", so a damaged
/// filter never discards the rest of the snapshot.
fn lenient_filter_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(name) => Some(name),
        _ => None,
    })
}

/// Everything the screens share
#[derive(SliceState, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AppState {
    pub auth: Auth,
    pub browse: Browse,
}

impl AppState {
    /// Whether someone has logged in this session
    pub fn is_logged_in(&self) -> bool {
        !self.auth.username.is_empty()
    }
}

impl AppStatePatch {
    /// Patch touching only `auth.username`
    pub fn username(username: impl Into<String>) -> Self {
        Self {
            auth: Some(AuthPatch {
                username: Some(username.into()),
            }),
            ..Default::default()
        }
    }

    /// Patch touching only `browse.home_filter`
    pub fn home_filter(filter: Filter) -> Self {
        Self {
            browse: Some(BrowsePatch {
                home_filter: Some(filter.as_str().to_string()),
            }),
            ..Default::default()
        }
    }
}
