//! Home screen filter selection
//!
//! Persisted or typed-in filters are validated here before they reach the
//! store. Tab clicks come from the fixed tab bindings and are dispatched
//! as-is.

use crate::action::Action;
use crate::context::AppContext;
use crate::state::Filter;

/// One home screen tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabBinding {
    pub label: &'static str,
    pub filter: Filter,
}

/// Validates filters and turns selections into `SetFilter` dispatches
pub struct FilterController<'a> {
    ctx: &'a AppContext,
}

impl<'a> FilterController<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Exact membership test against the four filter names
    pub fn is_valid(candidate: &str) -> bool {
        candidate.parse::<Filter>().is_ok()
    }

    /// Tabs in display order
    pub fn tabs() -> [TabBinding; 4] {
        Filter::ALL.map(|filter| TabBinding {
            label: filter.label(),
            filter,
        })
    }

    /// Dispatch the persisted filter if it is valid, the default otherwise.
    ///
    /// Returns the filter that was dispatched. An invalid or missing value
    /// falls back silently.
    pub fn resolve_on_load(&self, persisted: Option<&str>) -> Filter {
        let filter = match persisted.map(str::parse::<Filter>) {
            Some(Ok(filter)) => filter,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Persisted filter invalid, using default");
                Filter::DEFAULT
            }
            None => Filter::DEFAULT,
        };
        self.ctx.dispatch(Action::SetFilter(filter));
        filter
    }

    /// Dispatch the filter bound to a clicked tab
    pub fn on_tab_selected(&self, filter: Filter) {
        self.ctx.dispatch(Action::SetFilter(filter));
    }
}
