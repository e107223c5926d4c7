//! Action trait for type-safe state transitions

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to a store
///
/// Actions describe an intended state transition. They should be:
/// - Clone: Actions may be logged by middleware before the reducer consumes them
/// - Debug: For logging
///
/// Use `#[derive(Action)]` from `marquee-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Optional categorisation of actions, generated by `#[action(infer_categories)]`
pub trait ActionCategory: Action {
    /// Get the category of this action, if it has one
    fn category(&self) -> Option<&'static str>;
}
