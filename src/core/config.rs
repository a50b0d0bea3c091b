//! # Global dispatcher configuration.
//!
//! Provides [`Config`] centralized settings for the dispatcher.
//!
//! Config is used in two ways:
//! 1. **Dispatcher creation**: `Dispatcher::builder(config)`
//! 2. **TaskMeta defaults**: `TaskMeta::with_defaults(name, &config)`

use crate::tasks::DEFAULT_MODULE;

/// Global configuration for the dispatcher.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `default_module`: Module name inherited by [`TaskMeta::with_defaults`](crate::TaskMeta::with_defaults)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// will receive `Lagged` and skip older items. Minimum value is 1
    /// (enforced by Bus).
    pub bus_capacity: usize,

    /// Default module name for tasks that do not set one explicitly.
    pub default_module: String,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024` (good baseline)
    /// - `default_module = "general"`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            default_module: DEFAULT_MODULE.to_string(),
        }
    }
}
