//! # Subscriber API: pluggable event sinks.
//!
//! - [`Subscribe`] - contract for event subscribers
//! - [`SubscriberSet`] - non-blocking fan-out with per-subscriber queues
//! - `LogWriter` - built-in println subscriber (feature `logging`)

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod embedded;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
