//! # Callback abstraction: the four-stage unit of work.
//!
//! This module defines the [`Callback`] trait, the contract every unit of
//! work dispatched by [`Dispatcher`](crate::Dispatcher) must implement. The
//! common handle type is [`CallbackRef`], an `Arc<dyn Callback>` suitable for
//! sharing across calls.
//!
//! ## Contract
//! - Stages run in fixed order: `validate → preprocess → execute → postprocess`.
//!   The dispatcher drives them; a callback never invokes its own stages.
//! - Every stage except [`Callback::execute`] has a no-op default, so
//!   implementers only override what they need.
//! - [`Callback::on_error`] observes the first failing stage's error at most
//!   once per dispatch. It is for cleanup/alerting, not recovery: the
//!   original error is still returned to the caller after the hook runs.
//! - A failing stage ends the call; later stages never run.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;

/// Shared reference to a callback (`Arc<dyn Callback>`).
pub type CallbackRef<T, R> = Arc<dyn Callback<T, R>>;

/// # Polymorphic unit of work over input `T` producing result `R`.
///
/// Implementations hold at most per-call state: the dispatcher calls each
/// stage once per dispatch, and callbacks shared across concurrent calls
/// must be safe to invoke from multiple tasks (`Send + Sync`).
///
/// `validate` failures should use [`TaskError::Validation`]; the remaining
/// stages report domain failures with [`TaskError::Fail`]. Whatever a stage
/// returns is propagated to the caller unchanged.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use stagerun::{Callback, TaskError};
///
/// struct Reverse;
///
/// #[async_trait]
/// impl Callback<String, String> for Reverse {
///     async fn validate(&self, input: &String) -> Result<(), TaskError> {
///         if input.is_empty() {
///             return Err(TaskError::validation("input must not be empty"));
///         }
///         Ok(())
///     }
///
///     async fn execute(&self, input: String) -> Result<String, TaskError> {
///         Ok(input.chars().rev().collect())
///     }
/// }
/// ```
#[async_trait]
pub trait Callback<T, R>: Send + Sync
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    /// Inspects the input before any other stage runs.
    ///
    /// Fails with [`TaskError::Validation`] when the input is structurally
    /// invalid (missing identifier, absent where a value is required).
    async fn validate(&self, input: &T) -> Result<(), TaskError> {
        let _ = input;
        Ok(())
    }

    /// Mutates or normalizes the input in place (e.g. set an initial status).
    async fn preprocess(&self, input: &mut T) -> Result<(), TaskError> {
        let _ = input;
        Ok(())
    }

    /// Performs the unit of work. The only stage without a default.
    async fn execute(&self, input: T) -> Result<R, TaskError>;

    /// Side effect on the successful result (logging, notification).
    async fn postprocess(&self, result: &R) -> Result<(), TaskError> {
        let _ = result;
        Ok(())
    }

    /// Observes a failure raised by any prior stage.
    ///
    /// Cannot fail by signature; a panic inside the hook is caught by the
    /// dispatcher and never masks the original error.
    async fn on_error(&self, error: &TaskError) {
        let _ = error;
    }
}
