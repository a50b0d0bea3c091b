//! Error types used by the stagerun dispatcher and callbacks.
//!
//! This module defines two main error enums:
//!
//! - [`TaskError`] — errors raised by callback stages, returned to the caller unchanged.
//! - [`DispatchError`] — errors raised by the dispatch machinery itself
//!   (name-addressed dispatch, payload codec, registration).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors produced by callback stages.
///
/// These represent failures of an individual dispatch call. `validate`
/// reports structural problems with [`TaskError::Validation`]; the other
/// stages report domain failures with [`TaskError::Fail`]. The dispatcher
/// never recovers or retries: whatever a stage returns reaches the caller.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Input was structurally invalid (raised by `validate`).
    #[error("validation failed: {error}")]
    Validation {
        /// The underlying error message.
        error: String,
    },

    /// A stage failed with a domain-specific error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl TaskError {
    /// Creates a [`TaskError::Validation`] from a message.
    pub fn validation(error: impl Into<String>) -> Self {
        TaskError::Validation {
            error: error.into(),
        }
    }

    /// Creates a [`TaskError::Fail`] from a message.
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use stagerun::TaskError;
    ///
    /// let err = TaskError::validation("missing order id");
    /// assert_eq!(err.as_label(), "task_validation");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Validation { .. } => "task_validation",
            TaskError::Fail { .. } => "task_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Validation { error } => format!("validation: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
        }
    }

    /// Indicates whether the error came from the `validate` stage.
    ///
    /// # Example
    /// ```
    /// use stagerun::TaskError;
    ///
    /// assert!(TaskError::validation("bad").is_validation());
    /// assert!(!TaskError::fail("boom").is_validation());
    /// ```
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation { .. })
    }
}

/// # Errors produced by the dispatch machinery.
///
/// These arise on the name-addressed path ([`Dispatcher::dispatch_named`](crate::Dispatcher::dispatch_named))
/// and during callback registration. [`DispatchError::CallbackRequired`] and
/// [`DispatchError::PayloadMismatch`] are raised **before** any lifecycle
/// stage runs, so the callback's `on_error` hook never observes them.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Dispatch was invoked for a task with no registered callback.
    #[error("no callback registered for task {task:?}")]
    CallbackRequired {
        /// The task name that was looked up.
        task: String,
    },

    /// A callback is already registered under this task name.
    #[error("callback for task {task:?} is already registered")]
    AlreadyRegistered {
        /// The task name that was being registered.
        task: String,
    },

    /// The payload could not be decoded into the callback's input type.
    #[error("payload for task {task:?} does not match the callback input: {error}")]
    PayloadMismatch {
        /// The task name being dispatched.
        task: String,
        /// The decode error message.
        error: String,
    },

    /// The result value could not be encoded after all stages completed.
    #[error("result for task {task:?} could not be encoded: {error}")]
    ResultEncode {
        /// The task name being dispatched.
        task: String,
        /// The encode error message.
        error: String,
    },

    /// A stage failure, passed through unchanged.
    #[error(transparent)]
    Task(#[from] TaskError),
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use stagerun::DispatchError;
    ///
    /// let err = DispatchError::CallbackRequired { task: "orderProcessing".into() };
    /// assert_eq!(err.as_label(), "callback_required");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::CallbackRequired { .. } => "callback_required",
            DispatchError::AlreadyRegistered { .. } => "callback_already_registered",
            DispatchError::PayloadMismatch { .. } => "payload_mismatch",
            DispatchError::ResultEncode { .. } => "result_encode",
            DispatchError::Task(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::CallbackRequired { task } => {
                format!("no callback registered for {task}")
            }
            DispatchError::AlreadyRegistered { task } => {
                format!("callback already registered for {task}")
            }
            DispatchError::PayloadMismatch { task, error } => {
                format!("payload mismatch for {task}: {error}")
            }
            DispatchError::ResultEncode { task, error } => {
                format!("result encode for {task}: {error}")
            }
            DispatchError::Task(e) => e.as_message(),
        }
    }
}
