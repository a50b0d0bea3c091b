//! # Dispatch events emitted by the dispatcher.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: dispatch flow (starting, per-stage completion, completed, failed)
//! - **Hook events**: error-hook misbehavior (panic isolation)
//! - **Registry events**: callback registration changes
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task
//! name, module, failing stage, and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use stagerun::{Event, EventKind, Stage};
//!
//! let ev = Event::new(EventKind::DispatchFailed)
//!     .with_task("orderProcessing")
//!     .with_module("order")
//!     .with_stage(Stage::Execute)
//!     .with_reason("inventory unavailable");
//!
//! assert_eq!(ev.kind, EventKind::DispatchFailed);
//! assert_eq!(ev.task.as_deref(), Some("orderProcessing"));
//! assert_eq!(ev.stage, Some(Stage::Execute));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::tasks::Stage;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of dispatch events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Dispatch lifecycle events ===
    /// A dispatch call is starting.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `module`: module name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DispatchStarting,

    /// A lifecycle stage completed successfully.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `stage`: completed stage
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    StageCompleted,

    /// All four stages completed; the result was returned to the caller.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `module`: module name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DispatchCompleted,

    /// A stage failed; the error hook ran and the error was re-raised.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `module`: module name
    /// - `stage`: failing stage
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DispatchFailed,

    // === Hook events ===
    /// The callback's `on_error` hook panicked while observing a failure.
    ///
    /// The original stage error is still returned to the caller.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: panic message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ErrorHookPanicked,

    // === Registry events ===
    /// A callback was registered under a task name.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CallbackRegistered,

    /// A callback was removed from the registry.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CallbackRemoved,
}

/// Dispatch event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Module of the task, if applicable.
    pub module: Option<Arc<str>>,
    /// Lifecycle stage, if applicable.
    pub stage: Option<Stage>,
    /// Human-readable reason (errors, panic info, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            module: None,
            stage: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a module name.
    #[inline]
    pub fn with_module(mut self, module: impl Into<Arc<str>>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Attaches a lifecycle stage.
    #[inline]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True for terminal dispatch outcomes (completed or failed).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::DispatchCompleted | EventKind::DispatchFailed
        )
    }
}
