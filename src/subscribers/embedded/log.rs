//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [dispatching] task="orderProcessing" module="order"
//! [stage] task="orderProcessing" stage=validate
//! [completed] task="orderProcessing"
//! [failed] task="orderProcessing" stage=execute err="inventory unavailable"
//! [callback-registered] task="orderProcessing"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::DispatchStarting => {
                println!(
                    "[dispatching] task={:?} module={:?}",
                    task,
                    e.module.as_deref().unwrap_or("general"),
                );
            }
            EventKind::StageCompleted => {
                if let Some(stage) = e.stage {
                    println!("[stage] task={task:?} stage={stage}");
                }
            }
            EventKind::DispatchCompleted => {
                println!("[completed] task={task:?}");
            }
            EventKind::DispatchFailed => {
                println!(
                    "[failed] task={:?} stage={:?} err={:?}",
                    task, e.stage, e.reason
                );
            }
            EventKind::ErrorHookPanicked => {
                println!(
                    "[error-hook-panicked] task={:?} info={}",
                    task,
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
            EventKind::CallbackRegistered => {
                println!("[callback-registered] task={task:?}");
            }
            EventKind::CallbackRemoved => {
                println!("[callback-removed] task={task:?}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
