//! # stagerun
//!
//! **Stagerun** is a lightweight staged-callback dispatch library for Rust.
//!
//! It provides a four-stage lifecycle contract for units of work
//! (`validate → preprocess → execute → postprocess`, with an error hook) and
//! a stateless dispatcher that drives the lifecycle in fixed order,
//! publishing structured events along the way. The crate is designed as a
//! building block for services that want one uniform entry/exit/error path
//! around heterogeneous business operations.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Callback   │   │   Callback   │   │  CallbackFn  │
//!     │ (unit of     │   │ (unit of     │   │ (closure-    │
//!     │  work #1)    │   │  work #2)    │   │  backed)     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher (stateless driver)                                    │
//! │  - Bus (broadcast events)                                         │
//! │  - Registry (name-addressed callbacks, serde payload codec)       │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ publishes Events:
//!                                │ - DispatchStarting
//!                                │ - StageCompleted
//!                                │ - DispatchCompleted / DispatchFailed
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                 (capacity: Config::bus_capacity)                  │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                          ┌─────────────────┐
//!                          │  bus listener   │
//!                          │ (in Dispatcher) │
//!                          └────────┬────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          (per-sub queues)
//!                        ┌─────────┼─────────┐
//!                        ▼         ▼         ▼
//!                        worker1  worker2  workerN
//!                        ▼         ▼         ▼
//!                   sub1.on   sub2.on   subN.on
//!                    _event()  _event()  _event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! dispatch(meta, callback, input)
//!
//!   ├─► publish DispatchStarting { task, module }
//!   ├─► callback.validate(&input)      ── structural checks
//!   ├─► callback.preprocess(&mut input)── in-place normalization
//!   ├─► callback.execute(input)        ── the unit of work
//!   ├─► callback.postprocess(&result)  ── side effect on the result
//!   │       │
//!   │       ├─ Ok  ──► publish DispatchCompleted ─► return result
//!   │       │
//!   │       └─ Err (first failing stage):
//!   │            ├─► callback.on_error(&err)   (panic-isolated, once)
//!   │            ├─► publish DispatchFailed { stage, reason }
//!   │            └─► return the original error, unchanged
//!   │
//!   └─ no retries, no recovery: either all four stages complete,
//!      or the call ends with the first error and no further stages run
//! ```
//!
//! ## Features
//! | Area               | Description                                                       | Key types / traits                  |
//! |--------------------|-------------------------------------------------------------------|-------------------------------------|
//! | **Callbacks**      | Define units of work with no-op defaults for optional stages.     | [`Callback`], [`CallbackFn`]        |
//! | **Dispatch**       | Drive the lifecycle, typed or name-addressed.                     | [`Dispatcher`], [`TaskMeta`]        |
//! | **Subscriber API** | Hook into dispatch events (logging, metrics, custom subscribers). | [`Subscribe`]                       |
//! | **Errors**         | Typed errors for stages and the dispatch machinery.               | [`TaskError`], [`DispatchError`]    |
//! | **Configuration**  | Centralize runtime settings.                                      | [`Config`]                          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use stagerun::{Callback, Config, Dispatcher, TaskError, TaskMeta};
//!
//! #[derive(Clone)]
//! struct Order {
//!     id: String,
//!     status: String,
//! }
//!
//! struct OrderCallback;
//!
//! #[async_trait]
//! impl Callback<Order, String> for OrderCallback {
//!     async fn validate(&self, input: &Order) -> Result<(), TaskError> {
//!         if input.id.is_empty() {
//!             return Err(TaskError::validation("order must have an order id"));
//!         }
//!         Ok(())
//!     }
//!
//!     async fn preprocess(&self, input: &mut Order) -> Result<(), TaskError> {
//!         input.status = "PENDING".to_string();
//!         Ok(())
//!     }
//!
//!     async fn execute(&self, input: Order) -> Result<String, TaskError> {
//!         Ok(format!(
//!             "Order {} processed successfully, status: {}",
//!             input.id, input.status
//!         ))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TaskError> {
//!     let dispatcher = Dispatcher::new(Config::default());
//!     let meta = TaskMeta::new("orderProcessing").with_module("order");
//!
//!     let order = Order { id: "ORDER123".to_string(), status: String::new() };
//!     let result = dispatcher.dispatch(&meta, &OrderCallback, order).await?;
//!
//!     assert_eq!(result, "Order ORDER123 processed successfully, status: PENDING");
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{Config, Dispatcher, DispatcherBuilder};
pub use crate::error::{DispatchError, TaskError};
pub use crate::events::{Bus, Event, EventKind};
pub use crate::subscribers::{Subscribe, SubscriberSet};
pub use crate::tasks::{Callback, CallbackFn, CallbackRef, Stage, TaskMeta};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use crate::subscribers::LogWriter;
