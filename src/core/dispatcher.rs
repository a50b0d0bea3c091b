//! # Dispatcher: drives callback lifecycles and reports outcomes.
//!
//! The [`Dispatcher`] owns the event bus, an optional [`SubscriberSet`]
//! listener, and the callback registry. It retains no per-call state: one
//! dispatcher instance can be shared across concurrent dispatch calls
//! without contention.
//!
//! ## High-level architecture
//! ```text
//! Typed path:
//!   dispatch(meta, &callback, input)
//!       ├─ publish DispatchStarting { task, module }
//!       └─ run_stages(): validate → preprocess → execute → postprocess
//!              ├─ Ok  ──► publish DispatchCompleted ──► return result
//!              └─ Err ──► on_error(&err) ──► publish DispatchFailed ──► return Err
//!
//! Name-addressed path:
//!   register(task, callback)          (serde-erased, stored by name)
//!   dispatch_named(meta, payload)
//!       ├─ publish DispatchStarting
//!       ├─ registry lookup ── missing ──► Err(CallbackRequired)   (no stage ran)
//!       ├─ decode payload ─── mismatch ─► Err(PayloadMismatch)    (no stage ran)
//!       └─ run_stages() ──► encode result
//!
//! Event flow:
//!   dispatch calls ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//! ```
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use stagerun::{Callback, Config, Dispatcher, TaskError, TaskMeta};
//!
//! struct Greet;
//!
//! #[async_trait]
//! impl Callback<String, String> for Greet {
//!     async fn execute(&self, input: String) -> Result<String, TaskError> {
//!         Ok(format!("hello, {input}"))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TaskError> {
//!     let dispatcher = Dispatcher::new(Config::default());
//!     let meta = TaskMeta::new("greeting");
//!
//!     let out = dispatcher.dispatch(&meta, &Greet, "world".to_string()).await?;
//!     assert_eq!(out, "hello, world");
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::core::driver::run_stages;
use crate::core::registry::{Registry, TypedCallback};
use crate::core::{Config, DispatcherBuilder};
use crate::error::{DispatchError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::SubscriberSet;
use crate::tasks::{Callback, TaskMeta};

/// Stateless driver for the four-stage callback lifecycle.
pub struct Dispatcher {
    pub(super) cfg: Config,
    pub(super) bus: Bus,
    pub(super) registry: Registry,
    pub(super) subscribers: Option<Arc<SubscriberSet>>,
    pub(super) listener: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no subscribers.
    ///
    /// Shorthand for `Dispatcher::builder(cfg).build()`.
    pub fn new(cfg: Config) -> Self {
        Self::builder(cfg).build()
    }

    /// Returns a builder for a dispatcher with optional subscribers.
    pub fn builder(cfg: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    /// Drives the lifecycle of `callback` against `input`.
    ///
    /// Publishes `DispatchStarting`, runs the four stages in order, and
    /// returns `execute`'s result unchanged. On the first stage failure the
    /// callback's `on_error` hook observes the error once, a
    /// `DispatchFailed` event is published, and the original error is
    /// returned verbatim; later stages never run.
    ///
    /// Callback conformance is enforced by the type system on this path;
    /// use [`Dispatcher::dispatch_named`] when the callback is resolved at
    /// runtime.
    pub async fn dispatch<T, R, C>(
        &self,
        meta: &TaskMeta,
        callback: &C,
        input: T,
    ) -> Result<R, TaskError>
    where
        C: Callback<T, R> + ?Sized,
        T: Send + Sync + 'static,
        R: Send + Sync + 'static,
    {
        self.publish_starting(meta);
        run_stages(callback, meta, input, &self.bus).await
    }

    /// Drives the lifecycle of the callback registered under `meta.name()`.
    ///
    /// ### Preconditions (checked before any stage runs)
    /// - A callback must be registered under the task name, otherwise the
    ///   call fails with [`DispatchError::CallbackRequired`].
    /// - The payload must decode into the callback's input type, otherwise
    ///   the call fails with [`DispatchError::PayloadMismatch`].
    ///
    /// Neither precondition failure reaches the `on_error` hook.
    pub async fn dispatch_named(
        &self,
        meta: &TaskMeta,
        payload: Value,
    ) -> Result<Value, DispatchError> {
        self.publish_starting(meta);

        let callback = self.registry.get(meta.name()).await.ok_or_else(|| {
            DispatchError::CallbackRequired {
                task: meta.name().to_string(),
            }
        })?;

        callback.run(meta, payload, &self.bus).await
    }

    /// Registers `callback` under `task` for name-addressed dispatch.
    ///
    /// The callback is type-erased behind a serde payload codec. Duplicate
    /// task names are refused with [`DispatchError::AlreadyRegistered`].
    pub async fn register<T, R, C>(
        &self,
        task: impl Into<String>,
        callback: C,
    ) -> Result<(), DispatchError>
    where
        C: Callback<T, R> + 'static,
        T: DeserializeOwned + Send + Sync + 'static,
        R: Serialize + Send + Sync + 'static,
    {
        let task = task.into();
        self.registry
            .insert(task.clone(), Arc::new(TypedCallback::new(callback)))
            .await?;
        self.bus
            .publish(Event::new(EventKind::CallbackRegistered).with_task(task));
        Ok(())
    }

    /// Removes the callback registered under `task`.
    ///
    /// Returns `true` if a callback was removed.
    pub async fn remove(&self, task: &str) -> bool {
        let removed = self.registry.remove(task).await;
        if removed {
            self.bus
                .publish(Event::new(EventKind::CallbackRemoved).with_task(task));
        }
        removed
    }

    /// Returns the sorted names of all registered callbacks.
    pub async fn registered(&self) -> Vec<String> {
        self.registry.list().await
    }

    /// Returns the event bus (e.g. to attach ad-hoc receivers).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns the dispatcher configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Graceful shutdown: stops the subscriber listener and awaits worker
    /// completion.
    ///
    /// Clones of the bus obtained via [`Dispatcher::bus`] keep the event
    /// channel open; drop them first or the listener cannot observe the
    /// close.
    pub async fn shutdown(self) {
        let Dispatcher {
            cfg: _,
            bus,
            registry,
            subscribers,
            listener,
        } = self;

        drop(bus);
        drop(registry);

        if let Some(handle) = listener {
            let _ = handle.await;
        }
        if let Some(set) = subscribers.and_then(Arc::into_inner) {
            set.shutdown().await;
        }
    }

    fn publish_starting(&self, meta: &TaskMeta) {
        self.bus.publish(
            Event::new(EventKind::DispatchStarting)
                .with_task(meta.name())
                .with_module(meta.module()),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::tasks::Stage;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    struct Order {
        order_id: String,
        #[serde(default)]
        status: String,
    }

    /// Order-processing callback over a nullable input.
    struct OrderCallback {
        errors_seen: Arc<AtomicUsize>,
    }

    impl OrderCallback {
        fn new() -> Self {
            Self {
                errors_seen: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Callback<Option<Order>, String> for OrderCallback {
        async fn validate(&self, input: &Option<Order>) -> Result<(), TaskError> {
            match input {
                Some(order) if !order.order_id.is_empty() => Ok(()),
                _ => Err(TaskError::validation(
                    "order must not be null and must have an order id",
                )),
            }
        }

        async fn preprocess(&self, input: &mut Option<Order>) -> Result<(), TaskError> {
            if let Some(order) = input {
                order.status = "PENDING".to_string();
            }
            Ok(())
        }

        async fn execute(&self, input: Option<Order>) -> Result<String, TaskError> {
            let order = input.expect("validate guarantees a present order");
            Ok(format!(
                "Order {} processed successfully, status: {}",
                order.order_id, order.status
            ))
        }

        async fn on_error(&self, _error: &TaskError) {
            self.errors_seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Fails in `execute`; records whether `postprocess` ever ran.
    struct FlakyCallback {
        errors_seen: Arc<AtomicUsize>,
        postprocessed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Callback<Order, String> for FlakyCallback {
        async fn preprocess(&self, input: &mut Order) -> Result<(), TaskError> {
            input.status = "PENDING".to_string();
            Ok(())
        }

        async fn execute(&self, _input: Order) -> Result<String, TaskError> {
            Err(TaskError::fail("inventory unavailable"))
        }

        async fn postprocess(&self, _result: &String) -> Result<(), TaskError> {
            self.postprocessed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn on_error(&self, _error: &TaskError) {
            self.errors_seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Counts every stage entry; used to prove preconditions skip stages.
    struct CountingCallback {
        stages: Arc<AtomicUsize>,
        errors_seen: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Callback<Order, String> for CountingCallback {
        async fn validate(&self, _input: &Order) -> Result<(), TaskError> {
            self.stages.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn preprocess(&self, _input: &mut Order) -> Result<(), TaskError> {
            self.stages.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn execute(&self, input: Order) -> Result<String, TaskError> {
            self.stages.fetch_add(1, Ordering::SeqCst);
            Ok(input.order_id)
        }

        async fn postprocess(&self, _result: &String) -> Result<(), TaskError> {
            self.stages.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn on_error(&self, _error: &TaskError) {
            self.errors_seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn order_meta() -> TaskMeta {
        TaskMeta::new("orderProcessing").with_module("order")
    }

    #[tokio::test]
    async fn order_processing_succeeds_with_exact_result() {
        let dispatcher = Dispatcher::new(Config::default());
        let callback = OrderCallback::new();
        let order = Order {
            order_id: "ORDER123".to_string(),
            status: String::new(),
        };

        let result = dispatcher
            .dispatch(&order_meta(), &callback, Some(order))
            .await
            .unwrap();

        assert_eq!(result, "Order ORDER123 processed successfully, status: PENDING");
        assert_eq!(callback.errors_seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn null_order_fails_validation_and_hook_observes_once() {
        let dispatcher = Dispatcher::new(Config::default());
        let callback = OrderCallback::new();

        let err = dispatcher
            .dispatch(&order_meta(), &callback, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TaskError::Validation { ref error }
                if error == "order must not be null and must have an order id"
        ));
        assert_eq!(callback.errors_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn execute_failure_after_preprocess_skips_postprocess() {
        let dispatcher = Dispatcher::new(Config::default());
        let callback = FlakyCallback {
            errors_seen: Arc::new(AtomicUsize::new(0)),
            postprocessed: Arc::new(AtomicUsize::new(0)),
        };
        let order = Order {
            order_id: "ORDER123".to_string(),
            status: String::new(),
        };

        let err = dispatcher
            .dispatch(&order_meta(), &callback, order)
            .await
            .unwrap_err();

        assert!(matches!(err, TaskError::Fail { ref error } if error == "inventory unavailable"));
        assert_eq!(callback.postprocessed.load(Ordering::SeqCst), 0);
        assert_eq!(callback.errors_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_callback_fails_before_any_stage() {
        let dispatcher = Dispatcher::new(Config::default());

        let err = dispatcher
            .dispatch_named(&TaskMeta::new("unknownTask"), json!({}))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::CallbackRequired { ref task } if task == "unknownTask"
        ));
        assert_eq!(err.as_label(), "callback_required");
    }

    #[tokio::test]
    async fn named_dispatch_decodes_payload_and_encodes_result() {
        let dispatcher = Dispatcher::new(Config::default());
        let callback = CountingCallback {
            stages: Arc::new(AtomicUsize::new(0)),
            errors_seen: Arc::new(AtomicUsize::new(0)),
        };
        dispatcher
            .register("orderProcessing", callback)
            .await
            .unwrap();

        let result = dispatcher
            .dispatch_named(&order_meta(), json!({ "order_id": "ORDER123" }))
            .await
            .unwrap();

        assert_eq!(result, json!("ORDER123"));
        assert_eq!(dispatcher.registered().await, vec!["orderProcessing"]);
    }

    #[tokio::test]
    async fn undecodable_payload_fails_before_any_stage() {
        let dispatcher = Dispatcher::new(Config::default());
        let stages = Arc::new(AtomicUsize::new(0));
        let errors_seen = Arc::new(AtomicUsize::new(0));
        let callback = CountingCallback {
            stages: Arc::clone(&stages),
            errors_seen: Arc::clone(&errors_seen),
        };
        dispatcher.register("counting", callback).await.unwrap();

        let err = dispatcher
            .dispatch_named(&TaskMeta::new("counting"), json!("not an order"))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::PayloadMismatch { .. }));
        assert_eq!(stages.load(Ordering::SeqCst), 0, "no stage may run");
        assert_eq!(errors_seen.load(Ordering::SeqCst), 0, "hook must not fire");
    }

    #[tokio::test]
    async fn duplicate_registration_is_refused() {
        let dispatcher = Dispatcher::new(Config::default());
        dispatcher
            .register("orderProcessing", OrderCallbackNamed)
            .await
            .unwrap();

        let err = dispatcher
            .register("orderProcessing", OrderCallbackNamed)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::AlreadyRegistered { .. }));
    }

    #[tokio::test]
    async fn removed_callback_is_missing_again() {
        let dispatcher = Dispatcher::new(Config::default());
        dispatcher
            .register("orderProcessing", OrderCallbackNamed)
            .await
            .unwrap();

        assert!(dispatcher.remove("orderProcessing").await);
        assert!(!dispatcher.remove("orderProcessing").await);

        let err = dispatcher
            .dispatch_named(&order_meta(), json!({ "order_id": "ORDER123" }))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::CallbackRequired { .. }));
    }

    /// Minimal named variant of the order callback (non-nullable input).
    struct OrderCallbackNamed;

    #[async_trait]
    impl Callback<Order, String> for OrderCallbackNamed {
        async fn validate(&self, input: &Order) -> Result<(), TaskError> {
            if input.order_id.is_empty() {
                return Err(TaskError::validation(
                    "order must not be null and must have an order id",
                ));
            }
            Ok(())
        }

        async fn preprocess(&self, input: &mut Order) -> Result<(), TaskError> {
            input.status = "PENDING".to_string();
            Ok(())
        }

        async fn execute(&self, input: Order) -> Result<String, TaskError> {
            Ok(format!(
                "Order {} processed successfully, status: {}",
                input.order_id, input.status
            ))
        }
    }

    #[tokio::test]
    async fn named_order_processing_matches_typed_result() {
        let dispatcher = Dispatcher::new(Config::default());
        dispatcher
            .register("orderProcessing", OrderCallbackNamed)
            .await
            .unwrap();

        let result = dispatcher
            .dispatch_named(&order_meta(), json!({ "order_id": "ORDER123" }))
            .await
            .unwrap();

        assert_eq!(
            result,
            json!("Order ORDER123 processed successfully, status: PENDING")
        );
    }

    #[tokio::test]
    async fn dispatch_publishes_lifecycle_events_in_order() {
        let dispatcher = Dispatcher::new(Config::default());
        let mut rx = dispatcher.bus().subscribe();
        let callback = OrderCallback::new();
        let order = Order {
            order_id: "ORDER123".to_string(),
            status: String::new(),
        };

        dispatcher
            .dispatch(&order_meta(), &callback, Some(order))
            .await
            .unwrap();

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::DispatchStarting,
                EventKind::StageCompleted,
                EventKind::StageCompleted,
                EventKind::StageCompleted,
                EventKind::StageCompleted,
                EventKind::DispatchCompleted,
            ]
        );
    }

    #[tokio::test]
    async fn failed_dispatch_ends_with_warning_event() {
        let dispatcher = Dispatcher::new(Config::default());
        let mut rx = dispatcher.bus().subscribe();
        let callback = FlakyCallback {
            errors_seen: Arc::new(AtomicUsize::new(0)),
            postprocessed: Arc::new(AtomicUsize::new(0)),
        };
        let order = Order {
            order_id: "ORDER123".to_string(),
            status: String::new(),
        };

        let _ = dispatcher.dispatch(&order_meta(), &callback, order).await;

        let mut last = None;
        while let Ok(ev) = rx.try_recv() {
            last = Some(ev);
        }
        let last = last.expect("events were published");
        assert_eq!(last.kind, EventKind::DispatchFailed);
        assert_eq!(last.task.as_deref(), Some("orderProcessing"));
        assert_eq!(last.module.as_deref(), Some("order"));
        assert_eq!(last.stage, Some(Stage::Execute));
        assert!(last
            .reason
            .as_deref()
            .unwrap()
            .contains("inventory unavailable"));
    }
}
