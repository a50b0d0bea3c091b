//! # Callback registry - name-addressed dispatch table.
//!
//! The registry backs [`Dispatcher::dispatch_named`](crate::Dispatcher::dispatch_named):
//! callbacks are type-erased behind a serde payload codec and stored under
//! their task name, the way a host framework would resolve the handler for an
//! annotated method.
//!
//! ## Rules
//! - One callback per task name; duplicates are refused.
//! - Lookup happens before any lifecycle stage runs: a missing entry is a
//!   precondition failure, not a stage failure.
//! - The payload codec decodes the input **before** the stages and encodes
//!   the result **after** them; neither error reaches the `on_error` hook.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::core::driver::run_stages;
use crate::error::DispatchError;
use crate::events::Bus;
use crate::tasks::{Callback, TaskMeta};

/// Object-safe view of a registered callback.
///
/// `TypedCallback` erases the concrete input/result types so callbacks with
/// different signatures can share one table.
#[async_trait]
pub(crate) trait ErasedCallback: Send + Sync {
    /// Decodes the payload, drives the lifecycle stages, encodes the result.
    async fn run(&self, meta: &TaskMeta, payload: Value, bus: &Bus)
        -> Result<Value, DispatchError>;
}

/// Serde-codec adapter from a typed [`Callback`] to [`ErasedCallback`].
pub(crate) struct TypedCallback<T, R, C> {
    callback: C,
    _marker: PhantomData<fn(T) -> R>,
}

impl<T, R, C> TypedCallback<T, R, C> {
    pub(crate) fn new(callback: C) -> Self {
        Self {
            callback,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T, R, C> ErasedCallback for TypedCallback<T, R, C>
where
    T: DeserializeOwned + Send + Sync + 'static,
    R: Serialize + Send + Sync + 'static,
    C: Callback<T, R> + 'static,
{
    async fn run(
        &self,
        meta: &TaskMeta,
        payload: Value,
        bus: &Bus,
    ) -> Result<Value, DispatchError> {
        let input: T = serde_json::from_value(payload).map_err(|e| {
            DispatchError::PayloadMismatch {
                task: meta.name().to_string(),
                error: e.to_string(),
            }
        })?;

        let result = run_stages(&self.callback, meta, input, bus).await?;

        serde_json::to_value(&result).map_err(|e| DispatchError::ResultEncode {
            task: meta.name().to_string(),
            error: e.to_string(),
        })
    }
}

/// Table of registered callbacks keyed by task name.
pub(crate) struct Registry {
    callbacks: RwLock<HashMap<String, Arc<dyn ErasedCallback>>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a callback under `task`; refuses duplicates.
    pub(crate) async fn insert(
        &self,
        task: String,
        callback: Arc<dyn ErasedCallback>,
    ) -> Result<(), DispatchError> {
        let mut callbacks = self.callbacks.write().await;
        if callbacks.contains_key(&task) {
            return Err(DispatchError::AlreadyRegistered { task });
        }
        callbacks.insert(task, callback);
        Ok(())
    }

    /// Looks up the callback registered under `task`.
    pub(crate) async fn get(&self, task: &str) -> Option<Arc<dyn ErasedCallback>> {
        self.callbacks.read().await.get(task).map(Arc::clone)
    }

    /// Removes the callback registered under `task`.
    pub(crate) async fn remove(&self, task: &str) -> bool {
        self.callbacks.write().await.remove(task).is_some()
    }

    /// Returns sorted list of registered task names.
    pub(crate) async fn list(&self) -> Vec<String> {
        let callbacks = self.callbacks.read().await;
        let mut names: Vec<String> = callbacks.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Returns true if no callbacks are registered.
    pub(crate) async fn is_empty(&self) -> bool {
        self.callbacks.read().await.is_empty()
    }
}
