use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::core::registry::Registry;
use crate::core::{Config, Dispatcher};
use crate::events::Bus;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a Dispatcher with optional subscribers.
pub struct DispatcherBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive dispatch events (lifecycle, failures,
    /// registration changes) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the Dispatcher instance.
    ///
    /// This consumes the builder and initializes the runtime components:
    /// - Event bus for broadcasting
    /// - Callback registry for name-addressed dispatch
    /// - Subscriber workers and the bus listener feeding them
    ///
    /// Must be called from within a Tokio runtime when subscribers are
    /// configured (the listener and workers are spawned here).
    pub fn build(self) -> Dispatcher {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let (subscribers, listener) = if self.subscribers.is_empty() {
            (None, None)
        } else {
            let set = Arc::new(SubscriberSet::new(self.subscribers));
            let listener = spawn_listener(&bus, Arc::clone(&set));
            (Some(set), Some(listener))
        };

        Dispatcher {
            cfg: self.cfg,
            bus,
            registry: Registry::new(),
            subscribers,
            listener,
        }
    }
}

/// Forwards bus events to the subscriber set until the bus closes.
fn spawn_listener(bus: &Bus, subscribers: Arc<SubscriberSet>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => subscribers.emit(&ev),
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(_)) => continue,
            }
        }
    })
}
