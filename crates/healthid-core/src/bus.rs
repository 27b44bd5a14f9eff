//! Event bus with named topics.
//!
//! Used by registration-form steps to react to out-of-band saves (e.g.
//! link an identity once the parent patient record exists). Subscriptions
//! are explicit handles: re-subscribing or dropping the handle removes the
//! previous handler, so a subscriber never has two live closures on the
//! same topic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use serde_json::Value;
use tracing::debug;

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    topics: HashMap<String, Vec<(u64, Handler)>>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a topic and returns its handle. Dropping
    /// the handle unsubscribes.
    pub fn subscribe<F>(&self, topic: &str, handler: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .topics
            .entry(topic.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        Subscription {
            bus: Arc::downgrade(&self.inner),
            topic: topic.to_string(),
            id,
        }
    }

    /// Delivers the payload to every current subscriber of the topic.
    /// Returns how many handlers were invoked. Handlers run outside the
    /// bus lock so they may publish or subscribe themselves.
    pub fn publish(&self, topic: &str, payload: &Value) -> usize {
        let handlers: Vec<Handler> = {
            let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner
                .topics
                .get(topic)
                .map(|subs| subs.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };
        debug!(topic, subscribers = handlers.len(), "publishing event");
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }
}

/// Handle owning one subscription. `resubscribe` swaps the handler in
/// place of the old one; dropping removes it.
pub struct Subscription {
    bus: Weak<Mutex<BusInner>>,
    topic: String,
    id: u64,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn remove(&self) {
        if let Some(bus) = self.bus.upgrade() {
            let mut inner = bus.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(subs) = inner.topics.get_mut(&self.topic) {
                subs.retain(|(id, _)| *id != self.id);
            }
        }
    }

    /// Replaces this subscription's handler with a new closure (same
    /// topic). The old handler is removed before the new one registers, so
    /// at most one handler per handle is ever live.
    pub fn resubscribe<F>(&mut self, handler: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        if let Some(bus) = self.bus.upgrade() {
            self.remove();
            let mut inner = bus.lock().unwrap_or_else(|e| e.into_inner());
            let id = inner.next_id;
            inner.next_id += 1;
            inner
                .topics
                .entry(self.topic.clone())
                .or_default()
                .push((id, Arc::new(handler)));
            self.id = id;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}
