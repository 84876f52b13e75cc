use crate::application::error::ApplicationError;
use crate::application::waiter::{waiter_pair, PendingResponse, Waiter};
use crate::domain::consumer::Consumer;
use crate::domain::producer::Producer;
use crate::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum WaiterKey {
    Id(u32),
    Name(String),
}

impl std::fmt::Display for WaiterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaiterKey::Id(id) => write!(f, "correlation id {}", id),
            WaiterKey::Name(name) => write!(f, "waiter '{}'", name),
        }
    }
}

/// Registry matching responses to pending requests, and publisher/subscription ids to their
/// live state. Shared between the read loop and request-issuing call sites.
#[derive(Debug, Default)]
pub struct Coordinator {
    next_correlation_id: AtomicU32,
    responses: Mutex<HashMap<WaiterKey, Waiter>>,
    producers: Mutex<HashMap<u8, Arc<Producer>>>,
    consumers: Mutex<HashMap<u8, Arc<Consumer>>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next correlation id for a request; starts at 1 and wraps around.
    pub fn next_correlation_id(&self) -> u32 {
        self.next_correlation_id
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1)
    }

    pub fn register_by_id(&self, id: u32) -> Result<PendingResponse> {
        self.register(WaiterKey::Id(id))
    }

    pub fn register_by_name(&self, name: &str) -> Result<PendingResponse> {
        self.register(WaiterKey::Name(name.to_string()))
    }

    fn register(&self, key: WaiterKey) -> Result<PendingResponse> {
        let mut responses = self.responses.lock();
        if responses.contains_key(&key) {
            return Err(ApplicationError::AlreadyRegistered(key.to_string()));
        }
        let (waiter, pending) = waiter_pair(key.to_string());
        responses.insert(key, waiter);
        Ok(pending)
    }

    /// Hands the waiter for `id` to the handler completing it. The entry leaves the registry,
    /// so a second response for the same id gets `NotFound`.
    pub fn take_response_by_id(&self, id: u32) -> Result<Waiter> {
        self.take(WaiterKey::Id(id))
    }

    pub fn take_response_by_name(&self, name: &str) -> Result<Waiter> {
        self.take(WaiterKey::Name(name.to_string()))
    }

    fn take(&self, key: WaiterKey) -> Result<Waiter> {
        self.responses
            .lock()
            .remove(&key)
            .ok_or_else(|| ApplicationError::NotFound(key.to_string()))
    }

    /// Drops a waiter the call site gave up on. Returns whether it was still registered.
    pub fn remove_response_by_id(&self, id: u32) -> bool {
        self.responses.lock().remove(&WaiterKey::Id(id)).is_some()
    }

    pub fn remove_response_by_name(&self, name: &str) -> bool {
        self.responses
            .lock()
            .remove(&WaiterKey::Name(name.to_string()))
            .is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.responses.lock().len()
    }

    pub fn register_producer(&self, producer: Arc<Producer>) -> Result<()> {
        let mut producers = self.producers.lock();
        if producers.contains_key(&producer.id()) {
            return Err(ApplicationError::AlreadyRegistered(format!(
                "producer {}",
                producer.id()
            )));
        }
        producers.insert(producer.id(), producer);
        Ok(())
    }

    pub fn get_producer_by_id(&self, id: u8) -> Result<Arc<Producer>> {
        self.producers
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| ApplicationError::NotFound(format!("producer {}", id)))
    }

    pub fn remove_producer(&self, id: u8) -> Option<Arc<Producer>> {
        self.producers.lock().remove(&id)
    }

    pub fn register_consumer(&self, consumer: Arc<Consumer>) -> Result<()> {
        let mut consumers = self.consumers.lock();
        if consumers.contains_key(&consumer.id()) {
            return Err(ApplicationError::AlreadyRegistered(format!(
                "consumer {}",
                consumer.id()
            )));
        }
        consumers.insert(consumer.id(), consumer);
        Ok(())
    }

    pub fn get_consumer_by_id(&self, id: u8) -> Result<Arc<Consumer>> {
        self.consumers
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| ApplicationError::NotFound(format!("consumer {}", id)))
    }

    pub fn remove_consumer(&self, id: u8) -> Option<Arc<Consumer>> {
        self.consumers.lock().remove(&id)
    }
}
