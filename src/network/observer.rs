// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request observer registry
//!
//! Drivers push every outbound request into an [`ObserverRegistry`]; each
//! consumer holds a [`Subscription`] that receives its own copy over an
//! unbounded channel until it unsubscribes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::event::ObservedRequest;

/// Observer identifier
pub type ObserverId = u64;

/// Something that can hand out request subscriptions
pub trait RequestSource: Send + Sync {
    /// Register a new observer. Requests observed after this call are
    /// delivered to the returned subscription.
    fn subscribe(&self) -> Subscription;
}

#[derive(Default)]
struct Observers {
    next_id: AtomicU64,
    senders: Mutex<HashMap<ObserverId, mpsc::UnboundedSender<ObservedRequest>>>,
}

impl Observers {
    fn remove(&self, id: ObserverId) -> bool {
        self.senders.lock().remove(&id).is_some()
    }
}

/// Fan-out of observed requests to all live subscriptions
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    inner: Arc<Observers>,
}

impl ObserverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a request to every registered observer, returns how many got it
    pub fn emit(&self, request: ObservedRequest) -> usize {
        let mut senders = self.inner.senders.lock();
        senders.retain(|_, tx| tx.send(request.clone()).is_ok());
        senders.len()
    }

    /// Deregister an observer by id; unknown ids are ignored
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.inner.remove(id)
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.inner.senders.lock().len()
    }
}

impl RequestSource for ObserverRegistry {
    fn subscribe(&self) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.senders.lock().insert(id, tx);

        tracing::trace!(observer = id, "Request observer registered");

        Subscription {
            id,
            receiver: rx,
            registry: Arc::downgrade(&self.inner),
            active: true,
        }
    }
}

/// A registered request observer
///
/// Dropping the subscription deregisters it.
pub struct Subscription {
    id: ObserverId,
    receiver: mpsc::UnboundedReceiver<ObservedRequest>,
    registry: Weak<Observers>,
    active: bool,
}

impl Subscription {
    /// Observer id
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Whether the observer is still registered
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Wait for the next observed request
    ///
    /// Returns `None` once unsubscribed or when the source has gone away.
    pub async fn next(&mut self) -> Option<ObservedRequest> {
        if !self.active {
            return None;
        }
        self.receiver.recv().await
    }

    /// Take an already queued request without waiting
    pub fn try_next(&mut self) -> Option<ObservedRequest> {
        if !self.active {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Deregister from the source. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.receiver.close();

        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }

        tracing::trace!(observer = self.id, "Request observer deregistered");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(target: &str) -> ObservedRequest {
        ObservedRequest::new(target, "GET")
    }

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let registry = ObserverRegistry::new();
        let mut first = registry.subscribe();
        let mut second = registry.subscribe();

        assert_eq!(registry.emit(request("https://example.com/a")), 2);

        assert_eq!(first.next().await.unwrap().target(), "https://example.com/a");
        assert_eq!(second.next().await.unwrap().target(), "https://example.com/a");
    }

    #[tokio::test]
    async fn test_arrival_order_preserved() {
        let registry = ObserverRegistry::new();
        let mut sub = registry.subscribe();

        registry.emit(request("https://example.com/1"));
        registry.emit(request("https://example.com/2"));

        assert_eq!(sub.next().await.unwrap().target(), "https://example.com/1");
        assert_eq!(sub.next().await.unwrap().target(), "https://example.com/2");
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let registry = ObserverRegistry::new();
        let mut sub = registry.subscribe();
        assert_eq!(registry.observer_count(), 1);

        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!registry.unsubscribe(sub.id()));

        assert!(!sub.is_active());
        assert_eq!(registry.observer_count(), 0);
        assert_eq!(registry.emit(request("https://example.com/late")), 0);
        assert!(sub.next().await.is_none());
    }

    #[test]
    fn test_drop_deregisters() {
        let registry = ObserverRegistry::new();
        {
            let _sub = registry.subscribe();
            assert_eq!(registry.observer_count(), 1);
        }
        assert_eq!(registry.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_source_dropped_ends_stream() {
        let registry = ObserverRegistry::new();
        let mut sub = registry.subscribe();
        drop(registry);

        assert!(sub.next().await.is_none());
        // Unsubscribing after the registry is gone must not panic
        sub.unsubscribe();
    }
}
