//! Bounded-buffer publish/subscribe hub for status events.
//!
//! Every committed state change is delivered to every live subscriber.
//! Each subscriber owns a bounded channel; a subscriber whose buffer is
//! full or whose receiver is gone is dropped from the hub on the spot,
//! so one slow consumer can never stall delivery to the others.
//!
//! Thread-safe via interior `RwLock`; designed to be wrapped in `Arc`
//! and shared across the application.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use crate::event::StatusEvent;

/// Opaque handle identifying one subscription.
pub type SubscriberId = uuid::Uuid;

/// Default per-subscriber buffer capacity.
const DEFAULT_CAPACITY: usize = 64;

/// Fan-out hub for [`StatusEvent`]s.
///
/// Subscribers receive every event published after they subscribe; there
/// is no backfill (durable history is served separately). The hub holds
/// no delivery guarantee for subscribers that disconnect mid-stream.
pub struct EventHub {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<StatusEvent>>>,
    capacity: usize,
}

impl EventHub {
    /// Create a hub with the default per-subscriber buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a hub with a specific per-subscriber buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Register a new subscriber.
    ///
    /// Returns the subscription handle and the receiver half of the
    /// subscriber's bounded channel.
    pub async fn subscribe(&self) -> (SubscriberId, mpsc::Receiver<StatusEvent>) {
        let id = uuid::Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscribers.write().await.insert(id, tx);
        tracing::debug!(subscriber_id = %id, "Subscriber registered");
        (id, rx)
    }

    /// Remove a subscriber. Idempotent; safe to call concurrently with
    /// an in-flight publish.
    pub async fn unsubscribe(&self, id: SubscriberId) {
        if self.subscribers.write().await.remove(&id).is_some() {
            tracing::debug!(subscriber_id = %id, "Subscriber removed");
        }
    }

    /// Deliver an event to every current subscriber.
    ///
    /// Never blocks on a subscriber: delivery uses `try_send`, and any
    /// subscriber whose buffer is full or whose receiver is gone is
    /// dropped. Individual failures are logged, never propagated.
    pub async fn publish(&self, event: StatusEvent) {
        let mut dead = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            for (id, tx) in subscribers.iter() {
                match tx.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(
                            subscriber_id = %id,
                            unit_id = %event.unit_id,
                            "Subscriber buffer full, dropping subscriber",
                        );
                        dead.push(*id);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        tracing::debug!(subscriber_id = %id, "Subscriber channel closed");
                        dead.push(*id);
                    }
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in dead {
                subscribers.remove(&id);
            }
        }
    }

    /// Current number of live subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Drop every subscription, closing all channels.
    ///
    /// Used during graceful shutdown so receivers observe end-of-stream
    /// instead of hanging.
    pub async fn shutdown(&self) {
        let mut subscribers = self.subscribers.write().await;
        let count = subscribers.len();
        subscribers.clear();
        tracing::info!(count, "Closed all event subscriptions");
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
