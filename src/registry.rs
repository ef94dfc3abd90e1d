//! Per-thread subscriber registry.
//!
//! Each live connection registers an unbounded sender; the channel gives
//! per-connection FIFO delivery without letting a slow consumer stall the
//! broadcaster. Delivery failure means the receiving side is gone: the
//! failure is logged and the connection dropped from future broadcasts,
//! never propagated out of `broadcast`.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::notify::UiNotification;

pub type ConnectionId = String;
pub type DeliverySender = mpsc::UnboundedSender<UiNotification>;

#[derive(Default)]
pub struct SubscriberRegistry {
    connections: HashMap<ConnectionId, DeliverySender>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. Re-subscribing with the same id replaces
    /// the previous sender.
    pub fn subscribe(&mut self, connection_id: impl Into<ConnectionId>, sender: DeliverySender) {
        let connection_id = connection_id.into();
        debug!(connection_id = %connection_id, "subscriber registered");
        self.connections.insert(connection_id, sender);
    }

    /// Remove a connection. No-op if it was never registered.
    pub fn unsubscribe(&mut self, connection_id: &str) {
        if self.connections.remove(connection_id).is_some() {
            debug!(connection_id = %connection_id, "subscriber removed");
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Deliver a notification to every registered connection. Dead
    /// connections are removed and do not affect delivery to the rest.
    pub fn broadcast(&mut self, notification: &UiNotification) {
        let mut dead = Vec::new();
        for (connection_id, sender) in &self.connections {
            if sender.send(notification.clone()).is_err() {
                warn!(connection_id = %connection_id, "delivery failed, dropping connection");
                dead.push(connection_id.clone());
            }
        }
        for connection_id in dead {
            self.connections.remove(&connection_id);
        }
    }

    pub fn broadcast_all(&mut self, notifications: &[UiNotification]) {
        for notification in notifications {
            self.broadcast(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{target, UiNotification};

    fn status_note() -> UiNotification {
        UiNotification::clear(target::CHAT_STATUS)
    }

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let mut registry = SubscriberRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.subscribe("a", tx_a);
        registry.subscribe("b", tx_b);

        registry.broadcast(&status_note());

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn dead_subscriber_does_not_block_the_others() {
        let mut registry = SubscriberRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        let (tx_c, mut rx_c) = mpsc::unbounded_channel();
        registry.subscribe("a", tx_a);
        registry.subscribe("b", tx_b);
        registry.subscribe("c", tx_c);
        drop(rx_b);

        registry.broadcast(&status_note());

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_c.try_recv().is_ok());
        // The dead connection is gone from future broadcasts.
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn resubscribe_replaces_the_previous_sender() {
        let mut registry = SubscriberRegistry::new();
        let (tx_old, mut rx_old) = mpsc::unbounded_channel();
        let (tx_new, mut rx_new) = mpsc::unbounded_channel();
        registry.subscribe("a", tx_old);
        registry.subscribe("a", tx_new);

        registry.broadcast(&status_note());

        assert!(rx_old.try_recv().is_err());
        assert!(rx_new.try_recv().is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let mut registry = SubscriberRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.subscribe("a", tx);
        registry.unsubscribe("a");
        registry.unsubscribe("a");
        registry.unsubscribe("never-registered");
        assert!(registry.is_empty());
    }
}
