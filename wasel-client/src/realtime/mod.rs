//! Realtime change feed
//!
//! Row-change events for subscribed tables. Consumers get a
//! [`ChangeSubscription`] that yields only their table's events.

mod frame;
mod socket;

pub use frame::{Frame, HEARTBEAT_TOPIC};
pub use socket::{RealtimeSocket, SocketStatus};

use shared::ChangeEvent;
use tokio::sync::broadcast;

/// Events buffered per subscriber before it starts lagging
pub const FEED_CAPACITY: usize = 256;

/// Source of row-change events
pub trait ChangeFeed: Send + Sync {
    /// Subscribe to change events of `table`
    fn subscribe(&self, table: &str) -> ChangeSubscription;
}

/// Per-table receiver
pub struct ChangeSubscription {
    table: String,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    pub fn new(table: impl Into<String>, rx: broadcast::Receiver<ChangeEvent>) -> Self {
        Self {
            table: table.into(),
            rx,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Next event for this table; `None` once the feed is gone
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.table == self.table => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(table = %self.table, "change feed lagged {n} events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// In-process change feed
#[derive(Debug, Clone)]
pub struct MemoryChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Publish an event, returns the number of receivers reached
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl ChangeFeed for MemoryChangeFeed {
    fn subscribe(&self, table: &str) -> ChangeSubscription {
        ChangeSubscription::new(table, self.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscription_filters_by_table() {
        let feed = MemoryChangeFeed::new();
        let mut sub = feed.subscribe("shipments");
        assert_eq!(feed.receiver_count(), 1);

        feed.publish(ChangeEvent::insert("delegates", json!({"id": "d-1"})));
        feed.publish(ChangeEvent::insert("shipments", json!({"id": "s-1"})));

        let event = sub.recv().await.unwrap();
        assert_eq!(event.field_str("id"), Some("s-1"));

        drop(feed);
        assert!(sub.recv().await.is_none());
    }
}
