//! Broadcast bus for world events.
//!
//! Fan-out over a tokio broadcast channel. Delivery is best-effort:
//! publishing with no listeners succeeds, and a listener that falls
//! behind is dropped by the channel rather than stalling the publisher.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use super::types::WorldEvent;

/// Channel capacity for broadcast.
const CHANNEL_CAPACITY: usize = 256;

/// Shared reference to an [`EventBus`].
pub type SharedEventBus = Arc<EventBus>;

/// Fan-out hub every simulation component publishes through.
pub struct EventBus {
    sender: broadcast::Sender<WorldEvent>,
}

impl EventBus {
    /// Create a new bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Wrap in a shared handle.
    pub fn shared(self) -> SharedEventBus {
        Arc::new(self)
    }

    /// Publish an event to all current listeners.
    pub fn publish(&self, event: WorldEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(count) => debug!(event_type, receivers = count, "Event published"),
            Err(_) => debug!(event_type, "Event published (no receivers)"),
        }
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<WorldEvent> {
        self.sender.subscribe()
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(WorldEvent::CycleStart {
            cycle_number: 7,
            timestamp: Utc::now(),
        });

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type(), "cycle_start");
    }

    #[tokio::test]
    async fn test_publish_without_listeners_is_ok() {
        let bus = EventBus::new();
        // Must not panic or error with zero receivers.
        bus.publish(WorldEvent::CycleStart {
            cycle_number: 1,
            timestamp: Utc::now(),
        });
        assert_eq!(bus.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_multiple_listeners_each_receive() {
        let bus = EventBus::new().shared();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.listener_count(), 2);

        bus.publish(WorldEvent::UserPresence {
            user_id: "u-1".to_string(),
            action: "joined".to_string(),
            username: Some("wanderer".to_string()),
            timestamp: Utc::now(),
        });

        assert_eq!(rx1.recv().await.unwrap().event_type(), "user_presence");
        assert_eq!(rx2.recv().await.unwrap().event_type(), "user_presence");
    }

    #[tokio::test]
    async fn test_dropped_listener_does_not_block_publisher() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        drop(rx);
        bus.publish(WorldEvent::CycleStart {
            cycle_number: 2,
            timestamp: Utc::now(),
        });
        assert_eq!(bus.listener_count(), 0);
    }
}
