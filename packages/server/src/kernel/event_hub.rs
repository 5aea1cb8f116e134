//! In-process broadcast hub for walk lifecycle events.
//!
//! Activities publish after their transaction commits; subscribers (the
//! notification dispatcher, tests) each get every event. Publishing never
//! fails the caller.
//!
//! # Usage
//!
//! Producers (domain activities):
//!   deps.events.publish(WalkEvent::WalkStarted { .. });
//!
//! Consumers:
//!   let mut rx = deps.events.subscribe();

use tokio::sync::broadcast;
use tracing::debug;

use crate::domains::walks::events::WalkEvent;

/// Cloneable handle; all clones share one channel.
#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<WalkEvent>,
}

impl EventHub {
    /// Create a new EventHub with default capacity (256 events).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// No-op if nobody is subscribed.
    pub fn publish(&self, event: WalkEvent) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            debug!(event = name, "No event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WalkEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
