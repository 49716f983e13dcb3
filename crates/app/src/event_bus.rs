//! In-process stand-in for the host event bus.

use std::future::Future;

use tokio::sync::broadcast;

use homescene_domain::event::Event;

use crate::ports::EventPublisher;

/// Capacity used by [`InProcessEventBus::default`].
pub const DEFAULT_CAPACITY: usize = 256;

/// Fan-out of [`Event`]s over a tokio [`broadcast`] channel.
///
/// Subscribers only see events published after they subscribed. A subscriber
/// that falls more than `capacity` events behind gets `Lagged` on its next
/// receive; the scene manager treats that as a reason to refresh.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = ()> + Send {
        // only fails without subscribers, and then nobody cares
        if let Err(err) = self.sender.send(event) {
            tracing::trace!(event_type = ?err.0.event_type, "event dropped, no subscriber");
        }
        async {}
    }
}
