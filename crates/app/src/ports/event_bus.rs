//! Event bus port — publish/subscribe for bus events.

use std::future::Future;

use homescene_domain::event::Event;

/// Publishes events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = ()> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = ()> + Send {
        (**self).publish(event)
    }
}
