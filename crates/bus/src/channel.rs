//! In-process event dispatcher
//!
//! The composition root constructs one bus, registers subscribers, then
//! hands it (behind `Arc`) to the producing modules.

use crate::event::DomainEvent;
use crate::subscriber::EventSubscriber;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Event bus distributing domain events to registered subscribers
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Dispatch follows registration order.
    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        info!(subscriber = subscriber.name(), "subscriber registered");
        self.subscribers.push(subscriber);
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Publish an event to every interested subscriber, in registration
    /// order, awaiting each handler in turn.
    ///
    /// Handler errors are logged and swallowed here; the publisher never
    /// observes them.
    pub async fn publish(&self, event: &DomainEvent) {
        let kind = event.kind();
        debug!(event = %kind, "publishing");

        for subscriber in &self.subscribers {
            if !subscriber.interests().contains(&kind) {
                continue;
            }
            if let Err(err) = subscriber.handle(event).await {
                error!(
                    subscriber = subscriber.name(),
                    event = %kind,
                    %err,
                    "subscriber failed; continuing"
                );
            }
        }
    }
}
