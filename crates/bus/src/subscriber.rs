//! Event subscriber trait

use crate::error::BusError;
use crate::event::{DomainEvent, EventKind};
use async_trait::async_trait;

/// Trait for event subscribers.
///
/// Subscribers declare the event kinds they care about and receive each
/// matching published event. The bus gives no deduplication: a handler
/// called twice for the same business fact will apply its side effect
/// twice, so publishers with retry semantics must deduplicate upstream.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Subscriber name (for logging)
    fn name(&self) -> &str;

    /// Event kinds this subscriber handles
    fn interests(&self) -> &[EventKind];

    /// Handle one published event.
    ///
    /// An `Err` is logged by the bus and isolated; it does not affect
    /// sibling subscribers or the publisher.
    async fn handle(&self, event: &DomainEvent) -> Result<(), BusError>;
}
