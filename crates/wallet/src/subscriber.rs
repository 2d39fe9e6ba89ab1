//! Finance module event subscriber
//!
//! Listens for settled payments and credits the landlord's share. The
//! booking-to-landlord mapping belongs to the booking module, so it is
//! injected behind a trait.

use crate::service::WalletService;
use async_trait::async_trait;
use rentverse_bus::{BusError, DomainEvent, EventKind, EventSubscriber};
use tracing::error;

/// Seam to the booking module: resolves which landlord owns the property
/// behind a booking.
#[async_trait]
pub trait BookingDirectory: Send + Sync {
    async fn landlord_for_booking(&self, booking_id: &str) -> anyhow::Result<Option<String>>;
}

const INTERESTS: [EventKind; 1] = [EventKind::PaymentPaid];

/// Subscriber wiring payment settlements into the wallet ledger
pub struct FinanceSubscriber {
    service: WalletService,
    bookings: std::sync::Arc<dyn BookingDirectory>,
}

impl FinanceSubscriber {
    pub fn new(service: WalletService, bookings: std::sync::Arc<dyn BookingDirectory>) -> Self {
        Self { service, bookings }
    }
}

#[async_trait]
impl EventSubscriber for FinanceSubscriber {
    fn name(&self) -> &str {
        "finance"
    }

    fn interests(&self) -> &[EventKind] {
        &INTERESTS
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), BusError> {
        let DomainEvent::PaymentPaid {
            invoice_id,
            booking_id,
            amount,
            ..
        } = event
        else {
            return Ok(());
        };

        let landlord_id = self
            .bookings
            .landlord_for_booking(booking_id)
            .await
            .map_err(BusError::handler)?;

        let Some(landlord_id) = landlord_id else {
            // Data inconsistency upstream; nothing to credit
            error!(%booking_id, %invoice_id, "booking not found; cannot process rent split");
            return Ok(());
        };

        self.service
            .process_rent_split(invoice_id, *amount, &landlord_id)
            .await
            .map_err(BusError::handler)?;

        Ok(())
    }
}
