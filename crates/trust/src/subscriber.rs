//! Trust module event subscriber
//!
//! Registers the trust side effects for the domain event catalogue.
//! Errors bubble to the bus boundary where they are logged and isolated.

use crate::engine::{RewardContext, TrustEngine};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rentverse_bus::{BusError, DomainEvent, EventKind, EventSubscriber};
use rentverse_core::{KycStatus, Role};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Replies within this window count as fast responses
const FAST_RESPONSE_WINDOW_MINUTES: i64 = 30;

const INTERESTS: [EventKind; 7] = [
    EventKind::UserRegistered,
    EventKind::PaymentPaid,
    EventKind::KycVerified,
    EventKind::KycRejected,
    EventKind::TrustScoreAdjusted,
    EventKind::ReviewCreated,
    EventKind::ChatMessageSent,
];

struct RoomMessage {
    sender_id: String,
    at: DateTime<Utc>,
}

/// Last message per chat room, for the fast-response heuristic.
/// In-memory and best-effort, like the bus itself. Rooms whose last
/// message fell out of the window are evicted on every observation, so
/// the map is bounded by the rooms active within one window.
#[derive(Default)]
struct ResponseTracker {
    rooms: Mutex<HashMap<String, RoomMessage>>,
}

impl ResponseTracker {
    /// Record the message and report whether it is a reply to another
    /// participant within the fast-response window.
    fn observe(&self, room_id: &str, sender_id: &str, at: DateTime<Utc>) -> bool {
        let window = Duration::minutes(FAST_RESPONSE_WINDOW_MINUTES);
        let mut rooms = self.rooms.lock().unwrap();
        rooms.retain(|_, last| at - last.at <= window);

        let previous = rooms.insert(
            room_id.to_string(),
            RoomMessage {
                sender_id: sender_id.to_string(),
                at,
            },
        );

        match previous {
            Some(prev) if prev.sender_id != sender_id => at - prev.at <= window,
            _ => false,
        }
    }
}

/// Subscriber wiring domain events into the trust engine
pub struct TrustSubscriber {
    engine: Arc<TrustEngine>,
    responses: ResponseTracker,
}

impl TrustSubscriber {
    pub fn new(engine: Arc<TrustEngine>) -> Self {
        Self {
            engine,
            responses: ResponseTracker::default(),
        }
    }
}

#[async_trait]
impl EventSubscriber for TrustSubscriber {
    fn name(&self) -> &str {
        "trust"
    }

    fn interests(&self) -> &[EventKind] {
        &INTERESTS
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), BusError> {
        match event {
            DomainEvent::UserRegistered { user_id, role } => {
                self.engine
                    .initialize_profile(user_id, *role)
                    .await
                    .map_err(BusError::handler)?;
            }

            DomainEvent::PaymentPaid {
                invoice_id,
                tenant_id,
                ..
            } => {
                // Lateness is judged by the billing collaborator; a PAID
                // event reaching the bus is an on-time settlement.
                self.engine
                    .apply_system_reward(
                        tenant_id,
                        Role::Tenant,
                        "PAYMENT_ON_TIME",
                        RewardContext::default().with_reference(invoice_id.clone(), "INVOICE"),
                    )
                    .await
                    .map_err(BusError::handler)?;
            }

            DomainEvent::KycVerified { user_id, role, .. } => {
                self.engine
                    .set_kyc_status(user_id, *role, KycStatus::Verified)
                    .await
                    .map_err(BusError::handler)?;
                self.engine
                    .apply_system_reward(user_id, *role, "KYC_VERIFIED", RewardContext::default())
                    .await
                    .map_err(BusError::handler)?;
            }

            DomainEvent::KycRejected {
                user_id,
                role,
                reason,
                ..
            } => {
                self.engine
                    .set_kyc_status(user_id, *role, KycStatus::Rejected)
                    .await
                    .map_err(BusError::handler)?;
                // Penalty rule is optional configuration; unseeded codes
                // skip harmlessly.
                self.engine
                    .apply_system_reward(
                        user_id,
                        *role,
                        "KYC_REJECTED",
                        RewardContext::default().with_description(reason.clone()),
                    )
                    .await
                    .map_err(BusError::handler)?;
            }

            DomainEvent::TrustScoreAdjusted {
                admin_id,
                user_id,
                role,
                score_delta,
                reason,
            } => {
                self.engine
                    .apply_manual_adjustment(admin_id, user_id, *role, *score_delta, reason)
                    .await
                    .map_err(BusError::handler)?;
            }

            DomainEvent::ReviewCreated {
                review_id,
                reviewer_id,
                receiver_id,
                role,
                rating,
                ..
            } => {
                self.engine
                    .apply_review(review_id, reviewer_id, receiver_id, *role, *rating)
                    .await
                    .map_err(BusError::handler)?;
            }

            DomainEvent::ChatMessageSent {
                room_id,
                sender_id,
                created_at,
                ..
            } => {
                if !self.responses.observe(room_id, sender_id, *created_at) {
                    return Ok(());
                }
                // Only landlords are scored on responsiveness; tenants
                // replying fast is not a catalogued behavior.
                let has_landlord_profile = self
                    .engine
                    .profile(sender_id, Role::Landlord)
                    .await
                    .map_err(BusError::handler)?
                    .is_some();
                if !has_landlord_profile {
                    debug!(%sender_id, "fast reply from non-landlord; ignoring");
                    return Ok(());
                }
                self.engine
                    .apply_system_reward(
                        sender_id,
                        Role::Landlord,
                        "COMM_FAST_RESPONSE",
                        RewardContext::default().with_reference(room_id.clone(), "CHAT_ROOM"),
                    )
                    .await
                    .map_err(BusError::handler)?;
            }
        }

        Ok(())
    }
}
