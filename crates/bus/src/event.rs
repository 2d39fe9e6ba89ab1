//! Domain events - the closed catalogue of things modules publish
//!
//! One variant per event name, so handlers pattern-match into a
//! statically known payload shape. Adding an event is a compile-time
//! checked change.

use chrono::{DateTime, Utc};
use rentverse_core::Role;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload-free discriminant, used for subscription filtering.
///
/// `as_str` yields the wire name other modules know the event by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    UserRegistered,
    PaymentPaid,
    KycVerified,
    KycRejected,
    TrustScoreAdjusted,
    ReviewCreated,
    ChatMessageSent,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UserRegistered => "AUTH:USER_REGISTERED",
            EventKind::PaymentPaid => "PAYMENT:PAID",
            EventKind::KycVerified => "KYC:VERIFIED",
            EventKind::KycRejected => "KYC:REJECTED",
            EventKind::TrustScoreAdjusted => "ADMIN:TRUST_SCORE_ADJUSTED",
            EventKind::ReviewCreated => "REVIEW:CREATED",
            EventKind::ChatMessageSent => "CHAT:MESSAGE_SENT",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events published by the producing modules (auth, payment, KYC,
/// admin, review, chat).
///
/// The core validates shape only, never the publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A user registered under a marketplace role
    UserRegistered { user_id: String, role: Role },

    /// A rent invoice was settled
    PaymentPaid {
        invoice_id: String,
        booking_id: String,
        tenant_id: String,
        amount: Decimal,
    },

    /// Identity verification passed
    KycVerified {
        user_id: String,
        role: Role,
        admin_id: String,
    },

    /// Identity verification failed
    KycRejected {
        user_id: String,
        role: Role,
        admin_id: String,
        reason: String,
    },

    /// Admin governance adjustment of a trust score
    TrustScoreAdjusted {
        admin_id: String,
        user_id: String,
        role: Role,
        score_delta: f64,
        reason: String,
    },

    /// A review was submitted; `role` is the reviewer's role
    ReviewCreated {
        review_id: String,
        booking_id: String,
        reviewer_id: String,
        receiver_id: String,
        role: Role,
        rating: u8,
    },

    /// A chat message was sent (consumed only for the fast-response
    /// heuristic; transport is out of scope)
    ChatMessageSent {
        room_id: String,
        sender_id: String,
        content: String,
        created_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::UserRegistered { .. } => EventKind::UserRegistered,
            DomainEvent::PaymentPaid { .. } => EventKind::PaymentPaid,
            DomainEvent::KycVerified { .. } => EventKind::KycVerified,
            DomainEvent::KycRejected { .. } => EventKind::KycRejected,
            DomainEvent::TrustScoreAdjusted { .. } => EventKind::TrustScoreAdjusted,
            DomainEvent::ReviewCreated { .. } => EventKind::ReviewCreated,
            DomainEvent::ChatMessageSent { .. } => EventKind::ChatMessageSent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(EventKind::UserRegistered.as_str(), "AUTH:USER_REGISTERED");
        assert_eq!(EventKind::PaymentPaid.as_str(), "PAYMENT:PAID");
        assert_eq!(EventKind::TrustScoreAdjusted.as_str(), "ADMIN:TRUST_SCORE_ADJUSTED");
    }

    #[test]
    fn test_event_kind_mapping() {
        let event = DomainEvent::UserRegistered {
            user_id: "user-1".to_string(),
            role: Role::Tenant,
        };
        assert_eq!(event.kind(), EventKind::UserRegistered);
    }

    #[test]
    fn test_event_json_round_trip() {
        let event = DomainEvent::PaymentPaid {
            invoice_id: "inv-1".to_string(),
            booking_id: "book-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            amount: Decimal::new(1_000_000, 0),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("PaymentPaid"));
        assert!(json.contains("inv-1"));

        let back: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), EventKind::PaymentPaid);
    }
}
