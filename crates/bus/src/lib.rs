//! Rentverse Event Bus - In-process domain event distribution
//!
//! Decouples primary actions (payments, KYC, reviews, admin calls) from
//! their trust/ledger side effects.
//!
//! # Delivery Contract
//! - Synchronous dispatch, registration order, within the publisher's task
//! - At-most-once, non-persistent: a crash between publish and handler
//!   commit loses the side effect
//! - Handler failures are logged and isolated; they never reach siblings
//!   or the publisher
//! - No retry, back-pressure or cross-event ordering; callers needing
//!   at-least-once delivery must use a durable queue instead

pub mod channel;
pub mod error;
pub mod event;
pub mod subscriber;

pub use channel::EventBus;
pub use error::BusError;
pub use event::{DomainEvent, EventKind};
pub use subscriber::EventSubscriber;
