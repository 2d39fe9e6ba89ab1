//! Rentverse Trust - reputation scoring engine
//!
//! Consumes domain events (or direct admin calls), looks up configured
//! scoring rules or accepts explicit deltas, mutates a bounded `[0, 100]`
//! score and appends one audit row per mutation - all inside a single
//! database transaction.

pub mod engine;
pub mod error;
pub mod rules;
pub mod subscriber;

pub use engine::{RewardContext, ScoreChange, SkipReason, TrustEngine, TrustOutcome};
pub use error::{TrustError, TrustResult};
pub use rules::RuleStore;
pub use subscriber::TrustSubscriber;
