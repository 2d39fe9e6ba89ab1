//! # Rentverse Core
//!
//! Domain types for the trust scoring and wallet ledger core.
//!
//! This crate carries no I/O: profiles, rules, log entries, wallets,
//! transactions and payout requests are plain data, mutated only by the
//! `rentverse-trust` and `rentverse-wallet` services.

pub mod trust;
pub mod wallet;

pub use trust::{
    clamp_score, rating_delta, KycStatus, Role, SourceType, TrustLogEntry, TrustProfile,
    TrustRule, INITIAL_SCORE, SCORE_MAX, SCORE_MIN, SYSTEM_ACTOR,
};
pub use wallet::{
    PayoutRequest, PayoutStatus, TxCategory, TxType, Wallet, WalletTransaction,
    DEFAULT_CURRENCY,
};
