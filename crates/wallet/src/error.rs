//! Wallet ledger errors

use rentverse_core::PayoutStatus;
use rentverse_persistence::PersistenceError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from the wallet ledger
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Wallet not found for user: {0}")]
    WalletNotFound(String),

    #[error("Payout request not found: {0}")]
    PayoutNotFound(String),

    #[error("Insufficient wallet balance: need {needed}, available {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    #[error("Payout request is already processed: {0}")]
    AlreadyProcessed(PayoutStatus),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for WalletError
pub type WalletResult<T> = Result<T, WalletError>;

impl WalletError {
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, Self::InsufficientBalance { .. })
    }

    pub fn is_already_processed(&self) -> bool {
        matches!(self, Self::AlreadyProcessed(_))
    }
}
