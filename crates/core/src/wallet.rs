//! # Wallet Module
//!
//! Wallets, the append-only transaction ledger and payout requests.
//!
//! A wallet's balance is defined by its ledger: at all times
//! `balance == sum(CREDIT amounts) - sum(DEBIT amounts)`. Amounts use
//! `rust_decimal::Decimal`; the ledger stores unsigned magnitudes with
//! the sign carried by [`TxType`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency assigned to lazily created wallets
pub const DEFAULT_CURRENCY: &str = "IDR";

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxType {
    Credit,
    Debit,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Credit => "CREDIT",
            TxType::Debit => "DEBIT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CREDIT" => Some(TxType::Credit),
            "DEBIT" => Some(TxType::Debit),
            _ => None,
        }
    }

    /// Signed multiplier for ledger sums
    pub fn sign(&self) -> Decimal {
        match self {
            TxType::Credit => Decimal::ONE,
            TxType::Debit => -Decimal::ONE,
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Business category of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxCategory {
    /// Landlord's share of a settled rent invoice
    RentIncome,
    /// Funds reserved when a payout is requested
    PayoutRequest,
    /// Funds returned after a payout rejection
    Refund,
}

impl TxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxCategory::RentIncome => "RENT_INCOME",
            TxCategory::PayoutRequest => "PAYOUT_REQUEST",
            TxCategory::Refund => "REFUND",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RENT_INCOME" => Some(TxCategory::RentIncome),
            "PAYOUT_REQUEST" => Some(TxCategory::PayoutRequest),
            "REFUND" => Some(TxCategory::Refund),
            _ => None,
        }
    }
}

impl fmt::Display for TxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One wallet per user, created lazily on first access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub user_id: String,
    /// Invariant: equals the signed sum of all ledger entries
    pub balance: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Immutable ledger row, owned by its wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: String,
    pub wallet_id: String,
    pub tx_type: TxType,
    pub category: TxCategory,
    /// Unsigned magnitude
    pub amount: Decimal,
    pub description: Option<String>,
    pub reference_id: Option<String>,
    /// Balance snapshot taken after applying this entry
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a payout request.
///
/// `PENDING -> {COMPLETED, REJECTED}`; both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PayoutStatus {
    Pending,
    Completed,
    Rejected,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "PENDING",
            PayoutStatus::Completed => "COMPLETED",
            PayoutStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(PayoutStatus::Pending),
            "COMPLETED" => Some(PayoutStatus::Completed),
            "REJECTED" => Some(PayoutStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PayoutStatus::Pending)
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A withdrawal request. Funds are reserved at request time; an admin
/// decision later completes or rejects it exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub id: String,
    pub wallet_id: String,
    pub amount: Decimal,
    pub bank_name: String,
    pub account_no: String,
    pub account_name: String,
    pub status: PayoutStatus,
    pub notes: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tx_type_sign() {
        assert_eq!(TxType::Credit.sign() * dec!(100), dec!(100));
        assert_eq!(TxType::Debit.sign() * dec!(100), dec!(-100));
    }

    #[test]
    fn test_tx_category_roundtrip() {
        assert_eq!(TxCategory::from_str("RENT_INCOME"), Some(TxCategory::RentIncome));
        assert_eq!(TxCategory::from_str("payout_request"), Some(TxCategory::PayoutRequest));
        assert_eq!(TxCategory::from_str("BONUS"), None);
    }

    #[test]
    fn test_payout_status_terminal() {
        assert!(!PayoutStatus::Pending.is_terminal());
        assert!(PayoutStatus::Completed.is_terminal());
        assert!(PayoutStatus::Rejected.is_terminal());
    }
}
