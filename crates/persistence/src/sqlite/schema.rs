//! Database schema definitions
//!
//! Row types for sqlx mapping from the SQLite tables defined in
//! `migrations/20260829000001_init.sql`. Monetary values are stored as
//! TEXT and parsed into `rust_decimal::Decimal` on conversion; scores
//! are REAL.

use crate::error::PersistenceError;
use chrono::{DateTime, Utc};
use rentverse_core::{
    KycStatus, PayoutRequest, PayoutStatus, Role, SourceType, TrustLogEntry, TrustProfile,
    TrustRule, TxCategory, TxType, Wallet, WalletTransaction,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Row type for the `trust_profiles` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TrustProfileRow {
    pub user_id: String,
    pub role: String,
    pub score: f64,
    pub kyc_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row type for the `trust_rules` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TrustRuleRow {
    pub code: String,
    pub role: Option<String>,
    pub category: String,
    pub base_impact: f64,
    pub is_active: bool,
    pub description: String,
}

/// Row type for the `trust_logs` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TrustLogRow {
    pub id: String,
    pub user_id: String,
    pub role: String,
    pub event_code: String,
    pub impact: f64,
    pub score_snapshot: f64,
    pub description: String,
    pub actor: String,
    pub source_type: String,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row type for the `wallets` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct WalletRow {
    pub id: String,
    pub user_id: String,
    pub balance: String, // Decimal stored as TEXT
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Row type for the `wallet_transactions` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct WalletTransactionRow {
    pub id: String,
    pub wallet_id: String,
    pub tx_type: String,
    pub category: String,
    pub amount: String,        // Decimal stored as TEXT
    pub description: Option<String>,
    pub reference_id: Option<String>,
    pub balance_after: String, // Decimal stored as TEXT
    pub created_at: DateTime<Utc>,
}

/// Row type for the `payout_requests` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PayoutRequestRow {
    pub id: String,
    pub wallet_id: String,
    pub amount: String, // Decimal stored as TEXT
    pub bank_name: String,
    pub account_no: String,
    pub account_name: String,
    pub status: String,
    pub notes: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// === Conversion helpers ===

fn parse_role(value: &str) -> Result<Role, PersistenceError> {
    Role::from_str(value).ok_or_else(|| PersistenceError::invalid_enum("role", value))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, PersistenceError> {
    Decimal::from_str(value)
        .map_err(|_| PersistenceError::InvalidDecimal(format!("{field} = {value}")))
}

impl TryFrom<TrustProfileRow> for TrustProfile {
    type Error = PersistenceError;

    fn try_from(row: TrustProfileRow) -> Result<Self, Self::Error> {
        Ok(TrustProfile {
            role: parse_role(&row.role)?,
            kyc_status: KycStatus::from_str(&row.kyc_status)
                .ok_or_else(|| PersistenceError::invalid_enum("kyc_status", &row.kyc_status))?,
            user_id: row.user_id,
            score: row.score,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<TrustRuleRow> for TrustRule {
    type Error = PersistenceError;

    fn try_from(row: TrustRuleRow) -> Result<Self, Self::Error> {
        let role = match row.role.as_deref() {
            Some(raw) => Some(parse_role(raw)?),
            None => None,
        };
        Ok(TrustRule {
            role,
            code: row.code,
            category: row.category,
            base_impact: row.base_impact,
            is_active: row.is_active,
            description: row.description,
        })
    }
}

impl TryFrom<TrustLogRow> for TrustLogEntry {
    type Error = PersistenceError;

    fn try_from(row: TrustLogRow) -> Result<Self, Self::Error> {
        Ok(TrustLogEntry {
            role: parse_role(&row.role)?,
            source_type: SourceType::from_str(&row.source_type)
                .ok_or_else(|| PersistenceError::invalid_enum("source_type", &row.source_type))?,
            id: row.id,
            user_id: row.user_id,
            event_code: row.event_code,
            impact: row.impact,
            score_snapshot: row.score_snapshot,
            description: row.description,
            actor: row.actor,
            reference_id: row.reference_id,
            reference_type: row.reference_type,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<WalletRow> for Wallet {
    type Error = PersistenceError;

    fn try_from(row: WalletRow) -> Result<Self, Self::Error> {
        Ok(Wallet {
            balance: parse_decimal("balance", &row.balance)?,
            id: row.id,
            user_id: row.user_id,
            currency: row.currency,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<WalletTransactionRow> for WalletTransaction {
    type Error = PersistenceError;

    fn try_from(row: WalletTransactionRow) -> Result<Self, Self::Error> {
        Ok(WalletTransaction {
            tx_type: TxType::from_str(&row.tx_type)
                .ok_or_else(|| PersistenceError::invalid_enum("tx_type", &row.tx_type))?,
            category: TxCategory::from_str(&row.category)
                .ok_or_else(|| PersistenceError::invalid_enum("category", &row.category))?,
            amount: parse_decimal("amount", &row.amount)?,
            balance_after: parse_decimal("balance_after", &row.balance_after)?,
            id: row.id,
            wallet_id: row.wallet_id,
            description: row.description,
            reference_id: row.reference_id,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<PayoutRequestRow> for PayoutRequest {
    type Error = PersistenceError;

    fn try_from(row: PayoutRequestRow) -> Result<Self, Self::Error> {
        Ok(PayoutRequest {
            status: PayoutStatus::from_str(&row.status)
                .ok_or_else(|| PersistenceError::invalid_enum("status", &row.status))?,
            amount: parse_decimal("amount", &row.amount)?,
            id: row.id,
            wallet_id: row.wallet_id,
            bank_name: row.bank_name,
            account_no: row.account_no,
            account_name: row.account_name,
            notes: row.notes,
            processed_at: row.processed_at,
            created_at: row.created_at,
        })
    }
}
