//! Wallet service - rent splits and the payout workflow
//!
//! Each operation is one transaction: balance write, ledger row and (for
//! payouts) the request row commit or roll back together.

use crate::error::{WalletError, WalletResult};
use chrono::Utc;
use rentverse_core::{
    PayoutRequest, PayoutStatus, TxCategory, TxType, Wallet, WalletTransaction,
    DEFAULT_CURRENCY,
};
use rentverse_persistence::{
    PayoutRepo, PayoutRequestRow, WalletRepo, WalletRow, WalletTransactionRepo,
    WalletTransactionRow,
};
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

/// Platform share of every settled rent invoice (0.05 = 5%)
pub const PLATFORM_FEE_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Input for a payout request
#[derive(Debug, Clone)]
pub struct PayoutInput {
    pub amount: Decimal,
    pub bank_name: String,
    pub account_no: String,
    pub account_name: String,
    pub notes: Option<String>,
}

/// Admin decision on a pending payout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutAction {
    Approve,
    Reject,
}

/// Result of a rent split
#[derive(Debug, Clone)]
pub struct RentSplit {
    pub wallet_id: String,
    pub fee: Decimal,
    pub net_income: Decimal,
    pub new_balance: Decimal,
}

/// The wallet ledger service. Holds its storage handle explicitly so
/// tests can construct one against any database.
#[derive(Clone)]
pub struct WalletService {
    pool: SqlitePool,
}

impl WalletService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the user's wallet, creating an empty one on first access.
    /// Idempotent.
    pub async fn get_or_create_wallet(&self, user_id: &str) -> WalletResult<Wallet> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;
        let row = get_or_create(&mut tx, user_id).await?;
        tx.commit().await.map_err(persistence)?;
        Ok(row.try_into()?)
    }

    /// Credit the landlord's share of a settled invoice.
    ///
    /// The platform withholds a fixed 5% fee; the remainder lands in the
    /// landlord's wallet with one `RENT_INCOME` ledger row.
    pub async fn process_rent_split(
        &self,
        invoice_id: &str,
        gross_amount: Decimal,
        landlord_id: &str,
    ) -> WalletResult<RentSplit> {
        if gross_amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(gross_amount));
        }

        let fee = gross_amount * PLATFORM_FEE_PERCENT;
        let net_income = gross_amount - fee;

        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let wallet = get_or_create(&mut tx, landlord_id).await?;
        let balance = parse_balance(&wallet.balance)?;
        let new_balance = balance + net_income;

        WalletRepo::update_balance(&mut tx, &wallet.id, &new_balance.to_string()).await?;
        WalletTransactionRepo::insert(
            &mut tx,
            &ledger_row(
                &wallet.id,
                TxType::Credit,
                TxCategory::RentIncome,
                net_income,
                Some(format!("Income from invoice #{invoice_id} (fee: {fee})")),
                Some(invoice_id.to_string()),
                new_balance,
            ),
        )
        .await?;

        tx.commit().await.map_err(persistence)?;

        info!(
            wallet_id = %wallet.id,
            invoice_id,
            %net_income,
            %fee,
            "rent income credited"
        );

        Ok(RentSplit {
            wallet_id: wallet.id,
            fee,
            net_income,
            new_balance,
        })
    }

    /// Request a withdrawal. Funds are reserved immediately: the debit
    /// happens here, not at approval, so concurrent requests cannot
    /// overdraw the wallet.
    pub async fn request_payout(
        &self,
        user_id: &str,
        input: PayoutInput,
    ) -> WalletResult<PayoutRequest> {
        if input.amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(input.amount));
        }

        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let wallet = WalletRepo::get_by_user_id(&mut tx, user_id)
            .await?
            .ok_or_else(|| WalletError::WalletNotFound(user_id.to_string()))?;
        let balance = parse_balance(&wallet.balance)?;

        if balance < input.amount {
            return Err(WalletError::InsufficientBalance {
                needed: input.amount,
                available: balance,
            });
        }

        let new_balance = balance - input.amount;
        WalletRepo::update_balance(&mut tx, &wallet.id, &new_balance.to_string()).await?;

        let payout = PayoutRequestRow {
            id: Uuid::new_v4().to_string(),
            wallet_id: wallet.id.clone(),
            amount: input.amount.to_string(),
            bank_name: input.bank_name,
            account_no: input.account_no,
            account_name: input.account_name,
            status: PayoutStatus::Pending.as_str().to_string(),
            notes: input.notes,
            processed_at: None,
            created_at: Utc::now(),
        };
        PayoutRepo::insert(&mut tx, &payout).await?;

        WalletTransactionRepo::insert(
            &mut tx,
            &ledger_row(
                &wallet.id,
                TxType::Debit,
                TxCategory::PayoutRequest,
                input.amount,
                Some(format!("Withdrawal request #{}", short_id(&payout.id))),
                Some(payout.id.clone()),
                new_balance,
            ),
        )
        .await?;

        tx.commit().await.map_err(persistence)?;

        info!(
            wallet_id = %wallet.id,
            payout_id = %payout.id,
            amount = %input.amount,
            "payout requested; funds reserved"
        );

        Ok(payout.try_into()?)
    }

    /// Settle a pending payout exactly once.
    ///
    /// APPROVE only moves the status (the money already left the wallet
    /// at request time; the bank transfer is an external concern).
    /// REJECT refunds the reserved amount with one `REFUND` ledger row.
    pub async fn process_payout(
        &self,
        admin_id: &str,
        payout_id: &str,
        action: PayoutAction,
        notes: Option<&str>,
    ) -> WalletResult<PayoutRequest> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let payout = PayoutRepo::get_by_id(&mut tx, payout_id)
            .await?
            .ok_or_else(|| WalletError::PayoutNotFound(payout_id.to_string()))?;

        let status = PayoutStatus::from_str(&payout.status)
            .ok_or_else(|| WalletError::PayoutNotFound(payout_id.to_string()))?;
        if status.is_terminal() {
            return Err(WalletError::AlreadyProcessed(status));
        }

        let new_status = match action {
            PayoutAction::Approve => PayoutStatus::Completed,
            PayoutAction::Reject => PayoutStatus::Rejected,
        };
        let processed_at = Utc::now();

        let transitioned = PayoutRepo::mark_processed(
            &mut tx,
            payout_id,
            new_status.as_str(),
            processed_at,
            notes,
        )
        .await?;
        if !transitioned {
            // A concurrent processor won the transition
            return Err(WalletError::AlreadyProcessed(new_status));
        }

        if action == PayoutAction::Reject {
            let amount = parse_balance(&payout.amount)?;
            let wallet = WalletRepo::get_by_id(&mut tx, &payout.wallet_id).await?;
            let new_balance = parse_balance(&wallet.balance)? + amount;

            WalletRepo::update_balance(&mut tx, &wallet.id, &new_balance.to_string()).await?;
            WalletTransactionRepo::insert(
                &mut tx,
                &ledger_row(
                    &wallet.id,
                    TxType::Credit,
                    TxCategory::Refund,
                    amount,
                    Some(format!("Refund for payout #{}", short_id(payout_id))),
                    Some(payout_id.to_string()),
                    new_balance,
                ),
            )
            .await?;
        }

        tx.commit().await.map_err(persistence)?;

        info!(
            payout_id,
            admin_id,
            status = %new_status,
            "payout processed"
        );

        Ok(PayoutRequestRow {
            status: new_status.as_str().to_string(),
            notes: notes.map(|s| s.to_string()),
            processed_at: Some(processed_at),
            ..payout
        }
        .try_into()?)
    }

    /// Ledger of one wallet, newest first
    pub async fn transactions(&self, wallet_id: &str) -> WalletResult<Vec<WalletTransaction>> {
        let rows = WalletTransactionRepo::get_by_wallet(&self.pool, wallet_id).await?;
        rows.into_iter()
            .map(|row| row.try_into().map_err(Into::into))
            .collect()
    }

    /// Payout requests, optionally filtered by status, newest first
    pub async fn payouts(&self, status: Option<PayoutStatus>) -> WalletResult<Vec<PayoutRequest>> {
        let rows = PayoutRepo::list(&self.pool, status.map(|s| s.as_str())).await?;
        rows.into_iter()
            .map(|row| row.try_into().map_err(Into::into))
            .collect()
    }
}

/// Fetch the user's wallet inside the current transaction, creating an
/// empty one if absent.
async fn get_or_create(conn: &mut SqliteConnection, user_id: &str) -> WalletResult<WalletRow> {
    if let Some(existing) = WalletRepo::get_by_user_id(conn, user_id).await? {
        return Ok(existing);
    }

    let row = WalletRow {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        balance: Decimal::ZERO.to_string(),
        currency: DEFAULT_CURRENCY.to_string(),
        created_at: Utc::now(),
    };
    WalletRepo::insert(conn, &row).await?;
    info!(user_id, wallet_id = %row.id, "wallet created");
    Ok(row)
}

fn ledger_row(
    wallet_id: &str,
    tx_type: TxType,
    category: TxCategory,
    amount: Decimal,
    description: Option<String>,
    reference_id: Option<String>,
    balance_after: Decimal,
) -> WalletTransactionRow {
    WalletTransactionRow {
        id: Uuid::new_v4().to_string(),
        wallet_id: wallet_id.to_string(),
        tx_type: tx_type.as_str().to_string(),
        category: category.as_str().to_string(),
        amount: amount.to_string(),
        description,
        reference_id,
        balance_after: balance_after.to_string(),
        created_at: Utc::now(),
    }
}

fn parse_balance(raw: &str) -> WalletResult<Decimal> {
    use std::str::FromStr;
    Decimal::from_str(raw).map_err(|_| {
        WalletError::Persistence(rentverse_persistence::PersistenceError::InvalidDecimal(
            raw.to_string(),
        ))
    })
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn persistence(err: sqlx::Error) -> WalletError {
    WalletError::Persistence(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_handles_any_input() {
        assert_eq!(short_id("3f2a9c1d-77aa-4b01"), "3f2a9c1d");
        assert_eq!(short_id("abc"), "abc");
        // Multi-byte char straddling the cut falls back to the full id
        assert_eq!(short_id("payoutsé-123"), "payoutsé-123");
    }
}
