//! Repository implementations for SQLite
//!
//! Reads that feed a mutation take `&mut SqliteConnection` so the caller
//! can hold them inside the same transaction as the write; catalogue and
//! reporting reads take the pool directly.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

// ============================================================================
// Trust Profile Repository
// ============================================================================

/// Repository for the `trust_profiles` table
pub struct TrustProfileRepo;

impl TrustProfileRepo {
    /// Get a profile by user and role
    pub async fn get(
        conn: &mut SqliteConnection,
        user_id: &str,
        role: &str,
    ) -> PersistenceResult<Option<TrustProfileRow>> {
        let row = sqlx::query_as::<_, TrustProfileRow>(
            "SELECT * FROM trust_profiles WHERE user_id = ? AND role = ?",
        )
        .bind(user_id)
        .bind(role)
        .fetch_optional(conn)
        .await?;
        Ok(row)
    }

    /// Insert a new profile
    pub async fn insert(
        conn: &mut SqliteConnection,
        profile: &TrustProfileRow,
    ) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO trust_profiles (user_id, role, score, kyc_status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.user_id)
        .bind(&profile.role)
        .bind(profile.score)
        .bind(&profile.kyc_status)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Update the score
    pub async fn update_score(
        conn: &mut SqliteConnection,
        user_id: &str,
        role: &str,
        score: f64,
    ) -> PersistenceResult<()> {
        let result = sqlx::query(
            "UPDATE trust_profiles SET score = ?, updated_at = ? WHERE user_id = ? AND role = ?",
        )
        .bind(score)
        .bind(Utc::now())
        .bind(user_id)
        .bind(role)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("TrustProfile", user_id));
        }
        Ok(())
    }

    /// Update the KYC status
    pub async fn update_kyc_status(
        conn: &mut SqliteConnection,
        user_id: &str,
        role: &str,
        kyc_status: &str,
    ) -> PersistenceResult<()> {
        let result = sqlx::query(
            "UPDATE trust_profiles SET kyc_status = ?, updated_at = ? WHERE user_id = ? AND role = ?",
        )
        .bind(kyc_status)
        .bind(Utc::now())
        .bind(user_id)
        .bind(role)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("TrustProfile", user_id));
        }
        Ok(())
    }
}

// ============================================================================
// Trust Rule Repository
// ============================================================================

/// Repository for the `trust_rules` table (read-only to the engine)
pub struct TrustRuleRepo;

impl TrustRuleRepo {
    /// Look up a rule by its unique code
    pub async fn get_by_code(
        pool: &SqlitePool,
        code: &str,
    ) -> PersistenceResult<Option<TrustRuleRow>> {
        let row = sqlx::query_as::<_, TrustRuleRow>("SELECT * FROM trust_rules WHERE code = ?")
            .bind(code)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// List every active rule
    pub async fn list_active(pool: &SqlitePool) -> PersistenceResult<Vec<TrustRuleRow>> {
        let rows = sqlx::query_as::<_, TrustRuleRow>(
            "SELECT * FROM trust_rules WHERE is_active = 1 ORDER BY code",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Insert a rule (seeding/operations tooling, not the engine)
    pub async fn insert(pool: &SqlitePool, rule: &TrustRuleRow) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO trust_rules (code, role, category, base_impact, is_active, description)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&rule.code)
        .bind(&rule.role)
        .bind(&rule.category)
        .bind(rule.base_impact)
        .bind(rule.is_active)
        .bind(&rule.description)
        .execute(pool)
        .await?;
        Ok(())
    }
}

// ============================================================================
// Trust Log Repository
// ============================================================================

/// Repository for the `trust_logs` table (append-only)
pub struct TrustLogRepo;

impl TrustLogRepo {
    /// Append an audit row
    pub async fn insert(conn: &mut SqliteConnection, log: &TrustLogRow) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO trust_logs
                (id, user_id, role, event_code, impact, score_snapshot, description,
                 actor, source_type, reference_id, reference_type, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(&log.role)
        .bind(&log.event_code)
        .bind(log.impact)
        .bind(log.score_snapshot)
        .bind(&log.description)
        .bind(&log.actor)
        .bind(&log.source_type)
        .bind(&log.reference_id)
        .bind(&log.reference_type)
        .bind(log.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Audit history of one profile, newest first
    pub async fn get_by_profile(
        pool: &SqlitePool,
        user_id: &str,
        role: &str,
    ) -> PersistenceResult<Vec<TrustLogRow>> {
        let rows = sqlx::query_as::<_, TrustLogRow>(
            "SELECT * FROM trust_logs WHERE user_id = ? AND role = ? ORDER BY created_at DESC, id",
        )
        .bind(user_id)
        .bind(role)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Count audit rows of one profile
    pub async fn count_by_profile(
        pool: &SqlitePool,
        user_id: &str,
        role: &str,
    ) -> PersistenceResult<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM trust_logs WHERE user_id = ? AND role = ?")
                .bind(user_id)
                .bind(role)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Wallet Repository
// ============================================================================

/// Repository for the `wallets` table
pub struct WalletRepo;

impl WalletRepo {
    /// Get a wallet by id
    pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> PersistenceResult<WalletRow> {
        sqlx::query_as::<_, WalletRow>("SELECT * FROM wallets WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Wallet", id))
    }

    /// Get a user's wallet, if one exists
    pub async fn get_by_user_id(
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> PersistenceResult<Option<WalletRow>> {
        let row = sqlx::query_as::<_, WalletRow>("SELECT * FROM wallets WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
        Ok(row)
    }

    /// Insert a new wallet
    pub async fn insert(conn: &mut SqliteConnection, wallet: &WalletRow) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO wallets (id, user_id, balance, currency, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&wallet.id)
        .bind(&wallet.user_id)
        .bind(&wallet.balance)
        .bind(&wallet.currency)
        .bind(wallet.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Persist a new balance
    pub async fn update_balance(
        conn: &mut SqliteConnection,
        wallet_id: &str,
        balance: &str,
    ) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE wallets SET balance = ? WHERE id = ?")
            .bind(balance)
            .bind(wallet_id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Wallet", wallet_id));
        }
        Ok(())
    }
}

// ============================================================================
// Wallet Transaction Repository
// ============================================================================

/// Repository for the `wallet_transactions` table (append-only)
pub struct WalletTransactionRepo;

impl WalletTransactionRepo {
    /// Append a ledger row
    pub async fn insert(
        conn: &mut SqliteConnection,
        tx: &WalletTransactionRow,
    ) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO wallet_transactions
                (id, wallet_id, tx_type, category, amount, description, reference_id,
                 balance_after, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tx.id)
        .bind(&tx.wallet_id)
        .bind(&tx.tx_type)
        .bind(&tx.category)
        .bind(&tx.amount)
        .bind(&tx.description)
        .bind(&tx.reference_id)
        .bind(&tx.balance_after)
        .bind(tx.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Ledger of one wallet, newest first
    pub async fn get_by_wallet(
        pool: &SqlitePool,
        wallet_id: &str,
    ) -> PersistenceResult<Vec<WalletTransactionRow>> {
        let rows = sqlx::query_as::<_, WalletTransactionRow>(
            "SELECT * FROM wallet_transactions WHERE wallet_id = ? ORDER BY created_at DESC, id",
        )
        .bind(wallet_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

// ============================================================================
// Payout Repository
// ============================================================================

/// Repository for the `payout_requests` table
pub struct PayoutRepo;

impl PayoutRepo {
    /// Insert a new payout request
    pub async fn insert(
        conn: &mut SqliteConnection,
        payout: &PayoutRequestRow,
    ) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payout_requests
                (id, wallet_id, amount, bank_name, account_no, account_name, status,
                 notes, processed_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payout.id)
        .bind(&payout.wallet_id)
        .bind(&payout.amount)
        .bind(&payout.bank_name)
        .bind(&payout.account_no)
        .bind(&payout.account_name)
        .bind(&payout.status)
        .bind(&payout.notes)
        .bind(payout.processed_at)
        .bind(payout.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Get a payout request by id
    pub async fn get_by_id(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> PersistenceResult<Option<PayoutRequestRow>> {
        let row = sqlx::query_as::<_, PayoutRequestRow>(
            "SELECT * FROM payout_requests WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(row)
    }

    /// Move a PENDING payout to a terminal status.
    ///
    /// The status guard makes the transition at-most-once even under
    /// concurrent processors: returns `false` when the row was no longer
    /// PENDING.
    pub async fn mark_processed(
        conn: &mut SqliteConnection,
        id: &str,
        status: &str,
        processed_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> PersistenceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payout_requests
            SET status = ?, processed_at = ?, notes = ?
            WHERE id = ? AND status = 'PENDING'
            "#,
        )
        .bind(status)
        .bind(processed_at)
        .bind(notes)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List payouts, optionally filtered by status, newest first
    pub async fn list(
        pool: &SqlitePool,
        status: Option<&str>,
    ) -> PersistenceResult<Vec<PayoutRequestRow>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, PayoutRequestRow>(
                    "SELECT * FROM payout_requests WHERE status = ? ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PayoutRequestRow>(
                    "SELECT * FROM payout_requests ORDER BY created_at DESC",
                )
                .fetch_all(pool)
                .await?
            }
        };
        Ok(rows)
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Open a connection pool to an existing database
pub async fn create_pool(database_url: &str) -> PersistenceResult<SqlitePool> {
    let pool = SqlitePool::connect(database_url).await?;
    Ok(pool)
}

/// Run migrations from the workspace `migrations/` directory
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Create the database file if missing and bring the schema up to date
pub async fn init_database(database_url: &str) -> PersistenceResult<SqlitePool> {
    let pool = SqlitePool::connect_with(
        database_url
            .parse::<sqlx::sqlite::SqliteConnectOptions>()?
            .create_if_missing(true),
    )
    .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}
