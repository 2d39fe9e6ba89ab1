//! Rule store access
//!
//! The rule catalogue is seeded out-of-band (migrations, admin tooling);
//! this is a read-only view over it.

use crate::error::TrustResult;
use rentverse_core::TrustRule;
use rentverse_persistence::TrustRuleRepo;
use sqlx::SqlitePool;

/// Read-only accessor for the scoring rule catalogue
#[derive(Clone)]
pub struct RuleStore {
    pool: SqlitePool,
}

impl RuleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a rule by code. `None` means the code is unknown, which
    /// callers treat as a soft no-op, never a failure.
    pub async fn get(&self, code: &str) -> TrustResult<Option<TrustRule>> {
        match TrustRuleRepo::get_by_code(&self.pool, code).await? {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    /// Every active rule in the catalogue
    pub async fn list_active(&self) -> TrustResult<Vec<TrustRule>> {
        let rows = TrustRuleRepo::list_active(&self.pool).await?;
        rows.into_iter()
            .map(|row| row.try_into().map_err(Into::into))
            .collect()
    }
}
