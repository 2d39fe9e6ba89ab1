//! # Rentverse Persistence
//!
//! SQLite access for the trust & ledger core.
//!
//! Row types map tables one-to-one; repositories hold the queries.
//! Mutating repository methods take `&mut SqliteConnection` so the
//! services can scope every read-modify-write inside a single
//! transaction - the store's serialization of writers is what keeps
//! concurrent mutations of the same profile or wallet correct.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rentverse_persistence::{init_database, TrustProfileRepo};
//!
//! let pool = init_database("sqlite://rentverse.db?mode=rwc").await?;
//! let mut tx = pool.begin().await?;
//! let profile = TrustProfileRepo::get(&mut tx, "user-1", "TENANT").await?;
//! // ... mutate, write log row ...
//! tx.commit().await?;
//! ```

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::repos::{
    create_pool, init_database, run_migrations, PayoutRepo, TrustLogRepo, TrustProfileRepo,
    TrustRuleRepo, WalletRepo, WalletTransactionRepo,
};
pub use sqlite::schema::{
    PayoutRequestRow, TrustLogRow, TrustProfileRow, TrustRuleRow, WalletRow,
    WalletTransactionRow,
};
