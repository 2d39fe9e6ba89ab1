//! SQLite persistence module
//!
//! Repository pattern over the trust & ledger tables.

pub mod repos;
pub mod schema;

pub use repos::{
    create_pool, init_database, run_migrations, PayoutRepo, TrustLogRepo, TrustProfileRepo,
    TrustRuleRepo, WalletRepo, WalletTransactionRepo,
};
pub use schema::{
    PayoutRequestRow, TrustLogRow, TrustProfileRow, TrustRuleRow, WalletRow,
    WalletTransactionRow,
};
