//! Rentverse Wallet - monetary ledger and payout workflow
//!
//! Moves money between an internal balance and an immutable transaction
//! log. Every balance mutation appends exactly one ledger row inside the
//! same transaction, so `balance == sum(credits) - sum(debits)` holds at
//! every commit point. Payouts reserve funds at request time and are
//! settled exactly once by an admin decision.

pub mod error;
pub mod service;
pub mod subscriber;

pub use error::{WalletError, WalletResult};
pub use service::{PayoutAction, PayoutInput, RentSplit, WalletService, PLATFORM_FEE_PERCENT};
pub use subscriber::{BookingDirectory, FinanceSubscriber};
