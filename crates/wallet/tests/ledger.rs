//! Wallet ledger integration tests against a real SQLite database

use async_trait::async_trait;
use rentverse_bus::{DomainEvent, EventBus};
use rentverse_core::{PayoutStatus, TxCategory, TxType};
use rentverse_persistence::init_database;
use rentverse_wallet::{
    BookingDirectory, FinanceSubscriber, PayoutAction, PayoutInput, WalletError, WalletService,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

async fn setup() -> (WalletService, SqlitePool, TempDir) {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("wallet.db").display());
    let pool = init_database(&url).await.unwrap();
    let service = WalletService::new(pool.clone());
    (service, pool, dir)
}

fn payout_input(amount: Decimal) -> PayoutInput {
    PayoutInput {
        amount,
        bank_name: "BCA".to_string(),
        account_no: "1234567890".to_string(),
        account_name: "Budi Santoso".to_string(),
        notes: None,
    }
}

#[tokio::test]
async fn test_get_or_create_wallet_is_idempotent() {
    let (service, _pool, _dir) = setup().await;

    let first = service.get_or_create_wallet("landlord-1").await.unwrap();
    assert_eq!(first.balance, Decimal::ZERO);
    assert_eq!(first.currency, "IDR");

    let second = service.get_or_create_wallet("landlord-1").await.unwrap();
    assert_eq!(second.id, first.id);
}

#[tokio::test]
async fn test_rent_split_withholds_the_platform_fee() {
    let (service, _pool, _dir) = setup().await;

    let split = service
        .process_rent_split("inv-1", dec!(1_000_000), "landlord-1")
        .await
        .unwrap();
    assert_eq!(split.fee, dec!(50_000));
    assert_eq!(split.net_income, dec!(950_000));
    assert_eq!(split.new_balance, dec!(950_000));

    let wallet = service.get_or_create_wallet("landlord-1").await.unwrap();
    assert_eq!(wallet.balance, dec!(950_000));

    let ledger = service.transactions(&split.wallet_id).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].tx_type, TxType::Credit);
    assert_eq!(ledger[0].category, TxCategory::RentIncome);
    assert_eq!(ledger[0].amount, dec!(950_000));
    assert_eq!(ledger[0].balance_after, dec!(950_000));
    assert_eq!(ledger[0].reference_id.as_deref(), Some("inv-1"));
}

#[tokio::test]
async fn test_rent_split_rejects_non_positive_amounts() {
    let (service, _pool, _dir) = setup().await;

    let err = service
        .process_rent_split("inv-1", Decimal::ZERO, "landlord-1")
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::InvalidAmount(_)));
}

#[tokio::test]
async fn test_payout_reserves_funds_and_reject_refunds() {
    let (service, _pool, _dir) = setup().await;
    service
        .process_rent_split("inv-1", dec!(1_000_000), "landlord-1")
        .await
        .unwrap();

    // Request: the wallet is debited up front
    let payout = service
        .request_payout("landlord-1", payout_input(dec!(60_000)))
        .await
        .unwrap();
    assert_eq!(payout.status, PayoutStatus::Pending);
    assert!(payout.processed_at.is_none());

    let wallet = service.get_or_create_wallet("landlord-1").await.unwrap();
    assert_eq!(wallet.balance, dec!(890_000));

    let ledger = service.transactions(&wallet.id).await.unwrap();
    assert_eq!(ledger[0].tx_type, TxType::Debit);
    assert_eq!(ledger[0].category, TxCategory::PayoutRequest);
    assert_eq!(ledger[0].reference_id.as_deref(), Some(payout.id.as_str()));

    // Reject: the reserved amount comes back as one refund row
    let rejected = service
        .process_payout("admin-1", &payout.id, PayoutAction::Reject, Some("bad account"))
        .await
        .unwrap();
    assert_eq!(rejected.status, PayoutStatus::Rejected);
    assert!(rejected.processed_at.is_some());

    let wallet = service.get_or_create_wallet("landlord-1").await.unwrap();
    assert_eq!(wallet.balance, dec!(950_000));

    let ledger = service.transactions(&wallet.id).await.unwrap();
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger[0].tx_type, TxType::Credit);
    assert_eq!(ledger[0].category, TxCategory::Refund);
    assert_eq!(ledger[0].amount, dec!(60_000));
}

#[tokio::test]
async fn test_approve_moves_status_only() {
    let (service, _pool, _dir) = setup().await;
    service
        .process_rent_split("inv-1", dec!(1_000_000), "landlord-1")
        .await
        .unwrap();
    let payout = service
        .request_payout("landlord-1", payout_input(dec!(200_000)))
        .await
        .unwrap();

    let wallet = service.get_or_create_wallet("landlord-1").await.unwrap();
    let rows_before = service.transactions(&wallet.id).await.unwrap().len();

    // The money already left at request time; approval is bookkeeping
    let approved = service
        .process_payout("admin-1", &payout.id, PayoutAction::Approve, None)
        .await
        .unwrap();
    assert_eq!(approved.status, PayoutStatus::Completed);

    let wallet = service.get_or_create_wallet("landlord-1").await.unwrap();
    assert_eq!(wallet.balance, dec!(750_000));
    assert_eq!(service.transactions(&wallet.id).await.unwrap().len(), rows_before);
}

#[tokio::test]
async fn test_insufficient_balance_leaves_no_trace() {
    let (service, _pool, _dir) = setup().await;
    service
        .process_rent_split("inv-1", dec!(100_000), "landlord-1")
        .await
        .unwrap();

    let err = service
        .request_payout("landlord-1", payout_input(dec!(1_000_000)))
        .await
        .unwrap_err();
    assert!(err.is_insufficient_balance());

    let wallet = service.get_or_create_wallet("landlord-1").await.unwrap();
    assert_eq!(wallet.balance, dec!(95_000));
    assert_eq!(service.transactions(&wallet.id).await.unwrap().len(), 1);
    assert!(service.payouts(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payout_settles_exactly_once() {
    let (service, _pool, _dir) = setup().await;
    service
        .process_rent_split("inv-1", dec!(1_000_000), "landlord-1")
        .await
        .unwrap();
    let payout = service
        .request_payout("landlord-1", payout_input(dec!(60_000)))
        .await
        .unwrap();

    service
        .process_payout("admin-1", &payout.id, PayoutAction::Approve, None)
        .await
        .unwrap();

    // A second decision of either kind is refused and refunds nothing
    let err = service
        .process_payout("admin-2", &payout.id, PayoutAction::Reject, None)
        .await
        .unwrap_err();
    assert!(err.is_already_processed());

    let wallet = service.get_or_create_wallet("landlord-1").await.unwrap();
    assert_eq!(wallet.balance, dec!(890_000));

    let err = service
        .process_payout("admin-1", "no-such-payout", PayoutAction::Approve, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::PayoutNotFound(_)));
}

#[tokio::test]
async fn test_balance_equals_signed_ledger_sum() {
    let (service, _pool, _dir) = setup().await;
    service
        .process_rent_split("inv-1", dec!(1_000_000), "landlord-1")
        .await
        .unwrap();
    service
        .process_rent_split("inv-2", dec!(500_000), "landlord-1")
        .await
        .unwrap();
    let payout = service
        .request_payout("landlord-1", payout_input(dec!(300_000)))
        .await
        .unwrap();
    service
        .process_payout("admin-1", &payout.id, PayoutAction::Reject, None)
        .await
        .unwrap();

    let wallet = service.get_or_create_wallet("landlord-1").await.unwrap();
    let ledger = service.transactions(&wallet.id).await.unwrap();

    let signed_sum: Decimal = ledger
        .iter()
        .map(|entry| entry.amount * entry.tx_type.sign())
        .sum();
    assert_eq!(wallet.balance, signed_sum);

    // Every row's snapshot is consistent with the rows before it
    assert_eq!(ledger[0].balance_after, wallet.balance);
}

/// Fixed booking-to-landlord mapping for subscriber tests
struct StaticDirectory(HashMap<String, String>);

#[async_trait]
impl BookingDirectory for StaticDirectory {
    async fn landlord_for_booking(&self, booking_id: &str) -> anyhow::Result<Option<String>> {
        Ok(self.0.get(booking_id).cloned())
    }
}

#[tokio::test]
async fn test_payment_event_credits_the_landlord() {
    let (service, _pool, _dir) = setup().await;

    let directory = StaticDirectory(HashMap::from([(
        "book-1".to_string(),
        "landlord-1".to_string(),
    )]));
    let mut bus = EventBus::new();
    bus.subscribe(Arc::new(FinanceSubscriber::new(
        service.clone(),
        Arc::new(directory),
    )));

    bus.publish(&DomainEvent::PaymentPaid {
        invoice_id: "inv-1".to_string(),
        booking_id: "book-1".to_string(),
        tenant_id: "tenant-1".to_string(),
        amount: dec!(2_000_000),
    })
    .await;

    let wallet = service.get_or_create_wallet("landlord-1").await.unwrap();
    assert_eq!(wallet.balance, dec!(1_900_000));

    // An unresolvable booking is logged and dropped; the bus stays up
    bus.publish(&DomainEvent::PaymentPaid {
        invoice_id: "inv-2".to_string(),
        booking_id: "book-unknown".to_string(),
        tenant_id: "tenant-1".to_string(),
        amount: dec!(2_000_000),
    })
    .await;

    let wallet = service.get_or_create_wallet("landlord-1").await.unwrap();
    assert_eq!(wallet.balance, dec!(1_900_000));
}
