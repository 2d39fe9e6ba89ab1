//! Trust engine integration tests against a real SQLite database

use rentverse_bus::{DomainEvent, EventBus};
use rentverse_core::{KycStatus, Role, SourceType};
use rentverse_persistence::{init_database, TrustRuleRepo, TrustRuleRow};
use rentverse_trust::{RewardContext, SkipReason, TrustEngine, TrustOutcome, TrustSubscriber};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

async fn setup() -> (TrustEngine, SqlitePool, TempDir) {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("trust.db").display());
    let pool = init_database(&url).await.unwrap();
    let engine = TrustEngine::new(pool.clone());
    (engine, pool, dir)
}

#[tokio::test]
async fn test_initialize_profile_baseline_and_idempotency() {
    let (engine, _pool, _dir) = setup().await;

    let profile = engine.initialize_profile("user-1", Role::Tenant).await.unwrap();
    assert_eq!(profile.score, 50.0);
    assert_eq!(profile.kyc_status, KycStatus::Pending);

    let history = engine.history("user-1", Role::Tenant).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event_code, "ACCOUNT_CREATED");
    assert_eq!(history[0].impact, 0.0);
    assert_eq!(history[0].score_snapshot, 50.0);
    assert_eq!(history[0].actor, "SYSTEM");
    assert_eq!(history[0].source_type, SourceType::Automated);

    // Re-registration changes nothing
    let again = engine.initialize_profile("user-1", Role::Tenant).await.unwrap();
    assert_eq!(again.score, 50.0);
    assert_eq!(engine.history("user-1", Role::Tenant).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_system_reward_applies_seeded_rule() {
    let (engine, _pool, _dir) = setup().await;
    engine.initialize_profile("tenant-1", Role::Tenant).await.unwrap();

    let outcome = engine
        .apply_system_reward(
            "tenant-1",
            Role::Tenant,
            "PAYMENT_ON_TIME",
            RewardContext::default().with_reference("inv-42", "INVOICE"),
        )
        .await
        .unwrap();

    let TrustOutcome::Applied(change) = outcome else {
        panic!("expected an applied outcome");
    };
    assert_eq!(change.impact, 2.0);
    assert_eq!(change.score, 52.0);

    let profile = engine.profile("tenant-1", Role::Tenant).await.unwrap().unwrap();
    assert_eq!(profile.score, 52.0);

    let history = engine.history("tenant-1", Role::Tenant).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event_code, "PAYMENT_ON_TIME");
    assert_eq!(history[0].score_snapshot, 52.0);
    assert_eq!(history[0].reference_id.as_deref(), Some("inv-42"));
}

#[tokio::test]
async fn test_unknown_rule_is_a_noop() {
    let (engine, _pool, _dir) = setup().await;
    engine.initialize_profile("tenant-1", Role::Tenant).await.unwrap();

    let outcome = engine
        .apply_system_reward("tenant-1", Role::Tenant, "NO_SUCH_RULE", RewardContext::default())
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        TrustOutcome::Skipped { reason: SkipReason::UnknownRule, .. }
    ));

    let profile = engine.profile("tenant-1", Role::Tenant).await.unwrap().unwrap();
    assert_eq!(profile.score, 50.0);
    assert_eq!(engine.history("tenant-1", Role::Tenant).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_inactive_rule_is_a_noop() {
    let (engine, pool, _dir) = setup().await;
    engine.initialize_profile("tenant-1", Role::Tenant).await.unwrap();

    TrustRuleRepo::insert(
        &pool,
        &TrustRuleRow {
            code: "RETIRED_RULE".to_string(),
            role: Some("TENANT".to_string()),
            category: "LEGACY".to_string(),
            base_impact: 25.0,
            is_active: false,
            description: "No longer in force".to_string(),
        },
    )
    .await
    .unwrap();

    let outcome = engine
        .apply_system_reward("tenant-1", Role::Tenant, "RETIRED_RULE", RewardContext::default())
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        TrustOutcome::Skipped { reason: SkipReason::InactiveRule, .. }
    ));
    let profile = engine.profile("tenant-1", Role::Tenant).await.unwrap().unwrap();
    assert_eq!(profile.score, 50.0);
}

#[tokio::test]
async fn test_missing_profile_is_a_hard_error() {
    let (engine, _pool, _dir) = setup().await;

    let err = engine
        .apply_system_reward("ghost", Role::Tenant, "PAYMENT_ON_TIME", RewardContext::default())
        .await
        .unwrap_err();
    assert!(err.is_profile_not_found());

    let err = engine
        .apply_manual_adjustment("admin-1", "ghost", Role::Landlord, 5.0, "test")
        .await
        .unwrap_err();
    assert!(err.is_profile_not_found());
}

#[tokio::test]
async fn test_score_clamps_at_both_bounds() {
    let (engine, _pool, _dir) = setup().await;
    engine.initialize_profile("user-1", Role::Landlord).await.unwrap();

    // Way past the ceiling: lands on 100, recorded impact is the
    // effective delta
    let up = engine
        .apply_manual_adjustment("admin-1", "user-1", Role::Landlord, 100.0, "bonus")
        .await
        .unwrap();
    assert_eq!(up.score, 100.0);
    assert_eq!(up.impact, 50.0);

    // Way past the floor
    let down = engine
        .apply_manual_adjustment("admin-1", "user-1", Role::Landlord, -500.0, "fraud")
        .await
        .unwrap();
    assert_eq!(down.score, 0.0);
    assert_eq!(down.impact, -100.0);

    // Audit chain stays consistent: initial score plus all recorded
    // impacts equals the current score
    let history = engine.history("user-1", Role::Landlord).await.unwrap();
    let total: f64 = history.iter().map(|e| e.impact).sum();
    let profile = engine.profile("user-1", Role::Landlord).await.unwrap().unwrap();
    assert_eq!(50.0 + total, profile.score);
    assert_eq!(history[0].score_snapshot, profile.score);
}

#[tokio::test]
async fn test_review_hits_only_the_receiver() {
    let (engine, _pool, _dir) = setup().await;
    engine.initialize_profile("tenant-1", Role::Tenant).await.unwrap();
    engine.initialize_profile("landlord-1", Role::Landlord).await.unwrap();

    // Landlord gives the tenant one star
    let change = engine
        .apply_review("rev-1", "landlord-1", "tenant-1", Role::Landlord, 1)
        .await
        .unwrap();
    assert_eq!(change.user_id, "tenant-1");
    assert_eq!(change.role, Role::Tenant);
    assert_eq!(change.impact, -5.0);
    assert_eq!(change.score, 45.0);

    // The reviewer is untouched
    let landlord = engine.profile("landlord-1", Role::Landlord).await.unwrap().unwrap();
    assert_eq!(landlord.score, 50.0);

    let history = engine.history("tenant-1", Role::Tenant).await.unwrap();
    assert_eq!(history[0].actor, "landlord-1");
    assert_eq!(history[0].source_type, SourceType::Manual);
    assert_eq!(history[0].reference_id.as_deref(), Some("rev-1"));
}

#[tokio::test]
async fn test_invalid_rating_is_rejected() {
    let (engine, _pool, _dir) = setup().await;
    engine.initialize_profile("tenant-1", Role::Tenant).await.unwrap();

    let err = engine
        .apply_review("rev-1", "landlord-1", "tenant-1", Role::Landlord, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, rentverse_trust::TrustError::InvalidRating(0)));
}

#[tokio::test]
async fn test_kyc_status_update() {
    let (engine, _pool, _dir) = setup().await;
    engine.initialize_profile("user-1", Role::Tenant).await.unwrap();

    engine
        .set_kyc_status("user-1", Role::Tenant, KycStatus::Verified)
        .await
        .unwrap();
    let profile = engine.profile("user-1", Role::Tenant).await.unwrap().unwrap();
    assert_eq!(profile.kyc_status, KycStatus::Verified);

    let err = engine
        .set_kyc_status("ghost", Role::Tenant, KycStatus::Verified)
        .await
        .unwrap_err();
    assert!(err.is_profile_not_found());
}

#[tokio::test]
async fn test_subscriber_end_to_end() {
    let (engine, _pool, _dir) = setup().await;
    let engine = Arc::new(engine);

    let mut bus = EventBus::new();
    bus.subscribe(Arc::new(TrustSubscriber::new(engine.clone())));

    bus.publish(&DomainEvent::UserRegistered {
        user_id: "tenant-1".to_string(),
        role: Role::Tenant,
    })
    .await;
    bus.publish(&DomainEvent::PaymentPaid {
        invoice_id: "inv-1".to_string(),
        booking_id: "book-1".to_string(),
        tenant_id: "tenant-1".to_string(),
        amount: rust_decimal_macros::dec!(1_000_000),
    })
    .await;
    bus.publish(&DomainEvent::TrustScoreAdjusted {
        admin_id: "admin-1".to_string(),
        user_id: "tenant-1".to_string(),
        role: Role::Tenant,
        score_delta: 5.0,
        reason: "manual review".to_string(),
    })
    .await;

    let profile = engine.profile("tenant-1", Role::Tenant).await.unwrap().unwrap();
    assert_eq!(profile.score, 57.0); // 50 + 2 (on-time) + 5 (admin)

    // A failing handler (unknown user) must not poison the bus
    bus.publish(&DomainEvent::TrustScoreAdjusted {
        admin_id: "admin-1".to_string(),
        user_id: "ghost".to_string(),
        role: Role::Tenant,
        score_delta: 5.0,
        reason: "oops".to_string(),
    })
    .await;
    bus.publish(&DomainEvent::KycVerified {
        user_id: "tenant-1".to_string(),
        role: Role::Tenant,
        admin_id: "admin-1".to_string(),
    })
    .await;

    let profile = engine.profile("tenant-1", Role::Tenant).await.unwrap().unwrap();
    assert_eq!(profile.score, 67.0); // +10 KYC_VERIFIED
    assert_eq!(profile.kyc_status, KycStatus::Verified);
}

#[tokio::test]
async fn test_fast_response_scoring() {
    let (engine, _pool, _dir) = setup().await;
    let engine = Arc::new(engine);
    engine.initialize_profile("landlord-1", Role::Landlord).await.unwrap();
    engine.initialize_profile("tenant-1", Role::Tenant).await.unwrap();

    let mut bus = EventBus::new();
    bus.subscribe(Arc::new(TrustSubscriber::new(engine.clone())));

    let t0 = chrono::Utc::now();
    let message = |room: &str, sender: &str, at| DomainEvent::ChatMessageSent {
        room_id: room.to_string(),
        sender_id: sender.to_string(),
        content: "hello".to_string(),
        created_at: at,
    };

    // Tenant asks, landlord replies within the 30-minute window
    bus.publish(&message("room-1", "tenant-1", t0)).await;
    bus.publish(&message("room-1", "landlord-1", t0 + chrono::Duration::minutes(10))).await;

    let landlord = engine.profile("landlord-1", Role::Landlord).await.unwrap().unwrap();
    assert_eq!(landlord.score, 53.0); // +3 COMM_FAST_RESPONSE

    // A fast tenant reply earns nothing (no landlord profile)
    bus.publish(&message("room-1", "tenant-1", t0 + chrono::Duration::minutes(15))).await;
    let tenant = engine.profile("tenant-1", Role::Tenant).await.unwrap().unwrap();
    assert_eq!(tenant.score, 50.0);

    // A slow landlord reply earns nothing either
    bus.publish(&message("room-2", "tenant-1", t0)).await;
    bus.publish(&message("room-2", "landlord-1", t0 + chrono::Duration::minutes(45))).await;
    let landlord = engine.profile("landlord-1", Role::Landlord).await.unwrap().unwrap();
    assert_eq!(landlord.score, 53.0);
}
