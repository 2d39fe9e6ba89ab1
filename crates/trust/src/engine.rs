//! Trust engine - transactional score mutation
//!
//! Every mutation is one read-clamp-write-log sequence inside a single
//! transaction: the score write and its audit row commit or roll back
//! together.

use crate::error::{TrustError, TrustResult};
use crate::rules::RuleStore;
use chrono::Utc;
use rentverse_core::{
    clamp_score, rating_delta, KycStatus, Role, SourceType, TrustLogEntry, TrustProfile,
    INITIAL_SCORE, SYSTEM_ACTOR,
};
use rentverse_persistence::{
    TrustLogRepo, TrustLogRow, TrustProfileRepo, TrustProfileRow,
};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// Event code logged when a profile is created
pub const ACCOUNT_CREATED: &str = "ACCOUNT_CREATED";
/// Event code logged for direct admin governance adjustments
pub const ADMIN_ADJUSTMENT: &str = "ADMIN_ADJUSTMENT";
/// Event code logged for review-driven adjustments
pub const REVIEW_RECEIVED: &str = "REVIEW_RECEIVED";

/// Optional context accompanying a system reward
#[derive(Debug, Clone, Default)]
pub struct RewardContext {
    /// Overrides the rule's description in the audit row
    pub description: Option<String>,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
}

impl RewardContext {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_reference(mut self, id: impl Into<String>, kind: impl Into<String>) -> Self {
        self.reference_id = Some(id.into());
        self.reference_type = Some(kind.into());
        self
    }
}

/// A committed score mutation
#[derive(Debug, Clone)]
pub struct ScoreChange {
    pub user_id: String,
    pub role: Role,
    pub event_code: String,
    /// Delta actually applied, after clamping
    pub impact: f64,
    /// Score after the mutation
    pub score: f64,
    pub log_id: String,
}

/// Why a system reward was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No rule exists for the code
    UnknownRule,
    /// The rule exists but is disabled
    InactiveRule,
}

/// Outcome of a system reward: either a committed mutation or a
/// deliberate no-op. Unknown and disabled rules must never crash a
/// caller.
#[derive(Debug, Clone)]
pub enum TrustOutcome {
    Applied(ScoreChange),
    Skipped { event_code: String, reason: SkipReason },
}

impl TrustOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TrustOutcome::Applied(_))
    }

    fn skipped(event_code: &str, reason: SkipReason) -> Self {
        TrustOutcome::Skipped {
            event_code: event_code.to_string(),
            reason,
        }
    }
}

/// The scoring engine. Holds its storage handle and rule accessor
/// explicitly so tests can construct one against any database.
#[derive(Clone)]
pub struct TrustEngine {
    pool: SqlitePool,
    rules: RuleStore,
}

impl TrustEngine {
    pub fn new(pool: SqlitePool) -> Self {
        let rules = RuleStore::new(pool.clone());
        Self { pool, rules }
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Create the profile for a newly registered role, with the initial
    /// score and a zero-impact `ACCOUNT_CREATED` audit entry.
    ///
    /// Idempotent: re-registration of an existing role changes nothing.
    pub async fn initialize_profile(&self, user_id: &str, role: Role) -> TrustResult<TrustProfile> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        if let Some(existing) = TrustProfileRepo::get(&mut tx, user_id, role.as_str()).await? {
            return Ok(existing.try_into()?);
        }

        let now = Utc::now();
        let row = TrustProfileRow {
            user_id: user_id.to_string(),
            role: role.as_str().to_string(),
            score: INITIAL_SCORE,
            kyc_status: KycStatus::Pending.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        TrustProfileRepo::insert(&mut tx, &row).await?;

        let log = TrustLogRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            role: role.as_str().to_string(),
            event_code: ACCOUNT_CREATED.to_string(),
            impact: 0.0,
            score_snapshot: INITIAL_SCORE,
            description: "User account created successfully".to_string(),
            actor: SYSTEM_ACTOR.to_string(),
            source_type: SourceType::Automated.as_str().to_string(),
            reference_id: None,
            reference_type: None,
            created_at: now,
        };
        TrustLogRepo::insert(&mut tx, &log).await?;

        tx.commit().await.map_err(persistence)?;
        info!(user_id, role = %role, "trust profile initialized");

        Ok(row.try_into()?)
    }

    /// Apply a configured rule to a profile.
    ///
    /// Unknown or inactive codes return [`TrustOutcome::Skipped`] without
    /// touching the profile or the log.
    pub async fn apply_system_reward(
        &self,
        user_id: &str,
        role: Role,
        event_code: &str,
        ctx: RewardContext,
    ) -> TrustResult<TrustOutcome> {
        let rule = match self.rules.get(event_code).await? {
            Some(rule) if rule.is_active => rule,
            Some(_) => {
                debug!(event_code, "rule inactive; skipping");
                return Ok(TrustOutcome::skipped(event_code, SkipReason::InactiveRule));
            }
            None => {
                debug!(event_code, "no rule for code; skipping");
                return Ok(TrustOutcome::skipped(event_code, SkipReason::UnknownRule));
            }
        };

        let description = ctx.description.unwrap_or_else(|| rule.description.clone());
        let change = self
            .mutate_score(
                user_id,
                role,
                &rule.code,
                rule.base_impact,
                &description,
                SYSTEM_ACTOR,
                SourceType::Automated,
                ctx.reference_id,
                ctx.reference_type,
            )
            .await?;

        Ok(TrustOutcome::Applied(change))
    }

    /// Apply a caller-supplied delta (admin governance).
    pub async fn apply_manual_adjustment(
        &self,
        admin_id: &str,
        user_id: &str,
        role: Role,
        delta: f64,
        reason: &str,
    ) -> TrustResult<ScoreChange> {
        self.mutate_score(
            user_id,
            role,
            ADMIN_ADJUSTMENT,
            delta,
            reason,
            admin_id,
            SourceType::Manual,
            None,
            None,
        )
        .await
    }

    /// Apply the score impact of a review to the receiver's profile.
    ///
    /// A review lands on the receiver's opposite-role profile only: a
    /// landlord rating a tenant moves the tenant's score, never the
    /// landlord's.
    pub async fn apply_review(
        &self,
        review_id: &str,
        reviewer_id: &str,
        receiver_id: &str,
        reviewer_role: Role,
        rating: u8,
    ) -> TrustResult<ScoreChange> {
        let delta = rating_delta(rating).ok_or(TrustError::InvalidRating(rating))?;
        self.mutate_score(
            receiver_id,
            reviewer_role.opposite(),
            REVIEW_RECEIVED,
            delta,
            &format!("Received a {rating}-star review"),
            reviewer_id,
            SourceType::Manual,
            Some(review_id.to_string()),
            Some("REVIEW".to_string()),
        )
        .await
    }

    /// Update the KYC status on a profile
    pub async fn set_kyc_status(
        &self,
        user_id: &str,
        role: Role,
        status: KycStatus,
    ) -> TrustResult<()> {
        let mut conn = self.pool.acquire().await.map_err(persistence)?;
        TrustProfileRepo::update_kyc_status(&mut conn, user_id, role.as_str(), status.as_str())
            .await
            .map_err(|err| match err {
                e if e.is_not_found() => TrustError::profile_not_found(user_id, role),
                e => e.into(),
            })
    }

    /// Fetch a profile, if one exists for the role
    pub async fn profile(&self, user_id: &str, role: Role) -> TrustResult<Option<TrustProfile>> {
        let mut conn = self.pool.acquire().await.map_err(persistence)?;
        match TrustProfileRepo::get(&mut conn, user_id, role.as_str()).await? {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    /// Audit history of a profile, newest first
    pub async fn history(&self, user_id: &str, role: Role) -> TrustResult<Vec<TrustLogEntry>> {
        let rows = TrustLogRepo::get_by_profile(&self.pool, user_id, role.as_str()).await?;
        rows.into_iter()
            .map(|row| row.try_into().map_err(Into::into))
            .collect()
    }

    /// The shared read-clamp-write-log sequence.
    ///
    /// One transaction: the profile write and the audit row are
    /// all-or-nothing. The recorded impact is the delta that actually
    /// landed, so snapshots stay consistent under clamping.
    #[allow(clippy::too_many_arguments)]
    async fn mutate_score(
        &self,
        user_id: &str,
        role: Role,
        event_code: &str,
        delta: f64,
        description: &str,
        actor: &str,
        source_type: SourceType,
        reference_id: Option<String>,
        reference_type: Option<String>,
    ) -> TrustResult<ScoreChange> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let profile = TrustProfileRepo::get(&mut tx, user_id, role.as_str())
            .await?
            .ok_or_else(|| TrustError::profile_not_found(user_id, role))?;

        let new_score = clamp_score(profile.score + delta);
        let impact = new_score - profile.score;

        TrustProfileRepo::update_score(&mut tx, user_id, role.as_str(), new_score).await?;

        let log_id = Uuid::new_v4().to_string();
        let log = TrustLogRow {
            id: log_id.clone(),
            user_id: user_id.to_string(),
            role: role.as_str().to_string(),
            event_code: event_code.to_string(),
            impact,
            score_snapshot: new_score,
            description: description.to_string(),
            actor: actor.to_string(),
            source_type: source_type.as_str().to_string(),
            reference_id,
            reference_type,
            created_at: Utc::now(),
        };
        TrustLogRepo::insert(&mut tx, &log).await?;

        tx.commit().await.map_err(persistence)?;

        info!(
            user_id,
            role = %role,
            event_code,
            impact,
            score = new_score,
            "trust score updated"
        );

        Ok(ScoreChange {
            user_id: user_id.to_string(),
            role,
            event_code: event_code.to_string(),
            impact,
            score: new_score,
            log_id,
        })
    }
}

fn persistence(err: sqlx::Error) -> TrustError {
    TrustError::Persistence(err.into())
}
