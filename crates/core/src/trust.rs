//! # Trust Module
//!
//! Trust profiles, scoring rules and the append-only audit log.
//!
//! Every user carries one profile per marketplace role. The score is a
//! bounded `[0, 100]` number; out-of-range writes are clamped, never
//! rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of the trust score
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of the trust score
pub const SCORE_MAX: f64 = 100.0;

/// Score assigned to a freshly created profile
pub const INITIAL_SCORE: f64 = 50.0;

/// Actor value recorded for automated score mutations
pub const SYSTEM_ACTOR: &str = "SYSTEM";

/// Clamp a score into the `[0, 100]` invariant
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(SCORE_MIN, SCORE_MAX)
}

/// Map a 1-5 star review rating to its score delta.
///
/// Returns `None` for ratings outside 1-5.
pub fn rating_delta(rating: u8) -> Option<f64> {
    match rating {
        5 => Some(3.0),
        4 => Some(1.0),
        3 => Some(0.0),
        2 => Some(-3.0),
        1 => Some(-5.0),
        _ => None,
    }
}

/// Marketplace role a trust profile is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Tenant,
    Landlord,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tenant => "TENANT",
            Role::Landlord => "LANDLORD",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TENANT" => Some(Role::Tenant),
            "LANDLORD" => Some(Role::Landlord),
            _ => None,
        }
    }

    /// The counterparty role. A review given by one side lands on the
    /// other side's profile.
    pub fn opposite(&self) -> Role {
        match self {
            Role::Tenant => Role::Landlord,
            Role::Landlord => Role::Tenant,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity verification state of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KycStatus {
    Pending,
    Verified,
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Pending => "PENDING",
            KycStatus::Verified => "VERIFIED",
            KycStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(KycStatus::Pending),
            "VERIFIED" => Some(KycStatus::Verified),
            "REJECTED" => Some(KycStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Origin of a score mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceType {
    /// Applied by the engine from a configured rule
    Automated,
    /// Applied from a caller-supplied delta (admin governance, reviews)
    Manual,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Automated => "AUTOMATED",
            SourceType::Manual => "MANUAL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "AUTOMATED" => Some(SourceType::Automated),
            "MANUAL" => Some(SourceType::Manual),
            _ => None,
        }
    }
}

/// One trust profile per user per role.
///
/// Created on registration, mutated only by the trust engine, never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustProfile {
    pub user_id: String,
    pub role: Role,
    /// Always within `[SCORE_MIN, SCORE_MAX]`
    pub score: f64,
    pub kyc_status: KycStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named scoring rule from the externally seeded catalogue.
///
/// Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustRule {
    /// Unique key, e.g. `PAYMENT_ON_TIME`
    pub code: String,
    /// Role the rule targets; `None` applies to either role
    pub role: Option<Role>,
    pub category: String,
    /// Signed point impact
    pub base_impact: f64,
    pub is_active: bool,
    pub description: String,
}

/// Immutable audit row, exactly one per score mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustLogEntry {
    pub id: String,
    pub user_id: String,
    pub role: Role,
    pub event_code: String,
    /// Delta actually applied, after clamping
    pub impact: f64,
    /// Score value after the mutation
    pub score_snapshot: f64,
    pub description: String,
    /// `SYSTEM` or the acting admin's id
    pub actor: String,
    pub source_type: SourceType,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub created_at: DateTime<Utc>,
}
