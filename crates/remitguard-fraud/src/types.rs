//! Fraud scoring types.

use chrono::{DateTime, Utc};
use remitguard_core::error::{GuardError, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Transaction Input
// ============================================================================

/// A transaction attempt submitted for risk evaluation.
///
/// The engine operates on an opaque identity string and makes no
/// assumption about its format; callers pass whatever key they scope
/// counters under (typically a user ID). Amounts are in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionAttempt {
    /// Identity the transaction is attributed to.
    pub identity: String,
    /// Amount in minor units (e.g. cents).
    pub amount: i64,
    /// ISO 4217 alpha-3 currency code.
    pub currency: String,
    /// Unique transaction ID.
    pub transaction_id: String,
    /// When the attempt was made.
    pub timestamp: DateTime<Utc>,
}

impl TransactionAttempt {
    /// Create an attempt.
    pub fn new(
        identity: impl Into<String>,
        amount: i64,
        currency: impl Into<String>,
        transaction_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            identity: identity.into(),
            amount,
            currency: currency.into(),
            transaction_id: transaction_id.into(),
            timestamp,
        }
    }

    /// Validate the attempt. Rejected attempts never reach the store.
    pub fn validate(&self) -> Result<()> {
        if self.identity.is_empty() {
            return Err(GuardError::invalid_argument("identity must not be empty"));
        }
        if self.transaction_id.is_empty() {
            return Err(GuardError::invalid_argument(
                "transaction_id must not be empty",
            ));
        }
        if self.amount <= 0 {
            return Err(GuardError::invalid_argument("amount must be positive"));
        }
        if self.currency.len() != 3 || !self.currency.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(GuardError::invalid_argument(format!(
                "currency must be an ISO 4217 alpha-3 code, got {:?}",
                self.currency
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Signals and Assessment
// ============================================================================

/// One fraud rule that fired during an evaluation.
///
/// Flags are transient; only the aggregate assessment is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FraudFlag {
    /// Amount at or above the very-high threshold.
    VeryHighAmount,
    /// Amount at or above the high threshold.
    HighAmount,
    /// Amount matches a configured suspicious round amount.
    SuspiciousRoundAmount,
    /// Hourly transaction count exceeded.
    HighFrequencyHour,
    /// Daily transaction count exceeded.
    HighFrequencyDay,
    /// Too many transactions in rapid succession.
    RapidTransactions,
    /// Transaction outside business hours.
    UnusualHours,
    /// Same exact amount repeated too often.
    RepeatedAmount,
}

impl std::fmt::Display for FraudFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VeryHighAmount => write!(f, "VERY_HIGH_AMOUNT"),
            Self::HighAmount => write!(f, "HIGH_AMOUNT"),
            Self::SuspiciousRoundAmount => write!(f, "SUSPICIOUS_ROUND_AMOUNT"),
            Self::HighFrequencyHour => write!(f, "HIGH_FREQUENCY_HOUR"),
            Self::HighFrequencyDay => write!(f, "HIGH_FREQUENCY_DAY"),
            Self::RapidTransactions => write!(f, "RAPID_TRANSACTIONS"),
            Self::UnusualHours => write!(f, "UNUSUAL_HOURS"),
            Self::RepeatedAmount => write!(f, "REPEATED_AMOUNT"),
        }
    }
}

/// Categorical risk bucket derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// 0–29: normal processing.
    Low,
    /// 30–49: flag for review.
    Medium,
    /// 50–69: hold for investigation.
    High,
    /// 70–100: block and alert.
    Critical,
}

impl RiskLevel {
    /// Map a clamped score to its level. The buckets have no gaps and no
    /// overlaps.
    #[must_use]
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=29 => Self::Low,
            30..=49 => Self::Medium,
            50..=69 => Self::High,
            _ => Self::Critical,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Outcome of one transaction evaluation. Created fresh per evaluation
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Aggregate score, clamped to [0, 100].
    pub score: u32,
    /// Categorical bucket for the score.
    pub level: RiskLevel,
    /// Rules that fired, in evaluation order.
    pub flags: Vec<FraudFlag>,
}

impl RiskAssessment {
    /// Build an assessment from an unclamped sum of weights.
    #[must_use]
    pub fn from_score(score: u32, flags: Vec<FraudFlag>) -> Self {
        let score = score.min(100);
        Self {
            score,
            level: RiskLevel::from_score(score),
            flags,
        }
    }

    /// The fail-open assessment: zero risk, no flags. Returned when the
    /// store is unavailable and the transaction proceeds unscored.
    #[must_use]
    pub fn unscored() -> Self {
        Self {
            score: 0,
            level: RiskLevel::Low,
            flags: Vec::new(),
        }
    }

    /// Whether the score reached the critical bucket.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.level == RiskLevel::Critical
    }

    /// Whether a specific rule fired.
    #[must_use]
    pub fn has_flag(&self, flag: FraudFlag) -> bool {
        self.flags.contains(&flag)
    }
}
