//! Weighted multi-signal risk scoring.
//!
//! Each evaluation runs every signal and sums the weights of those that
//! fire. The four velocity signals increment their counters on every
//! evaluation (the evaluation is what builds the counters, not just a
//! read of them), so signal order matters only for flag collection,
//! never for score correctness.
//!
//! ## Failure semantics
//!
//! Any store error during scoring is caught and logged, and the
//! transaction proceeds unscored (score 0, LOW). Fraud detection never
//! blocks a legitimate payment because of an infrastructure failure.

use crate::types::{FraudFlag, RiskAssessment, TransactionAttempt};
use chrono::Timelike;
use remitguard_core::error::{GuardError, Result};
use remitguard_core::store::CounterStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const HOUR: Duration = Duration::from_secs(3600);
const DAY: Duration = Duration::from_secs(24 * 3600);

fn hourly_key(identity: &str) -> String {
    format!("fraud:vel:hour:{identity}")
}

fn daily_key(tx: &TransactionAttempt) -> String {
    format!(
        "fraud:vel:day:{}:{}",
        tx.identity,
        tx.timestamp.format("%Y%m%d")
    )
}

fn rapid_key(identity: &str) -> String {
    format!("fraud:vel:rapid:{identity}")
}

fn amount_key(identity: &str, amount: i64) -> String {
    format!("fraud:amount:{identity}:{amount}")
}

// ============================================================================
// Configuration
// ============================================================================

/// Score contribution of each signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalWeights {
    /// Amount at or above the very-high threshold.
    pub very_high_amount: u32,
    /// Amount at or above the high threshold.
    pub high_amount: u32,
    /// Suspicious round amount.
    pub round_amount: u32,
    /// Hourly velocity exceeded.
    pub hourly_velocity: u32,
    /// Daily velocity exceeded.
    pub daily_velocity: u32,
    /// Rapid-succession velocity exceeded.
    pub rapid_succession: u32,
    /// Outside business hours.
    pub unusual_hours: u32,
    /// Repeated exact amount.
    pub repeated_amount: u32,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            very_high_amount: 40,
            high_amount: 20,
            round_amount: 15,
            hourly_velocity: 25,
            daily_velocity: 30,
            rapid_succession: 35,
            unusual_hours: 10,
            repeated_amount: 20,
        }
    }
}

/// Fraud scorer configuration. Thresholds and weights are configuration,
/// not code; per-environment tuning needs no recompilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudConfig {
    /// Amount (minor units) from which `HighAmount` fires.
    pub high_amount_threshold: i64,
    /// Amount (minor units) from which `VeryHighAmount` fires.
    pub very_high_amount_threshold: i64,
    /// Exact amounts considered suspicious when matched.
    pub suspicious_round_amounts: Vec<i64>,
    /// Transactions per hour above which `HighFrequencyHour` fires.
    pub max_per_hour: i64,
    /// Transactions per calendar day above which `HighFrequencyDay` fires.
    pub max_per_day: i64,
    /// Transactions inside the rapid window above which
    /// `RapidTransactions` fires.
    pub max_rapid: i64,
    /// Repetitions of one exact amount per hour above which
    /// `RepeatedAmount` fires.
    pub repeated_amount_threshold: i64,
    /// First hour (UTC, inclusive) of the business day.
    pub business_hours_start: u32,
    /// Last hour (UTC, exclusive) of the business day.
    pub business_hours_end: u32,
    /// Length of the rapid-succession window.
    pub rapid_window: Duration,
    /// Retention of suspicious-transaction records.
    pub suspect_retention: Duration,
    /// Signal weights.
    pub weights: SignalWeights,
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            high_amount_threshold: 10_000,
            very_high_amount_threshold: 50_000,
            suspicious_round_amounts: vec![10_000, 20_000, 50_000, 100_000],
            max_per_hour: 5,
            max_per_day: 20,
            max_rapid: 3,
            repeated_amount_threshold: 5,
            business_hours_start: 8,
            business_hours_end: 20,
            rapid_window: Duration::from_secs(60),
            suspect_retention: Duration::from_secs(7 * 24 * 3600),
            weights: SignalWeights::default(),
        }
    }
}

impl FraudConfig {
    /// Production configuration.
    pub fn production() -> Self {
        Self::default()
    }

    /// Development configuration with short retention.
    pub fn development() -> Self {
        Self {
            suspect_retention: Duration::from_secs(24 * 3600),
            ..Default::default()
        }
    }

    /// Set the amount thresholds.
    pub fn with_amount_thresholds(mut self, high: i64, very_high: i64) -> Self {
        self.high_amount_threshold = high;
        self.very_high_amount_threshold = very_high;
        self
    }

    /// Set the velocity limits.
    pub fn with_velocity_limits(mut self, per_hour: i64, per_day: i64, rapid: i64) -> Self {
        self.max_per_hour = per_hour;
        self.max_per_day = per_day;
        self.max_rapid = rapid;
        self
    }

    /// Set the business hours (start inclusive, end exclusive, UTC).
    pub fn with_business_hours(mut self, start: u32, end: u32) -> Self {
        self.business_hours_start = start;
        self.business_hours_end = end;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.high_amount_threshold <= 0 || self.very_high_amount_threshold <= 0 {
            return Err(GuardError::config("amount thresholds must be positive"));
        }
        if self.very_high_amount_threshold < self.high_amount_threshold {
            return Err(GuardError::config(
                "very_high_amount_threshold must be >= high_amount_threshold",
            ));
        }
        if self.business_hours_start >= self.business_hours_end || self.business_hours_end > 24 {
            return Err(GuardError::config("business hours must satisfy start < end <= 24"));
        }
        if self.rapid_window.is_zero() || self.suspect_retention.is_zero() {
            return Err(GuardError::config(
                "rapid_window and suspect_retention must be non-zero",
            ));
        }
        Ok(())
    }

    fn is_business_hour(&self, hour: u32) -> bool {
        (self.business_hours_start..self.business_hours_end).contains(&hour)
    }
}

// ============================================================================
// Scorer
// ============================================================================

/// Evaluates transaction attempts against independent fraud signals and
/// produces a weighted [`RiskAssessment`].
pub struct FraudScorer {
    store: Arc<dyn CounterStore>,
    config: FraudConfig,
}

impl FraudScorer {
    /// Create a scorer over the given store.
    pub fn new(store: Arc<dyn CounterStore>, config: FraudConfig) -> Self {
        Self { store, config }
    }

    /// The scorer's configuration.
    pub fn config(&self) -> &FraudConfig {
        &self.config
    }

    /// Evaluate one transaction attempt.
    ///
    /// Increments the hourly, daily, rapid, and exact-amount counters,
    /// checks the static signals (amount thresholds, round amounts,
    /// time of day) against the input, and returns the summed, clamped
    /// assessment. The only surfaced error is `InvalidArgument`.
    pub async fn evaluate(&self, tx: &TransactionAttempt) -> Result<RiskAssessment> {
        tx.validate()?;
        match self.evaluate_inner(tx).await {
            Ok(assessment) => Ok(assessment),
            Err(err) if err.is_infrastructure() => {
                warn!(
                    identity = %tx.identity,
                    transaction_id = %tx.transaction_id,
                    error = %err,
                    "store failed during fraud scoring; transaction proceeds unscored"
                );
                Ok(RiskAssessment::unscored())
            }
            Err(err) => Err(err),
        }
    }

    async fn evaluate_inner(&self, tx: &TransactionAttempt) -> Result<RiskAssessment> {
        let cfg = &self.config;
        let w = &cfg.weights;
        let mut score = 0u32;
        let mut flags = Vec::new();

        // 1. Amount thresholds (pure read of the input).
        if tx.amount >= cfg.very_high_amount_threshold {
            score += w.very_high_amount;
            flags.push(FraudFlag::VeryHighAmount);
        } else if tx.amount >= cfg.high_amount_threshold {
            score += w.high_amount;
            flags.push(FraudFlag::HighAmount);
        }

        // 2. Round-amount heuristic.
        if cfg.suspicious_round_amounts.contains(&tx.amount) {
            score += w.round_amount;
            flags.push(FraudFlag::SuspiciousRoundAmount);
        }

        // 3. Hourly velocity.
        let hourly = self
            .store
            .incr_with_expiry(&hourly_key(&tx.identity), HOUR)
            .await?;
        if hourly > cfg.max_per_hour {
            score += w.hourly_velocity;
            flags.push(FraudFlag::HighFrequencyHour);
        }

        // 4. Daily velocity, keyed by the calendar date of the attempt.
        let daily = self.store.incr_with_expiry(&daily_key(tx), DAY).await?;
        if daily > cfg.max_per_day {
            score += w.daily_velocity;
            flags.push(FraudFlag::HighFrequencyDay);
        }

        // 5. Rapid succession.
        let rapid = self
            .store
            .incr_with_expiry(&rapid_key(&tx.identity), cfg.rapid_window)
            .await?;
        if rapid > cfg.max_rapid {
            score += w.rapid_succession;
            flags.push(FraudFlag::RapidTransactions);
        }

        // 6. Time of day, from the supplied timestamp (never the wall
        //    clock; evaluations must be reproducible).
        if !cfg.is_business_hour(tx.timestamp.hour()) {
            score += w.unusual_hours;
            flags.push(FraudFlag::UnusualHours);
        }

        // 7. Repeated exact amount.
        let repeats = self
            .store
            .incr_with_expiry(&amount_key(&tx.identity, tx.amount), HOUR)
            .await?;
        if repeats > cfg.repeated_amount_threshold {
            score += w.repeated_amount;
            flags.push(FraudFlag::RepeatedAmount);
        }

        Ok(RiskAssessment::from_score(score, flags))
    }
}
