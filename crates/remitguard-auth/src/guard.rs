//! Brute-force guard for authentication failures.
//!
//! Counts failures per identity inside a sliding window and escalates to
//! a temporary block once the threshold is crossed:
//!
//! ```text
//! NORMAL → (failures accumulate) → WARNING (≥ warn ratio)
//!        → BLOCKED (≥ threshold) → NORMAL (block TTL expires, or
//!                                          counter reset on success)
//! ```
//!
//! WARNING is advisory only; it emits a signal and changes nothing else.
//!
//! ## Failure semantics
//!
//! Store outages never surface to the caller: recording fails silently
//! (after logging) and `is_blocked` answers `false`. Authentication must
//! fail open on infrastructure failure; a store outage must not lock
//! legitimate users out. This is a documented security/availability
//! tradeoff; do not change it silently.

use crate::block::BlockRegistry;
use remitguard_core::error::{GuardError, Result};
use remitguard_core::observability::{Reporter, SecurityEvent};
use remitguard_core::store::CounterStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

fn failure_key(identity: &str) -> String {
    format!("auth:fail:{identity}")
}

fn validate_identity(identity: &str) -> Result<()> {
    if identity.is_empty() {
        return Err(GuardError::invalid_argument("identity must not be empty"));
    }
    Ok(())
}

/// Brute-force guard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BruteForceConfig {
    /// Failures within the window that trigger a block.
    pub max_attempts: u32,
    /// Fraction of `max_attempts` at which an advisory warning fires.
    pub warn_ratio: f64,
    /// Sliding window over which failures accumulate.
    pub window: Duration,
    /// How long a triggered block lasts.
    pub block_duration: Duration,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            warn_ratio: 0.8,
            window: Duration::from_secs(15 * 60),
            block_duration: Duration::from_secs(30 * 60),
        }
    }
}

impl BruteForceConfig {
    /// Production configuration.
    pub fn production() -> Self {
        Self::default()
    }

    /// Development configuration with a short block for local testing.
    pub fn development() -> Self {
        Self {
            block_duration: Duration::from_secs(60),
            ..Default::default()
        }
    }

    /// Set the failure threshold.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the failure window.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Set the block duration.
    pub fn with_block_duration(mut self, duration: Duration) -> Self {
        self.block_duration = duration;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(GuardError::config("max_attempts must be at least 1"));
        }
        if self.window.is_zero() || self.block_duration.is_zero() {
            return Err(GuardError::config("window and block_duration must be non-zero"));
        }
        if !(self.warn_ratio > 0.0 && self.warn_ratio <= 1.0) {
            return Err(GuardError::config("warn_ratio must be in (0, 1]"));
        }
        Ok(())
    }

    /// Count at which the advisory warning fires.
    fn warn_threshold(&self) -> i64 {
        (f64::from(self.max_attempts) * self.warn_ratio).ceil() as i64
    }
}

/// Advisory state of an identity under the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Below the warning ratio.
    Normal,
    /// Approaching the block threshold.
    Warning,
    /// Actively blocked.
    Blocked,
}

/// Counter-based guard against credential brute-forcing.
pub struct BruteForceGuard {
    store: Arc<dyn CounterStore>,
    blocks: BlockRegistry,
    reporter: Arc<dyn Reporter>,
    config: BruteForceConfig,
}

impl BruteForceGuard {
    /// Create a guard over the given store and reporter.
    pub fn new(
        store: Arc<dyn CounterStore>,
        reporter: Arc<dyn Reporter>,
        config: BruteForceConfig,
    ) -> Self {
        let blocks = BlockRegistry::new(Arc::clone(&store), config.block_duration);
        Self {
            store,
            blocks,
            reporter,
            config,
        }
    }

    /// The block registry backing this guard.
    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    /// Record one authentication failure for `identity`.
    ///
    /// Crossing the threshold creates a block record and reports a
    /// critical event; crossing the warning ratio reports an advisory
    /// one. An already-blocked identity is not re-counted.
    pub async fn record_failure(&self, identity: &str) -> Result<()> {
        validate_identity(identity)?;
        match self.record_failure_inner(identity).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_infrastructure() => {
                warn!(identity, error = %err, "store failed while recording login failure; failing open");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn record_failure_inner(&self, identity: &str) -> Result<()> {
        if self.blocks.is_blocked(identity).await? {
            self.reporter.warn(
                SecurityEvent::new("login.blocked_retry").identity(identity),
            );
            return Ok(());
        }

        let count = self
            .store
            .incr_with_expiry(&failure_key(identity), self.config.window)
            .await?;

        if count >= i64::from(self.config.max_attempts) {
            self.blocks
                .block(identity, count, "login failure threshold exceeded")
                .await?;
            warn!(identity, count, "identity blocked after repeated login failures");
            self.reporter.critical(
                SecurityEvent::new("login.blocked")
                    .identity(identity)
                    .field("count", count)
                    .field("block_duration_secs", self.config.block_duration.as_secs()),
            );
        } else if count >= self.config.warn_threshold() {
            self.reporter.warn(
                SecurityEvent::new("login.approaching_threshold")
                    .identity(identity)
                    .field("count", count)
                    .field("max_attempts", self.config.max_attempts),
            );
        }
        Ok(())
    }

    /// Whether `identity` is currently blocked. Pure read; answers
    /// `false` on store failure (fail-open).
    pub async fn is_blocked(&self, identity: &str) -> Result<bool> {
        validate_identity(identity)?;
        match self.blocks.is_blocked(identity).await {
            Ok(blocked) => Ok(blocked),
            Err(err) if err.is_infrastructure() => {
                warn!(identity, error = %err, "store failed during block check; failing open");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Clear the failure counter after a successful authentication.
    ///
    /// An active block is deliberately left untouched: once triggered it
    /// runs its full duration regardless of a later successful credential
    /// presentation through another channel.
    pub async fn reset(&self, identity: &str) -> Result<()> {
        validate_identity(identity)?;
        match self.store.del(&failure_key(identity)).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_infrastructure() => {
                warn!(identity, error = %err, "store failed while resetting failures; failing open");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Current failure count within the window; 0 on store failure.
    pub async fn failure_count(&self, identity: &str) -> Result<i64> {
        validate_identity(identity)?;
        match self.store.get(&failure_key(identity)).await {
            Ok(value) => Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0)),
            Err(err) if err.is_infrastructure() => Ok(0),
            Err(err) => Err(err),
        }
    }

    /// Advisory state of `identity`.
    pub async fn state(&self, identity: &str) -> Result<GuardState> {
        if self.is_blocked(identity).await? {
            return Ok(GuardState::Blocked);
        }
        let count = self.failure_count(identity).await?;
        if count >= self.config.warn_threshold() {
            Ok(GuardState::Warning)
        } else {
            Ok(GuardState::Normal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remitguard_core::observability::MemoryReporter;
    use remitguard_core::store::{FailingCounterStore, MemoryCounterStore};

    fn guard_with(config: BruteForceConfig) -> (BruteForceGuard, Arc<MemoryReporter>) {
        let reporter = Arc::new(MemoryReporter::new());
        let guard = BruteForceGuard::new(
            Arc::new(MemoryCounterStore::new()),
            Arc::clone(&reporter) as Arc<dyn Reporter>,
            config,
        );
        (guard, reporter)
    }

    fn guard() -> (BruteForceGuard, Arc<MemoryReporter>) {
        guard_with(BruteForceConfig::default())
    }

    #[tokio::test]
    async fn test_blocks_at_threshold_not_before() {
        let (guard, _) = guard();
        for _ in 0..4 {
            guard.record_failure("u1").await.unwrap();
        }
        assert!(!guard.is_blocked("u1").await.unwrap());

        guard.record_failure("u1").await.unwrap();
        assert!(guard.is_blocked("u1").await.unwrap());
        assert_eq!(guard.state("u1").await.unwrap(), GuardState::Blocked);
    }

    #[tokio::test]
    async fn test_reset_truly_clears_counter() {
        let (guard, _) = guard();
        for _ in 0..4 {
            guard.record_failure("u1").await.unwrap();
        }
        guard.reset("u1").await.unwrap();
        assert_eq!(guard.failure_count("u1").await.unwrap(), 0);

        for _ in 0..4 {
            guard.record_failure("u1").await.unwrap();
        }
        assert!(!guard.is_blocked("u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_block_survives_reset() {
        let (guard, _) = guard();
        for _ in 0..5 {
            guard.record_failure("u1").await.unwrap();
        }
        assert!(guard.is_blocked("u1").await.unwrap());

        guard.reset("u1").await.unwrap();
        assert!(guard.is_blocked("u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_blocked_identity_is_not_recounted() {
        let (guard, reporter) = guard();
        for _ in 0..5 {
            guard.record_failure("u1").await.unwrap();
        }
        let record = guard.blocks().get("u1").await.unwrap().unwrap();
        assert_eq!(record.triggering_count, 5);

        guard.record_failure("u1").await.unwrap();
        assert!(reporter.names().contains(&"login.blocked_retry".to_string()));
        // Counter was not incremented past the block.
        let record = guard.blocks().get("u1").await.unwrap().unwrap();
        assert_eq!(record.triggering_count, 5);
    }

    #[tokio::test]
    async fn test_warning_fires_at_eighty_percent() {
        let (guard, reporter) = guard();
        for _ in 0..3 {
            guard.record_failure("u1").await.unwrap();
        }
        assert!(!reporter.names().contains(&"login.approaching_threshold".to_string()));
        assert_eq!(guard.state("u1").await.unwrap(), GuardState::Normal);

        guard.record_failure("u1").await.unwrap();
        assert!(reporter.names().contains(&"login.approaching_threshold".to_string()));
        assert_eq!(guard.state("u1").await.unwrap(), GuardState::Warning);
    }

    #[tokio::test]
    async fn test_counter_expires_with_window() {
        let (guard, _) = guard_with(BruteForceConfig {
            window: Duration::from_millis(30),
            ..Default::default()
        });
        for _ in 0..4 {
            guard.record_failure("u1").await.unwrap();
        }
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(guard.failure_count("u1").await.unwrap(), 0);

        guard.record_failure("u1").await.unwrap();
        assert!(!guard.is_blocked("u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_identity_rejected() {
        let (guard, _) = guard();
        assert!(matches!(
            guard.record_failure("").await.unwrap_err(),
            GuardError::InvalidArgument(_)
        ));
        assert!(matches!(
            guard.is_blocked("").await.unwrap_err(),
            GuardError::InvalidArgument(_)
        ));
        assert!(matches!(
            guard.reset("").await.unwrap_err(),
            GuardError::InvalidArgument(_)
        ));
    }

    #[tokio::test]
    async fn test_store_outage_fails_open() {
        let reporter = Arc::new(MemoryReporter::new());
        let guard = BruteForceGuard::new(
            Arc::new(FailingCounterStore),
            Arc::clone(&reporter) as Arc<dyn Reporter>,
            BruteForceConfig::default(),
        );

        guard.record_failure("u1").await.unwrap();
        assert!(!guard.is_blocked("u1").await.unwrap());
        guard.reset("u1").await.unwrap();
        assert_eq!(guard.failure_count("u1").await.unwrap(), 0);
        assert_eq!(guard.state("u1").await.unwrap(), GuardState::Normal);
    }

    #[test]
    fn test_config_validation() {
        assert!(BruteForceConfig::default().validate().is_ok());
        assert!(BruteForceConfig::default()
            .with_max_attempts(0)
            .validate()
            .is_err());
        assert!(BruteForceConfig {
            warn_ratio: 1.5,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(BruteForceConfig {
            window: Duration::ZERO,
            ..Default::default()
        }
        .validate()
        .is_err());
    }
}
