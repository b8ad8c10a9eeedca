//! Engine façade and unified configuration.
//!
//! The [`SecurityEngine`] is what the rest of the application talks to:
//! the login endpoint calls the `*_login_*` operations, the
//! transaction-creation endpoint calls [`SecurityEngine::evaluate_transaction`]
//! and [`SecurityEngine::is_transaction_suspicious`]. Collaborators (the
//! counter store and the reporter) are injected at construction; there is
//! no global instance.

use remitguard_auth::{BruteForceConfig, BruteForceGuard, RevokedTokenRegistry};
use remitguard_core::error::{GuardError, Result};
use remitguard_core::observability::{LogConfig, Reporter, SecurityEvent};
use remitguard_core::store::{BoundedStore, CounterStore, StoreConfig};
use remitguard_fraud::{
    FraudConfig, FraudScorer, RiskAssessment, RiskLevel, SuspiciousTransactionRecord,
    SuspiciousTransactionRegistry, TransactionAttempt,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Unified engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Brute-force guard settings.
    pub brute_force: BruteForceConfig,
    /// Fraud scorer settings.
    pub fraud: FraudConfig,
    /// Store access settings.
    pub store: StoreConfig,
    /// Logging settings.
    pub logging: LogConfig,
}

impl EngineConfig {
    /// Development configuration.
    pub fn development() -> Self {
        Self {
            brute_force: BruteForceConfig::development(),
            fraud: FraudConfig::development(),
            store: StoreConfig::development(),
            logging: LogConfig::development(),
        }
    }

    /// Production configuration.
    pub fn production() -> Self {
        Self {
            brute_force: BruteForceConfig::production(),
            fraud: FraudConfig::production(),
            store: StoreConfig::production(),
            logging: LogConfig::production(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `REMITGUARD_ENV` selects the preset (`production`/`prod`, anything
    /// else means development); individual knobs can then be overridden.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("REMITGUARD_ENV").as_deref() {
            Ok("production") | Ok("prod") => Self::production(),
            _ => Self::development(),
        };

        if let Ok(val) = std::env::var("REMITGUARD_MAX_LOGIN_ATTEMPTS") {
            config.brute_force.max_attempts = val
                .parse()
                .map_err(|_| GuardError::config("REMITGUARD_MAX_LOGIN_ATTEMPTS must be an integer"))?;
        }
        if let Ok(val) = std::env::var("REMITGUARD_BLOCK_DURATION_SECS") {
            let secs: u64 = val
                .parse()
                .map_err(|_| GuardError::config("REMITGUARD_BLOCK_DURATION_SECS must be an integer"))?;
            config.brute_force.block_duration = Duration::from_secs(secs);
        }
        if let Ok(val) = std::env::var("REMITGUARD_STORE_TIMEOUT_MS") {
            let ms: u64 = val
                .parse()
                .map_err(|_| GuardError::config("REMITGUARD_STORE_TIMEOUT_MS must be an integer"))?;
            config.store.op_timeout = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| GuardError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Set brute-force settings.
    pub fn with_brute_force(mut self, config: BruteForceConfig) -> Self {
        self.brute_force = config;
        self
    }

    /// Set fraud settings.
    pub fn with_fraud(mut self, config: FraudConfig) -> Self {
        self.fraud = config;
        self
    }

    /// Set store settings.
    pub fn with_store(mut self, config: StoreConfig) -> Self {
        self.store = config;
        self
    }

    /// Validate all component configurations.
    pub fn validate(&self) -> Result<()> {
        self.brute_force.validate()?;
        self.fraud.validate()?;
        if self.store.op_timeout.is_zero() {
            return Err(GuardError::config("store op_timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Real-time abuse and fraud detection engine.
///
/// Thin façade over the brute-force guard, the fraud scorer, and the
/// registries, sharing one timeout-bounded store. All operations follow
/// the engine-wide error contract: infrastructure failures are converted
/// to fail-open defaults, and only `InvalidArgument` reaches the caller.
pub struct SecurityEngine {
    guard: BruteForceGuard,
    scorer: FraudScorer,
    suspects: SuspiciousTransactionRegistry,
    tokens: RevokedTokenRegistry,
    reporter: Arc<dyn Reporter>,
}

impl SecurityEngine {
    /// Wire an engine over the given store and reporter.
    pub fn new(
        store: Arc<dyn CounterStore>,
        reporter: Arc<dyn Reporter>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let store: Arc<dyn CounterStore> =
            Arc::new(BoundedStore::with_config(store, &config.store));

        Ok(Self {
            guard: BruteForceGuard::new(
                Arc::clone(&store),
                Arc::clone(&reporter),
                config.brute_force,
            ),
            scorer: FraudScorer::new(Arc::clone(&store), config.fraud.clone()),
            suspects: SuspiciousTransactionRegistry::new(
                Arc::clone(&store),
                config.fraud.suspect_retention,
            ),
            tokens: RevokedTokenRegistry::new(store),
            reporter,
        })
    }

    /// Record one authentication failure for `identity`.
    pub async fn record_login_failure(&self, identity: &str) -> Result<()> {
        self.guard.record_failure(identity).await
    }

    /// Whether `identity` is currently blocked from authenticating.
    pub async fn is_login_blocked(&self, identity: &str) -> Result<bool> {
        self.guard.is_blocked(identity).await
    }

    /// Clear `identity`'s failure counter after a successful login.
    pub async fn reset_login_failures(&self, identity: &str) -> Result<()> {
        self.guard.reset(identity).await
    }

    /// Evaluate a transaction attempt.
    ///
    /// A CRITICAL assessment persists a suspicious-transaction record and
    /// reports a critical event; a HIGH assessment reports a warning.
    pub async fn evaluate_transaction(&self, tx: &TransactionAttempt) -> Result<RiskAssessment> {
        let assessment = self.scorer.evaluate(tx).await?;
        match assessment.level {
            RiskLevel::Critical => {
                self.suspects.mark(tx, &assessment).await?;
                self.reporter.critical(
                    SecurityEvent::new("transaction.critical_risk")
                        .identity(&tx.identity)
                        .field("transaction_id", &tx.transaction_id)
                        .field("amount", tx.amount)
                        .field("currency", &tx.currency)
                        .field("score", assessment.score)
                        .field("flags", &assessment.flags),
                );
            }
            RiskLevel::High => {
                self.reporter.warn(
                    SecurityEvent::new("transaction.high_risk")
                        .identity(&tx.identity)
                        .field("transaction_id", &tx.transaction_id)
                        .field("score", assessment.score)
                        .field("flags", &assessment.flags),
                );
            }
            RiskLevel::Medium | RiskLevel::Low => {}
        }
        Ok(assessment)
    }

    /// Whether a transaction was marked suspicious.
    pub async fn is_transaction_suspicious(&self, transaction_id: &str) -> Result<bool> {
        self.suspects.is_suspicious(transaction_id).await
    }

    /// The persisted suspicious-transaction record, if any.
    pub async fn suspicious_record(
        &self,
        transaction_id: &str,
    ) -> Result<Option<SuspiciousTransactionRecord>> {
        self.suspects.get(transaction_id).await
    }

    /// Revoke a session token for the remainder of its lifetime.
    pub async fn revoke_token(&self, token_id: &str, remaining_lifetime: Duration) -> Result<()> {
        self.tokens.revoke(token_id, remaining_lifetime).await
    }

    /// Whether a session token has been revoked.
    pub async fn is_token_revoked(&self, token_id: &str) -> Result<bool> {
        self.tokens.is_revoked(token_id).await
    }

    /// The underlying brute-force guard.
    pub fn guard(&self) -> &BruteForceGuard {
        &self.guard
    }

    /// The underlying fraud scorer.
    pub fn scorer(&self) -> &FraudScorer {
        &self.scorer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::development().validate().is_ok());
        assert!(EngineConfig::production().validate().is_ok());
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = EngineConfig::production();
        let text = toml::to_string(&config).unwrap();
        let parsed: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(
            parsed.brute_force.max_attempts,
            config.brute_force.max_attempts
        );
        assert_eq!(parsed.store.op_timeout, config.store.op_timeout);
        assert_eq!(
            parsed.fraud.very_high_amount_threshold,
            config.fraud.very_high_amount_threshold
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig::default()
            .with_brute_force(BruteForceConfig::default().with_max_attempts(0));
        assert!(config.validate().is_err());

        let config = EngineConfig::default()
            .with_store(StoreConfig::default().with_op_timeout(Duration::ZERO));
        assert!(config.validate().is_err());
    }
}
