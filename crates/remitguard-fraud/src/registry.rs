//! Suspicious-transaction registry.
//!
//! Transactions whose assessment reaches the critical bucket are
//! persisted under `fraud:suspect:{transaction_id}` with a long
//! retention, for later lookup by support and compliance tooling.
//! Records are written once and never mutated.

use crate::types::{FraudFlag, RiskAssessment, RiskLevel, TransactionAttempt};
use chrono::{DateTime, Utc};
use remitguard_core::error::{GuardError, Result};
use remitguard_core::store::CounterStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

fn suspect_key(transaction_id: &str) -> String {
    format!("fraud:suspect:{transaction_id}")
}

/// A transaction that scored critical, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousTransactionRecord {
    /// Transaction ID the record is keyed by.
    pub transaction_id: String,
    /// Identity that submitted the transaction.
    pub identity: String,
    /// Amount in minor units.
    pub amount: i64,
    /// ISO 4217 alpha-3 currency code.
    pub currency: String,
    /// Aggregate score at detection time.
    pub score: u32,
    /// Risk level at detection time.
    pub level: RiskLevel,
    /// Rules that fired.
    pub flags: Vec<FraudFlag>,
    /// When the transaction was flagged.
    pub detected_at: DateTime<Utc>,
}

/// Long-retention registry of critical-risk transactions.
pub struct SuspiciousTransactionRegistry {
    store: Arc<dyn CounterStore>,
    retention: Duration,
}

impl SuspiciousTransactionRegistry {
    /// Create a registry with the given record retention.
    pub fn new(store: Arc<dyn CounterStore>, retention: Duration) -> Self {
        Self { store, retention }
    }

    /// Persist `tx` with its assessment. Idempotent upsert: marking the
    /// same transaction twice rewrites the record in place.
    ///
    /// Store outages are logged and swallowed; a lost record degrades
    /// later lookups, never the payment itself.
    pub async fn mark(&self, tx: &TransactionAttempt, assessment: &RiskAssessment) -> Result<()> {
        tx.validate()?;
        let record = SuspiciousTransactionRecord {
            transaction_id: tx.transaction_id.clone(),
            identity: tx.identity.clone(),
            amount: tx.amount,
            currency: tx.currency.clone(),
            score: assessment.score,
            level: assessment.level,
            flags: assessment.flags.clone(),
            detected_at: Utc::now(),
        };
        match self.write(&record).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_infrastructure() => {
                warn!(
                    transaction_id = %tx.transaction_id,
                    error = %err,
                    "store failed while marking suspicious transaction"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn write(&self, record: &SuspiciousTransactionRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        self.store
            .set(&suspect_key(&record.transaction_id), &payload, self.retention)
            .await
    }

    /// Whether `transaction_id` was marked suspicious; `false` for
    /// unknown IDs and on store failure.
    pub async fn is_suspicious(&self, transaction_id: &str) -> Result<bool> {
        if transaction_id.is_empty() {
            return Err(GuardError::invalid_argument(
                "transaction_id must not be empty",
            ));
        }
        match self.store.exists(&suspect_key(transaction_id)).await {
            Ok(found) => Ok(found),
            Err(err) if err.is_infrastructure() => {
                warn!(
                    transaction_id,
                    error = %err,
                    "store failed during suspicion check; failing open"
                );
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// The persisted record, if any; `None` on store failure.
    pub async fn get(&self, transaction_id: &str) -> Result<Option<SuspiciousTransactionRecord>> {
        if transaction_id.is_empty() {
            return Err(GuardError::invalid_argument(
                "transaction_id must not be empty",
            ));
        }
        match self.read(transaction_id).await {
            Ok(record) => Ok(record),
            Err(err) if err.is_infrastructure() => {
                warn!(
                    transaction_id,
                    error = %err,
                    "store failed during record lookup; failing open"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn read(&self, transaction_id: &str) -> Result<Option<SuspiciousTransactionRecord>> {
        match self.store.get(&suspect_key(transaction_id)).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use remitguard_core::store::{FailingCounterStore, MemoryCounterStore};

    fn attempt() -> TransactionAttempt {
        TransactionAttempt::new(
            "user-1",
            60_000,
            "EUR",
            "tx-1",
            Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap(),
        )
    }

    fn critical_assessment() -> RiskAssessment {
        RiskAssessment::from_score(
            85,
            vec![FraudFlag::VeryHighAmount, FraudFlag::RapidTransactions],
        )
    }

    #[tokio::test]
    async fn test_mark_and_lookup() {
        let registry = SuspiciousTransactionRegistry::new(
            Arc::new(MemoryCounterStore::new()),
            Duration::from_secs(7 * 24 * 3600),
        );
        assert!(!registry.is_suspicious("tx-1").await.unwrap());

        registry.mark(&attempt(), &critical_assessment()).await.unwrap();
        assert!(registry.is_suspicious("tx-1").await.unwrap());
        assert!(!registry.is_suspicious("tx-unknown").await.unwrap());

        let record = registry.get("tx-1").await.unwrap().unwrap();
        assert_eq!(record.identity, "user-1");
        assert_eq!(record.score, 85);
        assert_eq!(record.level, RiskLevel::Critical);
        assert!(record.flags.contains(&FraudFlag::VeryHighAmount));
    }

    #[tokio::test]
    async fn test_mark_is_idempotent() {
        let registry = SuspiciousTransactionRegistry::new(
            Arc::new(MemoryCounterStore::new()),
            Duration::from_secs(3600),
        );
        registry.mark(&attempt(), &critical_assessment()).await.unwrap();
        registry.mark(&attempt(), &critical_assessment()).await.unwrap();
        assert!(registry.is_suspicious("tx-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_expires_after_retention() {
        let registry = SuspiciousTransactionRegistry::new(
            Arc::new(MemoryCounterStore::new()),
            Duration::from_millis(20),
        );
        registry.mark(&attempt(), &critical_assessment()).await.unwrap();
        std::thread::sleep(Duration::from_millis(30));
        assert!(!registry.is_suspicious("tx-1").await.unwrap());
        assert!(registry.get("tx-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_outage_fails_open() {
        let registry = SuspiciousTransactionRegistry::new(
            Arc::new(FailingCounterStore),
            Duration::from_secs(3600),
        );
        registry.mark(&attempt(), &critical_assessment()).await.unwrap();
        assert!(!registry.is_suspicious("tx-1").await.unwrap());
        assert!(registry.get("tx-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_transaction_id_rejected() {
        let registry = SuspiciousTransactionRegistry::new(
            Arc::new(MemoryCounterStore::new()),
            Duration::from_secs(3600),
        );
        assert!(registry.is_suspicious("").await.is_err());
        assert!(registry.get("").await.is_err());
    }
}
