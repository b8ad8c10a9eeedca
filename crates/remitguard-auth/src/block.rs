//! Temporary identity blocks.
//!
//! A block is a JSON record under `auth:block:{identity}` whose TTL is the
//! block duration. The record's existence is the sole authority for
//! "is blocked"; no separate flag is stored anywhere, so a block is
//! lifted implicitly by key expiry.

use chrono::{DateTime, Utc};
use remitguard_core::error::Result;
use remitguard_core::store::CounterStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

fn block_key(identity: &str) -> String {
    format!("auth:block:{identity}")
}

/// Why and when an identity was blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRecord {
    /// When the block was created.
    pub blocked_at: DateTime<Utc>,
    /// Failure count that triggered the block.
    pub triggering_count: i64,
    /// Human-readable reason.
    pub reason: String,
}

/// Registry of temporarily blocked identities.
///
/// Methods propagate store errors; the fail-open conversion happens at
/// the [`BruteForceGuard`](crate::BruteForceGuard) boundary.
pub struct BlockRegistry {
    store: Arc<dyn CounterStore>,
    block_duration: Duration,
}

impl BlockRegistry {
    /// Create a registry writing blocks with the given duration.
    pub fn new(store: Arc<dyn CounterStore>, block_duration: Duration) -> Self {
        Self {
            store,
            block_duration,
        }
    }

    /// Block `identity` for the configured duration.
    pub async fn block(&self, identity: &str, triggering_count: i64, reason: &str) -> Result<()> {
        let record = BlockRecord {
            blocked_at: Utc::now(),
            triggering_count,
            reason: reason.to_string(),
        };
        let payload = serde_json::to_string(&record)?;
        self.store
            .set(&block_key(identity), &payload, self.block_duration)
            .await
    }

    /// Whether `identity` has an active block.
    pub async fn is_blocked(&self, identity: &str) -> Result<bool> {
        self.store.exists(&block_key(identity)).await
    }

    /// The active block record, if any.
    pub async fn get(&self, identity: &str) -> Result<Option<BlockRecord>> {
        match self.store.get(&block_key(identity)).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Remaining block time, if any.
    pub async fn remaining(&self, identity: &str) -> Result<Option<Duration>> {
        self.store.ttl(&block_key(identity)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remitguard_core::store::MemoryCounterStore;

    fn registry() -> BlockRegistry {
        BlockRegistry::new(
            Arc::new(MemoryCounterStore::new()),
            Duration::from_secs(1800),
        )
    }

    #[tokio::test]
    async fn test_block_round_trip() {
        let blocks = registry();
        assert!(!blocks.is_blocked("u1").await.unwrap());

        blocks.block("u1", 5, "threshold exceeded").await.unwrap();
        assert!(blocks.is_blocked("u1").await.unwrap());

        let record = blocks.get("u1").await.unwrap().unwrap();
        assert_eq!(record.triggering_count, 5);
        assert_eq!(record.reason, "threshold exceeded");
        assert!(blocks.remaining("u1").await.unwrap().unwrap() <= Duration::from_secs(1800));
    }

    #[tokio::test]
    async fn test_block_expires_with_ttl() {
        let blocks = BlockRegistry::new(
            Arc::new(MemoryCounterStore::new()),
            Duration::from_millis(20),
        );
        blocks.block("u1", 5, "threshold exceeded").await.unwrap();
        std::thread::sleep(Duration::from_millis(30));
        assert!(!blocks.is_blocked("u1").await.unwrap());
        assert!(blocks.get("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_identity_is_not_blocked() {
        let blocks = registry();
        assert!(!blocks.is_blocked("nobody").await.unwrap());
        assert!(blocks.remaining("nobody").await.unwrap().is_none());
    }
}
