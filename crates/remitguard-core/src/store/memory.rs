//! In-memory counter store.

use super::CounterStore;
use crate::error::{GuardError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local [`CounterStore`] with lazy TTL expiry.
///
/// Suitable for tests and single-node deployments. Per-key atomicity is
/// provided by an internal lock held only for the duration of one call,
/// which satisfies the linearizable-increment contract within a process.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCounterStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys. Expired keys are purged.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, e| !e.is_expired(now));
        entries.len()
    }

    /// Whether the store holds no live keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<i64> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();

        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                let current: i64 = entry.value.parse().map_err(|_| {
                    GuardError::Serialization(format!("value at {key} is not an integer"))
                })?;
                let next = current + 1;
                // The TTL set by the first increment stays as-is.
                entry.value = next.to_string();
                Ok(next)
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: "1".to_string(),
                        expires_at: now + ttl,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).is_some_and(|e| !e.is_expired(now)))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let now = Instant::now();
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.expires_at.duration_since(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_incr_starts_at_one() {
        let store = MemoryCounterStore::new();
        assert_eq!(
            store
                .incr_with_expiry("k", Duration::from_secs(60))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .incr_with_expiry("k", Duration::from_secs(60))
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_incr_does_not_refresh_ttl() {
        let store = MemoryCounterStore::new();
        store
            .incr_with_expiry("k", Duration::from_millis(50))
            .await
            .unwrap();

        std::thread::sleep(Duration::from_millis(30));
        // Second increment must keep the original deadline.
        store
            .incr_with_expiry("k", Duration::from_secs(3600))
            .await
            .unwrap();

        std::thread::sleep(Duration::from_millis(30));
        assert!(!store.exists("k").await.unwrap(), "window must have closed");
    }

    #[tokio::test]
    async fn test_counter_resets_after_expiry() {
        let store = MemoryCounterStore::new();
        store
            .incr_with_expiry("k", Duration::from_millis(20))
            .await
            .unwrap();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(
            store
                .incr_with_expiry("k", Duration::from_secs(60))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_get_set_del_exists() {
        let store = MemoryCounterStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(store.exists("k").await.unwrap());

        store.del("k").await.unwrap();
        assert!(!store.exists("k").await.unwrap());
        // Deleting an absent key is fine.
        store.del("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_ttl_reports_remaining() {
        let store = MemoryCounterStore::new();
        store.set("k", "v", Duration::from_secs(60)).await.unwrap();
        let remaining = store.ttl("k").await.unwrap().unwrap();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(50));
        assert!(store.ttl("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_incr_on_non_integer_value() {
        let store = MemoryCounterStore::new();
        store
            .set("k", "not-a-number", Duration::from_secs(60))
            .await
            .unwrap();
        let err = store
            .incr_with_expiry("k", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_expired_keys_are_purged() {
        let store = MemoryCounterStore::new();
        store.set("k", "v", Duration::from_millis(10)).await.unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(store.is_empty());
    }
}
