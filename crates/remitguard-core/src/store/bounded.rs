//! Per-call timeout enforcement for store access.
//!
//! Every [`CounterStore`] call is a potential remote round trip. The
//! engine's fail-open policy requires a bounded wait: a call that hangs
//! is converted into an infrastructure error, never into a block or a
//! critical-risk signal.

use super::CounterStore;
use crate::error::{GuardError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Store access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound for a single store round trip.
    pub op_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            op_timeout: Duration::from_millis(500),
        }
    }
}

impl StoreConfig {
    /// Production configuration.
    pub fn production() -> Self {
        Self {
            op_timeout: Duration::from_millis(250),
        }
    }

    /// Development configuration.
    pub fn development() -> Self {
        Self {
            op_timeout: Duration::from_secs(2),
        }
    }

    /// Set the per-call timeout.
    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }
}

/// Decorator that bounds every call on the wrapped store.
///
/// An elapsed timeout surfaces as [`GuardError::Timeout`], which callers
/// treat exactly like any other store outage.
pub struct BoundedStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: CounterStore> BoundedStore<S> {
    /// Wrap `inner`, bounding each call to `timeout`.
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Wrap `inner` using a [`StoreConfig`].
    pub fn with_config(inner: S, config: &StoreConfig) -> Self {
        Self::new(inner, config.op_timeout)
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_elapsed) => Err(GuardError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl<S: CounterStore> CounterStore for BoundedStore<S> {
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<i64> {
        self.bounded(self.inner.incr_with_expiry(key, ttl)).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.bounded(self.inner.get(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.bounded(self.inner.set(key, value, ttl)).await
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.bounded(self.inner.del(key)).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.bounded(self.inner.exists(key)).await
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        self.bounded(self.inner.ttl(key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCounterStore;

    struct HangingStore;

    #[async_trait]
    impl CounterStore for HangingStore {
        async fn incr_with_expiry(&self, _key: &str, _ttl: Duration) -> Result<i64> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(0)
        }

        async fn get(&self, _key: &str) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        async fn del(&self, _key: &str) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        async fn exists(&self, _key: &str) -> Result<bool> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(false)
        }

        async fn ttl(&self, _key: &str) -> Result<Option<Duration>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_call_times_out() {
        let store = BoundedStore::new(HangingStore, Duration::from_millis(100));
        let err = store
            .incr_with_expiry("k", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Timeout(_)));
        assert!(err.is_infrastructure());
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let store = BoundedStore::new(MemoryCounterStore::new(), Duration::from_secs(1));
        assert_eq!(
            store
                .incr_with_expiry("k", Duration::from_secs(60))
                .await
                .unwrap(),
            1
        );
        assert!(store.exists("k").await.unwrap());
    }
}
