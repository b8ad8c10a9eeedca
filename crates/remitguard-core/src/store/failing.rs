//! Always-failing counter store, for tests.

use super::CounterStore;
use crate::error::{GuardError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// [`CounterStore`] whose every call fails with
/// [`GuardError::StoreUnavailable`]. Used to exercise the engine's
/// fail-open paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCounterStore;

impl FailingCounterStore {
    fn outage<T>() -> Result<T> {
        Err(GuardError::store_unavailable("simulated outage"))
    }
}

#[async_trait]
impl CounterStore for FailingCounterStore {
    async fn incr_with_expiry(&self, _key: &str, _ttl: Duration) -> Result<i64> {
        Self::outage()
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Self::outage()
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Self::outage()
    }

    async fn del(&self, _key: &str) -> Result<()> {
        Self::outage()
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Self::outage()
    }

    async fn ttl(&self, _key: &str) -> Result<Option<Duration>> {
        Self::outage()
    }
}
