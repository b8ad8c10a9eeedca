//! TTL-based counter store.
//!
//! Every ephemeral entity in the engine (failure counters, block records,
//! velocity counters, suspicious-transaction records) lives in a key-value
//! store with automatic TTL expiry. There is no explicit deletion path for
//! counters other than time.
//!
//! ## Key Patterns
//!
//! ```text
//! auth:fail:{identity}                 → failure counter       (window TTL)
//! auth:block:{identity}                → BlockRecord JSON      (block TTL)
//! auth:revoked:{token_id}              → revocation marker     (token TTL)
//! fraud:vel:hour:{identity}            → hourly counter        (1 hour)
//! fraud:vel:day:{identity}:{yyyymmdd}  → daily counter         (24 hours)
//! fraud:vel:rapid:{identity}           → rapid counter         (60 seconds)
//! fraud:amount:{identity}:{amount}     → repeat-amount counter (1 hour)
//! fraud:suspect:{transaction_id}       → suspicious record     (7 days)
//! ```
//!
//! ## Atomicity
//!
//! `incr_with_expiry` must be atomic and linearizable per key. Concurrent
//! callers for the same identity must observe a correctly incrementing
//! sequence with no lost updates; the engine performs no in-process
//! locking of its own and relies entirely on this contract.

mod bounded;
mod failing;
mod memory;

pub use bounded::{BoundedStore, StoreConfig};
pub use failing::FailingCounterStore;
pub use memory::MemoryCounterStore;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Atomic, TTL-expiring key-value store consumed by the engine.
///
/// Backed by an in-memory map in tests and single-node deployments, or a
/// distributed cache in production. Every call is a potential I/O
/// suspension point; implementations must not require the caller to hold
/// any lock across calls.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the integer at `key` and return the new value.
    ///
    /// The first increment of a key establishes its TTL. Subsequent
    /// increments within the window MUST NOT refresh it, or the window
    /// would never close.
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<i64>;

    /// Read the raw value at `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` at `key` with the given TTL, replacing any prior value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn del(&self, key: &str) -> Result<()>;

    /// Whether `key` currently exists (and has not expired).
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remaining lifetime of `key`, or `None` if absent or expired.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;
}

#[async_trait]
impl<S: CounterStore + ?Sized> CounterStore for Arc<S> {
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<i64> {
        (**self).incr_with_expiry(key, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        (**self).set(key, value, ttl).await
    }

    async fn del(&self, key: &str) -> Result<()> {
        (**self).del(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key).await
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        (**self).ttl(key).await
    }
}
