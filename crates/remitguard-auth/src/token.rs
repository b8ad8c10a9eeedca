//! Revoked-token registry.
//!
//! Session tokens that are revoked before their natural expiry (logout,
//! password change, forced invalidation) are recorded here under
//! `auth:revoked:{token_id}` with the token's remaining lifetime as TTL.
//! The registry is bounded by construction: entries disappear with the
//! tokens they refer to, so it can never grow without limit the way an
//! in-process blacklist set would.

use remitguard_core::error::{GuardError, Result};
use remitguard_core::store::CounterStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

fn revoked_key(token_id: &str) -> String {
    format!("auth:revoked:{token_id}")
}

/// TTL-bounded registry of revoked token IDs.
pub struct RevokedTokenRegistry {
    store: Arc<dyn CounterStore>,
}

impl RevokedTokenRegistry {
    /// Create a registry over the given store.
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Revoke `token_id` for the remainder of its lifetime.
    ///
    /// Store outages are logged and swallowed. A token whose revocation
    /// was lost stays valid until natural expiry; that is the same
    /// fail-open posture as the rest of the engine.
    pub async fn revoke(&self, token_id: &str, remaining_lifetime: Duration) -> Result<()> {
        if token_id.is_empty() {
            return Err(GuardError::invalid_argument("token_id must not be empty"));
        }
        match self
            .store
            .set(&revoked_key(token_id), "1", remaining_lifetime)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_infrastructure() => {
                warn!(token_id, error = %err, "store failed while revoking token; failing open");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Whether `token_id` has been revoked; `false` on store failure.
    pub async fn is_revoked(&self, token_id: &str) -> Result<bool> {
        if token_id.is_empty() {
            return Err(GuardError::invalid_argument("token_id must not be empty"));
        }
        match self.store.exists(&revoked_key(token_id)).await {
            Ok(revoked) => Ok(revoked),
            Err(err) if err.is_infrastructure() => {
                warn!(token_id, error = %err, "store failed during revocation check; failing open");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
