//! # RemitGuard
//!
//! Real-time abuse and fraud detection engine for remittance
//! marketplaces, built on a shared TTL-based counter store:
//!
//! - **BruteForceGuard**: counts authentication failures per identity
//!   inside a sliding window and escalates to a temporary block
//! - **FraudScorer**: evaluates transaction attempts against
//!   independent weighted signals (amount thresholds, velocity windows,
//!   time of day, repeated amounts) into a 0-100 risk score
//! - **SuspiciousTransactionRegistry**: long-retention records of
//!   critical-risk transactions
//!
//! The engine is a library invoked in-process by request handlers; it
//! owns no wire protocol and performs no identity lookups of its own.
//! Every operation fails open on store outage: the engine's failure mode
//! must never degrade into a denial of service against legitimate users.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use remitguard::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = EngineConfig::from_env()?;
//!     config.logging.init();
//!
//!     let store = Arc::new(MemoryCounterStore::new());
//!     let engine = SecurityEngine::new(store, Arc::new(LogReporter), config)?;
//!
//!     // Login endpoint
//!     if engine.is_login_blocked("user-42").await? {
//!         return Ok(()); // reject the attempt
//!     }
//!     engine.record_login_failure("user-42").await?;
//!
//!     // Transaction-creation endpoint
//!     let assessment = engine.evaluate_transaction(&attempt).await?;
//!     if assessment.is_critical() {
//!         // hold the payment for review
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;

pub use engine::{EngineConfig, SecurityEngine};

// Re-export the component crates under stable names.
pub use remitguard_auth as auth;
pub use remitguard_core as core;
pub use remitguard_fraud as fraud;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::{EngineConfig, SecurityEngine};
    pub use remitguard_auth::{
        BlockRecord, BlockRegistry, BruteForceConfig, BruteForceGuard, GuardState,
        RevokedTokenRegistry,
    };
    pub use remitguard_core::error::{GuardError, Result};
    pub use remitguard_core::observability::{
        LogConfig, LogReporter, MemoryReporter, Reporter, SecurityEvent, Severity,
    };
    pub use remitguard_core::store::{
        BoundedStore, CounterStore, FailingCounterStore, MemoryCounterStore, StoreConfig,
    };
    pub use remitguard_fraud::{
        FraudConfig, FraudFlag, FraudScorer, RiskAssessment, RiskLevel, SignalWeights,
        SuspiciousTransactionRecord, SuspiciousTransactionRegistry, TransactionAttempt,
    };
}
