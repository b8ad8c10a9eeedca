//! # RemitGuard Fraud
//!
//! Multi-signal transaction risk scoring for the RemitGuard engine:
//! - `FraudScorer`: weighted evaluation of amount, velocity, and
//!   time-of-day signals over TTL counters
//! - `SuspiciousTransactionRegistry`: long-retention records of
//!   critical-risk transactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod registry;
pub mod scorer;
pub mod types;

pub use registry::{SuspiciousTransactionRecord, SuspiciousTransactionRegistry};
pub use scorer::{FraudConfig, FraudScorer, SignalWeights};
pub use types::{FraudFlag, RiskAssessment, RiskLevel, TransactionAttempt};
