//! # RemitGuard Auth
//!
//! Authentication abuse detection for the RemitGuard engine:
//! - `BruteForceGuard`: per-identity failure counting with escalation to
//!   a temporary block
//! - `BlockRegistry`: TTL-expiring block records
//! - `RevokedTokenRegistry`: TTL-bounded token revocation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod guard;
pub mod token;

pub use block::{BlockRecord, BlockRegistry};
pub use guard::{BruteForceConfig, BruteForceGuard, GuardState};
pub use token::RevokedTokenRegistry;
