//! # RemitGuard Core
//!
//! Core abstractions for the RemitGuard abuse and fraud detection engine.
//!
//! This crate provides:
//! - The [`store::CounterStore`] collaborator trait with an in-memory
//!   implementation and a timeout-bounding decorator
//! - The engine error taxonomy and fail-open classification
//! - Observability: structured logging setup and the vendor-neutral
//!   [`observability::Reporter`] interface

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod observability;
pub mod store;

pub use error::{GuardError, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{GuardError, Result};
    pub use crate::observability::{
        LogConfig, LogLevel, LogReporter, MemoryReporter, Reporter, SecurityEvent, Severity,
    };
    pub use crate::store::{
        BoundedStore, CounterStore, FailingCounterStore, MemoryCounterStore, StoreConfig,
    };
}
