//! Observability: structured logging and anomaly reporting.

pub mod logging;
pub mod reporter;

pub use logging::{LogConfig, LogLevel};
pub use reporter::{LogReporter, MemoryReporter, Reporter, SecurityEvent, Severity};
