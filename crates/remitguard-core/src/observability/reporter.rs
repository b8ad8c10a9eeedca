//! Anomaly reporting.
//!
//! Security-relevant outcomes (threshold crossings, blocks, critical risk
//! scores) are routed through an injected [`Reporter`] so the engine has
//! no compile-time dependency on any observability vendor. The tracing
//! pipeline still receives ordinary diagnostics; the reporter carries the
//! events an operator is expected to act on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Severity of a reported event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory signal, no action required.
    Warning,
    /// Needs immediate attention.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A structured security event.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    /// Unique event ID.
    pub event_id: Uuid,
    /// Event name, e.g. `login.blocked` or `transaction.critical_risk`.
    pub name: String,
    /// Identity the event is scoped to, if any.
    pub identity: Option<String>,
    /// When the event was created.
    pub occurred_at: DateTime<Utc>,
    /// Additional context fields.
    pub fields: HashMap<String, serde_json::Value>,
}

impl SecurityEvent {
    /// Create a new event.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            name: name.into(),
            identity: None,
            occurred_at: Utc::now(),
            fields: HashMap::new(),
        }
    }

    /// Scope the event to an identity.
    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Add a context field.
    pub fn field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.fields.insert(key.into(), json_value);
        }
        self
    }
}

/// Sink for security events.
///
/// Implementations must be cheap and must never fail the calling
/// operation; reporting is strictly fire-and-forget.
pub trait Reporter: Send + Sync {
    /// Report an advisory event.
    fn warn(&self, event: SecurityEvent);

    /// Report an event that needs immediate attention.
    fn critical(&self, event: SecurityEvent);
}

/// Reporter that emits events to the tracing pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl LogReporter {
    fn emit(severity: Severity, event: &SecurityEvent) {
        let fields = serde_json::to_string(&event.fields).unwrap_or_default();
        match severity {
            Severity::Warning => tracing::warn!(
                target: "security",
                event_id = %event.event_id,
                event = %event.name,
                identity = ?event.identity,
                %fields,
                "security event"
            ),
            Severity::Critical => tracing::error!(
                target: "security",
                event_id = %event.event_id,
                event = %event.name,
                identity = ?event.identity,
                %fields,
                "security event"
            ),
        }
    }
}

impl Reporter for LogReporter {
    fn warn(&self, event: SecurityEvent) {
        Self::emit(Severity::Warning, &event);
    }

    fn critical(&self, event: SecurityEvent) {
        Self::emit(Severity::Critical, &event);
    }
}

/// Reporter that captures events in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<(Severity, SecurityEvent)>>,
}

impl MemoryReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured events, in arrival order.
    pub fn events(&self) -> Vec<(Severity, SecurityEvent)> {
        self.events.lock().unwrap().clone()
    }

    /// Names of captured events, in arrival order.
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e)| e.name.clone())
            .collect()
    }

    /// Number of captured events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Whether no events were captured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Reporter for MemoryReporter {
    fn warn(&self, event: SecurityEvent) {
        self.events.lock().unwrap().push((Severity::Warning, event));
    }

    fn critical(&self, event: SecurityEvent) {
        self.events.lock().unwrap().push((Severity::Critical, event));
    }
}
