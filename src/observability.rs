//! Observability helpers: logging setup, correlation ids and log redaction

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured logging for an embedding binary. The filter comes
/// from `RUST_LOG`, defaulting to info; `json` switches the output format
/// for log aggregation. Safe to call once per process.
pub fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        let _ = registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init();
    } else {
        let _ = registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init();
    }
}

/// Correlation ID for tracking one operation across build, submission and
/// extraction polling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Create a new correlation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Shorten an identifier for logging. Keeps enough of the value to
/// correlate log lines without reproducing full payloads; never call this
/// on key material (keys must not be logged at all).
pub fn abbreviate(value: &str) -> String {
    // Slice on chars, not bytes: Gateway-supplied values are not
    // guaranteed to be ASCII
    if value.chars().count() <= 16 {
        return value.to_string();
    }
    let head: String = value.chars().take(10).collect();
    let tail: String = {
        let mut chars: Vec<char> = value.chars().rev().take(4).collect();
        chars.reverse();
        chars.into_iter().collect()
    };
    format!("{}..{}", head, tail)
}
