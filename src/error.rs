//! Error types for agent ledger operations
//!
//! One taxonomy covers the whole operation lifecycle: input validation,
//! manifest assembly, signing, submission, and post-commit entity
//! extraction. Errors carry enough context to log and route on without
//! ever including key material.

use thiserror::Error;

/// Error type for all agent operations
#[derive(Error, Debug)]
pub enum AgentError {
    /// Bad address, amount, or argument shape. Raised before any network
    /// call is made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested operation is not available on the active network
    /// (e.g. exchange-protocol operations on a local simulator).
    #[error("Operation '{operation}' is not supported on network '{network}'")]
    NetworkUnsupported {
        /// Logical network name
        network: String,
        /// Operation that was attempted
        operation: String,
    },

    /// Manifest assembly, header construction, or signing failed.
    ///
    /// Should be rare: validation happens upstream, so this layer only
    /// fails on genuine encoding/signing problems.
    #[error("Transaction build failed: {0}")]
    Build(String),

    /// The network flagged the submitted payload as a resubmission.
    ///
    /// Not a network-side error, but callers cannot distinguish "my earlier
    /// identical request succeeded" from "silently ignored", so it surfaces
    /// as a named error. Carries the intent hash so a caller configured to
    /// proceed-to-poll can hand it straight to the extraction poller.
    #[error("Duplicate transaction submission: {transaction_id}")]
    DuplicateTransaction {
        /// Intent hash of the duplicated submission
        transaction_id: String,
    },

    /// The network rejected the submission or was unreachable
    #[error("Submission failed: {0}")]
    Submission(String),

    /// A Gateway query failed in transit (status/details/balances/epoch)
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// The extraction poller exhausted its attempt budget without seeing a
    /// terminal transaction status. The transaction itself may still commit.
    #[error("Entity extraction timed out after {attempts} attempts")]
    ExtractionTimeout {
        /// Attempts made before giving up
        attempts: u32,
    },

    /// The transaction reached a terminal status but no entity of the
    /// requested kind was found in its receipt. For a committed-success
    /// transaction this means the operation itself succeeded and only the
    /// address lookup failed.
    #[error("No matching entity found for transaction {transaction_id}")]
    ExtractionNotFound {
        /// Intent hash of the inspected transaction
        transaction_id: String,
    },

    /// Configuration loading or address-book resolution failed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Check if this error is potentially retryable.
    ///
    /// Retrying a validation or build failure is pointless, and blindly
    /// resubmitting after a duplicate flag risks double-spend-equivalent
    /// duplication. Only transport-level failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Submission(_) | Self::Gateway(_))
    }

    /// Error category label for logs and metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NetworkUnsupported { .. } => "unsupported_network",
            Self::Build(_) => "build",
            Self::DuplicateTransaction { .. } => "duplicate",
            Self::Submission(_) => "submission",
            Self::Gateway(_) => "gateway",
            Self::ExtractionTimeout { .. } => "extraction_timeout",
            Self::ExtractionNotFound { .. } => "extraction_not_found",
            Self::Config(_) => "config",
        }
    }

    /// True when the underlying transaction committed (or may yet commit)
    /// and only the created-entity lookup failed
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            Self::ExtractionTimeout { .. } | Self::ExtractionNotFound { .. }
        )
    }
}

// Convenience constructors for common scenarios
impl AgentError {
    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Create a build error
    pub fn build(reason: impl Into<String>) -> Self {
        Self::Build(reason.into())
    }

    /// Create an unsupported-network error
    pub fn unsupported(network: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::NetworkUnsupported {
            network: network.into(),
            operation: operation.into(),
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        Self::Gateway(err.to_string())
    }
}
