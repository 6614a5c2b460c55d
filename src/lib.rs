//! Agent-driven ledger operations for the Radix network
//!
//! This library turns typed operation intents (transfers, token issuance,
//! staking, pool and liquidity operations) into transaction manifests,
//! signs and submits them through a Gateway API, and polls the network to
//! recover the on-chain identifiers the transaction created.
//!
//! The flow for one operation: an [`services::RadixAgent`] service
//! validates inputs, a [`manifest::templates`] builder assembles a typed
//! instruction sequence, the [`pipeline::TransactionPipeline`] compiles,
//! signs and submits it, and for creation-style operations the
//! [`poller::ResourceExtractionPoller`] recovers the created entity's
//! address from the committed receipt.

pub mod config;
pub mod error;
pub mod gateway;
pub mod manifest;
pub mod observability;
pub mod pipeline;
pub mod poller;
pub mod retry;
pub mod services;
pub mod types;
pub mod wallet;

// Re-export the types most callers need
pub use config::{AgentConfig, DuplicatePolicy, NetworkDefinition};
pub use error::AgentError;
pub use services::RadixAgent;
pub use types::{
    EntityKind, OperationOutcome, OperationRequest, TransactionId, TransactionStatus,
};
pub use wallet::{Ed25519Wallet, Wallet};
