//! Resource-extraction poller
//!
//! The network does not return created-entity addresses synchronously, so
//! after submission the agent polls transaction status until a committed
//! state appears, then inspects the receipt's new-global-entities list for
//! an entry of the requested kind.
//!
//! The poller is deliberately decoupled from the pipeline: it takes only a
//! transaction id and a target entity kind, and works for any transaction
//! regardless of which template produced it.

use std::sync::Arc;
use std::time::Duration;

use crate::config::PollerConfig;
use crate::error::AgentError;
use crate::gateway::GatewayClient;
use crate::observability::{abbreviate, CorrelationId};
use crate::types::{EntityKind, TransactionId, TransactionStatus};

/// Bounded fixed-interval polling state machine
#[derive(Clone)]
pub struct ResourceExtractionPoller {
    gateway: Arc<dyn GatewayClient>,
    max_attempts: u32,
    interval: Duration,
}

impl ResourceExtractionPoller {
    pub fn new(gateway: Arc<dyn GatewayClient>, config: &PollerConfig) -> Self {
        Self {
            gateway,
            max_attempts: config.max_attempts,
            interval: Duration::from_secs(config.interval_secs),
        }
    }

    /// Poll until the transaction commits, then return the address of the
    /// first created entity matching `kind`.
    ///
    /// - `CommittedSuccess` with a match: the entity address.
    /// - `CommittedSuccess` without a match, or `CommittedFailure`:
    ///   `ExtractionNotFound`. Polling stops at the first committed state
    ///   either way.
    /// - Budget exhausted while still pending: `ExtractionTimeout`.
    ///
    /// Transient query errors count as "still pending": only the attempt
    /// budget or a terminal status ends the loop.
    pub async fn extract(
        &self,
        tx_id: &TransactionId,
        kind: EntityKind,
        correlation_id: &CorrelationId,
    ) -> Result<String, AgentError> {
        for attempt in 1..=self.max_attempts {
            match self.gateway.transaction_status(tx_id).await {
                Ok(TransactionStatus::CommittedSuccess) => {
                    tracing::debug!(
                        correlation_id = %correlation_id,
                        transaction_id = %abbreviate(tx_id.as_str()),
                        attempt,
                        "Transaction committed, inspecting receipt"
                    );
                    return self.inspect_receipt(tx_id, kind).await;
                }
                Ok(TransactionStatus::CommittedFailure) => {
                    // A failed transaction created nothing; stop immediately
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        transaction_id = %abbreviate(tx_id.as_str()),
                        attempt,
                        "Transaction committed with failure"
                    );
                    return Err(AgentError::ExtractionNotFound {
                        transaction_id: tx_id.as_str().to_string(),
                    });
                }
                Ok(TransactionStatus::Pending) | Ok(TransactionStatus::Unknown) => {
                    tracing::trace!(
                        correlation_id = %correlation_id,
                        transaction_id = %abbreviate(tx_id.as_str()),
                        attempt,
                        "Transaction not yet committed"
                    );
                }
                Err(e) => {
                    // Treat transient query errors as still-pending
                    tracing::debug!(
                        correlation_id = %correlation_id,
                        transaction_id = %abbreviate(tx_id.as_str()),
                        attempt,
                        error = %e,
                        "Status query failed, will retry"
                    );
                }
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        Err(AgentError::ExtractionTimeout {
            attempts: self.max_attempts,
        })
    }

    async fn inspect_receipt(
        &self,
        tx_id: &TransactionId,
        kind: EntityKind,
    ) -> Result<String, AgentError> {
        let receipt = self.gateway.transaction_details(tx_id).await?;
        receipt
            .new_global_entities
            .iter()
            .find(|e| e.entity_type == kind.tag())
            .map(|e| e.entity_address.clone())
            .ok_or_else(|| AgentError::ExtractionNotFound {
                transaction_id: tx_id.as_str().to_string(),
            })
    }
}
