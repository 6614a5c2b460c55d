//! Gateway query/submit client
//!
//! The network is an opaque external system reached only through a
//! Gateway-style API. `GatewayClient` is the seam the pipeline, poller and
//! services depend on; `HttpGatewayClient` is the reqwest-backed
//! implementation. Both are stateless with respect to in-flight requests,
//! so callers may issue operations concurrently without cross-contamination.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AgentError;
use crate::types::{
    CreatedEntity, ResourceBalance, SubmissionResult, TransactionId, TransactionStatus,
};

/// Receipt of a committed transaction, reduced to what extraction needs
#[derive(Debug, Clone, Default)]
pub struct CommittedReceipt {
    /// Global entities this transaction created, in creation order
    pub new_global_entities: Vec<CreatedEntity>,
}

/// Query/submit interface to the ledger network
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Current ledger epoch; fetched immediately before each build so the
    /// validity window is fresh
    async fn current_epoch(&self) -> Result<u64, AgentError>;

    /// Submit a hex-encoded notarized payload
    async fn submit_transaction(&self, notarized_hex: &str)
        -> Result<SubmissionResult, AgentError>;

    /// Status of a previously submitted transaction
    async fn transaction_status(
        &self,
        tx_id: &TransactionId,
    ) -> Result<TransactionStatus, AgentError>;

    /// Committed receipt details for a transaction
    async fn transaction_details(
        &self,
        tx_id: &TransactionId,
    ) -> Result<CommittedReceipt, AgentError>;

    /// Raw state/details for an entity
    async fn entity_details(&self, address: &str) -> Result<serde_json::Value, AgentError>;

    /// Fungible balances held by an account, with resource metadata
    async fn account_balances(&self, address: &str) -> Result<Vec<ResourceBalance>, AgentError>;
}

/// reqwest-backed Gateway API client
#[derive(Debug, Clone)]
pub struct HttpGatewayClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGatewayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AgentError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::Gateway(format!(
                "{} returned {}: {}",
                path, status, text
            )));
        }
        response
            .json::<R>()
            .await
            .map_err(|e| AgentError::Gateway(format!("{} returned malformed body: {}", path, e)))
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn current_epoch(&self) -> Result<u64, AgentError> {
        let resp: wire::ConstructionResponse = self
            .post("/transaction/construction", &serde_json::json!({}))
            .await?;
        Ok(resp.ledger_state.epoch)
    }

    async fn submit_transaction(
        &self,
        notarized_hex: &str,
    ) -> Result<SubmissionResult, AgentError> {
        let body = wire::SubmitRequest {
            notarized_transaction_hex: notarized_hex.to_string(),
        };
        let resp: wire::SubmitResponse = self
            .post("/transaction/submit", &body)
            .await
            .map_err(|e| match e {
                // Submission transport failures are their own category: the
                // caller must not blindly resubmit
                AgentError::Gateway(msg) => AgentError::Submission(msg),
                other => other,
            })?;
        Ok(SubmissionResult {
            duplicate: resp.duplicate,
        })
    }

    async fn transaction_status(
        &self,
        tx_id: &TransactionId,
    ) -> Result<TransactionStatus, AgentError> {
        let body = wire::IntentHashRequest {
            intent_hash: tx_id.as_str().to_string(),
        };
        let resp: wire::StatusResponse = self.post("/transaction/status", &body).await?;
        Ok(parse_status(&resp.intent_status))
    }

    async fn transaction_details(
        &self,
        tx_id: &TransactionId,
    ) -> Result<CommittedReceipt, AgentError> {
        let body = wire::IntentHashRequest {
            intent_hash: tx_id.as_str().to_string(),
        };
        let resp: wire::DetailsResponse =
            self.post("/transaction/committed-details", &body).await?;
        Ok(CommittedReceipt {
            new_global_entities: resp
                .transaction
                .receipt
                .new_global_entities
                .into_iter()
                .map(|e| CreatedEntity {
                    entity_address: e.entity_address,
                    entity_type: e.entity_type,
                })
                .collect(),
        })
    }

    async fn entity_details(&self, address: &str) -> Result<serde_json::Value, AgentError> {
        let body = serde_json::json!({ "addresses": [address] });
        let resp: wire::EntityDetailsResponse = self.post("/state/entity/details", &body).await?;
        resp.items.into_iter().next().ok_or_else(|| {
            AgentError::Gateway(format!("no entity details returned for {}", address))
        })
    }

    async fn account_balances(&self, address: &str) -> Result<Vec<ResourceBalance>, AgentError> {
        let body = serde_json::json!({ "address": address });
        let resp: wire::BalancesResponse = self.post("/state/entity/page/fungibles", &body).await?;
        let mut balances = Vec::with_capacity(resp.items.len());
        for item in resp.items {
            let amount = item.amount.parse().map_err(|e| {
                AgentError::Gateway(format!(
                    "unparseable balance amount '{}' for {}: {}",
                    item.amount, item.resource_address, e
                ))
            })?;
            balances.push(ResourceBalance {
                resource_address: item.resource_address,
                amount,
                metadata: item.metadata,
            });
        }
        Ok(balances)
    }
}

/// Map the Gateway's status string onto the status enum; anything
/// unrecognized (including in-mempool intermediate states) reads as
/// `Unknown` and keeps the poller waiting.
fn parse_status(status: &str) -> TransactionStatus {
    match status {
        "Pending" => TransactionStatus::Pending,
        "CommittedSuccess" => TransactionStatus::CommittedSuccess,
        "CommittedFailure" => TransactionStatus::CommittedFailure,
        _ => TransactionStatus::Unknown,
    }
}

/// Gateway API wire types
mod wire {
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Debug, Deserialize)]
    pub struct LedgerState {
        pub epoch: u64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ConstructionResponse {
        pub ledger_state: LedgerState,
    }

    #[derive(Debug, Serialize)]
    pub struct SubmitRequest {
        pub notarized_transaction_hex: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct SubmitResponse {
        pub duplicate: bool,
    }

    #[derive(Debug, Serialize)]
    pub struct IntentHashRequest {
        pub intent_hash: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct StatusResponse {
        pub intent_status: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct DetailsResponse {
        pub transaction: TransactionDetails,
    }

    #[derive(Debug, Deserialize)]
    pub struct TransactionDetails {
        #[serde(default)]
        pub receipt: Receipt,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Receipt {
        #[serde(default)]
        pub new_global_entities: Vec<NewEntity>,
    }

    #[derive(Debug, Deserialize)]
    pub struct NewEntity {
        pub entity_address: String,
        pub entity_type: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct EntityDetailsResponse {
        #[serde(default)]
        pub items: Vec<serde_json::Value>,
    }

    #[derive(Debug, Deserialize)]
    pub struct BalancesResponse {
        #[serde(default)]
        pub items: Vec<BalanceItem>,
    }

    #[derive(Debug, Deserialize)]
    pub struct BalanceItem {
        pub resource_address: String,
        pub amount: String,
        #[serde(default)]
        pub metadata: BTreeMap<String, String>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_mapping() {
        assert_eq!(parse_status("Pending"), TransactionStatus::Pending);
        assert_eq!(
            parse_status("CommittedSuccess"),
            TransactionStatus::CommittedSuccess
        );
        assert_eq!(
            parse_status("CommittedFailure"),
            TransactionStatus::CommittedFailure
        );
        // Intermediate/unexpected states keep the poller waiting
        assert_eq!(parse_status("InMempool"), TransactionStatus::Unknown);
        assert_eq!(parse_status(""), TransactionStatus::Unknown);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = HttpGatewayClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
