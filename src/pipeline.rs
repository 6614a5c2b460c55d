//! Transaction build/sign/submit pipeline
//!
//! Wraps a rendered manifest plus a signer key into a network-ready binary
//! payload: header assembly, nonce generation, intent encoding, signing,
//! notarization, compilation to bytes and hex encoding. Submission hands
//! the payload to the Gateway and interprets the accept/duplicate answer.
//!
//! Every build call produces a fresh header and nonce; compiled payloads
//! are owned by the invocation that created them and are never cached or
//! reused (reuse is indistinguishable from replay).

use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::NetworkDefinition;
use crate::error::AgentError;
use crate::gateway::GatewayClient;
use crate::manifest::Manifest;
use crate::observability::{abbreviate, CorrelationId};
use crate::types::TransactionId;
use crate::wallet::Wallet;

/// Width of the epoch validity window: a built transaction is valid for
/// `[current_epoch, current_epoch + EPOCH_WINDOW)`
pub const EPOCH_WINDOW: u64 = 100;

/// Transaction header, created per submission attempt and discarded after
/// compilation
#[derive(Debug, Clone, Serialize)]
pub struct TransactionHeader {
    pub network_id: u8,
    pub start_epoch_inclusive: u64,
    pub end_epoch_exclusive: u64,
    pub nonce: u32,
    pub notary_public_key: [u8; 32],
    pub notary_is_signatory: bool,
    pub tip_percentage: u16,
}

#[derive(Serialize)]
struct Intent<'a> {
    header: &'a TransactionHeader,
    manifest: &'a str,
}

#[derive(Serialize)]
struct SignedIntent {
    intent: Vec<u8>,
    signature: Vec<u8>,
}

#[derive(Serialize)]
struct NotarizedTransaction {
    signed_intent: Vec<u8>,
    notary_signature: Vec<u8>,
}

/// A compiled, notarized transaction ready for submission
#[derive(Debug, Clone)]
pub struct PreparedTransaction {
    /// Hex-encoded notarized payload
    pub payload_hex: String,
    /// Intent hash, used for status queries after submission
    pub transaction_id: TransactionId,
    /// Header the payload was compiled with
    pub header: TransactionHeader,
}

/// Build/sign/submit pipeline over one Gateway client
#[derive(Clone)]
pub struct TransactionPipeline {
    gateway: Arc<dyn GatewayClient>,
    network: NetworkDefinition,
    tip_percentage: u16,
}

impl TransactionPipeline {
    pub fn new(gateway: Arc<dyn GatewayClient>, network: NetworkDefinition) -> Self {
        Self {
            gateway,
            network,
            tip_percentage: 0,
        }
    }

    /// Assemble a header for the caller-supplied current epoch.
    ///
    /// `start_epoch` is used exactly as supplied, with no silent adjustment;
    /// the caller fetches a fresh epoch immediately before building since a
    /// stale epoch yields a transaction the network rejects as expired.
    pub fn make_header(&self, current_epoch: u64, notary_public_key: [u8; 32]) -> TransactionHeader {
        TransactionHeader {
            network_id: self.network.id(),
            start_epoch_inclusive: current_epoch,
            end_epoch_exclusive: current_epoch + EPOCH_WINDOW,
            // Fresh per build call: reusing a nonce with the same signer and
            // manifest reads as replay
            nonce: rand::thread_rng().gen(),
            notary_public_key,
            notary_is_signatory: true,
            tip_percentage: self.tip_percentage,
        }
    }

    /// Compile a manifest into a notarized payload signed by `wallet`
    pub fn build(
        &self,
        manifest: &Manifest,
        wallet: &dyn Wallet,
        current_epoch: u64,
        label: &str,
    ) -> Result<PreparedTransaction, AgentError> {
        let header = self.make_header(current_epoch, wallet.public_key());
        let manifest_text = manifest.render();

        let intent_bytes = bincode::serialize(&Intent {
            header: &header,
            manifest: &manifest_text,
        })
        .map_err(|e| AgentError::build(format!("intent encoding failed: {}", e)))?;
        let intent_hash = Sha256::digest(&intent_bytes);

        let signed_intent_bytes = bincode::serialize(&SignedIntent {
            intent: intent_bytes,
            signature: wallet.sign(&intent_hash).to_vec(),
        })
        .map_err(|e| AgentError::build(format!("signed intent encoding failed: {}", e)))?;
        let signed_intent_hash = Sha256::digest(&signed_intent_bytes);

        // Single-party notarization: the notary is the fee-paying signer
        let payload = bincode::serialize(&NotarizedTransaction {
            signed_intent: signed_intent_bytes,
            notary_signature: wallet.sign(&signed_intent_hash).to_vec(),
        })
        .map_err(|e| AgentError::build(format!("notarization encoding failed: {}", e)))?;

        let transaction_id = TransactionId(format!("txid_{}", hex::encode(intent_hash)));
        tracing::debug!(
            label = %label,
            transaction_id = %abbreviate(transaction_id.as_str()),
            start_epoch = header.start_epoch_inclusive,
            end_epoch = header.end_epoch_exclusive,
            "Transaction compiled"
        );

        Ok(PreparedTransaction {
            payload_hex: hex::encode(payload),
            transaction_id,
            header,
        })
    }

    /// Submit a compiled payload. A duplicate flag from the network
    /// surfaces as `DuplicateTransaction` carrying the intent hash.
    pub async fn submit(&self, prepared: &PreparedTransaction) -> Result<TransactionId, AgentError> {
        let result = self.gateway.submit_transaction(&prepared.payload_hex).await?;
        if result.duplicate {
            tracing::warn!(
                transaction_id = %abbreviate(prepared.transaction_id.as_str()),
                "Network flagged submission as duplicate"
            );
            return Err(AgentError::DuplicateTransaction {
                transaction_id: prepared.transaction_id.as_str().to_string(),
            });
        }
        Ok(prepared.transaction_id.clone())
    }

    /// Fetch a fresh epoch, build, and submit: one serialized
    /// build-then-submit sequence per operation
    pub async fn execute(
        &self,
        manifest: &Manifest,
        wallet: &dyn Wallet,
        label: &str,
        correlation_id: &CorrelationId,
    ) -> Result<TransactionId, AgentError> {
        let current_epoch = self.gateway.current_epoch().await?;
        let prepared = self.build(manifest, wallet, current_epoch, label)?;
        tracing::info!(
            correlation_id = %correlation_id,
            label = %label,
            transaction_id = %abbreviate(prepared.transaction_id.as_str()),
            "Submitting transaction"
        );
        self.submit(&prepared).await
    }
}
