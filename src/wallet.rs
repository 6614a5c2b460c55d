//! Wallet management module
//!
//! Key loading and signing for the transaction pipeline. Raw private key
//! material never crosses into logging, errors, or Debug output.

use anyhow::{Context, Result};
use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::NetworkDefinition;

/// Signing interface the pipeline depends on.
///
/// The notary in this design is the same key as the fee-paying signer
/// (single-party notarization), so one signer handle covers both roles.
pub trait Wallet: Send + Sync {
    /// The wallet's account address on the active network
    fn address(&self) -> &str;

    /// Public key bytes used as the notary key in transaction headers
    fn public_key(&self) -> [u8; 32];

    /// Sign a message (an intent or signed-intent hash)
    fn sign(&self, message: &[u8]) -> [u8; 64];
}

/// File- or seed-backed ed25519 wallet
pub struct Ed25519Wallet {
    signing_key: Arc<SigningKey>,
    address: String,
}

impl Ed25519Wallet {
    /// Create a wallet from a 32-byte seed
    pub fn from_seed(seed: [u8; 32], network: NetworkDefinition) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let address = derive_account_address(&signing_key, network);
        Self {
            signing_key: Arc::new(signing_key),
            address,
        }
    }

    /// Create a wallet from a keypair file: either 32 raw seed bytes or a
    /// JSON byte array
    pub fn from_file(path: &str, network: NetworkDefinition) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read keypair file: {}", path))?;

        let raw = if bytes.len() == 32 {
            bytes
        } else {
            // JSON byte-array format
            serde_json::from_slice::<Vec<u8>>(&bytes)
                .context("Failed to parse keypair JSON")?
        };
        let seed: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| anyhow::anyhow!("Invalid keypair length: expected 32 bytes, got {}", raw.len()))?;
        if seed.iter().all(|&b| b == 0) {
            anyhow::bail!("Invalid keypair: all-zero key rejected");
        }

        Ok(Self::from_seed(seed, network))
    }
}

impl Wallet for Ed25519Wallet {
    fn address(&self) -> &str {
        &self.address
    }

    fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Clone for Ed25519Wallet {
    fn clone(&self) -> Self {
        Self {
            signing_key: Arc::clone(&self.signing_key),
            address: self.address.clone(),
        }
    }
}

// Keep Debug from ever leaking key bytes
impl std::fmt::Debug for Ed25519Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Derive the account address for a public key on the given network.
///
/// Hash of the public key, truncated and hex-encoded under the network's
/// account namespace.
fn derive_account_address(signing_key: &SigningKey, network: NetworkDefinition) -> String {
    let mut hasher = Sha256::new();
    hasher.update(signing_key.verifying_key().to_bytes());
    let digest = hasher.finalize();
    format!(
        "account_{}{}",
        network.hrp_infix(),
        hex::encode(&digest[..27])
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn seed(byte: u8) -> [u8; 32] {
        [byte; 32]
    }

    #[test]
    fn test_address_matches_network_namespace() {
        let mainnet = Ed25519Wallet::from_seed(seed(7), NetworkDefinition::Mainnet);
        assert!(mainnet.address().starts_with("account_rdx1"));

        let stokenet = Ed25519Wallet::from_seed(seed(7), NetworkDefinition::Stokenet);
        assert!(stokenet.address().starts_with("account_tdx_2_1"));
    }

    #[test]
    fn test_signing_is_deterministic_per_message() {
        let wallet = Ed25519Wallet::from_seed(seed(9), NetworkDefinition::Stokenet);
        let a = wallet.sign(b"intent hash");
        let b = wallet.sign(b"intent hash");
        assert_eq!(a, b);
        let c = wallet.sign(b"other hash");
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_file_raw_and_json() {
        let mut raw = tempfile::NamedTempFile::new().unwrap();
        raw.write_all(&seed(3)).unwrap();
        let wallet =
            Ed25519Wallet::from_file(raw.path().to_str().unwrap(), NetworkDefinition::Stokenet)
                .unwrap();
        assert_eq!(wallet.public_key().len(), 32);

        let mut json = tempfile::NamedTempFile::new().unwrap();
        write!(json, "{}", serde_json::to_string(&seed(3).to_vec()).unwrap()).unwrap();
        let from_json =
            Ed25519Wallet::from_file(json.path().to_str().unwrap(), NetworkDefinition::Stokenet)
                .unwrap();
        assert_eq!(wallet.address(), from_json.address());
    }

    #[test]
    fn test_from_file_rejects_zero_key() {
        let mut raw = tempfile::NamedTempFile::new().unwrap();
        raw.write_all(&[0u8; 32]).unwrap();
        assert!(Ed25519Wallet::from_file(
            raw.path().to_str().unwrap(),
            NetworkDefinition::Stokenet
        )
        .is_err());
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let wallet = Ed25519Wallet::from_seed(seed(5), NetworkDefinition::Mainnet);
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("address"));
        assert!(!debug.contains("signing_key"));
    }
}
