//! Configuration module for the agent core
//!
//! Handles configuration loading from TOML files and resolves the
//! per-network address book (well-known resource/component/package
//! addresses) once at construction time. The book is never mutated at
//! runtime; services receive it as an injected lookup.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::AgentError;

/// Logical network the agent operates against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkDefinition {
    /// Radix public mainnet (network id 1)
    Mainnet,
    /// Stokenet public testnet (network id 2)
    Stokenet,
    /// Local simulator; no integrated exchange protocol deployed
    Localnet,
}

impl NetworkDefinition {
    /// Network id byte used in transaction headers
    pub fn id(&self) -> u8 {
        match self {
            Self::Mainnet => 1,
            Self::Stokenet => 2,
            Self::Localnet => 240,
        }
    }

    /// Logical name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Stokenet => "stokenet",
            Self::Localnet => "localnet",
        }
    }

    /// Address namespace infix that follows the kind prefix, e.g. addresses
    /// on stokenet look like `account_tdx_2_1...`
    pub fn hrp_infix(&self) -> &'static str {
        match self {
            Self::Mainnet => "rdx1",
            Self::Stokenet => "tdx_2_1",
            Self::Localnet => "loc1",
        }
    }

    /// Whether the integrated exchange protocol (pools, swaps, flash loans)
    /// is deployed on this network
    pub fn supports_exchange(&self) -> bool {
        !matches!(self, Self::Localnet)
    }

    /// Default public Gateway endpoint for this network
    pub fn default_gateway_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://mainnet.radixdlt.com",
            Self::Stokenet => "https://stokenet.radixdlt.com",
            Self::Localnet => "http://localhost:8080",
        }
    }
}

/// Well-known addresses for one network, resolved once at construction
#[derive(Debug, Clone)]
pub struct AddressBook {
    /// Native fee token (XRD)
    pub xrd: String,
    /// Exchange factory component used for pool creation on mainnet
    pub pool_factory: Option<String>,
    /// Exchange package instantiated directly on test networks
    pub pool_package: Option<String>,
}

static ADDRESS_BOOKS: Lazy<HashMap<NetworkDefinition, AddressBook>> = Lazy::new(|| {
    let mut books = HashMap::new();
    books.insert(
        NetworkDefinition::Mainnet,
        AddressBook {
            xrd: "resource_rdx1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxxradxrd"
                .to_string(),
            pool_factory: Some(
                "component_rdx1cz8daq5nwmtdju4hj5rxud0ta26wf90sdk5r4nj9fqjcde5eht8p0f"
                    .to_string(),
            ),
            pool_package: None,
        },
    );
    books.insert(
        NetworkDefinition::Stokenet,
        AddressBook {
            xrd: "resource_tdx_2_1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxxtfd2jc"
                .to_string(),
            pool_factory: None,
            pool_package: Some(
                "package_tdx_2_1pkgxxxxxxxxxplxxxxxxxxxxxxx020379220524xxxxxxxxxe4r780"
                    .to_string(),
            ),
        },
    );
    books.insert(
        NetworkDefinition::Localnet,
        AddressBook {
            xrd: "resource_loc1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxx8nc2jc"
                .to_string(),
            pool_factory: None,
            pool_package: None,
        },
    );
    books
});

impl AddressBook {
    /// Resolve the address book for a network
    pub fn for_network(network: NetworkDefinition) -> Self {
        ADDRESS_BOOKS
            .get(&network)
            .cloned()
            .expect("address book defined for every network variant")
    }
}

/// Main agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Active network
    pub network: NetworkDefinition,

    /// Gateway base URL; defaults to the network's public Gateway
    #[serde(default)]
    pub gateway_url: Option<String>,

    /// Fee locking configuration
    #[serde(default)]
    pub fees: FeeConfig,

    /// Extraction poller configuration
    #[serde(default)]
    pub poller: PollerConfig,

    /// Outer operation retry configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// How a duplicate-submission flag is interpreted
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

/// XRD amounts locked as fee per operation class, as decimal strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Simple operations: transfers, stakes, method calls
    #[serde(default = "default_standard_fee")]
    pub standard: String,

    /// Heavy operations: resource and pool creation
    #[serde(default = "default_creation_fee")]
    pub creation: String,

    /// Minimum XRD balance required before attempting a creation-style
    /// operation, so fees are not burned on a transaction guaranteed to fail
    #[serde(default = "default_min_fee_balance")]
    pub min_creation_balance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Maximum status-query attempts before giving up
    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,

    /// Fixed interval between attempts, in seconds
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff, in milliseconds
    #[serde(default = "default_retry_base_delay")]
    pub base_delay_ms: u64,
}

/// Interpretation of the network's duplicate-submission flag.
///
/// The network treats a resubmission as benign; callers may not. `Fail`
/// surfaces `AgentError::DuplicateTransaction`; `ProceedToPoll` treats the
/// earlier identical submission as this operation's own and continues to
/// status polling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    Fail,
    ProceedToPoll,
}

// Default value functions
fn default_standard_fee() -> String {
    "10".to_string()
}
fn default_creation_fee() -> String {
    "25".to_string()
}
fn default_min_fee_balance() -> String {
    "30".to_string()
}
fn default_poll_attempts() -> u32 {
    20
}
fn default_poll_interval() -> u64 {
    3
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_base_delay() -> u64 {
    250
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            standard: default_standard_fee(),
            creation: default_creation_fee(),
            min_creation_balance: default_min_fee_balance(),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_poll_attempts(),
            interval_secs: default_poll_interval(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_retry_base_delay(),
        }
    }
}

impl AgentConfig {
    /// Configuration with defaults for a given network
    pub fn for_network(network: NetworkDefinition) -> Self {
        Self {
            network,
            gateway_url: None,
            fees: FeeConfig::default(),
            poller: PollerConfig::default(),
            retry: RetryConfig::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, AgentError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("failed to read {}: {}", path, e)))?;
        toml::from_str(&content)
            .map_err(|e| AgentError::Config(format!("failed to parse {}: {}", path, e)))
    }

    /// Effective Gateway base URL
    pub fn gateway_url(&self) -> &str {
        self.gateway_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_gateway_url())
    }

    /// Resolve the address book for the configured network
    pub fn address_book(&self) -> AddressBook {
        AddressBook::for_network(self.network)
    }
}
