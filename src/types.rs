//! Common types shared across the agent core

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::AgentError;

/// Address kind, determined solely by the bech32 prefix.
///
/// Classification is stable: the same string always classifies the same way,
/// regardless of which network it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressKind {
    Account,
    Resource,
    Component,
    Validator,
    Package,
}

impl AddressKind {
    /// The address prefix for this kind, including the trailing underscore
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Account => "account_",
            Self::Resource => "resource_",
            Self::Component => "component_",
            Self::Validator => "validator_",
            Self::Package => "package_",
        }
    }

    /// Classify an address string by prefix. Returns `None` for strings
    /// that carry no recognized prefix.
    pub fn classify(address: &str) -> Option<Self> {
        [
            Self::Account,
            Self::Resource,
            Self::Component,
            Self::Validator,
            Self::Package,
        ]
        .into_iter()
        .find(|kind| address.starts_with(kind.prefix()))
    }
}

/// Validate that an address has the expected kind prefix and belongs to the
/// network namespace identified by `hrp_infix` (`"rdx1"` on mainnet,
/// `"tdx_2_1"` on stokenet).
pub fn validate_address(
    address: &str,
    expected: AddressKind,
    hrp_infix: &str,
) -> Result<(), AgentError> {
    match AddressKind::classify(address) {
        Some(kind) if kind == expected => {}
        Some(kind) => {
            return Err(AgentError::validation(format!(
                "expected {} address, got {} address: {}",
                expected.prefix().trim_end_matches('_'),
                kind.prefix().trim_end_matches('_'),
                address
            )))
        }
        None => {
            return Err(AgentError::validation(format!(
                "unrecognized address prefix: {}",
                address
            )))
        }
    }

    let body = &address[expected.prefix().len()..];
    if !body.starts_with(hrp_infix) {
        return Err(AgentError::validation(format!(
            "address {} does not belong to the active network (expected '{}{}...')",
            address,
            expected.prefix(),
            hrp_infix
        )));
    }
    Ok(())
}

/// Parse a decimal-as-string amount, requiring it to be finite and strictly
/// positive before it may enter a manifest.
pub fn parse_amount(amount: &str) -> Result<Decimal, AgentError> {
    let value = Decimal::from_str(amount.trim()).map_err(|e| {
        AgentError::validation(format!("invalid decimal amount '{}': {}", amount, e))
    })?;
    if value <= Decimal::ZERO {
        return Err(AgentError::validation(format!(
            "amount must be positive, got '{}'",
            amount
        )));
    }
    Ok(value)
}

/// Intent hash of a submitted transaction, used for status queries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network's answer to a transaction submission
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubmissionResult {
    /// True when the network has already seen a byte-identical payload
    pub duplicate: bool,
}

/// Transaction status as reported by the Gateway.
///
/// Transitions monotonically from `Pending` to a committed state; polling
/// must stop once either committed state is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    CommittedSuccess,
    CommittedFailure,
    Unknown,
}

impl TransactionStatus {
    /// True for both committed outcomes
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::CommittedSuccess | Self::CommittedFailure)
    }
}

/// Kind tag used to select among the new global entities a committed
/// transaction created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    GlobalFungibleResource,
    GlobalNonFungibleResource,
    GlobalTwoResourcePool,
    GlobalGenericComponent,
    GlobalPackage,
}

impl EntityKind {
    /// The Gateway's string tag for this kind
    pub fn tag(&self) -> &'static str {
        match self {
            Self::GlobalFungibleResource => "GlobalFungibleResource",
            Self::GlobalNonFungibleResource => "GlobalNonFungibleResource",
            Self::GlobalTwoResourcePool => "GlobalTwoResourcePool",
            Self::GlobalGenericComponent => "GlobalGenericComponent",
            Self::GlobalPackage => "GlobalPackage",
        }
    }
}

/// One entry from a committed receipt's new-global-entities list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEntity {
    /// Bech32 address of the created entity
    pub entity_address: String,
    /// Gateway entity type tag, e.g. "GlobalFungibleResource"
    pub entity_type: String,
}

/// A fungible balance held by an account, with the resource's metadata
/// (used by the stake-claim discovery heuristic)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceBalance {
    pub resource_address: String,
    pub amount: Decimal,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Result of a completed operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// Intent hash of the submitted transaction
    pub transaction_id: TransactionId,
    /// Address of the entity the transaction created, when the operation is
    /// a creation-style operation and extraction succeeded
    pub created_entity: Option<String>,
}

impl OperationOutcome {
    pub fn submitted(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            created_entity: None,
        }
    }
}

/// Pool flavor requested at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    /// 50/50 two-resource pool
    Standard,
    /// Weighted pool; two weights, each >= 5, summing to 100
    Imbalanced { ratio: [u8; 2] },
    /// Pool with an attached hook component
    Hooked { hook: String },
}

/// High-level operation intent, as dispatched by an agent harness.
///
/// All amounts are decimal strings; they are validated before any manifest
/// is built. Addresses must match the active network's namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationRequest {
    Transfer {
        to: String,
        resource: String,
        amount: String,
    },
    Stake {
        validator: String,
        amount: String,
    },
    Unstake {
        validator: String,
        stake_unit_resource: String,
        amount: String,
    },
    ClaimRewards {
        validator: String,
    },
    CreatePool {
        kind: PoolKind,
        resource_a: String,
        resource_b: String,
        amount_a: String,
        amount_b: String,
    },
    AddLiquidity {
        pool: String,
        resource_a: String,
        resource_b: String,
        amount_a: String,
        amount_b: String,
    },
    RemoveLiquidity {
        pool: String,
        pool_unit_resource: String,
        amount: String,
    },
    Swap {
        pool: String,
        input_resource: String,
        input_amount: String,
        #[serde(default)]
        min_output: Option<String>,
    },
    FlashLoan {
        pool: String,
        resource: String,
        amount: String,
        callback_component: String,
        #[serde(default)]
        callback_data: BTreeMap<String, serde_json::Value>,
    },
    CreateFungible {
        name: String,
        symbol: String,
        #[serde(default)]
        description: Option<String>,
        initial_supply: String,
        #[serde(default)]
        divisibility: Option<u8>,
    },
    CreateNonFungible {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        initial_items: Vec<String>,
    },
    MintFungible {
        resource: String,
        amount: String,
    },
    MintNonFungible {
        resource: String,
        items: Vec<String>,
    },
    CallComponentMethod {
        component: String,
        method: String,
        #[serde(default)]
        args: Vec<serde_json::Value>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_prefix() {
        assert_eq!(
            AddressKind::classify(
                "account_rdx128y6j78mt0aqv6372evz28hrxp8mn06ccddkr7xppc88hyvynvjdwr"
            ),
            Some(AddressKind::Account)
        );
        assert_eq!(
            AddressKind::classify(
                "resource_tdx_2_1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxxtfd2jc"
            ),
            Some(AddressKind::Resource)
        );
        assert_eq!(
            AddressKind::classify(
                "validator_rdx1sd5368vqdmjk0y2w7ymdts02cz9c52858gpyny56xdvzuheepdeyy0"
            ),
            Some(AddressKind::Validator)
        );
        assert_eq!(AddressKind::classify("not_an_address"), None);
    }

    #[test]
    fn test_classification_is_stable() {
        let addr = "component_rdx1cptxxxxxxxxxfaucetxxxxxxxxx000527798379xxxxxxxxxfaucet";
        for _ in 0..3 {
            assert_eq!(AddressKind::classify(addr), Some(AddressKind::Component));
        }
    }

    #[test]
    fn test_validate_address_network_namespace() {
        let mainnet_account =
            "account_rdx128y6j78mt0aqv6372evz28hrxp8mn06ccddkr7xppc88hyvynvjdwr";
        assert!(validate_address(mainnet_account, AddressKind::Account, "rdx1").is_ok());
        // A mainnet address must be rejected when stokenet is active
        assert!(validate_address(mainnet_account, AddressKind::Account, "tdx_2_1").is_err());
        // Kind mismatch
        assert!(validate_address(mainnet_account, AddressKind::Resource, "rdx1").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("150").unwrap(), Decimal::from(150));
        assert_eq!(
            parse_amount("0.000000000000000001").unwrap(),
            Decimal::from_str("0.000000000000000001").unwrap()
        );
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_status_terminality() {
        assert!(TransactionStatus::CommittedSuccess.is_terminal());
        assert!(TransactionStatus::CommittedFailure.is_terminal());
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(!TransactionStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_operation_request_roundtrip() {
        let json = serde_json::json!({
            "operation": "transfer",
            "to": "account_rdx128y6j78mt0aqv6372evz28hrxp8mn06ccddkr7xppc88hyvynvjdwr",
            "resource": "resource_rdx1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxxradxrd",
            "amount": "150"
        });
        let req: OperationRequest = serde_json::from_value(json).unwrap();
        assert!(matches!(req, OperationRequest::Transfer { .. }));
    }
}
