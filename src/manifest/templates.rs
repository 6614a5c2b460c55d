//! Per-operation manifest templates
//!
//! Each template is a pure function from typed parameters to a `Manifest`.
//! All money-moving templates share the canonical skeleton: lock fee,
//! withdraw inputs, take buckets, invoke the target, deposit the remaining
//! worktop back to the initiating account.

use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::{AddressBook, NetworkDefinition};
use crate::error::AgentError;
use crate::manifest::builder::{Manifest, ManifestBuilder};
use crate::manifest::value::{from_json, ManifestValue};
use crate::types::{parse_amount, validate_address, AddressKind, PoolKind};

/// Default divisibility for newly created fungible resources
pub const DEFAULT_DIVISIBILITY: u8 = 18;

/// Inputs shared by every template: the initiating account, the fee to
/// lock, and the active network (for address namespace validation)
#[derive(Debug, Clone)]
pub struct TemplateContext<'a> {
    pub owner: &'a str,
    pub fee: Decimal,
    pub network: NetworkDefinition,
}

impl<'a> TemplateContext<'a> {
    pub fn new(owner: &'a str, fee: Decimal, network: NetworkDefinition) -> Self {
        Self {
            owner,
            fee,
            network,
        }
    }

    fn check(&self, address: &str, kind: AddressKind) -> Result<(), AgentError> {
        validate_address(address, kind, self.network.hrp_infix())
    }

    fn check_owner(&self) -> Result<(), AgentError> {
        self.check(self.owner, AddressKind::Account)
    }
}

/// Transfer `amount` of `resource` from the initiating account to `to`.
///
/// Exactly one withdraw and one deposit step; no intermediate resource
/// creation.
pub fn transfer(
    ctx: &TemplateContext<'_>,
    to: &str,
    resource: &str,
    amount: &str,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(to, AddressKind::Account)?;
    ctx.check(resource, AddressKind::Resource)?;
    let amount = parse_amount(amount)?;

    let (builder, bucket) = ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .withdraw(ctx.owner, resource, amount)
        .take_from_worktop(resource, amount);
    Ok(builder.try_deposit_or_abort(to, bucket).build())
}

/// Transfer one resource to several recipients within a single transaction
pub fn transfer_multi(
    ctx: &TemplateContext<'_>,
    resource: &str,
    recipients: &[(String, String)],
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(resource, AddressKind::Resource)?;
    if recipients.is_empty() {
        return Err(AgentError::validation("transfer_multi needs at least one recipient"));
    }

    let mut total = Decimal::ZERO;
    let mut parsed = Vec::with_capacity(recipients.len());
    for (to, amount) in recipients {
        ctx.check(to, AddressKind::Account)?;
        let amount = parse_amount(amount)?;
        total += amount;
        parsed.push((to.as_str(), amount));
    }

    let mut builder = ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .withdraw(ctx.owner, resource, total)
        .assert_worktop_contains(resource, total);
    for (to, amount) in parsed {
        let (b, bucket) = builder.take_from_worktop(resource, amount);
        builder = b.try_deposit_or_abort(to, bucket);
    }
    Ok(builder.build())
}

/// Parameters for fungible resource creation
#[derive(Debug, Clone)]
pub struct CreateFungibleSpec {
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
    /// Decimal-as-string; full precision is preserved into the manifest
    pub initial_supply: String,
    pub divisibility: Option<u8>,
}

pub fn create_fungible(
    ctx: &TemplateContext<'_>,
    spec: &CreateFungibleSpec,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    let supply = parse_amount(&spec.initial_supply)?;
    let divisibility = spec.divisibility.unwrap_or(DEFAULT_DIVISIBILITY);
    if divisibility > 18 {
        return Err(AgentError::validation(format!(
            "divisibility must be 0..=18, got {}",
            divisibility
        )));
    }

    let mut metadata = vec![
        ("name".to_string(), spec.name.clone()),
        ("symbol".to_string(), spec.symbol.clone()),
    ];
    if let Some(description) = &spec.description {
        metadata.push(("description".to_string(), description.clone()));
    }

    Ok(ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .create_fungible_resource(divisibility, supply, metadata)
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Parameters for non-fungible resource creation
#[derive(Debug, Clone)]
pub struct CreateNonFungibleSpec {
    pub name: String,
    pub description: Option<String>,
    /// Initial item payloads minted alongside the resource
    pub initial_items: Vec<String>,
}

pub fn create_non_fungible(
    ctx: &TemplateContext<'_>,
    spec: &CreateNonFungibleSpec,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;

    let mut metadata = vec![("name".to_string(), spec.name.clone())];
    if let Some(description) = &spec.description {
        metadata.push(("description".to_string(), description.clone()));
    }

    Ok(ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .create_non_fungible_resource(metadata, spec.initial_items.clone())
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Mint more of an existing fungible resource into the initiating account
pub fn mint_fungible(
    ctx: &TemplateContext<'_>,
    resource: &str,
    amount: &str,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(resource, AddressKind::Resource)?;
    let amount = parse_amount(amount)?;

    Ok(ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .call_method(resource, "mint", vec![ManifestValue::decimal(amount)])
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Mint non-fungible items into the initiating account
pub fn mint_non_fungible(
    ctx: &TemplateContext<'_>,
    resource: &str,
    items: &[String],
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(resource, AddressKind::Resource)?;
    if items.is_empty() {
        return Err(AgentError::validation("mint_non_fungible needs at least one item"));
    }

    let items = ManifestValue::Array {
        element_type: "String".to_string(),
        elements: items
            .iter()
            .map(|i| ManifestValue::String(i.clone()))
            .collect(),
    };
    Ok(ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .call_method(resource, "mint", vec![items])
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Stake XRD with a validator; stake units land back in the account
pub fn stake(
    ctx: &TemplateContext<'_>,
    validator: &str,
    xrd: &str,
    amount: &str,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(validator, AddressKind::Validator)?;
    let amount = parse_amount(amount)?;

    let (builder, bucket) = ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .withdraw(ctx.owner, xrd, amount)
        .take_from_worktop(xrd, amount);
    Ok(builder
        .call_method(validator, "stake", vec![ManifestValue::Bucket(bucket)])
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Unstake by returning stake units to the validator; produces a
/// stake-claim receipt
pub fn unstake(
    ctx: &TemplateContext<'_>,
    validator: &str,
    stake_unit_resource: &str,
    amount: &str,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(validator, AddressKind::Validator)?;
    ctx.check(stake_unit_resource, AddressKind::Resource)?;
    let amount = parse_amount(amount)?;

    let (builder, bucket) = ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .withdraw(ctx.owner, stake_unit_resource, amount)
        .take_from_worktop(stake_unit_resource, amount);
    Ok(builder
        .call_method(validator, "unstake", vec![ManifestValue::Bucket(bucket)])
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Claim unstaked XRD by presenting a stake-claim receipt found in the
/// account
pub fn claim_with_receipt(
    ctx: &TemplateContext<'_>,
    validator: &str,
    claim_resource: &str,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(validator, AddressKind::Validator)?;
    ctx.check(claim_resource, AddressKind::Resource)?;

    let (builder, bucket) = ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .call_method(
            ctx.owner,
            "withdraw_non_fungibles",
            vec![ManifestValue::Address(claim_resource.to_string())],
        )
        .take_all_from_worktop(claim_resource);
    Ok(builder
        .call_method(validator, "claim_xrd", vec![ManifestValue::Bucket(bucket)])
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Direct claim path, used when no stake-claim receipt could be located
pub fn claim_direct(ctx: &TemplateContext<'_>, validator: &str) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(validator, AddressKind::Validator)?;

    Ok(ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .call_method(validator, "claim_xrd", vec![])
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Validate an imbalanced-pool asset ratio: two weights, each >= 5,
/// summing to exactly 100
pub fn validate_pool_ratio(ratio: &[u8; 2]) -> Result<(), AgentError> {
    let [a, b] = *ratio;
    if u32::from(a) + u32::from(b) != 100 {
        return Err(AgentError::validation(format!(
            "pool ratio must sum to 100, got {}+{}",
            a, b
        )));
    }
    if a < 5 || b < 5 {
        return Err(AgentError::validation(format!(
            "each pool weight must be at least 5, got [{}, {}]",
            a, b
        )));
    }
    Ok(())
}

/// Create a two-resource pool seeded with initial liquidity.
///
/// Branches by network: a known factory component on mainnet, direct
/// package instantiation on test networks.
#[allow(clippy::too_many_arguments)]
pub fn create_pool(
    ctx: &TemplateContext<'_>,
    book: &AddressBook,
    kind: &PoolKind,
    resource_a: &str,
    resource_b: &str,
    amount_a: &str,
    amount_b: &str,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(resource_a, AddressKind::Resource)?;
    ctx.check(resource_b, AddressKind::Resource)?;
    if resource_a == resource_b {
        return Err(AgentError::validation(
            "pool resources must be distinct",
        ));
    }
    let amount_a = parse_amount(amount_a)?;
    let amount_b = parse_amount(amount_b)?;

    // Kind-specific arguments, validated before any instruction is built
    let mut extra_args = Vec::new();
    match kind {
        PoolKind::Standard => {}
        PoolKind::Imbalanced { ratio } => {
            validate_pool_ratio(ratio)?;
            extra_args.push(ManifestValue::U8(ratio[0]));
            extra_args.push(ManifestValue::U8(ratio[1]));
        }
        PoolKind::Hooked { hook } => {
            ctx.check(hook, AddressKind::Component)?;
            extra_args.push(ManifestValue::Address(hook.clone()));
        }
    }

    let (builder, bucket_a) = ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .withdraw(ctx.owner, resource_a, amount_a)
        .withdraw(ctx.owner, resource_b, amount_b)
        .take_from_worktop(resource_a, amount_a);
    let (builder, bucket_b) = builder.take_from_worktop(resource_b, amount_b);

    let mut args = vec![
        ManifestValue::Bucket(bucket_a),
        ManifestValue::Bucket(bucket_b),
    ];
    args.extend(extra_args);

    let builder = match (book.pool_factory.as_deref(), book.pool_package.as_deref()) {
        (Some(factory), _) => builder.call_method(factory, "new_pool", args),
        (None, Some(package)) => {
            builder.call_function(package, "TwoResourcePool", "instantiate", args)
        }
        (None, None) => {
            return Err(AgentError::unsupported(
                ctx.network.name(),
                "create_pool",
            ))
        }
    };
    Ok(builder.try_deposit_entire_worktop(ctx.owner).build())
}

/// Add liquidity to an existing pool
#[allow(clippy::too_many_arguments)]
pub fn add_liquidity(
    ctx: &TemplateContext<'_>,
    pool: &str,
    resource_a: &str,
    resource_b: &str,
    amount_a: &str,
    amount_b: &str,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(pool, AddressKind::Component)?;
    ctx.check(resource_a, AddressKind::Resource)?;
    ctx.check(resource_b, AddressKind::Resource)?;
    let amount_a = parse_amount(amount_a)?;
    let amount_b = parse_amount(amount_b)?;

    let (builder, bucket_a) = ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .withdraw(ctx.owner, resource_a, amount_a)
        .withdraw(ctx.owner, resource_b, amount_b)
        .take_from_worktop(resource_a, amount_a);
    let (builder, bucket_b) = builder.take_from_worktop(resource_b, amount_b);
    Ok(builder
        .call_method(
            pool,
            "add_liquidity",
            vec![
                ManifestValue::Bucket(bucket_a),
                ManifestValue::Bucket(bucket_b),
            ],
        )
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Redeem pool units for the underlying resources
pub fn remove_liquidity(
    ctx: &TemplateContext<'_>,
    pool: &str,
    pool_unit_resource: &str,
    amount: &str,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(pool, AddressKind::Component)?;
    ctx.check(pool_unit_resource, AddressKind::Resource)?;
    let amount = parse_amount(amount)?;

    let (builder, bucket) = ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .withdraw(ctx.owner, pool_unit_resource, amount)
        .take_from_worktop(pool_unit_resource, amount);
    Ok(builder
        .call_method(
            pool,
            "remove_liquidity",
            vec![ManifestValue::Bucket(bucket)],
        )
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Swap an input amount against a pool; the optional minimum output is
/// enforced by the pool component itself
pub fn swap(
    ctx: &TemplateContext<'_>,
    pool: &str,
    input_resource: &str,
    input_amount: &str,
    min_output: Option<&str>,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(pool, AddressKind::Component)?;
    ctx.check(input_resource, AddressKind::Resource)?;
    let amount = parse_amount(input_amount)?;

    let mut args = Vec::with_capacity(2);
    let (builder, bucket) = ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .withdraw(ctx.owner, input_resource, amount)
        .take_from_worktop(input_resource, amount);
    args.push(ManifestValue::Bucket(bucket));
    if let Some(min_output) = min_output {
        args.push(ManifestValue::decimal(parse_amount(min_output)?));
    }
    Ok(builder
        .call_method(pool, "swap", args)
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Borrow a flash loan; the callback component must repay within the same
/// transaction (enforced by the network, not this layer)
pub fn flash_loan(
    ctx: &TemplateContext<'_>,
    pool: &str,
    resource: &str,
    amount: &str,
    callback_component: &str,
    callback_data: &BTreeMap<String, Value>,
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(pool, AddressKind::Component)?;
    ctx.check(resource, AddressKind::Resource)?;
    ctx.check(callback_component, AddressKind::Component)?;
    let amount = parse_amount(amount)?;

    let data = ManifestValue::Map {
        value_type: callback_data
            .values()
            .next()
            .map(|v| from_json(v).type_name())
            .unwrap_or("Any")
            .to_string(),
        entries: callback_data
            .iter()
            .map(|(k, v)| (k.clone(), from_json(v)))
            .collect(),
    };

    Ok(ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .call_method(
            pool,
            "flash_loan",
            vec![
                ManifestValue::Address(resource.to_string()),
                ManifestValue::decimal(amount),
                ManifestValue::Address(callback_component.to_string()),
                data,
            ],
        )
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}

/// Call an arbitrary component method, formatting caller-supplied JSON
/// arguments into typed manifest values
pub fn call_component_method(
    ctx: &TemplateContext<'_>,
    component: &str,
    method: &str,
    args: &[Value],
) -> Result<Manifest, AgentError> {
    ctx.check_owner()?;
    ctx.check(component, AddressKind::Component)?;
    if method.is_empty() {
        return Err(AgentError::validation("method name must not be empty"));
    }

    let args = args.iter().map(from_json).collect();
    Ok(ManifestBuilder::new()
        .lock_fee(ctx.owner, ctx.fee)
        .call_method(component, method, args)
        .try_deposit_entire_worktop(ctx.owner)
        .build())
}
