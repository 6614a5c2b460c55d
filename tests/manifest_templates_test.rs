//! Integration tests for manifest synthesis through the public API
//!
//! These tests validate:
//! - The canonical instruction skeleton (lock fee, withdraw, take, call, deposit)
//! - Deterministic rendering of identical inputs
//! - Network-namespace address validation at the template boundary
//! - The pool-creation network branch (factory vs package instantiation)

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use radix_agent::config::{AddressBook, NetworkDefinition};
use radix_agent::error::AgentError;
use radix_agent::manifest::templates::{
    self, CreateFungibleSpec, TemplateContext,
};
use radix_agent::manifest::Instruction;
use radix_agent::types::PoolKind;

const OWNER: &str = "account_rdx128y6j78mt0aqv6372evz28hrxp8mn06ccddkr7xppc88hyvynvjdwr";
const RECIPIENT: &str = "account_rdx129a9wuey40lducsf6yu232zmzk5kscpvnl6fv472r0ja39f3hced69";
const XRD: &str = "resource_rdx1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxxradxrd";
const TOKEN: &str = "resource_rdx1t4upr78guuapv5ept7d7ptekk9mqhy605zgms33mcszen8l9fac8vf";
const POOL: &str = "component_rdx1cz8daq5nwmtdju4hj5rxud0ta26wf90sdk5r4nj9fqjcde5eht8p0f";

fn mainnet_ctx() -> TemplateContext<'static> {
    TemplateContext::new(OWNER, Decimal::from(10), NetworkDefinition::Mainnet)
}

#[test]
fn test_transfer_follows_canonical_skeleton() {
    let manifest = templates::transfer(&mainnet_ctx(), RECIPIENT, XRD, "150").unwrap();
    let instructions = manifest.instructions();

    // Fee lock is always the first instruction
    assert!(matches!(
        &instructions[0],
        Instruction::CallMethod { method, address, .. }
            if method == "lock_fee" && address == OWNER
    ));
    // Withdraw from the owner comes before any take
    assert!(matches!(
        &instructions[1],
        Instruction::CallMethod { method, .. } if method == "withdraw"
    ));
    assert!(matches!(
        &instructions[2],
        Instruction::TakeFromWorktop { resource, .. } if resource == XRD
    ));
    // The deposit targets the recipient and closes the manifest
    assert!(matches!(
        instructions.last().unwrap(),
        Instruction::CallMethod { method, address, .. }
            if method.starts_with("try_deposit") && address == RECIPIENT
    ));
}

#[test]
fn test_rendering_is_deterministic() {
    let a = templates::transfer(&mainnet_ctx(), RECIPIENT, XRD, "42.5")
        .unwrap()
        .render();
    let b = templates::transfer(&mainnet_ctx(), RECIPIENT, XRD, "42.5")
        .unwrap()
        .render();
    assert_eq!(a, b);
    assert!(a.contains("Decimal(\"42.5\")"));
}

#[test]
fn test_amount_text_is_preserved_verbatim() {
    // High-precision supply must survive into the manifest unchanged
    let spec = CreateFungibleSpec {
        name: "Precision".to_string(),
        symbol: "PRC".to_string(),
        description: None,
        initial_supply: "123456789.123456789123456789".to_string(),
        divisibility: Some(18),
    };
    let text = templates::create_fungible(&mainnet_ctx(), &spec)
        .unwrap()
        .render();
    assert!(text.contains("Decimal(\"123456789.123456789123456789\")"));
}

#[test]
fn test_cross_network_addresses_are_rejected() {
    // A stokenet recipient is invalid against a mainnet context
    let stokenet_account =
        "account_tdx_2_129a9wuey40lducsf6yu232zmzk5kscpvnl6fv472r0ja39f3hced69";
    let result = templates::transfer(&mainnet_ctx(), stokenet_account, XRD, "1");
    assert!(matches!(result, Err(AgentError::Validation(_))));

    // And a resource address is never accepted where an account is expected
    let result = templates::transfer(&mainnet_ctx(), XRD, XRD, "1");
    assert!(matches!(result, Err(AgentError::Validation(_))));
}

#[test]
fn test_create_pool_branches_by_network() {
    let mainnet_book = AddressBook::for_network(NetworkDefinition::Mainnet);
    let text = templates::create_pool(
        &mainnet_ctx(),
        &mainnet_book,
        &PoolKind::Standard,
        XRD,
        TOKEN,
        "100",
        "250",
    )
    .unwrap()
    .render();
    assert!(text.contains("\"new_pool\""));
    assert!(!text.contains("CALL_FUNCTION"));

    let stokenet_owner =
        "account_tdx_2_128y6j78mt0aqv6372evz28hrxp8mn06ccddkr7xppc88hyvynvjdwr";
    let stokenet_xrd =
        "resource_tdx_2_1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxxtfd2jc";
    let stokenet_token =
        "resource_tdx_2_1t4upr78guuapv5ept7d7ptekk9mqhy605zgms33mcszen8l9fac8vf";
    let ctx = TemplateContext::new(
        stokenet_owner,
        Decimal::from(25),
        NetworkDefinition::Stokenet,
    );
    let book = AddressBook::for_network(NetworkDefinition::Stokenet);
    let text = templates::create_pool(
        &ctx,
        &book,
        &PoolKind::Standard,
        stokenet_xrd,
        stokenet_token,
        "100",
        "250",
    )
    .unwrap()
    .render();
    assert!(text.contains("CALL_FUNCTION"));
    assert!(text.contains("\"instantiate\""));
}

#[test]
fn test_create_pool_without_factory_or_package_is_unsupported() {
    let localnet_owner = "account_loc128y6j78mt0aqv6372evz28hrxp8mn06ccddkr7xppc88hyvynvjdwr";
    let localnet_xrd = "resource_loc1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxx8nc2jc";
    let localnet_token = "resource_loc1t4upr78guuapv5ept7d7ptekk9mqhy605zgms33mcszen8l9fac8vf";
    let ctx = TemplateContext::new(
        localnet_owner,
        Decimal::from(25),
        NetworkDefinition::Localnet,
    );
    let book = AddressBook::for_network(NetworkDefinition::Localnet);
    let result = templates::create_pool(
        &ctx,
        &book,
        &PoolKind::Standard,
        localnet_xrd,
        localnet_token,
        "1",
        "1",
    );
    assert!(matches!(
        result,
        Err(AgentError::NetworkUnsupported { .. })
    ));
}

#[test]
fn test_imbalanced_pool_ratio_is_validated_before_any_instruction() {
    let book = AddressBook::for_network(NetworkDefinition::Mainnet);
    let result = templates::create_pool(
        &mainnet_ctx(),
        &book,
        &PoolKind::Imbalanced { ratio: [2, 98] },
        XRD,
        TOKEN,
        "100",
        "100",
    );
    assert!(matches!(result, Err(AgentError::Validation(_))));
}

#[test]
fn test_flash_loan_never_withdraws_from_owner() {
    let mut data = BTreeMap::new();
    data.insert("route".to_string(), serde_json::json!("direct"));
    let manifest =
        templates::flash_loan(&mainnet_ctx(), POOL, XRD, "10000", POOL, &data).unwrap();
    let withdraws = manifest.count_matching(|i| {
        matches!(i, Instruction::CallMethod { method, .. } if method == "withdraw")
    });
    assert_eq!(withdraws, 0);
    assert!(manifest.render().contains("\"flash_loan\""));
}

#[test]
fn test_every_money_moving_template_locks_a_fee_first() {
    let ctx = mainnet_ctx();
    let validator = "validator_rdx1sd5368vqdmjk0y2w7ymdts02cz9c52858gpyny56xdvzuheepdeyy0";
    let manifests = vec![
        templates::transfer(&ctx, RECIPIENT, XRD, "1").unwrap(),
        templates::stake(&ctx, validator, XRD, "1").unwrap(),
        templates::unstake(&ctx, validator, TOKEN, "1").unwrap(),
        templates::swap(&ctx, POOL, XRD, "1", None).unwrap(),
        templates::remove_liquidity(&ctx, POOL, TOKEN, "1").unwrap(),
    ];
    for manifest in manifests {
        assert!(matches!(
            &manifest.instructions()[0],
            Instruction::CallMethod { method, .. } if method == "lock_fee"
        ));
    }
}
