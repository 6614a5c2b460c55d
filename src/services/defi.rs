//! DeFi operations: staking, pools, liquidity, swaps, flash loans

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::AgentError;
use crate::manifest::templates;
use crate::services::ServiceContext;
use crate::types::{EntityKind, OperationOutcome, PoolKind};

/// DeFi service over the shared agent context
pub struct DefiService {
    ctx: Arc<ServiceContext>,
}

impl DefiService {
    pub(crate) fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Stake XRD with a validator
    pub async fn stake_xrd(
        &self,
        validator: &str,
        amount: &str,
    ) -> Result<OperationOutcome, AgentError> {
        let manifest = templates::stake(
            &self.ctx.template_ctx(),
            validator,
            &self.ctx.book.xrd,
            amount,
        )?;
        self.ctx.execute("stake_xrd", &manifest, None).await
    }

    /// Return stake units to a validator, producing a stake-claim receipt
    pub async fn unstake(
        &self,
        validator: &str,
        stake_unit_resource: &str,
        amount: &str,
    ) -> Result<OperationOutcome, AgentError> {
        let manifest = templates::unstake(
            &self.ctx.template_ctx(),
            validator,
            stake_unit_resource,
            amount,
        )?;
        self.ctx.execute("unstake", &manifest, None).await
    }

    /// Claim unstaked XRD from a validator.
    ///
    /// First tries to locate a stake-claim receipt already held by the
    /// account, discovered by substring match on resource metadata. This is
    /// a best-effort heuristic, not a guaranteed-correct classifier; when
    /// nothing matches, the direct claim call is used instead.
    pub async fn claim_rewards(&self, validator: &str) -> Result<OperationOutcome, AgentError> {
        let claim_resource = self.find_claim_receipt().await?;
        let tctx = self.ctx.template_ctx();
        let manifest = match claim_resource {
            Some(resource) => {
                tracing::debug!(resource = %resource, "Claiming via stake-claim receipt");
                templates::claim_with_receipt(&tctx, validator, &resource)?
            }
            None => {
                tracing::debug!("No stake-claim receipt found, using direct claim path");
                templates::claim_direct(&tctx, validator)?
            }
        };
        self.ctx.execute("claim_rewards", &manifest, None).await
    }

    async fn find_claim_receipt(&self) -> Result<Option<String>, AgentError> {
        let balances = self
            .ctx
            .gateway
            .account_balances(self.ctx.wallet.address())
            .await?;
        Ok(balances
            .iter()
            .find(|b| {
                b.metadata.iter().any(|(key, value)| {
                    let key = key.to_lowercase();
                    let value = value.to_lowercase();
                    key.contains("claim")
                        || key.contains("unstake")
                        || value.contains("claim")
                        || value.contains("unstake")
                })
            })
            .map(|b| b.resource_address.clone()))
    }

    /// Create a two-resource pool seeded with initial liquidity; returns
    /// the pool address once the transaction commits
    pub async fn create_pool(
        &self,
        kind: &PoolKind,
        resource_a: &str,
        resource_b: &str,
        amount_a: &str,
        amount_b: &str,
    ) -> Result<OperationOutcome, AgentError> {
        self.ctx.require_exchange("create_pool")?;
        let manifest = templates::create_pool(
            &self.ctx.creation_ctx(),
            &self.ctx.book,
            kind,
            resource_a,
            resource_b,
            amount_a,
            amount_b,
        )?;
        self.ctx.require_fee_balance().await?;
        self.ctx
            .execute(
                "create_pool",
                &manifest,
                Some(EntityKind::GlobalTwoResourcePool),
            )
            .await
    }

    /// Add liquidity to an existing pool
    pub async fn add_liquidity(
        &self,
        pool: &str,
        resource_a: &str,
        resource_b: &str,
        amount_a: &str,
        amount_b: &str,
    ) -> Result<OperationOutcome, AgentError> {
        self.ctx.require_exchange("add_liquidity")?;
        let manifest = templates::add_liquidity(
            &self.ctx.template_ctx(),
            pool,
            resource_a,
            resource_b,
            amount_a,
            amount_b,
        )?;
        self.ctx.execute("add_liquidity", &manifest, None).await
    }

    /// Redeem pool units for the underlying resources
    pub async fn remove_liquidity(
        &self,
        pool: &str,
        pool_unit_resource: &str,
        amount: &str,
    ) -> Result<OperationOutcome, AgentError> {
        self.ctx.require_exchange("remove_liquidity")?;
        let manifest = templates::remove_liquidity(
            &self.ctx.template_ctx(),
            pool,
            pool_unit_resource,
            amount,
        )?;
        self.ctx.execute("remove_liquidity", &manifest, None).await
    }

    /// Swap an input amount against a pool
    pub async fn swap_tokens(
        &self,
        pool: &str,
        input_resource: &str,
        input_amount: &str,
        min_output: Option<&str>,
    ) -> Result<OperationOutcome, AgentError> {
        self.ctx.require_exchange("swap_tokens")?;
        let manifest = templates::swap(
            &self.ctx.template_ctx(),
            pool,
            input_resource,
            input_amount,
            min_output,
        )?;
        self.ctx.execute("swap_tokens", &manifest, None).await
    }

    /// Borrow a flash loan repaid by `callback_component` within the same
    /// transaction
    pub async fn flash_loan(
        &self,
        pool: &str,
        resource: &str,
        amount: &str,
        callback_component: &str,
        callback_data: &BTreeMap<String, Value>,
    ) -> Result<OperationOutcome, AgentError> {
        self.ctx.require_exchange("flash_loan")?;
        let manifest = templates::flash_loan(
            &self.ctx.template_ctx(),
            pool,
            resource,
            amount,
            callback_component,
            callback_data,
        )?;
        self.ctx.execute("flash_loan", &manifest, None).await
    }
}
