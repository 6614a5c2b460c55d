//! Token operations: transfers, resource creation, minting, balances

use std::sync::Arc;

use crate::error::AgentError;
use crate::manifest::templates::{self, CreateFungibleSpec, CreateNonFungibleSpec};
use crate::services::ServiceContext;
use crate::types::{EntityKind, OperationOutcome, ResourceBalance};

/// Token service over the shared agent context
pub struct TokenService {
    ctx: Arc<ServiceContext>,
}

impl TokenService {
    pub(crate) fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Transfer an amount of `resource` to another account
    pub async fn transfer(
        &self,
        to: &str,
        resource: &str,
        amount: &str,
    ) -> Result<OperationOutcome, AgentError> {
        let manifest = templates::transfer(&self.ctx.template_ctx(), to, resource, amount)?;
        self.ctx.execute("transfer", &manifest, None).await
    }

    /// Transfer one resource to several recipients in a single transaction
    pub async fn transfer_multi(
        &self,
        resource: &str,
        recipients: &[(String, String)],
    ) -> Result<OperationOutcome, AgentError> {
        let manifest =
            templates::transfer_multi(&self.ctx.template_ctx(), resource, recipients)?;
        self.ctx.execute("transfer_multi", &manifest, None).await
    }

    /// Create a fungible resource and return its address once the
    /// transaction commits
    pub async fn create_fungible(
        &self,
        spec: CreateFungibleSpec,
    ) -> Result<OperationOutcome, AgentError> {
        let manifest = templates::create_fungible(&self.ctx.creation_ctx(), &spec)?;
        self.ctx.require_fee_balance().await?;
        self.ctx
            .execute(
                "create_fungible",
                &manifest,
                Some(EntityKind::GlobalFungibleResource),
            )
            .await
    }

    /// Create a non-fungible resource and return its address once the
    /// transaction commits
    pub async fn create_non_fungible(
        &self,
        spec: CreateNonFungibleSpec,
    ) -> Result<OperationOutcome, AgentError> {
        let manifest = templates::create_non_fungible(&self.ctx.creation_ctx(), &spec)?;
        self.ctx.require_fee_balance().await?;
        self.ctx
            .execute(
                "create_non_fungible",
                &manifest,
                Some(EntityKind::GlobalNonFungibleResource),
            )
            .await
    }

    /// Mint more of an existing fungible resource (the wallet must hold
    /// the minter role on-chain)
    pub async fn mint_fungible(
        &self,
        resource: &str,
        amount: &str,
    ) -> Result<OperationOutcome, AgentError> {
        let manifest = templates::mint_fungible(&self.ctx.template_ctx(), resource, amount)?;
        self.ctx.execute("mint_fungible", &manifest, None).await
    }

    /// Mint non-fungible items on an existing resource
    pub async fn mint_non_fungible(
        &self,
        resource: &str,
        items: &[String],
    ) -> Result<OperationOutcome, AgentError> {
        let manifest = templates::mint_non_fungible(&self.ctx.template_ctx(), resource, items)?;
        self.ctx.execute("mint_non_fungible", &manifest, None).await
    }

    /// Fungible balances of the wallet's account (or another address)
    pub async fn get_balances(
        &self,
        address: Option<&str>,
    ) -> Result<Vec<ResourceBalance>, AgentError> {
        let address = address.unwrap_or_else(|| self.ctx.wallet.address());
        self.ctx.gateway.account_balances(address).await
    }
}
