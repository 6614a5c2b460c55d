//! Operation services
//!
//! Named high-level operations composed from the manifest templates, the
//! build/sign/submit pipeline, and the extraction poller. Each operation
//! is a short orchestration: validate inputs, build the manifest, submit
//! (under the uniform retry decorator), and optionally poll for the
//! created entity.

pub mod component;
pub mod defi;
pub mod token;

pub use component::ComponentService;
pub use defi::DefiService;
pub use token::TokenService;

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::config::{AddressBook, AgentConfig, DuplicatePolicy};
use crate::error::AgentError;
use crate::gateway::{GatewayClient, HttpGatewayClient};
use crate::manifest::templates::TemplateContext;
use crate::manifest::Manifest;
use crate::observability::{abbreviate, CorrelationId};
use crate::pipeline::TransactionPipeline;
use crate::poller::ResourceExtractionPoller;
use crate::retry::with_retry;
use crate::types::{
    parse_amount, EntityKind, OperationOutcome, OperationRequest, TransactionId,
};
use crate::wallet::Wallet;

/// Shared wiring behind every service
pub(crate) struct ServiceContext {
    pub gateway: Arc<dyn GatewayClient>,
    pub wallet: Arc<dyn Wallet>,
    pub config: AgentConfig,
    pub book: AddressBook,
    pub pipeline: TransactionPipeline,
    pub poller: ResourceExtractionPoller,
    pub standard_fee: Decimal,
    pub creation_fee: Decimal,
    pub min_creation_balance: Decimal,
}

impl ServiceContext {
    fn new(
        config: AgentConfig,
        wallet: Arc<dyn Wallet>,
        gateway: Arc<dyn GatewayClient>,
    ) -> Result<Self, AgentError> {
        let standard_fee = parse_amount(&config.fees.standard)
            .map_err(|e| AgentError::Config(format!("fees.standard: {}", e)))?;
        let creation_fee = parse_amount(&config.fees.creation)
            .map_err(|e| AgentError::Config(format!("fees.creation: {}", e)))?;
        let min_creation_balance = parse_amount(&config.fees.min_creation_balance)
            .map_err(|e| AgentError::Config(format!("fees.min_creation_balance: {}", e)))?;

        let pipeline = TransactionPipeline::new(Arc::clone(&gateway), config.network);
        let poller = ResourceExtractionPoller::new(Arc::clone(&gateway), &config.poller);
        let book = config.address_book();

        Ok(Self {
            gateway,
            wallet,
            config,
            book,
            pipeline,
            poller,
            standard_fee,
            creation_fee,
            min_creation_balance,
        })
    }

    /// Template context for simple operations
    pub(crate) fn template_ctx(&self) -> TemplateContext<'_> {
        TemplateContext::new(self.wallet.address(), self.standard_fee, self.config.network)
    }

    /// Template context for resource/pool creation (larger fee lock)
    pub(crate) fn creation_ctx(&self) -> TemplateContext<'_> {
        TemplateContext::new(self.wallet.address(), self.creation_fee, self.config.network)
    }

    /// Fail fast when the integrated exchange protocol is not deployed on
    /// the active network
    pub(crate) fn require_exchange(&self, operation: &str) -> Result<(), AgentError> {
        if !self.config.network.supports_exchange() {
            return Err(AgentError::unsupported(self.config.network.name(), operation));
        }
        Ok(())
    }

    /// Pre-flight balance check for creation-style operations so fees are
    /// not burned on a transaction guaranteed to fail on-chain
    pub(crate) async fn require_fee_balance(&self) -> Result<(), AgentError> {
        let balances = self.gateway.account_balances(self.wallet.address()).await?;
        let xrd_held = balances
            .iter()
            .find(|b| b.resource_address == self.book.xrd)
            .map(|b| b.amount)
            .unwrap_or(Decimal::ZERO);
        if xrd_held < self.min_creation_balance {
            return Err(AgentError::validation(format!(
                "insufficient XRD for fees: need {}, account holds {}",
                self.min_creation_balance, xrd_held
            )));
        }
        Ok(())
    }

    /// Run one operation end to end: submit under the retry decorator,
    /// then optionally poll for the created entity.
    pub(crate) async fn execute(
        &self,
        label: &str,
        manifest: &Manifest,
        extract: Option<EntityKind>,
    ) -> Result<OperationOutcome, AgentError> {
        let correlation_id = CorrelationId::new();

        let submitted = with_retry(&self.config.retry, label, || async {
            self.pipeline
                .execute(manifest, self.wallet.as_ref(), label, &correlation_id)
                .await
        })
        .await;

        let tx_id = match submitted {
            Ok(id) => id,
            Err(AgentError::DuplicateTransaction { transaction_id })
                if self.config.duplicate_policy == DuplicatePolicy::ProceedToPoll =>
            {
                tracing::info!(
                    correlation_id = %correlation_id,
                    label = %label,
                    transaction_id = %abbreviate(&transaction_id),
                    "Duplicate flag treated as already-submitted, proceeding to poll"
                );
                TransactionId(transaction_id)
            }
            Err(e) => return Err(e),
        };

        let created_entity = match extract {
            Some(kind) => Some(
                self.poller
                    .extract(&tx_id, kind, &correlation_id)
                    .await?,
            ),
            None => None,
        };

        tracing::info!(
            correlation_id = %correlation_id,
            label = %label,
            transaction_id = %abbreviate(tx_id.as_str()),
            created_entity = ?created_entity.as_deref().map(abbreviate),
            "Operation complete"
        );
        Ok(OperationOutcome {
            transaction_id: tx_id,
            created_entity,
        })
    }
}

/// Facade owning the token, DeFi and component services over one wallet
/// and one Gateway connection
pub struct RadixAgent {
    pub token: TokenService,
    pub defi: DefiService,
    pub component: ComponentService,
}

impl RadixAgent {
    /// Wire up all services from an explicit Gateway client (any
    /// `GatewayClient` implementation, e.g. a test double)
    pub fn new(
        config: AgentConfig,
        wallet: Arc<dyn Wallet>,
        gateway: Arc<dyn GatewayClient>,
    ) -> Result<Self, AgentError> {
        let ctx = Arc::new(ServiceContext::new(config, wallet, gateway)?);
        Ok(Self {
            token: TokenService::new(Arc::clone(&ctx)),
            defi: DefiService::new(Arc::clone(&ctx)),
            component: ComponentService::new(ctx),
        })
    }

    /// Wire up all services against the configured network's Gateway
    pub fn connect(config: AgentConfig, wallet: Arc<dyn Wallet>) -> Result<Self, AgentError> {
        let gateway = Arc::new(HttpGatewayClient::new(config.gateway_url())?);
        Self::new(config, wallet, gateway)
    }

    /// Dispatch a tagged operation request to the matching service method
    pub async fn dispatch(
        &self,
        request: OperationRequest,
    ) -> Result<OperationOutcome, AgentError> {
        match request {
            OperationRequest::Transfer {
                to,
                resource,
                amount,
            } => self.token.transfer(&to, &resource, &amount).await,
            OperationRequest::CreateFungible {
                name,
                symbol,
                description,
                initial_supply,
                divisibility,
            } => {
                self.token
                    .create_fungible(crate::manifest::templates::CreateFungibleSpec {
                        name,
                        symbol,
                        description,
                        initial_supply,
                        divisibility,
                    })
                    .await
            }
            OperationRequest::CreateNonFungible {
                name,
                description,
                initial_items,
            } => {
                self.token
                    .create_non_fungible(crate::manifest::templates::CreateNonFungibleSpec {
                        name,
                        description,
                        initial_items,
                    })
                    .await
            }
            OperationRequest::MintFungible { resource, amount } => {
                self.token.mint_fungible(&resource, &amount).await
            }
            OperationRequest::MintNonFungible { resource, items } => {
                self.token.mint_non_fungible(&resource, &items).await
            }
            OperationRequest::Stake { validator, amount } => {
                self.defi.stake_xrd(&validator, &amount).await
            }
            OperationRequest::Unstake {
                validator,
                stake_unit_resource,
                amount,
            } => {
                self.defi
                    .unstake(&validator, &stake_unit_resource, &amount)
                    .await
            }
            OperationRequest::ClaimRewards { validator } => {
                self.defi.claim_rewards(&validator).await
            }
            OperationRequest::CreatePool {
                kind,
                resource_a,
                resource_b,
                amount_a,
                amount_b,
            } => {
                self.defi
                    .create_pool(&kind, &resource_a, &resource_b, &amount_a, &amount_b)
                    .await
            }
            OperationRequest::AddLiquidity {
                pool,
                resource_a,
                resource_b,
                amount_a,
                amount_b,
            } => {
                self.defi
                    .add_liquidity(&pool, &resource_a, &resource_b, &amount_a, &amount_b)
                    .await
            }
            OperationRequest::RemoveLiquidity {
                pool,
                pool_unit_resource,
                amount,
            } => {
                self.defi
                    .remove_liquidity(&pool, &pool_unit_resource, &amount)
                    .await
            }
            OperationRequest::Swap {
                pool,
                input_resource,
                input_amount,
                min_output,
            } => {
                self.defi
                    .swap_tokens(&pool, &input_resource, &input_amount, min_output.as_deref())
                    .await
            }
            OperationRequest::FlashLoan {
                pool,
                resource,
                amount,
                callback_component,
                callback_data,
            } => {
                self.defi
                    .flash_loan(&pool, &resource, &amount, &callback_component, &callback_data)
                    .await
            }
            OperationRequest::CallComponentMethod {
                component,
                method,
                args,
            } => self.component.call_method(&component, &method, &args).await,
        }
    }
}
