//! Arbitrary component interaction: method calls and state reads

use serde_json::Value;
use std::sync::Arc;

use crate::error::AgentError;
use crate::manifest::templates;
use crate::services::ServiceContext;
use crate::types::OperationOutcome;

/// Component service over the shared agent context
pub struct ComponentService {
    ctx: Arc<ServiceContext>,
}

impl ComponentService {
    pub(crate) fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Call a method on a component, formatting the JSON arguments into
    /// typed manifest values
    pub async fn call_method(
        &self,
        component: &str,
        method: &str,
        args: &[Value],
    ) -> Result<OperationOutcome, AgentError> {
        let manifest =
            templates::call_component_method(&self.ctx.template_ctx(), component, method, args)?;
        self.ctx.execute("call_component_method", &manifest, None).await
    }

    /// Read an entity's state/details from the Gateway (no transaction)
    pub async fn get_state(&self, component: &str) -> Result<Value, AgentError> {
        self.ctx.gateway.entity_details(component).await
    }
}
