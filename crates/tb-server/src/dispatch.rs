//! Request dispatch.
//!
//! Turns exactly one [`CommandRequest`] into exactly one
//! [`ResponseEnvelope`]: registry lookup, validation, then either a built-in
//! system answer or a provider strategy call. A panicking strategy is
//! contained here and reported as `DispatchInternalError` instead of taking
//! the process down. Logging happens in the transport around this layer, so
//! dispatch itself stays a pure request-to-response function.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde_json::{json, Value};
use tb_providers::ProviderStrategy;
use tb_types::{BridgeError, BridgeResult, ProviderKey};

use crate::protocol::{CommandRequest, ResponseEnvelope};
use crate::registry::{CommandRegistry, CommandTarget, SystemCommand};
use crate::validation::ValidationChain;

pub struct Dispatcher {
    registry: CommandRegistry,
    validation: ValidationChain,
    strategies: HashMap<ProviderKey, Arc<dyn ProviderStrategy>>,
    started_at: Instant,
}

impl Dispatcher {
    pub fn new(registry: CommandRegistry, validation: ValidationChain) -> Self {
        Self {
            registry,
            validation,
            strategies: HashMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Attach a provider strategy under its own key.
    ///
    /// Commands routed to a key with no strategy attached answer
    /// `ProviderAuthError` without any network activity.
    pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
        self.strategies.insert(strategy.key(), strategy);
        self
    }

    /// Serve one request. Always produces a response, echoing the request id.
    pub async fn dispatch(&self, request: CommandRequest) -> ResponseEnvelope {
        match self.handle(&request).await {
            Ok(result) => ResponseEnvelope::success(request.id, result),
            Err(error) => ResponseEnvelope::error(Some(request.id), &error),
        }
    }

    async fn handle(&self, request: &CommandRequest) -> BridgeResult<Value> {
        let spec = self
            .registry
            .lookup(&request.method)
            .ok_or_else(|| BridgeError::UnknownCommand(request.method.clone()))?;
        let params = self.validation.validate(spec, &request.params)?;

        match spec.target {
            CommandTarget::System(command) => Ok(self.system(command)),
            CommandTarget::Provider { key, operation } => {
                let strategy = self.strategies.get(&key).ok_or_else(|| {
                    BridgeError::ProviderAuth(format!("provider {} is not configured", key))
                })?;
                match AssertUnwindSafe(strategy.execute(operation, &params))
                    .catch_unwind()
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(BridgeError::DispatchInternal),
                }
            }
        }
    }

    fn system(&self, command: SystemCommand) -> Value {
        match command {
            SystemCommand::Ping => json!({"message": "pong"}),
            SystemCommand::Health => json!({
                "status": "healthy",
                "uptime": self.started_at.elapsed().as_secs(),
                "version": env!("CARGO_PKG_VERSION"),
            }),
            SystemCommand::ListCommands => {
                json!({"commands": self.registry.names().collect::<Vec<_>>()})
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_registry;
    use async_trait::async_trait;
    use serde_json::Map;
    use tb_config::UnknownParams;
    use tb_types::ProviderOperation;

    struct PanickingStrategy;

    #[async_trait]
    impl ProviderStrategy for PanickingStrategy {
        fn key(&self) -> ProviderKey {
            ProviderKey::IssueTracker
        }

        async fn execute(
            &self,
            _operation: ProviderOperation,
            _params: &Map<String, Value>,
        ) -> BridgeResult<Value> {
            panic!("strategy blew up");
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            default_registry().unwrap(),
            ValidationChain::new(UnknownParams::Reject),
        )
    }

    fn request(id: &str, method: &str, params: Value) -> CommandRequest {
        let parsed: Value = json!({"id": id, "method": method, "params": params});
        serde_json::from_value(parsed).unwrap()
    }

    #[tokio::test]
    async fn ping_answers_pong_with_the_request_id() {
        let response = dispatcher().dispatch(request("c1", "ping", json!({}))).await;
        assert_eq!(response.id.as_deref(), Some("c1"));
        assert!(response.success);
        assert_eq!(response.result, Some(json!({"message": "pong"})));
    }

    #[tokio::test]
    async fn health_reports_status_and_version() {
        let response = dispatcher()
            .dispatch(request("c1", "health", json!({})))
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["status"], json!("healthy"));
        assert_eq!(result["version"], json!(env!("CARGO_PKG_VERSION")));
        assert!(result["uptime"].is_u64());
    }

    #[tokio::test]
    async fn unknown_method_is_reported_with_its_name() {
        let response = dispatcher()
            .dispatch(request("c9", "teleport_issue", json!({})))
            .await;
        assert!(!response.success);
        let error = response.error.unwrap();
        assert_eq!(error.code, "UnknownCommand");
        assert!(error.message.contains("teleport_issue"));
    }

    #[tokio::test]
    async fn unconfigured_provider_answers_auth_error() {
        let response = dispatcher()
            .dispatch(request("c2", "delete_issue", json!({"key": "TEST-1"})))
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, "ProviderAuthError");
        assert!(error.message.contains("issue_tracker"));
    }

    #[tokio::test]
    async fn strategy_panic_is_contained() {
        let dispatcher = dispatcher().with_strategy(Arc::new(PanickingStrategy));
        let response = dispatcher
            .dispatch(request("c3", "delete_issue", json!({"key": "TEST-1"})))
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, "DispatchInternalError");
        assert_eq!(error.message, "internal error");

        // The dispatcher keeps serving after the panic.
        let response = dispatcher.dispatch(request("c4", "ping", json!({}))).await;
        assert!(response.success);
    }
}
