//! Backend provider strategies for ToolBridge.
//!
//! Each provider implements [`ProviderStrategy`]: one `execute` entry point
//! taking a domain operation plus validated parameters and returning either a
//! JSON payload or a normalized [`BridgeError`]. The dispatch core routes
//! commands here without knowing anything about HTTP, endpoints, or backend
//! payload shapes, so adding a third provider means implementing this trait
//! and registering its commands.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tb_types::{BridgeError, BridgeResult, ProviderKey, ProviderOperation};

pub mod builders;
pub mod http;
pub mod issue_tracker;
pub mod wiki;

pub use http::ApiClient;
pub use issue_tracker::IssueTrackerProvider;
pub use wiki::WikiProvider;

/// A swappable backend capability.
///
/// Implementations own their HTTP client and request builders; failures
/// surface only as the shared error taxonomy, never as raw backend errors.
#[async_trait]
pub trait ProviderStrategy: Send + Sync {
    /// Which provider this strategy serves.
    fn key(&self) -> ProviderKey;

    /// Execute one domain operation with already-validated parameters.
    async fn execute(
        &self,
        operation: ProviderOperation,
        params: &Map<String, Value>,
    ) -> BridgeResult<Value>;
}

/// Fetch a required string parameter.
///
/// The validation chain guarantees presence for registered commands; this
/// keeps direct strategy calls (tests, future embedders) from panicking.
pub(crate) fn require_str<'a>(params: &'a Map<String, Value>, name: &str) -> BridgeResult<&'a str> {
    params
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| BridgeError::validation(name, "required string parameter missing"))
}

pub(crate) fn optional_str<'a>(params: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    params.get(name).and_then(Value::as_str)
}

/// Read a result-limit parameter, falling back to `default` and clamping to
/// `cap`. Accepts coerced numbers only; anything else falls back.
pub(crate) fn limit_param(params: &Map<String, Value>, name: &str, default: u32, cap: u32) -> u32 {
    let requested = params
        .get(name)
        .and_then(Value::as_u64)
        .unwrap_or(u64::from(default));
    requested.min(u64::from(cap)) as u32
}

/// Collect string-array parameters such as `labels`.
pub(crate) fn string_array(params: &Map<String, Value>, name: &str) -> Option<Vec<String>> {
    let items = params.get(name)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}
