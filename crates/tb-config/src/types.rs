use serde::{Deserialize, Serialize};

/// How requests to a provider's backend authenticate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// HTTP Basic with `username:token`
    #[default]
    Basic,
    /// `Authorization: Bearer <token>`
    Bearer,
}

/// Resolved credentials for one backend provider.
///
/// Loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderCredentials {
    /// Base URL of the backend, e.g. `https://tracker.example.com`
    pub url: String,

    /// Account the token belongs to. Ignored for bearer auth.
    #[serde(default)]
    pub username: String,

    /// API token or personal access token
    pub token: String,

    #[serde(default)]
    pub auth_type: AuthType,
}

/// Policy for request parameters that are not part of a command's schema.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnknownParams {
    /// Fail validation naming the first unknown parameter
    #[default]
    Reject,
    /// Drop unknown parameters silently
    Ignore,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationConfig {
    #[serde(default)]
    pub unknown_params: UnknownParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Upper bound applied to `maxResults`/`limit` on search commands.
    /// Requests above the cap are clamped, not rejected.
    #[serde(default = "default_max_results_cap")]
    pub max_results_cap: u32,
}

fn default_max_results_cap() -> u32 {
    50
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results_cap: default_max_results_cap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Per-request timeout for provider calls, in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Accept self-signed TLS certificates. Needed for some on-premise
    /// backend installations; leave off unless the backend requires it.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            accept_invalid_certs: false,
        }
    }
}

/// Top-level application configuration.
///
/// Either provider section may be omitted; its commands then answer with an
/// auth error instead of reaching the network. Startup fails only when neither
/// provider is resolvable (file or environment).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_tracker: Option<ProviderCredentials>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<ProviderCredentials>,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub http: HttpConfig,
}
