//! Configuration loading for ToolBridge.
//!
//! Credentials live in a YAML file; each provider section also has an
//! environment fallback (`TB_TRACKER_*`, `TB_WIKI_*`) for deployments that
//! keep secrets out of files. The configuration is resolved once at startup
//! and never reloaded.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

pub mod types;

pub use types::{
    AppConfig, AuthType, HttpConfig, ProviderCredentials, SearchConfig, UnknownParams,
    ValidationConfig,
};

/// File consulted when no `--config` path is given
pub const DEFAULT_CONFIG_FILE: &str = "toolbridge.yaml";

/// Environment prefix for the issue tracker credential fallback
pub const TRACKER_ENV_PREFIX: &str = "TB_TRACKER";
/// Environment prefix for the wiki credential fallback
pub const WIKI_ENV_PREFIX: &str = "TB_WIKI";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {var}: expected `basic` or `bearer`, got `{value}`")]
    BadAuthType { var: String, value: String },

    #[error(
        "no provider configured: add an issue_tracker or wiki section to the \
         config file, or set the TB_TRACKER_*/TB_WIKI_* environment variables"
    )]
    NoProviders,
}

/// Load and resolve the application configuration.
///
/// With an explicit `path` the file must exist. Without one,
/// [`DEFAULT_CONFIG_FILE`] is used if present and defaults otherwise, so an
/// environment-only deployment needs no file at all. After the file pass,
/// missing provider sections are filled from the environment; at least one
/// provider must be resolvable.
///
/// # Errors
///
/// Returns an error when the file is unreadable or malformed, when a
/// `*_AUTH_TYPE` variable holds an unknown value, or when neither provider
/// ends up configured.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => read_file(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                read_file(default)?
            } else {
                debug!("no config file, starting from defaults");
                AppConfig::default()
            }
        }
    };
    resolve(config, |name| std::env::var(name).ok())
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Fill missing provider sections from `env` and enforce that at least one
/// provider is configured. Split from [`load`] so tests can drive it with a
/// map instead of process environment variables.
fn resolve(
    mut config: AppConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    if config.issue_tracker.is_none() {
        config.issue_tracker = provider_from_env(TRACKER_ENV_PREFIX, &env)?;
        if config.issue_tracker.is_some() {
            debug!("issue tracker credentials resolved from environment");
        }
    }
    if config.wiki.is_none() {
        config.wiki = provider_from_env(WIKI_ENV_PREFIX, &env)?;
        if config.wiki.is_some() {
            debug!("wiki credentials resolved from environment");
        }
    }

    if config.issue_tracker.is_none() && config.wiki.is_none() {
        return Err(ConfigError::NoProviders);
    }
    Ok(config)
}

/// Build one provider's credentials from `{prefix}_URL`, `{prefix}_USERNAME`,
/// `{prefix}_TOKEN` and `{prefix}_AUTH_TYPE`. Yields `None` unless both URL
/// and token are present and non-empty.
fn provider_from_env(
    prefix: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Option<ProviderCredentials>, ConfigError> {
    let var = |field: &str| {
        env(&format!("{}_{}", prefix, field)).filter(|value| !value.is_empty())
    };

    let url = match var("URL") {
        Some(url) => url,
        None => return Ok(None),
    };
    let token = match var("TOKEN") {
        Some(token) => token,
        None => return Ok(None),
    };

    let auth_type = match var("AUTH_TYPE") {
        None => AuthType::default(),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "basic" => AuthType::Basic,
            "bearer" => AuthType::Bearer,
            _ => {
                return Err(ConfigError::BadAuthType {
                    var: format!("{}_AUTH_TYPE", prefix),
                    value: raw,
                })
            }
        },
    };

    Ok(Some(ProviderCredentials {
        url,
        username: var("USERNAME").unwrap_or_default(),
        token,
        auth_type,
    }))
}
