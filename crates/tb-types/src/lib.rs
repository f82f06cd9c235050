//! Shared types and the error taxonomy for ToolBridge

pub mod errors;
pub mod provider;

pub use errors::{BridgeError, BridgeResult};
pub use provider::{ProviderKey, ProviderOperation};
