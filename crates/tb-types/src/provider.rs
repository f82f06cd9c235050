//! Provider identity and operation enums shared by the registry and the
//! strategy implementations.

use serde::{Deserialize, Serialize};

/// Which backend a command is routed to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKey {
    IssueTracker,
    Wiki,
}

impl ProviderKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKey::IssueTracker => "issue_tracker",
            ProviderKey::Wiki => "wiki",
        }
    }
}

impl std::fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of domain operations a strategy can be asked to perform.
///
/// Each registered provider command maps to exactly one of these; strategies
/// match exhaustively so an unsupported pairing is a normal error, never a
/// panic.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ProviderOperation {
    Create,
    Update,
    Delete,
    Search,
    SearchByParent,
    Debug,
}

impl ProviderOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderOperation::Create => "create",
            ProviderOperation::Update => "update",
            ProviderOperation::Delete => "delete",
            ProviderOperation::Search => "search",
            ProviderOperation::SearchByParent => "search_by_parent",
            ProviderOperation::Debug => "debug",
        }
    }
}

impl std::fmt::Display for ProviderOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
