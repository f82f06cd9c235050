//! Error types and wire-code mapping
//!
//! Every failure the bridge reports travels as one of these variants. The
//! protocol error `code` comes from [`BridgeError::code`]; the Display impl
//! supplies the human-readable message placed next to it in the envelope.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The input line was not a well-formed command envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// No command with this method name is registered.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A parameter failed the validation chain. Carries the offending field.
    #[error("invalid parameter `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// The backend rejected our credentials, or none were configured.
    #[error("provider authentication failed: {0}")]
    ProviderAuth(String),

    /// The backend reported the target resource does not exist.
    #[error("not found: {0}")]
    ProviderNotFound(String),

    /// The backend throttled us.
    #[error("rate limited: {0}")]
    ProviderRateLimited(String),

    /// The backend could not be reached, or the call timed out.
    #[error("provider network failure: {0}")]
    ProviderNetwork(String),

    /// The backend answered with something we cannot use.
    #[error("provider internal error: {0}")]
    ProviderInternal(String),

    /// Anything that escaped the taxonomy. Deliberately carries no detail;
    /// the specifics go to the log, never onto the wire.
    #[error("internal error")]
    DispatchInternal,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    /// Protocol error code for the response envelope.
    ///
    /// `Io` and `Serialization` are infrastructure failures that normally end
    /// the transport rather than a single command; if one is ever folded into
    /// an envelope it is indistinguishable from any other internal fault.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Parse(_) => "ParseError",
            BridgeError::UnknownCommand(_) => "UnknownCommand",
            BridgeError::Validation { .. } => "ValidationError",
            BridgeError::ProviderAuth(_) => "ProviderAuthError",
            BridgeError::ProviderNotFound(_) => "ProviderNotFound",
            BridgeError::ProviderRateLimited(_) => "ProviderRateLimited",
            BridgeError::ProviderNetwork(_) => "ProviderNetworkError",
            BridgeError::ProviderInternal(_) => "ProviderInternalError",
            BridgeError::DispatchInternal
            | BridgeError::Io(_)
            | BridgeError::Serialization(_) => "DispatchInternalError",
        }
    }

    /// Message safe to expose to the peer. Internal-class failures collapse
    /// to a fixed string so no state or backtrace detail leaks.
    pub fn public_message(&self) -> String {
        match self {
            BridgeError::DispatchInternal
            | BridgeError::Io(_)
            | BridgeError::Serialization(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }

    /// Convenience constructor for validation failures.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_taxonomy() {
        assert_eq!(BridgeError::Parse("x".into()).code(), "ParseError");
        assert_eq!(
            BridgeError::UnknownCommand("nope".into()).code(),
            "UnknownCommand"
        );
        assert_eq!(
            BridgeError::validation("summary", "missing").code(),
            "ValidationError"
        );
        assert_eq!(
            BridgeError::ProviderAuth("401".into()).code(),
            "ProviderAuthError"
        );
        assert_eq!(
            BridgeError::ProviderNotFound("ISSUE-1".into()).code(),
            "ProviderNotFound"
        );
        assert_eq!(
            BridgeError::ProviderRateLimited("slow down".into()).code(),
            "ProviderRateLimited"
        );
        assert_eq!(
            BridgeError::ProviderNetwork("timeout".into()).code(),
            "ProviderNetworkError"
        );
        assert_eq!(
            BridgeError::ProviderInternal("boom".into()).code(),
            "ProviderInternalError"
        );
        assert_eq!(BridgeError::DispatchInternal.code(), "DispatchInternalError");
    }

    #[test]
    fn validation_message_names_the_field() {
        let err = BridgeError::validation("issuetype", "required field is missing");
        assert!(err.to_string().contains("issuetype"));
        assert!(err.to_string().contains("required field is missing"));
    }

    #[test]
    fn internal_errors_expose_no_detail() {
        let io = BridgeError::Io(std::io::Error::other("socket vanished"));
        assert_eq!(io.public_message(), "internal error");
        assert_eq!(io.code(), "DispatchInternalError");

        assert_eq!(BridgeError::DispatchInternal.public_message(), "internal error");

        // Wire-taxonomy errors keep their message.
        let auth = BridgeError::ProviderAuth("bad token".into());
        assert!(auth.public_message().contains("bad token"));
    }
}
