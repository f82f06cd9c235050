//! Wire envelopes for the line-oriented command protocol.
//!
//! One JSON object per line in each direction. Requests carry an `id` the
//! peer chose; every response echoes it verbatim so the peer can correlate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tb_types::BridgeError;

/// One incoming command.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    pub id: String,
    pub method: String,
    /// Raw parameters as sent; the validation chain produces the coerced map.
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// One outgoing response.
///
/// `id` is `null` only for parse failures, where no id could be recovered
/// from the input line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ResponseEnvelope {
    pub fn success(id: String, result: Value) -> Self {
        Self {
            id: Some(id),
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<String>, error: &BridgeError) -> Self {
        Self {
            id,
            success: false,
            result: None,
            error: Some(ErrorBody {
                code: error.code().to_string(),
                message: error.public_message(),
            }),
        }
    }
}
