//! Request and response bodies shared between the atrium service, the content
//! backend it reads from, and the systems that call its revalidation webhook.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by the content backend for `GET /api/<kind>?locale=<code>`.
///
/// `data` is kept as raw JSON; shape checking happens in the merger for each
/// content kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
}

/// Error body some backend responses carry alongside a non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body accepted by `POST /api/revalidate/{kind}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevalidateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

/// Successful webhook response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevalidateResponse {
    pub revalidated: bool,
    /// Milliseconds since the Unix epoch at the time of invalidation.
    pub now: i64,
}

/// Result of the in-process revalidation action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Error body returned by the service's own HTTP endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
