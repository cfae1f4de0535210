//! JSON-lines wire format used by `serve` and `query`.
//!
//! One request per line:
//!
//! ```text
//! {"id": 7, "command": "getRamInfo"}
//! ```
//!
//! One response per line, echoing the request id (or `null`):
//!
//! ```text
//! {"id":7,"status":"success","value":"Total RAM: 15872MB, Available RAM: 9120MB"}
//! {"id":8,"status":"failure","error":{"kind":"UNSUPPORTED_COMMAND","message":"Unsupported command: getWeather"}}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::Request;
use crate::dispatch::{DispatchError, Response};
use crate::provider::Value;

/// Error kind for lines that are not a valid request.
pub const MALFORMED_REQUEST: &str = "MALFORMED_REQUEST";

/// A request line: caller-chosen id plus the request itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireRequest {
    /// Opaque correlation id, echoed back in the response.
    #[serde(default)]
    pub id: serde_json::Value,
    /// The request.
    #[serde(flatten)]
    pub request: Request,
}

/// A line that could not be turned into a [`WireRequest`].
#[derive(Debug, Error)]
#[error("Malformed request: {source}")]
pub struct MalformedRequest {
    /// Id recovered from the line, if it was a JSON object with one.
    pub id: serde_json::Value,
    /// Why decoding failed
    #[source]
    pub source: serde_json::Error,
}

/// Decodes one request line.
///
/// # Errors
///
/// Returns [`MalformedRequest`] if the line is not JSON or lacks a string
/// `command`. The id is recovered when the line is at least a JSON object.
pub fn parse_line(line: &str) -> Result<WireRequest, MalformedRequest> {
    let raw: serde_json::Value = serde_json::from_str(line).map_err(|source| MalformedRequest {
        id: serde_json::Value::Null,
        source,
    })?;

    let id = raw.get("id").cloned().unwrap_or_default();
    serde_json::from_value(raw).map_err(|source| MalformedRequest { id, source })
}

/// Error payload of a failure line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable kind.
    pub kind: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl From<&DispatchError> for ErrorBody {
    fn from(error: &DispatchError) -> Self {
        Self {
            kind: error.code(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Body {
    Success { value: Value },
    Failure { error: ErrorBody },
}

/// A response line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    id: serde_json::Value,
    #[serde(flatten)]
    body: Body,
}

impl Envelope {
    /// Wraps a dispatcher response for the request with `id`.
    #[must_use]
    pub fn new(id: serde_json::Value, response: &Response) -> Self {
        let body = match response {
            Response::Success(value) => Body::Success {
                value: value.clone(),
            },
            Response::Failure(error) => Body::Failure {
                error: error.into(),
            },
        };
        Self { id, body }
    }

    /// Failure line for an undecodable request.
    #[must_use]
    pub fn malformed(error: &MalformedRequest) -> Self {
        Self {
            id: error.id.clone(),
            body: Body::Failure {
                error: ErrorBody {
                    kind: MALFORMED_REQUEST,
                    message: error.to_string(),
                },
            },
        }
    }

    /// Returns true for success lines.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.body, Body::Success { .. })
    }

    /// Encodes the envelope as a single JSON line (without the newline).
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which only happens for values JSON
    /// cannot represent.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
