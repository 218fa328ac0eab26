//! Error taxonomy for the relay
//!
//! Every failure surfaced to a caller is one of four categories with a fixed
//! HTTP mapping: missing input (400), invalid input (400), upstream format
//! failure after the bounded retry (502, with a truncated raw excerpt for
//! diagnosis), upstream transport failure (500).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Maximum number of characters of raw upstream output carried as debug context.
pub const DEBUG_EXCERPT_CHARS: usize = 4000;

/// One task-level failure, carrying a human-readable message.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// A required input was absent from the request.
    #[error("{0}")]
    MissingInput(String),

    /// An input was present but malformed, oversized, or of the wrong type.
    #[error("{0}")]
    InvalidInput(String),

    /// The upstream generator never produced schema-conformant output within
    /// the bounded retry. `debug` holds the last raw response, truncated.
    #[error("{message}")]
    UpstreamFormat { message: String, debug: String },

    /// Network or service failure reaching the upstream generator.
    #[error("{0}")]
    UpstreamTransport(String),
}

impl TaskError {
    /// Build an `UpstreamFormat` error, truncating `raw` to the debug budget.
    pub fn upstream_format(message: impl Into<String>, raw: &str) -> Self {
        Self::UpstreamFormat {
            message: message.into(),
            debug: truncate_chars(raw, DEBUG_EXCERPT_CHARS),
        }
    }

    /// HTTP status this error maps to at the server boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingInput(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamFormat { .. } => StatusCode::BAD_GATEWAY,
            Self::UpstreamTransport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::UpstreamFormat { message, debug } => {
                json!({ "error": message, "debug": debug })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
