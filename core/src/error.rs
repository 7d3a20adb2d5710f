//! Error types for the backend and catalog clients.
//!
//! # Design
//! `NotFound` keeps its own variant because views routinely tell "gone"
//! apart from "the server failed". Every other non-2xx lands in `Http` with
//! the raw body, which is where the backend puts its field-level messages.
//! [`ApiError::user_message`] turns any variant into the single string the
//! resource clients store for display.

use serde::Deserialize;

/// Message recorded when the request never got an HTTP response.
pub const CONNECTION_ERROR: &str = "connection error";

/// Errors produced while building, sending, or parsing a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never completed (DNS, refused connection, TLS, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound { body: String },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A 2xx response without the payload the operation needs.
    #[error("empty or unexpected response")]
    EmptyResponse,
}

/// Shape of the backend's error bodies. All fields are optional; the
/// backend uses `error` for business errors, `errors` for validator output
/// and `message` for everything else.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FieldError {
    msg: String,
}

impl ApiError {
    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message for display.
    ///
    /// Prefers the backend's `error`, then the first `errors[].msg`, then
    /// `message`. Transport failures map to [`CONNECTION_ERROR`]; anything
    /// else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Transport(_) => CONNECTION_ERROR.to_string(),
            ApiError::NotFound { body } | ApiError::Http { body, .. } => {
                backend_message(body).unwrap_or_else(|| fallback.to_string())
            }
            _ => fallback.to_string(),
        }
    }
}

fn backend_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .filter(|s| !s.is_empty())
        .or_else(|| parsed.errors.into_iter().next().map(|e| e.msg))
        .or(parsed.message.filter(|s| !s.is_empty()))
}
