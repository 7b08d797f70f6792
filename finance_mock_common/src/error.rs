//! Error types shared between the engine and the server binary.
//!
//! Two families live here:
//! - `MockError` covers everything that can go wrong while the server is being
//!   assembled (reading files, decoding JSON, compiling path templates). These are
//!   fatal and bubble up to `main`.
//! - `RequestError` covers the per-request outcomes. None of them are fatal; each is
//!   turned into an HTTP reply with [`RequestError::into_reply`].
use std::io;

use http::StatusCode;
use thiserror::Error;

use crate::response::{ErrorInfo, Reply, ResponseBody};

/// Code sent with internal errors and unknown routes.
pub const INVALID_REQUEST_CODE: &str = "invalid-request";
/// Description sent with internal errors.
pub const INTERNAL_ERROR_DESCRIPTION: &str = "An internal error occurred.";
/// Code sent when a request argument is missing.
pub const ARGUMENT_ERROR_CODE: &str = "argument-error";

/// Unified startup error type.
#[derive(Error, Debug)]
pub enum MockError {
    /// I/O error while reading spec/fixture files or binding sockets.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A path template that cannot be turned into a matcher.
    #[error("Invalid path template {template:?}: {reason}")]
    PathTemplate {
        /// The offending template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The generated pattern was rejected by the regex engine.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),
}

/// Outcome of a request that did not produce a regular resource payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No compiled route accepts the method and path.
    #[error("Unrecognized request URL ({method}: {path}).")]
    RouteNotFound {
        /// Upper-cased request method.
        method: String,
        /// Raw request path.
        path: String,
    },

    /// The route matched but its resource cannot be resolved.
    #[error("Unresolved resource: {0}")]
    UnresolvedResource(String),

    /// A required argument was absent or empty.
    #[error("Missing value for the \"{0}\" argument")]
    MissingRequiredParameter(String),

    /// A market-state change named an unknown session.
    #[error("Invalid market state: {0:?}")]
    InvalidConfigValue(String),

    /// The query string could not be decoded.
    #[error("Malformed query string: {0}")]
    MalformedQuery(String),
}

impl RequestError {
    /// HTTP status associated with this outcome.
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            RequestError::MissingRequiredParameter(_) | RequestError::InvalidConfigValue(_) => {
                StatusCode::BAD_REQUEST
            }
            RequestError::UnresolvedResource(_) | RequestError::MalformedQuery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Convert the outcome into the reply written back to the client.
    ///
    /// Internal failures never leak their reason to the client; it is only logged.
    /// Config rejections carry no body, so the formatter falls back to the status text.
    pub fn into_reply(self) -> Reply {
        let status = self.status();
        let body = match &self {
            RequestError::RouteNotFound { .. } => {
                Some(ResponseBody::error(ErrorInfo::new(INVALID_REQUEST_CODE, self.to_string())))
            }
            RequestError::MissingRequiredParameter(_) => {
                Some(ResponseBody::error(ErrorInfo::new(ARGUMENT_ERROR_CODE, self.to_string())))
            }
            RequestError::UnresolvedResource(_) | RequestError::MalformedQuery(_) => {
                Some(ResponseBody::error(ErrorInfo::internal()))
            }
            RequestError::InvalidConfigValue(_) => None,
        };
        Reply { status, body }
    }
}
