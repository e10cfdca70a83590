use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the REST client.
///
/// Callers only ever distinguish "it worked" from "it did not"; the variants
/// exist so logs can say which side failed.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with {status}")]
    Server {
        status: StatusCode,
        payload: Option<serde_json::Value>,
    },

    #[error("server rejected the request: {}", message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0} not found")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// The error payload the server sent, if any.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            ApiError::Server { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}
