use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    /// A required option is missing. Returned to the caller, never rendered.
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

impl LoaderError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Non-200 response; displays as the reason phrase (e.g. `Not Found`).
    #[error("{reason}")]
    Status { status: u16, reason: String },
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("invalid url '{url}': {message}")]
    InvalidUrl { url: String, message: String },
    #[error("{0}")]
    Transport(String),
    /// Failure reported by a custom fetcher.
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ApplyError(pub String);

impl ApplyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
