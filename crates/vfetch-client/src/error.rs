//! Fetcher and default-transport error types.

use vfetch_schema::ValidationFailure;

use crate::config::ConfigError;

/// Error from a validated fetch. Transport errors are carried unmodified.
#[derive(Debug, thiserror::Error)]
pub enum FetchError<E> {
    /// The transport failed; validation was not attempted.
    #[error(transparent)]
    Transport(E),
    /// The transport succeeded but its value does not satisfy the schema.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

impl<E> FetchError<E> {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn transport_error(&self) -> Option<&E> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Validation(_) => None,
        }
    }

    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(failure),
            Self::Transport(_) => None,
        }
    }

    /// Recover the transport's own error.
    pub fn into_transport(self) -> Option<E> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

/// Errors from [`crate::HttpTransport`].
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The server answered with a non-2xx status. The body is kept for
    /// inspection but never parsed.
    #[error("Request failed with status {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    /// HTTP transport error (connection, TLS, malformed request).
    #[error("HTTP error calling {url}: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },
    /// Response body is not JSON.
    #[error("failed to decode JSON response from {url}: {source}")]
    Decode {
        url: String,
        source: reqwest::Error,
    },
    /// The request URL could not be parsed or joined onto the base URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// The underlying client could not be built.
    #[error("HTTP client initialization failed: {0}")]
    ClientInit(#[source] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl HttpError {
    /// Status code for [`HttpError::Status`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
