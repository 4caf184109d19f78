//! # vfetch-client: Validated Fetcher
//!
//! Wraps an async retrieval step (an HTTP request by default) and validates
//! its result against a per-call schema, returning schema-conformant typed
//! data or a descriptive error.
//!
//! ```no_run
//! use vfetch_client::{create_fetcher, shape};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetch_validated = create_fetcher();
//! let schema = shape::object().field("hello", shape::string()).compile()?;
//!
//! let response = fetch_validated
//!     .fetch(&schema, ("https://example.com",))
//!     .await?;
//! assert_eq!(response["hello"], "world");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`Transport`]: the retrieval step. Its argument list is a tuple type;
//!   async closures of up to four arguments qualify.
//! - [`HttpTransport`]: the default transport (`reqwest`). Non-2xx
//!   responses fail with `Request failed with status <code>` before parsing.
//! - [`ValidatedFetcher`]: produced by [`create_fetcher`] or
//!   [`create_fetcher_with`]; couples one transport with any schema
//!   implementing [`Schema`].
//!
//! ## Errors
//!
//! [`FetchError::Transport`] carries the transport's error unmodified.
//! [`FetchError::Validation`] carries a [`ValidationFailure`] listing every
//! issue. Nothing is retried or recovered locally.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod transport;

pub use config::{ConfigError, HttpTransportConfig, DEFAULT_USER_AGENT};
pub use error::{FetchError, HttpError};
pub use fetcher::ValidatedFetcher;
pub use http::{HttpTransport, RequestInit};
pub use transport::Transport;

pub use vfetch_schema::{
    shape, Issue, IssueKind, IssueOrigin, JsonSchema, Schema, SchemaError, SchemaRegistry, Typed,
    ValidationFailure,
};

/// Create a validated fetcher backed by the default [`HttpTransport`].
///
/// The produced fetcher takes `(url,)` or `(url, RequestInit)` after the
/// schema.
pub fn create_fetcher() -> ValidatedFetcher<HttpTransport> {
    create_fetcher_with(HttpTransport::new())
}

/// Create a validated fetcher backed by `transport`. The produced fetcher
/// takes the schema followed by the transport's own argument tuple.
pub fn create_fetcher_with<T>(transport: T) -> ValidatedFetcher<T> {
    ValidatedFetcher::new(transport)
}
