//! Default transport configuration.
//!
//! Everything here is optional: [`crate::HttpTransport::new`] works without
//! any configuration. Use [`HttpTransportConfig`] to point relative URLs at
//! a base URL, send a bearer token, or add default headers. Nothing reads
//! the environment unless [`HttpTransportConfig::from_env`] is called.

use url::Url;
use zeroize::Zeroizing;

/// `User-Agent` sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("vfetch/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`crate::HttpTransport`].
///
/// Custom `Debug` implementation redacts the `bearer_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct HttpTransportConfig {
    /// Relative request URLs are joined onto this.
    pub base_url: Option<Url>,
    /// Sent as `Authorization: Bearer <token>`. Zeroized on drop.
    pub bearer_token: Option<Zeroizing<String>>,
    pub user_agent: String,
    /// Extra headers sent on every request.
    pub default_headers: Vec<(String, String)>,
}

impl std::fmt::Debug for HttpTransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportConfig")
            .field("base_url", &self.base_url)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user_agent", &self.user_agent)
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bearer_token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: Vec::new(),
        }
    }
}

impl HttpTransportConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VFETCH_BASE_URL` (optional)
    /// - `VFETCH_BEARER_TOKEN` (optional)
    /// - `VFETCH_USER_AGENT` (default: `vfetch/<version>`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env_url("VFETCH_BASE_URL")?,
            bearer_token: std::env::var("VFETCH_BEARER_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
                .map(Zeroizing::new),
            user_agent: std::env::var("VFETCH_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            default_headers: Vec::new(),
        })
    }

    /// Set the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `raw` does not parse.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw)
            .map_err(|e| ConfigError::InvalidUrl("base_url".to_string(), e.to_string()))?;
        self.base_url = Some(url);
        Ok(self)
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(Zeroizing::new(token.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Header map for the client: default headers plus `Authorization`.
    pub(crate) fn header_map(&self) -> Result<reqwest::header::HeaderMap, ConfigError> {
        use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};

        let mut headers = reqwest::header::HeaderMap::new();
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConfigError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ConfigError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, value);
        }
        if let Some(token) = &self.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ConfigError::InvalidHeader("authorization: invalid token".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

fn env_url(var: &str) -> Result<Option<Url>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if !raw.is_empty() => Url::parse(&raw)
            .map(Some)
            .map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string())),
        _ => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid header {0}")]
    InvalidHeader(String),
}
