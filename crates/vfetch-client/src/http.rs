//! # Default Transport
//!
//! [`HttpTransport`] performs one HTTP request with `reqwest` and decodes
//! the body as JSON. Any non-2xx status fails before the body is parsed,
//! with the message `Request failed with status <code>`.
//!
//! Accepted argument lists:
//!
//! | Args | Request |
//! |------|---------|
//! | `(url,)` | `GET url` |
//! | `(url, RequestInit)` | method, headers, query and body from the `RequestInit` |
//!
//! No retries and no timeout are applied here; callers who need either
//! configure them on the `reqwest::Client` passed to
//! [`HttpTransport::from_client`].

use std::future::Future;

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::config::HttpTransportConfig;
use crate::error::HttpError;
use crate::transport::Transport;

/// Per-request options: the second element of the default transport's
/// argument tuple.
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    method: Method,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
}

#[derive(Debug, Clone)]
enum RequestBody {
    Json(Value),
    Text(String),
}

impl RequestInit {
    /// A `GET` with no headers, query or body.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a query pair. Pairs already present in the URL are kept.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// JSON body; sets `Content-Type: application/json`.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }
}

/// Transport used by [`crate::create_fetcher`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpTransport {
    /// Transport with a default `reqwest::Client` and no base URL.
    pub fn new() -> Self {
        Self::from_client(reqwest::Client::new())
    }

    /// Wrap an existing client. Its timeouts, proxies and default headers apply.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: None,
        }
    }

    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Config` for invalid headers and
    /// `HttpError::ClientInit` if the client cannot be built.
    pub fn from_config(config: HttpTransportConfig) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(config.header_map()?)
            .build()
            .map_err(HttpError::ClientInit)?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Resolve relative request URLs against `base_url`.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    fn resolve(&self, raw: &str) -> Result<Url, HttpError> {
        let parsed = match &self.base_url {
            Some(base) => base.join(raw),
            None => Url::parse(raw),
        };
        parsed.map_err(|e| HttpError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })
    }

    /// Issue one request and decode the JSON body.
    ///
    /// # Errors
    ///
    /// - `HttpError::InvalidUrl` if `url` does not parse.
    /// - `HttpError::Request` on transport failure.
    /// - `HttpError::Status` for any non-2xx status; the body is not parsed.
    /// - `HttpError::Decode` if a 2xx body is not JSON.
    pub async fn send(&self, url: &str, init: RequestInit) -> Result<Value, HttpError> {
        let url = self.resolve(url)?;
        let endpoint = url.to_string();
        let RequestInit {
            method,
            headers,
            query,
            body,
        } = init;

        tracing::debug!(method = %method, url = %endpoint, "sending request");

        let mut req = self.http.request(method, url);
        for (name, value) in &headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if !query.is_empty() {
            req = req.query(&query);
        }
        match body {
            Some(RequestBody::Json(value)) => req = req.json(&value),
            Some(RequestBody::Text(text)) => req = req.body(text),
            None => {}
        }

        let resp = req.send().await.map_err(|e| HttpError::Request {
            url: endpoint.clone(),
            source: e,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(url = %endpoint, status = status.as_u16(), "request failed");
            return Err(HttpError::Status {
                url: endpoint,
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(url = %endpoint, status = status.as_u16(), "request succeeded");
        resp.json::<Value>().await.map_err(|e| HttpError::Decode {
            url: endpoint,
            source: e,
        })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> Transport<(U,)> for HttpTransport
where
    U: AsRef<str>,
{
    type Error = HttpError;

    fn fetch(&self, (url,): (U,)) -> impl Future<Output = Result<Value, HttpError>> + Send {
        let url = url.as_ref().to_string();
        async move { self.send(&url, RequestInit::default()).await }
    }
}

impl<U> Transport<(U, RequestInit)> for HttpTransport
where
    U: AsRef<str>,
{
    type Error = HttpError;

    fn fetch(
        &self,
        (url, init): (U, RequestInit),
    ) -> impl Future<Output = Result<Value, HttpError>> + Send {
        let url = url.as_ref().to_string();
        async move { self.send(&url, init).await }
    }
}
