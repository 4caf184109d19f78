//! The validated fetcher: one transport, any number of per-call schemas.

use std::fmt;
use std::sync::Arc;

use vfetch_schema::Schema;

use crate::error::FetchError;
use crate::transport::Transport;

/// Couples one [`Transport`] with per-call schema validation.
///
/// The transport is fixed at construction. Cloning shares it, and
/// concurrent calls are independent: each owns its transport call and its
/// validation pass.
pub struct ValidatedFetcher<T> {
    transport: Arc<T>,
}

impl<T> ValidatedFetcher<T> {
    /// Wrap `transport`. The transport is neither called nor inspected here.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call the transport with `args`, then validate the raw value
    /// against `schema`.
    ///
    /// One transport call and one validation pass; no retries. When the
    /// transport fails its error is returned unmodified as
    /// [`FetchError::Transport`] and validation is not attempted.
    #[tracing::instrument(level = "debug", skip_all, fields(schema = schema.name()))]
    pub async fn fetch<S, Args>(
        &self,
        schema: &S,
        args: Args,
    ) -> Result<S::Output, FetchError<T::Error>>
    where
        T: Transport<Args>,
        S: Schema,
    {
        let raw = match self.transport.fetch(args).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(error = %e, "transport failed");
                return Err(FetchError::Transport(e));
            }
        };

        match schema.validate(raw).await {
            Ok(out) => {
                tracing::debug!("response validated");
                Ok(out)
            }
            Err(failure) => {
                tracing::debug!(issues = failure.len(), "response failed validation");
                Err(FetchError::Validation(failure))
            }
        }
    }
}

impl<T> Clone for ValidatedFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ValidatedFetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedFetcher")
            .field("transport", &self.transport)
            .finish()
    }
}
