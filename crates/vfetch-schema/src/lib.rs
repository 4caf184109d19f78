//! # vfetch-schema: Schema Capability
//!
//! Defines the [`Schema`] trait the validated fetcher is generic over, and
//! the concrete schemas that implement it:
//!
//! - [`JsonSchema`]: a compiled JSON Schema (via the `jsonschema` crate)
//!   with an output type, the raw `serde_json::Value` by default.
//! - [`Typed`]: a serde-only schema that accepts whatever deserializes into
//!   the output type.
//! - [`shape`]: builders for common JSON Schema documents.
//! - [`SchemaRegistry`]: named documents with local `$ref` resolution,
//!   loadable from a directory of `*.schema.json` / `*.schema.yaml` files.
//!
//! Failures are reported as a [`ValidationFailure`] listing every
//! [`Issue`]: category, expected constraint, offending input, instance
//! path, schema path, origin, and message.

pub mod error;
pub mod issue;
pub mod json;
pub mod registry;
pub mod shape;
pub mod typed;

pub use error::SchemaError;
pub use issue::{Issue, IssueKind, IssueOrigin, ValidationFailure};
pub use json::JsonSchema;
pub use registry::{SchemaRegistry, SCHEMA_URI_PREFIX};
pub use typed::Typed;

use std::future::Future;

use serde_json::Value;

/// A value-shape descriptor with a validation operation and an associated
/// output type.
///
/// Validation may suspend; the built-in schemas resolve immediately.
/// Implementations must not mutate shared state: the same schema may be
/// used by many concurrent fetches.
pub trait Schema: Send + Sync {
    /// Type produced by a successful validation.
    type Output: Send;

    /// Display name used in logs and failures.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Validate `value`, returning the typed output or every issue found.
    fn validate(
        &self,
        value: Value,
    ) -> impl Future<Output = Result<Self::Output, ValidationFailure>> + Send;
}

impl<S: Schema> Schema for std::sync::Arc<S> {
    type Output = S::Output;

    fn name(&self) -> Option<&str> {
        (**self).name()
    }

    fn validate(
        &self,
        value: Value,
    ) -> impl Future<Output = Result<Self::Output, ValidationFailure>> + Send {
        (**self).validate(value)
    }
}
