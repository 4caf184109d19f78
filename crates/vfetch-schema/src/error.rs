//! Errors raised while loading or compiling schemas.
//!
//! These are distinct from [`crate::ValidationFailure`]: a `SchemaError`
//! means the schema itself is unusable, not that a value failed it.

use thiserror::Error;

/// Error while building a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The compiled validator could not be built (e.g. invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    Build {
        /// Schema name, or `<anonymous>`.
        schema_name: String,
        reason: String,
    },

    /// A named schema is not registered.
    #[error("schema '{schema_name}' not found in registry")]
    NotFound { schema_name: String },

    /// A schema file could not be parsed.
    #[error("schema load error for '{path}': {reason}")]
    Load { path: String, reason: String },

    /// IO error reading a schema file or directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
