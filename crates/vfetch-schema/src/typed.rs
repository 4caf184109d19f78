//! Serde-only schema: a value conforms iff it deserializes into `T`.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::issue::ValidationFailure;
use crate::json::deserialize_issue;
use crate::Schema;

/// Schema backed by a Rust type's `Deserialize` impl instead of a JSON
/// Schema document. Failures carry a single [`crate::IssueKind::Deserialize`]
/// issue whose message is the serde error.
pub struct Typed<T> {
    name: Option<String>,
    _output: PhantomData<fn() -> T>,
}

impl<T> Typed<T> {
    pub fn new() -> Self {
        Self {
            name: None,
            _output: PhantomData,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<T: DeserializeOwned> Typed<T> {
    pub fn parse(&self, value: Value) -> Result<T, ValidationFailure> {
        match T::deserialize(&value) {
            Ok(out) => Ok(out),
            Err(e) => Err(ValidationFailure::single(
                self.name.clone(),
                deserialize_issue::<T>(value, &e),
            )),
        }
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _output: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typed")
            .field("type", &std::any::type_name::<T>())
            .field("name", &self.name)
            .finish()
    }
}

impl<T> Schema for Typed<T>
where
    T: DeserializeOwned + Send,
{
    type Output = T;

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn validate(&self, value: Value) -> impl Future<Output = Result<T, ValidationFailure>> + Send {
        std::future::ready(self.parse(value))
    }
}
