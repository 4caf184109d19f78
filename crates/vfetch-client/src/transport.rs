//! # Transport
//!
//! A transport is the async operation that retrieves the raw value a
//! schema is then applied to. Its argument list is transport-defined and
//! is represented as a tuple `Args`: a transport taking a URL is a
//! `Transport<(U,)>`, one taking nothing is a `Transport<()>`.
//!
//! Any `Fn` of up to four arguments returning a future of
//! `Result<serde_json::Value, E>` is a transport, so custom transports are
//! usually plain async closures.

use std::future::Future;

use serde_json::Value;

/// Async retrieval step with a fixed argument list `Args`.
pub trait Transport<Args>: Send + Sync {
    /// Error produced when retrieval fails. Surfaced to the caller
    /// unmodified.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Retrieve the raw value. Called once per fetch.
    fn fetch(&self, args: Args) -> impl Future<Output = Result<Value, Self::Error>> + Send;
}

macro_rules! impl_transport_for_fn {
    ($($ty:ident $var:ident),*) => {
        impl<F, Fut, E, $($ty,)*> Transport<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> Fut + Send + Sync,
            Fut: Future<Output = Result<Value, E>> + Send,
            E: std::error::Error + Send + Sync + 'static,
        {
            type Error = E;

            fn fetch(
                &self,
                ($($var,)*): ($($ty,)*),
            ) -> impl Future<Output = Result<Value, E>> + Send {
                (self)($($var),*)
            }
        }
    };
}

impl_transport_for_fn!();
impl_transport_for_fn!(A a);
impl_transport_for_fn!(A a, B b);
impl_transport_for_fn!(A a, B b, C c);
impl_transport_for_fn!(A a, B b, C c, D d);
