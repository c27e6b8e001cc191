//! Tracing support for transports.
//!
//! This module provides the `Instrumented` transport wrapper and the
//! `instrument` method for running every request of a transport inside a
//! tracing span. Feature-gated behind `#[cfg(feature = "tracing")]`.
//!
//! The execution engine itself emits `debug` events for each request and
//! `warn` events for failures regardless of this wrapper; the span only adds
//! context around them.

use std::future::Future;

use crate::error::TransportError;
use crate::request::Request;
use crate::transport::Transport;

/// A transport whose requests run inside a tracing span.
///
/// Created by [`TransportTracingExt::instrument`].
#[derive(Debug, Clone)]
pub struct Instrumented<T> {
    pub(crate) inner: T,
    pub(crate) span: tracing::Span,
}

impl<T> Instrumented<T> {
    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Unwrap, discarding the span.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Transport> Transport for Instrumented<T> {
    fn perform(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        use tracing::Instrument as _;

        self.inner.perform(request).instrument(self.span.clone())
    }
}

/// Extension trait for adding tracing instrumentation to transports.
///
/// This trait is only available when the `tracing` feature is enabled.
pub trait TransportTracingExt: Transport + Sized {
    /// Run every request of this transport inside `span`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tributary::instrument::TransportTracingExt;
    /// use tributary::testing::FixtureTransport;
    /// use tributary::{load, Resource};
    ///
    /// # tokio_test::block_on(async {
    /// let transport = FixtureTransport::new()
    ///     .route("/a", b"alpha".to_vec())
    ///     .instrument(tracing::info_span!("fixture", api = "talk"));
    ///
    /// let resource = Resource::get("/a", |bytes: &[u8]| Ok(bytes.len())).combined();
    /// assert_eq!(load(&transport, resource).await, Ok(5));
    /// # });
    /// ```
    fn instrument(self, span: tracing::Span) -> Instrumented<Self> {
        Instrumented { inner: self, span }
    }
}

impl<T: Transport> TransportTracingExt for T {}
