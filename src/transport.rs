//! The transport boundary.
//!
//! A [`Transport`] performs one [`Request`] and hands back the raw response
//! payload. Everything else (connection handling, TLS, status code policy) is
//! the transport's business. Transports are always passed in explicitly; there
//! is no shared default instance.
//!
//! # Implementing a Transport
//!
//! ```rust
//! use std::future::Future;
//! use tributary::{Request, Transport, TransportError};
//!
//! struct Static(&'static [u8]);
//!
//! impl Transport for Static {
//!     fn perform(
//!         &self,
//!         _request: &Request,
//!     ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
//!         let payload = self.0.to_vec();
//!         async move { Ok(payload) }
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::error::TransportError;
use crate::request::Request;

/// Performs requests on behalf of the execution engine.
///
/// The returned future is polled by whoever drives the load; a transport
/// should not block the calling thread while waiting for a response.
pub trait Transport: Send + Sync {
    /// Perform `request`, resolving to the response payload.
    fn perform(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn perform(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        (**self).perform(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn perform(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        (**self).perform(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn perform(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        (**self).perform(request)
    }
}
