//! Testing utilities for code built on composed resources.
//!
//! This module provides in-memory transports and assertion macros so that
//! resource chains can be exercised without a network.
//!
//! # Examples
//!
//! ## FixtureTransport
//!
//! ```rust
//! use tributary::testing::FixtureTransport;
//! use tributary::{assert_fetched, load, Resource};
//!
//! # tokio_test::block_on(async {
//! let transport = FixtureTransport::new()
//!     .route("/collections", b"c1".to_vec())
//!     .route("/episodes/c1", b"Ep1".to_vec());
//!
//! let raw = |target: &str| Resource::get(target, |bytes: &[u8]| Ok(bytes.to_vec()));
//! let episodes = raw("/collections").combined().flat_map(move |id| {
//!     let target = format!("/episodes/{}", String::from_utf8_lossy(&id));
//!     raw(target.as_str()).combined()
//! });
//!
//! let value = assert_fetched!(load(&transport, episodes).await);
//! assert_eq!(value, b"Ep1");
//! assert_eq!(transport.calls(), vec!["/collections", "/episodes/c1"]);
//! # });
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use tributary::{assert_fetch_failed, FetchError, TransportError};
//!
//! let outcome: Result<u32, FetchError> =
//!     Err(FetchError::transport("/a", TransportError::new("offline")));
//! assert_fetch_failed!(outcome, FetchError::Transport { .. });
//! ```

use std::collections::HashMap;
use std::future::{ready, Future};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::TransportError;
use crate::request::Request;
use crate::transport::Transport;

/// An ordered, shareable record of events.
///
/// Transports in this module record the target of every request they
/// perform. Tests can push their own markers into the same log to check how
/// requests interleave with parsing or continuations.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.into());
    }

    /// Snapshot of all entries in the order they were recorded.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of entries recorded so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A transport answering from canned responses.
///
/// Responses are keyed by request target. A request for an unknown target
/// fails with a 404 transport error. Every request is recorded, including
/// failed ones.
#[derive(Debug, Clone, Default)]
pub struct FixtureTransport {
    routes: HashMap<String, Result<Vec<u8>, TransportError>>,
    log: CallLog,
}

impl FixtureTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that records into an existing log.
    pub fn with_log(log: CallLog) -> Self {
        FixtureTransport {
            routes: HashMap::new(),
            log,
        }
    }

    /// Answer requests for `target` with `payload`.
    pub fn route(mut self, target: impl Into<String>, payload: Vec<u8>) -> Self {
        self.routes.insert(target.into(), Ok(payload));
        self
    }

    /// Fail requests for `target` with `error`.
    pub fn route_failure(mut self, target: impl Into<String>, error: TransportError) -> Self {
        self.routes.insert(target.into(), Err(error));
        self
    }

    /// Answer requests for `target` with `value` encoded as JSON.
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be encoded.
    #[cfg(feature = "json")]
    pub fn route_json<V: serde::Serialize>(self, target: impl Into<String>, value: &V) -> Self {
        let target = target.into();
        match serde_json::to_vec(value) {
            Ok(payload) => self.route(target, payload),
            Err(e) => panic!("fixture for {} is not encodable: {}", target, e),
        }
    }

    /// Targets requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.log.entries()
    }

    /// The log this transport records into.
    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl Transport for FixtureTransport {
    fn perform(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        self.log.record(request.target());
        let response = self.routes.get(request.target()).cloned().unwrap_or_else(|| {
            Err(TransportError::new(format!("no fixture for {}", request.target())).with_status(404))
        });
        ready(response)
    }
}

/// A transport that answers every request with its own body.
///
/// Bodiless requests get an empty payload.
#[derive(Debug, Clone, Default)]
pub struct EchoTransport {
    log: CallLog,
}

impl EchoTransport {
    /// Create an echo transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.log.entries()
    }
}

impl Transport for EchoTransport {
    fn perform(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        self.log.record(request.target());
        ready(Ok(request.body().map(<[u8]>::to_vec).unwrap_or_default()))
    }
}

/// A transport on which every request fails.
#[derive(Debug, Clone)]
pub struct FailingTransport {
    error: TransportError,
    log: CallLog,
}

impl FailingTransport {
    /// Fail every request with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_error(TransportError::new(message))
    }

    /// Fail every request with `error`.
    pub fn with_error(error: TransportError) -> Self {
        FailingTransport {
            error,
            log: CallLog::new(),
        }
    }

    /// Targets requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.log.entries()
    }
}

impl Transport for FailingTransport {
    fn perform(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        self.log.record(request.target());
        ready(Err(self.error.clone()))
    }
}

/// Assert that a load succeeded and evaluate to its value.
///
/// # Example
///
/// ```rust
/// use tributary::{assert_fetched, FetchError};
///
/// let outcome: Result<u32, FetchError> = Ok(42);
/// let value = assert_fetched!(outcome);
/// assert_eq!(value, 42);
/// ```
#[macro_export]
macro_rules! assert_fetched {
    ($outcome:expr) => {
        match $outcome {
            Ok(value) => value,
            Err(e) => panic!("Expected fetched value, got error: {}", e),
        }
    };
}

/// Assert that a load failed, optionally matching the error against a pattern.
///
/// # Example
///
/// ```rust
/// use tributary::{assert_fetch_failed, DecodeError, FetchError};
///
/// let outcome: Result<u32, FetchError> =
///     Err(FetchError::decode("/a", DecodeError::Rejected("empty")));
/// assert_fetch_failed!(outcome.clone());
/// assert_fetch_failed!(outcome, FetchError::Decode { .. });
/// ```
#[macro_export]
macro_rules! assert_fetch_failed {
    ($outcome:expr) => {
        match $outcome {
            Err(_) => {}
            Ok(v) => panic!("Expected failure, got value: {:?}", v),
        }
    };
    ($outcome:expr, $pattern:pat) => {
        match $outcome {
            Err(e) => {
                if !matches!(e, $pattern) {
                    panic!(
                        "Expected error matching {}, got: {:?}",
                        stringify!($pattern),
                        e
                    );
                }
            }
            Ok(v) => panic!("Expected failure, got value: {:?}", v),
        }
    };
}
