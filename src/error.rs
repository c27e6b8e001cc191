//! Error types for resource loading.
//!
//! Every way a composed resource can fail ends up as a [`FetchError`]:
//!
//! - **Transport**: the request never produced a payload
//! - **Decode**: a payload arrived but the resource's parser rejected it
//! - **Encode**: a request body could not be serialized, reported when the
//!   resource is built and before anything touches the network
//!
//! A failure anywhere in a chain becomes the outcome of the whole chain. Steps
//! that depend on the failed one are never attempted, so there is no separate
//! "aborted" error: the error that caused the abort is what the caller sees.
//!
//! # Example
//!
//! ```rust
//! use tributary::{DecodeError, FetchError, TransportError};
//!
//! let err = FetchError::transport("collections.json", TransportError::new("connection reset"));
//! assert!(err.is_transport());
//! assert_eq!(err.target(), Some("collections.json"));
//!
//! let err = FetchError::decode("episodes.json", DecodeError::malformed("expected `[`"));
//! assert!(err.is_decode());
//! ```

use thiserror::Error;

/// Result of loading a resource.
///
/// `outcome.ok()` recovers the plain "value or nothing" view.
pub type Outcome<A> = Result<A, FetchError>;

/// Failure reported by a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", status_suffix(.status))]
pub struct TransportError {
    message: String,
    status: Option<u16>,
}

impl TransportError {
    /// Create a transport error with a message and no status code.
    pub fn new(message: impl Into<String>) -> Self {
        TransportError {
            message: message.into(),
            status: None,
        }
    }

    /// Attach the response status that caused the failure.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The response status, if the transport got that far.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (status {})", code))
        .unwrap_or_default()
}

/// A parser rejected a response payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The payload was not in the expected format.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// The payload decoded, but a projection refused the value.
    #[error("value rejected: {0}")]
    Rejected(&'static str),
}

impl DecodeError {
    /// Shorthand for [`DecodeError::Malformed`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        DecodeError::Malformed(reason.into())
    }
}

/// A request body could not be serialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to encode request body: {0}")]
pub struct EncodeError(String);

impl EncodeError {
    /// Create an encode error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        EncodeError(reason.into())
    }

    /// Why the body could not be encoded.
    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// Any failure while building or loading a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The transport could not complete the request.
    #[error("request to {target} failed: {source}")]
    Transport {
        /// Target of the failed request
        target: String,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// The response payload was rejected by the resource's parser.
    #[error("could not decode response from {target}: {source}")]
    Decode {
        /// Target whose response was rejected
        target: String,
        /// Underlying decode failure
        #[source]
        source: DecodeError,
    },

    /// A request body could not be serialized.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl FetchError {
    /// Build a [`FetchError::Transport`].
    pub fn transport(target: impl Into<String>, source: TransportError) -> Self {
        FetchError::Transport {
            target: target.into(),
            source,
        }
    }

    /// Build a [`FetchError::Decode`].
    pub fn decode(target: impl Into<String>, source: DecodeError) -> Self {
        FetchError::Decode {
            target: target.into(),
            source,
        }
    }

    /// `true` for transport failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }

    /// `true` for decode failures.
    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode { .. })
    }

    /// `true` for encode failures.
    pub fn is_encode(&self) -> bool {
        matches!(self, FetchError::Encode(_))
    }

    /// Target of the request that failed, when one was issued.
    pub fn target(&self) -> Option<&str> {
        match self {
            FetchError::Transport { target, .. } | FetchError::Decode { target, .. } => {
                Some(target)
            }
            FetchError::Encode(_) => None,
        }
    }
}
