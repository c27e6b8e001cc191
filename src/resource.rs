//! Typed resource descriptors.
//!
//! A [`Resource<A>`] pairs a [`Request`] with a parser that turns the raw
//! response payload into an `A`. Building a resource performs no I/O; it only
//! describes what to fetch and how to read the answer.
//!
//! Mapping a resource changes how the response is interpreted, never what is
//! requested:
//!
//! ```rust
//! use tributary::{DecodeError, Resource};
//!
//! let count = Resource::get("/count", |bytes: &[u8]| {
//!     std::str::from_utf8(bytes)
//!         .map_err(|e| DecodeError::malformed(e.to_string()))?
//!         .trim()
//!         .parse::<u32>()
//!         .map_err(|e| DecodeError::malformed(e.to_string()))
//! });
//!
//! let doubled = count.map(|n| n * 2);
//! assert_eq!(doubled.request().target(), "/count");
//! assert_eq!(doubled.parse(b"21"), Ok(42));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::combined::Combined;
use crate::error::{DecodeError, EncodeError};
use crate::request::{HttpMethod, Request};

type ParseFn<A> = dyn Fn(&[u8]) -> Result<A, DecodeError> + Send + Sync;

/// A request together with the parser for its response.
///
/// Cloning a resource is cheap: the parser is shared.
pub struct Resource<A> {
    request: Request,
    parse: Arc<ParseFn<A>>,
}

impl<A> Clone for Resource<A> {
    fn clone(&self) -> Self {
        Resource {
            request: self.request.clone(),
            parse: Arc::clone(&self.parse),
        }
    }
}

impl<A> fmt::Debug for Resource<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("request", &self.request)
            .field("parse", &"<function>")
            .finish()
    }
}

impl<A: 'static> Resource<A> {
    /// Create a resource from a request and a parser.
    ///
    /// The parser must be deterministic and free of side effects.
    pub fn new<P>(request: Request, parse: P) -> Self
    where
        P: Fn(&[u8]) -> Result<A, DecodeError> + Send + Sync + 'static,
    {
        Resource {
            request,
            parse: Arc::new(parse),
        }
    }

    /// A bodiless `GET` resource.
    pub fn get<P>(target: impl Into<String>, parse: P) -> Self
    where
        P: Fn(&[u8]) -> Result<A, DecodeError> + Send + Sync + 'static,
    {
        Resource::new(Request::get(target), parse)
    }

    /// Build a resource from a typed method.
    ///
    /// For body-bearing methods the body is encoded right away, so an
    /// unencodable body is reported here rather than when the resource is
    /// loaded.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tributary::{EncodeError, HttpMethod, Resource};
    ///
    /// let encode = |body: &String| Ok::<_, EncodeError>(body.as_bytes().to_vec());
    /// let decode = |bytes: &[u8]| Ok(bytes.len());
    ///
    /// let resource = Resource::build(HttpMethod::Post("hello".to_string()), "/echo", encode, decode)
    ///     .unwrap();
    /// assert_eq!(resource.request().body(), Some(&b"hello"[..]));
    ///
    /// let refuse = |_: &String| Err(EncodeError::new("not today"));
    /// let failed = Resource::build(HttpMethod::Post("hello".to_string()), "/echo", refuse, decode);
    /// assert!(failed.is_err());
    /// ```
    pub fn build<B, E, P>(
        method: HttpMethod<B>,
        target: impl Into<String>,
        encode: E,
        parse: P,
    ) -> Result<Self, EncodeError>
    where
        E: FnOnce(&B) -> Result<Vec<u8>, EncodeError>,
        P: Fn(&[u8]) -> Result<A, DecodeError> + Send + Sync + 'static,
    {
        let (method, body) = method.into_parts();
        let mut request = Request::new(method, target);
        if let Some(body) = body {
            request = request.with_body(encode(&body)?);
        }
        Ok(Resource::new(request, parse))
    }

    /// Transform the parsed value.
    ///
    /// The request is shared unchanged; only the interpretation of the
    /// response changes.
    ///
    /// Each `map` wraps the parser built so far, so parsing runs one nested
    /// call per mapping. Prefer a single closure over a long run of maps.
    pub fn map<B, F>(self, f: F) -> Resource<B>
    where
        F: Fn(A) -> B + Send + Sync + 'static,
        B: 'static,
    {
        let parse = self.parse;
        Resource {
            request: self.request,
            parse: Arc::new(move |bytes: &[u8]| parse(bytes).map(&f)),
        }
    }

    /// Transform the parsed value, rejecting the response when `f` returns
    /// `None`.
    ///
    /// Use this for projections that can come up empty, such as taking the
    /// first element of a list. A rejection fails the load with
    /// [`DecodeError::Rejected`] carrying `reason`. Like [`map`](Resource::map),
    /// this nests the parser one level deeper.
    ///
    /// ```rust
    /// use tributary::{DecodeError, Resource};
    ///
    /// let first = Resource::get("/ids", |bytes: &[u8]| Ok(bytes.to_vec()))
    ///     .try_map("no ids", |ids| ids.first().copied());
    ///
    /// assert_eq!(first.parse(&[7, 8]), Ok(7));
    /// assert_eq!(first.parse(&[]), Err(DecodeError::Rejected("no ids")));
    /// ```
    pub fn try_map<B, F>(self, reason: &'static str, f: F) -> Resource<B>
    where
        F: Fn(A) -> Option<B> + Send + Sync + 'static,
        B: 'static,
    {
        let parse = self.parse;
        Resource {
            request: self.request,
            parse: Arc::new(move |bytes: &[u8]| {
                parse(bytes).and_then(|value| f(value).ok_or(DecodeError::Rejected(reason)))
            }),
        }
    }

    /// Lift this resource into a [`Combined`] for chaining.
    pub fn combined(self) -> Combined<A> {
        Combined::Single(self)
    }
}

impl<A> Resource<A> {
    /// The request this resource issues.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Run the parser over a response payload.
    pub fn parse(&self, bytes: &[u8]) -> Result<A, DecodeError> {
        (self.parse)(bytes)
    }
}

impl<A> From<Resource<A>> for Combined<A> {
    fn from(resource: Resource<A>) -> Self {
        Combined::Single(resource)
    }
}
