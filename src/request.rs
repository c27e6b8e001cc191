//! Request specifications handed to a [`Transport`](crate::Transport).
//!
//! A [`Request`] is plain data: method, target, headers and an optional,
//! already-encoded body. How the target is resolved and how the bytes travel
//! is up to the transport.
//!
//! [`HttpMethod`] is the typed form used when building resources: body-bearing
//! methods carry the value to encode, so a POST without a body cannot be
//! expressed.
//!
//! ```rust
//! use tributary::{HttpMethod, Method, Request};
//!
//! let request = Request::new(Method::Get, "https://talk.objc.io/episodes.json")
//!     .with_header("Accept", "application/json");
//! assert_eq!(request.method().as_str(), "GET");
//! assert_eq!(request.header("accept"), Some("application/json"));
//!
//! let method = HttpMethod::Post(vec![1, 2, 3]);
//! assert_eq!(method.method(), Method::Post);
//! ```

use std::fmt;

/// Wire-level request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// The method as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A method paired with the typed body it sends, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod<B> {
    /// `GET`, no body
    Get,
    /// `POST` with a body
    Post(B),
    /// `PUT` with a body
    Put(B),
    /// `PATCH` with a body
    Patch(B),
    /// `DELETE`, no body
    Delete,
}

impl<B> HttpMethod<B> {
    /// The wire-level method.
    pub fn method(&self) -> Method {
        match self {
            HttpMethod::Get => Method::Get,
            HttpMethod::Post(_) => Method::Post,
            HttpMethod::Put(_) => Method::Put,
            HttpMethod::Patch(_) => Method::Patch,
            HttpMethod::Delete => Method::Delete,
        }
    }

    /// Split into the wire-level method and the body to encode.
    pub fn into_parts(self) -> (Method, Option<B>) {
        let method = self.method();
        let body = match self {
            HttpMethod::Post(body) | HttpMethod::Put(body) | HttpMethod::Patch(body) => Some(body),
            HttpMethod::Get | HttpMethod::Delete => None,
        };
        (method, body)
    }
}

/// An opaque request specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    target: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    /// Create a bodiless request.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Request {
            method,
            target: target.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(target: impl Into<String>) -> Self {
        Request::new(Method::Get, target)
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the encoded body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Request target, usually a URL.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// All headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Encoded body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.target)
    }
}
