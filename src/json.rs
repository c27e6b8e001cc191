//! JSON resources.
//!
//! Convenience constructors for the common case of a JSON API: responses are
//! decoded with `serde_json` and bodies are encoded with it when the resource
//! is built. Enabled by the `json` feature.
//!
//! ```rust
//! use serde::Deserialize;
//! use tributary::Resource;
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct Collection {
//!     id: String,
//!     title: String,
//! }
//!
//! let collections = Resource::<Vec<Collection>>::get_json("https://talk.objc.io/collections.json");
//! let parsed = collections.parse(br#"[{"id":"c1","title":"Swift Talk"}]"#).unwrap();
//! assert_eq!(parsed[0].id, "c1");
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DecodeError, EncodeError};
use crate::request::{HttpMethod, Request};
use crate::resource::Resource;

const APPLICATION_JSON: &str = "application/json";

/// Encode a value as a JSON byte payload.
pub fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>, EncodeError> {
    serde_json::to_vec(body).map_err(|e| EncodeError::new(e.to_string()))
}

/// Decode a JSON byte payload.
pub fn decode<A: DeserializeOwned>(bytes: &[u8]) -> Result<A, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| DecodeError::malformed(e.to_string()))
}

impl<A: DeserializeOwned + 'static> Resource<A> {
    /// A `GET` resource whose response is decoded as JSON.
    pub fn get_json(target: impl Into<String>) -> Self {
        let request = Request::get(target).with_header("Accept", APPLICATION_JSON);
        Resource::new(request, decode::<A>)
    }

    /// A JSON resource for any method.
    ///
    /// A body is encoded as JSON right away, so a body that cannot be
    /// represented in JSON is reported here.
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use tributary::{HttpMethod, Resource};
    ///
    /// let mut body = HashMap::new();
    /// body.insert((1, 2), "tuple keys are not JSON");
    ///
    /// let result = Resource::<()>::json("/things", HttpMethod::Post(body));
    /// assert!(result.is_err());
    /// ```
    pub fn json<B: Serialize>(
        target: impl Into<String>,
        method: HttpMethod<B>,
    ) -> Result<Self, EncodeError> {
        let (method, body) = method.into_parts();
        let mut request = Request::new(method, target).with_header("Accept", APPLICATION_JSON);
        if let Some(body) = body {
            request = request
                .with_header("Content-Type", APPLICATION_JSON)
                .with_body(encode(&body)?);
        }
        Ok(Resource::new(request, decode::<A>))
    }
}
