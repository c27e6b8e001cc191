//! # Tributary
//!
//! > *Small streams feeding into one another*
//!
//! A Rust library for composing dependent network requests as typed values.
//!
//! ## Philosophy
//!
//! A request and the parser for its answer form a **resource**. Resources are
//! plain data: building one performs no I/O. Resources combine into a
//! **composed resource** where later requests depend on earlier answers, and
//! only the execution engine, given an explicit transport, ever touches the
//! network.
//!
//! - [`Resource`] describes one request and how to read its response
//! - [`Combined`] chains resources with `flat_map`, `map` and `zip`
//! - [`load`] drives a composed resource through a [`Transport`]
//!
//! ## Quick Example
//!
//! ```rust
//! use serde::Deserialize;
//! use tributary::testing::FixtureTransport;
//! use tributary::{load, Combined, Resource};
//!
//! #[derive(Debug, Deserialize)]
//! struct Collection {
//!     id: String,
//! }
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct Episode {
//!     number: u32,
//!     collection: String,
//! }
//!
//! # tokio_test::block_on(async {
//! let transport = FixtureTransport::new()
//!     .route("/collections.json", br#"[{"id":"c1"}]"#.to_vec())
//!     .route(
//!         "/episodes.json",
//!         br#"[{"number":1,"collection":"c1"},{"number":2,"collection":"c2"}]"#.to_vec(),
//!     );
//!
//! // The episodes of the first collection, with no nested callbacks.
//! let episodes: Combined<Vec<Episode>> = Resource::<Vec<Collection>>::get_json("/collections.json")
//!     .try_map("no collections", |collections| collections.into_iter().next())
//!     .combined()
//!     .flat_map(|collection| {
//!         Resource::<Vec<Episode>>::get_json("/episodes.json")
//!             .map(move |episodes| {
//!                 episodes
//!                     .into_iter()
//!                     .filter(|episode| episode.collection == collection.id)
//!                     .collect::<Vec<_>>()
//!             })
//!             .combined()
//!     });
//!
//! let loaded = load(&transport, episodes).await.unwrap();
//! assert_eq!(loaded, vec![Episode { number: 1, collection: "c1".to_string() }]);
//! # });
//! ```
//!
//! ## Features
//!
//! - `json` (default): JSON resource constructors backed by `serde_json`
//! - `tracing` (default): request and failure events from the execution
//!   engine, plus span instrumentation for transports

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod combined;
pub mod error;
pub mod execute;
#[cfg(feature = "tracing")]
pub mod instrument;
#[cfg(feature = "json")]
pub mod json;
pub mod request;
pub mod resource;
pub mod testing;
pub mod transport;

// Re-exports
pub use combined::{Branch, Combined, Erased};
pub use error::{DecodeError, EncodeError, FetchError, Outcome, TransportError};
pub use execute::{execute, fetch, load, TransportExt};
pub use request::{HttpMethod, Method, Request};
pub use resource::Resource;
pub use transport::Transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::combined::Combined;
    pub use crate::error::{DecodeError, EncodeError, FetchError, Outcome, TransportError};
    pub use crate::execute::{execute, fetch, load, TransportExt};
    #[cfg(feature = "tracing")]
    pub use crate::instrument::TransportTracingExt;
    pub use crate::request::{HttpMethod, Method, Request};
    pub use crate::resource::Resource;
    pub use crate::transport::Transport;
}
