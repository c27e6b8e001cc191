//! The execution engine.
//!
//! [`load`] walks a [`Combined`] tree and drives every resource in it through
//! a [`Transport`]:
//!
//! - `Single` performs its request and parses the payload
//! - `Pure` yields its value without a request
//! - `Bind` loads its left side first and only then asks the continuation
//!   what to load next
//! - `Zip` loads both sides concurrently
//!
//! The first failure ends the whole load. Continuations waiting on the failed
//! step are dropped without being called, so nothing downstream is requested.
//!
//! # Execution Model
//!
//! Dependent steps are kept on an explicit continuation stack instead of
//! nested futures, so the depth of a `flat_map` chain does not grow the call
//! stack or the size of the future. No task or thread is spawned; all work
//! happens while the returned future is polled.
//!
//! # Example
//!
//! ```rust
//! use tributary::testing::FixtureTransport;
//! use tributary::{load, Resource};
//!
//! # tokio_test::block_on(async {
//! let transport = FixtureTransport::new().route("/hello", b"hello".to_vec());
//! let greeting = Resource::get("/hello", |bytes: &[u8]| Ok(bytes.len())).combined();
//!
//! assert_eq!(load(&transport, greeting).await, Ok(5));
//! # });
//! ```

use std::future::Future;

use futures::future::{try_join, BoxFuture, FutureExt};

use crate::combined::{recover, Combined, Continuation, Erased};
use crate::error::{FetchError, Outcome};
use crate::resource::Resource;
use crate::transport::Transport;

/// Perform a single resource's request and parse the response.
pub async fn fetch<T, A>(transport: &T, resource: &Resource<A>) -> Outcome<A>
where
    T: Transport + ?Sized,
{
    let request = resource.request();

    #[cfg(feature = "tracing")]
    tracing::debug!(request = %request, "performing request");

    let payload = match transport.perform(request).await {
        Ok(payload) => payload,
        Err(source) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(request = %request, error = %source, "request failed");
            return Err(FetchError::transport(request.target(), source));
        }
    };

    match resource.parse(&payload) {
        Ok(value) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(request = %request, bytes = payload.len(), "response parsed");
            Ok(value)
        }
        Err(source) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(request = %request, error = %source, "response rejected");
            Err(FetchError::decode(request.target(), source))
        }
    }
}

/// Load a composed resource to completion.
///
/// Requests are issued in declaration order. A request that depends on an
/// earlier value is not issued before that value is available.
pub async fn load<T, A>(transport: &T, resource: Combined<A>) -> Outcome<A>
where
    T: Transport + ?Sized,
    A: Send + 'static,
{
    #[cfg(feature = "tracing")]
    tracing::debug!(known_nodes = resource.known_nodes(), "loading composed resource");

    let value = drive(transport, resource.erase()).await?;
    Ok(recover::<A>(value))
}

/// Load a composed resource and hand the outcome to `completion`.
///
/// `completion` is called exactly once, with either the final value or the
/// first failure. If the returned future is dropped before the load finishes,
/// `completion` is never called.
///
/// ```rust
/// use tributary::testing::FailingTransport;
/// use tributary::{execute, Resource};
///
/// # tokio_test::block_on(async {
/// let mut outcomes = Vec::new();
/// let resource = Resource::get("/down", |bytes: &[u8]| Ok(bytes.to_vec())).combined();
///
/// execute(&FailingTransport::new("offline"), resource, |outcome| outcomes.push(outcome.ok())).await;
/// assert_eq!(outcomes, vec![None]);
/// # });
/// ```
pub async fn execute<T, A, F>(transport: &T, resource: Combined<A>, completion: F)
where
    T: Transport + ?Sized,
    A: Send + 'static,
    F: FnOnce(Outcome<A>),
{
    completion(load(transport, resource).await)
}

fn drive<'a, T>(transport: &'a T, root: Combined<Erased>) -> BoxFuture<'a, Outcome<Erased>>
where
    T: Transport + ?Sized,
{
    async move {
        let mut pending: Vec<Continuation<Erased>> = Vec::new();
        let mut node = root;

        loop {
            let step = match node {
                Combined::Single(resource) => fetch(transport, &resource).await,
                Combined::Pure(value) => Ok(value),
                Combined::Bind(left, next) => {
                    pending.push(next);
                    node = left.into_inner();
                    continue;
                }
                Combined::Zip(left, right, join) => {
                    try_join(
                        drive(transport, left.into_inner()),
                        drive(transport, right.into_inner()),
                    )
                        .await
                        .map(|(a, b)| join(a, b))
                }
            };

            let value = match step {
                Ok(value) => value,
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    {
                        if !pending.is_empty() {
                            tracing::warn!(
                                skipped = pending.len(),
                                error = %err,
                                "aborting chain, dependent steps skipped"
                            );
                        }
                    }
                    return Err(err);
                }
            };

            match pending.pop() {
                Some(next) => node = next(value),
                None => return Ok(value),
            }
        }
    }
    .boxed()
}

/// Loading methods available on every [`Transport`].
///
/// ```rust
/// use tributary::testing::FixtureTransport;
/// use tributary::{Resource, TransportExt};
///
/// # tokio_test::block_on(async {
/// let transport = FixtureTransport::new().route("/n", b"3".to_vec());
/// let length = Resource::get("/n", |bytes: &[u8]| Ok(bytes.len()));
///
/// assert_eq!(transport.fetch(&length).await, Ok(1));
/// assert_eq!(transport.load(length.combined()).await, Ok(1));
/// # });
/// ```
pub trait TransportExt: Transport {
    /// Load a composed resource through this transport. See [`load`].
    fn load<A>(&self, resource: Combined<A>) -> impl Future<Output = Outcome<A>> + Send
    where
        A: Send + 'static,
    {
        load(self, resource)
    }

    /// Fetch a single resource through this transport. See [`fetch`].
    fn fetch<'a, A>(
        &'a self,
        resource: &'a Resource<A>,
    ) -> impl Future<Output = Outcome<A>> + Send + 'a
    where
        A: Send + 'static,
    {
        fetch(self, resource)
    }
}

impl<T: Transport + ?Sized> TransportExt for T {}
