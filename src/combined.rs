//! Composed resources.
//!
//! A [`Combined<A>`] is a tree of resources that eventually produces an `A`.
//! It is built with [`flat_map`](Combined::flat_map) (the next resource
//! depends on the previous value), [`map`](Combined::map) (transform the value
//! without touching the network) and [`zip`](Combined::zip) (two independent
//! resources loaded side by side).
//!
//! # Type Erasure
//!
//! A chain like "collections, then the episodes of the first collection" mixes
//! result types at every step. `Bind` nodes therefore hold their left side as a
//! `Combined<Erased>`, where every value is boxed as `dyn Any`. The
//! continuation stored next to it was built for exactly that left side, so
//! recovering the concrete type is a checked downcast that cannot fail unless
//! the tree was assembled by hand incorrectly. A failed downcast is a bug and
//! panics.
//!
//! # Example
//!
//! ```rust
//! use tributary::{Combined, DecodeError, Resource};
//!
//! fn text(target: &str) -> Resource<String> {
//!     Resource::get(target, |bytes: &[u8]| {
//!         String::from_utf8(bytes.to_vec()).map_err(|e| DecodeError::malformed(e.to_string()))
//!     })
//! }
//!
//! // Which page to load next depends on the first response.
//! let page: Combined<usize> = text("/latest")
//!     .combined()
//!     .flat_map(|slug| text(&format!("/pages/{}", slug)).combined())
//!     .map(|body| body.len());
//! # let _ = page;
//! ```

use std::any::{type_name, Any};
use std::fmt;
use std::mem;

use crate::resource::Resource;

/// A type-erased value travelling through a composed resource.
pub type Erased = Box<dyn Any + Send>;

/// Builds the next step of a `Bind` from the value of its left side.
pub type Continuation<A> = Box<dyn FnOnce(Erased) -> Combined<A> + Send>;

/// Combines the values of both sides of a `Zip`.
pub type Join<A> = Box<dyn FnOnce(Erased, Erased) -> A + Send>;

/// A resource, or a composition of resources, producing an `A`.
pub enum Combined<A> {
    /// One request.
    Single(Resource<A>),
    /// A value that needs no request.
    Pure(A),
    /// Load the left side, then feed its value to the continuation to get
    /// what to load next.
    Bind(Branch, Continuation<A>),
    /// Load both sides concurrently and join their values.
    Zip(Branch, Branch, Join<A>),
}

impl<A> fmt::Debug for Combined<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combined::Single(resource) => f.debug_tuple("Single").field(resource).finish(),
            Combined::Pure(_) => f.debug_tuple("Pure").field(&"<value>").finish(),
            Combined::Bind(..) => f
                .debug_struct("Bind")
                .field("known_nodes", &self.known_nodes())
                .finish_non_exhaustive(),
            Combined::Zip(..) => f
                .debug_struct("Zip")
                .field("known_nodes", &self.known_nodes())
                .finish_non_exhaustive(),
        }
    }
}

/// The type-erased child of a `Bind` or `Zip` node.
///
/// Dropping a branch tears its subtree down with a work list rather than
/// recursion, so a long chain that is never loaded can still be dropped.
pub struct Branch(Box<Combined<Erased>>);

impl Branch {
    /// Wrap a subtree.
    pub fn new(node: Combined<Erased>) -> Self {
        Branch(Box::new(node))
    }

    /// The wrapped subtree.
    pub fn get(&self) -> &Combined<Erased> {
        &self.0
    }

    /// Take the subtree out of the branch.
    pub fn into_inner(mut self) -> Combined<Erased> {
        self.detach()
    }

    fn detach(&mut self) -> Combined<Erased> {
        mem::replace(&mut *self.0, Combined::Pure(Box::new(()) as Erased))
    }
}

impl Drop for Branch {
    fn drop(&mut self) {
        if !matches!(*self.0, Combined::Bind(..) | Combined::Zip(..)) {
            return;
        }
        let mut doomed = vec![self.detach()];
        while let Some(mut node) = doomed.pop() {
            match &mut node {
                Combined::Bind(left, _) => doomed.push(left.detach()),
                Combined::Zip(left, right, _) => {
                    doomed.push(left.detach());
                    doomed.push(right.detach());
                }
                Combined::Single(_) | Combined::Pure(_) => {}
            }
        }
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Branch").field(self.get()).finish()
    }
}

/// Recover the concrete value from an erased one.
///
/// # Panics
///
/// Panics when the value is not an `A`. Erasure always pairs a value with the
/// code that produced it, so this only happens if that pairing was broken.
pub(crate) fn recover<A: 'static>(value: Erased) -> A {
    match value.downcast::<A>() {
        Ok(value) => *value,
        Err(_) => unreachable!(
            "erased value does not match its continuation (expected {})",
            type_name::<A>()
        ),
    }
}

impl<A: Send + 'static> Combined<A> {
    /// Lift a single resource.
    pub fn single(resource: Resource<A>) -> Self {
        Combined::Single(resource)
    }

    /// A composed resource that yields `value` without any request.
    pub fn pure(value: A) -> Self {
        Combined::Pure(value)
    }

    /// Hide the result type behind [`Erased`].
    ///
    /// Purely structural: nothing is loaded, and the shape of the tree is
    /// kept. Continuations and joins are rewrapped so that whatever they
    /// produce is erased as well.
    pub fn erase(self) -> Combined<Erased> {
        match self {
            Combined::Single(resource) => Combined::Single(resource.map(|value| {
                let erased: Erased = Box::new(value);
                erased
            })),
            Combined::Pure(value) => Combined::Pure(Box::new(value)),
            Combined::Bind(left, next) => Combined::Bind(left, Box::new(move |x| next(x).erase())),
            Combined::Zip(left, right, join) => Combined::Zip(
                left,
                right,
                Box::new(move |a, b| {
                    let erased: Erased = Box::new(join(a, b));
                    erased
                }),
            ),
        }
    }

    /// Load `self`, then use its value to decide what to load next.
    ///
    /// `transform` only runs after `self` succeeded. If `self` fails, nothing
    /// that `transform` would have produced is ever requested.
    ///
    /// ```rust
    /// use tributary::testing::FixtureTransport;
    /// use tributary::{load, Combined, Resource};
    ///
    /// # tokio_test::block_on(async {
    /// let transport = FixtureTransport::new()
    ///     .route("/next", b"/answer".to_vec())
    ///     .route("/answer", b"42".to_vec());
    ///
    /// let raw = |target: &str| Resource::get(target, |bytes: &[u8]| Ok(bytes.to_vec()));
    ///
    /// let answer = raw("/next")
    ///     .combined()
    ///     .flat_map(move |next| {
    ///         let target = String::from_utf8_lossy(&next).into_owned();
    ///         raw(target.as_str()).combined()
    ///     });
    ///
    /// assert_eq!(load(&transport, answer).await, Ok(b"42".to_vec()));
    /// # });
    /// ```
    pub fn flat_map<B, F>(self, transform: F) -> Combined<B>
    where
        F: FnOnce(A) -> Combined<B> + Send + 'static,
        B: Send + 'static,
    {
        Combined::Bind(
            Branch::new(self.erase()),
            Box::new(move |x| transform(recover::<A>(x))),
        )
    }

    /// Transform the final value.
    ///
    /// No extra request is made: the function is pushed down into the
    /// parsers, continuations and joins of the tree.
    pub fn map<B, F>(self, f: F) -> Combined<B>
    where
        F: Fn(A) -> B + Send + Sync + 'static,
        B: Send + 'static,
    {
        match self {
            Combined::Single(resource) => Combined::Single(resource.map(f)),
            Combined::Pure(value) => Combined::Pure(f(value)),
            Combined::Bind(left, next) => Combined::Bind(left, Box::new(move |x| next(x).map(f))),
            Combined::Zip(left, right, join) => {
                Combined::Zip(left, right, Box::new(move |a, b| f(join(a, b))))
            }
        }
    }

    /// Load `self` and `other` concurrently and pair their values.
    ///
    /// Both sides are started together and polled by the same future; there
    /// is no ordering between their requests. Within each side, dependent
    /// steps still run in order. The pair succeeds once both sides have
    /// succeeded. The first failure on either side fails the pair and stops
    /// the other side.
    pub fn zip<B>(self, other: Combined<B>) -> Combined<(A, B)>
    where
        B: Send + 'static,
    {
        Combined::Zip(
            Branch::new(self.erase()),
            Branch::new(other.erase()),
            Box::new(|a, b| (recover::<A>(a), recover::<B>(b))),
        )
    }
}

impl<A> Combined<A> {
    /// Number of nodes in the tree that are known before loading.
    ///
    /// Continuations are opaque, so whatever they will produce is not
    /// counted.
    pub fn known_nodes(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&Combined<Erased>> = Vec::new();
        match self {
            Combined::Single(_) | Combined::Pure(_) => return 1,
            Combined::Bind(left, _) => pending.push(left.get()),
            Combined::Zip(left, right, _) => {
                pending.push(left.get());
                pending.push(right.get());
            }
        }
        count += 1;
        while let Some(node) = pending.pop() {
            count += 1;
            match node {
                Combined::Single(_) | Combined::Pure(_) => {}
                Combined::Bind(left, _) => pending.push(left.get()),
                Combined::Zip(left, right, _) => {
                    pending.push(left.get());
                    pending.push(right.get());
                }
            }
        }
        count
    }
}
