//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! Middleware wraps handlers of *different* concrete types, and a wrapped
//! handler must itself look like any other handler. So every handler is
//! stored behind a **trait object** (`dyn Handler<C>`), shared through an
//! `Arc`:
//!
//! ```text
//! fn get_user(ctx: &mut C) -> BoxFuture<'_, Result<(), Error>>   ← user writes this
//!        ↓ get_user.into_boxed_handler()
//! Arc::new(get_user)                        ← BoxedHandler<C> = Arc<dyn Handler<C>>
//!        ↓ logger.wrap(boxed)
//! Arc::new(LoggingHandler { next, .. })     ← still a BoxedHandler<C>
//!        ↓ handler.call(&mut ctx)  at request time
//! one vtable dispatch per layer
//! ```
//!
//! Handlers borrow the context mutably for the duration of the call, which
//! is why the returned future carries the borrow's lifetime `'a`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;

/// A heap-allocated, type-erased future borrowing from its caller for `'a`.
///
/// `Send` lets a multi-threaded runtime move the request task between
/// workers while the handler is suspended.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler<C> = Arc<dyn Handler<C>>;

/// Implemented for every valid downstream handler over a context `C`.
///
/// You never implement this yourself. It is satisfied by any function with
/// the signature:
///
/// ```text
/// fn name(ctx: &mut C) -> BoxFuture<'_, Result<(), Error>>
/// ```
///
/// and by the handlers middleware hands back from
/// [`Middleware::wrap`](crate::middleware::Middleware::wrap). The trait is
/// **sealed**, so the set of implementors stays under this crate's control.
pub trait Handler<C>: private::Sealed<C> + Send + Sync + 'static {
    /// Runs the handler against one request's context.
    fn call<'a>(&'a self, ctx: &'a mut C) -> BoxFuture<'a, Result<(), Error>>;

    fn into_boxed_handler(self) -> BoxedHandler<C>
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

pub(crate) mod private {
    pub trait Sealed<C> {}
}

impl<C, F> private::Sealed<C> for F
where
    F: for<'a> Fn(&'a mut C) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
{
}

impl<C, F> Handler<C> for F
where
    F: for<'a> Fn(&'a mut C) -> BoxFuture<'a, Result<(), Error>> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut C) -> BoxFuture<'a, Result<(), Error>> {
        (self)(ctx)
    }
}
