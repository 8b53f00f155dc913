//! Middleware layer.
//!
//! Middleware wraps a handler in another handler with the same signature and
//! is the right place for cross-cutting concerns that must not leak into
//! business logic. A wrapped handler can be wrapped again; the outermost
//! layer runs first.
//!
//! Built-in middleware:
//! - [`logger::RequestLogger`] — one structured log record per request, with
//!   method, request-target, peer, status, latency and correlation id.

use crate::handler::BoxedHandler;

pub mod logger;

/// A layer around a downstream handler.
pub trait Middleware<C> {
    /// Returns a handler that runs this layer's behavior around `next`.
    fn wrap(&self, next: BoxedHandler<C>) -> BoxedHandler<C>;
}
