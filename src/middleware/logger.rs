//! Request logging.
//!
//! [`RequestLogger`] times the downstream handler and emits exactly one
//! record per request once the handler (and, on failure, the framework's
//! error path) is done with the response:
//!
//! | Field | Value |
//! |---|---|
//! | `request` | request-target as received |
//! | `method` | request method |
//! | `remote` | peer address |
//! | `status` / `text_status` | final response status and its reason phrase |
//! | `took` | time spent downstream |
//! | `request_id` | `X-Request-Id`, only if present and non-empty |
//!
//! ```rust
//! use http::StatusCode;
//! use reqlog::middleware::Middleware;
//! use reqlog::{BoxFuture, BoxedHandler, Error, Handler, HttpContext, RequestLogger};
//!
//! fn get_user(ctx: &mut HttpContext) -> BoxFuture<'_, Result<(), Error>> {
//!     Box::pin(async move {
//!         ctx.text(StatusCode::OK, "alice");
//!         Ok(())
//!     })
//! }
//!
//! let handler: BoxedHandler<HttpContext> =
//!     RequestLogger::new().wrap(get_user.into_boxed_handler());
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::{HeaderName, Version};
use tracing::Level;

use crate::context::Context;
use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Handler, private};
use crate::middleware::Middleware;
use crate::outcome::{Outcome, Outcomes};
use crate::sink::{LogSink, Record, default_sink};

/// Header carrying the client- or proxy-supplied correlation id.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Middleware that logs every request it wraps.
///
/// Build it once at startup and wrap as many handlers as you like; each
/// wrapped handler shares the same sink.
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<dyn LogSink>,
    request_id_header: HeaderName,
    outcomes: Outcomes,
}

impl RequestLogger {
    /// Logs to the process-wide [default sink](crate::default_sink).
    pub fn new() -> Self {
        Self::from_shared(default_sink())
    }

    /// Logs to `sink`.
    pub fn with_sink(sink: impl LogSink + 'static) -> Self {
        Self::from_shared(Arc::new(sink))
    }

    fn from_shared(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            request_id_header: REQUEST_ID_HEADER,
            outcomes: Outcomes::default(),
        }
    }

    /// Reads the correlation id from `name` instead of `x-request-id`.
    pub fn request_id_header(mut self, name: HeaderName) -> Self {
        self.request_id_header = name;
        self
    }

    /// Logs `outcome` at `level` with `message`. Returns `self` for chaining.
    pub fn outcome(mut self, outcome: Outcome, level: Level, message: &'static str) -> Self {
        self.outcomes.set(outcome, level, message);
        self
    }
}

impl Default for RequestLogger {
    fn default() -> Self { Self::new() }
}

impl<C: Context> Middleware<C> for RequestLogger {
    fn wrap(&self, next: BoxedHandler<C>) -> BoxedHandler<C> {
        Arc::new(LoggingHandler {
            next,
            sink: Arc::clone(&self.sink),
            request_id_header: self.request_id_header.clone(),
            outcomes: self.outcomes.clone(),
        })
    }
}

// ── Wrapped handler ───────────────────────────────────────────────────────────

struct LoggingHandler<C> {
    next: BoxedHandler<C>,
    sink: Arc<dyn LogSink>,
    request_id_header: HeaderName,
    outcomes: Outcomes,
}

impl<C> private::Sealed<C> for LoggingHandler<C> {}

impl<C: Context> Handler<C> for LoggingHandler<C> {
    /// Never fails: a downstream error goes to the context's error path and
    /// only decides the log level.
    fn call<'a>(&'a self, ctx: &'a mut C) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let start = Instant::now();

            let result = self.next.call(ctx).await;
            let outcome = Outcome::of(&result);
            if let Err(err) = result {
                ctx.error(err);
            }

            let record = capture(&*ctx, start.elapsed(), &self.request_id_header);
            let (level, message) = self.outcomes.get(outcome);
            self.sink.emit(level, message, &record);

            Ok(())
        })
    }
}

/// Reads the post-handler state of the exchange into a record.
fn capture<C: Context>(ctx: &C, took: Duration, request_id_header: &HeaderName) -> Record {
    let status = ctx.status();
    Record {
        request: request_target(ctx),
        method: ctx.method().clone(),
        remote: ctx.remote_addr().map(|addr| addr.to_string()).unwrap_or_default(),
        status: status.as_u16(),
        text_status: status.canonical_reason().unwrap_or(""),
        took,
        request_id: ctx
            .headers()
            .get(request_id_header)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .filter(|id| !id.is_empty()),
    }
}

/// The request-target as the client wrote it. HTTP/2 carries it in the
/// `:path` pseudo-header, so scheme and authority are not part of it there.
fn request_target<C: Context>(ctx: &C) -> String {
    let uri = ctx.request_uri();
    match uri.path_and_query() {
        Some(target) if matches!(ctx.version(), Version::HTTP_2 | Version::HTTP_3) => {
            target.as_str().to_owned()
        }
        _ => uri.to_string(),
    }
}
