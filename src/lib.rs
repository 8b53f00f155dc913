//! # reqlog
//!
//! Request logging for async HTTP handlers. One middleware, one record per
//! request. Nothing more.
//!
//! ## The contract
//!
//! The host framework serves connections, routes requests and renders error
//! responses. reqlog does none of that. It wraps a handler, times it, and
//! when the handler is done writes a single structured record:
//!
//! - **Success** → `INFO`, "request has been successfully processed"
//! - **Failure** → `ERROR`, "error by handling request". The error itself is
//!   handed to the framework's error path first, so the client still gets the
//!   usual error response and the logged status is the one actually sent.
//!
//! The wrapped handler never fails. Records go to a [`LogSink`]; by default
//! that is a `tracing` event, so the subscriber the application installs at
//! startup decides format and destination.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use http::StatusCode;
//! use reqlog::middleware::Middleware;
//! use reqlog::{BoxFuture, BoxedHandler, Error, Handler, HttpContext, RequestLogger};
//!
//! fn get_user(ctx: &mut HttpContext) -> BoxFuture<'_, Result<(), Error>> {
//!     Box::pin(async move {
//!         ctx.json(StatusCode::OK, r#"{"id":5,"name":"alice"}"#);
//!         Ok(())
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     let handler: BoxedHandler<HttpContext> =
//!         RequestLogger::new().wrap(get_user.into_boxed_handler());
//!
//!     // Per request, from inside the host's service:
//!     let req = http::Request::get("/users/5").body(Bytes::new()).unwrap();
//!     let mut ctx = HttpContext::new(req, "10.0.0.1:4000".parse().ok());
//!     handler.call(&mut ctx).await.unwrap();
//!     let _response = ctx.into_response();
//! }
//! ```

mod context;
mod error;
mod handler;
mod outcome;
mod sink;

pub mod middleware;

pub use context::{Context, ErrorHandler, HttpContext, default_error_handler};
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, Handler};
pub use middleware::logger::{REQUEST_ID_HEADER, RequestLogger};
pub use outcome::{Outcome, Outcomes};
pub use sink::{Entry, LogSink, MemorySink, Record, TracingSink, default_sink, set_default_sink};
