//! Request/response context.
//!
//! A handler sees one request through a [`Context`]: what came in, the
//! response being built, and the framework's error channel. Middleware only
//! ever reads through this trait, so any host framework can plug in by
//! implementing it. [`HttpContext`] is the implementation for hosts built
//! directly on `http` / hyper types.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode, Uri, Version};
use http_body_util::Full;

use crate::error::Error;

/// What a handler (and any middleware around it) can see of one exchange.
pub trait Context: Send + 'static {
    fn method(&self) -> &Method;

    /// The request-target exactly as the client sent it (`/users/5?full=1`).
    fn request_uri(&self) -> &Uri;

    /// Peer address of the connection, if the host knows it.
    fn remote_addr(&self) -> Option<SocketAddr>;

    fn headers(&self) -> &HeaderMap;

    /// Protocol version the request arrived over.
    fn version(&self) -> Version {
        Version::HTTP_11
    }

    /// The response status as it stands right now.
    fn status(&self) -> StatusCode;

    /// Hands a handler failure to the framework's error path, which is
    /// responsible for turning it into an error response.
    fn error(&mut self, err: Error);
}

/// Turns a handler failure into a response on the context.
pub type ErrorHandler = Arc<dyn Fn(&Error, &mut HttpContext) + Send + Sync>;

/// A [`Context`] over `http` request parts and a response under construction.
///
/// ```rust
/// use bytes::Bytes;
/// use http::StatusCode;
/// use reqlog::{Context, HttpContext};
///
/// let req = http::Request::get("/users/5").body(Bytes::new()).unwrap();
/// let mut ctx = HttpContext::new(req, "10.0.0.1:4000".parse().ok());
/// ctx.text(StatusCode::OK, "user 5");
/// assert_eq!(ctx.status(), StatusCode::OK);
/// ```
pub struct HttpContext {
    request: http::request::Parts,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
    status: StatusCode,
    response_headers: HeaderMap,
    response_body: Bytes,
    committed: bool,
    error_handler: ErrorHandler,
}

impl HttpContext {
    /// Starts a context with a `200 OK`, empty, uncommitted response and the
    /// [default error handler](default_error_handler).
    pub fn new(request: http::Request<Bytes>, remote_addr: Option<SocketAddr>) -> Self {
        let (request, body) = request.into_parts();
        Self {
            request,
            body,
            remote_addr,
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            response_body: Bytes::new(),
            committed: false,
            error_handler: Arc::new(default_error_handler),
        }
    }

    /// Replaces the error path used by [`Context::error`].
    pub fn with_error_handler(
        mut self,
        handler: impl Fn(&Error, &mut HttpContext) + Send + Sync + 'static,
    ) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    pub fn body(&self) -> &Bytes { &self.body }
    pub fn response_headers(&self) -> &HeaderMap { &self.response_headers }
    pub fn response_body(&self) -> &Bytes { &self.response_body }

    /// `true` once a body-writing helper has run.
    pub fn is_committed(&self) -> bool { self.committed }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    /// Writes a `text/plain; charset=utf-8` body.
    pub fn text(&mut self, status: StatusCode, body: impl Into<String>) {
        self.commit(status, "text/plain; charset=utf-8", Bytes::from(body.into()));
    }

    /// Writes an `application/json` body. Pass bytes straight from your
    /// serialiser; the context does not look at them.
    pub fn json(&mut self, status: StatusCode, body: impl Into<Bytes>) {
        self.commit(status, "application/json", body.into());
    }

    /// Commits a response with no body (`204`, redirects, ...).
    pub fn no_content(&mut self, status: StatusCode) {
        self.status = status;
        self.response_body = Bytes::new();
        self.committed = true;
    }

    /// Converts the finished exchange into a response hyper can send.
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.response_body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.response_headers;
        response
    }

    fn commit(&mut self, status: StatusCode, content_type: &'static str, body: Bytes) {
        self.status = status;
        self.response_headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.response_body = body;
        self.committed = true;
    }
}

impl Context for HttpContext {
    fn method(&self) -> &Method { &self.request.method }
    fn request_uri(&self) -> &Uri { &self.request.uri }
    fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }
    fn headers(&self) -> &HeaderMap { &self.request.headers }
    fn version(&self) -> Version { self.request.version }
    fn status(&self) -> StatusCode { self.status }

    fn error(&mut self, err: Error) {
        let handler = Arc::clone(&self.error_handler);
        handler(&err, self);
    }
}

impl fmt::Debug for HttpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpContext")
            .field("method", &self.request.method)
            .field("uri", &self.request.uri)
            .field("remote_addr", &self.remote_addr)
            .field("status", &self.status)
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}

/// Writes the error's status and message as a plain-text response.
///
/// A response that is already committed is left alone: the client has been
/// promised a body and we do not overwrite it.
pub fn default_error_handler(err: &Error, ctx: &mut HttpContext) {
    if ctx.committed {
        return;
    }
    ctx.text(err.status(), err.message());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> http::Request<Bytes> {
        http::Request::get(uri).body(Bytes::new()).unwrap()
    }

    #[test]
    fn exposes_request_side() {
        let req = http::Request::post("/orders?draft=1")
            .header("x-request-id", "req-42")
            .body(Bytes::from_static(b"{}"))
            .unwrap();
        let ctx = HttpContext::new(req, "10.0.0.1:4000".parse().ok());

        assert_eq!(*ctx.method(), Method::POST);
        assert_eq!(ctx.request_uri().to_string(), "/orders?draft=1");
        assert_eq!(ctx.remote_addr(), Some("10.0.0.1:4000".parse().unwrap()));
        assert_eq!(ctx.headers()["x-request-id"], "req-42");
        assert_eq!(&ctx.body()[..], b"{}");
        assert_eq!(ctx.status(), StatusCode::OK);
        assert!(!ctx.is_committed());
    }

    #[test]
    fn status_and_headers_do_not_commit() {
        let mut ctx = HttpContext::new(get("/"), None);
        ctx.set_status(StatusCode::ACCEPTED);
        ctx.insert_header(http::header::LOCATION, HeaderValue::from_static("/jobs/1"));
        assert!(!ctx.is_committed());

        ctx.error(Error::new(StatusCode::BAD_REQUEST, "bad job"));
        assert_eq!(ctx.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn version_comes_from_request() {
        let req = http::Request::get("/")
            .version(http::Version::HTTP_2)
            .body(Bytes::new())
            .unwrap();
        assert_eq!(HttpContext::new(req, None).version(), http::Version::HTTP_2);
        assert_eq!(HttpContext::new(get("/"), None).version(), http::Version::HTTP_11);
    }

    #[test]
    fn default_error_handler_writes_status_and_message() {
        let mut ctx = HttpContext::new(get("/"), None);
        ctx.error(Error::new(StatusCode::NOT_FOUND, "no such user"));

        assert_eq!(ctx.status(), StatusCode::NOT_FOUND);
        assert_eq!(&ctx.response_body()[..], b"no such user");
        assert!(ctx.is_committed());
    }

    #[test]
    fn default_error_handler_leaves_committed_response() {
        let mut ctx = HttpContext::new(get("/"), None);
        ctx.json(StatusCode::CREATED, r#"{"id":1}"#);
        ctx.error(Error::internal("late failure"));

        assert_eq!(ctx.status(), StatusCode::CREATED);
        assert_eq!(&ctx.response_body()[..], br#"{"id":1}"#);
    }

    #[test]
    fn custom_error_handler_replaces_default() {
        let mut ctx = HttpContext::new(get("/"), None).with_error_handler(|err, ctx| {
            ctx.json(err.status(), format!(r#"{{"error":"{}"}}"#, err.message()));
        });
        ctx.error(Error::new(StatusCode::CONFLICT, "taken"));

        assert_eq!(ctx.status(), StatusCode::CONFLICT);
        assert_eq!(&ctx.response_body()[..], br#"{"error":"taken"}"#);
    }

    #[test]
    fn into_response_carries_status_headers_and_body() {
        let mut ctx = HttpContext::new(get("/"), None);
        ctx.insert_header(http::header::LOCATION, HeaderValue::from_static("/users/99"));
        ctx.text(StatusCode::CREATED, "made");

        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[http::header::LOCATION], "/users/99");
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    }
}
