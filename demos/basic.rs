//! Minimal reqlog demo: a hyper server whose handlers are wrapped in
//! `RequestLogger`.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/5
//!   curl -H 'x-request-id: req-42' -X POST http://localhost:3000/orders
//!   curl http://localhost:3000/healthz

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::BodyExt;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use reqlog::middleware::Middleware;
use reqlog::{BoxFuture, BoxedHandler, Context, Error, Handler, HttpContext, RequestLogger};
use tokio::net::TcpListener;
use tracing::error;

struct App {
    get_user: BoxedHandler<HttpContext>,
    create_order: BoxedHandler<HttpContext>,
    healthz: BoxedHandler<HttpContext>,
    not_found: BoxedHandler<HttpContext>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let logger = RequestLogger::new();
    let app = Arc::new(App {
        get_user: logger.wrap(get_user.into_boxed_handler()),
        create_order: logger.wrap(create_order.into_boxed_handler()),
        healthz: logger.wrap(healthz.into_boxed_handler()),
        not_found: logger.wrap(not_found.into_boxed_handler()),
    });

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    loop {
        let (stream, remote_addr) = listener.accept().await?;
        let app = Arc::clone(&app);

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let app = Arc::clone(&app);
                async move { dispatch(&app, req, remote_addr).await }
            });
            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), svc)
                .await
            {
                error!(peer = %remote_addr, "connection error: {e}");
            }
        });
    }
}

async fn dispatch(
    app: &App,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<http_body_util::Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await?.to_bytes();
    let mut ctx = HttpContext::new(http::Request::from_parts(parts, body), Some(remote_addr));

    let handler = match (ctx.method().clone(), ctx.request_uri().path()) {
        (Method::GET, "/healthz") => &app.healthz,
        (Method::GET, path) if path.starts_with("/users/") => &app.get_user,
        (Method::POST, "/orders") => &app.create_order,
        _ => &app.not_found,
    };
    // The logging layer never fails; errors were already rendered.
    let _ = handler.call(&mut ctx).await;

    Ok(ctx.into_response())
}

// GET /users/{id}
fn get_user(ctx: &mut HttpContext) -> BoxFuture<'_, Result<(), Error>> {
    Box::pin(async move {
        let id = ctx.request_uri().path().trim_start_matches("/users/").to_owned();
        ctx.json(StatusCode::OK, format!(r#"{{"id":"{id}","name":"alice"}}"#));
        Ok(())
    })
}

// POST /orders always fails, to show the ERROR record and the 500 response.
fn create_order(_ctx: &mut HttpContext) -> BoxFuture<'_, Result<(), Error>> {
    Box::pin(async { Err(Error::internal("inventory service unreachable")) })
}

fn healthz(ctx: &mut HttpContext) -> BoxFuture<'_, Result<(), Error>> {
    Box::pin(async move {
        ctx.text(StatusCode::OK, "ok");
        Ok(())
    })
}

fn not_found(_ctx: &mut HttpContext) -> BoxFuture<'_, Result<(), Error>> {
    Box::pin(async { Err(Error::new(StatusCode::NOT_FOUND, "not found")) })
}
