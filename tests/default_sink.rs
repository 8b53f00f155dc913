//! Process-wide sink installation. Kept in its own test binary because the
//! default sink can only be installed once per process.

use std::sync::Arc;

use bytes::Bytes;
use reqlog::middleware::Middleware;
use reqlog::{
    BoxFuture, BoxedHandler, Error, Handler, HttpContext, LogSink, MemorySink, RequestLogger,
    set_default_sink,
};

fn ok(_ctx: &mut HttpContext) -> BoxFuture<'_, Result<(), Error>> {
    Box::pin(async { Ok(()) })
}

#[tokio::test]
async fn new_uses_the_installed_sink_and_second_install_is_rejected() {
    let sink = Arc::new(MemorySink::new());
    let installed: Arc<dyn LogSink> = sink.clone();
    assert!(set_default_sink(installed).is_ok());
    assert!(set_default_sink(Arc::new(MemorySink::new())).is_err());

    let handler: BoxedHandler<HttpContext> = RequestLogger::new().wrap(ok.into_boxed_handler());
    let req = http::Request::get("/healthz").body(Bytes::new()).unwrap();
    handler.call(&mut HttpContext::new(req, None)).await.unwrap();

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].record.request, "/healthz");
}
