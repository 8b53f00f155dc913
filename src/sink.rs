//! Where request records go.
//!
//! A [`LogSink`] takes one structured [`Record`] plus a severity and message.
//! The default, [`TracingSink`], turns it into a `tracing` event, so output
//! format, filtering and destination are whatever subscriber the application
//! installed at startup.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use http::Method;
use tracing::Level;

/// The structured fields describing one request/response exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Request-target as received, e.g. `/users/5?full=1`.
    pub request: String,
    pub method: Method,
    /// Peer address, or empty when the host did not provide one.
    pub remote: String,
    pub status: u16,
    /// Reason phrase for `status`, empty for unregistered codes.
    pub text_status: &'static str,
    /// Time spent in the downstream handler and error path.
    pub took: Duration,
    /// Correlation id, only when the request carried a non-empty one.
    pub request_id: Option<String>,
}

/// Accepts request records.
///
/// Called synchronously once per request from whichever task served it, so
/// implementations must tolerate concurrent calls. Emission is fire and
/// forget: a sink that fails to write has nobody to report to.
pub trait LogSink: Send + Sync {
    fn emit(&self, level: Level, message: &str, record: &Record);
}

// ── TracingSink ───────────────────────────────────────────────────────────────

/// Emits each record as a `tracing` event carrying every field.
///
/// A missing `request_id` is not recorded at all, rather than recorded empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

// `tracing` needs the level at the callsite as a constant, hence one
// expansion per level.
macro_rules! record_event {
    ($level:expr, $message:expr, $record:expr) => {
        tracing::event!(
            $level,
            request = %$record.request,
            method = %$record.method,
            remote = %$record.remote,
            status = $record.status,
            text_status = $record.text_status,
            took = ?$record.took,
            request_id = $record.request_id.as_deref(),
            "{}",
            $message
        )
    };
}

impl LogSink for TracingSink {
    fn emit(&self, level: Level, message: &str, record: &Record) {
        if level == Level::ERROR {
            record_event!(Level::ERROR, message, record);
        } else if level == Level::WARN {
            record_event!(Level::WARN, message, record);
        } else if level == Level::INFO {
            record_event!(Level::INFO, message, record);
        } else if level == Level::DEBUG {
            record_event!(Level::DEBUG, message, record);
        } else {
            record_event!(Level::TRACE, message, record);
        }
    }
}

// ── MemorySink ────────────────────────────────────────────────────────────────

/// One emitted record, as captured by [`MemorySink`].
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub level: Level,
    pub message: String,
    pub record: Record,
}

/// Keeps every record in memory. Useful for asserting on request logs in a
/// host application's own tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Entry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything emitted so far, oldest first.
    pub fn entries(&self) -> Vec<Entry> {
        self.lock().clone()
    }

    /// Removes and returns everything emitted so far.
    pub fn take(&self) -> Vec<Entry> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        // A panic while holding the lock cannot leave a half-pushed entry.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for MemorySink {
    fn emit(&self, level: Level, message: &str, record: &Record) {
        self.lock().push(Entry { level, message: message.to_owned(), record: record.clone() });
    }
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn emit(&self, level: Level, message: &str, record: &Record) {
        (**self).emit(level, message, record);
    }
}

// ── Process-wide default ──────────────────────────────────────────────────────

static DEFAULT_SINK: OnceLock<Arc<dyn LogSink>> = OnceLock::new();

/// Installs the sink used by [`RequestLogger::new`](crate::RequestLogger::new).
///
/// Call once at startup, before building middleware. A second call is
/// rejected and hands the sink back.
pub fn set_default_sink(sink: Arc<dyn LogSink>) -> Result<(), Arc<dyn LogSink>> {
    DEFAULT_SINK.set(sink)
}

/// The installed default sink, or [`TracingSink`] if none was installed.
pub fn default_sink() -> Arc<dyn LogSink> {
    match DEFAULT_SINK.get() {
        Some(sink) => Arc::clone(sink),
        None => Arc::new(TracingSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            request: "/users/5".to_owned(),
            method: Method::GET,
            remote: "10.0.0.1:4000".to_owned(),
            status: 200,
            text_status: "OK",
            took: Duration::from_millis(3),
            request_id: None,
        }
    }

    #[test]
    fn memory_sink_keeps_entries_in_order() {
        let sink = MemorySink::new();
        sink.emit(Level::INFO, "first", &record());
        sink.emit(Level::ERROR, "second", &record());

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, Level::INFO);
        assert_eq!(entries[1].message, "second");
        assert_eq!(entries[1].record, record());
    }

    #[test]
    fn take_drains() {
        let sink = MemorySink::new();
        sink.emit(Level::INFO, "only", &record());
        assert_eq!(sink.take().len(), 1);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn arc_forwards_to_inner_sink() {
        let sink = Arc::new(MemorySink::new());
        let shared: &dyn LogSink = &sink;
        shared.emit(Level::WARN, "via arc", &record());
        assert_eq!(sink.entries()[0].level, Level::WARN);
    }
}
