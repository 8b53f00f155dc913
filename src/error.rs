//! Handler failure type.

use std::fmt;

use http::StatusCode;

type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error a handler returns when it cannot produce a response itself.
///
/// An `Error` is not a response. It is handed to the context's error channel
/// ([`Context::error`](crate::Context::error)), which turns it into one. The
/// status is what that channel writes by default; the message is safe to show
/// to clients.
#[derive(Debug)]
pub struct Error {
    status: StatusCode,
    message: String,
    source: Option<Source>,
}

impl Error {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), source: None }
    }

    /// `500 Internal Server Error` wrapping an underlying failure.
    ///
    /// The source is kept for logging but never becomes the public message.
    pub fn internal(source: impl Into<Source>) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        Self {
            status,
            message: status.canonical_reason().unwrap_or_default().to_owned(),
            source: Some(source.into()),
        }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn message(&self) -> &str { &self.message }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status.as_u16(), self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn internal_hides_source_from_message() {
        let err = Error::internal("db pool exhausted");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal Server Error");
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "500: Internal Server Error (db pool exhausted)");
    }

    #[test]
    fn io_errors_become_internal() {
        let err: Error = std::io::Error::other("disk full").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn new_keeps_status_and_message() {
        let err = Error::new(StatusCode::NOT_FOUND, "no such order");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "404: no such order");
        assert!(err.source().is_none());
    }
}
