//! Error types for the service-call core.
//!
//! # Design
//! One flat enum, matching the lifecycle's failure taxonomy. `HttpStatus`
//! gets the richest shape because callers routinely need the status code,
//! headers, and raw body of a failed call; the remaining variants carry a
//! message and nothing else. Transport failures wrap the transport's own
//! error unchanged — the core never retries.

use std::fmt;
use std::io;

use crate::headers::HeaderSet;
use crate::http::{HttpResponse, TransportError};

/// Errors surfaced by descriptor construction and execution.
#[derive(Debug)]
pub enum Error {
    /// Invalid construction input, such as an empty required field. Fails
    /// fast at construction and is never retried.
    Configuration(String),

    /// An operation was invoked in a state that forbids it, such as a direct
    /// build while an uploader is attached. Programmer error.
    InvalidState(String),

    /// Two mutually-exclusive features were combined, such as a notification
    /// callback together with a streaming download.
    Unsupported(String),

    /// The transport call itself failed (connectivity, timeout).
    Transport(TransportError),

    /// The request completed with a non-success status code. Only raised
    /// when automatic status checking is enabled on the descriptor.
    HttpStatus {
        status: u16,
        message: Option<String>,
        headers: HeaderSet,
        body: Vec<u8>,
    },

    /// The request payload could not be serialized.
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    Deserialization(String),

    /// Reading from or writing to a caller-supplied stream failed.
    Io(io::Error),
}

impl Error {
    /// Default materialization of a non-success response: status, message,
    /// and a snapshot of the response headers and body.
    pub fn http_status(response: &HttpResponse) -> Self {
        Error::HttpStatus {
            status: response.status,
            message: response.status_message.clone(),
            headers: response.headers.clone(),
            body: response.body.clone(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "invalid configuration: {msg}"),
            Error::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Error::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            Error::Transport(e) => write!(f, "{e}"),
            Error::HttpStatus {
                status, message, ..
            } => match message {
                Some(message) => write!(f, "HTTP {status}: {message}"),
                None => write!(f, "HTTP {status}"),
            },
            Error::Serialization(msg) => write!(f, "serialization failed: {msg}"),
            Error::Deserialization(msg) => write!(f, "deserialization failed: {msg}"),
            Error::Io(e) => write!(f, "stream I/O failed: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_snapshot_copies_response_state() {
        let mut headers = HeaderSet::new();
        headers.set("x-request-id", "abc");
        let response = HttpResponse {
            status: 404,
            status_message: Some("Not Found".to_string()),
            headers,
            body: b"missing".to_vec(),
        };

        let err = Error::http_status(&response);
        match err {
            Error::HttpStatus {
                status,
                message,
                headers,
                body,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message.as_deref(), Some("Not Found"));
                assert_eq!(headers.get("x-request-id"), Some("abc"));
                assert_eq!(body, b"missing");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[test]
    fn display_includes_status_and_message() {
        let err = Error::HttpStatus {
            status: 500,
            message: Some("Internal Server Error".to_string()),
            headers: HeaderSet::new(),
            body: Vec::new(),
        };
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");

        let err = Error::HttpStatus {
            status: 418,
            message: None,
            headers: HeaderSet::new(),
            body: Vec::new(),
        };
        assert_eq!(err.to_string(), "HTTP 418");
    }

    #[test]
    fn transport_error_is_exposed_as_source() {
        use std::error::Error as _;

        let err = Error::from(TransportError::new("connection refused"));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }
}
