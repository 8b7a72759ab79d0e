//! HTTP transport types and the transport capability trait.
//!
//! # Design
//! Requests and responses are plain data with owned fields, exactly as the
//! caller-supplied transport sees them. The core never opens a socket itself:
//! everything network-shaped goes through [`Transport`], which the host
//! provides (ureq, reqwest, a scripted stub in tests, ...).

use std::fmt;
use std::io;

use crate::content::Content;
use crate::headers::HeaderSet;

/// HTTP method for a request. `Patch` is accepted from callers but may be
/// rewritten before dispatch by the method-override transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport-ready request described as plain data.
///
/// Produced by the request builder; `method` is the wire method after any
/// override rewrite, and `headers` already contain the caller's overrides.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderSet,
    pub content: Option<Content>,
    /// Whether the transport may compress the request body. On by default;
    /// callers opt out per descriptor.
    pub enable_gzip_content: bool,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_message: Option<String>,
    pub headers: HeaderSet,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status code is in the 2xx success range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Consumes the response, returning a reader over the body. The caller
    /// owns the reader and drops it when done.
    pub fn into_reader(self) -> io::Cursor<Vec<u8>> {
        io::Cursor::new(self.body)
    }
}

/// Failure of the transport call itself — connectivity, timeout, protocol
/// violation. Distinct from a completed response with a non-success status.
#[derive(Debug, Clone)]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error: {}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// Capability trait for the HTTP round-trip.
///
/// Implementations must return completed responses as `Ok` regardless of
/// status code — a 404 is data, not an error. The execution engine owns the
/// decision of whether a non-success status becomes an error, so any
/// status-as-error behavior of the underlying client must be disabled.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
