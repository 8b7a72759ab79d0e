//! Request lifecycle core for clients of a templated HTTP service.
//!
//! # Overview
//! Models one outbound API call from construction to completion: a
//! [`ServiceClient`] mints a [`ServiceRequest`] from a method, a URI
//! template, and optional content; the descriptor builds a transport-ready
//! request on demand, dispatches it through a caller-supplied [`Transport`],
//! and interprets the outcome — parsed object, raw response, streamed body,
//! or a structured error. Requests can also subscribe to out-of-band
//! notifications, be queued for deferred batch dispatch, or hand the
//! transfer to a chunked media uploader/downloader.
//!
//! # Design
//! - The core performs no network I/O itself; transports, uploaders,
//!   downloaders, and the subscription registry are capability traits the
//!   host implements.
//! - Requests and responses are plain data with owned fields, so they are
//!   easy to script in tests and cheap to snapshot.
//! - Every output mode funnels through one dispatch point, keeping the
//!   ordering of build, upload branching, response bookkeeping,
//!   subscription registration, and the status decision identical across
//!   modes.
//! - A non-success status becomes an [`Error::HttpStatus`] by default;
//!   callers can disable the check and inspect the response manually.

pub mod batch;
pub mod client;
pub mod content;
pub mod error;
pub mod headers;
pub mod http;
pub mod media;
pub mod method_override;
pub mod request;
pub mod subscription;
pub mod uri;

pub use batch::{BatchContainer, BatchHandler, BatchOutcome, BatchRequest};
pub use client::ServiceClient;
pub use content::Content;
pub use error::Error;
pub use headers::HeaderSet;
pub use http::{HttpRequest, HttpResponse, Method, Transport, TransportError};
pub use media::{MediaDownloader, MediaTransfer, MediaUploader};
pub use request::{NoContent, ServiceRequest, STATUS_CODE_UNSET};
pub use subscription::{
    MemorySubscriptionStore, Notification, NotificationCallback, Subscription,
    SubscriptionHeaders, SubscriptionStore, TypedNotificationCallback,
};
