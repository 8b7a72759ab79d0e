//! Deferred batch execution.
//!
//! # Design
//! A built request can be queued into a batch container instead of executed
//! immediately. The container sees only plain transport requests plus a
//! [`BatchHandler`] — a type-erased closure minted by the descriptor that
//! knows how to decode the eventual response as the declared success or
//! error type and invoke the caller's completion callback. How queued
//! requests are encoded and grouped on the wire is the container's business;
//! [`BatchRequest`] here is the minimal container, dispatching each entry
//! through a transport in insertion order when its own `execute` runs.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::headers::HeaderSet;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::request::no_content_value;

/// Outcome delivered to a batch completion callback.
#[derive(Debug)]
pub enum BatchOutcome<T, E> {
    /// 2xx response, body decoded as the success type.
    Success { value: T, headers: HeaderSet },
    /// Non-success response; body decoded as the error type when it parses.
    Failure {
        status: u16,
        message: Option<String>,
        error: Option<E>,
        headers: HeaderSet,
    },
}

/// Type-erased response handler for one queued request.
pub struct BatchHandler {
    deliver: Box<dyn FnOnce(HttpResponse) -> Result<(), Error> + Send>,
}

impl BatchHandler {
    /// Pairs the declared success and error types with a completion
    /// callback. A success body that fails to decode is a
    /// [`Error::Deserialization`] surfaced from [`BatchHandler::complete`];
    /// an error body that fails to decode is delivered as `error: None`.
    pub fn new<T, E, C>(callback: C) -> Self
    where
        T: DeserializeOwned + 'static,
        E: DeserializeOwned + 'static,
        C: FnOnce(BatchOutcome<T, E>) + Send + 'static,
    {
        BatchHandler {
            deliver: Box::new(move |response: HttpResponse| {
                if response.is_success() {
                    let value = match no_content_value::<T>() {
                        Some(value) => value,
                        None => serde_json::from_slice(&response.body)
                            .map_err(|e| Error::Deserialization(e.to_string()))?,
                    };
                    callback(BatchOutcome::Success {
                        value,
                        headers: response.headers,
                    });
                } else {
                    let error = serde_json::from_slice(&response.body).ok();
                    callback(BatchOutcome::Failure {
                        status: response.status,
                        message: response.status_message,
                        error,
                        headers: response.headers,
                    });
                }
                Ok(())
            }),
        }
    }

    /// Delivers the response to the callback, decoding on the way.
    pub fn complete(self, response: HttpResponse) -> Result<(), Error> {
        (self.deliver)(response)
    }
}

/// Capability trait for batch containers accepting built requests.
pub trait BatchContainer {
    fn queue(&mut self, request: HttpRequest, handler: BatchHandler);
}

/// Minimal batch container: holds built requests and dispatches them one by
/// one through a transport when executed. Entries run in insertion order;
/// the first transport or decode failure aborts the remainder.
pub struct BatchRequest {
    transport: Arc<dyn Transport>,
    entries: Vec<(HttpRequest, BatchHandler)>,
}

impl BatchRequest {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dispatches every queued entry, invoking each handler with its
    /// response. The queue is drained even when a handler fails early.
    pub fn execute(&mut self) -> Result<(), Error> {
        let entries = std::mem::take(&mut self.entries);
        tracing::debug!(count = entries.len(), "executing batch");
        for (request, handler) in entries {
            let response = self.transport.execute(request).map_err(Error::Transport)?;
            handler.complete(response)?;
        }
        Ok(())
    }
}

impl BatchContainer for BatchRequest {
    fn queue(&mut self, request: HttpRequest, handler: BatchHandler) {
        self.entries.push((request, handler));
    }
}
