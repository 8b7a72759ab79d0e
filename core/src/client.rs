//! Service client: the shared context every request descriptor is minted
//! from.
//!
//! # Design
//! `ServiceClient` holds the normalized base URL, the optional application
//! name (seeded into each descriptor's `User-Agent`), the transport, and the
//! subscription registry. It carries no per-request state and is cheap to
//! clone — descriptors clone it so they can outlive the handle they were
//! created from.

use std::sync::Arc;

use crate::content::Content;
use crate::error::Error;
use crate::http::{Method, Transport};
use crate::request::ServiceRequest;
use crate::subscription::{MemorySubscriptionStore, SubscriptionStore};

struct ClientInner {
    base_url: String,
    application_name: Option<String>,
    transport: Arc<dyn Transport>,
    subscription_store: Arc<dyn SubscriptionStore>,
}

/// Shared, immutable client context for a templated base service.
#[derive(Clone)]
pub struct ServiceClient {
    inner: Arc<ClientInner>,
}

impl ServiceClient {
    pub fn builder(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Builder {
        Builder {
            base_url: base_url.into(),
            application_name: None,
            transport,
            subscription_store: None,
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn application_name(&self) -> Option<&str> {
        self.inner.application_name.as_deref()
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    pub fn subscription_store(&self) -> &Arc<dyn SubscriptionStore> {
        &self.inner.subscription_store
    }

    /// Mints a request descriptor for one API call. The method, template,
    /// content, and result type are fixed from here on.
    pub fn request<T>(
        &self,
        method: Method,
        uri_template: &str,
        content: Option<Content>,
    ) -> Result<ServiceRequest<T>, Error> {
        if uri_template.trim().is_empty() {
            return Err(Error::Configuration(
                "URI template must not be empty".to_string(),
            ));
        }
        Ok(ServiceRequest::new(
            self.clone(),
            method,
            uri_template.to_string(),
            content,
        ))
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("base_url", &self.inner.base_url)
            .field("application_name", &self.inner.application_name)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ServiceClient`].
pub struct Builder {
    base_url: String,
    application_name: Option<String>,
    transport: Arc<dyn Transport>,
    subscription_store: Option<Arc<dyn SubscriptionStore>>,
}

impl Builder {
    /// Application name placed as the initial `User-Agent` header on every
    /// descriptor.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Registry that completed subscribing requests are stored into.
    /// Defaults to a fresh in-memory registry.
    pub fn subscription_store(mut self, store: Arc<dyn SubscriptionStore>) -> Self {
        self.subscription_store = Some(store);
        self
    }

    pub fn build(self) -> Result<ServiceClient, Error> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Configuration(
                "base URL must not be empty".to_string(),
            ));
        }
        Ok(ServiceClient {
            inner: Arc::new(ClientInner {
                base_url: self.base_url.trim_end_matches('/').to_string(),
                application_name: self.application_name,
                transport: self.transport,
                subscription_store: self
                    .subscription_store
                    .unwrap_or_else(|| Arc::new(MemorySubscriptionStore::new())),
            }),
        })
    }
}
