//! Subscription bookkeeping: reserved headers, client tokens, callbacks, and
//! the process-wide subscription registry.
//!
//! # Design
//! A subscribing request carries two reserved headers: the delivery method
//! under [`SUBSCRIBE`] and a client-generated token under [`CLIENT_TOKEN`].
//! On success the server answers with its own subscription headers, which
//! are snapshotted into [`SubscriptionHeaders`]; if the caller supplied a
//! notification callback, a [`Subscription`] record is minted and stored in
//! the registry keyed by the client token. Delivery of notifications happens
//! over a channel outside this crate — the callback types here only describe
//! what to invoke when one arrives.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::error::Error;
use crate::headers::HeaderSet;

/// Request header selecting the notification delivery method.
pub const SUBSCRIBE: &str = "x-subscribe";

/// Request header carrying the client-generated subscription token; echoed
/// back by the server on success.
pub const CLIENT_TOKEN: &str = "x-client-token";

/// Response header carrying the server-assigned subscription identifier.
pub const SUBSCRIPTION_ID: &str = "x-subscription-id";

/// Response header carrying the identifier of the subscribed topic.
pub const TOPIC_ID: &str = "x-topic-id";

/// Response header carrying the URI of the subscribed topic.
pub const TOPIC_URI: &str = "x-topic-uri";

/// Generates a fresh client token: two v4 UUIDs in simple form, 64 hex
/// characters. Uniqueness, not cryptographic strength, is the requirement —
/// collisions must merely be negligible across a registry's population.
pub fn generate_client_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// A notification delivered for an active subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subscription_id: String,
    pub topic_id: String,
    pub payload: Vec<u8>,
}

/// Decodes a notification payload into the subscription's expected type,
/// boxed for storage alongside untyped callbacks.
pub type PayloadDecoder =
    Arc<dyn Fn(&[u8]) -> Result<Box<dyn Any + Send>, Error> + Send + Sync>;

/// Callback for notifications that should be decoded before delivery.
///
/// The decoder for the declared result type is bound exactly once, when the
/// subscription is made; implementations typically park it in a `OnceLock`.
pub trait TypedNotificationCallback: Send + Sync {
    fn bind_decoder(&self, decoder: PayloadDecoder);
    fn on_notification(&self, notification: Notification);
}

/// A notification callback, either raw or typed.
#[derive(Clone)]
pub enum NotificationCallback {
    /// Payload bytes are handed over undecoded.
    Unparsed(Arc<dyn Fn(Notification) + Send + Sync>),
    /// Payloads are decoded as the request's declared result type first.
    Typed(Arc<dyn TypedNotificationCallback>),
}

impl fmt::Debug for NotificationCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationCallback::Unparsed(_) => f.write_str("NotificationCallback::Unparsed"),
            NotificationCallback::Typed(_) => f.write_str("NotificationCallback::Typed"),
        }
    }
}

/// Snapshot of the subscription-related headers of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionHeaders {
    pub subscription_id: Option<String>,
    pub client_token: Option<String>,
    pub topic_id: Option<String>,
    pub topic_uri: Option<String>,
}

impl SubscriptionHeaders {
    pub fn from_headers(headers: &HeaderSet) -> Self {
        let grab = |name: &str| headers.get(name).map(str::to_string);
        Self {
            subscription_id: grab(SUBSCRIPTION_ID),
            client_token: grab(CLIENT_TOKEN),
            topic_id: grab(TOPIC_ID),
            topic_uri: grab(TOPIC_URI),
        }
    }
}

/// An active subscription, minted after a successful subscribing request.
/// Never mutated after creation; removed only by an external unsubscribe.
#[derive(Debug, Clone)]
pub struct Subscription {
    /// Server-assigned identifier.
    pub subscription_id: String,
    /// Client-generated token the subscription is registered under.
    pub client_token: String,
    pub callback: NotificationCallback,
}

/// Capability trait for the process-wide subscription registry.
///
/// `store` must tolerate concurrent inserts from independent request
/// completions; last write wins per token, which is safe because tokens are
/// unique per descriptor.
pub trait SubscriptionStore: Send + Sync {
    fn store(&self, subscription: Subscription);
}

/// In-memory registry keyed by client token.
#[derive(Default)]
pub struct MemorySubscriptionStore {
    inner: Mutex<HashMap<String, Subscription>>,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, client_token: &str) -> Option<Subscription> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(client_token)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SubscriptionStore for MemorySubscriptionStore {
    fn store(&self, subscription: Subscription) {
        tracing::debug!(
            client_token = %subscription.client_token,
            subscription_id = %subscription.subscription_id,
            "storing subscription"
        );
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(subscription.client_token.clone(), subscription);
    }
}
