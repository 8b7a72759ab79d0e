//! Request descriptor and execution engine.
//!
//! # Design
//! A [`ServiceRequest`] describes exactly one API call: method, URI
//! template, content, and the declared result type are fixed at
//! construction; headers, template parameters, subscription state, and the
//! media-transfer slot may change up until dispatch. All output modes —
//! parsed, unparsed, reader, sink download, batch queue — funnel through the
//! same dispatch point, so the ordering of build, header injection, upload
//! branching, response bookkeeping, subscription registration, and the
//! status decision is identical no matter how the caller consumes the
//! result.
//!
//! A descriptor is executed at most once; build a new descriptor per
//! attempt. Retrying is the caller's responsibility.

use std::any::Any;
use std::io::{self, Write};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::batch::{BatchContainer, BatchHandler, BatchOutcome};
use crate::client::ServiceClient;
use crate::content::Content;
use crate::error::Error;
use crate::headers::HeaderSet;
use crate::http::{HttpRequest, HttpResponse, Method};
use crate::media::{MediaDownloader, MediaTransfer, MediaUploader};
use crate::method_override;
use crate::subscription::{
    self, NotificationCallback, Subscription, SubscriptionHeaders, TypedNotificationCallback,
};
use crate::uri;

/// Value of [`ServiceRequest::last_status_code`] before any execution has
/// completed.
pub const STATUS_CODE_UNSET: i32 = -1;

/// Sentinel result type for operations whose responses carry no payload.
/// The response body, if any, is dropped undecoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoContent;

impl<'de> Deserialize<'de> for NoContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(NoContent)
    }
}

/// Returns `Some` when `T` is the [`NoContent`] sentinel. Goes through `Any`
/// so callers stay generic over `T`.
pub(crate) fn no_content_value<T: 'static>() -> Option<T> {
    let mut slot: Option<T> = None;
    if let Some(sentinel) = (&mut slot as &mut dyn Any).downcast_mut::<Option<NoContent>>() {
        *sentinel = Some(NoContent);
    }
    slot
}

type HttpErrorHook = Box<dyn Fn(&HttpResponse) -> Error + Send>;

/// One outbound API call against a templated base service.
///
/// `T` is the declared result type the response body decodes into; use
/// [`NoContent`] for operations without a payload. Not safe for concurrent
/// use — each descriptor is owned by the call site that created it.
pub struct ServiceRequest<T> {
    client: ServiceClient,
    method: Method,
    uri_template: String,
    content: Option<Content>,
    params: Vec<(String, String)>,
    headers: HeaderSet,
    disable_gzip_content: bool,
    check_response_status: bool,
    http_error_hook: Option<HttpErrorHook>,

    subscribing: bool,
    notification_callback: Option<NotificationCallback>,
    media: MediaTransfer,

    last_status_code: i32,
    last_status_message: Option<String>,
    last_response_headers: Option<HeaderSet>,
    last_subscription_headers: Option<SubscriptionHeaders>,
    last_subscription: Option<Subscription>,

    _result: std::marker::PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for ServiceRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRequest")
            .field("method", &self.method)
            .field("uri_template", &self.uri_template)
            .field("last_status_code", &self.last_status_code)
            .finish_non_exhaustive()
    }
}

impl<T> ServiceRequest<T> {
    pub(crate) fn new(
        client: ServiceClient,
        method: Method,
        uri_template: String,
        content: Option<Content>,
    ) -> Self {
        let mut headers = HeaderSet::new();
        if let Some(name) = client.application_name() {
            headers.set_user_agent(name);
        }
        Self {
            client,
            method,
            uri_template,
            content,
            params: Vec::new(),
            headers,
            disable_gzip_content: false,
            check_response_status: true,
            http_error_hook: None,
            subscribing: false,
            notification_callback: None,
            media: MediaTransfer::None,
            last_status_code: STATUS_CODE_UNSET,
            last_status_message: None,
            last_response_headers: None,
            last_subscription_headers: None,
            last_subscription: None,
            _result: std::marker::PhantomData,
        }
    }

    // --- configuration -----------------------------------------------------

    /// Binds a template variable for URL expansion.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Disables compression of the request content. Compression is on by
    /// default.
    pub fn disable_gzip_content(mut self, disable: bool) -> Self {
        self.disable_gzip_content = disable;
        self
    }

    /// Whether a non-success status becomes an [`Error::HttpStatus`]
    /// (default) or is returned as an ordinary response for manual
    /// inspection.
    pub fn check_response_status(mut self, check: bool) -> Self {
        self.check_response_status = check;
        self
    }

    /// Replaces the default non-success materialization with a
    /// domain-specific one, e.g. decoding a structured error payload out of
    /// the response body.
    pub fn on_http_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HttpResponse) -> Error + Send + 'static,
    {
        self.http_error_hook = Some(Box::new(hook));
        self
    }

    // --- subscriptions -----------------------------------------------------

    /// Subscribes to notifications delivered via `delivery_method`, leaving
    /// payloads undecoded unless the callback is the typed variant.
    ///
    /// A fresh client token is generated each call; subscribing twice
    /// overwrites the previous token, last write wins. Override the token
    /// with [`set_notification_client_token`](Self::set_notification_client_token).
    pub fn subscribe_unparsed(
        mut self,
        delivery_method: &str,
        callback: Option<NotificationCallback>,
    ) -> Result<Self, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        if delivery_method.trim().is_empty() {
            return Err(Error::Configuration(
                "notification delivery method must not be empty".to_string(),
            ));
        }
        self.notification_callback = callback;
        self.headers.set(subscription::SUBSCRIBE, delivery_method);
        self.headers
            .set(subscription::CLIENT_TOKEN, subscription::generate_client_token());
        if let Some(NotificationCallback::Typed(typed)) = &self.notification_callback {
            typed.bind_decoder(Arc::new(|bytes: &[u8]| {
                serde_json::from_slice::<T>(bytes)
                    .map(|value| Box::new(value) as Box<dyn Any + Send>)
                    .map_err(|e| Error::Deserialization(e.to_string()))
            }));
        }
        self.subscribing = true;
        tracing::debug!(delivery_method, "subscription requested");
        Ok(self)
    }

    /// Subscribes to notifications decoded as the declared result type.
    pub fn subscribe(
        self,
        delivery_method: &str,
        callback: Arc<dyn TypedNotificationCallback>,
    ) -> Result<Self, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.subscribe_unparsed(delivery_method, Some(NotificationCallback::Typed(callback)))
    }

    /// Overrides the generated notification client token.
    pub fn set_notification_client_token(&mut self, token: impl Into<String>) {
        self.headers.set(subscription::CLIENT_TOKEN, token);
    }

    // --- media transfer ----------------------------------------------------

    /// Attaches a media uploader, configured with this descriptor's method
    /// as the initiation method and its content (when present) as metadata.
    /// Execution then runs the uploader's chunked transfer instead of the
    /// single-shot path.
    pub fn media_upload(mut self, mut uploader: Box<dyn MediaUploader>) -> Result<Self, Error> {
        if !self.media.is_none() {
            return Err(Error::InvalidState(
                "a media transfer is already attached".to_string(),
            ));
        }
        uploader.set_initiation_method(self.method);
        if let Some(content) = &self.content {
            uploader.set_metadata(content.clone());
        }
        self.media = MediaTransfer::Upload(uploader);
        Ok(self)
    }

    /// Attaches a media downloader used by
    /// [`download_to`](Self::download_to) instead of direct dispatch.
    pub fn media_download(mut self, downloader: Box<dyn MediaDownloader>) -> Result<Self, Error> {
        if !self.media.is_none() {
            return Err(Error::InvalidState(
                "a media transfer is already attached".to_string(),
            ));
        }
        self.media = MediaTransfer::Download(downloader);
        Ok(self)
    }

    // --- accessors ---------------------------------------------------------

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn uri_template(&self) -> &str {
        &self.uri_template
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderSet {
        &mut self.headers
    }

    /// Status code of the last response, or [`STATUS_CODE_UNSET`] before any
    /// execution has completed.
    pub fn last_status_code(&self) -> i32 {
        self.last_status_code
    }

    pub fn last_status_message(&self) -> Option<&str> {
        self.last_status_message.as_deref()
    }

    pub fn last_response_headers(&self) -> Option<&HeaderSet> {
        self.last_response_headers.as_ref()
    }

    pub fn is_subscribing(&self) -> bool {
        self.subscribing
    }

    pub fn notification_delivery_method(&self) -> Option<&str> {
        self.headers.get(subscription::SUBSCRIBE)
    }

    pub fn notification_client_token(&self) -> Option<&str> {
        self.headers.get(subscription::CLIENT_TOKEN)
    }

    pub fn last_subscription_headers(&self) -> Option<&SubscriptionHeaders> {
        self.last_subscription_headers.as_ref()
    }

    pub fn last_subscription(&self) -> Option<&Subscription> {
        self.last_subscription.as_ref()
    }

    pub fn media(&self) -> &MediaTransfer {
        &self.media
    }

    // --- building ----------------------------------------------------------

    /// Expands the URI template against the client's base URL.
    pub fn build_url(&self) -> String {
        uri::expand(self.client.base_url(), &self.uri_template, &self.params)
    }

    /// Builds the transport request for the single-shot path without
    /// executing it.
    ///
    /// Fails with [`Error::InvalidState`] while an uploader is attached —
    /// upload always bypasses this path. The method-override rewrite runs
    /// first, then content defaults (a bodyless POST gains a zero-length
    /// marker so `Content-Length: 0` is emitted), and the caller's headers
    /// are merged last so they win over anything set here.
    pub fn build_http_request(&self) -> Result<HttpRequest, Error> {
        if self.media.is_upload() {
            return Err(Error::InvalidState(
                "cannot build a direct request while a media uploader is attached".to_string(),
            ));
        }
        let (wire_method, mut headers) = method_override::apply(self.method, HeaderSet::new());
        // custom operations may use POST with no content but servers still
        // require a length header
        let content = match (&self.content, self.method) {
            (None, Method::Post) => Some(Content::Empty),
            (content, _) => content.clone(),
        };
        if let Some(content) = &content {
            headers.set_content_length(content.len());
            if let Some(media_type) = content.media_type() {
                headers.set_content_type(media_type);
            }
        }
        headers.merge_from(&self.headers);
        Ok(HttpRequest {
            method: wire_method,
            url: self.build_url(),
            headers,
            content,
            enable_gzip_content: !self.disable_gzip_content,
        })
    }

    // --- execution ---------------------------------------------------------

    /// Dispatches the request and returns the raw response.
    ///
    /// Status code, status message, and a response-header snapshot are
    /// recorded on the descriptor before the status decision, so they are
    /// observable even when this returns [`Error::HttpStatus`]. A
    /// subscribing descriptor with a callback additionally registers its
    /// subscription on success, also before the status decision.
    pub fn execute_unparsed(&mut self) -> Result<HttpResponse, Error> {
        let check_response_status = self.check_response_status;

        let response = if self.media.is_upload() {
            // upload path: current headers become the transfer's initiation
            // headers, and the uploader owns the chunk cycle
            let url = self.build_url();
            let initiation_headers = self.headers.clone();
            let MediaTransfer::Upload(uploader) = &mut self.media else {
                return Err(Error::InvalidState(
                    "media uploader detached mid-execution".to_string(),
                ));
            };
            tracing::debug!(%url, "dispatching media upload");
            uploader.set_initiation_headers(initiation_headers);
            uploader.upload(&url)?
        } else {
            let request = self.build_http_request()?;
            tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
            self.client
                .transport()
                .execute(request)
                .map_err(Error::Transport)?
        };

        self.last_status_code = i32::from(response.status);
        self.last_status_message = response.status_message.clone();
        self.last_response_headers = Some(response.headers.clone());

        if self.subscribing && response.is_success() {
            let subscription_headers = SubscriptionHeaders::from_headers(&response.headers);
            if let Some(callback) = &self.notification_callback {
                let client_token = subscription_headers
                    .client_token
                    .clone()
                    .or_else(|| self.notification_client_token().map(str::to_string))
                    .unwrap_or_default();
                let record = Subscription {
                    subscription_id: subscription_headers
                        .subscription_id
                        .clone()
                        .unwrap_or_default(),
                    client_token,
                    callback: callback.clone(),
                };
                self.client.subscription_store().store(record.clone());
                self.last_subscription = Some(record);
            }
            self.last_subscription_headers = Some(subscription_headers);
        }

        if check_response_status && !response.is_success() {
            tracing::warn!(status = response.status, "request completed with error status");
            return Err(match &self.http_error_hook {
                Some(hook) => hook(&response),
                None => Error::http_status(&response),
            });
        }
        Ok(response)
    }

    /// Dispatches the request and decodes the body as the declared result
    /// type. A [`NoContent`] declaration drops the body undecoded.
    pub fn execute(&mut self) -> Result<T, Error>
    where
        T: DeserializeOwned + 'static,
    {
        let response = self.execute_unparsed()?;
        if let Some(value) = no_content_value::<T>() {
            return Ok(value);
        }
        serde_json::from_slice(&response.body).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Dispatches the request and returns a reader over the response body.
    /// The caller owns the reader.
    pub fn execute_as_reader(&mut self) -> Result<io::Cursor<Vec<u8>>, Error> {
        Ok(self.execute_unparsed()?.into_reader())
    }

    /// Dispatches the request and writes the response body into `sink`.
    ///
    /// With a downloader attached, direct dispatch is bypassed entirely and
    /// the downloader runs its own chunked cycle against the expanded URL.
    /// Combining this with a notification callback is unsupported and fails
    /// before any network activity.
    pub fn download_to(&mut self, sink: &mut dyn Write) -> Result<(), Error> {
        if self.notification_callback.is_some() {
            return Err(Error::Unsupported(
                "streaming download with a notification callback is not supported".to_string(),
            ));
        }
        if self.media.is_download() {
            let url = self.build_url();
            let headers = self.headers.clone();
            let MediaTransfer::Download(downloader) = &mut self.media else {
                return Err(Error::InvalidState(
                    "media downloader detached mid-execution".to_string(),
                ));
            };
            tracing::debug!(%url, "dispatching media download");
            return downloader.download(&url, &headers, sink);
        }
        let response = self.execute_unparsed()?;
        sink.write_all(&response.body).map_err(Error::Io)
    }

    /// Builds the request and queues it into `container` for deferred,
    /// grouped dispatch. `E` is the type a non-success body decodes into.
    /// Combining this with a notification callback is unsupported and fails
    /// before the request is built.
    pub fn queue<E, C>(
        &mut self,
        container: &mut dyn BatchContainer,
        callback: C,
    ) -> Result<(), Error>
    where
        T: DeserializeOwned + 'static,
        E: DeserializeOwned + 'static,
        C: FnOnce(BatchOutcome<T, E>) + Send + 'static,
    {
        if self.notification_callback.is_some() {
            return Err(Error::Unsupported(
                "batch queueing with a notification callback is not supported".to_string(),
            ));
        }
        let request = self.build_http_request()?;
        container.queue(request, BatchHandler::new::<T, E, C>(callback));
        Ok(())
    }
}
