//! The dog API client: resolves the endpoint, issues the GET through the
//! injected transport, classifies the response and delivers the outcome.
//!
//! # Design
//! `DogClient` holds only its base URL, the resolved `dogs` URL, a shared
//! transport and an optional dispatch target. Everything per-request lives in
//! the response handler's closure, so one client can serve any number of
//! concurrent fetches without locking. The handler is `FnOnce` and the
//! completion is moved into it, which makes "delivered exactly once" a
//! property of the types rather than of runtime bookkeeping.

use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::debug;
use url::Url;

use crate::dispatch::Executor;
use crate::error::ClientError;
use crate::http::{HttpRequest, RequestHandle, ResponseHandler, Transport};
use crate::outcome::{classify_response, Outcome};

/// Path of the dog collection, relative to the base URL.
pub const DOGS_PATH: &str = "dogs";

/// Client for the dog listing endpoint.
///
/// Read-only after construction; cloning is cheap and clones share the
/// transport and dispatch target.
#[derive(Clone)]
pub struct DogClient {
    base_url: Url,
    dogs_url: Url,
    transport: Arc<dyn Transport>,
    dispatch_target: Option<Arc<dyn Executor>>,
}

impl DogClient {
    /// Parse `base_url` and bind the client to `transport`.
    ///
    /// Relative resolution follows RFC 3986: keep the trailing slash on
    /// `http://host/api/v2/` or `dogs` replaces the `v2` segment.
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(parsed, transport)
    }

    pub fn from_url(base_url: Url, transport: Arc<dyn Transport>) -> Result<Self, ClientError> {
        let dogs_url = resolve_dogs_url(&base_url)?;
        Ok(Self {
            base_url,
            dogs_url,
            transport,
            dispatch_target: None,
        })
    }

    /// Deliver every completion through `target` instead of inline on the
    /// transport's thread.
    pub fn with_dispatch_target(mut self, target: Arc<dyn Executor>) -> Self {
        self.dispatch_target = Some(target);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The absolute URL every fetch is sent to.
    pub fn dogs_url(&self) -> &Url {
        &self.dogs_url
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn dispatch_target(&self) -> Option<&Arc<dyn Executor>> {
        self.dispatch_target.as_ref()
    }

    /// Fetch the dog collection.
    ///
    /// Returns as soon as the transport has accepted and started the request.
    /// `completion` runs exactly once: on the dispatch target if one is
    /// configured, otherwise on whatever thread the transport reports from.
    pub fn fetch_dogs<F>(&self, completion: F) -> RequestHandle
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let request = HttpRequest {
            url: self.dogs_url.clone(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        };

        let dispatch_target = self.dispatch_target.clone();
        let url = self.dogs_url.clone();
        let on_response: ResponseHandler = Box::new(move |payload, response, error| {
            let status = response.as_ref().map(|r| r.status);
            let outcome = classify_response(payload, response, error);
            debug!(%url, ?status, success = outcome.is_success(), "classified dog list response");
            deliver(dispatch_target.as_deref(), outcome, completion);
        });

        let handle = self.transport.get(request, on_response);
        debug!(request_id = %handle.id(), url = %self.dogs_url, "issuing dog list request");
        handle.resume();
        handle
    }

    /// Like [`fetch_dogs`](Self::fetch_dogs), but hands the outcome back
    /// through a one-shot channel.
    ///
    /// The receiver yields an error only if the transport drops the request
    /// without ever reporting back.
    pub fn fetch_dogs_deferred(&self) -> (RequestHandle, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let handle = self.fetch_dogs(move |outcome| {
            // The caller may have stopped listening.
            let _ = tx.send(outcome);
        });
        (handle, rx)
    }
}

impl fmt::Debug for DogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DogClient")
            .field("base_url", &self.base_url.as_str())
            .field("dogs_url", &self.dogs_url.as_str())
            .field("dispatch_target", &self.dispatch_target.is_some())
            .finish_non_exhaustive()
    }
}

fn resolve_dogs_url(base_url: &Url) -> Result<Url, ClientError> {
    if base_url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    base_url
        .join(DOGS_PATH)
        .map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })
}

fn deliver<F>(dispatch_target: Option<&dyn Executor>, outcome: Outcome, completion: F)
where
    F: FnOnce(Outcome) + Send + 'static,
{
    match dispatch_target {
        Some(target) => target.submit(Box::new(move || completion(outcome))),
        None => completion(outcome),
    }
}
