//! HTTP transport seam: plain-data requests and responses, the per-request
//! handle, and the `Transport` trait.
//!
//! # Design
//! The client never touches sockets. It hands an `HttpRequest` and a
//! `ResponseHandler` to whatever `Transport` it was given and gets a
//! `RequestHandle` back synchronously. The transport later calls the handler
//! exactly once, from any thread it likes, with the raw pieces of the
//! exchange: payload bytes, response metadata and a transport error, each of
//! which may be absent. Production code plugs in
//! [`ReqwestTransport`](crate::ReqwestTransport); tests plug in
//! [`MockTransport`](crate::testing::MockTransport) and fire the handler by hand.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Notify;
use url::Url;
use uuid::Uuid;

use crate::error::TransportError;

/// An outbound GET described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

/// Response metadata handed to the response handler. The body travels
/// separately so a transport can report headers even when reading the body
/// fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl HttpResponse {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Callback a transport invokes once the exchange finishes.
pub type ResponseHandler =
    Box<dyn FnOnce(Option<Bytes>, Option<HttpResponse>, Option<TransportError>) + Send + 'static>;

/// Something that can issue a GET and report back through a
/// [`ResponseHandler`].
///
/// Implementations must return immediately with a handle in the
/// [`RequestState::Suspended`] state and must not perform the request until
/// [`RequestHandle::resume`] is called. The handler must be called at most
/// once.
pub trait Transport: Send + Sync {
    fn get(&self, request: HttpRequest, on_response: ResponseHandler) -> RequestHandle;
}

/// Lifecycle of a single request as seen through its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Created but not yet started.
    Suspended,
    /// Started; the transport owns it until the handler fires.
    Running,
    /// The transport has produced its result.
    Completed,
}

impl RequestState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => RequestState::Suspended,
            1 => RequestState::Running,
            _ => RequestState::Completed,
        }
    }
}

/// Handle to an in-flight request.
///
/// Clones share the same state. The client returns the transport's handle to
/// the caller untouched apart from resuming it, so tests can observe the
/// request's lifecycle.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    id: Uuid,
    url: Url,
    state: AtomicU8,
    start: Notify,
}

impl RequestHandle {
    pub fn new(url: Url) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id: Uuid::new_v4(),
                url,
                state: AtomicU8::new(RequestState::Suspended as u8),
                start: Notify::new(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    pub fn state(&self) -> RequestState {
        RequestState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    pub fn is_started(&self) -> bool {
        self.state() != RequestState::Suspended
    }

    pub fn is_completed(&self) -> bool {
        self.state() == RequestState::Completed
    }

    /// Start the request. Returns `false` if it was already started.
    pub fn resume(&self) -> bool {
        let swapped = self
            .inner
            .state
            .compare_exchange(
                RequestState::Suspended as u8,
                RequestState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if swapped {
            self.inner.start.notify_waiters();
        }
        swapped
    }

    /// Mark the request finished. Called by transports right before they
    /// invoke the response handler.
    pub fn mark_completed(&self) {
        self.inner
            .state
            .store(RequestState::Completed as u8, Ordering::Release);
    }

    /// Wait until [`resume`](Self::resume) has been called.
    pub async fn started(&self) {
        loop {
            // Registered on creation, so a resume between here and the
            // check below is not lost.
            let notified = self.inner.start.notified();
            if self.is_started() {
                return;
            }
            notified.await;
        }
    }
}
