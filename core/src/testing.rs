//! In-memory transport for tests.
//!
//! `MockTransport` records every request it is asked to send and keeps the
//! response handler parked until the test fires it with `complete`. Nothing
//! touches the network, and the handler runs on the thread that calls
//! `complete`, which lets a test choose where "the transport's thread" is.

use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, RequestHandle, ResponseHandler, Transport};

struct Call {
    request: HttpRequest,
    handle: RequestHandle,
    on_response: Option<ResponseHandler>,
}

/// A [`Transport`] driven by hand.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn calls(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.calls().iter().map(|call| call.request.clone()).collect()
    }

    /// The handles returned for each request, oldest first.
    pub fn handles(&self) -> Vec<RequestHandle> {
        self.calls().iter().map(|call| call.handle.clone()).collect()
    }

    /// Fire the response handler of request `index` on the current thread.
    ///
    /// Returns `false` if there is no such request or its handler has already
    /// fired.
    pub fn complete(
        &self,
        index: usize,
        payload: Option<Bytes>,
        response: Option<HttpResponse>,
        error: Option<TransportError>,
    ) -> bool {
        // Take the handler out before calling it so a completion that issues
        // another request does not deadlock on the call log.
        let taken = {
            let mut calls = self.calls();
            calls
                .get_mut(index)
                .and_then(|call| call.on_response.take().map(|h| (call.handle.clone(), h)))
        };
        match taken {
            Some((handle, on_response)) => {
                handle.mark_completed();
                on_response(payload, response, error);
                true
            }
            None => false,
        }
    }

    /// Fire the handler of the most recent request.
    pub fn complete_last(
        &self,
        payload: Option<Bytes>,
        response: Option<HttpResponse>,
        error: Option<TransportError>,
    ) -> bool {
        match self.call_count().checked_sub(1) {
            Some(index) => self.complete(index, payload, response, error),
            None => false,
        }
    }

    /// Shorthand for a response with `status` and a body.
    pub fn complete_with_body(&self, index: usize, status: u16, body: impl Into<Bytes>) -> bool {
        self.complete(
            index,
            Some(body.into()),
            Some(HttpResponse::with_status(status)),
            None,
        )
    }
}

impl Transport for MockTransport {
    fn get(&self, request: HttpRequest, on_response: ResponseHandler) -> RequestHandle {
        let handle = RequestHandle::new(request.url.clone());
        self.calls().push(Call {
            request,
            handle: handle.clone(),
            on_response: Some(on_response),
        });
        handle
    }
}
