//! Asynchronous client core for the dog listing API.
//!
//! # Overview
//! `DogClient::fetch_dogs` resolves `dogs` against the base URL, sends a GET
//! through an injected [`Transport`], classifies what comes back into an
//! [`Outcome`] and hands it to the caller's completion, optionally after
//! redirecting it onto a dispatch target ([`Executor`]).
//!
//! # Design
//! - The transport is a trait object shared with the caller. `ReqwestTransport`
//!   does real I/O; `testing::MockTransport` records requests and lets tests
//!   fire the response handler by hand.
//! - Classification is a pure function of `(payload, metadata, error)`. A
//!   transport error always wins. A non-200 or body-less response without one
//!   is `Outcome::Failure(None)`.
//! - Dispatch targets are plain executors: `QueueExecutor` (a dedicated
//!   thread, the stand-in for a UI queue) and `TokioExecutor`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod outcome;
pub mod testing;
pub mod transport;
pub mod types;

pub use client::{DogClient, DOGS_PATH};
pub use dispatch::{Executor, Job, QueueExecutor, TokioExecutor};
pub use error::{
    ClientError, DecodeError, DecodeErrorKind, FetchError, TransportError, TransportErrorKind,
    DECODE_ERROR_DOMAIN,
};
pub use http::{HttpRequest, HttpResponse, RequestHandle, RequestState, ResponseHandler, Transport};
pub use outcome::{classify_response, Outcome};
pub use transport::{ReqwestTransport, TransportConfig};
pub use types::{decode_dogs, Dog};
