//! Behavior of `DogClient::fetch_dogs` against the in-memory transport.
//!
//! Every scenario drives the response handler by hand, so the exact
//! `(payload, metadata, error)` triple and the thread it arrives on are
//! under the test's control.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use dog_api_core::testing::MockTransport;
use dog_api_core::{
    decode_dogs, DogClient, Executor, FetchError, HttpResponse, Outcome, QueueExecutor,
    RequestState, TransportError, TransportErrorKind, DECODE_ERROR_DOMAIN,
};
use url::Url;

const BASE_URL: &str = "http://localhost:3000/api/v2/";
const DOGS: &[u8] = include_bytes!("../../test-vectors/dogs.json");
const MISSING_FIELD: &[u8] = include_bytes!("../../test-vectors/dogs_missing_field.json");
const TIMEOUT: Duration = Duration::from_secs(5);

fn setup() -> (Arc<MockTransport>, DogClient) {
    let transport = Arc::new(MockTransport::new());
    let client = DogClient::new(BASE_URL, transport.clone()).unwrap();
    (transport, client)
}

/// A completion that forwards the outcome and counts how often it ran.
fn capture() -> (
    impl FnOnce(Outcome) + Send + 'static,
    Receiver<Outcome>,
    Arc<AtomicUsize>,
) {
    let (tx, rx) = channel();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let completion = move |outcome: Outcome| {
        counter.fetch_add(1, Ordering::SeqCst);
        tx.send(outcome).unwrap();
    };
    (completion, rx, calls)
}

fn ok() -> Option<HttpResponse> {
    Some(HttpResponse::with_status(200))
}

// ---------------------------------------------------------------------------
// URL resolution
// ---------------------------------------------------------------------------

#[test]
fn request_url_is_standard_relative_resolution() {
    for base in [
        "http://localhost:3000/api/v2/",
        "http://localhost:3000/api/v2",
        "https://dogpatch.example.com/",
        "https://dogpatch.example.com:8443/a/b/c/",
    ] {
        let expected = Url::parse(base).unwrap().join("dogs").unwrap();

        let transport = Arc::new(MockTransport::new());
        let plain = DogClient::new(base, transport.clone()).unwrap();
        let queue = Arc::new(QueueExecutor::spawn("resolution").unwrap());
        let dispatched = DogClient::new(base, Arc::new(MockTransport::new()))
            .unwrap()
            .with_dispatch_target(queue);

        assert_eq!(plain.dogs_url(), &expected, "{base}");
        assert_eq!(dispatched.dogs_url(), &expected, "{base}");

        plain.fetch_dogs(|_| {});
        assert_eq!(transport.requests()[0].url, expected, "{base}");
    }
}

#[test]
fn resolves_documented_example() {
    let (_, client) = setup();
    assert_eq!(client.dogs_url().as_str(), "http://localhost:3000/api/v2/dogs");
}

// ---------------------------------------------------------------------------
// Request lifecycle
// ---------------------------------------------------------------------------

#[test]
fn fetch_starts_request_before_returning() {
    let (transport, client) = setup();
    let handle = client.fetch_dogs(|_| {});

    assert!(handle.is_started());
    assert_eq!(handle.state(), RequestState::Running);
    assert_eq!(transport.call_count(), 1);
    assert_eq!(transport.handles()[0].id(), handle.id());
    assert_eq!(handle.url(), client.dogs_url());
}

#[test]
fn handle_completes_when_transport_reports() {
    let (transport, client) = setup();
    let handle = client.fetch_dogs(|_| {});
    transport.complete_with_body(0, 200, Bytes::from_static(DOGS));
    assert_eq!(handle.state(), RequestState::Completed);
}

#[test]
fn completion_does_not_run_before_transport_reports() {
    let (transport, client) = setup();
    let (completion, rx, calls) = capture();
    client.fetch_dogs(completion);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(rx.try_recv().is_err());

    transport.complete_with_body(0, 200, Bytes::from_static(DOGS));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn server_error_delivers_no_collection_and_no_error() {
    let (transport, client) = setup();
    let (completion, rx, calls) = capture();
    client.fetch_dogs(completion);

    transport.complete(0, None, Some(HttpResponse::with_status(500)), None);

    let (dogs, error) = rx.recv_timeout(TIMEOUT).unwrap().into_parts();
    assert!(dogs.is_none());
    assert!(error.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn transport_error_is_delivered_unchanged() {
    let (transport, client) = setup();
    let (completion, rx, calls) = capture();
    client.fetch_dogs(completion);

    let sent = TransportError::new(TransportErrorKind::Connect, "network unreachable");
    transport.complete(0, None, ok(), Some(sent.clone()));

    let (dogs, error) = rx.recv_timeout(TIMEOUT).unwrap().into_parts();
    assert!(dogs.is_none());
    assert_eq!(error, Some(FetchError::Transport(sent)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn valid_payload_delivers_decoded_dogs() {
    let (transport, client) = setup();
    let (completion, rx, calls) = capture();
    client.fetch_dogs(completion);

    transport.complete(0, Some(Bytes::from_static(DOGS)), ok(), None);

    let (dogs, error) = rx.recv_timeout(TIMEOUT).unwrap().into_parts();
    assert_eq!(dogs, Some(decode_dogs(DOGS).unwrap()));
    assert_eq!(dogs.map(|d| d.len()), Some(2));
    assert!(error.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_field_delivers_decode_error() {
    let (transport, client) = setup();
    let (completion, rx, calls) = capture();
    client.fetch_dogs(completion);

    transport.complete(0, Some(Bytes::from_static(MISSING_FIELD)), ok(), None);

    let (dogs, error) = rx.recv_timeout(TIMEOUT).unwrap().into_parts();
    assert!(dogs.is_none());
    let delivered = error.as_ref().and_then(FetchError::as_decode).unwrap();
    let direct = decode_dogs(MISSING_FIELD).unwrap_err();
    assert_eq!(delivered.domain(), direct.domain());
    assert_eq!(delivered.domain(), DECODE_ERROR_DOMAIN);
    assert_eq!(delivered.code(), direct.code());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn repeated_fetches_decode_identically() {
    let (transport, client) = setup();
    let (first, first_rx, _) = capture();
    let (second, second_rx, _) = capture();
    client.fetch_dogs(first);
    client.fetch_dogs(second);

    transport.complete(0, Some(Bytes::from_static(DOGS)), ok(), None);
    transport.complete(1, Some(Bytes::from_static(DOGS)), ok(), None);

    let first = first_rx.recv_timeout(TIMEOUT).unwrap();
    let second = second_rx.recv_timeout(TIMEOUT).unwrap();
    assert!(first.is_success());
    assert_eq!(first, second);
}

#[test]
fn concurrent_fetches_do_not_interfere() {
    let (transport, client) = setup();
    let (first, first_rx, _) = capture();
    let (second, second_rx, _) = capture();
    client.fetch_dogs(first);
    client.fetch_dogs(second);

    // Answer out of order.
    transport.complete(1, None, Some(HttpResponse::with_status(404)), None);
    transport.complete(0, Some(Bytes::from_static(DOGS)), ok(), None);

    assert!(first_rx.recv_timeout(TIMEOUT).unwrap().is_success());
    assert_eq!(second_rx.recv_timeout(TIMEOUT).unwrap(), Outcome::Failure(None));
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn without_dispatch_target_completion_runs_inline_on_transport_thread() {
    let (transport, client) = setup();
    let (tx, rx) = channel();
    client.fetch_dogs(move |outcome| {
        tx.send((thread::current().id(), outcome)).unwrap();
    });

    let worker = thread::Builder::new()
        .name("transport-worker".to_string())
        .spawn(move || {
            transport.complete(0, Some(Bytes::from_static(DOGS)), ok(), None);
            // Inline delivery means the outcome is already there.
            rx.try_recv().unwrap()
        })
        .unwrap();
    let worker_id = worker.thread().id();

    let (ran_on, outcome) = worker.join().unwrap();
    assert_eq!(ran_on, worker_id);
    assert!(outcome.is_success());
}

#[test]
fn with_dispatch_target_completion_runs_on_target() {
    let transport = Arc::new(MockTransport::new());
    let queue = Arc::new(QueueExecutor::spawn("ui-queue").unwrap());
    let client = DogClient::new(BASE_URL, transport.clone())
        .unwrap()
        .with_dispatch_target(queue.clone());

    let (tx, rx) = channel();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    client.fetch_dogs(move |outcome| {
        counter.fetch_add(1, Ordering::SeqCst);
        tx.send((thread::current().id(), outcome)).unwrap();
    });

    let worker = thread::Builder::new()
        .name("transport-worker".to_string())
        .spawn(move || {
            transport.complete(0, None, Some(HttpResponse::with_status(500)), None);
        })
        .unwrap();
    let worker_id = worker.thread().id();
    worker.join().unwrap();

    let (ran_on, outcome) = rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(ran_on, queue.thread_id());
    assert_ne!(ran_on, worker_id);
    assert_eq!(outcome, Outcome::Failure(None));

    // Drain the queue before checking nothing else was delivered.
    let (done_tx, done_rx) = channel();
    queue.submit(Box::new(move || done_tx.send(()).unwrap()));
    done_rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn dispatch_target_is_used_even_when_reporting_from_the_test_thread() {
    let transport = Arc::new(MockTransport::new());
    let queue = Arc::new(QueueExecutor::spawn("ui-queue").unwrap());
    let client = DogClient::new(BASE_URL, transport.clone())
        .unwrap()
        .with_dispatch_target(queue.clone());

    let (tx, rx) = channel();
    client.fetch_dogs(move |_| tx.send(thread::current().id()).unwrap());
    transport.complete(0, Some(Bytes::from_static(DOGS)), ok(), None);

    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), queue.thread_id());
}

// ---------------------------------------------------------------------------
// Deferred
// ---------------------------------------------------------------------------

#[test]
fn deferred_fetch_yields_outcome_through_channel() {
    let (transport, client) = setup();
    let (handle, rx) = client.fetch_dogs_deferred();
    assert!(handle.is_started());

    transport.complete(0, Some(Bytes::from_static(DOGS)), ok(), None);

    let outcome = rx.blocking_recv().unwrap();
    assert_eq!(outcome.collection().map(<[_]>::len), Some(2));
}

#[test]
fn deferred_fetch_errors_when_transport_drops_request() {
    let transport = MockTransport::new();
    let client = DogClient::new(BASE_URL, Arc::new(transport)).unwrap();
    let (_, rx) = client.fetch_dogs_deferred();
    // Dropping the client drops the only transport and its parked handler.
    drop(client);
    assert!(rx.blocking_recv().is_err());
}
