//! Dispatch targets: execution contexts a finished fetch can be redirected to.
//!
//! # Design
//! Transports call back on whatever thread they happen to run on. A caller
//! that needs its completion on a particular context (a UI-owning thread, a
//! specific runtime) hands the client an `Executor`; the client then submits
//! the completion as a job instead of calling it inline. No executor means
//! "run inline on the transport's thread".

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::{self, ThreadId};

use tokio::runtime::Handle;
use tracing::{error, warn};

/// A unit of work posted to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// An execution context that accepts jobs and runs them later.
///
/// `submit` must not run the job on the caller's stack.
pub trait Executor: Send + Sync {
    fn submit(&self, job: Job);
}

/// A dedicated named thread draining a FIFO queue of jobs.
///
/// Stands in for a UI thread's work queue: every job runs on the same thread,
/// in submission order. A panicking job is logged and does not take the
/// queue down. The thread exits once the executor is dropped and the queue
/// drains.
#[derive(Debug)]
pub struct QueueExecutor {
    name: String,
    sender: mpsc::Sender<Job>,
    thread_id: ThreadId,
}

impl QueueExecutor {
    pub fn spawn(name: impl Into<String>) -> std::io::Result<Self> {
        let name = name.into();
        let (sender, receiver) = mpsc::channel::<Job>();
        let queue_name = name.clone();
        let thread = thread::Builder::new().name(name.clone()).spawn(move || {
            while let Ok(job) = receiver.recv() {
                if catch_unwind(AssertUnwindSafe(job)).is_err() {
                    error!(queue = %queue_name, "dispatched job panicked");
                }
            }
        })?;
        Ok(Self {
            name,
            sender,
            thread_id: thread.thread().id(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the thread every job runs on.
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }
}

impl Executor for QueueExecutor {
    fn submit(&self, job: Job) {
        if self.sender.send(job).is_err() {
            warn!(queue = %self.name, "dispatch queue is gone; dropping job");
        }
    }
}

/// Posts jobs onto a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Executor for the runtime the caller is running in, if any.
    pub fn from_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Executor for TokioExecutor {
    fn submit(&self, job: Job) {
        self.handle.spawn(async move { job() });
    }
}
