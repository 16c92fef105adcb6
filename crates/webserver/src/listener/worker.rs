// Copyright (c) 2025 Zensical and contributors

// SPDX-License-Identifier: MIT
// Third-party contributions licensed under DCO

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NON-INFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

// ----------------------------------------------------------------------------

//! Worker pool for request processing.

use crossbeam::channel::{unbounded, Receiver, Sender};
use mio::Waker;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, warn};

use crate::http::{HandlerError, ResponseExt, Status};
use crate::http::Response;

use super::event::{ExceptionEvent, RequestEvent};
use super::signal::panic_message;
use super::Shared;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Request handed to a worker.
#[derive(Debug)]
pub struct Job {
    /// Slab index of the connection.
    pub token: usize,
    /// Connection identifier.
    pub id: u64,
    /// Request event.
    pub event: RequestEvent,
}

/// Serialized response handed back to the poll loop.
#[derive(Debug)]
pub struct Completion {
    /// Slab index of the connection.
    pub token: usize,
    /// Connection identifier.
    pub id: u64,
    /// Serialized response.
    pub bytes: Vec<u8>,
    /// Whether to close the connection after writing.
    pub close: bool,
}

/// Worker pool.
///
/// Workers receive jobs over a shared channel, process them and send the
/// serialized response back, waking the poll loop. Dropping the pool closes
/// the channel and joins all workers after they finished their current job.
pub struct WorkerPool {
    /// Job sender.
    sender: Option<Sender<Job>>,
    /// Worker threads.
    handles: Vec<JoinHandle<()>>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl WorkerPool {
    /// Creates a worker pool with the given number of workers.
    pub fn new(
        size: usize, shared: &Arc<Shared>, completions: &Sender<Completion>,
        waker: &Arc<Waker>,
    ) -> io::Result<Self> {
        let (sender, receiver) = unbounded::<Job>();
        let handles = (0..size.max(1))
            .map(|n| {
                let worker = Worker {
                    shared: Arc::clone(shared),
                    jobs: receiver.clone(),
                    completions: completions.clone(),
                    waker: Arc::clone(waker),
                };
                thread::Builder::new()
                    .name(format!("webserver-worker-{n}"))
                    .spawn(move || worker.run())
            })
            .collect::<io::Result<_>>()?;
        Ok(Self { sender: Some(sender), handles })
    }

    /// Submits a job, returning whether a worker can still receive it.
    pub fn submit(&self, job: Job) -> bool {
        self.sender
            .as_ref()
            .is_some_and(|sender| sender.send(job).is_ok())
    }
}

// ----------------------------------------------------------------------------

/// Worker.
struct Worker {
    /// Shared listener state.
    shared: Arc<Shared>,
    /// Job receiver.
    jobs: Receiver<Job>,
    /// Completion sender.
    completions: Sender<Completion>,
    /// Waker of the poll loop.
    waker: Arc<Waker>,
}

impl Worker {
    /// Processes jobs until the channel is closed.
    fn run(self) {
        for job in &self.jobs {
            let (bytes, close) = dispatch(&self.shared, job.event);
            let completion = Completion {
                token: job.token,
                id: job.id,
                bytes,
                close,
            };

            // The poll loop is gone once the receiver is dropped
            if self.completions.send(completion).is_err() {
                break;
            }
            if let Err(err) = self.waker.wake() {
                warn!(%err, "Failed to wake poll loop");
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Drop for WorkerPool {
    /// Closes the job channel and joins all workers.
    fn drop(&mut self) {
        drop(self.sender.take());
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("Worker panicked");
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Processes a request event, returning the output and whether to close.
///
/// Request observers run first. If none of them handled the event, the
/// prepared response is sent as is. Protocol errors are answered with an
/// error page, and all other errors, including panics, are reported to
/// exception observers and answered with `500 Internal Server Error`.
pub fn dispatch(shared: &Shared, mut event: RequestEvent) -> (Vec<u8>, bool) {
    let res = panic::catch_unwind(AssertUnwindSafe(|| {
        shared.signals.raise_request(&mut event)
    }));
    let res = res.unwrap_or_else(|payload| {
        Err(HandlerError::other(panic_message(&*payload)))
    });

    // Send response, unless an observer took over
    let res = match res {
        Ok(()) if event.handled => Ok(()),
        Ok(()) => event.send(),
        Err(HandlerError::Protocol(err)) => {
            shared.signals.render_error_page(
                &event.peer,
                Some(&event.request),
                &mut event.response,
                &err,
            );
            event.send()
        }
        Err(err) => {
            error!(path = %event.request.uri.path, %err, "Request failed");
            shared.signals.raise_exception(&ExceptionEvent {
                peer: Some(&event.peer),
                error: &err,
            });
            let mut response = Response::for_request(&event.request)
                .status(Status::InternalServerError);
            if shared.expose_errors {
                response = response.text(err.to_string());
            }
            event.response = response;
            event.send()
        }
    };
    if let Err(err) = res {
        warn!(%err, "Failed to serialize response");
        event.close();
    }
    event.into_output()
}
