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

//! HTTP listener.
//!
//! A listener binds a socket and runs a poll loop on a dedicated thread,
//! which accepts connections, parses requests and writes responses. Parsed
//! requests are processed on a pool of worker threads, so slow handlers never
//! block the poll loop or other connections. Requests on a connection are
//! processed strictly one after another.

use crossbeam::channel::unbounded;
use mio::{Interest, Waker};
use slab::Slab;
use std::mem;
use std::net::{SocketAddr, ToSocketAddrs};
use std::result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

use crate::http::HandlerError;

mod accept;
mod builder;
mod connection;
mod error;
mod event;
mod poller;
mod reactor;
mod signal;
mod transport;
mod worker;

pub use accept::PendingAccepts;
pub use builder::{Builder, DEFAULT_IDLE_TIMEOUT};
pub use connection::CONTINUE_REASON;
pub use error::{Error, Result};
pub use event::{ContinueEvent, ErrorPageEvent, ExceptionEvent, Peer};
pub use event::RequestEvent;
pub use signal::Signals;
pub(crate) use signal::panic_message;
pub use transport::{Plain, Stream, Transport};

use poller::{ACCEPTOR, Poller};
use reactor::Reactor;
use worker::WorkerPool;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Listener state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    /// Listener was created, but not started.
    Created,
    /// Listener was started, but no accept is outstanding.
    Started,
    /// Listener is accepting, with the given number of pending accepts.
    Accepting(usize),
    /// Listener was stopped, but is still draining.
    ShuttingDown,
    /// Listener was stopped and drained.
    Stopped,
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP listener.
///
/// Observers are registered before the listener is started. Once started,
/// observer lists are frozen, and registering further observers fails with
/// [`Error::AlreadyStarted`]. Without any request observer, every request is
/// answered with an empty `200 OK` response.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use std::time::Duration;
/// use webserver::http::Status;
/// use webserver::listener::Listener;
///
/// // Create listener and answer all requests
/// let mut listener = Listener::new("127.0.0.1:0")?;
/// listener.on_request(|event| {
///     event.response.set_status(Status::NoContent);
///     Ok(())
/// })?;
///
/// // Start and stop listener
/// listener.start(16)?;
/// listener.stop()?;
/// assert!(listener.wait(Duration::from_secs(5)));
/// # Ok(())
/// # }
/// ```
pub struct Listener {
    /// Socket address to bind to.
    addr: SocketAddr,
    /// Connection transport.
    transport: Arc<dyn Transport>,
    /// Number of worker threads.
    workers: usize,
    /// Idle timeout of connections.
    idle_timeout: Duration,
    /// Whether error messages are sent to clients.
    expose_errors: bool,
    /// Observers, until the listener is started.
    signals: Signals,
    /// Running state, once the listener is started.
    running: Option<Running>,
}

/// Running state of a listener.
struct Running {
    /// Shared listener state.
    shared: Arc<Shared>,
    /// Waker of the poll loop.
    waker: Arc<Waker>,
    /// Address of the listening socket.
    local_addr: SocketAddr,
    /// Poll loop thread.
    thread: JoinHandle<()>,
}

/// State shared between the listener, its poll loop and workers.
pub(crate) struct Shared {
    /// Frozen observers.
    pub signals: Signals,
    /// Pending accept registrations.
    pub pending: PendingAccepts,
    /// Whether the listener is shutting down.
    pub shutting_down: AtomicBool,
    /// Whether connections are encrypted.
    pub secure: bool,
    /// Whether error messages are sent to clients.
    pub expose_errors: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Listener {
    /// Creates a listener with default settings.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::NoAddress`], if the address can't be
    /// resolved to any socket address.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use webserver::listener::Listener;
    ///
    /// // Create listener
    /// let listener = Listener::new("127.0.0.1:8080")?;
    /// assert!(!listener.is_started());
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn new<A>(addr: A) -> Result<Self>
    where
        A: ToSocketAddrs,
    {
        Builder::new(addr).map(Builder::build)
    }

    /// Creates a listener builder.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::NoAddress`], if the address can't be
    /// resolved to any socket address.
    #[inline]
    pub fn builder<A>(addr: A) -> Result<Builder>
    where
        A: ToSocketAddrs,
    {
        Builder::new(addr)
    }

    /// Registers an observer for unexpected failures.
    pub fn on_exception<F>(&mut self, f: F) -> Result
    where
        F: Fn(&ExceptionEvent) + Send + Sync + 'static,
    {
        self.ensure_created()?;
        self.signals.exception.push(Box::new(f));
        Ok(())
    }

    /// Registers an observer for received requests.
    ///
    /// Observers run in registration order, and the first error stops the
    /// chain. An observer that sets [`RequestEvent::handled`] takes over
    /// sending the response.
    pub fn on_request<F>(&mut self, f: F) -> Result
    where
        F: Fn(&mut RequestEvent) -> result::Result<(), HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.ensure_created()?;
        self.signals.request.push(Box::new(f));
        Ok(())
    }

    /// Registers an observer for error pages.
    pub fn on_error_page<F>(&mut self, f: F) -> Result
    where
        F: Fn(&mut ErrorPageEvent) + Send + Sync + 'static,
    {
        self.ensure_created()?;
        self.signals.error_page.push(Box::new(f));
        Ok(())
    }

    /// Registers an observer for requests expecting `100 Continue`.
    ///
    /// Observers may change the status of the interim response, in which
    /// case it's sent as the final response and the connection is closed.
    pub fn on_continue<F>(&mut self, f: F) -> Result
    where
        F: Fn(&mut ContinueEvent) + Send + Sync + 'static,
    {
        self.ensure_created()?;
        self.signals.continue_.push(Box::new(f));
        Ok(())
    }

    /// Registers an observer deciding whether accepted sockets are admitted.
    ///
    /// All observers must approve a socket, or it's closed right away.
    pub fn on_socket_accepted<F>(&mut self, f: F) -> Result
    where
        F: Fn(&SocketAddr) -> bool + Send + Sync + 'static,
    {
        self.ensure_created()?;
        self.signals.admission.push(Box::new(f));
        Ok(())
    }

    /// Starts the listener.
    ///
    /// The socket is bound and the first accept is armed before this method
    /// returns, so the listener accepts connections once it returned. The
    /// backlog bounds the number of connections accepted per readiness
    /// notification of the listening socket.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the listener was
    /// already started, [`Error::Bind`], if the socket can't be bound, and
    /// [`Error::Io`] if the poll loop or workers can't be set up.
    pub fn start(&mut self, backlog: usize) -> Result {
        self.ensure_created()?;

        // Bind socket synchronously, so errors surface to the caller
        let addr = self.addr;
        let mut acceptor = self
            .transport
            .bind(addr)
            .map_err(|source| Error::Bind { addr, source })?;
        let local_addr = acceptor.local_addr()?;

        // Register listening socket with the poller
        let poller = Poller::new()?;
        poller.register(&mut acceptor, ACCEPTOR, Interest::READABLE)?;
        let waker = poller.waker();

        // Freeze observers and arm the first accept
        let shared = Arc::new(Shared {
            signals: mem::take(&mut self.signals),
            pending: PendingAccepts::new(),
            shutting_down: AtomicBool::new(false),
            secure: self.transport.is_secure(),
            expose_errors: self.expose_errors,
        });
        shared.pending.issue();

        // Create worker pool and hand everything to the poll loop
        let (sender, completions) = unbounded();
        let pool = WorkerPool::new(self.workers, &shared, &sender, &waker)?;
        let reactor = Reactor {
            shared: Arc::clone(&shared),
            transport: Arc::clone(&self.transport),
            poller,
            acceptor: Some(acceptor),
            local_addr,
            backlog,
            idle_timeout: self.idle_timeout,
            pool,
            completions,
            connections: Slab::new(),
        };
        let thread = thread::Builder::new()
            .name(format!("webserver-listener-{}", local_addr.port()))
            .spawn(move || reactor.run())?;

        // Keep sender alive only within workers
        drop(sender);
        info!(%local_addr, "Listening");
        self.running = Some(Running { shared, waker, local_addr, thread });
        Ok(())
    }

    /// Stops the listener.
    ///
    /// The outstanding accept is cancelled and the listening socket closed.
    /// Live connections are served until they close on their own or time out.
    /// Stopping a stopped listener has no effect.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::NotStarted`], if the listener was never
    /// started, and [`Error::Io`] if the poll loop can't be woken.
    pub fn stop(&self) -> Result {
        let running = self.running.as_ref().ok_or(Error::NotStarted)?;
        if !running.shared.shutting_down.swap(true, Ordering::AcqRel) {
            info!(local_addr = %running.local_addr, "Shutting down");
            running.waker.wake()?;
        }
        Ok(())
    }

    /// Waits until no accepts are pending, returning whether that happened
    /// within the given timeout.
    #[must_use]
    pub fn wait(&self, timeout: Duration) -> bool {
        self.running
            .as_ref()
            .is_none_or(|running| running.shared.pending.wait(timeout))
    }

    /// Returns the listener state.
    #[must_use]
    pub fn state(&self) -> ListenerState {
        let Some(running) = &self.running else {
            return ListenerState::Created;
        };
        let pending = running.shared.pending.get();
        if running.shared.is_shutting_down() {
            if pending == 0 && running.thread.is_finished() {
                ListenerState::Stopped
            } else {
                ListenerState::ShuttingDown
            }
        } else if pending == 0 {
            ListenerState::Started
        } else {
            ListenerState::Accepting(pending)
        }
    }

    /// Ensures the listener was not started yet.
    fn ensure_created(&self) -> Result {
        if self.running.is_some() {
            return Err(Error::AlreadyStarted);
        }
        Ok(())
    }
}

#[allow(clippy::must_use_candidate)]
impl Listener {
    /// Returns the number of pending accepts.
    #[inline]
    pub fn pending_accepts(&self) -> usize {
        self.running
            .as_ref()
            .map_or(0, |running| running.shared.pending.get())
    }

    /// Returns the address of the listening socket, once started.
    ///
    /// If the listener was bound to port `0`, this is the assigned port.
    #[inline]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.local_addr)
    }

    /// Returns whether the listener was started.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.running.is_some()
    }

    /// Returns whether connections are encrypted.
    #[inline]
    pub fn is_secure(&self) -> bool {
        self.transport.is_secure()
    }
}

// ----------------------------------------------------------------------------

impl Shared {
    /// Returns whether the listener is shutting down.
    #[inline]
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Drop for Listener {
    /// Stops the listener, leaving live connections to finish.
    fn drop(&mut self) {
        if self.is_started() {
            if let Err(err) = self.stop() {
                warn!(%err, "Failed to stop listener");
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    impl Listener {
        /// Returns whether the listener is shutting down (test-only).
        fn is_shutting_down(&self) -> bool {
            self.running
                .as_ref()
                .is_some_and(|running| running.shared.is_shutting_down())
        }
    }

    #[test]
    fn test_start_resolves_port() -> Result {
        let mut listener = Listener::new("127.0.0.1:0")?;
        assert_eq!(listener.state(), ListenerState::Created);
        listener.start(8)?;
        let addr = listener.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(listener.pending_accepts(), 1);
        listener.stop()?;
        assert!(listener.wait(Duration::from_secs(5)));
        assert_eq!(listener.pending_accepts(), 0);
        Ok(())
    }

    #[test]
    fn test_start_twice() -> Result {
        let mut listener = Listener::new("127.0.0.1:0")?;
        listener.start(8)?;
        assert!(matches!(listener.start(8), Err(Error::AlreadyStarted)));
        assert!(matches!(
            listener.on_request(|_| Ok(())),
            Err(Error::AlreadyStarted)
        ));
        Ok(())
    }

    #[test]
    fn test_stop_before_start() -> Result {
        let listener = Listener::new("127.0.0.1:0")?;
        assert!(matches!(listener.stop(), Err(Error::NotStarted)));
        assert!(listener.wait(Duration::ZERO));
        Ok(())
    }

    #[test]
    fn test_bind_error() -> Result {
        let taken = std::net::TcpListener::bind("127.0.0.1:0")?;
        let mut listener = Listener::new(taken.local_addr()?)?;
        assert!(matches!(listener.start(8), Err(Error::Bind { .. })));
        assert!(!listener.is_started());
        Ok(())
    }

    #[test]
    fn test_admission_rejects() -> Result {
        let mut listener = Listener::new("127.0.0.1:0")?;
        listener.on_socket_accepted(|_| false)?;
        listener.start(8)?;
        let addr = listener.local_addr().unwrap();

        // Rejected sockets are closed without a response
        let mut client = TcpStream::connect(addr)?;
        client.set_read_timeout(Some(Duration::from_secs(5)))?;
        let _ = client.write_all(b"GET / HTTP/1.1\r\n\r\n");
        let mut buf = Vec::new();
        let _ = client.read_to_end(&mut buf);
        assert!(buf.is_empty());

        // A new accept is armed after every completion
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while listener.pending_accepts() != 1 {
            assert!(std::time::Instant::now() < deadline);
            thread::sleep(Duration::from_millis(10));
        }
        Ok(())
    }

    #[test]
    fn test_stop_after_mixed_admission() -> Result {
        let mut listener = Listener::new("127.0.0.1:0")?;
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        listener.on_socket_accepted(move |_| {
            counter.fetch_add(1, Ordering::AcqRel) % 2 == 0
        })?;
        listener.start(8)?;
        let addr = listener.local_addr().unwrap();

        // Every other socket is admitted, and the rest are closed
        let mut clients = Vec::new();
        for _ in 0..4 {
            clients.push(TcpStream::connect(addr)?);
        }
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while seen.load(Ordering::Acquire) < 4 {
            assert!(std::time::Instant::now() < deadline);
            thread::sleep(Duration::from_millis(10));
        }

        // Stopping drains the outstanding accept, even with live connections
        listener.stop()?;
        assert!(listener.wait(Duration::from_secs(5)));
        assert_eq!(listener.pending_accepts(), 0);
        assert!(listener.is_shutting_down());
        drop(clients);
        Ok(())
    }
}
