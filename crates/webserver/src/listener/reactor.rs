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

//! Poll loop of a listener.

use crossbeam::channel::Receiver;
use mio::net::{TcpListener, TcpStream};
use mio::{Interest, Token};
use slab::Slab;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace, warn};

use crate::http::HandlerError;

use super::connection::Connection;
use super::event::{ExceptionEvent, Peer};
use super::poller::{Poller, Ready};
use super::transport::Transport;
use super::worker::{Completion, Job, WorkerPool};
use super::Shared;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Interval in which idle connections are checked.
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Poll loop of a listener.
///
/// Owns the listening socket and all connections. The loop accepts sockets,
/// reads and parses requests, hands them to the worker pool, and writes the
/// responses it receives back. It runs until the listener is stopped and
/// the last connection has closed.
pub struct Reactor {
    /// Shared listener state.
    pub shared: Arc<Shared>,
    /// Connection transport.
    pub transport: Arc<dyn Transport>,
    /// Poller for I/O events.
    pub poller: Poller,
    /// Listening socket, until shutdown.
    pub acceptor: Option<TcpListener>,
    /// Address of the listening socket.
    pub local_addr: SocketAddr,
    /// Maximum number of accepts per readiness event.
    pub backlog: usize,
    /// Idle timeout of connections.
    pub idle_timeout: Duration,
    /// Worker pool.
    pub pool: WorkerPool,
    /// Completions sent by workers.
    pub completions: Receiver<Completion>,
    /// HTTP connections.
    pub connections: Slab<Connection>,
}

/// Poll loop state that is not shared with the constructor.
#[derive(Debug, Default)]
struct Cursor {
    /// Whether an accept is armed on the listening socket.
    armed: bool,
    /// Whether more sockets might be waiting to be accepted.
    backlogged: bool,
    /// Next connection identifier.
    next_id: u64,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Reactor {
    /// Runs the poll loop.
    ///
    /// The first accept is armed by the listener before the loop is started,
    /// so its registration is already counted.
    pub fn run(mut self) {
        let mut cursor = Cursor { armed: true, ..Default::default() };
        let mut swept = Instant::now();
        loop {
            // Poll without blocking if accepts were left over
            let timeout = if cursor.backlogged {
                Duration::ZERO
            } else {
                SWEEP_INTERVAL
            };
            let events = match self.poller.poll(timeout) {
                Ok(events) => events,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    error!(%err, "Polling failed");
                    break;
                }
            };

            // Handle events
            for ready in events {
                match ready {
                    Ready::Accept => self.accept(&mut cursor),
                    Ready::Wake => {}
                    Ready::Connection { slot, readable } => {
                        self.ready(slot, readable);
                    }
                }
            }
            if cursor.backlogged {
                self.accept(&mut cursor);
            }
            self.complete();

            // Cancel the outstanding accept and close the listening socket
            if self.shared.is_shutting_down() {
                self.shutdown(&mut cursor);
                if self.connections.is_empty() {
                    break;
                }
            }

            // Drop connections that have been idle for too long
            let now = Instant::now();
            if now.duration_since(swept) >= SWEEP_INTERVAL {
                swept = now;
                self.sweep(now);
            }
        }
        debug!(local_addr = %self.local_addr, "Listener stopped");
    }

    /// Accepts pending sockets, up to the backlog.
    fn accept(&mut self, cursor: &mut Cursor) {
        cursor.backlogged = false;
        for _ in 0..self.backlog.max(1) {
            let Some(acceptor) = &self.acceptor else {
                return;
            };
            let res = acceptor.accept();
            if matches!(&res, Err(err) if err.kind() == ErrorKind::WouldBlock)
            {
                return;
            }

            // The outstanding accept completed, so release it
            self.shared.pending.complete();
            cursor.armed = false;
            match res {
                Ok((stream, addr)) => self.admit(cursor, stream, addr),
                Err(err) => warn!(%err, "Accept failed"),
            }

            // Arm the next accept, unless shutting down
            if self.shared.is_shutting_down() {
                return;
            }
            self.shared.pending.issue();
            cursor.armed = true;
        }

        // Sockets might still be waiting, but we'll get no further event
        cursor.backlogged = true;
    }

    /// Admits an accepted socket.
    fn admit(
        &mut self, cursor: &mut Cursor, stream: TcpStream, addr: SocketAddr,
    ) {
        if !self.shared.signals.admit(&addr) {
            debug!(remote_addr = %addr, "Connection rejected");
            return;
        }
        let _ = stream.set_nodelay(true);
        let local_addr = stream.local_addr().unwrap_or(self.local_addr);
        let peer = Peer {
            remote_addr: addr,
            local_addr,
            secure: self.shared.secure,
        };

        // Wrap socket and register connection with the poller
        let entry = self.connections.vacant_entry();
        let token = Token(entry.key());
        let res = self.transport.wrap(stream).and_then(|stream| {
            let mut conn = Connection::new(cursor.next_id, stream, peer);
            self.poller
                .register(
                    conn.stream(),
                    token,
                    Interest::READABLE | Interest::WRITABLE,
                )
                .map(|()| conn)
        });
        match res {
            Ok(conn) => {
                cursor.next_id += 1;
                entry.insert(conn);
                trace!(remote_addr = %addr, "Connection accepted");
            }
            Err(err) => {
                warn!(remote_addr = %addr, %err, "Connection setup failed");
                let err = HandlerError::from(err);
                self.shared.signals.raise_exception(&ExceptionEvent {
                    peer: Some(&peer),
                    error: &err,
                });
            }
        }
    }

    /// Handles readiness of a connection.
    fn ready(&mut self, n: usize, readable: bool) {
        let Some(conn) = self.connections.get_mut(n) else {
            return;
        };
        if readable {
            if let Err(err) = conn.read() {
                if !is_disconnect(err.kind()) {
                    warn!(%err, "Read failed");
                }
                self.remove(n);
                return;
            }
        }
        self.drive(n);
    }

    /// Advances a connection, dispatching requests and writing output.
    fn drive(&mut self, n: usize) {
        let Some(conn) = self.connections.get_mut(n) else {
            return;
        };
        if let Some(event) = conn.next(&self.shared.signals) {
            let job = Job { token: n, id: conn.id(), event };
            if !self.pool.submit(job) {
                error!("Worker pool is gone");
                self.remove(n);
                return;
            }
        }

        // Write as much as possible, and drop finished connections
        match conn.flush() {
            Ok(()) if conn.is_finished() => self.remove(n),
            Ok(()) => {}
            Err(err) => {
                if !is_disconnect(err.kind()) {
                    warn!(%err, "Write failed");
                }
                self.remove(n);
            }
        }
    }

    /// Queues responses finished by workers.
    fn complete(&mut self) {
        while let Ok(completion) = self.completions.try_recv() {
            let n = completion.token;
            match self.connections.get_mut(n) {
                Some(conn) if conn.id() == completion.id => {
                    conn.complete(completion.bytes, completion.close);
                    self.drive(n);
                }
                _ => trace!("Connection closed before response"),
            }
        }
    }

    /// Cancels the outstanding accept and closes the listening socket.
    fn shutdown(&mut self, cursor: &mut Cursor) {
        if let Some(mut acceptor) = self.acceptor.take() {
            if let Err(err) = self.poller.deregister(&mut acceptor) {
                warn!(%err, "Failed to deregister listening socket");
            }
            debug!(local_addr = %self.local_addr, "Listening socket closed");
        }
        if cursor.armed {
            cursor.armed = false;
            self.shared.pending.complete();
        }
        cursor.backlogged = false;
    }

    /// Drops connections that have been idle for too long.
    fn sweep(&mut self, now: Instant) {
        let timed_out: Vec<_> = self
            .connections
            .iter()
            .filter(|(_, conn)| conn.is_timed_out(now, self.idle_timeout))
            .map(|(n, _)| n)
            .collect();
        for n in timed_out {
            trace!("Connection timed out");
            self.remove(n);
        }
    }

    /// Removes a connection and deregisters it from the poller.
    fn remove(&mut self, n: usize) {
        if let Some(mut conn) = self.connections.try_remove(n) {
            let _ = self.poller.deregister(conn.stream());
            trace!(id = conn.id(), "Connection closed");
        }
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns whether the error is an expected disconnect.
fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
            | ErrorKind::WriteZero
    )
}
