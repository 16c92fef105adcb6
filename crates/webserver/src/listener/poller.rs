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

//! Readiness polling.

use mio::event::Source;
use mio::{Events, Interest, Poll, Token, Waker};
use std::io::Result;
use std::sync::Arc;
use std::time::Duration;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Token of the listening socket.
pub const ACCEPTOR: Token = Token(usize::MAX - 1);

/// Token of the waker used by workers.
const WAKER: Token = Token(usize::MAX);

/// Number of events drained per poll.
const EVENT_CAPACITY: usize = 1024;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Readiness reported by a poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ready {
    /// Listening socket has pending connections.
    Accept,
    /// Workers finished responses.
    Wake,
    /// Connection in the given slab slot can make progress.
    Connection {
        /// Slab slot of the connection.
        slot: usize,
        /// Data arrived, or the peer shut down its write half.
        readable: bool,
    },
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Readiness poller.
///
/// Connection tokens are slab slots, while the two topmost tokens are
/// reserved for the listening socket and the waker.
pub struct Poller {
    /// Poll instance.
    poll: Poll,
    /// Reused event buffer.
    events: Events,
    /// Waker shared with workers.
    waker: Arc<Waker>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Poller {
    /// Creates a poller and its waker.
    pub fn new() -> Result<Self> {
        let poll = Poll::new()?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKER)?);
        Ok(Self {
            poll,
            events: Events::with_capacity(EVENT_CAPACITY),
            waker,
        })
    }

    /// Registers a source under the given token.
    pub fn register<S>(
        &self, source: &mut S, token: Token, interest: Interest,
    ) -> Result<()>
    where
        S: Source + ?Sized,
    {
        self.poll.registry().register(source, token, interest)
    }

    /// Deregisters a source.
    pub fn deregister<S>(&self, source: &mut S) -> Result<()>
    where
        S: Source + ?Sized,
    {
        self.poll.registry().deregister(source)
    }

    /// Blocks until sources are ready or the timeout elapses.
    pub fn poll(&mut self, timeout: Duration) -> Result<Vec<Ready>> {
        self.poll.poll(&mut self.events, Some(timeout))?;
        let ready = self.events.iter().map(|event| match event.token() {
            ACCEPTOR => Ready::Accept,
            WAKER => Ready::Wake,
            Token(slot) => Ready::Connection {
                slot,
                readable: event.is_readable() || event.is_read_closed(),
            },
        });
        Ok(ready.collect())
    }

    /// Returns a handle to wake the poll loop from other threads.
    #[must_use]
    pub fn waker(&self) -> Arc<Waker> {
        Arc::clone(&self.waker)
    }
}
