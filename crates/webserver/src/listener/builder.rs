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

//! Listener builder.

use std::net::{SocketAddr, ToSocketAddrs};
use std::num::NonZero;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::signal::Signals;
use super::transport::{Plain, Transport};
use super::{Error, Listener, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Default idle timeout of connections.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Listener builder.
pub struct Builder {
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
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Builder {
    /// Creates a listener builder.
    ///
    /// Note that the canonical way to create a [`Listener`] is to invoke the
    /// [`Listener::builder`] method, which creates an instance of [`Builder`].
    /// The first address the given one resolves to is used.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Io`], if resolution fails, and
    /// [`Error::NoAddress`], if it yields no addresses.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use webserver::listener::Builder;
    ///
    /// // Create listener builder
    /// let builder = Builder::new("127.0.0.1:0")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new<A>(addr: A) -> Result<Self>
    where
        A: ToSocketAddrs,
    {
        let addr = addr.to_socket_addrs()?.next().ok_or(Error::NoAddress)?;
        let workers = thread::available_parallelism().map_or(4, NonZero::get);
        Ok(Self {
            addr,
            transport: Arc::new(Plain),
            workers,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            expose_errors: false,
        })
    }

    /// Sets the connection transport.
    #[must_use]
    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: Transport,
    {
        self.transport = Arc::new(transport);
        self
    }

    /// Sets the number of worker threads processing requests.
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets the idle timeout after which connections are closed.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets whether error messages are included in `500` responses.
    #[must_use]
    pub fn expose_errors(mut self, expose: bool) -> Self {
        self.expose_errors = expose;
        self
    }

    /// Creates the listener.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use std::time::Duration;
    /// use webserver::listener::Listener;
    ///
    /// // Create listener with custom settings
    /// let listener = Listener::builder("127.0.0.1:0")?
    ///     .workers(2)
    ///     .idle_timeout(Duration::from_secs(5))
    ///     .build();
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn build(self) -> Listener {
        Listener {
            addr: self.addr,
            transport: self.transport,
            workers: self.workers,
            idle_timeout: self.idle_timeout,
            expose_errors: self.expose_errors,
            signals: Signals::default(),
            running: None,
        }
    }
}
