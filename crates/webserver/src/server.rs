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

//! HTTP server.
//!
//! The server combines any number of listeners with a single request
//! pipeline of routers, modules and body decoders. Everything is registered
//! before the server is started, after which the pipeline is frozen.

use std::net::SocketAddr;
use std::result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::decoder::{self, BodyDecoder};
use crate::http::HandlerError;
use crate::listener::{ContinueEvent, ErrorPageEvent, ExceptionEvent};
use crate::listener::{Listener, RequestEvent, Signals};
use crate::module::Module;
use crate::router::Router;

mod builder;
mod context;
mod error;
mod pipeline;

pub use builder::{Builder, DEFAULT_SERVER_NAME};
pub use context::{ProcessingResult, RequestContext};
pub use error::{Error, Result};
pub use pipeline::{FAILURE_REASON, Pipeline, SendingObserver};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP server.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use std::time::Duration;
/// use webserver::http::Status;
/// use webserver::listener::Listener;
/// use webserver::server::{ProcessingResult, RequestContext, Server};
///
/// // Create server with a single router
/// let mut server = Server::new();
/// server.add_router(|ctx: &mut RequestContext| {
///     ctx.response.set_status(Status::NoContent);
///     Ok(ProcessingResult::SendResponse)
/// })?;
/// server.add_listener(Listener::new("127.0.0.1:0")?)?;
///
/// // Start and stop server
/// server.start(16)?;
/// server.stop()?;
/// assert!(server.wait(Duration::from_secs(5)));
/// # Ok(())
/// # }
/// ```
pub struct Server {
    /// Pipeline, until the server is started.
    pipeline: Option<Pipeline>,
    /// Listeners.
    listeners: Vec<Listener>,
    /// Whether the server was started.
    started: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Server {
    /// Creates a server with default settings.
    #[must_use]
    pub fn new() -> Self {
        Builder::new().build()
    }

    /// Creates a server builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::server::Server;
    ///
    /// // Create server with custom name
    /// let server = Server::builder()
    ///     .server_name("coffee")
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Adds a router.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the server was
    /// already started.
    pub fn add_router<R>(&mut self, router: R) -> Result
    where
        R: Router,
    {
        self.pipeline()?.routers.push(Box::new(router));
        Ok(())
    }

    /// Adds a module.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the server was
    /// already started.
    pub fn add_module<M>(&mut self, module: M) -> Result
    where
        M: Module,
    {
        self.pipeline()?.modules.push(Box::new(module));
        Ok(())
    }

    /// Adds a body decoder.
    ///
    /// If no decoders are added, the default decoders are used.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the server was
    /// already started.
    pub fn add_decoder<D>(&mut self, decoder: D) -> Result
    where
        D: BodyDecoder,
    {
        self.pipeline()?.decoders.push(Box::new(decoder));
        Ok(())
    }

    /// Adds a listener.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the server or the
    /// listener was already started.
    pub fn add_listener(&mut self, listener: Listener) -> Result {
        self.pipeline()?;
        if listener.is_started() {
            return Err(Error::Listener(crate::listener::Error::AlreadyStarted));
        }
        self.listeners.push(listener);
        Ok(())
    }

    /// Registers an observer for unexpected failures.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the server was
    /// already started.
    pub fn on_exception<F>(&mut self, f: F) -> Result
    where
        F: Fn(&ExceptionEvent) + Send + Sync + 'static,
    {
        self.signals()?.exception.push(Box::new(f));
        Ok(())
    }

    /// Registers an observer for received requests.
    ///
    /// Request observers run before body decoding, routers and modules, and
    /// can be used to load sessions or enforce policies.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the server was
    /// already started.
    pub fn on_request<F>(&mut self, f: F) -> Result
    where
        F: Fn(&mut RequestEvent) -> result::Result<(), HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.signals()?.request.push(Box::new(f));
        Ok(())
    }

    /// Registers an observer for error pages.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the server was
    /// already started.
    pub fn on_error_page<F>(&mut self, f: F) -> Result
    where
        F: Fn(&mut ErrorPageEvent) + Send + Sync + 'static,
    {
        self.signals()?.error_page.push(Box::new(f));
        Ok(())
    }

    /// Registers an observer for requests expecting `100 Continue`.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the server was
    /// already started.
    pub fn on_continue<F>(&mut self, f: F) -> Result
    where
        F: Fn(&mut ContinueEvent) + Send + Sync + 'static,
    {
        self.signals()?.continue_.push(Box::new(f));
        Ok(())
    }

    /// Registers an observer invoked right before a response is sent.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the server was
    /// already started.
    pub fn on_sending<F>(&mut self, f: F) -> Result
    where
        F: Fn(&mut RequestContext) + Send + Sync + 'static,
    {
        self.pipeline()?.sending.push(Box::new(f));
        Ok(())
    }

    /// Starts the server.
    ///
    /// The pipeline is frozen and shared with all listeners, which are then
    /// started in order. If a listener fails to start, the listeners started
    /// before are stopped again.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::AlreadyStarted`], if the server was
    /// already started, and [`Error::Listener`], if a listener can't be
    /// started.
    pub fn start(&mut self, backlog: usize) -> Result {
        let mut pipeline = self.pipeline.take().ok_or(Error::AlreadyStarted)?;
        self.started = true;
        if pipeline.decoders.is_empty() {
            pipeline.decoders = decoder::defaults();
        }

        // Wire listener signals to the pipeline
        let pipeline = Arc::new(pipeline);
        for listener in &mut self.listeners {
            let p = Arc::clone(&pipeline);
            listener.on_request(move |event| p.handle(event))?;
            let p = Arc::clone(&pipeline);
            listener.on_error_page(move |event| {
                p.signals.raise_error_page(event);
            })?;
            let p = Arc::clone(&pipeline);
            listener.on_continue(move |event| p.signals.raise_continue(event))?;
            let p = Arc::clone(&pipeline);
            listener.on_exception(move |event| {
                p.signals.raise_exception(event);
            })?;
        }

        // Start listeners, and roll back on failure
        for n in 0..self.listeners.len() {
            if let Err(err) = self.listeners[n].start(backlog) {
                for listener in &self.listeners[..n] {
                    let _ = listener.stop();
                }
                return Err(err.into());
            }
        }
        info!(listeners = self.listeners.len(), "Server started");
        Ok(())
    }

    /// Stops all listeners.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::NotStarted`], if the server was never
    /// started, and [`Error::Listener`] if a listener can't be stopped.
    pub fn stop(&self) -> Result {
        if !self.started {
            return Err(Error::NotStarted);
        }
        for listener in &self.listeners {
            listener.stop()?;
        }
        Ok(())
    }

    /// Waits until all listeners drained, returning whether that happened
    /// within the given timeout.
    #[must_use]
    pub fn wait(&self, timeout: Duration) -> bool {
        self.listeners
            .iter()
            .all(|listener| listener.wait(timeout))
    }

    /// Returns the addresses of all started listeners.
    #[must_use]
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners
            .iter()
            .filter_map(Listener::local_addr)
            .collect()
    }

    /// Returns the pipeline, unless the server was started.
    fn pipeline(&mut self) -> Result<&mut Pipeline> {
        self.pipeline.as_mut().ok_or(Error::AlreadyStarted)
    }

    /// Returns the observers, unless the server was started.
    fn signals(&mut self) -> Result<&mut Signals> {
        self.pipeline().map(|pipeline| &mut pipeline.signals)
    }
}

#[allow(clippy::must_use_candidate)]
impl Server {
    /// Returns whether the server was started.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Server {
    /// Creates a server with default settings.
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_twice() -> Result {
        let mut server = Server::new();
        server.add_listener(Listener::new("127.0.0.1:0")?)?;
        server.start(8)?;
        assert!(matches!(server.start(8), Err(Error::AlreadyStarted)));
        assert!(matches!(
            server.on_sending(|_| {}),
            Err(Error::AlreadyStarted)
        ));
        assert_eq!(server.local_addrs().len(), 1);
        Ok(())
    }

    #[test]
    fn test_add_started_listener() -> Result {
        let mut listener = Listener::new("127.0.0.1:0")?;
        listener.start(8)?;
        let mut server = Server::new();
        assert!(matches!(
            server.add_listener(listener),
            Err(Error::Listener(crate::listener::Error::AlreadyStarted))
        ));
        Ok(())
    }

    #[test]
    fn test_stop_before_start() {
        let server = Server::new();
        assert!(matches!(server.stop(), Err(Error::NotStarted)));
        assert!(server.wait(Duration::ZERO));
    }
}
