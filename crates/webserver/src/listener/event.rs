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

//! Listener events.

use std::io;
use std::net::SocketAddr;
use tracing::warn;

use crate::http::{HandlerError, ProtocolError, Request, Response};
use crate::http::ResponseWriter;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Connection endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Peer {
    /// Address of the client.
    pub remote_addr: SocketAddr,
    /// Address the client connected to.
    pub local_addr: SocketAddr,
    /// Whether the transport is encrypted.
    pub secure: bool,
}

/// Request received on a connection.
///
/// Observers inspect the request and fill in the response. If no observer
/// marks the event as handled, the listener sends the response as is once
/// all observers ran. Observers that set `handled` take over responsibility
/// for sending through [`RequestEvent::send`], and a handled event that
/// never sent anything closes the connection.
///
/// # Examples
///
/// ```
/// use std::net::SocketAddr;
/// use webserver::http::{Request, Status};
/// use webserver::listener::{Peer, RequestEvent};
///
/// // Create event and send response
/// let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
/// let peer = Peer { remote_addr: addr, local_addr: addr, secure: false };
/// let mut event = RequestEvent::new(peer, Request::new());
/// event.response.set_status(Status::NoContent);
/// event.send().unwrap();
/// assert!(event.output().starts_with(b"HTTP/1.1 204 No Content\r\n"));
/// ```
#[derive(Debug)]
pub struct RequestEvent {
    /// Connection endpoints.
    pub peer: Peer,
    /// Request.
    pub request: Request,
    /// Response, prepared for the request.
    pub response: Response,
    /// Whether an observer took over the response.
    pub handled: bool,
    /// Serialized response.
    output: Vec<u8>,
    /// Whether a response was sent.
    sent: bool,
    /// Whether the connection must be closed.
    close: bool,
}

/// Error page about to be sent.
///
/// Observers may render their own page into the response and set `handled`,
/// otherwise the default error page is rendered.
#[derive(Debug)]
pub struct ErrorPageEvent<'a> {
    /// Connection endpoints.
    pub peer: &'a Peer,
    /// Request, unless it could not be parsed.
    pub request: Option<&'a Request>,
    /// Response, with status and reason set from the error.
    pub response: &'a mut Response,
    /// Error that caused the page.
    pub error: &'a ProtocolError,
    /// Whether an observer rendered the page.
    pub handled: bool,
}

/// Unexpected failure while accepting or handling a connection.
#[derive(Debug)]
pub struct ExceptionEvent<'a> {
    /// Connection endpoints, if a connection was involved.
    pub peer: Option<&'a Peer>,
    /// Error.
    pub error: &'a HandlerError,
}

/// Client asked for permission to send the request body.
///
/// The response starts out as `100 Please continue mate.`, and is sent as an
/// interim response. Observers that change the status refuse the body, and
/// the response is then sent as the final response.
#[derive(Debug)]
pub struct ContinueEvent<'a> {
    /// Connection endpoints.
    pub peer: &'a Peer,
    /// Request head, without body.
    pub request: &'a Request,
    /// Interim response.
    pub response: &'a mut Response,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl RequestEvent {
    /// Creates an event for the given request.
    #[must_use]
    pub fn new(peer: Peer, request: Request) -> Self {
        let response = Response::for_request(&request);
        Self {
            peer,
            request,
            response,
            handled: false,
            output: Vec::new(),
            sent: false,
            close: false,
        }
    }

    /// Sends the response.
    ///
    /// Only one response can be sent per request, so further calls are
    /// ignored. If the response closes the connection, it's closed after
    /// the response was written.
    ///
    /// # Errors
    ///
    /// This method returns [`io::Error`], if the response can't be written.
    pub fn send(&mut self) -> io::Result<()> {
        if self.sent {
            warn!(path = %self.request.uri.path, "Response already sent");
            return Ok(());
        }
        ResponseWriter::write(&self.response, &mut self.output)?;
        self.sent = true;
        self.close |= self.response.closes_connection();
        Ok(())
    }

    /// Closes the connection after the response was written.
    #[inline]
    pub fn close(&mut self) {
        self.close = true;
    }

    /// Applies status and reason of the error, clearing the body.
    pub(crate) fn fail(&mut self, err: &ProtocolError) {
        self.response.status = err.status;
        self.response.reason.clone_from(&err.reason);
        self.response.body.clear();
    }

    /// Consumes the event, returning the output and whether to close.
    pub(crate) fn into_output(self) -> (Vec<u8>, bool) {
        (self.output, self.close || !self.sent)
    }
}

#[allow(clippy::must_use_candidate)]
impl RequestEvent {
    /// Returns whether a response was sent.
    #[inline]
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Returns whether the connection will be closed.
    #[inline]
    pub fn is_closing(&self) -> bool {
        self.close
    }

    /// Returns the serialized response.
    #[inline]
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}
