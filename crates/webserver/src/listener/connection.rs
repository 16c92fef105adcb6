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

//! HTTP connection.

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::http::{ConnectionType, ProtocolError, Request, Response};
use crate::http::{ResponseWriter, Status, Version};

use super::event::{ContinueEvent, Peer, RequestEvent};
use super::signal::Signals;
use super::transport::Stream;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Reason phrase of the interim `100 Continue` response.
pub const CONTINUE_REASON: &str = "Please continue mate.";

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Connection state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Waiting for a complete request.
    Reading,
    /// A request is being processed by a worker.
    Processing,
    /// Closing once all output is written.
    Closing,
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP connection.
///
/// Requests are parsed strictly one after another, so at most one request
/// per connection is processed at any time. Data that arrives while a
/// request is processed is buffered and parsed after the response is queued.
#[derive(Debug)]
pub struct Connection {
    /// Connection identifier, unique per listener.
    id: u64,
    /// Byte stream.
    stream: Box<dyn Stream>,
    /// Connection endpoints.
    peer: Peer,
    /// Read buffer.
    input: Vec<u8>,
    /// Write buffer.
    output: Vec<u8>,
    /// Number of bytes of the write buffer already written.
    written: usize,
    /// Connection state.
    state: State,
    /// Whether `100 Continue` was handled for the current request.
    continued: bool,
    /// Whether the client closed its write half.
    eof: bool,
    /// Last activity time.
    time: Instant,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Connection {
    /// Creates a connection.
    pub fn new(id: u64, stream: Box<dyn Stream>, peer: Peer) -> Self {
        Connection {
            id,
            stream,
            peer,
            input: Vec::new(),
            output: Vec::new(),
            written: 0,
            state: State::Reading,
            continued: false,
            eof: false,
            time: Instant::now(),
        }
    }

    /// Returns the connection identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns a mutable reference to the underlying stream.
    pub fn stream(&mut self) -> &mut Box<dyn Stream> {
        &mut self.stream
    }

    /// Reads all available data from the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails for reasons other than the stream
    /// not being ready, in which case the connection must be dropped.
    pub fn read(&mut self) -> std::io::Result<()> {
        self.time = Instant::now();
        let mut temp = [0u8; 4096];
        loop {
            match self.stream.read(&mut temp) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => self.input.extend_from_slice(&temp[..n]),
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    /// Attempts to parse the next request from the read buffer.
    ///
    /// Returns an event once a complete request is buffered, which moves the
    /// connection into processing. Requests that can't be parsed are
    /// answered with an error page right away, and requests that expect
    /// `100 Continue` get their interim response queued.
    pub fn next(&mut self, signals: &Signals) -> Option<RequestEvent> {
        if self.state != State::Reading {
            return None;
        }
        let (mut request, n) = match Request::parse_head(&self.input) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return None,
            Err(err) => {
                self.reject(signals, &err);
                return None;
            }
        };

        // Hand out request, if the body was completely received
        let end = n + request.content_length();
        if self.input.len() >= end {
            request.body = self.input[n..end].to_vec();
            self.input.drain(..end);
            self.continued = false;
            self.state = State::Processing;
            trace!(
                method = %request.method,
                path = %request.uri.path,
                "Request"
            );
            return Some(RequestEvent::new(self.peer, request));
        }

        // Client waits for permission to send the body
        if request.expects_continue() && !self.continued {
            self.continued = true;
            self.proceed(signals, &request);
        }
        None
    }

    /// Raises the continue signal and queues the interim response.
    fn proceed(&mut self, signals: &Signals, request: &Request) {
        let mut response = Response::for_request(request)
            .status(Status::Continue)
            .reason(CONTINUE_REASON);
        signals.raise_continue(&mut ContinueEvent {
            peer: &self.peer,
            request,
            response: &mut response,
        });

        // An observer refused the body, so the response is final
        if response.status != Status::Continue {
            debug!(status = %response.status, "Request body refused");
            response.connection = ConnectionType::Close;
            self.queue_response(&response);
            return;
        }
        let line = format!(
            "{} {} {}\r\n\r\n",
            Version::Http10,
            response.status.code(),
            response.reason
        );
        self.output.extend_from_slice(line.as_bytes());
    }

    /// Answers a request that could not be parsed and closes.
    fn reject(&mut self, signals: &Signals, err: &ProtocolError) {
        debug!(
            remote_addr = %self.peer.remote_addr,
            status = %err,
            "Rejected request"
        );
        let mut response = Response::new().connection(ConnectionType::Close);
        signals.render_error_page(&self.peer, None, &mut response, err);
        self.queue_response(&response);
    }

    /// Queues a final response and closes afterwards.
    fn queue_response(&mut self, response: &Response) {
        if let Err(err) = ResponseWriter::write(response, &mut self.output) {
            warn!(%err, "Failed to write response");
        }
        self.input.clear();
        self.state = State::Closing;
    }

    /// Queues the output of a processed request.
    pub fn complete(&mut self, bytes: Vec<u8>, close: bool) {
        self.time = Instant::now();
        if self.output.is_empty() {
            self.output = bytes;
            self.written = 0;
        } else {
            self.output.extend_from_slice(&bytes);
        }
        self.state = if close { State::Closing } else { State::Reading };
    }

    /// Writes as much of the write buffer as possible.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails for reasons other than the stream
    /// not being ready, in which case the connection must be dropped.
    pub fn flush(&mut self) -> std::io::Result<()> {
        while self.written < self.output.len() {
            match self.stream.write(&self.output[self.written..]) {
                Ok(0) => return Err(ErrorKind::WriteZero.into()),
                Ok(n) => {
                    self.written += n;
                    self.time = Instant::now();
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }

        // Everything was written, so we can reset the buffer
        self.output.clear();
        self.written = 0;
        self.stream.flush()
    }

    /// Returns whether the connection is done and can be dropped.
    ///
    /// This is the case once all output is written and either the connection
    /// is closing, or the client closed and no request is in flight.
    pub fn is_finished(&self) -> bool {
        self.output.is_empty()
            && (self.state == State::Closing
                || (self.eof && self.state == State::Reading))
    }

    /// Returns whether the connection has been idle for too long.
    ///
    /// Connections are never timed out while a request is processed.
    pub fn is_timed_out(&self, now: Instant, timeout: Duration) -> bool {
        self.state != State::Processing
            && now.duration_since(self.time) > timeout
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use mio::net::TcpStream;
    use std::io;
    use std::net::TcpListener;

    use super::*;

    fn connection() -> (Connection, std::net::TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = std::net::TcpStream::connect(addr).unwrap();
        let (server, remote_addr) = listener.accept().unwrap();
        server.set_nonblocking(true).unwrap();
        let stream: Box<dyn Stream> = Box::new(TcpStream::from_std(server));
        let peer = Peer { remote_addr, local_addr: addr, secure: false };
        (Connection::new(1, stream, peer), client)
    }

    fn feed(conn: &mut Connection, bytes: &[u8]) {
        conn.input.extend_from_slice(bytes);
    }

    #[test]
    fn test_next_waits_for_body() {
        let (mut conn, _client) = connection();
        let signals = Signals::default();
        feed(&mut conn, b"POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\nab");
        assert!(conn.next(&signals).is_none());
        feed(&mut conn, b"cd");
        let event = conn.next(&signals).unwrap();
        assert_eq!(event.request.body, b"abcd");
        assert!(conn.next(&signals).is_none());
    }

    #[test]
    fn test_next_sends_continue_once() {
        let (mut conn, _client) = connection();
        let signals = Signals::default();
        feed(
            &mut conn,
            b"PUT / HTTP/1.1\r\nExpect: 100-continue\r\n\
              Content-Length: 2\r\n\r\n",
        );
        assert!(conn.next(&signals).is_none());
        assert!(conn.next(&signals).is_none());
        assert_eq!(conn.output, b"HTTP/1.0 100 Please continue mate.\r\n\r\n");
    }

    #[test]
    fn test_next_refused_continue_closes() {
        let (mut conn, _client) = connection();
        let mut signals = Signals::default();
        signals.continue_.push(Box::new(|event: &mut ContinueEvent| {
            event.response.set_status(Status::ExpectationFailed);
        }));
        feed(
            &mut conn,
            b"PUT / HTTP/1.1\r\nExpect: 100-continue\r\n\
              Content-Length: 2\r\n\r\n",
        );
        assert!(conn.next(&signals).is_none());
        assert!(conn.output.starts_with(b"HTTP/1.1 417 Expectation Failed"));
        assert_eq!(conn.state, State::Closing);
    }

    #[test]
    fn test_next_rejects_malformed() {
        let (mut conn, _client) = connection();
        let signals = Signals::default();
        feed(&mut conn, b"GET /../etc HTTP/1.1\r\n\r\n");
        assert!(conn.next(&signals).is_none());
        assert!(conn.output.starts_with(b"HTTP/1.1 400 Bad Request"));
        assert_eq!(conn.state, State::Closing);
    }

    #[test]
    fn test_flush_and_finish() -> io::Result<()> {
        let (mut conn, _client) = connection();
        conn.complete(b"HTTP/1.1 200 OK\r\n\r\n".to_vec(), true);
        assert!(!conn.is_finished());
        conn.flush()?;
        assert!(conn.is_finished());
        Ok(())
    }

    #[test]
    fn test_timeout_skips_processing() {
        let (mut conn, _client) = connection();
        let later = Instant::now() + Duration::from_secs(60);
        assert!(conn.is_timed_out(later, Duration::from_secs(30)));
        conn.state = State::Processing;
        assert!(!conn.is_timed_out(later, Duration::from_secs(30)));
    }
}
