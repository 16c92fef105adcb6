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

//! Server tests over real sockets.

use std::error::Error;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use webserver::auth::{AuthenticationContext, Basic};
use webserver::listener::Listener;
use webserver::module::Authentication;
use webserver::router::{Params, Routes};
use webserver::server::{ProcessingResult, RequestContext, Server};

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Test result.
type Result<T = ()> = std::result::Result<T, Box<dyn Error>>;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Response as received by a client.
#[derive(Debug)]
struct Received {
    /// Status line and headers.
    head: String,
    /// Body.
    body: Vec<u8>,
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Starts a server on a random port with a few routes.
fn serve(server: &mut Server) -> Result<SocketAddr> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let routes = Routes::builder()
        .get("/hello", |ctx: &mut RequestContext, _: &Params| {
            ctx.response.body = b"hello".to_vec();
            Ok(ProcessingResult::SendResponse)
        })
        .post("/echo", |ctx: &mut RequestContext, _: &Params| {
            ctx.response.body.clone_from(&ctx.request.body);
            Ok(ProcessingResult::SendResponse)
        })
        .build()?;
    server.add_router(routes)?;
    let listener = Listener::builder("127.0.0.1:0")?.workers(2).build();
    server.add_listener(listener)?;
    server.start(16)?;
    Ok(server.local_addrs()[0])
}

/// Connects to the server.
fn connect(addr: SocketAddr) -> Result<BufReader<TcpStream>> {
    let stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    Ok(BufReader::new(stream))
}

/// Reads a response, using `Content-Length` to find the end of the body.
fn receive(reader: &mut BufReader<TcpStream>) -> Result<Received> {
    let mut head = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err("connection closed".into());
        }
        if line == "\r\n" {
            break;
        }
        head.push_str(&line);
    }
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("Content-Length: "))
        .map_or(Ok(0), str::parse::<usize>)?;
    let mut body = vec![0; length];
    reader.read_exact(&mut body)?;
    Ok(Received { head, body })
}

/// Returns whether the server closed the connection.
fn is_closed(reader: &mut BufReader<TcpStream>) -> bool {
    let mut rest = Vec::new();
    matches!(reader.read_to_end(&mut rest), Ok(0))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[test]
fn test_keep_alive() -> Result {
    let mut server = Server::new();
    let addr = serve(&mut server)?;
    let mut reader = connect(addr)?;

    // Both requests are answered on the same connection
    for _ in 0..2 {
        reader
            .get_mut()
            .write_all(b"GET /hello HTTP/1.1\r\nHost: test\r\n\r\n")?;
        let res = receive(&mut reader)?;
        assert!(res.head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(res.head.contains("Connection: Keep-Alive\r\n"));
        assert!(res.head.contains("Server: webserver\r\n"));
        assert_eq!(res.body, b"hello");
    }
    Ok(())
}

#[test]
fn test_close() -> Result {
    let mut server = Server::new();
    let addr = serve(&mut server)?;

    // HTTP/1.0 closes by default
    let mut reader = connect(addr)?;
    reader.get_mut().write_all(b"GET /hello HTTP/1.0\r\n\r\n")?;
    let res = receive(&mut reader)?;
    assert!(res.head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(is_closed(&mut reader));

    // HTTP/1.1 closes when asked to
    let mut reader = connect(addr)?;
    reader
        .get_mut()
        .write_all(b"GET /hello HTTP/1.1\r\nConnection: close\r\n\r\n")?;
    let res = receive(&mut reader)?;
    assert!(res.head.contains("Connection: Close\r\n"));
    assert!(is_closed(&mut reader));
    Ok(())
}

#[test]
fn test_not_found() -> Result {
    let mut server = Server::new();
    let addr = serve(&mut server)?;
    let mut reader = connect(addr)?;
    reader.get_mut().write_all(b"GET /nowhere HTTP/1.1\r\n\r\n")?;
    let res = receive(&mut reader)?;
    assert!(res.head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert_eq!(
        res.body,
        b"<html><head><title>Not Found</title></head>\
          <body>Error 404: Not Found</body></html>"
    );
    Ok(())
}

#[test]
fn test_bad_request() -> Result {
    let mut server = Server::new();
    let addr = serve(&mut server)?;
    let mut reader = connect(addr)?;
    reader.get_mut().write_all(b"GET /../etc HTTP/1.1\r\n\r\n")?;
    let res = receive(&mut reader)?;
    assert!(res.head.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(is_closed(&mut reader));
    Ok(())
}

#[test]
fn test_continue() -> Result {
    let mut server = Server::new();
    let addr = serve(&mut server)?;
    let mut reader = connect(addr)?;
    reader.get_mut().write_all(
        b"POST /echo HTTP/1.1\r\nExpect: 100-continue\r\n\
          Content-Length: 4\r\n\r\n",
    )?;

    // Interim response arrives before the body is sent
    let mut interim = [0; 38];
    reader.read_exact(&mut interim)?;
    assert_eq!(&interim, b"HTTP/1.0 100 Please continue mate.\r\n\r\n");
    reader.get_mut().write_all(b"ping")?;
    let res = receive(&mut reader)?;
    assert!(res.head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(res.body, b"ping");
    Ok(())
}

#[test]
fn test_basic_authentication() -> Result {
    let basic = Basic::new(Arc::new(|ctx: &mut AuthenticationContext| {
        matches!(
            ctx,
            AuthenticationContext::Basic(ctx)
                if ctx.username == "user" && ctx.password == "pass"
        )
    }));
    let mut server = Server::new();
    server.add_module(
        Authentication::new("zone")
            .authenticator(basic)
            .prefix("/private"),
    )?;
    server.add_module(|ctx: &mut RequestContext| {
        if !ctx.request.uri.path.starts_with("/private") {
            return Ok(ProcessingResult::Continue);
        }
        ctx.response.body = b"secret".to_vec();
        Ok(ProcessingResult::SendResponse)
    })?;
    let addr = serve(&mut server)?;
    let mut reader = connect(addr)?;

    // Requests without credentials are challenged
    reader.get_mut().write_all(b"GET /private HTTP/1.1\r\n\r\n")?;
    let res = receive(&mut reader)?;
    assert!(res.head.starts_with("HTTP/1.1 401 Unauthorized\r\n"));
    assert!(
        res.head.contains("\r\nWWW-Authenticate: Basic realm=\"zone\"\r\n")
    );

    // Requests with valid credentials pass
    reader.get_mut().write_all(
        b"GET /private HTTP/1.1\r\n\
          Authorization: Basic dXNlcjpwYXNz\r\n\r\n",
    )?;
    let res = receive(&mut reader)?;
    assert!(res.head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(res.body, b"secret");
    Ok(())
}

#[test]
fn test_stop_drains() -> Result {
    let mut server = Server::new();
    let addr = serve(&mut server)?;
    server.stop()?;
    assert!(server.wait(Duration::from_secs(5)));
    assert!(TcpStream::connect(addr).is_err());
    Ok(())
}
