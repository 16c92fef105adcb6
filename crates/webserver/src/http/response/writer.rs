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

//! HTTP response writer.

use std::io::{self, Write};

use crate::http::Header;

use super::Response;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Size of chunks in which the body is written.
const CHUNK_SIZE: usize = 4096;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP response writer.
///
/// Serializes a [`Response`] in the following order: status line, then
/// `Content-Type`, `Content-Length` and `Connection` derived from the
/// response fields, then one `Set-Cookie` line per cookie, then all other
/// headers in insertion order, then an empty line and the body. Headers that
/// collide with the derived ones are skipped.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::http::{Response, ResponseExt, ResponseWriter};
///
/// // Serialize response
/// let res = Response::from_text("Hi");
/// let bytes = ResponseWriter::to_bytes(&res)?;
/// assert_eq!(
///     bytes,
///     b"HTTP/1.1 200 OK\r\n\
///       Content-Type: text/plain; charset=utf-8\r\n\
///       Content-Length: 2\r\n\
///       Connection: Keep-Alive\r\n\
///       \r\n\
///       Hi"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ResponseWriter;

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl ResponseWriter {
    /// Writes the response to the given writer and flushes it.
    ///
    /// # Errors
    ///
    /// This method returns [`io::Error`], if writing fails.
    pub fn write<W>(res: &Response, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        let mut head = Vec::with_capacity(256 + res.headers.len() * 64);
        let code = res.status.code();
        write!(head, "{} {} {}\r\n", res.version, code, res.reason)?;

        // Write derived headers
        write!(head, "Content-Type: {}\r\n", res.content_type)?;
        write!(head, "Content-Length: {}\r\n", res.body.len())?;
        write!(head, "Connection: {}\r\n", res.connection)?;

        // Write cookies, then all remaining headers in order
        for cookie in res.cookies.iter() {
            write!(head, "Set-Cookie: {cookie}\r\n")?;
        }
        for (name, value) in res.headers.iter() {
            if !is_derived(name) {
                write!(head, "{name}: {value}\r\n")?;
            }
        }
        head.extend_from_slice(b"\r\n");
        writer.write_all(&head)?;

        // Write body in chunks
        for chunk in res.body.chunks(CHUNK_SIZE) {
            writer.write_all(chunk)?;
        }
        writer.flush()
    }

    /// Serializes the response into bytes.
    ///
    /// # Errors
    ///
    /// This method returns [`io::Error`], if formatting fails.
    pub fn to_bytes(res: &Response) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(res.body.len() + 256);
        Self::write(res, &mut buffer)?;
        Ok(buffer)
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns whether the header is derived from response fields.
fn is_derived(name: &str) -> bool {
    [Header::ContentType, Header::ContentLength, Header::Connection]
        .iter()
        .any(|header| header.name().eq_ignore_ascii_case(name))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::str;

    use crate::http::{ConnectionType, Cookie, Response, Status, Version};

    use super::*;

    #[test]
    fn test_write_order() {
        let res = Response::new()
            .status(Status::NotFound)
            .reason("Gone fishing")
            .header("X-Extra", "1")
            .header(Header::ContentLength, "999")
            .cookie(Cookie::new("a", "1").path("/"))
            .cookie(Cookie::new("b", "2"))
            .connection(ConnectionType::Close)
            .body("x");
        let bytes = ResponseWriter::to_bytes(&res).unwrap();
        assert_eq!(
            str::from_utf8(&bytes).unwrap(),
            "HTTP/1.1 404 Gone fishing\r\n\
             Content-Type: text/html; charset=utf-8\r\n\
             Content-Length: 1\r\n\
             Connection: Close\r\n\
             Set-Cookie: a=1;path=/\r\n\
             Set-Cookie: b=2\r\n\
             X-Extra: 1\r\n\
             \r\n\
             x"
        );
    }

    #[test]
    fn test_write_large_body() {
        let mut res = Response::new();
        res.version = Version::Http10;
        res.body = vec![b'a'; CHUNK_SIZE * 2 + 1];
        let bytes = ResponseWriter::to_bytes(&res).unwrap();
        assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\n"));
        assert!(bytes.ends_with(&res.body));
    }
}
