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

//! HTTP response.

use std::fmt;

use super::component::{ConnectionType, ContentType, Encoding, Status};
use super::component::Version;
use super::headers::Headers;
use super::request::Request;

mod cookie;
mod ext;
mod writer;

pub use cookie::{Cookie, Cookies};
pub use ext::{guess_content_type, ResponseExt};
pub use writer::ResponseWriter;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP response.
///
/// Every request is handed to routers and modules with a prepared response,
/// which they mutate in place through the public fields. The consuming
/// setters are meant for building responses outside of request processing,
/// e.g. in tests or together with [`ResponseExt`].
///
/// `Content-Type`, `Content-Length` and `Connection` are never taken from
/// [`Response::headers`]. The [`ResponseWriter`] derives them from the
/// fields and the body.
///
/// # Examples
///
/// ```
/// use webserver::http::{Header, Response, Status};
///
/// // Answer with a short uncached text
/// let res = Response::new()
///     .status(Status::Accepted)
///     .header(Header::CacheControl, "no-store")
///     .body("queued");
/// assert_eq!(res.reason, "Accepted");
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    /// Response version.
    pub version: Version,
    /// Status code.
    pub status: Status,
    /// Reason phrase sent after the status code.
    pub reason: String,
    /// Additional headers.
    pub headers: Headers,
    /// Cookies, each sent as `Set-Cookie`.
    pub cookies: Cookies,
    /// Body, sent as is.
    pub body: Vec<u8>,
    /// Content type.
    pub content_type: ContentType,
    /// Connection directive.
    pub connection: ConnectionType,
    /// Character encoding of the body.
    pub encoding: Encoding,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Response {
    /// Creates a response.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a response answering the given request.
    ///
    /// Version and connection directive are taken from the request.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::{ConnectionType, Request, Response, Version};
    ///
    /// // Create response for HTTP/1.0 request
    /// let req = Request::new().version(Version::Http10);
    /// let res = Response::for_request(&req);
    /// assert_eq!(res.version, Version::Http10);
    /// assert_eq!(res.connection, ConnectionType::Close);
    /// ```
    #[must_use]
    pub fn for_request(req: &Request) -> Self {
        Self {
            version: req.version,
            connection: req.connection(),
            ..Default::default()
        }
    }

    /// Sets the status, resetting the reason to its canonical phrase.
    #[inline]
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.reason = status.name().to_string();
    }

    /// Renders the default error page for the current status and reason.
    ///
    /// The body is replaced with a minimal HTML document, while headers and
    /// cookies are left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::{Response, Status};
    ///
    /// // Render error page
    /// let mut res = Response::new().status(Status::NotFound);
    /// res.render_error_page();
    /// assert_eq!(
    ///     res.body,
    ///     b"<html><head><title>Not Found</title></head>\
    ///       <body>Error 404: Not Found</body></html>"
    /// );
    /// ```
    pub fn render_error_page(&mut self) {
        let code = self.status.code();
        let reason = &self.reason;
        self.content_type =
            ContentType::new("text/html").with_param("charset", "utf-8");
        self.body = format!(
            "<html><head><title>{reason}</title></head>\
             <body>Error {code}: {reason}</body></html>"
        )
        .into_bytes();
    }

    /// Returns whether the connection must be closed after this response.
    ///
    /// This is the case for HTTP/1.0 responses, and for responses with the
    /// [`ConnectionType::Close`] directive.
    #[must_use]
    pub fn closes_connection(&self) -> bool {
        self.version == Version::Http10
            || self.connection == ConnectionType::Close
    }
}

impl Response {
    /// Sets the status and canonical reason of the response.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::{Response, Status};
    ///
    /// // Create response and set status
    /// let res = Response::new()
    ///     .status(Status::NotFound);
    /// assert_eq!(res.reason, "Not Found");
    /// ```
    #[inline]
    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.set_status(status);
        self
    }

    /// Sets the reason phrase of the response.
    #[inline]
    #[must_use]
    pub fn reason<R>(mut self, reason: R) -> Self
    where
        R: Into<String>,
    {
        self.reason = reason.into();
        self
    }

    /// Sets a header of the response.
    #[allow(clippy::needless_pass_by_value)]
    #[inline]
    #[must_use]
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: ToString,
    {
        self.headers.insert(key, value.to_string());
        self
    }

    /// Sets a cookie of the response.
    #[inline]
    #[must_use]
    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.set(cookie);
        self
    }

    /// Sets the content type of the response.
    #[inline]
    #[must_use]
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Sets the connection directive of the response.
    #[inline]
    #[must_use]
    pub fn connection(mut self, connection: ConnectionType) -> Self {
        self.connection = connection;
        self
    }

    /// Sets the body of the response.
    ///
    /// The `Content-Length` is always derived from the body when writing the
    /// response, so it doesn't need to be set.
    #[inline]
    #[must_use]
    pub fn body<B>(mut self, body: B) -> Self
    where
        B: Into<Vec<u8>>,
    {
        self.body = body.into();
        self
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Response {
    /// Creates an empty `200 OK` response with an HTML content type.
    fn default() -> Self {
        Self {
            version: Version::default(),
            status: Status::Ok,
            reason: Status::Ok.name().to_string(),
            headers: Headers::new(),
            cookies: Cookies::default(),
            body: Vec::new(),
            content_type: guess_content_type("index.html"),
            connection: ConnectionType::default(),
            encoding: Encoding::default(),
        }
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Response {
    /// Formats status line and headers, summarizing the body by its size.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Self { version, status, reason, headers, body, .. } = self;
        writeln!(f, "{version} {} {reason}", status.code())?;
        writeln!(f, "{headers}")?;
        writeln!(f, "({} bytes)", body.len())
    }
}
