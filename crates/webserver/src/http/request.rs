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

//! HTTP request.

use std::fmt;
use std::path::{Component, Path};
use std::str;

use super::component::{ConnectionType, ContentType, Header, Method};
use super::component::{Status, Version};
use super::error::ProtocolError;
use super::headers::Headers;

mod files;
mod uri;

pub use files::{Files, UploadedFile};
pub use uri::{Pairs, Query, Uri};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Maximum size of a request, including the body.
pub const MAX_REQUEST_SIZE: usize = 8 * 1024 * 1024;

/// Maximum length of the request path.
pub const MAX_PATH_LENGTH: usize = 2 * 1024;

/// Maximum length of a header value.
pub const MAX_HEADER_LENGTH: usize = 4 * 1024;

/// Maximum number of headers.
const MAX_HEADERS: usize = 64;

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Decoded form fields of a request body.
pub type Form = Query;

/// Parse result, carrying the request and the number of bytes consumed.
pub type Parsed = Option<(Request, usize)>;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP request.
///
/// The regular way to create a [`Request`] is to use [`Request::from_bytes`],
/// which parses a given slice of bytes. Form fields and uploaded files are
/// left unset by the parser, and are filled in exactly once by the body
/// decoding step of the server pipeline.
///
/// # Examples
///
/// ```
/// use webserver::http::{Method, Request};
///
/// // Create request
/// let req = Request::new()
///     .method(Method::Get)
///     .uri("/");
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    /// Request method.
    pub method: Method,
    /// Request method, as sent.
    pub verb: String,
    /// Request URI.
    pub uri: Uri,
    /// Request target, as sent.
    pub target: String,
    /// Request version.
    pub version: Version,
    /// Request headers.
    pub headers: Headers,
    /// Request body.
    pub body: Vec<u8>,
    /// Decoded form fields, if the body was decoded.
    pub form: Option<Form>,
    /// Uploaded files, if the body was decoded.
    pub files: Option<Files>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Request {
    /// Creates a request.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request from the given bytes.
    ///
    /// This parses the request head with [`Request::parse_head`] and then
    /// takes as many body bytes as announced by `Content-Length`. Returns
    /// `None` if the buffer does not contain a complete request yet, and the
    /// request with the number of consumed bytes otherwise, so pipelined
    /// requests can be parsed from the same buffer one after another.
    ///
    /// # Errors
    ///
    /// This method returns a [`ProtocolError`] carrying the status that the
    /// client should receive, if the request is malformed or exceeds limits.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use webserver::http::{Method, Request};
    ///
    /// // Create request from bytes
    /// let bytes = b"POST /form HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";
    /// let (req, n) = Request::from_bytes(bytes)?.expect("complete");
    /// assert_eq!(req.method, Method::Post);
    /// assert_eq!(req.body, b"abc");
    /// assert_eq!(n, bytes.len());
    ///
    /// // Incomplete requests yield nothing
    /// assert!(Request::from_bytes(&bytes[..20])?.is_none());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Parsed, ProtocolError> {
        let Some((mut req, n)) = Request::parse_head(bytes)? else {
            return Ok(None);
        };

        // Take body, if completely buffered
        let end = n + req.content_length();
        if bytes.len() < end {
            return Ok(None);
        }
        req.body = bytes[n..end].to_vec();
        Ok(Some((req, end)))
    }

    /// Parses the head of a request, leaving the body empty.
    ///
    /// HTTP requests are parsed using the [`httparse`] crate. Returns the
    /// number of bytes the head occupies. This method performs several
    /// validations in order to protect against the most common security
    /// vulnerabilities, including length checks and path traversal attempts.
    /// Note that NUL characters are already rejected by [`httparse`].
    ///
    /// # Errors
    ///
    /// This method returns a [`ProtocolError`] with one of the following:
    ///
    /// - [`Status::PayloadTooLarge`]: request exceeds 8 MiB
    /// - [`Status::UriTooLong`]: path exceeds 2 KiB
    /// - [`Status::RequestHeaderFieldsTooLarge`]: header value exceeds 4 KiB
    /// - [`Status::NotImplemented`]: unsupported transfer encoding
    /// - [`Status::HttpVersionNotSupported`]: version other than 1.0 or 1.1
    /// - [`Status::BadRequest`]: malformed request or path traversal
    pub fn parse_head(bytes: &[u8]) -> Result<Parsed, ProtocolError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers);

        // Parse request head, rejecting heads that never end
        let n = match req.parse(bytes) {
            Ok(httparse::Status::Complete(n)) => n,
            Ok(httparse::Status::Partial) => {
                if bytes.len() > MAX_REQUEST_SIZE {
                    return Err(Status::PayloadTooLarge.into());
                }
                return Ok(None);
            }
            Err(err) => return Err(from_parse_error(err)),
        };

        // Unpack request method, path and version - if parsing succeeded,
        // all of them must exist, so we treat absence as malformed input
        let (Some(method), Some(path), Some(minor)) =
            (req.method, req.path, req.version)
        else {
            return Err(Status::BadRequest.into());
        };
        let version = Version::from_minor(minor)
            .ok_or(ProtocolError::new(Status::HttpVersionNotSupported))?;
        if path.len() > MAX_PATH_LENGTH {
            return Err(Status::UriTooLong.into());
        }

        // Ensure that the request URI path starts with a slash, as we do not
        // support proxy requests, and doesn't attempt a traversal
        let uri = Uri::from(path);
        if !uri.path.starts_with('/') || is_traversal(&uri.path) {
            return Err(Status::BadRequest.into());
        }

        // Unpack request headers, keeping unknown headers verbatim, but skip
        // headers with values that are not valid UTF-8
        let mut list = Headers::new();
        for header in req.headers.iter() {
            if header.value.len() > MAX_HEADER_LENGTH {
                return Err(Status::RequestHeaderFieldsTooLarge.into());
            }
            if let Ok(value) = str::from_utf8(header.value) {
                list.append(header.name, value.trim());
            }
        }

        // Create request and validate framing
        let req = Request {
            method: Method::parse_lossy(method),
            verb: method.to_string(),
            uri,
            target: path.to_string(),
            version,
            headers: list,
            ..Default::default()
        };
        let length = req.validate_framing()?;
        if n.saturating_add(length) > MAX_REQUEST_SIZE {
            return Err(Status::PayloadTooLarge.into());
        }
        Ok(Some((req, n)))
    }

    /// Validates transfer encoding and content length, returning the latter.
    fn validate_framing(&self) -> Result<usize, ProtocolError> {
        for value in self.headers.get_all(Header::TransferEncoding) {
            if !value.trim().eq_ignore_ascii_case("identity") {
                return Err(Status::NotImplemented.into());
            }
        }

        // Multiple content lengths must agree
        let mut length = None;
        for value in self.headers.get_all(Header::ContentLength) {
            let value = value
                .trim()
                .parse::<usize>()
                .map_err(|_| ProtocolError::new(Status::BadRequest))?;
            if length.is_some_and(|length| length != value) {
                return Err(Status::BadRequest.into());
            }
            length = Some(value);
        }
        Ok(length.unwrap_or_default())
    }

    /// Returns the announced content length, or zero if absent.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.headers
            .get(Header::ContentLength)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Returns the content type, if present and valid.
    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        self.headers
            .get(Header::ContentType)
            .and_then(|value| value.parse().ok())
    }

    /// Returns the connection directive, see [`ConnectionType::negotiate`].
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::{ConnectionType, Header, Request, Version};
    ///
    /// // Create HTTP/1.0 request asking for keep-alive
    /// let req = Request::new()
    ///     .version(Version::Http10)
    ///     .header(Header::Connection, "keep-alive");
    /// assert_eq!(req.connection(), ConnectionType::KeepAlive);
    /// ```
    #[must_use]
    pub fn connection(&self) -> ConnectionType {
        let header = self.headers.get(Header::Connection);
        ConnectionType::negotiate(header, self.version)
    }

    /// Returns whether the client waits for `100 Continue` before sending
    /// the body.
    #[must_use]
    pub fn expects_continue(&self) -> bool {
        self.headers
            .get(Header::Expect)
            .is_some_and(|value| value.eq_ignore_ascii_case("100-continue"))
    }
}

impl Request {
    /// Sets the method of the request.
    #[inline]
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self.verb = method.name().to_string();
        self
    }

    /// Sets the URI of the request.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Request;
    ///
    /// // Create request and set URI
    /// let req = Request::new()
    ///     .uri("/search?q=term");
    /// assert_eq!(req.uri.query.get("q"), Some("term"));
    /// ```
    #[inline]
    #[must_use]
    pub fn uri<U>(mut self, uri: U) -> Self
    where
        U: Into<Uri>,
    {
        self.uri = uri.into();
        self.target = self.uri.to_string();
        self
    }

    /// Sets the version of the request.
    #[inline]
    #[must_use]
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Sets a header of the request.
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

    /// Sets the body of the request, updating `Content-Length`.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Request;
    ///
    /// // Create request and set body
    /// let req = Request::new()
    ///     .body("Hello, world!");
    /// assert_eq!(req.content_length(), 13);
    /// ```
    #[inline]
    #[must_use]
    pub fn body<B>(mut self, body: B) -> Self
    where
        B: Into<Vec<u8>>,
    {
        self.body = body.into();
        self.headers
            .insert(Header::ContentLength, self.body.len().to_string());
        self
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Request {
    /// Creates a default request.
    #[inline]
    fn default() -> Self {
        Self {
            method: Method::Get,
            verb: Method::Get.name().to_string(),
            uri: Uri::default(),
            target: String::from("/"),
            version: Version::default(),
            headers: Headers::default(),
            body: Vec::new(),
            form: None,
            files: None,
        }
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Request {
    /// Formats the request for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}\r\n", self.method, self.uri, self.version)?;
        write!(f, "{}\r\n", self.headers)?;
        write!(f, "[Body: {} bytes]\r\n", self.body.len())
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns whether the given path attempts a traversal.
fn is_traversal(path: &str) -> bool {
    // Quick check first to short-circuit the common case
    if !path.contains("..") {
        return false;
    }
    let mut iter = Path::new(path).components();
    iter.any(|component| component == Component::ParentDir)
}

/// Maps a parser error to a protocol error.
fn from_parse_error(err: httparse::Error) -> ProtocolError {
    match err {
        httparse::Error::Version => {
            ProtocolError::new(Status::HttpVersionNotSupported)
        }
        httparse::Error::TooManyHeaders => {
            ProtocolError::new(Status::RequestHeaderFieldsTooLarge)
        }
        _ => ProtocolError::new(Status::BadRequest),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8]) -> Result<Parsed, ProtocolError> {
        Request::from_bytes(bytes)
    }

    fn status(bytes: &[u8]) -> Status {
        parse(bytes).unwrap_err().status
    }

    #[test]
    fn test_parse_keeps_unknown_headers() {
        let bytes = b"GET /a HTTP/1.1\r\nX-Custom: 1\r\nHost: x\r\n\r\n";
        let (req, n) = parse(bytes).unwrap().unwrap();
        assert_eq!(n, bytes.len());
        assert_eq!(req.headers.get("x-custom"), Some("1"));
        assert_eq!(req.version, Version::Http11);
        assert_eq!(req.connection(), ConnectionType::KeepAlive);
        assert!(req.form.is_none());
    }

    #[test]
    fn test_parse_unknown_method() {
        let (req, _) = parse(b"BREW /pot HTTP/1.1\r\n\r\n").unwrap().unwrap();
        assert_eq!(req.method, Method::Unknown);
        assert_eq!(req.verb, "BREW");
    }

    #[test]
    fn test_parse_keeps_raw_target() {
        let bytes = b"GET /my%20file?x=1 HTTP/1.1\r\n\r\n";
        let (req, _) = parse(bytes).unwrap().unwrap();
        assert_eq!(req.uri.path, "/my file");
        assert_eq!(req.target, "/my%20file?x=1");
        assert_eq!(req.verb, "GET");
    }

    #[test]
    fn test_parse_pipelined() {
        let bytes = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";
        let (first, n) = parse(bytes).unwrap().unwrap();
        let (second, _) = parse(&bytes[n..]).unwrap().unwrap();
        assert_eq!(first.uri.path, "/a");
        assert_eq!(second.uri.path, "/b");
    }

    #[test]
    fn test_parse_http10_defaults_to_close() {
        let (req, _) = parse(b"GET / HTTP/1.0\r\n\r\n").unwrap().unwrap();
        assert_eq!(req.connection(), ConnectionType::Close);
    }

    #[test]
    fn test_parse_rejects_traversal() {
        assert_eq!(status(b"GET /a/../b HTTP/1.1\r\n\r\n"), Status::BadRequest);
        assert_eq!(
            status(b"GET /%2e%2e/etc HTTP/1.1\r\n\r\n"),
            Status::BadRequest
        );
    }

    #[test]
    fn test_parse_rejects_long_path() {
        let path = "a".repeat(MAX_PATH_LENGTH + 1);
        let bytes = format!("GET /{path} HTTP/1.1\r\n\r\n");
        assert_eq!(status(bytes.as_bytes()), Status::UriTooLong);
    }

    #[test]
    fn test_parse_rejects_long_header() {
        let value = "a".repeat(MAX_HEADER_LENGTH + 1);
        let bytes = format!("GET / HTTP/1.1\r\nX-Big: {value}\r\n\r\n");
        assert_eq!(
            status(bytes.as_bytes()),
            Status::RequestHeaderFieldsTooLarge
        );
    }

    #[test]
    fn test_parse_rejects_chunked() {
        let bytes = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
        assert_eq!(status(bytes), Status::NotImplemented);
    }

    #[test]
    fn test_parse_rejects_large_body() {
        let bytes = format!(
            "POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            MAX_REQUEST_SIZE
        );
        assert_eq!(status(bytes.as_bytes()), Status::PayloadTooLarge);
    }

    #[test]
    fn test_parse_rejects_invalid_content_length() {
        let bytes = b"POST / HTTP/1.1\r\nContent-Length: x\r\n\r\n";
        assert_eq!(status(bytes), Status::BadRequest);
    }

    #[test]
    fn test_parse_head_without_body() {
        let bytes = b"PUT /f HTTP/1.1\r\nExpect: 100-continue\r\n\
                      Content-Length: 5\r\n\r\n";
        let (req, n) = Request::parse_head(bytes).unwrap().unwrap();
        assert_eq!(n, bytes.len());
        assert!(req.expects_continue());
        assert!(parse(bytes).unwrap().is_none());
    }
}
