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

//! Response constructors.

use httpdate::fmt_http_date;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::http::{ContentType, Header, Status};

use super::Response;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Media types by lowercase file extension.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("gif", "image/gif"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("ico", "image/x-icon"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("less", "text/css"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain"),
    ("wasm", "application/wasm"),
    ("webp", "image/webp"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("xml", "application/xml"),
    ("zip", "application/zip"),
];

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Convenience constructors for [`Response`].
///
/// The constructors start from a fresh `200 OK` response. Inside request
/// processing, prefer mutating the prepared response, which already carries
/// the version and connection of the request.
pub trait ResponseExt: Sized {
    /// Creates a response with the contents of a file.
    ///
    /// The media type follows the file extension, and the modification time
    /// is sent as `Last-Modified`, when the platform reports one.
    ///
    /// # Errors
    ///
    /// This method returns [`io::Error`], if the file can't be read.
    fn from_file<P>(path: P) -> io::Result<Response>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;

        let mut res = Response::new()
            .content_type(guess_content_type(path))
            .body(content);
        if let Ok(modified) = file.metadata().and_then(|meta| meta.modified())
        {
            res.headers.insert(Header::LastModified, fmt_http_date(modified));
        }
        Ok(res)
    }

    /// Creates a response with a plain text body.
    fn from_text<S>(content: S) -> Response
    where
        S: Into<String>,
    {
        Response::new().text(content)
    }

    /// Creates a response with the given status, describing it as text.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::{Response, ResponseExt, Status};
    ///
    /// // Describe the status in the body
    /// let res = Response::from_status(Status::NotFound);
    /// assert_eq!(res.status, Status::NotFound);
    /// assert_eq!(res.body, b"Not Found");
    /// ```
    #[must_use]
    fn from_status(status: Status) -> Response {
        Response::new().status(status).text(status.name())
    }

    /// Creates a `302 Found` response pointing to the given location.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::{Header, Response, ResponseExt, Status};
    ///
    /// // Send the client elsewhere
    /// let res = Response::redirect("/signin");
    /// assert_eq!(res.status, Status::Found);
    /// assert_eq!(res.headers.get(Header::Location), Some("/signin"));
    /// ```
    #[must_use]
    fn redirect<L>(location: L) -> Response
    where
        L: ToString,
    {
        Response::new()
            .status(Status::Found)
            .header(Header::Location, location)
    }

    /// Replaces the body with UTF-8 plain text.
    fn text<S>(self, content: S) -> Response
    where
        S: Into<String>;
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl ResponseExt for Response {
    fn text<S>(self, content: S) -> Response
    where
        S: Into<String>,
    {
        self.content_type(guess_content_type("body.txt"))
            .body(content.into())
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Guesses the content type of a file from its extension.
///
/// Unknown extensions map to `application/octet-stream`. Textual media types
/// carry `charset=utf-8`.
///
/// # Examples
///
/// ```
/// use webserver::http::response::guess_content_type;
///
/// // Look up by extension, ignoring case
/// let content_type = guess_content_type("theme/Site.CSS");
/// assert_eq!(content_type.media(), "text/css");
/// assert_eq!(content_type.param("charset"), Some("utf-8"));
/// ```
pub fn guess_content_type<P>(path: P) -> ContentType
where
    P: AsRef<Path>,
{
    let ext = path.as_ref().extension().and_then(|ext| ext.to_str());
    let media = ext
        .map(str::to_ascii_lowercase)
        .and_then(|ext| {
            MEDIA_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|&(_, media)| media)
        })
        .unwrap_or("application/octet-stream");

    let content_type = ContentType::new(media);
    if media.starts_with("text/") {
        content_type.with_param("charset", "utf-8")
    } else {
        content_type
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("a/b.png").media(), "image/png");
        assert_eq!(guess_content_type("b.woff2").media(), "font/woff2");
        assert_eq!(
            guess_content_type("README").media(),
            "application/octet-stream"
        );
        assert_eq!(guess_content_type("x.bin").param("charset"), None);
    }

    #[test]
    fn test_text_sets_utf8_plain() {
        let res = Response::from_text("hello");
        assert_eq!(res.status, Status::Ok);
        assert_eq!(res.content_type.media(), "text/plain");
        assert_eq!(res.content_type.param("charset"), Some("utf-8"));
        assert_eq!(res.body, b"hello");
    }
}
