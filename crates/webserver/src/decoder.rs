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

//! Body decoders.
//!
//! Decoders turn request bodies into form fields and uploaded files. The
//! server picks the first decoder accepting the content type of a request,
//! and stores the result on the request before routers and modules run.

use crate::http::{ContentType, Encoding, Files, Form};

mod error;
mod multipart;
mod url;

pub use error::{Error, Result};
pub use multipart::MultipartDecoder;
pub use url::UrlDecoder;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Body decoder.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::decoder::{BodyDecoder, UrlDecoder};
/// use webserver::http::{ContentType, Encoding};
///
/// // Decode form body
/// let content_type: ContentType =
///     "application/x-www-form-urlencoded".parse()?;
/// assert!(UrlDecoder.can_decode(&content_type));
/// let decoded =
///     UrlDecoder.decode(b"kind=arabica", &content_type, Encoding::Utf8)?;
/// assert_eq!(decoded.form.get("kind"), Some("arabica"));
/// # Ok(())
/// # }
/// ```
pub trait BodyDecoder: Send + Sync + 'static {
    /// Returns whether the decoder handles the given content type.
    fn can_decode(&self, content_type: &ContentType) -> bool;

    /// Decodes the given body.
    ///
    /// # Errors
    ///
    /// This method returns [`Error`], if the body is malformed.
    fn decode(
        &self, body: &[u8], content_type: &ContentType, encoding: Encoding,
    ) -> Result<Decoded>;
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Decoded body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Form fields.
    pub form: Form,
    /// Uploaded files.
    pub files: Files,
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns the default decoders, multipart before URL-encoded.
#[must_use]
pub fn defaults() -> Vec<Box<dyn BodyDecoder>> {
    vec![Box::new(MultipartDecoder), Box::new(UrlDecoder)]
}
