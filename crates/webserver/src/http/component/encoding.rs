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

//! Character encoding.

use std::fmt;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Character encoding.
///
/// Bodies are decoded with the charset announced in the content type, which
/// falls back to UTF-8 when it is absent or unknown. Decoding is lossy, since
/// malformed bodies must never fail a request on their own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8
    #[default]
    Utf8,
    /// US-ASCII
    Ascii,
    /// ISO-8859-1
    Latin1,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Encoding {
    /// Resolves an encoding from a charset label, falling back to UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Encoding;
    ///
    /// // Resolve encodings from labels
    /// assert_eq!(Encoding::from_label(Some("ISO-8859-1")), Encoding::Latin1);
    /// assert_eq!(Encoding::from_label(Some("koi8-r")), Encoding::Utf8);
    /// assert_eq!(Encoding::from_label(None), Encoding::Utf8);
    /// ```
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label.map(str::trim) else {
            return Encoding::Utf8;
        };
        match label.to_ascii_lowercase().as_str() {
            "us-ascii" | "ascii" => Encoding::Ascii,
            "iso-8859-1" | "iso8859-1" | "latin1" | "l1" => Encoding::Latin1,
            _ => Encoding::Utf8,
        }
    }

    /// Decodes the given bytes into a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Encoding;
    ///
    /// // Decode latin1 bytes
    /// let text = Encoding::Latin1.decode(b"caf\xe9");
    /// assert_eq!(text, "café");
    /// ```
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Encoding::Ascii => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        char::from(b)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        }
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Ascii => "us-ascii",
            Encoding::Latin1 => "iso-8859-1",
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl fmt::Display for Encoding {
    /// Formats the encoding for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
