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

//! Percent-encoding.

use percent_encoding::{
    percent_decode, percent_decode_str, utf8_percent_encode, AsciiSet,
};
use std::borrow::Cow;

use crate::http::Encoding;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Character set to be percent-encoded in query strings.
#[rustfmt::skip]
const QUERY: &AsciiSet = &percent_encoding::CONTROLS
    .add(b' ').add(b'"').add(b'#').add(b'%').add(b'<').add(b'>').add(b'[')
    .add(b']').add(b'^').add(b'`').add(b'{').add(b'|').add(b'}').add(b'=')
    .add(b'&').add(b'+');

/// Character set to be percent-encoded in paths.
#[rustfmt::skip]
const PATH: &AsciiSet = &percent_encoding::CONTROLS
    .add(b' ').add(b'"').add(b'#').add(b'%').add(b'<').add(b'>').add(b'?')
    .add(b'`').add(b'{').add(b'}');

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Encodes a string used in a query string.
#[inline]
#[must_use]
pub fn encode(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, QUERY).into()
}

/// Encodes a string used as a path.
#[inline]
#[must_use]
pub fn encode_path(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, PATH).into()
}

/// Decodes a path, leaving `+` untouched.
#[inline]
#[must_use]
pub fn decode_path(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Decodes a string used in a query string with the given encoding.
#[must_use]
pub fn decode(value: &str, encoding: Encoding) -> String {
    let bytes: Cow<[u8]> = if value.contains('+') {
        Cow::Owned(value.replace('+', " ").into_bytes())
    } else {
        Cow::Borrowed(value.as_bytes())
    };
    let decoded: Cow<[u8]> = percent_decode(&bytes).into();
    encoding.decode(&decoded)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plus_and_percent() {
        assert_eq!(decode("a+b%21", Encoding::Utf8), "a b!");
        assert_eq!(decode("caf%E9", Encoding::Latin1), "café");
    }

    #[test]
    fn test_decode_path_keeps_plus() {
        assert_eq!(decode_path("/a+b/c%20d"), "/a+b/c d");
    }
}
