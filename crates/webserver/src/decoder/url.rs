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

//! URL-encoded form decoder.

use crate::http::{ContentType, Encoding, Query};

use super::{BodyDecoder, Decoded, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Media type handled by the decoder.
const MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// URL-encoded form decoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct UrlDecoder;

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl BodyDecoder for UrlDecoder {
    #[inline]
    fn can_decode(&self, content_type: &ContentType) -> bool {
        content_type.is(MEDIA_TYPE)
    }

    /// Decodes the body as query string, which never fails.
    fn decode(
        &self, body: &[u8], _content_type: &ContentType, encoding: Encoding,
    ) -> Result<Decoded> {
        // Encoded bodies are ASCII, the encoding applies to escaped bytes
        let text = String::from_utf8_lossy(body);
        Ok(Decoded {
            form: Query::parse(text.trim_end_matches(['\r', '\n']), encoding),
            ..Default::default()
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_latin1() -> Result {
        let content_type = ContentType::new(MEDIA_TYPE);
        let decoded = UrlDecoder.decode(
            b"name=Jos%E9&drink=caf%E9+au+lait",
            &content_type,
            Encoding::Latin1,
        )?;
        assert_eq!(decoded.form.get("name"), Some("José"));
        assert_eq!(decoded.form.get("drink"), Some("café au lait"));
        assert!(decoded.files.is_empty());
        Ok(())
    }

    #[test]
    fn test_can_decode() {
        assert!(UrlDecoder.can_decode(&ContentType::new(MEDIA_TYPE)));
        assert!(!UrlDecoder.can_decode(&ContentType::new("text/plain")));
    }
}
