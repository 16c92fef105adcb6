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

//! Multipart form decoder.

use httparse::{EMPTY_HEADER, Status};

use crate::http::{ContentType, Encoding, UploadedFile};

use super::{BodyDecoder, Decoded, Error, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Media type handled by the decoder.
const MEDIA_TYPE: &str = "multipart/form-data";

/// Maximum number of headers per part.
const MAX_PART_HEADERS: usize = 16;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Multipart form decoder.
///
/// Parts carrying a `filename` in their content disposition are collected
/// as uploaded files, all other parts as form fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct MultipartDecoder;

/// Part of a multipart body.
#[derive(Debug)]
struct Part<'a> {
    /// Form field name.
    name: String,
    /// File name, if the part is a file.
    filename: Option<String>,
    /// Content type of the part.
    content_type: Option<ContentType>,
    /// Part data.
    data: &'a [u8],
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl BodyDecoder for MultipartDecoder {
    #[inline]
    fn can_decode(&self, content_type: &ContentType) -> bool {
        content_type.is(MEDIA_TYPE)
    }

    fn decode(
        &self, body: &[u8], content_type: &ContentType, encoding: Encoding,
    ) -> Result<Decoded> {
        let boundary = content_type
            .boundary()
            .filter(|boundary| !boundary.is_empty())
            .ok_or(Error::MissingBoundary)?;

        // Sort parts into form fields and files
        let mut decoded = Decoded::default();
        for part in parse(body, boundary)? {
            match part.filename {
                Some(filename) => decoded.files.add(UploadedFile {
                    name: part.name,
                    filename,
                    content_type: part.content_type,
                    data: part.data.to_vec(),
                }),
                None => decoded.form.add(part.name, encoding.decode(part.data)),
            }
        }
        Ok(decoded)
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Splits a multipart body into parts.
fn parse<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<Part<'a>>> {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();

    // Skip preamble up to the first delimiter
    let mut pos = find(body, delimiter, 0).ok_or(Error::UnexpectedEof)?;
    let mut parts = Vec::new();
    loop {
        pos += delimiter.len();
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            return Ok(parts);
        }
        if !rest.starts_with(b"\r\n") {
            return Err(Error::Malformed("expected line break after boundary"));
        }
        pos += 2;

        // Parse part headers, which end with an empty line
        let mut headers = [EMPTY_HEADER; MAX_PART_HEADERS];
        let res = httparse::parse_headers(&body[pos..], &mut headers);
        let (n, headers) = match res {
            Ok(Status::Complete((n, headers))) => (n, headers),
            Ok(Status::Partial) => return Err(Error::UnexpectedEof),
            Err(_) => return Err(Error::InvalidHeaders),
        };
        let mut disposition = None;
        let mut content_type = None;
        for header in headers {
            let value = String::from_utf8_lossy(header.value);
            if header.name.eq_ignore_ascii_case("content-disposition") {
                disposition = Some(parse_disposition(&value)?);
            } else if header.name.eq_ignore_ascii_case("content-type") {
                content_type = value.parse().ok();
            }
        }
        let (name, filename) = disposition.ok_or(Error::MissingDisposition)?;
        pos += n;

        // Data runs up to the line break preceding the next delimiter
        let end = find(body, delimiter, pos).ok_or(Error::UnexpectedEof)?;
        let data = body[pos..end]
            .strip_suffix(b"\r\n")
            .unwrap_or(&body[pos..end]);
        parts.push(Part { name, filename, content_type, data });
        pos = end;
    }
}

/// Parses a content disposition into field name and file name.
fn parse_disposition(value: &str) -> Result<(String, Option<String>)> {
    let mut name = None;
    let mut filename = None;
    for param in value.split(';').skip(1) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_string();
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => name = Some(value),
            "filename" => filename = Some(value),
            _ => {}
        }
    }
    name.map(|name| (name, filename))
        .ok_or(Error::MissingDisposition)
}

/// Returns the position of the needle in the haystack, starting at `from`.
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|n| from + n)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn content_type() -> ContentType {
        ContentType::new(MEDIA_TYPE).with_param("boundary", "XyZ")
    }

    #[test]
    fn test_decode_fields_and_files() -> Result {
        let body = b"preamble\r\n\
            --XyZ\r\n\
            Content-Disposition: form-data; name=\"kind\"\r\n\
            \r\n\
            arabica\r\n\
            --XyZ\r\n\
            Content-Disposition: form-data; name=\"menu\"; \
            filename=\"menu.txt\"\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            espresso\r\nlatte\r\n\
            --XyZ--\r\n";
        let decoded =
            MultipartDecoder.decode(body, &content_type(), Encoding::Utf8)?;
        assert_eq!(decoded.form.get("kind"), Some("arabica"));
        let file = decoded.files.get("menu").unwrap();
        assert_eq!(file.filename, "menu.txt");
        assert_eq!(file.data, b"espresso\r\nlatte");
        assert!(file.content_type.as_ref().unwrap().is("text/plain"));
        Ok(())
    }

    #[test]
    fn test_decode_missing_boundary() {
        let res = MultipartDecoder.decode(
            b"--XyZ--",
            &ContentType::new(MEDIA_TYPE),
            Encoding::Utf8,
        );
        assert_eq!(res, Err(Error::MissingBoundary));
    }

    #[test]
    fn test_decode_unterminated() {
        let body = b"--XyZ\r\n\
            Content-Disposition: form-data; name=\"kind\"\r\n\
            \r\n\
            arabica";
        let res =
            MultipartDecoder.decode(body, &content_type(), Encoding::Utf8);
        assert_eq!(res, Err(Error::UnexpectedEof));
    }

    #[test]
    fn test_decode_missing_name() {
        let body = b"--XyZ\r\n\
            Content-Disposition: form-data\r\n\
            \r\n\
            arabica\r\n\
            --XyZ--";
        let res =
            MultipartDecoder.decode(body, &content_type(), Encoding::Utf8);
        assert_eq!(res, Err(Error::MissingDisposition));
    }
}
