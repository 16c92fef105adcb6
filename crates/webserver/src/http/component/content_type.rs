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

//! HTTP content type.

use std::fmt;
use std::str::FromStr;

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP content type.
///
/// A media type together with its parameters, e.g. `charset` or `boundary`.
/// The media type is normalized to lowercase, and parameter names are matched
/// case-insensitively, while parameter values are kept verbatim.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::http::ContentType;
///
/// // Parse content type
/// let content_type: ContentType = "text/html; charset=UTF-8".parse()?;
/// assert_eq!(content_type.media(), "text/html");
/// assert_eq!(content_type.charset(), Some("UTF-8"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentType {
    /// Media type.
    media: String,
    /// Parameters.
    params: Vec<(String, String)>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl ContentType {
    /// Creates a content type without parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::ContentType;
    ///
    /// // Create content type
    /// let content_type = ContentType::new("text/plain");
    /// ```
    #[must_use]
    pub fn new<M>(media: M) -> Self
    where
        M: AsRef<str>,
    {
        Self {
            media: media.as_ref().trim().to_ascii_lowercase(),
            params: Vec::new(),
        }
    }

    /// Adds or replaces a parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::ContentType;
    ///
    /// // Create content type with charset
    /// let content_type = ContentType::new("text/plain")
    ///     .with_param("charset", "utf-8");
    /// assert_eq!(content_type.to_string(), "text/plain; charset=utf-8");
    /// ```
    #[must_use]
    pub fn with_param<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let key = key.as_ref().to_ascii_lowercase();
        let value = value.into();
        match self.params.iter_mut().find(|(name, _)| *name == key) {
            Some(param) => param.1 = value,
            None => self.params.push((key, value)),
        }
        self
    }

    /// Returns the value of the given parameter.
    pub fn param<K>(&self, key: K) -> Option<&str>
    where
        K: AsRef<str>,
    {
        let key = key.as_ref();
        self.params.iter().find_map(|(name, value)| {
            name.eq_ignore_ascii_case(key).then_some(value.as_str())
        })
    }

    /// Returns whether the media type matches, ignoring parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::ContentType;
    ///
    /// // Check media type
    /// let content_type = ContentType::new("multipart/form-data");
    /// assert!(content_type.is("Multipart/Form-Data"));
    /// ```
    pub fn is<M>(&self, media: M) -> bool
    where
        M: AsRef<str>,
    {
        self.media.eq_ignore_ascii_case(media.as_ref())
    }
}

#[allow(clippy::must_use_candidate)]
impl ContentType {
    /// Returns the media type.
    #[inline]
    pub fn media(&self) -> &str {
        &self.media
    }

    /// Returns the `charset` parameter.
    #[inline]
    pub fn charset(&self) -> Option<&str> {
        self.param("charset")
    }

    /// Returns the `boundary` parameter.
    #[inline]
    pub fn boundary(&self) -> Option<&str> {
        self.param("boundary")
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl FromStr for ContentType {
    type Err = Error;

    /// Attempts to create a content type from a string.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::ContentType`], if the media type is not of
    /// the form `type/subtype`.
    fn from_str(value: &str) -> Result<Self> {
        let mut iter = value.split(';');
        let media = iter.next().map(str::trim).unwrap_or_default();
        let valid = media.split_once('/').is_some_and(|(kind, subtype)| {
            !kind.is_empty() && !subtype.is_empty()
        });
        if !valid {
            return Err(Error::ContentType(value.to_string()));
        }

        // Parameters without a value are ignored, and quoted values unquoted
        let mut content_type = ContentType::new(media);
        for param in iter {
            if let Some((key, value)) = param.split_once('=') {
                let value = value.trim().trim_matches('"');
                content_type = content_type.with_param(key.trim(), value);
            }
        }
        Ok(content_type)
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for ContentType {
    /// Formats the content type for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.media)?;
        for (key, value) in &self.params {
            let quote = value.contains(|c: char| {
                c.is_ascii_whitespace() || matches!(c, ';' | ',' | '"')
            });
            if quote {
                write!(f, "; {key}=\"{}\"", value.replace('"', "\\\""))?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }

        // No errors occurred
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_params() {
        let content_type: ContentType =
            "multipart/form-data; boundary=\"abc def\"; CHARSET=latin1"
                .parse()
                .unwrap();
        assert!(content_type.is("multipart/form-data"));
        assert_eq!(content_type.boundary(), Some("abc def"));
        assert_eq!(content_type.charset(), Some("latin1"));
    }

    #[test]
    fn test_parse_rejects_invalid_media() {
        assert!("text".parse::<ContentType>().is_err());
        assert!("/plain".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_display_quotes_when_needed() {
        let content_type = ContentType::new("multipart/form-data")
            .with_param("boundary", "a b");
        assert_eq!(
            content_type.to_string(),
            "multipart/form-data; boundary=\"a b\""
        );
    }
}
