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

//! Request target.

use std::fmt;

mod encoding;
mod query;

use encoding::{decode_path, encode_path};
pub use query::{Pairs, Query};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Request target in origin form, e.g. `/docs/index.html?lang=en`.
///
/// The path is kept percent-decoded and the query string as ordered pairs.
/// Absolute and authority forms, as sent to proxies, are not recognized,
/// and are rejected by request parsing since their path lacks a leading `/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Uri {
    /// Decoded path.
    pub path: String,
    /// Query string.
    pub query: Query,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Uri {
    /// Creates a target pointing to `/`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a target from a decoded path and a query string.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::{Query, Uri};
    ///
    /// // Reserved characters are encoded when formatting
    /// let uri = Uri::from_parts("/a b", Query::from("page=2"));
    /// assert_eq!(uri.to_string(), "/a%20b?page=2");
    /// ```
    #[must_use]
    pub fn from_parts<P>(path: P, query: Query) -> Self
    where
        P: Into<String>,
    {
        Self { path: path.into(), query }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl From<&str> for Uri {
    /// Splits a raw target at the first `?` and decodes both parts.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Uri;
    ///
    /// // Decode path and query string
    /// let uri = Uri::from("/my%20docs/?lang=en&q=a+b");
    /// assert_eq!(uri.path, "/my docs/");
    /// assert_eq!(uri.query.get("q"), Some("a b"));
    /// ```
    fn from(target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self::from_parts(decode_path(path), Query::from(query))
    }
}

impl Default for Uri {
    fn default() -> Self {
        Self::from_parts("/", Query::new())
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_path(&self.path))?;
        if self.query.is_empty() {
            Ok(())
        } else {
            write!(f, "?{}", self.query)
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_without_query() {
        let uri = Uri::from("/index.html");
        assert_eq!(uri.path, "/index.html");
        assert!(uri.query.is_empty());
    }

    #[test]
    fn test_from_splits_at_first_question_mark() {
        let uri = Uri::from("/search?q=why?");
        assert_eq!(uri.path, "/search");
        assert_eq!(uri.query.get("q"), Some("why?"));
    }
}
