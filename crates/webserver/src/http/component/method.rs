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

//! HTTP method.

use std::fmt;
use std::str::FromStr;

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// HTTP method.
///
/// Verbs missing from this list are not rejected. The request is forwarded
/// with [`Method::Unknown`], leaving routers and modules to answer it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Method {
    /// Verb not listed here.
    #[default]
    Unknown,
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `TRACE`
    Trace,
    /// `PATCH`
    Patch,
}

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Methods that can be parsed.
const PARSEABLE: [Method; 8] = [
    Method::Get,
    Method::Head,
    Method::Post,
    Method::Put,
    Method::Delete,
    Method::Options,
    Method::Trace,
    Method::Patch,
];

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Method {
    /// Returns the verb as sent on the wire.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Method;
    ///
    /// assert_eq!(Method::Delete.name(), "DELETE");
    /// ```
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Method::Unknown => "UNKNOWN",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
        }
    }

    /// Parses a verb, falling back to [`Method::Unknown`].
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Method;
    ///
    /// // Verbs are matched regardless of case
    /// assert_eq!(Method::parse_lossy("patch"), Method::Patch);
    /// assert_eq!(Method::parse_lossy("PROPFIND"), Method::Unknown);
    /// ```
    #[must_use]
    pub fn parse_lossy(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl FromStr for Method {
    type Err = Error;

    /// Parses a verb, ignoring case.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Method`] for verbs not listed in
    /// [`Method`]. The string `UNKNOWN` is rejected as well.
    fn from_str(value: &str) -> Result<Self> {
        PARSEABLE
            .into_iter()
            .find(|method| method.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| Error::Method(value.to_string()))
    }
}

impl AsRef<str> for Method {
    #[inline]
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_listed_verb() {
        for method in PARSEABLE {
            assert_eq!(method.name().parse::<Method>(), Ok(method));
        }
    }

    #[test]
    fn test_unknown_is_never_parsed() {
        assert_eq!(
            "UNKNOWN".parse::<Method>(),
            Err(Error::Method(String::from("UNKNOWN")))
        );
        assert_eq!(Method::parse_lossy("UNKNOWN"), Method::Unknown);
        assert_eq!(Method::Unknown.to_string(), "UNKNOWN");
    }
}
