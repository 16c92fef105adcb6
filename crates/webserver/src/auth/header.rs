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

//! Authorization header.

use std::fmt;
use std::str::FromStr;

use super::error::Error;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Authorization header.
///
/// Holds the value of an `Authorization` header, split into the scheme and
/// the scheme-specific data that follows it.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::auth::AuthorizationHeader;
///
/// // Parse authorization header
/// let header: AuthorizationHeader = "Basic dXNlcjpwYXNz".parse()?;
/// assert_eq!(header.scheme, "Basic");
/// assert_eq!(header.data, "dXNlcjpwYXNz");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationHeader {
    /// Authentication scheme, as sent by the client.
    pub scheme: String,
    /// Scheme-specific data.
    pub data: String,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl AuthorizationHeader {
    /// Creates an authorization header.
    #[must_use]
    pub fn new<S, D>(scheme: S, data: D) -> Self
    where
        S: Into<String>,
        D: Into<String>,
    {
        Self { scheme: scheme.into(), data: data.into() }
    }

    /// Returns whether the header uses the given scheme.
    #[must_use]
    pub fn is(&self, scheme: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme)
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl FromStr for AuthorizationHeader {
    type Err = Error;

    /// Parses an authorization header value.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let (scheme, data) = value
            .split_once(char::is_whitespace)
            .unwrap_or((value, ""));
        if scheme.is_empty() {
            return Err(Error::InvalidArgument("scheme"));
        }
        Ok(Self::new(scheme, data.trim_start()))
    }
}

impl fmt::Display for AuthorizationHeader {
    /// Formats the authorization header for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.data.is_empty() {
            f.write_str(&self.scheme)
        } else {
            write!(f, "{} {}", self.scheme, self.data)
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
    fn test_parse_scheme_only() {
        let header: AuthorizationHeader = "Negotiate".parse().unwrap();
        assert_eq!(header, AuthorizationHeader::new("Negotiate", ""));
        assert!(header.is("negotiate"));
    }

    #[test]
    fn test_parse_empty() {
        let res = "   ".parse::<AuthorizationHeader>();
        assert_eq!(res, Err(Error::InvalidArgument("scheme")));
    }
}
