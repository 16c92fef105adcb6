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

//! HTTP connection directive.

use std::fmt;

use super::version::Version;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// HTTP connection directive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionType {
    /// Keep the connection open after the response.
    #[default]
    KeepAlive,
    /// Close the connection after the response.
    Close,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl ConnectionType {
    /// Determines the directive from a `Connection` header and the version.
    ///
    /// The header is a comma-separated list of tokens. An explicit `close` or
    /// `keep-alive` token wins, otherwise HTTP/1.1 defaults to keep-alive and
    /// HTTP/1.0 defaults to close.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::{ConnectionType, Version};
    ///
    /// // Determine connection directive
    /// let kind = ConnectionType::negotiate(None, Version::Http10);
    /// assert_eq!(kind, ConnectionType::Close);
    ///
    /// let kind =
    ///     ConnectionType::negotiate(Some("Keep-Alive"), Version::Http10);
    /// assert_eq!(kind, ConnectionType::KeepAlive);
    /// ```
    #[must_use]
    pub fn negotiate(header: Option<&str>, version: Version) -> Self {
        let tokens = header.into_iter().flat_map(|value| value.split(','));
        for token in tokens.map(str::trim) {
            if token.eq_ignore_ascii_case("close") {
                return ConnectionType::Close;
            }
            if token.eq_ignore_ascii_case("keep-alive") {
                return ConnectionType::KeepAlive;
            }
        }

        // Fall back to the version's default
        match version {
            Version::Http10 => ConnectionType::Close,
            Version::Http11 => ConnectionType::KeepAlive,
        }
    }

    /// Returns the header value.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            ConnectionType::KeepAlive => "Keep-Alive",
            ConnectionType::Close => "Close",
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl fmt::Display for ConnectionType {
    /// Formats the connection directive for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
