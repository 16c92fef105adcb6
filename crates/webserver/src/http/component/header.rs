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

//! HTTP header names.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Well-known HTTP header name.
///
/// Saves spelling out names when reading and writing [`Headers`][], which
/// accept any string as well. Names missing from this list are kept as they
/// were received.
///
/// [`Headers`]: crate::http::Headers
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Header {
    /// `Accept`
    Accept,
    /// `Accept-Charset`
    AcceptCharset,
    /// `Accept-Encoding`
    AcceptEncoding,
    /// `Accept-Language`
    AcceptLanguage,
    /// `Accept-Ranges`
    AcceptRanges,
    /// `Age`
    Age,
    /// `Allow`
    Allow,
    /// `Alt-Svc`
    AltSvc,
    /// `Authorization`
    Authorization,
    /// `Cache-Control`
    CacheControl,
    /// `Connection`
    Connection,
    /// `Content-Disposition`
    ContentDisposition,
    /// `Content-Encoding`
    ContentEncoding,
    /// `Content-Language`
    ContentLanguage,
    /// `Content-Length`
    ContentLength,
    /// `Content-Location`
    ContentLocation,
    /// `Content-Range`
    ContentRange,
    /// `Content-Security-Policy`
    ContentSecurityPolicy,
    /// `Content-Type`
    ContentType,
    /// `Cookie`
    Cookie,
    /// `Date`
    Date,
    /// `ETag`
    ETag,
    /// `Expect`
    Expect,
    /// `Expires`
    Expires,
    /// `Forwarded`
    Forwarded,
    /// `From`
    From,
    /// `Host`
    Host,
    /// `If-Match`
    IfMatch,
    /// `If-Modified-Since`
    IfModifiedSince,
    /// `If-None-Match`
    IfNoneMatch,
    /// `If-Range`
    IfRange,
    /// `If-Unmodified-Since`
    IfUnmodifiedSince,
    /// `Keep-Alive`
    KeepAlive,
    /// `Last-Modified`
    LastModified,
    /// `Link`
    Link,
    /// `Location`
    Location,
    /// `Max-Forwards`
    MaxForwards,
    /// `Origin`
    Origin,
    /// `Pragma`
    Pragma,
    /// `Priority`
    Priority,
    /// `Proxy-Authenticate`
    ProxyAuthenticate,
    /// `Proxy-Authorization`
    ProxyAuthorization,
    /// `Range`
    Range,
    /// `Referer`
    Referer,
    /// `Referrer-Policy`
    ReferrerPolicy,
    /// `Retry-After`
    RetryAfter,
    /// `Server`
    Server,
    /// `Set-Cookie`
    SetCookie,
    /// `Strict-Transport-Security`
    StrictTransportSecurity,
    /// `TE`
    TE,
    /// `Trailer`
    Trailer,
    /// `Transfer-Encoding`
    TransferEncoding,
    /// `Upgrade`
    Upgrade,
    /// `Upgrade-Insecure-Requests`
    UpgradeInsecureRequests,
    /// `User-Agent`
    UserAgent,
    /// `Vary`
    Vary,
    /// `Via`
    Via,
    /// `Warning`
    Warning,
    /// `WWW-Authenticate`
    WwwAuthenticate,
}

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// All well-known header names.
const KNOWN: [Header; 59] = [
    Header::Accept,
    Header::AcceptCharset,
    Header::AcceptEncoding,
    Header::AcceptLanguage,
    Header::AcceptRanges,
    Header::Age,
    Header::Allow,
    Header::AltSvc,
    Header::Authorization,
    Header::CacheControl,
    Header::Connection,
    Header::ContentDisposition,
    Header::ContentEncoding,
    Header::ContentLanguage,
    Header::ContentLength,
    Header::ContentLocation,
    Header::ContentRange,
    Header::ContentSecurityPolicy,
    Header::ContentType,
    Header::Cookie,
    Header::Date,
    Header::ETag,
    Header::Expect,
    Header::Expires,
    Header::Forwarded,
    Header::From,
    Header::Host,
    Header::IfMatch,
    Header::IfModifiedSince,
    Header::IfNoneMatch,
    Header::IfRange,
    Header::IfUnmodifiedSince,
    Header::KeepAlive,
    Header::LastModified,
    Header::Link,
    Header::Location,
    Header::MaxForwards,
    Header::Origin,
    Header::Pragma,
    Header::Priority,
    Header::ProxyAuthenticate,
    Header::ProxyAuthorization,
    Header::Range,
    Header::Referer,
    Header::ReferrerPolicy,
    Header::RetryAfter,
    Header::Server,
    Header::SetCookie,
    Header::StrictTransportSecurity,
    Header::TE,
    Header::Trailer,
    Header::TransferEncoding,
    Header::Upgrade,
    Header::UpgradeInsecureRequests,
    Header::UserAgent,
    Header::Vary,
    Header::Via,
    Header::Warning,
    Header::WwwAuthenticate,
];

/// Well-known header names by lowercase spelling.
static BY_NAME: LazyLock<HashMap<String, Header>> = LazyLock::new(|| {
    KNOWN
        .into_iter()
        .map(|header| (header.name().to_ascii_lowercase(), header))
        .collect()
});

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Header {
    /// Returns the canonical spelling of the name.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Header;
    ///
    /// assert_eq!(Header::WwwAuthenticate.name(), "WWW-Authenticate");
    /// ```
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Header::Accept => "Accept",
            Header::AcceptCharset => "Accept-Charset",
            Header::AcceptEncoding => "Accept-Encoding",
            Header::AcceptLanguage => "Accept-Language",
            Header::AcceptRanges => "Accept-Ranges",
            Header::Age => "Age",
            Header::Allow => "Allow",
            Header::AltSvc => "Alt-Svc",
            Header::Authorization => "Authorization",
            Header::CacheControl => "Cache-Control",
            Header::Connection => "Connection",
            Header::ContentDisposition => "Content-Disposition",
            Header::ContentEncoding => "Content-Encoding",
            Header::ContentLanguage => "Content-Language",
            Header::ContentLength => "Content-Length",
            Header::ContentLocation => "Content-Location",
            Header::ContentRange => "Content-Range",
            Header::ContentSecurityPolicy => "Content-Security-Policy",
            Header::ContentType => "Content-Type",
            Header::Cookie => "Cookie",
            Header::Date => "Date",
            Header::ETag => "ETag",
            Header::Expect => "Expect",
            Header::Expires => "Expires",
            Header::Forwarded => "Forwarded",
            Header::From => "From",
            Header::Host => "Host",
            Header::IfMatch => "If-Match",
            Header::IfModifiedSince => "If-Modified-Since",
            Header::IfNoneMatch => "If-None-Match",
            Header::IfRange => "If-Range",
            Header::IfUnmodifiedSince => "If-Unmodified-Since",
            Header::KeepAlive => "Keep-Alive",
            Header::LastModified => "Last-Modified",
            Header::Link => "Link",
            Header::Location => "Location",
            Header::MaxForwards => "Max-Forwards",
            Header::Origin => "Origin",
            Header::Pragma => "Pragma",
            Header::Priority => "Priority",
            Header::ProxyAuthenticate => "Proxy-Authenticate",
            Header::ProxyAuthorization => "Proxy-Authorization",
            Header::Range => "Range",
            Header::Referer => "Referer",
            Header::ReferrerPolicy => "Referrer-Policy",
            Header::RetryAfter => "Retry-After",
            Header::Server => "Server",
            Header::SetCookie => "Set-Cookie",
            Header::StrictTransportSecurity => "Strict-Transport-Security",
            Header::TE => "TE",
            Header::Trailer => "Trailer",
            Header::TransferEncoding => "Transfer-Encoding",
            Header::Upgrade => "Upgrade",
            Header::UpgradeInsecureRequests => "Upgrade-Insecure-Requests",
            Header::UserAgent => "User-Agent",
            Header::Vary => "Vary",
            Header::Via => "Via",
            Header::Warning => "Warning",
            Header::WwwAuthenticate => "WWW-Authenticate",
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl FromStr for Header {
    type Err = Error;

    /// Looks up a well-known name, ignoring case.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Header`], if the name is not listed in
    /// [`Header`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use webserver::http::Header;
    ///
    /// // Names compare regardless of case
    /// let header: Header = "if-modified-since".parse()?;
    /// assert_eq!(header, Header::IfModifiedSince);
    /// # Ok(())
    /// # }
    /// ```
    fn from_str(value: &str) -> Result<Self> {
        BY_NAME
            .get(&value.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| Error::Header(value.to_string()))
    }
}

impl AsRef<str> for Header {
    #[inline]
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl fmt::Display for Header {
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
    fn test_every_name_parses_back() {
        for header in KNOWN {
            let upper = header.name().to_ascii_uppercase();
            assert_eq!(upper.parse::<Header>(), Ok(header));
        }
    }

    #[test]
    fn test_from_str_rejects_unlisted() {
        assert_eq!(
            "X-Request-Id".parse::<Header>(),
            Err(Error::Header(String::from("X-Request-Id")))
        );
    }
}
