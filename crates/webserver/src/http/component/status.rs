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

//! HTTP status.

use std::fmt;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// HTTP status.
///
/// The discriminant of each variant is its numeric code. Responses carry a
/// reason phrase of their own, which starts out as [`Status::name`].
#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum Status {
    // 1xx Informational
    /// `Continue`
    Continue = 100,
    /// `Switching Protocols`
    SwitchingProtocols = 101,
    /// `Processing`
    Processing = 102,
    /// `Early Hints`
    EarlyHints = 103,

    // 2xx Success
    /// `OK`
    Ok = 200,
    /// `Created`
    Created = 201,
    /// `Accepted`
    Accepted = 202,
    /// `Non-Authoritative Information`
    NonAuthoritativeInformation = 203,
    /// `No Content`
    NoContent = 204,
    /// `Reset Content`
    ResetContent = 205,
    /// `Partial Content`
    PartialContent = 206,
    /// `Multi-Status`
    MultiStatus = 207,
    /// `Already Reported`
    AlreadyReported = 208,
    /// `IM Used`
    ImUsed = 226,

    // 3xx Redirection
    /// `Multiple Choices`
    MultipleChoices = 300,
    /// `Moved Permanently`
    MovedPermanently = 301,
    /// `Found`
    Found = 302,
    /// `See Other`
    SeeOther = 303,
    /// `Not Modified`
    NotModified = 304,
    /// `Use Proxy`
    UseProxy = 305,
    /// `Temporary Redirect`
    TemporaryRedirect = 307,
    /// `Permanent Redirect`
    PermanentRedirect = 308,

    // 4xx Client Error
    /// `Bad Request`
    BadRequest = 400,
    /// `Unauthorized`
    Unauthorized = 401,
    /// `Payment Required`
    PaymentRequired = 402,
    /// `Forbidden`
    Forbidden = 403,
    /// `Not Found`
    NotFound = 404,
    /// `Method Not Allowed`
    MethodNotAllowed = 405,
    /// `Not Acceptable`
    NotAcceptable = 406,
    /// `Proxy Authentication Required`
    ProxyAuthenticationRequired = 407,
    /// `Request Timeout`
    RequestTimeout = 408,
    /// `Conflict`
    Conflict = 409,
    /// `Gone`
    Gone = 410,
    /// `Length Required`
    LengthRequired = 411,
    /// `Precondition Failed`
    PreconditionFailed = 412,
    /// `Payload Too Large`
    PayloadTooLarge = 413,
    /// `URI Too Long`
    UriTooLong = 414,
    /// `Unsupported Media Type`
    UnsupportedMediaType = 415,
    /// `Range Not Satisfiable`
    RangeNotSatisfiable = 416,
    /// `Expectation Failed`
    ExpectationFailed = 417,
    /// `I'm a Teapot`
    ImATeapot = 418,
    /// `Misdirected Request`
    MisdirectedRequest = 421,
    /// `Unprocessable Entity`
    UnprocessableEntity = 422,
    /// `Locked`
    Locked = 423,
    /// `Failed Dependency`
    FailedDependency = 424,
    /// `Too Early`
    TooEarly = 425,
    /// `Upgrade Required`
    UpgradeRequired = 426,
    /// `Precondition Required`
    PreconditionRequired = 428,
    /// `Too Many Requests`
    TooManyRequests = 429,
    /// `Request Header Fields Too Large`
    RequestHeaderFieldsTooLarge = 431,
    /// `Unavailable For Legal Reasons`
    UnavailableForLegalReasons = 451,

    // 5xx Server Error
    /// `Internal Server Error`
    InternalServerError = 500,
    /// `Not Implemented`
    NotImplemented = 501,
    /// `Bad Gateway`
    BadGateway = 502,
    /// `Service Unavailable`
    ServiceUnavailable = 503,
    /// `Gateway Timeout`
    GatewayTimeout = 504,
    /// `HTTP Version Not Supported`
    HttpVersionNotSupported = 505,
    /// `Variant Also Negotiates`
    VariantAlsoNegotiates = 506,
    /// `Insufficient Storage`
    InsufficientStorage = 507,
    /// `Loop Detected`
    LoopDetected = 508,
    /// `Not Extended`
    NotExtended = 510,
    /// `Network Authentication Required`
    NetworkAuthenticationRequired = 511,
}

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// All statuses, in ascending order of their codes.
const KNOWN: [Status; 62] = [
    Status::Continue,
    Status::SwitchingProtocols,
    Status::Processing,
    Status::EarlyHints,
    Status::Ok,
    Status::Created,
    Status::Accepted,
    Status::NonAuthoritativeInformation,
    Status::NoContent,
    Status::ResetContent,
    Status::PartialContent,
    Status::MultiStatus,
    Status::AlreadyReported,
    Status::ImUsed,
    Status::MultipleChoices,
    Status::MovedPermanently,
    Status::Found,
    Status::SeeOther,
    Status::NotModified,
    Status::UseProxy,
    Status::TemporaryRedirect,
    Status::PermanentRedirect,
    Status::BadRequest,
    Status::Unauthorized,
    Status::PaymentRequired,
    Status::Forbidden,
    Status::NotFound,
    Status::MethodNotAllowed,
    Status::NotAcceptable,
    Status::ProxyAuthenticationRequired,
    Status::RequestTimeout,
    Status::Conflict,
    Status::Gone,
    Status::LengthRequired,
    Status::PreconditionFailed,
    Status::PayloadTooLarge,
    Status::UriTooLong,
    Status::UnsupportedMediaType,
    Status::RangeNotSatisfiable,
    Status::ExpectationFailed,
    Status::ImATeapot,
    Status::MisdirectedRequest,
    Status::UnprocessableEntity,
    Status::Locked,
    Status::FailedDependency,
    Status::TooEarly,
    Status::UpgradeRequired,
    Status::PreconditionRequired,
    Status::TooManyRequests,
    Status::RequestHeaderFieldsTooLarge,
    Status::UnavailableForLegalReasons,
    Status::InternalServerError,
    Status::NotImplemented,
    Status::BadGateway,
    Status::ServiceUnavailable,
    Status::GatewayTimeout,
    Status::HttpVersionNotSupported,
    Status::VariantAlsoNegotiates,
    Status::InsufficientStorage,
    Status::LoopDetected,
    Status::NotExtended,
    Status::NetworkAuthenticationRequired,
];

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Status {
    /// Returns the canonical reason phrase.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Status;
    ///
    /// assert_eq!(Status::Unauthorized.name(), "Unauthorized");
    /// ```
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Status::Continue => "Continue",
            Status::SwitchingProtocols => "Switching Protocols",
            Status::Processing => "Processing",
            Status::EarlyHints => "Early Hints",
            Status::Ok => "OK",
            Status::Created => "Created",
            Status::Accepted => "Accepted",
            Status::NonAuthoritativeInformation => {
                "Non-Authoritative Information"
            }
            Status::NoContent => "No Content",
            Status::ResetContent => "Reset Content",
            Status::PartialContent => "Partial Content",
            Status::MultiStatus => "Multi-Status",
            Status::AlreadyReported => "Already Reported",
            Status::ImUsed => "IM Used",
            Status::MultipleChoices => "Multiple Choices",
            Status::MovedPermanently => "Moved Permanently",
            Status::Found => "Found",
            Status::SeeOther => "See Other",
            Status::NotModified => "Not Modified",
            Status::UseProxy => "Use Proxy",
            Status::TemporaryRedirect => "Temporary Redirect",
            Status::PermanentRedirect => "Permanent Redirect",
            Status::BadRequest => "Bad Request",
            Status::Unauthorized => "Unauthorized",
            Status::PaymentRequired => "Payment Required",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::NotAcceptable => "Not Acceptable",
            Status::ProxyAuthenticationRequired => {
                "Proxy Authentication Required"
            }
            Status::RequestTimeout => "Request Timeout",
            Status::Conflict => "Conflict",
            Status::Gone => "Gone",
            Status::LengthRequired => "Length Required",
            Status::PreconditionFailed => "Precondition Failed",
            Status::PayloadTooLarge => "Payload Too Large",
            Status::UriTooLong => "URI Too Long",
            Status::UnsupportedMediaType => "Unsupported Media Type",
            Status::RangeNotSatisfiable => "Range Not Satisfiable",
            Status::ExpectationFailed => "Expectation Failed",
            Status::ImATeapot => "I'm a Teapot",
            Status::MisdirectedRequest => "Misdirected Request",
            Status::UnprocessableEntity => "Unprocessable Entity",
            Status::Locked => "Locked",
            Status::FailedDependency => "Failed Dependency",
            Status::TooEarly => "Too Early",
            Status::UpgradeRequired => "Upgrade Required",
            Status::PreconditionRequired => "Precondition Required",
            Status::TooManyRequests => "Too Many Requests",
            Status::RequestHeaderFieldsTooLarge => {
                "Request Header Fields Too Large"
            }
            Status::UnavailableForLegalReasons => {
                "Unavailable For Legal Reasons"
            }
            Status::InternalServerError => "Internal Server Error",
            Status::NotImplemented => "Not Implemented",
            Status::BadGateway => "Bad Gateway",
            Status::ServiceUnavailable => "Service Unavailable",
            Status::GatewayTimeout => "Gateway Timeout",
            Status::HttpVersionNotSupported => "HTTP Version Not Supported",
            Status::VariantAlsoNegotiates => "Variant Also Negotiates",
            Status::InsufficientStorage => "Insufficient Storage",
            Status::LoopDetected => "Loop Detected",
            Status::NotExtended => "Not Extended",
            Status::NetworkAuthenticationRequired => {
                "Network Authentication Required"
            }
        }
    }

    /// Returns the status with the given numeric code, if listed.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Status;
    ///
    /// assert_eq!(Status::from_code(304), Some(Status::NotModified));
    /// assert_eq!(Status::from_code(299), None);
    /// ```
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        KNOWN
            .binary_search_by_key(&code, Status::code)
            .ok()
            .map(|index| KNOWN[index])
    }
}

#[allow(clippy::must_use_candidate)]
impl Status {
    /// Returns the numeric code.
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl AsRef<str> for Status {
    #[inline]
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl fmt::Display for Status {
    /// Formats code and reason phrase, e.g. `401 Unauthorized`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.name())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_are_sorted_and_found() {
        for pair in KNOWN.windows(2) {
            assert!(pair[0].code() < pair[1].code());
        }
        for status in KNOWN {
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Status::Unauthorized.to_string(), "401 Unauthorized");
        assert_eq!(Status::Continue.code(), 100);
    }
}
