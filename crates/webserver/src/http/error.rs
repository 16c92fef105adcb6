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

//! HTTP errors raised while handling requests.

use std::error::Error as StdError;
use std::{fmt, io};
use thiserror::Error;

use super::component::Status;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Protocol error.
///
/// An expected, user-facing failure carrying the status and reason phrase
/// that the client should receive, e.g. a malformed request or a resource
/// that does not exist. Protocol errors are always answered with an error
/// page, either rendered by an observer or a minimal default one.
///
/// # Examples
///
/// ```
/// use webserver::http::{ProtocolError, Status};
///
/// // Create protocol error with custom reason
/// let err = ProtocolError::new(Status::Forbidden)
///     .with_reason("Members only");
/// assert_eq!(err.to_string(), "403 Members only");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolError {
    /// Response status.
    pub status: Status,
    /// Reason phrase.
    pub reason: String,
}

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Handler error.
///
/// Returned by observers, routers and modules. Protocol errors are rendered
/// as error pages, while all other errors are logged, reported to exception
/// observers and answered with `500 Internal Server Error`.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Protocol error.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Any other error.
    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl ProtocolError {
    /// Creates a protocol error with the canonical reason phrase.
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            status,
            reason: status.name().to_string(),
        }
    }

    /// Replaces the reason phrase.
    #[must_use]
    pub fn with_reason<R>(mut self, reason: R) -> Self
    where
        R: Into<String>,
    {
        self.reason = reason.into();
        self
    }
}

impl HandlerError {
    /// Wraps an arbitrary error.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    /// use webserver::http::HandlerError;
    ///
    /// // Wrap error
    /// let err = HandlerError::other(io::Error::other("disk on fire"));
    /// assert_eq!(err.to_string(), "disk on fire");
    /// ```
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        HandlerError::Other(err.into())
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl StdError for ProtocolError {}

impl fmt::Display for ProtocolError {
    /// Formats the protocol error for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.status.code(), self.reason)
    }
}

impl From<Status> for ProtocolError {
    #[inline]
    fn from(status: Status) -> Self {
        Self::new(status)
    }
}

// ----------------------------------------------------------------------------

impl From<Status> for HandlerError {
    #[inline]
    fn from(status: Status) -> Self {
        HandlerError::Protocol(status.into())
    }
}

impl From<io::Error> for HandlerError {
    #[inline]
    fn from(err: io::Error) -> Self {
        HandlerError::Other(Box::new(err))
    }
}
