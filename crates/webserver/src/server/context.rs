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

//! Request context.

use std::net::SocketAddr;

use crate::http::{Request, Response};
use crate::listener::Peer;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Result of a router or module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProcessingResult {
    /// Continue with the next router or module.
    #[default]
    Continue,
    /// Send the response and stop processing.
    SendResponse,
    /// Stop processing without sending anything.
    Abort,
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Request context.
///
/// Passed to every router, module and pre-send observer. The request is
/// read-only at this point, as body decoding already took place, while the
/// response can be changed freely until it's sent.
#[derive(Debug)]
pub struct RequestContext<'a> {
    /// Connection endpoints.
    pub peer: &'a Peer,
    /// Request.
    pub request: &'a Request,
    /// Response.
    pub response: &'a mut Response,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<'a> RequestContext<'a> {
    /// Creates a request context.
    #[must_use]
    pub fn new(
        peer: &'a Peer, request: &'a Request, response: &'a mut Response,
    ) -> Self {
        Self { peer, request, response }
    }
}

#[allow(clippy::must_use_candidate)]
impl RequestContext<'_> {
    /// Returns the address of the client.
    #[inline]
    pub fn remote_addr(&self) -> SocketAddr {
        self.peer.remote_addr
    }

    /// Returns the address the client connected to.
    #[inline]
    pub fn local_addr(&self) -> SocketAddr {
        self.peer.local_addr
    }

    /// Returns whether the connection is encrypted.
    #[inline]
    pub fn is_secure(&self) -> bool {
        self.peer.secure
    }
}
