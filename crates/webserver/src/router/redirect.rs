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

//! Redirect router.

use crate::http::{HandlerError, Header, Status};
use crate::server::{ProcessingResult, RequestContext};

use super::Router;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Redirect router.
///
/// Answers requests for a path with `302 Found`, pointing the client to
/// another location. The query string is not taken into account.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::router::Redirect;
/// use webserver::server::Server;
///
/// // Create server and redirect root
/// let mut server = Server::new();
/// server.add_router(Redirect::new("/", "/index.html"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Redirect {
    /// Path to redirect from.
    from: String,
    /// Location to redirect to.
    to: String,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Redirect {
    /// Creates a redirect router.
    #[must_use]
    pub fn new<F, T>(from: F, to: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        Self { from: from.into(), to: to.into() }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Router for Redirect {
    fn process(
        &self, ctx: &mut RequestContext,
    ) -> Result<ProcessingResult, HandlerError> {
        if ctx.request.uri.path != self.from {
            return Ok(ProcessingResult::Continue);
        }
        ctx.response.set_status(Status::Found);
        ctx.response.headers.insert(Header::Location, self.to.as_str());
        ctx.response.body.clear();
        Ok(ProcessingResult::SendResponse)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use crate::http::{Request, Response};
    use crate::listener::Peer;

    use super::*;

    #[test]
    fn test_redirect() -> Result<(), HandlerError> {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let peer = Peer { remote_addr: addr, local_addr: addr, secure: false };
        let router = Redirect::new("/old", "/new");

        // Matching path is redirected
        let request = Request::new().uri("/old?x=1");
        let mut response = Response::new();
        let mut ctx = RequestContext::new(&peer, &request, &mut response);
        assert_eq!(router.process(&mut ctx)?, ProcessingResult::SendResponse);
        assert_eq!(response.status, Status::Found);
        assert_eq!(response.headers.get(Header::Location), Some("/new"));

        // Other paths are left alone
        let request = Request::new().uri("/older");
        let mut response = Response::new();
        let mut ctx = RequestContext::new(&peer, &request, &mut response);
        assert_eq!(router.process(&mut ctx)?, ProcessingResult::Continue);
        Ok(())
    }
}
