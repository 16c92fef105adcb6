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

//! Routers.
//!
//! Routers run before modules and map requests to actions. The first router
//! that asks for the response to be sent ends routing, while routers that
//! just continue leave the request to the next router, and finally modules.

use crate::http::HandlerError;
use crate::server::{ProcessingResult, RequestContext};

mod action;
mod error;
mod params;
mod redirect;
mod route;
mod routes;

pub use action::Action;
pub use error::Error;
pub use params::Params;
pub use redirect::Redirect;
pub use route::Route;
pub use routes::{Builder, Routes};

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Router.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::http::Status;
/// use webserver::server::{ProcessingResult, RequestContext, Server};
///
/// // Create server and add router
/// let mut server = Server::new();
/// server.add_router(|ctx: &mut RequestContext| {
///     if ctx.request.uri.path != "/coffee" {
///         return Ok(ProcessingResult::Continue);
///     }
///     ctx.response.set_status(Status::ImATeapot);
///     Ok(ProcessingResult::SendResponse)
/// })?;
/// # Ok(())
/// # }
/// ```
pub trait Router: Send + Sync + 'static {
    /// Processes the given request.
    ///
    /// # Errors
    ///
    /// Protocol errors are answered with an error page, all other errors
    /// with `500 Internal Server Error`.
    fn process(
        &self, ctx: &mut RequestContext,
    ) -> Result<ProcessingResult, HandlerError>;
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<F> Router for F
where
    F: Fn(&mut RequestContext) -> Result<ProcessingResult, HandlerError>
        + Send
        + Sync
        + 'static,
{
    #[inline]
    fn process(
        &self, ctx: &mut RequestContext,
    ) -> Result<ProcessingResult, HandlerError> {
        self(ctx)
    }
}
