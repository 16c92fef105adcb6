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

//! Modules.
//!
//! Modules run after routers, in the order they were added, and implement
//! cross-cutting behavior like serving files or requiring authentication.
//! The first module that asks for the response to be sent ends processing.

use crate::http::HandlerError;
use crate::server::{ProcessingResult, RequestContext};

mod authentication;
mod files;

pub use authentication::Authentication;
pub use files::FileModule;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Module.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::http::Header;
/// use webserver::server::{ProcessingResult, RequestContext, Server};
///
/// // Create server and add module
/// let mut server = Server::new();
/// server.add_module(|ctx: &mut RequestContext| {
///     ctx.response.headers.insert(Header::CacheControl, "no-store");
///     Ok(ProcessingResult::Continue)
/// })?;
/// # Ok(())
/// # }
/// ```
pub trait Module: Send + Sync + 'static {
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

impl<F> Module for F
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
