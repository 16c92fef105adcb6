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

//! Action.

use std::fmt;

use crate::http::HandlerError;
use crate::server::{ProcessingResult, RequestContext};

use super::Params;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Action.
///
/// If a route is matched, the registered action is called with the request
/// context and the [`Params`] extracted from the route, if any. Actions are
/// usually closures, registered through the [`Builder`][] of [`Routes`][].
///
/// [`Builder`]: crate::router::Builder
/// [`Routes`]: crate::router::Routes
pub trait Action: Send + Sync + 'static {
    /// Handles the given request with parameters.
    ///
    /// # Errors
    ///
    /// Errors are handled like errors of routers.
    fn handle(
        &self, ctx: &mut RequestContext, params: &Params,
    ) -> Result<ProcessingResult, HandlerError>;
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl fmt::Debug for Box<dyn Action> {
    /// Formats the action for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Box<dyn Action>")
    }
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<F> Action for F
where
    F: Fn(
            &mut RequestContext,
            &Params,
        ) -> Result<ProcessingResult, HandlerError>
        + Send
        + Sync
        + 'static,
{
    #[inline]
    fn handle(
        &self, ctx: &mut RequestContext, params: &Params,
    ) -> Result<ProcessingResult, HandlerError> {
        self(ctx, params)
    }
}
