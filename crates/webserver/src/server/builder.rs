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

//! Server builder.

use crate::listener::Signals;

use super::{Pipeline, Server};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Default value of the `Server` header.
pub const DEFAULT_SERVER_NAME: &str = "webserver";

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Server builder.
#[derive(Debug)]
pub struct Builder {
    /// Value of the `Server` header.
    server_name: String,
    /// Reason phrase for unhandled requests.
    not_found_reason: String,
    /// Whether error messages are sent to clients.
    expose_errors: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Builder {
    /// Creates a server builder.
    ///
    /// Note that the canonical way to create a [`Server`] is to invoke the
    /// [`Server::builder`] method, which creates an instance of [`Builder`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            server_name: String::from(DEFAULT_SERVER_NAME),
            not_found_reason: String::from("Not Found"),
            expose_errors: false,
        }
    }

    /// Sets the value of the `Server` header.
    #[must_use]
    pub fn server_name<S>(mut self, name: S) -> Self
    where
        S: Into<String>,
    {
        self.server_name = name.into();
        self
    }

    /// Sets the reason phrase of `404` responses to unhandled requests.
    #[must_use]
    pub fn not_found_reason<S>(mut self, reason: S) -> Self
    where
        S: Into<String>,
    {
        self.not_found_reason = reason.into();
        self
    }

    /// Sets whether error messages are included in `500` responses.
    ///
    /// This should only be enabled during development, as error messages
    /// might leak internal details to clients.
    #[must_use]
    pub fn expose_errors(mut self, expose: bool) -> Self {
        self.expose_errors = expose;
        self
    }

    /// Creates the server.
    #[must_use]
    pub fn build(self) -> Server {
        let pipeline = Pipeline {
            signals: Signals::default(),
            sending: Vec::new(),
            routers: Vec::new(),
            modules: Vec::new(),
            decoders: Vec::new(),
            server_name: self.server_name,
            not_found_reason: self.not_found_reason,
            expose_errors: self.expose_errors,
        };
        Server {
            pipeline: Some(pipeline),
            listeners: Vec::new(),
            started: false,
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Builder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
