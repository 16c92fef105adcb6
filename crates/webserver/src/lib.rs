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

//! Embeddable HTTP/1.x server engine.
//!
//! Listeners accept connections on their own poll loop thread and hand
//! parsed requests to a pool of workers, which run them through the
//! pipeline of a [`Server`][server::Server]: request observers, body
//! decoders, routers and modules, in that order. Responses are written
//! with the exact wire format clients expect, and connections are kept
//! alive or closed as negotiated. Authentication schemes plug in as
//! [`Authenticator`][auth::Authenticator] implementations.
//!
//! Everything is implemented with sync Rust to keep dependencies minimal
//! and avoid async runtimes. Encryption is left to the embedding
//! application, which can provide its own transport.

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]

pub mod auth;
pub mod decoder;
pub mod http;
pub mod listener;
pub mod module;
pub mod router;
pub mod server;
