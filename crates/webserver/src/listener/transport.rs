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

//! Connection transport.

use mio::event::Source;
use mio::net::{TcpListener, TcpStream};
use std::fmt::Debug;
use std::io::{self, Read, Write};
use std::net::SocketAddr;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Byte stream of an accepted connection.
///
/// Implemented for everything that can be read, written and polled, so
/// transports can wrap the raw socket in an encrypting stream, as long as it
/// forwards registration to the socket.
pub trait Stream: Read + Write + Source + Send + Debug {}

// ----------------------------------------------------------------------------

/// Connection transport.
///
/// The transport binds the listening socket and wraps every accepted socket
/// before requests are read from it. The [`Plain`] transport passes sockets
/// through unchanged, while an encrypted transport performs its handshake as
/// part of the returned [`Stream`].
pub trait Transport: Send + Sync + 'static {
    /// Binds the listening socket.
    fn bind(&self, addr: SocketAddr) -> io::Result<TcpListener> {
        TcpListener::bind(addr)
    }

    /// Wraps an accepted socket.
    fn wrap(&self, stream: TcpStream) -> io::Result<Box<dyn Stream>>;

    /// Returns whether connections are encrypted.
    fn is_secure(&self) -> bool {
        false
    }
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Plain, unencrypted transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Transport for Plain {
    #[inline]
    fn wrap(&self, stream: TcpStream) -> io::Result<Box<dyn Stream>> {
        Ok(Box::new(stream))
    }
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<T> Stream for T where T: Read + Write + Source + Send + Debug {}
