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

//! Authentication context.

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Credentials presented with Basic authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicContext {
    /// Realm the credentials are checked against.
    pub realm: String,
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Credentials presented with Digest authentication.
///
/// The client never sends its password, so the lookup callback must supply
/// the secret to compare against, either as the plain password or as the
/// precomputed `HA1` hash of `username:realm:password`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigestContext {
    /// Realm the credentials are checked against.
    pub realm: String,
    /// User name.
    pub username: String,
    /// Secret supplied by the lookup callback.
    pub secret: Option<DigestSecret>,
}

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Secret of a Digest user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DigestSecret {
    /// Plain password.
    Password(String),
    /// Hex encoded `HA1` hash.
    Ha1(String),
}

/// Authentication context.
///
/// Handed to the lookup callback, which decides whether the presented
/// credentials are valid. Digest callbacks fill in the secret instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthenticationContext {
    /// Basic credentials.
    Basic(BasicContext),
    /// Digest credentials.
    Digest(DigestContext),
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

#[allow(clippy::must_use_candidate)]
impl AuthenticationContext {
    /// Returns the realm.
    #[inline]
    pub fn realm(&self) -> &str {
        match self {
            Self::Basic(ctx) => &ctx.realm,
            Self::Digest(ctx) => &ctx.realm,
        }
    }

    /// Returns the user name.
    #[inline]
    pub fn username(&self) -> &str {
        match self {
            Self::Basic(ctx) => &ctx.username,
            Self::Digest(ctx) => &ctx.username,
        }
    }
}
