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

//! Challenge/response authentication.
//!
//! Authenticators implement a single scheme, like `Basic` or `Digest`. They
//! create the challenge sent with `401 Unauthorized` responses, and validate
//! the credentials of an `Authorization` header. Whether credentials are
//! valid is decided by a [`Lookup`] callback supplied by the application.

use std::fmt;
use std::sync::Arc;

use crate::http::Header;

mod basic;
mod context;
mod digest;
mod error;
mod header;

pub use basic::Basic;
pub use context::{
    AuthenticationContext, BasicContext, DigestContext, DigestSecret,
};
pub use digest::{
    DEFAULT_NONCE_CAPACITY, DEFAULT_NONCE_TTL, Digest, NonceStore, Validity,
};
pub use error::{Error, Result};
pub use header::AuthorizationHeader;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Authenticator.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use std::sync::Arc;
/// use webserver::auth::{
///     AuthenticationContext, Authenticator, Basic, Options,
/// };
///
/// // Create authenticator accepting a single user
/// let basic = Basic::new(Arc::new(|ctx: &mut AuthenticationContext| {
///     matches!(
///         ctx,
///         AuthenticationContext::Basic(ctx)
///             if ctx.username == "admin" && ctx.password == "secret"
///     )
/// }));
///
/// // Create challenge
/// let challenge = basic.create_challenge("zone", &Options::default())?;
/// assert_eq!(
///     challenge.to_string(),
///     r#"WWW-Authenticate: Basic realm="zone""#
/// );
/// # Ok(())
/// # }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Returns the scheme name in lowercase.
    fn scheme(&self) -> &'static str;

    /// Creates a challenge for the given realm.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::InvalidArgument`], if the realm is empty.
    fn create_challenge(
        &self, realm: &str, options: &Options,
    ) -> Result<Challenge>;

    /// Validates the credentials of an authorization header.
    ///
    /// Authenticators may report details about a failed attempt through
    /// the given options, like a stale nonce, which should be taken into
    /// account when creating the next challenge.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::InvalidArgument`], if the header is
    /// missing, or the realm or method are empty.
    fn authenticate(
        &self, header: Option<&AuthorizationHeader>, realm: &str,
        method: &str, options: &mut Options,
    ) -> Result<bool>;
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Lookup callback deciding about credentials.
pub type Lookup =
    Arc<dyn Fn(&mut AuthenticationContext) -> bool + Send + Sync>;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Authentication options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Whether the presented nonce was stale.
    pub stale: bool,
    /// Request target the credentials must have been computed for.
    pub uri: Option<String>,
}

/// Challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    /// Header name.
    pub name: Header,
    /// Header value.
    pub value: String,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Challenge {
    /// Creates a `WWW-Authenticate` challenge.
    #[must_use]
    pub fn new<V>(value: V) -> Self
    where
        V: Into<String>,
    {
        Self {
            name: Header::WwwAuthenticate,
            value: value.into(),
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl fmt::Display for Challenge {
    /// Formats the challenge as a header line.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.name.name(), self.value)
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Checks that a required argument is not empty.
fn require(value: &str, name: &'static str) -> Result {
    if value.is_empty() {
        Err(Error::InvalidArgument(name))
    } else {
        Ok(())
    }
}
