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

//! Basic authentication.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use tracing::debug;

use super::context::{AuthenticationContext, BasicContext};
use super::{
    AuthorizationHeader, Authenticator, Challenge, Error, Lookup, Options,
    Result, require,
};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Basic authentication.
///
/// Credentials are sent as base64 encoded `username:password` pairs, which
/// are handed to the lookup callback as a [`BasicContext`].
pub struct Basic {
    /// Lookup callback.
    lookup: Lookup,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Basic {
    /// Creates a Basic authenticator.
    #[must_use]
    pub fn new(lookup: Lookup) -> Self {
        Self { lookup }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Authenticator for Basic {
    #[inline]
    fn scheme(&self) -> &'static str {
        "basic"
    }

    fn create_challenge(
        &self, realm: &str, _options: &Options,
    ) -> Result<Challenge> {
        require(realm, "realm")?;
        Ok(Challenge::new(format!("Basic realm=\"{realm}\"")))
    }

    fn authenticate(
        &self, header: Option<&AuthorizationHeader>, realm: &str,
        method: &str, _options: &mut Options,
    ) -> Result<bool> {
        let header = header.ok_or(Error::InvalidArgument("header"))?;
        require(realm, "realm")?;
        require(method, "method")?;

        // Decode credentials, which must be separated by a colon
        let Ok(bytes) = STANDARD.decode(header.data.trim()) else {
            debug!("Invalid Basic credentials");
            return Ok(false);
        };
        let decoded = String::from_utf8_lossy(&bytes);
        let Some((username, password)) = decoded.split_once(':') else {
            return Ok(false);
        };

        // Hand credentials to the lookup callback
        let mut ctx = AuthenticationContext::Basic(BasicContext {
            realm: realm.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        });
        Ok((self.lookup)(&mut ctx))
    }
}

impl fmt::Debug for Basic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Basic").finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    fn header(data: &str) -> AuthorizationHeader {
        AuthorizationHeader::new("Basic", data)
    }

    #[test]
    fn test_authenticate_calls_lookup_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let basic = Basic::new({
            let seen = Arc::clone(&seen);
            Arc::new(move |ctx: &mut AuthenticationContext| {
                seen.lock().unwrap().push(ctx.clone());
                true
            })
        });

        // "user:pass" encoded
        let res = basic.authenticate(
            Some(&header("dXNlcjpwYXNz")),
            "zone",
            "GET",
            &mut Options::default(),
        );
        assert_eq!(res, Ok(true));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![AuthenticationContext::Basic(BasicContext {
                realm: "zone".to_string(),
                username: "user".to_string(),
                password: "pass".to_string(),
            })]
        );
    }

    #[test]
    fn test_authenticate_splits_on_first_colon() {
        let basic = Basic::new(Arc::new(|ctx: &mut AuthenticationContext| {
            matches!(
                ctx,
                AuthenticationContext::Basic(ctx)
                    if ctx.username == "user" && ctx.password == "a:b"
            )
        }));

        // "user:a:b" encoded
        let res = basic.authenticate(
            Some(&header("dXNlcjphOmI=")),
            "zone",
            "GET",
            &mut Options::default(),
        );
        assert_eq!(res, Ok(true));
    }

    #[test]
    fn test_authenticate_without_colon() {
        let calls = Arc::new(AtomicUsize::new(0));
        let basic = Basic::new({
            let calls = Arc::clone(&calls);
            Arc::new(move |_: &mut AuthenticationContext| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            })
        });

        // "userpass" encoded
        let res = basic.authenticate(
            Some(&header("dXNlcnBhc3M=")),
            "zone",
            "GET",
            &mut Options::default(),
        );
        assert_eq!(res, Ok(false));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_authenticate_invalid_base64() {
        let basic = Basic::new(Arc::new(|_: &mut AuthenticationContext| true));
        let res = basic.authenticate(
            Some(&header("***")),
            "zone",
            "GET",
            &mut Options::default(),
        );
        assert_eq!(res, Ok(false));
    }

    #[test]
    fn test_authenticate_invalid_arguments() {
        let basic = Basic::new(Arc::new(|_: &mut AuthenticationContext| true));
        let mut options = Options::default();
        let header = header("dXNlcjpwYXNz");
        assert_eq!(
            basic.authenticate(None, "zone", "GET", &mut options),
            Err(Error::InvalidArgument("header"))
        );
        assert_eq!(
            basic.authenticate(Some(&header), "", "GET", &mut options),
            Err(Error::InvalidArgument("realm"))
        );
        assert_eq!(
            basic.authenticate(Some(&header), "zone", "", &mut options),
            Err(Error::InvalidArgument("method"))
        );
    }

    #[test]
    fn test_create_challenge() {
        let basic = Basic::new(Arc::new(|_: &mut AuthenticationContext| true));
        let options = Options::default();
        assert_eq!(
            basic.create_challenge("", &options),
            Err(Error::InvalidArgument("realm"))
        );
        let challenge = basic.create_challenge("zone", &options).unwrap();
        assert_eq!(
            challenge.to_string(),
            "WWW-Authenticate: Basic realm=\"zone\""
        );
    }
}
