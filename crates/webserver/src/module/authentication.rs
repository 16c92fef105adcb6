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

//! Module requiring authentication.

use std::fmt;
use tracing::debug;

use crate::auth::{Authenticator, AuthorizationHeader, Options};
use crate::http::{HandlerError, Header, Status};
use crate::server::{ProcessingResult, RequestContext};

use super::Module;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Module requiring authentication.
///
/// Requests that don't carry valid credentials for any of the registered
/// authenticators are answered with `401 Unauthorized`, including one
/// challenge per authenticator, in the order they were added. Requests
/// with valid credentials are passed on to the next module.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use std::sync::Arc;
/// use webserver::auth::{AuthenticationContext, Basic};
/// use webserver::module::Authentication;
/// use webserver::server::Server;
///
/// // Create server and protect everything below /admin
/// let basic = Basic::new(Arc::new(|ctx: &mut AuthenticationContext| {
///     ctx.username() == "admin"
/// }));
/// let mut server = Server::new();
/// server.add_module(
///     Authentication::new("admin area")
///         .authenticator(basic)
///         .prefix("/admin"),
/// )?;
/// # Ok(())
/// # }
/// ```
pub struct Authentication {
    /// Realm.
    realm: String,
    /// Authenticators.
    authenticators: Vec<Box<dyn Authenticator>>,
    /// Path prefix requiring authentication.
    prefix: Option<String>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Authentication {
    /// Creates a module requiring authentication for the given realm.
    #[must_use]
    pub fn new<R>(realm: R) -> Self
    where
        R: Into<String>,
    {
        Self {
            realm: realm.into(),
            authenticators: Vec::new(),
            prefix: None,
        }
    }

    /// Adds an authenticator.
    #[must_use]
    pub fn authenticator<A>(mut self, authenticator: A) -> Self
    where
        A: Authenticator,
    {
        self.authenticators.push(Box::new(authenticator));
        self
    }

    /// Restricts authentication to the given path and the paths below it.
    #[must_use]
    pub fn prefix<P>(mut self, prefix: P) -> Self
    where
        P: Into<String>,
    {
        self.prefix = Some(prefix.into());
        self
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Module for Authentication {
    fn process(
        &self, ctx: &mut RequestContext,
    ) -> Result<ProcessingResult, HandlerError> {
        let req = ctx.request;
        if let Some(prefix) = &self.prefix {
            if !is_below(&req.uri.path, prefix) {
                return Ok(ProcessingResult::Continue);
            }
        }

        // Hand credentials to the authenticator of the given scheme, which
        // must compare them against the target and method as sent
        let mut options = Options {
            uri: Some(req.target.clone()),
            ..Default::default()
        };
        let header = req.headers.get(Header::Authorization);
        let header =
            header.and_then(|v| v.parse::<AuthorizationHeader>().ok());
        if let Some(header) = &header {
            let method = req.verb.as_str();
            let iter = self.authenticators.iter();
            for auth in iter.filter(|auth| header.is(auth.scheme())) {
                let res = auth.authenticate(
                    Some(header),
                    &self.realm,
                    method,
                    &mut options,
                );
                if res.map_err(HandlerError::other)? {
                    return Ok(ProcessingResult::Continue);
                }
            }
            debug!(scheme = %header.scheme, "Authentication failed");
        }

        // Challenge the client with every authenticator
        ctx.response.set_status(Status::Unauthorized);
        ctx.response.body.clear();
        for auth in &self.authenticators {
            let challenge = auth
                .create_challenge(&self.realm, &options)
                .map_err(HandlerError::other)?;
            ctx.response.headers.append(challenge.name, challenge.value);
        }
        Ok(ProcessingResult::SendResponse)
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let schemes: Vec<_> =
            self.authenticators.iter().map(|auth| auth.scheme()).collect();
        f.debug_struct("Authentication")
            .field("realm", &self.realm)
            .field("schemes", &schemes)
            .field("prefix", &self.prefix)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns whether the path equals the prefix or lies below it.
fn is_below(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix).is_some_and(|rest| {
        rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/')
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use md5::{Digest as _, Md5};
    use std::net::SocketAddr;
    use std::sync::Arc;

    use crate::auth::{
        AuthenticationContext, Basic, Digest, DigestSecret, NonceStore,
    };
    use crate::http::{Request, Response};
    use crate::listener::Peer;

    use super::*;

    fn module() -> Authentication {
        let lookup: crate::auth::Lookup = Arc::new(|ctx: &mut AuthenticationContext| {
            matches!(
                ctx,
                AuthenticationContext::Basic(ctx)
                    if ctx.username == "user" && ctx.password == "pass"
            )
        });
        Authentication::new("zone")
            .authenticator(Basic::new(Arc::clone(&lookup)))
            .authenticator(Digest::new(lookup))
            .prefix("/private")
    }

    fn digest_module(nonces: &Arc<NonceStore>) -> Authentication {
        let lookup = Arc::new(|ctx: &mut AuthenticationContext| {
            let AuthenticationContext::Digest(ctx) = ctx else {
                return false;
            };
            ctx.secret = Some(DigestSecret::Password("pass".to_string()));
            ctx.username == "user"
        });
        let digest = Digest::new(lookup).with_nonces(Arc::clone(nonces));
        Authentication::new("zone").authenticator(digest).prefix("/private")
    }

    fn md5_hex(value: &str) -> String {
        Md5::digest(value.as_bytes())
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    fn digest_request(nonce: &str, verb: &str, target: &str) -> Request {
        let ha1 = md5_hex("user:zone:pass");
        let ha2 = md5_hex(&format!("{verb}:{target}"));
        let response = md5_hex(&format!("{ha1}:{nonce}:{ha2}"));
        let bytes = format!(
            "{verb} {target} HTTP/1.1\r\n\
             Authorization: Digest username=\"user\", realm=\"zone\", \
             nonce=\"{nonce}\", uri=\"{target}\", \
             response=\"{response}\"\r\n\r\n"
        );
        let (request, _) =
            Request::from_bytes(bytes.as_bytes()).unwrap().unwrap();
        request
    }

    fn process(
        module: &Authentication, request: &Request,
    ) -> (ProcessingResult, Response) {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let peer = Peer { remote_addr: addr, local_addr: addr, secure: false };
        let mut response = Response::for_request(request);
        let mut ctx = RequestContext::new(&peer, request, &mut response);
        let res = module.process(&mut ctx).unwrap();
        (res, response)
    }

    #[test]
    fn test_valid_credentials() {
        let request = Request::new()
            .uri("/private/data")
            .header(Header::Authorization, "Basic dXNlcjpwYXNz");
        let (res, response) = process(&module(), &request);
        assert_eq!(res, ProcessingResult::Continue);
        assert_eq!(response.status, Status::Ok);
    }

    #[test]
    fn test_challenge_per_authenticator() {
        let request = Request::new()
            .uri("/private/data")
            .header(Header::Authorization, "Basic d3Jvbmc6d3Jvbmc=");
        let (res, response) = process(&module(), &request);
        assert_eq!(res, ProcessingResult::SendResponse);
        assert_eq!(response.status, Status::Unauthorized);
        let challenges: Vec<_> =
            response.headers.get_all(Header::WwwAuthenticate).collect();
        assert_eq!(challenges.len(), 2);
        assert_eq!(challenges[0], "Basic realm=\"zone\"");
        assert!(challenges[1].starts_with("Digest realm=\"zone\""));
    }

    #[test]
    fn test_prefix() {
        let request = Request::new().uri("/public");
        let (res, _) = process(&module(), &request);
        assert_eq!(res, ProcessingResult::Continue);
    }

    #[test]
    fn test_prefix_matches_whole_segments() {
        let module = module();
        for path in ["/private", "/private/", "/private/a/b"] {
            let (res, _) = process(&module, &Request::new().uri(path));
            assert_eq!(res, ProcessingResult::SendResponse, "{path}");
        }
        for path in ["/privately", "/private-notes/a"] {
            let (res, _) = process(&module, &Request::new().uri(path));
            assert_eq!(res, ProcessingResult::Continue, "{path}");
        }
        assert!(is_below("/admin/x", "/admin/"));
        assert!(is_below("/anything", "/"));
        assert!(!is_below("/administrator", "/admin"));
    }

    #[test]
    fn test_digest_with_escaped_target() {
        let nonces = Arc::new(NonceStore::default());
        let module = digest_module(&nonces);
        let request =
            digest_request(&nonces.issue(), "GET", "/private/my%20file");
        assert_eq!(request.uri.path, "/private/my file");
        let (res, response) = process(&module, &request);
        assert_eq!(res, ProcessingResult::Continue);
        assert_eq!(response.status, Status::Ok);
    }

    #[test]
    fn test_digest_with_extension_method() {
        let nonces = Arc::new(NonceStore::default());
        let module = digest_module(&nonces);
        let request =
            digest_request(&nonces.issue(), "PROPFIND", "/private/dir");
        let (res, _) = process(&module, &request);
        assert_eq!(res, ProcessingResult::Continue);
    }
}
