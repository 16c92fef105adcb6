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

//! Digest authentication.

use md5::{Digest as _, Md5};
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::sync::Arc;
use tracing::debug;

use super::context::{AuthenticationContext, DigestContext, DigestSecret};
use super::{
    AuthorizationHeader, Authenticator, Challenge, Error, Lookup, Options,
    Result, require,
};

mod nonce;

pub use nonce::{
    DEFAULT_NONCE_CAPACITY, DEFAULT_NONCE_TTL, NonceStore, Validity,
};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Digest authentication.
///
/// Supports the `MD5` and `MD5-sess` algorithms with quality of protection
/// `auth`, as well as clients omitting the quality of protection. Nonces
/// are issued and tracked by a [`NonceStore`], which rejects replayed
/// nonce counts and reports expired nonces as stale.
///
/// The lookup callback receives a [`DigestContext`] and must fill in the
/// secret of the user, as the password itself is never transmitted.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use std::sync::Arc;
/// use webserver::auth::{
///     AuthenticationContext, Authenticator, Digest, DigestSecret, Options,
/// };
///
/// // Create authenticator with a single user
/// let digest = Digest::new(Arc::new(|ctx: &mut AuthenticationContext| {
///     let AuthenticationContext::Digest(ctx) = ctx else {
///         return false;
///     };
///     ctx.secret = Some(DigestSecret::Password("secret".into()));
///     ctx.username == "admin"
/// }));
///
/// // Create challenge
/// let challenge = digest.create_challenge("zone", &Options::default())?;
/// assert!(challenge.value.starts_with(r#"Digest realm="zone", qop="auth""#));
/// # Ok(())
/// # }
/// ```
pub struct Digest {
    /// Lookup callback.
    lookup: Lookup,
    /// Nonce store.
    nonces: Arc<NonceStore>,
    /// Opaque value echoed by clients.
    opaque: String,
}

/// Parsed Digest credentials.
#[derive(Debug)]
struct Credentials {
    /// User name.
    username: String,
    /// Realm.
    realm: String,
    /// Nonce.
    nonce: String,
    /// Request target.
    uri: String,
    /// Response hash.
    response: String,
    /// Opaque value.
    opaque: Option<String>,
    /// Algorithm.
    algorithm: Algorithm,
    /// Quality of protection parameters.
    qop: Option<Qop>,
}

/// Quality of protection parameters.
#[derive(Debug)]
struct Qop {
    /// Nonce count, as sent.
    nc: String,
    /// Nonce count.
    count: u32,
    /// Client nonce.
    cnonce: String,
}

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Digest algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Algorithm {
    /// MD5.
    Md5,
    /// MD5 with session key.
    Md5Sess,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Digest {
    /// Creates a Digest authenticator with its own nonce store.
    #[must_use]
    pub fn new(lookup: Lookup) -> Self {
        Self {
            lookup,
            nonces: Arc::new(NonceStore::default()),
            opaque: nonce::random_hex(),
        }
    }

    /// Sets the nonce store, which can be shared among authenticators.
    #[must_use]
    pub fn with_nonces(mut self, nonces: Arc<NonceStore>) -> Self {
        self.nonces = nonces;
        self
    }

    /// Sets the opaque value sent with challenges.
    #[must_use]
    pub fn with_opaque<O>(mut self, opaque: O) -> Self
    where
        O: Into<String>,
    {
        self.opaque = opaque.into();
        self
    }

    /// Returns the nonce store.
    #[must_use]
    pub fn nonces(&self) -> &Arc<NonceStore> {
        &self.nonces
    }

    /// Computes the expected response hash, or nothing without a secret.
    fn expected(
        &self, creds: &Credentials, realm: &str, method: &str,
    ) -> Option<String> {
        let mut ctx = AuthenticationContext::Digest(DigestContext {
            realm: realm.to_string(),
            username: creds.username.clone(),
            secret: None,
        });
        if !(self.lookup)(&mut ctx) {
            return None;
        }
        let AuthenticationContext::Digest(DigestContext {
            secret: Some(secret),
            ..
        }) = ctx
        else {
            debug!(username = %creds.username, "No Digest secret supplied");
            return None;
        };

        // Compute session key from the secret
        let mut ha1 = match secret {
            DigestSecret::Password(password) => {
                md5_hex(&format!("{}:{realm}:{password}", creds.username))
            }
            DigestSecret::Ha1(ha1) => ha1.to_ascii_lowercase(),
        };
        if creds.algorithm == Algorithm::Md5Sess {
            let cnonce =
                creds.qop.as_ref().map_or("", |qop| qop.cnonce.as_str());
            ha1 = md5_hex(&format!("{ha1}:{}:{cnonce}", creds.nonce));
        }

        // Compute response, with or without quality of protection
        let ha2 = md5_hex(&format!("{method}:{}", creds.uri));
        Some(match &creds.qop {
            Some(qop) => md5_hex(&format!(
                "{ha1}:{}:{}:{}:auth:{ha2}",
                creds.nonce, qop.nc, qop.cnonce
            )),
            None => md5_hex(&format!("{ha1}:{}:{ha2}", creds.nonce)),
        })
    }
}

impl Credentials {
    /// Parses Digest credentials from the data of an authorization header.
    ///
    /// Returns nothing if required parameters are missing, or if parameters
    /// request an unsupported algorithm or quality of protection.
    fn parse(data: &str) -> Option<Self> {
        let mut params = parse_params(data)?;
        let algorithm = match params.remove("algorithm").as_deref() {
            None => Algorithm::Md5,
            Some(value) if value.eq_ignore_ascii_case("md5") => Algorithm::Md5,
            Some(value) if value.eq_ignore_ascii_case("md5-sess") => {
                Algorithm::Md5Sess
            }
            Some(_) => return None,
        };

        // Nonce count and client nonce are required with `auth`
        let qop = match params.remove("qop").as_deref() {
            None => None,
            Some("auth") => {
                let nc = params.remove("nc")?;
                if nc.len() != 8 {
                    return None;
                }
                let count = u32::from_str_radix(&nc, 16).ok()?;
                let cnonce = params.remove("cnonce")?;
                Some(Qop { nc, count, cnonce })
            }
            Some(_) => return None,
        };
        if algorithm == Algorithm::Md5Sess && qop.is_none() {
            return None;
        }
        Some(Self {
            username: params.remove("username")?,
            realm: params.remove("realm")?,
            nonce: params.remove("nonce")?,
            uri: params.remove("uri")?,
            response: params.remove("response")?.to_ascii_lowercase(),
            opaque: params.remove("opaque"),
            algorithm,
            qop,
        })
    }

    /// Returns the nonce count, if quality of protection is used.
    fn count(&self) -> Option<u32> {
        self.qop.as_ref().map(|qop| qop.count)
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Authenticator for Digest {
    #[inline]
    fn scheme(&self) -> &'static str {
        "digest"
    }

    fn create_challenge(
        &self, realm: &str, options: &Options,
    ) -> Result<Challenge> {
        require(realm, "realm")?;
        let mut value = format!(
            "Digest realm=\"{}\", qop=\"auth\", nonce=\"{}\", \
             opaque=\"{}\", algorithm=MD5",
            quote(realm),
            self.nonces.issue(),
            self.opaque
        );
        if options.stale {
            value.push_str(", stale=true");
        }
        Ok(Challenge::new(value))
    }

    fn authenticate(
        &self, header: Option<&AuthorizationHeader>, realm: &str,
        method: &str, options: &mut Options,
    ) -> Result<bool> {
        let header = header.ok_or(Error::InvalidArgument("header"))?;
        require(realm, "realm")?;
        require(method, "method")?;
        if !header.is(self.scheme()) {
            return Ok(false);
        }
        let Some(creds) = Credentials::parse(&header.data) else {
            debug!("Invalid Digest credentials");
            return Ok(false);
        };

        // Credentials must have been computed for this realm and target
        if creds.realm != realm
            || creds.opaque.as_ref().is_some_and(|o| *o != self.opaque)
        {
            return Ok(false);
        }
        if let Some(uri) = &options.uri {
            if strip_query(&creds.uri) != strip_query(uri) {
                return Ok(false);
            }
        }

        // Nonce must be fresh, and the nonce count must not be reused
        match self.nonces.check(&creds.nonce, creds.count()) {
            Validity::Valid => {}
            Validity::Stale => {
                options.stale = true;
                return Ok(false);
            }
            Validity::Replayed | Validity::Unknown => {
                debug!(username = %creds.username, "Invalid Digest nonce");
                return Ok(false);
            }
        }
        let Some(expected) = self.expected(&creds, realm, method) else {
            return Ok(false);
        };
        if !constant_time_eq(expected.as_bytes(), creds.response.as_bytes()) {
            return Ok(false);
        }

        // Record nonce count, which fails if it was used concurrently
        Ok(self.nonces.commit(&creds.nonce, creds.count()))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Digest")
            .field("nonces", &self.nonces)
            .finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Parses a comma separated list of `key=value` parameters.
///
/// Keys are lowercased, and values may be quoted strings with backslash
/// escapes. Returns nothing if the list is malformed.
fn parse_params(input: &str) -> Option<HashMap<String, String>> {
    let mut params = HashMap::new();
    let mut rest = input.trim_start();
    loop {
        rest = rest
            .trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            return Some(params);
        }

        // Parse key, followed by an equals sign
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        let key = rest[..end].to_ascii_lowercase();
        rest = rest[end..].trim_start().strip_prefix('=')?.trim_start();

        // Parse quoted or plain value
        let value = if let Some(quoted) = rest.strip_prefix('"') {
            let mut value = String::new();
            let mut chars = quoted.char_indices();
            loop {
                match chars.next()? {
                    (_, '\\') => value.push(chars.next()?.1),
                    (n, '"') => {
                        rest = &quoted[n + 1..];
                        break;
                    }
                    (_, c) => value.push(c),
                }
            }
            value
        } else {
            let end = rest.find(',').unwrap_or(rest.len());
            let value = rest[..end].trim().to_string();
            rest = &rest[end..];
            value
        };
        params.insert(key, value);
    }
}

/// Escapes a value for use in a quoted string.
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Strips the query from a request target.
fn strip_query(uri: &str) -> &str {
    uri.split_once('?').map_or(uri, |(path, _)| path)
}

/// Computes the lowercase hex encoded MD5 hash of the given value.
fn md5_hex(value: &str) -> String {
    let hash = Md5::digest(value.as_bytes());
    hash.iter().fold(String::with_capacity(32), |mut acc, byte| {
        let _ = write!(acc, "{byte:02x}");
        acc
    })
}

/// Compares two byte strings in constant time.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const NONCE: &str = "dcd98b7102dd2f0e8b11d0f600bfb0c093";
    const OPAQUE: &str = "5ccc069c403ebaf9f0171e9517f40e41";
    const REALM: &str = "testrealm@host.com";

    fn mufasa(nc: &str) -> AuthorizationHeader {
        AuthorizationHeader::new(
            "Digest",
            format!(
                "username=\"Mufasa\", realm=\"{REALM}\", nonce=\"{NONCE}\", \
                 uri=\"/dir/index.html\", qop=auth, nc={nc}, \
                 cnonce=\"0a4f113b\", \
                 response=\"6629fae49393a05397450978507c4ef1\", \
                 opaque=\"{OPAQUE}\""
            ),
        )
    }

    fn digest(secret: Option<DigestSecret>) -> Digest {
        let lookup = move |ctx: &mut AuthenticationContext| {
            let AuthenticationContext::Digest(ctx) = ctx else {
                return false;
            };
            ctx.secret.clone_from(&secret);
            ctx.username == "Mufasa"
        };
        let digest = Digest::new(Arc::new(lookup));
        digest.nonces().register(NONCE.to_string());
        digest.with_opaque(OPAQUE)
    }

    fn password() -> Option<DigestSecret> {
        Some(DigestSecret::Password("Circle Of Life".to_string()))
    }

    #[test]
    fn test_authenticate_rfc_2617_vector() {
        let digest = digest(password());
        let mut options = Options {
            uri: Some("/dir/index.html".to_string()),
            ..Default::default()
        };
        let res = digest.authenticate(
            Some(&mufasa("00000001")),
            REALM,
            "GET",
            &mut options,
        );
        assert_eq!(res, Ok(true));
        assert!(!options.stale);
    }

    #[test]
    fn test_authenticate_with_ha1() {
        let ha1 = md5_hex(&format!("Mufasa:{REALM}:Circle Of Life"));
        let digest = digest(Some(DigestSecret::Ha1(ha1)));
        let res = digest.authenticate(
            Some(&mufasa("00000001")),
            REALM,
            "GET",
            &mut Options::default(),
        );
        assert_eq!(res, Ok(true));
    }

    #[test]
    fn test_authenticate_rejects_replay() {
        let digest = digest(password());
        let header = mufasa("00000001");
        let mut options = Options::default();
        assert_eq!(
            digest.authenticate(Some(&header), REALM, "GET", &mut options),
            Ok(true)
        );
        assert_eq!(
            digest.authenticate(Some(&header), REALM, "GET", &mut options),
            Ok(false)
        );
    }

    #[test]
    fn test_authenticate_rejects_replay_without_qop() {
        let digest = digest(password());
        let ha1 = md5_hex(&format!("Mufasa:{REALM}:Circle Of Life"));
        let ha2 = md5_hex("GET:/dir/index.html");
        let response = md5_hex(&format!("{ha1}:{NONCE}:{ha2}"));
        let header = AuthorizationHeader::new(
            "Digest",
            format!(
                "username=\"Mufasa\", realm=\"{REALM}\", nonce=\"{NONCE}\", \
                 uri=\"/dir/index.html\", response=\"{response}\""
            ),
        );
        let mut options = Options::default();
        assert_eq!(
            digest.authenticate(Some(&header), REALM, "GET", &mut options),
            Ok(true)
        );
        for _ in 0..2 {
            assert_eq!(
                digest.authenticate(Some(&header), REALM, "GET", &mut options),
                Ok(false)
            );
        }
        assert!(!options.stale);
    }

    #[test]
    fn test_new_does_not_track_opaque() {
        let digest = Digest::new(Arc::new(|_: &mut AuthenticationContext| {
            false
        }));
        assert!(digest.nonces().is_empty());
        assert_eq!(digest.opaque.len(), 32);
    }

    #[test]
    fn test_authenticate_without_secret() {
        let digest = digest(None);
        let res = digest.authenticate(
            Some(&mufasa("00000001")),
            REALM,
            "GET",
            &mut Options::default(),
        );
        assert_eq!(res, Ok(false));
    }

    #[test]
    fn test_authenticate_wrong_method_or_target() {
        let digest = digest(password());
        let header = mufasa("00000001");
        let mut options = Options::default();
        assert_eq!(
            digest.authenticate(Some(&header), REALM, "POST", &mut options),
            Ok(false)
        );
        options.uri = Some("/elsewhere".to_string());
        assert_eq!(
            digest.authenticate(Some(&header), REALM, "GET", &mut options),
            Ok(false)
        );
    }

    #[test]
    fn test_authenticate_stale_nonce() {
        let nonces = Arc::new(NonceStore::new(Duration::ZERO, 8));
        let digest = digest(password()).with_nonces(Arc::clone(&nonces));
        nonces.register(NONCE.to_string());
        let mut options = Options::default();
        let res = digest.authenticate(
            Some(&mufasa("00000001")),
            REALM,
            "GET",
            &mut options,
        );
        assert_eq!(res, Ok(false));
        assert!(options.stale);

        // Next challenge asks the client to retry
        let challenge = digest.create_challenge(REALM, &options).unwrap();
        assert!(challenge.value.ends_with(", stale=true"));
    }

    #[test]
    fn test_create_challenge() {
        let digest = digest(password());
        let challenge =
            digest.create_challenge("a \"b\"", &Options::default()).unwrap();
        assert!(challenge.value.starts_with(
            "Digest realm=\"a \\\"b\\\"\", qop=\"auth\", nonce=\""
        ));
        assert!(challenge.value.ends_with(&format!(
            "opaque=\"{OPAQUE}\", algorithm=MD5"
        )));
        assert_eq!(
            digest.create_challenge("", &Options::default()),
            Err(Error::InvalidArgument("realm"))
        );
    }

    #[test]
    fn test_parse_params() {
        let params =
            parse_params(r#"a="x, \"y\"", B = plain , c="""#).unwrap();
        assert_eq!(params.get("a").map(String::as_str), Some("x, \"y\""));
        assert_eq!(params.get("b").map(String::as_str), Some("plain"));
        assert_eq!(params.get("c").map(String::as_str), Some(""));
        assert!(parse_params("a=\"open").is_none());
        assert!(parse_params("=x").is_none());
    }
}
