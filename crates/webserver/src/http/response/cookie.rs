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

//! HTTP response cookies.

use httpdate::fmt_http_date;
use std::fmt;
use std::time::SystemTime;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP response cookie.
///
/// Rendered as `name=value[;expires=<date>][;path=<path>]`, where the expiry
/// is only written if set, and the path only if it is not empty.
///
/// # Examples
///
/// ```
/// use webserver::http::Cookie;
///
/// // Create cookie with path
/// let cookie = Cookie::new("session", "abc").path("/app");
/// assert_eq!(cookie.to_string(), "session=abc;path=/app");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Expiry date.
    pub expires: Option<SystemTime>,
    /// Cookie path.
    pub path: Option<String>,
}

/// HTTP response cookies.
///
/// An ordered set of cookies keyed by name. Setting a cookie with a name that
/// is already present replaces it in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cookies {
    /// List of cookies.
    inner: Vec<Cookie>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Cookie {
    /// Creates a session cookie.
    #[must_use]
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            value: value.into(),
            expires: None,
            path: None,
        }
    }

    /// Sets the expiry date.
    #[inline]
    #[must_use]
    pub fn expires(mut self, expires: SystemTime) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Sets the path.
    #[inline]
    #[must_use]
    pub fn path<P>(mut self, path: P) -> Self
    where
        P: Into<String>,
    {
        self.path = Some(path.into());
        self
    }
}

impl Cookies {
    /// Creates an empty cookie set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cookie with the given name.
    pub fn get<N>(&self, name: N) -> Option<&Cookie>
    where
        N: AsRef<str>,
    {
        self.inner.iter().find(|cookie| cookie.name == name.as_ref())
    }

    /// Adds a cookie, replacing a cookie with the same name in place.
    pub fn set(&mut self, cookie: Cookie) {
        match self.inner.iter_mut().find(|c| c.name == cookie.name) {
            Some(current) => *current = cookie,
            None => self.inner.push(cookie),
        }
    }

    /// Removes the cookie with the given name.
    pub fn remove<N>(&mut self, name: N)
    where
        N: AsRef<str>,
    {
        self.inner.retain(|cookie| cookie.name != name.as_ref());
    }

    /// Returns an iterator over all cookies, in order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.inner.iter()
    }
}

#[allow(clippy::must_use_candidate)]
impl Cookies {
    /// Returns the number of cookies.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether there are any cookies.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl fmt::Display for Cookie {
    /// Formats the cookie as a `Set-Cookie` value.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(expires) = self.expires {
            write!(f, ";expires={}", fmt_http_date(expires))?;
        }
        if let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) {
            write!(f, ";path={path}")?;
        }

        // No errors occurred
        Ok(())
    }
}

// ----------------------------------------------------------------------------

impl FromIterator<Cookie> for Cookies {
    /// Creates a cookie set from an iterator, later cookies winning.
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Cookie>,
    {
        let mut cookies = Cookies::new();
        for cookie in iter {
            cookies.set(cookie);
        }
        cookies
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;

    #[test]
    fn test_display_with_expiry() {
        let expires = UNIX_EPOCH + Duration::from_secs(784_111_777);
        let cookie = Cookie::new("id", "7").expires(expires).path("");
        assert_eq!(
            cookie.to_string(),
            "id=7;expires=Sun, 06 Nov 1994 08:49:37 GMT"
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut cookies = Cookies::from_iter([
            Cookie::new("a", "1"),
            Cookie::new("b", "2"),
        ]);
        cookies.set(Cookie::new("a", "3"));
        let values: Vec<_> =
            cookies.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["3", "2"]);
    }
}
