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

//! Route pattern.

use std::fmt;
use std::str::FromStr;

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Route pattern.
///
/// An absolute path like `/users/{name}`, where each `{...}` segment captures
/// a parameter. Apart from the root pattern, patterns never end in `/`, so
/// nesting one pattern below another is plain concatenation.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::router::Route;
///
/// // Nest a pattern below a scope
/// let scope: Route = "/users".parse()?;
/// let route = scope.join(&"/{name}".parse()?);
/// assert_eq!(route.as_str(), "/users/{name}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route(String);

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Route {
    /// Creates the root pattern `/`.
    #[must_use]
    pub fn root() -> Self {
        Self(String::from("/"))
    }

    /// Returns the given pattern nested below this one.
    #[must_use]
    pub fn join(&self, child: &Self) -> Self {
        match (self.as_str(), child.as_str()) {
            ("/", _) => child.clone(),
            (_, "/") => self.clone(),
            (scope, path) => Self(format!("{scope}{path}")),
        }
    }
}

#[allow(clippy::must_use_candidate)]
impl Route {
    /// Returns the pattern as a string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl FromStr for Route {
    type Err = Error;

    /// Parses a pattern.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Empty`], [`Error::Relative`] or
    /// [`Error::Trailing`], if the pattern is malformed.
    fn from_str(value: &str) -> Result<Self> {
        match value {
            "" => Err(Error::Empty),
            "/" => Ok(Self::root()),
            _ if !value.starts_with('/') => {
                Err(Error::Relative(value.to_string()))
            }
            _ if value.ends_with('/') => {
                Err(Error::Trailing(value.to_string()))
            }
            _ => Ok(Self(value.to_string())),
        }
    }
}

impl Default for Route {
    #[inline]
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!("".parse::<Route>(), Err(Error::Empty));
        assert_eq!(
            "users".parse::<Route>(),
            Err(Error::Relative(String::from("users")))
        );
        assert_eq!(
            "/users/".parse::<Route>(),
            Err(Error::Trailing(String::from("/users/")))
        );
    }

    #[test]
    fn test_join_with_root() -> Result {
        let route: Route = "/users".parse()?;
        assert_eq!(Route::root().join(&route), route);
        assert_eq!(route.join(&Route::root()), route);
        Ok(())
    }
}
