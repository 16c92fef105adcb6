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

//! Route parameters.

use std::iter::Copied;
use std::slice::Iter;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Parameters captured by `{...}` segments of a matched route.
///
/// Names borrow from the route table and values from the request path, so
/// capturing parameters never allocates strings.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::router::{Params, Routes};
/// use webserver::server::{ProcessingResult, RequestContext};
///
/// // Echo the captured user name
/// let routes = Routes::builder()
///     .get("/users/{name}", |ctx: &mut RequestContext, params: &Params| {
///         let name = params.get("name").unwrap_or("anonymous");
///         ctx.response.body = name.as_bytes().to_vec();
///         Ok(ProcessingResult::SendResponse)
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params<'r, 'p> {
    /// Captured names and values, in pattern order.
    pairs: Vec<(&'r str, &'p str)>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<'r, 'p> Params<'r, 'p> {
    /// Collects the parameters of a route table match.
    pub(crate) fn from_match(captured: &matchit::Params<'r, 'p>) -> Self {
        Self { pairs: captured.iter().collect() }
    }

    /// Returns the value captured for the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'p str> {
        self.pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|&(_, value)| value)
    }

    /// Returns an iterator over names and values.
    pub fn iter(&self) -> Copied<Iter<'_, (&'r str, &'p str)>> {
        self.pairs.iter().copied()
    }
}

#[allow(clippy::must_use_candidate)]
impl Params<'_, '_> {
    /// Returns the number of captured parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns whether nothing was captured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<'a, 'r, 'p> IntoIterator for &'a Params<'r, 'p> {
    type Item = (&'r str, &'p str);
    type IntoIter = Copied<Iter<'a, (&'r str, &'p str)>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_match_keeps_order() {
        let mut table = matchit::Router::new();
        table.insert("/{shelf}/{book}", ()).unwrap();
        let found = table.at("/poetry/odyssey").unwrap();
        let params = Params::from_match(&found.params);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("book"), Some("odyssey"));
        assert_eq!(params.get("author"), None);
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, [("shelf", "poetry"), ("book", "odyssey")]);
    }
}
