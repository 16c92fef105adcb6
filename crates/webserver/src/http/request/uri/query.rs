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

//! Query string and form fields.

use std::fmt;
use std::slice::Iter;

use crate::http::Encoding;

use super::encoding::{decode, encode};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Ordered list of decoded key-value pairs.
///
/// Keys may repeat, as with form submissions of several checkboxes, and
/// formatting reproduces the original order. URL-encoded request bodies are
/// parsed into the same type, see [`Form`][].
///
/// [`Form`]: crate::http::request::Form
///
/// # Examples
///
/// ```
/// use webserver::http::Query;
///
/// // Repeated keys keep every value
/// let query = Query::from("tag=rust&tag=http&page=2");
/// let tags: Vec<_> = query.get_all("tag").collect();
/// assert_eq!(tags, ["rust", "http"]);
/// assert_eq!(query.get("page"), Some("2"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    /// Decoded pairs, in order of appearance.
    pairs: Vec<(String, String)>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Query {
    /// Creates an empty query string.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query string, decoding bytes with the given encoding.
    ///
    /// Pairs are split at `&` and then at the first `=`. Empty pairs are
    /// dropped, and a key without `=` gets an empty value. A `+` decodes to
    /// a space.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::{Encoding, Query};
    ///
    /// // Decode Latin-1 percent escapes
    /// let query = Query::parse("city=M%FCnchen&&debug", Encoding::Latin1);
    /// assert_eq!(query.get("city"), Some("München"));
    /// assert_eq!(query.get("debug"), Some(""));
    /// assert_eq!(query.len(), 2);
    /// ```
    #[must_use]
    pub fn parse(input: &str, encoding: Encoding) -> Self {
        let mut query = Self::new();
        for pair in input.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            query.add(decode(key, encoding), decode(value, encoding));
        }
        query
    }

    /// Returns the first value of the given key.
    pub fn get<K>(&self, key: K) -> Option<&str>
    where
        K: AsRef<str>,
    {
        self.get_all(key).next()
    }

    /// Returns all values of the given key, in order.
    pub fn get_all<K>(&self, key: K) -> impl Iterator<Item = &str>
    where
        K: AsRef<str>,
    {
        self.pairs
            .iter()
            .filter(move |(name, _)| name == key.as_ref())
            .map(|(_, value)| value.as_str())
    }

    /// Returns whether the given key is present.
    pub fn contains<K>(&self, key: K) -> bool
    where
        K: AsRef<str>,
    {
        self.get(key).is_some()
    }

    /// Appends a pair, keeping existing values of the same key.
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.pairs.push((key.into(), value.into()));
    }

    /// Removes all values of the given key.
    pub fn remove<K>(&mut self, key: K)
    where
        K: AsRef<str>,
    {
        self.pairs.retain(|(name, _)| name != key.as_ref());
    }

    /// Returns an iterator over all pairs, in order.
    pub fn iter(&self) -> Pairs<'_> {
        Pairs { inner: self.pairs.iter() }
    }
}

#[allow(clippy::must_use_candidate)]
impl Query {
    /// Returns the number of pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns whether there are no pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// ----------------------------------------------------------------------------

/// Iterator over the pairs of a [`Query`].
#[derive(Debug)]
pub struct Pairs<'a> {
    /// Underlying slice iterator.
    inner: Iter<'a, (String, String)>,
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl From<&str> for Query {
    /// Parses a query string as UTF-8.
    #[inline]
    fn from(input: &str) -> Self {
        Self::parse(input, Encoding::Utf8)
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let pairs = iter.into_iter().map(|(k, v)| (k.into(), v.into()));
        Self { pairs: pairs.collect() }
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = (&'a str, &'a str);
    type IntoIter = Pairs<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Query {
    /// Formats the pairs as a query string, omitting `=` for empty values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for (key, value) in self {
            write!(f, "{separator}{}", encode(key))?;
            if !value.is_empty() {
                write!(f, "={}", encode(value))?;
            }
            separator = "&";
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_at_first_equals() {
        let query = Query::from("filter=size=large&x=1%202");
        assert_eq!(query.get("filter"), Some("size=large"));
        assert_eq!(query.get("x"), Some("1 2"));
    }

    #[test]
    fn test_remove_drops_every_value() {
        let mut query = Query::from("a=1&b=2&a=3");
        query.remove("a");
        assert!(!query.contains("a"));
        assert_eq!(query.iter().collect::<Vec<_>>(), [("b", "2")]);
    }

    #[test]
    fn test_display_encodes_reserved() {
        let query = Query::from_iter([("q", "fish & chips"), ("all", "")]);
        assert_eq!(query.to_string(), "q=fish%20%26%20chips&all");
    }
}
