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

//! HTTP headers.

use std::fmt;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP headers.
///
/// An ordered multi-map of header names and values, shared by requests and
/// responses. Names are kept as they were given, but looked up case-
/// insensitively, so both [`Header`][] variants and arbitrary strings can be
/// used as keys. Insertion order is preserved when writing headers.
///
/// [`Header`]: crate::http::Header
///
/// # Examples
///
/// ```
/// use webserver::http::{Header, Headers};
///
/// // Create header map and add headers
/// let mut headers = Headers::new();
/// headers.insert(Header::Accept, "text/plain");
/// headers.append("X-Trace", "a");
/// headers.append("x-trace", "b");
///
/// // Obtain header values
/// assert_eq!(headers.get("accept"), Some("text/plain"));
/// assert_eq!(headers.get_all("X-TRACE").count(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    /// Names and values, in insertion order.
    entries: Vec<(String, String)>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Headers {
    /// Creates a header map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Returns the first value for the given header.
    pub fn get<K>(&self, key: K) -> Option<&str>
    where
        K: AsRef<str>,
    {
        self.get_all(key).next()
    }

    /// Returns all values for the given header, in insertion order.
    pub fn get_all<K>(&self, key: K) -> impl Iterator<Item = &str>
    where
        K: AsRef<str>,
    {
        self.entries.iter().filter_map(move |(name, value)| {
            name.eq_ignore_ascii_case(key.as_ref())
                .then_some(value.as_str())
        })
    }

    /// Returns whether the header is contained.
    pub fn contains<K>(&self, key: K) -> bool
    where
        K: AsRef<str>,
    {
        self.get(key).is_some()
    }

    /// Sets the given header, replacing all previous values.
    ///
    /// The first occurrence keeps its position, so replacing a header does
    /// not change the order in which headers are written.
    ///
    /// # Examples
    ///
    /// ```
    /// use webserver::http::Headers;
    ///
    /// // Create header map and replace header
    /// let mut headers = Headers::new();
    /// headers.append("Vary", "Accept");
    /// headers.append("Vary", "Cookie");
    /// headers.insert("vary", "*");
    /// assert_eq!(headers.len(), 1);
    /// ```
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let key = key.as_ref();
        let mut value = Some(value.into());
        self.entries.retain_mut(|(name, current)| {
            if !name.eq_ignore_ascii_case(key) {
                return true;
            }
            match value.take() {
                Some(value) => {
                    *current = value;
                    true
                }
                None => false,
            }
        });

        // Append header if it was not present before
        if let Some(value) = value {
            self.entries.push((key.to_string(), value));
        }
    }

    /// Adds a value for the given header, keeping previous values.
    pub fn append<K, V>(&mut self, key: K, value: V)
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        self.entries.push((key.as_ref().to_string(), value.into()));
    }

    /// Removes all values for the given header.
    pub fn remove<K>(&mut self, key: K)
    where
        K: AsRef<str>,
    {
        let key = key.as_ref();
        self.entries.retain(|(name, _)| !name.eq_ignore_ascii_case(key));
    }

    /// Returns an iterator over all headers, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

#[allow(clippy::must_use_candidate)]
impl Headers {
    /// Returns the number of headers.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are any headers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    /// Creates a header map from an iterator, keeping duplicates.
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut headers = Headers::new();
        for (key, value) in iter {
            headers.append(key, value);
        }
        headers
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Headers {
    /// Formats the headers as they appear on the wire.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.entries
            .iter()
            .try_for_each(|(name, value)| write!(f, "{name}: {value}\r\n"))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::http::Header;

    use super::*;

    #[test]
    fn test_insert_keeps_position() {
        let mut headers = Headers::new();
        headers.append("A", "1");
        headers.append(Header::ContentType, "text/plain");
        headers.append("B", "2");
        headers.append("content-type", "text/html");
        headers.insert("Content-Type", "application/json");
        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["A", "Content-Type", "B"]);
        assert_eq!(headers.get(Header::ContentType), Some("application/json"));
    }

    #[test]
    fn test_remove_all_values() {
        let mut headers =
            Headers::from_iter([("Via", "a"), ("via", "b"), ("Host", "x")]);
        headers.remove("VIA");
        assert!(!headers.contains("via"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_display() {
        let headers = Headers::from_iter([("Host", "localhost")]);
        assert_eq!(headers.to_string(), "Host: localhost\r\n");
    }
}
