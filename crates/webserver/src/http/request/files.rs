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

//! Uploaded files.

use crate::http::ContentType;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Uploaded file.
///
/// A part of a `multipart/form-data` body that carried a `filename`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    /// Form field name.
    pub name: String,
    /// File name as sent by the client.
    pub filename: String,
    /// Content type of the part, if any.
    pub content_type: Option<ContentType>,
    /// File contents.
    pub data: Vec<u8>,
}

/// Uploaded files, in the order they appeared in the body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Files {
    /// List of files.
    inner: Vec<UploadedFile>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Files {
    /// Creates an empty file list.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first file uploaded for the given field.
    pub fn get<K>(&self, name: K) -> Option<&UploadedFile>
    where
        K: AsRef<str>,
    {
        self.inner.iter().find(|file| file.name == name.as_ref())
    }

    /// Adds a file.
    #[inline]
    pub fn add(&mut self, file: UploadedFile) {
        self.inner.push(file);
    }

    /// Returns an iterator over all files.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &UploadedFile> {
        self.inner.iter()
    }
}

#[allow(clippy::must_use_candidate)]
impl Files {
    /// Returns the number of files.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether there are any files.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl FromIterator<UploadedFile> for Files {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = UploadedFile>,
    {
        Self { inner: iter.into_iter().collect() }
    }
}
