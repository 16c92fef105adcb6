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

//! Processors.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::trace;

use super::error::Result;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Processor.
///
/// Processors transform the contents of a file, like rendering templates or
/// minifying scripts. Returning nothing suppresses the file, which ends the
/// chain of processors applied to it.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use std::path::Path;
/// use webserver_site::{Processor, Settings};
///
/// // Create processor turning text into uppercase
/// let upper = |_: &str, _: &Path, source: Vec<u8>, _: &Settings| {
///     Ok::<_, webserver_site::Error>(Some(source.to_ascii_uppercase()))
/// };
/// let output = upper.process(
///     "hello.txt",
///     Path::new("."),
///     b"hello".to_vec(),
///     &Settings::new(),
/// )?;
/// assert_eq!(output, Some(b"HELLO".to_vec()));
/// # Ok(())
/// # }
/// ```
pub trait Processor: Send + Sync + 'static {
    /// Processes the contents of a file.
    ///
    /// # Errors
    ///
    /// Errors are rendered into the page that would have shown the file.
    fn process(
        &self, virtual_path: &str, root: &Path, source: Vec<u8>,
        settings: &Settings,
    ) -> Result<Option<Vec<u8>>>;
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Processor settings.
pub type Settings = BTreeMap<String, String>;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Processor returning contents unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

/// Processor suppressing files.
#[derive(Clone, Copy, Debug, Default)]
pub struct Skip;

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Processor for Passthrough {
    #[inline]
    fn process(
        &self, _virtual_path: &str, _root: &Path, source: Vec<u8>,
        _settings: &Settings,
    ) -> Result<Option<Vec<u8>>> {
        Ok(Some(source))
    }
}

impl Processor for Skip {
    fn process(
        &self, virtual_path: &str, _root: &Path, _source: Vec<u8>,
        _settings: &Settings,
    ) -> Result<Option<Vec<u8>>> {
        trace!(virtual_path, "Skipped");
        Ok(None)
    }
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<F> Processor for F
where
    F: Fn(&str, &Path, Vec<u8>, &Settings) -> Result<Option<Vec<u8>>>
        + Send
        + Sync
        + 'static,
{
    #[inline]
    fn process(
        &self, virtual_path: &str, root: &Path, source: Vec<u8>,
        settings: &Settings,
    ) -> Result<Option<Vec<u8>>> {
        self(virtual_path, root, source, settings)
    }
}
