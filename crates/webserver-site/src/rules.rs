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

//! Rules.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::error::Result;
use super::processor::{Passthrough, Processor, Settings, Skip};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Characters escaped when converting filters to patterns.
const SPECIAL: &[char] = &[
    '\\', '.', '^', '$', '|', '/', '{', '}', '[', ']', '(', ')', '+',
];

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Rule.
///
/// Rules select a processor by name for all files whose virtual path
/// matches the filter, a glob where `*` matches any sequence of characters
/// and `?` matches at most one. Rules with a higher order are applied first.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver_site::Rule;
///
/// // Create rule and check paths
/// let rule = Rule::new("*.css", "Less")?;
/// assert!(rule.matches("assets/style.css"));
/// assert!(!rule.matches("assets/style.css.map"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Rule {
    /// Filter, as given.
    filter: String,
    /// Compiled filter.
    pattern: Regex,
    /// Processor name.
    process: String,
    /// Order.
    order: i32,
    /// Processor settings.
    settings: Settings,
}

/// Rules.
///
/// Holds an ordered list of rules, together with a registry mapping names
/// to processors. The `Skip` processor is always registered, and names
/// without a registered processor pass files through unchanged.
#[derive(Clone)]
pub struct Rules {
    /// Rules, in insertion order.
    rules: Vec<Rule>,
    /// Processors by name.
    processors: BTreeMap<String, Arc<dyn Processor>>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Rule {
    /// Creates a rule applying the named processor to matching files.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::Pattern`][crate::Error::Pattern], if the
    /// filter can't be compiled.
    pub fn new<F, P>(filter: F, process: P) -> Result<Self>
    where
        F: Into<String>,
        P: Into<String>,
    {
        let filter = filter.into();
        let pattern = Regex::new(&pattern(&filter))?;
        Ok(Self {
            filter,
            pattern,
            process: process.into(),
            order: 0,
            settings: Settings::new(),
        })
    }

    /// Sets the order.
    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Adds a setting handed to the processor.
    #[must_use]
    pub fn setting<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Returns whether the rule applies to the given virtual path.
    #[must_use]
    pub fn matches(&self, virtual_path: &str) -> bool {
        self.pattern.is_match(virtual_path)
    }
}

#[allow(clippy::must_use_candidate)]
impl Rule {
    /// Returns the filter.
    #[inline]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Returns the processor name.
    #[inline]
    pub fn process(&self) -> &str {
        &self.process
    }

    /// Returns the processor settings.
    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

// ----------------------------------------------------------------------------

impl Rules {
    /// Creates an empty set of rules.
    #[must_use]
    pub fn new() -> Self {
        let mut processors = BTreeMap::new();
        processors.insert(
            String::from("Skip"),
            Arc::new(Skip) as Arc<dyn Processor>,
        );
        Self { rules: Vec::new(), processors }
    }

    /// Creates the default rules.
    ///
    /// Templates, stylesheets and scripts are handed to the `Spark`, `Less`
    /// and `JsMin` processors, which must be registered by the caller, and
    /// master pages and rule files are never served.
    ///
    /// # Errors
    ///
    /// This method never fails in practice, as all filters are valid.
    pub fn defaults() -> Result<Self> {
        let rules = Self::new()
            .rule(Rule::new("*.html", "Spark")?.order(1))
            .rule(Rule::new("*.master", "Skip")?.order(1))
            .rule(Rule::new("*rules.meta", "Skip")?.order(1))
            .rule(Rule::new("*.css", "Less")?.order(1))
            .rule(Rule::new("*.js", "JsMin")?.order(1));
        Ok(rules)
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Registers a processor under the given name.
    #[must_use]
    pub fn processor<N, P>(mut self, name: N, processor: P) -> Self
    where
        N: Into<String>,
        P: Processor,
    {
        self.processors.insert(name.into(), Arc::new(processor));
        self
    }

    /// Processes the contents of a file.
    ///
    /// All rules matching the virtual path are applied in descending order,
    /// each processor receiving the output of the previous one. Rules with
    /// the same order are applied in the order they were added.
    ///
    /// # Errors
    ///
    /// This method returns the error of the first failing processor.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use std::path::Path;
    /// use webserver_site::Rules;
    ///
    /// // Create default rules and process files
    /// let rules = Rules::defaults()?;
    /// let root = Path::new(".");
    /// let output = rules.process("a.txt", root, b"text".to_vec())?;
    /// assert_eq!(output, Some(b"text".to_vec()));
    /// assert_eq!(rules.process("site.master", root, Vec::new())?, None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn process(
        &self, virtual_path: &str, root: &Path, source: Vec<u8>,
    ) -> Result<Option<Vec<u8>>> {
        let mut matching: Vec<_> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(virtual_path))
            .collect();
        matching.sort_by(|a, b| b.order.cmp(&a.order));

        // Chain processors until one suppresses the file
        let mut output = source;
        for rule in matching {
            let processor: &dyn Processor =
                match self.processors.get(&rule.process) {
                    Some(processor) => processor.as_ref(),
                    None => &Passthrough,
                };
            let res = processor.process(
                virtual_path,
                root,
                output,
                &rule.settings,
            )?;
            let Some(next) = res else {
                debug!(virtual_path, rule = %rule.filter, "Suppressed");
                return Ok(None);
            };
            output = next;
        }
        Ok(Some(output))
    }
}

#[allow(clippy::must_use_candidate)]
impl Rules {
    /// Returns the rules.
    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Rules {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Rules")
            .field("rules", &self.rules)
            .field("processors", &self.processors.keys())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Converts a filter into an anchored pattern.
fn pattern(filter: &str) -> String {
    let mut pattern = String::from("^");
    for c in filter.chars() {
        match c {
            '?' => pattern.push_str(".?"),
            '*' => pattern.push_str(".*?"),
            c if SPECIAL.contains(&c) => {
                pattern.push('\\');
                pattern.push(c);
            }
            c => pattern.push(c),
        }
    }
    pattern.push('$');
    pattern
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::*;

    fn tag(name: &'static str) -> impl Processor {
        move |_: &str, _: &Path, mut source: Vec<u8>, settings: &Settings| {
            source.extend_from_slice(name.as_bytes());
            if let Some(suffix) = settings.get("suffix") {
                source.extend_from_slice(suffix.as_bytes());
            }
            Ok::<_, Error>(Some(source))
        }
    }

    #[test]
    fn test_pattern() {
        assert_eq!(pattern("*.html"), r"^.*?\.html$");
        assert_eq!(pattern("a?/b(1)"), r"^a.?\/b\(1\)$");
    }

    #[test]
    fn test_matches() -> Result {
        let rule = Rule::new("*rules.meta", "Skip")?;
        assert!(rule.matches("rules.meta"));
        assert!(rule.matches("docs/site-rules.meta"));
        assert!(!rule.matches("rules.meta.bak"));
        let rule = Rule::new("page?.html", "Spark")?;
        assert!(rule.matches("page.html"));
        assert!(rule.matches("page1.html"));
        assert!(!rule.matches("page12.html"));
        Ok(())
    }

    #[test]
    fn test_process_descending_order() -> Result {
        let rules = Rules::new()
            .processor("A", tag("a"))
            .processor("B", tag("b"))
            .rule(Rule::new("*.txt", "A")?.order(1))
            .rule(Rule::new("*.txt", "B")?.order(2).setting("suffix", "!"))
            .rule(Rule::new("*.md", "A")?.order(3));
        let output = rules.process("x.txt", Path::new("."), b">".to_vec())?;
        assert_eq!(output, Some(b">b!a".to_vec()));
        Ok(())
    }

    #[test]
    fn test_process_skip_stops_chain() -> Result {
        let failing = |_: &str, _: &Path, _: Vec<u8>, _: &Settings| {
            Err::<Option<Vec<u8>>, _>(Error::Processor("unreachable".into()))
        };
        let rules = Rules::new()
            .processor("Fail", failing)
            .rule(Rule::new("*", "Fail")?)
            .rule(Rule::new("*.master", "Skip")?.order(1));
        let root = Path::new(".");
        assert_eq!(rules.process("a.master", root, Vec::new())?, None);
        assert!(rules.process("a.html", root, Vec::new()).is_err());
        Ok(())
    }

    #[test]
    fn test_process_unregistered_passes_through() -> Result {
        let rules = Rules::defaults()?;
        let output = rules.process("style.css", Path::new("."), b"a".to_vec())?;
        assert_eq!(output, Some(b"a".to_vec()));
        Ok(())
    }
}
