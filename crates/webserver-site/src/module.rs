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

//! Module serving processed files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use webserver::http::response::guess_content_type;
use webserver::http::{HandlerError, Method, Status};
use webserver::module::Module;
use webserver::server::{ProcessingResult, RequestContext};

use super::rules::Rules;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Module serving processed files.
///
/// Maps request paths to files below the root, with `index.html` standing
/// in for directories, and sends them after running them through the rules.
/// Files that are missing or suppressed by a rule are passed on to the next
/// module. Processor failures are rendered into a page showing the error.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::server::Server;
/// use webserver_site::{Rules, SiteModule};
///
/// // Create server and serve current directory
/// let mut server = Server::new();
/// server.add_module(SiteModule::new(".", Rules::defaults()?)?)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SiteModule {
    /// Root directory.
    root: PathBuf,
    /// Rules.
    rules: Rules,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl SiteModule {
    /// Creates a module serving processed files below the given root.
    ///
    /// # Errors
    ///
    /// This method returns [`io::Error`], if the root can't be resolved.
    pub fn new<P>(root: P, rules: Rules) -> io::Result<Self>
    where
        P: Into<PathBuf>,
    {
        let root = root.into().canonicalize()?;
        Ok(Self { root, rules })
    }

    /// Resolves the file and virtual path for a request path.
    fn resolve(&self, path: &str) -> Option<(PathBuf, String)> {
        let mut full = self.root.join(path.trim_start_matches('/'));
        if full.is_dir() {
            full.push("index.html");
        }
        let full = full.canonicalize().ok()?;
        let relative = full.strip_prefix(&self.root).ok()?;
        let virtual_path = virtual_path(relative);
        full.is_file().then_some((full, virtual_path))
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Module for SiteModule {
    fn process(
        &self, ctx: &mut RequestContext,
    ) -> Result<ProcessingResult, HandlerError> {
        if !matches!(ctx.request.method, Method::Get | Method::Head) {
            return Ok(ProcessingResult::Continue);
        }
        let Some((full, virtual_path)) = self.resolve(&ctx.request.uri.path)
        else {
            return Ok(ProcessingResult::Continue);
        };

        // Run file through rules, rendering failures into the page
        let source = fs::read(&full).map_err(HandlerError::other)?;
        let res = &mut *ctx.response;
        match self.rules.process(&virtual_path, &self.root, source) {
            Ok(Some(output)) => {
                res.content_type = guess_content_type(&full);
                res.body = output;
            }
            Ok(None) => {
                debug!(virtual_path, "File suppressed");
                return Ok(ProcessingResult::Continue);
            }
            Err(err) => {
                warn!(virtual_path, %err, "Processing failed");
                res.content_type = guess_content_type("error.html");
                let err = escape_html(&err.to_string());
                res.body = format!("<html><body><pre>{err}</pre></body></html>")
                    .into_bytes();
            }
        }
        res.set_status(Status::Ok);
        if ctx.request.method == Method::Head {
            res.body.clear();
        }
        Ok(ProcessingResult::SendResponse)
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Returns the virtual path of a path relative to the root.
fn virtual_path(relative: &Path) -> String {
    let iter = relative.components().map(|c| c.as_os_str().to_string_lossy());
    iter.collect::<Vec<_>>().join("/")
}

/// Escapes characters with special meaning in HTML text.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::env;
    use std::net::SocketAddr;

    use webserver::http::{Request, Response};
    use webserver::listener::Peer;

    use crate::processor::Settings;
    use crate::Error;

    use super::*;

    fn root(name: &str) -> PathBuf {
        let root = env::temp_dir()
            .join(format!("webserver-site-{name}-{}", std::process::id()));
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/index.html"), "<h1>Docs</h1>").unwrap();
        fs::write(root.join("site.master"), "master").unwrap();
        fs::write(root.join("broken.css"), "a {").unwrap();
        fs::write(root.join("<b>&amp.css"), "a {").unwrap();
        root
    }

    fn rules() -> Rules {
        let less = |path: &str, _: &Path, _: Vec<u8>, _: &Settings| {
            Err::<Option<Vec<u8>>, _>(Error::Processor(format!(
                "unbalanced braces in {path}"
            )))
        };
        let spark = |_: &str, _: &Path, mut source: Vec<u8>, _: &Settings| {
            source.extend_from_slice(b"<!-- rendered -->");
            Ok::<_, Error>(Some(source))
        };
        Rules::defaults()
            .unwrap()
            .processor("Less", less)
            .processor("Spark", spark)
    }

    fn process(
        module: &SiteModule, path: &str,
    ) -> (ProcessingResult, Response) {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let peer = Peer { remote_addr: addr, local_addr: addr, secure: false };
        let request = Request::new().uri(path);
        let mut response = Response::for_request(&request);
        let mut ctx = RequestContext::new(&peer, &request, &mut response);
        let res = module.process(&mut ctx).unwrap();
        (res, response)
    }

    #[test]
    fn test_serve_index() {
        let module = SiteModule::new(root("index"), rules()).unwrap();
        let (res, response) = process(&module, "/docs");
        assert_eq!(res, ProcessingResult::SendResponse);
        assert_eq!(response.body, b"<h1>Docs</h1><!-- rendered -->");
        assert_eq!(response.content_type.media(), "text/html");
    }

    #[test]
    fn test_processor_failure() {
        let module = SiteModule::new(root("failure"), rules()).unwrap();
        let (res, response) = process(&module, "/broken.css");
        assert_eq!(res, ProcessingResult::SendResponse);
        assert_eq!(response.status, Status::Ok);
        assert_eq!(
            response.body,
            b"<html><body><pre>unbalanced braces in broken.css\
              </pre></body></html>"
        );
    }

    #[test]
    fn test_processor_failure_is_escaped() {
        let module = SiteModule::new(root("escape"), rules()).unwrap();
        let (_, response) = process(&module, "/<b>&amp.css");
        assert_eq!(
            response.body,
            b"<html><body><pre>unbalanced braces in &lt;b&gt;&amp;amp.css\
              </pre></body></html>"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html("<a href=\"x\">&</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_continue_when_suppressed_or_missing() {
        let module = SiteModule::new(root("skip"), rules()).unwrap();
        assert_eq!(
            process(&module, "/site.master").0,
            ProcessingResult::Continue
        );
        assert_eq!(
            process(&module, "/missing.html").0,
            ProcessingResult::Continue
        );
    }

    #[test]
    fn test_virtual_path() {
        let path = Path::new("docs/index.html");
        assert_eq!(virtual_path(path), "docs/index.html");
    }
}
