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

//! Module for serving files.

use httpdate::parse_http_date;
use std::fs;
use std::io::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::http::response::ResponseExt;
use crate::http::{HandlerError, Header, Method, Response, Status};
use crate::server::{ProcessingResult, RequestContext};

use super::Module;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Module for serving files.
///
/// Serves files below a root directory for `GET` and `HEAD` requests, with
/// `index.html` standing in for directories. Requests for files that don't
/// exist, or that resolve to a location outside of the root, are passed on
/// to the next module.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use webserver::module::FileModule;
/// use webserver::server::Server;
///
/// // Create server and serve current directory
/// let mut server = Server::new();
/// server.add_module(FileModule::new(".")?)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct FileModule {
    /// Root directory.
    root: PathBuf,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl FileModule {
    /// Creates a module for serving files.
    ///
    /// # Errors
    ///
    /// This method returns [`std::io::Error`], if the root can't be resolved.
    pub fn new<P>(root: P) -> Result<Self>
    where
        P: Into<PathBuf>,
    {
        let root = root.into();
        root.canonicalize().map(|root| Self { root })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the file for a request path below the root.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut full = self.root.join(path.trim_start_matches('/'));
        if path.ends_with('/') || full.is_dir() {
            full.push("index.html");
        }

        // Symbolic links must not lead outside of the root
        let full = full.canonicalize().ok()?;
        if !full.starts_with(&self.root) {
            debug!(path, "File outside of root");
            return None;
        }
        full.is_file().then_some(full)
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Module for FileModule {
    fn process(
        &self, ctx: &mut RequestContext,
    ) -> std::result::Result<ProcessingResult, HandlerError> {
        let req = ctx.request;
        if !matches!(req.method, Method::Get | Method::Head) {
            return Ok(ProcessingResult::Continue);
        }
        let Some(full) = self.resolve(&req.uri.path) else {
            return Ok(ProcessingResult::Continue);
        };
        let Ok(file) = Response::from_file(&full) else {
            return Ok(ProcessingResult::Continue);
        };

        // Version and connection directive stay those of the request
        let res = &mut *ctx.response;
        res.set_status(Status::Ok);
        res.content_type = file.content_type;
        res.body = file.body;
        if let Some(date) = file.headers.get(Header::LastModified) {
            res.headers.insert(Header::LastModified, date);
        }

        // Answer with 304, if the file wasn't modified since the given date
        let option = req.headers.get(Header::IfModifiedSince);
        if let Some(since) = option.and_then(|v| parse_http_date(v).ok()) {
            let modified = fs::metadata(&full).and_then(|m| m.modified());
            if let Ok(last) = modified {
                // Subtract one second to account for rounding issues
                let second = Duration::from_secs(1);
                let last = last.checked_sub(second).unwrap_or(last);
                if since >= last {
                    res.set_status(Status::NotModified);
                    res.body.clear();
                }
            }
        }

        // Head requests only receive the headers
        if req.method == Method::Head {
            res.body.clear();
        }
        Ok(ProcessingResult::SendResponse)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::env;
    use std::net::SocketAddr;
    use std::time::SystemTime;

    use crate::http::{ConnectionType, Request, Version};
    use crate::listener::Peer;

    use super::*;

    fn peer() -> Peer {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        Peer { remote_addr: addr, local_addr: addr, secure: false }
    }

    fn root(name: &str) -> PathBuf {
        let root = env::temp_dir()
            .join(format!("webserver-files-{name}-{}", std::process::id()));
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/index.html"), "<h1>Docs</h1>").unwrap();
        fs::write(root.join("style.css"), "body {}").unwrap();
        root
    }

    fn process(
        module: &FileModule, request: &Request,
    ) -> (ProcessingResult, Response) {
        let peer = peer();
        let mut response = Response::for_request(request);
        let mut ctx = RequestContext::new(&peer, request, &mut response);
        let res = module.process(&mut ctx).unwrap();
        (res, response)
    }

    #[test]
    fn test_serve_file() {
        let module = FileModule::new(root("file")).unwrap();
        let request = Request::new().uri("/style.css").version(Version::Http10);
        let (res, response) = process(&module, &request);
        assert_eq!(res, ProcessingResult::SendResponse);
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.body, b"body {}");
        assert_eq!(response.content_type.media(), "text/css");
        assert_eq!(response.version, Version::Http10);
        assert_eq!(response.connection, ConnectionType::Close);
        assert!(response.headers.contains(Header::LastModified));
    }

    #[test]
    fn test_serve_index() {
        let module = FileModule::new(root("index")).unwrap();
        for path in ["/docs", "/docs/"] {
            let request = Request::new().uri(path);
            let (res, response) = process(&module, &request);
            assert_eq!(res, ProcessingResult::SendResponse);
            assert_eq!(response.body, b"<h1>Docs</h1>");
        }
    }

    #[test]
    fn test_head_and_not_modified() {
        let module = FileModule::new(root("head")).unwrap();
        let request = Request::new().uri("/style.css").method(Method::Head);
        let (_, response) = process(&module, &request);
        assert_eq!(response.status, Status::Ok);
        assert!(response.body.is_empty());

        // Far future date is always after the modification time
        let date = SystemTime::now() + Duration::from_secs(3600);
        let request = Request::new()
            .uri("/style.css")
            .header(Header::IfModifiedSince, httpdate::fmt_http_date(date));
        let (_, response) = process(&module, &request);
        assert_eq!(response.status, Status::NotModified);
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_not_modified_at_epoch() {
        let root = root("epoch");
        fs::File::options()
            .write(true)
            .open(root.join("style.css"))
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH)
            .unwrap();
        let module = FileModule::new(root).unwrap();
        let request = Request::new().uri("/style.css").header(
            Header::IfModifiedSince,
            httpdate::fmt_http_date(SystemTime::UNIX_EPOCH),
        );
        let (_, response) = process(&module, &request);
        assert_eq!(response.status, Status::NotModified);
    }

    #[test]
    fn test_continue_otherwise() {
        let module = FileModule::new(root("missing")).unwrap();
        let request = Request::new().uri("/missing.css");
        assert_eq!(process(&module, &request).0, ProcessingResult::Continue);
        let request = Request::new().uri("/style.css").method(Method::Post);
        assert_eq!(process(&module, &request).0, ProcessingResult::Continue);
    }
}
