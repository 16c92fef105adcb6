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

//! Method and path routing.

use std::collections::BTreeMap;
use tracing::trace;

use crate::http::{HandlerError, Method};
use crate::server::{ProcessingResult, RequestContext};

use super::error::{Error, Result};
use super::{Action, Params, Route, Router};

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Route table of a single method.
type Table = matchit::Router<Box<dyn Action>>;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Router dispatching on method and path.
///
/// Each method owns a route table, so a path registered for `GET` does not
/// match a `POST` request. Requests that match no route continue to the
/// next router.
#[derive(Debug)]
pub struct Routes {
    /// Route tables by method.
    tables: BTreeMap<Method, Table>,
}

/// Builder for [`Routes`].
///
/// Registering a route never fails. Patterns are parsed and checked for
/// overlaps once [`Builder::build`] is called.
#[derive(Debug, Default)]
pub struct Builder {
    /// Scope prepended to all patterns.
    scope: String,
    /// Registered routes, in order.
    entries: Vec<(Method, String, Box<dyn Action>)>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Routes {
    /// Creates a routes builder.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use webserver::http::Status;
    /// use webserver::router::{Params, Routes};
    /// use webserver::server::{ProcessingResult, RequestContext};
    ///
    /// // Answer health checks without a body
    /// let routes = Routes::builder()
    ///     .get("/health", |ctx: &mut RequestContext, _: &Params| {
    ///         ctx.response.set_status(Status::NoContent);
    ///         Ok(ProcessingResult::SendResponse)
    ///     })
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn builder() -> Builder {
        Builder::default()
    }
}

// ----------------------------------------------------------------------------

impl Builder {
    /// Sets the scope all patterns are nested below.
    #[must_use]
    pub fn scope<S>(mut self, scope: S) -> Self
    where
        S: Into<String>,
    {
        self.scope = scope.into();
        self
    }

    /// Adds a `GET` route.
    #[must_use]
    pub fn get<P, A>(self, path: P, action: A) -> Self
    where
        P: Into<String>,
        A: Action,
    {
        self.route(Method::Get, path, action)
    }

    /// Adds a `HEAD` route.
    #[must_use]
    pub fn head<P, A>(self, path: P, action: A) -> Self
    where
        P: Into<String>,
        A: Action,
    {
        self.route(Method::Head, path, action)
    }

    /// Adds a `POST` route.
    #[must_use]
    pub fn post<P, A>(self, path: P, action: A) -> Self
    where
        P: Into<String>,
        A: Action,
    {
        self.route(Method::Post, path, action)
    }

    /// Adds a `PUT` route.
    #[must_use]
    pub fn put<P, A>(self, path: P, action: A) -> Self
    where
        P: Into<String>,
        A: Action,
    {
        self.route(Method::Put, path, action)
    }

    /// Adds a `DELETE` route.
    #[must_use]
    pub fn delete<P, A>(self, path: P, action: A) -> Self
    where
        P: Into<String>,
        A: Action,
    {
        self.route(Method::Delete, path, action)
    }

    /// Adds a route for an arbitrary method.
    #[must_use]
    pub fn route<P, A>(mut self, method: Method, path: P, action: A) -> Self
    where
        P: Into<String>,
        A: Action,
    {
        self.entries.push((method, path.into(), Box::new(action)));
        self
    }

    /// Builds the route tables.
    ///
    /// # Errors
    ///
    /// This method returns [`Error`], if the scope or a pattern is malformed,
    /// or if two patterns of the same method overlap.
    pub fn build(self) -> Result<Routes> {
        let scope = if self.scope.is_empty() {
            Route::root()
        } else {
            self.scope.parse()?
        };

        let mut tables = BTreeMap::<Method, Table>::new();
        for (method, path, action) in self.entries {
            let route = scope.join(&path.parse()?);
            let table = tables.entry(method).or_insert_with(Table::new);
            if let Err(err) = table.insert(route.as_str(), action) {
                return Err(Error::Conflict {
                    route: route.to_string(),
                    reason: err.to_string(),
                });
            }
        }
        Ok(Routes { tables })
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Router for Routes {
    /// Invokes the action of the route matching the request, if any.
    ///
    /// Trailing slashes of the request path are ignored, as patterns never
    /// carry them.
    fn process(
        &self, ctx: &mut RequestContext,
    ) -> std::result::Result<ProcessingResult, HandlerError> {
        let Some(table) = self.tables.get(&ctx.request.method) else {
            return Ok(ProcessingResult::Continue);
        };
        let request = ctx.request;
        let path = match request.uri.path.trim_end_matches('/') {
            "" => "/",
            path => path,
        };
        let Ok(found) = table.at(path) else {
            return Ok(ProcessingResult::Continue);
        };
        trace!(%path, "Route matched");
        found.value.handle(ctx, &Params::from_match(&found.params))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use crate::http::{Request, Response, Status};
    use crate::listener::Peer;

    use super::*;

    fn peer() -> Peer {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        Peer { remote_addr: addr, local_addr: addr, secure: false }
    }

    fn routes() -> Routes {
        Routes::builder()
            .scope("/users")
            .get("/{name}", |ctx: &mut RequestContext, params: &Params| {
                let name = params.get("name").unwrap_or_default();
                ctx.response.body = name.as_bytes().to_vec();
                Ok(ProcessingResult::SendResponse)
            })
            .delete("/{name}", |_: &mut RequestContext, _: &Params| {
                Err(Status::Forbidden.into())
            })
            .build()
            .unwrap()
    }

    fn run(request: &Request, response: &mut Response) -> ProcessingResult {
        let peer = peer();
        let mut ctx = RequestContext::new(&peer, request, response);
        routes().process(&mut ctx).unwrap()
    }

    #[test]
    fn test_process_ignores_trailing_slash() {
        let request = Request::new().uri("/users/ada/");
        let mut response = Response::new();
        let res = run(&request, &mut response);
        assert_eq!(res, ProcessingResult::SendResponse);
        assert_eq!(response.body, b"ada");
    }

    #[test]
    fn test_process_other_method_continues() {
        let request = Request::new().method(Method::Post).uri("/users/ada");
        let mut response = Response::new();
        assert_eq!(run(&request, &mut response), ProcessingResult::Continue);
    }

    #[test]
    fn test_process_unknown_path_continues() {
        let request = Request::new().uri("/groups/admins");
        let mut response = Response::new();
        assert_eq!(run(&request, &mut response), ProcessingResult::Continue);
    }

    #[test]
    fn test_process_propagates_error() {
        let peer = peer();
        let request = Request::new().method(Method::Delete).uri("/users/ada");
        let mut response = Response::new();
        let mut ctx = RequestContext::new(&peer, &request, &mut response);
        assert!(matches!(
            routes().process(&mut ctx),
            Err(HandlerError::Protocol(err)) if err.status == Status::Forbidden
        ));
    }

    #[test]
    fn test_build_rejects_overlap() {
        let action = |_: &mut RequestContext, _: &Params| {
            Ok(ProcessingResult::Continue)
        };
        let res = Routes::builder()
            .get("/{name}", action)
            .get("/{id}", action)
            .build();
        assert!(matches!(res, Err(Error::Conflict { .. })));
    }

    #[test]
    fn test_build_rejects_malformed_scope() {
        let res = Routes::builder().scope("users").build();
        assert!(matches!(res, Err(Error::Relative(_))));
    }
}
