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

//! Listener signals.

use std::any::Any;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use tracing::{error, warn};

use crate::http::{HandlerError, ProtocolError, Request, Response};

use super::event::{ContinueEvent, ErrorPageEvent, ExceptionEvent, Peer};
use super::event::RequestEvent;

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Observer for unexpected failures.
pub type ExceptionObserver = Box<dyn Fn(&ExceptionEvent) + Send + Sync>;

/// Observer for received requests.
pub type RequestObserver = Box<
    dyn Fn(&mut RequestEvent) -> Result<(), HandlerError> + Send + Sync,
>;

/// Observer for error pages.
pub type ErrorPageObserver = Box<dyn Fn(&mut ErrorPageEvent) + Send + Sync>;

/// Observer for `Expect: 100-continue` requests.
pub type ContinueObserver = Box<dyn Fn(&mut ContinueEvent) + Send + Sync>;

/// Observer deciding whether an accepted socket is admitted.
pub type AdmissionObserver = Box<dyn Fn(&SocketAddr) -> bool + Send + Sync>;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Observer lists of a listener.
///
/// Observers are registered before the listener is started, and are frozen
/// afterwards. Panics in observers are caught and logged, so an observer can
/// never bring down the poll loop or a worker.
#[derive(Default)]
pub struct Signals {
    /// Exception observers.
    pub(crate) exception: Vec<ExceptionObserver>,
    /// Request observers.
    pub(crate) request: Vec<RequestObserver>,
    /// Error page observers.
    pub(crate) error_page: Vec<ErrorPageObserver>,
    /// Continue observers.
    pub(crate) continue_: Vec<ContinueObserver>,
    /// Admission observers.
    pub(crate) admission: Vec<AdmissionObserver>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Signals {
    /// Raises the request signal, stopping at the first error.
    pub fn raise_request(
        &self, event: &mut RequestEvent,
    ) -> Result<(), HandlerError> {
        for observer in &self.request {
            observer(event)?;
        }
        Ok(())
    }

    /// Raises the exception signal.
    pub fn raise_exception(&self, event: &ExceptionEvent) {
        for observer in &self.exception {
            let res = panic::catch_unwind(AssertUnwindSafe(|| observer(event)));
            if let Err(payload) = res {
                let panic = panic_message(&*payload);
                error!(%panic, "Exception observer");
            }
        }
    }

    /// Raises the error page signal.
    pub fn raise_error_page(&self, event: &mut ErrorPageEvent) {
        for observer in &self.error_page {
            let res = panic::catch_unwind(AssertUnwindSafe(|| observer(event)));
            if let Err(payload) = res {
                let panic = panic_message(&*payload);
                error!(%panic, "Error page observer");
            }
        }
    }

    /// Raises the continue signal.
    pub fn raise_continue(&self, event: &mut ContinueEvent) {
        for observer in &self.continue_ {
            let res = panic::catch_unwind(AssertUnwindSafe(|| observer(event)));
            if let Err(payload) = res {
                let panic = panic_message(&*payload);
                error!(%panic, "Continue observer");
            }
        }
    }

    /// Asks all admission observers whether the socket is admitted.
    ///
    /// All observers must approve. An observer that panics counts as
    /// approval, so a faulty filter can't lock out every client.
    pub fn admit(&self, addr: &SocketAddr) -> bool {
        self.admission.iter().all(|observer| {
            panic::catch_unwind(AssertUnwindSafe(|| observer(addr)))
                .unwrap_or_else(|payload| {
                    warn!(
                        panic = %panic_message(&*payload),
                        "Admission observer"
                    );
                    true
                })
        })
    }

    /// Prepares an error page for the given error.
    ///
    /// Status and reason are taken from the error and the body is cleared,
    /// before observers get a chance to render the page. If no observer
    /// handles it, the default error page is rendered.
    pub fn render_error_page(
        &self, peer: &Peer, request: Option<&Request>, response: &mut Response,
        error: &ProtocolError,
    ) {
        response.status = error.status;
        response.reason.clone_from(&error.reason);
        response.body.clear();

        // Give observers a chance to render the page
        let mut event = ErrorPageEvent {
            peer,
            request,
            response,
            error,
            handled: false,
        };
        self.raise_error_page(&mut event);
        if !event.handled {
            event.response.render_error_page();
        }
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Extracts a message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use crate::http::Status;

    use super::*;

    fn peer() -> Peer {
        let addr: SocketAddr = "127.0.0.1:80".parse().unwrap();
        Peer { remote_addr: addr, local_addr: addr, secure: false }
    }

    #[test]
    fn test_admit_requires_all() {
        let mut signals = Signals::default();
        signals.admission.push(Box::new(|_: &SocketAddr| true));
        signals.admission.push(Box::new(|_: &SocketAddr| false));
        assert!(!signals.admit(&peer().remote_addr));
    }

    #[test]
    fn test_admit_panic_counts_as_approval() {
        let mut signals = Signals::default();
        signals.admission.push(Box::new(|_: &SocketAddr| -> bool {
            panic!("filter")
        }));
        assert!(signals.admit(&peer().remote_addr));
    }

    #[test]
    fn test_render_error_page_default() {
        let signals = Signals::default();
        let mut res = Response::new().body("partial");
        let err = ProtocolError::new(Status::NotFound).with_reason("Nope");
        signals.render_error_page(&peer(), None, &mut res, &err);
        assert_eq!(res.status, Status::NotFound);
        assert_eq!(
            res.body,
            b"<html><head><title>Nope</title></head>\
              <body>Error 404: Nope</body></html>"
        );
    }

    #[test]
    fn test_render_error_page_handled() {
        let mut signals = Signals::default();
        signals.error_page.push(Box::new(|event: &mut ErrorPageEvent| {
            event.response.body = b"custom".to_vec();
            event.handled = true;
        }));
        let mut res = Response::new();
        let err = ProtocolError::new(Status::Forbidden);
        signals.render_error_page(&peer(), None, &mut res, &err);
        assert_eq!(res.body, b"custom");
    }
}
