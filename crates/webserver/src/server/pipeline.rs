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

//! Request pipeline.

use httpdate::fmt_http_date;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::time::SystemTime;
use tracing::{debug, error, warn};

use crate::decoder::BodyDecoder;
use crate::http::{ConnectionType, Encoding, HandlerError, Header};
use crate::http::{ProtocolError, Request, ResponseExt, Status};
use crate::listener::{ErrorPageEvent, ExceptionEvent, RequestEvent, Signals};
use crate::listener::panic_message;
use crate::module::Module;
use crate::router::Router;

use super::context::{ProcessingResult, RequestContext};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Reason phrase of responses to failed requests.
pub const FAILURE_REASON: &str = "Failed to process request.";

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Observer invoked right before a response is sent.
pub type SendingObserver = Box<dyn Fn(&mut RequestContext) + Send + Sync>;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Request pipeline.
///
/// The pipeline is assembled when the server is started, after which it's
/// shared read-only between all listeners and their workers. Every request
/// runs through request observers, body decoding, routers and modules, in
/// that order, and is answered exactly once.
pub struct Pipeline {
    /// Observers.
    pub(crate) signals: Signals,
    /// Pre-send observers.
    pub(crate) sending: Vec<SendingObserver>,
    /// Routers.
    pub(crate) routers: Vec<Box<dyn Router>>,
    /// Modules.
    pub(crate) modules: Vec<Box<dyn Module>>,
    /// Body decoders.
    pub(crate) decoders: Vec<Box<dyn BodyDecoder>>,
    /// Value of the `Server` header.
    pub(crate) server_name: String,
    /// Reason phrase for unhandled requests.
    pub(crate) not_found_reason: String,
    /// Whether error messages are sent to clients.
    pub(crate) expose_errors: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Pipeline {
    /// Handles a request event.
    ///
    /// The event is always marked as handled, as the pipeline answers every
    /// request itself, including failed ones, so this method never fails.
    ///
    /// # Errors
    ///
    /// This method never returns an error, but has the signature of request
    /// observers, so it can be registered as one.
    pub fn handle(&self, event: &mut RequestEvent) -> Result<(), HandlerError> {
        event.handled = true;
        let res = panic::catch_unwind(AssertUnwindSafe(|| self.process(event)));
        let res = res.unwrap_or_else(|payload| {
            let panic = panic_message(&*payload);
            Err(HandlerError::other(panic))
        });

        // Answer requests that were not finalized
        let res = match res {
            Ok(true) => Ok(()),
            Ok(false) => {
                let err = ProtocolError::new(Status::NotFound)
                    .with_reason(self.not_found_reason.as_str());
                self.reject(event, &err)
            }
            Err(HandlerError::Protocol(err)) => self.reject(event, &err),
            Err(err) => self.fail(event, &err),
        };
        if let Err(err) = res {
            warn!(%err, "Failed to send response");
            event.close();
        }
        Ok(())
    }

    /// Processes a request, returning whether it was finalized.
    fn process(&self, event: &mut RequestEvent) -> Result<bool, HandlerError> {
        self.signals.raise_request(event)?;

        // Add standard headers
        let headers = &mut event.response.headers;
        headers.insert(Header::Date, fmt_http_date(SystemTime::now()));
        headers.insert(Header::Server, self.server_name.as_str());
        if event.request.content_length() > 0 {
            self.decode(&mut event.request)?;
        }

        // Run routers, then modules - note that routers that complete without
        // sending a response don't cause modules to be skipped
        let mut ctx = RequestContext::new(
            &event.peer,
            &event.request,
            &mut event.response,
        );
        let mut result = ProcessingResult::Continue;
        for router in &self.routers {
            result = router.process(&mut ctx)?;
            if result != ProcessingResult::Continue {
                debug!(?result, "Routers processed the request");
                break;
            }
        }
        if result == ProcessingResult::Continue {
            for module in &self.modules {
                result = module.process(&mut ctx)?;
                if result != ProcessingResult::Continue {
                    debug!(?result, "Modules processed the request");
                    break;
                }
            }
        }

        // Finalize response, unless processing was aborted
        match result {
            ProcessingResult::Continue => Ok(false),
            ProcessingResult::Abort => Ok(true),
            ProcessingResult::SendResponse => {
                self.finalize(event)?;
                Ok(true)
            }
        }
    }

    /// Decodes the request body with the first matching decoder.
    fn decode(&self, request: &mut Request) -> Result<(), HandlerError> {
        let Some(content_type) = request.content_type() else {
            return Ok(());
        };
        let decoder = self
            .decoders
            .iter()
            .find(|decoder| decoder.can_decode(&content_type));

        // Missing decoders leave form and files unset
        if let Some(decoder) = decoder {
            let encoding = Encoding::from_label(content_type.charset());
            let decoded = decoder
                .decode(&request.body, &content_type, encoding)
                .map_err(|err| {
                    debug!(%err, "Failed to decode body");
                    ProtocolError::new(Status::BadRequest)
                })?;
            request.form = Some(decoded.form);
            request.files = Some(decoded.files);
        }
        Ok(())
    }

    /// Sends an error page for a protocol error.
    fn reject(
        &self, event: &mut RequestEvent, err: &ProtocolError,
    ) -> std::io::Result<()> {
        if event.is_sent() {
            warn!(status = %err, "Response already sent");
            return Ok(());
        }
        debug!(path = %event.request.uri.path, status = %err, "Error page");
        self.signals.render_error_page(
            &event.peer,
            Some(&event.request),
            &mut event.response,
            err,
        );
        self.finalize(event)
    }

    /// Reports an unexpected error and answers with a generic response.
    fn fail(
        &self, event: &mut RequestEvent, err: &HandlerError,
    ) -> std::io::Result<()> {
        error!(path = %event.request.uri.path, %err, "Request failed");
        self.signals.raise_exception(&ExceptionEvent {
            peer: Some(&event.peer),
            error: err,
        });
        if event.is_sent() {
            return Ok(());
        }

        // Give observers a chance to render the page
        let page = ProtocolError::new(Status::InternalServerError)
            .with_reason(FAILURE_REASON);
        event.fail(&page);
        let mut page_event = ErrorPageEvent {
            peer: &event.peer,
            request: Some(&event.request),
            response: &mut event.response,
            error: &page,
            handled: false,
        };
        self.signals.raise_error_page(&mut page_event);
        if !page_event.handled {
            let message = if self.expose_errors {
                err.to_string()
            } else {
                page.reason.clone()
            };
            event.response = mem::take(&mut event.response).text(message);
        }
        self.finalize(event)
    }

    /// Runs pre-send observers and sends the response.
    fn finalize(&self, event: &mut RequestEvent) -> std::io::Result<()> {
        let mut ctx = RequestContext::new(
            &event.peer,
            &event.request,
            &mut event.response,
        );
        for observer in &self.sending {
            let res =
                panic::catch_unwind(AssertUnwindSafe(|| observer(&mut ctx)));
            if let Err(payload) = res {
                let panic = panic_message(&*payload);
                error!(%panic, "Pre-send observer");
            }
        }

        // Send response and close, if the client asked for it
        event.send()?;
        if event.request.connection() == ConnectionType::Close {
            debug!("Closing connection");
            event.close();
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::decoder;
    use crate::http::Method;
    use crate::listener::Peer;

    use super::*;

    fn pipeline() -> Pipeline {
        Pipeline {
            signals: Signals::default(),
            sending: Vec::new(),
            routers: Vec::new(),
            modules: Vec::new(),
            decoders: decoder::defaults(),
            server_name: String::from("test"),
            not_found_reason: String::from("Not Found"),
            expose_errors: false,
        }
    }

    fn handle(pipeline: &Pipeline, request: Request) -> RequestEvent {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let peer = Peer { remote_addr: addr, local_addr: addr, secure: false };
        let mut event = RequestEvent::new(peer, request);
        pipeline.handle(&mut event).unwrap();
        event
    }

    fn output(event: &RequestEvent) -> String {
        String::from_utf8_lossy(event.output()).into_owned()
    }

    fn reply(
        body: &'static str, calls: &Arc<AtomicUsize>,
    ) -> Box<dyn Router> {
        let calls = Arc::clone(calls);
        Box::new(move |ctx: &mut RequestContext| {
            calls.fetch_add(1, Ordering::SeqCst);
            if body.is_empty() {
                return Ok(ProcessingResult::Continue);
            }
            ctx.response.body = body.as_bytes().to_vec();
            Ok(ProcessingResult::SendResponse)
        })
    }

    #[test]
    fn test_first_send_response_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pipeline = pipeline();
        pipeline.routers.push(reply("", &calls));
        pipeline.routers.push(reply("B", &calls));
        pipeline.routers.push(reply("C", &calls));
        pipeline.modules.push(Box::new(|_: &mut RequestContext| {
            Err(HandlerError::other("module must not run"))
        }));

        let event = handle(&pipeline, Request::new());
        let output = output(&event);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.ends_with("\r\n\r\nB"));
        assert!(output.contains("\r\nServer: test\r\n"));
        assert!(output.contains("\r\nDate: "));
    }

    #[test]
    fn test_routers_continue_into_modules() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pipeline = pipeline();
        pipeline.routers.push(reply("", &calls));
        pipeline.modules.push(Box::new(|ctx: &mut RequestContext| {
            ctx.response.body = b"module".to_vec();
            Ok(ProcessingResult::SendResponse)
        }));
        let event = handle(&pipeline, Request::new());
        assert!(output(&event).ends_with("\r\n\r\nmodule"));
    }

    #[test]
    fn test_unhandled_is_not_found() {
        let event = handle(&pipeline(), Request::new().uri("/nowhere"));
        let output = output(&event);
        assert!(output.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(output.ends_with(
            "<html><head><title>Not Found</title></head>\
             <body>Error 404: Not Found</body></html>"
        ));
    }

    #[test]
    fn test_abort_sends_nothing() {
        let mut pipeline = pipeline();
        pipeline.routers.push(Box::new(|_: &mut RequestContext| {
            Ok(ProcessingResult::Abort)
        }));
        let event = handle(&pipeline, Request::new());
        assert!(event.handled);
        assert!(!event.is_sent());
    }

    #[test]
    fn test_protocol_error_renders_page() {
        let mut pipeline = pipeline();
        pipeline.modules.push(Box::new(|_: &mut RequestContext| {
            Err(ProtocolError::new(Status::Forbidden).into())
        }));
        let event = handle(&pipeline, Request::new());
        let output = output(&event);
        assert!(output.starts_with("HTTP/1.1 403 Forbidden\r\n"));
        assert!(output.ends_with("<body>Error 403: Forbidden</body></html>"));
    }

    #[test]
    fn test_failure_reports_exception() {
        let exceptions = Arc::new(AtomicUsize::new(0));
        let mut pipeline = pipeline();
        pipeline.signals.exception.push(Box::new({
            let exceptions = Arc::clone(&exceptions);
            move |_: &ExceptionEvent| {
                exceptions.fetch_add(1, Ordering::SeqCst);
            }
        }));
        pipeline.routers.push(Box::new(|_: &mut RequestContext| {
            Err(HandlerError::other(io::Error::other("disk on fire")))
        }));

        let event = handle(&pipeline, Request::new());
        let output = output(&event);
        assert_eq!(exceptions.load(Ordering::SeqCst), 1);
        assert!(
            output.starts_with("HTTP/1.1 500 Failed to process request.\r\n")
        );
        assert!(output.ends_with("\r\n\r\nFailed to process request."));
    }

    #[test]
    fn test_failure_exposes_errors() {
        let mut pipeline = pipeline();
        pipeline.expose_errors = true;
        pipeline.routers.push(Box::new(
            |_: &mut RequestContext| -> Result<ProcessingResult, HandlerError> {
                panic!("disk on fire")
            },
        ));
        let event = handle(&pipeline, Request::new());
        assert!(output(&event).ends_with("\r\n\r\ndisk on fire"));
    }

    #[test]
    fn test_decode_form() {
        let mut pipeline = pipeline();
        pipeline.routers.push(Box::new(|ctx: &mut RequestContext| {
            let form = ctx.request.form.as_ref();
            let kind = form.and_then(|form| form.get("kind")).unwrap_or("-");
            ctx.response.body = kind.as_bytes().to_vec();
            Ok(ProcessingResult::SendResponse)
        }));
        let request = Request::new()
            .method(Method::Post)
            .header(Header::ContentType, "application/x-www-form-urlencoded")
            .body("kind=arabica");
        let event = handle(&pipeline, request);
        assert!(output(&event).ends_with("\r\n\r\narabica"));
    }

    #[test]
    fn test_decode_without_decoder() {
        let mut pipeline = pipeline();
        pipeline.decoders.clear();
        pipeline.routers.push(Box::new(|ctx: &mut RequestContext| {
            assert!(ctx.request.form.is_none());
            assert!(ctx.request.files.is_none());
            Ok(ProcessingResult::SendResponse)
        }));
        let request = Request::new()
            .method(Method::Post)
            .header(Header::ContentType, "application/x-www-form-urlencoded")
            .body("kind=arabica");
        let event = handle(&pipeline, request);
        assert!(output(&event).starts_with("HTTP/1.1 200 OK\r\n"));
    }

    #[test]
    fn test_decode_failure_is_bad_request() {
        let request = Request::new()
            .method(Method::Post)
            .header(Header::ContentType, "multipart/form-data")
            .body("--x\r\n");
        let event = handle(&pipeline(), request);
        assert!(output(&event).starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn test_sending_observers_and_close() {
        let mut pipeline = pipeline();
        pipeline.sending.push(Box::new(|ctx: &mut RequestContext| {
            ctx.response.headers.insert("X-Sent", "yes");
        }));
        pipeline.routers.push(Box::new(|_: &mut RequestContext| {
            Ok(ProcessingResult::SendResponse)
        }));
        let request = Request::new().header(Header::Connection, "close");
        let event = handle(&pipeline, request);
        assert!(output(&event).contains("\r\nX-Sent: yes\r\n"));
        assert!(event.is_closing());
    }
}
