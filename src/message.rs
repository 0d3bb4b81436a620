//! Request and response value objects.
//!
//! A message bundles a start line with its headers and, optionally, a body.
//! The metadata parser produces messages without bodies; attaching one goes
//! through [`with_body`](Request::with_body), which re-derives the
//! body-describing headers so the two can never disagree.

use std::fmt;

use crate::body::HttpMessageBody;
use crate::header::RawHeaders;
use crate::startline::{RequestLine, StatusLine};
use crate::uri::Uri;
use crate::version::HttpVersion;

/// An HTTP request.
#[derive(Debug)]
pub struct Request {
    line: RequestLine,
    headers: RawHeaders,
    body: Option<HttpMessageBody>,
}

impl Request {
    /// A request with the given start line and headers, and no body.
    pub fn new(line: RequestLine, headers: RawHeaders) -> Request {
        Request {
            line,
            headers,
            body: None,
        }
    }

    /// The request line.
    pub fn request_line(&self) -> &RequestLine {
        &self.line
    }

    /// The request method.
    pub fn method(&self) -> &str {
        self.line.method()
    }

    /// The request target.
    pub fn uri(&self) -> &Uri {
        self.line.uri()
    }

    /// The protocol version.
    pub fn http_version(&self) -> HttpVersion {
        self.line.http_version()
    }

    /// The request headers.
    pub fn headers(&self) -> &RawHeaders {
        &self.headers
    }

    /// The body, if one was attached.
    pub fn body(&self) -> Option<&HttpMessageBody> {
        self.body.as_ref()
    }

    /// Attaches a body, overwriting the headers it derives
    /// (`Content-Type`, `Content-Length`, `Transfer-Encoding`).
    pub fn with_body(self, body: HttpMessageBody) -> Request {
        let headers = body.headers_from(&self.headers);
        Request {
            line: self.line,
            headers,
            body: Some(body),
        }
    }

    /// Consumes the request, returning its body if any.
    pub fn into_body(self) -> Option<HttpMessageBody> {
        self.body
    }

    /// Deconstructs the request into its constituent parts.
    pub fn deconstruct(self) -> (RequestLine, RawHeaders, Option<HttpMessageBody>) {
        (self.line, self.headers, self.body)
    }
}

/// Writes the metadata block: start line, each header field, and the
/// terminating empty line, all `\r\n`-separated.
impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\r\n{}\r\n", self.line, self.headers)
    }
}

/// An HTTP response.
#[derive(Debug)]
pub struct Response {
    line: StatusLine,
    headers: RawHeaders,
    body: Option<HttpMessageBody>,
}

impl Response {
    /// A response with the given status line and headers, and no body.
    pub fn new(line: StatusLine, headers: RawHeaders) -> Response {
        Response {
            line,
            headers,
            body: None,
        }
    }

    /// The status line.
    pub fn status_line(&self) -> &StatusLine {
        &self.line
    }

    /// The status code.
    pub fn status_code(&self) -> u16 {
        self.line.status_code()
    }

    /// The protocol version.
    pub fn http_version(&self) -> HttpVersion {
        self.line.http_version()
    }

    /// The response headers.
    pub fn headers(&self) -> &RawHeaders {
        &self.headers
    }

    /// The body, if one was attached.
    pub fn body(&self) -> Option<&HttpMessageBody> {
        self.body.as_ref()
    }

    /// Attaches a body, overwriting the headers it derives
    /// (`Content-Type`, `Content-Length`, `Transfer-Encoding`).
    pub fn with_body(self, body: HttpMessageBody) -> Response {
        let headers = body.headers_from(&self.headers);
        Response {
            line: self.line,
            headers,
            body: Some(body),
        }
    }

    /// Consumes the response, returning its body if any.
    pub fn into_body(self) -> Option<HttpMessageBody> {
        self.body
    }

    /// Deconstructs the response into its constituent parts.
    pub fn deconstruct(self) -> (StatusLine, RawHeaders, Option<HttpMessageBody>) {
        (self.line, self.headers, self.body)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\r\n{}\r\n", self.line, self.headers)
    }
}
