//! Request and status lines.
//!
//! ```notrust
//! request-line = method SP request-target SP HTTP-version CRLF
//! status-line  = HTTP-version SP status-code SP reason-phrase CRLF
//! ```

use std::fmt;

use crate::uri::Uri;
use crate::version::HttpVersion;

/// The first line of an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    uri: Uri,
    http_version: HttpVersion,
}

impl RequestLine {
    /// Bundles a method, target URI and version.
    ///
    /// The method is expected to be a non-empty RFC 7230 token; the parser
    /// validates this before constructing one.
    pub fn new(method: impl Into<String>, uri: Uri, http_version: HttpVersion) -> RequestLine {
        RequestLine {
            method: method.into(),
            uri,
            http_version,
        }
    }

    /// The request method, e.g. `GET`.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request target.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The protocol version.
    pub fn http_version(&self) -> HttpVersion {
        self.http_version
    }

    /// Consumes the line, returning its target URI.
    pub fn into_uri(self) -> Uri {
        self.uri
    }
}

/// Writes the canonical form `{method} {raw-target} HTTP/{major}.{minor}`.
///
/// The target is rendered in origin form when the URI carries no host and
/// in absolute form otherwise; an empty path becomes `/`.
impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ", self.method)?;
        if self.uri.host().is_some() {
            write!(f, "{}", self.uri)?;
        } else {
            let path = self.uri.raw_path();
            f.write_str(if path.is_empty() { "/" } else { path })?;
            if let Some(query) = self.uri.raw_query() {
                write!(f, "?{}", query)?;
            }
            if let Some(fragment) = self.uri.raw_fragment() {
                write!(f, "#{}", fragment)?;
            }
        }
        write!(f, " {}", self.http_version)
    }
}

/// The first line of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    http_version: HttpVersion,
    status_code: u16,
    reason_phrase: String,
}

impl StatusLine {
    /// Bundles a version, status code and reason phrase.
    pub fn new(
        http_version: HttpVersion,
        status_code: u16,
        reason_phrase: impl Into<String>,
    ) -> StatusLine {
        StatusLine {
            http_version,
            status_code,
            reason_phrase: reason_phrase.into(),
        }
    }

    /// The protocol version.
    pub fn http_version(&self) -> HttpVersion {
        self.http_version
    }

    /// The status code, in `[0, 999]`.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// The reason phrase, possibly empty.
    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.http_version, self.status_code)?;
        if !self.reason_phrase.is_empty() {
            write!(f, " {}", self.reason_phrase)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StatusLine;
    use crate::version::HttpVersion;

    #[test]
    fn status_line_display() {
        let line = StatusLine::new(HttpVersion::Http11, 200, "OK");
        assert_eq!(line.to_string(), "HTTP/1.1 200 OK");
    }

    #[test]
    fn empty_reason_phrase_is_not_padded() {
        let line = StatusLine::new(HttpVersion::Http10, 404, "");
        assert_eq!(line.to_string(), "HTTP/1.0 404");
    }
}
