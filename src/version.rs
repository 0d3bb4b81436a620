//! HTTP protocol versions.

use std::fmt;

use self::HttpVersion::{Http10, Http11};

/// A parsed HTTP/1.x protocol version.
///
/// Only HTTP/1.0 and HTTP/1.1 exist on the wire for this parser; any other
/// version literal is rejected with `Unknown HTTP version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVersion {
    /// `HTTP/1.0`
    Http10,
    /// `HTTP/1.1`
    Http11,
}

impl HttpVersion {
    /// Parses a version literal, which must be exactly `HTTP/1.0` or
    /// `HTTP/1.1`.
    pub fn parse(s: &str) -> Option<HttpVersion> {
        match s {
            "HTTP/1.0" => Some(Http10),
            "HTTP/1.1" => Some(Http11),
            _ => None,
        }
    }

    /// The major version number.
    pub fn major(&self) -> u8 {
        1
    }

    /// The minor version number.
    pub fn minor(&self) -> u8 {
        match *self {
            Http10 => 0,
            Http11 => 1,
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Http10 => "HTTP/1.0",
            Http11 => "HTTP/1.1",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::HttpVersion;

    #[test]
    fn parse_known_versions() {
        assert_eq!(HttpVersion::parse("HTTP/1.0"), Some(HttpVersion::Http10));
        assert_eq!(HttpVersion::parse("HTTP/1.1"), Some(HttpVersion::Http11));
    }

    #[test]
    fn reject_everything_else() {
        assert_eq!(HttpVersion::parse("HTTP/1.2"), None);
        assert_eq!(HttpVersion::parse("HTTP/2.0"), None);
        assert_eq!(HttpVersion::parse("http/1.1"), None);
        assert_eq!(HttpVersion::parse("HTTP/11"), None);
        assert_eq!(HttpVersion::parse(""), None);
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(HttpVersion::Http10.to_string(), "HTTP/1.0");
        assert_eq!(HttpVersion::Http11.to_string(), "HTTP/1.1");
    }
}
