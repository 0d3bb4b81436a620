//! The configurable HTTP metadata parser.
//!
//! One parser value holds nothing but its immutable options, so it can be
//! shared across threads freely; each call brings its own byte source.
//! Parsing is synchronous, reads one byte at a time, and never retains
//! bytes past their line.

use std::collections::HashMap;
use std::io::Read;

use crate::error::{Error, Result};
use crate::header::RawHeaders;
use crate::message::{Request, Response};
use crate::options::ParserOptions;
use crate::scanner::ByteScanner;
use crate::startline::{RequestLine, StatusLine};
use crate::uri::{self, Uri};
use crate::version::HttpVersion;

/// Parses HTTP/1.x start lines, header sections, URIs and query strings
/// according to a fixed set of [`ParserOptions`](ParserOptions).
#[derive(Debug, Clone, Default)]
pub struct HttpMetadataParser {
    options: ParserOptions,
}

impl HttpMetadataParser {
    /// A parser with the given options.
    pub fn new(options: ParserOptions) -> HttpMetadataParser {
        HttpMetadataParser { options }
    }

    /// This parser's options.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parses a request line, e.g. `GET /hello HTTP/1.1`.
    ///
    /// With `insert_http_version_if_missing` (the default) a two-token line
    /// like `GET /` gets HTTP/1.1.
    pub fn parse_request_line(&self, line: &str) -> Result<RequestLine> {
        if line.is_empty() {
            return Err(Error::request("No content", 0));
        }
        self.request_line_from(line, 1)
    }

    /// Parses a status line, e.g. `HTTP/1.1 200 OK`.
    ///
    /// The reason phrase runs verbatim to the end of the line and may be
    /// empty. A line with no leading `HTTP/` token gets HTTP/1.1 when
    /// `insert_http_version_if_missing` is set.
    pub fn parse_response_line(&self, line: &str) -> Result<StatusLine> {
        if line.is_empty() {
            return Err(Error::request("No content", 0));
        }
        self.status_line_from(line, 1)
    }

    /// Reads the metadata of a request: start line, then headers.
    ///
    /// The returned request carries no body; attach one with
    /// [`Request::with_body`](crate::Request::with_body).
    pub fn parse_request<R: Read>(&self, src: R) -> Result<Request> {
        let mut scanner = ByteScanner::new(src, self.options.allow_new_line_without_return());
        let (line, line_number) = self.read_start_line(&mut scanner)?;
        let request_line = self.request_line_from(&line, line_number)?;
        debug!("request line: {}", request_line);
        let headers = self.parse_headers_from(&mut scanner, |message, line| Error::header(message, line))?;
        Ok(Request::new(request_line, headers))
    }

    /// Reads the metadata of a response: status line, then headers.
    pub fn parse_response<R: Read>(&self, src: R) -> Result<Response> {
        let mut scanner = ByteScanner::new(src, self.options.allow_new_line_without_return());
        let (line, line_number) = self.read_start_line(&mut scanner)?;
        let status_line = self.status_line_from(&line, line_number)?;
        debug!("status line: {}", status_line);
        let headers = self.parse_headers_from(&mut scanner, |message, line| Error::header(message, line))?;
        Ok(Response::new(status_line, headers))
    }

    /// Parses a header section from a byte source.
    ///
    /// Parsing stops at an empty line or at end of input; empty input
    /// yields an empty container. Failures are raised as
    /// [`InvalidHttpHeader`](crate::InvalidHttpHeader).
    pub fn parse_headers<R: Read>(&self, src: R) -> Result<RawHeaders> {
        let mut scanner = ByteScanner::new(src, self.options.allow_new_line_without_return());
        self.parse_headers_from(&mut scanner, |message, line| Error::header(message, line))
    }

    /// Parses a header section off an existing scanner, raising failures
    /// through `make_error`.
    ///
    /// The error factory receives the failure description and the 1-based
    /// line the offending field started on, so the same routine can serve
    /// callers with different error families.
    ///
    /// ```notrust
    /// field-line   = field-name ":" OWS field-value OWS
    /// field-name   = 1*tchar
    /// ```
    pub fn parse_headers_from<R, F>(
        &self,
        scanner: &mut ByteScanner<R>,
        make_error: F,
    ) -> Result<RawHeaders>
    where
        R: Read,
        F: Fn(String, u32) -> Error,
    {
        let allow_bare_lf = self.options.allow_new_line_without_return();
        let max_name = self.options.max_header_name_length();
        let max_value = self.options.max_header_value_length();
        let mut builder = RawHeaders::builder();

        loop {
            let line_number = scanner.line_number();
            let first = match scanner.read_byte()? {
                None => break,
                Some(b) => b,
            };
            if first == b'\r' && scanner.peek()? == Some(b'\n') {
                scanner.read_byte()?;
                break;
            }
            if first == b'\n' {
                if allow_bare_lf {
                    break;
                }
                return Err(make_error(
                    "Illegal new-line character without preceding return".to_string(),
                    line_number,
                ));
            }

            // field-name, up to the ':' separator
            let mut name = String::new();
            let mut b = first;
            loop {
                match b {
                    b':' => break,
                    b'\r' if scanner.peek()? == Some(b'\n') => {
                        return Err(make_error(
                            "Invalid header: missing the ':' separator".to_string(),
                            line_number,
                        ));
                    }
                    b'\n' if allow_bare_lf => {
                        return Err(make_error(
                            "Invalid header: missing the ':' separator".to_string(),
                            line_number,
                        ));
                    }
                    b'\n' => {
                        return Err(make_error(
                            "Illegal new-line character without preceding return".to_string(),
                            line_number,
                        ));
                    }
                    b if is_tchar_byte(b) => {
                        name.push(b as char);
                        if name.len() > max_name {
                            return Err(make_error(
                                "Header name is too long".to_string(),
                                line_number,
                            ));
                        }
                    }
                    b => {
                        return Err(make_error(
                            format!("Illegal character in HTTP header name: '{}'", b as char),
                            line_number,
                        ));
                    }
                }
                b = match scanner.read_byte()? {
                    None => {
                        return Err(make_error(
                            "Invalid header: missing the ':' separator".to_string(),
                            line_number,
                        ));
                    }
                    Some(b) => b,
                };
            }
            if name.is_empty() {
                return Err(make_error(
                    "Invalid header: missing header name".to_string(),
                    line_number,
                ));
            }

            // field-value; leading whitespace is skipped, trailing trimmed
            let mut raw: Vec<u8> = Vec::new();
            let mut seen_content = false;
            let mut at_eof = false;
            loop {
                let b = match scanner.read_byte()? {
                    None => {
                        at_eof = true;
                        break;
                    }
                    Some(b) => b,
                };
                match b {
                    b'\r' if scanner.peek()? == Some(b'\n') => {
                        scanner.read_byte()?;
                        break;
                    }
                    b'\n' if allow_bare_lf => break,
                    b'\n' => {
                        return Err(make_error(
                            "Illegal new-line character without preceding return".to_string(),
                            line_number,
                        ));
                    }
                    b' ' | b'\t' if !seen_content => (),
                    b if legal_value_byte(b) => {
                        seen_content = true;
                        raw.push(b);
                        if raw.len() > max_value {
                            return Err(make_error(
                                "Header value is too long".to_string(),
                                line_number,
                            ));
                        }
                    }
                    b => {
                        return Err(make_error(
                            format!("Illegal character in HTTP header value: '{}'", b as char),
                            line_number,
                        ));
                    }
                }
            }
            while raw.last() == Some(&b' ') || raw.last() == Some(&b'\t') {
                raw.pop();
            }
            let value: String = raw.iter().map(|&b| b as char).collect();
            trace!("header field: {}: {}", name, value);
            builder = builder.with(name, value);
            if at_eof {
                break;
            }
        }

        let headers = builder.build();
        debug!("parsed {} header fields", headers.len());
        if let Some(validator) = self.options.header_validator() {
            (**validator)(&headers)?;
        }
        Ok(headers)
    }

    /// Parses a request target or URI reference.
    ///
    /// Illegal bytes in path, query and fragment are always
    /// percent-encoded here; this entry point exists to build usable URIs
    /// out of sloppy input. Strictness only applies to targets inside a
    /// request line.
    pub fn parse_uri(&self, uri: &str) -> Result<Uri> {
        uri::parse(uri, true).map_err(|e| Error::request(e.message(), 1))
    }

    /// Splits a raw query string into its pairs.
    ///
    /// Pairs split on `&`, then once on `=`. A pair with no `=` maps the
    /// key to no value at all; `k=` maps it to one empty value. Duplicate
    /// keys accumulate in insertion order. No percent-decoding is applied.
    pub fn parse_query_string(&self, query: &str) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }
            match pair.find('=') {
                Some(eq) => map
                    .entry(pair[..eq].to_string())
                    .or_insert_with(Vec::new)
                    .push(pair[eq + 1..].to_string()),
                None => {
                    map.entry(pair.to_string()).or_insert_with(Vec::new);
                }
            }
        }
        map
    }

    /// Reads the start line, discarding one leading empty line when
    /// configured to. Returns the line decoded as ISO-8859-1 and the
    /// 1-based line number it was read from.
    fn read_start_line<R: Read>(&self, scanner: &mut ByteScanner<R>) -> Result<(String, u32)> {
        let mut line_number = scanner.line_number();
        let mut line = match scanner.read_line(usize::max_value())? {
            None => return Err(Error::request("No content", 0)),
            Some(bytes) => bytes,
        };
        if line.is_empty() && self.options.ignore_leading_empty_line() {
            trace!("discarding leading empty line");
            line_number = scanner.line_number();
            line = match scanner.read_line(usize::max_value())? {
                None => return Err(Error::request("No content", scanner.line_number())),
                Some(bytes) => bytes,
            };
        }
        Ok((line.iter().map(|&b| b as char).collect(), line_number))
    }

    fn request_line_from(&self, line: &str, line_number: u32) -> Result<RequestLine> {
        let first_space = match line.find(' ') {
            Some(i) if i > 0 => i,
            _ => return Err(Error::request("Invalid request line", line_number)),
        };
        let method = &line[..first_space];
        if let Some(bad) = method.chars().position(|c| !is_tchar(c)) {
            return Err(Error::request(
                format!(
                    "Invalid method name: illegal character at index {}: '{}'",
                    bad, method
                ),
                line_number,
            ));
        }

        // the method ends at the first space and the version starts after
        // the last one; everything between is the target, spaces included
        let last_space = line.rfind(' ').unwrap_or(first_space);
        let (target, version_literal) = if last_space == first_space {
            (&line[first_space + 1..], None)
        } else {
            (
                &line[first_space + 1..last_space],
                Some(&line[last_space + 1..]),
            )
        };
        if target.is_empty() {
            return Err(Error::request("Missing request target", line_number));
        }
        let uri = self.parse_target(target, line_number)?;
        let version = match version_literal {
            None => {
                if self.options.insert_http_version_if_missing() {
                    HttpVersion::Http11
                } else {
                    return Err(Error::request("Missing HTTP version", line_number));
                }
            }
            Some("") => return Err(Error::request("Missing HTTP version", line_number)),
            Some(literal) => HttpVersion::parse(literal)
                .ok_or_else(|| Error::request("Unknown HTTP version", line_number))?,
        };
        Ok(RequestLine::new(method, uri, version))
    }

    fn status_line_from(&self, line: &str, line_number: u32) -> Result<StatusLine> {
        let (version, rest) = if line.starts_with("HTTP/") {
            let (literal, rest) = match line.find(' ') {
                Some(i) => (&line[..i], &line[i + 1..]),
                None => (line, ""),
            };
            let version = HttpVersion::parse(literal)
                .ok_or_else(|| Error::request("Unknown HTTP version", line_number))?;
            (version, rest)
        } else if self.options.insert_http_version_if_missing() {
            (HttpVersion::Http11, line)
        } else {
            return Err(Error::request("Missing HTTP version", line_number));
        };

        if rest.is_empty() {
            return Err(Error::request("Invalid status line", line_number));
        }
        let (code, reason) = match rest.find(' ') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        let status_code = code
            .parse::<u16>()
            .ok()
            .filter(|_| code.bytes().all(|b| b.is_ascii_digit()))
            .filter(|&n| n <= 999)
            .ok_or_else(|| Error::request("Invalid status code", line_number))?;

        Ok(StatusLine::new(version, status_code, reason))
    }

    fn parse_target(&self, target: &str, line_number: u32) -> Result<Uri> {
        uri::parse(
            target,
            self.options.allow_illegal_start_line_characters(),
        )
        .map_err(|e| {
            Error::request(
                format!("Invalid request target: {}", e.message()),
                line_number,
            )
        })
    }
}

/// Whether `c` is an RFC 7230 `tchar`, the character set for methods and
/// header field names.
///
/// ```notrust
/// tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*"
///       / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~"
///       / DIGIT / ALPHA
/// ```
fn is_tchar(c: char) -> bool {
    match c {
        'a'..='z' | 'A'..='Z' | '0'..='9' | '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+'
        | '-' | '.' | '^' | '_' | '`' | '|' | '~' => true,
        _ => false,
    }
}

fn is_tchar_byte(b: u8) -> bool {
    b.is_ascii() && is_tchar(b as char)
}

/// Header values are ISO-8859-1: TAB, the printable ASCII range and the
/// high half are legal; control bytes and DEL are not.
fn legal_value_byte(b: u8) -> bool {
    b == b'\t' || (0x20..=0x7E).contains(&b) || b >= 0x80
}
