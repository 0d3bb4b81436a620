//! Request-target and URI parsing.
//!
//! Parses an HTTP request target or absolute URI reference into its RFC 3986
//! components without delegating to a platform URI type, so quirks that
//! matter on the wire are under this crate's control: bracketed IPv6 hosts
//! are kept verbatim including the brackets, a schemeless authority form
//! like `example.com:8080` infers the `http` scheme, and percent-encoding
//! repair can rewrite illegal bytes instead of rejecting them.
//!
//! Repair is component-aware and runs as a dedicated pre-pass, never
//! interleaved with decomposition, so strict-mode error positions stay
//! unambiguous. A `?` separating the query is preserved and a later `?`
//! inside query or fragment is legal; a `#` inside an already-started query
//! or fragment is encoded, since the fragment separator is whichever of the
//! two delimiters comes first. The authority is never repaired; an illegal
//! byte there is an error in every mode.

use std::fmt;

use self::Component::{Authority, Fragment, Path, Query};

/// A parsed URI.
///
/// `raw_*` accessors return the stored bytes; `path`/`query`/`fragment`
/// percent-decode for display. An unspecified port is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    scheme: String,
    user_info: Option<String>,
    host: Option<String>,
    port: Option<u32>,
    raw_path: String,
    raw_query: Option<String>,
    raw_fragment: Option<String>,
}

impl Uri {
    /// The URI scheme, `http` when none was given.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The user-info part of the authority, the substring before `@`.
    pub fn user_info(&self) -> Option<&str> {
        self.user_info.as_ref().map(|s| s.as_str())
    }

    /// The host, kept verbatim; a bracketed IPv6 host includes its brackets.
    pub fn host(&self) -> Option<&str> {
        self.host.as_ref().map(|s| s.as_str())
    }

    /// The port, `None` when unspecified.
    pub fn port(&self) -> Option<u32> {
        self.port
    }

    /// The path exactly as stored, possibly empty.
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// The query exactly as stored, without the leading `?`.
    pub fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_ref().map(|s| s.as_str())
    }

    /// The fragment exactly as stored, without the leading `#`.
    pub fn raw_fragment(&self) -> Option<&str> {
        self.raw_fragment.as_ref().map(|s| s.as_str())
    }

    /// The percent-decoded path.
    pub fn path(&self) -> String {
        percent_decode(&self.raw_path)
    }

    /// The percent-decoded query.
    pub fn query(&self) -> Option<String> {
        self.raw_query.as_ref().map(|q| percent_decode(q))
    }

    /// The percent-decoded fragment.
    pub fn fragment(&self) -> Option<String> {
        self.raw_fragment.as_ref().map(|f| percent_decode(f))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref host) = self.host {
            write!(f, "{}://", self.scheme)?;
            if let Some(ref user_info) = self.user_info {
                write!(f, "{}@", user_info)?;
            }
            f.write_str(host)?;
            if let Some(port) = self.port {
                write!(f, ":{}", port)?;
            }
        }
        f.write_str(&self.raw_path)?;
        if let Some(ref query) = self.raw_query {
            write!(f, "?{}", query)?;
        }
        if let Some(ref fragment) = self.raw_fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

/// An illegal character in a URI component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UriError {
    component: Component,
    index: usize,
    snippet: String,
}

impl UriError {
    fn new(component: Component, index: usize, input: &str, at: usize) -> UriError {
        UriError {
            component,
            index,
            snippet: input[at..].to_string(),
        }
    }

    pub(crate) fn message(&self) -> String {
        format!(
            "Illegal character in {} at index {}: '{}'",
            self.component.as_str(),
            self.index,
            self.snippet
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Authority,
    Path,
    Query,
    Fragment,
}

impl Component {
    fn as_str(&self) -> &'static str {
        match *self {
            Authority => "authority",
            Path => "path",
            Query => "query",
            Fragment => "fragment",
        }
    }
}

/// Parses a request target or URI reference.
///
/// With `repair` set, illegal bytes in path, query and fragment are
/// percent-encoded first; otherwise they are rejected with their component
/// and 0-based offset within it.
pub(crate) fn parse(input: &str, repair: bool) -> Result<Uri, UriError> {
    if repair {
        let fixed = repair_target(input)?;
        decompose(&fixed)
    } else {
        decompose(input)
    }
}

fn decompose(s: &str) -> Result<Uri, UriError> {
    if let Some((scheme, rest)) = split_scheme(s) {
        let auth = split_authority(s, rest)?;
        let port = parse_port(&auth, s, rest)?;
        let (raw_path, raw_query, raw_fragment) = split_rest(s, auth.end)?;
        return Ok(Uri {
            scheme: scheme.to_string(),
            user_info: auth.user_info.map(String::from),
            host: Some(auth.host.to_string()),
            port,
            raw_path,
            raw_query,
            raw_fragment,
        });
    }

    if s.starts_with('/') {
        let (raw_path, raw_query, raw_fragment) = split_rest(s, 0)?;
        return Ok(Uri {
            scheme: "http".to_string(),
            user_info: None,
            host: None,
            port: None,
            raw_path,
            raw_query,
            raw_fragment,
        });
    }

    // authority-form attempt; an illegal byte in the would-be authority is
    // an error in every mode, but text that merely does not look like a
    // host (e.g. the `*` target) falls back to a rootless path reference
    let auth = split_authority(s, 0)?;
    let port = match auth.port {
        Some(p) if !p.is_empty() => port_bytes(p),
        _ => None,
    };
    let bad_port = match auth.port {
        Some(p) => !p.is_empty() && port.is_none(),
        None => false,
    };
    let plausible =
        !bad_port && (auth.host.starts_with('[') || port.is_some() || dns_like(auth.host));
    if plausible {
        let (raw_path, raw_query, raw_fragment) = split_rest(s, auth.end)?;
        return Ok(Uri {
            scheme: "http".to_string(),
            user_info: auth.user_info.map(String::from),
            host: Some(auth.host.to_string()),
            port,
            raw_path,
            raw_query,
            raw_fragment,
        });
    }

    let (raw_path, raw_query, raw_fragment) = split_rest(s, 0)?;
    Ok(Uri {
        scheme: "http".to_string(),
        user_info: None,
        host: None,
        port: None,
        raw_path,
        raw_query,
        raw_fragment,
    })
}

/// Splits a leading `scheme://`, returning the scheme and the byte offset
/// just past the `://`. Only a `//`-scheme is recognized; anything else is
/// treated as schemeless.
fn split_scheme(s: &str) -> Option<(&str, usize)> {
    let idx = s.find("://")?;
    let scheme = &s[..idx];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => (),
        _ => return None,
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        Some((scheme, idx + 3))
    } else {
        None
    }
}

/// The split, validated text of an authority component.
struct RawAuthority<'a> {
    user_info: Option<&'a str>,
    host: &'a str,
    port: Option<&'a str>,
    /// offset of the port text within the authority
    port_at: usize,
    /// byte offset just past the authority
    end: usize,
}

/// Validates and splits `[userinfo@]host[:port]` starting at `start`, up
/// to the first `/`, `?` or `#`. The port is left as text; strict callers
/// turn it into a number with [`parse_port`](parse_port).
fn split_authority(s: &str, start: usize) -> Result<RawAuthority<'_>, UriError> {
    let bytes = s.as_bytes();
    let mut end = s.len();
    for (i, &b) in bytes[start..].iter().enumerate() {
        if b == b'/' || b == b'?' || b == b'#' {
            end = start + i;
            break;
        }
    }
    let auth = &s[start..end];
    let ab = auth.as_bytes();

    let mut i = 0;
    while i < ab.len() {
        let b = ab[i];
        if b == b'%' {
            if !pct_encoded(ab, i) {
                return Err(UriError::new(Authority, i, s, start + i));
            }
            i += 3;
        } else if legal_in(Authority, b) {
            i += 1;
        } else {
            return Err(UriError::new(Authority, i, s, start + i));
        }
    }

    let (user_info, hp, hp_off) = match auth.find('@') {
        Some(at) => (Some(&auth[..at]), &auth[at + 1..], at + 1),
        None => (None, auth, 0),
    };

    let (host, port, port_off) = if hp.starts_with('[') {
        match hp.find(']') {
            Some(close) => {
                let rest = &hp[close + 1..];
                if rest.is_empty() {
                    (&hp[..=close], None, 0)
                } else if rest.starts_with(':') {
                    (&hp[..=close], Some(&rest[1..]), close + 2)
                } else {
                    return Err(UriError::new(
                        Authority,
                        hp_off + close + 1,
                        s,
                        start + hp_off + close + 1,
                    ));
                }
            }
            None => return Err(UriError::new(Authority, hp_off, s, start + hp_off)),
        }
    } else {
        match hp.find(':') {
            Some(colon) => (&hp[..colon], Some(&hp[colon + 1..]), colon + 1),
            None => (hp, None, 0),
        }
    };

    Ok(RawAuthority {
        user_info,
        host,
        port,
        port_at: hp_off + port_off,
        end,
    })
}

/// Parses the port strictly; a non-digit port is an illegal authority
/// character at its offset.
fn parse_port(auth: &RawAuthority<'_>, s: &str, start: usize) -> Result<Option<u32>, UriError> {
    match auth.port {
        None | Some("") => Ok(None),
        Some(p) => match port_bytes(p) {
            Some(n) => Ok(Some(n)),
            None => {
                let bad = p.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(0);
                let at = auth.port_at + bad;
                Err(UriError::new(Authority, at, s, start + at))
            }
        },
    }
}

fn port_bytes(p: &str) -> Option<u32> {
    if p.bytes().all(|b| b.is_ascii_digit()) {
        p.parse().ok()
    } else {
        None
    }
}

fn dns_like(host: &str) -> bool {
    !host.is_empty()
        && host
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.' || b == b'_')
}

/// Splits and validates `path[?query][#fragment]` starting at `start`.
fn split_rest(s: &str, start: usize) -> Result<(String, Option<String>, Option<String>), UriError> {
    let bytes = s.as_bytes();
    let mut i = start;

    while i < bytes.len() && bytes[i] != b'?' && bytes[i] != b'#' {
        i += check_byte(s, Path, start, i)?;
    }
    let raw_path = s[start..i].to_string();

    let mut raw_query = None;
    if i < bytes.len() && bytes[i] == b'?' {
        let qstart = i + 1;
        i = qstart;
        while i < bytes.len() && bytes[i] != b'#' {
            i += check_byte(s, Query, qstart, i)?;
        }
        raw_query = Some(s[qstart..i].to_string());
    }

    let mut raw_fragment = None;
    if i < bytes.len() && bytes[i] == b'#' {
        let fstart = i + 1;
        i = fstart;
        while i < bytes.len() {
            i += check_byte(s, Fragment, fstart, i)?;
        }
        raw_fragment = Some(s[fstart..].to_string());
    }

    Ok((raw_path, raw_query, raw_fragment))
}

/// Validates the byte at `i` for `component` (whose text begins at
/// `comp_start`) and returns how many bytes it spans.
fn check_byte(s: &str, component: Component, comp_start: usize, i: usize) -> Result<usize, UriError> {
    let bytes = s.as_bytes();
    let b = bytes[i];
    if b == b'%' {
        if pct_encoded(bytes, i) {
            Ok(3)
        } else {
            Err(UriError::new(component, i - comp_start, s, i))
        }
    } else if legal_in(component, b) {
        Ok(1)
    } else {
        Err(UriError::new(component, i - comp_start, s, i))
    }
}

/// Percent-encodes every byte illegal in its component, walking the target
/// left to right. Scheme and authority are copied, not repaired; an illegal
/// authority byte fails here exactly as it would in strict parsing.
fn repair_target(input: &str) -> Result<String, UriError> {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut component;
    let mut i;

    match split_scheme(input) {
        Some((_, rest)) => {
            out.push_str(&input[..rest]);
            i = rest;
            component = Authority;
        }
        None if input.starts_with('/') => {
            i = 0;
            component = Path;
        }
        None => {
            i = 0;
            component = Authority;
        }
    }
    let auth_start = i;

    while i < bytes.len() {
        let b = bytes[i];
        match component {
            Authority => match b {
                b'/' => {
                    component = Path;
                    out.push('/');
                }
                b'?' => {
                    component = Query;
                    out.push('?');
                }
                b'#' => {
                    component = Fragment;
                    out.push('#');
                }
                b'%' if pct_encoded(bytes, i) => {
                    out.push_str(&input[i..i + 3]);
                    i += 3;
                    continue;
                }
                b if legal_in(Authority, b) => out.push(b as char),
                _ => return Err(UriError::new(Authority, i - auth_start, input, i)),
            },
            Path => match b {
                b'?' => {
                    component = Query;
                    out.push('?');
                }
                b'#' => {
                    component = Fragment;
                    out.push('#');
                }
                _ => encode_byte(&mut out, input, bytes, &mut i, Path),
            },
            Query | Fragment => {
                // whichever of `?`/`#` came first owns the rest; a later
                // `#` is not a separator and gets encoded
                encode_byte(&mut out, input, bytes, &mut i, component)
            }
        }
        i += 1;
    }

    Ok(out)
}

fn encode_byte(out: &mut String, input: &str, bytes: &[u8], i: &mut usize, component: Component) {
    let b = bytes[*i];
    if b == b'%' {
        if pct_encoded(bytes, *i) {
            out.push_str(&input[*i..*i + 3]);
            *i += 2;
        } else {
            out.push_str("%25");
        }
    } else if legal_in(component, b) {
        out.push(b as char);
    } else {
        out.push_str(&format!("%{:02X}", b));
    }
}

fn pct_encoded(bytes: &[u8], i: usize) -> bool {
    i + 2 < bytes.len() && bytes[i + 1].is_ascii_hexdigit() && bytes[i + 2].is_ascii_hexdigit()
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && pct_encoded(bytes, i) {
            out.push(hex_value(bytes[i + 1]) << 4 | hex_value(bytes[i + 2]));
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// The value of an ASCII hex digit; callers check `is_ascii_hexdigit`.
fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b + 10 - b'a',
        _ => b + 10 - b'A',
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'.' || b == b'_' || b == b'~'
}

fn is_sub_delim(b: u8) -> bool {
    match b {
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => true,
        _ => false,
    }
}

fn is_pchar(b: u8) -> bool {
    is_unreserved(b) || is_sub_delim(b) || b == b':' || b == b'@'
}

fn legal_in(component: Component, b: u8) -> bool {
    match component {
        Authority => is_unreserved(b) || is_sub_delim(b) || b == b':' || b == b'@' || b == b'[' || b == b']',
        Path => is_pchar(b) || b == b'/',
        Query | Fragment => is_pchar(b) || b == b'/' || b == b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::parse;

    #[test]
    fn origin_form() {
        let uri = parse("/where?q=now", false).unwrap();
        assert_eq!(uri.scheme(), "http");
        assert_eq!(uri.host(), None);
        assert_eq!(uri.raw_path(), "/where");
        assert_eq!(uri.raw_query(), Some("q=now"));
        assert_eq!(uri.raw_fragment(), None);
        assert_eq!(uri.to_string(), "/where?q=now");
    }

    #[test]
    fn absolute_form() {
        let uri = parse("https://user:pw@example.com:8443/a/b?x=1#top", false).unwrap();
        assert_eq!(uri.scheme(), "https");
        assert_eq!(uri.user_info(), Some("user:pw"));
        assert_eq!(uri.host(), Some("example.com"));
        assert_eq!(uri.port(), Some(8443));
        assert_eq!(uri.raw_path(), "/a/b");
        assert_eq!(uri.raw_query(), Some("x=1"));
        assert_eq!(uri.raw_fragment(), Some("top"));
        assert_eq!(
            uri.to_string(),
            "https://user:pw@example.com:8443/a/b?x=1#top"
        );
    }

    #[test]
    fn schemeless_authority_infers_http() {
        let uri = parse("example.com:8080/path", false).unwrap();
        assert_eq!(uri.scheme(), "http");
        assert_eq!(uri.host(), Some("example.com"));
        assert_eq!(uri.port(), Some(8080));
        assert_eq!(uri.raw_path(), "/path");
    }

    #[test]
    fn bracketed_ipv6_host_keeps_its_brackets() {
        let uri = parse("[::8a2e:370:7334]:43", false).unwrap();
        assert_eq!(uri.scheme(), "http");
        assert_eq!(uri.host(), Some("[::8a2e:370:7334]"));
        assert_eq!(uri.port(), Some(43));
        assert_eq!(uri.raw_path(), "");
    }

    #[test]
    fn asterisk_target_is_a_path_reference() {
        let uri = parse("*", false).unwrap();
        assert_eq!(uri.host(), None);
        assert_eq!(uri.raw_path(), "*");
    }

    #[test]
    fn unspecified_port() {
        let uri = parse("http://example.com/", false).unwrap();
        assert_eq!(uri.port(), None);
        let uri = parse("http://example.com:/", false).unwrap();
        assert_eq!(uri.port(), None);
    }

    #[test]
    fn illegal_space_in_authority() {
        let err = parse(" /", false).unwrap_err();
        assert_eq!(
            err.message(),
            "Illegal character in authority at index 0: ' /'"
        );
        // repair never touches the authority
        let err = parse(" /", true).unwrap_err();
        assert_eq!(
            err.message(),
            "Illegal character in authority at index 0: ' /'"
        );
    }

    #[test]
    fn illegal_byte_in_path_reports_component_offset() {
        let err = parse("/hi there", false).unwrap_err();
        assert_eq!(err.message(), "Illegal character in path at index 3: ' there'");
    }

    #[test]
    fn illegal_byte_in_query() {
        let err = parse("/p?a\"b", false).unwrap_err();
        assert_eq!(err.message(), "Illegal character in query at index 1: '\"b'");
    }

    #[test]
    fn repair_encodes_spaces_in_the_path() {
        let uri = parse("/hi there", true).unwrap();
        assert_eq!(uri.raw_path(), "/hi%20there");
        assert_eq!(uri.path(), "/hi there");
    }

    #[test]
    fn repair_is_component_aware() {
        let uri = parse("/id/{0x0}?encoded=%2F%2Fpath", true).unwrap();
        assert_eq!(uri.raw_path(), "/id/%7B0x0%7D");
        assert_eq!(uri.raw_query(), Some("encoded=%2F%2Fpath"));
    }

    #[test]
    fn repair_keeps_existing_escapes_and_fixes_stray_percent() {
        let uri = parse("/a%2Fb%zz", true).unwrap();
        assert_eq!(uri.raw_path(), "/a%2Fb%25zz");
    }

    #[test]
    fn repair_encodes_hash_after_query_started() {
        let uri = parse("/p?a#b", true).unwrap();
        assert_eq!(uri.raw_query(), Some("a%23b"));
        assert_eq!(uri.raw_fragment(), None);
    }

    #[test]
    fn question_mark_inside_fragment_is_legal() {
        let uri = parse("/p#frag?not-a-query", false).unwrap();
        assert_eq!(uri.raw_path(), "/p");
        assert_eq!(uri.raw_fragment(), Some("frag?not-a-query"));
        assert_eq!(uri.raw_query(), None);
    }

    #[test]
    fn strict_split_of_query_and_fragment() {
        let uri = parse("/p?q=1#frag", false).unwrap();
        assert_eq!(uri.raw_query(), Some("q=1"));
        assert_eq!(uri.raw_fragment(), Some("frag"));
    }

    #[test]
    fn decoded_getters() {
        let uri = parse("/a%20b?q=%7B%7D#f%21", false).unwrap();
        assert_eq!(uri.path(), "/a b");
        assert_eq!(uri.query(), Some("q={}".to_string()));
        assert_eq!(uri.fragment(), Some("f!".to_string()));
    }

    #[test]
    fn bad_port_in_absolute_form() {
        let err = parse("http://example.com:8a/", false).unwrap_err();
        assert_eq!(
            err.message(),
            "Illegal character in authority at index 13: 'a/'"
        );
    }

    #[test]
    fn unterminated_ipv6_bracket() {
        let err = parse("http://[::1/", false).unwrap_err();
        assert!(err.message().starts_with("Illegal character in authority"));
    }
}
