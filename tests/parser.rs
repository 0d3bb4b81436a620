//! End-to-end tests over the public parsing surface.

extern crate pretty_env_logger;
#[macro_use]
extern crate matches;

use std::io::Read;

use rawhttp::{
    BodyDecoder, Error, HttpMessageBody, HttpMetadataParser, HttpVersion, ParserOptions,
    RawHeaders,
};

fn parser() -> HttpMetadataParser {
    let _ = pretty_env_logger::try_init();
    HttpMetadataParser::default()
}

fn strict_parser() -> HttpMetadataParser {
    let _ = pretty_env_logger::try_init();
    HttpMetadataParser::new(
        ParserOptions::builder()
            .allow_new_line_without_return(false)
            .ignore_leading_empty_line(false)
            .insert_http_version_if_missing(false)
            .build(),
    )
}

fn lenient_parser() -> HttpMetadataParser {
    let _ = pretty_env_logger::try_init();
    HttpMetadataParser::new(
        ParserOptions::builder()
            .allow_illegal_start_line_characters(true)
            .build(),
    )
}

fn request_error(parser: &HttpMetadataParser, line: &str) -> (String, u32) {
    match parser.parse_request_line(line) {
        Err(Error::Request(e)) => (e.message().to_string(), e.line_number()),
        Ok(parsed) => panic!("expected an error for {:?}, got {}", line, parsed),
        Err(other) => panic!("expected a request error, got {:?}", other),
    }
}

#[test]
fn get_with_defaulted_version() {
    let line = parser().parse_request_line("GET /").unwrap();
    assert_eq!(line.method(), "GET");
    assert_eq!(line.uri().path(), "/");
    assert_eq!(line.http_version(), HttpVersion::Http11);
    assert_eq!(line.to_string(), "GET / HTTP/1.1");
}

#[test]
fn lower_case_method_and_explicit_version() {
    let line = parser().parse_request_line("do /hello HTTP/1.0").unwrap();
    assert_eq!(line.method(), "do");
    assert_eq!(line.http_version(), HttpVersion::Http10);
    assert_eq!(line.uri().path(), "/hello");
}

#[test]
fn strict_parser_rejects_a_missing_version() {
    let (message, line) = request_error(&strict_parser(), "GET /");
    assert_eq!(message, "Missing HTTP version");
    assert_eq!(line, 1);
}

#[test]
fn double_space_is_an_illegal_authority() {
    let (message, _) = request_error(&strict_parser(), "POST  / HTTP/1.1");
    assert_eq!(
        message,
        "Invalid request target: Illegal character in authority at index 0: ' /'"
    );
}

#[test]
fn lenient_parser_encodes_spaces_in_the_target() {
    let line = lenient_parser()
        .parse_request_line("GET /hi there HTTP/1.1")
        .unwrap();
    assert_eq!(line.uri().raw_path(), "/hi%20there");
    assert_eq!(line.to_string(), "GET /hi%20there HTTP/1.1");
}

#[test]
fn repeated_headers_stay_separate_and_ordered() {
    let headers = parser()
        .parse_headers(&b"X-Color: red\nX-Color: blue\n"[..])
        .unwrap();
    assert_eq!(headers.get("X-Color"), vec!["red", "blue"]);

    let map = headers.as_map();
    let keys: Vec<&String> = map.keys().collect();
    assert_eq!(keys, vec!["X-COLOR"]);
    assert_eq!(map["X-COLOR"], vec!["red", "blue"]);
}

#[test]
fn header_name_cap_reports_the_line() {
    let parser = HttpMetadataParser::new(
        ParserOptions::builder().max_header_name_length(6).build(),
    );
    match parser.parse_headers(&b"Content: OK"[..]) {
        Err(Error::Header(e)) => assert_eq!(e.message(), "Header name is too long(1)"),
        other => panic!("expected a header error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn query_strings_accumulate_duplicates_in_order() {
    let map = parser().parse_query_string("a=1&a=2&b=3&a=4");
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], vec!["1", "2", "4"]);
    assert_eq!(map["b"], vec!["3"]);
}

#[test]
fn bracketed_ipv6_authority_form() {
    let uri = parser().parse_uri("[::8a2e:370:7334]:43").unwrap();
    assert_eq!(uri.host(), Some("[::8a2e:370:7334]"));
    assert_eq!(uri.port(), Some(43));
    assert_eq!(uri.scheme(), "http");
}

#[test]
fn parse_uri_repairs_the_path_but_not_the_query() {
    let uri = parser()
        .parse_uri("/id/{0x0}?encoded=%2F%2Fhello%2Fworld")
        .unwrap();
    assert_eq!(uri.raw_path(), "/id/%7B0x0%7D");
    assert_eq!(uri.raw_query(), Some("encoded=%2F%2Fhello%2Fworld"));
    assert_eq!(uri.path(), "/id/{0x0}");
}

#[test]
fn reparsing_a_serialized_request_line_is_idempotent() {
    let parser = parser();
    for input in &[
        "GET /",
        "do /hello HTTP/1.0",
        "OPTIONS * HTTP/1.1",
        "HEAD /a/b?q=1 HTTP/1.1",
        "GET http://example.com:8080/x?y=z HTTP/1.1",
    ] {
        let once = parser.parse_request_line(input).unwrap();
        let twice = parser.parse_request_line(&once.to_string()).unwrap();
        assert_eq!(once, twice, "round-trip of {:?}", input);
        assert_eq!(once.to_string(), twice.to_string());
    }
}

#[test]
fn error_line_numbers_are_zero_only_for_empty_input() {
    let parser = parser();
    let (message, line) = request_error(&parser, "");
    assert_eq!(message, "No content");
    assert_eq!(line, 0);

    let (_, line) = request_error(&parser, "GET");
    assert!(line >= 1);
}

#[test]
fn full_request_metadata_round_trip() {
    let input = b"POST /submit?kind=form HTTP/1.1\r\n\
Host: example.com\r\n\
X-Trace: a\r\n\
x-trace: b\r\n\
\r\n";
    let request = parser().parse_request(&input[..]).unwrap();
    assert_eq!(request.method(), "POST");
    assert_eq!(request.uri().raw_query(), Some("kind=form"));
    assert_eq!(request.headers().get("X-TRACE"), vec!["a", "b"]);

    // serialization reproduces header order and casing byte for byte
    assert_eq!(request.to_string().as_bytes(), &input[..]);
}

#[test]
fn response_metadata_and_attached_body() {
    let response = parser()
        .parse_response(&b"HTTP/1.1 200 OK\r\nServer: raw\r\n\r\n"[..])
        .unwrap();
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.status_line().reason_phrase(), "OK");

    let response = response.with_body(HttpMessageBody::from_bytes(
        Some("text/plain".to_string()),
        &b"hello"[..],
    ));
    assert_eq!(response.headers().get("Content-Type"), vec!["text/plain"]);
    assert_eq!(response.headers().get("Content-Length"), vec!["5"]);
    assert_eq!(response.headers().get("Server"), vec!["raw"]);

    let mut body = String::new();
    response
        .into_body()
        .unwrap()
        .into_reader()
        .read_to_string(&mut body)
        .unwrap();
    assert_eq!(body, "hello");
}

#[test]
fn encoded_body_headers() {
    let body = HttpMessageBody::encoded(
        None,
        Box::new(&b""[..]),
        BodyDecoder::new(vec!["chunked".to_string(), "gzip".to_string()]),
    );
    let headers = body.headers_from(&RawHeaders::empty());
    assert_eq!(headers.get("Transfer-Encoding"), vec!["chunked,gzip"]);
    assert!(headers.get("Content-Length").is_empty());
}

#[test]
fn custom_validator_errors_propagate() {
    let parser = HttpMetadataParser::new(
        ParserOptions::builder()
            .header_validator(|headers| {
                if headers.get("Content-Length").len() > 1 {
                    return Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "duplicate Content-Length",
                    )));
                }
                Ok(())
            })
            .build(),
    );

    let result = parser.parse_headers(&b"Content-Length: 1\r\nContent-Length: 2\r\n\r\n"[..]);
    assert_matches!(result, Err(Error::Io(_)));
}

#[test]
fn leading_empty_line_is_tolerated_by_default() {
    let request = parser()
        .parse_request(&b"\r\nGET / HTTP/1.1\r\nHost: x\r\n\r\n"[..])
        .unwrap();
    assert_eq!(request.method(), "GET");

    let result = strict_parser().parse_request(&b"\r\nGET / HTTP/1.1\r\n\r\n"[..]);
    assert_matches!(result, Err(Error::Request(_)));
}
