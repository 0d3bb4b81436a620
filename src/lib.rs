#![doc(html_root_url = "https://docs.rs/rawhttp/0.1.0")]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(test, deny(warnings))]

//! # rawhttp
//!
//! rawhttp is a **byte-faithful** HTTP/1.x metadata parser and message
//! model. Its value is fidelity to RFC 7230 with configurable leniency,
//! not high-level client or server abstractions: what went over the wire is
//! what you get back, including header casing, ordering and repeats.
//!
//! The entry point is [`HttpMetadataParser`](HttpMetadataParser),
//! configured once through [`ParserOptions`](ParserOptions):
//!
//! ```
//! use rawhttp::HttpMetadataParser;
//!
//! let parser = HttpMetadataParser::default();
//! let line = parser.parse_request_line("GET /hello HTTP/1.1").unwrap();
//! assert_eq!(line.method(), "GET");
//! assert_eq!(line.uri().path(), "/hello");
//! ```
//!
//! Sockets, TLS and body decoding live elsewhere; this crate hands body
//! readers a [`LazyBodyReader`](LazyBodyReader) and a
//! [`BodyDecoder`](BodyDecoder) describing the encoding chain, and stops
//! there.

extern crate bytes;
extern crate itoa;
#[macro_use]
extern crate log;

pub use crate::body::{BodyDecoder, HttpMessageBody, LazyBodyReader};
pub use crate::error::{Error, InvalidHttpHeader, InvalidHttpRequest, Result};
pub use crate::header::{HeadersBuilder, RawHeaders};
pub use crate::message::{Request, Response};
pub use crate::options::ParserOptions;
pub use crate::parser::HttpMetadataParser;
pub use crate::scanner::ByteScanner;
pub use crate::startline::{RequestLine, StatusLine};
pub use crate::uri::Uri;
pub use crate::version::HttpVersion;

pub mod body;
pub mod error;
pub mod header;
pub mod message;
pub mod options;
pub mod parser;
pub mod scanner;
pub mod startline;
pub mod uri;
pub mod version;
