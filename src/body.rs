//! Message bodies.
//!
//! A body is a value, not a stream: it knows its content type, its length
//! when one is knowable, and the chain of encodings that produced its wire
//! form. The bytes themselves only start flowing once the body is turned
//! into a [`LazyBodyReader`](LazyBodyReader), and no I/O happens before the
//! first read of that reader.

use std::fmt;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;

use bytes::Bytes;

use crate::header::RawHeaders;

/// A message body.
///
/// `headers_from` derives the body-describing headers a message carrying
/// this body must have; everything else about the body is opaque to the
/// metadata parser.
pub enum HttpMessageBody {
    /// A body held eagerly in memory.
    Bytes {
        /// The media type to advertise, if any.
        content_type: Option<String>,
        /// The body bytes.
        content: Bytes,
    },
    /// A body backed by a file on disk, read lazily.
    File {
        /// The media type to advertise, if any.
        content_type: Option<String>,
        /// The file to read the body from.
        path: PathBuf,
    },
    /// A stream already framed with the chunked transfer coding.
    Chunked {
        /// The media type to advertise, if any.
        content_type: Option<String>,
        /// The chunked-encoded wire bytes.
        source: Box<dyn Read + Send>,
    },
    /// A stream whose wire form was produced by a chain of encodings.
    Encoded {
        /// The media type to advertise, if any.
        content_type: Option<String>,
        /// The encoded wire bytes.
        source: Box<dyn Read + Send>,
        /// The encodings applied, outermost last.
        decoder: BodyDecoder,
    },
}

impl HttpMessageBody {
    /// A body from in-memory bytes.
    pub fn from_bytes(content_type: Option<String>, content: impl Into<Bytes>) -> HttpMessageBody {
        HttpMessageBody::Bytes {
            content_type,
            content: content.into(),
        }
    }

    /// A body read from a file; length comes from file metadata.
    pub fn from_file(content_type: Option<String>, path: impl Into<PathBuf>) -> HttpMessageBody {
        HttpMessageBody::File {
            content_type,
            path: path.into(),
        }
    }

    /// A body whose source is already chunked-encoded.
    pub fn chunked(
        content_type: Option<String>,
        source: Box<dyn Read + Send>,
    ) -> HttpMessageBody {
        HttpMessageBody::Chunked {
            content_type,
            source,
        }
    }

    /// A body whose source was produced by `decoder`'s encoding chain.
    pub fn encoded(
        content_type: Option<String>,
        source: Box<dyn Read + Send>,
        decoder: BodyDecoder,
    ) -> HttpMessageBody {
        HttpMessageBody::Encoded {
            content_type,
            source,
            decoder,
        }
    }

    /// The media type to advertise, if any.
    pub fn content_type(&self) -> Option<&str> {
        match *self {
            HttpMessageBody::Bytes {
                ref content_type, ..
            }
            | HttpMessageBody::File {
                ref content_type, ..
            }
            | HttpMessageBody::Chunked {
                ref content_type, ..
            }
            | HttpMessageBody::Encoded {
                ref content_type, ..
            } => content_type.as_ref().map(|s| s.as_str()),
        }
    }

    /// The body length in bytes, when knowable without reading the body.
    ///
    /// Encoded and chunked bodies have no known length; their framing
    /// carries it on the wire instead.
    pub fn content_length(&self) -> Option<u64> {
        match *self {
            HttpMessageBody::Bytes { ref content, .. } => Some(content.len() as u64),
            HttpMessageBody::File { ref path, .. } => fs::metadata(path).ok().map(|m| m.len()),
            HttpMessageBody::Chunked { .. } | HttpMessageBody::Encoded { .. } => None,
        }
    }

    /// The encoding chain applied to this body, if any.
    pub fn decoder(&self) -> Option<BodyDecoder> {
        match *self {
            HttpMessageBody::Chunked { .. } => Some(BodyDecoder::new(vec!["chunked".to_string()])),
            HttpMessageBody::Encoded { ref decoder, .. } => Some(decoder.clone()),
            _ => None,
        }
    }

    /// Turns the body into its one-shot reader. No I/O happens until the
    /// first read.
    pub fn into_reader(self) -> LazyBodyReader {
        let inner = match self {
            HttpMessageBody::Bytes { content, .. } => ReaderKind::Bytes(Cursor::new(content)),
            HttpMessageBody::File { path, .. } => ReaderKind::File {
                path,
                open: None,
            },
            HttpMessageBody::Chunked { source, .. } => ReaderKind::Stream(source),
            HttpMessageBody::Encoded { source, .. } => ReaderKind::Stream(source),
        };
        LazyBodyReader { inner }
    }

    /// Derives the headers a message carrying this body must have.
    ///
    /// Starting from `input`, overwrites `Content-Type` when the body has a
    /// content type, `Content-Length` when its length is known, and
    /// `Transfer-Encoding` with the comma-joined encoding chain when one is
    /// present. Nothing is removed; a body with an encoding chain simply
    /// never reports a length, so it never sets a conflicting one.
    pub fn headers_from(&self, input: &RawHeaders) -> RawHeaders {
        let mut builder = input.to_builder();
        if let Some(content_type) = self.content_type() {
            builder = builder.overwrite("Content-Type", content_type);
        }
        if let Some(length) = self.content_length() {
            let mut buf = itoa::Buffer::new();
            builder = builder.overwrite("Content-Length", buf.format(length));
        }
        if let Some(decoder) = self.decoder() {
            if !decoder.encodings().is_empty() {
                builder = builder.overwrite("Transfer-Encoding", decoder.encodings().join(","));
            }
        }
        builder.build()
    }
}

impl fmt::Debug for HttpMessageBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HttpMessageBody::Bytes { ref content, .. } => f
                .debug_struct("HttpMessageBody::Bytes")
                .field("len", &content.len())
                .finish(),
            HttpMessageBody::File { ref path, .. } => f
                .debug_struct("HttpMessageBody::File")
                .field("path", path)
                .finish(),
            HttpMessageBody::Chunked { .. } => f.write_str("HttpMessageBody::Chunked { .. }"),
            HttpMessageBody::Encoded { ref decoder, .. } => f
                .debug_struct("HttpMessageBody::Encoded")
                .field("decoder", decoder)
                .finish(),
        }
    }
}

/// An ordered chain of transfer/content encoding identifiers, outermost
/// last, e.g. `["chunked", "gzip"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyDecoder {
    encodings: Vec<String>,
}

impl BodyDecoder {
    /// A decoder for the given encoding chain.
    pub fn new(encodings: Vec<String>) -> BodyDecoder {
        BodyDecoder { encodings }
    }

    /// The encoding identifiers, in application order.
    pub fn encodings(&self) -> &[String] {
        &self.encodings
    }
}

/// A one-shot forward stream over the body bytes.
///
/// Reading consumes the source; a reader is owned by exactly one consumer
/// and cannot be rewound. For file-backed bodies the file is only opened at
/// the first read.
pub struct LazyBodyReader {
    inner: ReaderKind,
}

enum ReaderKind {
    Bytes(Cursor<Bytes>),
    File {
        path: PathBuf,
        open: Option<fs::File>,
    },
    Stream(Box<dyn Read + Send>),
}

impl Read for LazyBodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner {
            ReaderKind::Bytes(ref mut cursor) => cursor.read(buf),
            ReaderKind::File {
                ref path,
                ref mut open,
            } => loop {
                match *open {
                    Some(ref mut file) => return file.read(buf),
                    None => *open = Some(fs::File::open(path)?),
                }
            },
            ReaderKind::Stream(ref mut source) => source.read(buf),
        }
    }
}

impl fmt::Debug for LazyBodyReader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            ReaderKind::Bytes(_) => f.write_str("LazyBodyReader::Bytes"),
            ReaderKind::File { ref path, .. } => {
                f.debug_tuple("LazyBodyReader::File").field(path).finish()
            }
            ReaderKind::Stream(_) => f.write_str("LazyBodyReader::Stream"),
        }
    }
}
