//! A thin stateful reader over an input byte stream.

use std::fmt;
use std::io::{self, Read};

use crate::error::{Error, Result};

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Reads a byte source one byte at a time, tracking the current 1-based
/// line number.
///
/// A line terminator is `\r\n`; a bare `\n` is accepted only when the
/// scanner was built with `allow_new_line_without_return`, and a bare `\r`
/// is never a terminator. The scanner issues one read at a time and never
/// retains bytes past their line, so the only blocking point is the
/// underlying source.
pub struct ByteScanner<R> {
    src: R,
    peeked: Option<u8>,
    line: u32,
    consumed: u64,
    allow_bare_lf: bool,
}

impl<R> fmt::Debug for ByteScanner<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ByteScanner")
            .field("line", &self.line)
            .field("consumed", &self.consumed)
            .field("allow_bare_lf", &self.allow_bare_lf)
            .finish()
    }
}

impl<R: Read> ByteScanner<R> {
    /// Wraps a byte source.
    pub fn new(src: R, allow_new_line_without_return: bool) -> ByteScanner<R> {
        ByteScanner {
            src,
            peeked: None,
            line: 1,
            consumed: 0,
            allow_bare_lf: allow_new_line_without_return,
        }
    }

    /// The 1-based number of the line the next byte belongs to.
    pub fn line_number(&self) -> u32 {
        self.line
    }

    /// Total bytes consumed from the source so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    /// Reads a single byte, `None` at end of input.
    ///
    /// Consuming a `\n` advances the line counter; `\n` is never content in
    /// a well-formed message, so this keeps the counter right for both
    /// whole-line and byte-at-a-time callers.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let b = match self.peeked.take() {
            Some(b) => Some(b),
            None => self.fill()?,
        };
        if let Some(b) = b {
            self.consumed += 1;
            if b == LF {
                self.line += 1;
            }
        }
        Ok(b)
    }

    /// Returns the next byte without consuming it, `None` at end of input.
    pub fn peek(&mut self) -> Result<Option<u8>> {
        if self.peeked.is_none() {
            self.peeked = self.fill()?;
        }
        Ok(self.peeked)
    }

    /// Reads the bytes up to (but not including) the next line terminator
    /// and consumes the terminator.
    ///
    /// Returns `None` when the source is already at end of input. A line
    /// that ends at end of input without a terminator is returned as-is.
    /// A line longer than `max_len` fails with `Line is too long`; a bare
    /// `\n` in strict mode fails with
    /// `Illegal new-line character without preceding return`. Both carry
    /// the current line number.
    pub fn read_line(&mut self, max_len: usize) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let mut b = match self.read_byte()? {
            None => return Ok(None),
            Some(b) => b,
        };
        loop {
            match b {
                CR => {
                    if self.peek()? == Some(LF) {
                        self.read_byte()?;
                        return Ok(Some(line));
                    }
                    // a bare \r is ordinary content
                    line.push(CR);
                }
                LF => {
                    if !self.allow_bare_lf {
                        return Err(Error::request(
                            "Illegal new-line character without preceding return",
                            self.line - 1,
                        ));
                    }
                    return Ok(Some(line));
                }
                b => line.push(b),
            }
            if line.len() > max_len {
                return Err(Error::request("Line is too long", self.line));
            }
            b = match self.read_byte()? {
                None => return Ok(Some(line)),
                Some(b) => b,
            };
        }
    }

    fn fill(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.src.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ByteScanner;
    use crate::error::Error;

    fn scan(s: &str, allow_bare_lf: bool) -> ByteScanner<&[u8]> {
        ByteScanner::new(s.as_bytes(), allow_bare_lf)
    }

    fn line(scanner: &mut ByteScanner<&[u8]>) -> Option<String> {
        scanner
            .read_line(usize::max_value())
            .unwrap()
            .map(|bytes| bytes.iter().map(|&b| b as char).collect())
    }

    #[test]
    fn crlf_terminates_a_line() {
        let mut scanner = scan("hello\r\nworld\r\n", true);
        assert_eq!(line(&mut scanner), Some("hello".to_string()));
        assert_eq!(line(&mut scanner), Some("world".to_string()));
        assert_eq!(line(&mut scanner), None);
    }

    #[test]
    fn bare_lf_accepted_when_configured() {
        let mut scanner = scan("hello\nworld\n", true);
        assert_eq!(line(&mut scanner), Some("hello".to_string()));
        assert_eq!(line(&mut scanner), Some("world".to_string()));
    }

    #[test]
    fn bare_lf_rejected_when_strict() {
        let mut scanner = scan("hello\nworld\n", false);
        match scanner.read_line(usize::max_value()) {
            Err(Error::Request(e)) => {
                assert_eq!(
                    e.message(),
                    "Illegal new-line character without preceding return"
                );
                assert_eq!(e.line_number(), 1);
            }
            other => panic!("expected error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn bare_cr_is_content() {
        let mut scanner = scan("a\rb\r\n", true);
        assert_eq!(line(&mut scanner), Some("a\rb".to_string()));
    }

    #[test]
    fn eof_without_terminator_yields_the_partial_line() {
        let mut scanner = scan("partial", true);
        assert_eq!(line(&mut scanner), Some("partial".to_string()));
        assert_eq!(line(&mut scanner), None);
    }

    #[test]
    fn line_numbers_advance_on_terminators() {
        let mut scanner = scan("a\r\nb\nc", true);
        assert_eq!(scanner.line_number(), 1);
        line(&mut scanner);
        assert_eq!(scanner.line_number(), 2);
        line(&mut scanner);
        assert_eq!(scanner.line_number(), 3);
        line(&mut scanner);
        assert_eq!(scanner.line_number(), 3);
    }

    #[test]
    fn line_length_cap() {
        let mut scanner = scan("abcdef\r\n", true);
        match scanner.read_line(3) {
            Err(Error::Request(e)) => assert_eq!(e.message(), "Line is too long"),
            other => panic!("expected error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn peek_does_not_consume() {
        let mut scanner = scan("xy", true);
        assert_eq!(scanner.peek().unwrap(), Some(b'x'));
        assert_eq!(scanner.peek().unwrap(), Some(b'x'));
        assert_eq!(scanner.read_byte().unwrap(), Some(b'x'));
        assert_eq!(scanner.read_byte().unwrap(), Some(b'y'));
        assert_eq!(scanner.read_byte().unwrap(), None);
        assert_eq!(scanner.bytes_consumed(), 2);
    }

    #[test]
    fn empty_input_is_the_no_content_sentinel() {
        let mut scanner = scan("", true);
        assert_eq!(line(&mut scanner), None);
        assert_eq!(scanner.bytes_consumed(), 0);
    }
}
