//! Line-based codec for tokio.
//!
//! Reads and writes newline-terminated UTF-8 lines. Decoded lines have their
//! terminator (`\n` or `\r\n`) removed along with any stray `\r`; encoded
//! lines get a single `\n`.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};
use crate::message::check_line;

/// Default maximum line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// Line-based codec that handles newline-terminated messages.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// Maximum accepted line length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn decode_line(line: BytesMut) -> Result<String> {
        let mut end = line.len();
        if end > 0 && line[end - 1] == b'\n' {
            end -= 1;
        }
        if end > 0 && line[end - 1] == b'\r' {
            end -= 1;
        }

        let text = std::str::from_utf8(&line[..end]).map_err(|e| ProtocolError::InvalidUtf8 {
            byte_pos: e.valid_up_to(),
            details: e.to_string(),
        })?;

        // A lone CR would split the line again when relayed
        Ok(text.replace('\r', ""))
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        // Look for newline starting from where we left off
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            Self::decode_line(line).map(Some)
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }

        // Peer closed without a trailing newline: deliver what is left.
        let rest = src.split_to(src.len());
        self.next_index = 0;
        Self::decode_line(rest).map(Some)
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        check_line(&line, self.max_len)?;

        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("#login alice\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("#login alice".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_bare_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("hello\nworld\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("hello".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("world".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("#log");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"in bob\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("#login bob".to_string()));
    }

    #[test]
    fn test_decode_too_long() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\n");

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(ProtocolError::LineTooLong { .. })));
    }

    #[test]
    fn test_decode_partial_too_long() {
        let mut codec = LineCodec::with_max_len(4);
        let mut buf = BytesMut::from("abcdefgh");

        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::LineTooLong { actual: 8, limit: 4 })
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"ok\xff\xfe\n"[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::InvalidUtf8 { byte_pos: 2, .. })
        ));
    }

    #[test]
    fn test_decode_eof_without_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("last words");

        assert_eq!(
            codec.decode_eof(&mut buf).unwrap(),
            Some("last words".to_string())
        );
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_strips_stray_carriage_returns() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("a\rb\r\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("ab".to_string()));
    }

    #[test]
    fn test_encode_rejects_line_at_limit() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::new();

        codec.encode("1234567".to_string(), &mut buf).unwrap();
        assert!(matches!(
            codec.encode("12345678".to_string(), &mut buf),
            Err(ProtocolError::LineTooLong { actual: 9, limit: 8 })
        ));
    }

    #[test]
    fn test_encode() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("alice> hi".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"alice> hi\n");
    }

    #[test]
    fn test_encode_rejects_embedded_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        let result = codec.encode("one\r\ntwo".to_string(), &mut buf);
        assert!(matches!(result, Err(ProtocolError::EmbeddedNewline)));
        assert!(buf.is_empty());
    }
}
