//! Error types for the line codec.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised while framing lines on a connection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line (or a partial line still being buffered) exceeded the limit.
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong {
        /// Bytes seen so far.
        actual: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The peer sent bytes that are not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte within the line.
        byte_pos: usize,
        /// Decoder message.
        details: String,
    },

    /// An outgoing line contained a line break, which would split it in two.
    #[error("outgoing line contains an embedded line break")]
    EmbeddedNewline,
}

impl ProtocolError {
    /// Static label for metrics and structured logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::LineTooLong { .. } => "line_too_long",
            Self::InvalidUtf8 { .. } => "invalid_utf8",
            Self::EmbeddedNewline => "embedded_newline",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ProtocolError::LineTooLong {
            actual: 10,
            limit: 5,
        };
        assert_eq!(err.error_code(), "line_too_long");
        assert_eq!(err.to_string(), "line too long: 10 bytes (limit 5)");
        assert_eq!(ProtocolError::EmbeddedNewline.error_code(), "embedded_newline");
    }
}
