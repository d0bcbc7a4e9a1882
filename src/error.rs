//! Error types for decoding and encoding

/// Errors that can occur while decoding a message
///
/// Any error aborts the whole message: no partial [`Table`](crate::table::Table)
/// is ever returned alongside one.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The declared element count needs more tokens than the buffer holds
    #[error("Truncated stream: declared {declared} tokens, only {available} available")]
    TruncatedStream {
        /// Number of tokens the message header promised
        declared: usize,
        /// Number of whole tokens actually present after the header
        available: usize,
    },

    /// Level markers, name lengths and character codes are inconsistent
    #[error("Malformed stream at token {position}: {reason}")]
    MalformedStream {
        /// Zero-based token position (after the count header) where parsing failed
        position: usize,
        /// Human-readable description of the inconsistency
        reason: String,
    },

    /// Low-level read failure while pulling floats out of the buffer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        DecodeError::MalformedStream {
            position,
            reason: reason.into(),
        }
    }

    /// Whether the error came from a short buffer rather than bad content
    pub fn is_truncation(&self) -> bool {
        matches!(self, DecodeError::TruncatedStream { .. })
    }
}

/// Errors that can occur while building a message
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A struct without children has no representation on the wire
    #[error("Struct '{0}' has no fields")]
    EmptyStruct(String),

    /// A data value the decoder would read back as a level marker
    #[error("Value {value} of field '{field}' falls in the level marker range {low}..={high}")]
    AmbiguousValue {
        /// Name of the offending field
        field: String,
        /// The value that cannot be transmitted
        value: f32,
        /// Lowest marker accepted while reading the field
        low: i64,
        /// Highest marker accepted while reading the field
        high: i64,
    },

    /// The token count cannot be stored exactly in the f32 header
    #[error("Message has {0} tokens, more than an f32 count can represent")]
    TooLong(usize),

    /// Failure writing to the output buffer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
