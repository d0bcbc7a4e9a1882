//! Binary stream reading
//!
//! A message is a run of little-endian single-precision floats. The first
//! value is the number of tokens that follow it, stored as a float and
//! rounded on read:
//!
//! ```text
//! ┌─────────────┬─────────┬─────────┬─────┬─────────┐
//! │ count (f32) │ token 0 │ token 1 │ ... │ token N │
//! └─────────────┴─────────┴─────────┴─────┴─────────┘
//! ```
//!
//! [`StreamReader`] checks up front that the buffer holds every declared
//! token, then hands them out one at a time in a single forward pass.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;

use crate::error::DecodeError;

/// Size in bytes of one encoded token
pub const TOKEN_SIZE: usize = 4;

/// Forward-only reader over the tokens of one message
#[derive(Debug)]
pub struct StreamReader<'a> {
    cursor: Cursor<&'a [u8]>,
    declared: usize,
    consumed: usize,
}

impl<'a> StreamReader<'a> {
    /// Read the count header and validate the buffer length against it
    ///
    /// # Errors
    /// * [`DecodeError::TruncatedStream`] if the buffer cannot hold the header
    ///   or the declared number of tokens
    /// * [`DecodeError::MalformedStream`] if the count is negative or not finite
    pub fn new(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        if bytes.len() < TOKEN_SIZE {
            return Err(DecodeError::TruncatedStream {
                declared: 1,
                available: 0,
            });
        }

        let mut cursor = Cursor::new(bytes);
        let raw_count = cursor.read_f32::<LittleEndian>()?;
        let declared = Self::parse_count(raw_count)?;

        let available = (bytes.len() - TOKEN_SIZE) / TOKEN_SIZE;
        if declared > available {
            return Err(DecodeError::TruncatedStream {
                declared,
                available,
            });
        }
        if available > declared || bytes.len() % TOKEN_SIZE != 0 {
            debug!(
                "Ignoring {} trailing bytes after {} declared tokens",
                bytes.len() - TOKEN_SIZE * (declared + 1),
                declared
            );
        }

        Ok(Self {
            cursor,
            declared,
            consumed: 0,
        })
    }

    fn parse_count(raw: f32) -> Result<usize, DecodeError> {
        let rounded = raw.round();
        if !rounded.is_finite() || rounded < 0.0 {
            return Err(DecodeError::malformed(
                0,
                format!("invalid element count {}", raw),
            ));
        }
        Ok(rounded as usize)
    }

    /// Number of tokens announced by the header
    pub fn declared_count(&self) -> usize {
        self.declared
    }

    /// Number of tokens not yet handed out
    pub fn remaining(&self) -> usize {
        self.declared - self.consumed
    }

    /// Zero-based position of the next token
    pub fn position(&self) -> usize {
        self.consumed
    }
}

impl Iterator for StreamReader<'_> {
    type Item = Result<f32, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.consumed >= self.declared {
            return None;
        }
        self.consumed += 1;
        Some(
            self.cursor
                .read_f32::<LittleEndian>()
                .map_err(DecodeError::from),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for StreamReader<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_reads_declared_tokens() {
        let bytes = encode(&[3.0, 1.5, -2.0, 65.0]);
        let reader = StreamReader::new(&bytes).unwrap();
        assert_eq!(reader.declared_count(), 3);

        let tokens: Vec<f32> = reader.map(|t| t.unwrap()).collect();
        assert_eq!(tokens, vec![1.5, -2.0, 65.0]);
    }

    #[test]
    fn test_count_is_rounded() {
        let bytes = encode(&[1.6, 7.0, 8.0]);
        let reader = StreamReader::new(&bytes).unwrap();
        assert_eq!(reader.declared_count(), 2);
    }

    #[test]
    fn test_zero_count() {
        let bytes = encode(&[0.0]);
        let mut reader = StreamReader::new(&bytes).unwrap();
        assert_eq!(reader.declared_count(), 0);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_trailing_tokens_ignored() {
        let bytes = encode(&[1.0, 4.0, 5.0, 6.0]);
        let reader = StreamReader::new(&bytes).unwrap();
        assert_eq!(reader.len(), 1);
        let tokens: Vec<f32> = reader.map(|t| t.unwrap()).collect();
        assert_eq!(tokens, vec![4.0]);
    }

    #[test]
    fn test_truncated_stream() {
        let bytes = encode(&[5.0, 1.0, 2.0]);
        match StreamReader::new(&bytes) {
            Err(DecodeError::TruncatedStream {
                declared,
                available,
            }) => {
                assert_eq!(declared, 5);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncation, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_partial_token_does_not_count() {
        let mut bytes = encode(&[2.0, 1.0]);
        bytes.extend_from_slice(&[0x00, 0x00]);
        assert!(StreamReader::new(&bytes).unwrap_err().is_truncation());
    }

    #[test]
    fn test_missing_header() {
        assert!(StreamReader::new(&[]).unwrap_err().is_truncation());
        assert!(StreamReader::new(&[0x00, 0x00, 0x80]).unwrap_err().is_truncation());
    }

    #[test]
    fn test_negative_count_is_malformed() {
        let bytes = encode(&[-3.0]);
        assert!(matches!(
            StreamReader::new(&bytes),
            Err(DecodeError::MalformedStream { position: 0, .. })
        ));

        let bytes = encode(&[f32::NAN]);
        assert!(matches!(
            StreamReader::new(&bytes),
            Err(DecodeError::MalformedStream { .. })
        ));
    }
}
