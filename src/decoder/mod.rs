//! # Structure Inference Decoder
//!
//! Rebuilds the field hierarchy of a message from its untagged token stream.
//!
//! ## Token Grammar
//!
//! ```text
//! field   := marker  name_len  char{name_len}  value*  field*
//! marker  := rounded value in [base, level + 1]
//! ```
//!
//! The first token of a message is the identifier `base`, and doubles as the
//! marker of the first level-1 field. A field at depth `d` is announced by the
//! marker `base + d - 1`. Relative to the current level a marker means:
//!
//! | marker           | meaning                                             |
//! |------------------|-----------------------------------------------------|
//! | `level + 1`      | previous field is a struct, descend into it         |
//! | `level`          | previous field was data, next sibling follows       |
//! | `< level`        | previous field was data, close structs, then sibling |
//!
//! Markers are only recognized where a marker or a data value may appear.
//! While a field's data run is being read, any value whose rounded form lies
//! in the marker range ends the run, so data values in that range cannot be
//! transmitted. The wire format has no tag to tell them apart.
//!
//! Open structs are kept on an explicit stack, one frame per level below the
//! root. New fields are recorded in the top frame; popping a frame hands its
//! collected children to the struct node that opened it.

mod state;

#[cfg(test)]
mod tests;

use log::debug;

use crate::error::DecodeError;
use crate::stream::StreamReader;
use crate::table::{normalize, Table};

use state::Parser;

/// One-shot decoder for a single message
///
/// Each call to [`Decoder::decode`] starts from fresh state, so a decoder can
/// be reused for consecutive messages but never observes more than one at a
/// time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    frame: u64,
}

impl Decoder {
    /// Create a decoder for frame 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder that tags its log output with `frame`
    pub fn with_frame(frame: u64) -> Self {
        Self { frame }
    }

    /// Frame number used in log output
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Decode one complete message into a normalized [`Table`]
    ///
    /// # Errors
    /// * [`DecodeError::TruncatedStream`] when the buffer holds fewer tokens
    ///   than the header declares
    /// * [`DecodeError::MalformedStream`] when markers, name lengths and
    ///   character codes do not line up
    pub fn decode(&self, bytes: &[u8]) -> Result<Table, DecodeError> {
        let mut reader = StreamReader::new(bytes)?;
        let declared = reader.declared_count();

        let mut parser = Parser::new();
        while let Some(token) = reader.next() {
            let position = reader.position() - 1;
            parser.push(position, token?, reader.remaining())?;
        }
        let (nodes, data) = parser.finish(declared)?;

        let table = normalize(nodes, &data);
        debug!(
            "Frame {}: decoded {} tokens into {} fields ({} values, depth {})",
            self.frame,
            declared,
            table.len(),
            table.data().len(),
            table.depth()
        );
        Ok(table)
    }
}
