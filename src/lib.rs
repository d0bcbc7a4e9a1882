//! # structfeed - Self-Describing Struct Telemetry Decoder
//!
//! `structfeed` decodes messages that carry an arbitrarily nested record
//! (structs of structs and numeric arrays) as a flat run of little-endian
//! `f32` values. The field hierarchy is not described by offsets or a schema:
//! it is inferred from "level" marker values embedded in the stream.
//!
//! ## Quick Start
//!
//! ```rust
//! use structfeed::encoder::{Field, StructEncoder};
//!
//! // Build a message the way a simulation would send it
//! let bytes = StructEncoder::new()
//!     .field(Field::structure("body", vec![
//!         Field::data("q_bg", vec![-0.7, 3.5, -1.5, 8.0]),
//!         Field::data("V_Kb", vec![15.0, -3.0, 4.5]),
//!     ]))
//!     .field(Field::structure("config", vec![
//!         Field::data("xyz_ref_c", vec![-2.5, 3.0, 7.25]),
//!     ]))
//!     .encode()?;
//!
//! // Decode and query by name
//! let table = structfeed::decode(&bytes)?;
//! assert_eq!(table.child_struct_names(), vec!["body", "config"]);
//!
//! let body = table.child_struct("body");
//! assert_eq!(body.child_data("V_Kb"), vec![15.0, -3.0, 4.5]);
//!
//! // Missing fields are empty, not errors
//! assert!(body.child_data("omega").is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Wire Format
//!
//! ```text
//! message := count:f32  token{count}
//! token   := level marker | name length | name char | data value
//! ```
//!
//! The meaning of each token depends on decoder state; see [`decoder`] for
//! the marker rules.
//!
//! ## Architecture
//!
//! Data flows one way: bytes → tokens → flat table → normalized table →
//! name-based queries.
//!
//! - [`stream`]: count header and forward-only token reader
//! - [`decoder`]: structure inference state machine
//! - [`table`]: normalized node arena, index normalization and queries
//! - [`encoder`]: message builder for the producing side
//! - [`listener`]: UDP receive loop with per-frame decoding and snapshot handoff
//! - [`error`]: error types

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod listener;
pub mod stream;
pub mod table;

pub use decoder::Decoder;
pub use error::{DecodeError, EncodeError};
pub use table::{Node, Table};

/// Decode one complete message
///
/// Equivalent to `Decoder::new().decode(bytes)`.
pub fn decode(bytes: &[u8]) -> Result<Table, DecodeError> {
    Decoder::new().decode(bytes)
}

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::decoder::Decoder;
    pub use crate::encoder::{Field, StructEncoder};
    pub use crate::error::{DecodeError, EncodeError};
    pub use crate::listener::{
        Frame, Listener, ListenerConfig, ListenerError, ListenerHandle, ListenerStats,
    };
    pub use crate::table::{Lookup, Node, Table};
    pub use crate::decode;
}
