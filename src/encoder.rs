//! Message building
//!
//! The producing side of the format, used to generate test traffic, demo
//! captures and benchmark inputs. A message is built from a tree of
//! [`Field`]s:
//!
//! ```rust
//! use structfeed::encoder::{Field, StructEncoder};
//!
//! let bytes = StructEncoder::new()
//!     .field(Field::structure("body", vec![
//!         Field::data("V_Kb", vec![15.0, -3.0, 4.5]),
//!     ]))
//!     .field(Field::data("t", vec![12.25]))
//!     .encode()?;
//!
//! let table = structfeed::decode(&bytes)?;
//! assert_eq!(table.child_struct("body").child_data("V_Kb"), vec![15.0, -3.0, 4.5]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Data values are checked against the marker range of their field, since the
//! decoder would otherwise split the field at that value.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::EncodeError;

/// Largest count an f32 header stores exactly
const MAX_TOKENS: usize = 1 << 24;

/// A named field of a message
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A field holding child fields
    Struct {
        /// Field name
        name: String,
        /// Child fields, in order
        children: Vec<Field>,
    },
    /// A field holding numeric values
    Data {
        /// Field name
        name: String,
        /// Values, in order
        values: Vec<f32>,
    },
}

impl Field {
    /// Create a struct field
    pub fn structure(name: impl Into<String>, children: Vec<Field>) -> Self {
        Field::Struct {
            name: name.into(),
            children,
        }
    }

    /// Create a data field
    pub fn data(name: impl Into<String>, values: Vec<f32>) -> Self {
        Field::Data {
            name: name.into(),
            values,
        }
    }

    /// Name of the field
    pub fn name(&self) -> &str {
        match self {
            Field::Struct { name, .. } | Field::Data { name, .. } => name,
        }
    }
}

/// Builder for encoded messages
#[derive(Debug, Clone, Default)]
pub struct StructEncoder {
    base: i32,
    fields: Vec<Field>,
}

impl StructEncoder {
    /// Create an encoder with identifier base 0 and no fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifier base
    ///
    /// Level markers start at this value. A base far away from the data
    /// values leaves more room for small integers in the payload.
    pub fn with_base(mut self, base: i32) -> Self {
        self.base = base;
        self
    }

    /// Append a top-level field
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Append several top-level fields
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Produce the token stream without the count header
    pub fn tokens(&self) -> Result<Vec<f32>, EncodeError> {
        let mut tokens = Vec::new();
        for field in &self.fields {
            self.emit(field, 1, &mut tokens)?;
        }
        if tokens.len() > MAX_TOKENS {
            return Err(EncodeError::TooLong(tokens.len()));
        }
        Ok(tokens)
    }

    /// Produce the complete message: count header followed by the tokens
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let tokens = self.tokens()?;
        let mut bytes = Vec::with_capacity((tokens.len() + 1) * crate::stream::TOKEN_SIZE);
        bytes.write_f32::<LittleEndian>(tokens.len() as f32)?;
        for token in tokens {
            bytes.write_f32::<LittleEndian>(token)?;
        }
        Ok(bytes)
    }

    fn emit(&self, field: &Field, level: u32, tokens: &mut Vec<f32>) -> Result<(), EncodeError> {
        let base = i64::from(self.base);
        tokens.push((base + i64::from(level) - 1) as f32);

        let name = field.name();
        tokens.push(name.chars().count() as f32);
        tokens.extend(name.chars().map(|c| c as u32 as f32));

        match field {
            Field::Struct { name, children } => {
                if children.is_empty() {
                    return Err(EncodeError::EmptyStruct(name.clone()));
                }
                for child in children {
                    self.emit(child, level + 1, tokens)?;
                }
            }
            Field::Data { name, values } => {
                let low = base;
                let high = base + i64::from(level);
                for &value in values {
                    let rounded = value.round();
                    if rounded.is_finite() && (low..=high).contains(&(rounded as i64)) {
                        return Err(EncodeError::AmbiguousValue {
                            field: name.clone(),
                            value,
                            low,
                            high,
                        });
                    }
                    tokens.push(value);
                }
            }
        }
        Ok(())
    }
}
