//! Token-level state machine behind [`Decoder`](super::Decoder)

use log::trace;

use crate::error::DecodeError;
use crate::table::Node;

/// What the next token is expected to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ParseState {
    /// Start of stream: the first token is the identifier base and the
    /// level-1 marker of the first field. Later markers are recognised while
    /// reading field data.
    ExpectingMarkerOrData,
    /// Character count of the field name
    ReadingFieldNameLength,
    /// Character codes of the field name
    ReadingFieldNameChars { remaining: usize },
    /// Values of the current field, or the next marker
    ReadingFieldData,
}

/// Struct whose children are still being read
#[derive(Debug)]
struct OpenStruct {
    node: usize,
    children: Vec<usize>,
}

/// Decoding state for one message
pub(super) struct Parser {
    identifier_base: i64,
    current_level: i64,
    state: ParseState,
    name: String,
    nodes: Vec<Node>,
    data: Vec<f64>,
    open: Vec<OpenStruct>,
}

/// Nearest integer of a token, or `None` if it has none
fn rounded(token: f32) -> Option<i64> {
    let r = token.round();
    if r.is_finite() {
        Some(r as i64)
    } else {
        None
    }
}

impl Parser {
    pub(super) fn new() -> Self {
        Self {
            identifier_base: 0,
            current_level: 0,
            state: ParseState::ExpectingMarkerOrData,
            name: String::new(),
            nodes: Vec::new(),
            data: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Feed the token at `position`; `remaining` tokens follow it
    pub(super) fn push(
        &mut self,
        position: usize,
        token: f32,
        remaining: usize,
    ) -> Result<(), DecodeError> {
        match self.state {
            ParseState::ExpectingMarkerOrData => {
                let base = rounded(token)
                    .filter(|base| i32::try_from(*base).is_ok())
                    .ok_or_else(|| {
                        DecodeError::malformed(position, format!("invalid identifier {}", token))
                    })?;
                trace!("Identifier base {}", base);
                self.identifier_base = base;
                self.current_level = base;
                self.state = ParseState::ReadingFieldNameLength;
            }
            ParseState::ReadingFieldData => match self.marker_level(token) {
                Some(level) => {
                    self.on_marker(position, level)?;
                    self.state = ParseState::ReadingFieldNameLength;
                }
                None => self.push_value(token),
            },
            ParseState::ReadingFieldNameLength => {
                let length = rounded(token)
                    .filter(|len| *len >= 0)
                    .ok_or_else(|| {
                        DecodeError::malformed(
                            position,
                            format!("invalid field name length {}", token),
                        )
                    })? as usize;
                if length > remaining {
                    return Err(DecodeError::malformed(
                        position,
                        format!(
                            "field name length {} exceeds the {} remaining tokens",
                            length, remaining
                        ),
                    ));
                }

                self.name.clear();
                if length == 0 {
                    self.open_field();
                } else {
                    self.state = ParseState::ReadingFieldNameChars { remaining: length };
                }
            }
            ParseState::ReadingFieldNameChars { remaining: chars } => {
                let c = rounded(token)
                    .and_then(|code| u32::try_from(code).ok())
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        DecodeError::malformed(
                            position,
                            format!("invalid character code {}", token),
                        )
                    })?;
                self.name.push(c);

                if chars == 1 {
                    self.open_field();
                } else {
                    self.state = ParseState::ReadingFieldNameChars {
                        remaining: chars - 1,
                    };
                }
            }
        }
        Ok(())
    }

    /// Close whatever is still open and hand out the flat table
    pub(super) fn finish(mut self, position: usize) -> Result<(Vec<Node>, Vec<f64>), DecodeError> {
        match self.state {
            ParseState::ReadingFieldNameLength | ParseState::ReadingFieldNameChars { .. } => {
                Err(DecodeError::malformed(
                    position,
                    "stream ended inside a field header",
                ))
            }
            ParseState::ExpectingMarkerOrData | ParseState::ReadingFieldData => {
                self.close_levels(self.open.len());
                Ok((self.nodes, self.data))
            }
        }
    }

    fn marker_level(&self, token: f32) -> Option<i64> {
        rounded(token)
            .filter(|level| {
                *level >= self.identifier_base && *level <= self.current_level.saturating_add(1)
            })
    }

    fn on_marker(&mut self, position: usize, level: i64) -> Result<(), DecodeError> {
        let Some(last) = self.nodes.len().checked_sub(1) else {
            return Err(DecodeError::malformed(position, "level marker before any field"));
        };

        if level > self.current_level {
            let node = &mut self.nodes[last];
            if !node.child_refs.is_empty() {
                return Err(DecodeError::malformed(
                    position,
                    format!("field '{}' holds data but is followed by a deeper level", node.name),
                ));
            }
            trace!("'{}' is a struct, descending to level {}", node.name, level);
            node.is_struct = true;
            self.open.push(OpenStruct {
                node: last,
                children: Vec::new(),
            });
        } else {
            self.nodes[last].is_struct = false;
            if level < self.current_level {
                let closed = (self.current_level - level) as usize;
                trace!("Closing {} levels, back to level {}", closed, level);
                self.close_levels(closed);
            }
        }
        self.current_level = level;
        Ok(())
    }

    fn close_levels(&mut self, count: usize) {
        for _ in 0..count {
            let Some(frame) = self.open.pop() else {
                break;
            };
            self.nodes[frame.node].child_refs = frame.children;
        }
    }

    fn open_field(&mut self) {
        let index = self.nodes.len();
        let level = (self.current_level - self.identifier_base + 1) as u32;
        let node = Node::new(std::mem::take(&mut self.name), level, index);
        trace!("Field '{}' at level {}", node.name, level);

        if let Some(parent) = self.open.last_mut() {
            parent.children.push(index);
        }
        self.nodes.push(node);
        self.state = ParseState::ReadingFieldData;
    }

    fn push_value(&mut self, token: f32) {
        let position = self.data.len();
        self.data.push(f64::from(token));
        if let Some(node) = self.nodes.last_mut() {
            node.child_refs.push(position);
        }
    }
}
