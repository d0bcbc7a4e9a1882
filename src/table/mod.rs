//! # Decoded Tables
//!
//! A [`Table`] is the queryable result of decoding one message: an arena of
//! [`Node`]s in depth-first stream order plus one shared numeric buffer.
//!
//! ## Layout
//!
//! ```text
//! stream:  A{ x:[3.0]  B{ y:[1.0, 2.0] } }  z:[9.0]
//!
//! nodes:   0 A  level 1  struct  child_refs [1, 2]
//!          1 x  level 2  data    child_refs [0]
//!          2 B  level 2  struct  child_refs [3]
//!          3 y  level 3  data    child_refs [1, 2]
//!          4 z  level 1  data    child_refs [3]
//!
//! data:    [3.0, 1.0, 2.0, 9.0]
//! ```
//!
//! The root is implicit at level 0. Struct nodes reference child node
//! positions, data nodes reference positions in the data buffer.
//!
//! Tables are immutable once built. Queries such as
//! [`Table::child_struct`] return independent copies re-indexed from zero.

mod normalize;
mod query;


use std::fmt;

use serde::Serialize;

pub use normalize::normalize;
pub use query::Lookup;

/// Maximum number of values printed per data field by the `Display` impl
const DISPLAY_PREVIEW: usize = 8;

/// One named field of a decoded message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Field name as reconstructed from its character codes
    pub name: String,
    /// Depth below the implicit root (root children are level 1)
    pub level: u32,
    /// True if the node holds child fields, false if it holds numeric data
    pub is_struct: bool,
    /// Position of the node in its table
    pub node_index: usize,
    /// Child node positions for structs, data buffer positions otherwise
    pub child_refs: Vec<usize>,
}

impl Node {
    /// Create a data node without values; the decoder promotes it to a
    /// struct when a deeper level marker follows it
    pub fn new(name: impl Into<String>, level: u32, node_index: usize) -> Self {
        Self {
            name: name.into(),
            level,
            is_struct: false,
            node_index,
            child_refs: Vec::new(),
        }
    }
}

/// Normalized tree of decoded fields
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    nodes: Vec<Node>,
    data: Vec<f64>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from already-normalized parts
    ///
    /// Callers holding parts in any other state should go through
    /// [`normalize`] instead.
    pub(crate) fn from_normalized(nodes: Vec<Node>, data: Vec<f64>) -> Self {
        Self { nodes, data }
    }

    /// All nodes in depth-first order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The shared numeric buffer
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Number of nodes at every level
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the table holds no fields
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Take ownership of the nodes and the data buffer
    pub fn into_parts(self) -> (Vec<Node>, Vec<f64>) {
        (self.nodes, self.data)
    }

    /// Re-run index normalization on a copy of this table
    pub fn normalized(&self) -> Table {
        normalize(self.nodes.clone(), &self.data)
    }

    /// Values referenced by a data node
    pub fn values_of(&self, node: &Node) -> Vec<f64> {
        if node.is_struct {
            return Vec::new();
        }
        node.child_refs
            .iter()
            .filter_map(|&pos| self.data.get(pos).copied())
            .collect()
    }

    /// Convert to a JSON tree: structs become objects, data fields arrays
    ///
    /// Repeated names keep their first occurrence and non-finite values
    /// become `null`.
    pub fn to_value(&self) -> serde_json::Value {
        let roots: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.level == 1)
            .map(|(pos, _)| pos)
            .collect();
        self.object_of(&roots)
    }

    fn object_of(&self, positions: &[usize]) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for &pos in positions {
            let Some(node) = self.nodes.get(pos) else {
                continue;
            };
            let value = if node.is_struct {
                self.object_of(&node.child_refs)
            } else {
                serde_json::Value::Array(
                    self.values_of(node)
                        .into_iter()
                        .map(|v| {
                            serde_json::Number::from_f64(v)
                                .map(serde_json::Value::Number)
                                .unwrap_or(serde_json::Value::Null)
                        })
                        .collect(),
                )
            };
            map.entry(node.name.clone()).or_insert(value);
        }
        serde_json::Value::Object(map)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            let indent = "  ".repeat(node.level.saturating_sub(1) as usize);
            if node.is_struct {
                writeln!(f, "{}{}/", indent, node.name)?;
                continue;
            }

            let values = self.values_of(node);
            let preview: Vec<String> = values
                .iter()
                .take(DISPLAY_PREVIEW)
                .map(|v| format!("{}", v))
                .collect();
            if values.len() > DISPLAY_PREVIEW {
                writeln!(
                    f,
                    "{}{}: [{}, ...] ({} values)",
                    indent,
                    node.name,
                    preview.join(", "),
                    values.len()
                )?;
            } else {
                writeln!(f, "{}{}: [{}]", indent, node.name, preview.join(", "))?;
            }
        }
        Ok(())
    }
}
