//! Index normalization
//!
//! Nodes arrive here with `node_index` values and struct `child_refs` that
//! refer to wherever the nodes lived before (the decoder's arena, or a parent
//! table when a subtree was copied out). Data nodes reference positions in
//! that earlier data buffer.
//!
//! Normalization keeps the node order, makes every `node_index` equal to its
//! position, rewrites struct references through an old-to-new index map and
//! copies the referenced values into a fresh buffer in node order, so each
//! data node ends up owning one contiguous run.

use std::collections::HashMap;

use log::warn;

use super::{Node, Table};

/// Canonicalize indices and rebuild the data buffer
///
/// `source` is the buffer that data nodes' `child_refs` currently point into.
/// References that resolve to nothing are dropped. Applying this to an
/// already-normalized table returns an identical table.
pub fn normalize(mut nodes: Vec<Node>, source: &[f64]) -> Table {
    let positions: HashMap<usize, usize> = nodes
        .iter()
        .enumerate()
        .map(|(pos, node)| (node.node_index, pos))
        .collect();

    let value_count: usize = nodes
        .iter()
        .filter(|node| !node.is_struct)
        .map(|node| node.child_refs.len())
        .sum();
    let mut data = Vec::with_capacity(value_count);

    for (pos, node) in nodes.iter_mut().enumerate() {
        node.node_index = pos;

        let old_refs = std::mem::take(&mut node.child_refs);
        let mut refs = Vec::with_capacity(old_refs.len());
        for old in old_refs {
            if node.is_struct {
                match positions.get(&old) {
                    Some(&new) => refs.push(new),
                    None => warn!("Dropping dangling child reference {} of '{}'", old, node.name),
                }
            } else {
                match source.get(old) {
                    Some(&value) => {
                        refs.push(data.len());
                        data.push(value);
                    }
                    None => warn!("Dropping dangling data reference {} of '{}'", old, node.name),
                }
            }
        }
        node.child_refs = refs;
    }

    Table::from_normalized(nodes, data)
}
