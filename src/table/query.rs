//! Name-based queries one level below a table's root
//!
//! Every lookup is a linear scan over level-1 nodes and the first match wins.
//! A missing name is not an error: struct lookups return an empty [`Table`],
//! data lookups an empty vector.

use super::{normalize, Node, Table};

/// Result of a dotted-path lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// The path ends at a struct
    Struct(Table),
    /// The path ends at a data field
    Data(Vec<f64>),
}

impl Table {
    /// Names of all level-1 fields
    pub fn child_names(&self) -> Vec<String> {
        self.level_one()
            .map(|node| node.name.clone())
            .collect()
    }

    /// Names of level-1 fields that hold children
    pub fn child_struct_names(&self) -> Vec<String> {
        self.level_one()
            .filter(|node| node.is_struct)
            .map(|node| node.name.clone())
            .collect()
    }

    /// Names of level-1 fields that hold numeric data
    pub fn child_data_names(&self) -> Vec<String> {
        self.level_one()
            .filter(|node| !node.is_struct)
            .map(|node| node.name.clone())
            .collect()
    }

    /// Copy out the subtree under the first level-1 struct called `name`
    ///
    /// The returned table is independent of `self`: levels are shifted up so
    /// the struct's children become level 1, and indices and data are
    /// re-normalized from zero. Returns an empty table when no such struct
    /// exists.
    pub fn child_struct(&self, name: &str) -> Table {
        let Some(root) = self.find_child(name, true) else {
            return Table::new();
        };

        let mut subtree: Vec<Node> = Vec::new();
        let mut visited = vec![false; self.nodes.len()];
        visited[root] = true;
        let mut stack: Vec<usize> = self.nodes[root].child_refs.iter().rev().copied().collect();
        while let Some(pos) = stack.pop() {
            // A hand-built table may reference a node twice or form a cycle
            match visited.get_mut(pos) {
                Some(seen) if !*seen => *seen = true,
                _ => continue,
            }
            let node = &self.nodes[pos];
            let mut copy = node.clone();
            copy.level = copy.level.saturating_sub(1);
            if copy.is_struct {
                stack.extend(copy.child_refs.iter().rev());
            }
            subtree.push(copy);
        }

        normalize(subtree, &self.data)
    }

    /// Values of the first level-1 data field called `name`
    ///
    /// Returns an empty vector when no such field exists.
    pub fn child_data(&self, name: &str) -> Vec<f64> {
        match self.find_child(name, false) {
            Some(pos) => self.values_of(&self.nodes[pos]),
            None => Vec::new(),
        }
    }

    /// Follow a chain of struct names, e.g. `["aircraft", "wing"]`
    pub fn struct_at_path(&self, path: &[&str]) -> Table {
        let Some((first, rest)) = path.split_first() else {
            return self.clone();
        };
        let mut current = self.child_struct(first);
        for name in rest {
            current = current.child_struct(name);
        }
        current
    }

    /// Follow struct names down to a data field, e.g. `["body", "V_Kb"]`
    pub fn data_at_path(&self, path: &[&str]) -> Vec<f64> {
        match path.split_last() {
            Some((field, parents)) => self.struct_at_path(parents).child_data(field),
            None => Vec::new(),
        }
    }

    /// Resolve a dot-separated path to whatever it names
    ///
    /// Unlike the other queries this distinguishes a missing field (`None`)
    /// from a present but empty one.
    pub fn lookup(&self, path: &str) -> Option<Lookup> {
        let names: Vec<&str> = path.split('.').collect();
        let (field, parents) = names.split_last()?;

        let mut current = self.clone();
        for name in parents {
            current.find_child(name, true)?;
            current = current.child_struct(name);
        }

        if current.find_child(field, true).is_some() {
            Some(Lookup::Struct(current.child_struct(field)))
        } else if current.find_child(field, false).is_some() {
            Some(Lookup::Data(current.child_data(field)))
        } else {
            None
        }
    }

    /// Split an interleaved data field into `rows` row vectors
    ///
    /// Values stored as `[x0, y0, z0, x1, y1, z1, ...]` with `rows = 3`
    /// become `[[x0, x1, ...], [y0, y1, ...], [z0, z1, ...]]`. Values that do
    /// not fill a whole column are dropped.
    pub fn child_matrix(&self, name: &str, rows: usize) -> Vec<Vec<f64>> {
        if rows == 0 {
            return Vec::new();
        }
        let values = self.child_data(name);
        let columns = values.len() / rows;
        (0..rows)
            .map(|row| (0..columns).map(|col| values[row + col * rows]).collect())
            .collect()
    }

    /// Number of nesting levels below the root (0 for an empty table)
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|node| node.level).max().unwrap_or(0)
    }

    fn level_one(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.level == 1)
    }

    fn find_child(&self, name: &str, is_struct: bool) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.level == 1 && node.is_struct == is_struct && node.name == name)
    }
}
