//! B-tree node type.
//!
//! Nodes live entirely in memory. Every child is owned by exactly one parent,
//! so the structure is a strict ownership tree: replacing a node releases its
//! whole subtree.

use std::cmp::Ordering;

/// Minimum degree of the tree.
pub const ORDER: usize = 3;

/// Minimum number of keys in a non-root node.
pub const MIN_KEYS: usize = ORDER - 1;

/// Maximum number of keys in any node.
pub const MAX_KEYS: usize = 2 * ORDER - 1;

/// A key-value entry stored in a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

/// A B-tree node.
///
/// Stores N entries in ascending key order and, for internal nodes, N+1
/// children. `children[i]` holds keys < `entries[i].key`,
/// `children[i + 1]` holds keys > `entries[i].key`.
#[derive(Debug, Clone)]
pub struct Node<K, V> {
    /// Entries in sorted order by key.
    pub entries: Vec<Entry<K, V>>,
    /// Owned children. Empty for leaves.
    pub children: Vec<Self>,
}

impl<K, V> Default for Node<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Node<K, V> {
    /// Create a new empty leaf.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an internal node whose only child is `child`.
    ///
    /// Only valid as a transient state right before `split_child(0)`.
    #[must_use]
    pub fn with_child(child: Self) -> Self {
        Self {
            entries: Vec::new(),
            children: vec![child],
        }
    }

    /// Check if the node is a leaf.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if the node is full.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.entries.len() >= MAX_KEYS
    }

    /// Split the full child at `child_index`.
    ///
    /// The child's median entry moves up into this node at `child_index`,
    /// the entries (and children) after it move into a new right sibling at
    /// `child_index + 1`.
    pub fn split_child(&mut self, child_index: usize) {
        let child = &mut self.children[child_index];
        debug_assert!(child.is_full(), "only full children are split");

        let right_entries = child.entries.split_off(MIN_KEYS + 1);
        let right_children = if child.is_leaf() {
            Vec::new()
        } else {
            child.children.split_off(MIN_KEYS + 1)
        };

        let Some(median) = child.entries.pop() else {
            return;
        };

        self.entries.insert(child_index, median);
        self.children.insert(
            child_index + 1,
            Self {
                entries: right_entries,
                children: right_children,
            },
        );
    }
}

impl<K: Ord, V> Node<K, V> {
    /// Find the position of `key` in this node with a linear scan.
    ///
    /// Returns `Ok(i)` when `entries[i]` holds the key, otherwise `Err(i)`
    /// where `i` is both the insert position and the child to descend into.
    /// Nodes hold at most `MAX_KEYS` entries.
    pub fn find_key_position(&self, key: &K) -> Result<usize, usize> {
        for (i, entry) in self.entries.iter().enumerate() {
            match key.cmp(&entry.key) {
                Ordering::Less => return Err(i),
                Ordering::Equal => return Ok(i),
                Ordering::Greater => {}
            }
        }
        Err(self.entries.len())
    }

    /// Get a value by key, looking only at this node.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_key_position(key)
            .ok()
            .map(|i| &self.entries[i].value)
    }
}
