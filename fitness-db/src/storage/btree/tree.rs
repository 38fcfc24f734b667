//! In-memory ordered map.
//!
//! A B-tree of minimum degree `ORDER` with upsert-only mutation. Full nodes
//! are split eagerly on the way down, so an insert never has to walk back
//! up the tree. Deletion is not supported.

use std::cmp::Ordering;

use crate::storage::btree::node::{Entry, Node};

/// An ordered key-value map backed by a B-tree.
#[derive(Debug, Clone)]
pub struct BTree<K, V> {
    root: Node<K, V>,
    len: usize,
}

impl<K, V> Default for BTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> BTree<K, V> {
    /// Create a new empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: Node::new(),
            len: 0,
        }
    }

    /// Number of keys stored in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every node and start over with an empty root.
    pub fn clear(&mut self) {
        self.root = Node::new();
        self.len = 0;
    }

    /// Height measured along the leftmost child chain.
    ///
    /// An empty tree has height 1 (the empty root leaf).
    #[must_use]
    pub fn get_height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.root;
        while let Some(child) = node.children.first() {
            node = child;
            height += 1;
        }
        height
    }

    /// Create an iterator over all entries in key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(&self.root);
        iter
    }

    /// Iterate over all values in key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }
}

impl<K: Ord + Clone, V> BTree<K, V> {
    /// Insert or update a key-value pair.
    ///
    /// Returns the old value if updating, None if inserting.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.root.is_full() {
            let old_root = std::mem::take(&mut self.root);
            self.root = Node::with_child(old_root);
            self.root.split_child(0);
        }

        let old = Self::insert_non_full(&mut self.root, key, value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// Descend from a non-full node, splitting any full child before
    /// stepping into it.
    fn insert_non_full(mut node: &mut Node<K, V>, key: K, value: V) -> Option<V> {
        loop {
            let mut index = match node.find_key_position(&key) {
                Ok(i) => return Some(std::mem::replace(&mut node.entries[i].value, value)),
                Err(i) => i,
            };

            if node.is_leaf() {
                node.entries.insert(index, Entry { key, value });
                return None;
            }

            if node.children[index].is_full() {
                node.split_child(index);
                match key.cmp(&node.entries[index].key) {
                    Ordering::Less => {}
                    Ordering::Equal => {
                        // The promoted median is the key being inserted
                        return Some(std::mem::replace(&mut node.entries[index].value, value));
                    }
                    Ordering::Greater => index += 1,
                }
            }

            node = &mut node.children[index];
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut node = &self.root;
        loop {
            match node.find_key_position(key) {
                Ok(i) => return Some(&node.entries[i].value),
                Err(_) if node.is_leaf() => return None,
                Err(i) => node = &node.children[i],
            }
        }
    }

    /// Look up a value by key, failing if it is absent.
    pub fn search(&self, key: &K) -> Result<&V, BTreeError> {
        self.get(key).ok_or(BTreeError::KeyNotFound)
    }

    /// Check whether a key is present.
    #[must_use]
    pub fn exists(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// All keys in ascending order.
    #[must_use]
    pub fn get_all_keys(&self) -> Vec<K> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Collect the values whose key lies in `[low, high]`.
    ///
    /// Every node is visited regardless of the bounds, so the cost is
    /// proportional to the size of the tree. Values come back in node
    /// visiting order, not key order.
    #[must_use]
    pub fn range_query(&self, low: &K, high: &K) -> Vec<&V> {
        let mut results = Vec::new();
        let mut stack = vec![&self.root];

        while let Some(node) = stack.pop() {
            results.extend(
                node.entries
                    .iter()
                    .filter(|e| &e.key >= low && &e.key <= high)
                    .map(|e| &e.value),
            );
            stack.extend(node.children.iter().rev());
        }

        results
    }
}

/// In-order iterator over tree entries.
///
/// Holds a stack of (node, next entry index) pairs; no state survives
/// between separate calls to `BTree::iter`.
pub struct Iter<'a, K, V> {
    stack: Vec<(&'a Node<K, V>, usize)>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut node: &'a Node<K, V>) {
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) => node = child,
                None => return,
            }
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            let (node, index) = (top.0, top.1);

            if index < node.entries.len() {
                top.1 += 1;
                if !node.is_leaf() {
                    self.push_left_spine(&node.children[index + 1]);
                }
                let entry = &node.entries[index];
                return Some((&entry.key, &entry.value));
            }

            self.stack.pop();
        }
    }
}

/// Errors that can occur during B-tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BTreeError {
    /// The key is not in the tree.
    KeyNotFound,
}

impl std::fmt::Display for BTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyNotFound => write!(f, "key not found in B-tree"),
        }
    }
}

impl std::error::Error for BTreeError {}
