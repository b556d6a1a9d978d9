//! Complete binary key tree.
//!
//! An indexed complete binary tree holding one independently generated
//! random key per node. Node ids follow standard 1-indexed heap numbering:
//! the root is 1, the children of node `i` are `2i` and `2i + 1`, and the
//! leaves occupy the contiguous id range `[2^levels, 2^(levels+1) - 1]`.
//!
//! The tree is a pure key store: all keys are generated at construction
//! and never rotate. Navigation (`parent`, `sibling`, `path_to_root`) is
//! integer arithmetic with no per-tree state.

use std::ops::RangeInclusive;

use sealcast_crypto::SymmetricKey;

use crate::error::{ProtocolError, Result};

/// Identifier of a tree node.
pub type NodeId = u64;

/// Id of the root node.
pub const ROOT: NodeId = 1;

/// A complete binary tree with one random key per node.
pub struct KeyTree {
    leaf_count: usize,
    levels: u32,
    first_leaf: NodeId,
    last_leaf: NodeId,
    keys: Vec<SymmetricKey>,
}

impl KeyTree {
    /// Build a tree sized for `leaf_count` devices.
    ///
    /// The leaf level is rounded up to the next power of two, so some
    /// leaves may not be assigned to a device. One key is generated per
    /// node id in `[1, last_leaf]`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidTreeSize` if `leaf_count` is zero.
    pub fn new(leaf_count: usize) -> Result<Self> {
        if leaf_count == 0 {
            return Err(ProtocolError::InvalidTreeSize { actual: leaf_count });
        }

        let levels = leaf_count.next_power_of_two().trailing_zeros();
        let first_leaf: NodeId = 1 << levels;
        let last_leaf: NodeId = (1 << (levels + 1)) - 1;
        let keys = (ROOT..=last_leaf).map(|_| SymmetricKey::generate()).collect();

        Ok(Self {
            leaf_count,
            levels,
            first_leaf,
            last_leaf,
            keys,
        })
    }

    /// Number of devices this tree was sized for.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of levels below the root.
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Total number of levels, root included.
    pub fn depth(&self) -> u32 {
        self.levels + 1
    }

    /// Id of the first leaf.
    pub fn first_leaf(&self) -> NodeId {
        self.first_leaf
    }

    /// Id of the last leaf.
    pub fn last_leaf(&self) -> NodeId {
        self.last_leaf
    }

    /// Parent of a node. Degenerate for the root (callers never ask).
    pub fn parent(id: NodeId) -> NodeId {
        id / 2
    }

    /// Sibling of a node: the other child of its parent.
    pub fn sibling(id: NodeId) -> NodeId {
        if id % 2 == 0 {
            id + 1
        } else {
            id - 1
        }
    }

    /// Path from a node up to the root, both endpoints included.
    ///
    /// Defined for any node id `>= 1`, internal nodes and the root itself
    /// included; `path_to_root(1)` is `[1]`.
    pub fn path_to_root(id: NodeId) -> Vec<NodeId> {
        debug_assert!(id >= ROOT);

        let mut path = vec![id];
        let mut node = id;
        while node != ROOT {
            node = Self::parent(node);
            path.push(node);
        }
        path
    }

    /// The contiguous id range of all leaves.
    pub fn leaves(&self) -> RangeInclusive<NodeId> {
        self.first_leaf..=self.last_leaf
    }

    /// Whether `id` names a node of this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        (ROOT..=self.last_leaf).contains(&id)
    }

    /// Whether `id` names a leaf of this tree.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.leaves().contains(&id)
    }

    /// The key stored at a node.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::UnknownNode` for ids outside `[1, last_leaf]`.
    pub fn key(&self, id: NodeId) -> Result<&SymmetricKey> {
        if !self.contains(id) {
            return Err(ProtocolError::UnknownNode { id });
        }
        Ok(&self.keys[(id - 1) as usize])
    }

    /// Map a 1-based device id onto its leaf id.
    ///
    /// Devices occupy the first `leaf_count` leaves in order, so device
    /// `d` sits at leaf `d + 2^levels - 1`. Returns `None` for device ids
    /// outside `[1, leaf_count]`.
    pub fn leaf_for_device(&self, device_id: u64) -> Option<NodeId> {
        if device_id == 0 || device_id > self.leaf_count as u64 {
            return None;
        }
        Some(self.first_leaf + device_id - 1)
    }
}

impl std::fmt::Debug for KeyTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyTree")
            .field("leaf_count", &self.leaf_count)
            .field("levels", &self.levels)
            .field("first_leaf", &self.first_leaf)
            .field("last_leaf", &self.last_leaf)
            .finish()
    }
}
