//! Device revocation and cover maintenance.
//!
//! Tracks which leaves of the key tree are still trusted and maintains the
//! minimal complete-subtree cover of the trusted set. The cover is the set
//! of node ids whose subtrees exactly partition the non-revoked leaves;
//! the codec encrypts one content-key block per cover node.
//!
//! ## Invariants
//!
//! - **Disjoint sets**: every leaf is in exactly one of `valid`, `revoked`.
//! - **Exact partition**: the leaf descendants of the cover nodes are
//!   exactly the valid leaves.
//! - **Antichain**: no cover node is an ancestor of another.
//! - **Eager recomputation**: the cover is rebuilt in full on every
//!   successful revocation, never patched incrementally, so readers always
//!   observe a consistent value.
//! - **Full commit or no-op**: a rejected revocation leaves no trace.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::tree::{KeyTree, NodeId, ROOT};

/// Revocation state and cover for one key tree.
///
/// Owns the tree; a single caller-held handle mutates it. Revocation is
/// irreversible: a leaf never moves back to the valid set.
pub struct RevocationRegistry {
    tree: KeyTree,
    valid: BTreeSet<NodeId>,
    revoked: BTreeSet<NodeId>,
    cover: Vec<NodeId>,
}

impl RevocationRegistry {
    /// Create a registry over a fresh tree with `leaf_count` devices.
    ///
    /// All leaves start valid, so the initial cover is the root alone.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidTreeSize` if `leaf_count` is zero.
    pub fn new(leaf_count: usize) -> Result<Self> {
        let tree = KeyTree::new(leaf_count)?;
        let valid: BTreeSet<NodeId> = tree.leaves().collect();

        let mut registry = Self {
            tree,
            valid,
            revoked: BTreeSet::new(),
            cover: Vec::new(),
        };
        registry.cover = registry.compute_cover();
        Ok(registry)
    }

    /// Revoke a device leaf.
    ///
    /// Moves the leaf from the valid set to the revoked set and rebuilds
    /// the cover. Returns `false` without side effects if `leaf` is not a
    /// currently-valid leaf of this tree (already revoked, an internal
    /// node, or out of range).
    ///
    /// # Example
    ///
    /// ```
    /// use sealcast_protocol::RevocationRegistry;
    ///
    /// let mut registry = RevocationRegistry::new(8).unwrap();
    /// assert!(registry.revoke(8));
    /// assert!(!registry.revoke(8)); // second call is a no-op
    /// assert_eq!(registry.cover(), &[3, 5, 9]);
    /// ```
    pub fn revoke(&mut self, leaf: NodeId) -> bool {
        if !self.valid.remove(&leaf) {
            return false;
        }
        self.revoked.insert(leaf);
        self.cover = self.compute_cover();
        true
    }

    /// The current cover, sorted ascending by node id.
    pub fn cover(&self) -> &[NodeId] {
        &self.cover
    }

    /// Leaves that have not been revoked.
    pub fn valid_devices(&self) -> &BTreeSet<NodeId> {
        &self.valid
    }

    /// Leaves that have been revoked.
    pub fn revoked_devices(&self) -> &BTreeSet<NodeId> {
        &self.revoked
    }

    /// Whether a leaf has been revoked.
    pub fn is_revoked(&self, leaf: NodeId) -> bool {
        self.revoked.contains(&leaf)
    }

    /// The underlying key tree.
    pub fn tree(&self) -> &KeyTree {
        &self.tree
    }

    /// Compute the complete-subtree cover of the valid set.
    ///
    /// With nothing revoked the cover is the root alone. Otherwise every
    /// node on a revoked leaf's path to the root is tainted, and the cover
    /// is the set of untainted siblings of tainted nodes: each such
    /// sibling roots a maximal subtree containing no revoked leaf. The
    /// sibling of a tainted node that is itself tainted must be skipped,
    /// or subtrees holding revoked leaves would be covered again.
    fn compute_cover(&self) -> Vec<NodeId> {
        if self.revoked.is_empty() {
            return vec![ROOT];
        }

        let mut tainted: BTreeSet<NodeId> = BTreeSet::new();
        for &leaf in &self.revoked {
            tainted.extend(KeyTree::path_to_root(leaf));
        }

        let mut cover = Vec::new();
        for &node in tainted.iter().filter(|&&node| node != ROOT) {
            let sibling = KeyTree::sibling(node);
            if !tainted.contains(&sibling) {
                cover.push(sibling);
            }
        }
        // Ascending id order is load-bearing: it fixes the key-block order
        // on the wire.
        cover.sort_unstable();
        cover
    }
}

impl std::fmt::Debug for RevocationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationRegistry")
            .field("tree", &self.tree)
            .field("valid", &self.valid.len())
            .field("revoked", &self.revoked.len())
            .field("cover", &self.cover)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_cover_is_root() {
        let registry = RevocationRegistry::new(8).unwrap();

        assert_eq!(registry.cover(), &[ROOT]);
        assert_eq!(registry.valid_devices().len(), 8);
        assert!(registry.revoked_devices().is_empty());
    }

    #[test]
    fn test_revoke_single_leaf() {
        let mut registry = RevocationRegistry::new(8).unwrap();

        assert!(registry.revoke(8));
        // Siblings along 8's path: 9 (of 8), 5 (of 4), 3 (of 2)
        assert_eq!(registry.cover(), &[3, 5, 9]);
    }

    #[test]
    fn test_revoke_sibling_pair() {
        let mut registry = RevocationRegistry::new(8).unwrap();

        assert!(registry.revoke(8));
        assert!(registry.revoke(9));
        // Node 9 is on a revoked path now, so only the untainted siblings
        // 5 and 3 remain
        assert_eq!(registry.cover(), &[3, 5]);
    }

    #[test]
    fn test_revoke_leaves_in_different_subtrees() {
        let mut registry = RevocationRegistry::new(8).unwrap();

        assert!(registry.revoke(8));
        assert!(registry.revoke(10));
        // Nodes 4 and 5 are both tainted; neither may re-enter the cover
        assert_eq!(registry.cover(), &[3, 9, 11]);
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let mut registry = RevocationRegistry::new(8).unwrap();

        assert!(registry.revoke(12));
        let cover = registry.cover().to_vec();

        assert!(!registry.revoke(12));
        assert_eq!(registry.cover(), cover.as_slice());
        assert_eq!(registry.revoked_devices().len(), 1);
    }

    #[test]
    fn test_revoke_rejects_non_leaves() {
        let mut registry = RevocationRegistry::new(8).unwrap();

        assert!(!registry.revoke(ROOT));
        assert!(!registry.revoke(4)); // internal node
        assert!(!registry.revoke(16)); // out of range
        assert_eq!(registry.cover(), &[ROOT]);
    }

    #[test]
    fn test_revoke_all_leaves_empties_cover() {
        let mut registry = RevocationRegistry::new(4).unwrap();

        for leaf in 4..=7 {
            assert!(registry.revoke(leaf));
        }
        assert!(registry.cover().is_empty());
        assert!(registry.valid_devices().is_empty());
    }

    #[test]
    fn test_sets_stay_disjoint() {
        let mut registry = RevocationRegistry::new(8).unwrap();
        registry.revoke(9);
        registry.revoke(14);

        let valid = registry.valid_devices();
        let revoked = registry.revoked_devices();

        assert_eq!(valid.len() + revoked.len(), 8);
        assert!(valid.intersection(revoked).next().is_none());
    }

    #[test]
    fn test_cover_is_sorted_and_unique() {
        let mut registry = RevocationRegistry::new(8).unwrap();
        registry.revoke(8);
        registry.revoke(13);

        let cover = registry.cover();
        assert!(cover.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_single_leaf_tree_revocation() {
        let mut registry = RevocationRegistry::new(1).unwrap();

        assert_eq!(registry.cover(), &[ROOT]);
        assert!(registry.revoke(ROOT)); // the root is the only leaf
        assert!(registry.cover().is_empty());
    }
}
