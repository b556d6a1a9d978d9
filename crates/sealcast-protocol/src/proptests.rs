//! Property-based tests for the protocol.
//!
//! These tests verify the scheme's invariants hold for arbitrary
//! populations and revocation patterns:
//!
//! - The cover's leaf descendants exactly partition the valid set
//! - The cover is always an antichain (no ancestor pairs)
//! - Sealed streams round-trip for every valid device
//! - Revoked devices always fail with `KeyNotFound`

use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::broadcast::BroadcastCodec;
use crate::error::ProtocolError;
use crate::revocation::RevocationRegistry;
use crate::tree::{KeyTree, NodeId, ROOT};

/// All leaves beneath a node, by walking down the subtree.
fn leaf_descendants(registry: &RevocationRegistry, node: NodeId) -> BTreeSet<NodeId> {
    let tree = registry.tree();
    let mut leaves = BTreeSet::new();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        if tree.is_leaf(n) {
            leaves.insert(n);
        } else {
            stack.push(2 * n);
            stack.push(2 * n + 1);
        }
    }
    leaves
}

fn is_ancestor(ancestor: NodeId, node: NodeId) -> bool {
    ancestor != node && KeyTree::path_to_root(node).contains(&ancestor)
}

/// A registry with `leaf_count` devices and the given leaves revoked
/// (indices are taken modulo the leaf range).
fn registry_with_revocations(leaf_count: usize, revoke_picks: &[u8]) -> RevocationRegistry {
    let mut registry = RevocationRegistry::new(leaf_count).unwrap();
    let first = registry.tree().first_leaf();
    let span = registry.tree().leaves().count() as u64;
    for &pick in revoke_picks {
        registry.revoke(first + u64::from(pick) % span);
    }
    registry
}

// ==================== Cover Property Tests ====================

proptest! {
    /// The cover's leaf descendants are exactly the valid leaves.
    #[test]
    fn cover_partitions_valid_set(
        leaf_count in 1usize..33,
        revoke_picks in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let registry = registry_with_revocations(leaf_count, &revoke_picks);

        let mut covered = BTreeSet::new();
        for &node in registry.cover() {
            let leaves = leaf_descendants(&registry, node);
            // Exact partition: no leaf is covered twice
            prop_assert!(covered.is_disjoint(&leaves));
            covered.extend(leaves);
        }

        prop_assert_eq!(&covered, registry.valid_devices());
    }

    /// No cover node is an ancestor of another.
    #[test]
    fn cover_is_an_antichain(
        leaf_count in 1usize..33,
        revoke_picks in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let registry = registry_with_revocations(leaf_count, &revoke_picks);
        let cover = registry.cover();

        for &a in cover {
            for &b in cover {
                prop_assert!(!is_ancestor(a, b));
            }
        }
    }

    /// Revoking nothing leaves the root as the whole cover.
    #[test]
    fn empty_revocation_covers_with_root(leaf_count in 1usize..65) {
        let registry = RevocationRegistry::new(leaf_count).unwrap();
        prop_assert_eq!(registry.cover(), &[ROOT]);
    }

    /// A second revocation of the same leaf reports failure and leaves
    /// the cover untouched.
    #[test]
    fn revoke_is_idempotent(
        leaf_count in 1usize..33,
        pick in any::<u8>(),
    ) {
        let mut registry = RevocationRegistry::new(leaf_count).unwrap();
        let first = registry.tree().first_leaf();
        let span = registry.tree().leaves().count() as u64;
        let leaf = first + u64::from(pick) % span;

        prop_assert!(registry.revoke(leaf));
        let cover = registry.cover().to_vec();

        prop_assert!(!registry.revoke(leaf));
        prop_assert_eq!(registry.cover(), cover.as_slice());
    }
}

// ==================== Codec Property Tests ====================

proptest! {
    /// Sealed streams round-trip for every device that is still valid,
    /// and fail with `KeyNotFound` for every revoked device.
    #[test]
    fn seal_open_respects_revocation(
        leaf_count in 1usize..17,
        revoke_picks in prop::collection::vec(any::<u8>(), 0..8),
        message in prop::collection::vec(any::<u8>(), 0..96),
    ) {
        let registry = registry_with_revocations(leaf_count, &revoke_picks);
        let stream = BroadcastCodec::encrypt(&registry, &message).unwrap();

        for leaf in registry.tree().leaves() {
            let result = BroadcastCodec::decrypt(&registry, leaf, &stream);
            if registry.is_revoked(leaf) {
                prop_assert!(matches!(result, Err(ProtocolError::KeyNotFound)));
            } else {
                prop_assert_eq!(result.unwrap(), message.clone());
            }
        }
    }

    /// The separator always sits at the stride boundary implied by the
    /// cover size, with one key block per cover node before it.
    #[test]
    fn stream_layout_matches_cover(
        leaf_count in 1usize..17,
        revoke_picks in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        use crate::limits::{KEY_BLOCK_SIZE, KEY_SEPARATOR};

        let registry = registry_with_revocations(leaf_count, &revoke_picks);
        let stream = BroadcastCodec::encrypt(&registry, b"layout probe").unwrap();

        let boundary = registry.cover().len() * KEY_BLOCK_SIZE;
        prop_assert_eq!(
            &stream[boundary..boundary + KEY_SEPARATOR.len()],
            &KEY_SEPARATOR[..]
        );
    }
}
