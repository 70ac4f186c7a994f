// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node representation and identifiers.

use crate::aabb::Aabb3;

/// Sentinel for "no index" — used for `parent`, `child1`, `child2`, and the free-list link.
pub const NULL_INDEX: i32 = -1;

/// Sentinel stored in [`Node::height`] for a node that is on the free list.
pub const NULL_HEIGHT: i32 = -1;

/// A stable handle for a leaf proxy.
///
/// Numerically a node index. Valid from [`crate::Tree::create_proxy`] until the matching
/// [`crate::Tree::destroy_proxy`]. Carries no generation counter: the contract is that a
/// client never reuses a destroyed id, not that the tree detects reuse.
pub type ProxyId = i32;

/// One slot in the node pool: an internal node, a leaf, or a free node.
///
/// `parent` and `next` share a single field: while a node is in use it stores the parent
/// index (or [`NULL_INDEX`] for the root); while free it stores the next free slot. The two
/// cases are disambiguated by `height == NULL_HEIGHT`, so we keep one field rather than
/// an enum that would add a discriminant the data doesn't otherwise need.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Node {
    /// The bounding volume used throughout the hierarchy: fattened for a leaf, the
    /// union of both children for an internal node. Not the client-facing AABB; see
    /// `tight_aabb` for that.
    pub aabb: Aabb3,
    /// For a leaf, exactly the AABB the client last passed in (unfattened). Meaningless
    /// for internal and free nodes.
    pub tight_aabb: Aabb3,
    pub parent_or_next: i32,
    pub child1: i32,
    pub child2: i32,
    pub height: i32,
    pub is_leaf: bool,
    pub object_index: i32,
}

impl Node {
    pub(crate) const fn free(next: i32) -> Self {
        Self {
            aabb: Aabb3::new(glam::Vec3::ZERO, glam::Vec3::ZERO),
            tight_aabb: Aabb3::new(glam::Vec3::ZERO, glam::Vec3::ZERO),
            parent_or_next: next,
            child1: NULL_INDEX,
            child2: NULL_INDEX,
            height: NULL_HEIGHT,
            is_leaf: false,
            object_index: -1,
        }
    }

    #[inline]
    pub(crate) fn is_free(&self) -> bool {
        self.height == NULL_HEIGHT
    }
}

/// Which strategy [`crate::Tree::create_proxy`] uses to choose a sibling for a new leaf.
///
/// All six variants share the same splice + ancestor-refit machinery; they
/// differ only in how the sibling is found, and in whether a cost-reducing rotation
/// is applied while walking back up to the root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InsertionHeuristic {
    /// Exact branch-and-bound SAH, no rotation. The default.
    #[default]
    Sah,
    /// Exact branch-and-bound SAH, with cost-reducing rotation after each refit.
    SahRotate,
    /// Priority-queue SAH with unconditional child pushes (Bittner et al.), with rotation.
    Bittner,
    /// Single-descent approximate SAH (Omohundro-style), no rotation.
    ApproxSah,
    /// Single-descent approximate SAH, with rotation.
    ApproxSahRotate,
    /// Manhattan-distance descent with no cost evaluation, no rotation.
    Manhattan,
}

impl InsertionHeuristic {
    #[inline]
    pub(crate) fn rotates(self) -> bool {
        matches!(
            self,
            Self::SahRotate | Self::Bittner | Self::ApproxSahRotate
        )
    }
}
