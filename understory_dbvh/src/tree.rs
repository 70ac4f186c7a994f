// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree façade: construction, proxy lifecycle, and shared node access.

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;

use crate::aabb::Aabb3;
use crate::node::{InsertionHeuristic, Node, ProxyId, NULL_HEIGHT, NULL_INDEX};

/// Fattening margin applied to every proxy AABB on insertion, so that small motions
/// don't force a re-insertion.
pub(crate) const AABB_EXTENSION: f32 = 0.1;

/// Multiplier applied to the predicted displacement in [`Tree::move_proxy`].
pub(crate) const AABB_MULTIPLIER: f32 = 4.0;

/// Number of split-plane bins used by [`crate::Tree::build_top_down_sah`].
pub(crate) const BIN_COUNT: usize = 64;

/// A candidate considered during exact-SAH / Bittner sibling search.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HeapCandidate {
    pub index: i32,
    pub inherited_cost: f64,
}

/// A dynamic bounding volume hierarchy over 3-D AABBs.
///
/// Owns the node pool exclusively: all indices into [`Tree`] are stable for the lifetime
/// of the node (pool growth copies existing nodes rather than re-linking them). See the
/// crate-level docs for the full invariant list; [`Tree::validate`] checks them at runtime
/// in debug builds.
pub struct Tree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: i32,
    pub(crate) node_count: i32,
    pub(crate) free_list: i32,
    pub(crate) proxy_count: i32,
    pub(crate) insertion_count: u64,
    pub(crate) path: u32,
    pub(crate) heuristic: InsertionHeuristic,
    pub(crate) heap: BinaryHeap<HeapCandidate>,
    pub(crate) max_heap_count: usize,
    pub(crate) count_bf: u64,
    pub(crate) count_bg: u64,
    pub(crate) count_cd: u64,
    pub(crate) count_ce: u64,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("node_count", &self.node_count)
            .field("node_capacity", &self.nodes.len())
            .field("proxy_count", &self.proxy_count)
            .field("heuristic", &self.heuristic)
            .finish_non_exhaustive()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Default initial node-pool capacity.
    pub const DEFAULT_CAPACITY: usize = 16;

    /// Create an empty tree with the default heuristic (exact SAH, no rotation) and the
    /// default initial capacity.
    pub fn new() -> Self {
        Self::with_heuristic(InsertionHeuristic::default())
    }

    /// Create an empty tree using a specific insertion heuristic.
    pub fn with_heuristic(heuristic: InsertionHeuristic) -> Self {
        let mut nodes = Vec::with_capacity(Self::DEFAULT_CAPACITY);
        for i in 0..Self::DEFAULT_CAPACITY {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "DEFAULT_CAPACITY is a small compile-time constant"
            )]
            let next = if i + 1 == Self::DEFAULT_CAPACITY {
                NULL_INDEX
            } else {
                (i + 1) as i32
            };
            nodes.push(Node::free(next));
        }
        Self {
            nodes,
            root: NULL_INDEX,
            node_count: 0,
            free_list: 0,
            proxy_count: 0,
            insertion_count: 0,
            path: 0,
            heuristic,
            heap: BinaryHeap::new(),
            max_heap_count: 0,
            count_bf: 0,
            count_bg: 0,
            count_cd: 0,
            count_ce: 0,
        }
    }

    /// Change the insertion heuristic used by future [`Tree::create_proxy`]/[`Tree::move_proxy`] calls.
    ///
    /// Does not affect the shape of the existing tree.
    pub fn set_heuristic(&mut self, heuristic: InsertionHeuristic) {
        self.heuristic = heuristic;
    }

    /// The currently active insertion heuristic.
    pub fn heuristic(&self) -> InsertionHeuristic {
        self.heuristic
    }

    /// Number of live proxies (leaves) in the tree.
    pub fn proxy_count(&self) -> i32 {
        self.proxy_count
    }

    /// Node-pool capacity (in-use + free slots).
    pub fn node_capacity(&self) -> i32 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "pool capacity never approaches i32::MAX"
        )]
        let cap = self.nodes.len() as i32;
        cap
    }

    /// Number of in-use nodes (leaves + internals).
    pub fn node_count(&self) -> i32 {
        self.node_count
    }

    /// Number of insertions performed over the lifetime of this tree.
    pub fn insertion_count(&self) -> u64 {
        self.insertion_count
    }

    /// High-water mark of the reusable SAH priority-queue scratch buffer.
    pub fn max_heap_count(&self) -> usize {
        self.max_heap_count
    }

    /// Per-rotation diagnostic counters: `(bf, bg, cd, ce)`.
    pub fn rotation_counts(&self) -> (u64, u64, u64, u64) {
        (self.count_bf, self.count_bg, self.count_cd, self.count_ce)
    }

    /// Create a proxy for `aabb` carrying `object_index`. The hierarchy stores a fattened
    /// copy of `aabb` internally (by [`AABB_EXTENSION`]) for its own sibling search and
    /// refit, but [`Tree::get_aabb`] always returns `aabb` itself.
    ///
    /// `object_index` is an opaque client identifier, not interpreted by the tree.
    pub fn create_proxy(&mut self, aabb: Aabb3, object_index: i32) -> ProxyId {
        let proxy_id = self.allocate_node();
        let node = &mut self.nodes[proxy_id as usize];
        node.tight_aabb = aabb;
        node.aabb = aabb.fattened(AABB_EXTENSION);
        node.object_index = object_index;
        node.height = 0;
        node.is_leaf = true;
        self.insert_leaf(proxy_id);
        self.proxy_count += 1;
        proxy_id
    }

    /// Destroy a proxy. `proxy_id` must refer to a live leaf.
    pub fn destroy_proxy(&mut self, proxy_id: ProxyId) {
        debug_assert!(self.is_live_leaf(proxy_id), "destroy_proxy: not a live leaf");
        self.remove_leaf(proxy_id);
        self.free_node(proxy_id);
        self.proxy_count -= 1;
    }

    /// The exact client AABB last passed to [`Tree::create_proxy`] or [`Tree::move_proxy`]
    /// for this proxy (not the fattened copy the hierarchy uses internally).
    pub fn get_aabb(&self, proxy_id: ProxyId) -> Aabb3 {
        debug_assert!(self.is_live_leaf(proxy_id), "get_aabb: not a live leaf");
        self.nodes[proxy_id as usize].tight_aabb
    }

    /// The opaque client identifier passed to [`Tree::create_proxy`].
    pub fn get_object_index(&self, proxy_id: ProxyId) -> i32 {
        debug_assert!(
            self.is_live_leaf(proxy_id),
            "get_object_index: not a live leaf"
        );
        self.nodes[proxy_id as usize].object_index
    }

    /// Move a proxy to a tight AABB, predicting displacement to avoid re-insertion on
    /// small motions.
    ///
    /// Returns `true` if the proxy was actually removed and re-inserted.
    pub fn move_proxy(&mut self, proxy_id: ProxyId, aabb: Aabb3, displacement: glam::Vec3) -> bool {
        debug_assert!(self.is_live_leaf(proxy_id), "move_proxy: not a live leaf");

        if self.nodes[proxy_id as usize].aabb.contains(&aabb) {
            self.nodes[proxy_id as usize].tight_aabb = aabb;
            return false;
        }

        self.remove_leaf(proxy_id);

        self.nodes[proxy_id as usize].tight_aabb = aabb;
        let mut fat = aabb.fattened(AABB_EXTENSION);
        let d = AABB_MULTIPLIER * displacement;
        if d.x < 0.0 {
            fat.lower.x += d.x;
        } else {
            fat.upper.x += d.x;
        }
        if d.y < 0.0 {
            fat.lower.y += d.y;
        } else {
            fat.upper.y += d.y;
        }
        if d.z < 0.0 {
            fat.lower.z += d.z;
        } else {
            fat.upper.z += d.z;
        }

        self.nodes[proxy_id as usize].aabb = fat;
        self.insert_leaf(proxy_id);
        true
    }

    /// Empty the tree. Capacity is preserved; the free list is rebuilt over every slot.
    pub fn clear(&mut self) {
        let capacity = self.nodes.len();
        self.nodes.clear();
        for i in 0..capacity {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "pool capacity never approaches i32::MAX"
            )]
            let next = if i + 1 == capacity {
                NULL_INDEX
            } else {
                (i + 1) as i32
            };
            self.nodes.push(Node::free(next));
        }
        self.root = NULL_INDEX;
        self.node_count = 0;
        self.free_list = 0;
        self.proxy_count = 0;
    }

    /// The proxy or internal-node index currently at the root, or `None` for an empty
    /// tree. When the tree holds exactly one proxy, this is that proxy's id.
    pub fn root(&self) -> Option<ProxyId> {
        if self.root == NULL_INDEX {
            None
        } else {
            Some(self.root)
        }
    }

    /// Root node index, or [`NULL_INDEX`] for an empty tree.
    pub(crate) fn root_index(&self) -> i32 {
        self.root
    }

    pub(crate) fn is_live_leaf(&self, id: ProxyId) -> bool {
        id >= 0
            && (id as usize) < self.nodes.len()
            && !self.nodes[id as usize].is_free()
            && self.nodes[id as usize].is_leaf
    }

    pub(crate) fn is_leaf(&self, index: i32) -> bool {
        self.nodes[index as usize].is_leaf
    }

    pub(crate) fn height_of(&self, index: i32) -> i32 {
        if index == NULL_INDEX {
            NULL_HEIGHT
        } else {
            self.nodes[index as usize].height
        }
    }
}
