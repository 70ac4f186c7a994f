// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Height, balance, and area diagnostics, plus the debug-only structural/metric validator.

use crate::node::NULL_INDEX;
use crate::tree::Tree;

impl Tree {
    /// Height of the root (`0` for an empty tree), read directly from the cached field.
    pub fn get_height(&self) -> i32 {
        if self.root == NULL_INDEX {
            0
        } else {
            self.nodes[self.root as usize].height
        }
    }

    /// Recompute the root's height from scratch by walking the whole tree, ignoring the
    /// cached per-node heights. Used by [`Tree::validate`] to catch stale heights.
    pub fn compute_height(&self) -> i32 {
        if self.root == NULL_INDEX {
            0
        } else {
            self.compute_height_of(self.root)
        }
    }

    fn compute_height_of(&self, index: i32) -> i32 {
        let node = &self.nodes[index as usize];
        if node.is_leaf {
            0
        } else {
            1 + self
                .compute_height_of(node.child1)
                .max(self.compute_height_of(node.child2))
        }
    }

    /// Summed surface area of every internal node except the root: `0.0` for a tree with
    /// no internal nodes besides the root (a single leaf, or empty). Leaves never
    /// contribute.
    pub fn get_area(&self) -> f64 {
        if self.root == NULL_INDEX {
            return 0.0;
        }
        let mut total = 0.0;
        for (index, node) in self.nodes.iter().enumerate() {
            if node.is_free() || node.is_leaf || index as i32 == self.root {
                continue;
            }
            total += node.aabb.area();
        }
        total
    }

    /// [`Tree::get_area`] relative to the root's own surface area: a scale-free quality
    /// score, growing with how much extra surface area the non-root internal nodes add
    /// up the tree.
    pub fn get_area_ratio(&self) -> f64 {
        if self.root == NULL_INDEX {
            return 0.0;
        }
        let root_area = self.nodes[self.root as usize].aabb.area();
        if root_area == 0.0 {
            return 0.0;
        }
        self.get_area() / root_area
    }

    /// Largest height imbalance between sibling subtrees anywhere in the tree.
    pub fn get_max_balance(&self) -> i32 {
        let mut max_balance = 0;
        for node in &self.nodes {
            if node.is_free() || node.height <= 1 {
                continue;
            }
            let balance =
                (self.nodes[node.child2 as usize].height - self.nodes[node.child1 as usize].height).abs();
            max_balance = max_balance.max(balance);
        }
        max_balance
    }

    /// Debug-only invariant check: structure (parent/child consistency, leaf shape) and
    /// metrics (cached height and AABB match a from-scratch recomputation). No-op in
    /// release builds.
    #[inline]
    pub fn validate(&self) {
        #[cfg(debug_assertions)]
        {
            if self.root != NULL_INDEX {
                self.validate_structure(self.root, NULL_INDEX);
                self.validate_metrics(self.root);
            }

            let mut free_count = 0;
            let mut index = self.free_list;
            while index != NULL_INDEX {
                debug_assert!(self.nodes[index as usize].is_free());
                free_count += 1;
                index = self.nodes[index as usize].parent_or_next;
            }
            debug_assert_eq!(self.node_count + free_count, self.node_capacity());
        }
    }

    #[cfg(debug_assertions)]
    fn validate_structure(&self, index: i32, expected_parent: i32) {
        let node = &self.nodes[index as usize];
        debug_assert_eq!(node.parent_or_next, expected_parent);

        if node.is_leaf {
            debug_assert_eq!(node.child1, NULL_INDEX);
            debug_assert_eq!(node.child2, NULL_INDEX);
            debug_assert_eq!(node.height, 0);
            return;
        }

        debug_assert_ne!(node.child1, NULL_INDEX);
        debug_assert_ne!(node.child2, NULL_INDEX);
        self.validate_structure(node.child1, index);
        self.validate_structure(node.child2, index);
    }

    #[cfg(debug_assertions)]
    fn validate_metrics(&self, index: i32) {
        let node = &self.nodes[index as usize];
        if node.is_leaf {
            return;
        }

        let (child1, child2) = (node.child1, node.child2);
        self.validate_metrics(child1);
        self.validate_metrics(child2);

        let h1 = self.nodes[child1 as usize].height;
        let h2 = self.nodes[child2 as usize].height;
        let expected_height = 1 + h1.max(h2);
        debug_assert_eq!(self.nodes[index as usize].height, expected_height);

        let expected_aabb = self.nodes[child1 as usize]
            .aabb
            .union(&self.nodes[child2 as usize].aabb);
        debug_assert!(self.nodes[index as usize].aabb.contains(&expected_aabb));
    }
}
