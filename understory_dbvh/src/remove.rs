// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf removal: sibling promotion and ancestor refit.

use crate::node::NULL_INDEX;
use crate::tree::Tree;

impl Tree {
    /// Remove `leaf` from the tree, freeing its parent and promoting its sibling.
    ///
    /// Unlike [`Tree::insert_leaf`], the ancestor walk never rotates here, only refits
    /// AABBs and heights.
    pub(crate) fn remove_leaf(&mut self, leaf: i32) {
        if leaf == self.root {
            self.root = NULL_INDEX;
            return;
        }

        let parent = self.nodes[leaf as usize].parent_or_next;
        let grandparent = self.nodes[parent as usize].parent_or_next;
        let sibling = if self.nodes[parent as usize].child1 == leaf {
            self.nodes[parent as usize].child2
        } else {
            self.nodes[parent as usize].child1
        };

        if grandparent != NULL_INDEX {
            let gp = &mut self.nodes[grandparent as usize];
            if gp.child1 == parent {
                gp.child1 = sibling;
            } else {
                gp.child2 = sibling;
            }
            self.nodes[sibling as usize].parent_or_next = grandparent;
            self.free_node(parent);

            let mut index = grandparent;
            while index != NULL_INDEX {
                let (child1, child2) = {
                    let n = &self.nodes[index as usize];
                    (n.child1, n.child2)
                };
                let h1 = self.nodes[child1 as usize].height;
                let h2 = self.nodes[child2 as usize].height;
                let aabb1 = self.nodes[child1 as usize].aabb;
                let aabb2 = self.nodes[child2 as usize].aabb;

                let n = &mut self.nodes[index as usize];
                n.height = 1 + h1.max(h2);
                n.aabb = aabb1.union(&aabb2);

                index = self.nodes[index as usize].parent_or_next;
            }
        } else {
            self.root = sibling;
            self.nodes[sibling as usize].parent_or_next = NULL_INDEX;
            self.free_node(parent);
        }
    }
}
