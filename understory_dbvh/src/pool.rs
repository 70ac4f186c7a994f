// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node pool: free-list allocation with amortised doubling growth.

use crate::node::{Node, NULL_HEIGHT, NULL_INDEX};
use crate::tree::Tree;

impl Tree {
    /// Pop a node off the free list, growing the pool first if it is empty.
    pub(crate) fn allocate_node(&mut self) -> i32 {
        if self.free_list == NULL_INDEX {
            self.grow_pool();
        }

        let node_id = self.free_list;
        let node = &mut self.nodes[node_id as usize];
        self.free_list = node.parent_or_next;
        node.parent_or_next = NULL_INDEX;
        node.child1 = NULL_INDEX;
        node.child2 = NULL_INDEX;
        node.height = 0;
        node.is_leaf = false;
        node.object_index = -1;
        self.node_count += 1;
        node_id
    }

    /// Return a node to the pool. The node must currently be in use.
    pub(crate) fn free_node(&mut self, node_id: i32) {
        debug_assert!(node_id >= 0 && (node_id as usize) < self.nodes.len());
        debug_assert!(self.node_count > 0);
        debug_assert!(
            !self.nodes[node_id as usize].is_free(),
            "double free of node {node_id}"
        );
        let node = &mut self.nodes[node_id as usize];
        node.parent_or_next = self.free_list;
        node.height = NULL_HEIGHT;
        node.is_leaf = false;
        self.free_list = node_id;
        self.node_count -= 1;
    }

    /// Double the pool's capacity, copying existing nodes and chaining fresh slots onto
    /// a new free list.
    pub(crate) fn grow_pool(&mut self) {
        debug_assert_eq!(self.node_count as usize, self.nodes.len());
        let old_capacity = self.nodes.len();
        let new_capacity = if old_capacity == 0 {
            Tree::DEFAULT_CAPACITY
        } else {
            old_capacity * 2
        };
        self.nodes.reserve(new_capacity - old_capacity);
        for i in old_capacity..new_capacity {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "pool capacity never approaches i32::MAX"
            )]
            let next = if i + 1 == new_capacity {
                NULL_INDEX
            } else {
                (i + 1) as i32
            };
            self.nodes.push(Node::free(next));
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "pool capacity never approaches i32::MAX"
        )]
        let head = old_capacity as i32;
        self.free_list = head;
    }
}
