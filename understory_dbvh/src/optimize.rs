// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental optimiser: a rolling cursor over the node pool visits one node per call
//! and regroups its grandchildren into whichever pairing has the lowest combined area.

use crate::tree::Tree;

impl Tree {
    /// Run `iterations` rounds of the incremental optimiser.
    ///
    /// Each round visits the node-pool slot identified by a rolling cursor (`path`),
    /// then advances `path` by one, wrapping back to `0` past the pool's capacity. A
    /// round that lands on a free node, a leaf, or an internal node with `height < 2`
    /// (no grandchildren to regroup) is a no-op; otherwise it considers regrouping that
    /// node's four grandchildren. Does nothing if the tree has fewer than four leaves.
    pub fn optimize(&mut self, iterations: u32) {
        if self.root == crate::node::NULL_INDEX || self.node_count < 4 {
            return;
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "pool capacity never approaches u32::MAX"
        )]
        let capacity = self.nodes.len() as u32;

        for _ in 0..iterations {
            let index = self.path;
            self.path = (self.path + 1) % capacity;

            let node = &self.nodes[index as usize];
            if node.is_free() || node.height < 2 {
                continue;
            }
            #[expect(
                clippy::cast_possible_wrap,
                reason = "index is bounded by pool capacity, which fits in i32"
            )]
            let node_index = index as i32;
            self.regroup_grandchildren(node_index);
        }
    }

    /// Regroup the four grandchildren of `a` (through `a`'s children `b` and `c`) into
    /// whichever of the three possible pairings has the lowest summed area, if that
    /// pairing differs from the current one.
    fn regroup_grandchildren(&mut self, a: i32) {
        let (b, c) = (self.nodes[a as usize].child1, self.nodes[a as usize].child2);
        if self.nodes[b as usize].is_leaf || self.nodes[c as usize].is_leaf {
            return;
        }

        let (d, e) = (self.nodes[b as usize].child1, self.nodes[b as usize].child2);
        let (f, g) = (self.nodes[c as usize].child1, self.nodes[c as usize].child2);

        let aabb = |n: i32| self.nodes[n as usize].aabb;
        let cost_de_fg = aabb(d).union(&aabb(e)).area() + aabb(f).union(&aabb(g)).area();
        let cost_df_eg = aabb(d).union(&aabb(f)).area() + aabb(e).union(&aabb(g)).area();
        let cost_dg_ef = aabb(d).union(&aabb(g)).area() + aabb(e).union(&aabb(f)).area();

        if cost_df_eg < cost_de_fg && cost_df_eg <= cost_dg_ef {
            self.relink_grandchildren(a, b, c, d, f, e, g);
        } else if cost_dg_ef < cost_de_fg {
            self.relink_grandchildren(a, b, c, d, g, e, f);
        }
        // else: current grouping {D,E}+{F,G} is already best; leave it alone.
    }

    /// Set `b`'s children to `(b1, b2)` and `c`'s children to `(c1, c2)`, fix parent
    /// pointers, and refit `b`, `c`, and `a`.
    fn relink_grandchildren(&mut self, a: i32, b: i32, c: i32, b1: i32, b2: i32, c1: i32, c2: i32) {
        self.nodes[b as usize].child1 = b1;
        self.nodes[b as usize].child2 = b2;
        self.nodes[c as usize].child1 = c1;
        self.nodes[c as usize].child2 = c2;
        self.nodes[b1 as usize].parent_or_next = b;
        self.nodes[b2 as usize].parent_or_next = b;
        self.nodes[c1 as usize].parent_or_next = c;
        self.nodes[c2 as usize].parent_or_next = c;

        for (parent, x, y) in [(b, b1, b2), (c, c1, c2)] {
            let ax = self.nodes[x as usize].aabb;
            let ay = self.nodes[y as usize].aabb;
            let hx = self.nodes[x as usize].height;
            let hy = self.nodes[y as usize].height;
            let n = &mut self.nodes[parent as usize];
            n.aabb = ax.union(&ay);
            n.height = 1 + hx.max(hy);
        }

        let ab = self.nodes[b as usize].aabb;
        let ac = self.nodes[c as usize].aabb;
        let hb = self.nodes[b as usize].height;
        let hc = self.nodes[c as usize].height;
        let n = &mut self.nodes[a as usize];
        n.aabb = ab.union(&ac);
        n.height = 1 + hb.max(hc);
    }
}
