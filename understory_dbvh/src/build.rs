// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bulk construction: bottom-up agglomerative rebuild, and two top-down builders
//! (binned SAH and median split) that build a fresh tree directly from a batch of AABBs.

use alloc::vec::Vec;

use crate::aabb::Aabb3;
use crate::node::NULL_INDEX;
use crate::tree::{Tree, BIN_COUNT};

impl Tree {
    /// Rebuild the tree from scratch over its current set of live leaves, agglomerating
    /// the globally cheapest pair at each step (O(n^2)).
    ///
    /// Internal nodes are freed and re-allocated; leaf node indices (and therefore
    /// [`crate::ProxyId`] values already handed to clients) are preserved.
    pub fn rebuild_bottom_up(&mut self) {
        let mut leaves: Vec<i32> = Vec::with_capacity(self.proxy_count as usize);
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.is_free() && node.is_leaf {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "node pool never approaches i32::MAX"
                )]
                leaves.push(i as i32);
            }
        }

        if leaves.is_empty() {
            self.root = NULL_INDEX;
            return;
        }
        if leaves.len() == 1 {
            self.root = leaves[0];
            self.nodes[leaves[0] as usize].parent_or_next = NULL_INDEX;
            return;
        }

        let mut nodes_to_free = Vec::new();
        // Free every internal node currently reachable from the root before re-linking;
        // the new agglomeration allocates fresh internal nodes as it merges pairs.
        if self.root != NULL_INDEX {
            collect_internal_nodes(&self.nodes, self.root, &mut nodes_to_free);
        }
        for index in nodes_to_free {
            self.free_node(index);
        }

        let mut active = leaves;
        while active.len() > 1 {
            let n = active.len();
            let mut best = (0usize, 1usize, f64::MAX);
            for i in 0..n {
                for j in (i + 1)..n {
                    let cost = self.nodes[active[i] as usize]
                        .aabb
                        .union(&self.nodes[active[j] as usize].aabb)
                        .area();
                    if cost < best.2 {
                        best = (i, j, cost);
                    }
                }
            }

            let (i, j, _) = best;
            let b = active[i];
            let c = active[j];
            let parent = self.allocate_node();
            let aabb_b = self.nodes[b as usize].aabb;
            let aabb_c = self.nodes[c as usize].aabb;
            let h_b = self.nodes[b as usize].height;
            let h_c = self.nodes[c as usize].height;
            {
                let p = &mut self.nodes[parent as usize];
                p.child1 = b;
                p.child2 = c;
                p.aabb = aabb_b.union(&aabb_c);
                p.height = 1 + h_b.max(h_c);
                p.parent_or_next = NULL_INDEX;
            }
            self.nodes[b as usize].parent_or_next = parent;
            self.nodes[c as usize].parent_or_next = parent;

            // Remove j first (higher index) so i's slot is unaffected.
            active.swap_remove(j);
            active.swap_remove(i);
            active.push(parent);
        }

        self.root = active[0];
    }

    /// Build a fresh tree from `boxes_in`/`object_indices` using top-down binned SAH
    /// partitioning.
    ///
    /// `proxies_out[k]` receives the [`crate::ProxyId`] assigned to `boxes_in[k]`. The
    /// tree must be empty on entry; the pool is pre-sized to `2n - 1` nodes.
    pub fn build_top_down_sah(
        &mut self,
        proxies_out: &mut [i32],
        boxes_in: &[Aabb3],
        object_indices: &[i32],
    ) {
        debug_assert_eq!(boxes_in.len(), proxies_out.len());
        debug_assert_eq!(boxes_in.len(), object_indices.len());
        self.clear();
        let n = boxes_in.len();
        if n == 0 {
            return;
        }
        self.reserve_capacity(2 * n - 1);

        let mut leaves: Vec<i32> = Vec::with_capacity(n);
        for k in 0..n {
            let id = self.allocate_node();
            let node = &mut self.nodes[id as usize];
            node.tight_aabb = boxes_in[k];
            node.aabb = boxes_in[k];
            node.object_index = object_indices[k];
            node.is_leaf = true;
            node.height = 0;
            leaves.push(id);
            proxies_out[k] = id;
        }
        self.proxy_count = n as i32;

        self.root = self.build_sah_recursive(&mut leaves);
        self.nodes[self.root as usize].parent_or_next = NULL_INDEX;
    }

    /// Build a fresh tree from `boxes_in`/`object_indices` by recursively splitting on
    /// the median centroid along the axis of greatest extent.
    pub fn build_top_down_median(
        &mut self,
        proxies_out: &mut [i32],
        boxes_in: &[Aabb3],
        object_indices: &[i32],
    ) {
        debug_assert_eq!(boxes_in.len(), proxies_out.len());
        debug_assert_eq!(boxes_in.len(), object_indices.len());
        self.clear();
        let n = boxes_in.len();
        if n == 0 {
            return;
        }
        self.reserve_capacity(2 * n - 1);

        let mut leaves: Vec<i32> = Vec::with_capacity(n);
        for k in 0..n {
            let id = self.allocate_node();
            let node = &mut self.nodes[id as usize];
            node.tight_aabb = boxes_in[k];
            node.aabb = boxes_in[k];
            node.object_index = object_indices[k];
            node.is_leaf = true;
            node.height = 0;
            leaves.push(id);
            proxies_out[k] = id;
        }
        self.proxy_count = n as i32;

        self.root = self.build_median_recursive(&mut leaves);
        self.nodes[self.root as usize].parent_or_next = NULL_INDEX;
    }

    fn reserve_capacity(&mut self, capacity: usize) {
        while self.nodes.len() < capacity {
            self.grow_pool();
        }
    }

    fn build_sah_recursive(&mut self, leaf_ids: &mut [i32]) -> i32 {
        if leaf_ids.len() == 1 {
            return leaf_ids[0];
        }

        let split = self.binned_sah_split(leaf_ids);
        let (left, right) = leaf_ids.split_at_mut(split.max(1).min(leaf_ids.len() - 1));

        let left_root = self.build_sah_recursive(left);
        let right_root = self.build_sah_recursive(right);
        self.join(left_root, right_root)
    }

    fn build_median_recursive(&mut self, leaf_ids: &mut [i32]) -> i32 {
        if leaf_ids.len() == 1 {
            return leaf_ids[0];
        }

        let axis = self.greatest_centroid_extent_axis(leaf_ids);
        let mid = leaf_ids.len() / 2;
        leaf_ids.select_nth_unstable_by(mid, |&a, &b| {
            let ca = self.nodes[a as usize].aabb.centre();
            let cb = self.nodes[b as usize].aabb.centre();
            ca[axis].total_cmp(&cb[axis])
        });

        let (left, right) = leaf_ids.split_at_mut(mid);
        let left_root = self.build_median_recursive(left);
        let right_root = self.build_median_recursive(right);
        self.join(left_root, right_root)
    }

    fn greatest_centroid_extent_axis(&self, leaf_ids: &[i32]) -> usize {
        let mut lo = self.nodes[leaf_ids[0] as usize].aabb.centre();
        let mut hi = lo;
        for &id in &leaf_ids[1..] {
            let c = self.nodes[id as usize].aabb.centre();
            lo = lo.min(c);
            hi = hi.max(c);
        }
        let extent = hi - lo;
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }

    /// Partition `leaf_ids` in place by binning centroids along the dominant axis into
    /// [`BIN_COUNT`] buckets and choosing the bucket boundary with lowest SAH cost.
    /// Returns the split point (number of items that belong on the left).
    fn binned_sah_split(&self, leaf_ids: &mut [i32]) -> usize {
        let axis = self.greatest_centroid_extent_axis(leaf_ids);

        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &id in leaf_ids.iter() {
            let c = self.nodes[id as usize].aabb.centre()[axis];
            lo = lo.min(c);
            hi = hi.max(c);
        }
        let extent = hi - lo;
        if extent <= 0.0 {
            // Degenerate: every centroid coincides on this axis. Force one leaf to the
            // empty side rather than falling back to an even split (that's the median
            // builder's policy, not this one's).
            return 1;
        }

        #[expect(clippy::cast_precision_loss, reason = "BIN_COUNT is a small constant")]
        let bin_count_f = BIN_COUNT as f32;
        let bin_of = |c: f32| -> usize {
            let t = ((c - lo) / extent * bin_count_f) as usize;
            t.min(BIN_COUNT - 1)
        };

        let mut bin_aabb: Vec<Option<Aabb3>> = alloc::vec![None; BIN_COUNT];
        let mut bin_count: Vec<u32> = alloc::vec![0; BIN_COUNT];
        for &id in leaf_ids.iter() {
            let aabb = self.nodes[id as usize].aabb;
            let b = bin_of(aabb.centre()[axis]);
            bin_count[b] += 1;
            bin_aabb[b] = Some(match bin_aabb[b] {
                Some(existing) => existing.union(&aabb),
                None => aabb,
            });
        }

        let mut left_area = alloc::vec![0.0f64; BIN_COUNT];
        let mut left_count = alloc::vec![0u32; BIN_COUNT];
        let mut running: Option<Aabb3> = None;
        let mut running_count = 0u32;
        for b in 0..BIN_COUNT {
            if let Some(a) = bin_aabb[b] {
                running = Some(running.map_or(a, |r| r.union(&a)));
            }
            running_count += bin_count[b];
            left_area[b] = running.map_or(0.0, |a| a.area());
            left_count[b] = running_count;
        }

        let mut right_area = alloc::vec![0.0f64; BIN_COUNT];
        let mut right_count = alloc::vec![0u32; BIN_COUNT];
        let mut running: Option<Aabb3> = None;
        let mut running_count = 0u32;
        for b in (0..BIN_COUNT).rev() {
            if let Some(a) = bin_aabb[b] {
                running = Some(running.map_or(a, |r| r.union(&a)));
            }
            running_count += bin_count[b];
            right_area[b] = running.map_or(0.0, |a| a.area());
            right_count[b] = running_count;
        }

        let mut best_bin = 0usize;
        let mut best_cost = f64::MAX;
        for b in 0..BIN_COUNT - 1 {
            if left_count[b] == 0 || right_count[b + 1] == 0 {
                continue;
            }
            let cost = left_area[b] * f64::from(left_count[b])
                + right_area[b + 1] * f64::from(right_count[b + 1]);
            if cost < best_cost {
                best_cost = cost;
                best_bin = b;
            }
        }

        if best_cost == f64::MAX {
            // No bin boundary had items on both sides: force one leaf to the empty side.
            return 1;
        }

        let threshold = best_bin;
        let (mut i, mut j) = (0usize, leaf_ids.len());
        while i < j {
            let b = bin_of(self.nodes[leaf_ids[i] as usize].aabb.centre()[axis]);
            if b <= threshold {
                i += 1;
            } else {
                j -= 1;
                leaf_ids.swap(i, j);
            }
        }
        i.clamp(1, leaf_ids.len() - 1)
    }

    /// Allocate a fresh internal node over two already-built subtrees.
    fn join(&mut self, left: i32, right: i32) -> i32 {
        let parent = self.allocate_node();
        let aabb_l = self.nodes[left as usize].aabb;
        let aabb_r = self.nodes[right as usize].aabb;
        let h_l = self.nodes[left as usize].height;
        let h_r = self.nodes[right as usize].height;
        {
            let p = &mut self.nodes[parent as usize];
            p.child1 = left;
            p.child2 = right;
            p.aabb = aabb_l.union(&aabb_r);
            p.height = 1 + h_l.max(h_r);
        }
        self.nodes[left as usize].parent_or_next = parent;
        self.nodes[right as usize].parent_or_next = parent;
        parent
    }
}

fn collect_internal_nodes(nodes: &[crate::node::Node], index: i32, out: &mut Vec<i32>) {
    let node = &nodes[index as usize];
    if node.is_leaf {
        return;
    }
    out.push(index);
    collect_internal_nodes(nodes, node.child1, out);
    collect_internal_nodes(nodes, node.child2, out);
}
