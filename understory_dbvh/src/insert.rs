// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf insertion: sibling search (four heuristics), splicing, and ancestor refit
//! for the active heuristic.

use crate::aabb::Aabb3;
use crate::node::{InsertionHeuristic, NULL_INDEX};
use crate::tree::{HeapCandidate, Tree};

impl PartialEq for HeapCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.inherited_cost == other.inherited_cost
    }
}
impl Eq for HeapCandidate {}
impl PartialOrd for HeapCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapCandidate {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        // Reversed: `BinaryHeap` is a max-heap, we want the smallest inherited cost on top.
        other.inherited_cost.total_cmp(&self.inherited_cost)
    }
}

impl Tree {
    pub(crate) fn insert_leaf(&mut self, leaf: i32) {
        self.insertion_count += 1;

        if self.root == NULL_INDEX {
            self.root = leaf;
            self.nodes[leaf as usize].parent_or_next = NULL_INDEX;
            return;
        }

        let sibling = match self.heuristic {
            InsertionHeuristic::Sah | InsertionHeuristic::SahRotate => {
                self.branch_and_bound_sibling(leaf, true)
            }
            InsertionHeuristic::Bittner => self.branch_and_bound_sibling(leaf, false),
            InsertionHeuristic::ApproxSah | InsertionHeuristic::ApproxSahRotate => {
                self.approx_sah_sibling(leaf)
            }
            InsertionHeuristic::Manhattan => self.manhattan_sibling(leaf),
        };

        self.splice(leaf, sibling);
        self.refit_ancestors(leaf);
    }

    /// Exact branch-and-bound SAH when `prefilter` is `true`;
    /// the Bittner variant (unconditional child pushes) when `false`. Both share the same
    /// priority ordering and pop-time termination; only the push-time filter differs.
    fn branch_and_bound_sibling(&mut self, leaf: i32, prefilter: bool) -> i32 {
        let aabb_q = self.nodes[leaf as usize].aabb;
        let area_q = aabb_q.area();

        self.heap.clear();
        self.heap.push(HeapCandidate {
            index: self.root,
            inherited_cost: 0.0,
        });

        let mut best_cost = f64::MAX;
        let mut best_sibling = self.root;

        while let Some(candidate) = self.heap.pop() {
            self.max_heap_count = self.max_heap_count.max(self.heap.len() + 1);

            if candidate.inherited_cost + area_q >= best_cost {
                break;
            }

            let index = candidate.index;
            let node_aabb = self.nodes[index as usize].aabb;
            let combined = node_aabb.union(&aabb_q);
            let direct_cost = combined.area();
            let total_cost = candidate.inherited_cost + direct_cost;

            if total_cost < best_cost {
                best_cost = total_cost;
                best_sibling = index;
            }

            if self.is_leaf(index) {
                continue;
            }

            let child_inherited = total_cost - node_aabb.area();
            let lower_bound = child_inherited + area_q;
            if !prefilter || lower_bound <= best_cost {
                let child1 = self.nodes[index as usize].child1;
                let child2 = self.nodes[index as usize].child2;
                self.heap.push(HeapCandidate {
                    index: child1,
                    inherited_cost: child_inherited,
                });
                self.heap.push(HeapCandidate {
                    index: child2,
                    inherited_cost: child_inherited,
                });
            }
        }

        best_sibling
    }

    /// Single-descent approximate SAH (Omohundro-style).
    fn approx_sah_sibling(&self, leaf: i32) -> i32 {
        let aabb_q = self.nodes[leaf as usize].aabb;
        let mut index = self.root;

        while !self.is_leaf(index) {
            let node = &self.nodes[index as usize];
            let (child1, child2) = (node.child1, node.child2);
            let area_p = node.aabb.area();
            let combined = node.aabb.union(&aabb_q);
            let area_g = combined.area();

            let cb = area_g;
            let delta_area_p = area_g - area_p;

            let child_cost = |this: &Self, child: i32| -> (f64, f64) {
                let child_aabb = this.nodes[child as usize].aabb;
                let union_qc = aabb_q.union(&child_aabb);
                let delta = union_qc.area() - child_aabb.area();
                if this.is_leaf(child) {
                    (delta_area_p + union_qc.area(), delta)
                } else {
                    (delta_area_p + delta + aabb_q.area(), delta)
                }
            };

            let (c1, delta1) = child_cost(self, child1);
            let (c2, delta2) = child_cost(self, child2);

            if 0.9 * cb < c1 && 0.9 * cb < c2 {
                break;
            }

            index = if (delta1 - delta2).abs() < 1e-9 {
                // Tie on induced cost (both children fully contain Q, for example):
                // break by centre distance.
                let d1 = centre_distance_sq(&aabb_q, &self.nodes[child1 as usize].aabb);
                let d2 = centre_distance_sq(&aabb_q, &self.nodes[child2 as usize].aabb);
                if d1 <= d2 { child1 } else { child2 }
            } else if c1 < c2 {
                child1
            } else {
                child2
            };
        }

        index
    }

    /// Manhattan descent: no cost evaluation, always follows the L1-nearest child.
    fn manhattan_sibling(&self, leaf: i32) -> i32 {
        let q_corner_sum = {
            let q = self.nodes[leaf as usize].aabb;
            q.lower + q.upper
        };
        let mut index = self.root;

        while !self.is_leaf(index) {
            let node = &self.nodes[index as usize];
            let (child1, child2) = (node.child1, node.child2);
            let d1 = manhattan(
                q_corner_sum,
                self.nodes[child1 as usize].aabb.lower + self.nodes[child1 as usize].aabb.upper,
            );
            let d2 = manhattan(
                q_corner_sum,
                self.nodes[child2 as usize].aabb.lower + self.nodes[child2 as usize].aabb.upper,
            );
            index = if d1 <= d2 { child1 } else { child2 };
        }

        index
    }

    /// Allocate a new internal parent over `sibling` and `leaf`, splicing it into the
    /// tree in `sibling`'s place.
    fn splice(&mut self, leaf: i32, sibling: i32) {
        let old_parent = self.nodes[sibling as usize].parent_or_next;
        let new_parent = self.allocate_node();

        let leaf_aabb = self.nodes[leaf as usize].aabb;
        let sibling_aabb = self.nodes[sibling as usize].aabb;
        let sibling_height = self.nodes[sibling as usize].height;

        {
            let p = &mut self.nodes[new_parent as usize];
            p.parent_or_next = old_parent;
            p.aabb = leaf_aabb.union(&sibling_aabb);
            p.height = sibling_height + 1;
            p.child1 = sibling;
            p.child2 = leaf;
        }

        if old_parent != NULL_INDEX {
            let old_parent_node = &mut self.nodes[old_parent as usize];
            if old_parent_node.child1 == sibling {
                old_parent_node.child1 = new_parent;
            } else {
                old_parent_node.child2 = new_parent;
            }
        } else {
            self.root = new_parent;
        }

        self.nodes[sibling as usize].parent_or_next = new_parent;
        self.nodes[leaf as usize].parent_or_next = new_parent;
    }

    /// Walk from `leaf`'s parent to the root, fixing AABBs and heights, optionally
    /// applying a cost-reducing rotation at each visited ancestor.
    fn refit_ancestors(&mut self, leaf: i32) {
        let mut index = self.nodes[leaf as usize].parent_or_next;
        let rotate = self.heuristic.rotates();

        while index != NULL_INDEX {
            let (child1, child2) = {
                let n = &self.nodes[index as usize];
                (n.child1, n.child2)
            };
            debug_assert_ne!(child1, NULL_INDEX);
            debug_assert_ne!(child2, NULL_INDEX);

            let h1 = self.nodes[child1 as usize].height;
            let h2 = self.nodes[child2 as usize].height;
            let aabb1 = self.nodes[child1 as usize].aabb;
            let aabb2 = self.nodes[child2 as usize].aabb;

            let n = &mut self.nodes[index as usize];
            n.height = 1 + h1.max(h2);
            n.aabb = aabb1.union(&aabb2);

            if rotate {
                self.rotate(index);
            }

            index = self.nodes[index as usize].parent_or_next;
        }
    }
}

#[inline]
fn centre_distance_sq(a: &Aabb3, b: &Aabb3) -> f32 {
    let d = a.centre() - b.centre();
    d.length_squared()
}

#[inline]
fn manhattan(a: glam::Vec3, b: glam::Vec3) -> f32 {
    let d = a - b;
    d.x.abs() + d.y.abs() + d.z.abs()
}
