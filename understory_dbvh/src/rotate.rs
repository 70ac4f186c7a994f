// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cost-based local rotation, applied at each ancestor visited during insertion when the
//! active heuristic requests it.
//!
//! Unlike a height-balancing rotation, a swap is only ever applied when it strictly
//! reduces summed surface area; height plays no part in the decision.

use crate::node::NULL_INDEX;
use crate::tree::Tree;

enum Rotation {
    None,
    /// Swap grandchild `F` of `C` with `B`.
    Bf,
    /// Swap grandchild `G` of `C` with `B`.
    Bg,
    /// Swap grandchild `D` of `B` with `C`.
    Cd,
    /// Swap grandchild `E` of `B` with `C`.
    Ce,
}

impl Tree {
    /// Consider rotating the subtree rooted at `index`, applying whichever of the
    /// `BF`/`BG`/`CD`/`CE` swaps most reduces total surface area, if any does.
    pub(crate) fn rotate(&mut self, index: i32) {
        let a = index;
        let node_a = &self.nodes[a as usize];
        if node_a.height < 2 {
            return;
        }
        let b = node_a.child1;
        let c = node_a.child2;

        let b_is_leaf = self.nodes[b as usize].is_leaf;
        let c_is_leaf = self.nodes[c as usize].is_leaf;

        if b_is_leaf && c_is_leaf {
            return;
        }

        let rotation = if b_is_leaf {
            self.best_of_bf_bg(b, c)
        } else if c_is_leaf {
            self.best_of_cd_ce(c, b)
        } else {
            self.best_of_all_four(b, c)
        };

        match rotation {
            Rotation::None => {}
            Rotation::Bf => {
                self.apply_swap(a, c, b, self.nodes[c as usize].child1);
                self.count_bf += 1;
            }
            Rotation::Bg => {
                self.apply_swap(a, c, b, self.nodes[c as usize].child2);
                self.count_bg += 1;
            }
            Rotation::Cd => {
                self.apply_swap(a, b, c, self.nodes[b as usize].child1);
                self.count_cd += 1;
            }
            Rotation::Ce => {
                self.apply_swap(a, b, c, self.nodes[b as usize].child2);
                self.count_ce += 1;
            }
        }
    }

    /// `leaf` is a leaf child of `a`; `internal` is `a`'s other, internal child. Decide
    /// between leaving `internal` alone, or swapping `leaf` with one of `internal`'s two
    /// children (whichever reduces `internal`'s own bounding area the most).
    fn best_of_bf_bg(&self, leaf: i32, internal: i32) -> Rotation {
        let node = &self.nodes[internal as usize];
        let (f, g) = (node.child1, node.child2);
        let cost_base = node.aabb.area();

        let leaf_aabb = self.nodes[leaf as usize].aabb;
        let cost_bf = leaf_aabb.union(&self.nodes[g as usize].aabb).area();
        let cost_bg = leaf_aabb.union(&self.nodes[f as usize].aabb).area();

        if cost_base <= cost_bf && cost_base <= cost_bg {
            Rotation::None
        } else if cost_bf < cost_bg {
            Rotation::Bf
        } else {
            Rotation::Bg
        }
    }

    fn best_of_cd_ce(&self, leaf: i32, internal: i32) -> Rotation {
        match self.best_of_bf_bg(leaf, internal) {
            Rotation::Bf => Rotation::Cd,
            Rotation::Bg => Rotation::Ce,
            Rotation::None => Rotation::None,
            Rotation::Cd | Rotation::Ce => unreachable!(),
        }
    }

    /// Both `b` and `c` are internal: evaluate all four candidate swaps and take the
    /// cheapest one that beats leaving the subtree alone.
    fn best_of_all_four(&self, b: i32, c: i32) -> Rotation {
        let node_b = &self.nodes[b as usize];
        let (d, e) = (node_b.child1, node_b.child2);
        let node_c = &self.nodes[c as usize];
        let (f, g) = (node_c.child1, node_c.child2);

        let aabb_b = self.nodes[b as usize].aabb;
        let aabb_c = self.nodes[c as usize].aabb;
        let aabb_d = self.nodes[d as usize].aabb;
        let aabb_e = self.nodes[e as usize].aabb;
        let aabb_f = self.nodes[f as usize].aabb;
        let aabb_g = self.nodes[g as usize].aabb;

        let cost_base = aabb_b.area() + aabb_c.area();
        // `BF`/`BG` perturb C (B <-> F or B <-> G); `CD`/`CE` perturb B (C <-> D or C <-> E).
        let cost_bf = aabb_b.union(&aabb_g).area();
        let cost_bg = aabb_b.union(&aabb_f).area();
        let cost_cd = aabb_c.union(&aabb_e).area();
        let cost_ce = aabb_c.union(&aabb_d).area();

        let candidates = [
            (cost_bf, Rotation::Bf),
            (cost_bg, Rotation::Bg),
            (cost_cd, Rotation::Cd),
            (cost_ce, Rotation::Ce),
        ];

        let (best_cost, best_rotation) = candidates
            .into_iter()
            .fold((cost_base, Rotation::None), |(acc_cost, acc_rot), (cost, rot)| {
                if cost < acc_cost {
                    (cost, rot)
                } else {
                    (acc_cost, acc_rot)
                }
            });

        if best_cost < cost_base {
            best_rotation
        } else {
            Rotation::None
        }
    }

    /// Swap `moved` (currently a child of `from_parent`) with `target` (currently a child
    /// of `other_parent`, the sibling of `from_parent` under the shared grandparent `a`),
    /// then refit `from_parent` and `a`.
    ///
    /// `moved` was a child of `a` directly; `target` was a grandchild under `other_parent`.
    fn apply_swap(&mut self, a: i32, other_parent: i32, moved: i32, target: i32) {
        // Figure out which of `a`'s children is `other_parent` so we know the remaining one.
        let (a_child1, a_child2) = (self.nodes[a as usize].child1, self.nodes[a as usize].child2);
        debug_assert!(a_child1 == other_parent || a_child2 == other_parent);
        debug_assert!(a_child1 == moved || a_child2 == moved);

        let op_child1 = self.nodes[other_parent as usize].child1;
        let kept = if op_child1 == target {
            self.nodes[other_parent as usize].child2
        } else {
            self.nodes[other_parent as usize].child1
        };

        if op_child1 == target {
            self.nodes[other_parent as usize].child1 = moved;
        } else {
            self.nodes[other_parent as usize].child2 = moved;
        }
        if a_child1 == moved {
            self.nodes[a as usize].child1 = target;
        } else {
            self.nodes[a as usize].child2 = target;
        }

        self.nodes[moved as usize].parent_or_next = other_parent;
        self.nodes[target as usize].parent_or_next = a;

        let moved_aabb = self.nodes[moved as usize].aabb;
        let kept_aabb = self.nodes[kept as usize].aabb;
        let target_aabb = self.nodes[target as usize].aabb;
        let moved_height = self.nodes[moved as usize].height;
        let kept_height = self.nodes[kept as usize].height;
        let target_height = self.nodes[target as usize].height;

        let op = &mut self.nodes[other_parent as usize];
        op.aabb = moved_aabb.union(&kept_aabb);
        op.height = 1 + moved_height.max(kept_height);

        let op_aabb = self.nodes[other_parent as usize].aabb;
        let op_height = self.nodes[other_parent as usize].height;
        let an = &mut self.nodes[a as usize];
        an.aabb = op_aabb.union(&target_aabb);
        an.height = 1 + op_height.max(target_height);
        debug_assert_ne!(target, NULL_INDEX);
    }
}
