// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only spatial queries: AABB overlap and ray casting.
//!
//! Not part of the hierarchy-maintenance core (insertion, removal, rotation, rebuilding)
//! the rest of this crate is grounded on; these are the traversal primitives every caller
//! of a broad-phase tree actually needs in order to use it, so they're included as an
//! additive surface over the same node pool.

use alloc::vec::Vec;

use crate::aabb::Aabb3;
use crate::node::{ProxyId, NULL_INDEX};
use crate::tree::Tree;
use glam::Vec3;

/// A single ray/proxy intersection, as found by [`Tree::ray_cast`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// The proxy whose fat AABB the ray intersected.
    pub proxy_id: ProxyId,
    /// Parametric distance along the ray, in `[0, max_fraction]`, at which the
    /// intersection occurs.
    pub fraction: f32,
}

impl Tree {
    /// Visit every live proxy whose fat AABB overlaps `query_aabb`.
    ///
    /// `callback` is invoked once per overlapping proxy; returning `false` stops the
    /// traversal early.
    pub fn query_aabb(&self, query_aabb: &Aabb3, mut callback: impl FnMut(ProxyId) -> bool) {
        if self.root == NULL_INDEX {
            return;
        }

        let mut stack: Vec<i32> = alloc::vec![self.root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if !node.aabb.overlaps(query_aabb) {
                continue;
            }

            if node.is_leaf {
                if !callback(index) {
                    return;
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }

    /// Collect every live proxy whose fat AABB overlaps `query_aabb`, in traversal order.
    pub fn query_aabb_vec(&self, query_aabb: &Aabb3) -> Vec<ProxyId> {
        let mut out = Vec::new();
        self.query_aabb(query_aabb, |id| {
            out.push(id);
            true
        });
        out
    }

    /// Cast a ray from `origin` in `direction` (not required to be normalised) out to
    /// `max_fraction` of `direction`'s length, returning the closest intersected proxy,
    /// if any.
    ///
    /// Uses the standard slab method against each node's fat AABB, pruning subtrees whose
    /// AABB the ray cannot reach within the current best fraction.
    pub fn ray_cast(&self, origin: Vec3, direction: Vec3, max_fraction: f32) -> Option<RayHit> {
        if self.root == NULL_INDEX {
            return None;
        }

        let mut best: Option<RayHit> = None;
        let mut limit = max_fraction;
        let mut stack: Vec<i32> = alloc::vec![self.root];

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            let Some(t) = ray_aabb_fraction(origin, direction, limit, &node.aabb) else {
                continue;
            };

            if node.is_leaf {
                if t <= limit {
                    limit = t;
                    best = Some(RayHit {
                        proxy_id: index,
                        fraction: t,
                    });
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }

        best
    }
}

/// Slab-method ray/AABB intersection. Returns the entry fraction along `direction` if the
/// segment `[origin, origin + max_fraction * direction]` intersects `aabb`, else `None`.
fn ray_aabb_fraction(origin: Vec3, direction: Vec3, max_fraction: f32, aabb: &Aabb3) -> Option<f32> {
    let mut t_min = 0.0f32;
    let mut t_max = max_fraction;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let lo = aabb.lower[axis];
        let hi = aabb.upper[axis];

        if d.abs() < 1e-12 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv_d = 1.0 / d;
        let mut t1 = (lo - o) * inv_d;
        let mut t2 = (hi - o) * inv_d;
        if t1 > t2 {
            core::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn aabb(cx: f32) -> Aabb3 {
        Aabb3::new(Vec3::new(cx - 0.5, -0.5, -0.5), Vec3::new(cx + 0.5, 0.5, 0.5))
    }

    #[test]
    fn query_finds_overlapping_proxies_only() {
        let mut tree = Tree::new();
        let near = tree.create_proxy(aabb(0.0), 0);
        let far = tree.create_proxy(aabb(100.0), 1);

        let hits = tree.query_aabb_vec(&Aabb3::new(Vec3::splat(-1.0), Vec3::splat(1.0)));
        assert!(hits.contains(&near));
        assert!(!hits.contains(&far));
    }

    #[test]
    fn ray_cast_hits_the_nearest_box_on_its_path() {
        let mut tree = Tree::new();
        tree.create_proxy(aabb(5.0), 0);
        tree.create_proxy(aabb(10.0), 1);

        let hit = tree.ray_cast(Vec3::new(-10.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1000.0);
        assert!(hit.is_some());
        let hit = hit.unwrap();
        assert_eq!(tree.get_object_index(hit.proxy_id), 0);
    }

    #[test]
    fn ray_cast_misses_when_nothing_is_on_its_path() {
        let mut tree = Tree::new();
        tree.create_proxy(aabb(5.0), 0);
        let hit = tree.ray_cast(Vec3::new(-10.0, 50.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1000.0);
        assert!(hit.is_none());
    }
}
