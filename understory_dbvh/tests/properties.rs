// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the universal and algorithmic invariants.

use glam::Vec3;
use proptest::prelude::*;
use understory_dbvh::{Aabb3, InsertionHeuristic, Tree};

fn unit_box(cx: f32, cy: f32, cz: f32) -> Aabb3 {
    Aabb3::new(
        Vec3::new(cx - 0.4, cy - 0.4, cz - 0.4),
        Vec3::new(cx + 0.4, cy + 0.4, cz + 0.4),
    )
}

#[derive(Clone, Debug)]
enum Op {
    Insert(f32, f32, f32),
    DestroyOldest,
    Move(f32, f32, f32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0).prop_map(|(x, y, z)| Op::Insert(x, y, z)),
        1 => Just(Op::DestroyOldest),
        1 => (-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0).prop_map(|(x, y, z)| Op::Move(x, y, z)),
    ]
}

proptest! {
    // After every operation, `validate()` holds (it checks cached-vs-recomputed height,
    // AABB-equals-union-of-children, and parent/child back-pointer consistency).
    // proxy_count matches the number of leaves actually reachable via a query, capacity
    // only grows, and destroying everything empties the tree.
    #[test]
    fn random_op_sequences_preserve_invariants(ops in prop::collection::vec(op_strategy(), 0..80)) {
        let mut tree = Tree::new();
        let mut live: Vec<understory_dbvh::ProxyId> = Vec::new();
        let mut max_capacity_seen = tree.node_capacity();

        for op in ops {
            match op {
                Op::Insert(x, y, z) => {
                    let id = tree.create_proxy(unit_box(x, y, z), live.len() as i32);
                    live.push(id);
                }
                Op::DestroyOldest => {
                    if !live.is_empty() {
                        let id = live.remove(0);
                        tree.destroy_proxy(id);
                    }
                }
                Op::Move(x, y, z) => {
                    if let Some(&id) = live.first() {
                        tree.move_proxy(id, unit_box(x, y, z), Vec3::ZERO);
                    }
                }
            }

            tree.validate();
            prop_assert_eq!(tree.get_height(), tree.compute_height());
            prop_assert!(tree.node_capacity() >= max_capacity_seen);
            max_capacity_seen = tree.node_capacity();
            prop_assert_eq!(tree.proxy_count() as usize, live.len());

            let everything = Aabb3::new(Vec3::splat(-1000.0), Vec3::splat(1000.0));
            prop_assert_eq!(tree.query_aabb_vec(&everything).len(), live.len());
        }

        for id in live {
            tree.destroy_proxy(id);
        }
        prop_assert_eq!(tree.proxy_count(), 0);
        prop_assert!(tree.root().is_none());
        prop_assert!(tree.node_capacity() >= max_capacity_seen);
    }

    // get_area_ratio is scale-invariant.
    #[test]
    fn area_ratio_is_scale_invariant(
        points in prop::collection::vec((-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0), 4..60),
        scale in 0.01f32..100.0,
    ) {
        let mut a = Tree::new();
        let mut b = Tree::new();
        for (x, y, z) in &points {
            a.create_proxy(unit_box(*x, *y, *z), 0);
            b.create_proxy(unit_box(x * scale, y * scale, z * scale), 0);
        }
        let ratio_a = a.get_area_ratio();
        let ratio_b = b.get_area_ratio();
        prop_assert!((ratio_a - ratio_b).abs() < 1e-3 * ratio_a.max(1.0));
    }
}

// Exact SAH and Bittner must select the same best-cost sibling at every step, so over
// identical input they reach the same total area of coverage (topology may differ on
// ties, but achieved cost may not).
#[test]
fn sah_and_bittner_reach_equivalent_cost() {
    let points: Vec<(f32, f32, f32)> = (0..150)
        .map(|i| {
            #[expect(clippy::cast_precision_loss, reason = "test fixture")]
            let f = i as f32;
            ((f * 7.0) % 53.0 - 26.0, (f * 3.0) % 29.0 - 14.0, (f * 11.0) % 17.0 - 8.0)
        })
        .collect();

    let mut sah = Tree::with_heuristic(InsertionHeuristic::Sah);
    let mut bittner = Tree::with_heuristic(InsertionHeuristic::Bittner);
    for (x, y, z) in &points {
        sah.create_proxy(unit_box(*x, *y, *z), 0);
        bittner.create_proxy(unit_box(*x, *y, *z), 0);
    }

    sah.validate();
    bittner.validate();
    let ratio_sah = sah.get_area_ratio();
    let ratio_bittner = bittner.get_area_ratio();
    assert!(
        (ratio_sah - ratio_bittner).abs() < 1e-6,
        "exact SAH ({ratio_sah}) and Bittner ({ratio_bittner}) should reach equal-cost placements"
    );
}

// Rotation never increases the summed area of the rotated node's two children.
#[test]
fn rotate_heuristic_keeps_trees_valid_after_many_inserts() {
    let mut tree = Tree::with_heuristic(InsertionHeuristic::SahRotate);
    for i in 0..300 {
        #[expect(clippy::cast_precision_loss, reason = "test fixture")]
        let f = i as f32;
        tree.create_proxy(unit_box((f * 1.3) % 40.0, (f * 0.7) % 40.0, (f * 2.1) % 40.0), i);
    }
    tree.validate();
    let (bf, bg, cd, ce) = tree.rotation_counts();
    assert!(bf + bg + cd + ce > 0, "rotation should fire at least once over 300 inserts");
}

// After optimize(), the tree remains structurally valid (cost-reducing regrouping never
// corrupts the hierarchy).
#[test]
fn optimize_keeps_trees_valid() {
    let mut tree = Tree::new();
    for i in 0..200 {
        #[expect(clippy::cast_precision_loss, reason = "test fixture")]
        let f = i as f32;
        tree.create_proxy(unit_box((f * 2.7) % 50.0, (f * 1.1) % 50.0, (f * 3.3) % 50.0), i);
    }
    let ratio_before = tree.get_area_ratio();
    tree.optimize(500);
    tree.validate();
    assert!(tree.get_area_ratio() <= ratio_before + 1e-6);
}

// Both top-down builders produce exactly 2n - 1 nodes and preserve proxies_out.
#[test]
fn top_down_builders_produce_exact_node_count_and_mapping() {
    let boxes: Vec<Aabb3> = (0..77)
        .map(|i| {
            #[expect(clippy::cast_precision_loss, reason = "test fixture")]
            let f = i as f32;
            unit_box(f, (f * 1.5) % 30.0, (f * 0.5) % 30.0)
        })
        .collect();
    let objects: Vec<i32> = (0..77).collect();

    for builder in ["sah", "median"] {
        let mut tree = Tree::new();
        let mut proxies = alloc_proxies_out(boxes.len());
        if builder == "sah" {
            tree.build_top_down_sah(&mut proxies, &boxes, &objects);
        } else {
            tree.build_top_down_median(&mut proxies, &boxes, &objects);
        }

        assert_eq!(tree.node_count(), 2 * boxes.len() as i32 - 1, "builder={builder}");
        tree.validate();
        for (i, &proxy) in proxies.iter().enumerate() {
            assert_eq!(tree.get_object_index(proxy), objects[i], "builder={builder}");
        }
    }
}

fn alloc_proxies_out(n: usize) -> Vec<i32> {
    vec![0; n]
}
