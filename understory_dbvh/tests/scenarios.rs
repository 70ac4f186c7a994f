// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concrete end-to-end scenarios exercising construction, bulk build, churn, and
//! cross-heuristic equivalence.

use glam::Vec3;
use understory_dbvh::{Aabb3, InsertionHeuristic, Tree};

#[test]
fn scenario_1_empty_tree() {
    let tree = Tree::new();
    assert_eq!(tree.get_height(), 0);
    assert_eq!(tree.proxy_count(), 0);
    assert_eq!(tree.get_area_ratio(), 0.0);
    assert!(tree.root().is_none());
}

#[test]
fn scenario_2_single_box() {
    let mut tree = Tree::new();
    let id = tree.create_proxy(
        Aabb3::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
        0,
    );
    assert_eq!(tree.get_height(), 0);
    assert_eq!(tree.proxy_count(), 1);
    assert_eq!(tree.root(), Some(id));
    assert_eq!(tree.get_area_ratio(), 0.0);
}

#[test]
fn scenario_3_ordered_row_of_32() {
    let mut tree = Tree::with_heuristic(InsertionHeuristic::Sah);
    for i in 0..32 {
        #[expect(clippy::cast_precision_loss, reason = "test fixture")]
        let f = i as f32;
        tree.create_proxy(Aabb3::new(Vec3::new(f, 0.0, 0.0), Vec3::new(f + 1.0, 1.0, 1.0)), i);
    }
    assert_eq!(tree.proxy_count(), 32);
    assert!(tree.get_height() <= 10, "height was {}", tree.get_height());
    assert!(tree.get_area_ratio() < 6.0, "area ratio was {}", tree.get_area_ratio());
}

#[test]
fn scenario_4_pyramid_and_ground_plane_optimizes_no_worse() {
    let mut tree = Tree::with_heuristic(InsertionHeuristic::ApproxSahRotate);

    // Ground: 10 x 20 lattice of unit cubes (half-extent 0.1) on X-Z.
    for gx in 0..10 {
        for gz in 0..20 {
            #[expect(clippy::cast_precision_loss, reason = "test fixture")]
            let (x, z) = (gx as f32, gz as f32);
            tree.create_proxy(
                Aabb3::new(Vec3::new(x - 0.1, -0.1, z - 0.1), Vec3::new(x + 0.1, 0.1, z + 0.1)),
                0,
            );
        }
    }

    // Pyramid: 210 cubes stacked above the ground, shrinking per layer.
    let mut object = 0;
    let mut layer_size = 20;
    let mut y = 1.0f32;
    let mut count = 0;
    'layers: while count < 210 {
        for i in 0..layer_size {
            if count >= 210 {
                break 'layers;
            }
            #[expect(clippy::cast_precision_loss, reason = "test fixture")]
            let x = i as f32;
            tree.create_proxy(
                Aabb3::new(Vec3::new(x - 0.1, y - 0.1, -0.1), Vec3::new(x + 0.1, y + 0.1, 0.1)),
                object,
            );
            object += 1;
            count += 1;
        }
        y += 0.2;
        layer_size = (layer_size - 1).max(1);
    }

    let ratio_before_optimize = tree.get_area_ratio();
    tree.optimize(200);
    let ratio_after_optimize = tree.get_area_ratio();
    assert!(
        ratio_after_optimize <= ratio_before_optimize + 1e-6,
        "optimize should not make the area ratio worse: before={ratio_before_optimize} after={ratio_after_optimize}"
    );
}

#[test]
fn scenario_5_insert_destroy_churn() {
    let mut tree = Tree::new();
    let mut ids = Vec::with_capacity(1000);
    for i in 0..1000 {
        #[expect(clippy::cast_precision_loss, reason = "test fixture")]
        let f = i as f32;
        let x = (f * 13.37) % 200.0 - 100.0;
        let y = (f * 7.91) % 200.0 - 100.0;
        let z = (f * 3.14) % 200.0 - 100.0;
        ids.push(tree.create_proxy(
            Aabb3::new(Vec3::new(x, y, z), Vec3::new(x + 1.0, y + 1.0, z + 1.0)),
            i,
        ));
    }

    let capacity = tree.node_capacity();
    for id in ids.into_iter().rev() {
        tree.destroy_proxy(id);
    }

    assert!(tree.root().is_none());
    assert_eq!(tree.proxy_count(), 0);
    assert_eq!(tree.node_count(), 0);
    assert_eq!(tree.node_capacity(), capacity, "capacity must not shrink");
}

#[test]
fn scenario_6_heuristic_equivalence_on_identical_inputs() {
    let inputs: Vec<(f32, f32, f32)> = (0..120)
        .map(|i| {
            #[expect(clippy::cast_precision_loss, reason = "test fixture")]
            let f = i as f32;
            ((f * 5.0) % 40.0 - 20.0, (f * 2.0) % 40.0 - 20.0, (f * 9.0) % 40.0 - 20.0)
        })
        .collect();

    let mut sah = Tree::with_heuristic(InsertionHeuristic::Sah);
    let mut bittner = Tree::with_heuristic(InsertionHeuristic::Bittner);
    for (x, y, z) in &inputs {
        let aabb = Aabb3::new(Vec3::new(*x, *y, *z), Vec3::new(x + 1.0, y + 1.0, z + 1.0));
        sah.create_proxy(aabb, 0);
        bittner.create_proxy(aabb, 0);
    }

    assert!((sah.get_area_ratio() - bittner.get_area_ratio()).abs() < 1e-6);
    assert_eq!(sah.proxy_count(), bittner.proxy_count());
}
