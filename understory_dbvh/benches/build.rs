// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use understory_dbvh::{Aabb3, InsertionHeuristic, Tree};

fn scattered_boxes(n: usize) -> Vec<Aabb3> {
    (0..n)
        .map(|i| {
            #[expect(clippy::cast_precision_loss, reason = "bench fixture")]
            let f = i as f32;
            let x = (f * 12.9898).sin() * 200.0;
            let y = (f * 78.233).sin() * 200.0;
            let z = (f * 37.719).sin() * 200.0;
            Aabb3::new(Vec3::new(x, y, z), Vec3::new(x + 1.0, y + 1.0, z + 1.0))
        })
        .collect()
}

fn bench_incremental_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental_insert");
    for &n in &[1_000usize, 10_000] {
        let boxes = scattered_boxes(n);
        for heuristic in [
            InsertionHeuristic::Sah,
            InsertionHeuristic::Bittner,
            InsertionHeuristic::ApproxSah,
            InsertionHeuristic::Manhattan,
        ] {
            group.bench_with_input(
                BenchmarkId::new(format!("{heuristic:?}"), n),
                &boxes,
                |b, boxes| {
                    b.iter(|| {
                        let mut tree = Tree::with_heuristic(heuristic);
                        for aabb in boxes {
                            tree.create_proxy(*aabb, 0);
                        }
                        criterion::black_box(tree.get_area_ratio());
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_top_down_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_down_build");
    for &n in &[1_000usize, 10_000] {
        let boxes = scattered_boxes(n);
        let objects: Vec<i32> = (0..n as i32).collect();
        let mut proxies = vec![0; n];

        group.bench_with_input(BenchmarkId::new("sah", n), &boxes, |b, boxes| {
            b.iter(|| {
                let mut tree = Tree::new();
                tree.build_top_down_sah(&mut proxies, boxes, &objects);
                criterion::black_box(tree.node_count());
            });
        });
        group.bench_with_input(BenchmarkId::new("median", n), &boxes, |b, boxes| {
            b.iter(|| {
                let mut tree = Tree::new();
                tree.build_top_down_median(&mut proxies, boxes, &objects);
                criterion::black_box(tree.node_count());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_incremental_insert, bench_top_down_build);
criterion_main!(benches);
