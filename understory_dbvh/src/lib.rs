// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dbvh --heading-base-level=0

//! Understory DBVH: a dynamic bounding volume hierarchy over 3-D AABBs.
//!
//! Understory DBVH is a reusable broad-phase for collision detection, ray casting, and
//! other spatial queries over a changing population of axis-aligned proxies.
//!
//! - Pooled, index-addressed node storage with a free list and amortised doubling growth.
//! - Four interchangeable insertion heuristics, from exact branch-and-bound SAH down to a
//!   cheap Manhattan-distance descent, selectable per [`Tree`] via [`InsertionHeuristic`].
//! - Local cost-reducing rotations, bulk rebuilds (bottom-up agglomerative, top-down binned
//!   SAH, top-down median split), and an incremental subtree-shuffle optimiser.
//! - Metrics (height, area ratio, max balance) and a debug structural/metric validator.
//!
//! It does not do layout, ray/shape math beyond AABBs, or own the client's geometry: it
//! consumes `Aabb3` and hands back [`ProxyId`]s that are stable for the lifetime of the proxy.
//!
//! ## API overview
//!
//! - [`Tree`]: owns the node pool and exposes the create/destroy/move/query façade.
//! - [`Aabb3`]: axis-aligned bounding box in 3-D (`lower`/`upper` `glam::Vec3`).
//! - [`InsertionHeuristic`]: selects the sibling-search strategy used by [`Tree::create_proxy`].
//! - [`ProxyId`]: a stable handle for a leaf, valid from creation until destruction.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod aabb;
mod build;
mod dot;
mod insert;
mod metrics;
mod node;
mod optimize;
mod pool;
mod query;
mod remove;
mod rotate;
mod tree;

pub use aabb::Aabb3;
pub use node::{InsertionHeuristic, ProxyId, NULL_HEIGHT, NULL_INDEX};
pub use query::RayHit;
pub use tree::Tree;
