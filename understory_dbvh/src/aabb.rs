// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding box in 3-D.

use glam::Vec3;

/// Axis-aligned bounding box, defined by its `lower` and `upper` corners.
///
/// A plain min/max pair with no orientation, widened internally to `f64` for
/// surface-area accumulation so that long runs of insertions and bulk rebuilds don't
/// drift from `f32` rounding.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner (component-wise).
    pub lower: Vec3,
    /// Maximum corner (component-wise).
    pub upper: Vec3,
}

impl Aabb3 {
    /// Create a new AABB from its lower and upper corners.
    ///
    /// Does not validate `lower <= upper`; callers that build AABBs from arbitrary
    /// corner pairs should go through [`Aabb3::from_corners`] instead.
    #[inline]
    pub const fn new(lower: Vec3, upper: Vec3) -> Self {
        Self { lower, upper }
    }

    /// Create an AABB from two arbitrary corners, ordering components as needed.
    #[inline]
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    /// The smallest AABB enclosing both `self` and `other`.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    /// Whether `self` fully contains `other`.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.lower.x <= other.lower.x
            && self.lower.y <= other.lower.y
            && self.lower.z <= other.lower.z
            && other.upper.x <= self.upper.x
            && other.upper.y <= self.upper.y
            && other.upper.z <= self.upper.z
    }

    /// Whether `self` overlaps `other` (shared edges count as overlap).
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.lower.x <= other.upper.x
            && self.upper.x >= other.lower.x
            && self.lower.y <= other.upper.y
            && self.upper.y >= other.lower.y
            && self.lower.z <= other.upper.z
            && self.upper.z >= other.lower.z
    }

    /// Surface area `2 * (wx*wy + wy*wz + wz*wx)`, widened to `f64`.
    ///
    /// The SAH cost proxy for a 3-D hierarchy, generalising 2-D perimeter to 3-D surface
    /// area.
    #[inline]
    pub fn area(&self) -> f64 {
        let e = self.extents();
        let (wx, wy, wz) = (f64::from(e.x), f64::from(e.y), f64::from(e.z));
        2.0 * (wx * wy + wy * wz + wz * wx)
    }

    /// Centre point of the box.
    #[inline]
    pub fn centre(&self) -> Vec3 {
        0.5 * (self.lower + self.upper)
    }

    /// Per-axis extent (`upper - lower`), clamped to non-negative.
    #[inline]
    pub fn extents(&self) -> Vec3 {
        (self.upper - self.lower).max(Vec3::ZERO)
    }

    /// Manhattan (L1) distance between the centres of `self` and `other`.
    #[inline]
    pub fn centre_manhattan_distance(&self, other: &Self) -> f32 {
        let d = self.centre() - other.centre();
        d.x.abs() + d.y.abs() + d.z.abs()
    }

    /// Inflate the box by `margin` on every axis in every direction.
    #[inline]
    pub fn fattened(&self, margin: f32) -> Self {
        let r = Vec3::splat(margin);
        Self {
            lower: self.lower - r,
            upper: self.upper + r,
        }
    }
}
