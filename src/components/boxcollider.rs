//! Axis-aligned boxes used for every collision query.
//!
//! World space is y-down: `min.y` is the top edge, `max.y` the bottom edge.
//! Characters are anchored at their feet centre, so a [`BoxCollider`] built
//! with [`BoxCollider::feet_anchored`] places the box above and around the
//! anchor point.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build from two corners in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Build from top-left corner and size.
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(x + w, y + h))
    }

    /// Box of `size` whose bottom edge is centred on `feet`.
    pub fn from_feet(feet: Vec2, size: Vec2) -> Self {
        Self::from_xywh(feet.x - size.x * 0.5, feet.y - size.y, size.x, size.y)
    }

    /// Box of `size` centred on `center`.
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size * 0.5, center + size * 0.5)
    }

    pub fn left(&self) -> f32 {
        self.min.x
    }
    pub fn right(&self) -> f32 {
        self.max.x
    }
    pub fn top(&self) -> f32 {
        self.min.y
    }
    pub fn bottom(&self) -> f32 {
        self.max.y
    }
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// True when all coordinates are finite and both extents are positive.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.width() > 0.0 && self.height() > 0.0
    }

    /// Strict overlap test: touching edges do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Width of the shared horizontal span, zero when disjoint.
    pub fn horizontal_overlap(&self, other: &Aabb) -> f32 {
        (self.max.x.min(other.max.x) - self.min.x.max(other.min.x)).max(0.0)
    }

    /// Height of the shared vertical span, zero when disjoint.
    pub fn vertical_overlap(&self, other: &Aabb) -> f32 {
        (self.max.y.min(other.max.y) - self.min.y.max(other.min.y)).max(0.0)
    }

    /// Point containment, edges inclusive.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Collision box profile relative to an entity anchor.
#[derive(Debug, Clone, Copy, PartialEq, Component, Serialize, Deserialize)]
pub struct BoxCollider {
    pub size: Vec2,
    pub offset: Vec2,
}

impl BoxCollider {
    /// Create a BoxCollider with given size and its top-left corner at the anchor.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            offset: Vec2::ZERO,
        }
    }

    /// Create a BoxCollider whose bottom edge is centred on the anchor.
    pub fn feet_anchored(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            offset: Vec2::new(-width * 0.5, -height),
        }
    }

    /// Modify BoxCollider with given offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the collider AABB for a given entity position.
    /// Handles negative size by normalizing to proper min/max.
    pub fn aabb(&self, position: Vec2) -> Aabb {
        let p0 = position + self.offset;
        Aabb::new(p0, p0 + self.size)
    }

    /// AABB vs AABB overlap test against another BoxCollider at a different entity position.
    pub fn overlaps(&self, position: Vec2, other: &Self, other_position: Vec2) -> bool {
        self.aabb(position).intersects(&other.aabb(other_position))
    }

    /// Point containment in world space.
    pub fn contains_point(&self, position: Vec2, point: Vec2) -> bool {
        self.aabb(position).contains_point(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    // ==================== AABB TESTS ====================

    #[test]
    fn test_aabb_normalizes_corners() {
        let aabb = Aabb::new(Vec2::new(10.0, 20.0), Vec2::new(0.0, 5.0));
        assert_eq!(aabb.min, Vec2::new(0.0, 5.0));
        assert_eq!(aabb.max, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_from_feet_places_box_above_anchor() {
        let aabb = Aabb::from_feet(Vec2::new(100.0, 200.0), Vec2::new(24.0, 60.0));
        assert!(approx_eq(aabb.left(), 88.0));
        assert!(approx_eq(aabb.right(), 112.0));
        assert!(approx_eq(aabb.top(), 140.0));
        assert!(approx_eq(aabb.bottom(), 200.0));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Aabb::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::from_xywh(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        let c = Aabb::from_xywh(9.5, 9.5, 10.0, 10.0);
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_overlap_spans() {
        let a = Aabb::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::from_xywh(6.0, 8.0, 10.0, 10.0);
        assert!(approx_eq(a.horizontal_overlap(&b), 4.0));
        assert!(approx_eq(a.vertical_overlap(&b), 2.0));
        let far = Aabb::from_xywh(50.0, 50.0, 1.0, 1.0);
        assert!(approx_eq(a.horizontal_overlap(&far), 0.0));
    }

    #[test]
    fn test_invalid_boxes_are_detected() {
        assert!(Aabb::from_xywh(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!Aabb::from_xywh(0.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!Aabb::from_xywh(f32::NAN, 0.0, 1.0, 1.0).is_valid());
    }

    // ==================== BOXCOLLIDER TESTS ====================

    #[test]
    fn test_feet_anchored_collider_matches_from_feet() {
        let collider = BoxCollider::feet_anchored(24.0, 60.0);
        let pos = Vec2::new(50.0, 80.0);
        assert_eq!(collider.aabb(pos), Aabb::from_feet(pos, collider.size));
    }

    #[test]
    fn test_overlaps_and_contains_point() {
        let a = BoxCollider::new(10.0, 10.0);
        let b = BoxCollider::new(10.0, 10.0).with_offset(Vec2::new(5.0, 5.0));
        assert!(a.overlaps(Vec2::ZERO, &b, Vec2::ZERO));
        assert!(!a.overlaps(Vec2::ZERO, &b, Vec2::new(20.0, 0.0)));
        assert!(a.contains_point(Vec2::ZERO, Vec2::new(10.0, 10.0)));
        assert!(!a.contains_point(Vec2::ZERO, Vec2::new(10.1, 10.0)));
    }
}
