//! Static level geometry the characters collide with.

use bevy_ecs::prelude::Component;

use crate::components::boxcollider::Aabb;

/// Solid surface. Blocks on both axes.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub rect: Aabb,
}

impl Platform {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Aabb::from_xywh(x, y, w, h),
        }
    }
}

/// Climbable volume.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Ladder {
    pub rect: Aabb,
}

impl Ladder {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Aabb::from_xywh(x, y, w, h),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HazardKind {
    Lava,
}

/// Damaging volume. Each kind triggers at most once per tick per character.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub rect: Aabb,
    pub kind: HazardKind,
}

impl Hazard {
    pub fn lava(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Aabb::from_xywh(x, y, w, h),
            kind: HazardKind::Lava,
        }
    }
}
