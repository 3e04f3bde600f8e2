//! Ledge-tipping sub-state.
//!
//! While `active`, the character rotates over the edge of its support around
//! `pivot_x` and slides slowly in `direction` until the angle cap converts the
//! motion into a regular fall.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tipping {
    pub active: bool,
    /// Degrees of rotation reached so far, signed like `direction`.
    pub angle: f32,
    /// -1.0 tips left, 1.0 tips right.
    pub direction: f32,
    /// World x of the platform edge being tipped over.
    pub pivot_x: f32,
}

impl Tipping {
    pub fn start(direction: f32, pivot_x: f32) -> Self {
        Self {
            active: true,
            angle: 0.0,
            direction,
            pivot_x,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
