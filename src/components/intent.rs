//! Per-tick control intent.
//!
//! An [`Intent`] is what a character wants to do this tick, independent of
//! where the wish came from: a device layer, a network peer or an AI
//! [`Behavior`](super::behavior::Behavior). Held axes persist between ticks;
//! the trigger fields are edges and are cleared after each tick by
//! [`Intent::clear_triggers`].

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Intent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,

    pub jump: bool,
    pub attack1: bool,
    pub attack2: bool,
    pub dash: bool,
    pub roll: bool,
    pub interact: bool,
    pub crouch_toggle: bool,
    /// Zero-based projectile slot fired this tick.
    pub projectile: Option<u8>,
}

impl Intent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holding exactly one horizontal direction.
    pub fn horizontal(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn wants_horizontal_move(&self) -> bool {
        self.horizontal() != 0.0
    }

    /// Reset edge-triggered fields, keeping held axes.
    pub fn clear_triggers(&mut self) {
        *self = Self {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
            ..Self::default()
        };
    }

    pub fn holding_right() -> Self {
        Self {
            right: true,
            ..Self::default()
        }
    }

    pub fn holding_left() -> Self {
        Self {
            left: true,
            ..Self::default()
        }
    }
}
