//! Timed status overlays carried by a character.
//!
//! Four overlays exist: fire (aflame, then deflame), cold (frozen, then
//! defrost), electricity (zapped) and stone (petrified, optionally smashed).
//! At most one overlay family is active at a time. The
//! [`status`](crate::systems::status) systems own every write to these
//! fields; other code should only read them.

use serde::{Deserialize, Serialize};

use crate::resources::worldtime::Millis;

/// Which overlay family is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    Fire,
    Cold,
    Zap,
    Stone,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusEffects {
    pub is_aflame: bool,
    pub is_deflaming: bool,
    pub is_frozen: bool,
    pub is_defrosting: bool,
    pub is_zapped: bool,
    pub is_petrified: bool,
    pub is_stone_smashed: bool,

    pub aflame_started: Millis,
    pub aflame_last_damage: Millis,
    pub deflame_started: Millis,
    /// Set on first ignition, cleared when the fire cycle fully ends.
    pub fire_started: Option<Millis>,
    pub frozen_started: Millis,
    pub zapped_started: Millis,
    pub zapped_last_damage: Millis,
    pub smashed_started: Millis,

    pub facing_at_petrification: bool,
    pub was_crouching_when_petrified: bool,
}

impl StatusEffects {
    pub fn on_fire(&self) -> bool {
        self.is_aflame || self.is_deflaming
    }

    pub fn is_cold(&self) -> bool {
        self.is_frozen || self.is_defrosting
    }

    pub fn clear_fire(&mut self) {
        self.is_aflame = false;
        self.is_deflaming = false;
        self.fire_started = None;
    }

    pub fn clear_cold(&mut self) {
        self.is_frozen = false;
        self.is_defrosting = false;
    }

    /// Drop every overlay flag. Timers are left in place; they are only read
    /// while their flag is set.
    pub fn clear_all(&mut self) {
        self.clear_fire();
        self.clear_cold();
        self.is_zapped = false;
        self.is_petrified = false;
        self.is_stone_smashed = false;
    }

    /// The active overlay family, stone taking precedence.
    pub fn active(&self) -> Option<Overlay> {
        if self.is_petrified || self.is_stone_smashed {
            Some(Overlay::Stone)
        } else if self.is_zapped {
            Some(Overlay::Zap)
        } else if self.is_cold() {
            Some(Overlay::Cold)
        } else if self.on_fire() {
            Some(Overlay::Fire)
        } else {
            None
        }
    }

    /// Number of overlay families currently flagged. Never above one.
    pub fn active_count(&self) -> usize {
        [
            self.on_fire(),
            self.is_cold(),
            self.is_zapped,
            self.is_petrified || self.is_stone_smashed,
        ]
        .iter()
        .filter(|&&b| b)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_overlay_priority() {
        let mut s = StatusEffects::default();
        assert_eq!(s.active(), None);
        s.is_deflaming = true;
        assert_eq!(s.active(), Some(Overlay::Fire));
        s.is_stone_smashed = true;
        assert_eq!(s.active(), Some(Overlay::Stone));
        assert_eq!(s.active_count(), 2);
    }

    #[test]
    fn test_clear_all_resets_flags_and_fire_start() {
        let mut s = StatusEffects {
            is_aflame: true,
            fire_started: Some(10),
            is_zapped: true,
            ..Default::default()
        };
        s.clear_all();
        assert_eq!(s.active_count(), 0);
        assert_eq!(s.fire_started, None);
    }
}
