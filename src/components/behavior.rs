//! Decision source for a character's [`Intent`](super::intent::Intent).
//!
//! The kinematics core is behavior-agnostic: it only consumes intents. A
//! [`Behavior`] decides where those intents come from. `Forward` leaves the
//! intent to an external writer (device input, network); `Patrol` lets the
//! [`behavior_system`](crate::systems::behavior::behavior_system) fill it in.

use bevy_ecs::prelude::Component;

use crate::resources::worldtime::Millis;

#[derive(Component, Debug, Clone)]
pub enum Behavior {
    Forward,
    Patrol(PatrolAi),
}

/// Walks between random points of a horizontal span, chases and attacks
/// targets that come close.
#[derive(Debug, Clone)]
pub struct PatrolAi {
    pub span_min: f32,
    pub span_max: f32,
    pub target_x: Option<f32>,
    pub last_attack: Option<Millis>,
    /// The character was attacking on the previous decision.
    pub attacking: bool,
    /// No decisions before this time after an attack.
    pub pause_until: Millis,
    pub rng: fastrand::Rng,
}

impl PatrolAi {
    pub fn new(span_min: f32, span_max: f32, seed: u64) -> Self {
        Self {
            span_min: span_min.min(span_max),
            span_max: span_max.max(span_min),
            target_x: None,
            last_attack: None,
            attacking: false,
            pause_until: 0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Pick a fresh patrol point keeping a body of `half_width` inside the span.
    pub fn pick_target(&mut self, half_width: f32) -> f32 {
        let lo = self.span_min + half_width;
        let hi = self.span_max - half_width;
        let x = if lo < hi {
            lo + self.rng.f32() * (hi - lo)
        } else {
            (self.span_min + self.span_max) * 0.5
        };
        self.target_x = Some(x);
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patrol_targets_stay_inside_span() {
        let mut ai = PatrolAi::new(100.0, 400.0, 7);
        for _ in 0..100 {
            let x = ai.pick_target(12.0);
            assert!((112.0..=388.0).contains(&x));
        }
    }

    #[test]
    fn test_degenerate_span_uses_center() {
        let mut ai = PatrolAi::new(100.0, 110.0, 1);
        assert_eq!(ai.pick_target(12.0), 105.0);
    }

    #[test]
    fn test_same_seed_same_targets() {
        let mut a = PatrolAi::new(0.0, 1000.0, 42);
        let mut b = PatrolAi::new(0.0, 1000.0, 42);
        for _ in 0..10 {
            assert_eq!(a.pick_target(10.0), b.pick_target(10.0));
        }
    }
}
