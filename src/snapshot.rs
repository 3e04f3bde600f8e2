//! Replication view of a character.
//!
//! A [`CharacterSnapshot`] carries everything a remote peer needs to show a
//! character exactly as the simulating side sees it. Applying a snapshot
//! copies the values verbatim, except that health is clamped to its maximum.
//! Nothing is re-derived, so the receiving side reaches the same display key
//! without running the state machine.
//!
//! # Example
//!
//! ```ignore
//! let json = CharacterSnapshot::capture(&ch).to_json()?;
//! CharacterSnapshot::from_json(&json)?.apply_to(&mut remote);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::animation::Animation;
use crate::components::character::{ActionTimers, Character, Health};
use crate::components::state::{AttackKind, StateId, WallSide};
use crate::components::status::StatusEffects;
use crate::components::tipping::Tipping;
use crate::error::CoreError;
use crate::resources::worldtime::Millis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub id: u64,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub facing_right: bool,
    pub state: StateId,
    pub state_entered_at: Millis,
    pub anim: Animation,
    pub health: Health,

    pub on_ground: bool,
    pub on_ladder: bool,
    pub can_grab_ladder: bool,
    pub touching_wall: WallSide,
    pub can_wall_jump: bool,
    pub is_crouching: bool,
    pub is_attacking: bool,
    pub is_dashing: bool,
    pub is_rolling: bool,
    pub is_sliding: bool,
    pub is_taking_hit: bool,
    pub is_dead: bool,
    pub intends_move: bool,
    pub death_animation_finished: bool,

    /// Overlay flags and timers, including the pose frozen at petrification.
    pub status: StatusEffects,
    pub attack_kind: Option<AttackKind>,
    pub attack_started: Millis,
    pub attack_duration: Millis,
    pub hit_timer: Millis,
    pub timers: ActionTimers,
    pub tipping: Tipping,
}

impl CharacterSnapshot {
    pub fn capture(ch: &Character) -> Self {
        Self {
            id: ch.id,
            position: ch.position,
            velocity: ch.velocity,
            acceleration: ch.acceleration,
            facing_right: ch.facing_right,
            state: ch.state,
            state_entered_at: ch.state_entered_at,
            anim: ch.anim,
            health: ch.health,
            on_ground: ch.on_ground,
            on_ladder: ch.on_ladder,
            can_grab_ladder: ch.can_grab_ladder,
            touching_wall: ch.touching_wall,
            can_wall_jump: ch.can_wall_jump,
            is_crouching: ch.is_crouching,
            is_attacking: ch.is_attacking,
            is_dashing: ch.is_dashing,
            is_rolling: ch.is_rolling,
            is_sliding: ch.is_sliding,
            is_taking_hit: ch.is_taking_hit,
            is_dead: ch.is_dead,
            intends_move: ch.intends_move,
            death_animation_finished: ch.death_animation_finished,
            status: ch.status,
            attack_kind: ch.attack_kind,
            attack_started: ch.attack_started,
            attack_duration: ch.attack_duration,
            hit_timer: ch.hit_timer,
            timers: ch.timers,
            tipping: ch.tipping,
        }
    }

    /// Overwrite the replicated fields of `ch`.
    pub fn apply_to(&self, ch: &mut Character) {
        ch.position = self.position;
        ch.velocity = self.velocity;
        ch.acceleration = self.acceleration;
        ch.facing_right = self.facing_right;
        ch.state = self.state;
        ch.state_entered_at = self.state_entered_at;
        ch.anim = self.anim;
        ch.health = Health {
            current: self.health.current.min(self.health.max),
            max: self.health.max,
        };
        ch.on_ground = self.on_ground;
        ch.on_ladder = self.on_ladder;
        ch.can_grab_ladder = self.can_grab_ladder;
        ch.touching_wall = self.touching_wall;
        ch.can_wall_jump = self.can_wall_jump;
        ch.is_crouching = self.is_crouching;
        ch.is_attacking = self.is_attacking;
        ch.is_dashing = self.is_dashing;
        ch.is_rolling = self.is_rolling;
        ch.is_sliding = self.is_sliding;
        ch.is_taking_hit = self.is_taking_hit;
        ch.is_dead = self.is_dead;
        ch.intends_move = self.intends_move;
        ch.death_animation_finished = self.death_animation_finished;
        ch.status = self.status;
        ch.attack_kind = self.attack_kind;
        ch.attack_started = self.attack_started;
        ch.attack_duration = self.attack_duration;
        ch.hit_timer = self.hit_timer;
        ch.timers = self.timers;
        ch.tipping = self.tipping;
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}
