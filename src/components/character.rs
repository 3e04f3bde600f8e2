//! The simulated character.
//!
//! [`Character`] is the single entity model shared by players and AI-driven
//! enemies. It bundles kinematics (position, velocity, acceleration), the two
//! collision profiles, the discrete [`StateId`], action flags, the status
//! overlays, health, timers and cooldowns. Which intents feed it (device input
//! or an AI [`Behavior`](super::behavior::Behavior)) is the only difference
//! between a player and an enemy.
//!
//! The position is the feet centre: the collision box extends upward from it
//! and is centred horizontally.
//!
//! # Related
//!
//! - [`crate::systems::orchestrator::update_character`] – advances one character by one tick
//! - [`crate::snapshot::CharacterSnapshot`] – replication view of this struct

use arrayvec::ArrayVec;
use bevy_ecs::prelude::Component;
use glam::Vec2;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::components::animation::Animation;
use crate::components::boxcollider::{Aabb, BoxCollider};
use crate::components::state::{AttackKind, StateId, WallSide};
use crate::components::status::StatusEffects;
use crate::components::tipping::Tipping;
use crate::resources::gameconfig::{GameConfig, PROJECTILE_SLOTS};
use crate::resources::worldtime::Millis;

/// Targets a single attack swing can damage before it ends.
pub const MAX_HITS_PER_ATTACK: usize = 8;

/// Standing collision box width as a fraction of a tile.
const STANDING_WIDTH_TILES: f32 = 0.6;
const STANDING_HEIGHT: f32 = 60.0;
const CROUCH_HEIGHT: f32 = 30.0;
const CROUCH_WIDTH_FACTOR: f32 = 1.1;
const ATTACK_HITBOX_SIZE: Vec2 = Vec2::new(45.0, 30.0);

/// Which tuning section drives a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    #[default]
    Player,
    Enemy,
}

/// Hit points. `current` never exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Subtract `amount`, saturating at zero. Returns the remaining health.
    pub fn damage(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }
}

/// Start times of timed actions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionTimers {
    pub dash_started: Millis,
    pub roll_started: Millis,
    pub slide_started: Millis,
    pub wall_climb_started: Millis,
}

/// Last-use timestamps gating repeated abilities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cooldowns {
    pub last_attack: Option<Millis>,
    pub last_dash: Option<Millis>,
    pub last_roll: Option<Millis>,
    pub projectiles: [Option<Millis>; PROJECTILE_SLOTS],
}

impl Cooldowns {
    /// True if an ability last used at `last` may be used again at `now`.
    pub fn ready(last: Option<Millis>, cooldown: Millis, now: Millis) -> bool {
        last.is_none_or(|t| now.saturating_sub(t) >= cooldown)
    }
}

#[derive(Component, Debug, Clone)]
pub struct Character {
    /// Stable identifier, unique within a world.
    pub id: u64,
    pub archetype: Archetype,
    /// Name of the clip set in the animation store.
    pub clip_set: String,

    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub standing: BoxCollider,
    pub crouching: BoxCollider,

    pub state: StateId,
    pub state_entered_at: Millis,

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
    pub facing_right: bool,
    /// Horizontal move intent seen on the last tick.
    pub intends_move: bool,

    pub status: StatusEffects,
    pub health: Health,

    pub attack_kind: Option<AttackKind>,
    pub attack_started: Millis,
    pub attack_duration: Millis,
    /// Ids already damaged by the current swing.
    pub hits_this_attack: ArrayVec<u64, MAX_HITS_PER_ATTACK>,
    pub attack_hitbox: Aabb,
    pub hit_timer: Millis,
    pub timers: ActionTimers,
    pub cooldowns: Cooldowns,

    pub tipping: Tipping,
    pub anim: Animation,
    pub death_animation_finished: bool,
    /// Set when no clip at all can be shown; the entity leaves the simulation.
    pub invalid: bool,
    /// Ignores attack hits.
    pub invincible: bool,
    /// Can be killed by landing on its head.
    pub stompable: bool,
}

impl Character {
    /// Spawn a character with default flags, zero velocity and full health.
    pub fn new(id: u64, archetype: Archetype, position: Vec2, config: &GameConfig) -> Self {
        let width = config.collision.tile_size * STANDING_WIDTH_TILES;
        let max_health = config.archetype(archetype).max_health;
        let mut ch = Self {
            id,
            archetype,
            clip_set: String::new(),
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::new(0.0, config.physics.gravity),
            standing: BoxCollider::feet_anchored(width, STANDING_HEIGHT),
            crouching: BoxCollider::feet_anchored(width * CROUCH_WIDTH_FACTOR, CROUCH_HEIGHT),
            state: StateId::Idle,
            state_entered_at: 0,
            on_ground: false,
            on_ladder: false,
            can_grab_ladder: false,
            touching_wall: WallSide::None,
            can_wall_jump: false,
            is_crouching: false,
            is_attacking: false,
            is_dashing: false,
            is_rolling: false,
            is_sliding: false,
            is_taking_hit: false,
            is_dead: false,
            facing_right: true,
            intends_move: false,
            status: StatusEffects::default(),
            health: Health::new(max_health),
            attack_kind: None,
            attack_started: 0,
            attack_duration: 0,
            hits_this_attack: ArrayVec::new(),
            attack_hitbox: Aabb::default(),
            hit_timer: 0,
            timers: ActionTimers::default(),
            cooldowns: Cooldowns::default(),
            tipping: Tipping::default(),
            anim: Animation::new(StateId::Idle),
            death_animation_finished: false,
            invalid: false,
            invincible: false,
            stompable: archetype == Archetype::Enemy,
        };
        ch.attack_hitbox = Aabb::from_center(ch.rect().center(), ATTACK_HITBOX_SIZE);
        ch
    }

    pub fn with_clip_set(mut self, name: impl Into<String>) -> Self {
        self.clip_set = name.into();
        self
    }

    pub fn with_facing(mut self, facing_right: bool) -> Self {
        self.facing_right = facing_right;
        self
    }

    pub fn with_health(mut self, current: u32, max: u32) -> Self {
        self.health = Health {
            current: current.min(max),
            max,
        };
        self
    }

    /// Place the character standing on a surface at height `ground_y`.
    pub fn grounded_at(mut self, ground_y: f32) -> Self {
        self.position.y = ground_y;
        self.on_ground = true;
        self.acceleration.y = 0.0;
        self
    }

    /// Collision profile matching the crouch flag.
    pub fn collider(&self) -> &BoxCollider {
        if self.is_crouching {
            &self.crouching
        } else {
            &self.standing
        }
    }

    /// Current collision box in world space.
    pub fn rect(&self) -> Aabb {
        self.collider().aabb(self.position)
    }

    /// Collision box the character would have standing up.
    pub fn standing_rect(&self) -> Aabb {
        self.standing.aabb(self.position)
    }

    pub fn attack_hitbox_size(&self) -> Vec2 {
        ATTACK_HITBOX_SIZE
    }

    /// 1.0 facing right, -1.0 facing left.
    pub fn facing_sign(&self) -> f32 {
        if self.facing_right { 1.0 } else { -1.0 }
    }

    /// Inside the post-hit invulnerability window.
    pub fn in_hit_cooldown(&self, now: Millis, config: &GameConfig) -> bool {
        self.is_taking_hit
            && now.saturating_sub(self.hit_timer) < config.archetype(self.archetype).hit_cooldown_ms
    }

    /// Whether the world container should drop this entity.
    ///
    /// An intact statue stays in the world until it is smashed.
    pub fn marked_for_removal(&self) -> bool {
        if self.invalid {
            return true;
        }
        if !self.death_animation_finished {
            return false;
        }
        self.status.is_stone_smashed || (self.is_dead && !self.status.is_petrified)
    }

    /// Alive and taking part in interactions.
    pub fn is_active(&self) -> bool {
        !self.is_dead && !self.invalid
    }

    /// Replace non-finite kinematic components with zero.
    ///
    /// Returns true if anything was repaired.
    pub fn sanitize(&mut self) -> bool {
        let mut repaired = false;
        for (name, v) in [
            ("position", &mut self.position),
            ("velocity", &mut self.velocity),
            ("acceleration", &mut self.acceleration),
        ] {
            if !v.x.is_finite() {
                v.x = 0.0;
                repaired = true;
                warn!("character {}: non-finite {}.x reset to 0", self.id, name);
            }
            if !v.y.is_finite() {
                v.y = 0.0;
                repaired = true;
                warn!("character {}: non-finite {}.y reset to 0", self.id, name);
            }
        }
        repaired
    }
}
