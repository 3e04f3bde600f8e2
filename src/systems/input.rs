//! Intent handling.
//!
//! [`apply_intent`] turns a character's [`Intent`] into accelerations,
//! facing and ability state requests. [`refresh_locomotion_state`] runs after
//! the character has moved and keeps the logical state in line with its
//! motion: landing ends a fall, running out of input ends a run, walking off
//! a ledge starts one.
//!
//! Neither function polls devices; any input layer, network peer or AI
//! [`Behavior`](crate::components::behavior::Behavior) only has to fill the
//! [`Intent`] component.
//!
//! # Related
//!
//! - [`crate::systems::behavior`] – writes AI intents
//! - [`crate::systems::orchestrator::update_character`] – call order

use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::components::character::{Character, Cooldowns};
use crate::components::intent::Intent;
use crate::components::state::{AttackKind, StateId, WallSide};
use crate::resources::gameconfig::PROJECTILE_SLOTS;
use crate::systems::collision::{WorldView, can_stand_up};
use crate::systems::context::TickContext;
use crate::systems::physics::fire_multipliers;
use crate::systems::statemachine::{ladder_state, rest_state, set_state};

/// Horizontal speed below which an attack uses its standing variant.
const STANDING_ATTACK_MAX_SPEED: f32 = 0.5;
const LADDER_JUMP_FACTOR: f32 = 0.8;
const LADDER_JUMP_RUN_FACTOR: f32 = 0.5;
const WALL_JUMP_RUN_FACTOR: f32 = 1.5;
/// Fraction of run speed needed to start a slide.
const SLIDE_MIN_SPEED_FACTOR: f32 = 0.5;
/// Downward speed that turns an airborne character's state into `fall`.
const FALL_MIN_SPEED: f32 = 1.5;

/// A projectile the character fired this tick. Simulating it is up to the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileRequest {
    pub owner: u64,
    pub slot: u8,
    pub origin: Vec2,
    /// Unit aim vector.
    pub direction: Vec2,
}

/// No input is accepted at all.
fn action_blocked(ch: &Character) -> bool {
    let s = &ch.status;
    ch.is_dead || ch.invalid || s.is_petrified || s.is_cold() || s.is_zapped || ch.tipping.active
}

/// In the middle of something that ability triggers cannot interrupt.
fn busy(ch: &Character) -> bool {
    ch.is_dashing
        || ch.is_rolling
        || ch.is_sliding
        || ch.state == StateId::Turn
        || (ch.is_taking_hit && ch.state == StateId::Hit)
}

/// Burning or smouldering variant of a standing or crouching pose.
fn fire_pose(ch: &Character, crouching: bool) -> Option<StateId> {
    if ch.status.is_aflame {
        Some(if crouching {
            StateId::BurningCrouch
        } else {
            StateId::Burning
        })
    } else if ch.status.is_deflaming {
        Some(if crouching {
            StateId::DeflameCrouch
        } else {
            StateId::Deflame
        })
    } else {
        None
    }
}

/// Apply one tick of intent. Returns a projectile request if one was fired.
pub fn apply_intent(
    ch: &mut Character,
    intent: &Intent,
    view: &WorldView,
    ctx: &TickContext,
) -> Option<ProjectileRequest> {
    ch.intends_move = intent.wants_horizontal_move();
    if action_blocked(ch) {
        ch.acceleration.x = 0.0;
        return None;
    }

    steer(ch, intent.horizontal(), ctx);

    if ch.on_ladder {
        let speed = ctx.config.physics.ladder_climb_speed;
        ch.acceleration.x = 0.0;
        ch.velocity.y = match (intent.up, intent.down) {
            (true, false) => -speed,
            (false, true) => speed,
            _ => 0.0,
        };
    }

    if intent.crouch_toggle {
        toggle_crouch(ch, view, ctx);
    }
    if intent.jump {
        jump(ch, view, ctx);
    }
    if intent.up
        && !ch.on_ground
        && ch.touching_wall != WallSide::None
        && ch.state == StateId::WallSlide
    {
        set_state(ch, StateId::WallClimb, ctx);
    }

    let on_fire = ch.status.on_fire();
    let can_act = !on_fire && !busy(ch) && !ch.on_ladder;
    if can_act {
        if intent.attack1 {
            attack(ch, AttackKind::Primary, ctx);
        } else if intent.attack2 {
            attack(ch, AttackKind::Secondary, ctx);
        }
        start_movement_ability(ch, intent, ctx);
    }

    if intent.interact && !on_fire {
        if ch.can_grab_ladder && !ch.on_ladder {
            ch.on_ladder = true;
            ch.velocity = Vec2::ZERO;
            ch.acceleration = Vec2::ZERO;
            set_state(ch, StateId::LadderIdle, ctx);
        } else if ch.on_ladder {
            ch.on_ladder = false;
            set_state(ch, rest_state(ch), ctx);
        }
    }

    match intent.projectile {
        Some(slot) if can_act => fire_projectile(ch, intent, slot, ctx),
        _ => None,
    }
}

/// Horizontal acceleration, facing and turn requests.
fn steer(ch: &mut Character, direction: f32, ctx: &TickContext) {
    let accel = ctx.tuning(ch).accel;
    if ch.is_rolling {
        // Integration reads only the sign to nudge the roll.
        ch.acceleration.x = direction * accel;
        return;
    }
    let can_control = !(ch.is_dashing
        || ch.is_sliding
        || ch.on_ladder
        || (ch.is_attacking && ch.state.is_rooted_attack())
        || matches!(
            ch.state,
            StateId::Turn | StateId::Hit | StateId::Death | StateId::DeathNm | StateId::WallHang
        ));
    if !can_control {
        ch.acceleration.x = 0.0;
        return;
    }

    let (accel_mul, _) = fire_multipliers(ch, ctx);
    ch.acceleration.x = direction * accel * accel_mul;
    if direction == 0.0 {
        return;
    }
    let facing_right = direction > 0.0;
    if facing_right != ch.facing_right
        && ch.on_ground
        && !ch.is_crouching
        && !ch.is_attacking
        && !ch.status.on_fire()
        && matches!(ch.state, StateId::Idle | StateId::Run)
    {
        ch.facing_right = facing_right;
        set_state(ch, StateId::Turn, ctx);
    }
    ch.facing_right = facing_right;
}

fn toggle_crouch(ch: &mut Character, view: &WorldView, ctx: &TickContext) {
    if ch.is_crouching {
        if !can_stand_up(ch, view) {
            debug!("character {}: no headroom to stand up", ch.id);
            return;
        }
        let next = fire_pose(ch, false).unwrap_or(if ch.intends_move {
            StateId::Run
        } else {
            StateId::Idle
        });
        set_state(ch, next, ctx);
        return;
    }

    let can_crouch = ch.on_ground
        && !ch.on_ladder
        && !ch.is_dashing
        && !ch.is_rolling
        && !ch.is_sliding
        && !ch.is_attacking
        && !matches!(
            ch.state,
            StateId::Turn | StateId::Hit | StateId::Death | StateId::DeathNm | StateId::Jump
        );
    if !can_crouch {
        return;
    }
    let next = fire_pose(ch, true).unwrap_or(if ctx.clips.has(StateId::CrouchTrans) {
        StateId::CrouchTrans
    } else {
        StateId::Crouch
    });
    set_state(ch, next, ctx);
}

fn jump(ch: &mut Character, view: &WorldView, ctx: &TickContext) {
    let blocked = ch.is_attacking
        || ch.is_dashing
        || ch.is_rolling
        || ch.is_sliding
        || matches!(ch.state, StateId::Turn | StateId::Death | StateId::DeathNm);
    let stunned = ch.state == StateId::Hit
        || (ch.is_taking_hit && ctx.since(ch.hit_timer) < ctx.tuning(ch).hit_stun_ms);
    if blocked || (stunned && !ch.status.on_fire()) {
        return;
    }
    if ch.is_crouching {
        if !can_stand_up(ch, view) {
            return;
        }
        ch.is_crouching = false;
    }

    let physics = &ctx.config.physics;
    let run_speed = ctx.tuning(ch).run_speed;
    if ch.on_ground {
        ch.velocity.y = physics.jump_strength;
    } else if ch.on_ladder {
        ch.velocity.y = physics.jump_strength * LADDER_JUMP_FACTOR;
        ch.velocity.x = run_speed * LADDER_JUMP_RUN_FACTOR * ch.facing_sign();
        ch.on_ladder = false;
    } else if ch.can_wall_jump && ch.touching_wall != WallSide::None {
        let away = -ch.touching_wall.sign();
        ch.velocity.y = physics.jump_strength;
        ch.velocity.x = run_speed * WALL_JUMP_RUN_FACTOR * away;
        ch.facing_right = away > 0.0;
        ch.can_wall_jump = false;
        ch.touching_wall = WallSide::None;
    } else {
        return;
    }
    // Burning characters keep their fire state, so set the airborne flags here
    // rather than relying on the jump entry effects.
    ch.on_ground = false;
    ch.acceleration.y = physics.gravity;
    set_state(ch, StateId::Jump, ctx);
}

/// Pick the moving or standing variant, preferring one with a clip.
fn attack_state(kind: AttackKind, moving: bool, ctx: &TickContext) -> StateId {
    let preferred = kind.state(moving);
    let other = kind.state(!moving);
    if !ctx.clips.has(preferred) && ctx.clips.has(other) {
        other
    } else {
        preferred
    }
}

fn attack(ch: &mut Character, kind: AttackKind, ctx: &TickContext) {
    let kind = if ch.is_crouching {
        AttackKind::Crouch
    } else if ch.is_attacking {
        // Only a second primary swing inside the first one can chain.
        if kind == AttackKind::Primary && ch.attack_kind == Some(AttackKind::Primary) {
            AttackKind::Combo
        } else {
            return;
        }
    } else {
        kind
    };
    let moving = ch.intends_move || ch.velocity.x.abs() >= STANDING_ATTACK_MAX_SPEED;
    set_state(ch, attack_state(kind, moving, ctx), ctx);
}

fn start_movement_ability(ch: &mut Character, intent: &Intent, ctx: &TickContext) {
    let now = ctx.now();
    let timing = &ctx.config.timing;
    let grounded_standing = ch.on_ground && !ch.is_crouching && !ch.is_attacking;

    if intent.dash
        && grounded_standing
        && Cooldowns::ready(ch.cooldowns.last_dash, timing.dash_cooldown_ms, now)
    {
        set_state(ch, StateId::Dash, ctx);
    } else if intent.roll
        && grounded_standing
        && Cooldowns::ready(ch.cooldowns.last_roll, timing.roll_cooldown_ms, now)
    {
        set_state(ch, StateId::Roll, ctx);
    } else if intent.down
        && grounded_standing
        && ch.state == StateId::Run
        && ch.velocity.x.abs() >= ctx.tuning(ch).run_speed * SLIDE_MIN_SPEED_FACTOR
    {
        let next = if ctx.clips.has(StateId::SlideTransStart) {
            StateId::SlideTransStart
        } else {
            StateId::Slide
        };
        set_state(ch, next, ctx);
    }
}

fn fire_projectile(
    ch: &mut Character,
    intent: &Intent,
    slot: u8,
    ctx: &TickContext,
) -> Option<ProjectileRequest> {
    let index = usize::from(slot);
    if index >= PROJECTILE_SLOTS {
        debug!("character {}: projectile slot {} out of range", ch.id, slot);
        return None;
    }
    let now = ctx.now();
    let cooldown = ctx.config.timing.projectile_cooldowns_ms[index];
    if !Cooldowns::ready(ch.cooldowns.projectiles[index], cooldown, now) {
        return None;
    }
    ch.cooldowns.projectiles[index] = Some(now);

    let aim_y = if intent.up {
        -1.0
    } else if intent.down || ch.is_crouching {
        1.0
    } else {
        0.0
    };
    let aim = Vec2::new(intent.horizontal(), aim_y);
    let direction = if aim == Vec2::ZERO {
        Vec2::new(ch.facing_sign(), 0.0)
    } else {
        aim.normalize_or_zero()
    };
    let rect = ch.rect();
    let origin = Vec2::new(
        rect.center().x + ch.facing_sign() * rect.width() * 0.5,
        rect.center().y,
    );
    Some(ProjectileRequest {
        owner: ch.id,
        slot,
        origin,
        direction,
    })
}

/// States that finish on their own and must not be overridden by motion.
fn locomotion_locked(ch: &Character) -> bool {
    let s = &ch.status;
    ch.is_dead
        || ch.invalid
        || ch.tipping.active
        || s.is_petrified
        || s.is_cold()
        || s.is_zapped
        || ch.is_attacking
        || ch.is_dashing
        || ch.is_rolling
        || ch.is_sliding
        || matches!(
            ch.state,
            StateId::Hit
                | StateId::Turn
                | StateId::CrouchTrans
                | StateId::SlideTransStart
                | StateId::SlideTransEnd
        )
}

/// Derive the locomotion state from where the character is and how it moves.
pub fn refresh_locomotion_state(ch: &mut Character, ctx: &TickContext) {
    if locomotion_locked(ch) {
        return;
    }
    let vy = ch.velocity.y;

    let next = if ch.on_ladder {
        ladder_state(vy)
    } else if let Some(pose) = fire_pose(ch, ch.is_crouching && ch.on_ground) {
        pose
    } else if !ch.on_ground {
        let on_wall = ch.touching_wall != WallSide::None;
        if on_wall && vy > 0.0 && !ch.state.is_wall_state() {
            StateId::WallSlide
        } else if ch.state.is_wall_state() && on_wall {
            return;
        } else if matches!(ch.state, StateId::Jump | StateId::JumpFallTrans) {
            return;
        } else if vy > FALL_MIN_SPEED || ch.state.is_wall_state() || ch.state.is_ladder_state() {
            StateId::Fall
        } else {
            return;
        }
    } else if ch.is_crouching {
        if ch.intends_move {
            StateId::CrouchWalk
        } else {
            StateId::Crouch
        }
    } else if ch.intends_move {
        StateId::Run
    } else {
        StateId::Idle
    };

    // Ignition plays its own clip until the next pose change.
    let igniting = matches!(
        (ch.state, next),
        (StateId::Aflame, StateId::Burning) | (StateId::AflameCrouch, StateId::BurningCrouch)
    );
    if next != ch.state && !igniting {
        set_state(ch, next, ctx);
    }
}
