//! Per-tick velocity integration.
//!
//! [`integrate`] turns accelerations into velocities: gravity, horizontal
//! acceleration, friction, the roll speed band and the speed caps. It never
//! moves the character; position updates happen axis by axis in
//! [`collision`](crate::systems::collision) so that each axis can be resolved
//! right after it moves.
//!
//! # Related
//!
//! - [`crate::resources::gameconfig::PhysicsTuning`] – coefficients
//! - [`crate::systems::orchestrator::update_character`] – call order

use crate::components::character::Character;
use crate::components::state::StateId;
use crate::systems::context::TickContext;
use crate::systems::statemachine::set_state;

/// Velocity below which a coasting character stops.
const STOP_SPEED: f32 = 0.1;
/// A slide slower than this ends.
const SLIDE_END_SPEED: f32 = 0.5;
const AIR_FRICTION_FACTOR: f32 = 0.2;
const SLIDE_FRICTION_FACTOR: f32 = 0.7;
const ROLL_MAX_FACTOR: f32 = 1.15;
const ROLL_MIN_FACTOR: f32 = 0.4;
const ROLL_COAST_DECAY: f32 = 0.99;
const ROLL_STOP_SPEED: f32 = 0.5;

/// Acceleration and speed multipliers while burning.
pub fn fire_multipliers(ch: &Character, ctx: &TickContext) -> (f32, f32) {
    let p = &ctx.config.physics;
    if ch.status.is_aflame {
        (p.aflame_accel, p.aflame_speed)
    } else if ch.status.is_deflaming {
        (p.deflame_accel, p.deflame_speed)
    } else {
        (1.0, 1.0)
    }
}

/// Whether gravity acts on the character this tick.
pub fn gravity_applies(ch: &Character, ctx: &TickContext) -> bool {
    if ch.on_ladder || ch.is_dashing || ch.status.is_cold() {
        return false;
    }
    if ch.state == StateId::WallHang {
        return false;
    }
    if ch.state == StateId::WallClimb && ch.velocity.y <= ctx.config.physics.wall_climb_speed + 0.1 {
        return false;
    }
    !(ch.status.is_petrified && !ch.status.is_stone_smashed && ch.on_ground)
}

/// Update velocity from acceleration for one tick.
pub fn integrate(ch: &mut Character, ctx: &TickContext) {
    let physics = &ctx.config.physics;
    let tuning = ctx.tuning(ch);

    if gravity_applies(ch, ctx) {
        if !ch.on_ladder {
            ch.acceleration.y = physics.gravity;
        }
        ch.velocity.y += ch.acceleration.y;
    } else if ch.status.is_petrified && ch.on_ground {
        ch.acceleration.y = 0.0;
    }

    let (accel_mul, speed_mul) = fire_multipliers(ch, ctx);

    if ch.is_rolling {
        integrate_roll(ch, tuning.accel * accel_mul, physics.roll_control_factor, physics.roll_speed);
    } else {
        let locked = ch.is_dashing
            || ch.on_ladder
            || ch.status.is_cold()
            || (ch.status.is_petrified && !ch.status.is_stone_smashed)
            || (ch.is_dead && !ch.status.is_petrified);
        if !locked {
            ch.velocity.x += ch.acceleration.x;
        }

        apply_friction(ch, tuning.friction, ctx);

        let mut cap = tuning.run_speed * speed_mul;
        if ch.is_crouching && ch.state == StateId::CrouchWalk {
            cap *= physics.crouch_speed_factor;
        }
        if !ch.is_dashing && !ch.is_sliding {
            ch.velocity.x = ch.velocity.x.clamp(-cap, cap);
        }

        if ch.is_dead && !ch.status.is_petrified {
            ch.acceleration.x = 0.0;
        } else if ch.status.is_cold() || (ch.status.is_petrified && !ch.status.is_stone_smashed) {
            ch.velocity.x = 0.0;
            ch.acceleration.x = 0.0;
        }
    }

    if ch.velocity.y > 0.0 && !ch.on_ladder {
        ch.velocity.y = ch.velocity.y.min(physics.terminal_velocity);
    }
    if ch.state == StateId::WallSlide {
        ch.velocity.y = ch.velocity.y.min(physics.wall_slide_speed);
    }
}

fn integrate_roll(ch: &mut Character, accel: f32, control_factor: f32, roll_speed: f32) {
    // Steering input arrives as the sign of acceleration.x.
    let nudge = if ch.acceleration.x == 0.0 {
        0.0
    } else {
        ch.acceleration.x.signum() * accel * control_factor
    };
    ch.velocity.x += nudge;

    let max = roll_speed * ROLL_MAX_FACTOR;
    let min = roll_speed * ROLL_MIN_FACTOR;
    let vx = ch.velocity.x.clamp(-max, max);
    ch.velocity.x = if ch.facing_right { vx.max(min) } else { vx.min(-min) };

    if nudge == 0.0 && ch.velocity.x.abs() > STOP_SPEED {
        ch.velocity.x *= ROLL_COAST_DECAY;
    }
    if ch.velocity.x.abs() < ROLL_STOP_SPEED {
        ch.velocity.x = 0.0;
    }
}

fn apply_friction(ch: &mut Character, friction: f32, ctx: &TickContext) {
    let coefficient = if ch.on_ground && ch.acceleration.x == 0.0 && !ch.is_sliding {
        friction
    } else if !ch.on_ground && !ch.is_attacking && !ch.state.is_wall_state() {
        friction * AIR_FRICTION_FACTOR
    } else if ch.is_sliding {
        friction * SLIDE_FRICTION_FACTOR
    } else {
        return;
    };

    if ch.velocity.x.abs() > STOP_SPEED {
        ch.velocity.x += ch.velocity.x * coefficient;
    } else {
        ch.velocity.x = 0.0;
    }

    if ch.is_sliding && ch.velocity.x.abs() < SLIDE_END_SPEED {
        ch.is_sliding = false;
        let next = if ctx.clips.has(StateId::SlideTransEnd) {
            StateId::SlideTransEnd
        } else {
            StateId::Crouch
        };
        set_state(ch, next, ctx);
    }
}
