//! Timed status overlays: fire, cold, electricity and stone.
//!
//! [`update_status`] runs first in every character tick. Returning `true`
//! means the overlay owns the tick: the orchestrator only lets gravity and
//! platform collision act on the character and skips intent, tipping,
//! character contacts and attacks.
//!
//! The `apply_*` functions are the entry points used by hazards, attacks and
//! tests. Each one refuses to stack on top of another overlay, so at most one
//! overlay family is ever active.
//!
//! # Related
//!
//! - [`crate::components::status::StatusEffects`] – the flags and timers
//! - [`crate::systems::statemachine::set_state`] – keeps the flags in sync with state

use glam::Vec2;
use log::{debug, info};

use crate::components::character::Character;
use crate::components::state::StateId;
use crate::systems::combat::take_status_damage;
use crate::systems::context::TickContext;
use crate::systems::statemachine::{rest_state, set_state};

/// Advance the active overlay. Returns true when it overrides the rest of
/// the tick.
pub fn update_status(ch: &mut Character, ctx: &TickContext) -> bool {
    let now = ctx.now();
    let status = &ctx.config.status;
    let tuning = ctx.tuning(ch);

    if ch.status.on_fire() {
        let started = *ch.status.fire_started.get_or_insert(now);
        if ctx.since(started) >= status.fire_watchdog_ms {
            debug!("character {}: fire watchdog expired", ch.id);
            extinguish(ch, ctx);
            return true;
        }
    }

    if ch.status.is_stone_smashed {
        if !ch.death_animation_finished && ctx.since(ch.status.smashed_started) >= status.smashed_ms {
            info!("character {}: rubble settled", ch.id);
            ch.death_animation_finished = true;
        }
        return true;
    }

    if ch.status.is_petrified {
        ch.velocity.x = 0.0;
        ch.acceleration.x = 0.0;
        ch.acceleration.y = if ch.on_ground { 0.0 } else { ctx.config.physics.gravity };
        return true;
    }

    if ch.status.is_zapped {
        if ctx.since(ch.status.zapped_started) >= status.zapped_ms {
            debug!("character {}: zap wore off", ch.id);
            set_state(ch, rest_state(ch), ctx);
        } else {
            if status.zapped_damage > 0 && ctx.since(ch.status.zapped_last_damage) >= status.zapped_tick_ms {
                ch.status.zapped_last_damage = now;
                take_status_damage(ch, status.zapped_damage, ctx);
            }
            return true;
        }
    }

    if ch.status.is_frozen {
        ch.velocity = Vec2::ZERO;
        if ctx.since(ch.status.frozen_started) >= tuning.frozen_ms {
            set_state(ch, StateId::Defrost, ctx);
        }
        return true;
    }
    if ch.status.is_defrosting {
        ch.velocity = Vec2::ZERO;
        if ctx.since(ch.status.frozen_started) >= tuning.frozen_ms + tuning.defrost_ms {
            set_state(ch, rest_state(ch), ctx);
        } else {
            return true;
        }
    }

    if ch.status.is_aflame {
        if ctx.since(ch.status.aflame_started) >= status.aflame_ms {
            debug!("character {}: flames dying down", ch.id);
            let next = if ch.is_crouching {
                StateId::DeflameCrouch
            } else {
                StateId::Deflame
            };
            set_state(ch, next, ctx);
        } else if status.aflame_damage > 0
            && ctx.since(ch.status.aflame_last_damage) >= status.aflame_tick_ms
        {
            ch.status.aflame_last_damage = now;
            take_status_damage(ch, status.aflame_damage, ctx);
        }
    } else if ch.status.is_deflaming && ctx.since(ch.status.deflame_started) >= status.deflame_ms {
        extinguish(ch, ctx);
    }

    ch.is_dead
}

/// End the fire cycle and return to `idle`/`fall`.
///
/// The flags are dropped before the request so the fire auto-adjust does not
/// turn `fall` back into a burning state.
fn extinguish(ch: &mut Character, ctx: &TickContext) {
    ch.status.clear_fire();
    if !ch.is_dead {
        set_state(ch, rest_state(ch), ctx);
    }
}

/// Set the character on fire. Returns false if another overlay, fire
/// included, is already active or the character is dead.
pub fn apply_aflame(ch: &mut Character, ctx: &TickContext) -> bool {
    let s = &ch.status;
    if s.on_fire() || s.is_cold() || s.is_zapped || s.is_petrified || ch.is_dead {
        debug!("character {}: ignition ignored", ch.id);
        return false;
    }
    let state = if ch.is_crouching {
        StateId::AflameCrouch
    } else {
        StateId::Aflame
    };
    set_state(ch, state, ctx)
}

/// Freeze the character in place.
pub fn apply_freeze(ch: &mut Character, ctx: &TickContext) -> bool {
    let s = &ch.status;
    if s.is_cold() || s.on_fire() || s.is_zapped || s.is_petrified || ch.is_dead {
        debug!("character {}: freeze ignored", ch.id);
        return false;
    }
    set_state(ch, StateId::Frozen, ctx)
}

pub fn apply_zap(ch: &mut Character, ctx: &TickContext) -> bool {
    let s = &ch.status;
    if s.is_zapped || s.on_fire() || s.is_cold() || s.is_petrified || ch.is_dead {
        debug!("character {}: zap ignored", ch.id);
        return false;
    }
    set_state(ch, StateId::Zapped, ctx)
}

/// Turn the character to stone. Terminal: health drops to zero and the
/// statue stays in the world until smashed.
pub fn apply_petrify(ch: &mut Character, ctx: &TickContext) -> bool {
    if ch.status.is_petrified || ch.is_dead || ch.status.is_zapped {
        debug!("character {}: petrify ignored", ch.id);
        return false;
    }
    info!("character {}: petrified", ch.id);
    ch.health.current = 0;
    set_state(ch, StateId::Petrified, ctx)
}
