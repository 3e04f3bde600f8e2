//! Damage intake, healing and melee hit detection.
//!
//! Damage reaching zero health kills in the same call: `is_dead` is set and
//! `death`/`death_nm` is requested before the function returns.

use log::{debug, info};

use crate::components::boxcollider::Aabb;
use crate::components::character::Character;
use crate::components::state::StateId;
use crate::systems::collision::{Interaction, Interactions, WorldView};
use crate::systems::context::TickContext;
use crate::systems::statemachine::{death_clip, rest_state, set_state};

/// The crouch attack swings this much lower than the standing ones.
const CROUCH_ATTACK_DROP: f32 = 10.0;

/// Take a hit. Returns true if the damage was applied.
///
/// Ignored while dead, petrified or inside the post-hit cooldown.
pub fn take_damage(ch: &mut Character, amount: u32, ctx: &TickContext) -> bool {
    if ch.is_dead || ch.status.is_petrified {
        return false;
    }
    if ch.in_hit_cooldown(ctx.now(), ctx.config) {
        debug!("character {}: {} damage ignored during hit cooldown", ch.id, amount);
        return false;
    }
    ch.is_taking_hit = true;
    ch.hit_timer = ctx.now();
    inflict(ch, amount, ctx, true);
    true
}

/// Periodic damage from a status overlay.
///
/// Bypasses the hit cooldown and never plays the hit reaction, so a burning
/// or electrified character keeps its overlay state.
pub fn take_status_damage(ch: &mut Character, amount: u32, ctx: &TickContext) -> bool {
    if ch.is_dead || ch.status.is_petrified {
        return false;
    }
    inflict(ch, amount, ctx, false);
    true
}

fn inflict(ch: &mut Character, amount: u32, ctx: &TickContext, react: bool) {
    let remaining = ch.health.damage(amount);
    debug!(
        "character {}: took {} damage, {}/{} left",
        ch.id, amount, remaining, ch.health.max
    );
    if remaining == 0 {
        ch.is_dead = true;
        ch.tipping.reset();
        let death = death_clip(ch.velocity, ctx.clips);
        info!("character {}: died", ch.id);
        set_state(ch, death, ctx);
    } else if react && !ch.state.is_fire_state() {
        set_state(ch, StateId::Hit, ctx);
    }
}

/// Restore full health and bring a dead character back.
///
/// Stone cannot be healed. Returns true if anything changed.
pub fn heal_to_full(ch: &mut Character, ctx: &TickContext) -> bool {
    if ch.status.is_petrified || ch.status.is_stone_smashed {
        debug!("character {}: cannot heal stone", ch.id);
        return false;
    }
    ch.health.restore();
    ch.is_taking_hit = false;
    if ch.is_dead {
        ch.is_dead = false;
        ch.death_animation_finished = false;
    }
    if ch.state.is_death() || ch.state == StateId::Hit {
        set_state(ch, rest_state(ch), ctx);
    }
    true
}

/// Place the attack hitbox in front of the character, centred on its body.
pub fn position_attack_hitbox(ch: &mut Character) {
    let rect = ch.rect();
    let size = ch.attack_hitbox_size();
    let left = if ch.facing_right {
        rect.right()
    } else {
        rect.left() - size.x
    };
    let mut top = rect.center().y - size.y * 0.5;
    if ch.state == StateId::CrouchAttack {
        top += CROUCH_ATTACK_DROP;
    }
    ch.attack_hitbox = Aabb::from_xywh(left, top, size.x, size.y);
}

/// Record hits of the current swing on other characters.
///
/// Each target is hit at most once per swing. An intact statue is smashed
/// instead of damaged.
pub fn check_attack_hits(ch: &mut Character, view: &WorldView, ctx: &TickContext, out: &mut Interactions) {
    position_attack_hitbox(ch);
    if !ch.is_attacking || !ch.is_active() || ch.status.is_petrified {
        return;
    }
    let Some(kind) = ch.attack_kind else {
        return;
    };
    let damage = ctx.config.attack_profile(kind).damage;

    for other in view.others.iter() {
        if other.id == ch.id || !other.rect.is_valid() || ch.hits_this_attack.contains(&other.id) {
            continue;
        }
        if !ch.attack_hitbox.intersects(&other.rect) {
            continue;
        }
        let interaction = if other.statue {
            Interaction::Smash { target: other.id }
        } else if other.alive && !other.invincible {
            Interaction::Hit {
                target: other.id,
                damage,
            }
        } else {
            continue;
        };
        if ch.hits_this_attack.try_push(other.id).is_err() {
            break;
        }
        debug!("character {} {:?} hits {}", ch.id, kind, other.id);
        out.push(interaction);
    }
}

/// Shatter a statue into rubble.
pub fn smash(ch: &mut Character, ctx: &TickContext) -> bool {
    if !ch.status.is_petrified || ch.status.is_stone_smashed {
        return false;
    }
    info!("character {}: statue smashed", ch.id);
    set_state(ch, StateId::Smashed, ctx)
}

/// Kill a stompable character landed on from above.
pub fn stomp_kill(ch: &mut Character, ctx: &TickContext) -> bool {
    if !ch.stompable || !ch.is_active() || ch.status.is_petrified {
        return false;
    }
    info!("character {}: stomped", ch.id);
    ch.health.current = 0;
    ch.is_dead = true;
    set_state(ch, StateId::Death, ctx)
}
