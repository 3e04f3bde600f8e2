//! The character state machine.
//!
//! [`set_state`] is the single entry point for every state change. A request
//! goes through these steps in order:
//!
//! 1. **Status guard** – an active overlay (stone, zap, cold) only admits a
//!    short list of states; anything else is rejected untouched.
//! 2. **Fire auto-adjust** – while burning, ordinary requests are rewritten to
//!    the matching fire variant so the fire visuals are not lost.
//! 3. **Clip fallback** – a state without a clip for this character becomes
//!    `fall`/`idle`, then any playable clip. With no clip at all the character
//!    is marked invalid.
//! 4. **Change check** – re-entering the current state is a no-op except for
//!    re-triggerable states (`hit`, fresh ignition, fresh zap).
//! 5. **Flag clearing, overlay flags, frame reset, entry effects.**
//!
//! [`display_key`] is the pure query the animation collaborator uses, and
//! [`on_clip_finished`] is the only path from animation back into state.
//!
//! # Related
//!
//! - [`crate::components::state::StateId`] – state groupings used by the guards
//! - [`crate::systems::animation`] – reports exhausted clips

use glam::Vec2;
use log::{debug, error, warn};

use crate::components::character::Character;
use crate::components::state::{AttackKind, StateId};
use crate::resources::animationstore::ClipSet;
use crate::systems::context::TickContext;

/// Speed below which a dying character plays the in-place death clip.
const DEATH_NM_MAX_SPEED_X: f32 = 0.5;
const DEATH_NM_MAX_SPEED_Y: f32 = 1.0;
/// Vertical speed above which a ladder character counts as climbing.
const LADDER_CLIMB_MIN_SPEED: f32 = 0.1;

/// Death clip for a character dying while moving at `velocity`.
pub(crate) fn death_clip(velocity: Vec2, clips: &ClipSet) -> StateId {
    let still = velocity.x.abs() < DEATH_NM_MAX_SPEED_X && velocity.y.abs() < DEATH_NM_MAX_SPEED_Y;
    if still && clips.has(StateId::DeathNm) {
        StateId::DeathNm
    } else {
        StateId::Death
    }
}

/// Ladder pose for a vertical speed.
pub(crate) fn ladder_state(vy: f32) -> StateId {
    if vy.abs() > LADDER_CLIMB_MIN_SPEED {
        StateId::LadderClimb
    } else {
        StateId::LadderIdle
    }
}

/// Whether the active overlay admits `requested`.
///
/// Checked in priority order: intact stone, smashed stone, zap, frozen,
/// defrosting. Cold blocks `hit` so damage taken while frozen cannot thaw
/// the character early.
pub fn status_allows(ch: &Character, requested: StateId) -> bool {
    use StateId::*;
    let s = &ch.status;
    if s.is_petrified && !s.is_stone_smashed {
        return matches!(requested, Petrified | Smashed | Death | DeathNm | Idle);
    }
    if s.is_stone_smashed {
        return matches!(requested, Smashed | Death | DeathNm | Idle);
    }
    if s.is_zapped {
        return matches!(requested, Zapped | Death | DeathNm | Idle | Fall);
    }
    if s.is_frozen {
        return matches!(
            requested,
            Frozen | Defrost | Death | DeathNm | Petrified | Smashed | Idle | Zapped
        );
    }
    if s.is_defrosting {
        return matches!(
            requested,
            Frozen | Defrost | Death | DeathNm | Petrified | Smashed | Idle | Fall | Zapped
        );
    }
    true
}

/// Rewrite ordinary requests to their fire variant while burning.
pub fn adjust_for_fire(ch: &Character, requested: StateId) -> StateId {
    use StateId::*;
    if requested.is_status_overlay() {
        return requested;
    }
    if ch.status.is_aflame {
        if requested.is_fire_state() || matches!(requested, Death | DeathNm | Hit | Idle) {
            return requested;
        }
        return if ch.is_crouching { BurningCrouch } else { Burning };
    }
    if ch.status.is_deflaming {
        if requested.is_deflame_state() || matches!(requested, Death | DeathNm | Hit | Idle) {
            return requested;
        }
        return if ch.is_crouching { DeflameCrouch } else { Deflame };
    }
    requested
}

/// Find a state with a playable clip, starting from `requested`.
///
/// Stone states render a derived image and never need a clip.
pub fn resolve_clip(clips: &ClipSet, requested: StateId, on_ground: bool) -> Option<StateId> {
    if matches!(requested, StateId::Petrified | StateId::Smashed) || clips.has(requested) {
        return Some(requested);
    }
    let fallback = if on_ground { StateId::Idle } else { StateId::Fall };
    if clips.has(fallback) {
        return Some(fallback);
    }
    clips.any_playable()
}

fn is_retrigger(ch: &Character, target: StateId) -> bool {
    match target {
        StateId::Hit => true,
        StateId::Aflame | StateId::AflameCrouch => !ch.state.is_aflame_state(),
        StateId::Zapped => !ch.status.is_zapped,
        _ => false,
    }
}

/// Request a transition. Returns true if the state was (re)entered.
pub fn set_state(ch: &mut Character, requested: StateId, ctx: &TickContext) -> bool {
    if ch.invalid {
        return false;
    }
    if !status_allows(ch, requested) {
        debug!(
            "character {}: {} -> {} blocked by status overlay",
            ch.id, ch.state, requested
        );
        return false;
    }

    let adjusted = adjust_for_fire(ch, requested);
    let target = match resolve_clip(ctx.clips, adjusted, ch.on_ground) {
        Some(state) => state,
        None => {
            error!(
                "character {}: no playable clip for '{}' and no fallback; marking invalid",
                ch.id, requested
            );
            ch.invalid = true;
            return false;
        }
    };
    if target != adjusted {
        warn!(
            "character {}: clip for '{}' missing, falling back to '{}'",
            ch.id, adjusted, target
        );
    }

    let changing = target != ch.state;
    let mut can_change = changing || is_retrigger(ch, target);
    if ch.is_dead
        && ch.death_animation_finished
        && !ch.status.is_stone_smashed
        && !ch.status.is_petrified
        && !matches!(
            target,
            StateId::Death | StateId::DeathNm | StateId::Petrified | StateId::Smashed | StateId::Idle
        )
    {
        can_change = false;
    }
    if !can_change {
        return false;
    }

    let now = ctx.now();
    if changing {
        debug!("character {}: {} -> {}", ch.id, ch.state, target);
    }

    clear_action_flags(ch, target, ctx);
    apply_overlay_flags(ch, target, now);

    ch.state = target;
    if changing
        || target.is_attack()
        || matches!(
            target,
            StateId::Hit | StateId::Aflame | StateId::AflameCrouch | StateId::Jump | StateId::Zapped
        )
    {
        ch.anim.key = target;
        ch.anim.restart(now);
    }
    ch.state_entered_at = now;

    apply_entry_effects(ch, target, ctx);
    true
}

fn clear_action_flags(ch: &mut Character, target: StateId, ctx: &TickContext) {
    if !target.is_attack() && ch.is_attacking {
        ch.is_attacking = false;
        ch.attack_kind = None;
    }
    if target != StateId::Hit
        && ch.is_taking_hit
        && ctx.since(ch.hit_timer) >= ctx.tuning(ch).hit_cooldown_ms
    {
        ch.is_taking_hit = false;
    }
    if target != StateId::Dash {
        ch.is_dashing = false;
    }
    if target != StateId::Roll {
        ch.is_rolling = false;
    }
    if !target.is_slide_state() {
        ch.is_sliding = false;
    }
    if ch.tipping.active && (target.is_status_overlay() || target.is_death()) {
        ch.tipping.reset();
    }
    if target.is_crouch_state() {
        ch.is_crouching = true;
    } else if !matches!(target, StateId::Petrified | StateId::Smashed) {
        ch.is_crouching = false;
    }
}

/// Keep the overlay flags consistent with the state being entered.
fn apply_overlay_flags(ch: &mut Character, target: StateId, now: u64) {
    let s = &mut ch.status;
    match target {
        t if t.is_aflame_state() => {
            if !s.on_fire() {
                s.fire_started = Some(now);
            }
            // Burning variants continue the aflame clock; only ignition restarts it.
            if !s.is_aflame || matches!(t, StateId::Aflame | StateId::AflameCrouch) {
                s.aflame_started = now;
                s.aflame_last_damage = now;
            }
            s.is_aflame = true;
            s.is_deflaming = false;
            s.clear_cold();
            s.is_zapped = false;
        }
        t if t.is_deflame_state() => {
            if !s.is_deflaming {
                s.deflame_started = now;
            }
            s.is_deflaming = true;
            s.is_aflame = false;
            s.clear_cold();
            s.is_zapped = false;
        }
        StateId::Frozen => {
            if !s.is_frozen {
                s.frozen_started = now;
            }
            s.is_frozen = true;
            s.is_defrosting = false;
            s.clear_fire();
            s.is_zapped = false;
        }
        StateId::Defrost => {
            s.is_defrosting = true;
            s.is_frozen = false;
            s.clear_fire();
            s.is_zapped = false;
        }
        StateId::Zapped => {
            if !s.is_zapped {
                s.zapped_started = now;
                s.zapped_last_damage = now;
            }
            s.is_zapped = true;
            s.clear_fire();
            s.clear_cold();
        }
        StateId::Petrified => {
            if !s.is_petrified {
                s.facing_at_petrification = ch.facing_right;
                s.was_crouching_when_petrified = ch.is_crouching;
            }
            s.clear_all();
            s.is_petrified = true;
            ch.is_dead = true;
            ch.death_animation_finished = true;
        }
        StateId::Smashed => {
            if !s.is_stone_smashed {
                s.smashed_started = now;
            }
            s.clear_all();
            s.is_petrified = true;
            s.is_stone_smashed = true;
            ch.is_dead = true;
            ch.death_animation_finished = false;
        }
        _ => {
            s.clear_all();
            s.was_crouching_when_petrified = false;
        }
    }
}

fn apply_entry_effects(ch: &mut Character, target: StateId, ctx: &TickContext) {
    let now = ctx.now();
    let physics = &ctx.config.physics;
    let run_speed = ctx.tuning(ch).run_speed;
    let facing = ch.facing_sign();

    match target {
        StateId::Dash => {
            ch.is_dashing = true;
            ch.timers.dash_started = now;
            ch.cooldowns.last_dash = Some(now);
            ch.velocity.x = physics.dash_speed * facing;
            ch.velocity.y = 0.0;
        }
        StateId::Roll => {
            ch.is_rolling = true;
            ch.timers.roll_started = now;
            ch.cooldowns.last_roll = Some(now);
            let roll = physics.roll_speed;
            let target_vx = roll * facing;
            if ch.velocity.x.abs() < roll * 0.7 {
                ch.velocity.x = target_vx;
            } else {
                ch.velocity.x = ch.velocity.x * 0.8 + target_vx * 0.2;
            }
            ch.velocity.x = ch.velocity.x.clamp(-roll, roll);
        }
        StateId::Slide | StateId::SlideTransStart => {
            if !ch.is_sliding {
                ch.timers.slide_started = now;
            }
            ch.is_sliding = true;
            if ch.velocity.x.abs() < run_speed * 0.5 {
                ch.velocity.x = run_speed * 0.6 * facing;
            }
        }
        t if t.is_attack() => {
            let kind = AttackKind::from_state(t).unwrap_or_default();
            ch.is_attacking = true;
            ch.attack_kind = Some(kind);
            ch.attack_started = now;
            ch.cooldowns.last_attack = Some(now);
            ch.hits_this_attack.clear();
            let frames = ctx.clips.frame_count(t) as f32;
            ch.attack_duration = if frames > 0.0 {
                let frame_ms =
                    ctx.config.timing.frame_ms as f32 * ctx.config.attack_profile(kind).frame_multiplier;
                (frames * frame_ms).round() as u64
            } else {
                ctx.config.timing.attack_state_ms
            };
            if t.is_rooted_attack() {
                ch.velocity.x = 0.0;
            }
        }
        StateId::Hit => {
            ch.is_taking_hit = true;
            ch.hit_timer = now;
            if !ch.on_ground && ch.velocity.y > -(physics.jump_strength * 0.5).abs() {
                ch.velocity.x *= -0.3;
                ch.velocity.y = physics.jump_strength * 0.4;
            }
            ch.is_attacking = false;
            ch.attack_kind = None;
        }
        StateId::Death | StateId::DeathNm => {
            ch.is_dead = true;
            ch.velocity.x = 0.0;
            if ch.velocity.y < -1.0 {
                ch.velocity.y = 1.0;
            }
            ch.acceleration.x = 0.0;
            ch.death_animation_finished = false;
        }
        StateId::Jump => {
            ch.on_ground = false;
            ch.acceleration.y = physics.gravity;
        }
        StateId::Fall => {
            ch.acceleration.y = physics.gravity;
        }
        StateId::WallClimb => {
            ch.timers.wall_climb_started = now;
            ch.velocity.y = physics.wall_climb_speed;
        }
        StateId::WallSlide | StateId::WallHang => {
            ch.timers.wall_climb_started = 0;
        }
        StateId::Frozen | StateId::Defrost | StateId::Smashed => {
            ch.velocity = Vec2::ZERO;
            ch.acceleration = Vec2::ZERO;
        }
        StateId::Petrified | StateId::Zapped => {
            ch.velocity = Vec2::ZERO;
            ch.acceleration = Vec2::ZERO;
            if !ch.on_ground {
                ch.acceleration.y = physics.gravity;
            }
        }
        _ => {}
    }
}

/// `idle` on the ground, `fall` in the air.
pub fn rest_state(ch: &Character) -> StateId {
    if ch.on_ground {
        StateId::Idle
    } else {
        StateId::Fall
    }
}

/// State to return to after an attack finishes.
fn after_attack_state(ch: &Character) -> StateId {
    if ch.state == StateId::CrouchAttack {
        StateId::Crouch
    } else if ch.on_ladder {
        StateId::LadderIdle
    } else if !ch.on_ground {
        StateId::Fall
    } else if ch.intends_move {
        StateId::Run
    } else {
        StateId::Idle
    }
}

/// Clip the animation collaborator should show for this character.
///
/// Pure: reads flags, state and velocity only. When the preferred key has no
/// clip, the same fallback chain as [`set_state`] applies.
pub fn display_key(ch: &Character, clips: &ClipSet) -> StateId {
    let key = preferred_display_key(ch, clips);
    resolve_clip(clips, key, ch.on_ground).unwrap_or(StateId::Idle)
}

fn preferred_display_key(ch: &Character, clips: &ClipSet) -> StateId {
    use StateId::*;
    let s = &ch.status;
    let v = ch.velocity;

    if s.is_stone_smashed {
        return Smashed;
    }
    if s.is_petrified {
        return Petrified;
    }
    if ch.is_dead {
        return death_clip(v, clips);
    }
    if s.is_zapped {
        return Zapped;
    }
    if s.is_frozen {
        return Frozen;
    }
    if s.is_defrosting {
        return Defrost;
    }
    if s.is_aflame {
        if matches!(ch.state, Aflame | AflameCrouch) {
            return ch.state;
        }
        return if ch.is_crouching { BurningCrouch } else { Burning };
    }
    if s.is_deflaming {
        return if ch.is_crouching { DeflameCrouch } else { Deflame };
    }
    if ch.state == Hit {
        return Hit;
    }
    if ch.is_attacking && ch.state.is_attack() {
        return ch.state;
    }
    if ch.is_dashing {
        return Dash;
    }
    if ch.is_rolling {
        return Roll;
    }
    if matches!(ch.state, Slide | SlideTransStart | SlideTransEnd | Turn | CrouchTrans) {
        return ch.state;
    }
    if ch.on_ladder {
        return ladder_state(v.y);
    }
    if ch.state.is_wall_state() {
        return ch.state;
    }
    if !ch.on_ground {
        return if matches!(ch.state, Jump | JumpFallTrans) {
            ch.state
        } else {
            Fall
        };
    }
    if ch.is_crouching {
        return if ch.intends_move { CrouchWalk } else { Crouch };
    }
    if ch.intends_move {
        return Run;
    }
    if clips.has(ch.state) {
        return ch.state;
    }
    Idle
}

/// React to a non-looping clip running out.
///
/// Only acts when the character's logical state still equals `clip`. Returns
/// the state transitioned to, if any.
pub fn on_clip_finished(ch: &mut Character, clip: StateId, ctx: &TickContext) -> Option<StateId> {
    use StateId::*;
    if ch.invalid || ch.state != clip {
        return None;
    }

    let next = match clip {
        Jump => {
            if ctx.clips.has(JumpFallTrans) {
                JumpFallTrans
            } else {
                Fall
            }
        }
        JumpFallTrans => Fall,
        Hit => {
            if ch.status.is_aflame {
                if ch.is_crouching { BurningCrouch } else { Burning }
            } else if ch.status.is_deflaming {
                if ch.is_crouching { DeflameCrouch } else { Deflame }
            } else {
                rest_state(ch)
            }
        }
        Turn => {
            if ch.intends_move {
                Run
            } else {
                Idle
            }
        }
        t if t.is_attack() => after_attack_state(ch),
        CrouchTrans => {
            if ch.intends_move {
                CrouchWalk
            } else {
                Crouch
            }
        }
        Slide | SlideTransEnd => Crouch,
        SlideTransStart => Slide,
        Dash | Roll => rest_state(ch),
        Death | DeathNm | Smashed => {
            ch.death_animation_finished = true;
            return None;
        }
        _ => return None,
    };

    set_state(ch, next, ctx).then_some(ch.state)
}

/// Expire timed actions that did not end through their clip.
pub fn tick_timers(ch: &mut Character, ctx: &TickContext) {
    let timing = &ctx.config.timing;

    if ch.is_dashing && ctx.since(ch.timers.dash_started) >= timing.dash_ms {
        ch.is_dashing = false;
        if ch.state == StateId::Dash {
            set_state(ch, rest_state(ch), ctx);
        }
    }
    if ch.is_rolling && ctx.since(ch.timers.roll_started) >= timing.roll_ms {
        ch.is_rolling = false;
        if ch.state == StateId::Roll {
            set_state(ch, rest_state(ch), ctx);
        }
    }
    if ch.is_sliding
        && matches!(ch.state, StateId::Slide | StateId::SlideTransStart)
        && ctx.since(ch.timers.slide_started) >= timing.slide_ms
    {
        let next = if ctx.clips.has(StateId::SlideTransEnd) {
            StateId::SlideTransEnd
        } else {
            StateId::Crouch
        };
        set_state(ch, next, ctx);
    }
    if ch.is_taking_hit && ctx.since(ch.hit_timer) >= ctx.tuning(ch).hit_cooldown_ms {
        ch.is_taking_hit = false;
        if ch.state == StateId::Hit {
            set_state(ch, rest_state(ch), ctx);
        }
    }
    if ch.is_attacking
        && ch.state.is_attack()
        && ctx.since(ch.attack_started) >= ch.attack_duration
    {
        let next = after_attack_state(ch);
        set_state(ch, next, ctx);
    }
    if ch.state == StateId::WallClimb && ctx.since(ch.timers.wall_climb_started) > timing.wall_climb_ms {
        set_state(ch, StateId::WallSlide, ctx);
    }
}
