//! Per-tick character update.
//!
//! [`update_character`] advances one character by one fixed tick:
//!
//! 1. status overlays (may take over the whole tick)
//! 2. action timers, ladder contact, intent
//! 3. ledge tipping (may take over the rest of the tick)
//! 4. integration, then collision along X and then Y
//! 5. hazards, attack hits, locomotion state and display key
//!
//! It only reads other characters through [`BodySnapshot`]s taken before
//! anyone moved this tick; effects on them come back as [`Interaction`]s.
//! [`character_tick_system`] runs it for every character in ascending id
//! order and applies the interactions once every character is done, so no
//! update ever observes another character's half-finished tick.
//!
//! # Related
//!
//! - [`crate::systems::status::update_status`]
//! - [`crate::systems::tipping`]
//! - [`crate::systems::collision`]

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{error, info};
use rustc_hash::FxHashMap;

use crate::components::boxcollider::Aabb;
use crate::components::character::Character;
use crate::components::intent::Intent;
use crate::components::level::{Hazard, Ladder, Platform};
use crate::events::projectile::ProjectileFiredEvent;
use crate::resources::animationstore::AnimationStore;
use crate::resources::gameconfig::GameConfig;
use crate::resources::worldtime::WorldTime;
use crate::systems::collision::{
    BodySnapshot, Interaction, Interactions, WorldView, check_hazards, check_ladders,
    leave_lost_ladder, move_x, move_y, resolve_platforms_x, resolve_platforms_y,
};
use crate::systems::combat::{check_attack_hits, smash, stomp_kill, take_damage};
use crate::systems::context::TickContext;
use crate::systems::input::{ProjectileRequest, apply_intent, refresh_locomotion_state};
use crate::systems::physics::integrate;
use crate::systems::statemachine::{display_key, tick_timers};
use crate::systems::status::{apply_aflame, update_status};
use crate::systems::tipping::{check_tipping, update_tipping};

/// What a character's tick produced for the outside world.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickOutcome {
    /// Effects on other characters, applied after every update.
    pub interactions: Interactions,
    pub projectile: Option<ProjectileRequest>,
    /// A status overlay owned the tick; intent and full collision were skipped.
    pub handled_by_status: bool,
}

/// Advance one character by one tick.
pub fn update_character(
    ch: &mut Character,
    intent: &Intent,
    view: &WorldView,
    ctx: &TickContext,
) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    if ch.invalid {
        return outcome;
    }
    ch.sanitize();

    if update_status(ch, ctx) {
        outcome.handled_by_status = true;
        settle(ch, view, ctx);
        sync_display_key(ch, ctx);
        return outcome;
    }

    tick_timers(ch, ctx);
    check_ladders(ch, view);
    leave_lost_ladder(ch, ctx);
    outcome.projectile = apply_intent(ch, intent, view, ctx);

    check_tipping(ch, view, ctx);
    if update_tipping(ch, ctx) {
        sync_display_key(ch, ctx);
        return outcome;
    }

    integrate(ch, ctx);
    let was_on_ground = ch.on_ground;
    ch.on_ground = false;
    let touched = move_x(ch, view, ctx, was_on_ground, &mut outcome.interactions);
    move_y(ch, view, ctx, was_on_ground, touched, &mut outcome.interactions);

    check_hazards(ch, view, ctx);
    check_attack_hits(ch, view, ctx, &mut outcome.interactions);
    refresh_locomotion_state(ch, ctx);
    sync_display_key(ch, ctx);
    outcome
}

/// Gravity and platform contact only, for characters a status overlay holds.
fn settle(ch: &mut Character, view: &WorldView, ctx: &TickContext) {
    integrate(ch, ctx);
    if ch.velocity == Vec2::ZERO {
        return;
    }
    let was_on_ground = ch.on_ground;
    ch.on_ground = false;
    ch.position.x += ch.velocity.x;
    resolve_platforms_x(ch, view, ctx, was_on_ground);
    ch.position.y += ch.velocity.y;
    resolve_platforms_y(ch, view, ctx, was_on_ground);
}

fn sync_display_key(ch: &mut Character, ctx: &TickContext) {
    let key = display_key(ch, ctx.clips);
    if key != ch.anim.key {
        ch.anim.key = key;
        ch.anim.restart(ctx.now());
    }
}

/// Apply an effect another character's update recorded against `ch`.
pub fn apply_interaction(ch: &mut Character, interaction: &Interaction, ctx: &TickContext) {
    match *interaction {
        Interaction::Push {
            velocity_x,
            offset_x,
            ..
        } => {
            if ch.is_active() && !ch.status.is_petrified && !ch.status.is_cold() {
                ch.velocity.x = velocity_x;
                ch.position.x += offset_x;
            }
        }
        Interaction::Hit { damage, .. } => {
            take_damage(ch, damage, ctx);
        }
        Interaction::Smash { .. } => {
            smash(ch, ctx);
        }
        Interaction::Stomp { .. } => {
            stomp_kill(ch, ctx);
        }
        Interaction::Ignite { .. } => {
            apply_aflame(ch, ctx);
        }
    }
}

/// Run [`update_character`] for every character, then apply interactions.
#[allow(clippy::too_many_arguments)]
pub fn character_tick_system(
    mut characters: Query<(Entity, &mut Character, &mut Intent)>,
    platforms: Query<&Platform>,
    ladders: Query<&Ladder>,
    hazards: Query<&Hazard>,
    store: Res<AnimationStore>,
    config: Res<GameConfig>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    let platform_rects: Vec<Aabb> = platforms.iter().map(|p| p.rect).collect();
    let ladder_rects: Vec<Aabb> = ladders.iter().map(|l| l.rect).collect();
    let hazard_list: Vec<Hazard> = hazards.iter().copied().collect();

    let mut order: Vec<(u64, Entity)> = characters.iter().map(|(e, ch, _)| (ch.id, e)).collect();
    order.sort_unstable();
    let entities: FxHashMap<u64, Entity> = order.iter().copied().collect();
    let snapshots: Vec<BodySnapshot> = characters
        .iter()
        .map(|(_, ch, _)| BodySnapshot::capture(ch))
        .collect();
    let view = WorldView {
        platforms: &platform_rects,
        ladders: &ladder_rects,
        hazards: &hazard_list,
        others: &snapshots,
    };

    let mut deferred: Vec<Interaction> = Vec::new();
    for &(id, entity) in &order {
        let Ok((_, mut ch, mut intent)) = characters.get_mut(entity) else {
            continue;
        };
        let Some(clips) = store.get(&ch.clip_set) else {
            if !ch.invalid {
                error!("character {}: unknown clip set '{}'; marking invalid", id, ch.clip_set);
                ch.invalid = true;
            }
            continue;
        };
        let ctx = TickContext::new(&*time, &config, clips);
        let outcome = update_character(&mut ch, &intent, &view, &ctx);
        intent.clear_triggers();

        deferred.extend(outcome.interactions);
        if let Some(request) = outcome.projectile {
            commands.trigger(ProjectileFiredEvent { entity, request });
        }
    }

    for interaction in &deferred {
        let Some(&entity) = entities.get(&interaction.target()) else {
            continue;
        };
        let Ok((_, mut ch, _)) = characters.get_mut(entity) else {
            continue;
        };
        let Some(clips) = store.get(&ch.clip_set) else {
            continue;
        };
        let ctx = TickContext::new(&*time, &config, clips);
        apply_interaction(&mut ch, interaction, &ctx);
    }
}

/// Despawn characters whose death (or smash) has fully played out, and
/// characters that became invalid.
pub fn despawn_finished_characters(query: Query<(Entity, &Character)>, mut commands: Commands) {
    for (entity, ch) in query.iter() {
        if ch.marked_for_removal() {
            info!("character {}: removed from the world", ch.id);
            commands.entity(entity).despawn();
        }
    }
}
