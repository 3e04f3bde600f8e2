//! Ledge tipping.
//!
//! A grounded character hanging far enough over the edge of its support
//! rotates over that edge for a few ticks and then falls. Tipping only starts
//! when a probe just past the edge finds no platform at about the same
//! height, so stepping across adjacent tiles or stairs never triggers it.

use glam::Vec2;
use log::debug;

use crate::components::boxcollider::Aabb;
use crate::components::character::Character;
use crate::components::state::StateId;
use crate::components::tipping::Tipping;
use crate::systems::collision::WorldView;
use crate::systems::context::TickContext;
use crate::systems::statemachine::set_state;

/// Largest feet-to-surface distance that still counts as standing on it.
const SUPPORT_MAX_GAP: f32 = 5.0;
/// Minimum horizontal overlap with a support, as a fraction of body width.
const SUPPORT_MIN_OVERLAP: f32 = 0.1;
/// Overhang beyond which tipping starts, as a fraction of half the body width.
const OVERHANG_FACTOR: f32 = 0.55;
const PROBE_SIZE_FACTOR: f32 = 0.5;
const ANGLE_STEP: f32 = 2.0;
const MAX_ANGLE: f32 = 35.0;
const NUDGE_PER_TICK: f32 = 0.7;
/// Fraction of run speed kept when tipping turns into a fall.
const FALL_RUN_FACTOR: f32 = 0.3;
const FALL_START_SPEED: f32 = 1.0;

/// The surface the character stands on: closest top within
/// [`SUPPORT_MAX_GAP`] of the feet, ties broken by horizontal distance.
pub fn find_support(ch: &Character, view: &WorldView) -> Option<Aabb> {
    let rect = ch.rect();
    let feet = rect.bottom();
    let center_x = rect.center().x;
    let bodies = view.bodies(ch.id).map(|b| b.rect);

    view.solids(ch.id)
        .chain(bodies)
        .filter(|s| rect.horizontal_overlap(s) >= rect.width() * SUPPORT_MIN_OVERLAP)
        .map(|s| ((feet - s.top()).abs(), (center_x - s.center().x).abs(), s))
        .filter(|(gap, _, _)| *gap < SUPPORT_MAX_GAP)
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)))
        .map(|(_, _, s)| s)
}

/// True when nothing near the support's height continues past `pivot_x`.
fn gap_confirmed(ch: &Character, view: &WorldView, support: &Aabb, direction: f32, pivot_x: f32, tile: f32) -> bool {
    let rect = ch.rect();
    let size = Vec2::new(rect.width(), rect.height()) * PROBE_SIZE_FACTOR;
    let left = if direction < 0.0 { pivot_x - size.x } else { pivot_x };
    // Straddles the surface line so flush neighbours are found too.
    let probe = Aabb::from_xywh(left, support.top() - size.y * 0.5, size.x, size.y);

    !view
        .solids(ch.id)
        .filter(|s| s != support)
        .any(|s| probe.intersects(&s) && (s.top() - support.top()).abs() < tile * 0.5)
}

/// Start tipping if the character hangs over an edge with a gap below.
///
/// A grounded character with no support at all is switched to `fall`.
/// Returns true if tipping started.
pub fn check_tipping(ch: &mut Character, view: &WorldView, ctx: &TickContext) -> bool {
    let s = &ch.status;
    if !ch.on_ground
        || ch.tipping.active
        || ch.on_ladder
        || s.is_cold()
        || s.is_petrified
        || ch.is_dead
        || ch.is_dashing
        || ch.is_rolling
        || ch.is_sliding
    {
        return false;
    }

    let Some(support) = find_support(ch, view) else {
        debug!("character {}: grounded without support, falling", ch.id);
        ch.on_ground = false;
        set_state(ch, StateId::Fall, ctx);
        return false;
    };

    let rect = ch.rect();
    let threshold = rect.width() * 0.5 * OVERHANG_FACTOR;
    let (direction, pivot_x) = if rect.left() < support.left() && rect.right() < support.right() {
        (-1.0, support.left())
    } else if rect.right() > support.right() && rect.left() > support.left() {
        (1.0, support.right())
    } else {
        return false;
    };
    let overhang = if direction < 0.0 {
        support.left() - rect.left()
    } else {
        rect.right() - support.right()
    };
    if overhang <= threshold {
        return false;
    }
    if !gap_confirmed(ch, view, &support, direction, pivot_x, ctx.config.collision.tile_size) {
        debug!("character {}: overhang at {:.1} but no gap below", ch.id, pivot_x);
        return false;
    }

    debug!("character {}: tipping over edge at {:.1}", ch.id, pivot_x);
    ch.tipping = Tipping::start(direction, pivot_x);
    ch.velocity.x = 0.0;
    ch.acceleration.x = 0.0;
    true
}

/// Advance an active tip. Returns true while tipping owns the tick.
pub fn update_tipping(ch: &mut Character, ctx: &TickContext) -> bool {
    if !ch.tipping.active {
        return false;
    }
    let direction = ch.tipping.direction;
    ch.tipping.angle = (ch.tipping.angle + ANGLE_STEP * direction).clamp(-MAX_ANGLE, MAX_ANGLE);
    ch.position.x += NUDGE_PER_TICK * direction;

    if ch.tipping.angle.abs() >= MAX_ANGLE {
        ch.tipping.reset();
        ch.on_ground = false;
        ch.velocity = Vec2::new(direction * ctx.tuning(ch).run_speed * FALL_RUN_FACTOR, FALL_START_SPEED);
        set_state(ch, StateId::Fall, ctx);
        return true;
    }

    ch.velocity.y = 0.0;
    ch.acceleration = Vec2::ZERO;
    true
}
