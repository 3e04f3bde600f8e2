//! Axis-separated collision resolution.
//!
//! A character moves along X, is pushed out of whatever it now overlaps,
//! then does the same along Y. Platforms (and intact statues) are solid on
//! both axes. Other characters are read through [`BodySnapshot`]s taken at
//! the end of the previous tick; anything this character does *to* them is
//! recorded as an [`Interaction`] and applied by the orchestrator after every
//! character has been updated.
//!
//! # Landing
//!
//! A downward overlap settles the character on a surface only when the
//! horizontal overlap reaches `landing_overlap_ratio` of the body width and
//! the feet were at or above the surface before the move (or the character
//! was already standing within `ground_snap` of it). Without the second
//! condition a fast sideways graze would be read as a landing.
//!
//! # Related
//!
//! - [`crate::components::boxcollider::Aabb`] – overlap primitives
//! - [`crate::systems::orchestrator`] – applies the recorded interactions

use glam::Vec2;
use log::debug;
use smallvec::SmallVec;

use crate::components::boxcollider::Aabb;
use crate::components::character::{Archetype, Character};
use crate::components::level::{Hazard, HazardKind};
use crate::components::state::{StateId, WallSide};
use crate::systems::combat::take_damage;
use crate::systems::context::TickContext;
use crate::systems::statemachine::{rest_state, set_state};
use crate::systems::status::apply_aflame;

/// Tolerance on the "feet were above the surface" test.
const LANDING_EPSILON: f32 = 1.0;
const X_CONTACT_SLACK: f32 = 1.0;
/// Attackers shove what they touch at a fraction of the bounce speed.
const ATTACK_SHOVE_FACTOR: f32 = 0.5;
const STOMP_MIN_FALL_SPEED: f32 = 0.5;
const STOMP_MAX_PENETRATION: f32 = 1.0 / 3.0;
const LADDER_PROBE_WIDTH: f32 = 0.4;
const LADDER_PROBE_HEIGHT: f32 = 0.9;
const LADDER_ALIGN_FACTOR: f32 = 0.7;
const LAVA_SINK_FACTOR: f32 = 0.2;
const LAVA_OVERLAP_FACTOR: f32 = 0.2;
const LAVA_POP_JUMP_FACTOR: f32 = 0.75;
const LAVA_POP_RUN_FACTOR: f32 = 0.6;

/// Previous-tick view of another character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub id: u64,
    pub archetype: Archetype,
    pub rect: Aabb,
    pub velocity: Vec2,
    /// Alive and valid; takes part in pushes, stomps and hits.
    pub alive: bool,
    /// Intact stone. Solid like a platform, smashable by attacks.
    pub statue: bool,
    /// Cannot be pushed this tick.
    pub immovable: bool,
    pub stompable: bool,
    pub ignitable: bool,
    pub invincible: bool,
}

impl BodySnapshot {
    pub fn capture(ch: &Character) -> Self {
        let s = &ch.status;
        let statue = s.is_petrified && !s.is_stone_smashed && !ch.invalid;
        Self {
            id: ch.id,
            archetype: ch.archetype,
            rect: ch.rect(),
            velocity: ch.velocity,
            alive: ch.is_active(),
            statue,
            immovable: ch.is_attacking
                || statue
                || ch.is_dashing
                || ch.is_rolling
                || s.is_aflame
                || s.is_frozen,
            stompable: ch.stompable && ch.is_active() && !s.is_aflame && !s.is_frozen,
            ignitable: !(s.is_aflame || s.is_frozen || s.is_petrified),
            invincible: ch.invincible,
        }
    }
}

/// Read-only candidate lists for one character's tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldView<'a> {
    pub platforms: &'a [Aabb],
    pub ladders: &'a [Aabb],
    pub hazards: &'a [Hazard],
    pub others: &'a [BodySnapshot],
}

impl<'a> WorldView<'a> {
    /// Everything solid for the character `self_id`: platforms plus intact statues.
    pub fn solids(&self, self_id: u64) -> impl Iterator<Item = Aabb> + 'a {
        let platforms = self.platforms.iter().copied().filter(Aabb::is_valid);
        let statues = self
            .others
            .iter()
            .filter(move |o| o.statue && o.id != self_id && o.rect.is_valid())
            .map(|o| o.rect);
        platforms.chain(statues)
    }

    /// Living characters other than `self_id`.
    pub fn bodies(&self, self_id: u64) -> impl Iterator<Item = &'a BodySnapshot> + 'a {
        self.others
            .iter()
            .filter(move |o| o.alive && o.id != self_id && o.rect.is_valid())
    }
}

/// Effect on another character, applied after every character has updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// Set the target's horizontal velocity and shift it by `offset_x`.
    Push {
        target: u64,
        velocity_x: f32,
        offset_x: f32,
    },
    Hit { target: u64, damage: u32 },
    Smash { target: u64 },
    Stomp { target: u64 },
    Ignite { target: u64 },
}

impl Interaction {
    /// Id of the character the effect lands on.
    pub fn target(&self) -> u64 {
        match *self {
            Interaction::Push { target, .. }
            | Interaction::Hit { target, .. }
            | Interaction::Smash { target }
            | Interaction::Stomp { target }
            | Interaction::Ignite { target } => target,
        }
    }
}

pub type Interactions = SmallVec<[Interaction; 4]>;

/// Move along X and resolve. Returns true if another character was touched.
pub fn move_x(
    ch: &mut Character,
    view: &WorldView,
    ctx: &TickContext,
    was_on_ground: bool,
    out: &mut Interactions,
) -> bool {
    ch.position.x += ch.velocity.x;
    resolve_platforms_x(ch, view, ctx, was_on_ground);
    let touched = resolve_characters_x(ch, view, ctx, out);
    if touched {
        resolve_platforms_x(ch, view, ctx, was_on_ground);
    }
    touched
}

/// Move along Y and resolve. Character contacts are skipped when the X pass
/// already touched someone.
pub fn move_y(
    ch: &mut Character,
    view: &WorldView,
    ctx: &TickContext,
    was_on_ground: bool,
    skip_characters: bool,
    out: &mut Interactions,
) {
    ch.position.y += ch.velocity.y;
    resolve_platforms_y(ch, view, ctx, was_on_ground);
    if !skip_characters && resolve_characters_y(ch, view, ctx, out) {
        resolve_platforms_y(ch, view, ctx, was_on_ground);
    }
}

pub fn resolve_platforms_x(ch: &mut Character, view: &WorldView, ctx: &TickContext, was_on_ground: bool) {
    let vx = ch.velocity.x;
    if vx == 0.0 {
        if !ch.on_ladder {
            ch.touching_wall = WallSide::None;
        }
        return;
    }
    let mut wall = WallSide::None;
    for solid in view.solids(ch.id) {
        let rect = ch.rect();
        if !rect.intersects(&solid) {
            continue;
        }
        let penetration = if vx > 0.0 {
            rect.right() - solid.left()
        } else {
            solid.right() - rect.left()
        };
        // Deeper than this tick's move: the overlap predates it (a body
        // sliding off a ledge), and the Y pass owns it.
        if penetration > vx.abs() + X_CONTACT_SLACK {
            continue;
        }
        let side = if vx > 0.0 {
            ch.position.x -= rect.right() - solid.left();
            WallSide::Right
        } else {
            ch.position.x += solid.right() - rect.left();
            WallSide::Left
        };
        ch.velocity.x = 0.0;

        if !was_on_ground && !ch.on_ladder {
            let rect = ch.rect();
            if rect.vertical_overlap(&solid) > rect.height() * ctx.config.collision.wall_overlap_ratio {
                wall = side;
            }
        }
    }

    if wall != WallSide::None {
        ch.touching_wall = wall;
        ch.can_wall_jump = true;
    } else if !ch.on_ladder {
        ch.touching_wall = WallSide::None;
    }
}

pub fn resolve_platforms_y(ch: &mut Character, view: &WorldView, ctx: &TickContext, was_on_ground: bool) {
    let tuning = &ctx.config.collision;
    for solid in view.solids(ch.id) {
        let rect = ch.rect();
        if !rect.intersects(&solid) {
            continue;
        }
        let overlap = rect.horizontal_overlap(&solid);
        let vy = ch.velocity.y;

        if vy >= 0.0 {
            if overlap < rect.width() * tuning.landing_overlap_ratio {
                continue;
            }
            let prev_bottom = rect.bottom() - vy;
            let was_above = prev_bottom <= solid.top() + LANDING_EPSILON;
            let can_snap = was_on_ground && rect.bottom() <= solid.top() + tuning.ground_snap;
            if !(was_above || can_snap) {
                continue;
            }
            let just_landed = !was_on_ground && !ch.on_ground;
            ch.position.y = solid.top();
            ch.on_ground = true;
            ch.velocity.y = 0.0;
            ch.acceleration.y = 0.0;
            if just_landed {
                ch.can_wall_jump = false;
                if !ch.is_sliding && !ch.state.is_slide_state() {
                    ch.velocity.x *= tuning.landing_friction;
                }
            }
        } else {
            if overlap < rect.width() * tuning.ceiling_overlap_ratio {
                continue;
            }
            ch.on_ladder = false;
            ch.position.y += solid.bottom() - rect.top();
            ch.velocity.y = 0.0;
        }
    }
}

/// Horizontal contacts with other characters. Returns true on any overlap.
pub fn resolve_characters_x(
    ch: &mut Character,
    view: &WorldView,
    ctx: &TickContext,
    out: &mut Interactions,
) -> bool {
    if !ch.is_active() || ch.status.is_petrified {
        return false;
    }
    let bounce = ctx.config.collision.bounce_velocity;
    let mut touched = false;

    for other in view.bodies(ch.id) {
        let rect = ch.rect();
        if !rect.intersects(&other.rect) {
            continue;
        }
        touched = true;

        if ch.status.is_aflame && other.ignitable && other.archetype != ch.archetype {
            out.push(Interaction::Ignite { target: other.id });
        }

        let toward_other: f32 = if rect.center().x < other.rect.center().x { 1.0 } else { -1.0 };

        if ch.is_attacking {
            out.push(Interaction::Push {
                target: other.id,
                velocity_x: toward_other * bounce * ATTACK_SHOVE_FACTOR,
                offset_x: 0.0,
            });
            continue;
        }

        let overlap = if toward_other > 0.0 {
            rect.right() - other.rect.left()
        } else {
            other.rect.right() - rect.left()
        };
        let closing = ch.velocity.x * toward_other > 0.0 && other.velocity.x * toward_other < 0.0;
        let share = if closing && !other.immovable { 0.5 } else { 1.0 };

        ch.position.x -= toward_other * overlap * share;
        ch.velocity.x = -toward_other * bounce;
        if !other.immovable {
            out.push(Interaction::Push {
                target: other.id,
                velocity_x: toward_other * bounce,
                offset_x: toward_other * overlap * (1.0 - share),
            });
        }
    }
    touched
}

/// Vertical contacts with other characters, stomps included.
pub fn resolve_characters_y(
    ch: &mut Character,
    view: &WorldView,
    ctx: &TickContext,
    out: &mut Interactions,
) -> bool {
    if !ch.is_active() || ch.status.is_petrified {
        return false;
    }
    let tuning = &ctx.config.collision;
    let mut touched = false;

    for other in view.bodies(ch.id) {
        let rect = ch.rect();
        if !rect.intersects(&other.rect) {
            continue;
        }
        touched = true;
        let vy = ch.velocity.y;

        if other.stompable && vy > STOMP_MIN_FALL_SPEED {
            let prev_bottom = rect.bottom() - vy;
            let penetration = rect.bottom() - other.rect.top();
            if prev_bottom <= other.rect.top() + tuning.stomp_grace
                && penetration >= 0.0
                && penetration < other.rect.height() * STOMP_MAX_PENETRATION
            {
                debug!("character {} stomps {}", ch.id, other.id);
                out.push(Interaction::Stomp { target: other.id });
                ch.position.y = other.rect.top() - 1.0;
                set_state(ch, StateId::Jump, ctx);
                ch.on_ground = false;
                ch.velocity.y = tuning.stomp_bounce;
                return true;
            }
        }

        if vy > 0.0 && rect.center().y < other.rect.center().y {
            ch.position.y = other.rect.top();
            ch.on_ground = true;
            ch.velocity.y = 0.0;
        } else if vy < 0.0 && rect.center().y > other.rect.center().y {
            ch.position.y += other.rect.bottom() - rect.top();
            ch.velocity.y = 0.0;
        }
    }
    touched
}

/// Refresh `can_grab_ladder` from the ladder volumes.
pub fn check_ladders(ch: &mut Character, view: &WorldView) {
    let rect = ch.rect();
    let probe = Aabb::from_center(
        rect.center(),
        Vec2::new(rect.width() * LADDER_PROBE_WIDTH, rect.height() * LADDER_PROBE_HEIGHT),
    );
    let center = rect.center();
    ch.can_grab_ladder = view.ladders.iter().filter(|l| l.is_valid()).any(|ladder| {
        probe.intersects(ladder)
            && (center.x - ladder.center().x).abs() < ladder.width() * LADDER_ALIGN_FACTOR
            && ladder.top() < center.y
            && center.y < ladder.bottom()
    });
}

/// Drop off a ladder the character no longer overlaps.
pub fn leave_lost_ladder(ch: &mut Character, ctx: &TickContext) {
    if ch.on_ladder && !ch.can_grab_ladder {
        ch.on_ladder = false;
        set_state(ch, rest_state(ch), ctx);
    }
}

/// Apply hazard effects. At most one hazard triggers per tick.
///
/// Returns true if a hazard triggered.
pub fn check_hazards(ch: &mut Character, view: &WorldView, ctx: &TickContext) -> bool {
    if !ch.is_active()
        || ch.in_hit_cooldown(ctx.now(), ctx.config)
        || ch.status.is_petrified
        || ch.status.is_frozen
    {
        return false;
    }

    for hazard in view.hazards.iter().filter(|h| h.rect.is_valid()) {
        let rect = ch.rect();
        if !rect.intersects(&hazard.rect) {
            continue;
        }
        match hazard.kind {
            HazardKind::Lava => {
                let sunk = rect.bottom() > hazard.rect.top() + rect.height() * LAVA_SINK_FACTOR;
                let overlap = rect.horizontal_overlap(&hazard.rect) >= rect.width() * LAVA_OVERLAP_FACTOR;
                if !(sunk && overlap) {
                    continue;
                }
                debug!("character {} touched lava", ch.id);
                apply_aflame(ch, ctx);
                take_damage(ch, ctx.config.combat.lava_damage, ctx);
                if !ch.is_dead {
                    let away = if rect.center().x < hazard.rect.center().x { -1.0 } else { 1.0 };
                    ch.velocity.y = ctx.config.physics.jump_strength * LAVA_POP_JUMP_FACTOR;
                    ch.velocity.x = away * ctx.tuning(ch).run_speed * LAVA_POP_RUN_FACTOR;
                    ch.on_ground = false;
                    ch.on_ladder = false;
                }
                return true;
            }
        }
    }
    false
}

/// True when the standing box fits at the current position.
pub fn can_stand_up(ch: &Character, view: &WorldView) -> bool {
    let standing = ch.standing_rect();
    !view.solids(ch.id).any(|solid| standing.intersects(&solid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::animationstore::ClipSet;
    use crate::resources::gameconfig::GameConfig;
    use crate::resources::worldtime::FakeClock;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn body(ch: &Character) -> BodySnapshot {
        BodySnapshot::capture(ch)
    }

    // ==================== LANDING TESTS ====================

    #[test]
    fn test_lands_with_enough_overlap() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let floor = [Aabb::from_xywh(0.0, 100.0, 200.0, 20.0)];
        let view = WorldView {
            platforms: &floor,
            ..Default::default()
        };

        let mut ch = Character::new(1, Archetype::Player, Vec2::new(50.0, 96.0), &cfg);
        ch.velocity = Vec2::new(5.0, 6.0);
        let mut out = Interactions::new();
        move_y(&mut ch, &view, &ctx, false, false, &mut out);
        assert!(ch.on_ground);
        assert!(approx_eq(ch.position.y, 100.0));
        assert_eq!(ch.velocity.y, 0.0);
        assert!(approx_eq(ch.velocity.x, 4.0));
    }

    #[test]
    fn test_no_landing_below_overlap_threshold() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let floor = [Aabb::from_xywh(0.0, 100.0, 100.0, 20.0)];
        let view = WorldView {
            platforms: &floor,
            ..Default::default()
        };

        // Body spans 97..121; only 3 px (12.5% of 24) over the platform.
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(109.0, 96.0), &cfg);
        ch.velocity.y = 6.0;
        let mut out = Interactions::new();
        move_y(&mut ch, &view, &ctx, false, false, &mut out);
        assert!(!ch.on_ground);
        assert!(approx_eq(ch.position.y, 102.0));

        // 4 px (16.7%) is enough.
        let mut ch = Character::new(2, Archetype::Player, Vec2::new(108.0, 96.0), &cfg);
        ch.velocity.y = 6.0;
        move_y(&mut ch, &view, &ctx, false, false, &mut out);
        assert!(ch.on_ground);
    }

    #[test]
    fn test_side_entry_is_not_a_landing() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let wall = [Aabb::from_xywh(100.0, 0.0, 50.0, 200.0)];
        let view = WorldView {
            platforms: &wall,
            ..Default::default()
        };
        // Feet already 50 px below the top edge before moving.
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(105.0, 50.0), &cfg);
        ch.velocity.y = 3.0;
        let mut out = Interactions::new();
        move_y(&mut ch, &view, &ctx, false, false, &mut out);
        assert!(!ch.on_ground);
        assert!(approx_eq(ch.position.y, 53.0));
    }

    #[test]
    fn test_grounded_snap_keeps_footing() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let floor = [Aabb::from_xywh(0.0, 100.0, 200.0, 20.0)];
        let view = WorldView {
            platforms: &floor,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(50.0, 102.0), &cfg);
        ch.velocity = Vec2::new(5.0, 0.7);
        let mut out = Interactions::new();
        move_y(&mut ch, &view, &ctx, true, false, &mut out);
        assert!(ch.on_ground);
        assert!(approx_eq(ch.position.y, 100.0));
        // Not a fresh landing: no landing friction.
        assert!(approx_eq(ch.velocity.x, 5.0));
    }

    #[test]
    fn test_ceiling_bump_stops_ascent() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let ceiling = [Aabb::from_xywh(0.0, 0.0, 200.0, 20.0)];
        let view = WorldView {
            platforms: &ceiling,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(50.0, 85.0), &cfg);
        ch.on_ladder = true;
        ch.velocity.y = -10.0;
        let mut out = Interactions::new();
        move_y(&mut ch, &view, &ctx, false, false, &mut out);
        assert!(approx_eq(ch.rect().top(), 20.0));
        assert_eq!(ch.velocity.y, 0.0);
        assert!(!ch.on_ladder);
    }

    // ==================== WALL TESTS ====================

    #[test]
    fn test_airborne_wall_contact_enables_wall_jump() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let wall = [Aabb::from_xywh(100.0, 0.0, 40.0, 200.0)];
        let view = WorldView {
            platforms: &wall,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(85.0, 100.0), &cfg);
        ch.velocity.x = 6.0;
        let mut out = Interactions::new();
        move_x(&mut ch, &view, &ctx, false, &mut out);
        assert!(approx_eq(ch.rect().right(), 100.0));
        assert_eq!(ch.velocity.x, 0.0);
        assert_eq!(ch.touching_wall, WallSide::Right);
        assert!(ch.can_wall_jump);
    }

    #[test]
    fn test_leaving_ledge_is_not_pushed_back() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let ledge = [Aabb::from_xywh(0.0, 200.0, 200.0, 40.0)];
        let view = WorldView {
            platforms: &ledge,
            ..Default::default()
        };
        // Feet just below the ledge top, left edge still 2 px over it.
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(208.0, 202.0), &cfg);
        ch.velocity.x = 2.0;
        let mut out = Interactions::new();
        move_x(&mut ch, &view, &ctx, false, &mut out);
        assert!(approx_eq(ch.position.x, 210.0));
        assert_eq!(ch.velocity.x, 2.0);
    }

    #[test]
    fn test_grounded_wall_contact_is_not_a_wall() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let wall = [Aabb::from_xywh(0.0, 0.0, 40.0, 200.0)];
        let view = WorldView {
            platforms: &wall,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(55.0, 100.0), &cfg);
        ch.velocity.x = -6.0;
        let mut out = Interactions::new();
        move_x(&mut ch, &view, &ctx, true, &mut out);
        assert!(approx_eq(ch.rect().left(), 40.0));
        assert_eq!(ch.touching_wall, WallSide::None);
    }

    // ==================== CHARACTER TESTS ====================

    #[test]
    fn test_push_defers_effect_on_other() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let other = Character::new(2, Archetype::Enemy, Vec2::new(120.0, 100.0), &cfg).grounded_at(100.0);
        let others = [body(&other)];
        let view = WorldView {
            others: &others,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(95.0, 100.0), &cfg).grounded_at(100.0);
        ch.velocity.x = 6.0;
        let mut out = Interactions::new();
        assert!(move_x(&mut ch, &view, &ctx, true, &mut out));
        assert!(approx_eq(ch.rect().right(), other.rect().left()));
        assert!(approx_eq(ch.velocity.x, -2.5));
        assert_eq!(
            out.as_slice(),
            &[Interaction::Push {
                target: 2,
                velocity_x: 2.5,
                offset_x: 0.0
            }]
        );
    }

    #[test]
    fn test_closing_bodies_split_overlap() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let mut other = Character::new(2, Archetype::Enemy, Vec2::new(120.0, 100.0), &cfg);
        other.velocity.x = -3.0;
        let others = [body(&other)];
        let view = WorldView {
            others: &others,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(100.0, 100.0), &cfg);
        ch.velocity.x = 2.0;
        let mut out = Interactions::new();
        move_x(&mut ch, &view, &ctx, false, &mut out);
        // Overlap was 102+12 - 108 = 6, each side takes 3.
        assert!(approx_eq(ch.position.x, 99.0));
        assert_eq!(
            out.as_slice(),
            &[Interaction::Push {
                target: 2,
                velocity_x: 2.5,
                offset_x: 3.0
            }]
        );
    }

    #[test]
    fn test_attacker_shoves_without_moving() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let other = Character::new(2, Archetype::Enemy, Vec2::new(110.0, 100.0), &cfg);
        let others = [body(&other)];
        let view = WorldView {
            others: &others,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(100.0, 100.0), &cfg);
        ch.is_attacking = true;
        let mut out = Interactions::new();
        move_x(&mut ch, &view, &ctx, false, &mut out);
        assert!(approx_eq(ch.position.x, 100.0));
        assert_eq!(
            out.as_slice(),
            &[Interaction::Push {
                target: 2,
                velocity_x: 1.25,
                offset_x: 0.0
            }]
        );
    }

    #[test]
    fn test_immovable_other_is_not_pushed() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let mut other = Character::new(2, Archetype::Enemy, Vec2::new(110.0, 100.0), &cfg);
        other.is_dashing = true;
        let others = [body(&other)];
        let view = WorldView {
            others: &others,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(100.0, 100.0), &cfg);
        let mut out = Interactions::new();
        assert!(move_x(&mut ch, &view, &ctx, false, &mut out));
        assert!(out.is_empty());
        assert!(approx_eq(ch.rect().right(), other.rect().left()));
    }

    #[test]
    fn test_stomp_bounces_and_records() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let enemy = Character::new(2, Archetype::Enemy, Vec2::new(100.0, 200.0), &cfg).grounded_at(200.0);
        let others = [body(&enemy)];
        let view = WorldView {
            others: &others,
            ..Default::default()
        };
        // Enemy top is at 140. Feet at 136 falling at 8 end at 144.
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(100.0, 136.0), &cfg);
        ch.velocity.y = 8.0;
        let mut out = Interactions::new();
        move_y(&mut ch, &view, &ctx, false, false, &mut out);
        assert_eq!(out.as_slice(), &[Interaction::Stomp { target: 2 }]);
        assert!(approx_eq(ch.velocity.y, cfg.collision.stomp_bounce));
        assert_eq!(ch.state, StateId::Jump);
        assert!(!ch.on_ground);
        assert!(approx_eq(ch.position.y, 139.0));
    }

    #[test]
    fn test_players_are_not_stompable() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let friend = Character::new(2, Archetype::Player, Vec2::new(100.0, 200.0), &cfg);
        let others = [body(&friend)];
        let view = WorldView {
            others: &others,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(100.0, 136.0), &cfg);
        ch.velocity.y = 8.0;
        let mut out = Interactions::new();
        move_y(&mut ch, &view, &ctx, false, false, &mut out);
        assert!(out.is_empty());
        assert!(ch.on_ground);
        assert!(approx_eq(ch.position.y, 140.0));
    }

    #[test]
    fn test_statue_is_solid() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let mut statue = Character::new(2, Archetype::Enemy, Vec2::new(100.0, 200.0), &cfg);
        statue.status.is_petrified = true;
        statue.is_dead = true;
        let others = [body(&statue)];
        let view = WorldView {
            others: &others,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(100.0, 138.0), &cfg);
        ch.velocity.y = 4.0;
        let mut out = Interactions::new();
        move_y(&mut ch, &view, &ctx, false, false, &mut out);
        assert!(ch.on_ground);
        assert!(approx_eq(ch.position.y, 140.0));
        assert!(out.is_empty());
    }

    // ==================== LADDER AND HAZARD TESTS ====================

    #[test]
    fn test_ladder_reach_area() {
        let cfg = GameConfig::new();
        let ladders = [Aabb::from_xywh(90.0, 0.0, 20.0, 200.0)];
        let view = WorldView {
            ladders: &ladders,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(105.0, 150.0), &cfg);
        check_ladders(&mut ch, &view);
        assert!(ch.can_grab_ladder);

        ch.position.x = 118.0;
        check_ladders(&mut ch, &view);
        assert!(!ch.can_grab_ladder);
    }

    #[test]
    fn test_lava_ignites_damages_and_pops() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(1000);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let lava = [Hazard::lava(0.0, 100.0, 200.0, 40.0)];
        let view = WorldView {
            hazards: &lava,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(50.0, 115.0), &cfg);
        assert!(check_hazards(&mut ch, &view, &ctx));
        assert!(ch.status.is_aflame);
        assert_eq!(ch.health.current, 50);
        assert!(approx_eq(ch.velocity.y, -15.0 * 0.75));
        assert!(approx_eq(ch.velocity.x, -7.0 * 0.6));

        // Hit cooldown blocks a second dip.
        assert!(!check_hazards(&mut ch, &view, &ctx));
        assert_eq!(ch.health.current, 50);
    }

    #[test]
    fn test_shallow_lava_contact_is_ignored() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let lava = [Hazard::lava(0.0, 100.0, 200.0, 40.0)];
        let view = WorldView {
            hazards: &lava,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(50.0, 105.0), &cfg);
        assert!(!check_hazards(&mut ch, &view, &ctx));
        assert!(!ch.status.is_aflame);
    }

    #[test]
    fn test_can_stand_up_under_low_ceiling() {
        let cfg = GameConfig::new();
        let ceiling = [Aabb::from_xywh(0.0, 40.0, 200.0, 40.0)];
        let view = WorldView {
            platforms: &ceiling,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(50.0, 120.0), &cfg);
        ch.is_crouching = true;
        assert!(!can_stand_up(&ch, &view));
        ch.position.y = 150.0;
        assert!(can_stand_up(&ch, &view));
    }

    #[test]
    fn test_invalid_geometry_is_skipped() {
        let cfg = GameConfig::new();
        let clips = ClipSet::uniform(4, 80);
        let clock = FakeClock::new(0);
        let ctx = TickContext::new(&clock, &cfg, &clips);
        let broken = [Aabb::from_xywh(f32::NAN, 100.0, 200.0, 20.0), Aabb::from_xywh(0.0, 100.0, 0.0, 20.0)];
        let view = WorldView {
            platforms: &broken,
            ..Default::default()
        };
        let mut ch = Character::new(1, Archetype::Player, Vec2::new(50.0, 98.0), &cfg);
        ch.velocity.y = 5.0;
        let mut out = Interactions::new();
        move_y(&mut ch, &view, &ctx, false, false, &mut out);
        assert!(!ch.on_ground);
    }
}
