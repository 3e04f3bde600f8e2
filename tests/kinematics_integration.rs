//! End-to-end tests driving characters through the ECS tick schedule and the
//! pure per-character update.

use bevy_ecs::prelude::*;
use glam::Vec2;

use platformer_kinematics::components::behavior::Behavior;
use platformer_kinematics::components::boxcollider::Aabb;
use platformer_kinematics::components::character::{Archetype, Character};
use platformer_kinematics::components::intent::Intent;
use platformer_kinematics::components::level::Platform;
use platformer_kinematics::components::state::StateId;
use platformer_kinematics::events::clip::observe_clip_finished;
use platformer_kinematics::events::projectile::observe_projectile_fired;
use platformer_kinematics::game::{TICK_SECONDS, build_schedule, setup_demo_level};
use platformer_kinematics::resources::animationstore::{AnimationStore, ClipSet};
use platformer_kinematics::resources::gameconfig::GameConfig;
use platformer_kinematics::resources::worldtime::{FakeClock, Millis, WorldTime};
use platformer_kinematics::snapshot::CharacterSnapshot;
use platformer_kinematics::systems::animation::animation;
use platformer_kinematics::systems::collision::{Interaction, WorldView};
use platformer_kinematics::systems::combat::take_damage;
use platformer_kinematics::systems::context::TickContext;
use platformer_kinematics::systems::orchestrator::{
    apply_interaction, character_tick_system, despawn_finished_characters, update_character,
};
use platformer_kinematics::systems::statemachine::display_key;
use platformer_kinematics::systems::status::{apply_aflame, apply_freeze};
use platformer_kinematics::systems::time::update_world_time;

const EPSILON: f32 = 1e-3;
const CLIPS: &str = "knight";

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn make_world() -> World {
    let mut world = World::new();
    let mut store = AnimationStore::new();
    store.insert(CLIPS, ClipSet::uniform(4, 80));
    world.insert_resource(store);
    world.insert_resource(GameConfig::new());
    world.insert_resource(WorldTime::default());
    world.add_observer(observe_clip_finished);
    world.add_observer(observe_projectile_fired);
    world
}

fn tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((character_tick_system, animation, despawn_finished_characters).chain());
    schedule
}

fn run_at(world: &mut World, schedule: &mut Schedule, now: Millis) {
    world.resource_mut::<WorldTime>().elapsed_ms = now;
    schedule.run(world);
}

fn spawn_player(world: &mut World, position: Vec2, ground_y: f32) -> Entity {
    let config = world.resource::<GameConfig>().clone();
    let ch = Character::new(1, Archetype::Player, position, &config)
        .with_clip_set(CLIPS)
        .grounded_at(ground_y);
    world.spawn((ch, Intent::new(), Behavior::Forward)).id()
}

fn character(world: &World, entity: Entity) -> Character {
    world.get::<Character>(entity).cloned().unwrap()
}

fn floor() -> [Aabb; 1] {
    [Aabb::from_xywh(0.0, 200.0, 1000.0, 40.0)]
}

fn player_on_floor(cfg: &GameConfig) -> Character {
    Character::new(1, Archetype::Player, Vec2::new(100.0, 200.0), cfg).grounded_at(200.0)
}

// =============================================================================
// Damage and death
// =============================================================================

#[test]
fn lethal_damage_kills_and_the_body_is_removed_after_its_clip() {
    let mut world = make_world();
    world.spawn(Platform::new(0.0, 200.0, 1000.0, 40.0));
    let entity = spawn_player(&mut world, Vec2::new(100.0, 200.0), 200.0);
    world.get_mut::<Character>(entity).unwrap().health.current = 10;

    let cfg = world.resource::<GameConfig>().clone();
    let clips = ClipSet::uniform(4, 80);
    let clock = FakeClock::new(0);
    let ctx = TickContext::new(&clock, &cfg, &clips);
    {
        let mut ch = world.get_mut::<Character>(entity).unwrap();
        assert!(take_damage(&mut ch, 15, &ctx));
    }

    let ch = character(&world, entity);
    assert_eq!(ch.health.current, 0);
    assert!(ch.is_dead);
    assert!(matches!(ch.state, StateId::Death | StateId::DeathNm));

    let mut schedule = tick_schedule();
    let mut now = 0;
    while now < 600 && world.get_entity(entity).is_ok() {
        now += 17;
        run_at(&mut world, &mut schedule, now);
    }
    assert!(world.get_entity(entity).is_err());
}

// =============================================================================
// Friction
// =============================================================================

#[test]
fn grounded_character_without_input_loses_fifteen_percent_per_tick() {
    let mut world = make_world();
    world.spawn(Platform::new(0.0, 200.0, 1000.0, 40.0));
    let entity = spawn_player(&mut world, Vec2::new(100.0, 200.0), 200.0);
    world.get_mut::<Character>(entity).unwrap().velocity.x = 5.0;

    let mut schedule = tick_schedule();
    run_at(&mut world, &mut schedule, 17);

    let ch = character(&world, entity);
    assert!(approx_eq(ch.velocity.x, 4.25));
    assert!(ch.on_ground);
    assert!(approx_eq(ch.position.y, 200.0));
}

// =============================================================================
// Fire watchdog
// =============================================================================

#[test]
fn fire_is_extinguished_after_watchdog_while_still_aflame() {
    let cfg = GameConfig::new();
    let clips = ClipSet::uniform(4, 80);
    let clock = FakeClock::new(0);
    let ctx = TickContext::new(&clock, &cfg, &clips);
    let platforms = floor();
    let view = WorldView {
        platforms: &platforms,
        ..WorldView::default()
    };
    let mut ch = player_on_floor(&cfg);
    let intent = Intent::new();

    assert!(apply_aflame(&mut ch, &ctx));
    clock.set(100);
    update_character(&mut ch, &intent, &view, &ctx);
    assert!(ch.status.is_aflame);

    clock.set(5000);
    update_character(&mut ch, &intent, &view, &ctx);
    assert!(!ch.status.is_aflame && !ch.status.is_deflaming);
    assert_eq!(ch.state, StateId::Idle);
}

#[test]
fn fire_is_extinguished_after_watchdog_while_deflaming() {
    let cfg = GameConfig::new();
    let clips = ClipSet::uniform(4, 80);
    let clock = FakeClock::new(0);
    let ctx = TickContext::new(&clock, &cfg, &clips);
    let platforms = floor();
    let view = WorldView {
        platforms: &platforms,
        ..WorldView::default()
    };
    let mut ch = player_on_floor(&cfg);
    let intent = Intent::new();

    assert!(apply_aflame(&mut ch, &ctx));
    for now in [100, 3000, 4000] {
        clock.set(now);
        update_character(&mut ch, &intent, &view, &ctx);
    }
    assert!(ch.status.is_deflaming);
    assert!(!ch.status.is_aflame);

    clock.set(5000);
    update_character(&mut ch, &intent, &view, &ctx);
    assert!(!ch.status.is_aflame && !ch.status.is_deflaming);
    assert_eq!(ch.state, StateId::Idle);
}

#[test]
fn airborne_fire_ends_in_fall() {
    let cfg = GameConfig::new();
    let clips = ClipSet::uniform(4, 80);
    let clock = FakeClock::new(0);
    let ctx = TickContext::new(&clock, &cfg, &clips);
    let view = WorldView::default();
    let mut ch = Character::new(1, Archetype::Player, Vec2::new(100.0, 100.0), &cfg);
    ch.on_ground = false;

    assert!(apply_aflame(&mut ch, &ctx));
    clock.set(5000);
    update_character(&mut ch, &Intent::new(), &view, &ctx);
    assert!(!ch.status.on_fire());
    assert_eq!(ch.state, StateId::Fall);
}

// =============================================================================
// Ledge tipping
// =============================================================================

#[test]
fn overhanging_ledge_tips_then_falls() {
    let mut world = make_world();
    world.spawn(Platform::new(0.0, 200.0, 200.0, 40.0));
    world.spawn(Platform::new(0.0, 600.0, 1000.0, 40.0));
    // Body half width 12; 60% of it hangs past the edge at x = 200.
    let entity = spawn_player(&mut world, Vec2::new(200.0 - 12.0 + 7.2, 200.0), 200.0);

    let mut schedule = tick_schedule();
    run_at(&mut world, &mut schedule, 17);
    let ch = character(&world, entity);
    assert!(ch.tipping.active);
    assert!(ch.tipping.angle > 0.0);

    let mut ticks = 1;
    while character(&world, entity).tipping.active {
        ticks += 1;
        run_at(&mut world, &mut schedule, ticks * 17);
        assert!(ticks < 40, "tipping never finished");
    }
    let ch = character(&world, entity);
    assert_eq!(ticks, 18);
    assert_eq!(ch.state, StateId::Fall);
    assert!(!ch.on_ground);
    assert!(ch.velocity.x > 0.0);

    for _ in 0..120 {
        ticks += 1;
        run_at(&mut world, &mut schedule, ticks * 17);
    }
    let ch = character(&world, entity);
    assert!(ch.on_ground);
    assert!(approx_eq(ch.position.y, 600.0));
}

#[test]
fn flush_neighbour_platform_prevents_tipping() {
    let mut world = make_world();
    world.spawn(Platform::new(0.0, 200.0, 200.0, 40.0));
    world.spawn(Platform::new(200.0, 200.0, 200.0, 40.0));
    let entity = spawn_player(&mut world, Vec2::new(200.0 - 12.0 + 7.2, 200.0), 200.0);

    let mut schedule = tick_schedule();
    for tick in 1..=30 {
        run_at(&mut world, &mut schedule, tick * 17);
    }
    let ch = character(&world, entity);
    assert!(!ch.tipping.active);
    assert!(ch.on_ground);
    assert!(approx_eq(ch.position.y, 200.0));
}

#[test]
fn small_overhang_does_not_tip() {
    let mut world = make_world();
    world.spawn(Platform::new(0.0, 200.0, 200.0, 40.0));
    // 40% of the half width.
    let entity = spawn_player(&mut world, Vec2::new(200.0 - 12.0 + 4.8, 200.0), 200.0);

    let mut schedule = tick_schedule();
    for tick in 1..=10 {
        run_at(&mut world, &mut schedule, tick * 17);
    }
    let ch = character(&world, entity);
    assert!(!ch.tipping.active);
    assert!(ch.on_ground);
}

// =============================================================================
// Frozen
// =============================================================================

#[test]
fn frozen_character_rejects_hit_until_it_defrosts() {
    let cfg = GameConfig::new();
    let clips = ClipSet::uniform(4, 80);
    let clock = FakeClock::new(0);
    let ctx = TickContext::new(&clock, &cfg, &clips);
    let platforms = floor();
    let view = WorldView {
        platforms: &platforms,
        ..WorldView::default()
    };
    let mut ch = player_on_floor(&cfg);
    let intent = Intent::holding_right();

    assert!(apply_freeze(&mut ch, &ctx));
    clock.set(500);
    apply_interaction(&mut ch, &Interaction::Hit { target: 1, damage: 10 }, &ctx);
    assert_eq!(ch.state, StateId::Frozen);
    assert!(ch.status.is_frozen);

    clock.set(2799);
    update_character(&mut ch, &intent, &view, &ctx);
    assert_eq!(ch.state, StateId::Frozen);
    assert!(approx_eq(ch.position.x, 100.0));

    clock.set(cfg.player.frozen_ms);
    update_character(&mut ch, &intent, &view, &ctx);
    assert_eq!(ch.state, StateId::Defrost);
    assert!(!ch.status.is_frozen && ch.status.is_defrosting);

    clock.set(cfg.player.frozen_ms + cfg.player.defrost_ms);
    update_character(&mut ch, &intent, &view, &ctx);
    assert!(!ch.status.is_cold());
    assert!(!ch.state.is_status_overlay());
}

// =============================================================================
// Landing
// =============================================================================

#[test]
fn landing_needs_enough_horizontal_overlap() {
    let mut world = make_world();
    world.spawn(Platform::new(0.0, 200.0, 200.0, 40.0));
    world.spawn(Platform::new(500.0, 200.0, 200.0, 40.0));
    world.spawn(Platform::new(0.0, 400.0, 1000.0, 40.0));
    let config = world.resource::<GameConfig>().clone();

    // Overlaps the left ledge by 2px, less than 15% of its 24px width.
    let mut grazing = Character::new(1, Archetype::Player, Vec2::new(210.0, 150.0), &config).with_clip_set(CLIPS);
    grazing.on_ground = false;
    // Overlaps the right ledge by 5px.
    let mut landing = Character::new(2, Archetype::Player, Vec2::new(493.0, 150.0), &config).with_clip_set(CLIPS);
    landing.on_ground = false;
    let grazing = world.spawn((grazing, Intent::new())).id();
    let landing = world.spawn((landing, Intent::new())).id();

    let mut schedule = tick_schedule();
    let mut first_contact: [Option<f32>; 2] = [None, None];
    for tick in 1..=120 {
        run_at(&mut world, &mut schedule, tick * 17);
        for (slot, entity) in [grazing, landing].into_iter().enumerate() {
            let ch = character(&world, entity);
            if ch.on_ground && first_contact[slot].is_none() {
                first_contact[slot] = Some(ch.position.y);
            }
        }
    }

    assert!(first_contact[0].is_some_and(|y| approx_eq(y, 400.0)));
    assert!(first_contact[1].is_some_and(|y| approx_eq(y, 200.0)));
}

// =============================================================================
// Replication
// =============================================================================

#[test]
fn snapshot_reproduces_display_on_a_remote_world() {
    let mut world = make_world();
    world.spawn(Platform::new(0.0, 200.0, 1000.0, 40.0));
    let entity = spawn_player(&mut world, Vec2::new(100.0, 200.0), 200.0);
    *world.get_mut::<Intent>(entity).unwrap() = Intent::holding_right();

    let mut schedule = tick_schedule();
    for tick in 1..=20 {
        run_at(&mut world, &mut schedule, tick * 17);
    }
    let local = character(&world, entity);
    let json = CharacterSnapshot::capture(&local).to_json().unwrap();

    let mut remote_world = make_world();
    let remote = spawn_player(&mut remote_world, Vec2::ZERO, 0.0);
    {
        let mut ch = remote_world.get_mut::<Character>(remote).unwrap();
        CharacterSnapshot::from_json(&json).unwrap().apply_to(&mut ch);
    }
    let remote = character(&remote_world, remote);
    let clips = ClipSet::uniform(4, 80);

    assert_eq!(remote.position, local.position);
    assert_eq!(remote.state, StateId::Run);
    assert_eq!(remote.rect(), local.rect());
    assert_eq!(display_key(&remote, &clips), display_key(&local, &clips));
    assert_eq!(remote.anim, local.anim);
}

// =============================================================================
// Long run
// =============================================================================

#[test]
fn demo_level_keeps_character_invariants() {
    let mut world = World::new();
    setup_demo_level(&mut world, GameConfig::new(), 7);
    let mut schedule = build_schedule();

    for _ in 0..900 {
        update_world_time(&mut world, TICK_SECONDS);
        schedule.run(&mut world);

        let mut query = world.query::<&Character>();
        for ch in query.iter(&world) {
            assert!(ch.status.active_count() <= 1, "character {} has stacked overlays", ch.id);
            assert!(ch.health.current <= ch.health.max);
            if ch.health.current == 0 {
                assert!(ch.is_dead, "character {} has no health but is alive", ch.id);
            }
            assert!(ch.position.is_finite() && ch.velocity.is_finite());
            let exclusive = [ch.is_dashing, ch.is_rolling, ch.is_sliding];
            assert!(exclusive.iter().filter(|f| **f).count() <= 1);
        }
    }
}
