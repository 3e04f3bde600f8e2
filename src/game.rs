//! Headless demo level.
//!
//! Builds a small level (floor with a lava pit, a raised ledge reached by a
//! ladder, a climbable wall), spawns a player driven by a scripted
//! [`InputScript`] and two patrolling enemies, and wires the per-tick
//! schedule.
//!
//! # Tick order
//!
//! 1. [`scripted_input_system`] writes the player's intent
//! 2. [`behavior_system`] writes AI intents
//! 3. [`character_tick_system`] advances every character
//! 4. [`animation`] advances clips and reports finished ones
//! 5. [`despawn_finished_characters`] removes the dead

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::info;

use crate::components::behavior::{Behavior, PatrolAi};
use crate::components::character::{Archetype, Character};
use crate::components::intent::Intent;
use crate::components::level::{Hazard, Ladder, Platform};
use crate::components::state::StateId;
use crate::events::clip::observe_clip_finished;
use crate::events::projectile::observe_projectile_fired;
use crate::resources::animationstore::{AnimationStore, ClipInfo, ClipSet};
use crate::resources::gameconfig::GameConfig;
use crate::resources::worldtime::{Clock, Millis, WorldTime};
use crate::systems::animation::animation;
use crate::systems::behavior::behavior_system;
use crate::systems::orchestrator::{character_tick_system, despawn_finished_characters};

/// Fixed simulation step in seconds.
pub const TICK_SECONDS: f32 = 1.0 / 60.0;

pub const PLAYER_ID: u64 = 1;
pub const PLAYER_CLIPS: &str = "knight";
pub const ENEMY_CLIPS: &str = "goblin";

/// Top of the main floor.
pub const FLOOR_Y: f32 = 400.0;

/// One held input window of the script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    pub from: Millis,
    pub until: Millis,
    pub intent: Intent,
}

/// Timed input for the player, replayed against the world clock.
#[derive(Resource, Debug, Clone, Default)]
pub struct InputScript {
    pub steps: Vec<ScriptStep>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, from: Millis, until: Millis, intent: Intent) -> Self {
        self.steps.push(ScriptStep { from, until, intent });
        self
    }

    /// Merge every step active at `now`.
    pub fn intent_at(&self, now: Millis) -> Intent {
        self.steps
            .iter()
            .filter(|s| s.from <= now && now < s.until)
            .fold(Intent::default(), |acc, s| merge(acc, s.intent))
    }

    /// Run right, jump, hit the first goblin, shoot, then back off and crouch.
    pub fn demo() -> Self {
        // One 60 Hz tick, so every tap fires exactly once.
        let tap = 17;
        Self::new()
            .step(0, 1400, Intent::holding_right())
            .step(900, 900 + tap, Intent { jump: true, ..Intent::default() })
            .step(1800, 1800 + tap, Intent { attack1: true, ..Intent::default() })
            .step(2400, 2400 + tap, Intent { attack1: true, ..Intent::default() })
            .step(3000, 3000 + tap, Intent { projectile: Some(0), ..Intent::default() })
            .step(3600, 4400, Intent::holding_left())
            .step(4000, 4000 + tap, Intent { dash: true, ..Intent::default() })
            .step(4800, 4800 + tap, Intent { crouch_toggle: true, ..Intent::default() })
            .step(5600, 5600 + tap, Intent { crouch_toggle: true, ..Intent::default() })
            .step(6000, 6000 + tap, Intent { roll: true, ..Intent::default() })
    }
}

fn merge(a: Intent, b: Intent) -> Intent {
    Intent {
        left: a.left || b.left,
        right: a.right || b.right,
        up: a.up || b.up,
        down: a.down || b.down,
        jump: a.jump || b.jump,
        attack1: a.attack1 || b.attack1,
        attack2: a.attack2 || b.attack2,
        dash: a.dash || b.dash,
        roll: a.roll || b.roll,
        interact: a.interact || b.interact,
        crouch_toggle: a.crouch_toggle || b.crouch_toggle,
        projectile: a.projectile.or(b.projectile),
    }
}

/// Feed the script into every forward-controlled player.
pub fn scripted_input_system(
    script: Res<InputScript>,
    time: Res<WorldTime>,
    mut query: Query<(&Character, &mut Intent, &Behavior)>,
) {
    let intent = script.intent_at(time.now_ms());
    for (ch, mut current, behavior) in query.iter_mut() {
        if ch.archetype == Archetype::Player && matches!(behavior, Behavior::Forward) {
            *current = intent;
        }
    }
}

/// Clip sets used by the demo characters.
///
/// The knight has a clip for every state. The goblin lacks the movement
/// abilities and the crouch family so display falls back to simpler clips.
pub fn demo_clip_sets(config: &GameConfig) -> AnimationStore {
    let frame_ms = config.timing.frame_ms;
    let knight = ClipSet::uniform(6, frame_ms)
        .with(StateId::Idle, ClipInfo::new(8, frame_ms, true))
        .with(StateId::Run, ClipInfo::new(10, frame_ms, true))
        .with(StateId::Jump, ClipInfo::new(3, frame_ms, false))
        .with(StateId::Turn, ClipInfo::new(3, frame_ms, false))
        .with(StateId::Death, ClipInfo::new(10, frame_ms, false));

    let mut goblin = ClipSet::uniform(4, frame_ms);
    for missing in [
        StateId::Dash,
        StateId::Roll,
        StateId::Slide,
        StateId::SlideTransStart,
        StateId::SlideTransEnd,
        StateId::CrouchTrans,
        StateId::CrouchWalk,
        StateId::WallSlide,
        StateId::WallClimb,
    ] {
        goblin.clips.remove(&missing);
    }

    let mut store = AnimationStore::new();
    store.insert(PLAYER_CLIPS, knight);
    store.insert(ENEMY_CLIPS, goblin);
    store
}

/// Insert resources, register observers and spawn the demo level.
pub fn setup_demo_level(world: &mut World, config: GameConfig, seed: u64) {
    world.insert_resource(demo_clip_sets(&config));
    world.insert_resource(WorldTime::default());
    world.insert_resource(InputScript::demo());

    world.add_observer(observe_clip_finished);
    world.add_observer(observe_projectile_fired);

    // Floor with a lava pit between 600 and 720.
    world.spawn(Platform::new(0.0, FLOOR_Y, 600.0, 40.0));
    world.spawn(Platform::new(720.0, FLOOR_Y, 880.0, 40.0));
    world.spawn(Platform::new(600.0, FLOOR_Y + 80.0, 120.0, 40.0));
    world.spawn(Hazard::lava(600.0, FLOOR_Y + 40.0, 120.0, 40.0));
    // Ledge with a ladder down to the floor.
    world.spawn(Platform::new(1000.0, 280.0, 190.0, 20.0));
    world.spawn(Ladder::new(1195.0, 280.0, 30.0, FLOOR_Y - 280.0));
    // Right boundary wall.
    world.spawn(Platform::new(1600.0, 0.0, 40.0, FLOOR_Y + 40.0));

    let player = Character::new(PLAYER_ID, Archetype::Player, Vec2::new(100.0, FLOOR_Y), &config)
        .with_clip_set(PLAYER_CLIPS)
        .grounded_at(FLOOR_Y);
    world.spawn((player, Intent::new(), Behavior::Forward));

    let patrols = [(2, 420.0, (250.0, 590.0), false), (3, 1350.0, (1250.0, 1590.0), true)];
    for (id, x, span, facing_right) in patrols {
        let enemy = Character::new(id, Archetype::Enemy, Vec2::new(x, FLOOR_Y), &config)
            .with_clip_set(ENEMY_CLIPS)
            .with_facing(facing_right)
            .grounded_at(FLOOR_Y);
        let ai = PatrolAi::new(span.0, span.1, seed.wrapping_add(id));
        world.spawn((enemy, Intent::new(), Behavior::Patrol(ai)));
    }

    world.insert_resource(config);
    info!("demo level ready (seed {seed})");
}

/// Per-tick schedule for the demo level.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            scripted_input_system,
            behavior_system,
            character_tick_system,
            animation,
            despawn_finished_characters,
        )
            .chain(),
    );
    schedule
}
