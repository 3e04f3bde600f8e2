//! AI decisions.
//!
//! A [`Behavior::Patrol`] character has its [`Intent`] rewritten every tick
//! before the kinematics update. The AI never touches state directly; it
//! presses the same buttons a player would.
//!
//! # Related
//!
//! - [`crate::components::behavior::PatrolAi`] – per-character AI memory
//! - [`crate::systems::input::apply_intent`] – consumes the intent

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::behavior::{Behavior, PatrolAi};
use crate::components::character::{Archetype, Character, Cooldowns};
use crate::components::intent::Intent;
use crate::resources::gameconfig::GameConfig;
use crate::resources::worldtime::{Clock, Millis, WorldTime};
use crate::systems::collision::BodySnapshot;

/// Distance to the patrol point at which a new one is picked.
const PATROL_ARRIVE_DISTANCE: f32 = 10.0;

/// Closest living, non-stone player on roughly the same level.
fn closest_target<'a>(ch: &Character, targets: &'a [BodySnapshot]) -> Option<(&'a BodySnapshot, f32)> {
    let rect = ch.rect();
    let center = rect.center();
    targets
        .iter()
        .filter(|t| t.id != ch.id && t.alive && !t.statue && t.archetype == Archetype::Player)
        .filter(|t| (t.rect.center().y - center.y).abs() < rect.height())
        .map(|t| (t, t.rect.center().distance(center)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn press_toward(intent: &mut Intent, from_x: f32, to_x: f32) {
    intent.left = to_x < from_x;
    intent.right = to_x > from_x;
}

fn patrol(ai: &mut PatrolAi, ch: &Character, intent: &mut Intent) {
    let half_width = ch.rect().width() * 0.5;
    let x = ch.position.x;
    let target_x = match ai.target_x {
        Some(t) if (t - x).abs() >= PATROL_ARRIVE_DISTANCE => t,
        _ => ai.pick_target(half_width),
    };
    press_toward(intent, x, target_x);
}

/// Decide this tick's intent for a patrolling character.
pub fn decide(
    ai: &mut PatrolAi,
    ch: &Character,
    targets: &[BodySnapshot],
    now: Millis,
    config: &GameConfig,
) -> Intent {
    let mut intent = Intent::default();
    let s = &ch.status;
    if !ch.is_active() || s.is_petrified || s.is_cold() || s.is_zapped {
        return intent;
    }
    let tuning = config.archetype(ch.archetype);
    if ch.is_taking_hit && now.saturating_sub(ch.hit_timer) < tuning.hit_cooldown_ms {
        return intent;
    }

    let ai_cfg = &config.ai;
    let target = closest_target(ch, targets);
    let x = ch.position.x;

    // Burning characters run around without attacking.
    if s.on_fire() {
        match target {
            Some((t, d)) if d < ai_cfg.detection_range => press_toward(&mut intent, x, t.rect.center().x),
            _ => patrol(ai, ch, &mut intent),
        }
        return intent;
    }

    if ch.is_attacking {
        ai.attacking = true;
        return intent;
    }
    if ai.attacking {
        ai.attacking = false;
        ai.last_attack = Some(now);
        ai.pause_until = now + ai_cfg.post_attack_pause_ms;
        debug!("character {}: attack finished, pausing", ch.id);
    }
    if now < ai.pause_until {
        return intent;
    }

    let attack_ready = Cooldowns::ready(ai.last_attack, ai_cfg.attack_cooldown_ms, now);
    match target {
        Some((t, d)) if d < ai_cfg.attack_range && attack_ready => {
            let target_x = t.rect.center().x;
            let facing_target = (target_x >= x) == ch.facing_right;
            if facing_target {
                intent.attack1 = true;
            } else {
                press_toward(&mut intent, x, target_x);
            }
        }
        Some((t, d)) if d < ai_cfg.detection_range => {
            press_toward(&mut intent, x, t.rect.center().x);
        }
        _ => {
            patrol(ai, ch, &mut intent);
            if ch.on_ground && ai.rng.f32() < ai_cfg.patrol_jump_chance {
                intent.jump = true;
            }
        }
    }
    intent
}

/// Rewrite the intent of every patrolling character.
pub fn behavior_system(
    mut agents: Query<(&Character, &mut Intent, &mut Behavior)>,
    characters: Query<&Character>,
    time: Res<WorldTime>,
    config: Res<GameConfig>,
) {
    let targets: Vec<BodySnapshot> = characters.iter().map(BodySnapshot::capture).collect();
    let now = time.now_ms();
    for (ch, mut intent, mut behavior) in agents.iter_mut() {
        if let Behavior::Patrol(ai) = behavior.as_mut() {
            *intent = decide(ai, ch, &targets, now, &config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn enemy_at(x: f32, cfg: &GameConfig) -> Character {
        Character::new(10, Archetype::Enemy, Vec2::new(x, 200.0), cfg).grounded_at(200.0)
    }

    fn player_at(x: f32, cfg: &GameConfig) -> BodySnapshot {
        let ch = Character::new(1, Archetype::Player, Vec2::new(x, 200.0), cfg).grounded_at(200.0);
        BodySnapshot::capture(&ch)
    }

    fn still_ai() -> PatrolAi {
        let mut ai = PatrolAi::new(0.0, 1000.0, 3);
        ai.target_x = Some(500.0);
        ai
    }

    #[test]
    fn test_chases_target_in_detection_range() {
        let mut cfg = GameConfig::new();
        cfg.ai.patrol_jump_chance = 0.0;
        let mut ai = still_ai();
        let ch = enemy_at(300.0, &cfg);
        let intent = decide(&mut ai, &ch, &[player_at(150.0, &cfg)], 0, &cfg);
        assert!(intent.left && !intent.right);
        assert!(!intent.attack1);
    }

    #[test]
    fn test_attacks_when_close_and_facing() {
        let cfg = GameConfig::new();
        let mut ai = still_ai();
        let ch = enemy_at(100.0, &cfg);
        let intent = decide(&mut ai, &ch, &[player_at(130.0, &cfg)], 0, &cfg);
        assert!(intent.attack1);
        assert!(!intent.wants_horizontal_move());

        // Turns first when the target is behind.
        let behind = enemy_at(160.0, &cfg);
        let intent = decide(&mut ai, &behind, &[player_at(130.0, &cfg)], 0, &cfg);
        assert!(intent.left && !intent.attack1);
    }

    #[test]
    fn test_pause_and_cooldown_after_attack() {
        let cfg = GameConfig::new();
        let mut ai = still_ai();
        let mut ch = enemy_at(100.0, &cfg);
        let players = [player_at(130.0, &cfg)];

        ch.is_attacking = true;
        assert_eq!(decide(&mut ai, &ch, &players, 100, &cfg), Intent::default());
        ch.is_attacking = false;

        // Attack just ended: pause.
        assert_eq!(decide(&mut ai, &ch, &players, 600, &cfg), Intent::default());
        assert_eq!(ai.last_attack, Some(600));
        // Paused no longer, but the cooldown still blocks attacking.
        let intent = decide(&mut ai, &ch, &players, 1000, &cfg);
        assert!(!intent.attack1);
        let intent = decide(&mut ai, &ch, &players, 2100, &cfg);
        assert!(intent.attack1);
    }

    #[test]
    fn test_patrols_without_target() {
        let mut cfg = GameConfig::new();
        cfg.ai.patrol_jump_chance = 0.0;
        let mut ai = still_ai();
        let ch = enemy_at(100.0, &cfg);
        let intent = decide(&mut ai, &ch, &[], 0, &cfg);
        assert!(intent.right);

        // Arriving picks a new point.
        let arrived = enemy_at(495.0, &cfg);
        decide(&mut ai, &arrived, &[], 0, &cfg);
        assert_ne!(ai.target_x, Some(500.0));
    }

    #[test]
    fn test_ignores_dead_and_stone_targets() {
        let mut cfg = GameConfig::new();
        cfg.ai.patrol_jump_chance = 0.0;
        let mut ai = still_ai();
        let ch = enemy_at(100.0, &cfg);
        let mut dead = player_at(130.0, &cfg);
        dead.alive = false;
        let mut statue = player_at(80.0, &cfg);
        statue.statue = true;
        let intent = decide(&mut ai, &ch, &[dead, statue], 0, &cfg);
        assert!(!intent.attack1);
        assert!(intent.right);
    }

    #[test]
    fn test_frozen_ai_does_nothing() {
        let cfg = GameConfig::new();
        let mut ai = still_ai();
        let mut ch = enemy_at(100.0, &cfg);
        ch.status.is_frozen = true;
        assert_eq!(decide(&mut ai, &ch, &[player_at(130.0, &cfg)], 0, &cfg), Intent::default());
    }

    #[test]
    fn test_behavior_system_writes_patrol_intent_only() {
        let mut world = World::new();
        let cfg = GameConfig::new();
        world.insert_resource(WorldTime::default());
        let player = world
            .spawn((
                Character::new(1, Archetype::Player, Vec2::new(600.0, 200.0), &cfg),
                Intent::holding_left(),
                Behavior::Forward,
            ))
            .id();
        let enemy = world
            .spawn((
                enemy_at(100.0, &cfg),
                Intent::default(),
                Behavior::Patrol(still_ai()),
            ))
            .id();
        world.insert_resource(cfg);

        let mut schedule = Schedule::default();
        schedule.add_systems(behavior_system);
        schedule.run(&mut world);

        assert_eq!(*world.get::<Intent>(player).unwrap(), Intent::holding_left());
        assert!(world.get::<Intent>(enemy).unwrap().right);
    }
}
