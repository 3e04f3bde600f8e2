//! Tuning configuration resource.
//!
//! Holds every balance constant the kinematics core reads: integration
//! coefficients, collision thresholds, state and status durations, damage
//! tables and AI ranges. Defaults are safe to simulate with; an INI file can
//! override any subset of keys.
//!
//! All velocities and accelerations are in pixels per tick (the simulation
//! runs at a fixed 60 Hz). All durations are in milliseconds.
//!
//! # Configuration File Format
//!
//! ```ini
//! [physics]
//! gravity = 0.7
//! jump_strength = -15
//!
//! [player]
//! max_health = 100
//! run_speed = 7
//!
//! [enemy]
//! max_health = 300
//!
//! [status]
//! aflame_ms = 3000
//! fire_watchdog_ms = 5000
//! ```
//!
//! # Related
//!
//! - [`crate::components::character::Archetype`] – selects the per-archetype section

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::components::character::Archetype;
use crate::components::state::AttackKind;
use crate::error::CoreError;
use crate::resources::worldtime::Millis;

const DEFAULT_CONFIG_PATH: &str = "./kinematics.ini";

/// Number of projectile slots a character can fire from.
pub const PROJECTILE_SLOTS: usize = 7;

/// Shared integration coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub jump_strength: f32,
    pub dash_speed: f32,
    pub roll_speed: f32,
    pub roll_control_factor: f32,
    pub terminal_velocity: f32,
    pub wall_slide_speed: f32,
    pub wall_climb_speed: f32,
    pub ladder_climb_speed: f32,
    pub crouch_speed_factor: f32,
    pub aflame_accel: f32,
    pub aflame_speed: f32,
    pub deflame_accel: f32,
    pub deflame_speed: f32,
}

/// Per-archetype movement and resilience values.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchetypeTuning {
    pub max_health: u32,
    pub run_speed: f32,
    pub accel: f32,
    pub friction: f32,
    pub hit_stun_ms: Millis,
    pub hit_cooldown_ms: Millis,
    pub frozen_ms: Millis,
    pub defrost_ms: Millis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionTuning {
    pub landing_overlap_ratio: f32,
    pub ceiling_overlap_ratio: f32,
    pub landing_friction: f32,
    pub ground_snap: f32,
    pub wall_overlap_ratio: f32,
    pub bounce_velocity: f32,
    pub stomp_bounce: f32,
    pub stomp_grace: f32,
    pub tile_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimingTuning {
    pub frame_ms: Millis,
    pub attack_state_ms: Millis,
    pub dash_ms: Millis,
    pub roll_ms: Millis,
    pub slide_ms: Millis,
    pub wall_climb_ms: Millis,
    pub dash_cooldown_ms: Millis,
    pub roll_cooldown_ms: Millis,
    pub projectile_cooldowns_ms: [Millis; PROJECTILE_SLOTS],
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusTuning {
    pub aflame_ms: Millis,
    pub deflame_ms: Millis,
    pub aflame_damage: u32,
    pub aflame_tick_ms: Millis,
    pub fire_watchdog_ms: Millis,
    pub smashed_ms: Millis,
    pub zapped_ms: Millis,
    pub zapped_damage: u32,
    pub zapped_tick_ms: Millis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombatTuning {
    pub primary_damage: u32,
    pub secondary_damage: u32,
    pub combo_damage: u32,
    pub crouch_damage: u32,
    pub secondary_frame_multiplier: f32,
    pub lava_damage: u32,
}

/// Patrol behavior ranges and pacing.
#[derive(Debug, Clone, PartialEq)]
pub struct AiTuning {
    pub detection_range: f32,
    pub attack_range: f32,
    pub attack_cooldown_ms: Millis,
    pub patrol_distance: f32,
    pub post_attack_pause_ms: Millis,
    pub patrol_jump_chance: f32,
}

/// Damage and clip-duration scaling for one [`AttackKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackProfile {
    pub damage: u32,
    pub frame_multiplier: f32,
}

/// Tuning configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    pub physics: PhysicsTuning,
    pub player: ArchetypeTuning,
    pub enemy: ArchetypeTuning,
    pub collision: CollisionTuning,
    pub timing: TimingTuning,
    pub status: StatusTuning,
    pub combat: CombatTuning,
    pub ai: AiTuning,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

// Visits every scalar key once so loading and saving cannot drift apart.
macro_rules! for_each_key {
    ($m:ident, $cfg:expr, $ini:expr) => {
        $m!($cfg, $ini, "physics", "gravity", physics.gravity, f32);
        $m!($cfg, $ini, "physics", "jump_strength", physics.jump_strength, f32);
        $m!($cfg, $ini, "physics", "dash_speed", physics.dash_speed, f32);
        $m!($cfg, $ini, "physics", "roll_speed", physics.roll_speed, f32);
        $m!($cfg, $ini, "physics", "roll_control_factor", physics.roll_control_factor, f32);
        $m!($cfg, $ini, "physics", "terminal_velocity", physics.terminal_velocity, f32);
        $m!($cfg, $ini, "physics", "wall_slide_speed", physics.wall_slide_speed, f32);
        $m!($cfg, $ini, "physics", "wall_climb_speed", physics.wall_climb_speed, f32);
        $m!($cfg, $ini, "physics", "ladder_climb_speed", physics.ladder_climb_speed, f32);
        $m!($cfg, $ini, "physics", "crouch_speed_factor", physics.crouch_speed_factor, f32);
        $m!($cfg, $ini, "physics", "aflame_accel", physics.aflame_accel, f32);
        $m!($cfg, $ini, "physics", "aflame_speed", physics.aflame_speed, f32);
        $m!($cfg, $ini, "physics", "deflame_accel", physics.deflame_accel, f32);
        $m!($cfg, $ini, "physics", "deflame_speed", physics.deflame_speed, f32);

        $m!($cfg, $ini, "player", "max_health", player.max_health, u32);
        $m!($cfg, $ini, "player", "run_speed", player.run_speed, f32);
        $m!($cfg, $ini, "player", "accel", player.accel, f32);
        $m!($cfg, $ini, "player", "friction", player.friction, f32);
        $m!($cfg, $ini, "player", "hit_stun_ms", player.hit_stun_ms, u64);
        $m!($cfg, $ini, "player", "hit_cooldown_ms", player.hit_cooldown_ms, u64);
        $m!($cfg, $ini, "player", "frozen_ms", player.frozen_ms, u64);
        $m!($cfg, $ini, "player", "defrost_ms", player.defrost_ms, u64);

        $m!($cfg, $ini, "enemy", "max_health", enemy.max_health, u32);
        $m!($cfg, $ini, "enemy", "run_speed", enemy.run_speed, f32);
        $m!($cfg, $ini, "enemy", "accel", enemy.accel, f32);
        $m!($cfg, $ini, "enemy", "friction", enemy.friction, f32);
        $m!($cfg, $ini, "enemy", "hit_stun_ms", enemy.hit_stun_ms, u64);
        $m!($cfg, $ini, "enemy", "hit_cooldown_ms", enemy.hit_cooldown_ms, u64);
        $m!($cfg, $ini, "enemy", "frozen_ms", enemy.frozen_ms, u64);
        $m!($cfg, $ini, "enemy", "defrost_ms", enemy.defrost_ms, u64);

        $m!($cfg, $ini, "collision", "landing_overlap_ratio", collision.landing_overlap_ratio, f32);
        $m!($cfg, $ini, "collision", "ceiling_overlap_ratio", collision.ceiling_overlap_ratio, f32);
        $m!($cfg, $ini, "collision", "landing_friction", collision.landing_friction, f32);
        $m!($cfg, $ini, "collision", "ground_snap", collision.ground_snap, f32);
        $m!($cfg, $ini, "collision", "wall_overlap_ratio", collision.wall_overlap_ratio, f32);
        $m!($cfg, $ini, "collision", "bounce_velocity", collision.bounce_velocity, f32);
        $m!($cfg, $ini, "collision", "stomp_bounce", collision.stomp_bounce, f32);
        $m!($cfg, $ini, "collision", "stomp_grace", collision.stomp_grace, f32);
        $m!($cfg, $ini, "collision", "tile_size", collision.tile_size, f32);

        $m!($cfg, $ini, "timing", "frame_ms", timing.frame_ms, u64);
        $m!($cfg, $ini, "timing", "attack_state_ms", timing.attack_state_ms, u64);
        $m!($cfg, $ini, "timing", "dash_ms", timing.dash_ms, u64);
        $m!($cfg, $ini, "timing", "roll_ms", timing.roll_ms, u64);
        $m!($cfg, $ini, "timing", "slide_ms", timing.slide_ms, u64);
        $m!($cfg, $ini, "timing", "wall_climb_ms", timing.wall_climb_ms, u64);
        $m!($cfg, $ini, "timing", "dash_cooldown_ms", timing.dash_cooldown_ms, u64);
        $m!($cfg, $ini, "timing", "roll_cooldown_ms", timing.roll_cooldown_ms, u64);

        $m!($cfg, $ini, "status", "aflame_ms", status.aflame_ms, u64);
        $m!($cfg, $ini, "status", "deflame_ms", status.deflame_ms, u64);
        $m!($cfg, $ini, "status", "aflame_damage", status.aflame_damage, u32);
        $m!($cfg, $ini, "status", "aflame_tick_ms", status.aflame_tick_ms, u64);
        $m!($cfg, $ini, "status", "fire_watchdog_ms", status.fire_watchdog_ms, u64);
        $m!($cfg, $ini, "status", "smashed_ms", status.smashed_ms, u64);
        $m!($cfg, $ini, "status", "zapped_ms", status.zapped_ms, u64);
        $m!($cfg, $ini, "status", "zapped_damage", status.zapped_damage, u32);
        $m!($cfg, $ini, "status", "zapped_tick_ms", status.zapped_tick_ms, u64);

        $m!($cfg, $ini, "combat", "primary_damage", combat.primary_damage, u32);
        $m!($cfg, $ini, "combat", "secondary_damage", combat.secondary_damage, u32);
        $m!($cfg, $ini, "combat", "combo_damage", combat.combo_damage, u32);
        $m!($cfg, $ini, "combat", "crouch_damage", combat.crouch_damage, u32);
        $m!($cfg, $ini, "combat", "secondary_frame_multiplier", combat.secondary_frame_multiplier, f32);
        $m!($cfg, $ini, "combat", "lava_damage", combat.lava_damage, u32);

        $m!($cfg, $ini, "ai", "detection_range", ai.detection_range, f32);
        $m!($cfg, $ini, "ai", "attack_range", ai.attack_range, f32);
        $m!($cfg, $ini, "ai", "attack_cooldown_ms", ai.attack_cooldown_ms, u64);
        $m!($cfg, $ini, "ai", "patrol_distance", ai.patrol_distance, f32);
        $m!($cfg, $ini, "ai", "post_attack_pause_ms", ai.post_attack_pause_ms, u64);
        $m!($cfg, $ini, "ai", "patrol_jump_chance", ai.patrol_jump_chance, f32);
    };
}

macro_rules! load_key {
    ($cfg:expr, $ini:expr, $section:literal, $key:literal, $($field:ident).+, f32) => {
        if let Some(v) = $ini.getfloat($section, $key).map_err(|_| invalid_value($ini, $section, $key))? {
            $cfg.$($field).+ = v as f32;
        }
    };
    ($cfg:expr, $ini:expr, $section:literal, $key:literal, $($field:ident).+, u32) => {
        if let Some(v) = $ini.getuint($section, $key).map_err(|_| invalid_value($ini, $section, $key))? {
            $cfg.$($field).+ = u32::try_from(v).map_err(|_| invalid_value($ini, $section, $key))?;
        }
    };
    ($cfg:expr, $ini:expr, $section:literal, $key:literal, $($field:ident).+, u64) => {
        if let Some(v) = $ini.getuint($section, $key).map_err(|_| invalid_value($ini, $section, $key))? {
            $cfg.$($field).+ = v;
        }
    };
}

fn invalid_value(ini: &Ini, section: &'static str, key: &'static str) -> CoreError {
    CoreError::ConfigValue {
        section,
        key,
        value: ini.get(section, key).unwrap_or_default(),
    }
}

macro_rules! save_key {
    ($cfg:expr, $ini:expr, $section:literal, $key:literal, $($field:ident).+, $ty:ident) => {
        $ini.set($section, $key, Some($cfg.$($field).+.to_string()));
    };
}

impl GameConfig {
    /// Create a new configuration with the default tuning.
    pub fn new() -> Self {
        Self {
            physics: PhysicsTuning {
                gravity: 0.7,
                jump_strength: -15.0,
                dash_speed: 18.0,
                roll_speed: 14.0,
                roll_control_factor: 0.4,
                terminal_velocity: 18.0,
                wall_slide_speed: 2.0,
                wall_climb_speed: -4.0,
                ladder_climb_speed: 3.0,
                crouch_speed_factor: 0.6,
                aflame_accel: 1.15,
                aflame_speed: 1.3,
                deflame_accel: 1.1,
                deflame_speed: 1.05,
            },
            player: ArchetypeTuning {
                max_health: 100,
                run_speed: 7.0,
                accel: 0.5,
                friction: -0.15,
                hit_stun_ms: 300,
                hit_cooldown_ms: 600,
                frozen_ms: 2800,
                defrost_ms: 1200,
            },
            enemy: ArchetypeTuning {
                max_health: 300,
                run_speed: 5.0,
                accel: 0.4,
                friction: -0.12,
                hit_stun_ms: 150,
                hit_cooldown_ms: 500,
                frozen_ms: 3000,
                defrost_ms: 1000,
            },
            collision: CollisionTuning {
                landing_overlap_ratio: 0.15,
                ceiling_overlap_ratio: 0.15,
                landing_friction: 0.8,
                ground_snap: 5.0,
                wall_overlap_ratio: 0.3,
                bounce_velocity: 2.5,
                stomp_bounce: -8.0,
                stomp_grace: 8.0,
                tile_size: 40.0,
            },
            timing: TimingTuning {
                frame_ms: 80,
                attack_state_ms: 480,
                dash_ms: 150,
                roll_ms: 1000,
                slide_ms: 400,
                wall_climb_ms: 500,
                dash_cooldown_ms: 0,
                roll_cooldown_ms: 0,
                projectile_cooldowns_ms: [750, 1000, 600, 800, 900, 800, 750],
            },
            status: StatusTuning {
                aflame_ms: 3000,
                deflame_ms: 2000,
                aflame_damage: 5,
                aflame_tick_ms: 100,
                fire_watchdog_ms: 5000,
                smashed_ms: 5000,
                zapped_ms: 3000,
                zapped_damage: 3,
                zapped_tick_ms: 300,
            },
            combat: CombatTuning {
                primary_damage: 10,
                secondary_damage: 5,
                combo_damage: 20,
                crouch_damage: 5,
                secondary_frame_multiplier: 1.5,
                lava_damage: 50,
            },
            ai: AiTuning {
                detection_range: 250.0,
                attack_range: 50.0,
                attack_cooldown_ms: 1500,
                patrol_distance: 150.0,
                post_attack_pause_ms: 300,
                patrol_jump_chance: 0.015,
            },
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Movement and resilience values for an archetype.
    pub fn archetype(&self, archetype: Archetype) -> &ArchetypeTuning {
        match archetype {
            Archetype::Player => &self.player,
            Archetype::Enemy => &self.enemy,
        }
    }

    /// Damage and clip-duration scaling for an attack kind.
    pub fn attack_profile(&self, kind: AttackKind) -> AttackProfile {
        let (damage, frame_multiplier) = match kind {
            AttackKind::Primary => (self.combat.primary_damage, 1.0),
            AttackKind::Secondary => (
                self.combat.secondary_damage,
                self.combat.secondary_frame_multiplier,
            ),
            AttackKind::Combo => (self.combat.combo_damage, 1.0),
            AttackKind::Crouch => (self.combat.crouch_damage, 1.0),
        };
        AttackProfile {
            damage,
            frame_multiplier,
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values. Projectile cooldowns are
    /// read from `[timing] projectile_cooldowns_ms` as a comma-separated list.
    pub fn load_from_file(&mut self) -> Result<(), CoreError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|reason| CoreError::ConfigLoad {
                path: self.config_path.clone(),
                reason,
            })?;
        self.apply_ini(&config)?;

        info!(
            "Loaded tuning from {:?}: gravity={}, player run={}, enemy run={}, fire watchdog={}ms",
            self.config_path,
            self.physics.gravity,
            self.player.run_speed,
            self.enemy.run_speed,
            self.status.fire_watchdog_ms
        );

        Ok(())
    }

    /// Parse configuration from INI text instead of a file.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), CoreError> {
        let mut config = Ini::new();
        config.read(text.to_string()).map_err(|reason| CoreError::ConfigLoad {
            path: PathBuf::from("<string>"),
            reason,
        })?;
        self.apply_ini(&config)
    }

    /// Parse into a copy and only adopt it once every value checks out, so a
    /// failed load leaves the current tuning untouched.
    fn apply_ini(&mut self, config: &Ini) -> Result<(), CoreError> {
        let mut next = self.clone();
        for_each_key!(load_key, next, config);

        if let Some(list) = config.get("timing", "projectile_cooldowns_ms") {
            for (slot, item) in list.split(',').enumerate().take(PROJECTILE_SLOTS) {
                let ms = item.trim().parse::<Millis>().map_err(|_| CoreError::ConfigValue {
                    section: "timing",
                    key: "projectile_cooldowns_ms",
                    value: list.clone(),
                })?;
                next.timing.projectile_cooldowns_ms[slot] = ms;
            }
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.timing.frame_ms == 0 {
            return Err(CoreError::ConfigValue {
                section: "timing",
                key: "frame_ms",
                value: "0".into(),
            });
        }
        for (section, tuning) in [("player", &self.player), ("enemy", &self.enemy)] {
            if tuning.max_health == 0 {
                return Err(CoreError::ConfigValue {
                    section,
                    key: "max_health",
                    value: "0".into(),
                });
            }
            if tuning.run_speed <= 0.0 {
                return Err(CoreError::ConfigValue {
                    section,
                    key: "run_speed",
                    value: tuning.run_speed.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), CoreError> {
        let mut config = Ini::new();
        for_each_key!(save_key, self, config);
        let cooldowns = self
            .timing
            .projectile_cooldowns_ms
            .iter()
            .map(|ms| ms.to_string())
            .collect::<Vec<_>>()
            .join(",");
        config.set("timing", "projectile_cooldowns_ms", Some(cooldowns));

        config
            .write(&self.config_path)
            .map_err(|source| CoreError::ConfigSave {
                path: self.config_path.clone(),
                source,
            })?;

        info!("Saved tuning to {:?}", self.config_path);

        Ok(())
    }
}
