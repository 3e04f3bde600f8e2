//! Headless kinematics demo.
//!
//! Simulates the demo level at a fixed 60 Hz without any window: a scripted
//! player runs, jumps, fights and shoots while two goblins patrol. Progress is
//! reported through `log` (set `RUST_LOG=debug` for per-character detail).
//!
//! # Main Loop
//!
//! 1. Load tuning (defaults, or an INI file given with `--config`)
//! 2. Build the level and the tick schedule
//! 3. For every tick: advance [`WorldTime`], run the schedule, optionally dump
//!    JSON snapshots of every character
//! 4. Log a summary of the survivors
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --ticks 900 --dump-snapshots 60
//! ```

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use platformer_kinematics::components::character::Character;
use platformer_kinematics::game::{TICK_SECONDS, build_schedule, setup_demo_level};
use platformer_kinematics::resources::gameconfig::GameConfig;
use platformer_kinematics::resources::worldtime::WorldTime;
use platformer_kinematics::snapshot::CharacterSnapshot;
use platformer_kinematics::systems::time::update_world_time;

/// Platformer kinematics demo
#[derive(Parser)]
#[command(version, about = "Runs the platformer kinematics demo level headless.")]
struct Cli {
    /// Tuning INI file. Built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the effective tuning to PATH and exit.
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Number of 60 Hz ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seed for the patrol AI.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Print a JSON snapshot of every character each N ticks (0 disables).
    #[arg(long, value_name = "N", default_value_t = 0)]
    dump_snapshots: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let mut config = GameConfig::with_path(path);
            if let Err(e) = config.load_from_file() {
                error!("{e}");
                std::process::exit(1);
            }
            config
        }
        None => GameConfig::new(),
    };

    // Early-exit: dump the tuning and quit
    if let Some(path) = cli.write_config {
        let config = GameConfig {
            config_path: path.clone(),
            ..config
        };
        if let Err(e) = config.save_to_file() {
            error!("{e}");
            std::process::exit(1);
        }
        println!("Tuning written to {}", path.display());
        return;
    }

    let mut world = World::new();
    setup_demo_level(&mut world, config, cli.seed);
    let mut schedule = build_schedule();

    for tick in 1..=cli.ticks {
        update_world_time(&mut world, TICK_SECONDS);
        schedule.run(&mut world);
        world.clear_trackers();

        if cli.dump_snapshots > 0 && tick % cli.dump_snapshots == 0 {
            dump_snapshots(&mut world);
        }
    }

    let now = world.resource::<WorldTime>().elapsed_ms;
    info!("simulated {} ticks ({} ms)", cli.ticks, now);
    let mut query = world.query::<&Character>();
    let mut survivors: Vec<&Character> = query.iter(&world).collect();
    survivors.sort_by_key(|c| c.id);
    for ch in survivors {
        info!(
            "character {} ({:?}): {} at ({:.1}, {:.1}), health {}/{}",
            ch.id,
            ch.archetype,
            ch.state.as_str(),
            ch.position.x,
            ch.position.y,
            ch.health.current,
            ch.health.max
        );
    }
}

fn dump_snapshots(world: &mut World) {
    let mut query = world.query::<&Character>();
    let mut snapshots: Vec<CharacterSnapshot> = query.iter(world).map(CharacterSnapshot::capture).collect();
    snapshots.sort_by_key(|s| s.id);
    for snapshot in snapshots {
        match snapshot.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => error!("character {}: {e}", snapshot.id),
        }
    }
}
