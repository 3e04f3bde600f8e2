//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per tick, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Update elapsed and delta on the `WorldTime` resource.
///
/// `dt` is expected to be the unscaled tick delta in seconds. The system
/// applies the current `time_scale` and writes `elapsed`, `delta`,
/// `elapsed_ms` and `frame_count`.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = (dt * wt.time_scale).max(0.0);
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.elapsed_ms += (scaled_dt * 1000.0).round() as u64;
    wt.frame_count += 1;
}
