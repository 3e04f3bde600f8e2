//! Projectile launch notifications.
//!
//! Projectiles are simulated outside the kinematics core. When a character
//! fires, the tick system triggers a [`ProjectileFiredEvent`]; whoever owns
//! projectile simulation observes it.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::info;

use crate::systems::input::ProjectileRequest;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ProjectileFiredEvent {
    pub entity: Entity,
    pub request: ProjectileRequest,
}

/// Log launches. Stand-in observer for hosts without projectile simulation.
pub fn observe_projectile_fired(trigger: On<ProjectileFiredEvent>) {
    let event = trigger.event();
    info!(
        "character {} fired slot {} from ({:.1}, {:.1}) towards ({:.2}, {:.2})",
        event.request.owner,
        event.request.slot,
        event.request.origin.x,
        event.request.origin.y,
        event.request.direction.x,
        event.request.direction.y
    );
}
