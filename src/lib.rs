//! Platformer kinematics library.
//!
//! Per-character state machine, physics integration and collision
//! resolution for a 2D side-scrolling platformer, built on `bevy_ecs`.
//!
//! The pure update functions in [`systems`] take a
//! [`TickContext`](systems::context::TickContext) and can be driven with a
//! [`FakeClock`](resources::worldtime::FakeClock); the ECS systems wrap them
//! for use in a [`World`](bevy_ecs::world::World).

pub mod components;
pub mod error;
pub mod events;
pub mod game;
pub mod resources;
pub mod snapshot;
pub mod systems;
