//! Simulation systems.
//!
//! Most modules expose pure functions over a [`Character`] plus a
//! [`context::TickContext`]; [`orchestrator`], [`behavior`] and
//! [`animation`] also provide the ECS systems that drive them.
//!
//! Submodules overview
//! - [`animation`] – advance clips and report the ones that ran out
//! - [`behavior`] – patrol AI that writes intents
//! - [`collision`] – platform, body, ladder and hazard resolution
//! - [`combat`] – damage, attack hitboxes, stomps and smashing
//! - [`context`] – clock, tuning and clips for one character's tick
//! - [`input`] – turn intent into actions and pick locomotion states
//! - [`orchestrator`] – the per-tick update and its ECS system
//! - [`physics`] – velocity and position integration
//! - [`statemachine`] – state entry, timers, clip-end transitions, display key
//! - [`status`] – status overlay lifecycles
//! - [`time`] – advance [`crate::resources::worldtime::WorldTime`]
//! - [`tipping`] – losing balance on a ledge
//!
//! [`Character`]: crate::components::character::Character

pub mod animation;
pub mod behavior;
pub mod collision;
pub mod combat;
pub mod context;
pub mod input;
pub mod orchestrator;
pub mod physics;
pub mod statemachine;
pub mod status;
pub mod time;
pub mod tipping;
