//! ECS components for characters and level geometry.
//!
//! Submodules overview:
//! - [`animation`] – frame cursor of the clip a character displays
//! - [`behavior`] – where a character's intent comes from (forwarded or AI)
//! - [`boxcollider`] – axis-aligned rectangles and feet-anchored colliders
//! - [`character`] – the kinematic body, its flags, timers and health
//! - [`intent`] – per-tick control wishes
//! - [`level`] – platforms, ladders and hazards
//! - [`state`] – the state identifiers and their classification
//! - [`status`] – burning, frozen, zapped and stone overlays
//! - [`tipping`] – ledge tipping progress

pub mod animation;
pub mod behavior;
pub mod boxcollider;
pub mod character;
pub mod intent;
pub mod level;
pub mod state;
pub mod status;
pub mod tipping;
