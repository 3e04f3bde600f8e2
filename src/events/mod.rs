//! Event types and observers.
//!
//! Submodules:
//! - [`clip`] – a one-shot clip ran out; feeds the state machine
//! - [`projectile`] – a character launched a projectile
pub mod clip;
pub mod projectile;
