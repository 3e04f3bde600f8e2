//! ECS resources made available to systems.
//!
//! Overview
//! - `animationstore` – clip sets shared by every character of a kind
//! - `gameconfig` – tuning constants, loadable from an INI file
//! - `worldtime` – simulation time and the injectable clock
pub mod animationstore;
pub mod gameconfig;
pub mod worldtime;
