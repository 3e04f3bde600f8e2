//! Read-only inputs shared by every per-character update.

use crate::components::character::Character;
use crate::resources::animationstore::ClipSet;
use crate::resources::gameconfig::{ArchetypeTuning, GameConfig};
use crate::resources::worldtime::{Clock, Millis};

/// Clock, tuning and clip availability for one character's tick.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub clock: &'a dyn Clock,
    pub config: &'a GameConfig,
    pub clips: &'a ClipSet,
}

impl<'a> TickContext<'a> {
    pub fn new(clock: &'a dyn Clock, config: &'a GameConfig, clips: &'a ClipSet) -> Self {
        Self {
            clock,
            config,
            clips,
        }
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    /// Tuning section for the character's archetype.
    pub fn tuning(&self, ch: &Character) -> &'a ArchetypeTuning {
        self.config.archetype(ch.archetype)
    }

    /// Milliseconds since `since`, zero if `since` lies in the future.
    pub fn since(&self, since: Millis) -> Millis {
        self.now().saturating_sub(since)
    }
}
