use serde::{Deserialize, Serialize};

use crate::components::state::StateId;
use crate::resources::worldtime::Millis;

/// Playback cursor for the clip a character is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Animation {
    /// Clip being shown, as last chosen by the display-key query.
    pub key: StateId,
    pub frame_index: usize,
    /// Time the current frame started.
    pub frame_started: Millis,
    /// A one-shot clip ran out and was reported.
    pub finished: bool,
}

impl Animation {
    pub fn new(key: StateId) -> Self {
        Self {
            key,
            frame_index: 0,
            frame_started: 0,
            finished: false,
        }
    }

    /// Rewind to the first frame.
    pub fn restart(&mut self, now: Millis) {
        self.frame_index = 0;
        self.frame_started = now;
        self.finished = false;
    }
}
