//! Animation clip registry.
//!
//! The kinematics core never loads frames; it only needs to know which clips
//! a character has, how many frames each holds, how long a frame lasts and
//! whether the clip loops. A [`ClipSet`] answers those questions for one kind
//! of character, and the [`AnimationStore`] resource maps set names (as
//! referenced by [`Character::clip_set`](crate::components::character::Character::clip_set))
//! to their sets.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

use crate::components::state::StateId;
use crate::resources::worldtime::Millis;

/// Central registry of clip sets keyed by set name.
#[derive(Resource, Debug, Default, Clone)]
pub struct AnimationStore {
    pub sets: FxHashMap<String, ClipSet>,
}

impl AnimationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, set: ClipSet) {
        self.sets.insert(name.into(), set);
    }

    pub fn get(&self, name: &str) -> Option<&ClipSet> {
        self.sets.get(name)
    }
}

/// Immutable data describing one clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipInfo {
    /// Number of frames in the clip.
    pub frame_count: usize,
    /// Duration of a single frame.
    pub frame_ms: Millis,
    /// Whether the clip restarts after the last frame.
    pub looped: bool,
}

impl ClipInfo {
    pub fn new(frame_count: usize, frame_ms: Millis, looped: bool) -> Self {
        Self {
            frame_count,
            frame_ms,
            looped,
        }
    }

    /// A clip with no frames or zero frame time cannot be played.
    pub fn is_playable(&self) -> bool {
        self.frame_count > 0 && self.frame_ms > 0
    }
}

/// Clips available to one kind of character, keyed by state.
#[derive(Debug, Default, Clone)]
pub struct ClipSet {
    pub clips: FxHashMap<StateId, ClipInfo>,
}

impl ClipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, state: StateId, clip: ClipInfo) -> Self {
        self.clips.insert(state, clip);
        self
    }

    /// A set where every state has a playable clip of `frames` frames.
    ///
    /// Loop flags follow [`default_looping`]. Handy for headless runs and tests.
    pub fn uniform(frames: usize, frame_ms: Millis) -> Self {
        let clips = StateId::ALL
            .iter()
            .map(|&s| (s, ClipInfo::new(frames, frame_ms, default_looping(s))))
            .collect();
        Self { clips }
    }

    /// True if the state has a playable clip.
    pub fn has(&self, state: StateId) -> bool {
        self.clips.get(&state).is_some_and(ClipInfo::is_playable)
    }

    pub fn get(&self, state: StateId) -> Option<&ClipInfo> {
        self.clips.get(&state).filter(|c| c.is_playable())
    }

    pub fn frame_count(&self, state: StateId) -> usize {
        self.get(state).map_or(0, |c| c.frame_count)
    }

    /// First playable state in declaration order, used as the last fallback.
    pub fn any_playable(&self) -> Option<StateId> {
        StateId::ALL.iter().copied().find(|&s| self.has(s))
    }
}

/// Whether a state's clip naturally loops.
///
/// Clips that drive an end-of-clip transition, hold their last frame, or end
/// a life are one-shot; everything else loops.
pub fn default_looping(state: StateId) -> bool {
    !(state.is_attack()
        || state.holds_last_frame()
        || state.is_death()
        || matches!(
            state,
            StateId::Jump
                | StateId::JumpFallTrans
                | StateId::Hit
                | StateId::Turn
                | StateId::CrouchTrans
                | StateId::Slide
                | StateId::SlideTransStart
                | StateId::SlideTransEnd
                | StateId::Dash
                | StateId::Roll
                | StateId::Smashed
                | StateId::Petrified
        ))
}
