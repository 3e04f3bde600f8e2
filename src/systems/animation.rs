//! Clip playback.
//!
//! - [`advance_clip`] moves a character's frame cursor along the clip chosen
//!   by [`display_key`] and reports one-shot clips that ran out.
//! - [`animation`] runs it for every character and triggers
//!   [`ClipFinishedEvent`] so the state machine can react.
//!
//! # Animation Flow
//!
//! 1. Clip data lives in [`AnimationStore`], one [`ClipSet`] per kind of character
//! 2. The state machine restarts the cursor whenever a state is (re)entered
//! 3. `animation` advances frames by elapsed milliseconds
//! 4. An exhausted one-shot clip is reported once; hold-last-frame clips never are
//!
//! # Related
//!
//! - [`crate::components::animation::Animation`] – per-character cursor
//! - [`crate::events::clip`] – end-of-clip event and observer

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::character::Character;
use crate::components::state::StateId;
use crate::events::clip::ClipFinishedEvent;
use crate::resources::animationstore::{AnimationStore, ClipSet};
use crate::resources::worldtime::{Clock, Millis, WorldTime};
use crate::systems::statemachine::display_key;

/// Advance the character's frame cursor to `now`.
///
/// Returns the clip that ran out during this call, if a one-shot clip did.
/// A finished death clip also marks the death animation as finished.
pub fn advance_clip(ch: &mut Character, clips: &ClipSet, now: Millis) -> Option<StateId> {
    if ch.invalid {
        return None;
    }
    // Stone has no clip; its lifetime is timer driven.
    if ch.status.is_petrified {
        return None;
    }
    if ch.is_dead && !clips.has(StateId::Death) && !clips.has(StateId::DeathNm) {
        if !ch.death_animation_finished {
            debug!("character {}: no death clip, finishing at once", ch.id);
            ch.death_animation_finished = true;
        }
        return None;
    }

    let key = display_key(ch, clips);
    if key != ch.anim.key {
        ch.anim.key = key;
        ch.anim.restart(now);
        return None;
    }
    let clip = clips.get(key).filter(|c| c.is_playable())?;
    if ch.anim.finished {
        return None;
    }

    let elapsed = now.saturating_sub(ch.anim.frame_started);
    if elapsed < clip.frame_ms {
        return None;
    }
    let steps = elapsed / clip.frame_ms;
    ch.anim.frame_started += steps * clip.frame_ms;
    let next = ch.anim.frame_index + steps as usize;
    if next < clip.frame_count {
        ch.anim.frame_index = next;
        return None;
    }
    if clip.looped {
        ch.anim.frame_index = next % clip.frame_count;
        return None;
    }

    ch.anim.frame_index = clip.frame_count - 1;
    ch.anim.finished = true;
    if key.holds_last_frame() {
        return None;
    }
    if key.is_death() && ch.is_dead {
        info!("character {}: death animation finished", ch.id);
        ch.death_animation_finished = true;
    }
    Some(key)
}

/// Advance every character's clip and report exhausted one-shot clips.
pub fn animation(
    mut query: Query<(Entity, &mut Character)>,
    store: Res<AnimationStore>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    let now = time.now_ms();
    for (entity, mut ch) in query.iter_mut() {
        let Some(clips) = store.get(&ch.clip_set) else {
            continue;
        };
        if let Some(clip) = advance_clip(&mut ch, clips, now) {
            commands.trigger(ClipFinishedEvent { entity, clip });
        }
    }
}
