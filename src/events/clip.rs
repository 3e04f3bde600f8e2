//! End-of-clip notifications.
//!
//! The [`animation`](crate::systems::animation::animation) system triggers a
//! [`ClipFinishedEvent`] when a one-shot clip runs out. The
//! [`observe_clip_finished`] observer feeds it back into the state machine,
//! which decides the follow-up state (jump → fall, attack → idle, and so on).
//!
//! # Related
//!
//! - [`crate::systems::statemachine::on_clip_finished`] – transition table

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;

use crate::components::character::Character;
use crate::components::state::StateId;
use crate::resources::animationstore::AnimationStore;
use crate::resources::gameconfig::GameConfig;
use crate::resources::worldtime::WorldTime;
use crate::systems::context::TickContext;
use crate::systems::statemachine::on_clip_finished;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipFinishedEvent {
    pub entity: Entity,
    /// Clip that ran out.
    pub clip: StateId,
}

/// Apply the end-of-clip transition to the character that finished a clip.
pub fn observe_clip_finished(
    trigger: On<ClipFinishedEvent>,
    mut characters: Query<&mut Character>,
    store: Res<AnimationStore>,
    config: Res<GameConfig>,
    time: Res<WorldTime>,
) {
    let event = trigger.event();
    let Ok(mut ch) = characters.get_mut(event.entity) else {
        return;
    };
    let Some(clips) = store.get(&ch.clip_set) else {
        return;
    };
    let ctx = TickContext::new(&*time, &config, clips);
    on_clip_finished(&mut ch, event.clip, &ctx);
}
