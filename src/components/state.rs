//! Discrete character states and the small enums that travel with them.
//!
//! [`StateId`] is the closed set of logical states a
//! [`Character`](super::character::Character) can be in. The same identifiers
//! double as animation clip keys: every state has (at most) one clip, and the
//! display-key query in [`crate::systems::statemachine`] only ever answers with
//! a `StateId`.
//!
//! The membership helpers (`is_crouch_state`, `is_fire_state`, ...) are the
//! single place where state groupings are defined, so guards and flag clearing
//! never disagree about what counts as "a crouch state".
//!
//! # Related
//!
//! - [`crate::systems::statemachine`] – transition guards and entry effects
//! - [`crate::resources::animationstore::ClipSet`] – clip availability per state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical state of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateId {
    #[default]
    Idle,
    Run,
    Turn,
    Jump,
    JumpFallTrans,
    Fall,
    Crouch,
    CrouchWalk,
    CrouchTrans,
    CrouchAttack,
    Attack,
    AttackNm,
    Attack2,
    Attack2Nm,
    AttackCombo,
    AttackComboNm,
    Dash,
    Roll,
    Slide,
    SlideTransStart,
    SlideTransEnd,
    LadderIdle,
    LadderClimb,
    WallSlide,
    WallClimb,
    WallHang,
    Hit,
    Death,
    DeathNm,
    Aflame,
    AflameCrouch,
    Burning,
    BurningCrouch,
    Deflame,
    DeflameCrouch,
    Frozen,
    Defrost,
    Petrified,
    Smashed,
    Zapped,
}

impl StateId {
    /// Every state, in declaration order. Used as the last-resort clip search order.
    pub const ALL: [StateId; 40] = [
        StateId::Idle,
        StateId::Run,
        StateId::Turn,
        StateId::Jump,
        StateId::JumpFallTrans,
        StateId::Fall,
        StateId::Crouch,
        StateId::CrouchWalk,
        StateId::CrouchTrans,
        StateId::CrouchAttack,
        StateId::Attack,
        StateId::AttackNm,
        StateId::Attack2,
        StateId::Attack2Nm,
        StateId::AttackCombo,
        StateId::AttackComboNm,
        StateId::Dash,
        StateId::Roll,
        StateId::Slide,
        StateId::SlideTransStart,
        StateId::SlideTransEnd,
        StateId::LadderIdle,
        StateId::LadderClimb,
        StateId::WallSlide,
        StateId::WallClimb,
        StateId::WallHang,
        StateId::Hit,
        StateId::Death,
        StateId::DeathNm,
        StateId::Aflame,
        StateId::AflameCrouch,
        StateId::Burning,
        StateId::BurningCrouch,
        StateId::Deflame,
        StateId::DeflameCrouch,
        StateId::Frozen,
        StateId::Defrost,
        StateId::Petrified,
        StateId::Smashed,
        StateId::Zapped,
    ];

    /// Snake-case name, matching the serialized form and clip file naming.
    pub fn as_str(self) -> &'static str {
        match self {
            StateId::Idle => "idle",
            StateId::Run => "run",
            StateId::Turn => "turn",
            StateId::Jump => "jump",
            StateId::JumpFallTrans => "jump_fall_trans",
            StateId::Fall => "fall",
            StateId::Crouch => "crouch",
            StateId::CrouchWalk => "crouch_walk",
            StateId::CrouchTrans => "crouch_trans",
            StateId::CrouchAttack => "crouch_attack",
            StateId::Attack => "attack",
            StateId::AttackNm => "attack_nm",
            StateId::Attack2 => "attack2",
            StateId::Attack2Nm => "attack2_nm",
            StateId::AttackCombo => "attack_combo",
            StateId::AttackComboNm => "attack_combo_nm",
            StateId::Dash => "dash",
            StateId::Roll => "roll",
            StateId::Slide => "slide",
            StateId::SlideTransStart => "slide_trans_start",
            StateId::SlideTransEnd => "slide_trans_end",
            StateId::LadderIdle => "ladder_idle",
            StateId::LadderClimb => "ladder_climb",
            StateId::WallSlide => "wall_slide",
            StateId::WallClimb => "wall_climb",
            StateId::WallHang => "wall_hang",
            StateId::Hit => "hit",
            StateId::Death => "death",
            StateId::DeathNm => "death_nm",
            StateId::Aflame => "aflame",
            StateId::AflameCrouch => "aflame_crouch",
            StateId::Burning => "burning",
            StateId::BurningCrouch => "burning_crouch",
            StateId::Deflame => "deflame",
            StateId::DeflameCrouch => "deflame_crouch",
            StateId::Frozen => "frozen",
            StateId::Defrost => "defrost",
            StateId::Petrified => "petrified",
            StateId::Smashed => "smashed",
            StateId::Zapped => "zapped",
        }
    }

    /// Look a state up by its snake-case name.
    pub fn from_name(name: &str) -> Option<StateId> {
        StateId::ALL.iter().copied().find(|s| s.as_str() == name)
    }

    /// Any of the attack states, including crouch attack and `_nm` variants.
    pub fn is_attack(self) -> bool {
        matches!(
            self,
            StateId::Attack
                | StateId::AttackNm
                | StateId::Attack2
                | StateId::Attack2Nm
                | StateId::AttackCombo
                | StateId::AttackComboNm
                | StateId::CrouchAttack
        )
    }

    /// Attack variants played while standing still. They pin horizontal motion.
    pub fn is_rooted_attack(self) -> bool {
        matches!(
            self,
            StateId::AttackNm | StateId::Attack2Nm | StateId::AttackComboNm | StateId::CrouchAttack
        )
    }

    /// States that use the crouching collision profile.
    pub fn is_crouch_state(self) -> bool {
        matches!(
            self,
            StateId::Crouch
                | StateId::CrouchWalk
                | StateId::CrouchAttack
                | StateId::CrouchTrans
                | StateId::AflameCrouch
                | StateId::BurningCrouch
                | StateId::DeflameCrouch
                | StateId::Slide
                | StateId::SlideTransStart
                | StateId::SlideTransEnd
        )
    }

    pub fn is_slide_state(self) -> bool {
        matches!(
            self,
            StateId::Slide | StateId::SlideTransStart | StateId::SlideTransEnd
        )
    }

    /// Ignition and burning states (the aflame sub-phase).
    pub fn is_aflame_state(self) -> bool {
        matches!(
            self,
            StateId::Aflame | StateId::AflameCrouch | StateId::Burning | StateId::BurningCrouch
        )
    }

    pub fn is_deflame_state(self) -> bool {
        matches!(self, StateId::Deflame | StateId::DeflameCrouch)
    }

    /// Aflame or deflame sub-phase states.
    pub fn is_fire_state(self) -> bool {
        self.is_aflame_state() || self.is_deflame_state()
    }

    pub fn is_death(self) -> bool {
        matches!(self, StateId::Death | StateId::DeathNm)
    }

    pub fn is_wall_state(self) -> bool {
        matches!(
            self,
            StateId::WallSlide | StateId::WallClimb | StateId::WallHang
        )
    }

    pub fn is_ladder_state(self) -> bool {
        matches!(self, StateId::LadderIdle | StateId::LadderClimb)
    }

    /// Overlay states owned by the status-effect controller.
    pub fn is_status_overlay(self) -> bool {
        matches!(
            self,
            StateId::Frozen
                | StateId::Defrost
                | StateId::Petrified
                | StateId::Smashed
                | StateId::Zapped
        )
    }

    /// States whose clip holds its last frame instead of looping or transitioning.
    pub fn holds_last_frame(self) -> bool {
        matches!(
            self,
            StateId::Deflame | StateId::DeflameCrouch | StateId::Defrost
        )
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which attack a character is performing.
///
/// Damage and clip-duration multipliers for each kind live in
/// [`GameConfig::attack_profile`](crate::resources::gameconfig::GameConfig::attack_profile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    #[default]
    Primary,
    Secondary,
    Combo,
    Crouch,
}

impl AttackKind {
    /// State to enter for this attack, moving (`true`) or standing still.
    pub fn state(self, moving: bool) -> StateId {
        match (self, moving) {
            (AttackKind::Primary, true) => StateId::Attack,
            (AttackKind::Primary, false) => StateId::AttackNm,
            (AttackKind::Secondary, true) => StateId::Attack2,
            (AttackKind::Secondary, false) => StateId::Attack2Nm,
            (AttackKind::Combo, true) => StateId::AttackCombo,
            (AttackKind::Combo, false) => StateId::AttackComboNm,
            (AttackKind::Crouch, _) => StateId::CrouchAttack,
        }
    }

    /// Attack kind implied by an attack state, if any.
    pub fn from_state(state: StateId) -> Option<AttackKind> {
        match state {
            StateId::Attack | StateId::AttackNm => Some(AttackKind::Primary),
            StateId::Attack2 | StateId::Attack2Nm => Some(AttackKind::Secondary),
            StateId::AttackCombo | StateId::AttackComboNm => Some(AttackKind::Combo),
            StateId::CrouchAttack => Some(AttackKind::Crouch),
            _ => None,
        }
    }
}

/// Side of the body currently pressed against a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallSide {
    #[default]
    None,
    Left,
    Right,
}

impl WallSide {
    /// -1 for left, 1 for right, 0 for none.
    pub fn sign(self) -> f32 {
        match self {
            WallSide::None => 0.0,
            WallSide::Left => -1.0,
            WallSide::Right => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_name() {
        for state in StateId::ALL {
            assert_eq!(StateId::from_name(state.as_str()), Some(state));
        }
        assert_eq!(StateId::from_name("moonwalk"), None);
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&StateId::JumpFallTrans).unwrap();
        assert_eq!(json, "\"jump_fall_trans\"");
        let back: StateId = serde_json::from_str("\"burning_crouch\"").unwrap();
        assert_eq!(back, StateId::BurningCrouch);
    }

    #[test]
    fn crouch_set_covers_slides_and_fire_crouches() {
        assert!(StateId::Slide.is_crouch_state());
        assert!(StateId::DeflameCrouch.is_crouch_state());
        assert!(StateId::CrouchAttack.is_crouch_state());
        assert!(!StateId::Run.is_crouch_state());
        assert!(!StateId::Petrified.is_crouch_state());
    }

    #[test]
    fn fire_groupings() {
        assert!(StateId::Burning.is_aflame_state());
        assert!(!StateId::Burning.is_deflame_state());
        assert!(StateId::DeflameCrouch.is_fire_state());
        assert!(!StateId::Frozen.is_fire_state());
    }

    #[test]
    fn attack_kind_state_mapping_is_consistent() {
        for kind in [
            AttackKind::Primary,
            AttackKind::Secondary,
            AttackKind::Combo,
            AttackKind::Crouch,
        ] {
            for moving in [true, false] {
                let state = kind.state(moving);
                assert!(state.is_attack());
                assert_eq!(AttackKind::from_state(state), Some(kind));
            }
        }
        assert!(AttackKind::Primary.state(false).is_rooted_attack());
        assert!(!AttackKind::Primary.state(true).is_rooted_attack());
    }

    #[test]
    fn wall_side_sign() {
        assert_eq!(WallSide::Left.sign(), -1.0);
        assert_eq!(WallSide::Right.sign(), 1.0);
        assert_eq!(WallSide::None.sign(), 0.0);
    }
}
