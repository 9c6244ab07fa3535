use crate::types::{MatchId, PlayerId, Tick};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use strum::Display;

pub const X01_STARTING_SCORE_301: u16 = 301;
pub const X01_STARTING_SCORE_501: u16 = 501;
pub const DARTS_PER_TURN: u16 = 3;

#[allow(non_camel_case_types)]
#[derive(Debug, Display, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GameMode {
    X01_301,
    #[default]
    X01_501,
    Cricket,
    BullOff,
}

impl GameMode {
    /// Countdown start for X01 modes. Cricket and bull-off count up from zero.
    pub fn starting_score(&self) -> u16 {
        match self {
            Self::X01_301 => X01_STARTING_SCORE_301,
            Self::X01_501 => X01_STARTING_SCORE_501,
            Self::Cricket | Self::BullOff => 0,
        }
    }

    pub fn is_x01(&self) -> bool {
        matches!(self, Self::X01_301 | Self::X01_501)
    }
}

#[derive(
    Debug, Display, Default, Clone, Copy, Serialize_repr, Deserialize_repr, PartialEq, Eq, Hash,
)]
#[repr(u8)]
pub enum CheckoutMode {
    SingleOut,
    #[default]
    DoubleOut,
    MasterOut,
}

impl CheckoutMode {
    /// Whether a leg may end on a dart with the given multiplier.
    pub fn allows_final_dart(&self, multiplier: u8) -> bool {
        match self {
            Self::SingleOut => true,
            Self::DoubleOut => multiplier == 2,
            Self::MasterOut => multiplier == 2 || multiplier == 3,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerLegState {
    pub player_id: PlayerId,
    pub display_name: String,
    pub checkout_mode: CheckoutMode,
    pub score: u16,
    pub total_scored: u32,
    pub darts_thrown: u32,
    pub highest_turn_score: u16,
    pub checkout_attempts: u32,
    pub successful_checkouts: u32,
}

impl PlayerLegState {
    pub fn new(
        player_id: PlayerId,
        display_name: String,
        checkout_mode: CheckoutMode,
        mode: GameMode,
    ) -> Self {
        Self {
            player_id,
            display_name,
            checkout_mode,
            score: mode.starting_score(),
            ..Default::default()
        }
    }

    pub fn apply_turn_score(&mut self, points: u16, remaining: u16) {
        self.score = remaining;
        self.total_scored += points as u32;
        self.darts_thrown += DARTS_PER_TURN as u32;
        self.highest_turn_score = self.highest_turn_score.max(points);
    }

    pub fn three_dart_average(&self) -> f32 {
        if self.darts_thrown == 0 {
            return 0.0;
        }
        self.total_scored as f32 / self.darts_thrown as f32 * DARTS_PER_TURN as f32
    }

    pub fn checkout_percentage(&self) -> f32 {
        if self.checkout_attempts == 0 {
            return 0.0;
        }
        self.successful_checkouts as f32 / self.checkout_attempts as f32 * 100.0
    }
}

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Scoreboard {
    pub legs_in_current_set: u16,
    pub sets_won: u16,
    pub total_legs_won: u16,
}

impl Scoreboard {
    /// Records a leg win, rolling legs over into a set once `legs_per_set`
    /// is reached. Returns true if the leg completed a set.
    pub fn record_leg(&mut self, legs_per_set: u16) -> bool {
        self.total_legs_won += 1;
        self.legs_in_current_set += 1;
        if self.legs_in_current_set >= legs_per_set {
            self.legs_in_current_set = 0;
            self.sets_won += 1;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MatchEvent {
    LegWon {
        match_id: MatchId,
        winner: PlayerId,
        leg_number: u16,
        timestamp: Tick,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_modes() {
        assert!(CheckoutMode::SingleOut.allows_final_dart(1));
        assert!(CheckoutMode::SingleOut.allows_final_dart(3));
        assert!(!CheckoutMode::DoubleOut.allows_final_dart(1));
        assert!(CheckoutMode::DoubleOut.allows_final_dart(2));
        assert!(!CheckoutMode::DoubleOut.allows_final_dart(3));
        assert!(CheckoutMode::MasterOut.allows_final_dart(2));
        assert!(CheckoutMode::MasterOut.allows_final_dart(3));
        assert!(!CheckoutMode::MasterOut.allows_final_dart(1));
    }

    #[test]
    fn test_scoreboard_rollover() {
        let mut board = Scoreboard::default();
        assert!(!board.record_leg(3));
        assert!(!board.record_leg(3));
        assert!(board.legs_in_current_set < 3);
        assert!(board.record_leg(3));
        assert_eq!(board.legs_in_current_set, 0);
        assert_eq!(board.sets_won, 1);
        assert_eq!(board.total_legs_won, 3);
    }

    #[test]
    fn test_derived_stats_empty() {
        let state = PlayerLegState::default();
        assert_eq!(state.three_dart_average(), 0.0);
        assert_eq!(state.checkout_percentage(), 0.0);
    }

    #[test]
    fn test_three_dart_average() {
        let mut state = PlayerLegState::new(
            PlayerId::new_v4(),
            "Ale".to_string(),
            CheckoutMode::DoubleOut,
            GameMode::X01_501,
        );
        state.apply_turn_score(60, 441);
        state.apply_turn_score(100, 341);
        assert_eq!(state.darts_thrown, 6);
        assert_eq!(state.three_dart_average(), 80.0);
        assert_eq!(state.highest_turn_score, 100);
    }
}
