use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The numbers that count in cricket. 25 is the bullseye.
pub const CRICKET_TARGETS: [u8; 7] = [15, 16, 17, 18, 19, 20, 25];
pub const BULLSEYE: u8 = 25;
pub const MARKS_TO_CLOSE: u8 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CricketThrow {
    pub target: u8,
    pub multiplier: u8,
}

impl CricketThrow {
    pub fn new(target: u8, multiplier: u8) -> Self {
        Self { target, multiplier }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThrowOutcome {
    pub points: u16,
    pub marks_added: u8,
    pub closed_board: bool,
}

/// Marks per target for every player in the match. Owned by the match
/// aggregate when the mode is cricket.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct CricketBoard {
    marks: HashMap<PlayerId, HashMap<u8, u8>>,
}

impl CricketBoard {
    pub fn new(player_ids: &[PlayerId]) -> Self {
        let marks = player_ids
            .iter()
            .map(|&id| (id, CRICKET_TARGETS.iter().map(|&t| (t, 0)).collect()))
            .collect();
        Self { marks }
    }

    pub fn marks(&self, player_id: &PlayerId, target: u8) -> u8 {
        self.marks
            .get(player_id)
            .and_then(|targets| targets.get(&target))
            .copied()
            .unwrap_or(0)
    }

    pub fn has_closed(&self, player_id: &PlayerId, target: u8) -> bool {
        self.marks(player_id, target) >= MARKS_TO_CLOSE
    }

    pub fn has_closed_board(&self, player_id: &PlayerId) -> bool {
        CRICKET_TARGETS
            .iter()
            .all(|&target| self.has_closed(player_id, target))
    }

    /// Resolves a single dart. Targets outside the cricket numbers score
    /// nothing and leave the board untouched. Overflow marks beyond the
    /// third score points unless every opponent has closed the number.
    pub fn apply_throw(
        &mut self,
        player_id: &PlayerId,
        opponent_ids: &[PlayerId],
        throw: CricketThrow,
    ) -> ThrowOutcome {
        if !CRICKET_TARGETS.contains(&throw.target) {
            return ThrowOutcome::default();
        }

        // The bull has no treble ring.
        let effective_multiplier = if throw.target == BULLSEYE && throw.multiplier == 3 {
            2
        } else {
            throw.multiplier
        };

        let before = self.marks(player_id, throw.target);
        let new_marks = (before + effective_multiplier).min(MARKS_TO_CLOSE);
        let overflow = (before + effective_multiplier).saturating_sub(MARKS_TO_CLOSE);

        if let Some(targets) = self.marks.get_mut(player_id) {
            targets.insert(throw.target, new_marks);
        }

        let all_opponents_closed = opponent_ids
            .iter()
            .all(|opponent| self.has_closed(opponent, throw.target));

        let points = if all_opponents_closed {
            0
        } else {
            overflow as u16 * throw.target as u16
        };

        ThrowOutcome {
            points,
            marks_added: new_marks - before,
            closed_board: self.has_closed_board(player_id),
        }
    }
}
