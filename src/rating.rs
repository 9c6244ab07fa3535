use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_RATING: i32 = 1200;
pub const K_FACTOR: f64 = 32.0;

fn expected_score(rating: i32, other_rating: i32) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((other_rating - rating) as f64 / 400.0))
}

/// Standard Elo update for a decided match, rounded to whole points.
pub fn calculate_new_ratings(winner_rating: i32, loser_rating: i32) -> (i32, i32) {
    let expected_winner = expected_score(winner_rating, loser_rating);
    let expected_loser = expected_score(loser_rating, winner_rating);

    let new_winner = winner_rating as f64 + K_FACTOR * (1.0 - expected_winner);
    let new_loser = loser_rating as f64 + K_FACTOR * (0.0 - expected_loser);

    (new_winner.round() as i32, new_loser.round() as i32)
}

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    pub wins: u32,
    pub losses: u32,
}

/// Club-wide ratings, one entry per player, seeded at 1200 the first time
/// a player appears. Owned by the orchestrating service; the match and
/// tournament aggregates never see it.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingBook {
    ratings: HashMap<PlayerId, i32>,
    records: HashMap<PlayerId, PlayerRecord>,
}

impl RatingBook {
    pub fn rating(&self, player_id: &PlayerId) -> i32 {
        self.ratings.get(player_id).copied().unwrap_or(DEFAULT_RATING)
    }

    pub fn record(&self, player_id: &PlayerId) -> PlayerRecord {
        self.records.get(player_id).copied().unwrap_or_default()
    }

    /// Folds one decided match into the book. The caller guarantees this
    /// runs exactly once per winner transition.
    pub fn apply_match_result(&mut self, winner_id: PlayerId, loser_id: PlayerId) {
        let (new_winner, new_loser) =
            calculate_new_ratings(self.rating(&winner_id), self.rating(&loser_id));
        self.ratings.insert(winner_id, new_winner);
        self.ratings.insert(loser_id, new_loser);
        self.records.entry(winner_id).or_default().wins += 1;
        self.records.entry(loser_id).or_default().losses += 1;
    }

    pub fn standings(&self) -> Vec<(PlayerId, i32)> {
        let mut entries = self
            .ratings
            .iter()
            .map(|(&id, &rating)| (id, rating))
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}
