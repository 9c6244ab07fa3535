use super::cricket::{CricketBoard, CricketThrow};
use super::types::{
    CheckoutMode, GameMode, MatchEvent, PlayerLegState, Scoreboard, DARTS_PER_TURN,
};
use crate::types::{AppResult, MatchId, PlayerId, SystemTimeTick, Tick};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub display_name: String,
    pub score: u16,
    pub three_dart_average: f32,
    pub checkout_percentage: f32,
    pub highest_turn_score: u16,
    pub legs_won: u16,
    pub sets_won: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSummary {
    pub id: MatchId,
    pub mode: GameMode,
    pub players: Vec<PlayerSummary>,
    pub active_player_id: Option<PlayerId>,
    pub winner: Option<PlayerId>,
}

impl MatchSummary {
    pub fn from_match(game: &Match) -> Self {
        let players = game
            .players
            .iter()
            .map(|state| {
                let scoreboard = game.scoreboard(&state.player_id);
                PlayerSummary {
                    player_id: state.player_id,
                    display_name: state.display_name.clone(),
                    score: state.score,
                    three_dart_average: state.three_dart_average(),
                    checkout_percentage: state.checkout_percentage(),
                    highest_turn_score: state.highest_turn_score,
                    legs_won: scoreboard.total_legs_won,
                    sets_won: scoreboard.sets_won,
                }
            })
            .collect();

        Self {
            id: game.id,
            mode: game.mode,
            players,
            active_player_id: if game.has_ended() {
                None
            } else {
                Some(game.players[game.active_player_index].player_id)
            },
            winner: game.winner,
        }
    }
}

/// A scored match. The aggregate owns every per-player record and is the
/// only writer of them; callers mutate exclusively through the turn
/// operations and drain the pending events afterwards.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub id: MatchId,
    pub mode: GameMode,
    pub legs_per_set: u16,
    pub sets_to_win: u16,
    pub starting_player_id: PlayerId,
    pub active_player_index: usize,
    pub winner: Option<PlayerId>,
    pub players: Vec<PlayerLegState>,
    scoreboards: HashMap<PlayerId, Scoreboard>,
    cricket_board: Option<CricketBoard>,
    pub started_at: Tick,
    legs_played: u16,
    pending_events: Vec<MatchEvent>,
}

impl Match {
    pub fn new(
        id: MatchId,
        mode: GameMode,
        checkout_mode: CheckoutMode,
        legs_per_set: u16,
        sets_to_win: u16,
        participants: Vec<(PlayerId, String)>,
    ) -> AppResult<Self> {
        if participants.len() < 2 {
            return Err(anyhow!("A match needs at least two players."));
        }
        if legs_per_set == 0 || sets_to_win == 0 {
            return Err(anyhow!("Legs per set and sets to win must be positive."));
        }

        let players = participants
            .iter()
            .map(|(player_id, name)| {
                PlayerLegState::new(*player_id, name.clone(), checkout_mode, mode)
            })
            .collect::<Vec<_>>();

        let player_ids = participants.iter().map(|(id, _)| *id).collect::<Vec<_>>();
        let scoreboards = player_ids
            .iter()
            .map(|&id| (id, Scoreboard::default()))
            .collect();

        let cricket_board = if mode == GameMode::Cricket {
            Some(CricketBoard::new(&player_ids))
        } else {
            None
        };

        Ok(Self {
            id,
            mode,
            legs_per_set,
            sets_to_win,
            starting_player_id: player_ids[0],
            active_player_index: 0,
            winner: None,
            players,
            scoreboards,
            cricket_board,
            started_at: Tick::now(),
            legs_played: 0,
            pending_events: vec![],
        })
    }

    pub fn has_ended(&self) -> bool {
        self.winner.is_some()
    }

    pub fn active_player(&self) -> &PlayerLegState {
        &self.players[self.active_player_index]
    }

    pub fn player_state(&self, player_id: &PlayerId) -> Option<&PlayerLegState> {
        self.players.iter().find(|p| &p.player_id == player_id)
    }

    pub fn scoreboard(&self, player_id: &PlayerId) -> Scoreboard {
        self.scoreboards.get(player_id).copied().unwrap_or_default()
    }

    pub fn cricket_marks(&self, player_id: &PlayerId, target: u8) -> u8 {
        self.cricket_board
            .as_ref()
            .map(|board| board.marks(player_id, target))
            .unwrap_or(0)
    }

    fn advance_active_player(&mut self) {
        self.active_player_index = (self.active_player_index + 1) % self.players.len();
    }

    fn win_leg(&mut self, player_index: usize) {
        let winner_id = self.players[player_index].player_id;
        self.legs_played += 1;
        self.scoreboards
            .entry(winner_id)
            .or_default()
            .record_leg(self.legs_per_set);
        self.winner = Some(winner_id);
        self.pending_events.push(MatchEvent::LegWon {
            match_id: self.id,
            winner: winner_id,
            leg_number: self.legs_played,
            timestamp: Tick::now(),
        });
    }

    /// One X01 turn for the active player: `points` is the three-dart total,
    /// `final_dart_multiplier` the ring of the last scoring dart. Busts and
    /// invalid checkouts discard the whole turn and pass the throw on.
    pub fn register_turn(&mut self, points: u16, final_dart_multiplier: u8) -> AppResult<()> {
        if !self.mode.is_x01() {
            return Err(anyhow!("Match is not an X01 game."));
        }
        if self.has_ended() {
            return Ok(());
        }

        let index = self.active_player_index;
        let player = &self.players[index];

        if points > player.score {
            // Bust: the turn never happened, play moves on.
            self.advance_active_player();
            return Ok(());
        }

        let remaining = player.score - points;
        if remaining == 0 {
            if !player.checkout_mode.allows_final_dart(final_dart_multiplier) {
                self.advance_active_player();
                return Ok(());
            }

            let player = &mut self.players[index];
            player.apply_turn_score(points, 0);
            // Attempts are only counted on successful finishes; failed
            // checkouts leave both counters untouched.
            player.checkout_attempts += 1;
            player.successful_checkouts += 1;
            self.win_leg(index);
            return Ok(());
        }

        self.players[index].apply_turn_score(points, remaining);
        self.advance_active_player();
        Ok(())
    }

    /// One cricket turn: up to three darts resolved in order. Overflow
    /// points count up into the thrower's score. The leg ends the moment
    /// the thrower has the whole board closed with a score no opponent
    /// beats; remaining darts in hand are discarded.
    pub fn register_cricket_turn(&mut self, throws: &[CricketThrow]) -> AppResult<()> {
        if self.mode != GameMode::Cricket {
            return Err(anyhow!("Match is not a cricket game."));
        }
        if throws.is_empty() || throws.len() > DARTS_PER_TURN as usize {
            return Err(anyhow!("A cricket turn is one to three darts."));
        }
        if self.has_ended() {
            return Ok(());
        }

        let index = self.active_player_index;
        let thrower_id = self.players[index].player_id;
        let opponent_ids = self
            .players
            .iter()
            .map(|p| p.player_id)
            .filter(|id| id != &thrower_id)
            .collect::<Vec<_>>();

        let base_score = self.players[index].score;
        let opponent_high = self
            .players
            .iter()
            .filter(|p| p.player_id != thrower_id)
            .map(|p| p.score)
            .max()
            .unwrap_or(0);

        let board = self
            .cricket_board
            .as_mut()
            .ok_or_else(|| anyhow!("Cricket board is missing."))?;

        let mut turn_points: u16 = 0;
        let mut darts_used: u32 = 0;
        let mut won = false;
        for &throw in throws {
            let outcome = board.apply_throw(&thrower_id, &opponent_ids, throw);
            turn_points += outcome.points;
            darts_used += 1;
            // The leg ends mid-turn the moment the board is closed with
            // at least the best opposing score; darts in hand are dead.
            if outcome.closed_board && base_score + turn_points >= opponent_high {
                won = true;
                break;
            }
        }

        let player = &mut self.players[index];
        player.score += turn_points;
        player.total_scored += turn_points as u32;
        player.darts_thrown += darts_used;
        player.highest_turn_score = player.highest_turn_score.max(turn_points);

        if won {
            self.win_leg(index);
        } else {
            self.advance_active_player();
        }
        Ok(())
    }

    /// Direct winner selection for a bull-off tie-break.
    pub fn resolve_bull_off(&mut self, winner_id: PlayerId) -> AppResult<()> {
        if self.mode != GameMode::BullOff {
            return Err(anyhow!("Match is not a bull-off."));
        }
        if self.has_ended() {
            return Err(anyhow!("Match already has a winner."));
        }
        let index = self
            .players
            .iter()
            .position(|p| p.player_id == winner_id)
            .ok_or_else(|| anyhow!("Winner must be a match participant."))?;

        self.win_leg(index);
        Ok(())
    }

    /// Drains the pending event queue in occurrence order.
    pub fn take_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
