use crate::{
    engine::{
        cricket::CricketThrow,
        game::{Match, MatchSummary},
        tournament::{Tournament, TournamentSummary},
        types::{CheckoutMode, GameMode, MatchEvent},
        TournamentFormat, TournamentSettings,
    },
    rating::{PlayerRecord, RatingBook},
    store,
    types::{AppResult, MatchId, MatchMap, PlayerId, TournamentId, TournamentMap},
};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

pub type PlayerMap = HashMap<PlayerId, Player>;

/// Everything the club persists in one file: registry, ratings,
/// tournaments and the ids of the individually stored matches.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClubState {
    pub players: PlayerMap,
    pub ratings: RatingBook,
    pub tournaments: TournamentMap,
    pub match_ids: Vec<MatchId>,
}

/// Composition root. Owns every aggregate and is the single writer for all
/// of them: mutation goes through `&mut self`, which serializes the
/// read-modify-write sequences the engines rely on.
pub struct App {
    pub store_prefix: String,
    pub club: ClubState,
    pub matches: MatchMap,
}

impl App {
    pub fn new(store_prefix: String) -> Self {
        Self {
            store_prefix,
            club: ClubState::default(),
            matches: MatchMap::new(),
        }
    }

    /// Loads the persisted club, or starts a fresh one if nothing is stored
    /// yet. Matches whose file went missing are dropped with a warning.
    pub fn load_or_new(store_prefix: String) -> Self {
        if !store::club_exists(&store_prefix) {
            return Self::new(store_prefix);
        }

        match store::load_club(&store_prefix) {
            Ok(club) => {
                let mut matches = MatchMap::new();
                for &match_id in club.match_ids.iter() {
                    match store::load_match(match_id) {
                        Ok(game) => {
                            matches.insert(match_id, game);
                        }
                        Err(e) => {
                            log::warn!("Could not load match {match_id}: {e}");
                        }
                    }
                }
                Self {
                    store_prefix,
                    club,
                    matches,
                }
            }
            Err(e) => {
                log::error!("Could not load club state: {e}");
                Self::new(store_prefix)
            }
        }
    }

    pub fn save(&self) -> AppResult<()> {
        store::save_club(&self.club, true, &self.store_prefix)?;
        for game in self.matches.values() {
            store::save_match(game)?;
        }
        Ok(())
    }

    // --- players ---

    pub fn ensure_player(&mut self, name: &str) -> AppResult<PlayerId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("Player name cannot be empty."));
        }
        if let Some(player) = self.club.players.values().find(|p| p.name == name) {
            return Ok(player.id);
        }
        let player = Player {
            id: PlayerId::new_v4(),
            name: name.to_string(),
        };
        let id = player.id;
        log::info!("Registered player {} ({})", player.name, id);
        self.club.players.insert(id, player);
        Ok(id)
    }

    pub fn player_name(&self, player_id: &PlayerId) -> String {
        self.club
            .players
            .get(player_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| player_id.to_string())
    }

    pub fn player_by_name(&self, name: &str) -> AppResult<PlayerId> {
        self.club
            .players
            .values()
            .find(|p| p.name == name.trim())
            .map(|p| p.id)
            .ok_or_else(|| anyhow!("Player not found."))
    }

    fn registered(&self, player_ids: &[PlayerId]) -> AppResult<()> {
        for id in player_ids {
            if !self.club.players.contains_key(id) {
                return Err(anyhow!("Player not found."));
            }
        }
        Ok(())
    }

    // --- matches ---

    pub fn new_match(
        &mut self,
        player_ids: &[PlayerId],
        mode: GameMode,
        checkout_mode: CheckoutMode,
        legs_per_set: u16,
        sets_to_win: u16,
    ) -> AppResult<MatchId> {
        self.registered(player_ids)?;
        let participants = player_ids
            .iter()
            .map(|id| (*id, self.player_name(id)))
            .collect();
        let game = Match::new(
            MatchId::new_v4(),
            mode,
            checkout_mode,
            legs_per_set,
            sets_to_win,
            participants,
        )?;
        let match_id = game.id;
        log::info!("New {} match {}", game.mode, match_id);
        store::save_match(&game)?;
        self.matches.insert(match_id, game);
        self.club.match_ids.push(match_id);
        Ok(match_id)
    }

    fn match_mut(&mut self, match_id: &MatchId) -> AppResult<&mut Match> {
        self.matches
            .get_mut(match_id)
            .ok_or_else(|| anyhow!("Match not found."))
    }

    pub fn get_match(&self, match_id: &MatchId) -> AppResult<&Match> {
        self.matches
            .get(match_id)
            .ok_or_else(|| anyhow!("Match not found."))
    }

    pub fn register_turn(
        &mut self,
        match_id: MatchId,
        points: u16,
        final_dart_multiplier: u8,
    ) -> AppResult<Vec<MatchEvent>> {
        let game = self.match_mut(&match_id)?;
        let previous_winner = game.winner;
        game.register_turn(points, final_dart_multiplier)?;
        self.after_match_mutation(match_id, previous_winner)
    }

    pub fn register_cricket_turn(
        &mut self,
        match_id: MatchId,
        throws: &[CricketThrow],
    ) -> AppResult<Vec<MatchEvent>> {
        let game = self.match_mut(&match_id)?;
        let previous_winner = game.winner;
        game.register_cricket_turn(throws)?;
        self.after_match_mutation(match_id, previous_winner)
    }

    pub fn resolve_bull_off(
        &mut self,
        match_id: MatchId,
        winner_id: PlayerId,
    ) -> AppResult<Vec<MatchEvent>> {
        let game = self.match_mut(&match_id)?;
        let previous_winner = game.winner;
        game.resolve_bull_off(winner_id)?;
        self.after_match_mutation(match_id, previous_winner)
    }

    /// Drains and logs the match events, applies the rating update exactly
    /// once when the winner transitioned from none to set, and persists.
    fn after_match_mutation(
        &mut self,
        match_id: MatchId,
        previous_winner: Option<PlayerId>,
    ) -> AppResult<Vec<MatchEvent>> {
        let game = self.match_mut(&match_id)?;
        let events = game.take_events();
        let winner = game.winner;
        let loser = match winner {
            Some(winner_id) if previous_winner.is_none() && game.players.len() == 2 => game
                .players
                .iter()
                .map(|p| p.player_id)
                .find(|id| id != &winner_id),
            _ => None,
        };
        store::save_match(game)?;

        for event in events.iter() {
            match event {
                MatchEvent::LegWon {
                    winner, leg_number, ..
                } => {
                    log::info!(
                        "Match {}: leg {} won by {}",
                        match_id,
                        leg_number,
                        self.player_name(winner)
                    );
                }
            }
        }

        if let (Some(winner_id), Some(loser_id)) = (winner, loser) {
            self.club.ratings.apply_match_result(winner_id, loser_id);
            store::save_club(&self.club, false, &self.store_prefix)?;
        }

        Ok(events)
    }

    pub fn match_summary(&self, match_id: &MatchId) -> AppResult<MatchSummary> {
        Ok(MatchSummary::from_match(self.get_match(match_id)?))
    }

    // --- tournaments ---

    pub fn create_tournament(
        &mut self,
        name: String,
        format: TournamentFormat,
        settings: TournamentSettings,
        player_ids: &[PlayerId],
        round_modes: &[GameMode],
    ) -> AppResult<TournamentId> {
        self.registered(player_ids)?;
        let tournament = Tournament::new(name, format, settings, player_ids, round_modes)?;
        let tournament_id = tournament.id;
        log::info!("New {} tournament {} ({})", format, tournament.name, tournament_id);
        self.club.tournaments.insert(tournament_id, tournament);
        store::save_club(&self.club, false, &self.store_prefix)?;
        Ok(tournament_id)
    }

    pub fn get_tournament(&self, tournament_id: &TournamentId) -> AppResult<&Tournament> {
        self.club
            .tournaments
            .get(tournament_id)
            .ok_or_else(|| anyhow!("Tournament not found."))
    }

    fn tournament_mut(&mut self, tournament_id: &TournamentId) -> AppResult<&mut Tournament> {
        self.club
            .tournaments
            .get_mut(tournament_id)
            .ok_or_else(|| anyhow!("Tournament not found."))
    }

    pub fn set_round_mode(
        &mut self,
        tournament_id: TournamentId,
        round_number: u16,
        mode: GameMode,
    ) -> AppResult<()> {
        self.tournament_mut(&tournament_id)?
            .set_round_mode(round_number, mode)?;
        store::save_club(&self.club, false, &self.store_prefix)
    }

    /// Creates a match for a start-ready fixture and links it, using the
    /// round's game mode and the tournament's default legs and sets.
    pub fn start_fixture_match(
        &mut self,
        tournament_id: TournamentId,
        round_number: u16,
        fixture_index: usize,
    ) -> AppResult<MatchId> {
        let tournament = self.get_tournament(&tournament_id)?;
        let fixture = tournament.fixture(round_number, fixture_index)?;
        if fixture.linked_match_id.is_some() {
            return Err(anyhow!("Fixture is already linked to a match."));
        }
        if fixture.is_decided() {
            return Err(anyhow!("Fixture already has a winner."));
        }
        let (home, away) = match (fixture.home.player(), fixture.away.player()) {
            (Some(home), Some(away)) => (home, away),
            _ => return Err(anyhow!("Fixture is not ready to start.")),
        };
        let round_index = round_number as usize - 1;
        let mode = tournament.rounds[round_index].mode;
        let legs_per_set = tournament.settings.legs_per_set;
        let sets_to_win = tournament.settings.sets_to_win;

        let match_id = self.new_match(
            &[home, away],
            mode,
            CheckoutMode::default(),
            legs_per_set,
            sets_to_win,
        )?;
        self.tournament_mut(&tournament_id)?
            .link_fixture_match(round_number, fixture_index, match_id)?;
        store::save_club(&self.club, false, &self.store_prefix)?;
        Ok(match_id)
    }

    pub fn record_fixture_winner(
        &mut self,
        tournament_id: TournamentId,
        round_number: u16,
        fixture_index: usize,
        winner: PlayerId,
        result_label: Option<&str>,
    ) -> AppResult<()> {
        let tournament = self.tournament_mut(&tournament_id)?;
        tournament.record_fixture_winner(round_number, fixture_index, winner, result_label)?;
        tournament.auto_resolve_byes()?;
        log::info!(
            "Tournament {}: round {} fixture {} won by {}",
            tournament_id,
            round_number,
            fixture_index,
            self.player_name(&winner)
        );
        store::save_club(&self.club, false, &self.store_prefix)
    }

    pub fn tournament_summary(&self, tournament_id: &TournamentId) -> AppResult<TournamentSummary> {
        Ok(TournamentSummary::from_tournament(
            self.get_tournament(tournament_id)?,
        ))
    }

    // --- ratings ---

    pub fn ratings_table(&self) -> Vec<(String, i32, PlayerRecord)> {
        self.club
            .ratings
            .standings()
            .into_iter()
            .map(|(id, rating)| (self.player_name(&id), rating, self.club.ratings.record(&id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Slot;

    fn app_with_players(names: &[&str]) -> (App, Vec<PlayerId>) {
        let mut app = App::new("app_test".to_string());
        let ids = names
            .iter()
            .map(|name| app.ensure_player(name).unwrap())
            .collect();
        (app, ids)
    }

    #[test]
    fn test_ensure_player_is_idempotent() {
        let (mut app, ids) = app_with_players(&["Anna"]);
        let again = app.ensure_player("Anna").unwrap();
        assert_eq!(again, ids[0]);
        assert_eq!(app.club.players.len(), 1);
    }

    #[test]
    fn test_rating_applied_once_per_match() {
        let (mut app, ids) = app_with_players(&["Anna", "Bruno"]);
        let match_id = app
            .new_match(&ids, GameMode::X01_301, CheckoutMode::SingleOut, 1, 1)
            .unwrap();

        // Anna checks out 301 in three visits of 100/100/101.
        app.register_turn(match_id, 100, 1).unwrap();
        app.register_turn(match_id, 0, 1).unwrap();
        app.register_turn(match_id, 100, 1).unwrap();
        app.register_turn(match_id, 0, 1).unwrap();
        let events = app.register_turn(match_id, 101, 1).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(app.club.ratings.rating(&ids[0]), 1216);
        assert_eq!(app.club.ratings.rating(&ids[1]), 1184);

        // Further turns are no-ops and never re-apply the update.
        let events = app.register_turn(match_id, 60, 1).unwrap();
        assert!(events.is_empty());
        assert_eq!(app.club.ratings.rating(&ids[0]), 1216);
    }

    #[test]
    fn test_unknown_match_rejected() {
        let (mut app, _) = app_with_players(&["Anna", "Bruno"]);
        assert!(matches!(
            app.register_turn(MatchId::new_v4(), 60, 1),
            Err(e) if e.to_string() == "Match not found."
        ));
    }

    #[test]
    fn test_start_fixture_match_links_once() {
        let (mut app, ids) = app_with_players(&["Anna", "Bruno", "Carla", "Dario"]);
        let tournament_id = app
            .create_tournament(
                "Club Cup".to_string(),
                TournamentFormat::SingleElimination,
                TournamentSettings::default(),
                &ids,
                &[],
            )
            .unwrap();

        let match_id = app.start_fixture_match(tournament_id, 1, 0).unwrap();
        let tournament = app.get_tournament(&tournament_id).unwrap();
        assert_eq!(
            tournament.rounds[0].fixtures[0].linked_match_id,
            Some(match_id)
        );
        assert!(matches!(
            app.start_fixture_match(tournament_id, 1, 0),
            Err(e) if e.to_string() == "Fixture is already linked to a match."
        ));
    }

    #[test]
    fn test_fixture_winner_feeds_next_round() {
        let (mut app, ids) = app_with_players(&["Anna", "Bruno", "Carla", "Dario"]);
        let tournament_id = app
            .create_tournament(
                "Club Cup".to_string(),
                TournamentFormat::SingleElimination,
                TournamentSettings::default(),
                &ids,
                &[],
            )
            .unwrap();

        let winner = {
            let tournament = app.get_tournament(&tournament_id).unwrap();
            tournament.rounds[0].fixtures[0].home.player().unwrap()
        };
        app.record_fixture_winner(tournament_id, 1, 0, winner, Some("2:0"))
            .unwrap();
        let tournament = app.get_tournament(&tournament_id).unwrap();
        assert_eq!(tournament.rounds[1].fixtures[0].home, Slot::Player(winner));
    }
}
