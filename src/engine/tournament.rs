use super::bracket::{
    self, Fixture, Round, Slot, TournamentFormat, TournamentSettings, BYE_RESULT_LABEL,
};
use super::types::GameMode;
use crate::types::{AppResult, MatchId, PlayerId, SystemTimeTick, Tick, TournamentId};
use anyhow::anyhow;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const POINTS_PER_WIN: u16 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub round_count: usize,
    pub champion: Option<PlayerId>,
    pub is_completed: bool,
    pub updated_at: Tick,
}

impl TournamentSummary {
    pub fn from_tournament(tournament: &Tournament) -> Self {
        Self {
            id: tournament.id,
            name: tournament.name.clone(),
            format: tournament.format,
            round_count: tournament.rounds.len(),
            champion: tournament.resolve_champion(),
            is_completed: tournament.is_completed(),
            updated_at: tournament.updated_at,
        }
    }
}

/// A club tournament. The bracket builder produces the round list once at
/// creation; afterwards every mutation goes through the progression
/// operations below, which validate before they touch anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub settings: TournamentSettings,
    pub rounds: Vec<Round>,
    pub created_at: Tick,
    pub updated_at: Tick,
}

impl Tournament {
    pub fn new(
        name: String,
        format: TournamentFormat,
        settings: TournamentSettings,
        participants: &[PlayerId],
        round_modes: &[GameMode],
    ) -> AppResult<Self> {
        if participants.len() < 2 {
            return Err(anyhow!("A tournament needs at least two participants."));
        }
        if !participants.iter().all_unique() {
            return Err(anyhow!("Tournament participants must be unique."));
        }

        let id = TournamentId::new_v4();
        let rounds = bracket::build_rounds(id, participants, format, &settings, round_modes);
        let now = Tick::now();

        let mut tournament = Self {
            id,
            name,
            format,
            settings,
            rounds,
            created_at: now,
            updated_at: now,
        };
        tournament.auto_resolve_byes()?;
        Ok(tournament)
    }

    fn touch(&mut self) {
        self.updated_at = Tick::now();
    }

    fn round_index(&self, round_number: u16) -> AppResult<usize> {
        if round_number == 0 || round_number as usize > self.rounds.len() {
            return Err(anyhow!("Tournament round not found."));
        }
        Ok(round_number as usize - 1)
    }

    pub fn fixture(&self, round_number: u16, fixture_index: usize) -> AppResult<&Fixture> {
        let round = &self.rounds[self.round_index(round_number)?];
        round
            .fixtures
            .get(fixture_index)
            .ok_or_else(|| anyhow!("Fixture not found."))
    }

    pub fn set_round_mode(&mut self, round_number: u16, mode: GameMode) -> AppResult<()> {
        if !self.settings.allow_round_mode_switch {
            return Err(anyhow!("Round mode changes are disabled for this tournament."));
        }
        let index = self.round_index(round_number)?;
        self.rounds[index].mode = mode;
        self.touch();
        Ok(())
    }

    pub fn link_fixture_match(
        &mut self,
        round_number: u16,
        fixture_index: usize,
        match_id: MatchId,
    ) -> AppResult<()> {
        let fixture = self.fixture(round_number, fixture_index)?;
        if fixture.linked_match_id.is_some() {
            return Err(anyhow!("Fixture is already linked to a match."));
        }
        if fixture.is_decided() {
            return Err(anyhow!("Fixture already has a winner."));
        }
        if !fixture.is_start_ready() {
            return Err(anyhow!("Fixture is not ready to start."));
        }

        let round_index = self.round_index(round_number)?;
        self.rounds[round_index].fixtures[fixture_index].linked_match_id = Some(match_id);
        self.touch();
        Ok(())
    }

    pub fn record_fixture_winner(
        &mut self,
        round_number: u16,
        fixture_index: usize,
        winner: PlayerId,
        result_label: Option<&str>,
    ) -> AppResult<()> {
        let fixture = self.fixture(round_number, fixture_index)?;
        if fixture.is_decided() {
            return Err(anyhow!("Fixture already has a winner."));
        }
        if fixture.home.is_tbd() || fixture.away.is_tbd() {
            return Err(anyhow!("Fixture participants are not decided yet."));
        }

        if fixture.has_bye() {
            // Only the automatic resolution path may decide a bye fixture.
            if result_label != Some(BYE_RESULT_LABEL) {
                return Err(anyhow!("BYE fixtures are resolved automatically."));
            }
            if fixture.bye_opponent() != Some(winner) {
                return Err(anyhow!("Winner must be a fixture participant."));
            }
        } else if !fixture.has_participant(&winner) {
            return Err(anyhow!("Winner must be a fixture participant."));
        }

        let round_index = self.round_index(round_number)?;
        let fixture = &mut self.rounds[round_index].fixtures[fixture_index];
        fixture.winner = Some(winner);
        fixture.result_label = result_label.map(str::to_string);

        if self.format == TournamentFormat::SingleElimination {
            self.propagate_winner(round_index, fixture_index, winner);
        }
        self.touch();
        Ok(())
    }

    /// Winner of fixture j feeds fixture j/2 of the next round, home side
    /// for even j, away for odd. Partial progression is fine: only the slot
    /// that just got a winner is written.
    fn propagate_winner(&mut self, round_index: usize, fixture_index: usize, winner: PlayerId) {
        let next_round = round_index + 1;
        if next_round >= self.rounds.len() {
            return;
        }
        let target = &mut self.rounds[next_round].fixtures[fixture_index / 2];
        if fixture_index % 2 == 0 {
            target.home = Slot::Player(winner);
        } else {
            target.away = Slot::Player(winner);
        }
    }

    /// Fixed-point sweep: any fixture pairing one bye against a real
    /// participant resolves for that participant, labelled "Freilos".
    /// Repeats until a full pass changes nothing.
    pub fn auto_resolve_byes(&mut self) -> AppResult<()> {
        loop {
            let mut changed = false;
            for round_index in 0..self.rounds.len() {
                for fixture_index in 0..self.rounds[round_index].fixtures.len() {
                    let fixture = &self.rounds[round_index].fixtures[fixture_index];
                    if fixture.is_decided() {
                        continue;
                    }
                    if let Some(player) = fixture.bye_opponent() {
                        self.record_fixture_winner(
                            (round_index + 1) as u16,
                            fixture_index,
                            player,
                            Some(BYE_RESULT_LABEL),
                        )?;
                        changed = true;
                    }
                }
            }
            if !changed {
                return Ok(());
            }
        }
    }

    /// Single elimination: the winner of the final. Round robin: highest
    /// point total over round one, two points per win, earliest-seeded
    /// participant keeps ties.
    pub fn resolve_champion(&self) -> Option<PlayerId> {
        match self.format {
            TournamentFormat::SingleElimination => {
                self.rounds.last()?.fixtures.first()?.winner
            }
            TournamentFormat::RoundRobin => {
                let fixtures = &self.rounds.first()?.fixtures;
                let mut table: Vec<(PlayerId, u16)> = vec![];
                for fixture in fixtures.iter() {
                    for slot in [&fixture.home, &fixture.away] {
                        if let Some(id) = slot.player() {
                            if !table.iter().any(|(entry, _)| entry == &id) {
                                table.push((id, 0));
                            }
                        }
                    }
                }
                for fixture in fixtures.iter() {
                    if let Some(winner) = fixture.winner {
                        if let Some(entry) = table.iter_mut().find(|(id, _)| id == &winner) {
                            entry.1 += POINTS_PER_WIN;
                        }
                    }
                }

                let mut best: Option<(PlayerId, u16)> = None;
                for &(id, points) in table.iter() {
                    match best {
                        Some((_, best_points)) if points <= best_points => {}
                        _ => best = Some((id, points)),
                    }
                }
                best.map(|(id, _)| id)
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        self.rounds
            .iter()
            .all(|round| round.fixtures.iter().all(|fixture| fixture.is_decided()))
    }
}
