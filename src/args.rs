use crate::engine::{
    bracket::{ByePlacement, SeedingMode, TournamentFormat},
    cricket::CricketThrow,
    types::{CheckoutMode, GameMode},
};
use crate::types::{AppResult, MatchId, TournamentId};
use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(name="dartclub", about = "Match scoring and tournaments for a darts club", author, version, long_about = None)]
pub struct AppArgs {
    #[clap(long, short='r', action=ArgAction::SetTrue, help = "Reset all save files")]
    pub reset_store: bool,
    #[clap(long, action=ArgAction::Set, help = "Set store prefix")]
    store_prefix: Option<String>,
    #[clap(subcommand)]
    pub command: ClubCommand,
}

impl AppArgs {
    pub fn store_prefix(&self) -> &str {
        if let Some(prefix) = self.store_prefix.as_ref() {
            prefix
        } else {
            "local"
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ClubCommand {
    /// Register a player by name
    AddPlayer { name: String },
    /// Create a match between registered players
    NewMatch {
        #[clap(long, value_delimiter = ',', help = "Comma-separated player names")]
        players: Vec<String>,
        #[clap(long, default_value = "501", help = "301, 501, cricket or bulloff")]
        mode: String,
        #[clap(long, default_value = "double", help = "single, double or master")]
        checkout: String,
        #[clap(long, default_value_t = 3)]
        legs: u16,
        #[clap(long, default_value_t = 1)]
        sets: u16,
    },
    /// Register a three-dart X01 turn for the active player
    Turn {
        match_id: MatchId,
        points: u16,
        #[clap(default_value_t = 1, help = "Multiplier of the final dart")]
        multiplier: u8,
    },
    /// Register a cricket turn, e.g. 20x3,19x1,25x2
    CricketTurn { match_id: MatchId, darts: String },
    /// Decide a bull-off by naming the winner
    BullOff { match_id: MatchId, winner: String },
    /// Print the match scoreboard
    ShowMatch { match_id: MatchId },
    /// Create a tournament for registered players
    NewTournament {
        name: String,
        #[clap(long, value_delimiter = ',', help = "Comma-separated player names")]
        players: Vec<String>,
        #[clap(long, default_value = "elimination", help = "elimination or roundrobin")]
        format: String,
        #[clap(long, default_value = "round1", help = "round1, distributed or playin")]
        byes: String,
        #[clap(long, default_value = "entry", help = "entry or random")]
        seeding: String,
        #[clap(long, value_delimiter = ',', help = "Game mode per round")]
        modes: Vec<String>,
    },
    /// Create and link a match for a start-ready fixture
    StartFixture {
        tournament_id: TournamentId,
        round: u16,
        fixture: usize,
    },
    /// Record a fixture winner by name
    RecordResult {
        tournament_id: TournamentId,
        round: u16,
        fixture: usize,
        winner: String,
        #[clap(long, help = "Optional result label, e.g. 3:1")]
        label: Option<String>,
    },
    /// Change the game mode of a round
    SetRoundMode {
        tournament_id: TournamentId,
        round: u16,
        mode: String,
    },
    /// Print rounds, fixtures and champion
    ShowTournament { tournament_id: TournamentId },
    /// Print the club rating table
    Ratings,
}

pub fn parse_game_mode(value: &str) -> AppResult<GameMode> {
    match value.to_lowercase().as_str() {
        "301" | "x01_301" => Ok(GameMode::X01_301),
        "501" | "x01_501" => Ok(GameMode::X01_501),
        "cricket" => Ok(GameMode::Cricket),
        "bulloff" | "bull-off" => Ok(GameMode::BullOff),
        _ => Err(anyhow!("Unknown game mode '{value}'.")),
    }
}

pub fn parse_checkout_mode(value: &str) -> AppResult<CheckoutMode> {
    match value.to_lowercase().as_str() {
        "single" | "single_out" => Ok(CheckoutMode::SingleOut),
        "double" | "double_out" => Ok(CheckoutMode::DoubleOut),
        "master" | "master_out" => Ok(CheckoutMode::MasterOut),
        _ => Err(anyhow!("Unknown checkout mode '{value}'.")),
    }
}

pub fn parse_tournament_format(value: &str) -> AppResult<TournamentFormat> {
    match value.to_lowercase().as_str() {
        "elimination" | "single_elimination" => Ok(TournamentFormat::SingleElimination),
        "roundrobin" | "round_robin" => Ok(TournamentFormat::RoundRobin),
        _ => Err(anyhow!("Unknown tournament format '{value}'.")),
    }
}

pub fn parse_bye_placement(value: &str) -> AppResult<ByePlacement> {
    match value.to_lowercase().as_str() {
        "round1" => Ok(ByePlacement::Round1),
        "distributed" => Ok(ByePlacement::Distributed),
        "playin" | "play-in" => Ok(ByePlacement::PlayIn),
        _ => Err(anyhow!("Unknown bye placement '{value}'.")),
    }
}

pub fn parse_seeding_mode(value: &str) -> AppResult<SeedingMode> {
    match value.to_lowercase().as_str() {
        "entry" | "entry_order" => Ok(SeedingMode::EntryOrder),
        "random" => Ok(SeedingMode::Random),
        _ => Err(anyhow!("Unknown seeding mode '{value}'.")),
    }
}

/// Parses a turn like `20x3,19x1,25x2` into cricket throws.
pub fn parse_cricket_darts(value: &str) -> AppResult<Vec<CricketThrow>> {
    value
        .split(',')
        .map(|dart| {
            let (target, multiplier) = dart
                .trim()
                .split_once(['x', 'X'])
                .ok_or_else(|| anyhow!("Cannot parse dart '{dart}', expected TARGETxMULTIPLIER."))?;
            let target = target.parse::<u8>()?;
            let multiplier = multiplier.parse::<u8>()?;
            if !(1..=3).contains(&multiplier) {
                return Err(anyhow!("Multiplier must be 1, 2 or 3."));
            }
            Ok(CricketThrow::new(target, multiplier))
        })
        .collect()
}
