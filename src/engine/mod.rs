pub mod bracket;
pub mod cricket;
pub mod game;
pub mod tournament;
pub mod types;

pub use bracket::{ByePlacement, SeedingMode, Slot, TournamentFormat, TournamentSettings};
pub use cricket::{CricketBoard, CricketThrow};
pub use game::{Match, MatchSummary};
pub use tournament::{Tournament, TournamentSummary};
pub use types::{CheckoutMode, GameMode, MatchEvent};
