use crate::engine::{game::Match, tournament::Tournament};
use chrono::{prelude::DateTime, Datelike, Local, Timelike};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

// A Tick represents a unit of time in the club world.
// It corresponds to a millisecond in the real world.
pub type Tick = u64;

pub const SECONDS: Tick = 1000;
pub const MINUTES: Tick = 60 * SECONDS;
pub const HOURS: Tick = 60 * MINUTES;

pub type PlayerId = uuid::Uuid;
pub type MatchId = uuid::Uuid;
pub type TournamentId = uuid::Uuid;

pub type AppResult<T> = Result<T, anyhow::Error>;

pub type MatchMap = HashMap<MatchId, Match>;
pub type TournamentMap = HashMap<TournamentId, Tournament>;

pub trait SystemTimeTick {
    fn now() -> Self;
    fn from_system_time(time: SystemTime) -> Self;
    fn as_system_time(&self) -> SystemTime;
    fn formatted_as_time(&self) -> String;
    fn formatted_as_date(&self) -> String;
}

impl SystemTimeTick for Tick {
    fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    fn from_system_time(time: SystemTime) -> Tick {
        time.duration_since(UNIX_EPOCH)
            .expect("Invalid system time")
            .as_millis() as Tick
    }

    fn as_system_time(&self) -> SystemTime {
        UNIX_EPOCH + std::time::Duration::from_millis(*self)
    }

    fn formatted_as_date(&self) -> String {
        let dt: DateTime<Local> = self.as_system_time().into();
        format!("{}/{}/{}", dt.day(), dt.month(), dt.year())
    }

    fn formatted_as_time(&self) -> String {
        let dt: DateTime<Local> = self.as_system_time().into();
        format!("{:02}:{:02}:{:02}", dt.hour(), dt.minute(), dt.second())
    }
}
