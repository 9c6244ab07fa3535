use crate::{
    app::ClubState,
    engine::game::Match,
    types::{AppResult, MatchId},
};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::{fs::File, path::PathBuf};

pub static PERSISTED_CLUB_FILENAME: &str = "club.json";
pub static PERSISTED_MATCHES_PREFIX: &str = "match_";

fn path_from_prefix(store_prefix: &str) -> String {
    format!("{}_{}", store_prefix, PERSISTED_CLUB_FILENAME)
}

pub fn store_path(filename: &str) -> AppResult<PathBuf> {
    let dirs = directories::ProjectDirs::from("org", "dartclub", "dartclub")
        .ok_or(anyhow!("Failed to get directories"))?;
    let config_dirs = dirs.config_dir();
    if !config_dirs.exists() {
        std::fs::create_dir_all(config_dirs)?;
    }
    let path = config_dirs.join(filename);
    Ok(path)
}

pub fn save_club(club: &ClubState, with_backup: bool, store_prefix: &str) -> AppResult<()> {
    let filename = path_from_prefix(store_prefix);
    save_to_json(&filename, club)?;
    if with_backup {
        let backup_filename = format!("{}.back", filename);
        save_to_json(&backup_filename, club)?;
    }
    Ok(())
}

pub fn load_club(store_prefix: &str) -> AppResult<ClubState> {
    let filename = path_from_prefix(store_prefix);
    load_from_json(&filename)
}

pub fn save_match(game: &Match) -> AppResult<()> {
    save_to_json(
        format!("{}{}.json", PERSISTED_MATCHES_PREFIX, game.id).as_str(),
        &game,
    )?;
    Ok(())
}

pub fn load_match(match_id: MatchId) -> AppResult<Match> {
    load_from_json(format!("{}{}.json", PERSISTED_MATCHES_PREFIX, match_id).as_str())
}

fn save_to_json<T: Serialize>(filename: &str, data: &T) -> AppResult<()> {
    let file = File::create(store_path(filename)?)?;
    let buffer = std::io::BufWriter::new(file);
    serde_json::to_writer(buffer, data)?;
    Ok(())
}

fn load_from_json<T: for<'a> Deserialize<'a>>(filename: &str) -> AppResult<T> {
    let file = File::open(store_path(filename)?)?;
    let data: T = serde_json::from_reader(file)?;
    Ok(data)
}

pub fn reset() -> AppResult<()> {
    let dirs = directories::ProjectDirs::from("org", "dartclub", "dartclub")
        .ok_or(anyhow!("Failed to get directories"))?;
    let config_dirs = dirs.config_dir();
    if config_dirs.exists() {
        std::fs::remove_dir_all(config_dirs)?;
    }
    std::fs::create_dir_all(config_dirs)?;
    Ok(())
}

pub fn club_exists(store_prefix: &str) -> bool {
    let filename = path_from_prefix(store_prefix);
    let path = store_path(&filename);
    path.is_ok() && path.unwrap().exists()
}
