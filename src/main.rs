use clap::Parser;
use dartclub::app::App;
use dartclub::args::{
    parse_bye_placement, parse_checkout_mode, parse_cricket_darts, parse_game_mode,
    parse_seeding_mode, parse_tournament_format, AppArgs, ClubCommand,
};
use dartclub::engine::bracket::Slot;
use dartclub::engine::TournamentSettings;
use dartclub::store::store_path;
use dartclub::types::{AppResult, PlayerId};
use anyhow::anyhow;
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

fn main() -> AppResult<()> {
    let logfile_path = store_path("dartclub.log")?;
    let logfile = FileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build(logfile_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(LevelFilter::Info))?;

    log4rs::init_config(config)?;
    let args = AppArgs::parse();

    if args.reset_store {
        dartclub::store::reset()?;
    }

    let mut app = App::load_or_new(args.store_prefix().to_string());
    run_command(&mut app, args.command)?;
    app.save()?;
    Ok(())
}

fn player_ids_by_name(app: &mut App, names: &[String]) -> AppResult<Vec<PlayerId>> {
    names.iter().map(|name| app.player_by_name(name)).collect()
}

fn slot_label(app: &App, slot: &Slot) -> String {
    match slot {
        Slot::Tbd => "TBD".to_string(),
        Slot::Bye => "BYE".to_string(),
        Slot::Player(id) => app.player_name(id),
    }
}

fn print_match(app: &App, match_id: dartclub::types::MatchId) -> AppResult<()> {
    let summary = app.match_summary(&match_id)?;
    println!("{} match {}", summary.mode, summary.id);
    for player in summary.players.iter() {
        let marker = if Some(player.player_id) == summary.active_player_id {
            ">"
        } else {
            " "
        };
        println!(
            "{} {:<16} {:>4}  avg {:>6.2}  checkout {:>5.1}%  high {:>3}  legs {}  sets {}",
            marker,
            player.display_name,
            player.score,
            player.three_dart_average,
            player.checkout_percentage,
            player.highest_turn_score,
            player.legs_won,
            player.sets_won,
        );
    }
    if let Some(winner) = summary.winner {
        println!("Winner: {}", app.player_name(&winner));
    }
    Ok(())
}

fn print_tournament(app: &App, tournament_id: dartclub::types::TournamentId) -> AppResult<()> {
    let tournament = app.get_tournament(&tournament_id)?;
    println!("{} ({})", tournament.name, tournament.format);
    for round in tournament.rounds.iter() {
        println!("Round {} [{}]", round.number, round.mode);
        for (index, fixture) in round.fixtures.iter().enumerate() {
            let result = match fixture.winner {
                Some(winner) => format!(
                    " -> {}{}",
                    app.player_name(&winner),
                    fixture
                        .result_label
                        .as_ref()
                        .map(|label| format!(" ({label})"))
                        .unwrap_or_default()
                ),
                None => String::new(),
            };
            println!(
                "  {}: {} vs {}{}",
                index,
                slot_label(app, &fixture.home),
                slot_label(app, &fixture.away),
                result
            );
        }
    }
    let summary = app.tournament_summary(&tournament_id)?;
    match summary.champion {
        Some(champion) => println!("Champion: {}", app.player_name(&champion)),
        None if summary.is_completed => println!("Completed, no champion could be resolved."),
        None => println!("Still in progress."),
    }
    Ok(())
}

fn run_command(app: &mut App, command: ClubCommand) -> AppResult<()> {
    match command {
        ClubCommand::AddPlayer { name } => {
            let id = app.ensure_player(&name)?;
            println!("{name}: {id}");
        }
        ClubCommand::NewMatch {
            players,
            mode,
            checkout,
            legs,
            sets,
        } => {
            let player_ids = player_ids_by_name(app, &players)?;
            let match_id = app.new_match(
                &player_ids,
                parse_game_mode(&mode)?,
                parse_checkout_mode(&checkout)?,
                legs,
                sets,
            )?;
            println!("Match: {match_id}");
        }
        ClubCommand::Turn {
            match_id,
            points,
            multiplier,
        } => {
            if points > 180 {
                return Err(anyhow!("A three-dart turn scores at most 180."));
            }
            if !(1..=3).contains(&multiplier) {
                return Err(anyhow!("Multiplier must be 1, 2 or 3."));
            }
            app.register_turn(match_id, points, multiplier)?;
            print_match(app, match_id)?;
        }
        ClubCommand::CricketTurn { match_id, darts } => {
            let throws = parse_cricket_darts(&darts)?;
            app.register_cricket_turn(match_id, &throws)?;
            print_match(app, match_id)?;
        }
        ClubCommand::BullOff { match_id, winner } => {
            let winner_id = app.player_by_name(&winner)?;
            app.resolve_bull_off(match_id, winner_id)?;
            print_match(app, match_id)?;
        }
        ClubCommand::ShowMatch { match_id } => {
            print_match(app, match_id)?;
        }
        ClubCommand::NewTournament {
            name,
            players,
            format,
            byes,
            seeding,
            modes,
        } => {
            let player_ids = player_ids_by_name(app, &players)?;
            let round_modes = modes
                .iter()
                .map(|mode| parse_game_mode(mode))
                .collect::<AppResult<Vec<_>>>()?;
            let settings = TournamentSettings {
                bye_placement: parse_bye_placement(&byes)?,
                seeding_mode: parse_seeding_mode(&seeding)?,
                ..TournamentSettings::default()
            };
            let tournament_id = app.create_tournament(
                name,
                parse_tournament_format(&format)?,
                settings,
                &player_ids,
                &round_modes,
            )?;
            println!("Tournament: {tournament_id}");
            print_tournament(app, tournament_id)?;
        }
        ClubCommand::StartFixture {
            tournament_id,
            round,
            fixture,
        } => {
            let match_id = app.start_fixture_match(tournament_id, round, fixture)?;
            println!("Match: {match_id}");
        }
        ClubCommand::RecordResult {
            tournament_id,
            round,
            fixture,
            winner,
            label,
        } => {
            let winner_id = app.player_by_name(&winner)?;
            app.record_fixture_winner(tournament_id, round, fixture, winner_id, label.as_deref())?;
            print_tournament(app, tournament_id)?;
        }
        ClubCommand::SetRoundMode {
            tournament_id,
            round,
            mode,
        } => {
            app.set_round_mode(tournament_id, round, parse_game_mode(&mode)?)?;
            print_tournament(app, tournament_id)?;
        }
        ClubCommand::ShowTournament { tournament_id } => {
            print_tournament(app, tournament_id)?;
        }
        ClubCommand::Ratings => {
            for (name, rating, record) in app.ratings_table() {
                println!("{:<16} {:>5}  {}W {}L", name, rating, record.wins, record.losses);
            }
        }
    }
    Ok(())
}
