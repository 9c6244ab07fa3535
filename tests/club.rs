#[cfg(test)]
mod tests {
    use dartclub::app::App;
    use dartclub::engine::cricket::CricketThrow;
    use dartclub::engine::{
        CheckoutMode, GameMode, Slot, TournamentFormat, TournamentSettings,
    };
    use dartclub::types::{AppResult, PlayerId};

    fn app_with_players(store_prefix: &str, names: &[&str]) -> AppResult<(App, Vec<PlayerId>)> {
        let mut app = App::new(store_prefix.to_string());
        let mut ids = vec![];
        for name in names {
            ids.push(app.ensure_player(name)?);
        }
        Ok((app, ids))
    }

    #[test]
    fn test_x01_match_to_checkout_updates_ratings() -> AppResult<()> {
        let (mut app, ids) = app_with_players("itest_x01", &["Anna", "Bruno"])?;
        let match_id = app.new_match(&ids, GameMode::X01_501, CheckoutMode::DoubleOut, 3, 2)?;

        // Anna throws 140, 140, 140, 41; Bruno stays on 501 throwing 26s.
        for _ in 0..3 {
            assert!(app.register_turn(match_id, 140, 1)?.is_empty());
            assert!(app.register_turn(match_id, 26, 1)?.is_empty());
        }

        // 81 left: a failed single finish first, then tops for the leg.
        assert!(app.register_turn(match_id, 81, 1)?.is_empty());
        assert!(app.register_turn(match_id, 26, 1)?.is_empty());
        let events = app.register_turn(match_id, 81, 2)?;
        assert_eq!(events.len(), 1);

        let summary = app.match_summary(&match_id)?;
        assert_eq!(summary.winner, Some(ids[0]));
        let anna = &summary.players[0];
        assert_eq!(anna.score, 0);
        assert_eq!(anna.checkout_percentage, 100.0);
        assert_eq!(anna.highest_turn_score, 140);

        assert_eq!(app.club.ratings.rating(&ids[0]), 1216);
        assert_eq!(app.club.ratings.rating(&ids[1]), 1184);

        // Replayed turns on a decided match change nothing.
        assert!(app.register_turn(match_id, 60, 1)?.is_empty());
        assert_eq!(app.club.ratings.rating(&ids[0]), 1216);
        Ok(())
    }

    #[test]
    fn test_cricket_match_through_app() -> AppResult<()> {
        let (mut app, ids) = app_with_players("itest_cricket", &["Anna", "Bruno"])?;
        let match_id = app.new_match(&ids, GameMode::Cricket, CheckoutMode::SingleOut, 1, 1)?;

        // Anna closes the board over three visits; Bruno scores on 20 to
        // force her to out-point him before the close counts.
        app.register_cricket_turn(
            match_id,
            &[
                CricketThrow::new(15, 3),
                CricketThrow::new(16, 3),
                CricketThrow::new(17, 3),
            ],
        )?;
        app.register_cricket_turn(
            match_id,
            &[CricketThrow::new(20, 3), CricketThrow::new(20, 3)],
        )?;
        app.register_cricket_turn(
            match_id,
            &[
                CricketThrow::new(18, 3),
                CricketThrow::new(19, 3),
                CricketThrow::new(20, 3),
            ],
        )?;
        // Bruno's extra 20s are dead now that Anna has the number closed.
        app.register_cricket_turn(match_id, &[CricketThrow::new(20, 3)])?;

        // Anna: 20 already closed by both sides, so these score nothing,
        // but the bull finishes the board. She still trails 0 to 60.
        app.register_cricket_turn(
            match_id,
            &[
                CricketThrow::new(25, 2),
                CricketThrow::new(25, 1),
                CricketThrow::new(20, 3),
            ],
        )?;
        let summary = app.match_summary(&match_id)?;
        assert_eq!(summary.winner, None);

        app.register_cricket_turn(match_id, &[CricketThrow::new(5, 1)])?;
        // Bruno still has 19 open, so a treble there draws Anna level, and
        // with the whole board closed the leg ends at once.
        let events =
            app.register_cricket_turn(match_id, &[CricketThrow::new(19, 3)])?;
        assert_eq!(events.len(), 1);
        let summary = app.match_summary(&match_id)?;
        assert_eq!(summary.winner, Some(ids[0]));
        Ok(())
    }

    #[test]
    fn test_five_player_bracket_to_champion() -> AppResult<()> {
        let (mut app, ids) =
            app_with_players("itest_cup", &["Anna", "Bruno", "Carla", "Dario", "Enzo"])?;
        let tournament_id = app.create_tournament(
            "Club Cup".to_string(),
            TournamentFormat::SingleElimination,
            TournamentSettings::default(),
            &ids,
            &[],
        )?;

        {
            let tournament = app.get_tournament(&tournament_id)?;
            assert_eq!(tournament.rounds.len(), 3);
            assert_eq!(tournament.rounds[0].fixtures.len(), 4);
            let bye_fixtures = tournament.rounds[0]
                .fixtures
                .iter()
                .filter(|f| f.home.is_bye() || f.away.is_bye())
                .count();
            assert_eq!(bye_fixtures, 3);
            // Byes are already resolved and labelled at creation.
            assert!(tournament.rounds[0]
                .fixtures
                .iter()
                .filter(|f| f.home.is_bye() || f.away.is_bye())
                .all(|f| f.result_label.as_deref() == Some("Freilos")));
        }

        // Decide the one real round-1 fixture, then walk the bracket down.
        let pending = |app: &App| -> Vec<(u16, usize, PlayerId)> {
            let tournament = app.get_tournament(&tournament_id).unwrap();
            tournament
                .rounds
                .iter()
                .flat_map(|round| {
                    round.fixtures.iter().enumerate().filter_map(move |(i, f)| {
                        match (f.winner, &f.home, &f.away) {
                            (None, Slot::Player(home), Slot::Player(_)) => {
                                Some((round.number, i, *home))
                            }
                            _ => None,
                        }
                    })
                })
                .collect()
        };

        let mut guard = 0;
        while !app.get_tournament(&tournament_id)?.is_completed() {
            let open = pending(&app);
            assert!(!open.is_empty());
            for (round, fixture, home) in open {
                app.record_fixture_winner(tournament_id, round, fixture, home, Some("2:0"))?;
            }
            guard += 1;
            assert!(guard < 10);
        }

        let summary = app.tournament_summary(&tournament_id)?;
        assert!(summary.is_completed);
        assert!(summary.champion.is_some());
        assert!(ids.contains(&summary.champion.unwrap()));
        Ok(())
    }

    #[test]
    fn test_round_robin_schedule_and_champion() -> AppResult<()> {
        let (mut app, ids) =
            app_with_players("itest_league", &["Anna", "Bruno", "Carla", "Dario"])?;
        let tournament_id = app.create_tournament(
            "Winter League".to_string(),
            TournamentFormat::RoundRobin,
            TournamentSettings::default(),
            &ids,
            &[GameMode::Cricket],
        )?;

        let fixtures = {
            let tournament = app.get_tournament(&tournament_id)?;
            assert_eq!(tournament.rounds.len(), 1);
            assert_eq!(tournament.rounds[0].mode, GameMode::Cricket);
            tournament.rounds[0].fixtures.clone()
        };
        assert_eq!(fixtures.len(), 6);
        assert!(fixtures.iter().all(|f| f.home.player().is_some()));

        // Anna wins all her games, the rest go to the home side.
        for (index, fixture) in fixtures.iter().enumerate() {
            let winner = if fixture.home.player() == Some(ids[0])
                || fixture.away.player() == Some(ids[0])
            {
                ids[0]
            } else {
                fixture.home.player().unwrap()
            };
            app.record_fixture_winner(tournament_id, 1, index, winner, None)?;
        }

        let summary = app.tournament_summary(&tournament_id)?;
        assert!(summary.is_completed);
        assert_eq!(summary.champion, Some(ids[0]));
        Ok(())
    }

    #[test]
    fn test_store_round_trip() -> AppResult<()> {
        let prefix = "itest_store";
        let (mut app, ids) = app_with_players(prefix, &["Anna", "Bruno"])?;
        let match_id = app.new_match(&ids, GameMode::X01_301, CheckoutMode::SingleOut, 1, 1)?;
        app.register_turn(match_id, 180, 1)?;
        app.save()?;

        let reloaded = App::load_or_new(prefix.to_string());
        assert_eq!(reloaded.club.players.len(), 2);
        let game = reloaded.get_match(&match_id)?;
        assert_eq!(game.players[0].score, 121);
        assert_eq!(game.active_player_index, 1);
        Ok(())
    }
}
