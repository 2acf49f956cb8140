// End-to-end: run an auction, write it to disk, load it into a fresh session

use auction_ledger::{
    export_file, import_file, AuctionConfig, AuctionError, AuctionSession, Command, OperatorAuth,
    Outcome, PlayerId, Sport, Team, DEFAULT_PASSWORD,
};
use std::sync::{Arc, Mutex};

fn logged_in(players: Vec<auction_ledger::Player>) -> AuctionSession {
    let mut session = AuctionSession::new(players, AuctionConfig::default(), OperatorAuth::default());
    session.login(DEFAULT_PASSWORD).unwrap();
    session
}

#[test]
fn test_auction_survives_export_and_reload() {
    let mut session = logged_in(auction_ledger::seed_players());

    session
        .apply(Command::AssignCaptain {
            player_id: PlayerId(1),
            team: Team::AlfenRoyals,
            sport: Sport::Cricket,
            price: 200,
        })
        .unwrap();
    session
        .apply(Command::Sell {
            player_id: PlayerId(3),
            team: Team::TalukaFighters,
            bid: 150,
        })
        .unwrap();
    session
        .apply(Command::Sell {
            player_id: PlayerId(5),
            team: Team::AlfenRoyals,
            bid: 40,
        })
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auction_data.csv");
    export_file(&path, session.players()).unwrap();

    let reloaded = logged_in(import_file(&path).unwrap());
    assert_eq!(reloaded.players(), session.players());
    assert!(reloaded.is_consistent());

    let royals = reloaded.stats_for(Team::AlfenRoyals);
    assert_eq!(royals.count, 2);
    assert_eq!(royals.spent, 240);
    assert_eq!(reloaded.dashboard().total_sold, 3);

    let captain = reloaded.player(PlayerId(1)).unwrap();
    assert_eq!(captain.captain_for, Some(Sport::Cricket));
}

#[test]
fn test_logged_out_operator_cannot_mutate() {
    let mut session = logged_in(auction_ledger::seed_players());
    session.logout();

    let err = session
        .apply(Command::Sell {
            player_id: PlayerId(2),
            team: Team::LanternLegends,
            bid: 50,
        })
        .unwrap_err();
    assert!(matches!(err, AuctionError::NotAuthenticated));
    assert!(session.players().iter().all(|p| !p.is_sold()));

    // export is read-only and stays open
    assert!(matches!(session.apply(Command::Export), Ok(Outcome::Exported { .. })));
}

#[test]
fn test_imported_table_replaces_roster_through_a_command() {
    let mut session = logged_in(auction_ledger::seed_players());
    let csv = "Name,Cricket,Badminton,TT\nRohit S,A,0,0\nSaina N,0,A,B\n";

    let outcome = session.apply(Command::Import { csv: csv.to_string() }).unwrap();
    assert!(matches!(outcome, Outcome::Imported { count: 2 }));
    assert_eq!(session.players().len(), 2);
    assert_eq!(session.unsold_players("saina").len(), 1);
}

#[test]
fn test_shared_session_serializes_competing_sales() {
    let config = AuctionConfig::new(100, 3, 10).unwrap();
    let mut session = AuctionSession::new(auction_ledger::seed_players(), config, OperatorAuth::default());
    session.login(DEFAULT_PASSWORD).unwrap();
    let session = Arc::new(Mutex::new(session));

    // max bid starts at 80; after one sale it drops to 10
    let handles: Vec<_> = [PlayerId(2), PlayerId(4)]
        .into_iter()
        .map(|player_id| {
            let session = Arc::clone(&session);
            std::thread::spawn(move || {
                session.lock().unwrap().apply(Command::Sell {
                    player_id,
                    team: Team::PrimarkSuperkings,
                    bid: 80,
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(AuctionError::InsufficientFunds { .. })))
        .count();
    assert_eq!((accepted, rejected), (1, 1));

    let session = session.lock().unwrap();
    assert_eq!(session.stats_for(Team::PrimarkSuperkings).spent, 80);
}
