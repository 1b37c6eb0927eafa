//! Tests for saving and restoring games.

use std::time::{Duration, Instant};
use strictly_manhunt::{
    Board, BoardDescription, Control, Detective, EngineState, GameConfig, GameEngine,
    HeadlessView, MisterX, Player, SaveState, Seat, StationDescription, Ticket, TicketWallet,
    Transport,
};

/// A ring of eight stations linked by cab, with a tube shortcut 1 -tube- 5.
fn ring() -> Board {
    let mut desc = BoardDescription::new(
        (1..=8)
            .map(|id| StationDescription::new(id, f64::from(id) / 10.0, 0.5))
            .collect(),
    );
    for id in 1..=8 {
        desc.connect(Transport::Cab, id, id % 8 + 1);
    }
    desc.connect(Transport::Tube, 1, 5);
    Board::from_description(&desc).expect("valid ring")
}

fn config() -> GameConfig {
    GameConfig::default()
        .with_thinking_delay(Duration::ZERO)
        .with_detective_counts(vec![2])
        .with_rounds(24, vec![2, 5])
}

fn running_engine() -> GameEngine<HeadlessView> {
    let mut board = ring();
    let mister_x = MisterX::new(
        &board,
        1,
        Control::Ai,
        TicketWallet::new(10, 8, 4, 2),
        config().reveal_rounds().clone(),
    )
    .expect("free start");
    let first = Detective::new(1, &mut board, 4, Control::Ai, TicketWallet::new(10, 8, 4, 0))
        .expect("free start");
    let second = Detective::new(2, &mut board, 7, Control::Ai, TicketWallet::new(10, 8, 4, 0))
        .expect("free start");
    GameEngine::with_players(board, config(), HeadlessView, mister_x, vec![first, second])
        .expect("consistent players")
}

fn save_json() -> serde_json::Value {
    serde_json::json!({
        "misterX": {
            "ai": true,
            "possibleTargets": null,
            "lastShownPos": 3,
            "currPos": 4,
            "remainingTickets": [4, 7, 9, 2],
            "journeyBoard": [0, 0, 1]
        },
        "detectives": {
            "noOfDetectives": 2,
            "ai": true,
            "players": [
                { "position": 6, "remainingTickets": [4, 8, 9] },
                { "position": 8, "remainingTickets": [3, 8, 10] }
            ]
        },
        "whosTurn": 2,
        "currRoundNo": 3,
        "gameIsWon": false
    })
}

#[test]
fn test_snapshot_round_trip_after_some_turns() {
    let mut engine = running_engine();
    engine.start().expect("start");
    let now = Instant::now();
    for _ in 0..8 {
        engine.step(now).expect("step");
    }

    let saved = engine.snapshot();
    let json = saved.to_json().expect("serializable");
    let loaded = SaveState::from_json(&json).expect("parseable");
    assert_eq!(loaded, saved);

    let restored =
        GameEngine::restore(ring(), config(), HeadlessView, &loaded).expect("valid save");
    assert_eq!(restored.snapshot(), saved);
    assert_eq!(restored.mister_x().station(), engine.mister_x().station());
    assert_eq!(
        restored.mister_x().sightings().entries(),
        engine.mister_x().sightings().entries()
    );
    assert_eq!(restored.round(), engine.round());
    assert_eq!(restored.state(), EngineState::Stopped);
    for detective in restored.detectives() {
        assert!(restored.board().is_occupied(detective.station()));
    }
}

#[test]
fn test_save_format_field_names_and_ticket_order() {
    let engine = running_engine();
    let value: serde_json::Value =
        serde_json::from_str(&engine.snapshot().to_json().expect("serializable"))
            .expect("valid json");

    assert_eq!(value["whosTurn"], 0);
    assert_eq!(value["currRoundNo"], 0);
    assert_eq!(value["misterX"]["currPos"], 1);
    assert_eq!(value["misterX"]["lastShownPos"], 0);
    assert!(value["misterX"]["possibleTargets"].is_null());
    // tube, bus, cab, black
    assert_eq!(value["misterX"]["remainingTickets"], serde_json::json!([4, 8, 10, 2]));
    assert_eq!(value["detectives"]["noOfDetectives"], 2);
    assert_eq!(
        value["detectives"]["players"][1],
        serde_json::json!({ "position": 7, "remainingTickets": [4, 8, 10] })
    );
}

#[test]
fn test_restore_from_saved_document() {
    let save = SaveState::from_json(&save_json().to_string()).expect("parseable");
    let engine = GameEngine::restore(ring(), config(), HeadlessView, &save).expect("valid save");

    let mister_x = engine.mister_x();
    assert_eq!(mister_x.station(), 4);
    assert_eq!(mister_x.last_seen(), Some(3));
    assert_eq!(mister_x.ticket_count(Ticket::Tube), 4);
    assert_eq!(mister_x.ticket_count(Ticket::Cab), 9);
    assert_eq!(mister_x.ticket_count(Ticket::Black), 2);
    assert_eq!(
        mister_x.sightings().entries(),
        &[Ticket::Cab, Ticket::Cab, Ticket::Bus]
    );
    assert_eq!(mister_x.sightings().tickets_since_reveal(), &[Ticket::Bus]);

    let detectives = engine.detectives();
    assert_eq!(detectives[0].station(), 6);
    assert_eq!(detectives[1].ticket_count(Ticket::Tube), 3);
    assert_eq!(detectives[1].ticket_count(Ticket::Cab), 10);

    // whosTurn is 1-based
    assert_eq!(engine.active_index(), Some(1));
    assert_eq!(engine.active_seat(), Some(Seat::Detective(0)));
    assert_eq!(engine.round(), 3);
}

#[test]
fn test_restored_game_resumes_saved_seat() {
    let save = SaveState::from_json(&save_json().to_string()).expect("parseable");
    let mut engine =
        GameEngine::restore(ring(), config(), HeadlessView, &save).expect("valid save");
    engine.start().expect("start");
    let now = Instant::now();
    engine.step(now).expect("step");
    assert_eq!(engine.active_seat(), Some(Seat::Detective(0)));
    assert!(matches!(engine.state(), EngineState::AiPlaying { .. }));
    assert_eq!(engine.round(), 3);

    engine.step(now).expect("step");
    assert_ne!(engine.detectives()[0].station(), 6);
    engine.step(now).expect("step");
    assert_eq!(engine.active_seat(), Some(Seat::Detective(1)));
}

#[test]
fn test_snapshot_between_turns_names_next_seat() {
    let mut engine = running_engine();
    engine.start().expect("start");
    let now = Instant::now();
    // MisterX is handed the turn, moves, and the turn is open again
    engine.step(now).expect("step");
    engine.step(now).expect("step");
    assert_eq!(engine.state(), EngineState::NextTurn);
    assert_eq!(engine.active_seat(), Some(Seat::MisterX));

    let value: serde_json::Value =
        serde_json::from_str(&engine.snapshot().to_json().expect("serializable"))
            .expect("valid json");
    assert_eq!(value["whosTurn"], 2);
    assert_eq!(value["currRoundNo"], 1);
}

fn restore_with(edit: impl FnOnce(&mut serde_json::Value)) -> bool {
    let mut value = save_json();
    edit(&mut value);
    let Ok(save) = serde_json::from_value::<SaveState>(value) else {
        return false;
    };
    GameEngine::restore(ring(), config(), HeadlessView, &save).is_ok()
}

#[test]
fn test_restore_rejects_negative_tickets() {
    assert!(!restore_with(|v| v["misterX"]["remainingTickets"][0] = (-1).into()));
    assert!(!restore_with(|v| v["detectives"]["players"][0]["remainingTickets"][2] = (-3).into()));
}

#[test]
fn test_restore_rejects_disallowed_party_size() {
    assert!(!restore_with(|v| v["detectives"]["noOfDetectives"] = 3.into()));
    assert!(!restore_with(|v| v["detectives"]["noOfDetectives"] = (-2).into()));
}

#[test]
fn test_restore_rejects_unknown_references() {
    assert!(!restore_with(|v| v["misterX"]["journeyBoard"][1] = 7.into()));
    assert!(!restore_with(|v| v["misterX"]["currPos"] = 42.into()));
    assert!(!restore_with(|v| v["detectives"]["players"][1]["position"] = 6.into()));
    assert!(!restore_with(|v| v["whosTurn"] = 9.into()));
}

#[test]
fn test_restore_rejects_reveal_inconsistent_with_log() {
    // Three logged moves passed the reveal at two
    assert!(!restore_with(|v| v["misterX"]["lastShownPos"] = 0.into()));
    // One logged move is before any reveal
    assert!(!restore_with(|v| v["misterX"]["journeyBoard"] = serde_json::json!([0])));
}

#[test]
fn test_restore_accepts_unmodified_document() {
    assert!(restore_with(|_| {}));
}

#[test]
fn test_restore_rejects_malformed_json() {
    assert!(SaveState::from_json("{ \"misterX\": 1 }").is_err());
}
