//! Tests for the turn state machine, win detection and human input.

use std::collections::BTreeSet;
use std::io;
use std::time::{Duration, Instant};
use strictly_manhunt::{
    Board, BoardDescription, Control, Detective, EngineError, EngineState, GameConfig,
    GameEngine, GameSetup, GameView, HeadlessView, HumanTurnOutcome, Ledger, MisterX, Move,
    Player, Seat, StationDescription, StationId, TacticId, Ticket, TicketWallet, Transport,
    WinState, check_winner,
};

/// Everything the engine told the view.
#[derive(Debug, Clone, PartialEq)]
enum Event {
    Unreachable(Option<StationId>),
    Insufficient(StationId),
    Chose(BTreeSet<Ticket>),
    Winner(WinState),
    Logbook(u32, Ticket),
    LedgerError,
}

#[derive(Debug, Default)]
struct RecordingView {
    events: Vec<Event>,
    choice: Option<Ticket>,
}

impl GameView for RecordingView {
    fn draw_players(
        &mut self,
        _mister_x: &MisterX,
        _detectives: &[Detective],
        _active: Seat,
        _last_seen: Option<StationId>,
    ) {
    }

    fn show_player_state(&mut self, _seat: Seat, _player: &dyn Player) {}

    fn choose_ticket(&mut self, _station: StationId, tickets: &BTreeSet<Ticket>) -> Option<Ticket> {
        self.events.push(Event::Chose(tickets.clone()));
        self.choice
    }

    fn show_unreachable(&mut self, station: Option<StationId>) {
        self.events.push(Event::Unreachable(station));
    }

    fn show_insufficient_tickets(&mut self, station: StationId) {
        self.events.push(Event::Insufficient(station));
    }

    fn show_winner(&mut self, state: WinState) {
        self.events.push(Event::Winner(state));
    }

    fn set_logbook_entry(&mut self, round: u32, ticket: Ticket) {
        self.events.push(Event::Logbook(round, ticket));
    }

    fn show_ledger_error(&mut self, _error: &io::Error) {
        self.events.push(Event::LedgerError);
    }
}

struct FailingLedger;

impl Ledger for FailingLedger {
    fn record_new_game(
        &mut self,
        _mister_x: &MisterX,
        _detectives: &[Detective],
    ) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }

    fn record_move(
        &mut self,
        _player: &dyn Player,
        _from: StationId,
        _tactic: TacticId,
        _ranking: f32,
    ) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }

    fn record_end(&mut self, _state: WinState) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}

fn network(count: u32, edges: &[(Transport, StationId, StationId)]) -> Board {
    let mut desc = BoardDescription::new(
        (1..=count)
            .map(|id| StationDescription::new(id, f64::from(id) / 10.0, 0.5))
            .collect(),
    );
    for &(transport, a, b) in edges {
        desc.connect(transport, a, b);
    }
    Board::from_description(&desc).expect("valid board")
}

fn quick_config() -> GameConfig {
    GameConfig::default()
        .with_thinking_delay(Duration::ZERO)
        .with_detective_counts(vec![1, 2])
}

/// 1 -cab/bus- 2, 1 -cab- 3, 3 -tube- 4, 1 -tube- 6, 5 -cab- 6.
fn human_board() -> Board {
    network(
        6,
        &[
            (Transport::Cab, 1, 2),
            (Transport::Bus, 1, 2),
            (Transport::Cab, 1, 3),
            (Transport::Tube, 3, 4),
            (Transport::Tube, 1, 6),
            (Transport::Cab, 5, 6),
        ],
    )
}

/// MisterX is human at 1; the detective is an AI on a separate pair.
fn human_mister_x_engine() -> GameEngine<RecordingView> {
    let mut board = human_board();
    let mister_x = MisterX::new(
        &board,
        1,
        Control::Human,
        TicketWallet::new(1, 1, 0, 0),
        vec![3],
    )
    .expect("free start");
    let detective = Detective::new(1, &mut board, 5, Control::Ai, TicketWallet::new(3, 0, 0, 0))
        .expect("free start");
    GameEngine::with_players(
        board,
        quick_config(),
        RecordingView::default(),
        mister_x,
        vec![detective],
    )
    .expect("consistent players")
}

#[test]
fn test_capture_outranks_surrounded() {
    // MisterX at 1 can only go to 2, which a second detective holds
    let mut board = network(3, &[(Transport::Cab, 1, 2), (Transport::Cab, 2, 3)]);
    let mister_x = MisterX::new(&board, 1, Control::Ai, TicketWallet::new(5, 0, 0, 0), vec![3])
        .expect("free start");
    let catcher = Detective::new(1, &mut board, 1, Control::Ai, TicketWallet::new(5, 0, 0, 0))
        .expect("free start");
    let blocker = Detective::new(2, &mut board, 2, Control::Ai, TicketWallet::new(5, 0, 0, 0))
        .expect("free start");

    let detectives = [catcher, blocker];
    assert!(mister_x.reachable_stations(&board).is_empty());
    assert_eq!(
        check_winner(&board, &mister_x, &detectives, 1, 24),
        WinState::MisterXCaught
    );
}

#[test]
fn test_capture_outranks_surrounded_on_isolated_pair() {
    // Only A -cab- B exists; MisterX holds no cab ticket and shares A with a detective
    let mut board = network(4, &[(Transport::Cab, 1, 2)]);
    let mister_x = MisterX::new(&board, 1, Control::Ai, TicketWallet::new(0, 3, 0, 0), vec![3])
        .expect("free start");
    let detective = Detective::new(1, &mut board, 1, Control::Ai, TicketWallet::new(5, 0, 0, 0))
        .expect("free start");
    let detectives = [detective];

    assert!(mister_x.reachable_stations(&board).is_empty());
    let result = check_winner(&board, &mister_x, &detectives, 1, 24);
    assert_eq!(result, WinState::MisterXCaught);
    assert!(result.detectives_win());
}

#[test]
fn test_surrounded_when_no_held_ticket_leads_anywhere() {
    let mut board = network(3, &[(Transport::Cab, 1, 2), (Transport::Cab, 2, 3)]);
    let mister_x = MisterX::new(&board, 1, Control::Ai, TicketWallet::new(0, 4, 0, 0), vec![3])
        .expect("free start");
    let detective = Detective::new(1, &mut board, 3, Control::Ai, TicketWallet::new(5, 0, 0, 0))
        .expect("free start");

    let result = check_winner(&board, &mister_x, std::slice::from_ref(&detective), 1, 24);
    assert_eq!(result, WinState::MisterXSurrounded);
    assert!(result.detectives_win());
}

#[test]
fn test_exhausted_detectives_and_round_limit() {
    let mut board = network(3, &[(Transport::Cab, 1, 2), (Transport::Cab, 2, 3)]);
    let mister_x = MisterX::new(&board, 1, Control::Ai, TicketWallet::new(5, 0, 0, 0), vec![3])
        .expect("free start");
    let broke = Detective::new(1, &mut board, 3, Control::Ai, TicketWallet::empty())
        .expect("free start");
    let detectives = [broke];

    assert_eq!(
        check_winner(&board, &mister_x, &detectives, 1, 24),
        WinState::DetectivesBlocked
    );

    let mut board = network(3, &[(Transport::Cab, 1, 2), (Transport::Cab, 2, 3)]);
    let mister_x = MisterX::new(&board, 1, Control::Ai, TicketWallet::new(5, 0, 0, 0), vec![3])
        .expect("free start");
    let detective = Detective::new(1, &mut board, 3, Control::Ai, TicketWallet::new(1, 0, 0, 0))
        .expect("free start");
    let detectives = [detective];
    assert_eq!(check_winner(&board, &mister_x, &detectives, 22, 24), WinState::NoWin);
    assert_eq!(
        check_winner(&board, &mister_x, &detectives, 23, 24),
        WinState::MisterXEscaped
    );
}

#[test]
fn test_start_twice_fails() {
    let mut engine = human_mister_x_engine();
    engine.start().expect("first start");
    assert!(matches!(engine.start(), Err(EngineError::AlreadyStarted)));
}

#[test]
fn test_human_turn_outcomes() {
    let mut engine = human_mister_x_engine();
    assert!(matches!(
        engine.submit_station(2),
        Err(EngineError::NotHumanTurn)
    ));

    engine.start().expect("start");
    engine.step(Instant::now()).expect("step");
    assert_eq!(engine.state(), EngineState::HumanPlaying);
    assert_eq!(engine.active_seat(), Some(Seat::MisterX));
    assert_eq!(engine.round(), 1);

    assert_eq!(
        engine.submit_station(4).expect("answered"),
        HumanTurnOutcome::Unreachable
    );
    assert_eq!(
        engine.submit_station(6).expect("answered"),
        HumanTurnOutcome::InsufficientTickets
    );
    // Cab and bus both lead to 2; the view cancels the choice
    assert_eq!(
        engine.submit_station(2).expect("answered"),
        HumanTurnOutcome::Cancelled
    );
    assert_eq!(engine.state(), EngineState::HumanPlaying);
    assert_eq!(engine.mister_x().station(), 1);

    engine.view_mut().choice = Some(Ticket::Bus);
    assert_eq!(
        engine.submit_station(2).expect("answered"),
        HumanTurnOutcome::Moved(Move::new(2, Ticket::Bus))
    );
    assert_eq!(engine.state(), EngineState::NextTurn);
    assert_eq!(engine.mister_x().station(), 2);
    assert_eq!(engine.mister_x().ticket_count(Ticket::Bus), 0);

    assert_eq!(
        engine.view().events,
        vec![
            Event::Unreachable(Some(4)),
            Event::Insufficient(6),
            Event::Chose(BTreeSet::from([Ticket::Cab, Ticket::Bus])),
            Event::Chose(BTreeSet::from([Ticket::Cab, Ticket::Bus])),
            Event::Logbook(1, Ticket::Bus),
        ]
    );
}

#[test]
fn test_detective_ticket_goes_to_mister_x() {
    let mut engine = human_mister_x_engine();
    engine.start().expect("start");
    let now = Instant::now();
    engine.step(now).expect("step");
    engine.view_mut().choice = Some(Ticket::Cab);
    engine.submit_station(2).expect("answered");

    // Hand over to the AI detective, then let it move
    engine.step(now).expect("step");
    assert!(matches!(engine.state(), EngineState::AiPlaying { .. }));
    assert_eq!(engine.active_seat(), Some(Seat::Detective(0)));
    engine.step(now).expect("step");

    let detective = &engine.detectives()[0];
    assert_eq!(detective.station(), 6);
    assert_eq!(detective.ticket_count(Ticket::Cab), 2);
    // One cab spent by MisterX, one received from the detective
    assert_eq!(engine.mister_x().ticket_count(Ticket::Cab), 1);
    assert!(engine.board().is_occupied(6));
    assert!(!engine.board().is_occupied(5));

    // Back to MisterX for round two
    engine.step(now).expect("step");
    assert_eq!(engine.active_seat(), Some(Seat::MisterX));
    assert_eq!(engine.round(), 2);
}

#[test]
fn test_restored_human_turn_is_still_pending() {
    let mut engine = human_mister_x_engine();
    engine.start().expect("start");
    engine.step(Instant::now()).expect("step");
    assert_eq!(engine.state(), EngineState::HumanPlaying);

    let save = engine.snapshot();
    let mut restored =
        GameEngine::restore(human_board(), quick_config(), RecordingView::default(), &save)
            .expect("valid save");
    restored.start().expect("start");
    restored.step(Instant::now()).expect("step");

    assert_eq!(restored.active_seat(), Some(Seat::MisterX));
    assert_eq!(restored.state(), EngineState::HumanPlaying);
    assert_eq!(restored.round(), 1);

    restored.view_mut().choice = Some(Ticket::Cab);
    assert_eq!(
        restored.submit_station(2).expect("answered"),
        HumanTurnOutcome::Moved(Move::new(2, Ticket::Cab))
    );
    assert_eq!(
        restored.view().events,
        vec![
            Event::Chose(BTreeSet::from([Ticket::Cab, Ticket::Bus])),
            Event::Logbook(1, Ticket::Cab),
        ]
    );
}

#[test]
fn test_save_between_turns_hands_on_after_restore() {
    let mut engine = human_mister_x_engine();
    engine.start().expect("start");
    let now = Instant::now();
    engine.step(now).expect("step");
    engine.view_mut().choice = Some(Ticket::Cab);
    engine.submit_station(2).expect("answered");
    assert_eq!(engine.state(), EngineState::NextTurn);

    // MisterX has moved, so the detective is next
    let save = engine.snapshot();
    let mut restored =
        GameEngine::restore(human_board(), quick_config(), RecordingView::default(), &save)
            .expect("valid save");
    restored.start().expect("start");
    restored.step(now).expect("step");
    assert_eq!(restored.active_seat(), Some(Seat::Detective(0)));
    assert_eq!(restored.round(), 1);

    restored.step(now).expect("step");
    assert_eq!(restored.detectives()[0].station(), 6);
    assert_eq!(restored.mister_x().station(), 2);

    // Back to MisterX for round two, exactly once
    restored.step(now).expect("step");
    assert_eq!(restored.active_seat(), Some(Seat::MisterX));
    assert_eq!(restored.round(), 2);
}

#[test]
fn test_ai_waits_for_thinking_delay() {
    let mut board = network(4, &[(Transport::Cab, 1, 2), (Transport::Cab, 3, 4)]);
    let mister_x = MisterX::new(&board, 1, Control::Ai, TicketWallet::new(5, 0, 0, 0), vec![3])
        .expect("free start");
    let detective = Detective::new(1, &mut board, 3, Control::Ai, TicketWallet::new(5, 0, 0, 0))
        .expect("free start");
    let config = quick_config().with_thinking_delay(Duration::from_millis(500));
    let mut engine = GameEngine::with_players(
        board,
        config,
        RecordingView::default(),
        mister_x,
        vec![detective],
    )
    .expect("consistent players");

    let start = Instant::now();
    engine.start().expect("start");
    engine.step(start).expect("step");
    assert!(matches!(engine.state(), EngineState::AiPlaying { .. }));

    engine.step(start + Duration::from_millis(100)).expect("step");
    assert_eq!(engine.mister_x().station(), 1);

    engine.step(start + Duration::from_millis(500)).expect("step");
    assert_eq!(engine.mister_x().station(), 2);
    assert_eq!(engine.state(), EngineState::NextTurn);
    assert_eq!(engine.view().events, vec![Event::Logbook(1, Ticket::Cab)]);
}

#[test]
fn test_ai_game_runs_to_escape() {
    // Two separate pairs: nobody can ever catch anybody
    let mut board = network(4, &[(Transport::Cab, 1, 2), (Transport::Cab, 3, 4)]);
    let mister_x = MisterX::new(&board, 1, Control::Ai, TicketWallet::new(9, 0, 0, 0), vec![1])
        .expect("free start");
    let detective = Detective::new(1, &mut board, 3, Control::Ai, TicketWallet::new(9, 0, 0, 0))
        .expect("free start");
    let config = quick_config().with_rounds(3, vec![1]);
    let mut engine = GameEngine::with_players(
        board,
        config,
        RecordingView::default(),
        mister_x,
        vec![detective],
    )
    .expect("consistent players");

    engine.start().expect("start");
    let now = Instant::now();
    for _ in 0..100 {
        if engine.state() == EngineState::Stopped {
            break;
        }
        engine.step(now).expect("step");
    }

    assert_eq!(engine.state(), EngineState::Stopped);
    assert_eq!(engine.is_game_won(), WinState::MisterXEscaped);
    assert_eq!(engine.round(), 2);
    assert_eq!(engine.mister_x().sightings().len(), 2);
    assert_eq!(engine.mister_x().last_seen(), Some(2));
    assert_eq!(
        engine.view().events.last(),
        Some(&Event::Winner(WinState::MisterXEscaped))
    );
}

#[test]
fn test_ledger_failure_does_not_stop_game() {
    let mut engine = human_mister_x_engine().with_ledger(FailingLedger);
    engine.start().expect("start despite ledger");
    assert_eq!(engine.state(), EngineState::NextTurn);
    assert_eq!(engine.view().events, vec![Event::LedgerError]);

    engine.step(Instant::now()).expect("step");
    engine.view_mut().choice = Some(Ticket::Cab);
    let outcome = engine.submit_station(2).expect("answered");
    assert!(matches!(outcome, HumanTurnOutcome::Moved(_)));
    assert_eq!(engine.view().events.last(), Some(&Event::LedgerError));
}

#[test]
fn test_stop_releases_stations_and_start_restores_them() {
    let mut engine = human_mister_x_engine();
    engine.start().expect("start");
    engine.stop();
    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(!engine.board().is_occupied(5));

    engine.start().expect("restart");
    assert!(engine.board().is_occupied(5));
}

#[test]
fn test_inconsistent_players_rejected() {
    let mut board = network(3, &[(Transport::Cab, 1, 2)]);
    let detective = Detective::new(1, &mut board, 2, Control::Ai, TicketWallet::new(1, 0, 0, 0))
        .expect("free start");
    let mister_x = MisterX::new(&board, 1, Control::Ai, TicketWallet::new(1, 0, 0, 0), vec![3])
        .expect("free start");
    // Occupancy no longer matches the detective
    board.release(2).expect("known station");

    let result = GameEngine::with_players(
        board,
        quick_config(),
        HeadlessView,
        mister_x,
        vec![detective],
    );
    assert!(result.is_err());
}

#[test]
fn test_new_game_is_reproducible_for_a_seed() {
    use rand::SeedableRng;

    let network = network(
        6,
        &[
            (Transport::Cab, 1, 2),
            (Transport::Cab, 2, 3),
            (Transport::Cab, 3, 4),
            (Transport::Cab, 4, 5),
            (Transport::Cab, 5, 6),
        ],
    );
    let config = quick_config().with_start_positions(vec![1, 2, 3, 4, 5, 6]);
    let setup = GameSetup::new(2, Control::Ai, Control::Ai);

    let place = |seed: u64| {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        let engine =
            GameEngine::new_game(network.clone(), config.clone(), HeadlessView, setup, &mut rng)
                .expect("valid setup");
        let stations: Vec<StationId> = std::iter::once(engine.mister_x().station())
            .chain(engine.detectives().iter().map(|d| d.station()))
            .collect();
        stations
    };

    let first = place(42);
    assert_eq!(first, place(42));
    let distinct: BTreeSet<_> = first.iter().collect();
    assert_eq!(distinct.len(), 3);
}

#[test]
fn test_new_game_rejects_disallowed_party_size() {
    let mut rng = rand::thread_rng();
    let network = network(6, &[(Transport::Cab, 1, 2)]);
    let config = quick_config().with_start_positions(vec![1, 2, 3, 4, 5, 6]);
    let setup = GameSetup::new(4, Control::Ai, Control::Ai);
    let result = GameEngine::new_game(network, config, HeadlessView, setup, &mut rng);
    assert!(result.is_err());
}
