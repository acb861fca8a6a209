//! End-to-end session scenarios on the standard board terrain.
//!
//! Run with:
//!     cargo test --test session_scenarios

use jungle_game_engine::engine::models::Seat;
use jungle_game_engine::error::GameError;
use jungle_game_engine::games::jungle::layout::Layout;
use jungle_game_engine::games::jungle::session::WinReason;
use jungle_game_engine::games::jungle::types::{Position, Species, Terrain};
use jungle_game_engine::games::jungle::{GameSession, GameStatus, JungleFactory};

fn pos(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

/// Standard terrain with only the given pieces on it.
fn session_with(pieces: &[(Species, Seat, (i32, i32))]) -> GameSession {
    let mut layout = Layout::standard();
    layout.pieces.clear();
    for &(species, seat, (x, y)) in pieces {
        layout.add_piece(species, seat, pos(x, y));
    }
    GameSession::new(&JungleFactory::new(layout)).unwrap()
}

#[test]
fn rat_enters_bank_water_but_dog_does_not() {
    let mut layout = Layout::standard();
    layout.set_terrain(pos(0, 3), Terrain::Water);

    let mut session = GameSession::new(&JungleFactory::new(layout.clone())).unwrap();
    let outcome = session.request_move(pos(0, 2), pos(0, 3)).unwrap();
    assert!(outcome.accepted);
    assert_eq!(session.piece_at(pos(0, 3)).unwrap().unwrap().species, Species::Rat);

    layout.remove_piece(pos(0, 2));
    layout.add_piece(Species::Dog, 0, pos(0, 2));
    let mut session = GameSession::new(&JungleFactory::new(layout)).unwrap();
    let before = session.snapshot();
    let outcome = session.request_move(pos(0, 2), pos(0, 3)).unwrap();
    assert!(!outcome.accepted);
    assert_eq!(outcome.rejection.as_deref(), Some("adjacent_or_leap_movement"));
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.current_seat(), 0);
}

#[test]
fn entering_enemy_den_wins() {
    let mut session = session_with(&[(Species::Cat, 0, (3, 7)), (Species::Rat, 1, (0, 8))]);
    let outcome = session.request_move(pos(3, 7), pos(3, 8)).unwrap();
    assert!(outcome.accepted);
    assert!(outcome.game_over);
    assert_eq!(outcome.winner.as_deref(), Some("p1"));
    assert_eq!(
        session.status(),
        GameStatus::GameOver { winner: 0, reason: WinReason::DenReached }
    );
    assert!(outcome.events.iter().any(|e| e.event_type == "game_over"));

    let outcome = session.request_move(pos(0, 8), pos(0, 7)).unwrap();
    assert!(!outcome.accepted);
    assert_eq!(outcome.rejection.as_deref(), Some("game_over"));
}

#[test]
fn undoing_den_win_reopens_game() {
    let mut session = session_with(&[(Species::Cat, 0, (3, 7)), (Species::Rat, 1, (0, 8))]);
    let before = session.snapshot();
    assert!(session.request_move(pos(3, 7), pos(3, 8)).unwrap().game_over);

    assert!(session.undo());
    assert_eq!(session.status(), GameStatus::InProgress);
    assert_eq!(session.winner(), None);
    assert_eq!(session.current_seat(), 0);
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.piece_at(pos(3, 7)).unwrap().map(|p| p.species), Some(Species::Cat));
    assert!(session.piece_at(pos(3, 8)).unwrap().is_none());

    // Playable again from the restored position.
    assert!(session.request_move(pos(3, 7), pos(2, 7)).unwrap().accepted);
}

#[test]
fn entering_own_den_is_rejected() {
    let mut session = session_with(&[(Species::Cat, 0, (3, 1)), (Species::Rat, 1, (0, 8))]);
    let outcome = session.request_move(pos(3, 1), pos(3, 0)).unwrap();
    assert!(!outcome.accepted);
    assert!(!session.is_over());
    assert!(session.history().is_empty());
}

#[test]
fn lion_leaps_empty_river_and_is_blocked_by_rat() {
    let mut session = session_with(&[(Species::Lion, 0, (1, 2)), (Species::Dog, 1, (6, 8))]);
    assert!(session.request_move(pos(1, 2), pos(1, 6)).unwrap().accepted);

    let mut session = session_with(&[(Species::Tiger, 0, (0, 4)), (Species::Dog, 1, (6, 8))]);
    assert!(session.request_move(pos(0, 4), pos(3, 4)).unwrap().accepted);

    let mut session = session_with(&[(Species::Lion, 0, (1, 2)), (Species::Rat, 1, (1, 4))]);
    let outcome = session.request_move(pos(1, 2), pos(1, 6)).unwrap();
    assert!(!outcome.accepted);
    assert_eq!(outcome.rejection.as_deref(), Some("adjacent_or_leap_movement"));
}

#[test]
fn leap_onto_enemy_follows_rank() {
    let mut session = session_with(&[(Species::Lion, 0, (1, 2)), (Species::Tiger, 1, (1, 6))]);
    let outcome = session.request_move(pos(1, 2), pos(1, 6)).unwrap();
    assert!(outcome.accepted);
    assert_eq!(outcome.captured.map(|p| p.species), Some(Species::Tiger));
}

#[test]
fn rat_captures_elephant_on_land() {
    let mut session = session_with(&[
        (Species::Rat, 0, (0, 2)),
        (Species::Elephant, 1, (0, 3)),
        (Species::Cat, 1, (6, 8)),
    ]);
    let outcome = session.request_move(pos(0, 2), pos(0, 3)).unwrap();
    assert!(outcome.accepted);
    assert_eq!(outcome.captured.as_ref().map(|p| p.species), Some(Species::Elephant));
    assert!(!outcome.game_over);
    assert_eq!(session.players()[1].pieces.len(), 1);
}

#[test]
fn elephant_cannot_take_rat_in_water() {
    let mut session = session_with(&[(Species::Elephant, 0, (0, 4)), (Species::Rat, 1, (1, 4))]);
    let outcome = session.request_move(pos(0, 4), pos(1, 4)).unwrap();
    assert!(!outcome.accepted);
}

#[test]
fn rat_cannot_capture_across_the_water_line() {
    let mut session = session_with(&[(Species::Rat, 0, (1, 3)), (Species::Elephant, 1, (0, 3))]);
    let outcome = session.request_move(pos(1, 3), pos(0, 3)).unwrap();
    assert_eq!(outcome.rejection.as_deref(), Some("special_capture_exceptions"));
}

#[test]
fn rats_fight_inside_the_river() {
    let mut session = session_with(&[
        (Species::Rat, 0, (1, 3)),
        (Species::Rat, 1, (2, 3)),
        (Species::Cat, 1, (6, 8)),
    ]);
    let outcome = session.request_move(pos(1, 3), pos(2, 3)).unwrap();
    assert!(outcome.accepted);
    assert_eq!(outcome.captured.map(|p| p.species), Some(Species::Rat));
}

#[test]
fn trapped_enemy_loses_rank() {
    let mut session = session_with(&[(Species::Cat, 0, (2, 1)), (Species::Elephant, 1, (3, 1))]);
    let outcome = session.request_move(pos(2, 1), pos(3, 1)).unwrap();
    assert!(outcome.accepted);
    assert!(outcome.game_over);
    assert_eq!(
        session.status(),
        GameStatus::GameOver { winner: 0, reason: WinReason::NoPiecesLeft }
    );
}

#[test]
fn structural_errors_are_errors() {
    let mut session = GameSession::new(&JungleFactory::standard()).unwrap();
    assert!(matches!(
        session.request_move(pos(3, 3), pos(3, 2)),
        Err(GameError::NoPiece(p)) if p == pos(3, 3)
    ));
    assert!(matches!(
        session.request_move(pos(-1, 0), pos(0, 0)),
        Err(GameError::OutOfBounds(_))
    ));
    // Off-board destination is just an illegal move.
    let outcome = session.request_move(pos(0, 0), pos(-1, 0)).unwrap();
    assert!(!outcome.accepted);
}

#[test]
fn capture_then_undo_restores_everything() {
    let mut session = session_with(&[
        (Species::Lion, 0, (0, 0)),
        (Species::Cat, 1, (0, 1)),
        (Species::Dog, 1, (5, 8)),
        (Species::Wolf, 1, (6, 8)),
    ]);
    let before = session.snapshot();
    let outcome = session.request_move(pos(0, 0), pos(0, 1)).unwrap();
    assert!(outcome.accepted);
    assert_eq!(session.current_seat(), 1);

    assert!(session.undo());
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.players()[1].pieces[0].species, Species::Cat);
    assert_eq!(session.current_seat(), 0);
}

#[test]
fn events_and_snapshot_serialize() {
    let mut session = GameSession::new(&JungleFactory::standard()).unwrap();
    session.take_events();
    session.request_move(pos(0, 2), pos(0, 3)).unwrap();
    session.pass_turn();
    let kinds: Vec<String> = session.take_events().into_iter().map(|e| e.event_type).collect();
    assert_eq!(kinds, vec!["move_made", "turn_passed"]);

    let json = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(json["current_seat"], 0);
    assert_eq!(json["status"]["state"], "in_progress");
    assert_eq!(json["players"][0]["pieces"].as_array().map(|a| a.len()), Some(8));

    let history = serde_json::to_value(session.history()).unwrap();
    assert_eq!(history[0]["entry"], "move");
    assert_eq!(history[1]["entry"], "pass");
}
