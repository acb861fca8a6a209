//! Per-player access to a session. A host gives each actor a handle bound to
//! one player id; moves, undo and passes through it are refused outside that
//! player's turn.

use tracing::debug;

use crate::engine::models::PlayerId;
use crate::error::GameError;

use super::board::Board;
use super::session::{GameSession, MoveOutcome};
use super::types::Position;

pub struct PlayerHandle<'a> {
    session: &'a mut GameSession,
    player: PlayerId,
}

impl<'a> PlayerHandle<'a> {
    /// Bind `player` to `session`. The id must belong to a seated player.
    pub fn new(session: &'a mut GameSession, player: impl Into<PlayerId>) -> Result<Self, GameError> {
        let player = player.into();
        if !session.players().iter().any(|p| p.player_id == player) {
            return Err(GameError::config(format!("no player {player:?} in this session")));
        }
        Ok(Self { session, player })
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn is_my_turn(&self) -> bool {
        *self.session.current_player() == self.player
    }

    fn check_turn(&self) -> Result<(), GameError> {
        if self.is_my_turn() {
            return Ok(());
        }
        debug!(player = %self.player, to_move = %self.session.current_player(), "access refused");
        Err(GameError::NotYourTurn(self.player.clone()))
    }

    pub fn request_move(&mut self, from: Position, to: Position) -> Result<MoveOutcome, GameError> {
        self.check_turn()?;
        self.session.request_move(from, to)
    }

    pub fn undo(&mut self) -> Result<bool, GameError> {
        self.check_turn()?;
        Ok(self.session.undo())
    }

    pub fn pass_turn(&mut self) -> Result<(), GameError> {
        self.check_turn()?;
        self.session.pass_turn();
        Ok(())
    }

    pub fn board(&self) -> &Board {
        self.session.board()
    }

    pub fn current_player(&self) -> &PlayerId {
        self.session.current_player()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::jungle::JungleFactory;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_handle_acts_on_own_turn() {
        let mut session = GameSession::new(&JungleFactory::standard()).unwrap();
        {
            let mut p1 = PlayerHandle::new(&mut session, "p1").unwrap();
            assert!(p1.is_my_turn());
            let outcome = p1.request_move(pos(0, 2), pos(0, 3)).unwrap();
            assert!(outcome.accepted);
            assert_eq!(p1.current_player(), "p2");
            assert_eq!(p1.board().width(), 7);
        }
        let mut p2 = PlayerHandle::new(&mut session, "p2").unwrap();
        p2.pass_turn().unwrap();
        assert_eq!(p2.current_player(), "p1");
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_handle_refuses_off_turn_actions() {
        let mut session = GameSession::new(&JungleFactory::standard()).unwrap();
        let before = session.snapshot();
        {
            let mut p2 = PlayerHandle::new(&mut session, "p2").unwrap();
            assert!(!p2.is_my_turn());
            assert!(matches!(
                p2.request_move(pos(6, 6), pos(6, 5)),
                Err(GameError::NotYourTurn(ref id)) if id == "p2"
            ));
            assert!(matches!(p2.pass_turn(), Err(GameError::NotYourTurn(_))));
            assert!(matches!(p2.undo(), Err(GameError::NotYourTurn(_))));
        }
        assert_eq!(session.snapshot(), before);
        assert!(session.history().is_empty());

        session.request_move(pos(0, 2), pos(0, 3)).unwrap();
        let mut p1 = PlayerHandle::new(&mut session, "p1").unwrap();
        assert!(matches!(p1.undo(), Err(GameError::NotYourTurn(_))));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_handle_needs_a_seated_player() {
        let mut session = GameSession::new(&JungleFactory::standard()).unwrap();
        assert!(matches!(
            PlayerHandle::new(&mut session, "stranger"),
            Err(GameError::Config(_))
        ));
    }
}
