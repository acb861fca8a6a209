//! Traits every game exposes to the generic simulator and playout runner.

use crate::engine::models::{PlayerId, Seat};
use crate::error::GameError;

/// A turn-based game that can be stepped forwards and backwards in place.
///
/// The playout harness only needs this much; it never inspects game-specific
/// state.
pub trait TurnBasedGame: Send {
    type Move: Clone + Send;
    /// Comparable copy of the mutable state, used to check undo.
    type Snapshot: PartialEq;

    fn game_id(&self) -> &str;

    fn num_players(&self) -> usize;

    fn current_seat(&self) -> Seat;

    fn player_id(&self, seat: Seat) -> Option<&PlayerId>;

    /// Candidate moves for the seat to act. May be an approximation of the
    /// full legal set.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Play a move. `Ok(false)` means the game refused it without changing
    /// state.
    fn play(&mut self, mv: &Self::Move) -> Result<bool, GameError>;

    fn pass(&mut self);

    fn undo(&mut self) -> bool;

    fn is_over(&self) -> bool;

    fn winner(&self) -> Option<Seat>;

    fn snapshot(&self) -> Self::Snapshot;

    /// Pieces still in play, summed over all seats.
    fn material(&self) -> usize;
}

/// Builds fresh game instances, e.g. from a layout.
pub trait GameFactory: Send + Sync {
    type Game: TurnBasedGame;

    fn game_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn description(&self) -> &str;

    fn create_game(&self) -> Result<Self::Game, GameError>;
}
