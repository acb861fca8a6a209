//! Session setup. A factory decides board, players, species and rules; the
//! session only plays.

use tracing::debug;

use crate::engine::plugin::GameFactory;
use crate::error::GameError;

use super::board::Board;
use super::layout::Layout;
use super::pieces::SpeciesTable;
use super::rules::{standard_rule_engine, CompositeRule};
use super::session::GameSession;
use super::types::{Piece, PieceId, Player};

pub trait SessionFactory {
    fn game_id(&self) -> &str;

    fn create_board(&self) -> Result<Board, GameError>;

    fn create_species(&self) -> Result<SpeciesTable, GameError>;

    fn create_players(&self) -> Result<Vec<Player>, GameError>;

    /// Create the starting pieces and put them on the board.
    fn populate(&self, board: &mut Board, players: &mut [Player], species: &SpeciesTable) -> Result<(), GameError>;

    fn create_rule_engine(&self) -> CompositeRule {
        standard_rule_engine()
    }
}

/// Builds Jungle sessions from a [`Layout`].
#[derive(Debug, Clone)]
pub struct JungleFactory {
    layout: Layout,
}

impl JungleFactory {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn standard() -> Self {
        Self::new(Layout::standard())
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl SessionFactory for JungleFactory {
    fn game_id(&self) -> &str {
        "jungle"
    }

    fn create_board(&self) -> Result<Board, GameError> {
        self.layout.validate()?;
        self.layout.build_board()
    }

    fn create_species(&self) -> Result<SpeciesTable, GameError> {
        self.layout.species_table()
    }

    fn create_players(&self) -> Result<Vec<Player>, GameError> {
        Ok(self.layout.build_players())
    }

    fn populate(&self, board: &mut Board, players: &mut [Player], species: &SpeciesTable) -> Result<(), GameError> {
        for (i, placement) in self.layout.pieces.iter().enumerate() {
            if !species.contains(placement.species) {
                return Err(GameError::config(format!(
                    "species {} is missing from the species table",
                    placement.species
                )));
            }
            let player = players.get_mut(placement.seat).ok_or_else(|| {
                GameError::config(format!("piece placed for unknown seat {}", placement.seat))
            })?;
            let mut piece = Piece::new(PieceId(i as u32), placement.species, placement.seat);
            board.place_piece(&mut piece, placement.position())?;
            player.pieces.push(piece);
        }
        debug!(pieces = self.layout.pieces.len(), "pieces placed");
        Ok(())
    }
}

impl GameFactory for JungleFactory {
    type Game = GameSession;

    fn game_id(&self) -> &str {
        "jungle"
    }

    fn display_name(&self) -> &str {
        "Jungle"
    }

    fn description(&self) -> &str {
        "Animal chess: eight ranked species per side race for the enemy den across a river."
    }

    fn create_game(&self) -> Result<GameSession, GameError> {
        GameSession::new(self)
    }
}
