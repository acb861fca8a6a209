//! Error taxonomy for setup and structural misuse.
//!
//! Illegal moves are not errors: they come back as a rejected
//! [`MoveOutcome`](crate::games::jungle::session::MoveOutcome).

use thiserror::Error;

use crate::engine::models::PlayerId;
use crate::games::jungle::types::Position;

#[derive(Debug, Error)]
pub enum GameError {
    /// Invalid dimensions, malformed layout or malformed species table.
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("position {0} is outside the board")]
    OutOfBounds(Position),
    #[error("cell {0} is already occupied")]
    Occupied(Position),
    #[error("no piece at {0}")]
    NoPiece(Position),
    /// A player handle tried to act outside its turn.
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),
    #[error("failed to read layout {path}: {source}")]
    LayoutIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse layout: {0}")]
    LayoutParse(#[from] toml::de::Error),
}

impl GameError {
    pub fn config(msg: impl Into<String>) -> Self {
        GameError::Config(msg.into())
    }
}
