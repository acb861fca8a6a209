//! Domain types for Jungle: positions, terrain, species and pieces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::models::{PlayerId, Seat};

/// Orthogonal step offsets, in the order legal-move listing visits them.
pub const ORTHOGONAL_DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Unit step towards `other` when both lie on one row or column.
    pub fn straight_step_to(self, other: Position) -> Option<(i32, i32)> {
        if self == other || (self.x != other.x && self.y != other.y) {
            return None;
        }
        Some(((other.x - self.x).signum(), (other.y - self.y).signum()))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = String;

    /// Parse `"x,y"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .trim()
            .split_once(',')
            .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
        let x = x.trim().parse::<i32>().map_err(|e| format!("bad x in {s:?}: {e}"))?;
        let y = y.trim().parse::<i32>().map_err(|e| format!("bad y in {s:?}: {e}"))?;
        Ok(Position::new(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Normal,
    Water,
    /// Trap guarding `owner`'s den. Enemies standing in it lose their rank.
    Trap { owner: Seat },
    Den { owner: Seat },
}

impl Terrain {
    pub fn is_water(self) -> bool {
        matches!(self, Terrain::Water)
    }

    pub fn den_owner(self) -> Option<Seat> {
        match self {
            Terrain::Den { owner } => Some(owner),
            _ => None,
        }
    }

    pub fn trap_owner(self) -> Option<Seat> {
        match self {
            Terrain::Trap { owner } => Some(owner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Rat,
    Cat,
    Wolf,
    Dog,
    Leopard,
    Tiger,
    Lion,
    Elephant,
}

impl Species {
    pub fn name(self) -> &'static str {
        match self {
            Species::Rat => "rat",
            Species::Cat => "cat",
            Species::Wolf => "wolf",
            Species::Dog => "dog",
            Species::Leopard => "leopard",
            Species::Tiger => "tiger",
            Species::Lion => "lion",
            Species::Elephant => "elephant",
        }
    }

    /// Single-letter tag used by text renderers.
    pub fn symbol(self) -> char {
        match self {
            Species::Rat => 'r',
            Species::Cat => 'c',
            Species::Wolf => 'w',
            Species::Dog => 'd',
            Species::Leopard => 'p',
            Species::Tiger => 't',
            Species::Lion => 'l',
            Species::Elephant => 'e',
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

/// What a cell knows about the piece standing on it. The piece itself lives in
/// its owner's piece list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occupant {
    pub piece: PieceId,
    pub species: Species,
    pub owner: Seat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub species: Species,
    pub owner: Seat,
    /// Recorded on first placement and never changed afterwards.
    pub initial_position: Option<Position>,
    pub position: Option<Position>,
}

impl Piece {
    pub fn new(id: PieceId, species: Species, owner: Seat) -> Self {
        Self {
            id,
            species,
            owner,
            initial_position: None,
            position: None,
        }
    }

    pub fn occupant(&self) -> Occupant {
        Occupant {
            piece: self.id,
            species: self.species,
            owner: self.owner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub display_name: String,
    pub seat_index: Seat,
    #[serde(default)]
    pub pieces: Vec<Piece>,
}

impl Player {
    pub fn new(player_id: impl Into<PlayerId>, display_name: impl Into<String>, seat_index: Seat) -> Self {
        Self {
            player_id: player_id.into(),
            display_name: display_name.into(),
            seat_index,
            pieces: Vec::new(),
        }
    }

    pub fn has_pieces(&self) -> bool {
        !self.pieces.is_empty()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    /// Remove a piece, returning it together with its list index so it can be
    /// reinserted in place.
    pub fn remove_piece(&mut self, id: PieceId) -> Option<(usize, Piece)> {
        let index = self.pieces.iter().position(|p| p.id == id)?;
        Some((index, self.pieces.remove(index)))
    }

    pub fn restore_piece(&mut self, index: usize, piece: Piece) {
        let index = index.min(self.pieces.len());
        self.pieces.insert(index, piece);
    }
}
