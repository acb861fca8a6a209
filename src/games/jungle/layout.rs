//! Board layouts: dimensions, terrain, players and starting pieces.
//!
//! Layouts are plain TOML so variants can be tried without recompiling. The
//! built-in [`Layout::standard`] is the classic 7×9 Jungle board.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::models::Seat;
use crate::error::GameError;

use super::board::{check_dimensions, Board};
use super::pieces::{SpeciesSpec, SpeciesTable};
use super::types::{Player, Position, Species, Terrain};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    Normal,
    Water,
    Trap,
    Den,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainPatch {
    pub x: i32,
    pub y: i32,
    pub kind: TerrainKind,
    /// Seat guarded by a trap or owning a den.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Seat>,
}

impl TerrainPatch {
    pub fn new(pos: Position, terrain: Terrain) -> Self {
        let (kind, owner) = match terrain {
            Terrain::Normal => (TerrainKind::Normal, None),
            Terrain::Water => (TerrainKind::Water, None),
            Terrain::Trap { owner } => (TerrainKind::Trap, Some(owner)),
            Terrain::Den { owner } => (TerrainKind::Den, Some(owner)),
        };
        Self {
            x: pos.x,
            y: pos.y,
            kind,
            owner,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn terrain(&self) -> Result<Terrain, GameError> {
        let owner = || {
            self.owner.ok_or_else(|| {
                GameError::config(format!("{:?} at {} needs an owner", self.kind, self.position()))
            })
        };
        Ok(match self.kind {
            TerrainKind::Normal => Terrain::Normal,
            TerrainKind::Water => Terrain::Water,
            TerrainKind::Trap => Terrain::Trap { owner: owner()? },
            TerrainKind::Den => Terrain::Den { owner: owner()? },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiecePlacement {
    pub species: Species,
    pub seat: Seat,
    pub x: i32,
    pub y: i32,
}

impl PiecePlacement {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub players: Vec<PlayerSpec>,
    #[serde(default)]
    pub terrain: Vec<TerrainPatch>,
    #[serde(default)]
    pub pieces: Vec<PiecePlacement>,
    /// Custom species table. The standard one is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<Vec<SpeciesSpec>>,
}

impl Layout {
    /// Two players, all-normal terrain, no pieces.
    pub fn empty(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            players: vec![
                PlayerSpec {
                    id: "p1".to_string(),
                    name: "Player 1".to_string(),
                },
                PlayerSpec {
                    id: "p2".to_string(),
                    name: "Player 2".to_string(),
                },
            ],
            terrain: Vec::new(),
            pieces: Vec::new(),
            species: None,
        }
    }

    pub fn standard() -> Self {
        let mut layout = Layout::empty(7, 9);

        for x in [1, 2, 4, 5] {
            for y in 3..=5 {
                layout.set_terrain(Position::new(x, y), Terrain::Water);
            }
        }
        for (seat, den_y, trap_row, trap_inner) in [(0, 0, 0, 1), (1, 8, 8, 7)] {
            layout.set_terrain(Position::new(3, den_y), Terrain::Den { owner: seat });
            layout.set_terrain(Position::new(2, trap_row), Terrain::Trap { owner: seat });
            layout.set_terrain(Position::new(4, trap_row), Terrain::Trap { owner: seat });
            layout.set_terrain(Position::new(3, trap_inner), Terrain::Trap { owner: seat });
        }

        let home = [
            (Species::Lion, 0, 0),
            (Species::Tiger, 6, 0),
            (Species::Dog, 1, 1),
            (Species::Cat, 5, 1),
            (Species::Rat, 0, 2),
            (Species::Leopard, 2, 2),
            (Species::Wolf, 4, 2),
            (Species::Elephant, 6, 2),
        ];
        for (species, x, y) in home {
            layout.add_piece(species, 0, Position::new(x, y));
        }
        // Seat 1 mirrors seat 0 through the board centre.
        for (species, x, y) in home {
            layout.add_piece(species, 1, Position::new(6 - x, 8 - y));
        }
        layout
    }

    /// Set the terrain of one cell, replacing any earlier patch for it.
    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) {
        self.terrain.retain(|t| t.position() != pos);
        self.terrain.push(TerrainPatch::new(pos, terrain));
    }

    pub fn add_piece(&mut self, species: Species, seat: Seat, pos: Position) {
        self.pieces.push(PiecePlacement {
            species,
            seat,
            x: pos.x,
            y: pos.y,
        });
    }

    /// Drop the piece placed on `pos`, if any.
    pub fn remove_piece(&mut self, pos: Position) {
        self.pieces.retain(|p| p.position() != pos);
    }

    pub fn from_toml_str(content: &str) -> Result<Self, GameError> {
        let layout: Layout = toml::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn to_toml_string(&self) -> Result<String, GameError> {
        toml::to_string(self).map_err(|e| GameError::config(format!("cannot serialize layout: {e}")))
    }

    pub fn species_table(&self) -> Result<SpeciesTable, GameError> {
        match &self.species {
            Some(specs) => SpeciesTable::new(specs.clone()),
            None => Ok(SpeciesTable::standard().clone()),
        }
    }

    /// Structural checks that do not need a board. Overlapping pieces are
    /// reported later, at placement time.
    pub fn validate(&self) -> Result<(), GameError> {
        check_dimensions(self.width, self.height)?;
        if self.players.len() < 2 {
            return Err(GameError::config(format!(
                "layout needs at least two players, got {}",
                self.players.len()
            )));
        }
        let mut ids = HashSet::new();
        for p in &self.players {
            if !ids.insert(p.id.as_str()) {
                return Err(GameError::config(format!("duplicate player id {:?}", p.id)));
            }
        }

        let in_bounds = |pos: Position| pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height;

        for patch in &self.terrain {
            if !in_bounds(patch.position()) {
                return Err(GameError::OutOfBounds(patch.position()));
            }
            let terrain = patch.terrain()?;
            if let Some(owner) = terrain.den_owner().or(terrain.trap_owner()) {
                if owner >= self.players.len() {
                    return Err(GameError::config(format!(
                        "terrain at {} owned by unknown seat {owner}",
                        patch.position()
                    )));
                }
            }
        }

        let table = self.species_table()?;
        for piece in &self.pieces {
            if !in_bounds(piece.position()) {
                return Err(GameError::OutOfBounds(piece.position()));
            }
            if piece.seat >= self.players.len() {
                return Err(GameError::config(format!(
                    "piece at {} belongs to unknown seat {}",
                    piece.position(),
                    piece.seat
                )));
            }
            if !table.contains(piece.species) {
                return Err(GameError::config(format!(
                    "species {} is missing from the species table",
                    piece.species
                )));
            }
        }
        Ok(())
    }

    pub fn build_board(&self) -> Result<Board, GameError> {
        let mut board = Board::new(self.width, self.height)?;
        for patch in &self.terrain {
            let pos = patch.position();
            if !board.contains(pos) {
                return Err(GameError::OutOfBounds(pos));
            }
            board.set_terrain(pos, patch.terrain()?);
        }
        Ok(board)
    }

    pub fn build_players(&self) -> Vec<Player> {
        self.players
            .iter()
            .enumerate()
            .map(|(seat, p)| Player::new(p.id.clone(), p.name.clone(), seat))
            .collect()
    }
}

pub fn load_layout(path: &Path) -> Result<Layout, GameError> {
    let content = std::fs::read_to_string(path).map_err(|source| GameError::LayoutIo {
        path: path.display().to_string(),
        source,
    })?;
    Layout::from_toml_str(&content)
}

/// Look for `jungle_layout.toml` in the usual places, falling back to the
/// standard board.
pub fn load_default_layout() -> Layout {
    let candidates = [
        "jungle_layout.toml",
        "../jungle_layout.toml",
        "/etc/jungle/jungle_layout.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_layout(p) {
                Ok(layout) => {
                    tracing::info!(
                        path = %p.display(),
                        width = layout.width,
                        height = layout.height,
                        pieces = layout.pieces.len(),
                        "loaded board layout"
                    );
                    return layout;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load board layout");
                }
            }
        }
    }
    tracing::info!("no jungle_layout.toml found, using the standard board");
    Layout::standard()
}
