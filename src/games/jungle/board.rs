//! Board state management for Jungle.
//!
//! The board owns one [`Cell`] per in-bounds position. Cells carry terrain and
//! an occupant handle; the pieces themselves belong to their players.

use serde::Serialize;

use crate::engine::models::Seat;
use crate::error::GameError;

use super::types::{Occupant, Piece, Position, Terrain, ORTHOGONAL_DIRECTIONS};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub terrain: Terrain,
    pub occupant: Option<Occupant>,
}

impl Cell {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Largest accepted width or height.
pub const MAX_DIMENSION: i32 = 64;

/// Fixed-size grid stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Board {
    /// Allocate `width × height` Normal cells.
    pub fn new(width: i32, height: i32) -> Result<Self, GameError> {
        check_dimensions(width, height)?;
        let count = width
            .checked_mul(height)
            .ok_or_else(|| GameError::config(format!("board {width}x{height} is too large")))?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::default(); count as usize],
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Result<usize, GameError> {
        if !self.contains(pos) {
            return Err(GameError::OutOfBounds(pos));
        }
        Ok((pos.y * self.width + pos.x) as usize)
    }

    pub fn cell(&self, pos: Position) -> Result<&Cell, GameError> {
        let idx = self.index(pos)?;
        Ok(&self.cells[idx])
    }

    fn cell_mut(&mut self, pos: Position) -> Result<&mut Cell, GameError> {
        let idx = self.index(pos)?;
        Ok(&mut self.cells[idx])
    }

    pub fn terrain(&self, pos: Position) -> Result<Terrain, GameError> {
        Ok(self.cell(pos)?.terrain)
    }

    pub fn occupant(&self, pos: Position) -> Result<Option<Occupant>, GameError> {
        Ok(self.cell(pos)?.occupant)
    }

    /// Overwrite the terrain of an existing cell. Positions off the board are
    /// ignored.
    pub fn set_terrain(&mut self, pos: Position, terrain: Terrain) {
        if let Ok(cell) = self.cell_mut(pos) {
            cell.terrain = terrain;
        }
    }

    /// Put `piece` on `pos`, updating its current (and, the first time, its
    /// initial) position. A piece already standing elsewhere is lifted first.
    pub fn place_piece(&mut self, piece: &mut Piece, pos: Position) -> Result<(), GameError> {
        let target = self.cell(pos)?;
        if let Some(occ) = target.occupant {
            if occ.piece != piece.id {
                return Err(GameError::Occupied(pos));
            }
        }

        if let Some(old) = piece.position.filter(|&old| old != pos) {
            if let Ok(cell) = self.cell_mut(old) {
                if cell.occupant.map(|o| o.piece) == Some(piece.id) {
                    cell.occupant = None;
                }
            }
        }

        self.cell_mut(pos)?.occupant = Some(piece.occupant());
        piece.position = Some(pos);
        if piece.initial_position.is_none() {
            piece.initial_position = Some(pos);
        }
        Ok(())
    }

    /// Clear the occupant handle of `pos`. The piece object is untouched.
    pub fn remove_occupant(&mut self, pos: Position) -> Result<Option<Occupant>, GameError> {
        Ok(self.cell_mut(pos)?.occupant.take())
    }

    /// All in-bounds positions, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    pub fn orthogonal_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        ORTHOGONAL_DIRECTIONS
            .iter()
            .map(move |&(dx, dy)| pos.offset(dx, dy))
            .filter(move |&p| self.contains(p))
    }

    /// Den cells configured for `seat`.
    pub fn dens_of(&self, seat: Seat) -> Vec<Position> {
        self.positions()
            .filter(|&p| {
                self.cell(p)
                    .map(|c| c.terrain.den_owner() == Some(seat))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Cells strictly between `from` and `to` on a shared row or column, or
    /// `None` when the two are not aligned.
    pub fn straight_path(&self, from: Position, to: Position) -> Option<Vec<Position>> {
        let (dx, dy) = from.straight_step_to(to)?;
        let mut path = Vec::new();
        let mut cur = from.offset(dx, dy);
        while cur != to {
            if !self.contains(cur) {
                return None;
            }
            path.push(cur);
            cur = cur.offset(dx, dy);
        }
        Some(path)
    }
}

/// Both sides must lie in `1..=MAX_DIMENSION`.
pub fn check_dimensions(width: i32, height: i32) -> Result<(), GameError> {
    if width <= 0 || height <= 0 {
        return Err(GameError::config(format!(
            "board dimensions must be positive, got {width}x{height}"
        )));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(GameError::config(format!(
            "board dimensions must be at most {MAX_DIMENSION}, got {width}x{height}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::jungle::types::{PieceId, Species};

    fn rat(id: u32, owner: Seat) -> Piece {
        Piece::new(PieceId(id), Species::Rat, owner)
    }

    #[test]
    fn test_new_rejects_bad_dimensions() {
        assert!(matches!(Board::new(0, 9), Err(GameError::Config(_))));
        assert!(matches!(Board::new(7, -1), Err(GameError::Config(_))));
        let board = Board::new(7, 9).unwrap();
        assert_eq!(board.positions().count(), 63);
    }

    #[test]
    fn test_new_rejects_oversized_dimensions() {
        assert!(matches!(Board::new(50_000, 50_000), Err(GameError::Config(_))));
        assert!(matches!(Board::new(MAX_DIMENSION + 1, 1), Err(GameError::Config(_))));
        assert!(matches!(Board::new(i32::MAX, i32::MAX), Err(GameError::Config(_))));
        let board = Board::new(MAX_DIMENSION, MAX_DIMENSION).unwrap();
        assert_eq!(board.positions().count(), (MAX_DIMENSION * MAX_DIMENSION) as usize);
    }

    #[test]
    fn test_cell_bounds() {
        let board = Board::new(7, 9).unwrap();
        for p in board.positions() {
            assert_eq!(board.cell(p).unwrap().terrain, Terrain::Normal);
        }
        for p in [Position::new(-1, 0), Position::new(7, 0), Position::new(0, 9), Position::new(3, -4)] {
            assert!(matches!(board.cell(p), Err(GameError::OutOfBounds(q)) if q == p));
        }
    }

    #[test]
    fn test_set_terrain_ignores_off_board() {
        let mut board = Board::new(3, 3).unwrap();
        let before = board.clone();
        board.set_terrain(Position::new(5, 5), Terrain::Water);
        assert_eq!(board, before);

        board.set_terrain(Position::new(1, 1), Terrain::Water);
        board.set_terrain(Position::new(1, 1), Terrain::Water);
        assert_eq!(board.terrain(Position::new(1, 1)).unwrap(), Terrain::Water);
    }

    #[test]
    fn test_place_piece_records_initial_position_once() {
        let mut board = Board::new(3, 3).unwrap();
        let mut piece = rat(0, 0);
        board.place_piece(&mut piece, Position::new(0, 0)).unwrap();
        board.place_piece(&mut piece, Position::new(0, 1)).unwrap();

        assert_eq!(piece.initial_position, Some(Position::new(0, 0)));
        assert_eq!(piece.position, Some(Position::new(0, 1)));
        assert_eq!(board.occupant(Position::new(0, 0)).unwrap(), None);
        assert_eq!(board.occupant(Position::new(0, 1)).unwrap(), Some(piece.occupant()));
    }

    #[test]
    fn test_place_piece_occupied() {
        let mut board = Board::new(3, 3).unwrap();
        let mut a = rat(0, 0);
        let mut b = rat(1, 1);
        board.place_piece(&mut a, Position::new(1, 1)).unwrap();
        assert!(matches!(
            board.place_piece(&mut b, Position::new(1, 1)),
            Err(GameError::Occupied(_))
        ));
        // Re-placing the same piece is fine.
        board.place_piece(&mut a, Position::new(1, 1)).unwrap();
        assert_eq!(b.position, None);
    }

    #[test]
    fn test_remove_occupant_keeps_piece() {
        let mut board = Board::new(3, 3).unwrap();
        let mut a = rat(0, 0);
        board.place_piece(&mut a, Position::new(2, 2)).unwrap();
        let occ = board.remove_occupant(Position::new(2, 2)).unwrap();
        assert_eq!(occ, Some(a.occupant()));
        assert!(!board.cell(Position::new(2, 2)).unwrap().is_occupied());
        assert_eq!(a.position, Some(Position::new(2, 2)));
    }

    #[test]
    fn test_straight_path() {
        let board = Board::new(7, 9).unwrap();
        let path = board.straight_path(Position::new(1, 2), Position::new(1, 6)).unwrap();
        assert_eq!(path, vec![Position::new(1, 3), Position::new(1, 4), Position::new(1, 5)]);
        assert_eq!(board.straight_path(Position::new(0, 0), Position::new(1, 0)), Some(vec![]));
        assert_eq!(board.straight_path(Position::new(0, 0), Position::new(1, 1)), None);
    }

    #[test]
    fn test_neighbors_clipped_at_edges() {
        let board = Board::new(7, 9).unwrap();
        assert_eq!(board.orthogonal_neighbors(Position::new(0, 0)).count(), 2);
        assert_eq!(board.orthogonal_neighbors(Position::new(3, 4)).count(), 4);
    }
}
