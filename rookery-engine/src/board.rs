//! A square-centric 8x8 grid of piece references.
//!
//! The Board holds no pieces of its own: each cell refers to a piece in the
//! Position's arena by `PieceId`. It knows nothing about the rules.

use std::ops::Index;

use crate::coretypes::{coordinate_to_grid_index, grid_index_to_coordinate, Coordinate};
use crate::coretypes::{NUM_FILES, NUM_RANKS};
use crate::pieces::{Piece, PieceId};

const ROWS: usize = NUM_RANKS as usize;
const COLS: usize = NUM_FILES as usize;

/// Grid of labels handed to renderers, row 0 is rank 8.
pub type DisplayGrid = [[Option<String>; COLS]; ROWS];

/// Classic 8x8 square board.
/// Indexed by grid (row, col) internally, by Coordinate externally.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Board {
    cells: [[Option<PieceId>; COLS]; ROWS],
}

impl Board {
    /// Creates an empty Board, where all cells are None.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the piece referenced by the cell at coordinate.
    pub fn get(&self, coordinate: Coordinate) -> Option<PieceId> {
        let (row, col) = coordinate_to_grid_index(coordinate);
        self.cells[row][col]
    }

    /// Places a piece reference, overwriting whatever the cell held.
    pub fn place(&mut self, id: PieceId, coordinate: Coordinate) {
        let (row, col) = coordinate_to_grid_index(coordinate);
        self.cells[row][col] = Some(id);
    }

    /// Clears the cell at coordinate if it refers to id. No-op otherwise.
    pub fn remove(&mut self, id: PieceId, coordinate: Coordinate) {
        let (row, col) = coordinate_to_grid_index(coordinate);
        if self.cells[row][col] == Some(id) {
            self.cells[row][col] = None;
        }
    }

    /// Returns true if no piece reference is stored at coordinate.
    pub fn is_vacant(&self, coordinate: Coordinate) -> bool {
        self.get(coordinate).is_none()
    }

    /// Iterates over all occupied cells as (coordinate, piece id) pairs.
    pub fn occupied(&self) -> impl Iterator<Item = (Coordinate, PieceId)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, cell)| {
                let coordinate = grid_index_to_coordinate(row, col).ok()?;
                cell.map(|id| (coordinate, id))
            })
        })
    }

    /// Labels every cell with the piece letter and side, `Pw` or `Kb`.
    /// Ghosts render as empty cells.
    pub fn to_display_grid<A>(&self, arena: &A) -> DisplayGrid
    where
        A: Index<PieceId, Output = Piece> + ?Sized,
    {
        let mut grid: DisplayGrid = Default::default();
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                grid[row][col] = cell
                    .map(|id| &arena[id])
                    .filter(|piece| !piece.is_ghost())
                    .map(|piece| piece.label());
            }
        }
        grid
    }
}
